//! Headless renderer that only counts what it is handed.

use roam_mesh::{MeshPass, Patch, PatchRenderer, RenderMode};

#[derive(Debug, Default)]
pub struct CountingRenderer {
    pub uploaded_bytes: usize,
    pub draws: usize,
    pub border_vertices: usize,
}

impl PatchRenderer for CountingRenderer {
    fn upload_vertices(&mut self, _pass: MeshPass, patch: &Patch) {
        self.uploaded_bytes += bytemuck::cast_slice::<_, u8>(patch.vertices()).len();
    }

    fn upload_indices(&mut self, _pass: MeshPass, mode: RenderMode, patch: &Patch) {
        let indices = bytemuck::cast_slice::<_, u8>(patch.indices()).len();
        self.uploaded_bytes += match mode {
            // Display lists bake the vertices in with the indices.
            RenderMode::DisplayList => {
                indices + bytemuck::cast_slice::<_, u8>(patch.vertices()).len()
            }
            RenderMode::Immediate | RenderMode::BufferObject => indices,
        };
    }

    fn draw(&mut self, _pass: MeshPass, _mode: RenderMode, _patch: &Patch) {
        self.draws += 1;
    }

    fn draw_border(&mut self, _pass: MeshPass, patch: &Patch) {
        self.border_vertices += patch.border().len();
    }
}

//! Render passes, render modes and the renderer interface.

use serde::{Deserialize, Serialize};

use crate::patch::Patch;

/// Independent tessellation passes. Each keeps its own patches and node
/// pools so shadow rendering never disturbs the main mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshPass {
    Normal,
    Shadow,
}

impl MeshPass {
    pub const COUNT: usize = 2;
    pub const ALL: [Self; Self::COUNT] = [Self::Normal, Self::Shadow];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// How the produced geometry is handed to the GPU.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderMode {
    /// Submit vertices from client memory on every draw.
    Immediate,
    /// Compile vertices and indices into a display list at upload.
    #[default]
    DisplayList,
    /// Keep vertices and indices in GPU buffers.
    BufferObject,
}

impl RenderMode {
    /// The mode after this one, wrapping around.
    pub const fn next(self) -> Self {
        match self {
            Self::Immediate => Self::DisplayList,
            Self::DisplayList => Self::BufferObject,
            Self::BufferObject => Self::Immediate,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::DisplayList => "display list",
            Self::BufferObject => "buffer object",
        }
    }
}

/// Backend that consumes patch geometry.
///
/// The mesh engine decides when to upload and what to draw; the renderer
/// owns every GPU resource.
pub trait PatchRenderer {
    /// Whether [`RenderMode::BufferObject`] is available.
    fn supports_buffer_objects(&self) -> bool {
        true
    }

    /// Send the patch's vertex buffer. Only called in buffer object mode.
    fn upload_vertices(&mut self, pass: MeshPass, patch: &Patch);

    /// Send (or compile, in display list mode) the patch's indices.
    fn upload_indices(&mut self, pass: MeshPass, mode: RenderMode, patch: &Patch);

    /// Draw the patch's interior mesh.
    fn draw(&mut self, pass: MeshPass, mode: RenderMode, patch: &Patch);

    /// Draw the patch's border skirt.
    fn draw_border(&mut self, pass: MeshPass, patch: &Patch);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_cycles_through_all_modes() {
        let mut mode = RenderMode::Immediate;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(mode, RenderMode::Immediate);
        assert_eq!(
            seen,
            vec![
                RenderMode::Immediate,
                RenderMode::DisplayList,
                RenderMode::BufferObject
            ]
        );
    }

    #[test]
    fn pass_indices_are_dense() {
        for (i, pass) in MeshPass::ALL.iter().enumerate() {
            assert_eq!(pass.index(), i);
        }
    }
}

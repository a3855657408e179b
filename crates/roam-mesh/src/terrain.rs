//! Frame driver for a whole map of patches.

use glam::Vec3;
use rayon::prelude::*;
use roam_core::math::Aabb;
use roam_core::{Camera, CameraKind, Error, GridPos, GridRect, HeightSource, Result};
use tracing::{debug, info};

use crate::config::MeshConfig;
use crate::patch::{Patch, PatchEdges, ViewParams};
use crate::pool::TriNodePools;
use crate::render::{MeshPass, PatchRenderer, RenderMode};

/// What one call to [`TerrainMesh::update`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Patches whose variance tables were rebuilt.
    pub variance_rebuilt: usize,
    /// Patches visible to the camera this frame.
    pub visible_patches: usize,
    /// Whether the mesh was re-tessellated this frame.
    pub retessellated: bool,
    /// Patches that were tessellated.
    pub tessellated_patches: usize,
    /// Patches whose walk stopped because their pool ran out.
    pub out_of_nodes: usize,
    /// Triangles across all visible patches.
    pub triangles: usize,
    /// Tree nodes handed out across all pools.
    pub nodes_used: usize,
    /// Whether the node pools grew before tessellating.
    pub pool_grew: bool,
}

#[derive(Clone, Copy, Debug, Default)]
struct ChunkStats {
    tessellated: usize,
    out_of_nodes: usize,
}

/// Patches and node pools of one pass, plus what it was last tessellated for.
#[derive(Debug)]
struct PassState {
    patches: Vec<Patch>,
    pools: TriNodePools,
    last_camera: Option<Vec3>,
    last_view_radius: f32,
    /// Per patch: whether it was visible at the last tessellation.
    tessellated_visible: Vec<bool>,
    force_retessellate: bool,
}

/// Adaptive mesh over a whole height map.
#[derive(Debug)]
pub struct TerrainMesh {
    config: MeshConfig,
    patches_x: u32,
    patches_z: u32,
    passes: [PassState; MeshPass::COUNT],
    render_mode: RenderMode,
    height_range: (f32, f32),
}

impl TerrainMesh {
    /// Build the patch grid for `source` and allocate node pools for both
    /// passes.
    pub fn new<S>(config: MeshConfig, source: &S) -> Result<Self>
    where
        S: HeightSource + ?Sized,
    {
        config.validate()?;

        let size = config.patch_size;
        if source.cells_x() < size
            || source.cells_z() < size
            || source.cells_x() % size != 0
            || source.cells_z() % size != 0
        {
            return Err(Error::InvalidData(format!(
                "{}x{} map is not a whole number of {size}-cell patches",
                source.cells_x(),
                source.cells_z()
            )));
        }
        let patches_x = source.cells_x() / size;
        let patches_z = source.cells_z() / size;
        let workers = config.resolved_workers();

        let build_pass = || -> Result<PassState> {
            let patches = build_patches(&config, source, patches_x, patches_z);
            Ok(PassState {
                tessellated_visible: vec![false; patches.len()],
                patches,
                pools: TriNodePools::new(
                    workers,
                    config.initial_pool_size,
                    config.max_pool_size,
                )?,
                last_camera: None,
                last_view_radius: 0.0,
                force_retessellate: true,
            })
        };
        let passes = [build_pass()?, build_pass()?];

        info!(
            "Terrain mesh: {}x{} patches of {} cells, {} node pools per pass",
            patches_x, patches_z, size, workers
        );

        Ok(Self {
            config,
            patches_x,
            patches_z,
            passes,
            render_mode: RenderMode::default(),
            height_range: (source.min_height(), source.max_height()),
        })
    }

    #[inline]
    pub const fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// Patch grid dimensions.
    #[inline]
    pub const fn patch_counts(&self) -> (u32, u32) {
        (self.patches_x, self.patches_z)
    }

    /// Size of the whole map in world units along x and z.
    pub fn world_extent(&self) -> (f32, f32) {
        let patch = self.config.patch_size as f32 * self.config.square_size;
        (self.patches_x as f32 * patch, self.patches_z as f32 * patch)
    }

    pub fn patches(&self, pass: MeshPass) -> &[Patch] {
        &self.passes[pass.index()].patches
    }

    /// Patch at grid index `(x, z)`.
    pub fn patch(&self, pass: MeshPass, x: u32, z: u32) -> Option<&Patch> {
        if x >= self.patches_x || z >= self.patches_z {
            return None;
        }
        self.passes[pass.index()]
            .patches
            .get((z * self.patches_x + x) as usize)
    }

    pub fn pools(&self, pass: MeshPass) -> &TriNodePools {
        &self.passes[pass.index()].pools
    }

    #[inline]
    pub const fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    /// Stamp every patch whose bounds pass `is_visible` as seen by `kind`.
    /// Returns the number of visible patches.
    pub fn update_visibility<F>(&mut self, kind: CameraKind, frame: u64, is_visible: F) -> usize
    where
        F: Fn(&Aabb) -> bool,
    {
        let (min_height, max_height) = self.height_range;
        let mut visible = 0;
        for (i, state) in self.passes.iter_mut().enumerate() {
            for patch in &mut state.patches {
                if is_visible(&patch.bounds(min_height, max_height)) {
                    patch.mark_visible(kind, frame);
                    if i == 0 {
                        visible += 1;
                    }
                }
            }
        }
        visible
    }

    /// Forward changed map corners to every overlapping patch.
    /// Returns the number of patches touched per pass.
    pub fn update_height_map<S>(&mut self, source: &S, rect: GridRect) -> usize
    where
        S: HeightSource + ?Sized,
    {
        self.height_range = (source.min_height(), source.max_height());

        let mut touched = 0;
        for (i, state) in self.passes.iter_mut().enumerate() {
            for patch in &mut state.patches {
                if patch.update_height_map(source, rect) && i == 0 {
                    touched += 1;
                }
            }
        }
        debug!("Height map update {:?} touched {} patches", rect, touched);
        touched
    }

    /// Change how geometry is handed to the renderer.
    ///
    /// `None` cycles to the next mode. Buffer objects fall back to display
    /// lists when the renderer lacks them. A change forces every patch to be
    /// re-tessellated and re-uploaded.
    pub fn switch_render_mode<R>(&mut self, mode: Option<RenderMode>, renderer: &R) -> RenderMode
    where
        R: PatchRenderer + ?Sized,
    {
        let mut mode = mode.unwrap_or_else(|| self.render_mode.next());
        if mode == RenderMode::BufferObject && !renderer.supports_buffer_objects() {
            mode = RenderMode::DisplayList;
        }
        if mode == self.render_mode {
            return mode;
        }

        info!("Terrain render mode: {}", mode.name());
        self.render_mode = mode;
        for state in &mut self.passes {
            state.force_retessellate = true;
            for patch in &mut state.patches {
                patch.mark_vertices_dirty();
            }
        }
        mode
    }

    /// Run one frame of `pass`: rebuild stale variance tables, then
    /// re-tessellate the visible patches if anything relevant changed,
    /// including which patches are visible.
    #[cfg_attr(feature = "profiling", tracing::instrument(level = "trace", skip_all))]
    pub fn update<S>(
        &mut self,
        source: &S,
        camera: &Camera,
        view_radius: f32,
        pass: MeshPass,
        frame: u64,
    ) -> FrameStats
    where
        S: HeightSource + ?Sized,
    {
        self.height_range = (source.min_height(), source.max_height());
        let retessellate_distance = self.config.retessellate_distance;
        let state = &mut self.passes[pass.index()];
        let mut stats = FrameStats::default();

        stats.variance_rebuilt = state
            .patches
            .par_iter_mut()
            .filter(|patch| patch.is_dirty())
            .map(Patch::compute_variance)
            .count();

        let moved = state.last_camera.map_or(true, |last| {
            retessellate_distance <= 0.0
                || last.distance(camera.position) > retessellate_distance
        });
        #[allow(clippy::float_cmp)]
        let radius_changed = state.last_view_radius != view_radius;

        let kind = camera.kind;
        let visible: Vec<bool> = state
            .patches
            .iter()
            .map(|patch| patch.is_visible(kind, frame))
            .collect();
        stats.visible_patches = visible.iter().filter(|&&seen| seen).count();
        let visibility_changed = visible != state.tessellated_visible;

        stats.retessellated = state.force_retessellate
            || stats.variance_rebuilt > 0
            || moved
            || radius_changed
            || visibility_changed;

        if stats.retessellated {
            stats.pool_grew = state.pools.reset_all();
            for patch in &mut state.patches {
                patch.reset();
            }

            let view = ViewParams {
                camera: camera.position,
                view_radius,
                min_height: source.min_height(),
                max_height: source.max_height(),
            };
            let chunks = tessellate_chunks(&mut state.patches, &mut state.pools, &view, kind, frame);
            stats.tessellated_patches = chunks.iter().map(|chunk| chunk.tessellated).sum();
            stats.out_of_nodes = chunks.iter().map(|chunk| chunk.out_of_nodes).sum();

            state.last_camera = Some(camera.position);
            state.last_view_radius = view_radius;
            state.tessellated_visible = visible;
            state.force_retessellate = false;
        }

        stats.nodes_used = state.pools.allocated();
        stats.triangles = state
            .patches
            .iter()
            .filter(|patch| patch.is_visible(kind, frame))
            .map(Patch::triangle_count)
            .sum();

        debug!(
            "{:?} frame {}: {} visible, {} tessellated, {} triangles, {} nodes, {} out of nodes",
            pass,
            frame,
            stats.visible_patches,
            stats.tessellated_patches,
            stats.triangles,
            stats.nodes_used,
            stats.out_of_nodes
        );
        stats
    }

    /// Upload geometry of every patch of `pass` visible to `kind` this frame.
    #[cfg_attr(feature = "profiling", tracing::instrument(level = "trace", skip_all))]
    pub fn upload<R>(&mut self, renderer: &mut R, pass: MeshPass, kind: CameraKind, frame: u64)
    where
        R: PatchRenderer + ?Sized,
    {
        let mode = self.render_mode;
        for patch in &mut self.passes[pass.index()].patches {
            if patch.is_visible(kind, frame) {
                patch.upload(renderer, pass, mode);
            }
        }
    }

    /// Draw every patch of `pass` visible to `kind` this frame, then the
    /// border skirts. Returns the number of patches drawn.
    #[cfg_attr(feature = "profiling", tracing::instrument(level = "trace", skip_all))]
    pub fn draw<R>(&self, renderer: &mut R, pass: MeshPass, kind: CameraKind, frame: u64) -> usize
    where
        R: PatchRenderer + ?Sized,
    {
        let mode = self.render_mode;
        let visible = || {
            self.passes[pass.index()]
                .patches
                .iter()
                .filter(move |patch| patch.is_visible(kind, frame))
        };

        let mut drawn = 0;
        for patch in visible() {
            patch.draw(renderer, pass, mode);
            drawn += 1;
        }
        for patch in visible() {
            patch.draw_border(renderer, pass);
        }
        drawn
    }
}

/// Create the patch grid and link the edges between neighbours.
fn build_patches<S>(config: &MeshConfig, source: &S, patches_x: u32, patches_z: u32) -> Vec<Patch>
where
    S: HeightSource + ?Sized,
{
    let size = config.patch_size as i32;
    let mut patches = Vec::with_capacity((patches_x * patches_z) as usize);

    for z in 0..patches_z {
        for x in 0..patches_x {
            let mut patch = Patch::new(config, GridPos::new(x as i32 * size, z as i32 * size));
            patch.set_edges(PatchEdges {
                west: x > 0,
                north: z > 0,
                east: x + 1 < patches_x,
                south: z + 1 < patches_z,
            });
            patch.update_height_map(source, patch.footprint());
            patches.push(patch);
        }
    }
    patches
}

/// Tessellate visible patches in parallel, one contiguous chunk of patches
/// per node pool.
fn tessellate_chunks(
    patches: &mut [Patch],
    pools: &mut TriNodePools,
    view: &ViewParams,
    kind: CameraKind,
    frame: u64,
) -> Vec<ChunkStats> {
    let chunk_size = patches.len().div_ceil(pools.len().max(1)).max(1);

    patches
        .par_chunks_mut(chunk_size)
        .zip(pools.pools_mut().par_iter_mut())
        .map(|(chunk, pool)| {
            let mut stats = ChunkStats::default();
            for patch in chunk {
                if !patch.is_visible(kind, frame) {
                    continue;
                }
                stats.tessellated += 1;
                if !patch.tessellate(pool, view) && pool.is_starved() {
                    stats.out_of_nodes += 1;
                }
                patch.generate_indices(pool);
                patch.generate_border(pool);
            }
            stats
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::BorderVertex;
    use roam_core::HeightMap;

    const PS: u32 = 128;

    fn config() -> MeshConfig {
        MeshConfig {
            patch_size: PS,
            initial_pool_size: 1 << 14,
            max_pool_size: 1 << 16,
            worker_threads: 2,
            ..Default::default()
        }
    }

    fn spike_map(patches: u32) -> HeightMap {
        let mut map = HeightMap::flat(PS * patches, PS * patches, 0.0);
        let centre = (PS * patches / 2) as i32;
        map.set_height(GridPos::new(centre, centre), 100.0).unwrap();
        map
    }

    fn overhead_camera(map: &HeightMap) -> Camera {
        let centre = map.cells_x() as f32 * 0.5 * 8.0;
        Camera {
            position: Vec3::new(centre, 450.0, centre),
            ..Default::default()
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        buffer_objects: bool,
        vertex_uploads: usize,
        index_uploads: usize,
        draws: usize,
        border_vertices: usize,
    }

    impl PatchRenderer for RecordingRenderer {
        fn supports_buffer_objects(&self) -> bool {
            self.buffer_objects
        }

        fn upload_vertices(&mut self, _pass: MeshPass, _patch: &Patch) {
            self.vertex_uploads += 1;
        }

        fn upload_indices(&mut self, _pass: MeshPass, _mode: RenderMode, _patch: &Patch) {
            self.index_uploads += 1;
        }

        fn draw(&mut self, _pass: MeshPass, _mode: RenderMode, _patch: &Patch) {
            self.draws += 1;
        }

        fn draw_border(&mut self, _pass: MeshPass, patch: &Patch) {
            let border: &[BorderVertex] = patch.border();
            self.border_vertices += border.len();
        }
    }

    #[test]
    fn rejects_maps_that_are_not_whole_patches() {
        let map = HeightMap::flat(200, 128, 0.0);
        assert!(TerrainMesh::new(config(), &map).is_err());
        let map = HeightMap::flat(64, 64, 0.0);
        assert!(TerrainMesh::new(config(), &map).is_err());
    }

    #[test]
    fn patches_link_to_their_neighbours() {
        let map = HeightMap::flat(PS * 3, PS * 2, 0.0);
        let mesh = TerrainMesh::new(config(), &map).unwrap();
        assert_eq!(mesh.patch_counts(), (3, 2));
        assert_eq!(mesh.patches(MeshPass::Normal).len(), 6);

        let corner = mesh.patch(MeshPass::Normal, 0, 0).unwrap().edges();
        assert_eq!(
            corner,
            PatchEdges {
                west: false,
                north: false,
                east: true,
                south: true
            }
        );
        let middle = mesh.patch(MeshPass::Shadow, 1, 1).unwrap();
        assert_eq!(middle.coords(), GridPos::new(128, 128));
        assert!(middle.edges().west && middle.edges().east && middle.edges().north);
        assert!(!middle.edges().south);
        assert!(mesh.patch(MeshPass::Normal, 3, 0).is_none());
        assert_eq!(mesh.world_extent(), (384.0 * 8.0, 256.0 * 8.0));
    }

    #[test]
    fn world_extent_follows_configured_square_size() {
        let map = HeightMap::flat(PS * 2, PS, 0.0);
        let mesh = TerrainMesh::new(
            MeshConfig {
                square_size: 2.5,
                ..config()
            },
            &map,
        )
        .unwrap();
        assert_eq!(mesh.world_extent(), (256.0 * 2.5, 128.0 * 2.5));
        let east = mesh.patch(MeshPass::Normal, 1, 0).unwrap();
        assert_eq!(east.bounds(0.0, 1.0).max.x, 256.0 * 2.5);
    }

    #[test]
    fn first_update_rebuilds_and_tessellates_visible_patches() {
        let map = spike_map(1);
        let mut mesh = TerrainMesh::new(config(), &map).unwrap();
        let camera = overhead_camera(&map);

        assert_eq!(mesh.update_visibility(CameraKind::Player, 1, |_| true), 1);
        let stats = mesh.update(&map, &camera, 1000.0, MeshPass::Normal, 1);

        assert_eq!(stats.variance_rebuilt, 1);
        assert!(stats.retessellated);
        assert_eq!(stats.visible_patches, 1);
        assert_eq!(stats.tessellated_patches, 1);
        assert_eq!(stats.triangles, 280);
        assert_eq!(stats.nodes_used, 556);
        assert_eq!(stats.out_of_nodes, 0);

        // The shadow pass keeps its own, untouched tree.
        let shadow = mesh.patch(MeshPass::Shadow, 0, 0).unwrap();
        assert!(shadow.is_dirty());
        assert_eq!(mesh.pools(MeshPass::Shadow).allocated(), 0);
    }

    #[test]
    fn invisible_patches_are_skipped() {
        let map = spike_map(2);
        let mut mesh = TerrainMesh::new(config(), &map).unwrap();
        let camera = overhead_camera(&map);

        let visible = mesh.update_visibility(CameraKind::Player, 3, |aabb| aabb.min.x < 1.0);
        assert_eq!(visible, 2);
        let stats = mesh.update(&map, &camera, 1000.0, MeshPass::Normal, 3);
        assert_eq!(stats.visible_patches, 2);
        assert_eq!(stats.tessellated_patches, 2);
        assert!(mesh.patch(MeshPass::Normal, 1, 0).unwrap().indices().is_empty());
    }

    #[test]
    fn still_camera_skips_retessellation() {
        let map = spike_map(1);
        let mut mesh = TerrainMesh::new(
            MeshConfig {
                retessellate_distance: 50.0,
                ..config()
            },
            &map,
        )
        .unwrap();
        let mut camera = overhead_camera(&map);

        mesh.update_visibility(CameraKind::Player, 1, |_| true);
        let first = mesh.update(&map, &camera, 1000.0, MeshPass::Normal, 1);
        assert!(first.retessellated);

        mesh.update_visibility(CameraKind::Player, 2, |_| true);
        camera.position.x += 10.0;
        let second = mesh.update(&map, &camera, 1000.0, MeshPass::Normal, 2);
        assert!(!second.retessellated);
        assert_eq!(second.triangles, first.triangles);

        mesh.update_visibility(CameraKind::Player, 3, |_| true);
        camera.position.x += 100.0;
        let third = mesh.update(&map, &camera, 1000.0, MeshPass::Normal, 3);
        assert!(third.retessellated);
    }

    #[test]
    fn newly_visible_patch_is_tessellated_without_camera_movement() {
        let mut map = HeightMap::flat(PS * 2, PS, 0.0);
        map.set_height(GridPos::new(64, 64), 100.0).unwrap();
        let mut mesh = TerrainMesh::new(
            MeshConfig {
                retessellate_distance: 50.0,
                ..config()
            },
            &map,
        )
        .unwrap();
        let camera = overhead_camera(&map);

        mesh.update_visibility(CameraKind::Player, 1, |aabb| aabb.min.x < 1.0);
        let first = mesh.update(&map, &camera, 1000.0, MeshPass::Normal, 1);
        assert!(first.triangles > 0);
        assert!(mesh.patch(MeshPass::Normal, 1, 0).unwrap().indices().is_empty());

        // Camera turns east without moving.
        mesh.update_visibility(CameraKind::Player, 2, |aabb| aabb.min.x > 1.0);
        let second = mesh.update(&map, &camera, 1000.0, MeshPass::Normal, 2);
        assert!(second.retessellated);
        assert_eq!(second.visible_patches, 1);
        assert!(second.triangles > 0);
        assert!(!mesh.patch(MeshPass::Normal, 1, 0).unwrap().indices().is_empty());

        // Same view again: nothing to do.
        mesh.update_visibility(CameraKind::Player, 3, |aabb| aabb.min.x > 1.0);
        let third = mesh.update(&map, &camera, 1000.0, MeshPass::Normal, 3);
        assert!(!third.retessellated);
        assert_eq!(third.triangles, second.triangles);
    }

    #[test]
    fn starved_pools_grow_on_the_next_frame() {
        let map = spike_map(1);
        let mut mesh = TerrainMesh::new(
            MeshConfig {
                initial_pool_size: 64,
                max_pool_size: 1 << 12,
                worker_threads: 1,
                ..config()
            },
            &map,
        )
        .unwrap();
        let camera = overhead_camera(&map);

        mesh.update_visibility(CameraKind::Player, 1, |_| true);
        let first = mesh.update(&map, &camera, 1000.0, MeshPass::Normal, 1);
        assert_eq!(first.out_of_nodes, 1);
        assert!(!first.pool_grew);
        assert!(first.triangles < 280);

        mesh.update_visibility(CameraKind::Player, 2, |_| true);
        let second = mesh.update(&map, &camera, 1000.0, MeshPass::Normal, 2);
        assert!(second.pool_grew);
        assert_eq!(mesh.pools(MeshPass::Normal).total_size(), 128);
        assert!(second.triangles >= first.triangles);
    }

    #[test]
    fn interior_seams_have_no_border() {
        let map = HeightMap::flat(PS * 3, PS * 3, 0.0);
        let mut mesh = TerrainMesh::new(config(), &map).unwrap();
        let camera = overhead_camera(&map);

        mesh.update_visibility(CameraKind::Player, 1, |_| true);
        mesh.update(&map, &camera, 1000.0, MeshPass::Normal, 1);

        assert!(mesh.patch(MeshPass::Normal, 1, 1).unwrap().border().is_empty());
        // One missing edge: a single skirt along the north side.
        let top = mesh.patch(MeshPass::Normal, 1, 0).unwrap();
        assert!(!top.border().is_empty());
        assert!(top.border().iter().all(|vertex| vertex.position.z == 0.0));
        // Corners miss two edges.
        let corner = mesh.patch(MeshPass::Normal, 0, 0).unwrap();
        assert!(corner.border().iter().any(|vertex| vertex.position.x == 0.0));
        assert!(corner.border().iter().any(|vertex| vertex.position.z == 0.0));
    }

    #[test]
    fn height_map_updates_mark_overlapping_patches() {
        let mut map = HeightMap::flat(PS * 2, PS * 2, 0.0);
        let mut mesh = TerrainMesh::new(config(), &map).unwrap();
        let camera = overhead_camera(&map);
        mesh.update_visibility(CameraKind::Player, 1, |_| true);
        mesh.update(&map, &camera, 1000.0, MeshPass::Normal, 1);

        map.set_height(GridPos::new(128, 10), 30.0).unwrap();
        // Column x = 128 is shared by the two northern patches.
        let touched = mesh.update_height_map(&map, GridRect::new(128, 10, 128, 10));
        assert_eq!(touched, 2);
        assert!(mesh.patch(MeshPass::Normal, 0, 0).unwrap().is_dirty());
        assert!(mesh.patch(MeshPass::Shadow, 1, 0).unwrap().is_dirty());
        assert!(!mesh.patch(MeshPass::Normal, 0, 1).unwrap().is_dirty());

        mesh.update_visibility(CameraKind::Player, 2, |_| true);
        let stats = mesh.update(&map, &camera, 1000.0, MeshPass::Normal, 2);
        assert_eq!(stats.variance_rebuilt, 2);
        assert!(stats.retessellated);
    }

    #[test]
    fn render_mode_switch_falls_back_and_forces_work() {
        let map = spike_map(1);
        let mut mesh = TerrainMesh::new(config(), &map).unwrap();
        let camera = overhead_camera(&map);
        let mut renderer = RecordingRenderer::default();
        assert_eq!(mesh.render_mode(), RenderMode::DisplayList);

        // No buffer objects: cycling from display lists lands on display lists.
        assert_eq!(
            mesh.switch_render_mode(None, &renderer),
            RenderMode::DisplayList
        );

        renderer.buffer_objects = true;
        assert_eq!(
            mesh.switch_render_mode(None, &renderer),
            RenderMode::BufferObject
        );

        mesh.update_visibility(CameraKind::Player, 1, |_| true);
        mesh.update(&map, &camera, 1000.0, MeshPass::Normal, 1);
        mesh.upload(&mut renderer, MeshPass::Normal, CameraKind::Player, 1);
        mesh.upload(&mut renderer, MeshPass::Normal, CameraKind::Player, 1);
        assert_eq!(renderer.vertex_uploads, 1);
        assert_eq!(renderer.index_uploads, 2);

        let drawn = mesh.draw(&mut renderer, MeshPass::Normal, CameraKind::Player, 1);
        assert_eq!(drawn, 1);
        assert_eq!(renderer.draws, 1);
        assert_eq!(renderer.border_vertices, 16 * 6);

        // A real change forces the next frame to re-tessellate.
        mesh.switch_render_mode(Some(RenderMode::Immediate), &renderer);
        mesh.update_visibility(CameraKind::Player, 2, |_| true);
        let stats = mesh.update(&map, &camera, 1000.0, MeshPass::Normal, 2);
        assert!(stats.retessellated);
        assert!(mesh.patch(MeshPass::Normal, 0, 0).unwrap().vertices_dirty());
    }
}

//! Terrain patches.
//!
//! A patch is a square tile of `patch_size` cells. It caches the corner
//! heights of its footprint as world-space vertices, keeps one variance
//! table and one root triangle per half, and holds the index and border
//! lists produced by the last tessellation.

use glam::Vec3;
use roam_core::math::Aabb;
use roam_core::{CameraKind, GridPos, GridRect, HeightSource};

use crate::config::MeshConfig;
use crate::extract::{BorderVertex, TreeWalk};
use crate::node::{BaseTriangle, Link, NodeId, TriNode};
use crate::pool::TriNodePool;
use crate::render::{MeshPass, PatchRenderer, RenderMode};
use crate::tessellate::{LodParams, Tessellator};
use crate::tree::{seed_roots, TriTree};
use crate::variance::VarianceTable;

/// Which sides of a patch border another patch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatchEdges {
    /// Towards -x.
    pub west: bool,
    /// Towards -z.
    pub north: bool,
    /// Towards +x.
    pub east: bool,
    /// Towards +z.
    pub south: bool,
}

impl PatchEdges {
    /// A patch with neighbours on all four sides.
    pub const ALL: Self = Self {
        west: true,
        north: true,
        east: true,
        south: true,
    };

    /// Root links for the west, north, east and south legs.
    fn links(self) -> [Option<Link>; 4] {
        [self.west, self.north, self.east, self.south].map(|linked| linked.then_some(Link::Seam))
    }
}

/// Camera and terrain inputs of one tessellation pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewParams {
    pub camera: Vec3,
    pub view_radius: f32,
    /// Current lowest map elevation.
    pub min_height: f32,
    /// Current highest map elevation.
    pub max_height: f32,
}

/// Corners `(left, right, apex)` of a root triangle in patch-local cells.
pub(crate) const fn root_corners(base: BaseTriangle, size: i32) -> (GridPos, GridPos, GridPos) {
    match base {
        BaseTriangle::Left => (
            GridPos::new(0, size),
            GridPos::new(size, 0),
            GridPos::new(0, 0),
        ),
        BaseTriangle::Right => (
            GridPos::new(size, 0),
            GridPos::new(0, size),
            GridPos::new(size, size),
        ),
    }
}

/// One square tile of the terrain mesh.
#[derive(Debug)]
pub struct Patch {
    coords: GridPos,
    patch_size: u32,
    square_size: f32,
    border_depth: f32,

    vertices: Vec<Vec3>,
    variance: [VarianceTable; 2],
    roots: [TriNode; 2],
    edges: PatchEdges,

    indices: Vec<u32>,
    border: Vec<BorderVertex>,

    last_visible: [Option<u64>; CameraKind::COUNT],
    is_dirty: bool,
    vertices_dirty: bool,
}

impl Patch {
    /// Create a patch whose top-left corner sits at `coords` on the map grid.
    ///
    /// Heights start at zero; fill them with [`Patch::update_height_map`].
    pub fn new(config: &MeshConfig, coords: GridPos) -> Self {
        let side = config.vertices_per_side();
        let vertices = GridRect::from_origin(GridPos::new(0, 0), config.patch_size)
            .positions()
            .map(|local| coords.offset(local).to_world(0.0, config.square_size))
            .collect::<Vec<_>>();
        debug_assert_eq!(vertices.len(), (side * side) as usize);

        let edges = PatchEdges::default();
        Self {
            coords,
            patch_size: config.patch_size,
            square_size: config.square_size,
            border_depth: config.border_depth,
            vertices,
            variance: [
                VarianceTable::new(config.variance_depth),
                VarianceTable::new(config.variance_depth),
            ],
            roots: seed_roots(edges.links()),
            edges,
            indices: Vec::new(),
            border: Vec::new(),
            last_visible: [None; CameraKind::COUNT],
            is_dirty: true,
            vertices_dirty: true,
        }
    }

    /// Map-grid position of the patch's origin corner.
    #[inline]
    pub const fn coords(&self) -> GridPos {
        self.coords
    }

    #[inline]
    pub const fn patch_size(&self) -> u32 {
        self.patch_size
    }

    #[inline]
    pub const fn edges(&self) -> PatchEdges {
        self.edges
    }

    /// Record which sides border other patches and re-seed the roots.
    pub fn set_edges(&mut self, edges: PatchEdges) {
        self.edges = edges;
        self.reset();
    }

    /// Drop the tessellation and return both roots to a single diamond.
    pub fn reset(&mut self) {
        self.roots = seed_roots(self.edges.links());
    }

    /// Map-grid corners covered by this patch.
    #[inline]
    pub const fn footprint(&self) -> GridRect {
        GridRect::from_origin(self.coords, self.patch_size)
    }

    #[inline]
    const fn stride(&self) -> u32 {
        self.patch_size + 1
    }

    /// Refresh cached heights inside `rect` (map-grid corners).
    ///
    /// Returns `false` if `rect` misses the patch.
    pub fn update_height_map<S>(&mut self, source: &S, rect: GridRect) -> bool
    where
        S: HeightSource + ?Sized,
    {
        let Some(rect) = rect.intersection(&self.footprint()) else {
            return false;
        };

        let stride = self.stride();
        for local in rect.relative_to(self.coords).positions() {
            self.vertices[local.to_index(stride)].y =
                source.corner_height(local.offset(self.coords));
        }

        self.is_dirty = true;
        self.vertices_dirty = true;
        true
    }

    /// True if heights changed since the variance tables were built.
    #[inline]
    pub const fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Rebuild both variance tables from the cached heights.
    pub fn compute_variance(&mut self) {
        let size = self.patch_size as i32;
        let stride = self.stride();
        let vertices = &self.vertices;
        let height = |pos: GridPos| vertices[pos.to_index(stride)].y;

        for base in BaseTriangle::ALL {
            let (left, right, apex) = root_corners(base, size);
            self.variance[base.index()].compute(left, right, apex, height);
        }
        self.is_dirty = false;
    }

    pub fn variance(&self, base: BaseTriangle) -> &VarianceTable {
        &self.variance[base.index()]
    }

    /// World-space centre used for LOD distance, at mid map elevation.
    pub fn midpoint(&self, min_height: f32, max_height: f32) -> Vec3 {
        self.bounds(min_height, max_height).center()
    }

    /// Bounding box of the footprint across the map's height range.
    pub fn bounds(&self, min_height: f32, max_height: f32) -> Aabb {
        let rect = self.footprint();
        Aabb::new(
            GridPos::new(rect.x1, rect.z1).to_world(min_height, self.square_size),
            GridPos::new(rect.x2, rect.z2).to_world(max_height, self.square_size),
        )
    }

    /// Split both trees as far as the view asks for, allocating from `pool`.
    ///
    /// Returns `false` if the pool ran out (the walk stops and the patch
    /// keeps its partial tessellation) or has fewer than two nodes left.
    pub fn tessellate(&mut self, pool: &mut TriNodePool, view: &ViewParams) -> bool {
        let lod = LodParams::new(
            self.midpoint(view.min_height, view.max_height),
            view.camera,
            view.view_radius,
        );
        let size = self.patch_size as i32;
        let mut tree = TriTree::new(&mut self.roots, pool);

        for base in BaseTriangle::ALL {
            let (left, right, apex) = root_corners(base, size);
            let mut walk = Tessellator {
                tree: &mut tree,
                variance: &self.variance[base.index()],
                lod,
                patch_size: size as f32,
            };
            if !walk.refine(NodeId::Root(base), left, right, apex, 1) {
                return false;
            }
        }
        !tree.pool().is_exhausted()
    }

    fn walk<'a>(&'a self, pool: &'a TriNodePool) -> TreeWalk<'a> {
        TreeWalk {
            roots: &self.roots,
            pool,
            vertices: &self.vertices,
            stride: self.stride(),
        }
    }

    /// Rebuild the index list from the current tree.
    pub fn generate_indices(&mut self, pool: &TriNodePool) {
        let mut indices = std::mem::take(&mut self.indices);
        indices.clear();

        let walk = self.walk(pool);
        let size = self.patch_size as i32;
        for base in BaseTriangle::ALL {
            let (left, right, apex) = root_corners(base, size);
            walk.indices(NodeId::Root(base), left, right, apex, &mut indices);
        }
        self.indices = indices;
    }

    /// Rebuild the skirt along every side without a neighbouring patch.
    pub fn generate_border(&mut self, pool: &TriNodePool) {
        let mut border = std::mem::take(&mut self.border);
        border.clear();

        let walk = self.walk(pool);
        let size = self.patch_size as i32;
        let [bl, br] = &self.roots;
        // (root, leg is missing, leg is the left one)
        let legs = [
            (BaseTriangle::Left, bl.left_neighbor.is_none(), true),
            (BaseTriangle::Left, bl.right_neighbor.is_none(), false),
            (BaseTriangle::Right, br.right_neighbor.is_none(), false),
            (BaseTriangle::Right, br.left_neighbor.is_none(), true),
        ];
        for (base, missing, left_leg) in legs {
            if missing {
                let (left, right, apex) = root_corners(base, size);
                walk.border(
                    NodeId::Root(base),
                    left,
                    right,
                    apex,
                    1,
                    left_leg,
                    self.border_depth,
                    &mut border,
                );
            }
        }
        self.border = border;
    }

    /// Root triangles of the current tessellation.
    pub fn roots(&self) -> &[TriNode; 2] {
        &self.roots
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn border(&self) -> &[BorderVertex] {
        &self.border
    }

    /// Triangles in the current index list.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True if the vertex buffer changed since it was last uploaded.
    #[inline]
    pub const fn vertices_dirty(&self) -> bool {
        self.vertices_dirty
    }

    /// Force the next upload to resend vertices.
    pub fn mark_vertices_dirty(&mut self) {
        self.vertices_dirty = true;
    }

    pub fn mark_visible(&mut self, kind: CameraKind, frame: u64) {
        self.last_visible[kind.index()] = Some(frame);
    }

    /// True if a camera of `kind` saw the patch during `frame`.
    pub fn is_visible(&self, kind: CameraKind, frame: u64) -> bool {
        self.last_visible[kind.index()] == Some(frame)
    }

    /// Push current geometry to the renderer in the way `mode` consumes it.
    pub fn upload<R>(&mut self, renderer: &mut R, pass: MeshPass, mode: RenderMode)
    where
        R: PatchRenderer + ?Sized,
    {
        match mode {
            RenderMode::Immediate => {}
            RenderMode::DisplayList => {
                renderer.upload_indices(pass, mode, self);
                self.vertices_dirty = false;
            }
            RenderMode::BufferObject => {
                if self.vertices_dirty {
                    renderer.upload_vertices(pass, self);
                    self.vertices_dirty = false;
                }
                renderer.upload_indices(pass, mode, self);
            }
        }
    }

    pub fn draw<R>(&self, renderer: &mut R, pass: MeshPass, mode: RenderMode)
    where
        R: PatchRenderer + ?Sized,
    {
        renderer.draw(pass, mode, self);
    }

    pub fn draw_border<R>(&self, renderer: &mut R, pass: MeshPass)
    where
        R: PatchRenderer + ?Sized,
    {
        if !self.border.is_empty() {
            renderer.draw_border(pass, self);
        }
    }
}

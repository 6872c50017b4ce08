//! Draw surface collection and classification
//!
//! Per view, draw work is collected into three growable lists (opaque,
//! alpha-test, transparent) drawn from one shared [`Pool`] sized for the
//! frame's worst case. Surfaces live exactly one frame; the collector is
//! reset in the frame's reset phase alongside the arena.

use std::cmp::Ordering;

use crate::foundation::math::{projected_depth, Mat4, Point3};
use crate::render::material::{Material, MaterialId, RenderQueueKind};
use crate::render::pool::{GrowableList, Pool};
use crate::render::MemoryResult;

/// The geometry window a surface draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawRange {
    /// First index into the bound index buffer
    pub first_index: u32,
    /// Number of indices to draw
    pub index_count: u32,
    /// Value added to each index before vertex lookup
    pub base_vertex: i32,
}

/// One renderable unit collected for a view
#[derive(Debug, Clone)]
pub struct DrawSurface {
    /// Handle into the spatial layer (entity, octree node, ...)
    pub spatial_handle: u32,
    /// Geometry window to draw
    pub range: DrawRange,
    /// Material for the main pass
    pub material: MaterialId,
    /// Material override for the shadow pass, if any
    pub shadow_material: Option<MaterialId>,
    /// Material override for the pre-z pass, if any
    pub prez_material: Option<MaterialId>,
    /// Center of the surface's bounding box, world space; drives depth sort
    pub bounds_center: Point3,
}

impl Default for DrawSurface {
    fn default() -> Self {
        Self {
            spatial_handle: 0,
            range: DrawRange::default(),
            material: MaterialId::default(),
            shadow_material: None,
            prez_material: None,
            bounds_center: Point3::origin(),
        }
    }
}

/// Per-view collector classifying draw work by render queue.
///
/// One shared `Pool<DrawSurface>` backs all three lists; sizing must cover
/// the frame's cumulative allocation including list growth waste.
pub struct DrawSurfaceCollector {
    pool: Pool<DrawSurface>,
    opaque: GrowableList<DrawSurface>,
    alpha_test: GrowableList<DrawSurface>,
    transparent: GrowableList<DrawSurface>,
}

impl DrawSurfaceCollector {
    /// Create a collector whose shared pool holds `pool_capacity` surfaces.
    #[must_use]
    pub fn new(pool_capacity: usize) -> Self {
        log::info!("Created DrawSurfaceCollector with {pool_capacity} pooled surfaces");
        Self {
            pool: Pool::new(pool_capacity),
            opaque: GrowableList::new(),
            alpha_test: GrowableList::new(),
            transparent: GrowableList::new(),
        }
    }

    /// Allocate the next surface slot in the list matching the material's
    /// render queue.
    ///
    /// The returned surface is freshly defaulted with its material set;
    /// the caller fills in geometry and bounds. The reference is valid
    /// until the next allocation (growth may move the backing view).
    pub fn alloc(&mut self, material: &Material) -> MemoryResult<&mut DrawSurface> {
        let list = match material.render_queue {
            RenderQueueKind::Opaque => &mut self.opaque,
            RenderQueueKind::AlphaTest => &mut self.alpha_test,
            RenderQueueKind::Transparency => &mut self.transparent,
        };
        let slot = list.alloc_slot(&mut self.pool)?;
        let view = list.view();
        let surface = &mut self.pool.slice_mut(view)[slot];
        *surface = DrawSurface {
            material: material.id,
            ..DrawSurface::default()
        };
        Ok(surface)
    }

    /// Depth-sort the opaque list in place, nearest first.
    ///
    /// The key is each surface's bounding-box center projected through
    /// `view_projection`; ties are unordered.
    pub fn sort_opaque(&mut self, view_projection: &Mat4) {
        let live = self.opaque.live_mut(&mut self.pool);
        live.sort_unstable_by(|a, b| {
            let da = projected_depth(view_projection, &a.bounds_center);
            let db = projected_depth(view_projection, &b.bounds_center);
            da.total_cmp(&db)
        });
    }

    /// Sort the transparent list with a caller-supplied policy.
    ///
    /// This core guarantees no transparent ordering of its own; passes that
    /// need back-to-front (or any other order) provide the comparator.
    pub fn sort_transparent<F>(&mut self, mut compare: F)
    where
        F: FnMut(&DrawSurface, &DrawSurface) -> Ordering,
    {
        self.transparent
            .live_mut(&mut self.pool)
            .sort_unstable_by(|a, b| compare(a, b));
    }

    /// The opaque live window.
    #[must_use]
    pub fn opaque(&self) -> &[DrawSurface] {
        self.opaque.live(&self.pool)
    }

    /// The alpha-test live window.
    #[must_use]
    pub fn alpha_test(&self) -> &[DrawSurface] {
        self.alpha_test.live(&self.pool)
    }

    /// The transparent live window.
    #[must_use]
    pub fn transparent(&self) -> &[DrawSurface] {
        self.transparent.live(&self.pool)
    }

    /// Surfaces collected this frame across all three queues.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.opaque.len() + self.alpha_test.len() + self.transparent.len()
    }

    /// Pool slots consumed this frame, growth waste included.
    #[must_use]
    pub const fn pool_used(&self) -> usize {
        self.pool.used()
    }

    /// Discard every surface and view; called once per frame in the reset
    /// phase, before any collection.
    pub fn reset(&mut self) {
        self.pool.reset();
        self.opaque = GrowableList::new();
        self.alpha_test = GrowableList::new();
        self.transparent = GrowableList::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::material::MaterialId;

    fn material(id: u32, queue: RenderQueueKind) -> Material {
        Material::with_queue(MaterialId(id), queue)
    }

    #[test]
    fn test_classification_counts_match_distribution() {
        let mut collector = DrawSurfaceCollector::new(1024);

        // 12 opaque, 5 alpha-tested, 7 transparent, interleaved.
        let queues = [
            (RenderQueueKind::Opaque, 12),
            (RenderQueueKind::AlphaTest, 5),
            (RenderQueueKind::Transparency, 7),
        ];
        let mut serial = 0u32;
        for round in 0..12 {
            for &(queue, count) in &queues {
                if round < count {
                    let surface = collector.alloc(&material(serial, queue)).unwrap();
                    surface.spatial_handle = serial;
                    serial += 1;
                }
            }
        }

        assert_eq!(collector.opaque().len(), 12);
        assert_eq!(collector.alpha_test().len(), 5);
        assert_eq!(collector.transparent().len(), 7);
        assert_eq!(collector.total(), 24);
    }

    #[test]
    fn test_every_slot_is_unique_within_a_frame() {
        let mut collector = DrawSurfaceCollector::new(1024);

        for i in 0..100u32 {
            let surface = collector.alloc(&material(i, RenderQueueKind::Opaque)).unwrap();
            surface.spatial_handle = i;
        }

        let mut handles: Vec<u32> = collector.opaque().iter().map(|s| s.spatial_handle).collect();
        handles.sort_unstable();
        handles.dedup();
        assert_eq!(handles.len(), 100);
    }

    #[test]
    fn test_sort_opaque_orders_by_projected_depth() {
        let mut collector = DrawSurfaceCollector::new(256);
        let view_projection =
            Mat4::new_perspective(1.0, std::f32::consts::FRAC_PI_2, 0.1, 100.0);

        // Surfaces at shuffled distances along the view axis (-Z).
        for &z in &[-30.0f32, -5.0, -60.0, -1.0, -12.0] {
            let surface = collector
                .alloc(&material(0, RenderQueueKind::Opaque))
                .unwrap();
            surface.bounds_center = Point3::new(0.0, 0.0, z);
        }

        collector.sort_opaque(&view_projection);

        let depths: Vec<f32> = collector
            .opaque()
            .iter()
            .map(|s| projected_depth(&view_projection, &s.bounds_center))
            .collect();
        assert!(depths.windows(2).all(|w| w[0] <= w[1]));
        // Nearest surface first.
        assert_eq!(collector.opaque()[0].bounds_center.z, -1.0);
    }

    #[test]
    fn test_reset_reclaims_the_shared_pool() {
        let mut collector = DrawSurfaceCollector::new(256);
        for i in 0..50u32 {
            let _ = collector.alloc(&material(i, RenderQueueKind::Opaque)).unwrap();
        }
        assert!(collector.pool_used() > 0);

        collector.reset();
        assert_eq!(collector.total(), 0);
        assert_eq!(collector.pool_used(), 0);

        // The pool is immediately reusable for the next frame.
        let _ = collector.alloc(&material(0, RenderQueueKind::Transparency)).unwrap();
        assert_eq!(collector.transparent().len(), 1);
    }

    #[test]
    fn test_alloc_sets_material_and_defaults_the_rest() {
        let mut collector = DrawSurfaceCollector::new(256);
        let surface = collector
            .alloc(&material(42, RenderQueueKind::AlphaTest))
            .unwrap();

        assert_eq!(surface.material, MaterialId(42));
        assert_eq!(surface.range, DrawRange::default());
        assert!(surface.shadow_material.is_none());
    }
}

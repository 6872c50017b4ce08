//! Material classification for draw-work collection
//!
//! The collector only needs a material's render-queue category and enough
//! identity to issue a draw; shading parameters, descriptor sets, and
//! pipeline state belong to the material compiler upstream.

/// Render-queue category controlling which surface list and pass handles
/// a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderQueueKind {
    /// Fully opaque geometry, depth-sorted front-to-back
    #[default]
    Opaque,
    /// Alpha-tested geometry (foliage, fences); opaque pass with discard
    AlphaTest,
    /// Alpha-blended geometry; ordering is a per-pass policy
    Transparency,
}

/// Stable identity of a material within the material layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaterialId(pub u32);

/// The slice of a material the collection core consumes
#[derive(Debug, Clone)]
pub struct Material {
    /// Identity within the material layer
    pub id: MaterialId,
    /// Which draw queue this material's surfaces belong to
    pub render_queue: RenderQueueKind,
}

impl Material {
    /// Create a material with the default (opaque) queue
    #[must_use]
    pub const fn opaque(id: MaterialId) -> Self {
        Self {
            id,
            render_queue: RenderQueueKind::Opaque,
        }
    }

    /// Create a material in a specific render queue
    #[must_use]
    pub const fn with_queue(id: MaterialId, render_queue: RenderQueueKind) -> Self {
        Self { id, render_queue }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_queue_is_opaque() {
        assert_eq!(RenderQueueKind::default(), RenderQueueKind::Opaque);
        assert_eq!(Material::opaque(MaterialId(3)).render_queue, RenderQueueKind::Opaque);
    }
}

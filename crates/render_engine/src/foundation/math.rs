//! Math utilities and types
//!
//! Provides fundamental math types for 3D graphics. Thin aliases over
//! nalgebra so the rest of the engine never names the backing crate.

pub use nalgebra::{Matrix4, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Depth of a world-space point seen through a view-projection matrix.
///
/// Projects the point and returns the post-divide depth. Points behind the
/// camera produce a negative w; the raw quotient is still returned so sorting
/// stays total over whatever the caller collected.
#[must_use]
pub fn projected_depth(view_projection: &Mat4, point: &Point3) -> f32 {
    let clip = view_projection * point.to_homogeneous();
    if clip.w.abs() < f32::EPSILON {
        clip.z
    } else {
        clip.z / clip.w
    }
}

/// Round `value` up to the next multiple of `align`.
///
/// `align` must be a power of two.
#[inline]
#[must_use]
pub const fn align_up(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 16), 0);
        assert_eq!(align_up(1, 16), 16);
        assert_eq!(align_up(16, 16), 16);
        assert_eq!(align_up(17, 16), 32);
        assert_eq!(align_up(10, 128), 128);
    }

    #[test]
    fn test_projected_depth_orders_along_view_axis() {
        // Looking down -Z with a simple perspective matrix: farther points
        // project to larger depth.
        let proj = Mat4::new_perspective(1.0, std::f32::consts::FRAC_PI_2, 0.1, 100.0);
        let near = projected_depth(&proj, &Point3::new(0.0, 0.0, -1.0));
        let far = projected_depth(&proj, &Point3::new(0.0, 0.0, -50.0));
        assert!(near < far);
    }

    #[test]
    fn test_projected_depth_identity() {
        let d = projected_depth(&Mat4::identity(), &Point3::new(0.0, 0.0, 0.25));
        assert_relative_eq!(d, 0.25);
    }
}

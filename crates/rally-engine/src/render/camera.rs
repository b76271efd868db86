//! Fixed 2D camera.

use glam::{Mat4, Vec3};

/// Depth range of the orthographic projection. The court plane (z = 0) sits
/// one unit in front of the eye, in the middle of this range.
const NEAR: f32 = 0.0;
const FAR: f32 = 2.0;

/// A 2D orthographic camera looking down -Z at the court plane.
///
/// [`projection_view`](Self::projection_view) maps screen-space units onto
/// clip space `[-1, 1]` in x and y, with depth in wgpu's `[0, 1]` range.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera2D {
    /// Width of the visible area in screen units.
    pub width: f32,
    /// Height of the visible area in screen units.
    pub height: f32,
    /// Camera center X in screen units.
    pub x: f32,
    /// Camera center Y in screen units.
    pub y: f32,
}

impl Camera2D {
    /// A camera centred on the origin showing `[-half, half]` on both axes.
    pub fn square(half_extent: f32) -> Self {
        Self {
            width: half_extent * 2.0,
            height: half_extent * 2.0,
            x: 0.0,
            y: 0.0,
        }
    }

    /// Orthographic projection over the visible rectangle, in view space.
    pub fn projection(&self) -> Mat4 {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        Mat4::orthographic_rh(-hw, hw, -hh, hh, NEAR, FAR)
    }

    /// View matrix: eye at `(x, y, 1)` looking at `(x, y, 0)`, +Y up.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(
            Vec3::new(self.x, self.y, 1.0),
            Vec3::new(self.x, self.y, 0.0),
            Vec3::Y,
        )
    }

    /// `projection * view`.
    pub fn projection_view(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::square(30.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn clip(camera: &Camera2D, x: f32, y: f32) -> Vec4 {
        camera.projection_view() * Vec4::new(x, y, 0.0, 1.0)
    }

    #[test]
    fn corners_map_to_clip_corners() {
        let camera = Camera2D::default();
        let top_right = clip(&camera, 30.0, 30.0);
        assert!((top_right.x - 1.0).abs() < 1e-5);
        assert!((top_right.y - 1.0).abs() < 1e-5);
        let bottom_left = clip(&camera, -30.0, -30.0);
        assert!((bottom_left.x + 1.0).abs() < 1e-5);
        assert!((bottom_left.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn court_plane_is_inside_depth_range() {
        let p = clip(&Camera2D::default(), 0.0, 0.0);
        assert!(p.z > 0.0 && p.z < 1.0, "depth {} out of range", p.z);
        assert!((p.w - 1.0).abs() < 1e-6);
    }

    #[test]
    fn offset_camera_centers_its_position() {
        let camera = Camera2D {
            width: 20.0,
            height: 10.0,
            x: 5.0,
            y: -3.0,
        };
        let center = clip(&camera, 5.0, -3.0);
        assert!(center.x.abs() < 1e-5 && center.y.abs() < 1e-5);
        let right = clip(&camera, 15.0, -3.0);
        assert!((right.x - 1.0).abs() < 1e-5);
    }
}

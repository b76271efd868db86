//! Oriented-rectangle transforms for debug line segments.
//!
//! Each line segment is drawn as the [`UNIT_QUAD`] stretched, rotated and
//! moved onto the segment. [`RenderTransform::from_endpoints`] derives that
//! transform in closed form:
//!
//! ```text
//! model = T(center) * R(orientation) * S(length, thickness, 1)
//! ```
//!
//! so the quad's local x axis (corners at +-0.5) ends up spanning
//! `from -> to` and its local y axis spans the line thickness.

use glam::{Mat4, Quat, Vec2, Vec3};

/// Triangle-strip corners of a unit square centred on the origin:
/// bottom-left, bottom-right, top-left, top-right.
pub const UNIT_QUAD: [f32; 8] = [
    -0.5, -0.5, //
    0.5, -0.5, //
    -0.5, 0.5, //
    0.5, 0.5, //
];

/// Number of vertices in [`UNIT_QUAD`].
pub const UNIT_QUAD_VERTICES: u32 = 4;

/// Line thickness used when none is configured, in screen units.
pub const DEFAULT_LINE_THICKNESS: f32 = 0.3;

/// Screen-space placement of one line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTransform {
    /// Midpoint of the segment.
    pub center: Vec2,
    /// Unit vector from `from` to `to`. [`Vec2::X`] for zero-length segments.
    pub direction: Vec2,
    /// Distance between the endpoints.
    pub length: f32,
    /// Rotation taking +X onto `direction`, about +Z.
    pub orientation: Quat,
    /// Maps the unit quad onto the segment rectangle.
    pub model: Mat4,
}

impl Default for RenderTransform {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            direction: Vec2::X,
            length: 0.0,
            orientation: Quat::IDENTITY,
            model: Mat4::IDENTITY,
        }
    }
}

impl RenderTransform {
    /// Derive the transform for the segment `from -> to`, given in
    /// simulation units.
    ///
    /// Endpoints are scaled by `pixels_per_unit` before any geometry is
    /// computed. A zero-length segment gets the identity orientation and a
    /// zero x scale, so it collapses to nothing instead of producing NaN.
    pub fn from_endpoints(from: Vec2, to: Vec2, pixels_per_unit: f32, thickness: f32) -> Self {
        let from = from * pixels_per_unit;
        let to = to * pixels_per_unit;

        let center = Vec2::new(midpoint(from.x, to.x), midpoint(from.y, to.y));
        let diff = to - from;
        let length = diff.length();

        let (direction, orientation) = if length > 0.0 && length.is_finite() {
            let direction = diff / length;
            (direction, Quat::from_rotation_arc_2d(Vec2::X, direction))
        } else {
            (Vec2::X, Quat::IDENTITY)
        };

        let model = Mat4::from_scale_rotation_translation(
            Vec3::new(length, thickness, 1.0),
            orientation,
            center.extend(0.0),
        );

        Self {
            center,
            direction,
            length,
            orientation,
            model,
        }
    }

    /// Combine with a projection-view matrix.
    pub fn mvp(&self, proj_view: &Mat4) -> Mat4 {
        *proj_view * self.model
    }

    /// The unit quad's corners after `model`, in strip order.
    pub fn corners(&self) -> [Vec2; 4] {
        let mut out = [Vec2::ZERO; 4];
        for (corner, xy) in out.iter_mut().zip(UNIT_QUAD.chunks_exact(2)) {
            *corner = self
                .model
                .transform_point3(Vec3::new(xy[0], xy[1], 0.0))
                .truncate();
        }
        out
    }

    /// Whether every matrix element is finite.
    pub fn is_finite(&self) -> bool {
        self.model.is_finite()
    }
}

/// Midpoint of `a` and `b` as the smaller value plus half the gap.
///
/// Equal inputs return the input unchanged.
fn midpoint(a: f32, b: f32) -> f32 {
    if a > b {
        b + (a - b).abs() / 2.0
    } else {
        a + (b - a).abs() / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn horizontal_segment_keeps_identity_orientation() {
        let t = RenderTransform::from_endpoints(Vec2::ZERO, Vec2::new(10.0, 0.0), 1.0, 0.3);
        assert_eq!(t.center, Vec2::new(5.0, 0.0));
        assert_eq!(t.length, 10.0);
        assert_eq!(t.direction, Vec2::X);
        assert_eq!(t.orientation, Quat::IDENTITY);
    }

    #[test]
    fn vertical_segment_rotates_quarter_turn() {
        let t = RenderTransform::from_endpoints(Vec2::ZERO, Vec2::new(0.0, 10.0), 1.0, 0.3);
        assert!(close(t.center, Vec2::new(0.0, 5.0)));
        assert!((t.length - 10.0).abs() < EPS);
        let rotated = t.orientation * Vec3::X;
        assert!((rotated - Vec3::Y).length() < EPS, "got {rotated}");
        let expected = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        assert!(t.orientation.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn diagonal_segment_length_and_center() {
        let t = RenderTransform::from_endpoints(Vec2::new(-3.0, -4.0), Vec2::new(3.0, 4.0), 1.0, 0.3);
        assert!((t.length - 10.0).abs() < EPS);
        assert!(close(t.center, Vec2::ZERO));
    }

    #[test]
    fn scale_is_applied_before_geometry() {
        let t = RenderTransform::from_endpoints(Vec2::new(1.0, 0.0), Vec2::new(4.0, 0.0), 2.0, 0.3);
        assert!((t.length - 6.0).abs() < EPS);
        assert!(close(t.center, Vec2::new(5.0, 0.0)));
    }

    #[test]
    fn zero_length_segment_is_finite() {
        let p = Vec2::new(2.5, -7.0);
        let t = RenderTransform::from_endpoints(p, p, 1.0, 0.3);
        assert_eq!(t.center, p);
        assert_eq!(t.length, 0.0);
        assert_eq!(t.orientation, Quat::IDENTITY);
        assert_eq!(t.direction, Vec2::X);
        assert!(t.is_finite());
    }

    #[test]
    fn reversed_segment_turns_half_way_in_plane() {
        let t = RenderTransform::from_endpoints(Vec2::new(10.0, 0.0), Vec2::ZERO, 1.0, 0.3);
        let rotated = t.orientation * Vec3::X;
        assert!((rotated - Vec3::NEG_X).length() < EPS, "got {rotated}");
        let z_axis = t.orientation * Vec3::Z;
        assert!((z_axis - Vec3::Z).length() < EPS, "rotation must stay about +Z");
    }

    #[test]
    fn corners_span_segment() {
        let t = RenderTransform::from_endpoints(Vec2::ZERO, Vec2::new(10.0, 0.0), 1.0, 0.3);
        let [bl, br, tl, tr] = t.corners();
        assert!(close(bl, Vec2::new(0.0, -0.15)));
        assert!(close(br, Vec2::new(10.0, -0.15)));
        assert!(close(tl, Vec2::new(0.0, 0.15)));
        assert!(close(tr, Vec2::new(10.0, 0.15)));
    }

    #[test]
    fn stepwise_composition_matches_closed_form() {
        let t = RenderTransform::from_endpoints(Vec2::new(-2.0, 1.0), Vec2::new(5.0, 6.0), 1.5, 0.3);
        let stepwise = Mat4::IDENTITY
            * Mat4::from_translation(t.center.extend(0.0))
            * Mat4::from_quat(t.orientation)
            * Mat4::from_scale(Vec3::new(t.length, 0.3, 1.0));
        assert!(stepwise.abs_diff_eq(t.model, EPS));
    }

    #[test]
    fn mvp_is_proj_view_times_model() {
        let t = RenderTransform::from_endpoints(Vec2::ZERO, Vec2::new(3.0, 4.0), 1.0, 0.3);
        let pv = Mat4::orthographic_rh(-30.0, 30.0, -30.0, 30.0, 0.0, 2.0);
        assert_eq!(t.mvp(&pv), pv * t.model);
        assert_eq!(t.mvp(&Mat4::IDENTITY), t.model);
    }

    #[test]
    fn midpoint_handles_either_order() {
        assert_eq!(midpoint(1.0, 3.0), 2.0);
        assert_eq!(midpoint(3.0, 1.0), 2.0);
        assert_eq!(midpoint(-4.0, -4.0), -4.0);
    }
}

use crate::lerp;
use crate::ray::Ray;
use crate::vector::Vector;

/// A camera for generating pixel rays.
///
/// The viewport is the virtual rectangle at `focal_length` through which all
/// rays pass: `-viewport_width < x < viewport_width` and
/// `-viewport_height < y < viewport_height`.
///
/// Screen conventions: +x is screen-right, +y is screen-down, +z is into the
/// screen. Rendered images mirror or flip if this orientation changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Camera {
    pub viewport_height: f64,
    pub viewport_width: f64,
    pub focal_length: f64,

    /// Where rays originate.
    pub location: Vector,
}

impl Camera {
    pub fn new(viewport_height: f64, viewport_width: f64,
        focal_length: f64) -> Camera {
        Camera {
            viewport_height,
            viewport_width,
            focal_length,
            location: Vector::zero(),
        }
    }

    /// The world-space ray through normalized viewport coordinates `(u, v)`.
    ///
    /// `u` and `v` range over `[0, 1]`; `u` maps to horizontal, `v` to
    /// vertical. The returned direction is not normalized.
    pub fn ray_at(&self, u: f64, v: f64) -> Ray {
        let x = lerp(-self.viewport_width, self.viewport_width, u);
        let y = lerp(-self.viewport_height, self.viewport_height, v);
        let z = self.focal_length;

        Ray::new(self.location, Vector::new(x, y, z))
    }
}

/* Tests */

#[test]
fn ray_through_center() {
    let c = Camera::new(2.0, 2.0 * 16.0 / 9.0, 1.0);
    let r = c.ray_at(0.5, 0.5);

    assert_eq!(r.origin, Vector::zero());
    assert_eq!(r.direction, Vector::new(0.0, 0.0, 1.0));
}

#[test]
fn ray_through_corners() {
    let c = Camera::new(2.0, 2.0 * 16.0 / 9.0, 1.0);

    // (u, v) = (0, 0) is the top-left of the screen: x and y both at their
    // negative extremes
    let top_left = c.ray_at(0.0, 0.0);
    assert_eq!(top_left.direction,
        Vector::new(-2.0 * 16.0 / 9.0, -2.0, 1.0));

    let bottom_right = c.ray_at(1.0, 1.0);
    assert_eq!(bottom_right.direction,
        Vector::new(2.0 * 16.0 / 9.0, 2.0, 1.0));
}

#[test]
fn ray_from_moved_camera() {
    let mut c = Camera::new(1.0, 1.0, 1.0);
    c.location = Vector::new(0.0, 0.0, -5.0);

    let r = c.ray_at(0.5, 0.5);
    assert_eq!(r.origin, Vector::new(0.0, 0.0, -5.0));
    assert_eq!(r.direction, Vector::new(0.0, 0.0, 1.0));
}

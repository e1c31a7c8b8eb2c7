pub mod vector;
pub mod ray;
pub mod color;
pub mod camera;

pub mod surface;
pub mod shade;
pub mod scene;

pub mod partition;
pub mod framebuffer;
pub mod ppm;
pub mod sink;
pub mod render;

pub mod consts;

use crate::consts::FEQ_EPSILON;

pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}

/// The linear interpolation of `t` between `a` and `b`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

#[test]
fn lerp_endpoints() {
    assert_eq!(lerp(-2.0, 2.0, 0.0), -2.0);
    assert_eq!(lerp(-2.0, 2.0, 1.0), 2.0);
    assert_eq!(lerp(-2.0, 2.0, 0.5), 0.0);
}

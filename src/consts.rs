// Runtime parameters
pub const IMAGE_HEIGHT: usize = 711;
pub const ASPECT_RATIO: f64 = 16.0 / 9.0;
pub const SAMPLES_PER_PIXEL: u32 = 100;
pub const OUT_FILE: &'static str = "./out.ppm";

// The maximum value for a single color channel
pub const CMAX: u32 = 255;

// Camera defaults: the viewport spans -2 < y < 2 at the focal plane,
// with x fixed by the aspect ratio
pub const VIEWPORT_HEIGHT: f64 = 2.0;
pub const FOCAL_LENGTH: f64 = 1.0;

// The placeholder color pre-allocated file records start out with
pub const CANVAS_RGB: [u8; 3] = [180, 255, 200];

// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

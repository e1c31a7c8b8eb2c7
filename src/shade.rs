use rand::Rng;
use rand::distributions::{ Distribution, Uniform };

use crate::lerp;
use crate::camera::Camera;
use crate::color::Color;
use crate::ray::Ray;
use crate::surface::{ Surface, nearest_hit };
use crate::vector::Vector;

/// The sky color for a ray that hits nothing.
///
/// A vertical gradient: rays pointing further down-screen blend from
/// `(0.5, 0.7, 1.0)` toward white. The blend parameter depends only on the
/// direction of the ray, not its magnitude.
pub fn background_color(ray: &Ray) -> Color {
    let t = 0.5 * ray.direction.dy / ray.direction.length();

    Color::rgb(
        lerp(0.5, 1.0, t),
        lerp(0.7, 1.0, t),
        1.0,
    )
}

/// Remaps a unit normal into color space, component-wise from [-1, 1] to
/// [0, 1].
fn normal_color(normal: &Vector) -> Color {
    Color::rgb(
        0.5 * (1.0 + normal.dx),
        0.5 * (1.0 + normal.dy),
        0.5 * (1.0 + normal.dz),
    )
}

/// The per-pixel antialiasing sampler.
///
/// Casts `samples_per_pixel` independently jittered rays through each pixel
/// and averages the surface hits. The jitter switch exists so fixture tests
/// can pin rays to exact pixel centers.
#[derive(Copy, Clone, Debug)]
pub struct Sampler {
    pub samples_per_pixel: u32,
    jitter: bool,
}

impl Sampler {
    pub fn new(samples_per_pixel: u32) -> Sampler {
        Sampler { samples_per_pixel, jitter: true }
    }

    /// A sampler that always fires through the exact pixel coordinate.
    pub fn without_jitter(samples_per_pixel: u32) -> Sampler {
        Sampler { samples_per_pixel, jitter: false }
    }

    /// Resolves the final color of one pixel.
    ///
    /// Each sample jitters the pixel coordinate by `U(-0.5, 0.5)` in both
    /// axes, maps it to viewport coordinates (`u` divides by `width - 1`,
    /// `v` by `height` -- an asymmetry kept for compatibility with existing
    /// renders), and casts the camera ray.
    ///
    /// Samples that hit geometry accumulate the remapped surface normal;
    /// samples that miss contribute nothing to the average. If every sample
    /// misses, the pixel is the first sample's background color. Partial
    /// coverage is therefore averaged against black rather than against the
    /// background.
    pub fn pixel_color<R: Rng>(&self, surfaces: &[Surface], camera: &Camera,
        row: usize, col: usize, width: usize, height: usize, rng: &mut R)
        -> Color {
        let jitter_dist = Uniform::new(-0.5, 0.5);

        let mut accumulated = Color::black();
        let mut background = Color::black();
        let mut hit_any = false;

        for sample in 0..self.samples_per_pixel {
            let (du, dv) = if self.jitter {
                (jitter_dist.sample(rng), jitter_dist.sample(rng))
            } else {
                (0.0, 0.0)
            };

            let u = (col as f64 + du) / (width - 1) as f64;
            let v = (row as f64 + dv) / height as f64;
            let ray = camera.ray_at(u, v);

            if sample == 0 {
                background = background_color(&ray);
            }

            if let Some(record) = nearest_hit(surfaces, &ray) {
                hit_any = true;
                accumulated += normal_color(&record.normal);
            }
        }

        if hit_any {
            accumulated / self.samples_per_pixel as f64
        } else {
            background
        }
    }
}

/* Tests */

#[cfg(test)]
fn test_camera() -> Camera {
    Camera::new(2.0, 2.0 * 16.0 / 9.0, 1.0)
}

#[cfg(test)]
fn test_scene() -> Vec<Surface> {
    vec![Surface::sphere(Vector::new(0.0, 0.0, 1.0), 0.5)]
}

#[cfg(test)]
fn test_rng() -> rand::rngs::StdRng {
    use rand::SeedableRng;
    rand::rngs::StdRng::seed_from_u64(0)
}

#[test]
fn background_level_ray() {
    let r = Ray::new(Vector::zero(), Vector::new(0.0, 0.0, 1.0));

    assert_eq!(background_color(&r), Color::rgb(0.5, 0.7, 1.0));
}

#[test]
fn background_down_screen_ray() {
    let r = Ray::new(Vector::zero(), Vector::new(0.0, 1.0, 1.0));

    // t = 0.5 / sqrt(2)
    let t = 0.5 / 2.0f64.sqrt();
    assert_eq!(background_color(&r),
        Color::rgb(0.5 + 0.5 * t, 0.7 + 0.3 * t, 1.0));
}

#[test]
fn background_ignores_direction_magnitude() {
    let r1 = Ray::new(Vector::zero(), Vector::new(1.0, -2.0, 1.0));
    let r2 = Ray::new(Vector::zero(), Vector::new(10.0, -20.0, 10.0));

    assert_eq!(background_color(&r1), background_color(&r2));
}

#[test]
fn center_pixel_hits_sphere() {
    // On a 5x4 grid, pixel (2, 2) maps to (u, v) = (0.5, 0.5): a ray
    // straight down +z into the sphere. Front hit normal is (0, 0, -1).
    let sampler = Sampler::without_jitter(1);

    let color = sampler.pixel_color(
        &test_scene(), &test_camera(), 2, 2, 5, 4, &mut test_rng());

    assert_eq!(color, Color::rgb(0.5, 0.5, 0.0));
}

#[test]
fn miss_pixel_gets_background() {
    let sampler = Sampler::without_jitter(1);

    let color = sampler.pixel_color(
        &test_scene(), &test_camera(), 0, 0, 5, 4, &mut test_rng());

    // Corner ray direction is (-2 * 16/9, -2, 1)
    let expected = background_color(&test_camera().ray_at(0.0, 0.0));
    assert_eq!(color, expected);
}

#[test]
fn averaging_identical_samples_is_stable() {
    let one = Sampler::without_jitter(1);
    let many = Sampler::without_jitter(16);
    let mut rng = test_rng();

    let scene = test_scene();
    let camera = test_camera();

    assert_eq!(
        one.pixel_color(&scene, &camera, 2, 2, 5, 4, &mut rng),
        many.pixel_color(&scene, &camera, 2, 2, 5, 4, &mut rng),
    );
}

#[test]
fn jittered_sampling_is_reproducible_per_seed() {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    let sampler = Sampler::new(32);
    let scene = test_scene();
    let camera = test_camera();

    let mut rng1 = StdRng::seed_from_u64(7);
    let mut rng2 = StdRng::seed_from_u64(7);

    let c1 = sampler.pixel_color(&scene, &camera, 2, 2, 5, 4, &mut rng1);
    let c2 = sampler.pixel_color(&scene, &camera, 2, 2, 5, 4, &mut rng2);

    assert_eq!(c1.to_bytes(), c2.to_bytes());
}

use crate::ray::Ray;
use crate::vector::Vector;

/// A reported ray-surface intersection.
///
/// Parameter `t` is analogous to `t` for a ray (the offset from the ray
/// origin), so `ray.at(t)` is where the hit occurs. The normal points
/// outward from the surface at the hit point and has unit length.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitRecord {
    pub t: f64,
    pub normal: Vector,
}

/// A sphere in 3D space, described by its center and radius.
///
/// Created once at scene-setup time and immutable afterwards, so it can be
/// shared read-only across worker threads.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vector,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Vector, radius: f64) -> Sphere {
        Sphere { center, radius }
    }

    /// Checks whether a ray intersects this sphere within `[t_min, t_max]`.
    ///
    /// General equation for a sphere: `(P - C) . (P - C) = r^2`. Expanding
    /// `P` to the ray equation `A + t*B` gives a quadratic in `t`:
    ///
    /// `(B.B)t^2 + 2(B.(A - C))t + ((A-C).(A-C) - r^2) = 0`
    ///
    /// A root is valid iff `t_min <= root <= t_max`; when both roots are
    /// valid the smaller (nearest along the ray) wins. A root outside the
    /// window is discarded even if it is the only mathematical solution --
    /// the window is how callers shrink the search to hits nearer than ones
    /// already found.
    pub fn check_hit(&self, ray: &Ray, t_min: f64, t_max: f64)
        -> Option<HitRecord> {
        // (A - C) in the equation above
        let ca = ray.origin - self.center;
        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * ca.dot(&ray.direction);
        let c = ca.dot(&ca) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        let root1 = (-b - sqrtd) / (2.0 * a);
        let root2 = (-b + sqrtd) / (2.0 * a);

        // Either or both of the roots could fall outside the range; when
        // both are inside, report the nearer one
        let root1_in_range = root1 >= t_min && root1 <= t_max;
        let root2_in_range = root2 >= t_min && root2 <= t_max;
        let t = if root1_in_range && root2_in_range {
            root1.min(root2)
        } else if root1_in_range {
            root1
        } else if root2_in_range {
            root2
        } else {
            return None;
        };

        // Outward-pointing by construction: the sphere is convex and the
        // radius is positive
        let normal = (ray.at(t) - self.center).unit();

        Some(HitRecord { t, normal })
    }
}

/// An analytic surface a ray can hit.
///
/// A closed variant rather than a trait object: intersection dispatches with
/// a single `match`, and new surface kinds extend the enum.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Surface {
    Sphere(Sphere),
}

impl Surface {
    pub fn sphere(center: Vector, radius: f64) -> Surface {
        Surface::Sphere(Sphere::new(center, radius))
    }

    pub fn check_hit(&self, ray: &Ray, t_min: f64, t_max: f64)
        -> Option<HitRecord> {
        match self {
            Surface::Sphere(sphere) => sphere.check_hit(ray, t_min, t_max),
        }
    }
}

/// Scans every surface and reports the nearest hit along the ray, if any.
///
/// Keeps a running `max_t`, shrinking it to each hit found so far, so the
/// final record belongs to the nearest surface rather than the first one
/// tested.
pub fn nearest_hit(surfaces: &[Surface], ray: &Ray) -> Option<HitRecord> {
    let mut max_t = f64::INFINITY;
    let mut nearest = None;

    for surface in surfaces {
        if let Some(record) = surface.check_hit(ray, 0.0, max_t) {
            max_t = record.t;
            nearest = Some(record);
        }
    }

    nearest
}

/* Tests */

#[cfg(test)]
fn z_ray() -> Ray {
    Ray::new(Vector::zero(), Vector::new(0.0, 0.0, 1.0))
}

#[test]
fn hit_reports_point_on_sphere() {
    let s = Sphere::new(Vector::new(0.0, 0.0, 3.0), 1.0);
    let r = z_ray();

    // Near root first...
    let near = s.check_hit(&r, 0.0, f64::INFINITY).unwrap();
    assert!(((r.at(near.t) - s.center).length() - 1.0).abs() < 1e-9);
    assert_eq!(near.t, 2.0);

    // ...and the far root when the range excludes the near one
    let far = s.check_hit(&r, 3.0, f64::INFINITY).unwrap();
    assert!(((r.at(far.t) - s.center).length() - 1.0).abs() < 1e-9);
    assert_eq!(far.t, 4.0);
}

#[test]
fn range_policy_both_roots_valid() {
    // Roots at t = 2 and t = 4
    let s = Sphere::new(Vector::new(0.0, 0.0, 3.0), 1.0);
    let hit = s.check_hit(&z_ray(), 0.0, 5.0).unwrap();

    assert_eq!(hit.t, 2.0);
}

#[test]
fn range_policy_one_root_valid() {
    // Roots at t = -1 and t = 2 (ray origin inside the sphere)
    let s = Sphere::new(Vector::new(0.0, 0.0, 0.5), 1.5);
    let hit = s.check_hit(&z_ray(), 0.0, 5.0).unwrap();

    assert_eq!(hit.t, 2.0);
}

#[test]
fn range_policy_no_root_valid() {
    // Roots at t = -3 and t = -1 (sphere entirely behind the ray)
    let s = Sphere::new(Vector::new(0.0, 0.0, -2.0), 1.0);

    assert_eq!(s.check_hit(&z_ray(), 0.0, 5.0), None);
}

#[test]
fn range_window_excludes_mathematical_roots() {
    // Roots at t = 2 and t = 4, both outside [0, 1]
    let s = Sphere::new(Vector::new(0.0, 0.0, 3.0), 1.0);

    assert_eq!(s.check_hit(&z_ray(), 0.0, 1.0), None);
}

#[test]
fn miss_reports_nothing() {
    let s = Sphere::new(Vector::new(5.0, 5.0, 5.0), 0.5);

    assert_eq!(s.check_hit(&z_ray(), 0.0, f64::INFINITY), None);
}

#[test]
fn normal_is_unit_length() {
    let s = Sphere::new(Vector::new(0.3, -0.2, 4.0), 1.7);
    let r = Ray::new(Vector::zero(), Vector::new(0.1, -0.05, 1.0));

    let hit = s.check_hit(&r, 0.0, f64::INFINITY).unwrap();
    assert!((hit.normal.length() - 1.0).abs() < 1e-9);
}

#[test]
fn normal_points_outward() {
    let s = Sphere::new(Vector::new(0.0, 0.0, 2.0), 1.0);
    let hit = s.check_hit(&z_ray(), 0.0, f64::INFINITY).unwrap();

    // Front hit at (0, 0, 1); the outward normal faces back at the camera
    assert_eq!(hit.normal, Vector::new(0.0, 0.0, -1.0));
}

#[test]
fn intersection_with_unnormalized_direction() {
    // Doubling the direction halves every t, but the hit point stays put
    let s = Sphere::new(Vector::new(0.0, 0.0, 3.0), 1.0);
    let r = Ray::new(Vector::zero(), Vector::new(0.0, 0.0, 2.0));

    let hit = s.check_hit(&r, 0.0, f64::INFINITY).unwrap();
    assert_eq!(hit.t, 1.0);
    assert_eq!(r.at(hit.t), Vector::new(0.0, 0.0, 2.0));
}

#[test]
fn nearest_hit_across_surfaces() {
    // Listed farthest-first to make sure ordering doesn't matter
    let surfaces = vec![
        Surface::sphere(Vector::new(0.0, 0.0, 10.0), 1.0),
        Surface::sphere(Vector::new(0.0, 0.0, 3.0), 1.0),
    ];

    let hit = nearest_hit(&surfaces, &z_ray()).unwrap();
    assert_eq!(hit.t, 2.0);
}

#[test]
fn nearest_hit_empty_scene() {
    assert_eq!(nearest_hit(&[], &z_ray()), None);
}

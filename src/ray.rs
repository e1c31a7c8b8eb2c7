use crate::vector::Vector;

/// A ray fired from `origin` along `direction`.
///
/// The direction is not required to be a unit vector; everything downstream
/// stays correct for any nonzero magnitude.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    pub origin: Vector,
    pub direction: Vector,
}

impl Ray {
    pub fn new(origin: Vector, direction: Vector) -> Ray {
        Ray { origin, direction }
    }

    /// The point `origin + t * direction` along the ray.
    pub fn at(&self, t: f64) -> Vector {
        self.origin + (t * self.direction)
    }
}

#[test]
fn ray_at() {
    let r = Ray::new(
                Vector::new(2.0, 3.0, 4.0),
                Vector::new(1.0, 0.0, 0.0)
            );

    assert_eq!(r.at(0.0), Vector::new(2.0, 3.0, 4.0));
    assert_eq!(r.at(1.0), Vector::new(3.0, 3.0, 4.0));
    assert_eq!(r.at(-1.0), Vector::new(1.0, 3.0, 4.0));
    assert_eq!(r.at(2.5), Vector::new(4.5, 3.0, 4.0));
}

#[test]
fn ray_at_unnormalized_direction() {
    let r = Ray::new(
                Vector::new(0.0, 0.0, 0.0),
                Vector::new(0.0, 0.0, 4.0)
            );

    // `t` is the ray parameter, not a distance
    assert_eq!(r.at(0.5), Vector::new(0.0, 0.0, 2.0));
}

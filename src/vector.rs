use std::ops::{ Add, Sub, Neg, Mul, Div };

use crate::feq;

/// A displacement in 3D space.
///
/// Every operation returns a new `Vector`; the components of an existing
/// vector are never mutated in place.
#[derive(Debug, Default, Copy, Clone, PartialOrd)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64
}

impl PartialEq for Vector {
    fn eq(&self, other: &Vector) -> bool {
        feq(self.dx, other.dx) &&
            feq(self.dy, other.dy) &&
            feq(self.dz, other.dz)
    }
}

impl Vector {
    pub fn new(dx: f64, dy: f64, dz: f64) -> Vector {
        Vector { dx, dy, dz }
    }

    pub fn zero() -> Vector {
        Vector { dx: 0.0, dy: 0.0, dz: 0.0 }
    }

    /// The Euclidean length of the vector.
    pub fn length(&self) -> f64 {
        f64::sqrt(
            self.dx.powi(2)
            + self.dy.powi(2)
            + self.dz.powi(2)
        )
    }

    /// Scales the vector to unit length. The direction is unchanged.
    pub fn unit(&self) -> Vector {
        let len = self.length();

        Vector {
            dx: self.dx / len,
            dy: self.dy / len,
            dz: self.dz / len,
        }
    }

    pub fn dot(&self, other: &Vector) -> f64 {
        self.dx * other.dx
            + self.dy * other.dy
            + self.dz * other.dz
    }
}

/// Conversion from a float list to a `Vector`.
///
/// Takes the first three elements as `dx`, `dy` and `dz`, in that order.
/// Missing elements default to zero, so short lists in a scene description
/// still produce a usable vector.
impl From<&Vec<f64>> for Vector {
    fn from(v: &Vec<f64>) -> Vector {
        match v.len() {
            0 => Default::default(),
            1 => Vector { dx: v[0], ..Default::default() },
            2 => Vector { dx: v[0], dy: v[1], ..Default::default() },
            _ => Vector { dx: v[0], dy: v[1], dz: v[2] }
        }
    }
}

impl Add for Vector {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            dx: self.dx + other.dx,
            dy: self.dy + other.dy,
            dz: self.dz + other.dz
        }
    }
}

impl Sub for Vector {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            dx: self.dx - other.dx,
            dy: self.dy - other.dy,
            dz: self.dz - other.dz
        }
    }
}

impl Neg for Vector {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            dx: -self.dx,
            dy: -self.dy,
            dz: -self.dz
        }
    }
}

/// Implements scalar right-multiplication for a vector.
impl Mul<f64> for Vector {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            dx: self.dx * other,
            dy: self.dy * other,
            dz: self.dz * other
        }
    }
}

/// Implements scalar left-multiplication for a vector.
impl Mul<Vector> for f64 {
    type Output = Vector;

    fn mul(self, other: Vector) -> Vector {
        Vector {
            dx: self * other.dx,
            dy: self * other.dy,
            dz: self * other.dz
        }
    }
}

impl Div<f64> for Vector {
    type Output = Self;

    fn div(self, other: f64) -> Self {
        Self {
            dx: self.dx / other,
            dy: self.dy / other,
            dz: self.dz / other
        }
    }
}

/* Tests */

#[test]
fn add_vectors() {
    let a = Vector::new(3.0, -2.0, 5.0);
    let b = Vector::new(-2.0, 3.0, 1.0);

    assert_eq!(a + b, Vector::new(1.0, 1.0, 6.0));
}

#[test]
fn sub_vectors() {
    let a = Vector::new(3.0, 2.0, 1.0);
    let b = Vector::new(5.0, 6.0, 7.0);

    assert_eq!(a - b, Vector::new(-2.0, -4.0, -6.0));
}

#[test]
fn neg_vector() {
    let a = Vector::new(1.0, -2.0, 3.0);

    assert_eq!(-a, Vector::new(-1.0, 2.0, -3.0));
}

#[test]
fn mul_scalar() {
    let a = Vector::new(1.0, -2.0, 3.0);

    assert_eq!(a * 3.5, Vector::new(3.5, -7.0, 10.5));
    assert_eq!(3.5 * a, Vector::new(3.5, -7.0, 10.5));
}

#[test]
fn div_scalar() {
    let a = Vector::new(1.0, -2.0, 3.0);

    assert_eq!(a / 2.0, Vector::new(0.5, -1.0, 1.5));
}

#[test]
fn length_pos() {
    let v = Vector::new(1.0, 2.0, 3.0);

    assert_eq!(v.length(), f64::sqrt(14.0));
}

#[test]
fn length_neg() {
    let v = Vector::new(-1.0, -2.0, -3.0);

    assert_eq!(v.length(), f64::sqrt(14.0));
}

#[test]
fn unit_clean() {
    let v = Vector::new(4.0, 0.0, 0.0);

    assert_eq!(v.unit(), Vector::new(1.0, 0.0, 0.0));
}

#[test]
fn unit_length_invariant() {
    let vectors = [
        Vector::new(1.0, 2.0, 3.0),
        Vector::new(-0.3, 100.0, 0.002),
        Vector::new(0.0, 0.0, 7.0),
    ];

    for v in vectors.iter() {
        assert!((v.unit().length() - 1.0).abs() < 1e-12);
    }
}

#[test]
fn dot_vectors() {
    let a = Vector::new(1.0, 2.0, 3.0);
    let b = Vector::new(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
}

use std::ops::{ Add, AddAssign, Mul, Div };

use crate::feq;
use crate::consts::CMAX;

/// A color.
///
/// Represented conventionally with red-green-blue (RGB) values. Each value
/// ranges from 0.0 to 1.0 inclusive while shading accumulates; conversion to
/// the 0-255 byte range happens only at the sink boundary, via `to_bytes`.
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

/// Partial equality on two colors.
///
/// Colors are compared component-wise, accounting for possible floating
/// point error in comparisons.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.red, other.red) &&
            feq(self.green, other.green) &&
            feq(self.blue, other.blue)
    }
}

impl Color {
    /// Creates a color with red, green and blue values.
    pub fn rgb(red: f64, green: f64, blue: f64) -> Color {
        Color { red, green, blue }
    }

    /// The color black.
    pub fn black() -> Color {
        Color {
            red: 0.0,
            green: 0.0,
            blue: 0.0
        }
    }

    /// Creates a color from channel values already in the 0-255 range.
    pub fn from_bytes(red: u8, green: u8, blue: u8) -> Color {
        Color {
            red: red as f64 / CMAX as f64,
            green: green as f64 / CMAX as f64,
            blue: blue as f64 / CMAX as f64,
        }
    }

    /// Scales each channel to 0-255, rounding and clamping.
    ///
    /// Every persisted write goes through this conversion, so no sink ever
    /// sees a channel outside the byte range.
    pub fn to_bytes(&self) -> [u8; 3] {
        [
            (self.red * CMAX as f64).round().clamp(0.0, CMAX as f64) as u8,
            (self.green * CMAX as f64).round().clamp(0.0, CMAX as f64) as u8,
            (self.blue * CMAX as f64).round().clamp(0.0, CMAX as f64) as u8,
        ]
    }
}

/// Adds two colors together.
///
/// Components are added together individually.
impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color {
            red: self.red + other.red,
            green: self.green + other.green,
            blue: self.blue + other.blue,
        }
    }
}

impl AddAssign<Color> for Color {
    fn add_assign(&mut self, other: Color) {
        self.red += other.red;
        self.green += other.green;
        self.blue += other.blue;
    }
}

/// Multiplies a color by a scalar.
///
/// Each component is multiplied by the scalar.
impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Self::Output {
        Color {
            red: self.red * other,
            green: self.green * other,
            blue: self.blue * other,
        }
    }
}

/// Divides a color by a scalar, channel-wise.
///
/// This is how a multi-sample accumulator turns back into an average.
impl Div<f64> for Color {
    type Output = Color;

    fn div(self, other: f64) -> Self::Output {
        Color {
            red: self.red / other,
            green: self.green / other,
            blue: self.blue / other,
        }
    }
}

/* Tests */

#[test]
fn add_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);
    let c3 = Color { red: 1.6, green: 0.7, blue: 1.0 };

    assert_eq!(c1 + c2, c3);
}

#[test]
fn add_assign_colors() {
    let mut c = Color::black();
    c += Color::rgb(0.25, 0.5, 0.75);
    c += Color::rgb(0.25, 0.0, 0.25);

    assert_eq!(c, Color::rgb(0.5, 0.5, 1.0));
}

#[test]
fn scale_color() {
    let c = Color::rgb(0.2, 0.3, 0.4);

    assert_eq!(c * 2.0, Color::rgb(0.4, 0.6, 0.8));
    assert_eq!(c / 2.0, Color::rgb(0.1, 0.15, 0.2));
}

#[test]
fn bytes_round() {
    let c = Color::rgb(0.5, 0.7, 1.0);

    // 127.5 rounds away from zero
    assert_eq!(c.to_bytes(), [128, 179, 255]);
}

#[test]
fn bytes_clamp() {
    let c = Color::rgb(-0.25, 1.5, 0.0);

    assert_eq!(c.to_bytes(), [0, 255, 0]);
}

#[test]
fn bytes_round_trip() {
    let c = Color::from_bytes(180, 255, 200);

    assert_eq!(c.to_bytes(), [180, 255, 200]);
}

//! Color gradients over normalized values.
//!
//! A [`Gradient`] maps a value in [0, 1] (as produced by a scale's
//! `normalize`) to a color. Any `Fn(f64) -> Rgba` is a gradient, so renderers
//! can plug in their own color policy.

use serde::{Deserialize, Serialize};

/// Color with channels in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// 8-bit channels, rounded.
    pub fn to_bytes(&self) -> [u8; 4] {
        let byte = |v: f64| (255.0 * v.clamp(0.0, 1.0)).round() as u8;
        [byte(self.r), byte(self.g), byte(self.b), byte(self.a)]
    }

    /// `#rrggbbaa` hex string.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_bytes();
        format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
    }
}

/// Maps a normalized value to a color.
pub trait Gradient {
    fn color(&self, value: f64) -> Rgba;
}

impl<F> Gradient for F
where
    F: Fn(f64) -> Rgba,
{
    fn color(&self, value: f64) -> Rgba {
        self(value)
    }
}

/// Convert hue/saturation/lightness (all in [0, 1]) to an opaque color.
pub fn hsl_to_rgba(h: f64, s: f64, l: f64) -> Rgba {
    if s == 0.0 {
        return Rgba::new(l, l, l, 1.0);
    }
    let q = if l < 0.5 { l * (s + 1.0) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |mut t: f64| {
        if t < 0.0 {
            t += 1.0;
        } else if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + 6.0 * (q - p) * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + 6.0 * (q - p) * (2.0 / 3.0 - t)
        } else {
            p
        }
    };
    Rgba::new(
        channel(h + 1.0 / 3.0),
        channel(h),
        channel(h - 1.0 / 3.0),
        1.0,
    )
}

/// Blue at 0, green at 0.5, red at 1.
pub fn default_gradient(value: f64) -> Rgba {
    let h = if value < 0.0 {
        2.0 / 3.0
    } else if value >= 1.0 {
        0.0
    } else {
        2.0 * (1.0 - value) / 3.0
    };
    hsl_to_rgba(h, 1.0, 0.5)
}

/// Like [`default_gradient`] but piecewise around an exact green at 0.5,
/// for zero-centered scales.
pub fn bilinear_gradient(value: f64) -> Rgba {
    let h = if value < 0.0 {
        2.0 / 3.0
    } else if value < 0.5 {
        (6.0 - 4.0 * value) / 9.0
    } else if value == 0.5 {
        1.0 / 3.0
    } else if value < 1.0 {
        (4.0 - 4.0 * value) / 9.0
    } else {
        0.0
    };
    hsl_to_rgba(h, 1.0, 0.5)
}

/// Black at 0, white at 1.
pub fn grayscale_gradient(value: f64) -> Rgba {
    let v = value.clamp(0.0, 1.0);
    Rgba::new(v, v, v, 1.0)
}

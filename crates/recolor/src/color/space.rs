//! Perceptual color distance in CIE LAB.
//!
//! Palette derivation picks the target color a page color *looks* closest
//! to. LAB is perceptually uniform: equal numerical distances correspond to
//! equal perceived differences, so a plain Euclidean distance (CIE76 ΔE)
//! between two LAB points is a usable nearness measure. RGB distance is not.

use super::Rgba;

/// CIE LAB color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

/// D65 reference white point for CIE XYZ → LAB conversion.
const XN: f64 = 0.95047;
const YN: f64 = 1.00000;
const ZN: f64 = 1.08883;

/// Convert an sRGB component (0–255) to linear light (0.0–1.0).
fn srgb_to_linear(c: f64) -> f64 {
    let c = c.clamp(0.0, 255.0) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// LAB forward transform helper.
fn lab_f(t: f64) -> f64 {
    if t > 0.008856 {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

impl Lab {
    /// Converts the RGB channels of `color` to LAB via XYZ (D65). Alpha is ignored.
    pub fn from_rgba(color: &Rgba) -> Self {
        let r = srgb_to_linear(color.r);
        let g = srgb_to_linear(color.g);
        let b = srgb_to_linear(color.b);

        let x = 0.4124564 * r + 0.3575761 * g + 0.1804375 * b;
        let y = 0.2126729 * r + 0.7151522 * g + 0.0721750 * b;
        let z = 0.0193339 * r + 0.1191920 * g + 0.9503041 * b;

        let fx = lab_f(x / XN);
        let fy = lab_f(y / YN);
        let fz = lab_f(z / ZN);

        Lab {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }

    /// CIE76 color difference.
    pub fn delta_e(&self, other: &Lab) -> f64 {
        ((self.l - other.l).powi(2) + (self.a - other.a).powi(2) + (self.b - other.b).powi(2))
            .sqrt()
    }
}

/// Index of the color in `candidates` perceptually closest to `color`.
///
/// Ties go to the earliest candidate. Returns `None` for an empty slice.
pub fn nearest(color: &Rgba, candidates: &[Rgba]) -> Option<usize> {
    let lab = Lab::from_rgba(color);
    candidates
        .iter()
        .map(|c| lab.delta_e(&Lab::from_rgba(c)))
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}

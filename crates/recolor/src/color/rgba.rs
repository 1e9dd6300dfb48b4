//! RGBA quadruples and CSS color-token parsing.
//!
//! Supports the token forms the [`ColorMatcher`](super::ColorMatcher) finds:
//!
//! - Hex: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`
//! - Functional: `rgb()`, `rgba()`, `hsl()`, `hsla()` (comma or space separated,
//!   with an optional `/ alpha`)
//! - Named colors and `transparent`
//!
//! # Example
//!
//! ```rust
//! use recolor::Rgba;
//!
//! let red = Rgba::parse("#f00").unwrap();
//! assert_eq!(red, Rgba::new(255.0, 0.0, 0.0, 1.0));
//! assert_eq!(red.to_css(), "rgba(255,0,0,1)");
//! assert_eq!(red.to_hex(), "#ff0000");
//! ```

use std::fmt;

use super::named::lookup_named;

/// A color as red, green, blue (0–255) and alpha (0–1).
///
/// Channels are plain numbers so a transform can return fractional values;
/// [`to_css`](Self::to_css) clamps them into range when formatting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a color from a slice of 3 (opaque) or 4 channels.
    ///
    /// Returns `None` for any other length or a non-finite channel.
    pub fn from_channels(channels: &[f64]) -> Option<Self> {
        if channels.iter().any(|c| !c.is_finite()) {
            return None;
        }
        match *channels {
            [r, g, b] => Some(Self::new(r, g, b, 1.0)),
            [r, g, b, a] => Some(Self::new(r, g, b, a)),
            _ => None,
        }
    }

    pub fn channels(&self) -> [f64; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// True when red, green and blue agree, ignoring alpha.
    pub fn same_rgb(&self, other: &Rgba) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// Returns this color with a different alpha.
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Formats as the canonical functional string `rgba(r,g,b,a)`.
    pub fn to_css(&self) -> String {
        let [r, g, b, a] = self.clamped().channels();
        format!("rgba({},{},{},{})", r, g, b, a)
    }

    /// Formats the rounded RGB channels as `#rrggbb`, dropping alpha.
    pub fn to_hex(&self) -> String {
        let c = self.clamped();
        format!(
            "#{:02x}{:02x}{:02x}",
            c.r.round() as u8,
            c.g.round() as u8,
            c.b.round() as u8
        )
    }

    fn clamped(&self) -> Self {
        Self {
            r: self.r.clamp(0.0, 255.0),
            g: self.g.clamp(0.0, 255.0),
            b: self.b.clamp(0.0, 255.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }

    /// Parses a CSS color token.
    ///
    /// Matching is case-insensitive. RGB channels are rounded to integers and
    /// alpha is clamped to `[0, 1]`.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let lower = token.to_ascii_lowercase();

        if let Some(hex) = lower.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some((name, args)) = split_function(&lower) {
            return match name {
                "rgb" | "rgba" => parse_rgb_args(args),
                "hsl" | "hsla" => parse_hsl_args(args),
                _ => None,
            };
        }
        if lower == "transparent" {
            return Some(Self::TRANSPARENT);
        }
        lookup_named(&lower).map(|(r, g, b)| Self::new(r as f64, g as f64, b as f64, 1.0))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    let (r, g, b, a) = match hex.len() {
        3 => (digit(0)?, digit(1)?, digit(2)?, 255),
        4 => (digit(0)?, digit(1)?, digit(2)?, digit(3)?),
        6 => (pair(0)?, pair(2)?, pair(4)?, 255),
        8 => (pair(0)?, pair(2)?, pair(4)?, pair(6)?),
        _ => return None,
    };
    Some(Rgba::new(
        r as f64,
        g as f64,
        b as f64,
        round_alpha(a as f64 / 255.0),
    ))
}

/// Splits `name(args)` into its parts.
fn split_function(s: &str) -> Option<(&str, &str)> {
    let open = s.find('(')?;
    let inner = s[open + 1..].strip_suffix(')')?;
    Some((s[..open].trim(), inner))
}

/// Splits functional arguments into channel components and an optional alpha.
///
/// Accepts both `1, 2, 3, 0.5` and `1 2 3 / 0.5`.
fn split_args(args: &str) -> Option<(Vec<&str>, Option<&str>)> {
    let (channels, slash_alpha) = match args.split_once('/') {
        Some((channels, alpha)) => (channels, Some(alpha.trim())),
        None => (args, None),
    };
    let mut parts: Vec<&str> = if channels.contains(',') {
        channels.split(',').map(str::trim).collect()
    } else {
        channels.split_whitespace().collect()
    };

    let alpha = match (parts.len(), slash_alpha) {
        (3, alpha) => alpha,
        (4, None) => parts.pop(),
        _ => return None,
    };
    Some((parts, alpha))
}

fn parse_rgb_args(args: &str) -> Option<Rgba> {
    let (parts, alpha) = split_args(args)?;
    let mut channels = [0.0f64; 3];
    for (slot, part) in channels.iter_mut().zip(&parts) {
        let value = match part.strip_suffix('%') {
            Some(pct) => pct.trim().parse::<f64>().ok()? * 2.55,
            None => part.parse::<f64>().ok()?,
        };
        *slot = value.clamp(0.0, 255.0).round();
    }
    let a = parse_alpha(alpha)?;
    Some(Rgba::new(channels[0], channels[1], channels[2], a))
}

fn parse_hsl_args(args: &str) -> Option<Rgba> {
    let (parts, alpha) = split_args(args)?;
    let hue = parse_hue(parts[0])?;
    let saturation = parse_percentage(parts[1])?;
    let lightness = parse_percentage(parts[2])?;
    let (r, g, b) = hsl_to_rgb(hue, saturation, lightness);
    Some(Rgba::new(r, g, b, parse_alpha(alpha)?))
}

fn parse_alpha(alpha: Option<&str>) -> Option<f64> {
    let Some(alpha) = alpha else {
        return Some(1.0);
    };
    let value = match alpha.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0,
        None => alpha.parse::<f64>().ok()?,
    };
    value.is_finite().then(|| round_alpha(value.clamp(0.0, 1.0)))
}

fn round_alpha(a: f64) -> f64 {
    (a * 1000.0).round() / 1000.0
}

/// Hue in degrees, normalized to `[0, 360)`.
fn parse_hue(s: &str) -> Option<f64> {
    let (number, scale) = if let Some(n) = s.strip_suffix("deg") {
        (n, 1.0)
    } else if let Some(n) = s.strip_suffix("grad") {
        (n, 0.9)
    } else if let Some(n) = s.strip_suffix("rad") {
        (n, 180.0 / std::f64::consts::PI)
    } else if let Some(n) = s.strip_suffix("turn") {
        (n, 360.0)
    } else {
        (s, 1.0)
    };
    let degrees = number.trim().parse::<f64>().ok()? * scale;
    degrees.is_finite().then(|| degrees.rem_euclid(360.0))
}

/// A percentage as a fraction in `[0, 1]`. The `%` suffix is optional.
fn parse_percentage(s: &str) -> Option<f64> {
    let number = s.strip_suffix('%').unwrap_or(s).trim();
    let value = number.parse::<f64>().ok()?;
    value.is_finite().then(|| (value / 100.0).clamp(0.0, 1.0))
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (f64, f64, f64) {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let channel = |c: f64| ((c + m) * 255.0).round();
    (channel(r), channel(g), channel(b))
}

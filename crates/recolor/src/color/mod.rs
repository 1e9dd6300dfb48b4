//! Color recognition, parsing and palettes.
//!
//! - [`ColorMatcher`]: finds color literals in CSS text
//! - [`Rgba`]: parsed color quadruple with canonical formatting
//! - [`Palette`]: raw token → replacement mapping for one recolor call
//! - [`ColorLibrary`]: the seam to named colors and palette derivation, with
//!   [`CssColors`] as the default implementation

mod library;
mod matcher;
mod named;
mod palette;
mod rgba;
pub mod space;

pub use library::{ColorLibrary, CssColors, SwapRules};
pub use matcher::{ColorMatcher, ColorToken};
pub use named::{color_names, NAMED_COLORS};
pub use palette::Palette;
pub use rgba::Rgba;

//! # Recolor - Color-Only CSS Overlays
//!
//! `recolor` rewrites the colors of a page's stylesheets without touching the
//! stylesheets themselves. For each sheet it builds an *overlay*: a minimal
//! stylesheet holding only the color-bearing declarations, with every color
//! rewritten. Appended after the original, the overlay wins the cascade for
//! equal specificity while every non-color rule stays as it was.
//!
//! ## Core Concepts
//!
//! - [`ColorMatcher`]: recognizes color literals (hex, `rgb()`, `hsl()`, named
//!   colors, `transparent`) in CSS text
//! - [`ColorFilter`]: walks a parsed [`Stylesheet`] and keeps only color-bearing
//!   declarations, with their selectors and `@media`/`@supports`/`@keyframes`
//!   wrappers
//! - [`Sandbox`]: runs a caller-supplied color transform in an isolated
//!   expression environment
//! - [`RecolorEngine`]: parse → filter → palette → substitute, for one sheet
//! - [`SourceCollector`]: gathers a page's CSS from resident and linked sources,
//!   in page order regardless of fetch completion order
//! - [`RecolorPass`]: runs all of the above for one page into an [`OverlaySink`]
//!
//! ## Quick Start
//!
//! ```rust
//! use recolor::{Config, RecolorEngine};
//!
//! let engine = RecolorEngine::css().unwrap();
//! let config = Config::from_yaml(r##"
//! target_colors: ["#282828", "#fbf1c7"]
//! "##).unwrap();
//!
//! let css = "body { background: white; color: #111; margin: 0 }";
//! let overlay = engine.recolor(css, &config, "https://example.com/");
//! assert_eq!(overlay, "body { background:#fbf1c7;\ncolor:#282828; }");
//! ```
//!
//! ## Palettes
//!
//! A pass maps every distinct color token to a replacement in one of two ways:
//!
//! - **Target colors**: each token goes to the perceptually nearest color of
//!   `target_colors` (CIE LAB distance), keeping its alpha. Optional
//!   `swap_rules` then rewrite chosen replacements, on pages matching the swap
//!   patterns.
//! - **Transform function**: an expression mapping `r`, `g`, `b`, `a` to a new
//!   `[r, g, b, a]`, e.g. `[255 - r, 255 - g, 255 - b, a]`. When set it replaces
//!   the target-color path entirely.
//!
//! Tokens that cannot be mapped are left as they are.
//!
//! ## Whole Pages
//!
//! ```rust
//! use recolor::{Config, MapFetcher, Overlay, PageStyles, RecolorEngine, RecolorPass, Sandbox};
//!
//! # futures::executor::block_on(async {
//! let engine = RecolorEngine::css().unwrap();
//! let config = Config::default().with_transform(Sandbox::new("[255 - r, 255 - g, 255 - b, a]").unwrap());
//! let fetcher = MapFetcher::new().with("https://example.com/site.css", "h1 { color: black }");
//!
//! let page = PageStyles::new("https://example.com/")
//!     .with_resident("p { color: white; font-size: 2em }")
//!     .with_linked("site.css");
//!
//! let mut overlay = Overlay::new();
//! RecolorPass::new(&engine, &config, &fetcher).run(&page, &mut overlay).await;
//! assert_eq!(overlay.blocks(), [
//!     "p { color:rgba(0,0,0,1); }".to_string(),
//!     "h1 { color:rgba(255,255,255,1); }".to_string(),
//! ]);
//! # });
//! ```
//!
//! ## Feature Flags
//!
//! - `http`: `HttpFetcher`, a `reqwest`-backed [`Fetch`] implementation

pub mod collector;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod pass;
pub mod sandbox;
pub mod stylesheet;

pub use collector::{JoinBarrier, SourceCollector, SourceOrigin, StylesheetSource};
pub use color::{ColorLibrary, ColorMatcher, ColorToken, CssColors, Palette, Rgba, SwapRules};
pub use config::{Config, UrlPattern};
pub use engine::RecolorEngine;
pub use error::{ConfigError, FetchError, RecolorError, Result, SandboxError};
pub use fetch::{Fetch, MapFetcher};
pub use pass::{Overlay, OverlaySink, PageStyles, RecolorPass};
pub use sandbox::Sandbox;
pub use stylesheet::{
    extract_color_fragment, parse_stylesheet, resolve_imports, ColorFilter, Declaration, RuleNode,
    Stylesheet,
};

#[cfg(feature = "http")]
pub use fetch::HttpFetcher;

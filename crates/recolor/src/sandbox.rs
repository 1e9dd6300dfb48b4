//! Isolated execution of caller-supplied color transforms.
//!
//! A transform is a [MiniJinja](https://docs.rs/minijinja) expression that
//! maps one color to another:
//!
//! ```text
//! [255 - r, 255 - g, 255 - b, a]
//! ```
//!
//! Every call compiles and evaluates the expression in a fresh
//! [`Environment`] with no loader, no globals and a fuel budget. The context
//! holds only the input color:
//!
//! | Name | Value |
//! |------|-------|
//! | `r`, `g`, `b` | channels, 0–255 |
//! | `a` | alpha, 0–1 |
//! | `rgba` | `[r, g, b, a]` |
//! | `window`, `document`, `globalThis`, `this` | empty map |
//!
//! The host-object names resolve to an empty map, so `document.cookie` is
//! `undefined`. Nothing outside the expression's context is reachable, and
//! the only effect of a call is its return value.
//!
//! The result must be a list of 3 or 4 finite numbers; a 3-element list is
//! opaque.

use std::collections::BTreeMap;

use minijinja::value::{Value, ValueKind};
use minijinja::{context, Environment};
use serde::Deserialize;

use crate::color::Rgba;
use crate::error::SandboxError;

/// Instruction budget for a single transform call.
pub const DEFAULT_FUEL: u64 = 10_000;

/// A compiled-on-demand color transform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Sandbox {
    source: String,
    fuel: u64,
}

impl Sandbox {
    /// Validates `source` and wraps it.
    pub fn new(source: impl Into<String>) -> Result<Self, SandboxError> {
        let sandbox = Self {
            source: source.into(),
            fuel: DEFAULT_FUEL,
        };
        let env = sandbox.environment();
        env.compile_expression(&sandbox.source)
            .map_err(SandboxError::Compile)?;
        drop(env);
        Ok(sandbox)
    }

    /// Replaces the instruction budget.
    pub fn with_fuel(mut self, fuel: u64) -> Self {
        self.fuel = fuel;
        self
    }

    /// The expression source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Runs the transform on `color`.
    pub fn call(&self, color: Rgba) -> Result<Rgba, SandboxError> {
        let env = self.environment();
        let expr = env
            .compile_expression(&self.source)
            .map_err(SandboxError::Compile)?;
        let inert = inert_object();
        let value = expr
            .eval(context! {
                r => color.r,
                g => color.g,
                b => color.b,
                a => color.a,
                rgba => color.channels(),
                window => inert.clone(),
                document => inert.clone(),
                globalThis => inert.clone(),
                this => inert,
            })
            .map_err(SandboxError::Eval)?;
        to_rgba(&value)
    }

    fn environment<'source>(&self) -> Environment<'source> {
        let mut env = Environment::new();
        env.set_fuel(Some(self.fuel));
        env
    }
}

impl TryFrom<String> for Sandbox {
    type Error = SandboxError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Sandbox::new(source)
    }
}

fn inert_object() -> Value {
    Value::from_serialize(BTreeMap::<String, u8>::new())
}

fn to_rgba(value: &Value) -> Result<Rgba, SandboxError> {
    let shape_error = || SandboxError::Shape(value.to_string());
    if value.kind() != ValueKind::Seq {
        return Err(shape_error());
    }
    let channels = value
        .try_iter()
        .map_err(|_| shape_error())?
        .map(f64::try_from)
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|_| shape_error())?;
    Rgba::from_channels(&channels).ok_or_else(shape_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = Rgba::new(255.0, 0.0, 0.0, 1.0);

    #[test]
    fn test_invert() {
        let sandbox = Sandbox::new("[255 - r, 255 - g, 255 - b, a]").unwrap();
        assert_eq!(sandbox.call(RED).unwrap(), Rgba::new(0.0, 255.0, 255.0, 1.0));
    }

    #[test]
    fn test_three_channels_are_opaque() {
        let sandbox = Sandbox::new("[g, r, b]").unwrap();
        let out = sandbox.call(RED.with_alpha(0.5)).unwrap();
        assert_eq!(out, Rgba::new(0.0, 255.0, 0.0, 1.0));
    }

    #[test]
    fn test_rgba_list_is_bound() {
        let sandbox = Sandbox::new("rgba").unwrap();
        assert_eq!(sandbox.call(RED).unwrap(), RED);
    }

    #[test]
    fn test_host_names_are_inert() {
        let sandbox = Sandbox::new(
            "[0, 0, 0, 1] if document.cookie is undefined \
             and window.location is undefined \
             and globalThis.document is undefined \
             and this.constructor is undefined \
             else [255, 255, 255, 1]",
        )
        .unwrap();
        assert_eq!(sandbox.call(RED).unwrap(), Rgba::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_calls_share_no_state() {
        let sandbox = Sandbox::new("[r, g, b, a]").unwrap();
        let first = sandbox.call(RED).unwrap();
        let second = sandbox.call(Rgba::new(1.0, 2.0, 3.0, 0.5)).unwrap();
        assert_eq!(first, RED);
        assert_eq!(second, Rgba::new(1.0, 2.0, 3.0, 0.5));
    }

    // =========================================================================
    // Failures
    // =========================================================================

    #[test]
    fn test_syntax_error_fails_eagerly() {
        assert!(matches!(
            Sandbox::new("[r, g,"),
            Err(SandboxError::Compile(_))
        ));
    }

    #[test]
    fn test_wrong_shape() {
        for source in ["r", "[r, g]", "[r, g, b, a, 1]", "'red'", "['a', 'b', 'c']"] {
            let sandbox = Sandbox::new(source).unwrap();
            assert!(
                matches!(sandbox.call(RED), Err(SandboxError::Shape(_))),
                "{source}"
            );
        }
    }

    #[test]
    fn test_runtime_failure_is_an_eval_error() {
        let sandbox = Sandbox::new("[r.nope(), g, b]").unwrap();
        assert!(matches!(sandbox.call(RED), Err(SandboxError::Eval(_))));
    }

    #[test]
    fn test_fuel_bounds_evaluation() {
        let source = "[r + 1 + 1 + 1 + 1 + 1 + 1 + 1 + 1 + 1 + 1 + 1 + 1, g, b]";
        let starved = Sandbox::new(source).unwrap().with_fuel(3);
        assert!(matches!(starved.call(RED), Err(SandboxError::Eval(_))));
        let fed = Sandbox::new(source).unwrap();
        assert!(fed.call(RED).is_ok());
    }

    #[test]
    fn test_deserialize_validates() {
        let sandbox: Sandbox = serde_yaml::from_str("\"[0, 0, 0]\"").unwrap();
        assert_eq!(sandbox.source(), "[0, 0, 0]");
        assert!(serde_yaml::from_str::<Sandbox>("\"[0, 0,\"").is_err());
    }
}

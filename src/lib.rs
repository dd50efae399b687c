//! Symbolic regression for antiderivatives
//!
//! Given a target expression f(x), this crate searches for an expression
//! F(x) whose symbolic derivative dF/dx matches f(x) numerically on a
//! battery of probe points. Candidates are drawn from a context-sensitive
//! Markov model over tree-construction decisions; the model's Gaussian
//! parameters are refit from the best-scoring candidates each iteration, a
//! cross-entropy-style loop specialized to tree grammars.
//!
//! # Usage
//!
//! ## One-shot search
//! ```no_run
//! let antiderivative = antiderive::integrate(5, "4*x^3").unwrap();
//! // a tree equivalent to x^4 + C, e.g. "(x ^ 4)"
//! println!("{}", antiderivative);
//! ```
//!
//! ## Configured search
//! ```no_run
//! use antiderive::{Integrate, Selector};
//!
//! let antiderivative = Integrate::new()
//!     .depth(5)
//!     .candidates(2048)
//!     .selector(Selector::Consensus)
//!     .max_seeds(256)
//!     .run("2*x*cos(x^2)")
//!     .unwrap();
//! ```
//!
//! ## Symbolic algebra on its own
//! ```
//! use antiderive::parse;
//! use std::collections::HashSet;
//!
//! let vars: HashSet<String> = ["x".to_string()].into_iter().collect();
//! let expr = parse("x^2 + sin(x)").unwrap();
//! let derivative = expr.derivative(&vars).simplify();
//! ```
//!
//! The search is exact by construction: it only returns a candidate whose
//! derivative reproduces the target bit-for-bit at every probe, so a result
//! is always a valid antiderivative up to the probe battery's resolution.
//! There is no termination guarantee; bound the outer loop with
//! [`Integrate::max_seeds`] or interrupt the host.

mod ast;
mod builder;
mod derivative;
mod display;
mod error;
mod eval;
mod model;
pub mod parser;
mod sampler;
mod search;
mod simplify;
mod stats;

#[cfg(test)]
mod tests;

pub use ast::{Expr, Op};
pub use builder::Integrate;
pub use error::{Error, Span};
pub use model::{Gaussian, MarkovModel, State, ValueState};
pub use parser::parse;
pub use sampler::{Children, SampleNode, ValueDraw};
pub use search::{DEFAULT_PROBES, Selector};

/// Default sampling depth bound for candidate trees
pub const DEFAULT_DEPTH: usize = 5;
/// Default candidate batch size per inner iteration
pub const DEFAULT_CANDIDATES: usize = 1024;

/// Search for an antiderivative of `expression` with respect to `x`
///
/// Returns a tree whose derivative matches the input on all probe points.
/// Runs until success; use the [`Integrate`] builder to bound the search or
/// tune its parameters.
///
/// # Errors
/// Returns [`Error`] if the expression does not parse.
pub fn integrate(depth: usize, expression: &str) -> Result<Expr, Error> {
    Integrate::new().depth(depth).run(expression)
}

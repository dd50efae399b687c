//! Builder pattern API for the antiderivative search
//!
//! Provides a fluent interface for configuring and executing a search.
//!
//! # Example
//! ```no_run
//! use antiderive::Integrate;
//!
//! let antiderivative = Integrate::new()
//!     .depth(5)
//!     .candidates(1024)
//!     .run("4*x^3")
//!     .unwrap();
//! println!("{}", antiderivative);
//! ```

use crate::error::Error;
use crate::search::{self, DEFAULT_PROBES, SearchConfig, Selector};
use crate::{DEFAULT_CANDIDATES, DEFAULT_DEPTH, Expr, parser};

/// Builder for an antiderivative search
///
/// The search samples candidate trees over the variable `x`, scores each by
/// how well its symbolic derivative tracks the target on the probe battery,
/// and returns the first candidate whose derivative matches exactly.
#[derive(Debug, Clone)]
pub struct Integrate {
    depth: usize,
    candidates: usize,
    probes: Vec<f64>,
    complex_probes: usize,
    max_seeds: Option<u64>,
    selector: Selector,
}

impl Default for Integrate {
    fn default() -> Self {
        Integrate {
            depth: DEFAULT_DEPTH,
            candidates: DEFAULT_CANDIDATES,
            probes: DEFAULT_PROBES.to_vec(),
            complex_probes: 0,
            max_seeds: None,
            selector: Selector::default(),
        }
    }
}

impl Integrate {
    /// Create a new search builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sampling depth bound for candidate trees (minimum 1)
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth.max(1);
        self
    }

    /// Set the candidate batch size per inner iteration (minimum 2)
    pub fn candidates(mut self, count: usize) -> Self {
        self.candidates = count.max(2);
        self
    }

    /// Replace the real probe battery
    pub fn probes(mut self, probes: impl IntoIterator<Item = f64>) -> Self {
        let probes: Vec<f64> = probes.into_iter().collect();
        if !probes.is_empty() {
            self.probes = probes;
        }
        self
    }

    /// Score candidates on `count` random complex probes per seed instead of
    /// the real battery
    pub fn complex_probes(mut self, count: usize) -> Self {
        self.complex_probes = count;
        self
    }

    /// Bound the outer loop; without a bound the search runs until a match
    /// is found or the host interrupts it
    pub fn max_seeds(mut self, seeds: u64) -> Self {
        self.max_seeds = Some(seeds.max(1));
        self
    }

    /// Choose the survivor-selection policy
    pub fn selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    /// Parse `expression` and search for its antiderivative
    ///
    /// # Errors
    /// Returns a parse error for invalid input, or
    /// [`Error::SeedLimitReached`] when a seed bound was set and exhausted.
    pub fn run(self, expression: &str) -> Result<Expr, Error> {
        let target = parser::parse(expression)?;
        self.run_expr(&target)
    }

    /// Search for an antiderivative of an already-built target tree
    pub fn run_expr(self, target: &Expr) -> Result<Expr, Error> {
        let config = SearchConfig {
            depth: self.depth,
            candidates: self.candidates,
            probes: self.probes,
            complex_probes: self.complex_probes,
            max_seeds: self.max_seeds,
            selector: self.selector,
        };
        search::run(&config, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_clamps_degenerate_settings() {
        let builder = Integrate::new().depth(0).candidates(0).max_seeds(0);
        assert_eq!(builder.depth, 1);
        assert_eq!(builder.candidates, 2);
        assert_eq!(builder.max_seeds, Some(1));
    }

    #[test]
    fn test_builder_keeps_default_probes_on_empty() {
        let builder = Integrate::new().probes([]);
        assert_eq!(builder.probes, DEFAULT_PROBES.to_vec());

        let builder = Integrate::new().probes([1.0, 2.0]);
        assert_eq!(builder.probes, vec![1.0, 2.0]);
    }

    #[test]
    fn test_run_surfaces_parse_errors() {
        let result = Integrate::new().max_seeds(1).run("1 +");
        assert!(matches!(result, Err(Error::UnexpectedEndOfInput)));
    }
}

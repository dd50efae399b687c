//! Iterative distribution-refinement search
//!
//! The outer loop walks seeds 1, 2, 3, … and gives each a fresh RNG stream
//! and a fresh Markov model. The inner loop samples a candidate batch,
//! scores every candidate by the squared residual between the target and the
//! candidate's symbolic derivative over the probe battery, returns on an
//! exact-zero fit, refits the model from the survivors, and reseeds once the
//! best candidate stagnates.

use crate::ast::Expr;
use crate::error::Error;
use crate::model::MarkovModel;
use crate::sampler::SampleNode;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

/// Searched trees use this variable as the independent variable.
pub(crate) const VARIABLE: &str = "x";

/// Default probe battery: near-zero, small, and moderate magnitudes on both
/// sides of the origin.
pub const DEFAULT_PROBES: [f64; 14] = [
    -5.0, -4.0, -3.0, -2.0, -1.0, -0.1, -0.01, 0.01, 0.1, 1.0, 2.0, 3.0, 4.0, 5.0,
];

/// Survivor-selection policy between inner iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selector {
    /// Keep the better-scoring half of the batch.
    #[default]
    TopHalf,
    /// Per-probe rank agreement: drop candidates with a non-finite residual
    /// at any probe, then keep the candidates that most often land in the
    /// top half of each probe's residual ranking.
    Consensus,
}

/// Search parameters assembled by the [`crate::Integrate`] builder.
#[derive(Debug, Clone)]
pub(crate) struct SearchConfig {
    pub depth: usize,
    pub candidates: usize,
    pub probes: Vec<f64>,
    /// Nonzero switches to that many random complex probes per seed.
    pub complex_probes: usize,
    pub max_seeds: Option<u64>,
    pub selector: Selector,
}

/// One scored candidate.
struct Candidate {
    tree: SampleNode,
    derivative: Expr,
    fitness: f64,
    /// Residual magnitude per probe, for the consensus selector
    residuals: Vec<f64>,
}

/// Probe points with the target's cached values at them.
enum Battery {
    Real {
        target: Vec<f64>,
        envs: Vec<HashMap<String, f64>>,
    },
    Complex {
        target: Vec<Complex64>,
        envs: Vec<HashMap<String, Complex64>>,
    },
}

impl Battery {
    /// Build the battery for one seed. Complex probes are drawn from the
    /// seed's RNG stream before any sampling so the stream order is fixed.
    fn new(config: &SearchConfig, target: &Expr, rng: &mut StdRng) -> Battery {
        if config.complex_probes > 0 {
            let probes: Vec<Complex64> = (0..config.complex_probes)
                .map(|_| Complex64::new(rng.gen_range(-2.0..=2.0), rng.gen_range(-2.0..=2.0)))
                .collect();
            let envs: Vec<HashMap<String, Complex64>> = probes
                .iter()
                .map(|z| [(VARIABLE.to_string(), *z)].into_iter().collect())
                .collect();
            let target = envs.iter().map(|env| target.eval_complex(env)).collect();
            Battery::Complex { target, envs }
        } else {
            let envs: Vec<HashMap<String, f64>> = config
                .probes
                .iter()
                .map(|z| [(VARIABLE.to_string(), *z)].into_iter().collect())
                .collect();
            let target = envs.iter().map(|env| target.eval(env)).collect();
            Battery::Real { target, envs }
        }
    }

    fn len(&self) -> usize {
        match self {
            Battery::Real { envs, .. } => envs.len(),
            Battery::Complex { envs, .. } => envs.len(),
        }
    }

    /// Sum of squared residuals plus the per-probe residual magnitudes.
    /// Any non-finite evaluation pins the fitness to +infinity.
    fn score(&self, derivative: &Expr) -> (f64, Vec<f64>) {
        let mut fitness = 0.0;
        let mut residuals = Vec::with_capacity(self.len());
        match self {
            Battery::Real { target, envs } => {
                for (t, env) in target.iter().zip(envs) {
                    let r = t - derivative.eval(env);
                    if r.is_finite() {
                        fitness += r * r;
                        residuals.push(r.abs());
                    } else {
                        fitness = f64::INFINITY;
                        residuals.push(f64::INFINITY);
                    }
                }
            }
            Battery::Complex { target, envs } => {
                for (t, env) in target.iter().zip(envs) {
                    let r = t - derivative.eval_complex(env);
                    let magnitude = r.norm_sqr();
                    if magnitude.is_finite() {
                        fitness += magnitude;
                        residuals.push(magnitude.sqrt());
                    } else {
                        fitness = f64::INFINITY;
                        residuals.push(f64::INFINITY);
                    }
                }
            }
        }
        (fitness, residuals)
    }
}

/// Run the search until a candidate's derivative matches the target exactly
/// on every probe, or until the seed budget runs out.
pub(crate) fn run(config: &SearchConfig, target: &Expr) -> Result<Expr, Error> {
    let mut seed = 0u64;
    loop {
        seed += 1;
        if let Some(max) = config.max_seeds {
            if seed > max {
                return Err(Error::SeedLimitReached { seeds: max });
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut model = MarkovModel::new();
        let battery = Battery::new(config, target, &mut rng);
        tracing::debug!(seed, "starting search seed");

        if let Some(found) = run_seed(config, &mut model, &battery, &mut rng) {
            return Ok(found);
        }
    }
}

/// One seed's inner loop. Returns the matching tree, or `None` on
/// stagnation (the best candidate's printed form repeating).
fn run_seed(
    config: &SearchConfig,
    model: &mut MarkovModel,
    battery: &Battery,
    rng: &mut StdRng,
) -> Option<Expr> {
    let vars: HashSet<String> = [VARIABLE.to_string()].into_iter().collect();
    let mut last = String::new();

    loop {
        let roots = model.samples(config.depth, config.candidates, rng);
        let mut candidates = score_batch(roots, &vars, battery);
        candidates.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));

        let best = candidates.first()?;
        let printed = best.tree.to_expr().to_string();

        if best.fitness == 0.0 {
            tracing::info!(result = %printed, derivative = %best.derivative, "exact match found");
            return Some(best.tree.to_expr());
        }
        if printed == last {
            tracing::debug!(best = %printed, "inner loop stagnated, reseeding");
            return None;
        }
        tracing::trace!(fitness = best.fitness, best = %printed, "iteration best");
        last = printed;

        let survivors = select_survivors(candidates, config.selector, battery.len());
        model.refit(&survivors);
    }
}

/// Differentiate, simplify, and score every sampled root.
fn score_batch(roots: Vec<SampleNode>, vars: &HashSet<String>, battery: &Battery) -> Vec<Candidate> {
    let score_one = |tree: SampleNode| {
        let derivative = tree.to_expr().derivative(vars).simplify();
        let (fitness, residuals) = battery.score(&derivative);
        Candidate {
            tree,
            derivative,
            fitness,
            residuals,
        }
    };

    #[cfg(feature = "parallel")]
    {
        roots.into_par_iter().map(score_one).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        roots.into_iter().map(score_one).collect()
    }
}

/// Cut the sorted batch down to the survivors that refit the model.
fn select_survivors(
    candidates: Vec<Candidate>,
    selector: Selector,
    probe_count: usize,
) -> Vec<SampleNode> {
    let half = (candidates.len() / 2).max(1);
    match selector {
        Selector::TopHalf => candidates
            .into_iter()
            .take(half)
            .map(|c| c.tree)
            .collect(),

        Selector::Consensus => {
            let finite: Vec<usize> = candidates
                .iter()
                .enumerate()
                .filter(|(_, c)| c.residuals.iter().all(|r| r.is_finite()))
                .map(|(i, _)| i)
                .collect();

            let mut votes = vec![0usize; candidates.len()];
            for probe in 0..probe_count {
                let mut order = finite.clone();
                order.sort_by(|&a, &b| {
                    candidates[a].residuals[probe].total_cmp(&candidates[b].residuals[probe])
                });
                for &index in order.iter().take(order.len() / 2) {
                    votes[index] += 1;
                }
            }

            let mut ranked = finite;
            ranked.sort_by(|&a, &b| votes[b].cmp(&votes[a]));
            ranked.truncate(half);
            let keep: HashSet<usize> = ranked.into_iter().collect();

            candidates
                .into_iter()
                .enumerate()
                .filter(|(i, _)| keep.contains(i))
                .map(|(_, c)| c.tree)
                .collect()
        }
    }
}

//! Gaussian refit from surviving candidate trees
//!
//! Four passes over the survivors' recorded draws: sum, mean, variance,
//! stddev. Mean must be stable before variance accumulates, hence the
//! separation. States visited fewer than three times keep their prior
//! parameters, which prevents degenerate zero-variance fits in rarely
//! reached contexts.

use crate::model::{END_OF_NUMBER, MarkovModel};
use crate::sampler::{Children, SampleNode};

/// Visits below this threshold keep the prior mean and stddev.
const MIN_VISITS: f64 = 2.0;

impl MarkovModel {
    /// Refit every Gaussian from the decision records of `survivors`.
    ///
    /// Accumulators are zeroed first, so each call fits exactly the given
    /// sample set; parameters of unvisited states are left untouched.
    pub fn refit(&mut self, survivors: &[SampleNode]) {
        self.reset();
        for root in survivors {
            self.accumulate_sums(root);
        }
        self.commit_means();
        for root in survivors {
            self.accumulate_variances(root);
        }
        self.commit_stddevs();
    }

    fn accumulate_sums(&mut self, node: &SampleNode) {
        if let Some(model) = self.states.get_mut(&node.state) {
            model.count += 1.0;
            for (slot, sample) in model.sum.iter_mut().zip(&node.op_samples) {
                *slot += sample;
            }
            for draw in &node.value_draws {
                if let Some(value) = model.values.get_mut(&draw.state) {
                    value.count += 1.0;
                    for (slot, sample) in value.sum.iter_mut().zip(&draw.samples) {
                        *slot += sample;
                    }
                }
                if draw.bits == END_OF_NUMBER {
                    break;
                }
            }
        }
        self.walk_children(node, Self::accumulate_sums);
    }

    fn commit_means(&mut self) {
        for model in self.states.values_mut() {
            if model.count > MIN_VISITS {
                for (gaussian, sum) in model.gaussians.iter_mut().zip(&model.sum) {
                    gaussian.mean = sum / model.count;
                }
            }
            for value in model.values.values_mut() {
                if value.count > MIN_VISITS {
                    for (gaussian, sum) in value.gaussians.iter_mut().zip(&value.sum) {
                        gaussian.mean = sum / value.count;
                    }
                }
            }
        }
    }

    fn accumulate_variances(&mut self, node: &SampleNode) {
        if let Some(model) = self.states.get_mut(&node.state) {
            if model.count > MIN_VISITS {
                for ((slot, gaussian), sample) in model
                    .variance
                    .iter_mut()
                    .zip(&model.gaussians)
                    .zip(&node.op_samples)
                {
                    let diff = gaussian.mean - sample;
                    *slot += diff * diff;
                }
            }
            for draw in &node.value_draws {
                if let Some(value) = model.values.get_mut(&draw.state) {
                    if value.count > MIN_VISITS {
                        for ((slot, gaussian), sample) in value
                            .variance
                            .iter_mut()
                            .zip(&value.gaussians)
                            .zip(&draw.samples)
                        {
                            let diff = gaussian.mean - sample;
                            *slot += diff * diff;
                        }
                    }
                }
                if draw.bits == END_OF_NUMBER {
                    break;
                }
            }
        }
        self.walk_children(node, Self::accumulate_variances);
    }

    fn commit_stddevs(&mut self) {
        for model in self.states.values_mut() {
            if model.count > MIN_VISITS {
                for (gaussian, variance) in model.gaussians.iter_mut().zip(&model.variance) {
                    gaussian.stddev = (variance / model.count).sqrt();
                }
            }
            for value in model.values.values_mut() {
                if value.count > MIN_VISITS {
                    for (gaussian, variance) in value.gaussians.iter_mut().zip(&value.variance) {
                        gaussian.stddev = (variance / value.count).sqrt();
                    }
                }
            }
        }
    }

    fn walk_children(&mut self, node: &SampleNode, visit: fn(&mut Self, &SampleNode)) {
        match &node.children {
            Children::Leaf => {}
            Children::Unary(l) => visit(self, l),
            Children::Binary(l, r) => {
                visit(self, l);
                visit(self, r);
            }
        }
    }
}

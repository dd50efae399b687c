//! Depth-bounded stochastic sampling of expression trees
//!
//! The sampler consults the Markov model's Gaussians for every decision and
//! keeps the raw draws on the produced nodes; they are the training signal
//! the refit passes read back. Rejection enforces well-formedness: a bounded
//! number of redraws against the trained Gaussians, then a fallback to the
//! unit prior, which always terminates because every kind is reachable under
//! it.

use crate::ast::{Expr, Op};
use crate::model::{
    END_OF_NUMBER, Gaussian, MarkovModel, OP_BITS, REJECTION_LIMIT, State, VALUE_BITS, ValueState,
};
use rand::Rng;

/// One number-bit decision with its raw draws.
#[derive(Debug, Clone)]
pub struct ValueDraw {
    /// Value context the decision was drawn under
    pub state: ValueState,
    /// Raw Gaussian samples behind the decision
    pub samples: [f64; VALUE_BITS],
    /// Packed decision: 0 or 1 shift into the value, 2 ends the number
    pub bits: u8,
}

/// Children of a sampled node; the arity is structural.
#[derive(Debug, Clone)]
pub enum Children {
    Leaf,
    Unary(Box<SampleNode>),
    Binary(Box<SampleNode>, Box<SampleNode>),
}

/// A sampled tree node.
///
/// Besides the operation and children it records the training signal: the
/// context the node was drawn under and the raw Gaussian samples behind each
/// decision.
#[derive(Debug, Clone)]
pub struct SampleNode {
    pub op: Op,
    /// Construction context this node was sampled under
    pub state: State,
    /// Raw draws behind the operation decision
    pub op_samples: [f64; OP_BITS],
    /// Accumulated integer for `Number` nodes
    pub value: u64,
    /// Ordered bit decisions for `Number` nodes
    pub value_draws: Vec<ValueDraw>,
    pub children: Children,
}

impl SampleNode {
    /// Convert to an expression tree. Sampled variables are always named `x`.
    pub fn to_expr(&self) -> Expr {
        match &self.children {
            Children::Leaf => match self.op {
                Op::Number => Expr::number(self.value as f64),
                Op::Variable => Expr::variable("x"),
                Op::Pi => Expr::Pi,
                Op::NaturalE => Expr::NaturalE,
                Op::Imaginary => Expr::Imaginary(1.0),
                // leaves are terminal by construction
                _ => Expr::number(0.0),
            },
            Children::Unary(l) => {
                let l = l.to_expr();
                match self.op {
                    Op::Negate => Expr::negate(l),
                    Op::NaturalExp => Expr::natural_exp(l),
                    Op::Log => Expr::log(l),
                    Op::Sqrt => Expr::sqrt(l),
                    Op::Cosine => Expr::cosine(l),
                    Op::Sine => Expr::sine(l),
                    Op::Tangent => Expr::tangent(l),
                    _ => l,
                }
            }
            Children::Binary(l, r) => {
                let (l, r) = (l.to_expr(), r.to_expr());
                match self.op {
                    Op::Add => Expr::add(l, r),
                    Op::Subtract => Expr::subtract(l, r),
                    Op::Multiply => Expr::multiply(l, r),
                    Op::Divide => Expr::divide(l, r),
                    Op::Modulus => Expr::modulus(l, r),
                    Op::Exponentiation => Expr::exponentiation(l, r),
                    _ => l,
                }
            }
        }
    }

    /// Maximum nesting depth (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        match &self.children {
            Children::Leaf => 1,
            Children::Unary(l) => 1 + l.depth(),
            Children::Binary(l, r) => 1 + l.depth().max(r.depth()),
        }
    }
}

impl MarkovModel {
    /// Sample one well-formed tree with depth at most `depth` under
    /// construction context `state`.
    pub fn sample<R: Rng + ?Sized>(&self, depth: usize, state: State, rng: &mut R) -> SampleNode {
        let depth = depth.saturating_sub(1);
        let bank = self.states.get(&state);

        // operation decision, with rejection for well-formedness
        let mut attempts = 0usize;
        let (op, op_samples) = loop {
            let samples = if attempts < REJECTION_LIMIT {
                match bank {
                    Some(model) => draw_op(&model.gaussians, rng),
                    None => draw_op(&[Gaussian::unit(); OP_BITS], rng),
                }
            } else {
                if attempts == REJECTION_LIMIT {
                    tracing::warn!(
                        state = ?state,
                        "operation rejection budget exhausted, falling back to unit gaussians"
                    );
                }
                draw_op(&[Gaussian::unit(); OP_BITS], rng)
            };

            let packed = pack(&samples);
            let op = Op::from_index((packed % u32::from(Op::COUNT)) as u8);
            if admissible(op, depth, state) {
                break (op, samples);
            }
            attempts += 1;
        };

        // value synthesis for Number nodes, one bit at a time
        let mut value = 0u64;
        let mut value_draws = Vec::new();
        if op == Op::Number {
            let mut vstate = ValueState::START;
            let mut rejections = 0usize;
            for _ in 0..64 {
                let (bits, samples) = loop {
                    let samples = if rejections < REJECTION_LIMIT {
                        match bank.and_then(|m| m.values.get(&vstate)) {
                            Some(model) => draw_value(&model.gaussians, rng),
                            None => draw_value(&[Gaussian::unit(); VALUE_BITS], rng),
                        }
                    } else {
                        if rejections == REJECTION_LIMIT {
                            tracing::warn!(
                                state = ?state,
                                "value rejection budget exhausted, falling back to unit gaussians"
                            );
                        }
                        draw_value(&[Gaussian::unit(); VALUE_BITS], rng)
                    };
                    let bits = pack(&samples) as u8;
                    if bits != 0b11 {
                        break (bits, samples);
                    }
                    rejections += 1;
                };

                value_draws.push(ValueDraw {
                    state: vstate,
                    samples,
                    bits,
                });
                if bits == END_OF_NUMBER {
                    break;
                }
                value = (value << 1) | u64::from(bits);
                vstate = vstate.push(bits);
            }
        }

        let children = if op.is_binary() {
            let left = self.sample(depth, state.left(op), rng);
            let right = self.sample(depth, state.right(op), rng);
            Children::Binary(Box::new(left), Box::new(right))
        } else if op.is_unary() {
            Children::Unary(Box::new(self.sample(depth, state.left(op), rng)))
        } else {
            Children::Leaf
        };

        SampleNode {
            op,
            state,
            op_samples,
            value,
            value_draws,
            children,
        }
    }

    /// Sample a batch of `count` candidate roots.
    pub fn samples<R: Rng + ?Sized>(
        &self,
        depth: usize,
        count: usize,
        rng: &mut R,
    ) -> Vec<SampleNode> {
        (0..count).map(|_| self.sample(depth, State::ROOT, rng)).collect()
    }
}

/// Well-formedness constraints on a drawn operation.
fn admissible(op: Op, depth: usize, state: State) -> bool {
    if depth == 0 {
        return op.is_terminal();
    }
    // Noop is the empty decision and ENotation is a literal form with no
    // samplable arity. Nested power towers destabilize fitting.
    op != Op::Noop
        && op != Op::ENotation
        && !(op == Op::Exponentiation && state.names(Op::Exponentiation))
}

fn draw_op<R: Rng + ?Sized>(gaussians: &[Gaussian; OP_BITS], rng: &mut R) -> [f64; OP_BITS] {
    let mut samples = [0.0; OP_BITS];
    for (slot, gaussian) in samples.iter_mut().zip(gaussians) {
        *slot = gaussian.sample(rng);
    }
    samples
}

fn draw_value<R: Rng + ?Sized>(
    gaussians: &[Gaussian; VALUE_BITS],
    rng: &mut R,
) -> [f64; VALUE_BITS] {
    let mut samples = [0.0; VALUE_BITS];
    for (slot, gaussian) in samples.iter_mut().zip(gaussians) {
        *slot = gaussian.sample(rng);
    }
    samples
}

/// Threshold each sample at zero and pack the bits, first sample highest.
fn pack(samples: &[f64]) -> u32 {
    samples
        .iter()
        .fold(0u32, |acc, s| (acc << 1) | u32::from(*s > 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_pack_thresholds_at_zero() {
        assert_eq!(pack(&[1.0, -1.0, 0.5]), 0b101);
        assert_eq!(pack(&[-0.1, -0.2]), 0);
        assert_eq!(pack(&[0.0]), 0, "zero is not a set bit");
    }

    #[test]
    fn test_admissible_depth_zero_requires_terminal() {
        assert!(admissible(Op::Number, 0, State::ROOT));
        assert!(admissible(Op::Pi, 0, State::ROOT));
        assert!(!admissible(Op::Add, 0, State::ROOT));
        assert!(!admissible(Op::Sine, 0, State::ROOT));
    }

    #[test]
    fn test_admissible_rejects_noop_and_e_notation() {
        assert!(!admissible(Op::Noop, 3, State::ROOT));
        assert!(!admissible(Op::ENotation, 3, State::ROOT));
        assert!(admissible(Op::Add, 3, State::ROOT));
    }

    #[test]
    fn test_admissible_blocks_nested_powers() {
        let under_power = State::ROOT.left(Op::Exponentiation);
        assert!(!admissible(Op::Exponentiation, 3, under_power));
        assert!(admissible(Op::Multiply, 3, under_power));

        let under_power_right = State::ROOT.right(Op::Exponentiation);
        assert!(!admissible(Op::Exponentiation, 3, under_power_right));
    }

    #[test]
    fn test_sample_is_deterministic_for_a_seed() {
        let model = MarkovModel::new();
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..16 {
            let x = model.sample(5, State::ROOT, &mut a);
            let y = model.sample(5, State::ROOT, &mut b);
            assert_eq!(x.to_expr(), y.to_expr());
        }
    }

    #[test]
    fn test_number_value_matches_recorded_draws() {
        let model = MarkovModel::new();
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen_number = false;
        for _ in 0..256 {
            let node = model.sample(1, State::ROOT, &mut rng);
            if node.op != Op::Number {
                continue;
            }
            seen_number = true;
            let mut replayed = 0u64;
            for draw in &node.value_draws {
                assert!(draw.bits <= END_OF_NUMBER, "rejected bits are not stored");
                if draw.bits == END_OF_NUMBER {
                    break;
                }
                replayed = (replayed << 1) | u64::from(draw.bits);
            }
            assert_eq!(replayed, node.value);
        }
        assert!(seen_number, "depth-1 sampling never produced a number");
    }

    #[test]
    fn test_value_state_threads_previous_bits() {
        let model = MarkovModel::new();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..256 {
            let node = model.sample(1, State::ROOT, &mut rng);
            if node.op != Op::Number {
                continue;
            }
            let mut expected = ValueState::START;
            for draw in &node.value_draws {
                assert_eq!(draw.state, expected);
                if draw.bits == END_OF_NUMBER {
                    break;
                }
                expected = expected.push(draw.bits);
            }
        }
    }

    #[test]
    fn test_batch_size() {
        let model = MarkovModel::new();
        let mut rng = StdRng::seed_from_u64(1);
        let roots = model.samples(4, 64, &mut rng);
        assert_eq!(roots.len(), 64);
    }
}

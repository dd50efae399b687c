//! Markov grammar model: Gaussian decision banks keyed on construction
//! context
//!
//! Every tree-construction decision is encoded as a handful of bits, and each
//! bit is drawn from its own Gaussian and thresholded at zero. The Gaussians
//! are conditioned on a two-byte context of recent decisions, so the model
//! can learn, for example, that the right child of a power under a product
//! should usually be a small number.

use crate::ast::Op;
use rand::Rng;
use rand_distr::StandardNormal;
use rustc_hash::FxHashMap;

/// Bits drawn per operation decision; 2^OP_BITS = 32 covers [`Op::COUNT`].
pub(crate) const OP_BITS: usize = 5;

/// Bits drawn per number-value decision, packed into 0..=3.
pub(crate) const VALUE_BITS: usize = 2;

/// Packed value decision that terminates a number.
pub(crate) const END_OF_NUMBER: u8 = 2;

/// Flag on a state byte marking a right-child slot. Operation values stay
/// below 0x20, so the flag never collides with a kind.
pub(crate) const RIGHT_CHILD: u8 = 0x80;

/// Rejected draws allowed at one sampling site before the model falls back
/// to unit Gaussians.
pub(crate) const REJECTION_LIMIT: usize = 256;

/// Construction context: the two most recent tree decisions, youngest first.
///
/// Byte layout: the low bits carry the [`Op`] of the decision, and
/// [`RIGHT_CHILD`] records that the slot being filled is a right child, so
/// left and right subtrees condition differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct State(pub u8, pub u8);

impl State {
    /// Root context: no decisions yet.
    pub const ROOT: State = State(Op::Noop as u8, Op::Noop as u8);

    /// Context for the left child of a node with operation `op`.
    pub fn left(self, op: Op) -> State {
        State(op as u8, self.0)
    }

    /// Context for the right child of a node with operation `op`.
    pub fn right(self, op: Op) -> State {
        State(op as u8 | RIGHT_CHILD, self.0)
    }

    /// True when either byte's operation nibble already names `op`. Used to
    /// keep powers from nesting, which destabilizes fitting.
    pub(crate) fn names(self, op: Op) -> bool {
        (self.0 & 0x0f) == op as u8 || (self.1 & 0x0f) == op as u8
    }
}

/// Context for number-bit decisions: the two most recent packed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueState(pub u8, pub u8);

impl ValueState {
    /// Context at the first bit of a number.
    pub const START: ValueState = ValueState(0, 0);

    /// Context after drawing `bits`.
    pub fn push(self, bits: u8) -> ValueState {
        ValueState(bits, self.0)
    }
}

/// One trainable decision distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian {
    pub mean: f64,
    pub stddev: f64,
}

impl Gaussian {
    /// The untrained prior: standard normal, so decisions start uniform-ish.
    pub(crate) fn unit() -> Gaussian {
        Gaussian {
            mean: 0.0,
            stddev: 1.0,
        }
    }

    /// Draw one sample.
    pub(crate) fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        self.mean + self.stddev * z
    }
}

/// Gaussian bank and refit accumulators for one value context.
#[derive(Debug, Clone)]
pub(crate) struct ValueModel {
    pub gaussians: [Gaussian; VALUE_BITS],
    pub count: f64,
    pub sum: [f64; VALUE_BITS],
    pub variance: [f64; VALUE_BITS],
}

impl ValueModel {
    fn new() -> ValueModel {
        ValueModel {
            gaussians: [Gaussian::unit(); VALUE_BITS],
            count: 0.0,
            sum: [0.0; VALUE_BITS],
            variance: [0.0; VALUE_BITS],
        }
    }

    fn reset(&mut self) {
        self.count = 0.0;
        self.sum = [0.0; VALUE_BITS];
        self.variance = [0.0; VALUE_BITS];
    }
}

/// Gaussian bank and refit accumulators for one construction context.
#[derive(Debug, Clone)]
pub(crate) struct OpModel {
    pub gaussians: [Gaussian; OP_BITS],
    pub count: f64,
    pub sum: [f64; OP_BITS],
    pub variance: [f64; OP_BITS],
    pub values: FxHashMap<ValueState, ValueModel>,
}

impl OpModel {
    fn new() -> OpModel {
        let mut values = FxHashMap::default();
        for first in 0..=END_OF_NUMBER {
            for second in 0..=END_OF_NUMBER {
                values.insert(ValueState(first, second), ValueModel::new());
            }
        }
        OpModel {
            gaussians: [Gaussian::unit(); OP_BITS],
            count: 0.0,
            sum: [0.0; OP_BITS],
            variance: [0.0; OP_BITS],
            values,
        }
    }

    fn reset(&mut self) {
        self.count = 0.0;
        self.sum = [0.0; OP_BITS];
        self.variance = [0.0; OP_BITS];
        for value in self.values.values_mut() {
            value.reset();
        }
    }
}

/// The full state-indexed Gaussian model.
///
/// Construction covers every reachable state, the Cartesian product of
/// operation kinds and handedness flags in both context bytes, so sampling
/// never has to grow the map and refits stay allocation-free.
#[derive(Debug, Clone)]
pub struct MarkovModel {
    pub(crate) states: FxHashMap<State, OpModel>,
}

impl Default for MarkovModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkovModel {
    /// Fresh model: every state present, every Gaussian the unit prior.
    pub fn new() -> MarkovModel {
        let mut states = FxHashMap::default();
        for parent in 0..Op::COUNT {
            for parent_hand in [0, RIGHT_CHILD] {
                for grand in 0..Op::COUNT {
                    for grand_hand in [0, RIGHT_CHILD] {
                        states.insert(
                            State(parent | parent_hand, grand | grand_hand),
                            OpModel::new(),
                        );
                    }
                }
            }
        }
        MarkovModel { states }
    }

    /// Zero every refit accumulator, preserving means and stddevs.
    pub fn reset(&mut self) {
        for state in self.states.values_mut() {
            state.reset();
        }
    }
}

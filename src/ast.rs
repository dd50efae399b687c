//! Expression trees for the antiderivative search

use std::sync::Arc;

/// Operation tag identifying a node's role.
///
/// The discriminant doubles as the Markov-state byte, so the order is load
/// bearing: the sampler packs Gaussian bit decisions into an integer and
/// reduces it modulo [`Op::COUNT`] to pick a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Op {
    /// No decision yet; only appears in root sampling states
    Noop = 0,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    Exponentiation,
    Negate,
    Number,
    Variable,
    Imaginary,
    NaturalExp,
    NaturalE,
    Pi,
    Log,
    Sqrt,
    Cosine,
    Sine,
    Tangent,
    ENotation,
}

impl Op {
    /// Number of operation kinds.
    pub const COUNT: u8 = 20;

    /// Recover a kind from a sampled index in `0..COUNT`.
    pub(crate) fn from_index(index: u8) -> Op {
        match index {
            1 => Op::Add,
            2 => Op::Subtract,
            3 => Op::Multiply,
            4 => Op::Divide,
            5 => Op::Modulus,
            6 => Op::Exponentiation,
            7 => Op::Negate,
            8 => Op::Number,
            9 => Op::Variable,
            10 => Op::Imaginary,
            11 => Op::NaturalExp,
            12 => Op::NaturalE,
            13 => Op::Pi,
            14 => Op::Log,
            15 => Op::Sqrt,
            16 => Op::Cosine,
            17 => Op::Sine,
            18 => Op::Tangent,
            19 => Op::ENotation,
            _ => Op::Noop,
        }
    }

    /// Leaf kinds: no children.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Op::Number | Op::Variable | Op::Pi | Op::NaturalE | Op::Imaginary
        )
    }

    /// Kinds with a single (left) child.
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            Op::Negate | Op::Cosine | Op::Sine | Op::Tangent | Op::Sqrt | Op::Log | Op::NaturalExp
        )
    }

    /// Kinds with two children.
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Op::Add | Op::Subtract | Op::Multiply | Op::Divide | Op::Modulus | Op::Exponentiation
        )
    }

    /// Numeric literal forms, the subjects of the constant-identity rewrites.
    pub fn is_numeric(self) -> bool {
        matches!(self, Op::Number | Op::Imaginary | Op::ENotation)
    }
}

/// A node in an expression tree.
///
/// Children are `Arc`-shared immutable nodes: differentiation and
/// simplification build fresh trees and may alias subtrees of their input,
/// but no tree is ever mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Constant number
    Number(f64),
    /// Imaginary constant: the coefficient on `i`
    Imaginary(f64),
    /// Scientific-notation literal: mantissa and decimal exponent
    ENotation(Arc<Expr>, Arc<Expr>),
    /// Named variable; the name is nonempty
    Variable(String),
    /// The constant pi
    Pi,
    /// The constant e
    NaturalE,
    Add(Arc<Expr>, Arc<Expr>),
    Subtract(Arc<Expr>, Arc<Expr>),
    Multiply(Arc<Expr>, Arc<Expr>),
    Divide(Arc<Expr>, Arc<Expr>),
    Modulus(Arc<Expr>, Arc<Expr>),
    Exponentiation(Arc<Expr>, Arc<Expr>),
    Negate(Arc<Expr>),
    /// `e` raised to the child
    NaturalExp(Arc<Expr>),
    Log(Arc<Expr>),
    Sqrt(Arc<Expr>),
    Cosine(Arc<Expr>),
    Sine(Arc<Expr>),
    Tangent(Arc<Expr>),
}

impl Expr {
    // Convenience constructors

    /// Create a number node
    pub fn number(n: f64) -> Self {
        Expr::Number(n)
    }

    /// Create a variable node
    pub fn variable(name: impl Into<String>) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty(), "variable names are nonempty");
        Expr::Variable(name)
    }

    /// Create an addition node
    pub fn add(left: Expr, right: Expr) -> Self {
        Expr::Add(Arc::new(left), Arc::new(right))
    }

    /// Create a subtraction node
    pub fn subtract(left: Expr, right: Expr) -> Self {
        Expr::Subtract(Arc::new(left), Arc::new(right))
    }

    /// Create a multiplication node
    pub fn multiply(left: Expr, right: Expr) -> Self {
        Expr::Multiply(Arc::new(left), Arc::new(right))
    }

    /// Create a division node
    pub fn divide(left: Expr, right: Expr) -> Self {
        Expr::Divide(Arc::new(left), Arc::new(right))
    }

    /// Create a modulus node
    pub fn modulus(left: Expr, right: Expr) -> Self {
        Expr::Modulus(Arc::new(left), Arc::new(right))
    }

    /// Create a power node
    pub fn exponentiation(base: Expr, exponent: Expr) -> Self {
        Expr::Exponentiation(Arc::new(base), Arc::new(exponent))
    }

    /// Create a scientific-notation node
    pub fn e_notation(mantissa: Expr, exponent: Expr) -> Self {
        Expr::ENotation(Arc::new(mantissa), Arc::new(exponent))
    }

    /// Create a negation node
    pub fn negate(inner: Expr) -> Self {
        Expr::Negate(Arc::new(inner))
    }

    /// Create an `e^x` node
    pub fn natural_exp(inner: Expr) -> Self {
        Expr::NaturalExp(Arc::new(inner))
    }

    /// Create a natural-logarithm node
    pub fn log(inner: Expr) -> Self {
        Expr::Log(Arc::new(inner))
    }

    /// Create a square-root node
    pub fn sqrt(inner: Expr) -> Self {
        Expr::Sqrt(Arc::new(inner))
    }

    /// Create a cosine node
    pub fn cosine(inner: Expr) -> Self {
        Expr::Cosine(Arc::new(inner))
    }

    /// Create a sine node
    pub fn sine(inner: Expr) -> Self {
        Expr::Sine(Arc::new(inner))
    }

    /// Create a tangent node
    pub fn tangent(inner: Expr) -> Self {
        Expr::Tangent(Arc::new(inner))
    }

    /// The operation tag of this node
    pub fn op(&self) -> Op {
        match self {
            Expr::Number(_) => Op::Number,
            Expr::Imaginary(_) => Op::Imaginary,
            Expr::ENotation(_, _) => Op::ENotation,
            Expr::Variable(_) => Op::Variable,
            Expr::Pi => Op::Pi,
            Expr::NaturalE => Op::NaturalE,
            Expr::Add(_, _) => Op::Add,
            Expr::Subtract(_, _) => Op::Subtract,
            Expr::Multiply(_, _) => Op::Multiply,
            Expr::Divide(_, _) => Op::Divide,
            Expr::Modulus(_, _) => Op::Modulus,
            Expr::Exponentiation(_, _) => Op::Exponentiation,
            Expr::Negate(_) => Op::Negate,
            Expr::NaturalExp(_) => Op::NaturalExp,
            Expr::Log(_) => Op::Log,
            Expr::Sqrt(_) => Op::Sqrt,
            Expr::Cosine(_) => Op::Cosine,
            Expr::Sine(_) => Op::Sine,
            Expr::Tangent(_) => Op::Tangent,
        }
    }

    /// Check if this is a constant number and return its value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// True iff this node is a `Number` whose value exactly equals `k`
    pub fn equals(&self, k: i64) -> bool {
        matches!(self, Expr::Number(n) if *n == k as f64)
    }

    /// Count the total number of nodes in the tree
    pub fn node_count(&self) -> usize {
        match self {
            Expr::Number(_)
            | Expr::Imaginary(_)
            | Expr::Variable(_)
            | Expr::Pi
            | Expr::NaturalE => 1,
            Expr::ENotation(l, r)
            | Expr::Add(l, r)
            | Expr::Subtract(l, r)
            | Expr::Multiply(l, r)
            | Expr::Divide(l, r)
            | Expr::Modulus(l, r)
            | Expr::Exponentiation(l, r) => 1 + l.node_count() + r.node_count(),
            Expr::Negate(l)
            | Expr::NaturalExp(l)
            | Expr::Log(l)
            | Expr::Sqrt(l)
            | Expr::Cosine(l)
            | Expr::Sine(l)
            | Expr::Tangent(l) => 1 + l.node_count(),
        }
    }

    /// Maximum nesting depth of the tree (a leaf has depth 1)
    pub fn max_depth(&self) -> usize {
        match self {
            Expr::Number(_)
            | Expr::Imaginary(_)
            | Expr::Variable(_)
            | Expr::Pi
            | Expr::NaturalE => 1,
            Expr::ENotation(l, r)
            | Expr::Add(l, r)
            | Expr::Subtract(l, r)
            | Expr::Multiply(l, r)
            | Expr::Divide(l, r)
            | Expr::Modulus(l, r)
            | Expr::Exponentiation(l, r) => 1 + l.max_depth().max(r.max_depth()),
            Expr::Negate(l)
            | Expr::NaturalExp(l)
            | Expr::Log(l)
            | Expr::Sqrt(l)
            | Expr::Cosine(l)
            | Expr::Sine(l)
            | Expr::Tangent(l) => 1 + l.max_depth(),
        }
    }

    /// Check if the tree mentions a specific variable
    pub fn contains_var(&self, var: &str) -> bool {
        match self {
            Expr::Variable(name) => name == var,
            Expr::Number(_) | Expr::Imaginary(_) | Expr::Pi | Expr::NaturalE => false,
            Expr::ENotation(l, r)
            | Expr::Add(l, r)
            | Expr::Subtract(l, r)
            | Expr::Multiply(l, r)
            | Expr::Divide(l, r)
            | Expr::Modulus(l, r)
            | Expr::Exponentiation(l, r) => l.contains_var(var) || r.contains_var(var),
            Expr::Negate(l)
            | Expr::NaturalExp(l)
            | Expr::Log(l)
            | Expr::Sqrt(l)
            | Expr::Cosine(l)
            | Expr::Sine(l)
            | Expr::Tangent(l) => l.contains_var(var),
        }
    }
}

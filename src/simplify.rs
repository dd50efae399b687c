//! Bottom-up algebraic simplification
//!
//! Rewrites a tree to a canonical shorter form using constant-identity rules.
//! Each rule fires only when the subject child is a literal `Number` equal to
//! the rule's constant. Children are simplified first, then rules iterate at
//! the current node until none applies, which makes the pass idempotent: a
//! rule's output either is a constant, reuses an already-simplified subtree,
//! or wraps one in a negation that is itself rechecked.

use crate::Expr;

impl Expr {
    /// Rewrite to a canonical shorter form. Never changes the value of the
    /// expression at points where it is defined, and never mutates `self`.
    ///
    /// # Example
    /// ```
    /// use antiderive::parse;
    ///
    /// let expr = parse("(x * 1) + 0").unwrap();
    /// assert_eq!(expr.simplify().to_string(), "x");
    /// ```
    pub fn simplify(&self) -> Expr {
        let mut node = match self {
            Expr::Number(_)
            | Expr::Imaginary(_)
            | Expr::Variable(_)
            | Expr::Pi
            | Expr::NaturalE => self.clone(),

            Expr::ENotation(l, r) => Expr::e_notation(l.simplify(), r.simplify()),
            Expr::Add(l, r) => Expr::add(l.simplify(), r.simplify()),
            Expr::Subtract(l, r) => Expr::subtract(l.simplify(), r.simplify()),
            Expr::Multiply(l, r) => Expr::multiply(l.simplify(), r.simplify()),
            Expr::Divide(l, r) => Expr::divide(l.simplify(), r.simplify()),
            Expr::Modulus(l, r) => Expr::modulus(l.simplify(), r.simplify()),
            Expr::Exponentiation(l, r) => Expr::exponentiation(l.simplify(), r.simplify()),
            Expr::Negate(l) => Expr::negate(l.simplify()),
            Expr::NaturalExp(l) => Expr::natural_exp(l.simplify()),
            Expr::Log(l) => Expr::log(l.simplify()),
            Expr::Sqrt(l) => Expr::sqrt(l.simplify()),
            Expr::Cosine(l) => Expr::cosine(l.simplify()),
            Expr::Sine(l) => Expr::sine(l.simplify()),
            Expr::Tangent(l) => Expr::tangent(l.simplify()),
        };

        while let Some(next) = rewrite(&node) {
            node = next;
        }
        node
    }
}

/// Apply the first matching constant-identity rule, `None` when none fires.
/// Children are assumed already simplified.
fn rewrite(expr: &Expr) -> Option<Expr> {
    match expr {
        Expr::Add(l, r) => {
            if l.equals(0) {
                return Some((**r).clone());
            }
            if r.equals(0) {
                return Some((**l).clone());
            }
            None
        }

        Expr::Subtract(l, r) => {
            if l.equals(0) {
                return Some(Expr::negate((**r).clone()));
            }
            if r.equals(0) {
                return Some((**l).clone());
            }
            None
        }

        Expr::Multiply(l, r) => {
            if l.equals(0) || r.equals(0) {
                return Some(Expr::number(0.0));
            }
            if l.equals(1) {
                return Some((**r).clone());
            }
            if r.equals(1) {
                return Some((**l).clone());
            }
            None
        }

        Expr::Divide(l, r) => {
            if l.equals(0) {
                return Some(Expr::number(0.0));
            }
            if r.equals(0) {
                return Some(Expr::number(f64::INFINITY));
            }
            if r.equals(1) {
                return Some((**l).clone());
            }
            None
        }

        Expr::Modulus(l, r) => {
            if r.equals(1) {
                return Some((**l).clone());
            }
            None
        }

        Expr::Exponentiation(l, r) => {
            if l.equals(0) {
                return Some(Expr::number(0.0));
            }
            if r.equals(0) {
                return Some(Expr::number(1.0));
            }
            if l.equals(1) {
                return Some(Expr::number(1.0));
            }
            if r.equals(1) {
                return Some((**l).clone());
            }
            None
        }

        Expr::Negate(l) => {
            if l.equals(0) {
                return Some(Expr::number(0.0));
            }
            None
        }

        Expr::NaturalExp(l) => {
            if l.equals(0) {
                return Some(Expr::number(1.0));
            }
            if l.equals(1) {
                return Some(Expr::NaturalE);
            }
            None
        }

        Expr::Log(l) => {
            if matches!(&**l, Expr::NaturalE) {
                return Some(Expr::NaturalE);
            }
            None
        }

        Expr::Sqrt(l) => {
            if l.equals(0) {
                return Some(Expr::number(0.0));
            }
            if l.equals(1) {
                return Some(Expr::number(1.0));
            }
            None
        }

        _ => None,
    }
}

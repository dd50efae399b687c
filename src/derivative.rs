// Differentiation engine - applies calculus rules by structural recursion
//
// Outputs are fresh trees; subtrees of the input may be aliased into the
// output through their Arc handles because nodes are immutable. Recursion
// depth is bounded by the sampler's depth knob for searched trees and by the
// parser's input for user trees.

use crate::{Expr, Op};
use std::collections::HashSet;

impl Expr {
    /// Differentiate with respect to the variables named in `vars`.
    ///
    /// A `Variable` whose name is in the set becomes 1; every other variable
    /// and every constant becomes 0. The exponent of a power is treated as
    /// constant (power rule only). `Modulus` has no derivative rule and
    /// passes through unchanged.
    ///
    /// # Example
    /// ```
    /// use antiderive::parse;
    /// use std::collections::HashSet;
    ///
    /// let vars: HashSet<String> = ["x".to_string()].into_iter().collect();
    /// let expr = parse("x^2").unwrap();
    /// let derivative = expr.derivative(&vars);
    /// assert_eq!(derivative.to_string(), "((2 * (x ^ (2 - 1))) * 1)");
    /// ```
    pub fn derivative(&self, vars: &HashSet<String>) -> Expr {
        match self {
            Expr::Variable(name) => {
                if vars.contains(name) {
                    Expr::number(1.0)
                } else {
                    Expr::number(0.0)
                }
            }

            Expr::Number(_)
            | Expr::Imaginary(_)
            | Expr::ENotation(_, _)
            | Expr::Pi
            | Expr::NaturalE => Expr::number(0.0),

            // Sum rule: (u + v)' = u' + v'
            Expr::Add(u, v) => Expr::add(u.derivative(vars), v.derivative(vars)),

            // (u - v)' = u' - v'
            Expr::Subtract(u, v) => Expr::subtract(u.derivative(vars), v.derivative(vars)),

            // Product rule: (u * v)' = u * v' + v * u'
            Expr::Multiply(u, v) => Expr::add(
                Expr::multiply((**u).clone(), v.derivative(vars)),
                Expr::multiply((**v).clone(), u.derivative(vars)),
            ),

            // Quotient rule: (u / v)' = (v * u' - u * v') / v^2
            Expr::Divide(u, v) => Expr::divide(
                Expr::subtract(
                    Expr::multiply((**v).clone(), u.derivative(vars)),
                    Expr::multiply((**u).clone(), v.derivative(vars)),
                ),
                Expr::exponentiation((**v).clone(), Expr::number(2.0)),
            ),

            // Power rule with the exponent held constant:
            // (u ^ n)' = n * u^(n - 1) * u'
            Expr::Exponentiation(u, n) => Expr::multiply(
                Expr::multiply(
                    (**n).clone(),
                    Expr::exponentiation(
                        (**u).clone(),
                        Expr::subtract((**n).clone(), Expr::number(1.0)),
                    ),
                ),
                u.derivative(vars),
            ),

            // No derivative rule; passes through as an opaque term
            Expr::Modulus(_, _) => self.clone(),

            Expr::Negate(u) => Expr::negate(u.derivative(vars)),

            // (e^u)' = e^u * u'
            Expr::NaturalExp(u) => Expr::multiply(self.clone(), u.derivative(vars)),

            // log(u)' = u' / u
            Expr::Log(u) => Expr::divide(u.derivative(vars), (**u).clone()),

            // sqrt(u)' = u' / (2 * sqrt(u))
            Expr::Sqrt(u) => Expr::divide(
                u.derivative(vars),
                Expr::multiply(Expr::number(2.0), self.clone()),
            ),

            // cos(u)' = -(sin(u) * u')
            Expr::Cosine(u) => Expr::negate(Expr::multiply(
                Expr::sine((**u).clone()),
                u.derivative(vars),
            )),

            // sin(u)' = cos(u) * u'
            Expr::Sine(u) => Expr::multiply(Expr::cosine((**u).clone()), u.derivative(vars)),

            // tan(u)' = (1 + tan(u)^2) * u'
            Expr::Tangent(u) => Expr::multiply(
                Expr::add(
                    Expr::number(1.0),
                    Expr::exponentiation(self.clone(), Expr::number(2.0)),
                ),
                u.derivative(vars),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn x_vars() -> HashSet<String> {
        ["x".to_string()].into_iter().collect()
    }

    fn eval_at(expr: &Expr, x: f64) -> f64 {
        let env: HashMap<String, f64> = [("x".to_string(), x)].into_iter().collect();
        expr.eval(&env)
    }

    #[test]
    fn test_derivative_of_variable() {
        let vars = x_vars();
        assert!(Expr::variable("x").derivative(&vars).equals(1));
        assert!(Expr::variable("y").derivative(&vars).equals(0));
    }

    #[test]
    fn test_derivative_of_constants() {
        let vars = x_vars();
        assert!(Expr::number(7.0).derivative(&vars).equals(0));
        assert!(Expr::Pi.derivative(&vars).equals(0));
        assert!(Expr::NaturalE.derivative(&vars).equals(0));
        assert!(Expr::Imaginary(2.0).derivative(&vars).equals(0));
    }

    #[test]
    fn test_variable_set_selects_independent_variable() {
        let vars: HashSet<String> = ["t".to_string()].into_iter().collect();
        let expr = Expr::multiply(Expr::variable("x"), Expr::variable("t"));
        // d/dt (x * t) = x * 1 + t * 0
        let d = expr.derivative(&vars);
        let env: HashMap<String, f64> =
            [("x".to_string(), 3.0), ("t".to_string(), 11.0)].into_iter().collect();
        assert_eq!(d.eval(&env), 3.0);
    }

    #[test]
    fn test_power_rule_structure() {
        let vars = x_vars();
        let d = Expr::exponentiation(Expr::variable("x"), Expr::number(3.0)).derivative(&vars);
        // (3 * x^(3 - 1)) * 1
        assert_eq!(d.to_string(), "((3 * (x ^ (3 - 1))) * 1)");
    }

    #[test]
    fn test_quotient_rule_evaluates() {
        let vars = x_vars();
        // (x / 2)' = 1/2 everywhere
        let d = Expr::divide(Expr::variable("x"), Expr::number(2.0)).derivative(&vars);
        for x in [-3.0, 0.5, 4.0] {
            assert!((eval_at(&d, x) - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_trig_rules_evaluate() {
        let vars = x_vars();
        let sin_d = Expr::sine(Expr::variable("x")).derivative(&vars);
        let cos_d = Expr::cosine(Expr::variable("x")).derivative(&vars);
        let tan_d = Expr::tangent(Expr::variable("x")).derivative(&vars);
        for x in [-1.0, 0.0, 0.7, 2.0] {
            assert!((eval_at(&sin_d, x) - x.cos()).abs() < 1e-12);
            assert!((eval_at(&cos_d, x) + x.sin()).abs() < 1e-12);
            let sec2 = 1.0 + x.tan() * x.tan();
            assert!((eval_at(&tan_d, x) - sec2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_exp_log_sqrt_rules_evaluate() {
        let vars = x_vars();
        let exp_d = Expr::natural_exp(Expr::variable("x")).derivative(&vars);
        let log_d = Expr::log(Expr::variable("x")).derivative(&vars);
        let sqrt_d = Expr::sqrt(Expr::variable("x")).derivative(&vars);
        for x in [0.5, 1.0, 2.0, 9.0] {
            assert!((eval_at(&exp_d, x) - x.exp()).abs() < 1e-9);
            assert!((eval_at(&log_d, x) - 1.0 / x).abs() < 1e-12);
            assert!((eval_at(&sqrt_d, x) - 0.5 / x.sqrt()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_modulus_passes_through() {
        let vars = x_vars();
        let expr = Expr::modulus(Expr::variable("x"), Expr::number(3.0));
        assert_eq!(expr.derivative(&vars), expr);
    }

    #[test]
    fn test_derivative_does_not_mutate_input() {
        let vars = x_vars();
        let expr = Expr::multiply(Expr::variable("x"), Expr::sine(Expr::variable("x")));
        let before = expr.to_string();
        let _ = expr.derivative(&vars);
        assert_eq!(expr.to_string(), before);
    }
}

//! Numeric evaluation with environment binding
//!
//! Evaluation is pure recursive substitution. Division by zero follows
//! IEEE-754 and is not an error; the search treats non-finite results as a
//! fitness penalty. Unbound variables evaluate to NaN for the same reason.

use crate::Expr;
use num_complex::Complex64;
use std::collections::HashMap;
use std::f64::consts;

impl Expr {
    /// Evaluate to a real number against `env` (variable name to value).
    ///
    /// Modulus is meaningful for real operands via the IEEE remainder; the
    /// imaginary constant has no real value and yields NaN.
    ///
    /// # Example
    /// ```
    /// use antiderive::parse;
    /// use std::collections::HashMap;
    ///
    /// let expr = parse("x^2 + 1").unwrap();
    /// let env: HashMap<String, f64> = [("x".to_string(), 3.0)].into_iter().collect();
    /// assert_eq!(expr.eval(&env), 10.0);
    /// ```
    pub fn eval(&self, env: &HashMap<String, f64>) -> f64 {
        match self {
            Expr::Number(n) => *n,
            Expr::Imaginary(_) => f64::NAN,
            Expr::ENotation(m, e) => m.eval(env) * 10f64.powf(e.eval(env)),
            Expr::Variable(name) => env.get(name).copied().unwrap_or(f64::NAN),
            Expr::Pi => consts::PI,
            Expr::NaturalE => consts::E,
            Expr::Add(l, r) => l.eval(env) + r.eval(env),
            Expr::Subtract(l, r) => l.eval(env) - r.eval(env),
            Expr::Multiply(l, r) => l.eval(env) * r.eval(env),
            Expr::Divide(l, r) => l.eval(env) / r.eval(env),
            Expr::Modulus(l, r) => l.eval(env) % r.eval(env),
            Expr::Exponentiation(l, r) => l.eval(env).powf(r.eval(env)),
            Expr::Negate(l) => -l.eval(env),
            Expr::NaturalExp(l) => l.eval(env).exp(),
            Expr::Log(l) => l.eval(env).ln(),
            Expr::Sqrt(l) => l.eval(env).sqrt(),
            Expr::Cosine(l) => l.eval(env).cos(),
            Expr::Sine(l) => l.eval(env).sin(),
            Expr::Tangent(l) => l.eval(env).tan(),
        }
    }

    /// Evaluate to a complex number against `env`.
    ///
    /// Modulus is defined for real operands only; with a nonzero imaginary
    /// part on either side the result is NaN.
    pub fn eval_complex(&self, env: &HashMap<String, Complex64>) -> Complex64 {
        match self {
            Expr::Number(n) => Complex64::new(*n, 0.0),
            Expr::Imaginary(n) => Complex64::new(0.0, *n),
            Expr::ENotation(m, e) => {
                m.eval_complex(env) * Complex64::new(10.0, 0.0).powc(e.eval_complex(env))
            }
            Expr::Variable(name) => env
                .get(name)
                .copied()
                .unwrap_or_else(|| Complex64::new(f64::NAN, f64::NAN)),
            Expr::Pi => Complex64::new(consts::PI, 0.0),
            Expr::NaturalE => Complex64::new(consts::E, 0.0),
            Expr::Add(l, r) => l.eval_complex(env) + r.eval_complex(env),
            Expr::Subtract(l, r) => l.eval_complex(env) - r.eval_complex(env),
            Expr::Multiply(l, r) => l.eval_complex(env) * r.eval_complex(env),
            Expr::Divide(l, r) => l.eval_complex(env) / r.eval_complex(env),
            Expr::Modulus(l, r) => {
                let (l, r) = (l.eval_complex(env), r.eval_complex(env));
                if l.im == 0.0 && r.im == 0.0 {
                    Complex64::new(l.re % r.re, 0.0)
                } else {
                    Complex64::new(f64::NAN, f64::NAN)
                }
            }
            Expr::Exponentiation(l, r) => l.eval_complex(env).powc(r.eval_complex(env)),
            Expr::Negate(l) => -l.eval_complex(env),
            Expr::NaturalExp(l) => l.eval_complex(env).exp(),
            Expr::Log(l) => l.eval_complex(env).ln(),
            Expr::Sqrt(l) => l.eval_complex(env).sqrt(),
            Expr::Cosine(l) => l.eval_complex(env).cos(),
            Expr::Sine(l) => l.eval_complex(env).sin(),
            Expr::Tangent(l) => l.eval_complex(env).tan(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn eval_str(input: &str, x: f64) -> f64 {
        let env: HashMap<String, f64> = [("x".to_string(), x)].into_iter().collect();
        parse(input).unwrap().eval(&env)
    }

    #[test]
    fn test_eval_arithmetic() {
        assert_eq!(eval_str("1 + 2 * 3", 0.0), 7.0);
        assert_eq!(eval_str("(1 + 2) * 3", 0.0), 9.0);
        assert_eq!(eval_str("2 ^ 10", 0.0), 1024.0);
        assert_eq!(eval_str("7 % 3", 0.0), 1.0);
    }

    #[test]
    fn test_eval_variables_and_constants() {
        assert_eq!(eval_str("x * x", 5.0), 25.0);
        assert!((eval_str("pi", 0.0) - consts::PI).abs() < 1e-15);
        assert!((eval_str("e", 0.0) - consts::E).abs() < 1e-15);
        assert!(eval_str("y", 1.0).is_nan());
    }

    #[test]
    fn test_eval_functions() {
        assert!((eval_str("sin(pi / 2)", 0.0) - 1.0).abs() < 1e-12);
        assert!((eval_str("sqrt(x)", 16.0) - 4.0).abs() < 1e-12);
        assert!((eval_str("log(e)", 0.0) - 1.0).abs() < 1e-12);
        assert!((eval_str("tan(0)", 0.0)).abs() < 1e-12);
    }

    #[test]
    fn test_division_by_zero_is_not_an_error() {
        assert!(eval_str("1 / 0", 0.0).is_infinite());
        assert!(eval_str("0 / 0", 0.0).is_nan());
        assert!(eval_str("1 / x", 0.0).is_infinite());
    }

    #[test]
    fn test_e_notation_eval() {
        let expr = Expr::e_notation(Expr::number(3.0), Expr::number(2.0));
        assert_eq!(expr.eval(&HashMap::new()), 300.0);
    }

    #[test]
    fn test_eval_complex_imaginary_unit() {
        let env = HashMap::new();
        // i * i = -1
        let expr = Expr::multiply(Expr::Imaginary(1.0), Expr::Imaginary(1.0));
        let result = expr.eval_complex(&env);
        assert!((result.re + 1.0).abs() < 1e-12);
        assert!(result.im.abs() < 1e-12);
    }

    #[test]
    fn test_eval_complex_euler_identity() {
        let env = HashMap::new();
        // e^(i*pi) = -1
        let expr = Expr::natural_exp(Expr::multiply(Expr::Imaginary(1.0), Expr::Pi));
        let result = expr.eval_complex(&env);
        assert!((result.re + 1.0).abs() < 1e-12);
        assert!(result.im.abs() < 1e-12);
    }

    #[test]
    fn test_eval_complex_modulus_defined_for_reals_only() {
        let env = HashMap::new();
        let real = Expr::modulus(Expr::number(7.0), Expr::number(3.0));
        assert_eq!(real.eval_complex(&env).re, 1.0);

        let complex = Expr::modulus(Expr::Imaginary(1.0), Expr::number(3.0));
        assert!(complex.eval_complex(&env).re.is_nan());
    }

    #[test]
    fn test_eval_complex_agrees_with_real_on_real_trees() {
        let expr = parse("x^2 + sin(x) - 1 / x").unwrap();
        for x in [0.5, 1.0, 2.5] {
            let real_env: HashMap<String, f64> = [("x".to_string(), x)].into_iter().collect();
            let complex_env: HashMap<String, Complex64> =
                [("x".to_string(), Complex64::new(x, 0.0))].into_iter().collect();
            let a = expr.eval(&real_env);
            let b = expr.eval_complex(&complex_env);
            assert!((a - b.re).abs() < 1e-12);
            assert!(b.im.abs() < 1e-12);
        }
    }
}

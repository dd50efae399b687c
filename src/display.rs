// Display formatting for expression trees
use crate::Expr;
use std::fmt;

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => format_number(f, *n),

            Expr::Imaginary(n) => {
                format_number(f, *n)?;
                write!(f, "i")
            }

            // The i suffix of an imaginary mantissa is carried by the
            // mantissa itself.
            Expr::ENotation(m, e) => write!(f, "{} e {}", m, e),

            Expr::Variable(name) => write!(f, "{}", name),

            Expr::Pi => write!(f, "pi"),
            Expr::NaturalE => write!(f, "e"),

            Expr::Add(l, r) => write!(f, "({} + {})", l, r),
            Expr::Subtract(l, r) => write!(f, "({} - {})", l, r),
            Expr::Multiply(l, r) => write!(f, "({} * {})", l, r),
            Expr::Divide(l, r) => write!(f, "({} / {})", l, r),
            Expr::Modulus(l, r) => write!(f, "({} % {})", l, r),
            Expr::Exponentiation(l, r) => write!(f, "({} ^ {})", l, r),

            Expr::Negate(l) => write!(f, "-({})", l),

            Expr::NaturalExp(l) => write!(f, "(e^{})", l),

            Expr::Log(l) => write!(f, "log({})", l),
            Expr::Sqrt(l) => write!(f, "sqrt({})", l),
            Expr::Cosine(l) => write!(f, "cos({})", l),
            Expr::Sine(l) => write!(f, "sin({})", l),
            Expr::Tangent(l) => write!(f, "tan({})", l),
        }
    }
}

/// Minimum-precision decimal: integral values print without a fraction
fn format_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        write!(f, "NaN")
    } else if n.is_infinite() {
        if n > 0.0 {
            write!(f, "Infinity")
        } else {
            write!(f, "-Infinity")
        }
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}

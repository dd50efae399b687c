use crate::Expr;
use crate::error::Error;
use crate::parser::lexer::{Func, Operator, Token};

/// Parse tokens into a tree using Pratt precedence climbing
pub(crate) fn parse_expression(tokens: &[Token]) -> Result<Expr, Error> {
    if tokens.is_empty() {
        return Err(Error::UnexpectedEndOfInput);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr(0)?;

    match parser.current() {
        None => Ok(expr),
        Some(token) => Err(Error::unexpected_token(
            "end of input",
            describe(Some(token)),
        )),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn parse_expr(&mut self, min_precedence: u8) -> Result<Expr, Error> {
        let mut left = self.parse_prefix()?;

        while let Some(Token::Operator(op)) = self.current() {
            let op = *op;
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();

            let next_min = if op.is_right_associative() {
                precedence
            } else {
                precedence + 1
            };
            let right = self.parse_expr(next_min)?;

            left = match op {
                Operator::Add => Expr::add(left, right),
                Operator::Sub => Expr::subtract(left, right),
                Operator::Mul => Expr::multiply(left, right),
                Operator::Div => Expr::divide(left, right),
                Operator::Mod => Expr::modulus(left, right),
                Operator::Pow => Expr::exponentiation(left, right),
            };
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, Error> {
        let token = self
            .current()
            .ok_or(Error::UnexpectedEndOfInput)?
            .clone();

        match token {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::number(n))
            }

            Token::Identifier(name) => {
                self.advance();
                Ok(Expr::variable(name))
            }

            Token::Pi => {
                self.advance();
                Ok(Expr::Pi)
            }

            Token::E => {
                self.advance();
                Ok(Expr::NaturalE)
            }

            // Unary minus nests directly above atoms, so it binds tighter
            // than every infix operator and stacks: --x is -(-(x))
            Token::Operator(Operator::Sub) => {
                self.advance();
                Ok(Expr::negate(self.parse_prefix()?))
            }

            Token::Function(func) => {
                self.advance();
                self.expect(&Token::LeftParen, "(")?;
                let arg = self.parse_expr(0)?;
                self.expect(&Token::RightParen, ")")?;
                Ok(match func {
                    Func::Cos => Expr::cosine(arg),
                    Func::Sin => Expr::sine(arg),
                    Func::Tan => Expr::tangent(arg),
                    Func::Sqrt => Expr::sqrt(arg),
                    Func::Log => Expr::log(arg),
                })
            }

            Token::LeftParen => {
                self.advance();
                let expr = self.parse_expr(0)?;
                self.expect(&Token::RightParen, ")")?;
                Ok(expr)
            }

            other => Err(Error::unexpected_token("a value", describe(Some(&other)))),
        }
    }

    fn expect(&mut self, want: &Token, name: &str) -> Result<(), Error> {
        match self.current() {
            Some(token) if token == want => {
                self.advance();
                Ok(())
            }
            other => Err(Error::unexpected_token(name, describe(other))),
        }
    }
}

fn describe(token: Option<&Token>) -> String {
    match token {
        None => "end of input".to_string(),
        Some(Token::Number(n)) => format!("{}", n),
        Some(Token::Identifier(name)) => name.clone(),
        Some(Token::Function(func)) => func.name().to_string(),
        Some(Token::Pi) => "pi".to_string(),
        Some(Token::E) => "e".to_string(),
        Some(Token::Operator(op)) => op.symbol().to_string(),
        Some(Token::LeftParen) => "(".to_string(),
        Some(Token::RightParen) => ")".to_string(),
    }
}

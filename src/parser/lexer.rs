//! Token stream for the calculator grammar

use crate::error::{Error, Span};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Identifier(String),
    Function(Func),
    Pi,
    E,
    Operator(Operator),
    LeftParen,
    RightParen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Func {
    Cos,
    Sin,
    Tan,
    Sqrt,
    Log,
}

impl Func {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Func::Cos => "cos",
            Func::Sin => "sin",
            Func::Tan => "tan",
            Func::Sqrt => "sqrt",
            Func::Log => "log",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl Operator {
    /// Binding power for the Pratt loop
    pub(crate) fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 10,
            Operator::Mul | Operator::Div | Operator::Mod => 20,
            Operator::Pow => 30,
        }
    }

    pub(crate) fn is_right_associative(self) -> bool {
        matches!(self, Operator::Pow)
    }

    pub(crate) fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Pow => "^",
        }
    }
}

/// Split the input into tokens, attaching byte spans to errors
pub(crate) fn lex(input: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::with_capacity(input.len() / 2);
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' => {
                tokens.push(Token::Operator(Operator::Add));
                chars.next();
            }
            '-' => {
                tokens.push(Token::Operator(Operator::Sub));
                chars.next();
            }
            '*' => {
                tokens.push(Token::Operator(Operator::Mul));
                chars.next();
            }
            '/' => {
                tokens.push(Token::Operator(Operator::Div));
                chars.next();
            }
            '%' => {
                tokens.push(Token::Operator(Operator::Mod));
                chars.next();
            }
            '^' => {
                tokens.push(Token::Operator(Operator::Pow));
                chars.next();
            }
            '(' => {
                tokens.push(Token::LeftParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RightParen);
                chars.next();
            }
            '0'..='9' => {
                let start = pos;
                let mut end = pos;
                let mut seen_dot = false;
                while let Some(&(p, c)) = chars.peek() {
                    if c.is_ascii_digit() || (c == '.' && !seen_dot) {
                        seen_dot |= c == '.';
                        end = p + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let text = &input[start..end];
                let value = text
                    .parse::<f64>()
                    .map_err(|_| Error::invalid_number_at(text, Span::new(start, end)))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = pos;
                let mut end = pos;
                while let Some(&(p, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        end = p + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(keyword(&input[start..end]));
            }
            other => {
                return Err(Error::invalid_token_at(
                    other,
                    Span::new(pos, pos + other.len_utf8()),
                ));
            }
        }
    }

    Ok(tokens)
}

fn keyword(word: &str) -> Token {
    match word {
        "pi" => Token::Pi,
        "e" => Token::E,
        "cos" => Token::Function(Func::Cos),
        "sin" => Token::Function(Func::Sin),
        "tan" => Token::Function(Func::Tan),
        "sqrt" => Token::Function(Func::Sqrt),
        "log" => Token::Function(Func::Log),
        _ => Token::Identifier(word.to_string()),
    }
}

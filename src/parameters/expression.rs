//! Formula parsing and evaluation
//!
//! Observable and noise formulas are parsed into a small AST so their symbols
//! can be enumerated (placeholder and output parameter detection) and, once all
//! symbols are bound, evaluated numerically.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0},
    combinator::{map, not, opt, recognize, value},
    multi::{fold_many0, many0, separated_list0},
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated},
    IResult, Parser,
};
use std::collections::HashMap;
use thiserror::Error;

/// Error that can occur during expression parsing or evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Failed to parse expression: {message}")]
    ParseError { message: String },

    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    #[error("Undefined function: {name}")]
    UndefinedFunction { name: String },
}

/// Result type for expression evaluation
type ExprResult<T> = Result<T, ExpressionError>;

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Constant number
    Number(f64),

    /// Symbol reference (model entity, parameter or placeholder)
    Variable(String),

    /// Unary operations
    Unary(UnaryOp, Box<Expression>),

    /// Binary operations
    Binary(BinaryOp, Box<Expression>, Box<Expression>),

    /// Function call
    Function(String, Vec<Expression>),
}

/// Unary operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
}

/// Binary operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Power (`^` or `**`)
    Pow,
}

/// Context for expression evaluation, providing variable values
pub trait EvaluationContext {
    /// Get the value of a variable
    fn get_variable(&self, name: &str) -> ExprResult<f64>;

    /// Check if a variable exists
    fn has_variable(&self, name: &str) -> bool;
}

/// Simple implementation of EvaluationContext using a HashMap
#[derive(Debug, Clone, Default)]
pub struct SimpleContext {
    variables: HashMap<String, f64>,
}

impl SimpleContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self {
            variables: HashMap::new(),
        }
    }

    /// Set a variable value
    pub fn set_variable(&mut self, name: &str, value: f64) {
        self.variables.insert(name.to_string(), value);
    }

    /// Create a new context with the given variables
    pub fn with_variables(variables: HashMap<String, f64>) -> Self {
        Self { variables }
    }
}

impl EvaluationContext for SimpleContext {
    fn get_variable(&self, name: &str) -> ExprResult<f64> {
        self.variables.get_variable(name)
    }

    fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }
}

impl EvaluationContext for HashMap<String, f64> {
    fn get_variable(&self, name: &str) -> ExprResult<f64> {
        self.get(name)
            .copied()
            .ok_or_else(|| ExpressionError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    fn has_variable(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

fn expect_args(name: &str, args: &[f64], count: usize) -> ExprResult<()> {
    if args.len() != count {
        return Err(ExpressionError::InvalidOperation {
            message: format!("{}() requires {} argument(s), got {}", name, count, args.len()),
        });
    }
    Ok(())
}

fn call_function(name: &str, args: &[f64]) -> ExprResult<f64> {
    let unary: Option<fn(f64) -> f64> = match name {
        "sin" => Some(f64::sin),
        "cos" => Some(f64::cos),
        "tan" => Some(f64::tan),
        "exp" => Some(f64::exp),
        "ln" => Some(f64::ln),
        "log10" => Some(f64::log10),
        "log2" => Some(f64::log2),
        "sqrt" => Some(f64::sqrt),
        "abs" => Some(f64::abs),
        _ => None,
    };
    if let Some(f) = unary {
        expect_args(name, args, 1)?;
        return Ok(f(args[0]));
    }

    match name {
        // log(x) is the natural logarithm, log(x, b) uses base b
        "log" => match args {
            [x] => Ok(x.ln()),
            [x, base] => Ok(x.ln() / base.ln()),
            _ => Err(ExpressionError::InvalidOperation {
                message: format!("log() requires 1 or 2 arguments, got {}", args.len()),
            }),
        },
        "pow" => {
            expect_args(name, args, 2)?;
            Ok(args[0].powf(args[1]))
        }
        "max" | "min" => {
            if args.len() < 2 {
                return Err(ExpressionError::InvalidOperation {
                    message: format!("{}() requires at least 2 arguments, got {}", name, args.len()),
                });
            }
            if name == "max" {
                Ok(args.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)))
            } else {
                Ok(args.iter().fold(f64::INFINITY, |a, &b| a.min(b)))
            }
        }
        _ => Err(ExpressionError::UndefinedFunction {
            name: name.to_string(),
        }),
    }
}

impl Expression {
    /// Parse an expression from a string
    pub fn parse(input: &str) -> ExprResult<Self> {
        match ws(expr_parser).parse(input) {
            Ok((remainder, expr)) => {
                if remainder.is_empty() {
                    Ok(expr)
                } else {
                    Err(ExpressionError::ParseError {
                        message: format!("Unexpected trailing characters: '{}'", remainder),
                    })
                }
            }
            Err(e) => Err(ExpressionError::ParseError {
                message: format!("'{}': {:?}", input, e),
            }),
        }
    }

    /// Evaluate the expression with the given context
    pub fn evaluate<C: EvaluationContext>(&self, context: &C) -> ExprResult<f64> {
        match self {
            Self::Number(n) => Ok(*n),

            Self::Variable(name) => context.get_variable(name),

            Self::Unary(UnaryOp::Neg, expr) => Ok(-expr.evaluate(context)?),

            Self::Binary(op, left, right) => {
                let lhs = left.evaluate(context)?;
                let rhs = right.evaluate(context)?;

                match op {
                    BinaryOp::Add => Ok(lhs + rhs),
                    BinaryOp::Sub => Ok(lhs - rhs),
                    BinaryOp::Mul => Ok(lhs * rhs),
                    BinaryOp::Div => {
                        if rhs == 0.0 {
                            Err(ExpressionError::DivisionByZero)
                        } else {
                            Ok(lhs / rhs)
                        }
                    }
                    BinaryOp::Pow => Ok(lhs.powf(rhs)),
                }
            }

            Self::Function(name, args) => {
                let evaluated = args
                    .iter()
                    .map(|arg| arg.evaluate(context))
                    .collect::<ExprResult<Vec<f64>>>()?;
                call_function(name, &evaluated)
            }
        }
    }

    /// All symbol names used in the expression, sorted and deduplicated.
    /// Function names are not symbols.
    pub fn variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars.sort();
        vars.dedup();
        vars
    }

    fn collect_variables(&self, vars: &mut Vec<String>) {
        match self {
            Self::Number(_) => {}
            Self::Variable(name) => vars.push(name.clone()),
            Self::Unary(_, expr) => expr.collect_variables(vars),
            Self::Binary(_, left, right) => {
                left.collect_variables(vars);
                right.collect_variables(vars);
            }
            Self::Function(_, args) => {
                for arg in args {
                    arg.collect_variables(vars);
                }
            }
        }
    }

    /// Whether the expression is a plain number, possibly negated.
    pub fn as_constant(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Unary(UnaryOp::Neg, inner) => inner.as_constant().map(|n| -n),
            _ => None,
        }
    }
}

// Parser functions using nom

type PResult<'a, T> = IResult<&'a str, T>;

/// Wrap a parser so it skips surrounding whitespace
fn ws<'a, O, P>(inner: P) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    P: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse an identifier (variable or function name)
fn identifier(input: &str) -> PResult<String> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0(alt((alphanumeric1, tag("_")))),
        )),
        |matched: &str| matched.to_string(),
    )
    .parse(input)
}

fn function_call(input: &str) -> PResult<Expression> {
    map(
        pair(
            identifier,
            delimited(
                ws(char('(')),
                separated_list0(ws(char(',')), expr_parser),
                ws(char(')')),
            ),
        ),
        |(name, args)| Expression::Function(name, args),
    )
    .parse(input)
}

fn variable(input: &str) -> PResult<Expression> {
    map(identifier, Expression::Variable).parse(input)
}

fn number(input: &str) -> PResult<Expression> {
    map(double, Expression::Number).parse(input)
}

fn parens(input: &str) -> PResult<Expression> {
    delimited(ws(char('(')), expr_parser, ws(char(')'))).parse(input)
}

/// Identifiers are tried before numbers so that symbols such as `inf_rate`
/// are not read as the float literal `inf`.
fn primary(input: &str) -> PResult<Expression> {
    ws(alt((function_call, variable, number, parens))).parse(input)
}

/// Right-associative power; the exponent may carry a sign (`2^-1`)
fn power(input: &str) -> PResult<Expression> {
    map(
        pair(
            primary,
            opt(preceded(ws(alt((tag("**"), tag("^")))), factor)),
        ),
        |(base, exponent)| match exponent {
            Some(exponent) => Expression::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)),
            None => base,
        },
    )
    .parse(input)
}

/// Signed factor (`-x`, `+x`, `-x^2` is `-(x^2)`)
fn factor(input: &str) -> PResult<Expression> {
    alt((
        map(preceded(ws(char('-')), factor), |expr| {
            Expression::Unary(UnaryOp::Neg, Box::new(expr))
        }),
        preceded(ws(char('+')), factor),
        power,
    ))
    .parse(input)
}

/// Left-associative multiplication and division
fn term(input: &str) -> PResult<Expression> {
    let (input, first) = factor(input)?;
    fold_many0(
        pair(
            ws(alt((
                value(BinaryOp::Mul, terminated(char('*'), not(char('*')))),
                value(BinaryOp::Div, char('/')),
            ))),
            factor,
        ),
        move || first.clone(),
        |acc, (op, rhs)| Expression::Binary(op, Box::new(acc), Box::new(rhs)),
    )
    .parse(input)
}

/// Left-associative addition and subtraction
fn expr_parser(input: &str) -> PResult<Expression> {
    let (input, first) = term(input)?;
    fold_many0(
        pair(
            ws(alt((
                value(BinaryOp::Add, char('+')),
                value(BinaryOp::Sub, char('-')),
            ))),
            term,
        ),
        move || first.clone(),
        |acc, (op, rhs)| Expression::Binary(op, Box::new(acc), Box::new(rhs)),
    )
    .parse(input)
}

//! RPN size expressions used by the WIDTH, HEIGHT and WHEN directives.
//!
//! An expression is a whitespace-separated token stream in reverse Polish
//! order, e.g. `HOOKED.w 2 *` or `OUTPUT.h HOOKED.h >`. Parsing keeps the
//! tokens in source order; evaluation runs them through a small stack
//! machine against texture sizes supplied by the host.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    error::{EvalError, ParseError},
    options::ParserOptions,
    scan,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Axis {
    Width,
    Height,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    GreaterThan,
    LessThan,
}

impl BinaryOp {
    fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::GreaterThan => bool_to_f32(a > b),
            BinaryOp::LessThan => bool_to_f32(a < b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SzExpToken {
    /// Width or height of a named texture (`NAME.w`, `NAME.height`, ...).
    Variable { name: String, axis: Axis },
    Constant(f32),
    UnaryOp(UnaryOp),
    BinaryOp(BinaryOp),
}

impl SzExpToken {
    pub fn var_w(name: impl Into<String>) -> Self {
        SzExpToken::Variable {
            name: name.into(),
            axis: Axis::Width,
        }
    }

    pub fn var_h(name: impl Into<String>) -> Self {
        SzExpToken::Variable {
            name: name.into(),
            axis: Axis::Height,
        }
    }
}

/// Tokens of one RPN expression, in the order they were written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SizeExpr(Vec<SzExpToken>);

impl SizeExpr {
    pub fn new(tokens: Vec<SzExpToken>) -> Self {
        Self(tokens)
    }

    pub fn tokens(&self) -> &[SzExpToken] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Run the expression and return the single value left on the stack.
    pub fn eval<L: SizeLookup + ?Sized>(&self, lookup: &L) -> Result<f32, EvalError> {
        let result = self.eval_inner(lookup);
        if let Err(e) = &result {
            tracing::warn!("{e}");
        }
        result
    }

    fn eval_inner<L: SizeLookup + ?Sized>(&self, lookup: &L) -> Result<f32, EvalError> {
        let mut stack: Vec<f32> = Vec::with_capacity(self.0.len());

        for token in &self.0 {
            match token {
                SzExpToken::Constant(v) => stack.push(*v),
                SzExpToken::Variable { name, axis } => {
                    let [w, h] = lookup
                        .texture_size(name)
                        .ok_or_else(|| EvalError::UnknownVariable(name.clone()))?;
                    stack.push(match axis {
                        Axis::Width => w,
                        Axis::Height => h,
                    });
                }
                SzExpToken::UnaryOp(UnaryOp::Not) => {
                    let top = stack.last_mut().ok_or(EvalError::StackUnderflow)?;
                    *top = bool_to_f32(*top == 0.0);
                }
                SzExpToken::BinaryOp(op) => {
                    // Operands come off in reverse order.
                    let b = stack.pop().ok_or(EvalError::StackUnderflow)?;
                    let a = stack.pop().ok_or(EvalError::StackUnderflow)?;
                    let res = op.apply(a, b);
                    if !res.is_finite() {
                        return Err(EvalError::IllegalOperation);
                    }
                    stack.push(res);
                }
            }
        }

        match stack.as_slice() {
            [v] => Ok(*v),
            other => Err(EvalError::MalformedStack(other.len())),
        }
    }
}

impl From<Vec<SzExpToken>> for SizeExpr {
    fn from(tokens: Vec<SzExpToken>) -> Self {
        Self(tokens)
    }
}

fn bool_to_f32(b: bool) -> f32 {
    if b { 1.0 } else { 0.0 }
}

/// Resolves texture names referenced by size expressions to `[w, h]`.
pub trait SizeLookup {
    fn texture_size(&self, name: &str) -> Option<[f32; 2]>;
}

impl<F> SizeLookup for F
where
    F: Fn(&str) -> Option<[f32; 2]>,
{
    fn texture_size(&self, name: &str) -> Option<[f32; 2]> {
        self(name)
    }
}

/// Name -> size table a host fills with `HOOKED`, `OUTPUT`,
/// `NATIVE_CROPPED` and any saved textures before evaluating passes.
#[derive(Debug, Clone, Default)]
pub struct TextureSizes {
    sizes: HashMap<String, [f32; 2]>,
}

impl TextureSizes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, w: f32, h: f32) -> Self {
        self.insert(name, w, h);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, w: f32, h: f32) {
        self.sizes.insert(name.into(), [w, h]);
    }
}

impl SizeLookup for TextureSizes {
    fn texture_size(&self, name: &str) -> Option<[f32; 2]> {
        self.sizes.get(name).copied()
    }
}

/// Parse an RPN expression with the default limits.
pub fn parse_size_expr(line: &str) -> Result<SizeExpr, ParseError> {
    parse_size_expr_with(line, &ParserOptions::default())
}

pub fn parse_size_expr_with(line: &str, opts: &ParserOptions) -> Result<SizeExpr, ParseError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.len() > opts.max_szexp_size {
        return Err(ParseError::CapacityExceeded {
            what: "size expression",
            limit: opts.max_szexp_size,
        });
    }

    let tokens = words
        .into_iter()
        .map(|word| parse_word(word, opts))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SizeExpr(tokens))
}

fn parse_word(word: &str, opts: &ParserOptions) -> Result<SzExpToken, ParseError> {
    if let Some(name) = word
        .strip_suffix(".w")
        .or_else(|| word.strip_suffix(".width"))
    {
        return Ok(SzExpToken::var_w(name));
    }

    if let Some(name) = word
        .strip_suffix(".h")
        .or_else(|| word.strip_suffix(".height"))
    {
        return Ok(SzExpToken::var_h(name));
    }

    let Some(first) = word.chars().next() else {
        return Err(ParseError::InvalidSizeExpressionToken(word.to_string()));
    };

    let op = match first {
        '+' => Some(SzExpToken::BinaryOp(BinaryOp::Add)),
        '-' => Some(SzExpToken::BinaryOp(BinaryOp::Sub)),
        '*' => Some(SzExpToken::BinaryOp(BinaryOp::Mul)),
        '/' => Some(SzExpToken::BinaryOp(BinaryOp::Div)),
        '!' => Some(SzExpToken::UnaryOp(UnaryOp::Not)),
        '>' => Some(SzExpToken::BinaryOp(BinaryOp::GreaterThan)),
        '<' => Some(SzExpToken::BinaryOp(BinaryOp::LessThan)),
        _ => None,
    };
    if let Some(op) = op {
        if word.len() > 1 {
            if opts.strict_operators {
                return Err(ParseError::InvalidSizeExpressionToken(word.to_string()));
            }
            tracing::trace!("ignoring trailing characters of operator token '{word}'");
        }
        return Ok(op);
    }

    if first.is_ascii_digit() {
        let value = if opts.strict_numbers {
            word.parse::<f32>().ok()
        } else {
            scan::leading_f32(word).map(|(value, rest)| {
                if !rest.is_empty() {
                    tracing::trace!("ignoring trailing characters of constant '{word}'");
                }
                value
            })
        };
        return value
            .map(SzExpToken::Constant)
            .ok_or_else(|| ParseError::InvalidSizeExpressionToken(word.to_string()));
    }

    Err(ParseError::InvalidSizeExpressionToken(word.to_string()))
}

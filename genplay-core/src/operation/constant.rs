use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{OperationError, OperationResult};
use crate::pool::TaskContext;
use crate::types::{Score, ScoredWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    pub fn apply(self, score: Score, value: Score) -> Score {
        match self {
            ArithmeticOp::Add => score + value,
            ArithmeticOp::Subtract => score - value,
            ArithmeticOp::Multiply => score * value,
            ArithmeticOp::Divide => score / value,
        }
    }

    /// Constant leaving every score unchanged
    pub fn identity(self) -> Score {
        match self {
            ArithmeticOp::Add | ArithmeticOp::Subtract => 0.0,
            ArithmeticOp::Multiply | ArithmeticOp::Divide => 1.0,
        }
    }

    pub fn is_identity(self, value: Score) -> bool {
        value == self.identity()
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithmeticOp::Add => write!(f, "add"),
            ArithmeticOp::Subtract => write!(f, "subtract"),
            ArithmeticOp::Multiply => write!(f, "multiply"),
            ArithmeticOp::Divide => write!(f, "divide"),
        }
    }
}

impl FromStr for ArithmeticOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" | "+" => Ok(ArithmeticOp::Add),
            "subtract" | "sub" | "-" => Ok(ArithmeticOp::Subtract),
            "multiply" | "mul" | "*" => Ok(ArithmeticOp::Multiply),
            "divide" | "div" | "/" => Ok(ArithmeticOp::Divide),
            other => Err(format!("unknown arithmetic operation: {}", other)),
        }
    }
}

pub(crate) fn validate(op: ArithmeticOp, value: Score) -> OperationResult<()> {
    if !value.is_finite() {
        return Err(OperationError::InvalidParameter(format!(
            "constant must be finite, got {}",
            value
        )));
    }
    if op == ArithmeticOp::Divide && value == 0.0 {
        return Err(OperationError::InvalidParameter(
            "cannot divide by zero".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn apply(
    op: ArithmeticOp,
    value: Score,
    ctx: &TaskContext<'_>,
    windows: &[ScoredWindow],
) -> Vec<ScoredWindow> {
    let mut result = Vec::with_capacity(windows.len());
    for (i, window) in windows.iter().enumerate() {
        if ctx.checkpoint(i) {
            break;
        }
        result.push(window.with_score(op.apply(window.score, value)));
    }
    result
}

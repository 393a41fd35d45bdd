//! Wire contract shared by the calculator client and server.
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest operand list the engine accepts.
pub const MAX_NUMBERS: usize = 20;

/// The four supported operations. On the wire this travels as its integer
/// code so that a peer can send a code this build does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Operation {
    Sum = 0,
    Subtract = 1,
    Multiply = 2,
    Divide = 3,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Sum,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Sum => "SUM",
            Operation::Subtract => "SUBTRACT",
            Operation::Multiply => "MULTIPLY",
            Operation::Divide => "DIVIDE",
        }
    }
}

impl TryFrom<i32> for Operation {
    type Error = CalcError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Operation::ALL
            .into_iter()
            .find(|op| op.code() == code)
            .ok_or(CalcError::UnsupportedOperation(code))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Request for a calculation. Any operand count is representable here; the
/// engine is what rejects counts outside `1..=MAX_NUMBERS`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CalculationRequest {
    pub operation: i32,
    pub numbers: Vec<f64>,
}

impl CalculationRequest {
    pub fn new(operation: Operation, numbers: Vec<f64>) -> Self {
        Self {
            operation: operation.code(),
            numbers,
        }
    }

    /// Decodes the operation tag.
    pub fn operation(&self) -> Result<Operation, CalcError> {
        Operation::try_from(self.operation)
    }
}

/// Response from a calculation: exactly one of `result` and `error_message`
/// is set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CalculationResponse {
    result: Option<f64>,
    error_message: Option<String>,
}

impl CalculationResponse {
    pub fn success(result: f64) -> Self {
        Self {
            result: Some(result),
            error_message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error_message: Some(message.into()),
        }
    }

    pub fn result(&self) -> Option<f64> {
        self.result
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// False for a decoded response that carries both fields, neither, or an
    /// empty error message.
    pub fn is_well_formed(&self) -> bool {
        match (&self.result, &self.error_message) {
            (Some(_), None) => true,
            (None, Some(message)) => !message.is_empty(),
            _ => false,
        }
    }
}

impl From<Result<f64, CalcError>> for CalculationResponse {
    fn from(outcome: Result<f64, CalcError>) -> Self {
        match outcome {
            Ok(value) => CalculationResponse::success(value),
            Err(e) => CalculationResponse::failure(e.to_string()),
        }
    }
}

/// Errors that can occur in calculator operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("operand count must be between 1 and {max}, received: {count}", max = MAX_NUMBERS)]
    OperandCount { count: usize },

    #[error("calculation error: division requires a dividend and at least one divisor")]
    InsufficientOperands,

    #[error("calculation error: division by zero not allowed")]
    DivisionByZero,

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(i32),

    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_codes_round_trip() {
        for op in Operation::ALL {
            assert_eq!(Operation::try_from(op.code()), Ok(op));
        }
        assert_eq!(
            Operation::try_from(9),
            Err(CalcError::UnsupportedOperation(9))
        );
    }

    #[test]
    fn response_from_outcome_populates_exactly_one_field() {
        let ok = CalculationResponse::from(Ok(4.5));
        assert_eq!(ok.result(), Some(4.5));
        assert!(ok.error_message().is_none());
        assert!(ok.is_well_formed());

        let err = CalculationResponse::from(Err(CalcError::DivisionByZero));
        assert!(err.result().is_none());
        assert_eq!(
            err.error_message(),
            Some("calculation error: division by zero not allowed")
        );
        assert!(err.is_well_formed());
    }

    #[test]
    fn decoded_response_with_both_fields_is_malformed() {
        let both = CalculationResponse {
            result: Some(1.0),
            error_message: Some("nope".into()),
        };
        assert!(!both.is_well_formed());

        let neither = CalculationResponse {
            result: None,
            error_message: None,
        };
        assert!(!neither.is_well_formed());
    }

    #[test]
    fn operand_count_message_cites_range_and_count() {
        let msg = CalcError::OperandCount { count: 21 }.to_string();
        assert_eq!(msg, "operand count must be between 1 and 20, received: 21");
    }
}

//! Request validation and arithmetic.
//!
//! The engine is a pure function of its request: it keeps no state between
//! calls, never blocks, and always produces a well-formed
//! [`CalculationResponse`]. A result that overflowed to a non-finite value
//! comes back as an internal error. Panics in a handler are caught one level
//! up, by the server's dispatch.

use tracing::info;

use super::types::{CalcError, CalculationRequest, CalculationResponse, Operation, MAX_NUMBERS};

/// Runs a request through validation and the selected operation.
pub fn calculate(request: &CalculationRequest) -> CalculationResponse {
    CalculationResponse::from(evaluate(request))
}

/// Like [`calculate`] but keeps the outcome as a `Result`.
pub fn evaluate(request: &CalculationRequest) -> Result<f64, CalcError> {
    check_operand_count(&request.numbers)?;
    let operation = request.operation()?;

    info!(%operation, numbers = ?request.numbers, "received calculation request");

    let value = apply(operation, &request.numbers)?;

    if !value.is_finite() {
        return Err(CalcError::Internal(format!(
            "{operation} produced a non-finite result ({value})"
        )));
    }
    Ok(value)
}

fn check_operand_count(numbers: &[f64]) -> Result<(), CalcError> {
    let count = numbers.len();
    if (1..=MAX_NUMBERS).contains(&count) {
        Ok(())
    } else {
        Err(CalcError::OperandCount { count })
    }
}

fn apply(operation: Operation, numbers: &[f64]) -> Result<f64, CalcError> {
    match operation {
        Operation::Sum => Ok(numbers.iter().sum()),
        Operation::Subtract => {
            let (first, rest) = numbers
                .split_first()
                .ok_or(CalcError::OperandCount { count: 0 })?;
            Ok(first - rest.iter().sum::<f64>())
        }
        Operation::Multiply => Ok(numbers.iter().fold(1.0, |acc, n| acc * n)),
        Operation::Divide => divide(numbers),
    }
}

// Left to right; a zero anywhere discards the partial quotient.
fn divide(numbers: &[f64]) -> Result<f64, CalcError> {
    let (dividend, divisors) = match numbers.split_first() {
        Some((dividend, divisors)) if !divisors.is_empty() => (*dividend, divisors),
        _ => return Err(CalcError::InsufficientOperands),
    };

    divisors.iter().try_fold(dividend, |acc, &divisor| {
        if divisor == 0.0 {
            Err(CalcError::DivisionByZero)
        } else {
            Ok(acc / divisor)
        }
    })
}

//! Interactive menu used by the `calc-client` binary.

use std::num::ParseFloatError;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    calculator::{CalculationRequest, CalculationResponse, CalculatorClient, Operation, MAX_NUMBERS},
    RpcError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Calculate(Operation),
    Exit,
}

pub const MENU: &str = "\n--- Remote Calculator ---\n\
1. Sum\n\
2. Subtract\n\
3. Multiply\n\
4. Divide\n\
5. Exit\n";

pub fn parse_choice(input: &str) -> Option<MenuChoice> {
    match input.trim() {
        "1" => Some(MenuChoice::Calculate(Operation::Sum)),
        "2" => Some(MenuChoice::Calculate(Operation::Subtract)),
        "3" => Some(MenuChoice::Calculate(Operation::Multiply)),
        "4" => Some(MenuChoice::Calculate(Operation::Divide)),
        "5" => Some(MenuChoice::Exit),
        _ => None,
    }
}

/// Whitespace-separated operands. Fails on the first token that is not a number.
pub fn parse_numbers(input: &str) -> Result<Vec<f64>, ParseFloatError> {
    input.split_whitespace().map(str::parse::<f64>).collect()
}

pub fn hint(operation: Operation) -> Option<&'static str> {
    match operation {
        Operation::Subtract => {
            Some("Subtract: the first number minus the sum of the remaining ones.")
        }
        Operation::Divide => Some("Divide: the first number is divided by each following one."),
        Operation::Sum | Operation::Multiply => None,
    }
}

pub fn render_response(response: &CalculationResponse) -> String {
    match (response.result(), response.error_message()) {
        (Some(value), _) => format!("STATUS: SUCCESS\nRESULT: {value}"),
        (None, Some(message)) => format!("STATUS: FAILURE\nMESSAGE: {message}"),
        (None, None) => "STATUS: FAILURE\nMESSAGE: empty response".to_string(),
    }
}

/// Runs the menu loop until the user exits or input ends. A failed call is
/// reported and ends the session with that error.
pub async fn run_session<R, W>(
    client: &CalculatorClient,
    input: R,
    mut output: W,
) -> Result<(), RpcError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        output.write_all(MENU.as_bytes()).await?;
        output.write_all(b"Choose an operation (1-5): ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let operation = match parse_choice(&line) {
            Some(MenuChoice::Exit) => {
                output.write_all(b"Closing the client. Bye!\n").await?;
                break;
            }
            Some(MenuChoice::Calculate(operation)) => operation,
            None => {
                output
                    .write_all(b"Invalid option. Please choose a number from 1 to 5.\n")
                    .await?;
                continue;
            }
        };

        let mut prompt = format!(
            "\nOperation: {operation}. Numbers separated by spaces (max. {MAX_NUMBERS}).\n"
        );
        if let Some(hint) = hint(operation) {
            prompt.push_str(hint);
            prompt.push('\n');
        }
        prompt.push_str("Enter the numbers: ");
        output.write_all(prompt.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let numbers = match parse_numbers(&line) {
            Ok(numbers) => numbers,
            Err(_) => {
                output
                    .write_all(b"ERROR: invalid input. Make sure every value is a number separated by spaces.\n")
                    .await?;
                continue;
            }
        };

        if numbers.len() > MAX_NUMBERS {
            let warning = format!(
                "WARNING: you entered more than {MAX_NUMBERS} numbers. The server may reject the request.\n"
            );
            output.write_all(warning.as_bytes()).await?;
        }

        output
            .write_all(format!("Sending {operation} request to the server...\n").as_bytes())
            .await?;

        match client
            .calculate(CalculationRequest::new(operation, numbers))
            .await
        {
            Ok(response) => {
                let report = format!(
                    "\n--- Server Response ---\n{}\n-----------------------\n",
                    render_response(&response)
                );
                output.write_all(report.as_bytes()).await?;
            }
            Err(e) => {
                let report = format!("RPC ERROR: the call to the server failed.\nDetails: {e}\n");
                output.write_all(report.as_bytes()).await?;
                output.flush().await?;
                return Err(e);
            }
        }
    }

    output.flush().await?;
    Ok(())
}

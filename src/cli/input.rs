//! Operator input handling

use crate::shutdown;
use rust_decimal::Decimal;
use std::io::{BufRead, Write};
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::{mpsc, watch};

/// Rejected operator input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    /// Not a number
    #[error("'{0}' is not a valid number")]
    InvalidInput(String),
    /// Prices cannot be negative
    #[error("Target price must be positive, got {0}")]
    Negative(Decimal),
}

/// Parse a target price. `Ok(None)` means the operator entered 0 to exit.
///
/// Accepts an optional leading `$` and thousands separators.
pub fn parse_target(input: &str) -> Result<Option<Decimal>, InputError> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();

    let value =
        Decimal::from_str(&cleaned).map_err(|_| InputError::InvalidInput(input.trim().to_string()))?;

    if value.is_zero() {
        Ok(None)
    } else if value.is_sign_negative() {
        Err(InputError::Negative(value))
    } else {
        Ok(Some(value))
    }
}

/// Lines from stdin, read on a plain OS thread.
///
/// A blocked stdin read then never holds up runtime shutdown.
pub struct StdinLines {
    rx: mpsc::Receiver<String>,
}

impl StdinLines {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel(16);
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        });
        Self { rx }
    }

    /// Print `prompt` and wait for a line. `None` on EOF or shutdown.
    pub async fn prompt(
        &mut self,
        prompt: &str,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Option<String> {
        print!("{}", prompt);
        let _ = std::io::stdout().flush();

        shutdown::or_shutdown(self.rx.recv(), shutdown)
            .await
            .flatten()
    }
}

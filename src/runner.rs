use std::fmt::Display;

use crate::{CheckResult, Severity, CRITICAL};

/// Runs a fallible check body and turns its error into a printable outcome
/// instead of a panic or an unformatted abort, so the monitoring system
/// always receives a parsable line.
pub struct Runner<E> {
    on_error: Option<Box<dyn FnOnce(&E) -> (Severity, String)>>,
}

impl<E: Display> Runner<E> {
    pub fn new() -> Self {
        Self { on_error: None }
    }

    /// Replaces the default error mapping, which is [CRITICAL] plus the
    /// display form of the error.
    pub fn on_error(mut self, f: impl FnOnce(&E) -> (Severity, String) + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Runs the check body. On error the `on_error` mapping decides the
    /// severity and message to report.
    pub fn safe_run(self, f: impl FnOnce() -> Result<CheckResult, E>) -> RunnerResult {
        match f() {
            Ok(result) => RunnerResult::Ok(result),
            Err(err) => {
                let (severity, message) = match self.on_error {
                    Some(f) => f(&err),
                    None => (CRITICAL, err.to_string()),
                };

                RunnerResult::Err(severity, message)
            }
        }
    }
}

impl<E: Display> Default for Runner<E> {
    fn default() -> Self {
        Runner::new()
    }
}

pub enum RunnerResult {
    Ok(CheckResult),
    Err(Severity, String),
}

impl RunnerResult {
    /// Prints the check result, or `"{severity}: {message}"` for the error
    /// case, and exits with the matching exit code.
    pub fn print_and_exit(self) -> ! {
        match self {
            RunnerResult::Ok(result) => result.print_and_exit(),
            RunnerResult::Err(severity, message) => {
                println!("{}: {}", severity, message);
                std::process::exit(severity.exit_code());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OK, UNKNOWN};

    #[derive(Debug, thiserror::Error)]
    #[error("woops")]
    struct EmptyError;

    #[test]
    fn test_runner_ok() {
        let result = Runner::<EmptyError>::new()
            .on_error(|_| {
                panic!("on_error must not run for a successful check");
            })
            .safe_run(|| Ok(CheckResult::new(OK).with_message("test")));

        assert!(matches!(result, RunnerResult::Ok(_)));
    }

    #[test]
    fn test_runner_error_default_mapping() {
        let result = Runner::<EmptyError>::new().safe_run(|| Err(EmptyError {}));

        match result {
            RunnerResult::Err(severity, message) => {
                assert_eq!(severity, CRITICAL);
                assert_eq!(message, "woops");
            }
            RunnerResult::Ok(_) => panic!("expected the error branch"),
        }
    }

    #[test]
    fn test_runner_error_custom_mapping() {
        let result = Runner::<EmptyError>::new()
            .on_error(|e| (UNKNOWN, format!("could not check: {}", e)))
            .safe_run(|| Err(EmptyError {}));

        match result {
            RunnerResult::Err(severity, message) => {
                assert_eq!(severity, UNKNOWN);
                assert_eq!(message, "could not check: woops");
            }
            RunnerResult::Ok(_) => panic!("expected the error branch"),
        }
    }
}

// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// The online phase: an interactive loop over stdin.
//
//   read line ─┬─ EOF / "exit"      → stop
//              ├─ not all digits    → diagnostic, re-prompt
//              ├─ longer than L     → keep trailing L digits, warn once
//              ├─ shorter than L    → padding notice
//              └─ invert            → print result, re-prompt
//
// The loop is written against SequenceInverter and generic
// reader/writer handles, so it runs in tests without a model.

use anyhow::Result;
use std::io::{BufRead, Write};

use crate::domain::pair::Inversion;
use crate::domain::traits::SequenceInverter;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::backend::{default_device, InferBackend};
use crate::ml::inferencer::Inferencer;

pub const PROMPT:        &str = "Enter an output digit sequence (or 'exit' to quit): ";
pub const EXIT_KEYWORD:  &str = "exit";
pub const INVALID_INPUT: &str = "Invalid input. Please enter a sequence of digits.";

/// What one line of user input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Exit,
    Invalid,
    Query {
        /// Exactly the digits to invert, never longer than L
        digits: String,
        /// Truncation or padding notice to show before the result
        notice: Option<String>,
    },
}

/// Classify one raw input line against capacity L.
pub fn prepare_request(raw: &str, capacity: usize) -> Request {
    let line = raw.trim();
    if line.eq_ignore_ascii_case(EXIT_KEYWORD) {
        return Request::Exit;
    }
    if line.is_empty() || !line.chars().all(|c| c.is_ascii_digit()) {
        return Request::Invalid;
    }

    let len = line.len();
    if len > capacity {
        Request::Query {
            digits: line[len - capacity..].to_string(),
            notice: Some(format!(
                "Input sequence is longer than {capacity} digits. Truncating."
            )),
        }
    } else if len < capacity {
        Request::Query {
            digits: line.to_string(),
            notice: Some(format!(
                "Padding the input sequence to {capacity} digits with leading zeros."
            )),
        }
    } else {
        Request::Query { digits: line.to_string(), notice: None }
    }
}

/// Drive the prompt loop until "exit" or end of input.
/// Returns the number of sequences inverted.
pub fn run_loop<R, W, I>(mut reader: R, mut writer: W, inverter: &I) -> Result<usize>
where
    R: BufRead,
    W: Write,
    I: SequenceInverter + ?Sized,
{
    let mut answered = 0;
    let mut line = String::new();

    loop {
        write!(writer, "{PROMPT}")?;
        writer.flush()?;

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            writeln!(writer)?;
            break;
        }

        match prepare_request(&line, inverter.capacity()) {
            Request::Exit => {
                writeln!(writer, "Exiting.")?;
                break;
            }
            Request::Invalid => writeln!(writer, "{INVALID_INPUT}")?,
            Request::Query { digits, notice } => {
                if let Some(notice) = notice {
                    writeln!(writer, "{notice}")?;
                }
                match inverter.invert(&digits) {
                    Ok(inv) => {
                        write_inversion(&mut writer, &inv)?;
                        answered += 1;
                    }
                    Err(e) => {
                        tracing::warn!("Inversion failed for '{}': {e:#}", digits);
                        writeln!(writer, "Could not invert '{digits}': {e}")?;
                    }
                }
            }
        }
    }
    Ok(answered)
}

fn write_inversion<W: Write>(writer: &mut W, inv: &Inversion) -> Result<()> {
    writeln!(writer, "Predicted Input Integer: {}", inv.input)?;
    writeln!(writer, "Normalized Input: {:.6e}", inv.normalized)?;
    writeln!(writer, "Reconstructed Output Sequence: {}", inv.reconstruction)?;
    writeln!(writer, "Mean Cross-Entropy: {:.4}", inv.loss)?;
    Ok(())
}

pub struct PredictUseCase {
    inferencer: Inferencer<InferBackend>,
}

impl PredictUseCase {
    pub fn new(checkpoint_dir: &str) -> Result<Self> {
        let ckpt       = CheckpointManager::new(checkpoint_dir);
        let inferencer = Inferencer::from_checkpoint(&ckpt, default_device())?;
        Ok(Self { inferencer })
    }

    pub fn capacity(&self) -> usize {
        self.inferencer.capacity()
    }

    /// Interactive session on the process's stdin/stdout.
    pub fn run_interactive(&self) -> Result<usize> {
        let stdin  = std::io::stdin();
        let stdout = std::io::stdout();
        run_loop(stdin.lock(), stdout.lock(), &self.inferencer)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Cursor;

    /// Echoes the query back and records every call. Only the
    /// trailing 18 digits become `input`, so any query fits a u64.
    struct FakeInverter {
        capacity: usize,
        calls:    RefCell<Vec<String>>,
    }

    impl FakeInverter {
        fn new(capacity: usize) -> Self {
            Self { capacity, calls: RefCell::new(Vec::new()) }
        }
    }

    impl SequenceInverter for FakeInverter {
        fn capacity(&self) -> usize {
            self.capacity
        }

        fn invert(&self, digits: &str) -> Result<Inversion> {
            self.calls.borrow_mut().push(digits.to_string());
            Ok(Inversion {
                input:          digits[digits.len().saturating_sub(18)..].parse()?,
                normalized:     0.5,
                reconstruction: digits.trim_start_matches('0').to_string(),
                loss:           0.25,
            })
        }
    }

    fn session(input: &str, inverter: &FakeInverter) -> (usize, String) {
        let mut out = Vec::new();
        let n = run_loop(Cursor::new(input.as_bytes()), &mut out, inverter).unwrap();
        (n, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_exit_keyword_any_case() {
        assert_eq!(prepare_request("exit\n", 5), Request::Exit);
        assert_eq!(prepare_request("  EXIT ", 5), Request::Exit);
        assert_eq!(prepare_request("Exit", 5), Request::Exit);
    }

    #[test]
    fn test_non_digits_are_invalid() {
        assert_eq!(prepare_request("12a4", 5), Request::Invalid);
        assert_eq!(prepare_request("-12", 5), Request::Invalid);
        assert_eq!(prepare_request("", 5), Request::Invalid);
        assert_eq!(prepare_request("1 2", 5), Request::Invalid);
    }

    #[test]
    fn test_long_input_keeps_trailing_digits() {
        let input = "1234567890123456789012345";
        match prepare_request(input, 20) {
            Request::Query { digits, notice } => {
                assert_eq!(digits, "67890123456789012345");
                assert_eq!(
                    notice.as_deref(),
                    Some("Input sequence is longer than 20 digits. Truncating.")
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_short_and_exact_inputs() {
        assert_eq!(
            prepare_request("42", 5),
            Request::Query {
                digits: "42".to_string(),
                notice: Some("Padding the input sequence to 5 digits with leading zeros.".to_string()),
            }
        );
        assert_eq!(
            prepare_request("00042", 5),
            Request::Query { digits: "00042".to_string(), notice: None }
        );
    }

    #[test]
    fn test_truncation_warning_emitted_once() {
        let inverter = FakeInverter::new(20);
        let (n, out) = session("1234567890123456789012345\nexit\n", &inverter);
        assert_eq!(n, 1);
        assert_eq!(out.matches("Truncating.").count(), 1);
        assert!(out.contains("Predicted Input Integer: 890123456789012345"));
        assert!(out.contains("Reconstructed Output Sequence: 67890123456789012345"));
        assert!(!out.contains("Could not invert"));
        assert_eq!(*inverter.calls.borrow(), vec!["67890123456789012345".to_string()]);
    }

    #[test]
    fn test_invalid_input_does_not_stop_the_loop() {
        let inverter = FakeInverter::new(5);
        let (n, out) = session("abc\n00042\nexit\n", &inverter);
        assert_eq!(n, 1);
        assert!(out.contains(INVALID_INPUT));
        assert!(out.contains("Predicted Input Integer: 42"));
        assert!(out.contains("Reconstructed Output Sequence: 42"));
        assert!(out.trim_end().ends_with("Exiting."));
    }

    #[test]
    fn test_exit_stops_before_later_lines() {
        let inverter = FakeInverter::new(5);
        let (n, _) = session("EXIT\n12345\n", &inverter);
        assert_eq!(n, 0);
        assert!(inverter.calls.borrow().is_empty());
    }

    #[test]
    fn test_eof_ends_the_session() {
        let inverter = FakeInverter::new(5);
        let (n, out) = session("7\n", &inverter);
        assert_eq!(n, 1);
        assert_eq!(out.matches(PROMPT).count(), 2);
        assert!(!out.contains("Exiting."));
    }
}

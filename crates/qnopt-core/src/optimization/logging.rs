//! Iteration log.
//!
//! The minimizer prints one line per iteration plus annotations (convergence,
//! history resets, failures). Hosts either hand over a writer for these lines
//! or let them flow into the `log` facade at `info` level under the `qnopt`
//! target.

use std::fmt;
use std::io::Write;

/// Log target used when no writer is attached.
pub const LOG_TARGET: &str = "qnopt";

/// Destination of the per-iteration log lines.
#[derive(Default)]
pub struct IterationLog {
    sink: Option<Box<dyn Write + Send>>,
}

impl IterationLog {
    /// Routes lines to the `log` facade.
    pub fn to_log() -> Self {
        Self { sink: None }
    }

    /// Routes lines to `writer`, one `\n`-terminated line per call.
    pub fn to_writer<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            sink: Some(Box::new(writer)),
        }
    }

    /// Whether lines go to an attached writer.
    pub fn has_writer(&self) -> bool {
        self.sink.is_some()
    }

    /// Emits one line.
    ///
    /// Write errors are reported through `log::warn!` and otherwise ignored:
    /// a broken log must not stop a minimization.
    pub fn line(&mut self, args: fmt::Arguments<'_>) {
        match self.sink.as_mut() {
            Some(writer) => {
                let written = writer
                    .write_fmt(args)
                    .and_then(|()| writer.write_all(b"\n"))
                    .and_then(|()| writer.flush());
                if let Err(err) = written {
                    log::warn!(target: LOG_TARGET, "failed to write iteration log: {}", err);
                }
            }
            None => log::info!(target: LOG_TARGET, "{}", args),
        }
    }
}

impl fmt::Debug for IterationLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterationLog")
            .field("writer", &self.has_writer())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_helpers::SharedLogBuffer;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_writer_receives_lines() {
        let buffer = SharedLogBuffer::new();
        let mut log = IterationLog::to_writer(buffer.clone());

        log.line(format_args!("Iter: {:3}", 7));
        log.line(format_args!("Converged"));

        assert!(log.has_writer());
        assert_eq!(buffer.contents(), "Iter:   7\nConverged\n");
    }

    #[test]
    fn test_log_facade_default() {
        let mut log = IterationLog::default();
        assert!(!log.has_writer());
        log.line(format_args!("discarded without a logger"));
        assert_eq!(format!("{:?}", log), "IterationLog { writer: false }");
    }
}

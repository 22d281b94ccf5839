//! Import normalization for generated output
//!
//! The merged output usually carries imports that only some variants need,
//! and substitution can introduce packages the template never imported.
//! An [`ImportFixer`] takes the merged text and returns it with its imports
//! put right.

mod prune;

use std::io::Write;
use std::process::{ChildStdin, Command, Stdio};

use thiserror::Error;

use crate::error::SourceError;

pub use prune::{ImportSpec, PruneImports};

/// Errors raised while normalizing imports
#[derive(Debug, Error)]
pub enum ImportsError {
    /// The generated text is not well formed
    #[error("generated source is malformed: {0}")]
    Syntax(#[from] SourceError),

    /// The external program could not be run
    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external program rejected the source
    #[error("{program} exited with {status}: {stderr}")]
    Command {
        program: String,
        status: String,
        stderr: String,
    },

    /// The external program wrote something other than UTF-8
    #[error("{program} produced output that is not valid UTF-8")]
    InvalidOutput { program: String },
}

/// Adds missing imports and removes unused ones
pub trait ImportFixer {
    /// Normalize `source`; `filename` is a hint for diagnostics
    fn fix(&self, filename: &str, source: &str) -> Result<String, ImportsError>;
}

/// Leaves the source untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl ImportFixer for Passthrough {
    fn fix(&self, _filename: &str, source: &str) -> Result<String, ImportsError> {
        Ok(source.to_string())
    }
}

/// Pipes the source through an external program such as `goimports`
#[derive(Debug, Clone)]
pub struct CommandFixer {
    program: String,
    args: Vec<String>,
}

impl CommandFixer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add an argument passed to the program
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// The `goimports` tool, reading from stdin
    pub fn goimports() -> Self {
        Self::new("goimports")
    }
}

impl ImportFixer for CommandFixer {
    fn fix(&self, filename: &str, source: &str) -> Result<String, ImportsError> {
        log::debug!("running {} {:?} for {}", self.program, self.args, filename);
        let io_error = |source: std::io::Error| ImportsError::Io {
            program: self.program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(io_error)?;

        // stdout must be drained while stdin is still being written
        let stdin = child.stdin.take();
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || feed_stdin(stdin, source));
            let output = child.wait_with_output();
            (output, writer.join())
        });

        let output = output.map_err(io_error)?;
        match written {
            Ok(result) => result.map_err(io_error)?,
            Err(_) => return Err(io_error(std::io::Error::other("stdin writer panicked"))),
        }
        if !output.status.success() {
            return Err(ImportsError::Command {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| ImportsError::InvalidOutput {
            program: self.program.clone(),
        })
    }
}

fn feed_stdin(stdin: Option<ChildStdin>, source: &str) -> std::io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(source.as_bytes()) {
        // the exit status says why it stopped reading
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough() {
        let source = "package p\n\nimport \"fmt\"\n";
        assert_eq!(Passthrough.fix("p.go", source).unwrap(), source);
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let fixer = CommandFixer::new("genny-test-no-such-program");
        let err = fixer.fix("p.go", "package p\n").unwrap_err();
        assert!(matches!(err, ImportsError::Io { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_output_returned() {
        let fixer = CommandFixer::new("cat");
        let out = fixer.fix("p.go", "package p\n").unwrap();
        assert_eq!(out, "package p\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_large_output_streams_through() {
        let source: String = (0..20_000)
            .map(|i| format!("var value{} = {}\n", i, i))
            .collect();
        assert!(source.len() > 300_000);
        let out = CommandFixer::new("cat").fix("big.go", &source).unwrap();
        assert_eq!(out.len(), source.len());
        assert!(out == source);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_failure_reported() {
        let fixer = CommandFixer::new("sh")
            .with_arg("-c")
            .with_arg("cat >/dev/null; echo bad >&2; exit 3");
        let err = fixer.fix("p.go", "package p\n").unwrap_err();
        match err {
            ImportsError::Command { program, stderr, .. } => {
                assert_eq!(program, "sh");
                assert_eq!(stderr, "bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

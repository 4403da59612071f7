//! Delegates ordering to an external command.
//!
//! The command receives the space-joined classes on stdin and must print the
//! reordered classes on stdout. `TAILWIND_CLASS_SORTER_KEEP_DUPLICATES` is set
//! to `true` or `false` in its environment.

use super::{OrderError, OrderProvider};
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

pub const KEEP_DUPLICATES_ENV: &str = "TAILWIND_CLASS_SORTER_KEEP_DUPLICATES";

#[derive(Debug, Clone)]
pub struct CommandOrderProvider {
    program: String,
    args: Vec<String>,
}

impl CommandOrderProvider {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from an argv list; `None` when the list is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl OrderProvider for CommandOrderProvider {
    fn sort_classes(&self, classes: &str, keep_duplicates: bool) -> Result<String, OrderError> {
        let pipe_error = |source| OrderError::Pipe {
            program: self.program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(KEEP_DUPLICATES_ENV, keep_duplicates.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| OrderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // stdin is fed from its own thread while stdout and stderr are drained,
        // so a command that streams output never blocks on a full pipe.
        // The child is always waited on, even when the write fails.
        let stdin = child.stdin.take();
        let (output, written) = thread::scope(|scope| {
            let writer =
                stdin.map(|mut stdin| scope.spawn(move || stdin.write_all(classes.as_bytes())));
            let output = child.wait_with_output();
            let written = match writer {
                Some(handle) => handle
                    .join()
                    .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked"))),
                None => Ok(()),
            };
            (output, written)
        });

        let output = output.map_err(pipe_error)?;
        if !output.status.success() {
            return Err(OrderError::Exit {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written.map_err(pipe_error)?;

        let stdout = String::from_utf8(output.stdout)?;
        Ok(stdout.trim().to_string())
    }
}

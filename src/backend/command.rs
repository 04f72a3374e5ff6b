//! Back-end provider that runs an external executable.
//!
//! Protocol, one process per call:
//!
//! - analyze: `<exe> [args...] analyze <file>`; stdin receives the options as a
//!   JSON object, stdout must hold the JSON result.
//! - chunk: `<exe> [args...] chunk <file> --strategy <strategy>`; stdin
//!   receives `{"result": <prior result>, "options": {...}}`, stdout must hold
//!   a JSON array of chunks.
//!
//! Exit code 0 is success; anything else becomes [`BackendError::Exited`].

use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::{Backend, BackendFactory};
use crate::error::BackendError;
use crate::models::{BackendId, Chunk, Options};

/// How to launch the executable for one back-end.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CommandConfig {
    /// Executable path or name. Defaults to the back-end's activation target,
    /// looked up on `PATH`.
    pub command: Option<PathBuf>,
    /// Extra arguments placed before the subcommand.
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandBackend {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Resolve the executable for `backend`, or `None` if it is not installed.
    pub fn locate(backend: BackendId, config: &CommandConfig) -> Option<Self> {
        let wanted = config
            .command
            .clone()
            .unwrap_or_else(|| PathBuf::from(backend.activation_target()));

        match which::which(&wanted) {
            Ok(program) => Some(Self::new(program, config.args.clone())),
            Err(err) => {
                debug!(backend = %backend, command = %wanted.display(), error = %err, "Executable not found");
                None
            }
        }
    }

    /// Registry factory that re-resolves the executable on every probe, so a
    /// back-end installed mid-process is picked up.
    pub fn provider(backend: BackendId, config: CommandConfig) -> BackendFactory {
        Arc::new(move || {
            Self::locate(backend, &config).map(|found| Arc::new(found) as Arc<dyn Backend>)
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(&self, subcommand: &[&OsStr], input: &[u8]) -> Result<Vec<u8>, BackendError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .args(subcommand)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Feed stdin from a separate thread so a chatty back-end cannot
        // deadlock against a full stdout pipe.
        let stdin = child.stdin.take();
        let output = std::thread::scope(|scope| {
            let writer = stdin.map(|mut stdin| scope.spawn(move || stdin.write_all(input)));
            let output = child.wait_with_output();
            if let Some(Ok(Err(err))) = writer.map(|w| w.join()) {
                // A back-end that exits without reading its input is fine.
                if err.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(err);
                }
            }
            output
        })?;

        if !output.status.success() {
            return Err(BackendError::Exited {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

impl Backend for CommandBackend {
    fn analyze(&self, path: &Path, options: &Options) -> Result<serde_json::Value, BackendError> {
        let input = serde_json::to_vec(options)?;
        let stdout = self.run(&[OsStr::new("analyze"), path.as_os_str()], &input)?;
        Ok(serde_json::from_slice(&stdout)?)
    }

    fn chunk(
        &self,
        path: &Path,
        prior: &serde_json::Value,
        strategy: &str,
        options: &Options,
    ) -> Result<Vec<Chunk>, BackendError> {
        let input = serde_json::to_vec(&serde_json::json!({
            "result": prior,
            "options": options,
        }))?;
        let stdout = self.run(
            &[
                OsStr::new("chunk"),
                path.as_os_str(),
                OsStr::new("--strategy"),
                OsStr::new(strategy),
            ],
            &input,
        )?;

        match serde_json::from_slice(&stdout)? {
            serde_json::Value::Array(chunks) => Ok(chunks),
            other => Err(BackendError::UnexpectedOutput(format!(
                "expected a JSON array of chunks, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

//! Text providers: the raw "prompt in, text out" boundary.

use std::collections::VecDeque;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crate::error::{AdapterError, AdapterResult};

/// A generative text service.
///
/// Implementations block until the completion is available. The adapter
/// runs them on a worker thread and enforces its own deadline, so a
/// provider does not need a timeout of its own.
pub trait TextProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Complete `prompt`.
    fn complete(&self, prompt: &str) -> AdapterResult<String>;
}

/// A provider that replays queued responses, for tests and offline runs.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<AdapterResult<String>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl ScriptedProvider {
    /// An empty script. Every call fails until responses are queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful completion.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn with_failure(self, error: AdapterError) -> Self {
        self.push(Err(error));
        self
    }

    /// Sleep this long before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue another result.
    pub fn push(&self, result: AdapterResult<String>) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(result);
    }

    /// How many times `complete` has been called.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent prompt received.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl TextProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete(&self, prompt: &str) -> AdapterResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap_or_else(|e| e.into_inner()) = Some(prompt.to_string());
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(AdapterError::Provider("script exhausted".into())))
    }
}

/// A provider that pipes the prompt to an external program's stdin and
/// reads the completion from its stdout.
#[derive(Debug, Clone)]
pub struct CommandProvider {
    program: String,
    args: Vec<String>,
}

impl CommandProvider {
    /// Run `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Parse a shell-like command line (whitespace separated, no quoting).
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl TextProvider for CommandProvider {
    fn name(&self) -> &str {
        &self.program
    }

    fn complete(&self, prompt: &str) -> AdapterResult<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AdapterError::Provider(format!("cannot start {}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .map_err(|e| AdapterError::Provider(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| AdapterError::Provider(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.to_lowercase().contains("rate limit") {
                return Err(AdapterError::RateLimited(stderr));
            }
            return Err(AdapterError::Provider(format!(
                "{} exited with {}: {stderr}",
                self.program, output.status
            )));
        }
        String::from_utf8(output.stdout).map_err(|e| AdapterError::Malformed(e.to_string()))
    }
}

//! Terminal implementations of the collaborator ports.

use std::io::{BufRead, Write};

use async_trait::async_trait;
use modelgate_core::{CredentialAccessor, EnvCredential, Notifier, PromptMode, TracingNotifier};

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "MODELGATE_API_KEY";

/// Reads `MODELGATE_API_KEY`, falling back to a stdin prompt in interactive mode.
pub struct TerminalCredential {
    env: EnvCredential,
}

impl TerminalCredential {
    pub fn new() -> Self {
        Self {
            env: EnvCredential::new(API_KEY_VAR),
        }
    }
}

impl Default for TerminalCredential {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialAccessor for TerminalCredential {
    async fn get(&self, mode: PromptMode) -> Option<String> {
        if let Some(token) = self.env.get(mode).await {
            return Some(token);
        }
        if mode == PromptMode::Silent {
            return None;
        }
        tokio::task::spawn_blocking(|| {
            let stdin = std::io::stdin();
            prompt_line(&mut stdin.lock(), &mut std::io::stderr())
        })
        .await
        .ok()
        .flatten()
    }
}

/// Ask for the key on `output` and read one line from `input`.
fn prompt_line(input: &mut impl BufRead, output: &mut impl Write) -> Option<String> {
    let _ = write!(output, "{API_KEY_VAR} is not set. API key: ");
    let _ = output.flush();
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()).filter(|key| !key.is_empty()),
    }
}

/// Logs notifications and prints them to stderr so stdout stays
/// machine-readable.
#[derive(Default)]
pub struct StderrNotifier {
    log: TracingNotifier,
}

impl StderrNotifier {
    fn note(message: &str) -> String {
        format!("note: {message}")
    }
}

impl Notifier for StderrNotifier {
    fn inform(&self, message: &str) {
        self.log.inform(message);
        eprintln!("{}", Self::note(message));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! A generator that plays back a fixed script.
//!
//! Used by tests and by offline tooling: each call pops the next step, and
//! every request is recorded so callers can assert on the prompts that
//! were built.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::LlmError;
use crate::generator::TextGenerator;
use crate::types::{LlmRequest, LlmResponse};

enum Step {
    Text(String),
    Delayed(Duration, String),
    Error(LlmError),
}

/// Scripted [`TextGenerator`]. An exhausted script fails with
/// [`LlmError::Unavailable`].
pub struct ScriptedGenerator {
    name: String,
    script: Mutex<VecDeque<Step>>,
    seen: Mutex<Vec<LlmRequest>>,
}

impl ScriptedGenerator {
    /// An empty script.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: Mutex::new(VecDeque::new()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Append a successful reply.
    #[must_use]
    pub fn then_text(self, text: impl Into<String>) -> Self {
        self.script.lock().push_back(Step::Text(text.into()));
        self
    }

    /// Append a reply that arrives after `delay` (tokio time, so paused
    /// clocks apply).
    #[must_use]
    pub fn then_delayed(self, delay: Duration, text: impl Into<String>) -> Self {
        self.script.lock().push_back(Step::Delayed(delay, text.into()));
        self
    }

    /// Append a failure.
    #[must_use]
    pub fn then_error(self, error: LlmError) -> Self {
        self.script.lock().push_back(Step::Error(error));
        self
    }

    /// How many times `generate` has been called.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }

    /// Every request received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.seen.lock().clone()
    }

    /// Steps not yet played.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }

    fn respond(&self, text: String) -> LlmResponse {
        LlmResponse {
            text,
            tokens_generated: 0,
            latency_ms: 0,
            model: self.name.clone(),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.seen.lock().push(request.clone());
        // Pop before awaiting so no lock is held across the sleep.
        let step = self.script.lock().pop_front();
        match step {
            Some(Step::Text(text)) => Ok(self.respond(text)),
            Some(Step::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(self.respond(text))
            }
            Some(Step::Error(e)) => Err(e),
            None => Err(LlmError::Unavailable(format!("script for '{}' exhausted", self.name))),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

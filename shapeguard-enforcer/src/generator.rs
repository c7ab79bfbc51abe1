//! The text generator capability and ready-made implementations.
//!
//! - [`Generator`]: the async seam the enforcer calls once per attempt
//! - [`FnGenerator`]: wraps a blocking closure
//! - [`ScriptedGenerator`]: replays queued responses and records prompts

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::GenerationError;

/// Produces a text response for a prompt.
///
/// Typically backed by a language model. Failures abort enforcement.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a response for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Arc<G> {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(prompt).await
    }
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Box<G> {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(prompt).await
    }
}

type GenerateFn = dyn Fn(&str) -> Result<String, GenerationError> + Send + Sync;

/// A generator backed by a synchronous function.
///
/// # Example
///
/// ```rust
/// use shapeguard_enforcer::FnGenerator;
///
/// let generator = FnGenerator::new(|prompt| Ok(format!("{{\"echo\":{}}}", prompt.len())));
/// ```
#[derive(Clone)]
pub struct FnGenerator {
    function: Arc<GenerateFn>,
}

impl FnGenerator {
    /// Wrap `function`.
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&str) -> Result<String, GenerationError> + Send + Sync + 'static,
    {
        Self {
            function: Arc::new(function),
        }
    }
}

impl fmt::Debug for FnGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnGenerator").finish_non_exhaustive()
    }
}

#[async_trait]
impl Generator for FnGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (self.function)(prompt)
    }
}

#[derive(Debug)]
enum Scripted {
    Text(String),
    Failure(String),
}

/// A generator that replays pre-configured responses in order.
///
/// Every prompt it receives is recorded. Once the script runs out it fails
/// with [`GenerationError::ScriptExhausted`].
///
/// # Example
///
/// ```rust
/// use shapeguard_enforcer::ScriptedGenerator;
///
/// let generator = ScriptedGenerator::new()
///     .with_response("not json")
///     .with_response(r#"{"name":"Alice"}"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedGenerator {
    responses: Arc<Mutex<VecDeque<Scripted>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedGenerator {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text response.
    #[must_use]
    pub fn with_response(self, text: impl Into<String>) -> Self {
        lock(&self.responses).push_back(Scripted::Text(text.into()));
        self
    }

    /// Queue a failure.
    #[must_use]
    pub fn with_failure(self, msg: impl Into<String>) -> Self {
        lock(&self.responses).push_back(Scripted::Failure(msg.into()));
        self
    }

    /// Prompts received so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    /// Number of generate calls so far.
    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Responses not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.responses).len()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        lock(&self.prompts).push(prompt.to_string());
        match lock(&self.responses).pop_front() {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Failure(msg)) => Err(GenerationError::msg(msg)),
            None => Err(GenerationError::ScriptExhausted),
        }
    }
}

/// Module for executing single generation calls
///
/// The executor is the only place provider HTTP traffic happens and the
/// only place failures are classified. It exposes one seam, the
/// [`GenerationBackend`] trait, so the retry controller and the
/// scheduler can be exercised against scripted backends in tests.
pub mod http;
pub mod wire;

pub use http::{AttemptOutcome, GenerationBackend, HttpBackend};
pub use wire::{ChatMessage, ChatRequest, ChatResponse, TokenUsage};

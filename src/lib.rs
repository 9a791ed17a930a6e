//! Bounded generate-critique-refine loops for Rust.
//!
//! v0 surface:
//! - `ReflectionLoop` driving at most `max_iterations` generate/critique
//!   cycles over an append-only conversation history
//! - `run` and `run_stream` entry points
//! - `Generator`/`Critic` capability traits with scripted and model-backed
//!   implementations (`SentinelCritic` turns free-form reviewer text into a
//!   structured verdict)
//! - Injectable context policy (`ContextWindow`) for bounding what the
//!   generator sees
//! - Anthropic adapter via `AnthropicModel`

pub mod error;
pub mod history;
pub mod llm;
pub mod reflection;
pub mod roles;

pub use error::{CritiqueError, GenerationError, LoopError, ProviderError};
pub use history::{ContextWindow, History, HistoryEntry};
pub use llm::{AnthropicModel, AnthropicModelConfig, ChatMessage, ChatModel};
pub use reflection::{
    DEFAULT_MAX_ITERATIONS, LoopConfig, LoopEvent, LoopOutcome, LoopState, LoopStatus,
    REFINEMENT_INSTRUCTION, ReflectionLoop, ReflectionLoopBuilder,
};
pub use roles::{
    Critic, Critique, DEFAULT_SENTINEL, Generator, ModelGenerator, ScriptedCritic,
    ScriptedGenerator, SentinelCritic,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("provider response invalid: {0}")]
    Response(String),
}

/// Failure raised by a [`Generator`](crate::roles::Generator) backend.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("generator produced an empty artifact")]
    EmptyArtifact,
    #[error("generation failed: {0}")]
    Backend(String),
}

/// Failure raised by a [`Critic`](crate::roles::Critic) backend.
#[derive(Debug, Error)]
pub enum CritiqueError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("critic returned a malformed verdict: {0}")]
    MalformedVerdict(String),
    #[error("critique failed: {0}")]
    Backend(String),
}

/// Errors surfaced by [`ReflectionLoop`](crate::reflection::ReflectionLoop).
///
/// Capability failures carry the 1-based iteration they occurred on so the
/// caller can report which cycle and which role failed.
#[derive(Debug, Error)]
pub enum LoopError {
    #[error("loop configuration error: {0}")]
    Config(String),
    #[error("generator failed on iteration {iteration}: {source}")]
    Generation {
        iteration: u32,
        #[source]
        source: GenerationError,
    },
    #[error("critic failed on iteration {iteration}: {source}")]
    Critique {
        iteration: u32,
        #[source]
        source: CritiqueError,
    },
    #[error("loop stream ended without a terminal event")]
    MissingOutcome,
}

impl LoopError {
    /// The 1-based iteration a capability failure occurred on, if any.
    pub fn iteration(&self) -> Option<u32> {
        match self {
            LoopError::Generation { iteration, .. } | LoopError::Critique { iteration, .. } => {
                Some(*iteration)
            }
            LoopError::Config(_) | LoopError::MissingOutcome => None,
        }
    }
}

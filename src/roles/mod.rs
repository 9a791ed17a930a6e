mod model;
mod scripted;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CritiqueError, GenerationError};
use crate::history::HistoryEntry;

pub use model::{ModelGenerator, SentinelCritic, DEFAULT_SENTINEL};
pub use scripted::{ScriptedCritic, ScriptedGenerator};

/// Structured outcome of one critique step.
///
/// Backends that receive free-form reviewer text are responsible for
/// translating it into this tagged form; the loop controller never parses
/// text itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "kebab-case")]
pub enum Critique {
    /// Terminal accept signal. Carries no further data.
    Accepted,
    /// Deficiencies to address, in the order the critic raised them. An
    /// empty list is valid and still counts as a rejection.
    Rejected { findings: Vec<String> },
}

impl Critique {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Critique::Accepted)
    }

    /// Renders rejection findings as the bulleted list appended to history.
    pub fn render_findings(&self) -> String {
        match self {
            Critique::Accepted => String::new(),
            Critique::Rejected { findings } => findings
                .iter()
                .map(|finding| format!("- {finding}"))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Produces or refines a candidate artifact from a view of the history.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, context: &[&HistoryEntry]) -> Result<String, GenerationError>;
}

/// Judges the current artifact against the original task.
///
/// Deliberately sees only the task and the latest artifact, never the full
/// history, so the verdict stays grounded in those two inputs.
#[async_trait]
pub trait Critic: Send + Sync {
    async fn review(&self, task: &str, artifact: &str) -> Result<Critique, CritiqueError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_findings_produces_bulleted_list() {
        let critique = Critique::Rejected {
            findings: vec!["missing docstring".to_string(), "no edge cases".to_string()],
        };
        assert_eq!(
            critique.render_findings(),
            "- missing docstring\n- no edge cases"
        );
    }

    #[test]
    fn empty_findings_render_as_empty_list() {
        let critique = Critique::Rejected { findings: vec![] };
        assert_eq!(critique.render_findings(), "");
        assert!(!critique.is_accepted());
    }

    #[test]
    fn critique_round_trips_through_serde() {
        let critique = Critique::Rejected {
            findings: vec!["needs tests".to_string()],
        };
        let serialized = serde_json::to_string(&critique).expect("serializes");
        let deserialized: Critique = serde_json::from_str(&serialized).expect("deserializes");
        assert_eq!(critique, deserialized);
    }
}

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{CritiqueError, GenerationError};
use crate::history::HistoryEntry;
use crate::roles::{Critic, Critique, Generator};

/// Generator that replays a fixed queue of artifacts.
///
/// Useful for demos and deterministic tests; an exhausted queue fails the
/// same way an upstream backend would.
#[derive(Default)]
pub struct ScriptedGenerator {
    artifacts: Mutex<VecDeque<Result<String, GenerationError>>>,
}

impl ScriptedGenerator {
    pub fn new(artifacts: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            artifacts: Mutex::new(VecDeque::from(artifacts)),
        }
    }

    /// Convenience for scripting successful artifacts only.
    pub fn from_texts(texts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(texts.into_iter().map(|text| Ok(text.into())).collect())
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, _context: &[&HistoryEntry]) -> Result<String, GenerationError> {
        let mut guard = self.artifacts.lock().expect("lock poisoned");
        guard.pop_front().unwrap_or_else(|| {
            Err(GenerationError::Backend(
                "scripted generator exhausted artifacts".to_string(),
            ))
        })
    }
}

/// Critic that replays a fixed queue of verdicts.
#[derive(Default)]
pub struct ScriptedCritic {
    verdicts: Mutex<VecDeque<Result<Critique, CritiqueError>>>,
}

impl ScriptedCritic {
    pub fn new(verdicts: Vec<Result<Critique, CritiqueError>>) -> Self {
        Self {
            verdicts: Mutex::new(VecDeque::from(verdicts)),
        }
    }

    /// Critic that rejects with the same findings every time.
    pub fn always_rejecting(findings: Vec<String>, times: usize) -> Self {
        Self::new(
            std::iter::repeat_with(|| {
                Ok(Critique::Rejected {
                    findings: findings.clone(),
                })
            })
            .take(times)
            .collect(),
        )
    }
}

#[async_trait]
impl Critic for ScriptedCritic {
    async fn review(&self, _task: &str, _artifact: &str) -> Result<Critique, CritiqueError> {
        let mut guard = self.verdicts.lock().expect("lock poisoned");
        guard.pop_front().unwrap_or_else(|| {
            Err(CritiqueError::Backend(
                "scripted critic exhausted verdicts".to_string(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_generator_replays_in_order_then_fails() {
        let generator = ScriptedGenerator::from_texts(["v1", "v2"]);
        let task = HistoryEntry::Task("task".to_string());

        assert_eq!(generator.generate(&[&task]).await.expect("first"), "v1");
        assert_eq!(generator.generate(&[&task]).await.expect("second"), "v2");
        assert!(matches!(
            generator.generate(&[&task]).await,
            Err(GenerationError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn always_rejecting_critic_repeats_findings() {
        let critic = ScriptedCritic::always_rejecting(vec!["too short".to_string()], 2);

        for _ in 0..2 {
            let verdict = critic.review("task", "artifact").await.expect("reviews");
            assert_eq!(
                verdict,
                Critique::Rejected {
                    findings: vec!["too short".to_string()],
                }
            );
        }
        assert!(critic.review("task", "artifact").await.is_err());
    }
}

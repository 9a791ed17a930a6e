use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{CritiqueError, GenerationError};
use crate::history::HistoryEntry;
use crate::llm::{ChatMessage, ChatModel};
use crate::roles::{Critic, Critique, Generator};

/// Phrase a [`SentinelCritic`] treats as the accept signal by default.
pub const DEFAULT_SENTINEL: &str = "CODE_IS_PERFECT";

const REVIEWER_SYSTEM_PROMPT: &str = "You are a senior software engineer performing a meticulous \
review. Critically evaluate the provided work against the original task requirements. Look for \
bugs, style issues, missing edge cases, and areas for improvement.";

/// Generator backed by a [`ChatModel`].
///
/// Renders the controller's history view as a chat transcript: artifacts
/// become assistant turns, everything else becomes user turns.
pub struct ModelGenerator {
    model: Arc<dyn ChatModel>,
    system_prompt: Option<String>,
}

impl ModelGenerator {
    pub fn new<M>(model: M) -> Self
    where
        M: ChatModel + 'static,
    {
        Self {
            model: Arc::new(model),
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

#[async_trait]
impl Generator for ModelGenerator {
    async fn generate(&self, context: &[&HistoryEntry]) -> Result<String, GenerationError> {
        let mut messages = Vec::with_capacity(context.len() + 1);
        if let Some(prompt) = &self.system_prompt {
            messages.push(ChatMessage::System(prompt.clone()));
        }
        messages.extend(context.iter().map(|entry| render_entry(entry)));

        let artifact = self.model.complete(&messages).await?;
        if artifact.trim().is_empty() {
            return Err(GenerationError::EmptyArtifact);
        }
        Ok(artifact)
    }
}

fn render_entry(entry: &HistoryEntry) -> ChatMessage {
    match entry {
        HistoryEntry::Task(text) | HistoryEntry::RefinementRequest(text) => {
            ChatMessage::User(text.clone())
        }
        HistoryEntry::Artifact(text) => ChatMessage::Assistant(text.clone()),
        HistoryEntry::Critique(text) => {
            ChatMessage::User(format!("Critique of the previous attempt:\n{text}"))
        }
    }
}

/// Critic backed by a [`ChatModel`], translating free-form reviewer text into
/// a structured [`Critique`].
///
/// The reviewer is instructed to answer with a single sentinel phrase when the
/// work is acceptable, or a bulleted list of critiques otherwise. All of the
/// text-to-verdict translation happens here, inside the critic boundary.
pub struct SentinelCritic {
    model: Arc<dyn ChatModel>,
    sentinel: String,
}

impl SentinelCritic {
    pub fn new<M>(model: M) -> Self
    where
        M: ChatModel + 'static,
    {
        Self {
            model: Arc::new(model),
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    fn system_prompt(&self) -> String {
        format!(
            "{REVIEWER_SYSTEM_PROMPT} If the work is perfect and meets all requirements, respond \
             with the single phrase '{}'. Otherwise, provide a bulleted list of your critiques.",
            self.sentinel
        )
    }

    fn parse_verdict(&self, response: &str) -> Result<Critique, CritiqueError> {
        let trimmed = response.trim();
        if trimmed.is_empty() {
            return Err(CritiqueError::MalformedVerdict(
                "critic response was empty".to_string(),
            ));
        }

        if trimmed.contains(&self.sentinel) {
            return Ok(Critique::Accepted);
        }

        let findings = trimmed
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                line.strip_prefix("- ")
                    .or_else(|| line.strip_prefix("* "))
                    .map(|finding| finding.trim().to_string())
            })
            .filter(|finding| !finding.is_empty())
            .collect::<Vec<_>>();

        if findings.is_empty() {
            // Reviewer ignored the bulleted-list instruction; keep the whole
            // response as one finding rather than losing it.
            return Ok(Critique::Rejected {
                findings: vec![trimmed.to_string()],
            });
        }

        Ok(Critique::Rejected { findings })
    }
}

#[async_trait]
impl Critic for SentinelCritic {
    async fn review(&self, task: &str, artifact: &str) -> Result<Critique, CritiqueError> {
        let messages = vec![
            ChatMessage::System(self.system_prompt()),
            ChatMessage::User(format!(
                "Original Task:\n{task}\n\nWork to Review:\n{artifact}"
            )),
        ];

        let response = self.model.complete(&messages).await?;
        self.parse_verdict(&response)
    }
}

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::LoopError;
use crate::history::{ContextWindow, History, HistoryEntry};
use crate::roles::{Critic, Critique, Generator};

/// Instruction appended to history before every refinement pass.
pub const REFINEMENT_INSTRUCTION: &str =
    "Please refine the work using the critiques provided.";

pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Upper bound on generate/critique cycles. Must be at least 1.
    pub max_iterations: u32,
    /// How much history the generator sees each call.
    pub context: ContextWindow,
    /// Override for [`REFINEMENT_INSTRUCTION`].
    pub refinement_instruction: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            context: ContextWindow::Full,
            refinement_instruction: REFINEMENT_INSTRUCTION.to_string(),
        }
    }
}

/// Why the loop stopped. Both variants are successful completions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopStatus {
    /// The critic accepted the artifact before the budget ran out.
    Accepted,
    /// The iteration budget was spent without acceptance; the last artifact
    /// stands.
    Exhausted,
}

/// Controller phase, observable after a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopState {
    #[default]
    Generating,
    Critiquing,
    Accepted,
    Exhausted,
    Failed,
}

/// Progress events yielded by [`ReflectionLoop::run_stream`]. Iterations are
/// 1-based.
#[derive(Clone, Debug, PartialEq)]
pub enum LoopEvent {
    IterationStart {
        iteration: u32,
    },
    Artifact {
        iteration: u32,
        content: String,
    },
    Verdict {
        iteration: u32,
        critique: Critique,
    },
    Finished {
        status: LoopStatus,
        iterations: u32,
    },
}

/// Result of a completed run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoopOutcome {
    /// The last artifact the generator produced.
    pub artifact: String,
    pub status: LoopStatus,
    /// Completed generate/critique cycles.
    pub iterations: u32,
    /// The full conversation log of the run.
    pub history: History,
}

pub struct ReflectionLoopBuilder {
    generator: Option<Arc<dyn Generator>>,
    critic: Option<Arc<dyn Critic>>,
    config: LoopConfig,
}

impl Default for ReflectionLoopBuilder {
    fn default() -> Self {
        Self {
            generator: None,
            critic: None,
            config: LoopConfig::default(),
        }
    }
}

impl ReflectionLoopBuilder {
    pub fn generator<G>(mut self, generator: G) -> Self
    where
        G: Generator + 'static,
    {
        self.generator = Some(Arc::new(generator));
        self
    }

    pub fn critic<C>(mut self, critic: C) -> Self
    where
        C: Critic + 'static,
    {
        self.critic = Some(Arc::new(critic));
        self
    }

    pub fn config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    pub fn context(mut self, context: ContextWindow) -> Self {
        self.config.context = context;
        self
    }

    pub fn refinement_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.refinement_instruction = instruction.into();
        self
    }

    pub fn build(self) -> Result<ReflectionLoop, LoopError> {
        let Some(generator) = self.generator else {
            return Err(LoopError::Config(
                "generator must be configured via ReflectionLoopBuilder::generator(...)"
                    .to_string(),
            ));
        };
        let Some(critic) = self.critic else {
            return Err(LoopError::Config(
                "critic must be configured via ReflectionLoopBuilder::critic(...)".to_string(),
            ));
        };
        if self.config.max_iterations == 0 {
            return Err(LoopError::Config(
                "max_iterations must be at least 1".to_string(),
            ));
        }

        Ok(ReflectionLoop {
            generator,
            critic,
            config: self.config,
            state: LoopState::default(),
            history: History::default(),
        })
    }
}

/// Drives bounded generate → critique → refine cycles over an append-only
/// conversation history.
///
/// Strictly sequential: one capability call is in flight at a time, and the
/// generator/critic awaits are the only suspension points. The controller is
/// the sole writer of the history for the duration of a run.
pub struct ReflectionLoop {
    generator: Arc<dyn Generator>,
    critic: Arc<dyn Critic>,
    config: LoopConfig,
    state: LoopState,
    history: History,
}

impl ReflectionLoop {
    pub fn builder() -> ReflectionLoopBuilder {
        ReflectionLoopBuilder::default()
    }

    /// The controller phase after the most recent run (or event consumed from
    /// an in-progress stream).
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// The conversation log of the most recent run.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Runs the loop to completion and returns the final artifact.
    ///
    /// Both [`LoopStatus::Accepted`] and [`LoopStatus::Exhausted`] are `Ok`
    /// outcomes; capability failures propagate immediately with no retry.
    pub async fn run(&mut self, task: impl Into<String>) -> Result<LoopOutcome, LoopError> {
        let mut last_artifact: Option<String> = None;
        let mut finished: Option<(LoopStatus, u32)> = None;

        {
            let stream = self.run_stream(task);
            futures_util::pin_mut!(stream);

            while let Some(event) = stream.next().await {
                match event? {
                    LoopEvent::Artifact { content, .. } => last_artifact = Some(content),
                    LoopEvent::Finished { status, iterations } => {
                        finished = Some((status, iterations))
                    }
                    LoopEvent::IterationStart { .. } | LoopEvent::Verdict { .. } => {}
                }
            }
        }

        match (last_artifact, finished) {
            (Some(artifact), Some((status, iterations))) => Ok(LoopOutcome {
                artifact,
                status,
                iterations,
                history: self.history.clone(),
            }),
            _ => Err(LoopError::MissingOutcome),
        }
    }

    /// Streams loop progress as it happens, one event per state change.
    pub fn run_stream(
        &mut self,
        task: impl Into<String>,
    ) -> impl Stream<Item = Result<LoopEvent, LoopError>> + '_ {
        let task = task.into();

        try_stream! {
            if task.trim().is_empty() {
                Err::<(), LoopError>(LoopError::Config(
                    "task specification must not be empty".to_string(),
                ))?;
            }

            self.state = LoopState::Generating;
            self.history = History::with_task(task.clone());

            for iteration in 1..=self.config.max_iterations {
                yield LoopEvent::IterationStart { iteration };
                debug!(iteration, "starting generate/critique cycle");

                if iteration > 1 {
                    self.history.push(HistoryEntry::RefinementRequest(
                        self.config.refinement_instruction.clone(),
                    ));
                }

                self.state = LoopState::Generating;
                let artifact = {
                    let view = self.config.context.select(&self.history);
                    self.generator.generate(&view).await
                };
                let artifact = match artifact {
                    Ok(artifact) => artifact,
                    Err(source) => {
                        self.state = LoopState::Failed;
                        Err::<String, LoopError>(LoopError::Generation { iteration, source })?
                    }
                };

                self.history.push(HistoryEntry::Artifact(artifact.clone()));
                yield LoopEvent::Artifact {
                    iteration,
                    content: artifact.clone(),
                };

                self.state = LoopState::Critiquing;
                let verdict = match self.critic.review(&task, &artifact).await {
                    Ok(verdict) => verdict,
                    Err(source) => {
                        self.state = LoopState::Failed;
                        Err::<Critique, LoopError>(LoopError::Critique { iteration, source })?
                    }
                };

                yield LoopEvent::Verdict {
                    iteration,
                    critique: verdict.clone(),
                };

                match verdict {
                    Critique::Accepted => {
                        self.state = LoopState::Accepted;
                        info!(iteration, "artifact accepted");
                        yield LoopEvent::Finished {
                            status: LoopStatus::Accepted,
                            iterations: iteration,
                        };
                        return;
                    }
                    rejected @ Critique::Rejected { .. } => {
                        debug!(iteration, "artifact rejected");
                        self.history
                            .push(HistoryEntry::Critique(rejected.render_findings()));
                    }
                }
            }

            self.state = LoopState::Exhausted;
            info!(
                max_iterations = self.config.max_iterations,
                "iteration budget exhausted without acceptance"
            );
            yield LoopEvent::Finished {
                status: LoopStatus::Exhausted,
                iterations: self.config.max_iterations,
            };
        }
    }
}

pub async fn run(
    reflection: &mut ReflectionLoop,
    task: impl Into<String>,
) -> Result<LoopOutcome, LoopError> {
    reflection.run(task).await
}

pub fn run_stream(
    reflection: &mut ReflectionLoop,
    task: impl Into<String>,
) -> impl Stream<Item = Result<LoopEvent, LoopError>> + '_ {
    reflection.run_stream(task)
}

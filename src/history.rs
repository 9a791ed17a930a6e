use serde::{Deserialize, Serialize};

/// One entry in the conversation history, tagged by origin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "kebab-case")]
pub enum HistoryEntry {
    /// The immutable task specification, always the first entry.
    Task(String),
    /// A candidate artifact produced by the generator.
    Artifact(String),
    /// Findings appended after a rejected critique.
    Critique(String),
    /// The fixed instruction asking the generator to apply the prior critique.
    RefinementRequest(String),
}

impl HistoryEntry {
    pub fn text(&self) -> &str {
        match self {
            HistoryEntry::Task(text)
            | HistoryEntry::Artifact(text)
            | HistoryEntry::Critique(text)
            | HistoryEntry::RefinementRequest(text) => text,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HistoryEntry::Task(_) => "task",
            HistoryEntry::Artifact(_) => "artifact",
            HistoryEntry::Critique(_) => "critique",
            HistoryEntry::RefinementRequest(_) => "refinement-request",
        }
    }
}

/// Append-only conversation log owned by the loop controller.
///
/// Entries are never removed or reordered; the controller is the sole writer
/// for the duration of one run. Readers get slices, never mutable access.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn with_task(task: impl Into<String>) -> Self {
        Self {
            entries: vec![HistoryEntry::Task(task.into())],
        }
    }

    pub(crate) fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent artifact, if any iteration has completed a generate step.
    pub fn last_artifact(&self) -> Option<&str> {
        self.entries.iter().rev().find_map(|entry| match entry {
            HistoryEntry::Artifact(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Policy deciding how much history the generator sees on each call.
///
/// Selected once at loop construction; the controller never hands the raw log
/// to the generator directly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ContextWindow {
    /// Re-send the entire history every call. Matches the original behavior
    /// and is unbounded in context growth.
    #[default]
    Full,
    /// The task entry plus at most the `n` most recent entries after it.
    Recent(usize),
}

impl ContextWindow {
    pub(crate) fn select<'a>(&self, history: &'a History) -> Vec<&'a HistoryEntry> {
        let entries = history.entries();
        match self {
            ContextWindow::Full => entries.iter().collect(),
            ContextWindow::Recent(n) => {
                let mut view = Vec::with_capacity(n + 1);
                if let Some(task @ HistoryEntry::Task(_)) = entries.first() {
                    view.push(task);
                }
                let rest = &entries[entries.len().min(1)..];
                let start = rest.len().saturating_sub(*n);
                view.extend(&rest[start..]);
                view
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_history() -> History {
        let mut history = History::with_task("write a function");
        history.push(HistoryEntry::Artifact("v1".to_string()));
        history.push(HistoryEntry::Critique("- missing docstring".to_string()));
        history.push(HistoryEntry::RefinementRequest("refine".to_string()));
        history.push(HistoryEntry::Artifact("v2".to_string()));
        history
    }

    #[test]
    fn full_window_returns_every_entry_in_order() {
        let history = sample_history();
        let view = ContextWindow::Full.select(&history);
        assert_eq!(view.len(), 5);
        assert_eq!(view[0].kind(), "task");
        assert_eq!(view[4], &HistoryEntry::Artifact("v2".to_string()));
    }

    #[test]
    fn recent_window_pins_task_and_keeps_tail() {
        let history = sample_history();
        let view = ContextWindow::Recent(2).select(&history);
        assert_eq!(view.len(), 3);
        assert_eq!(view[0].kind(), "task");
        assert_eq!(view[1].kind(), "refinement-request");
        assert_eq!(view[2], &HistoryEntry::Artifact("v2".to_string()));
    }

    #[test]
    fn recent_window_larger_than_history_degrades_to_full() {
        let history = sample_history();
        let view = ContextWindow::Recent(10).select(&history);
        assert_eq!(view.len(), history.len());
    }

    #[test]
    fn last_artifact_finds_latest_version() {
        let history = sample_history();
        assert_eq!(history.last_artifact(), Some("v2"));

        let empty = History::with_task("task");
        assert_eq!(empty.last_artifact(), None);
    }

    #[test]
    fn entry_round_trips_through_serde() {
        let entry = HistoryEntry::Critique("- needs tests".to_string());
        let serialized = serde_json::to_string(&entry).expect("serializes");
        let deserialized: HistoryEntry = serde_json::from_str(&serialized).expect("deserializes");
        assert_eq!(entry, deserialized);
    }
}

//! Draft state behind the task form and its tag-suggestion round trip.
//!
//! A draft only becomes a task on [`TaskForm::submit`]. Suggestion requests
//! run without borrowing the form; their result is matched back through a
//! [`SuggestionTicket`] and dropped if the form was closed meanwhile.

use super::errors::{SuggestError, TasksError};
use super::helpers::normalize_tags;
use super::suggest::{suggestion_input, without_existing, TagSuggester};
use super::types::{NewTask, Priority, Task, TaskPatch};
use super::TasksStore;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { task_id: String },
}

/// Issued by [`TaskForm::begin_suggestion`]; owns everything the request needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionTicket {
    session: u64,
    text: String,
}

impl SuggestionTicket {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Calls the suggester and pairs the result with this ticket.
    pub async fn run(self, suggester: &dyn TagSuggester) -> SuggestionReply {
        let result = suggester.suggest(&self.text).await;
        SuggestionReply {
            ticket: self,
            result,
        }
    }
}

#[derive(Debug)]
pub struct SuggestionReply {
    pub ticket: SuggestionTicket,
    pub result: Result<Vec<String>, SuggestError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionOutcome {
    /// New candidates were stored on the form.
    Ready(Vec<String>),
    /// The request failed; the form is unchanged and still usable.
    Failed(SuggestError),
    /// The form was closed before the reply arrived.
    Discarded,
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    mode: FormMode,
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub list_id: String,
    tags: Vec<String>,
    suggestions: Vec<String>,
    suggesting: bool,
    open: bool,
    session: u64,
}

impl TaskForm {
    /// Empty draft targeting `list_id`.
    pub fn new_task(list_id: impl Into<String>) -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            description: String::new(),
            due_date: None,
            priority: Priority::default(),
            list_id: list_id.into(),
            tags: Vec::new(),
            suggestions: Vec::new(),
            suggesting: false,
            open: true,
            session: 0,
        }
    }

    /// Draft prefilled from an existing task.
    pub fn edit(task: &Task) -> Self {
        Self {
            mode: FormMode::Edit {
                task_id: task.id.clone(),
            },
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            due_date: task.due_date,
            priority: task.priority,
            list_id: task.list_id.clone(),
            tags: task.tags.clone(),
            suggestions: Vec::new(),
            suggesting: false,
            open: true,
            session: 0,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_suggesting(&self) -> bool {
        self.suggesting
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Candidates not yet accepted.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// No-op for blanks and exact duplicates.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    /// Starts a suggestion request. Fails locally, without any call, when
    /// the form is closed, the draft has no text, or a request is already
    /// running.
    pub fn begin_suggestion(&mut self) -> Result<SuggestionTicket, SuggestError> {
        if !self.open {
            return Err(SuggestError::FormClosed);
        }
        if self.suggesting {
            return Err(SuggestError::InFlight);
        }

        let text = suggestion_input(&self.title, Some(self.description.as_str()))?;
        self.suggesting = true;
        self.suggestions.clear();

        Ok(SuggestionTicket {
            session: self.session,
            text,
        })
    }

    pub fn finish_suggestion(&mut self, reply: SuggestionReply) -> SuggestionOutcome {
        if !self.open || reply.ticket.session != self.session {
            tracing::debug!(target: "suggest", "Discarding suggestions for a closed form");
            return SuggestionOutcome::Discarded;
        }

        self.suggesting = false;

        match reply.result {
            Ok(tags) => {
                let fresh = without_existing(normalize_tags(&tags), &self.tags);
                self.suggestions = fresh.clone();
                SuggestionOutcome::Ready(fresh)
            }
            Err(e) => {
                tracing::warn!(target: "suggest", "Tag suggestion failed: {}", e);
                SuggestionOutcome::Failed(e)
            }
        }
    }

    /// Moves a pending suggestion into the draft's tags.
    pub fn accept_suggestion(&mut self, tag: &str) -> bool {
        let Some(index) = self.suggestions.iter().position(|s| s == tag) else {
            return false;
        };
        let tag = self.suggestions.remove(index);
        self.add_tag(&tag)
    }

    /// Closes the form. Replies still in flight will be discarded.
    pub fn close(&mut self) {
        self.open = false;
        self.suggesting = false;
        self.suggestions.clear();
        self.session += 1;
    }

    /// Persists the draft: creates a task, or applies a single patch (move
    /// included) to the edited one. The form closes on success and stays
    /// open with its draft intact on error.
    pub fn submit(&mut self, store: &mut TasksStore) -> Result<Task, TasksError> {
        let description = Some(self.description.clone()).filter(|d| !d.trim().is_empty());

        let task = match &self.mode {
            FormMode::Create => store.create_task(
                &self.list_id,
                NewTask {
                    title: self.title.clone(),
                    description,
                    due_date: self.due_date,
                    priority: self.priority,
                    tags: self.tags.clone(),
                },
            )?,
            FormMode::Edit { task_id } => store.update_task(
                task_id,
                TaskPatch {
                    title: Some(self.title.clone()),
                    description: Some(description),
                    due_date: Some(self.due_date),
                    completed: None,
                    priority: Some(self.priority),
                    tags: Some(self.tags.clone()),
                    list_id: Some(self.list_id.clone()),
                },
            )?,
        };

        self.close();
        Ok(task)
    }
}

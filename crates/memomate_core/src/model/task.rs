//! Task domain model.
//!
//! # Responsibility
//! - Define the reminder record persisted by the task store.
//! - Validate user input before it becomes a persisted task.
//!
//! # Invariants
//! - `id` is unique within one store and never reassigned.
//! - `title` contains at least one non-whitespace character.
//! - `category` is one of the fixed priority labels.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Numeric task identifier, assigned by the store on creation.
pub type TaskId = i64;

/// Fixed-vocabulary priority label attached to every task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    High,
    Medium,
    Low,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 3] = [Category::High, Category::Medium, Category::Low];

    /// Stable label used for persistence and exact-match filtering.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Parses an exact category label.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reminder record.
///
/// Date and time are kept as the display strings the user picked
/// (`Mon DD, YYYY` and `HH:MM AM/PM`); they are parsed only when a
/// reminder delay or a calendar range is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub due_time: String,
    pub created_date: String,
    pub category: Category,
    pub completed: bool,
}

impl Task {
    /// Builds a new, not yet completed task from validated draft input.
    pub fn from_draft(id: TaskId, draft: &TaskDraft, created_date: impl Into<String>) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            due_date: draft.due_date.clone(),
            due_time: draft.due_time.clone(),
            created_date: created_date.into(),
            category: draft.category.unwrap_or_default(),
            completed: false,
        }
    }

    /// Returns a copy with the editable fields replaced by `draft`.
    ///
    /// `id`, `created_date` and `completed` are kept. The category is kept
    /// unless the draft carries one.
    pub fn with_edits(&self, draft: &TaskDraft) -> Self {
        Self {
            title: draft.title.clone(),
            description: draft.description.clone(),
            due_date: draft.due_date.clone(),
            due_time: draft.due_time.clone(),
            category: draft.category.unwrap_or(self.category),
            ..self.clone()
        }
    }

    /// Flips the completion flag.
    pub fn toggle_completed(&mut self) {
        self.completed = !self.completed;
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_title(&self.title)
    }
}

/// User input for creating or editing a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub due_time: String,
    /// `None` keeps the existing category on edit and uses the default on create.
    pub category: Option<Category>,
}

impl TaskDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: impl Into<String>,
        due_time: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            due_date: due_date.into(),
            due_time: due_time.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Rejects input that must not be persisted.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_title(&self.title)
    }
}

/// Input validation failures, reported back to the caller as messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    EmptyStartDate,
    EmptyEndDate,
    InvalidDate(String),
    UnsupportedCategory(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Please provide a title"),
            Self::EmptyStartDate => write!(f, "Please provide a valid start date"),
            Self::EmptyEndDate => write!(f, "Please provide a valid end date"),
            Self::InvalidDate(value) => {
                write!(f, "invalid date `{value}`; expected `Mon DD, YYYY`")
            }
            Self::UnsupportedCategory(value) => write!(
                f,
                "unsupported category `{value}`; expected High|Medium|Low"
            ),
        }
    }
}

impl Error for TaskValidationError {}

/// Parses a category label coming from an outer layer.
pub fn parse_category(value: &str) -> Result<Category, TaskValidationError> {
    Category::parse(value.trim())
        .ok_or_else(|| TaskValidationError::UnsupportedCategory(value.to_string()))
}

fn validate_title(title: &str) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_category, Category, Task, TaskDraft, TaskValidationError};

    fn draft() -> TaskDraft {
        TaskDraft::new("Buy milk", "2 litres", "Jan 05, 2025", "09:30 AM")
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut input = draft();
        input.title = "   ".to_string();
        assert_eq!(input.validate(), Err(TaskValidationError::EmptyTitle));
        assert_eq!(
            TaskValidationError::EmptyTitle.to_string(),
            "Please provide a title"
        );
    }

    #[test]
    fn from_draft_defaults_to_high_and_not_completed() {
        let task = Task::from_draft(7, &draft(), "Jan 01, 2025");
        assert_eq!(task.id, 7);
        assert_eq!(task.category, Category::High);
        assert!(!task.completed);
        assert_eq!(task.created_date, "Jan 01, 2025");
    }

    #[test]
    fn with_edits_keeps_identity_and_completion() {
        let mut task = Task::from_draft(3, &draft().with_category(Category::Low), "Jan 01, 2025");
        task.toggle_completed();

        let edited = task.with_edits(&TaskDraft::new("Buy oat milk", "", "Jan 06, 2025", "10:00 AM"));
        assert_eq!(edited.id, 3);
        assert_eq!(edited.title, "Buy oat milk");
        assert_eq!(edited.category, Category::Low);
        assert!(edited.completed);
        assert_eq!(edited.created_date, "Jan 01, 2025");
    }

    #[test]
    fn category_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
        assert_eq!(parse_category(" Medium "), Ok(Category::Medium));
        assert!(matches!(
            parse_category("urgent"),
            Err(TaskValidationError::UnsupportedCategory(_))
        ));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let task = Task::from_draft(1, &draft(), "Jan 01, 2025");
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"dueDate\":\"Jan 05, 2025\""));
        assert!(json.contains("\"category\":\"High\""));
    }
}

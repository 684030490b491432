use std::path::Path;

use super::person::to_nullable_number;
use super::task::{Task, TaskId, TaskPayload, prefix};
use crate::error::ValidationError;

/// A local file picked for upload but not yet sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl StagedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: None,
            bytes,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub async fn from_path(path: &Path) -> Result<Self, String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

/// Field values as the user typed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DDTHH:MM`, or empty.
    pub due_date: String,
    /// Person selector value; empty means unassigned.
    pub person_id: String,
    pub completed: Option<bool>,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: String::new(),
            person_id: String::new(),
            completed: Some(false),
        }
    }
}

impl TaskDraft {
    /// Snapshot of an existing task in the form's representation.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date.as_deref().map(|d| prefix(d, 16)).unwrap_or_default(),
            person_id: task.person_id.map(|id| id.to_string()).unwrap_or_default(),
            completed: Some(task.completed),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().chars().count() < 2 {
            return Err(ValidationError::TitleTooShort);
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        if self.due_date.is_empty() {
            return Err(ValidationError::MissingDueDate);
        }
        if self.completed.is_none() {
            return Err(ValidationError::MissingCompleted);
        }
        Ok(())
    }
}

/// Draft, staged files and the edit target.
///
/// The task id lives only in `editing`, so a create-mode form can never carry one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub draft: TaskDraft,
    pub files: Vec<StagedFile>,
    editing: Option<TaskId>,
}

impl FormState {
    pub fn editing(task: &Task) -> Self {
        Self {
            draft: TaskDraft::from_task(task),
            files: Vec::new(),
            editing: task.id,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn editing_id(&self) -> Option<TaskId> {
        self.editing
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Validated wire payload for the current draft.
    pub fn payload(&self) -> Result<TaskPayload, ValidationError> {
        self.draft.validate()?;
        let due_date = Some(self.draft.due_date.clone()).filter(|d| !d.is_empty());
        Ok(TaskPayload {
            id: self.editing,
            title: self.draft.title.clone(),
            description: self.draft.description.clone(),
            completed: self.draft.completed.unwrap_or(false),
            due_date,
            person_id: to_nullable_number(&self.draft.person_id),
            number_of_attachments: self.files.len() as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> TaskDraft {
        TaskDraft {
            title: "Buy milk".to_string(),
            description: "2%".to_string(),
            due_date: "2024-01-01T10:00".to_string(),
            person_id: String::new(),
            completed: Some(false),
        }
    }

    #[test]
    fn validation_order_and_messages() {
        let mut draft = valid_draft();
        assert_eq!(draft.validate(), Ok(()));

        draft.title = " A ".to_string();
        let err = draft.validate().unwrap_err();
        assert_eq!(err, ValidationError::TitleTooShort);
        assert_eq!(err.to_string(), "Title is required (min 2 chars)");

        draft = valid_draft();
        draft.description = "   ".to_string();
        assert_eq!(draft.validate(), Err(ValidationError::MissingDescription));

        draft = valid_draft();
        draft.due_date.clear();
        assert_eq!(draft.validate(), Err(ValidationError::MissingDueDate));

        draft = valid_draft();
        draft.completed = None;
        assert_eq!(draft.validate(), Err(ValidationError::MissingCompleted));
    }

    #[test]
    fn create_payload_normalizes_person_and_counts_files() {
        let mut form = FormState {
            draft: valid_draft(),
            ..FormState::default()
        };
        let payload = form.payload().unwrap();
        assert_eq!(payload.id, None);
        assert_eq!(payload.person_id, None);
        assert_eq!(payload.number_of_attachments, 0);

        form.draft.person_id = "3".to_string();
        form.files = vec![StagedFile::new("a.txt", b"a".to_vec()), StagedFile::new("b.txt", vec![])];
        let payload = form.payload().unwrap();
        assert_eq!(payload.person_id, Some(3));
        assert_eq!(payload.number_of_attachments, 2);
    }

    #[test]
    fn editing_snapshot_normalizes_fields() {
        let task = Task {
            id: Some(8),
            description: "desc".to_string(),
            due_date: Some("2024-06-01T14:45:00.000+00:00".to_string()),
            person_id: None,
            completed: true,
            ..Task::new("Existing")
        };
        let form = FormState::editing(&task);
        assert!(form.is_editing());
        assert_eq!(form.editing_id(), Some(8));
        assert_eq!(form.draft.due_date, "2024-06-01T14:45");
        assert_eq!(form.draft.person_id, "");
        assert_eq!(form.draft.completed, Some(true));
        assert_eq!(form.payload().unwrap().id, Some(8));
    }

    #[test]
    fn reset_leaves_create_mode() {
        let mut form = FormState::editing(&Task {
            id: Some(1),
            ..Task::new("x")
        });
        form.files.push(StagedFile::new("x", vec![1]));
        form.reset();
        assert!(!form.is_editing());
        assert!(form.files.is_empty());
        assert_eq!(form.draft, TaskDraft::default());
    }

    #[tokio::test]
    async fn staged_file_reads_from_disk() {
        let name = format!("taskdesk-staged-{}.txt", std::process::id());
        let path = std::env::temp_dir().join(&name);
        tokio::fs::write(&path, b"hello").await.unwrap();
        let file = StagedFile::from_path(&path).await.unwrap();
        assert_eq!(file.file_name, name);
        assert_eq!(file.bytes, b"hello");
        let _ = tokio::fs::remove_file(&path).await;
    }
}

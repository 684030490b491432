use serde::{Deserialize, Deserializer, Serialize};

use super::person::{PersonId, deserialize_person_id};

pub type TaskId = i64;

/// Attachment metadata as the server reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attachment {
    Described(AttachmentMeta),
    Label(String),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    #[serde(rename = "fileName", default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl Attachment {
    /// Name shown next to the task, if the server gave us one.
    pub fn display_name(&self) -> Option<String> {
        let name = match self {
            Self::Described(meta) => [&meta.file_name, &meta.name, &meta.filename]
                .into_iter()
                .flatten()
                .find(|s| !s.is_empty())
                .cloned(),
            Self::Label(s) => Some(s.clone()),
            Self::Other(v) => Some(v.to_string()),
        };
        name.filter(|s| !s.is_empty())
    }
}

/// A task as held in the client collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: Option<TaskId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_person_id")]
    pub person_id: Option<PersonId>,
    #[serde(default)]
    pub person_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub number_of_attachments: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments: Vec<Attachment>,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.person_id.is_none()
    }

    /// Date part of the due date, or "N/A".
    pub fn due_label(&self) -> String {
        match self.due_date.as_deref() {
            Some(d) if !d.is_empty() => prefix(d, 10),
            _ => "N/A".to_string(),
        }
    }

    pub fn created_label(&self) -> String {
        self.created_at.as_deref().map(|c| prefix(c, 10)).unwrap_or_default()
    }

    pub fn status_label(&self) -> &'static str {
        if self.completed { "completed" } else { "pending" }
    }

    pub fn attachment_names(&self) -> Vec<String> {
        self.attachments
            .iter()
            .filter_map(Attachment::display_name)
            .collect()
    }
}

/// The JSON document sent as the `todo` part of a create or update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub id: Option<TaskId>,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub due_date: Option<String>,
    pub person_id: Option<PersonId>,
    pub number_of_attachments: u32,
}

impl TaskPayload {
    /// Payload for flipping a task's completion with everything else kept as is.
    pub fn toggled(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            completed: !task.completed,
            due_date: task.due_date.clone(),
            person_id: task.person_id,
            number_of_attachments: task.number_of_attachments,
        }
    }
}

/// First `n` characters of `s`.
pub(crate) fn prefix(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_server_task() {
        let json = r#"{
            "id": 5,
            "title": "Write report",
            "description": "Quarterly",
            "completed": false,
            "dueDate": "2024-03-01T09:30:00",
            "personId": 3,
            "personName": "Alice",
            "createdAt": "2024-02-20T08:00:00",
            "numberOfAttachments": 2,
            "attachments": [{"fileName": "a.pdf"}, {"name": "b.png"}]
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, Some(5));
        assert_eq!(task.person_id, Some(3));
        assert_eq!(task.person_name.as_deref(), Some("Alice"));
        assert_eq!(task.number_of_attachments, 2);
        assert_eq!(task.attachment_names(), vec!["a.pdf", "b.png"]);
    }

    #[test]
    fn tolerates_nulls_and_string_person_ids() {
        let json = r#"{"id": 1, "title": "x", "description": null, "completed": null,
                       "personId": "", "attachments": null}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.description, "");
        assert!(!task.completed);
        assert!(task.is_unassigned());
        assert!(task.attachments.is_empty());

        let task: Task = serde_json::from_str(r#"{"id": 2, "personId": "9"}"#).unwrap();
        assert_eq!(task.person_id, Some(9));
    }

    #[test]
    fn attachment_names_fall_back_and_skip_empty() {
        let json = r#"{"attachments": [
            {"filename": "c.txt"},
            {"fileName": "", "name": "d.txt"},
            "plain.doc",
            {"size": 10},
            ""
        ]}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.attachment_names(), vec!["c.txt", "d.txt", "plain.doc"]);
    }

    #[test]
    fn labels() {
        let mut task = Task::new("Labels");
        assert_eq!(task.due_label(), "N/A");
        assert_eq!(task.created_label(), "");
        assert_eq!(task.status_label(), "pending");

        task.due_date = Some("2024-01-01T10:00".to_string());
        task.created_at = Some("2023-12-31T23:59:59Z".to_string());
        task.completed = true;
        assert_eq!(task.due_label(), "2024-01-01");
        assert_eq!(task.created_label(), "2023-12-31");
        assert_eq!(task.status_label(), "completed");
    }

    #[test]
    fn toggled_payload_keeps_other_fields() {
        let task = Task {
            id: Some(5),
            description: "desc".to_string(),
            due_date: Some("2024-05-01T12:00".to_string()),
            person_id: Some(4),
            number_of_attachments: 1,
            ..Task::new("Toggle me")
        };
        let payload = TaskPayload::toggled(&task);
        assert_eq!(payload.id, Some(5));
        assert_eq!(payload.title, "Toggle me");
        assert_eq!(payload.description, "desc");
        assert!(payload.completed);
        assert_eq!(payload.due_date.as_deref(), Some("2024-05-01T12:00"));
        assert_eq!(payload.person_id, Some(4));
        assert_eq!(payload.number_of_attachments, 1);
    }

    #[test]
    fn payload_serializes_nulls() {
        let payload = TaskPayload {
            id: None,
            title: "Buy milk".to_string(),
            description: "2%".to_string(),
            completed: false,
            due_date: Some("2024-01-01T10:00".to_string()),
            person_id: None,
            number_of_attachments: 0,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["id"], serde_json::Value::Null);
        assert_eq!(value["personId"], serde_json::Value::Null);
        assert_eq!(value["numberOfAttachments"], 0);
        assert_eq!(value["dueDate"], "2024-01-01T10:00");
    }
}

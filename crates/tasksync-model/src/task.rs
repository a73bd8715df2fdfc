//! Tasks and task form input

use crate::ids::{ProjectId, TaskId, UserId};
use crate::validation::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Low priority
    Low,
    /// Medium priority
    Medium,
    /// High priority
    High,
}

impl Priority {
    /// All priorities, lowest first
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted task, as returned by the server
///
/// `project` is fixed at creation; the merge primitives rely on it to keep
/// events for one project out of another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server-assigned id
    #[serde(rename = "_id")]
    pub id: TaskId,
    /// Task name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Delivery date
    #[serde(with = "crate::date")]
    pub date_delivery: NaiveDate,
    /// Priority
    pub priority: Priority,
    /// Completion status
    #[serde(default, rename = "state")]
    pub completed: bool,
    /// Owning project
    pub project: ProjectId,
    /// User who last changed the task status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_by: Option<UserId>,
}

impl Task {
    /// Create an open (not completed) task
    #[must_use]
    pub fn new(
        id: TaskId,
        project: ProjectId,
        name: impl Into<String>,
        priority: Priority,
        date_delivery: NaiveDate,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            date_delivery,
            priority,
            completed: false,
            project,
            assigned_by: None,
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With completion status
    #[inline]
    #[must_use]
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Draft pre-filled from this task, for the edit form
    #[must_use]
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            description: self.description.clone(),
            date_delivery: Some(self.date_delivery),
            priority: Some(self.priority),
            project: self.project.clone(),
        }
    }
}

/// Task form input
///
/// `id` is `None` for a task that has not been persisted yet; submitting such a
/// draft creates the task, otherwise it is updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    /// Id of the task being edited; never sent in the body
    #[serde(skip)]
    pub id: Option<TaskId>,
    /// Task name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Delivery date
    #[serde(with = "crate::date::option")]
    pub date_delivery: Option<NaiveDate>,
    /// Priority
    pub priority: Option<Priority>,
    /// Owning project
    pub project: ProjectId,
}

impl TaskDraft {
    /// Empty draft for the create form of `project`
    #[must_use]
    pub fn new(project: ProjectId) -> Self {
        Self {
            id: None,
            name: String::new(),
            description: String::new(),
            date_delivery: None,
            priority: None,
            project,
        }
    }

    /// With name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With delivery date
    #[inline]
    #[must_use]
    pub fn with_date_delivery(mut self, date: NaiveDate) -> Self {
        self.date_delivery = Some(date);
        self
    }

    /// With priority
    #[inline]
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// With id (turns the submission into an update)
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: TaskId) -> Self {
        self.id = Some(id);
        self
    }

    /// Whether submitting this draft updates an existing task
    #[inline]
    #[must_use]
    pub fn is_update(&self) -> bool {
        self.id.as_ref().is_some_and(|id| !id.is_blank())
    }

    /// Check required fields
    ///
    /// # Errors
    /// The first missing field, in form order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description"));
        }
        if self.priority.is_none() {
            return Err(ValidationError::MissingField("priority"));
        }
        if self.date_delivery.is_none() {
            return Err(ValidationError::MissingField("dateDelivery"));
        }
        if self.project.is_blank() {
            return Err(ValidationError::MissingField("project"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn task_reads_server_payload() {
        let json = r#"{
            "_id": "t7",
            "name": "Renamed",
            "description": "",
            "dateDelivery": "2024-01-01T00:00:00.000Z",
            "priority": "Medium",
            "state": true,
            "project": "p1",
            "assignedBy": "u1"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();

        assert_eq!(task.id, TaskId::from("t7"));
        assert_eq!(task.date_delivery, date());
        assert!(task.completed);
        assert_eq!(task.assigned_by, Some(UserId::from("u1")));
    }

    #[test]
    fn task_writes_wire_names() {
        let task = Task::new(TaskId::from("t1"), ProjectId::from("p1"), "a", Priority::Low, date());
        let value = serde_json::to_value(&task).unwrap();

        assert_eq!(value["_id"], "t1");
        assert_eq!(value["dateDelivery"], "2024-01-01");
        assert_eq!(value["state"], false);
        assert!(value.get("assignedBy").is_none());
    }

    #[test]
    fn draft_without_id_is_a_create() {
        let draft = TaskDraft::new(ProjectId::from("p1"));
        assert!(!draft.is_update());
        assert!(draft.with_id(TaskId::from("t1")).is_update());
    }

    #[test]
    fn draft_body_omits_id() {
        let draft = TaskDraft::new(ProjectId::from("p1"))
            .with_id(TaskId::from("t1"))
            .with_name("Write brief")
            .with_description("One page")
            .with_priority(Priority::High)
            .with_date_delivery(date());
        let value = serde_json::to_value(&draft).unwrap();

        assert!(value.get("id").is_none());
        assert_eq!(value["priority"], "High");
        assert_eq!(value["dateDelivery"], "2024-01-01");
    }

    #[test]
    fn validation_reports_first_missing_field() {
        let draft = TaskDraft::new(ProjectId::from("p1")).with_name("x");
        assert_eq!(draft.validate(), Err(ValidationError::MissingField("description")));

        let draft = draft.with_description("y");
        assert_eq!(draft.validate(), Err(ValidationError::MissingField("priority")));

        let draft = draft.with_priority(Priority::Low);
        assert_eq!(draft.validate(), Err(ValidationError::MissingField("dateDelivery")));

        assert!(draft.with_date_delivery(date()).validate().is_ok());
    }

    #[test]
    fn blank_description_is_missing() {
        let draft = TaskDraft::new(ProjectId::from("p1"))
            .with_name("Design")
            .with_description("   ")
            .with_priority(Priority::High)
            .with_date_delivery(date());

        assert_eq!(draft.validate(), Err(ValidationError::MissingField("description")));
    }

    #[test]
    fn edit_draft_round_trips_task_fields() {
        let task = Task::new(TaskId::from("t1"), ProjectId::from("p1"), "a", Priority::High, date())
            .with_description("d");
        let draft = task.to_draft();

        assert_eq!(draft.id, Some(TaskId::from("t1")));
        assert_eq!(draft.priority, Some(Priority::High));
        assert_eq!(draft.description, "d");
    }
}

//! Projects, project summaries and project form input

use crate::collaborator::Collaborator;
use crate::ids::{ProjectId, TaskId, UserId};
use crate::task::Task;
use crate::validation::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The open project, loaded wholesale from the server
///
/// This is a working replica: the server stays authoritative and the local
/// copy is only ever changed through the merge primitives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Server-assigned id
    #[serde(rename = "_id")]
    pub id: ProjectId,
    /// Project name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Client the project is delivered to
    #[serde(default)]
    pub client: String,
    /// Delivery date
    #[serde(default, with = "crate::date::option")]
    pub date_delivery: Option<NaiveDate>,
    /// Owning user
    pub creator: UserId,
    /// Tasks, in server order
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Collaborators
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
}

impl Project {
    /// Create empty project
    #[must_use]
    pub fn new(id: ProjectId, name: impl Into<String>, creator: UserId) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            client: String::new(),
            date_delivery: None,
            creator,
            tasks: Vec::new(),
            collaborators: Vec::new(),
        }
    }

    /// With tasks
    #[inline]
    #[must_use]
    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    /// With collaborators
    #[inline]
    #[must_use]
    pub fn with_collaborators(mut self, collaborators: Vec<Collaborator>) -> Self {
        self.collaborators = collaborators;
        self
    }

    /// Find task by id
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Position of the task with this id
    #[must_use]
    pub fn task_position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    /// Whether `user` is a collaborator
    #[must_use]
    pub fn has_collaborator(&self, user: &UserId) -> bool {
        self.collaborators.iter().any(|c| &c.id == user)
    }

    /// Summary view for the projects list
    #[must_use]
    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            client: self.client.clone(),
            date_delivery: self.date_delivery,
            creator: self.creator.clone(),
        }
    }
}

/// A project as listed on the projects page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    /// Server-assigned id
    #[serde(rename = "_id")]
    pub id: ProjectId,
    /// Project name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Client
    #[serde(default)]
    pub client: String,
    /// Delivery date
    #[serde(default, with = "crate::date::option")]
    pub date_delivery: Option<NaiveDate>,
    /// Owning user
    pub creator: UserId,
}

/// Project form input; `id` decides create vs. update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    /// Id of the project being edited
    #[serde(skip)]
    pub id: Option<ProjectId>,
    /// Project name
    pub name: String,
    /// Description
    pub description: String,
    /// Client
    pub client: String,
    /// Delivery date
    #[serde(with = "crate::date::option")]
    pub date_delivery: Option<NaiveDate>,
}

impl ProjectDraft {
    /// Create draft for a new project
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        client: impl Into<String>,
        date_delivery: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            client: client.into(),
            date_delivery: Some(date_delivery),
        }
    }

    /// With id (turns the submission into an update)
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: ProjectId) -> Self {
        self.id = Some(id);
        self
    }

    /// Whether submitting this draft updates an existing project
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
        let text_fields = [
            ("name", &self.name),
            ("description", &self.description),
            ("client", &self.client),
        ];
        if let Some((field, _)) = text_fields.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ValidationError::MissingField(*field));
        }
        if self.date_delivery.is_none() {
            return Err(ValidationError::MissingField("dateDelivery"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    #[test]
    fn reads_open_project_payload() {
        let json = r#"{
            "_id": "p1",
            "name": "Site",
            "description": "Landing page",
            "client": "ACME",
            "dateDelivery": "2024-03-01T00:00:00.000Z",
            "creator": "u1",
            "tasks": [{
                "_id": "t1", "name": "a", "description": "", "dateDelivery": "2024-01-01",
                "priority": "Low", "state": false, "project": "p1"
            }],
            "collaborators": [{"_id": "u2", "name": "Ana", "email": "ana@x.com"}]
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();

        assert_eq!(project.tasks.len(), 1);
        assert_eq!(project.tasks[0].priority, Priority::Low);
        assert!(project.has_collaborator(&UserId::from("u2")));
        assert_eq!(project.date_delivery, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn summary_reads_without_nested_collections() {
        let json = r#"{"_id":"p1","name":"Site","creator":"u1","dateDelivery":""}"#;
        let summary: ProjectSummary = serde_json::from_str(json).unwrap();

        assert_eq!(summary.date_delivery, None);
        assert!(summary.client.is_empty());
    }

    #[test]
    fn draft_validation() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let draft = ProjectDraft::new("Site", "", "ACME", date);
        assert_eq!(
            draft.validate(),
            Err(ValidationError::MissingField("description"))
        );

        let draft = ProjectDraft::new("Site", "Landing", "ACME", date);
        assert!(draft.validate().is_ok());
        assert!(!draft.is_update());
        assert!(draft.with_id(ProjectId::from("p1")).is_update());
    }
}

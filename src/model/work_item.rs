use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ItemId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    InProgress,
    Completed,
}

impl Status {
    /// Kanban column order.
    pub const ALL: [Status; 3] = [Status::Pending, Status::InProgress, Status::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }

    pub fn column(&self) -> usize {
        match self {
            Status::Pending => 0,
            Status::InProgress => 1,
            Status::Completed => 2,
        }
    }

    pub fn from_column(index: usize) -> Option<Status> {
        Status::ALL.get(index).copied()
    }

    pub fn parse(s: &str) -> Option<Status> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Status::Pending),
            "in_progress" | "in-progress" | "inprogress" => Some(Status::InProgress),
            "completed" | "done" => Some(Status::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Priority> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields the mutation layer is allowed to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Status,
    Priority,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Status => "status",
            Field::Priority => "priority",
        }
    }

    pub fn parse(s: &str) -> Option<Field> {
        match s.trim().to_ascii_lowercase().as_str() {
            "status" => Some(Field::Status),
            "priority" => Some(Field::Priority),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A new value for one mutable field. The variant fixes the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldChange {
    Status(Status),
    Priority(Priority),
}

impl FieldChange {
    pub fn field(&self) -> Field {
        match self {
            FieldChange::Status(_) => Field::Status,
            FieldChange::Priority(_) => Field::Priority,
        }
    }

    pub fn value_str(&self) -> &'static str {
        match self {
            FieldChange::Status(s) => s.as_str(),
            FieldChange::Priority(p) => p.as_str(),
        }
    }

    /// Parse `value` as a value of `field`.
    pub fn parse(field: Field, value: &str) -> Option<FieldChange> {
        match field {
            Field::Status => Status::parse(value).map(FieldChange::Status),
            Field::Priority => Priority::parse(value).map(FieldChange::Priority),
        }
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field(), self.value_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl UserRef {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: ItemId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: Status,
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub project: ProjectRef,
    #[serde(default)]
    pub assigned_to: Vec<UserRef>,
}

impl WorkItem {
    /// Current value of `field`, in the same shape a change would carry.
    pub fn field_value(&self, field: Field) -> FieldChange {
        match field {
            Field::Status => FieldChange::Status(self.status),
            Field::Priority => FieldChange::Priority(self.priority),
        }
    }

    pub fn apply(&mut self, change: FieldChange) {
        match change {
            FieldChange::Status(s) => self.status = s,
            FieldChange::Priority(p) => self.priority = p,
        }
    }

    pub fn assignee_names(&self) -> String {
        self.assigned_to
            .iter()
            .map(UserRef::display_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_item() {
        let json = r#"{
            "id": 5,
            "title": "Ship release",
            "description": "Cut the tag",
            "status": "in_progress",
            "priority": "high",
            "due_date": "2024-03-01",
            "project": {"id": 2, "name": "Platform"},
            "assigned_to": [
                {"id": 9, "username": "sam", "first_name": "Sam", "last_name": "Lee", "profile_picture": null}
            ]
        }"#;
        let item: WorkItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.status, Status::InProgress);
        assert_eq!(item.priority, Priority::High);
        assert_eq!(item.due_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(item.project.name, "Platform");
        assert_eq!(item.assignee_names(), "Sam Lee");
    }

    #[test]
    fn decodes_missing_optionals() {
        let json = r#"{
            "id": 1,
            "title": "Bare",
            "description": null,
            "status": "pending",
            "priority": "low",
            "due_date": null,
            "project": {"id": 1, "name": "P"}
        }"#;
        let item: WorkItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.description, None);
        assert_eq!(item.due_date, None);
        assert!(item.assigned_to.is_empty());
    }

    #[test]
    fn rejects_unknown_status() {
        let json = r#"{"id":1,"title":"x","status":"on_hold","priority":"low","project":{"id":1,"name":"P"}}"#;
        assert!(serde_json::from_str::<WorkItem>(json).is_err());
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let user = UserRef {
            id: 1,
            username: "ghost".into(),
            first_name: String::new(),
            last_name: " ".into(),
            profile_picture: None,
        };
        assert_eq!(user.display_name(), "ghost");
    }

    #[test]
    fn apply_and_field_value_agree() {
        let json = r#"{"id":1,"title":"x","status":"pending","priority":"low","project":{"id":1,"name":"P"}}"#;
        let mut item: WorkItem = serde_json::from_str(json).unwrap();
        item.apply(FieldChange::Priority(Priority::High));
        assert_eq!(item.field_value(Field::Priority), FieldChange::Priority(Priority::High));
        assert_eq!(item.field_value(Field::Status), FieldChange::Status(Status::Pending));
    }

    #[test]
    fn field_change_parses_by_field() {
        assert_eq!(
            FieldChange::parse(Field::Status, "in_progress"),
            Some(FieldChange::Status(Status::InProgress))
        );
        assert_eq!(FieldChange::parse(Field::Priority, "in_progress"), None);
        assert_eq!(Status::from_column(3), None);
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store platform a project targets. Wire values match the backend exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "iOS")]
    Ios,
    Android,
    Both,
}

impl Platform {
    /// The concrete store platforms a project covers.
    /// "Both" expands to iOS and Android, in that order.
    pub fn stores(self) -> Vec<Platform> {
        match self {
            Platform::Both => vec![Platform::Ios, Platform::Android],
            p => vec![p],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Ios => "iOS",
            Platform::Android => "Android",
            Platform::Both => "Both",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Submitted,
    Approved,
    Rejected,
}

impl ProjectStatus {
    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Submitted => "submitted",
            ProjectStatus::Approved => "approved",
            ProjectStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub platform: Platform,
    #[serde(default)]
    pub description: Option<String>,
    pub status: ProjectStatus,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub publish_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for `POST /api/projects`.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectCreate {
    pub name: String,
    pub platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<DateTime<Utc>>,
    pub auto_generate_tasks: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// A single submission task. Completion is tracked solely by the
/// `completed` flag; the backend's legacy string status is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub phase: String,
    #[serde(default)]
    pub phase_number: Option<i64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub step_number: Option<String>,
    #[serde(default)]
    pub estimated_days: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub platform_specific: Option<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_priority() -> Priority {
    Priority::Medium
}

impl Task {
    /// Due date truncated to the local calendar day, for the classifier
    /// and for date inputs.
    pub fn due_day(&self) -> Option<NaiveDate> {
        self.due_date.map(|d| d.date_naive())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskCreate {
    pub project_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub phase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Priority,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// One element of the `tasks_by_phase` response from
/// `GET /api/projects/{id}/tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTasks {
    pub phase_number: i64,
    pub phase_name: String,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TasksByPhaseResponse {
    #[serde(default)]
    pub tasks_by_phase: Vec<PhaseTasks>,
}

/// Static workflow phase reference data from `GET /api/phases`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub phase_number: i64,
    pub phase_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhasesResponse {
    #[serde(default)]
    pub phases: Vec<Phase>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistStatus {
    Incomplete,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachedFile {
    pub filename: String,
    pub original_name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub project_id: String,
    pub platform: Platform,
    pub category: String,
    pub item_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: ChecklistStatus,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub files: Vec<AttachedFile>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ChecklistItem {
    pub fn is_completed(&self) -> bool {
        self.status == ChecklistStatus::Completed
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChecklistItemCreate {
    pub project_id: String,
    pub platform: Platform,
    pub category: String,
    pub item_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChecklistItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ChecklistStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionStatus {
    Open,
    InProgress,
    Resolved,
}

impl RejectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            RejectionStatus::Open => "open",
            RejectionStatus::InProgress => "in progress",
            RejectionStatus::Resolved => "resolved",
        }
    }
}

/// A recorded app-store review rejection and its remediation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rejection {
    pub id: String,
    pub project_id: String,
    pub platform: Platform,
    pub reason: String,
    #[serde(default)]
    pub rejection_date: Option<DateTime<Utc>>,
    pub status: RejectionStatus,
    #[serde(default)]
    pub ai_analysis: Option<String>,
    #[serde(default)]
    pub action_plan: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectionCreate {
    pub project_id: String,
    pub platform: Platform,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RejectionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RejectionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_plan: Option<String>,
}

/// The latest question/answer pair from the AI assistant. Ephemeral:
/// only the most recent exchange is kept per project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiExchange {
    pub project_id: String,
    pub user_message: String,
    pub ai_response: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AiChatRequest {
    pub project_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AiAnalysisRequest {
    pub rejection_reason: String,
    pub platform: Platform,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiAnalysisResponse {
    pub platform: Platform,
    pub rejection_reason: String,
    pub analysis: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn platform_wire_values_round_trip() {
        assert_eq!(serde_json::to_string(&Platform::Ios).unwrap(), "\"iOS\"");
        assert_eq!(serde_json::to_string(&Platform::Both).unwrap(), "\"Both\"");
        let p: Platform = serde_json::from_str("\"Android\"").unwrap();
        assert_eq!(p, Platform::Android);
    }

    #[test]
    fn both_expands_to_ios_then_android() {
        assert_eq!(Platform::Both.stores(), vec![Platform::Ios, Platform::Android]);
        assert_eq!(Platform::Ios.stores(), vec![Platform::Ios]);
    }

    #[test]
    fn parses_tasks_by_phase_payload() {
        let body = r#"{
            "tasks_by_phase": [
                {
                    "phase_number": 1,
                    "phase_name": "Account registration",
                    "tasks": [
                        {
                            "id": "t1",
                            "project_id": "p1",
                            "title": "Register developer account",
                            "phase": "Account registration",
                            "phase_number": 1,
                            "completed": true,
                            "priority": "high",
                            "due_date": "2026-09-01T00:00:00Z"
                        },
                        {
                            "id": "t2",
                            "project_id": "p1",
                            "title": "Pay registration fee",
                            "phase": "Account registration"
                        }
                    ]
                }
            ]
        }"#;
        let parsed: TasksByPhaseResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.tasks_by_phase.len(), 1);
        let group = &parsed.tasks_by_phase[0];
        assert_eq!(group.phase_number, 1);
        assert!(group.tasks[0].completed);
        assert_eq!(group.tasks[0].priority, Priority::High);
        assert_eq!(
            group.tasks[0].due_day(),
            Some(chrono::NaiveDate::from_ymd_opt(2026, 9, 1).unwrap())
        );
        // Absent optional fields fall back to defaults
        assert!(!group.tasks[1].completed);
        assert_eq!(group.tasks[1].priority, Priority::Medium);
        assert_eq!(group.tasks[1].due_date, None);
    }

    #[test]
    fn update_payloads_skip_unset_fields() {
        let update = ChecklistItemUpdate {
            status: Some(ChecklistStatus::Completed),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            "{\"status\":\"completed\"}"
        );
    }

    #[test]
    fn project_defaults_parse() {
        let body = r#"{
            "id": "p1",
            "name": "Test",
            "platform": "Both",
            "status": "active",
            "created_at": "2026-08-25T12:00:00Z"
        }"#;
        let project: Project = serde_json::from_str(body).unwrap();
        assert_eq!(project.status, ProjectStatus::Active);
        assert_eq!(project.start_date, None);
    }
}

//! Validation gates.
//!
//! Each gate checks a fixed set of field keys and reports one message per
//! failing field. Running a gate only rewrites the keys in its own scope;
//! errors recorded for other keys are left alone until something touches
//! them.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::model::{ProjectFields, TaskDraft};

// ---------------------------------------------------------------------------
// Field keys
// ---------------------------------------------------------------------------

pub const FIELD_TITLE: &str = "title";
pub const FIELD_CLIENT: &str = "client";
pub const FIELD_START_DATE: &str = "startDate";
pub const FIELD_DEADLINE: &str = "deadline";
pub const FIELD_MEMBERS: &str = "members";
pub const FIELD_TASK_TITLE: &str = "taskTitle";
pub const FIELD_MILESTONE: &str = "milestone";
pub const FIELD_ASSIGN_TO: &str = "assignTo";
pub const FIELD_TASK_START_DATE: &str = "taskStartDate";
pub const FIELD_TASK_DEADLINE: &str = "taskDeadline";

/// Keys checked by the step 1 gate.
pub const PROJECT_INFO_FIELDS: &[&str] =
    &[FIELD_TITLE, FIELD_CLIENT, FIELD_START_DATE, FIELD_DEADLINE];

/// Keys checked by the step 2 gate.
pub const MEMBER_FIELDS: &[&str] = &[FIELD_MEMBERS];

/// Keys checked by the task-append gate.
pub const TASK_FIELDS: &[&str] = &[
    FIELD_TASK_TITLE,
    FIELD_MILESTONE,
    FIELD_ASSIGN_TO,
    FIELD_TASK_START_DATE,
    FIELD_TASK_DEADLINE,
];

// ---------------------------------------------------------------------------
// Error map
// ---------------------------------------------------------------------------

/// Field key -> human-readable message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace every key in `scope` with whatever `failures` holds for it.
    pub fn replace_scope(&mut self, scope: &[&str], failures: &ValidationErrors) {
        for key in scope {
            match failures.get(key) {
                Some(message) => self.insert(key, message),
                None => {
                    self.remove(key);
                }
            }
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Gates
// ---------------------------------------------------------------------------

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Step 1 gate. No ordering check is made between start date and deadline.
pub fn validate_project_fields(project: &ProjectFields) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if project.title.trim().is_empty() {
        errors.insert(FIELD_TITLE, "Project title is required");
    }
    if is_blank(&project.client) {
        errors.insert(FIELD_CLIENT, "Client selection is required");
    }
    if project.start_date.is_none() {
        errors.insert(FIELD_START_DATE, "Start date is required");
    }
    if project.deadline.is_none() {
        errors.insert(FIELD_DEADLINE, "Deadline is required");
    }
    errors
}

/// Step 2 gate.
pub fn validate_members(members: &[String]) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if members.is_empty() {
        errors.insert(FIELD_MEMBERS, "At least one team member is required");
    }
    errors
}

/// Task-append gate.
pub fn validate_task(task: &TaskDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if task.title.trim().is_empty() {
        errors.insert(FIELD_TASK_TITLE, "Task title is required");
    }
    if is_blank(&task.milestone) {
        errors.insert(FIELD_MILESTONE, "Milestone is required");
    }
    if is_blank(&task.assign_to) {
        errors.insert(FIELD_ASSIGN_TO, "Assignee is required");
    }
    if task.start_date.is_none() {
        errors.insert(FIELD_TASK_START_DATE, "Start date is required");
    }
    if task.deadline.is_none() {
        errors.insert(FIELD_TASK_DEADLINE, "Deadline is required");
    }
    errors
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn complete_project() -> ProjectFields {
        ProjectFields {
            title: "Website Revamp".into(),
            client: Some("Client A".into()),
            start_date: date(2025, 1, 1),
            deadline: date(2025, 6, 1),
            ..ProjectFields::default()
        }
    }

    fn complete_task() -> TaskDraft {
        TaskDraft {
            title: "Design mockups".into(),
            milestone: Some("Design".into()),
            assign_to: Some("Alice".into()),
            start_date: date(2025, 1, 5),
            deadline: date(2025, 1, 20),
            ..TaskDraft::default()
        }
    }

    // -- project gate --

    #[test]
    fn complete_project_passes() {
        assert!(validate_project_fields(&complete_project()).is_empty());
    }

    #[test]
    fn each_missing_project_field_is_reported() {
        let cases: [(&str, fn(&mut ProjectFields)); 4] = [
            (FIELD_TITLE, |p| p.title = "   ".into()),
            (FIELD_CLIENT, |p| p.client = None),
            (FIELD_START_DATE, |p| p.start_date = None),
            (FIELD_DEADLINE, |p| p.deadline = None),
        ];

        for (key, clear) in cases {
            let mut project = complete_project();
            clear(&mut project);
            let errors = validate_project_fields(&project);
            assert_eq!(errors.len(), 1, "only {key} should fail");
            assert!(errors.contains(key), "{key} should be reported");
        }
    }

    #[test]
    fn deadline_before_start_is_accepted() {
        let project = ProjectFields {
            start_date: date(2025, 6, 1),
            deadline: date(2025, 1, 1),
            ..complete_project()
        };
        assert!(validate_project_fields(&project).is_empty());
    }

    #[test]
    fn empty_project_reports_all_four() {
        let errors = validate_project_fields(&ProjectFields::default());
        for key in PROJECT_INFO_FIELDS {
            assert!(errors.contains(key));
        }
        assert_eq!(errors.get(FIELD_TITLE), Some("Project title is required"));
    }

    // -- member gate --

    #[test]
    fn members_must_be_non_empty() {
        assert!(validate_members(&[]).contains(FIELD_MEMBERS));
        assert!(validate_members(&["Alice".to_string()]).is_empty());
    }

    // -- task gate --

    #[test]
    fn complete_task_passes_without_collaborator() {
        assert!(validate_task(&complete_task()).is_empty());
    }

    #[test]
    fn each_missing_task_field_is_reported() {
        let cases: [(&str, fn(&mut TaskDraft)); 5] = [
            (FIELD_TASK_TITLE, |t| t.title.clear()),
            (FIELD_MILESTONE, |t| t.milestone = None),
            (FIELD_ASSIGN_TO, |t| t.assign_to = Some(" ".into())),
            (FIELD_TASK_START_DATE, |t| t.start_date = None),
            (FIELD_TASK_DEADLINE, |t| t.deadline = None),
        ];

        for (key, clear) in cases {
            let mut task = complete_task();
            clear(&mut task);
            let errors = validate_task(&task);
            assert_eq!(errors.len(), 1, "only {key} should fail");
            assert!(errors.contains(key));
        }
    }

    // -- ValidationErrors --

    #[test]
    fn replace_scope_leaves_other_keys() {
        let mut errors = ValidationErrors::new();
        errors.insert(FIELD_MEMBERS, "stale");
        errors.insert(FIELD_TITLE, "old title error");

        let mut failures = ValidationErrors::new();
        failures.insert(FIELD_CLIENT, "Client selection is required");
        errors.replace_scope(PROJECT_INFO_FIELDS, &failures);

        assert_eq!(errors.get(FIELD_MEMBERS), Some("stale"));
        assert!(!errors.contains(FIELD_TITLE));
        assert!(errors.contains(FIELD_CLIENT));
    }

    #[test]
    fn display_joins_messages() {
        let mut errors = ValidationErrors::new();
        errors.insert(FIELD_TITLE, "Project title is required");
        errors.insert(FIELD_CLIENT, "Client selection is required");
        assert_eq!(
            errors.to_string(),
            "client: Client selection is required; title: Project title is required"
        );
    }
}

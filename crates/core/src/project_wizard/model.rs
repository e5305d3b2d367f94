//! Wizard records.
//!
//! Field names serialize in camelCase (`startDate`, `assignTo`) because the
//! submitted aggregate is consumed by the dashboard's list views as-is.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Wizard position. `Submitted` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    ProjectInfo,
    MemberSelection,
    TaskEntry,
    Submitted,
}

/// Number of data-entry steps.
pub const TOTAL_STEPS: u8 = 3;

impl WizardStep {
    /// Convert a 1-based step number to a data-entry step.
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::ProjectInfo),
            2 => Ok(Self::MemberSelection),
            3 => Ok(Self::TaskEntry),
            _ => Err(CoreError::Validation(format!(
                "Invalid step number {n}. Must be between 1 and {TOTAL_STEPS}"
            ))),
        }
    }

    /// 1-based step number; `None` once submitted.
    pub fn to_number(self) -> Option<u8> {
        match self {
            Self::ProjectInfo => Some(1),
            Self::MemberSelection => Some(2),
            Self::TaskEntry => Some(3),
            Self::Submitted => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ProjectInfo => "Project Info",
            Self::MemberSelection => "Team Members",
            Self::TaskEntry => "Tasks",
            Self::Submitted => "Submitted",
        }
    }

    /// The step a validated forward transition leads to. Step 3 leaves the
    /// wizard through submission, not through a transition.
    pub fn forward(self) -> Option<Self> {
        match self {
            Self::ProjectInfo => Some(Self::MemberSelection),
            Self::MemberSelection => Some(Self::TaskEntry),
            Self::TaskEntry | Self::Submitted => None,
        }
    }

    pub fn backward(self) -> Option<Self> {
        match self {
            Self::MemberSelection => Some(Self::ProjectInfo),
            Self::TaskEntry => Some(Self::MemberSelection),
            Self::ProjectInfo | Self::Submitted => None,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Project fields (step 1)
// ---------------------------------------------------------------------------

/// Step 1 data. `title`, `client`, `start_date`, and `deadline` are
/// required to leave the step; the rest is free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFields {
    pub title: String,
    pub client: Option<String>,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub price: String,
}

// ---------------------------------------------------------------------------
// Tasks (step 3)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }
}

/// A task being entered on step 3. Appended to the draft only after it
/// passes its own gate, and never edited afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub milestone: Option<String>,
    pub assign_to: Option<String>,
    pub collaborator: Option<String>,
    pub status: TaskStatus,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Draft and submission
// ---------------------------------------------------------------------------

/// Everything collected so far in one wizard session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardDraft {
    pub project: ProjectFields,
    /// Selected member identifiers, de-duplicated, in selection order.
    pub members: Vec<String>,
    /// Tasks accepted on step 3.
    pub tasks: Vec<TaskDraft>,
    /// The task currently being entered.
    pub task: TaskDraft,
}

impl WizardDraft {
    /// Replace the member selection, dropping blanks and duplicates.
    pub fn select_members<I, S>(&mut self, members: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members.clear();
        for member in members {
            let member = member.into();
            if !member.trim().is_empty() && !self.members.contains(&member) {
                self.members.push(member);
            }
        }
    }

    /// Add `member` if absent, remove it if present.
    pub fn toggle_member(&mut self, member: &str) {
        if let Some(pos) = self.members.iter().position(|m| m == member) {
            self.members.remove(pos);
        } else if !member.trim().is_empty() {
            self.members.push(member.to_string());
        }
    }
}

/// The aggregate handed to the submit collaborator:
/// `{ ...projectFields, members, tasks }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSubmission {
    #[serde(flatten)]
    pub project: ProjectFields,
    pub members: Vec<String>,
    pub tasks: Vec<TaskDraft>,
}

impl ProjectSubmission {
    pub fn from_draft(draft: &WizardDraft) -> Self {
        Self {
            project: draft.project.clone(),
            members: draft.members.clone(),
            tasks: draft.tasks.clone(),
        }
    }
}

/// Normalize a select-style input: blank means "nothing selected".
pub(crate) fn selection(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

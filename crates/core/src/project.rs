//! Project list held by the dashboard.
//!
//! The board is the wizard's submit collaborator: every accepted
//! [`ProjectSubmission`] becomes a new [`ProjectRecord`] in `Pending`
//! status with zero progress.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::project_wizard::{ProjectFields, ProjectSubmission, ProjectSubmitter, TaskDraft};
use crate::types::{CollaboratorError, DbId};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Completed,
    Ongoing,
    #[default]
    Pending,
}

impl ProjectStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Ongoing => "Ongoing",
            Self::Pending => "Pending",
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One row of the project list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: DbId,
    #[serde(flatten)]
    pub project: ProjectFields,
    pub members: Vec<String>,
    pub tasks: Vec<TaskDraft>,
    /// Percent complete, 0..=100.
    pub progress: u8,
    pub status: ProjectStatus,
}

impl ProjectRecord {
    /// True when `query` appears in the title or client name, ignoring case.
    /// An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.project.title.to_lowercase().contains(&needle)
            || self
                .project
                .client
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle))
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// In-memory project list.
#[derive(Debug, Default)]
pub struct ProjectBoard {
    records: Mutex<Vec<ProjectRecord>>,
}

impl ProjectBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a submitted project and return the stored record. The new id
    /// is the list length after insertion.
    pub fn add(&self, submission: ProjectSubmission) -> ProjectRecord {
        let mut records = self.lock();
        let record = ProjectRecord {
            id: records.len() as DbId + 1,
            project: submission.project,
            members: submission.members,
            tasks: submission.tasks,
            progress: 0,
            status: ProjectStatus::Pending,
        };
        records.push(record.clone());

        tracing::info!(id = record.id, title = %record.project.title, "Project added");
        record
    }

    pub fn get(&self, id: DbId) -> Result<ProjectRecord, CoreError> {
        self.lock()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: "Project",
                id,
            })
    }

    pub fn list(&self) -> Vec<ProjectRecord> {
        self.lock().clone()
    }

    /// Records whose title or client contains `query`, case-insensitively,
    /// in list order.
    pub fn search(&self, query: &str) -> Vec<ProjectRecord> {
        self.lock()
            .iter()
            .filter(|r| r.matches(query))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ProjectRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ProjectSubmitter for ProjectBoard {
    async fn submit(&self, project: ProjectSubmission) -> Result<(), CollaboratorError> {
        self.add(project);
        Ok(())
    }
}

//! The wizard state machine.
//!
//! [`ProjectWizard`] is a cheap-to-clone handle over one wizard session.
//! UI events call its setters and transitions; at most one asynchronous
//! operation (transition, save, or submit) may be pending at a time, and
//! the busy flag enforces that. Cancel stays available while busy.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;

use crate::types::CollaboratorError;

use super::backend::{ProjectSubmitter, SimulatedBackend, WizardBackend};
use super::model::{
    selection, ProjectFields, ProjectSubmission, TaskDraft, TaskStatus, WizardDraft, WizardStep,
};
use super::validation::{
    validate_members, validate_project_fields, validate_task, ValidationErrors, FIELD_ASSIGN_TO,
    FIELD_CLIENT, FIELD_DEADLINE, FIELD_MEMBERS, FIELD_MILESTONE, FIELD_START_DATE,
    FIELD_TASK_DEADLINE, FIELD_TASK_START_DATE, FIELD_TASK_TITLE, FIELD_TITLE, MEMBER_FIELDS,
    PROJECT_INFO_FIELDS, TASK_FIELDS,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a wizard operation did not happen. In every case except a
/// successful transition, the wizard stays where it was.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Another wizard operation is still pending")]
    Busy,

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Cannot {action} from step '{from}'")]
    InvalidTransition {
        from: WizardStep,
        action: &'static str,
    },

    #[error("Field belongs to step '{expected}', wizard is on step '{actual}'")]
    WrongStep {
        expected: WizardStep,
        actual: WizardStep,
    },

    #[error("Wizard is closed")]
    Closed,

    #[error("Failed to save wizard progress: {0}")]
    Save(CollaboratorError),

    #[error("Project submission failed: {0}")]
    Submit(CollaboratorError),
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct WizardState {
    step: WizardStep,
    draft: WizardDraft,
    errors: ValidationErrors,
    busy: bool,
    closed: bool,
}

impl WizardState {
    fn ensure_open(&self) -> Result<(), WizardError> {
        if self.closed {
            return Err(WizardError::Closed);
        }
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), WizardError> {
        self.ensure_open()?;
        if self.busy {
            return Err(WizardError::Busy);
        }
        Ok(())
    }

    /// Run the gate for `step`, rewriting only that gate's error keys.
    fn run_gate(&mut self, step: WizardStep) -> Result<(), WizardError> {
        let (scope, failures) = match step {
            WizardStep::ProjectInfo => (
                PROJECT_INFO_FIELDS,
                validate_project_fields(&self.draft.project),
            ),
            WizardStep::MemberSelection => (MEMBER_FIELDS, validate_members(&self.draft.members)),
            WizardStep::TaskEntry | WizardStep::Submitted => return Ok(()),
        };

        self.errors.replace_scope(scope, &failures);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(WizardError::Validation(failures))
        }
    }
}

fn lock_state(state: &Mutex<WizardState>) -> MutexGuard<'_, WizardState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the busy flag when the pending operation finishes, including
/// when its future is dropped before completion.
struct BusyGuard {
    state: Arc<Mutex<WizardState>>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        lock_state(&self.state).busy = false;
    }
}

// ---------------------------------------------------------------------------
// Wizard
// ---------------------------------------------------------------------------

/// Handle to one project-creation wizard session.
#[derive(Clone)]
pub struct ProjectWizard {
    state: Arc<Mutex<WizardState>>,
    backend: Arc<dyn WizardBackend>,
    submitter: Arc<dyn ProjectSubmitter>,
}

impl ProjectWizard {
    /// Open a wizard with every field at its default, on step 1.
    pub fn new(backend: Arc<dyn WizardBackend>, submitter: Arc<dyn ProjectSubmitter>) -> Self {
        Self {
            state: Arc::new(Mutex::new(WizardState::default())),
            backend,
            submitter,
        }
    }

    /// Open a wizard backed by [`SimulatedBackend`] with the given delay.
    pub fn simulated(delay: Duration, submitter: Arc<dyn ProjectSubmitter>) -> Self {
        Self::new(Arc::new(SimulatedBackend::new(delay)), submitter)
    }

    // -- reads --

    pub fn step(&self) -> WizardStep {
        self.lock().step
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    /// Closed by cancel or by a successful submission.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Back/next/add/submit controls are enabled.
    pub fn can_navigate(&self) -> bool {
        let state = self.lock();
        !state.busy && !state.closed
    }

    /// The close control is enabled, busy or not.
    pub fn can_cancel(&self) -> bool {
        !self.lock().closed
    }

    /// Snapshot of everything entered so far.
    pub fn draft(&self) -> WizardDraft {
        self.lock().draft.clone()
    }

    pub fn errors(&self) -> ValidationErrors {
        self.lock().errors.clone()
    }

    // -- step 1 fields --

    pub fn set_title(&self, title: impl Into<String>) -> Result<(), WizardError> {
        let title = title.into();
        self.edit(WizardStep::ProjectInfo, Some(FIELD_TITLE), |d| {
            d.project.title = title
        })
    }

    /// Select a client; a blank value clears the selection.
    pub fn set_client(&self, client: impl Into<String>) -> Result<(), WizardError> {
        let client = selection(client.into());
        self.edit(WizardStep::ProjectInfo, Some(FIELD_CLIENT), |d| {
            d.project.client = client
        })
    }

    pub fn set_description(&self, description: impl Into<String>) -> Result<(), WizardError> {
        let description = description.into();
        self.edit(WizardStep::ProjectInfo, None, |d| {
            d.project.description = description
        })
    }

    pub fn set_start_date(&self, date: Option<NaiveDate>) -> Result<(), WizardError> {
        self.edit(WizardStep::ProjectInfo, Some(FIELD_START_DATE), |d| {
            d.project.start_date = date
        })
    }

    pub fn set_deadline(&self, date: Option<NaiveDate>) -> Result<(), WizardError> {
        self.edit(WizardStep::ProjectInfo, Some(FIELD_DEADLINE), |d| {
            d.project.deadline = date
        })
    }

    pub fn set_price(&self, price: impl Into<String>) -> Result<(), WizardError> {
        let price = price.into();
        self.edit(WizardStep::ProjectInfo, None, |d| d.project.price = price)
    }

    /// Replace all step 1 fields at once.
    pub fn set_project(&self, project: ProjectFields) -> Result<(), WizardError> {
        self.edit(WizardStep::ProjectInfo, None, |d| d.project = project)?;
        let mut state = self.lock();
        for key in PROJECT_INFO_FIELDS {
            state.errors.remove(key);
        }
        Ok(())
    }

    // -- step 2 fields --

    pub fn select_members<I, S>(&self, members: I) -> Result<(), WizardError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members: Vec<String> = members.into_iter().map(Into::into).collect();
        self.edit(WizardStep::MemberSelection, Some(FIELD_MEMBERS), |d| {
            d.select_members(members)
        })
    }

    pub fn toggle_member(&self, member: &str) -> Result<(), WizardError> {
        self.edit(WizardStep::MemberSelection, Some(FIELD_MEMBERS), |d| {
            d.toggle_member(member)
        })
    }

    // -- step 3 task fields --

    pub fn set_task_title(&self, title: impl Into<String>) -> Result<(), WizardError> {
        let title = title.into();
        self.edit(WizardStep::TaskEntry, Some(FIELD_TASK_TITLE), |d| {
            d.task.title = title
        })
    }

    pub fn set_task_description(&self, description: impl Into<String>) -> Result<(), WizardError> {
        let description = description.into();
        self.edit(WizardStep::TaskEntry, None, |d| {
            d.task.description = description
        })
    }

    pub fn set_task_milestone(&self, milestone: impl Into<String>) -> Result<(), WizardError> {
        let milestone = selection(milestone.into());
        self.edit(WizardStep::TaskEntry, Some(FIELD_MILESTONE), |d| {
            d.task.milestone = milestone
        })
    }

    pub fn set_task_assignee(&self, assignee: impl Into<String>) -> Result<(), WizardError> {
        let assignee = selection(assignee.into());
        self.edit(WizardStep::TaskEntry, Some(FIELD_ASSIGN_TO), |d| {
            d.task.assign_to = assignee
        })
    }

    pub fn set_task_collaborator(&self, collaborator: impl Into<String>) -> Result<(), WizardError> {
        let collaborator = selection(collaborator.into());
        self.edit(WizardStep::TaskEntry, None, |d| {
            d.task.collaborator = collaborator
        })
    }

    pub fn set_task_status(&self, status: TaskStatus) -> Result<(), WizardError> {
        self.edit(WizardStep::TaskEntry, None, |d| d.task.status = status)
    }

    pub fn set_task_start_date(&self, date: Option<NaiveDate>) -> Result<(), WizardError> {
        self.edit(WizardStep::TaskEntry, Some(FIELD_TASK_START_DATE), |d| {
            d.task.start_date = date
        })
    }

    pub fn set_task_deadline(&self, date: Option<NaiveDate>) -> Result<(), WizardError> {
        self.edit(WizardStep::TaskEntry, Some(FIELD_TASK_DEADLINE), |d| {
            d.task.deadline = date
        })
    }

    // -- transitions --

    /// Validate the current step and move forward one step.
    pub async fn next(&self) -> Result<WizardStep, WizardError> {
        let (from, to, _busy) = self.begin_forward("advance")?;

        self.backend
            .confirm_transition(from, to)
            .await
            .map_err(WizardError::Save)?;

        self.finish_forward(from, to)
    }

    /// Validate, persist the current step through the backend, then move
    /// forward one step.
    pub async fn save_and_continue(&self) -> Result<WizardStep, WizardError> {
        let (from, to, _busy) = self.begin_forward("save and continue")?;

        let draft = self.draft();
        self.backend
            .save_progress(from, &draft)
            .await
            .map_err(WizardError::Save)?;

        // Fields stay editable while a save is pending; do not confirm a
        // transition for data that no longer passes.
        self.lock().run_gate(from)?;

        self.backend
            .confirm_transition(from, to)
            .await
            .map_err(WizardError::Save)?;

        self.finish_forward(from, to)
    }

    /// Move back one step. Never validates and never clears step 1 or 2
    /// data; leaving step 3 discards the tasks entered there.
    pub fn back(&self) -> Result<WizardStep, WizardError> {
        let mut state = self.lock();
        state.ensure_idle()?;

        let from = state.step;
        let to = from.backward().ok_or(WizardError::InvalidTransition {
            from,
            action: "go back",
        })?;

        if from == WizardStep::TaskEntry {
            let discarded = state.draft.tasks.len();
            state.draft.tasks.clear();
            state.draft.task = TaskDraft::default();
            for key in TASK_FIELDS {
                state.errors.remove(key);
            }
            if discarded > 0 {
                tracing::debug!(discarded, "Discarded tasks on leaving task entry");
            }
        }

        state.step = to;
        tracing::debug!(from = %from, to = %to, "Wizard moved back");
        Ok(to)
    }

    /// Validate the task being entered and append it. Returns the new
    /// task count. On failure the task stays as entered for correction.
    pub fn add_task(&self) -> Result<usize, WizardError> {
        let mut state = self.lock();
        state.ensure_idle()?;
        if state.step != WizardStep::TaskEntry {
            return Err(WizardError::WrongStep {
                expected: WizardStep::TaskEntry,
                actual: state.step,
            });
        }

        let failures = validate_task(&state.draft.task);
        state.errors.replace_scope(TASK_FIELDS, &failures);
        if !failures.is_empty() {
            return Err(WizardError::Validation(failures));
        }

        let task = std::mem::take(&mut state.draft.task);
        state.draft.tasks.push(task);
        Ok(state.draft.tasks.len())
    }

    /// Hand `{ ...project, members, tasks }` to the submitter.
    ///
    /// On success the wizard closes and its draft is discarded. On failure
    /// the wizard stays on step 3 and the submitter's error is returned
    /// unchanged.
    pub async fn submit(&self) -> Result<(), WizardError> {
        let (submission, _busy) = {
            let mut state = self.lock();
            state.ensure_idle()?;
            if state.step != WizardStep::TaskEntry {
                return Err(WizardError::InvalidTransition {
                    from: state.step,
                    action: "submit",
                });
            }
            state.busy = true;
            (ProjectSubmission::from_draft(&state.draft), self.busy_guard())
        };

        tracing::info!(
            title = %submission.project.title,
            members = submission.members.len(),
            tasks = submission.tasks.len(),
            "Submitting project",
        );

        if let Err(e) = self.submitter.submit(submission).await {
            tracing::warn!(error = %e, "Project submission failed");
            return Err(WizardError::Submit(e));
        }

        let mut state = self.lock();
        state.step = WizardStep::Submitted;
        state.closed = true;
        state.draft = WizardDraft::default();
        state.errors = ValidationErrors::new();
        Ok(())
    }

    /// Close the wizard and discard the draft. Allowed while busy; a
    /// pending operation that completes afterwards has no effect.
    pub fn cancel(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        state.draft = WizardDraft::default();
        state.errors = ValidationErrors::new();
        tracing::debug!(busy = state.busy, "Wizard cancelled");
    }

    // ---- private helpers ----

    fn lock(&self) -> MutexGuard<'_, WizardState> {
        lock_state(&self.state)
    }

    fn busy_guard(&self) -> BusyGuard {
        BusyGuard {
            state: Arc::clone(&self.state),
        }
    }

    fn edit(
        &self,
        on: WizardStep,
        clears: Option<&'static str>,
        apply: impl FnOnce(&mut WizardDraft),
    ) -> Result<(), WizardError> {
        let mut state = self.lock();
        state.ensure_open()?;
        if state.step != on {
            return Err(WizardError::WrongStep {
                expected: on,
                actual: state.step,
            });
        }

        apply(&mut state.draft);
        if let Some(key) = clears {
            state.errors.remove(key);
        }
        Ok(())
    }

    fn begin_forward(
        &self,
        action: &'static str,
    ) -> Result<(WizardStep, WizardStep, BusyGuard), WizardError> {
        let mut state = self.lock();
        state.ensure_idle()?;

        let from = state.step;
        let to = from
            .forward()
            .ok_or(WizardError::InvalidTransition { from, action })?;

        state.run_gate(from)?;
        state.busy = true;
        Ok((from, to, self.busy_guard()))
    }

    fn finish_forward(&self, from: WizardStep, to: WizardStep) -> Result<WizardStep, WizardError> {
        let mut state = self.lock();
        state.ensure_open()?;
        // Fields stay editable during the round-trip.
        state.run_gate(from)?;
        state.step = to;
        tracing::debug!(from = %from, to = %to, "Wizard advanced");
        Ok(to)
    }
}

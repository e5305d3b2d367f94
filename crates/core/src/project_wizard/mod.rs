//! Project-creation wizard.
//!
//! A strictly ordered three-step flow (project info, team members, tasks)
//! with a validation gate in front of every forward transition and a
//! single aggregate handed to a [`ProjectSubmitter`] at the end.
//!
//! - [`model`] -- draft records, steps, and the submitted aggregate.
//! - [`validation`] -- per-step gates and the field-keyed error map.
//! - [`backend`] -- collaborator seams (persistence round-trip, submit).
//! - [`controller`] -- the [`ProjectWizard`] state machine.

pub mod backend;
pub mod controller;
pub mod model;
pub mod validation;

pub use backend::{ProjectSubmitter, SimulatedBackend, WizardBackend, DEFAULT_SAVE_DELAY};
pub use controller::{ProjectWizard, WizardError};
pub use model::{ProjectFields, ProjectSubmission, TaskDraft, TaskStatus, WizardDraft, WizardStep};
pub use validation::ValidationErrors;

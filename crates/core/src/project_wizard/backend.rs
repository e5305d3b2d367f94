//! Collaborator seams for the wizard.

use std::time::Duration;

use async_trait::async_trait;

use crate::types::CollaboratorError;

use super::model::{ProjectSubmission, WizardDraft, WizardStep};

/// Default simulated persistence round-trip.
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(1000);

/// Persistence round-trips performed while the wizard is busy.
#[async_trait]
pub trait WizardBackend: Send + Sync {
    /// Explicit "save and continue" of the current step's data.
    async fn save_progress(
        &self,
        step: WizardStep,
        draft: &WizardDraft,
    ) -> Result<(), CollaboratorError>;

    /// Round-trip accompanying every validated forward transition.
    async fn confirm_transition(
        &self,
        from: WizardStep,
        to: WizardStep,
    ) -> Result<(), CollaboratorError>;
}

/// Receives the assembled project when the wizard is submitted.
///
/// A returned error is passed back to whoever called
/// [`ProjectWizard::submit`](super::ProjectWizard::submit); the wizard
/// itself never retries.
#[async_trait]
pub trait ProjectSubmitter: Send + Sync {
    async fn submit(&self, project: ProjectSubmission) -> Result<(), CollaboratorError>;
}

/// Backend that only waits. Stands in for a real persistence API.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedBackend {
    delay: Duration,
}

impl SimulatedBackend {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_DELAY)
    }
}

#[async_trait]
impl WizardBackend for SimulatedBackend {
    async fn save_progress(
        &self,
        step: WizardStep,
        _draft: &WizardDraft,
    ) -> Result<(), CollaboratorError> {
        tracing::debug!(
            step = %step,
            delay_ms = self.delay.as_millis() as u64,
            "Saving wizard progress",
        );
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    async fn confirm_transition(
        &self,
        from: WizardStep,
        to: WizardStep,
    ) -> Result<(), CollaboratorError> {
        tracing::debug!(from = %from, to = %to, "Confirming wizard transition");
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

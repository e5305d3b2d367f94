//! End-to-end walk through the project-creation wizard, submitting into a
//! [`ProjectBoard`].

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use bizdesk_core::project::{ProjectBoard, ProjectStatus};
use bizdesk_core::project_wizard::{ProjectWizard, TaskStatus, WizardError, WizardStep};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

// ---------------------------------------------------------------------------
// Test: full happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn website_revamp_reaches_the_board() {
    let board = Arc::new(ProjectBoard::new());
    let wizard = ProjectWizard::simulated(Duration::from_millis(5), board.clone());

    // Step 1
    wizard.set_title("Website Revamp").unwrap();
    wizard.set_client("Client A").unwrap();
    wizard.set_price("₹1000000").unwrap();
    wizard.set_start_date(date(2025, 1, 1)).unwrap();
    wizard.set_deadline(date(2025, 6, 1)).unwrap();
    assert_eq!(
        wizard.save_and_continue().await.unwrap(),
        WizardStep::MemberSelection
    );

    // Step 2
    wizard.select_members(["Alice", "Bob"]).unwrap();
    assert_eq!(wizard.next().await.unwrap(), WizardStep::TaskEntry);

    // Step 3
    wizard.set_task_title("Design mockups").unwrap();
    wizard.set_task_milestone("Design").unwrap();
    wizard.set_task_assignee("Alice").unwrap();
    wizard.set_task_status(TaskStatus::InProgress).unwrap();
    wizard.set_task_start_date(date(2025, 1, 5)).unwrap();
    wizard.set_task_deadline(date(2025, 1, 20)).unwrap();
    assert_eq!(wizard.add_task().unwrap(), 1);

    wizard.submit().await.unwrap();
    assert!(wizard.is_closed());

    let record = board.get(1).unwrap();
    assert_eq!(record.project.title, "Website Revamp");
    assert_eq!(record.project.client.as_deref(), Some("Client A"));
    assert_eq!(record.members, vec!["Alice", "Bob"]);
    assert_eq!(record.tasks.len(), 1);
    assert_eq!(record.tasks[0].status, TaskStatus::InProgress);
    assert_eq!(record.status, ProjectStatus::Pending);
    assert_eq!(record.progress, 0);
    assert_eq!(board.search("revamp").len(), 1);
}

// ---------------------------------------------------------------------------
// Test: projects without tasks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn project_can_be_submitted_without_tasks() {
    let board = Arc::new(ProjectBoard::new());
    let wizard = ProjectWizard::simulated(Duration::ZERO, board.clone());

    wizard.set_title("Audit").unwrap();
    wizard.set_client("Client B").unwrap();
    wizard.set_start_date(date(2025, 3, 1)).unwrap();
    wizard.set_deadline(date(2025, 4, 1)).unwrap();
    wizard.next().await.unwrap();
    wizard.toggle_member("Carol").unwrap();
    wizard.next().await.unwrap();

    wizard.submit().await.unwrap();

    assert!(board.get(1).unwrap().tasks.is_empty());
}

// ---------------------------------------------------------------------------
// Test: cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancelled_wizard_submits_nothing() {
    let board = Arc::new(ProjectBoard::new());
    let wizard = ProjectWizard::simulated(Duration::ZERO, board.clone());
    wizard.set_title("Abandoned").unwrap();

    wizard.cancel();

    assert!(!wizard.can_cancel());
    assert_matches!(wizard.set_title("Again"), Err(WizardError::Closed));
    assert_matches!(wizard.next().await, Err(WizardError::Closed));
    assert!(board.is_empty());
}

//! Core domain logic for the bizdesk administration dashboard.
//!
//! Holds the client-side session lifecycle, the project-creation wizard,
//! and the small domain models their collaborators exchange. Nothing in
//! this crate touches the network or the process environment.

pub mod company;
pub mod error;
pub mod project;
pub mod project_wizard;
pub mod session;
pub mod types;

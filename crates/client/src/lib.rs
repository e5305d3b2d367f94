//! `bizdesk` client library.
//!
//! Environment configuration, the bearer-authenticated company REST
//! client, and the application error type. The binary entrypoint lives
//! in `main.rs`.

pub mod company_api;
pub mod config;
pub mod error;

pub use company_api::{CompanyApi, CompanySaved};
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;

/// Backend identifiers are numeric (companies, projects, users).
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Error type handed back by external collaborators (submit callbacks,
/// persistence seams). The core never inspects it, only carries it.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

use crate::types::DbId;

/// Domain errors shared by the dashboard's models and guards.
///
/// Lifecycle operations on the session never produce these; they report a
/// [`SessionOutcome`](crate::session::SessionOutcome) instead.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found: id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Message is shown to the user verbatim.
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_not_decorated() {
        let err = CoreError::Validation("Company Name and Billing Address are required.".into());
        assert_eq!(err.to_string(), "Company Name and Billing Address are required.");
    }

    #[test]
    fn not_found_names_the_entity() {
        let err = CoreError::NotFound {
            entity: "Project",
            id: 3,
        };
        assert_eq!(err.to_string(), "Project not found: id 3");
    }
}

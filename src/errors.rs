use crate::services::AdminError;

/// Operator-facing text for a failed `action` ("load", "create", "refund").
pub fn user_message(action: &str, error: &AdminError) -> String {
    let detail = match error {
        AdminError::Network(_) => "the server could not be reached".to_string(),
        AdminError::Status { status, .. } => format!("the server answered {status}"),
        AdminError::Decode(_) => "the server sent an unexpected response".to_string(),
        AdminError::Validation(message) => message.clone(),
        AdminError::NotFound(_) => "the record no longer exists".to_string(),
        AdminError::PermissionDenied(_) => "you are not allowed to do that".to_string(),
        AdminError::Internal(_) => "something went wrong".to_string(),
    };
    format!("Failed to {action}: {detail}")
}

/// HTTP status the mock backend answers with for an error.
pub fn status_code(error: &AdminError) -> u16 {
    match error {
        AdminError::NotFound(_) => 404,
        AdminError::Validation(_) | AdminError::Decode(_) => 400,
        AdminError::PermissionDenied(_) => 403,
        AdminError::Status { status, .. } => *status,
        AdminError::Network(_) | AdminError::Internal(_) => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_action() {
        let message = user_message("delete", &AdminError::Network("refused".into()));
        assert_eq!(message, "Failed to delete: the server could not be reached");
        let message = user_message("create", &AdminError::Validation("name is taken".into()));
        assert_eq!(message, "Failed to create: name is taken");
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(status_code(&AdminError::NotFound("x".into())), 404);
        assert_eq!(status_code(&AdminError::Validation("x".into())), 400);
        assert_eq!(status_code(&AdminError::PermissionDenied("x".into())), 403);
        assert_eq!(status_code(&AdminError::Status { status: 503, body: String::new() }), 503);
        assert_eq!(status_code(&AdminError::Internal("x".into())), 500);
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JqError {
    #[error("syntax error at position {position} near {token}: {message}")]
    Syntax {
        position: usize,
        token: String,
        message: String,
    },

    #[error("{0}")]
    TypeMismatch(String),

    #[error("{0}")]
    PathNotFound(String),

    #[error("invalid JSON input: {0}")]
    InvalidJson(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl JqError {
    /// Errors raised while walking a document, as opposed to errors that stop
    /// the whole run (bad filter, unreadable input).
    pub fn is_evaluation(&self) -> bool {
        matches!(self, JqError::TypeMismatch(_) | JqError::PathNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_mentions_position_and_token() {
        let err = JqError::Syntax {
            position: 4,
            token: "']'".into(),
            message: "unmatched bracket".into(),
        };
        assert_eq!(
            err.to_string(),
            "syntax error at position 4 near ']': unmatched bracket"
        );
    }

    #[test]
    fn evaluation_errors_are_not_fatal() {
        assert!(JqError::PathNotFound("x".into()).is_evaluation());
        assert!(JqError::TypeMismatch("x".into()).is_evaluation());
        assert!(!JqError::InvalidJson("x".into()).is_evaluation());
    }
}

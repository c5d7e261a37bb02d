//! Authentication errors and their user-facing messages.

use clipsync_common::error::ClipsyncError;

/// Failure reported by an [`AuthProvider`](crate::session::AuthProvider).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("email or password missing")]
    MissingFields,

    #[error("email already in use")]
    EmailAlreadyInUse,

    #[error("invalid email")]
    InvalidEmail,

    #[error("password shorter than {min} characters")]
    WeakPassword { min: usize },

    #[error("no account for this email")]
    UserNotFound,

    #[error("wrong password")]
    WrongPassword,

    /// Provider-side failure not tied to the credentials.
    #[error("auth backend failure: {0}")]
    Backend(String),
}

impl AuthError {
    /// Stable provider code, e.g. `auth/invalid-email`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFields => "auth/missing-fields",
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::InvalidEmail => "auth/invalid-email",
            Self::WeakPassword { .. } => "auth/weak-password",
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::Backend(_) => "auth/internal-error",
        }
    }

    /// Message shown to the user for this failure.
    ///
    /// Unknown and wrong-password failures share one message so the form
    /// never reveals which accounts exist.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingFields => "Please fill in all fields".to_string(),
            Self::EmailAlreadyInUse => "This email is already in use".to_string(),
            Self::InvalidEmail => "Invalid email".to_string(),
            Self::WeakPassword { min } => format!("Password must be at least {min} characters"),
            Self::UserNotFound | Self::WrongPassword => "Incorrect email or password".to_string(),
            Self::Backend(_) => "An error occurred during authentication".to_string(),
        }
    }
}

impl From<AuthError> for ClipsyncError {
    fn from(err: AuthError) -> Self {
        ClipsyncError::auth(err.code(), err.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_failures_share_message() {
        assert_eq!(
            AuthError::UserNotFound.user_message(),
            AuthError::WrongPassword.user_message()
        );
        assert_eq!(
            AuthError::UserNotFound.user_message(),
            "Incorrect email or password"
        );
    }

    #[test]
    fn test_messages_per_code() {
        assert_eq!(
            AuthError::EmailAlreadyInUse.user_message(),
            "This email is already in use"
        );
        assert_eq!(AuthError::InvalidEmail.user_message(), "Invalid email");
        assert_eq!(
            AuthError::WeakPassword { min: 6 }.user_message(),
            "Password must be at least 6 characters"
        );
        assert_eq!(
            AuthError::Backend("disk full".into()).user_message(),
            "An error occurred during authentication"
        );
    }

    #[test]
    fn test_converts_into_clipsync_error() {
        let err: ClipsyncError = AuthError::InvalidEmail.into();
        match err {
            ClipsyncError::Auth { code, message } => {
                assert_eq!(code, "auth/invalid-email");
                assert_eq!(message, "Invalid email");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

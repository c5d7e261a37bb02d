//! Login / registration form logic.

use clipsync_media_model::Identity;

use crate::error::AuthError;
use crate::session::AuthProvider;

/// Whether the form signs into an existing account or creates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign in to your account",
            Self::Register => "Create an account",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Register => "Register",
        }
    }

    /// Prompt offered for switching to the other mode.
    pub fn switch_prompt(&self) -> &'static str {
        match self {
            Self::Login => "Don't have an account? Register",
            Self::Register => "Already have an account? Sign in",
        }
    }
}

/// State of the email/password form.
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    mode: AuthMode,
    busy: bool,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Whether a submission is in flight; mode switches are ignored meanwhile.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn toggle_mode(&mut self) {
        if self.busy {
            return;
        }
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
    }

    /// Submit the form against `provider`.
    ///
    /// Empty fields are rejected without contacting the provider. On error,
    /// [`AuthError::user_message`] gives the text to display.
    pub async fn submit(&mut self, provider: &dyn AuthProvider) -> Result<Identity, AuthError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        self.busy = true;
        let result = match self.mode {
            AuthMode::Login => provider.sign_in(&self.email, &self.password).await,
            AuthMode::Register => provider.sign_up(&self.email, &self.password).await,
        };
        self.busy = false;

        if let Err(ref e) = result {
            tracing::info!(code = e.code(), mode = ?self.mode, "Authentication failed");
        }
        result
    }
}

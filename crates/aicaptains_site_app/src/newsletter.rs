// SPDX-License-Identifier: MIT OR Apache-2.0
//! Newsletter signup form state.
//!
//! The form is local only: submitting validates the address and flips the
//! form into its thank-you state. Nothing is sent anywhere.

use thiserror::Error;

/// Form submission errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NewsletterError {
    /// Nothing entered
    #[error("Please enter an email address")]
    Empty,

    /// Not shaped like an address
    #[error("Not a valid email address: {0}")]
    InvalidEmail(String),

    /// Already signed up in this session
    #[error("Already subscribed as {0}")]
    AlreadySubmitted(String),
}

/// Form state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SignupState {
    /// Waiting for input
    #[default]
    Idle,
    /// Thank-you message shown
    Submitted {
        /// Address that was accepted
        email: String,
    },
}

/// Newsletter signup form
#[derive(Debug, Clone, Default)]
pub struct NewsletterForm {
    email: String,
    state: SignupState,
}

impl NewsletterForm {
    /// Create an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the email field contents
    pub fn set_email(&mut self, text: impl Into<String>) {
        self.email = text.into();
    }

    /// Current state
    pub fn state(&self) -> &SignupState {
        &self.state
    }

    /// Validate the field and switch to the thank-you state
    pub fn submit(&mut self) -> Result<(), NewsletterError> {
        if let SignupState::Submitted { email } = &self.state {
            return Err(NewsletterError::AlreadySubmitted(email.clone()));
        }

        let email = self.email.trim();
        if email.is_empty() {
            return Err(NewsletterError::Empty);
        }
        if !is_plausible_email(email) {
            return Err(NewsletterError::InvalidEmail(email.to_string()));
        }

        tracing::info!("Newsletter signup accepted");
        self.state = SignupState::Submitted {
            email: email.to_string(),
        };
        self.email.clear();
        Ok(())
    }

    /// Back to an empty, idle form
    pub fn reset(&mut self) {
        self.email.clear();
        self.state = SignupState::Idle;
    }
}

/// One `@`, a non-empty local part, and a dotted domain
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

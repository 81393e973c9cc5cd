use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationErrors;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

impl RegisterRequest {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        if self.username.trim().is_empty() {
            errors.add("username", "This field is required");
        }
        if !super::handlers::is_valid_email(&self.email) {
            errors.add("email", "Enter a valid email address");
        }
        if self.password.len() < 8 {
            errors.add("password", "Password must be at least 8 characters");
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_accepts_well_formed_payload() {
        let req = RegisterRequest {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "hunter2hunter2".into(),
        };
        assert!(req.validate().is_empty());
    }

    #[test]
    fn register_rejects_blank_username_and_short_password() {
        let req = RegisterRequest {
            username: "   ".into(),
            email: "not-an-email".into(),
            password: "short".into(),
        };
        let errors = req.validate();
        assert!(!errors.messages_for("username").is_empty());
        assert!(!errors.messages_for("email").is_empty());
        assert!(!errors.messages_for("password").is_empty());
    }
}

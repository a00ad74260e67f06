//! Account endpoints: login and registration

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use validator::{Validate, ValidationErrors};

use crate::api::{ApiClient, ApiError, ValidationError};
use crate::models::Session;

pub const LOGIN_PATH: &str = "/api/Account/login";
pub const REGISTER_PATH: &str = "/api/Account/Register";

const UNREACHABLE: &str = "Unable to reach the server. Please try again later.";

/// Login form values
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Please Enter Your Username"))]
    pub username: String,

    #[validate(length(min = 1, message = "Please Enter Your Password"))]
    pub password: String,
}

impl LoginForm {
    pub fn check(&self) -> Result<(), ValidationError> {
        self.validate()
            .map_err(|errors| first_error(&errors, &["username", "password"]))
    }
}

/// Registration form values
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[validate(
        length(min = 1, message = "Please enter your email"),
        email(message = "Invalid email format")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Please enter your password"))]
    pub password: String,

    #[validate(
        length(min = 1, message = "Please confirm your password"),
        must_match(other = "password", message = "Passwords must match")
    )]
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn check(&self) -> Result<(), ValidationError> {
        self.validate().map_err(|errors| {
            first_error(&errors, &["email", "password", "confirm_password"])
        })
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

/// Why an account call did not succeed
#[derive(Debug, Clone, PartialEq)]
pub enum AuthFailure {
    /// Rejected before any request was made
    Invalid(ValidationError),
    /// Request made, user-visible reason
    Rejected(String),
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthFailure::Invalid(e) => write!(f, "{}", e.message),
            AuthFailure::Rejected(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for AuthFailure {}

/// Sign in and persist the returned token and username
pub async fn login(api: &ApiClient, form: &LoginForm) -> Result<Session, AuthFailure> {
    form.check().map_err(AuthFailure::Invalid)?;

    let body = json!({ "username": form.username, "password": form.password });
    let response = match api.post(LOGIN_PATH, &body).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Login failed for {}: {}", form.username, e);
            return Err(AuthFailure::Rejected(failure_message(&e, "An error occurred.")));
        }
    };

    let parsed = response
        .body
        .clone()
        .and_then(|body| serde_json::from_value::<LoginResponse>(body).ok());

    let token = match parsed.as_ref().and_then(|p| p.token.clone()) {
        Some(token) if response.status == 200 && !token.is_empty() => token,
        _ => return Err(AuthFailure::Rejected("Login failed. Please try again.".to_string())),
    };

    let session = Session {
        token,
        username: parsed
            .and_then(|p| p.username)
            .unwrap_or_else(|| form.username.clone()),
    };

    api.session()
        .save(session.clone())
        .map_err(|e| AuthFailure::Rejected(format!("Could not store session: {}", e)))?;

    info!("Signed in as {}", session.username);
    Ok(session)
}

/// Create an account; the caller moves on to the login screen on success
pub async fn register(api: &ApiClient, form: &RegisterForm) -> Result<(), AuthFailure> {
    form.check().map_err(AuthFailure::Invalid)?;

    let body = serde_json::to_value(form)
        .map_err(|e| AuthFailure::Rejected(e.to_string()))?;

    match api.post(REGISTER_PATH, &body).await {
        Ok(response) if response.status == 200 => {
            info!("Registered account {}", form.email);
            Ok(())
        }
        Ok(response) => {
            warn!("Registration returned status {}", response.status);
            Err(AuthFailure::Rejected("Registration failed".to_string()))
        }
        Err(e) => {
            warn!("Registration failed for {}: {}", form.email, e);
            Err(AuthFailure::Rejected(failure_message(&e, "Registration failed")))
        }
    }
}

/// Drop the stored session
pub fn logout(api: &ApiClient) -> Result<(), ApiError> {
    if let Some(username) = api.session().username() {
        info!("Signing out {}", username);
    }
    api.session().clear()
}

fn failure_message(error: &ApiError, fallback: &str) -> String {
    if error.is_transport() {
        UNREACHABLE.to_string()
    } else {
        error.user_message(fallback)
    }
}

/// First message in field order, so the user sees one problem at a time.
/// An empty field reports its required message over any format check.
fn first_error(errors: &ValidationErrors, order: &[&str]) -> ValidationError {
    let by_field = errors.field_errors();
    for field in order {
        if let Some(list) = by_field.get(*field) {
            let chosen = list
                .iter()
                .find(|e| e.code == "length")
                .or_else(|| list.first());
            if let Some(first) = chosen {
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field));
                return ValidationError::new(field, message);
            }
        }
    }
    ValidationError::new("form", errors.to_string())
}

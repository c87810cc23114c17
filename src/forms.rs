//! Client-side form checks run before anything is sent.
//! Each form validates into the request payload the backend expects.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::models::{Audience, Credentials, NewEvent, Registration};

pub const MIN_SECRET_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Please fill in all required fields")]
    MissingRequired,
    #[error("Password must be at least 6 characters")]
    SecretTooShort,
    #[error("Passwords do not match")]
    SecretMismatch,
    #[error("Please choose a batch year")]
    MissingBatchYear,
}

fn blank(s: &str) -> bool { s.trim().is_empty() }

fn check_secret(secret: &str) -> Result<(), FormError> {
    if secret.chars().count() < MIN_SECRET_LEN { Err(FormError::SecretTooShort) } else { Ok(()) }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    /// Username or email.
    pub identifier: String,
    pub secret: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, FormError> {
        if blank(&self.identifier) || self.secret.is_empty() {
            return Err(FormError::MissingFields);
        }
        check_secret(&self.secret)?;
        Ok(Credentials { login: self.identifier.trim().to_string(), password: self.secret.clone() })
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub secret: String,
    pub confirm_secret: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Registration, FormError> {
        if blank(&self.username) || blank(&self.email) || self.secret.is_empty() || self.confirm_secret.is_empty() {
            return Err(FormError::MissingFields);
        }
        check_secret(&self.secret)?;
        if self.secret != self.confirm_secret {
            return Err(FormError::SecretMismatch);
        }
        Ok(Registration {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.secret.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub organizer_name: String,
    pub organizer_email: String,
    pub audience: Audience,
}

impl EventForm {
    pub fn validate(&self) -> Result<NewEvent, FormError> {
        if blank(&self.title) || blank(&self.location) || blank(&self.organizer_name) || blank(&self.organizer_email) {
            return Err(FormError::MissingRequired);
        }
        let (batch_year, group_name) = match &self.audience {
            Audience::Alumnae => (None, None),
            Audience::Batch(year) if blank(year) => return Err(FormError::MissingBatchYear),
            Audience::Batch(year) => (Some(year.trim().to_string()), None),
            Audience::Group(name) => (None, Some(name.trim().to_string()).filter(|n| !n.is_empty())),
        };
        Ok(NewEvent {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            date: self.date.format("%Y-%m-%d").to_string(),
            time: self.time.format("%H:%M").to_string(),
            location: self.location.trim().to_string(),
            organizer_name: self.organizer_name.trim().to_string(),
            organizer_email: self.organizer_email.trim().to_string(),
            audience: self.audience.kind().to_string(),
            batch_year,
            group_name,
        })
    }
}

//! Field-level validation for the login, registration and task forms.
//!
//! Each field runs an ordered list of rules; the first rule that fails
//! produces that field's message and the rest are skipped. All fields are
//! checked so a form can show every problem at once.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::session::Registration;
use crate::task::{NewTask, TaskPatch};

/// Longest accepted task title, in characters.
pub const TITLE_MAX: usize = 100;
/// Longest accepted task description, in characters.
pub const DESCRIPTION_MAX: usize = 500;
/// Shortest accepted password, in characters.
pub const PASSWORD_MIN: usize = 6;

/// One failed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Form field name.
    pub field: String,
    /// Message to show next to the field.
    pub message: String,
}

/// All failed fields of one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    /// A single failed field.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError { field: field.into(), message: message.into() }])
    }

    /// The message for `field`, if it failed.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message.as_str())
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> =
            self.0.iter().map(|e| format!("{}: {}", e.field, e.message)).collect();
        f.write_str(&parts.join("; "))
    }
}

/// A single rule applied to a text field.
#[derive(Debug, Clone, Copy)]
enum Rule {
    Required(&'static str),
    MinLen(usize, &'static str),
    MaxLen(usize, &'static str),
    Email(&'static str),
}

impl Rule {
    fn check(self, value: &str) -> Option<&'static str> {
        match self {
            Rule::Required(msg) => value.trim().is_empty().then_some(msg),
            Rule::MinLen(min, msg) => {
                (!value.is_empty() && value.chars().count() < min).then_some(msg)
            }
            Rule::MaxLen(max, msg) => (value.chars().count() > max).then_some(msg),
            Rule::Email(msg) => (!value.is_empty() && !is_valid_email(value)).then_some(msg),
        }
    }
}

#[derive(Default)]
struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    fn field(&mut self, name: &str, value: &str, rules: &[Rule]) -> &mut Self {
        if let Some(message) = rules.iter().find_map(|rule| rule.check(value)) {
            self.fail(name, message);
        }
        self
    }

    fn fail(&mut self, name: &str, message: &str) {
        self.errors.push(FieldError { field: name.to_string(), message: message.to_string() });
    }

    fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(FieldErrors(self.errors)))
        }
    }
}

/// Accepts `local@domain.tld` where the local part uses `[A-Za-z0-9._%+-]`,
/// the domain uses `[A-Za-z0-9.-]` and the final label is at least two
/// ASCII letters.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    let local_ok = !local.is_empty()
        && local.chars().all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    let host_ok =
        !host.is_empty() && host.chars().all(|c| c.is_ascii_alphanumeric() || ".-".contains(c));
    let tld_ok = tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic());
    local_ok && host_ok && tld_ok
}

/// Validates a login form.
///
/// # Errors
///
/// Returns [`Error::Validation`] listing each failed field.
pub fn check_credentials(email: &str, password: &str) -> Result<()> {
    let mut checks = Checks::default();
    checks
        .field(
            "email",
            email,
            &[Rule::Required("Email is required"), Rule::Email("Please enter a valid email")],
        )
        .field("password", password, &[Rule::Required("Password is required")]);
    checks.finish()
}

/// Validates a registration request.
///
/// # Errors
///
/// Returns [`Error::Validation`] listing each failed field.
pub fn check_registration(registration: &Registration) -> Result<()> {
    let mut checks = Checks::default();
    registration_checks(&mut checks, registration);
    checks.finish()
}

fn registration_checks(checks: &mut Checks, registration: &Registration) {
    checks
        .field("name", &registration.name, &[Rule::Required("Name is required")])
        .field(
            "email",
            &registration.email,
            &[Rule::Required("Email is required"), Rule::Email("Please enter a valid email")],
        )
        .field(
            "password",
            &registration.password,
            &[
                Rule::Required("Password is required"),
                Rule::MinLen(PASSWORD_MIN, "Password must be at least 6 characters"),
            ],
        );
}

/// The registration form as typed, including the confirmation field.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Password typed a second time.
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Validates the whole form and yields the request to send upstream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] listing each failed field, including a
    /// password mismatch.
    pub fn validate(self) -> Result<Registration> {
        let registration = Registration {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
        };
        let mut checks = Checks::default();
        registration_checks(&mut checks, &registration);
        if self.confirm_password.is_empty() {
            checks.fail("confirmPassword", "Please confirm your password");
        } else if self.confirm_password != registration.password {
            checks.fail("confirmPassword", "Passwords do not match");
        }
        checks.finish()?;
        Ok(registration)
    }
}

/// Validates the fields of a task about to be created.
///
/// # Errors
///
/// Returns [`Error::Validation`] for an empty or overlong title or an
/// overlong description.
pub fn check_new_task(task: &NewTask) -> Result<()> {
    let mut checks = Checks::default();
    checks.field(
        "title",
        &task.title,
        &[
            Rule::Required("Title is required"),
            Rule::MaxLen(TITLE_MAX, "Title must be between 1 and 100 characters"),
        ],
    );
    if let Some(description) = &task.description {
        checks.field(
            "description",
            description,
            &[Rule::MaxLen(DESCRIPTION_MAX, "Description cannot exceed 500 characters")],
        );
    }
    checks.finish()
}

/// Validates a partial update.
///
/// Absent fields are not checked. A patch whose `status` and `completed`
/// disagree is rejected.
///
/// # Errors
///
/// Returns [`Error::Validation`] listing each failed field.
pub fn check_patch(patch: &TaskPatch) -> Result<()> {
    let mut checks = Checks::default();
    if let Some(title) = &patch.title {
        checks.field(
            "title",
            title,
            &[
                Rule::Required("Title is required"),
                Rule::MaxLen(TITLE_MAX, "Title must be between 1 and 100 characters"),
            ],
        );
    }
    if let Some(description) = &patch.description {
        checks.field(
            "description",
            description,
            &[Rule::MaxLen(DESCRIPTION_MAX, "Description cannot exceed 500 characters")],
        );
    }
    if let (Some(status), Some(completed)) = (patch.status, patch.completed) {
        if status.is_done() != completed {
            checks.fail("completed", "completed must agree with status");
        }
    }
    checks.finish()
}

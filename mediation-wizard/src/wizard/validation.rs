// Per-step form validation, run when the user leaves a step.

use crate::models::state::{OrganizationInfo, ProblemDescription, StepData, UserInfo};
use crate::utils::validation::{is_valid_email, is_valid_phone, is_valid_url};
use std::fmt;

/// Which way the user is leaving the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// "Next" button: required fields are enforced.
    Forward,
    /// "Previous" button or a tab change: only format checks run, except on the first step
    /// whose required fields are always enforced.
    Backward,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the offending field (`first_name`, `url`, ...).
    pub field: &'static str,
    pub message: &'static str,
}

/// Validation errors in the order the fields appear on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    fn push(&mut self, field: &'static str, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The field that receives focus after a failed validation.
    pub fn first_error(&self) -> Option<&FieldError> {
        self.errors.first()
    }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Step data that passed validation. Only `validate` builds one, so committing to the store
/// requires a successful validation first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidStep(StepData);

impl ValidStep {
    pub fn data(&self) -> &StepData {
        &self.0
    }

    pub fn into_inner(self) -> StepData {
        self.0
    }
}

pub const FIRST_NAME_REQUIRED: &str = "The first name / username is required";
pub const EMAIL_REQUIRED: &str = "The e-mail is required";
pub const EMAIL_INVALID: &str = "The e-mail must be formatted like this: name@domain.extension";
pub const PHONE_INVALID: &str = "The phone number format is invalid";
pub const ISSUE_REQUIRED: &str = "You have to describe your problem";
pub const URL_INVALID: &str = "The URL format is invalid";

pub fn validate(data: StepData, mode: ValidationMode) -> Result<ValidStep, FieldErrors> {
    let errors = match &data {
        StepData::UserInfo(info) => user_info_errors(info),
        StepData::ProblemDescription(problem) => problem_description_errors(problem, mode),
        StepData::OrganizationInfo(info) => organization_info_errors(info),
    };
    if errors.is_empty() {
        Ok(ValidStep(data))
    } else {
        Err(errors)
    }
}

fn user_info_errors(info: &UserInfo) -> FieldErrors {
    let mut errors = FieldErrors::default();
    if info.first_name.is_empty() {
        errors.push("first_name", FIRST_NAME_REQUIRED);
    }
    if info.email.is_empty() {
        errors.push("email", EMAIL_REQUIRED);
    } else if !is_valid_email(&info.email) {
        errors.push("email", EMAIL_INVALID);
    }
    if !info.phone_number.is_empty() && !is_valid_phone(&info.phone_number) {
        errors.push("phone_number", PHONE_INVALID);
    }
    errors
}

fn problem_description_errors(problem: &ProblemDescription, mode: ValidationMode) -> FieldErrors {
    let mut errors = FieldErrors::default();
    if mode == ValidationMode::Forward && problem.issue_description.is_empty() {
        errors.push("issue_description", ISSUE_REQUIRED);
    }
    if !problem.browser_used_is_no() && !problem.url.is_empty() && !is_valid_url(&problem.url) {
        errors.push("url", URL_INVALID);
    }
    errors
}

fn organization_info_errors(info: &OrganizationInfo) -> FieldErrors {
    let mut errors = FieldErrors::default();
    if !info.email.is_empty() && !is_valid_email(&info.email) {
        errors.push("email", EMAIL_INVALID);
    }
    if !info.phone_number.is_empty() && !is_valid_phone(&info.phone_number) {
        errors.push("phone_number", PHONE_INVALID);
    }
    errors
}

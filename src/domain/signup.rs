//! Multi-step signup and admin-request validation.
//!
//! Signup runs in three steps (account, profile, preferences). Each step
//! can be validated on its own so a client can gate the "next" button;
//! the final submission validates all steps and merges their errors.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::{AdminRequest, Profile};
use super::validation::{FieldErrors, TagsInput, ValidationReport};

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").ok());

static PASSWORD_CHARSET: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").ok());

const MIN_PASSWORD_LEN: usize = 6;

/// One page of the signup form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SignupStep {
    /// Email, username, password.
    Account,
    /// Names and optional contact details.
    Profile,
    /// Interests.
    Preferences,
}

impl SignupStep {
    /// Steps in the order the form presents them.
    pub const ALL: [Self; 3] = [Self::Account, Self::Profile, Self::Preferences];

    /// Wire name of the step.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Profile => "profile",
            Self::Preferences => "preferences",
        }
    }
}

impl fmt::Display for SignupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignupStep {
    type Err = String;

    /// Accepts the step name or its 1-based position.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "account" | "1" => Ok(Self::Account),
            "profile" | "2" => Ok(Self::Profile),
            "preferences" | "3" => Ok(Self::Preferences),
            other => Err(other.to_string()),
        }
    }
}

/// Profile fields as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Short biography.
    #[serde(default)]
    pub bio: Option<String>,
    /// Employer.
    #[serde(default)]
    pub company: Option<String>,
    /// Job title.
    #[serde(default)]
    pub job_title: Option<String>,
}

/// Signup form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
    /// Login email.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub username: Option<String>,
    /// Password. Checked here, then handed to the credential store.
    #[serde(default)]
    pub password: Option<String>,
    /// Interests.
    #[serde(default)]
    pub preferences: Option<Vec<String>>,
    /// Profile page.
    #[serde(default)]
    pub profile: Option<ProfilePayload>,
}

/// A validated signup, ready to become a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Trimmed email.
    pub email: String,
    /// Trimmed username.
    pub username: String,
    /// Profile with blanks turned into `None`.
    pub profile: Profile,
    /// Normalized interests.
    pub preferences: Vec<String>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn require(errors: &mut FieldErrors, field: &str, value: Option<&String>, message: &str) {
    if non_blank(value).is_none() {
        errors.insert(field.to_string(), message.to_string());
    }
}

fn check_account(payload: &SignupPayload, errors: &mut FieldErrors) {
    match non_blank(payload.email.as_ref()) {
        None => {
            errors.insert("email".to_string(), "Email is required".to_string());
        }
        Some(email) if !EMAIL_PATTERN.as_ref().is_some_and(|re| re.is_match(email)) => {
            errors.insert("email".to_string(), "Invalid email address".to_string());
        }
        Some(_) => {}
    }

    require(
        errors,
        "username",
        payload.username.as_ref(),
        "Username is required",
    );

    // Passwords are not trimmed: surrounding spaces fail the charset check.
    let message = match payload.password.as_deref().filter(|p| !p.is_empty()) {
        None => Some("Password is required"),
        Some(p) if p.chars().count() < MIN_PASSWORD_LEN => {
            Some("Password must be at least 6 characters")
        }
        Some(p)
            if !PASSWORD_CHARSET.as_ref().is_some_and(|re| re.is_match(p))
                || !p.chars().any(|c| c.is_ascii_alphabetic())
                || !p.chars().any(|c| c.is_ascii_digit()) =>
        {
            Some("Password must contain at least one letter and one number")
        }
        Some(_) => None,
    };
    if let Some(message) = message {
        errors.insert("password".to_string(), message.to_string());
    }
}

fn check_profile(payload: &SignupPayload, errors: &mut FieldErrors) {
    let profile = payload.profile.as_ref();
    require(
        errors,
        "profile.firstName",
        profile.and_then(|p| p.first_name.as_ref()),
        "First name is required",
    );
    require(
        errors,
        "profile.lastName",
        profile.and_then(|p| p.last_name.as_ref()),
        "Last name is required",
    );
}

/// Validates a single signup step.
#[must_use]
pub fn validate_signup_step(payload: &SignupPayload, step: SignupStep) -> ValidationReport {
    let mut errors = FieldErrors::new();
    match step {
        SignupStep::Account => check_account(payload, &mut errors),
        SignupStep::Profile => check_profile(payload, &mut errors),
        // Interests are free-form and optional.
        SignupStep::Preferences => {}
    }
    ValidationReport::from_errors(errors)
}

/// Validates every signup step and merges the errors.
#[must_use]
pub fn validate_signup(payload: &SignupPayload) -> ValidationReport {
    let errors = SignupStep::ALL
        .into_iter()
        .flat_map(|step| validate_signup_step(payload, step).errors)
        .collect();
    ValidationReport::from_errors(errors)
}

impl SignupPayload {
    /// Validates all steps and builds a [`Registration`].
    ///
    /// # Errors
    ///
    /// Returns the failing [`ValidationReport`] when any step fails.
    pub fn into_registration(&self) -> Result<Registration, ValidationReport> {
        let report = validate_signup(self);
        let text = |v: Option<&String>| non_blank(v).map(str::to_string);
        let profile = self.profile.clone().unwrap_or_default();
        let (Some(email), Some(username), Some(first_name), Some(last_name), true) = (
            text(self.email.as_ref()),
            text(self.username.as_ref()),
            text(profile.first_name.as_ref()),
            text(profile.last_name.as_ref()),
            report.is_valid,
        ) else {
            return Err(report);
        };
        let preferences = self
            .preferences
            .as_ref()
            .map(|items| TagsInput::List(items.clone()).to_tags())
            .unwrap_or_default();
        Ok(Registration {
            email,
            username,
            profile: Profile {
                first_name,
                last_name,
                phone_number: text(profile.phone_number.as_ref()),
                bio: text(profile.bio.as_ref()),
                company: text(profile.company.as_ref()),
                job_title: text(profile.job_title.as_ref()),
            },
            preferences,
        })
    }
}

/// Admin-access request as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminRequestPayload {
    /// Why the user wants admin access.
    #[serde(default)]
    pub reason: Option<String>,
    /// Relevant experience.
    #[serde(default)]
    pub experience: Option<String>,
    /// References.
    #[serde(default)]
    pub references: Option<String>,
    /// Anything else.
    #[serde(default)]
    pub additional_info: Option<String>,
}

impl AdminRequestPayload {
    /// Validates the request and stamps it with `now`.
    ///
    /// # Errors
    ///
    /// Returns the failing [`ValidationReport`] when reason or experience
    /// is missing.
    pub fn into_request(&self, now: DateTime<Utc>) -> Result<AdminRequest, ValidationReport> {
        let mut errors = FieldErrors::new();
        require(
            &mut errors,
            "reason",
            self.reason.as_ref(),
            "Please provide a reason for your request",
        );
        require(
            &mut errors,
            "experience",
            self.experience.as_ref(),
            "Please provide your relevant experience",
        );
        let text = |v: Option<&String>| non_blank(v).map(str::to_string);
        let (Some(reason), Some(experience)) =
            (text(self.reason.as_ref()), text(self.experience.as_ref()))
        else {
            return Err(ValidationReport::from_errors(errors));
        };
        Ok(AdminRequest {
            reason,
            experience,
            references: text(self.references.as_ref()),
            additional_info: text(self.additional_info.as_ref()),
            submitted_at: now,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn valid_signup(email: &str, username: &str) -> SignupPayload {
        SignupPayload {
            email: Some(email.to_string()),
            username: Some(username.to_string()),
            password: Some("secret42".to_string()),
            preferences: Some(vec!["workshop".to_string(), " blockchain ".to_string()]),
            profile: Some(ProfilePayload {
                first_name: Some("Ada".to_string()),
                last_name: Some("Lovelace".to_string()),
                company: Some(String::new()),
                ..ProfilePayload::default()
            }),
        }
    }

    #[test]
    fn valid_signup_builds_registration() {
        let Ok(reg) = valid_signup("ada@example.com", "ada").into_registration() else {
            panic!("expected a valid registration");
        };
        assert_eq!(reg.profile.first_name, "Ada");
        assert_eq!(reg.profile.company, None);
        assert_eq!(reg.preferences, vec!["workshop", "blockchain"]);
    }

    #[test]
    fn step_errors_are_scoped_to_their_step() {
        let payload = SignupPayload {
            email: Some("nope".to_string()),
            ..SignupPayload::default()
        };
        let account = validate_signup_step(&payload, SignupStep::Account);
        assert_eq!(account.error("email"), Some("Invalid email address"));
        assert_eq!(account.error("password"), Some("Password is required"));
        assert_eq!(account.error("profile.firstName"), None);

        let profile = validate_signup_step(&payload, SignupStep::Profile);
        assert_eq!(profile.error("email"), None);
        assert_eq!(
            profile.error("profile.lastName"),
            Some("Last name is required")
        );

        assert!(validate_signup_step(&payload, SignupStep::Preferences).is_valid);
    }

    #[test]
    fn full_validation_merges_all_steps() {
        let report = validate_signup(&SignupPayload::default());
        assert_eq!(report.errors.len(), 5);
    }

    #[test]
    fn password_rules() {
        let check = |pw: &str| {
            let payload = SignupPayload {
                password: Some(pw.to_string()),
                ..valid_signup("a@b.io", "a")
            };
            validate_signup_step(&payload, SignupStep::Account)
                .error("password")
                .map(str::to_string)
        };
        assert_eq!(
            check("ab1").as_deref(),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(
            check("abcdefg").as_deref(),
            Some("Password must contain at least one letter and one number")
        );
        assert_eq!(
            check("abc12!").as_deref(),
            Some("Password must contain at least one letter and one number")
        );
        assert_eq!(check("abc123"), None);
    }

    #[test]
    fn email_pattern_is_case_insensitive() {
        let payload = valid_signup("Ada.L+events@Example.ORG", "ada");
        assert!(validate_signup_step(&payload, SignupStep::Account).is_valid);

        let bad = valid_signup("ada@localhost", "ada");
        assert!(!validate_signup_step(&bad, SignupStep::Account).is_valid);
    }

    #[test]
    fn step_parses_from_name_or_position() {
        assert_eq!("profile".parse::<SignupStep>(), Ok(SignupStep::Profile));
        assert_eq!("3".parse::<SignupStep>(), Ok(SignupStep::Preferences));
        assert!("4".parse::<SignupStep>().is_err());
    }

    #[test]
    fn admin_request_requires_reason_and_experience() {
        let Err(report) = AdminRequestPayload::default().into_request(Utc::now()) else {
            panic!("expected validation failure");
        };
        assert_eq!(
            report.error("reason"),
            Some("Please provide a reason for your request")
        );
        assert_eq!(
            report.error("experience"),
            Some("Please provide your relevant experience")
        );

        let ok = AdminRequestPayload {
            reason: Some("I run the local Rust meetup".to_string()),
            experience: Some("Five years".to_string()),
            references: Some("  ".to_string()),
            additional_info: None,
        }
        .into_request(Utc::now());
        let Ok(request) = ok else {
            panic!("expected a valid request");
        };
        assert_eq!(request.references, None);
    }
}

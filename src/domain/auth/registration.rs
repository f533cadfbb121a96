//! Account registration forms

use crate::domain::error::RegistrationError;

use super::UserType;

/// Position sent for recruiters who don't name one
pub const DEFAULT_RECRUITER_POSITION: &str = "Recruiter";

/// Role-specific registration details
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountProfile {
    Candidate {
        skills: Vec<String>,
        experience: Option<String>,
    },
    Recruiter {
        company_name: String,
        position: String,
    },
}

/// A new backend account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile: AccountProfile,
}

impl Registration {
    pub fn user_type(&self) -> UserType {
        match self.profile {
            AccountProfile::Candidate { .. } => UserType::Candidate,
            AccountProfile::Recruiter { .. } => UserType::Recruiter,
        }
    }

    /// Validate the required fields before sending.
    ///
    /// Candidates may register without skills; recruiters need a company.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        let mut required = vec![
            ("username", self.username.as_str()),
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
        ];
        if let AccountProfile::Recruiter {
            company_name,
            position,
        } = &self.profile
        {
            required.push(("company_name", company_name.as_str()));
            required.push(("position", position.as_str()));
        }

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(RegistrationError::MissingField(name));
            }
        }

        validate_email(&self.email)
    }
}

/// Minimal shape check: one `@` with text on both sides
pub fn validate_email(email: &str) -> Result<(), RegistrationError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(())
        }
        _ => Err(RegistrationError::InvalidEmail(email.to_string())),
    }
}

/// Username derived from the local part of an email address
pub fn username_from_email(email: &str) -> String {
    email
        .trim()
        .split('@')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> Registration {
        Registration {
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "pw".into(),
            profile: AccountProfile::Candidate {
                skills: Vec::new(),
                experience: None,
            },
        }
    }

    #[test]
    fn candidate_without_skills_is_valid() {
        let registration = candidate();
        assert!(registration.validate().is_ok());
        assert_eq!(registration.user_type(), UserType::Candidate);
    }

    #[test]
    fn recruiter_needs_company() {
        let registration = Registration {
            profile: AccountProfile::Recruiter {
                company_name: "  ".into(),
                position: DEFAULT_RECRUITER_POSITION.into(),
            },
            ..candidate()
        };
        assert_eq!(registration.user_type(), UserType::Recruiter);
        assert_eq!(
            registration.validate(),
            Err(RegistrationError::MissingField("company_name"))
        );
    }

    #[test]
    fn blank_username_is_rejected() {
        let registration = Registration {
            username: String::new(),
            ..candidate()
        };
        assert_eq!(
            registration.validate(),
            Err(RegistrationError::MissingField("username"))
        );
    }

    #[test]
    fn malformed_email_is_rejected() {
        for email in ["ada", "@example.com", "ada@", "a@b@c"] {
            assert!(matches!(
                validate_email(email),
                Err(RegistrationError::InvalidEmail(_))
            ));
        }
        assert!(validate_email(" ada@example.com ").is_ok());
    }

    #[test]
    fn username_defaults_to_local_part() {
        assert_eq!(username_from_email("ada.l@example.com"), "ada.l");
    }
}

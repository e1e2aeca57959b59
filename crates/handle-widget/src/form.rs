//! Landing form validation.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::{ValidationError, ValidationErrors};

use crate::session::Identity;

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,6}$").ok());

static PHONE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\+?[0-9]{10,15}$").ok());

fn matches(re: &LazyLock<Option<Regex>>, value: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(value))
}

/// Which fields the form enforces.
///
/// Everything is required by default because `/api/sendMessage` rejects a
/// message whose identity fields are empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormRequirements {
    pub name: bool,
    pub email: bool,
    pub phone: bool,
    pub privacy: bool,
    pub terms: bool,
}

impl Default for FormRequirements {
    fn default() -> Self {
        Self {
            name: true,
            email: true,
            phone: true,
            privacy: true,
            terms: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IdentityForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub agree_privacy: bool,
    pub agree_terms: bool,
}

impl IdentityForm {
    /// Check the enforced fields and produce the identity to store.
    ///
    /// The email is lower-cased before matching and stored lower-cased.
    pub fn validate(&self, req: &FormRequirements) -> Result<Identity, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = self.name.trim();
        let email = self.email.trim().to_lowercase();
        let phone = self.phone.trim();

        if req.name && name.is_empty() {
            errors.add("name", invalid("required", "Please enter your name."));
        }
        if req.email && !matches(&EMAIL_RE, &email) {
            errors.add("email", invalid("email", "Please enter a valid email address."));
        }
        if req.phone && !matches(&PHONE_RE, phone) {
            errors.add("phone", invalid("phone", "Please enter a valid phone number."));
        }
        if req.privacy && !self.agree_privacy {
            errors.add("privacy", invalid("consent", "You must agree to the Privacy Policy."));
        }
        if req.terms && !self.agree_terms {
            errors.add("terms", invalid("consent", "You must agree to the Terms of Use."));
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Identity {
            nickname: name.to_owned(),
            email,
            phone: phone.to_owned(),
        })
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// First human-readable message per field, in field order.
pub fn messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| field_rank(field));
    fields
        .into_iter()
        .filter_map(|(_, errs)| errs.first()?.message.as_ref().map(|m| m.to_string()))
        .collect()
}

fn field_rank(field: &str) -> usize {
    ["name", "email", "phone", "privacy", "terms"]
        .iter()
        .position(|f| *f == field)
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod test {
    use super::*;

    fn filled() -> IdentityForm {
        IdentityForm {
            name: "  Bob ".into(),
            email: "Bob.Smith@Example.COM".into(),
            phone: "+15551234567".into(),
            agree_privacy: true,
            agree_terms: true,
        }
    }

    #[test]
    fn valid_form_yields_trimmed_identity() {
        let identity = filled().validate(&FormRequirements::default()).unwrap();
        assert_eq!(identity.nickname, "Bob");
        assert_eq!(identity.email, "bob.smith@example.com");
        assert_eq!(identity.phone, "+15551234567");
    }

    #[test]
    fn every_failure_is_reported_in_field_order() {
        let form = IdentityForm {
            name: "   ".into(),
            email: "nope".into(),
            phone: "12345".into(),
            ..Default::default()
        };
        let errors = form.validate(&FormRequirements::default()).unwrap_err();
        assert_eq!(
            messages(&errors),
            vec![
                "Please enter your name.",
                "Please enter a valid email address.",
                "Please enter a valid phone number.",
                "You must agree to the Privacy Policy.",
                "You must agree to the Terms of Use.",
            ]
        );
    }

    #[test]
    fn phone_pattern_bounds() {
        let req = FormRequirements::default();
        for ok in ["5551234567", "+123456789012345"] {
            let form = IdentityForm { phone: ok.into(), ..filled() };
            assert!(form.validate(&req).is_ok(), "{ok} should pass");
        }
        for bad in ["555123456", "+1234567890123456", "555-123-4567"] {
            let form = IdentityForm { phone: bad.into(), ..filled() };
            assert!(form.validate(&req).is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn relaxed_requirements_skip_optional_fields() {
        let req = FormRequirements { email: false, phone: false, ..Default::default() };
        let form = IdentityForm { email: String::new(), phone: "x".into(), ..filled() };
        let identity = form.validate(&req).unwrap();
        assert_eq!(identity.email, "");
    }
}

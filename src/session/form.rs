use crate::auth::Credentials;
use regex::Regex;

pub const EMAIL_REQUIRED: &str = "email is required";
pub const EMAIL_INVALID: &str = "invalid email";
pub const PASSWORD_REQUIRED: &str = "password is required";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub email: Option<&'static str>,
    pub password: Option<&'static str>,
}

impl FieldErrors {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Client-side checks run before any request is made. The email is
    /// trimmed; the password is passed through untouched.
    ///
    /// # Errors
    /// Returns the per-field messages when either field is rejected.
    pub fn validate(&self) -> Result<Credentials, FieldErrors> {
        let email = self.email.trim();
        let errors = FieldErrors {
            email: if email.is_empty() {
                Some(EMAIL_REQUIRED)
            } else if !valid_email(email) {
                Some(EMAIL_INVALID)
            } else {
                None
            },
            password: self.password.is_empty().then_some(PASSWORD_REQUIRED),
        };

        if errors.is_empty() {
            Ok(Credentials::new(email, self.password.as_str()))
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_input() {
        let credentials = LoginForm::new(" teste@bondy.com.br ", "123456")
            .validate()
            .expect("valid");
        assert_eq!(credentials.email, "teste@bondy.com.br");
        assert_eq!(credentials.password, "123456");
    }

    #[test]
    fn reports_both_missing_fields() {
        let errors = LoginForm::default().validate().expect_err("should fail");
        assert_eq!(errors.email, Some(EMAIL_REQUIRED));
        assert_eq!(errors.password, Some(PASSWORD_REQUIRED));
    }

    #[test]
    fn rejects_malformed_email() {
        for email in ["teste", "teste@bondy", "a b@c.d", "@bondy.com"] {
            let errors = LoginForm::new(email, "123456").validate().expect_err(email);
            assert_eq!(errors.email, Some(EMAIL_INVALID), "{email}");
            assert_eq!(errors.password, None);
        }
    }

    #[test]
    fn whitespace_email_is_missing() {
        let errors = LoginForm::new("   ", "123456").validate().expect_err("should fail");
        assert_eq!(errors.email, Some(EMAIL_REQUIRED));
    }
}

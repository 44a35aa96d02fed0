use crate::auth::SessionProfile;
use std::fmt;

const NOT_PROVIDED: &str = "not provided";

/// What the protected landing page shows for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub greeting: String,
    pub name: String,
    pub email: String,
    pub company: String,
}

impl Dashboard {
    #[must_use]
    pub fn from_profile(profile: &SessionProfile) -> Self {
        let name = profile.name.trim();
        let greeting = if name.is_empty() {
            format!("Welcome, {}!", profile.email)
        } else {
            format!("Welcome, {name}!")
        };

        Self {
            greeting,
            name: or_not_provided(&profile.name),
            email: profile.email.clone(),
            company: profile
                .company
                .as_deref()
                .map_or_else(|| NOT_PROVIDED.to_string(), or_not_provided),
        }
    }
}

fn or_not_provided(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        value.to_string()
    }
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.greeting)?;
        writeln!(f, "  name:    {}", self.name)?;
        writeln!(f, "  email:   {}", self.email)?;
        write!(f, "  company: {}", self.company)
    }
}

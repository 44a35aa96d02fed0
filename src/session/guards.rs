//! Navigation guards. They decide what to show from session state alone;
//! real access control lives on the API.

use crate::session::manager::SessionState;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Render,
    Redirect(&'static str),
}

/// Guard for pages meant for anonymous users, such as the login form.
#[must_use]
pub const fn public_only(state: &SessionState) -> Access {
    if state.is_authenticated() {
        Access::Redirect(DASHBOARD_PATH)
    } else {
        Access::Render
    }
}

/// Guard for pages that need an authenticated session.
#[must_use]
pub const fn protected(state: &SessionState) -> Access {
    if state.is_authenticated() {
        Access::Render
    } else {
        Access::Redirect(LOGIN_PATH)
    }
}

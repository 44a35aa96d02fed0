//! Client side of the login exchange.
//!
//! [`SessionManager`] is the single owner of session state. It calls the
//! authenticate endpoint through an [`AuthClient`], persists the token and
//! profile as a pair through a [`SessionStorage`], and purges the pair when
//! the token's `exp` has passed. Guards and the dashboard only read state.

pub mod client;
pub mod dashboard;
pub mod form;
pub mod guards;
pub mod manager;
pub mod storage;

pub use self::{
    client::{AuthClient, ClientError, HttpAuthClient},
    dashboard::Dashboard,
    form::{FieldErrors, LoginForm},
    guards::{Access, DASHBOARD_PATH, LOGIN_PATH, protected, public_only},
    manager::{LoginFailure, PROFILE_KEY, SessionManager, SessionState, Status, TOKEN_KEY},
    storage::{FileStorage, MemoryStorage, SessionStorage, StorageError},
};

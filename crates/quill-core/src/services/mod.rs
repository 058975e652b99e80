//! Application services built on the ports.

pub mod authorship;
pub mod covers;
pub mod gateway;
pub mod login;
pub mod profiles;
pub mod session_gate;

#[cfg(test)]
pub(crate) mod testing;

pub use covers::{CoverUpload, CoverUploader, DEFAULT_COVER_URL_TTL};
pub use gateway::PostGateway;
pub use login::{LoginConfig, LoginService};
pub use profiles::ProfileService;
pub use session_gate::{Access, SessionGate, UNAUTHORIZED_LOCATION, login_redirect};

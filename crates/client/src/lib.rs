//! Client for the homebook REST backend.
//!
//! The [`Connector`] owns authentication; the services in [`services`] map
//! backend areas (accounting, fuel, banking, users) to typed calls.

pub use connector::Connector;
pub use error::{Action, ClientError, Result, TOKEN_EXPIRED};
pub use services::{AccountingService, BankingService, FuelService, UserService};
pub use session::{DEFAULT_SESSION_PATH, Session, SessionStore};

mod connector;
pub mod drafts;
mod error;
pub mod services;
mod session;

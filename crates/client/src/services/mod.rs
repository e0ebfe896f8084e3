//! Typed wrappers over the [`Connector`](crate::Connector), one per backend
//! area. Mutations return the record as stored by the backend; callers
//! re-fetch the whole collection afterwards.

pub use accounting::AccountingService;
pub use banking::BankingService;
pub use fuel::FuelService;
pub use users::UserService;

mod accounting;
mod banking;
mod fuel;
mod users;

//! Reviewer-side surface of the dashboard: talks to the local service or the
//! workflow host through the same five endpoints.

pub mod budget;
pub mod clock;
pub mod dashboard;
pub mod errors;
pub mod executor;
pub mod gateway;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use budget::BudgetService;
pub use clock::{Clock, SystemClock};
pub use dashboard::{DashboardData, DashboardLoader};
pub use errors::{ClientError, DashboardError, ReviewError, SessionError};
pub use executor::ActionExecutor;
pub use gateway::{DashboardApi, HttpGateway};
pub use session::{FileSessionStore, MemorySessionStore, SessionGate, SessionStore};

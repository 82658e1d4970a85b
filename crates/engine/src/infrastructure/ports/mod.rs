//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Ports exist for:
//! - Storage access (could swap the in-memory adapter for Postgres)
//! - Identity resolution (role checks for admin-only operations)
//! - Barcode rendering (could swap the QR library)
//! - Clock/Random (for testing)

mod error;
mod external;
mod repos;
mod testing;
pub mod types;

pub use error::{BarcodeError, RepoError};
pub use external::BarcodePort;
pub use repos::{AttemptRepo, CampaignRepo, IdentityRepo, ProgressRepo};
pub use testing::{ClockPort, RandomPort};
pub use types::{UserRecord, UserRole};

// Test-only mocks (generated by mockall::automock on the traits above)
#[cfg(test)]
pub use external::MockBarcodePort;
#[cfg(test)]
pub use repos::{MockAttemptRepo, MockCampaignRepo, MockIdentityRepo, MockProgressRepo};
#[cfg(test)]
pub use testing::MockClockPort;

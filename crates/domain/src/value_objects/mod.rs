//! Value objects shared across entities.

pub mod geo;
pub mod verification_code;

pub use geo::{distance_meters, is_within_radius, GeoPoint};
pub use verification_code::{VerificationCode, CODE_ALPHABET, CODE_LEN};

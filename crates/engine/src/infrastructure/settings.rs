//! Application settings.
//!
//! Settings carry serde derives because they are read from the environment
//! and can be echoed back over the API for diagnostics.

use serde::{Deserialize, Serialize};

/// How repeat correct attempts at the same question score.
///
/// The observed legacy behavior sums every correct attempt; capping at one
/// scoring attempt per question is the stricter alternative. Configurable
/// rather than guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// Every correct attempt adds points, including repeats.
    AccumulateAll,
    /// A question scores at most once; later correct attempts earn 0.
    FirstCorrectOnly,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::AccumulateAll
    }
}

impl ScoringPolicy {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "accumulate_all" => Some(Self::AccumulateAll),
            "first_correct_only" => Some(Self::FirstCorrectOnly),
            _ => None,
        }
    }
}

/// Engine-wide settings, loaded from the environment with defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Geofence radius for marker unlocks, in meters.
    pub unlock_radius_m: f64,
    pub scoring_policy: ScoringPolicy,
    /// Base URL embedded in QR scanner links.
    pub public_base_url: String,
    pub server_host: String,
    pub server_port: u16,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            unlock_radius_m: 20.0,
            scoring_policy: ScoringPolicy::default(),
            public_base_url: "http://localhost:5001".into(),
            server_host: "0.0.0.0".into(),
            server_port: 5001,
        }
    }
}

impl AppSettings {
    /// Load settings from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let unlock_radius_m = std::env::var("WAYTRAIL_UNLOCK_RADIUS_M")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.unlock_radius_m);
        let scoring_policy = std::env::var("WAYTRAIL_SCORING_POLICY")
            .ok()
            .and_then(|v| ScoringPolicy::parse(&v))
            .unwrap_or(defaults.scoring_policy);
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .or_else(|_| std::env::var("PRODUCTION_URL"))
            .unwrap_or(defaults.public_base_url);
        let server_host = std::env::var("SERVER_HOST").unwrap_or(defaults.server_host);
        let server_port = std::env::var("SERVER_PORT")
            .or_else(|_| std::env::var("PORT"))
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.server_port);
        Self {
            unlock_radius_m,
            scoring_policy,
            public_base_url,
            server_host,
            server_port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = AppSettings::default();
        assert_eq!(s.unlock_radius_m, 20.0);
        assert_eq!(s.scoring_policy, ScoringPolicy::AccumulateAll);
    }

    #[test]
    fn test_scoring_policy_parse() {
        assert_eq!(
            ScoringPolicy::parse("first_correct_only"),
            Some(ScoringPolicy::FirstCorrectOnly)
        );
        assert_eq!(
            ScoringPolicy::parse(" ACCUMULATE_ALL "),
            Some(ScoringPolicy::AccumulateAll)
        );
        assert_eq!(ScoringPolicy::parse("bogus"), None);
    }
}

//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    clock::{SystemClock, SystemRandom},
    memory::MemoryStore,
    ports::{
        AttemptRepo, BarcodePort, CampaignRepo, ClockPort, IdentityRepo, ProgressRepo, RandomPort,
    },
    qr::QrSvgRenderer,
    settings::AppSettings,
};
use crate::use_cases::{collection::CollectionUseCases, progression::ProgressionUseCases};

/// Main application state, passed to HTTP handlers via Axum state.
pub struct App {
    pub store: Arc<MemoryStore>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub progression: ProgressionUseCases,
    pub collection: CollectionUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(settings: &AppSettings) -> Self {
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);
        let random: Arc<dyn RandomPort> = Arc::new(SystemRandom);
        let barcode: Arc<dyn BarcodePort> = Arc::new(QrSvgRenderer);

        let store = Arc::new(MemoryStore::new(clock.clone()));
        let campaigns: Arc<dyn CampaignRepo> = store.clone();
        let progress: Arc<dyn ProgressRepo> = store.clone();
        let attempts: Arc<dyn AttemptRepo> = store.clone();
        let identity: Arc<dyn IdentityRepo> = store.clone();

        let progression = ProgressionUseCases::new(
            campaigns,
            progress.clone(),
            attempts,
            identity.clone(),
            clock.clone(),
            random,
            settings.unlock_radius_m,
            settings.scoring_policy,
        );
        let collection = CollectionUseCases::new(
            progress,
            identity,
            barcode,
            clock,
            settings.public_base_url.clone(),
        );

        Self {
            store,
            use_cases: UseCases {
                progression,
                collection,
            },
        }
    }
}

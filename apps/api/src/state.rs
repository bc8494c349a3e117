use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::GenerationClient;
use crate::profile::ProfileStore;
use crate::roadmap::layout::LayoutConfig;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Generation backend behind a trait so tests swap in stubs without
    /// touching process-wide state.
    pub llm: Arc<dyn GenerationClient>,
    /// Profile and target-career lookups, likewise stubbable.
    pub profiles: Arc<dyn ProfileStore>,
    /// Spacing parameters for the layered layout.
    pub layout: LayoutConfig,
    #[allow(dead_code)]
    pub config: Config,
}

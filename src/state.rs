use std::sync::Arc;

use crate::config::Config;
use crate::db::{DbPool, PgStore};
use crate::llm::LlmClient;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub store: PgStore,
    pub config: Arc<Config>,
    /// `None` when no provider credential is configured; review requests then
    /// fail with 503 before any record is written.
    pub llm: Option<Arc<dyn LlmClient>>,
}

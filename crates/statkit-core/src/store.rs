use crate::error::StatResult;
use crate::history::HistoryEntry;

/// Fixed keys for persisted values. Each value is stored as JSON.
pub mod keys {
    pub const FAVORITES: &str = "stats-favorites";
    pub const HISTORY: &str = "problem-history";
    pub const API_KEY: &str = "grok-api-key";
}

/// Local persistence for the presentation layer.
pub trait PreferenceStore {
    // Favorites
    fn favorites(&self) -> StatResult<Vec<String>>;
    fn toggle_favorite(&self, symbol: &str) -> StatResult<bool>;

    // Solver history, newest first
    fn history(&self) -> StatResult<Vec<HistoryEntry>>;
    fn record_history(&self, entry: HistoryEntry) -> StatResult<()>;
    fn clear_history(&self) -> StatResult<()>;

    // Client-side credential for direct mode
    fn cached_api_key(&self) -> StatResult<Option<String>>;
    fn set_cached_api_key(&self, key: &str) -> StatResult<()>;
    fn clear_cached_api_key(&self) -> StatResult<()>;
}

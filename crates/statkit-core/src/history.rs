use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Most entries kept in the solver history.
pub const HISTORY_LIMIT: usize = 10;

/// One solved problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub problem: String,
    pub solution: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(problem: impl Into<String>, solution: impl Into<String>) -> Self {
        Self {
            problem: problem.into(),
            solution: solution.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Prepend `entry` and drop anything past [`HISTORY_LIMIT`].
pub fn push_capped(history: &mut Vec<HistoryEntry>, entry: HistoryEntry) {
    history.insert(0, entry);
    history.truncate(HISTORY_LIMIT);
}

/// Add `symbol` if absent, remove it if present. Returns whether it is now a
/// favorite.
pub fn toggle(favorites: &mut Vec<String>, symbol: &str) -> bool {
    if let Some(pos) = favorites.iter().position(|f| f == symbol) {
        favorites.remove(pos);
        false
    } else {
        favorites.push(symbol.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_capped_newest_first() {
        let mut history = Vec::new();
        for i in 0..12 {
            push_capped(&mut history, HistoryEntry::new(format!("p{i}"), "s"));
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].problem, "p11");
        assert_eq!(history[9].problem, "p2");
    }

    #[test]
    fn test_toggle_favorite() {
        let mut favs = vec!["μ".to_string()];
        assert!(toggle(&mut favs, "σ"));
        assert_eq!(favs, vec!["μ", "σ"]);
        assert!(!toggle(&mut favs, "μ"));
        assert_eq!(favs, vec!["σ"]);
    }

    #[test]
    fn test_entry_serializes_rfc3339_timestamp() {
        let entry = HistoryEntry::new("q", "a");
        let json = serde_json::to_value(&entry).unwrap();
        let ts = json["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
    }
}

use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "VillageFor";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// An EPDS result older than this many whole days is no longer shown.
pub const EPDS_VALIDITY_DAYS: i64 = 7;

/// Rolling window used only for the mood card's initial flip state.
pub const MOOD_CARD_FLIP_HOURS: i64 = 24;

/// Buffered signals per subscriber before the slowest one starts lagging.
pub const SIGNAL_BUS_CAPACITY: usize = 64;

/// Preference key: show the EPDS introduction before question 1.
pub const PREF_SHOW_EPDS_INTRODUCTION: &str = "show_epds_introduction";

/// Get the application data directory
/// ~/VillageFor/ on all platforms, or the working directory when no home is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the record database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("records.db")
}

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "villagefor_lib=debug"
    } else {
        "villagefor_lib=info"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_ends_with_app_name() {
        let dir = app_data_dir();
        assert!(dir.ends_with("VillageFor"));
    }

    #[test]
    fn database_under_app_data() {
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("records.db"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn log_filter_targets_this_crate() {
        assert!(default_log_filter().starts_with("villagefor_lib="));
    }
}

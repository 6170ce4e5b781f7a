//! Application-wide constants

pub const DEFAULT_APP_NAME: &str = "groupcast";
pub const DEFAULT_GROUPS_TABLE: &str = "groups";
pub const DEFAULT_SELECTION_COLUMN: &str = "chouse";
pub const DEFAULT_CLOSE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_RESET_DELAY_MS: u64 = 3_000;
pub const LOG_FILE_PREFIX: &str = "groupcast.log";

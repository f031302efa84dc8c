//! Global constants used throughout the pedigree engine.
//!
//! Defaults for request conventions, lookup timeouts and retry parameters live here
//! so the config layer, the CLI and the library agree on them.

/// Default number of generations for an open-ended pedigree request.
pub const DEFAULT_GENERATIONS: u32 = 4;

/// Generation count of the fixed print/export convention.
///
/// The printed pedigree card shows the subject, parents, grandparents and
/// great-grandparents.
pub const PRINT_GENERATIONS: u32 = 3;

/// Annotation levels of an open-ended request: competition history on the root only.
pub const DEFAULT_ANNOTATION_LEVELS: u32 = 1;

/// Annotation levels of the print convention: the root and its direct parents.
pub const PRINT_ANNOTATION_LEVELS: u32 = 2;

/// Per-request timeout for the lookup service (10 seconds).
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Retries after the first attempt for transient lookup failures.
pub const DEFAULT_LOOKUP_RETRIES: usize = 2;

/// Starting delay for exponential retry backoff (10ms).
pub const STARTING_RETRY_DELAY_MS: u64 = 10;

/// Maximum backoff delay between lookup retries (500ms).
pub const MAX_RETRY_DELAY_MS: u64 = 500;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "PEDIGREE_CONFIG";

/// Environment variable disabling progress spinners.
pub const NO_PROGRESS_ENV: &str = "PEDIGREE_NO_PROGRESS";

/**
 * Reporter-wide constants.
 *
 * The notifier identity and platform tags are baked into every report
 * envelope; the defaults seed `Options::default()`.
 */

/// Notifier name sent in every report's `notifier` block.
pub const NOTIFIER_NAME: &str = "rollbar-rust";

/// Notifier version, taken from the `rollbar_core` package version at compile time.
pub const NOTIFIER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Originating-language tag.
pub const LANGUAGE: &str = "rust";

/// Platform tag, constant for the lifetime of the process (e.g. `"linux"`).
pub const PLATFORM: &str = std::env::consts::OS;

/// Placeholder substituted for the values of sensitive fields.
pub const FILTERED: &str = "[FILTERED]";

/// Sentinel used when a frame's symbol cannot be resolved.
pub const UNKNOWN_FUNCTION: &str = "???";

/// Item endpoint of the public Rollbar API.
pub const DEFAULT_ENDPOINT: &str = "https://api.rollbar.com/api/1/item/";

pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Reports held in the delivery queue before new ones are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Field names matching this pattern (case-insensitively) are redacted.
pub const DEFAULT_FILTER_FIELDS: &str = "password|secret|token";

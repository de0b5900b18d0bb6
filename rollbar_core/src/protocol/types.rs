/**
 * Report model for the Rollbar item API.
 *
 * The outermost structure is `Report`, serialized as:
 * ```json
 * {
 *   "access_token": "...",
 *   "data": { "environment": "...", "title": "...", "level": "error", ... }
 * }
 * ```
 *
 * A `Report` is assembled once by the `ReportBuilder`, moved into the
 * delivery queue and consumed exactly once by the background worker.
 */
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Field name → all values submitted under that name (query, form, headers).
pub type Fields = BTreeMap<String, Vec<String>>;

/// Ordered call stack, innermost captured frame first.
pub type Stack = Vec<Frame>;

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/**
 * Severity level of a report.
 *
 * Opaque labels forwarded to the remote system; no ordering is implied.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Critical => "critical",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Level::Critical),
            "error" => Ok(Level::Error),
            "warning" => Ok(Level::Warning),
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            other => Err(Error::UnknownLevel(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/**
 * The top-level document POSTed to the item endpoint.
 *
 * The access token travels inside the JSON body, not as a header.
 */
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Report {
    pub access_token: String,
    pub data: ReportData,
}

/**
 * Metadata envelope plus the error or message body.
 */
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportData {
    pub environment: String,

    /// First line of the error or message text.
    pub title: String,

    pub level: Level,

    /// Wall-clock time at build, in UNIX seconds.
    pub timestamp: i64,

    pub platform: String,
    pub language: String,
    pub server: Server,
    pub notifier: Notifier,
    pub body: Body,

    /// Grouping hash over the captured stack. Present for error bodies only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    /// Present for request-aware error reports only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestContext>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Host name, empty when it could not be resolved.
    pub host: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notifier {
    pub name: String,
    pub version: String,
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/**
 * Report body: either a stack trace with exception details or a plain message.
 *
 * Serialized externally tagged, producing `{"trace": {...}}` or
 * `{"message": {"body": "..."}}`.
 */
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    Trace(Trace),
    Message(Message),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trace {
    pub frames: Stack,
    pub exception: Exception,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exception {
    /// Label used by the server to group by error kind.
    pub class: String,

    /// Full error text, newlines included.
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Full message text, newlines included.
    pub body: String,
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/**
 * A single stack level at capture time.
 *
 * `filename` is already normalized; `method` is the demangled symbol
 * name or `"???"` when no symbol could be resolved.
 */
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    pub filename: String,
    pub method: String,
    #[serde(rename = "lineno")]
    pub line: u32,
}

// ---------------------------------------------------------------------------
// Request context
// ---------------------------------------------------------------------------

/**
 * HTTP request details attached to request-aware error reports.
 *
 * Query and form parameters are redacted before they get here.
 */
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, FieldValue>,

    /// Redacted query parameters, re-encoded with keys in sorted order.
    pub query_string: String,

    #[serde(rename = "GET")]
    pub get: BTreeMap<String, FieldValue>,

    #[serde(rename = "POST")]
    pub post: BTreeMap<String, FieldValue>,
}

/**
 * A flattened field: a bare string when exactly one value was present,
 * otherwise the full list.
 */
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multiple(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_round_trips_through_str() {
        for level in [Level::Critical, Level::Error, Level::Warning, Level::Info, Level::Debug] {
            assert_eq!(level.as_str().parse::<Level>().unwrap(), level);
        }
        assert!("fatal".parse::<Level>().is_err());
    }

    #[test]
    fn test_body_wire_shape() {
        let message = Body::Message(Message { body: "hi".into() });
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            serde_json::json!({ "message": { "body": "hi" } })
        );

        let trace = Body::Trace(Trace {
            frames: vec![Frame {
                filename: "src/main.rs".into(),
                method: "demo::main".into(),
                line: 7,
            }],
            exception: Exception {
                class: "panic".into(),
                message: "boom".into(),
            },
        });
        assert_eq!(
            serde_json::to_value(&trace).unwrap(),
            serde_json::json!({
                "trace": {
                    "frames": [{ "filename": "src/main.rs", "method": "demo::main", "lineno": 7 }],
                    "exception": { "class": "panic", "message": "boom" }
                }
            })
        );
    }

    #[test]
    fn test_field_value_is_untagged() {
        let single = FieldValue::Single("a".into());
        let multiple = FieldValue::Multiple(vec!["a".into(), "b".into()]);
        assert_eq!(serde_json::to_string(&single).unwrap(), r#""a""#);
        assert_eq!(serde_json::to_string(&multiple).unwrap(), r#"["a","b"]"#);
    }
}

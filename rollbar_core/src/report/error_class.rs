/*!
 * The error value handed to the reporting API, tagged with how much type
 * information it carries. The tag decides the `exception.class` label.
 */
use std::fmt;

use crate::report::fingerprint::checksum_hex;

/// An error as it enters the reporting API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportedError {
    /// No type information at all, e.g. a panic payload.
    Panic { message: String },

    /// A plain message with no concrete error type behind it.
    Generic { message: String },

    /// An error with a known concrete type.
    Typed { type_name: String, message: String },
}

impl ReportedError {
    /**
     * Wraps a typed error, labeling it with its concrete type name.
     *
     * ```ignore
     * let err = std::fs::read("missing").unwrap_err();
     * rollbar_core::report_error(Level::Error, ReportedError::typed(&err));
     * ```
     */
    pub fn typed<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized + 'static,
    {
        Self::Typed {
            type_name: std::any::type_name::<E>().to_string(),
            message: error.to_string(),
        }
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    pub fn panic(message: impl Into<String>) -> Self {
        Self::Panic {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Panic { message } | Self::Generic { message } | Self::Typed { message, .. } => message,
        }
    }

    /**
     * The `exception.class` label:
     * - `Panic` → `"panic"`
     * - `Generic` → checksum of the message in braces, so identical generic
     *   messages group together
     * - `Typed` → the type name without a leading `&`, `*const ` / `*mut `
     */
    pub fn class(&self) -> String {
        match self {
            Self::Panic { .. } => "panic".to_string(),
            Self::Generic { message } => format!("{{{}}}", checksum_hex(message.as_bytes())),
            Self::Typed { type_name, .. } => strip_sigils(type_name).to_string(),
        }
    }
}

fn strip_sigils(mut name: &str) -> &str {
    loop {
        let stripped = name
            .strip_prefix("*const ")
            .or_else(|| name.strip_prefix("*mut "))
            .or_else(|| name.strip_prefix("&mut "))
            .or_else(|| name.strip_prefix('&'))
            .or_else(|| name.strip_prefix('*'));
        match stripped {
            Some(rest) => name = rest,
            None => return name,
        }
    }
}

impl fmt::Display for ReportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<&str> for ReportedError {
    fn from(message: &str) -> Self {
        Self::generic(message)
    }
}

impl From<String> for ReportedError {
    fn from(message: String) -> Self {
        Self::generic(message)
    }
}

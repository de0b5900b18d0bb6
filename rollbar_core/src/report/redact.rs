/*!
 * Redaction of sensitive request fields.
 *
 * Field *names* are matched against a case-insensitive pattern; every value
 * under a matching name is replaced by a single `"[FILTERED]"`.
 */
use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};

use crate::protocol::constants::FILTERED;
use crate::protocol::types::{FieldValue, Fields};

/// Compiled sensitive-field pattern.
#[derive(Clone, Debug)]
pub struct Redactor {
    pattern: Regex,
}

impl Redactor {
    /**
     * Compiles `pattern` case-insensitively.
     *
     * An unanchored pattern such as `password|secret|token` matches any
     * name containing one of the words (`user_password`, `X-Secret`).
     */
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { pattern })
    }

    pub fn is_sensitive(&self, key: &str) -> bool {
        self.pattern.is_match(key)
    }

    /// Returns `fields` with the values of every sensitive key replaced.
    pub fn redact(&self, mut fields: Fields) -> Fields {
        for (key, values) in fields.iter_mut() {
            if self.is_sensitive(key) {
                *values = vec![FILTERED.to_string()];
            }
        }
        fields
    }
}

/**
 * Shapes fields for the wire: one value becomes a bare string, anything
 * else (including no values) stays a list.
 */
pub fn flatten(fields: &Fields) -> BTreeMap<String, FieldValue> {
    fields
        .iter()
        .map(|(key, values)| {
            let value = match values.as_slice() {
                [single] => FieldValue::Single(single.clone()),
                _ => FieldValue::Multiple(values.clone()),
            };
            (key.clone(), value)
        })
        .collect()
}

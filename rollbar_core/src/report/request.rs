/*!
 * Request details for request-aware error reports.
 *
 * `RequestInfo` is the framework-neutral input; the builder turns it into
 * the redacted `RequestContext` that goes on the wire.
 */
use url::form_urlencoded;

use crate::protocol::types::{Fields, RequestContext};
use crate::report::redact::{flatten, Redactor};

/**
 * The parts of an incoming HTTP request worth reporting.
 *
 * `url` may be absolute or just a path with a query string; query
 * parameters are parsed from whatever follows the first `?`.
 */
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestInfo {
    pub url: String,
    pub method: String,
    pub headers: Fields,

    /// Decoded form (POST / PUT) parameters, if the application parsed any.
    pub form: Fields,
}

impl RequestInfo {
    /**
     * Extracts URL, method and headers from an `http::Request`.
     *
     * The body is left untouched; set `form` afterwards if the form has been
     * decoded. Header values that are not valid UTF-8 are reported lossily.
     */
    pub fn from_http<B>(request: &http::Request<B>) -> Self {
        let mut headers = Fields::new();
        for (name, value) in request.headers() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        Self {
            url: request.uri().to_string(),
            method: request.method().as_str().to_string(),
            headers,
            form: Fields::new(),
        }
    }

    /// Query parameters decoded from `url`, values in order of appearance.
    pub fn query(&self) -> Fields {
        let mut query = Fields::new();
        let Some((_, raw)) = self.url.split_once('?') else {
            return query;
        };
        let raw = raw.split('#').next().unwrap_or_default();

        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            query.entry(key.into_owned()).or_default().push(value.into_owned());
        }
        query
    }

    /// Builds the wire context, redacting query and form parameters.
    pub fn to_context(&self, redactor: &Redactor) -> RequestContext {
        let query = redactor.redact(self.query());
        let form = redactor.redact(self.form.clone());

        RequestContext {
            url: self.url.clone(),
            method: self.method.clone(),
            headers: flatten(&self.headers),
            query_string: encode_query(&query),
            get: flatten(&query),
            post: flatten(&form),
        }
    }
}

/// Encodes fields as `application/x-www-form-urlencoded`, keys sorted.
pub fn encode_query(fields: &Fields) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, values) in fields {
        for value in values {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}

/*!
 * Report construction: everything between "something failed" and a
 * finished `Report`:
 * - `stack`: call-stack capture and path normalization
 * - `fingerprint`: grouping hash over a stack
 * - `redact`: sensitive-field filtering
 * - `request`: request context extraction
 * - `error_class`: the tagged error value and its class label
 * - `builder`: envelope assembly
 */

pub mod builder;
pub mod error_class;
pub mod fingerprint;
pub mod redact;
pub mod request;
pub mod stack;

pub use builder::ReportBuilder;
pub use error_class::ReportedError;
pub use redact::Redactor;
pub use request::RequestInfo;

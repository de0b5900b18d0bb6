/**
 * Report assembly.
 *
 * The builder holds the per-client settings (token, environment, redactor)
 * and stamps every report with the metadata envelope:
 * - timestamp: wall clock at build time
 * - host: resolved on every build, empty if unavailable
 * - notifier, platform, language: constants
 *
 * Error reports capture the stack through the walker and fingerprint it.
 * The builder never fails: anything it cannot resolve degrades to an empty
 * or sentinel value.
 */
use crate::protocol::constants::{LANGUAGE, NOTIFIER_NAME, NOTIFIER_VERSION, PLATFORM};
use crate::protocol::types::{
    Body, Exception, Level, Message, Notifier, Report, ReportData, RequestContext, Server, Stack, Trace,
};
use crate::report::error_class::ReportedError;
use crate::report::fingerprint::fingerprint;
use crate::report::redact::Redactor;
use crate::report::request::RequestInfo;
use crate::report::stack::capture_caller_stack;

/// Builds immutable `Report`s for one client.
#[derive(Clone, Debug)]
pub struct ReportBuilder {
    access_token: String,
    environment: String,
    redactor: Redactor,
}

impl ReportBuilder {
    pub fn new(access_token: impl Into<String>, environment: impl Into<String>, redactor: Redactor) -> Self {
        Self {
            access_token: access_token.into(),
            environment: environment.into(),
            redactor,
        }
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    /**
     * Builds an error report with a stack captured at the caller.
     *
     * `skip == 0` puts the first frame outside the reporter's own entry
     * points first in the stack; each increment drops one more frame.
     */
    pub fn error_report(&self, level: Level, error: &ReportedError, skip: usize) -> Report {
        let stack = capture_caller_stack(skip);
        self.error_report_with_stack(level, error, stack, None)
    }

    /// Same as `error_report`, with the request context attached.
    pub fn request_error_report(
        &self,
        level: Level,
        error: &ReportedError,
        skip: usize,
        request: &RequestInfo,
    ) -> Report {
        let stack = capture_caller_stack(skip);
        let context = request.to_context(&self.redactor);
        self.error_report_with_stack(level, error, stack, Some(context))
    }

    /**
     * Builds an error report around an already captured stack.
     *
     * Used when the stack needs trimming before it is reported, as the
     * panic hook does.
     */
    pub fn error_report_with_stack(
        &self,
        level: Level,
        error: &ReportedError,
        stack: Stack,
        request: Option<RequestContext>,
    ) -> Report {
        let fingerprint = fingerprint(&stack);
        let body = Body::Trace(Trace {
            frames: stack,
            exception: Exception {
                class: error.class(),
                message: error.message().to_string(),
            },
        });

        let mut report = self.envelope(level, error.message(), body);
        report.data.fingerprint = Some(fingerprint);
        report.data.request = request;
        report
    }

    pub fn message_report(&self, level: Level, message: &str) -> Report {
        let body = Body::Message(Message {
            body: message.to_string(),
        });
        self.envelope(level, message, body)
    }

    fn envelope(&self, level: Level, text: &str, body: Body) -> Report {
        Report {
            access_token: self.access_token.clone(),
            data: ReportData {
                environment: self.environment.clone(),
                title: title(text),
                level,
                timestamp: chrono::Utc::now().timestamp(),
                platform: PLATFORM.to_string(),
                language: LANGUAGE.to_string(),
                server: Server { host: host_name() },
                notifier: Notifier {
                    name: NOTIFIER_NAME.to_string(),
                    version: NOTIFIER_VERSION.to_string(),
                },
                body,
                fingerprint: None,
                request: None,
            },
        }
    }
}

/// Text up to, not including, the first newline.
pub fn title(text: &str) -> String {
    text.split('\n').next().unwrap_or_default().to_string()
}

fn host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_default()
}

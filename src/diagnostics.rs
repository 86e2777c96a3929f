use crate::model::Span;
use serde::Serialize;
use std::fmt;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum Severity {
    Error,
    Warning,
}

/// A structured diagnostic record produced by validation or emission.
///
/// The message is kept as a template plus positional arguments so tooling
/// can re-render or localize it; `Display` substitutes `{0}`, `{1}`, ...
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub severity: Severity,
    pub template: &'static str,
    pub args: Vec<String>,
    pub span: Span,
}

impl Diagnostic {
    pub const DUPLICATE_LIFETIME: &'static str = "PW0001";
    pub const MISSING_DEPENDENCY: &'static str = "PW0002";

    pub fn duplicate_lifetime(span: Span) -> Self {
        Self {
            code: Self::DUPLICATE_LIFETIME,
            severity: Severity::Error,
            template: "More than one lifetime annotation is declared on the type; \
                       a service may only have one lifetime.",
            args: Vec::new(),
            span,
        }
    }

    pub fn missing_dependency(required: impl Into<String>, span: Span) -> Self {
        Self {
            code: Self::MISSING_DEPENDENCY,
            severity: Severity::Warning,
            template: "Required dependency '{0}' does not appear to be registered. \
                       Did you forget to register it?",
            args: vec![required.into()],
            span,
        }
    }

    pub fn message(&self) -> String {
        let mut message = self.template.to_string();
        for (i, arg) in self.args.iter().enumerate() {
            message = message.replace(&format!("{{{i}}}"), arg);
        }
        message
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}]: {}",
            self.span,
            self.severity,
            self.code,
            self.message()
        )
    }
}

//! # Route Description Linter
//!
//! Checks that routes carry the documentation a generated API document
//! needs. The registry runs it on every route before storing it unless the
//! configuration sets `skip_descriptions_check`.
//!
//! ## Checks Performed
//!
//! 1. **Route description** - at least [`MIN_DESCRIPTION_LEN`] characters
//! 2. **Response description** - the response schema itself has a `description`
//! 3. **Field descriptions** - every property of the path, query, body and
//!    response schemas, including nested objects and array items, has a
//!    `description`. The root of path, query and body schemas needs none.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use typeroute::linter::{lint_route, format_lint_issues};
//!
//! let issues = lint_route(&route);
//! if !issues.is_empty() {
//!     eprintln!("{}", format_lint_issues(&issues));
//! }
//! ```

use serde_json::Value;
use std::fmt;

use crate::route::Route;
use crate::schema::Schema;


/// Shortest accepted route description.
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// Severity level for lint issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Blocks registration
    Error,
    /// Reported, does not block registration
    Warning,
}

impl fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintSeverity::Error => f.write_str("error"),
            LintSeverity::Warning => f.write_str("warning"),
        }
    }
}

/// A lint issue found on a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
    /// Where the issue occurred (e.g. `GET:/pets/{id}`, `GET:/pets/{id}:body.name`)
    pub location: String,
    pub severity: LintSeverity,
    /// Type of lint issue (e.g. `missing_description`)
    pub kind: String,
    /// Human-readable description of the problem
    pub message: String,
    /// Optional suggestion for how to fix it
    pub suggestion: Option<String>,
}

impl LintIssue {
    pub fn new(
        location: impl Into<String>,
        severity: LintSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        LintIssue {
            location: location.into(),
            severity,
            kind: kind.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.kind, self.message)
    }
}

/// Lint one route.
#[must_use]
pub fn lint_route<R, C>(route: &Route<R, C>) -> Vec<LintIssue> {
    let route_id = format!("{}:{}", route.method, route.path);
    let mut issues = Vec::new();

    if route.description.trim().len() < MIN_DESCRIPTION_LEN {
        issues.push(
            LintIssue::new(
                &route_id,
                LintSeverity::Error,
                "missing_description",
                format!("Description for {} is missing or too small", route.path),
            )
            .with_suggestion(format!(
                "Describe what the route does in at least {MIN_DESCRIPTION_LEN} characters"
            )),
        );
    }

    let validators = &route.validators;
    if let Some(response) = &validators.response {
        if response.description().is_none() {
            issues.push(
                LintIssue::new(
                    &route_id,
                    LintSeverity::Error,
                    "missing_response_description",
                    format!("Route '{route_id}': response missing openapi description"),
                )
                .with_suggestion("Add a top-level \"description\" to the response schema"),
            );
        }
        lint_fields(&route_id, "response", response, &mut issues);
    }
    for (name, schema) in [
        ("path", &validators.path),
        ("query", &validators.query),
        ("body", &validators.body),
    ] {
        if let Some(schema) = schema {
            lint_fields(&route_id, name, schema, &mut issues);
        }
    }

    issues
}

fn lint_fields(route_id: &str, validator: &str, schema: &Schema, issues: &mut Vec<LintIssue>) {
    walk_properties(schema.raw(), "", &mut |field| {
        issues.push(LintIssue::new(
            format!("{route_id}:{validator}.{field}"),
            LintSeverity::Error,
            "missing_field_description",
            format!(
                "Route '{route_id}': {validator} missing openapi description on field '{field}'"
            ),
        ));
    });
}

/// Call `missing` with the dotted name of every property lacking a
/// description. Array items contribute `name[]` segments.
fn walk_properties(schema: &Value, prefix: &str, missing: &mut dyn FnMut(&str)) {
    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (name, property) in properties {
            let field = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };
            if property.get("description").is_none() {
                missing(&field);
            }
            walk_properties(property, &field, missing);
        }
    }
    if let Some(items) = schema.get("items") {
        let field = format!("{prefix}[]");
        walk_properties(items, if prefix.is_empty() { "" } else { &field }, missing);
    }
}

/// Render issues as a multi-line report.
#[must_use]
pub fn format_lint_issues(issues: &[LintIssue]) -> String {
    let errors = issues
        .iter()
        .filter(|i| i.severity == LintSeverity::Error)
        .count();
    let mut out = format!(
        "{} error(s), {} warning(s)",
        errors,
        issues.len() - errors
    );
    for issue in issues {
        out.push_str(&format!(
            "\n  [{}] {}\n    {}",
            issue.kind, issue.location, issue.message
        ));
        if let Some(suggestion) = &issue.suggestion {
            out.push_str(&format!("\n    suggestion: {suggestion}"));
        }
    }
    out
}

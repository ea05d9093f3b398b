//! Human readable validation errors.
//!
//! Two layouts are supported: a multi-line `verbose` report meant for
//! terminals and exceptions, and a `one-line` report meant for log lines.

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use sieve_core::{Node, ValidationError, ValidationErrors};

/// Layout of a formatted error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatStyle {
    #[default]
    Verbose,
    OneLine,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatErrorOptions {
    pub format: FormatStyle,
}

impl FormatErrorOptions {
    pub fn verbose() -> Self {
        Self {
            format: FormatStyle::Verbose,
        }
    }

    pub fn one_line() -> Self {
        Self {
            format: FormatStyle::OneLine,
        }
    }
}

/// Dotted path of the failure, e.g. `.server.port`.
///
/// Numeric keys below a union or intersection are member indices rather than
/// property names and are left out; array indices are kept.
pub fn format_path(error: &ValidationError) -> String {
    let entries = error.context.entries();
    let mut path = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if entry.key.is_empty() {
            continue;
        }
        let member_index = entry.key.parse::<u64>().is_ok()
            && i > 0
            && matches!(
                entries[i - 1].codec.node(),
                Node::Union(_) | Node::Intersection(_)
            );
        if member_index {
            continue;
        }
        path.push('.');
        path.push_str(&entry.key);
    }
    path
}

/// Format one error in the requested style.
pub fn format_error(error: &ValidationError, style: FormatStyle) -> String {
    match style {
        FormatStyle::Verbose => format_error_verbose(error),
        FormatStyle::OneLine => format_error_one_line(error),
    }
}

/// Format every error in order, separated by a newline.
pub fn format_errors(errors: &ValidationErrors, style: FormatStyle) -> String {
    errors
        .iter()
        .map(|error| format_error(error, style))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Create a formatter for single errors.
pub fn create_format_error(options: FormatErrorOptions) -> impl Fn(&ValidationError) -> String {
    move |error| format_error(error, options.format)
}

/// Create a formatter for error lists.
pub fn create_format_errors(options: FormatErrorOptions) -> impl Fn(&ValidationErrors) -> String {
    move |errors| format_errors(errors, options.format)
}

/// Verbose report of a single error.
#[deprecated(note = "use `create_format_error` instead")]
pub fn report_error(error: &ValidationError) -> String {
    format_error_verbose(error)
}

/// Verbose report of an error list.
#[deprecated(note = "use `create_format_errors` instead")]
pub fn report_errors(errors: &ValidationErrors) -> String {
    format_errors(errors, FormatStyle::Verbose)
}

/// Names and values of the root and deepest frames.
struct Endpoints<'a> {
    root_type: &'a str,
    root_value: &'a Value,
    leaf_type: &'a str,
    leaf_value: &'a Value,
}

impl<'a> Endpoints<'a> {
    fn of(error: &'a ValidationError) -> Self {
        let root = error.context.first();
        let leaf = error.context.last();
        Self {
            root_type: root.map_or("unknown", |e| e.codec.name()),
            root_value: root.map_or(&error.value, |e| &e.actual),
            leaf_type: leaf.map_or("unknown", |e| e.codec.name()),
            leaf_value: leaf.map_or(&error.value, |e| &e.actual),
        }
    }
}

fn format_error_one_line(error: &ValidationError) -> String {
    let path = format_path(error);
    let ends = Endpoints::of(error);
    format!(
        "Unexpected value for type '{}'. Expected type '{}' at '{}' but got '{}'. Full value: '{}'",
        ends.root_type,
        ends.leaf_type,
        path,
        compact_value(ends.leaf_value),
        compact_value(ends.root_value),
    )
}

fn format_error_verbose(error: &ValidationError) -> String {
    let path = format_path(error);
    let ends = Endpoints::of(error);

    if path.is_empty() {
        // Not localized to a property: show the message instead.
        return format!(
            "Unexpected value for type '{}'.\n\nWith messages\n\n\t\"{}\"\n\nin value\n\n{}",
            ends.root_type,
            error,
            indented_value(ends.root_value),
        );
    }

    format!(
        "Unexpected value for type\n\t{}\nExpected type\n\t{}\nat path\n\t{}\nbut got\n{}in value\n{}",
        ends.root_type,
        ends.leaf_type,
        path,
        indented_value(ends.leaf_value),
        indented_value(ends.root_value),
    )
}

fn compact_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => value.to_string().replace('"', "'"),
    }
}

fn indented_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\t'{}'\n", s),
        Value::Number(n) => format!("\t{}\n", n),
        Value::Bool(b) => format!("\t{}\n", b),
        Value::Null | Value::Array(_) | Value::Object(_) => pretty_json(value)
            .split('\n')
            .map(|line| format!("\t{}\n", line))
            .collect::<String>()
            .replace('"', "'"),
    }
}

fn pretty_json(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| value.to_string()),
        Err(_) => value.to_string(),
    }
}

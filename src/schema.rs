//! Declarative field schemas shared by the configuration and theme loaders.
//!
//! A schema is a static list of [`Field`]s per TOML table. [`check_table`]
//! walks the keys that are present and rejects the first value whose type,
//! range or option set does not match. Absent keys are left to serde
//! defaults and unknown keys are ignored so older binaries can read newer
//! files.

use thiserror::Error;
use toml::{Table, Value};

/// The expected shape of a single value.
#[derive(Debug, Clone, Copy)]
pub enum Kind {
    Bool,
    Str,
    /// A string that must not be empty when present.
    NonEmptyStr,
    Int { min: i64, max: i64 },
    /// Accepts TOML integers as well as floats.
    Float { min: f64, max: f64 },
    Choice(&'static [&'static str]),
}

/// A named field inside a table.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub key: &'static str,
    pub kind: Kind,
    /// Missing required fields are reported as violations.
    pub required: bool,
}

impl Field {
    pub const fn optional(key: &'static str, kind: Kind) -> Self {
        Self {
            key,
            kind,
            required: false,
        }
    }

    pub const fn required(key: &'static str, kind: Kind) -> Self {
        Self {
            key,
            kind,
            required: true,
        }
    }
}

/// The first schema violation found in a document.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {reason}")]
pub struct Violation {
    /// Dotted path of the offending key, e.g. `window.width`.
    pub field: String,
    pub reason: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Joins a table prefix and key into a dotted path.
pub fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Returns the table stored under `key`, `None` if absent, or a violation if
/// the value is not a table.
pub fn sub_table<'a>(
    table: &'a Table,
    prefix: &str,
    key: &str,
) -> Result<Option<&'a Table>, Violation> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Table(t)) => Ok(Some(t)),
        Some(other) => Err(Violation::new(
            join(prefix, key),
            format!("expected a table, found {}", other.type_str()),
        )),
    }
}

/// Validates every declared field of `table`, stopping at the first violation.
pub fn check_table(prefix: &str, table: &Table, fields: &[Field]) -> Result<(), Violation> {
    for field in fields {
        let path = join(prefix, field.key);
        match table.get(field.key) {
            Some(value) => check_value(&path, value, field.kind)?,
            None if field.required => {
                return Err(Violation::new(path, "required field is missing"));
            }
            None => {}
        }
    }
    Ok(())
}

fn check_value(path: &str, value: &Value, kind: Kind) -> Result<(), Violation> {
    match kind {
        Kind::Bool => {
            if !value.is_bool() {
                return Err(type_mismatch(path, "a boolean", value));
            }
        }
        Kind::Str => {
            if !value.is_str() {
                return Err(type_mismatch(path, "a string", value));
            }
        }
        Kind::NonEmptyStr => match value.as_str() {
            Some(s) if !s.trim().is_empty() => {}
            Some(_) => return Err(Violation::new(path, "must not be empty")),
            None => return Err(type_mismatch(path, "a string", value)),
        },
        Kind::Int { min, max } => {
            let n = value
                .as_integer()
                .ok_or_else(|| type_mismatch(path, "an integer", value))?;
            if n < min || n > max {
                return Err(Violation::new(
                    path,
                    format!("{} is outside the allowed range {}..={}", n, min, max),
                ));
            }
        }
        Kind::Float { min, max } => {
            let n = match value {
                Value::Float(f) => *f,
                Value::Integer(i) => *i as f64,
                other => return Err(type_mismatch(path, "a number", other)),
            };
            if !(min..=max).contains(&n) {
                return Err(Violation::new(
                    path,
                    format!("{} is outside the allowed range {}..={}", n, min, max),
                ));
            }
        }
        Kind::Choice(options) => {
            let s = value
                .as_str()
                .ok_or_else(|| type_mismatch(path, "a string", value))?;
            if !options.contains(&s) {
                return Err(Violation::new(
                    path,
                    format!("'{}' is not one of: {}", s, options.join(", ")),
                ));
            }
        }
    }
    Ok(())
}

fn type_mismatch(path: &str, expected: &str, found: &Value) -> Violation {
    Violation::new(
        path,
        format!("expected {}, found {}", expected, found.type_str()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[Field] = &[
        Field::optional("width", Kind::Int { min: 600, max: 7680 }),
        Field::optional("scale", Kind::Float { min: 0.5, max: 3.0 }),
        Field::optional("style", Kind::Choice(&["normal", "italic"])),
        Field::required("accent", Kind::NonEmptyStr),
    ];

    fn table(src: &str) -> Table {
        toml::from_str(src).unwrap()
    }

    #[test]
    fn test_valid_table_passes() {
        let t = table("width = 800\nscale = 1\nstyle = \"italic\"\naccent = \"#fff\"");
        assert!(check_table("window", &t, FIELDS).is_ok());
    }

    #[test]
    fn test_out_of_range_names_field() {
        let t = table("width = 50\naccent = \"#fff\"");
        let err = check_table("window", &t, FIELDS).unwrap_err();
        assert_eq!(err.field, "window.width");
    }

    #[test]
    fn test_wrong_type_rejected() {
        let t = table("width = \"wide\"\naccent = \"#fff\"");
        let err = check_table("window", &t, FIELDS).unwrap_err();
        assert_eq!(err.field, "window.width");
        assert!(err.reason.contains("integer"));
    }

    #[test]
    fn test_choice_outside_options() {
        let t = table("style = \"bold\"\naccent = \"#fff\"");
        let err = check_table("ui", &t, FIELDS).unwrap_err();
        assert_eq!(err.field, "ui.style");
    }

    #[test]
    fn test_missing_and_empty_required() {
        let err = check_table("colors", &table(""), FIELDS).unwrap_err();
        assert_eq!(err.field, "colors.accent");

        let err = check_table("colors", &table("accent = \"  \""), FIELDS).unwrap_err();
        assert_eq!(err.field, "colors.accent");
        assert_eq!(err.reason, "must not be empty");
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let t = table("accent = \"red\"\nsomething_new = 42");
        assert!(check_table("colors", &t, FIELDS).is_ok());
    }

    #[test]
    fn test_sub_table_type_checked() {
        let t = table("window = 3");
        let err = sub_table(&t, "", "window").unwrap_err();
        assert_eq!(err.field, "window");
        assert!(sub_table(&t, "", "missing").unwrap().is_none());
    }
}

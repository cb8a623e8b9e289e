//! Identifier safety for generated SQL.
//!
//! Table, column and alias names are the only text the SQL compiler
//! interpolates. They must be plain identifiers; values always bind. The
//! one exception is the unmapped-resource fallback, which quotes the name.

use crate::error::CompileError;

/// True for `[A-Za-z_][A-Za-z0-9_]*`.
#[must_use]
pub fn is_safe_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();

    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Return the identifier unchanged, or a validation error naming it.
pub(crate) fn checked<'a>(ident: &'a str, context: &'static str) -> Result<&'a str, CompileError> {
    if is_safe_identifier(ident) {
        Ok(ident)
    } else {
        Err(CompileError::InvalidIdentifier {
            ident: ident.to_string(),
            context,
        })
    }
}

/// Double-quote a name for SQL, doubling any embedded quote.
#[must_use]
pub fn quoted(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifiers_pass() {
        for ident in ["id", "scope_id", "_private", "session2"] {
            assert!(is_safe_identifier(ident), "{ident}");
        }
    }

    #[test]
    fn injection_shapes_fail() {
        for ident in ["", "2fa", "name; DROP", "a.b", "\"x\"", "col--"] {
            assert!(!is_safe_identifier(ident), "{ident}");
        }
    }

    #[test]
    fn quoting_doubles_embedded_quotes() {
        assert_eq!(quoted("host-catalog"), r#""host-catalog""#);
        assert_eq!(quoted(r#"a"b"#), r#""a""b""#);
    }

    #[test]
    fn checked_names_the_offender() {
        let err = checked("bad name", "column").unwrap_err();

        assert_eq!(err.to_string(), "invalid column identifier 'bad name'");
    }
}

//! Identity validation and on-disk naming.

use crate::error::StoreError;

/// Methods become directory names: non-empty, `[A-Za-z0-9._-]`, no leading dot.
pub(crate) fn validate_method(method: &str) -> Result<(), StoreError> {
    let valid = !method.is_empty()
        && !method.starts_with('.')
        && method
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentity(format!("method '{method}'")))
    }
}

pub(crate) fn validate_identity(method: &str, filename: &str) -> Result<(), StoreError> {
    validate_method(method)?;
    if filename.trim().is_empty() {
        return Err(StoreError::InvalidIdentity("empty filename".into()));
    }
    Ok(())
}

/// Encode a filename into a safe record file name (`%XX` for anything outside
/// `[A-Za-z0-9._-]`, and for a leading dot).
pub(crate) fn record_file_name(filename: &str) -> String {
    let mut out = String::with_capacity(filename.len() + 5);
    for (i, byte) in filename.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-') || (byte == b'.' && i > 0);
        if keep {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out.push_str(".json");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(record_file_name("beam_01.xml"), "beam_01.xml.json");
    }

    #[test]
    fn separators_and_leading_dot_are_encoded() {
        assert_eq!(record_file_name("a/b.xml"), "a%2Fb.xml.json");
        assert_eq!(record_file_name("..xml"), "%2E.xml.json");
        assert_eq!(record_file_name("my file.xml"), "my%20file.xml.json");
    }

    #[test]
    fn distinct_names_stay_distinct() {
        assert_ne!(record_file_name("a b.xml"), record_file_name("a%20b.xml"));
    }

    #[test]
    fn method_rules() {
        assert!(validate_method("lineSquareTube").is_ok());
        assert!(validate_method("beam-v2.1").is_ok());
        assert!(validate_method("").is_err());
        assert!(validate_method(".hidden").is_err());
        assert!(validate_method("a/b").is_err());
        assert!(validate_method("..").is_err());
    }

    #[test]
    fn empty_filename_rejected() {
        assert!(validate_identity("beam", "  ").is_err());
        assert!(validate_identity("beam", "a.xml").is_ok());
    }
}

//! Field normalisation shared by the `Create*` inputs.

use crate::error::{ShopError, ShopResult};

/// Trim a required text field, failing when nothing is left.
pub fn required(field: &str, value: &str) -> ShopResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ShopError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank input becomes `None`.
pub fn optional(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Keep only the ASCII digits of `value`.
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Lowercased, trimmed search term, or `None` for a blank one.
pub fn search_term(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("name", "  Ana  ").unwrap(), "Ana");
        assert!(matches!(
            required("name", "   "),
            Err(ShopError::Validation { .. })
        ));
    }

    #[test]
    fn optional_drops_blank_values() {
        assert_eq!(optional(Some(" x ".into())), Some("x".into()));
        assert_eq!(optional(Some("  ".into())), None);
        assert_eq!(optional(None), None);
    }

    #[test]
    fn digits_only_strips_formatting() {
        assert_eq!(digits_only("(11) 99999-9999"), "11999999999");
        assert_eq!(digits_only("+55 11 3333.4444"), "551133334444");
        assert_eq!(digits_only("n/a"), "");
    }

    #[test]
    fn search_term_normalises() {
        assert_eq!(search_term(Some("  SilVa ")), Some("silva".into()));
        assert_eq!(search_term(Some("   ")), None);
        assert_eq!(search_term(None), None);
    }
}

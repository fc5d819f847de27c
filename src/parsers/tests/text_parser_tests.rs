use crate::parsers::text;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(text::collapse_whitespace("  a \n\t b   c "), "a b c");
        assert_eq!(text::collapse_whitespace("   "), "");
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(text::normalize_text("Hello World"), "hello world");
        assert_eq!(text::normalize_text("  hello\n   WORLD "), "hello world");
    }

    #[test]
    fn test_blank_or_sentinel() {
        assert!(text::is_blank_or_sentinel("", "N/A"));
        assert!(text::is_blank_or_sentinel("  \n", "N/A"));
        assert!(text::is_blank_or_sentinel(" N/A ", "N/A"));
        assert!(!text::is_blank_or_sentinel("About us", "N/A"));
    }
}

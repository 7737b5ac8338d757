/// Option-block tokenizer and option typing
///
/// The option block is the semicolon-separated clause between the rule's
/// parentheses. Semicolons may appear inside quoted values
/// (`msg:"GET /; HTTP/1.1"`), so splitting has to track quote state.
use super::record::{OptionMap, OptionValue};

/// Split an option block into its fragments.
///
/// A fragment boundary is a `;` outside double quotes. Quote tracking is a
/// plain toggle: every `"` flips the state, with no escape handling, so a
/// literal `\"` inside a quoted value cannot be represented. Unbalanced
/// quotes leave the toggle set for the rest of the string; the split never
/// fails. The trailing fragment after the last semicolon is kept if
/// non-empty.
pub fn split_options(block: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in block.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ';' if !in_quotes => {
                fragments.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        fragments.push(current);
    }

    fragments
}

/// Parse an option block into a typed key/value map.
///
/// Each fragment splits on its FIRST colon: left of it is the key, right of
/// it the raw value. A fragment with no colon is a bare flag and maps to
/// `true`. A value fully wrapped in one pair of double quotes has them
/// stripped (inner content is untouched) before type coercion. Duplicate
/// keys collapse last-write-wins.
pub fn parse_options(block: &str) -> OptionMap {
    let mut options = OptionMap::new();

    for fragment in split_options(block) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }

        match fragment.split_once(':') {
            None => {
                options.insert(fragment.to_string(), OptionValue::Bool(true));
            }
            Some((key, value)) => {
                let key = key.trim();
                let value = unquote(value.trim());
                options.insert(key.to_string(), OptionValue::coerce(value));
            }
        }
    }

    options
}

/// Strip one pair of enclosing double quotes, if present.
fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple() {
        let fragments = split_options("msg:\"Test\"; sid:1; rev:2;");
        assert_eq!(fragments, vec!["msg:\"Test\"", " sid:1", " rev:2"]);
    }

    #[test]
    fn test_split_semicolon_inside_quotes() {
        let fragments = split_options("msg:\"contains a ; semicolon\"; sid:1;");
        assert_eq!(
            fragments,
            vec!["msg:\"contains a ; semicolon\"", " sid:1"]
        );
    }

    #[test]
    fn test_split_keeps_trailing_fragment() {
        let fragments = split_options("sid:1; rev:2");
        assert_eq!(fragments, vec!["sid:1", " rev:2"]);
    }

    #[test]
    fn test_split_unbalanced_quotes_no_panic() {
        // Toggle stays set for the remainder; everything lands in one fragment.
        let fragments = split_options("msg:\"unterminated; sid:1");
        assert_eq!(fragments, vec!["msg:\"unterminated; sid:1"]);
    }

    #[test]
    fn test_parse_types() {
        let options = parse_options("msg:\"Test\"; sid:17152; window:0.5; nocase;");
        assert_eq!(
            options.get("msg"),
            Some(&OptionValue::Str("Test".to_string()))
        );
        assert_eq!(options.get("sid"), Some(&OptionValue::Int(17152)));
        assert_eq!(options.get("window"), Some(&OptionValue::Float(0.5)));
        assert_eq!(options.get("nocase"), Some(&OptionValue::Bool(true)));
    }

    #[test]
    fn test_parse_quote_safety_single_fragment() {
        let options = parse_options("msg:\"contains a ; semicolon\"; sid:1;");
        assert_eq!(options.len(), 2);
        assert_eq!(
            options.get("msg"),
            Some(&OptionValue::Str("contains a ; semicolon".to_string()))
        );
    }

    #[test]
    fn test_parse_splits_on_first_colon_only() {
        let options = parse_options("flow:to_server,established; pcre:\"/foo:bar/\";");
        assert_eq!(
            options.get("flow"),
            Some(&OptionValue::Str("to_server,established".to_string()))
        );
        assert_eq!(
            options.get("pcre"),
            Some(&OptionValue::Str("/foo:bar/".to_string()))
        );
    }

    #[test]
    fn test_parse_duplicate_keys_last_wins() {
        let options = parse_options("content:\"first\"; content:\"second\";");
        assert_eq!(
            options.get("content"),
            Some(&OptionValue::Str("second".to_string()))
        );
    }

    #[test]
    fn test_parse_hex_content_stays_string() {
        let options = parse_options("content:\"|FF|SMB\";");
        assert_eq!(
            options.get("content"),
            Some(&OptionValue::Str("|FF|SMB".to_string()))
        );
    }

    #[test]
    fn test_parse_empty_fragments_skipped() {
        let options = parse_options(" ; ;sid:1; ");
        assert_eq!(options.len(), 1);
        assert_eq!(options.get("sid"), Some(&OptionValue::Int(1)));
    }

    #[test]
    fn test_unquote_only_full_wrap() {
        assert_eq!(unquote("\"quoted\""), "quoted");
        assert_eq!(unquote("\"unterminated"), "\"unterminated");
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote("\""), "\"");
    }
}

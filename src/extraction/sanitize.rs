/// Sanitize extracted text before passing it to the analyzer.
/// Strips control characters, trims lines, preserves medical punctuation.
pub fn sanitize_report_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| {
            c.is_alphanumeric()
                || c.is_whitespace()
                || matches!(
                    c,
                    '.' | ','
                        | ';'
                        | ':'
                        | '-'
                        | '/'
                        | '('
                        | ')'
                        | '['
                        | ']'
                        | '+'
                        | '='
                        | '%'
                        | '#'
                        | '@'
                        | '&'
                        | '\''
                        | '"'
                        | '!'
                        | '?'
                        | '<'
                        | '>'
                        | '*'
                        | '_'
                        | '°'
                        | '²'
                        | '³'
                        | 'µ'
                )
        })
        .collect::<String>()
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_null_bytes() {
        let clean = sanitize_report_text("Glucose\x00: 95 mg/dL");
        assert!(!clean.contains('\x00'));
        assert!(clean.contains("Glucose"));
    }

    #[test]
    fn preserves_lab_value_punctuation() {
        let clean = sanitize_report_text("HDL: 52 mg/dL (range 40-60); BMI 24.1 kg/m²");
        assert_eq!(clean, "HDL: 52 mg/dL (range 40-60); BMI 24.1 kg/m²");
    }

    #[test]
    fn trims_and_drops_empty_lines() {
        let clean = sanitize_report_text("  line one  \n\n\n   \n  line two ");
        assert_eq!(clean, "line one\nline two");
    }

    #[test]
    fn blank_input_becomes_empty() {
        assert_eq!(sanitize_report_text("  \x07\x1b  "), "");
    }
}

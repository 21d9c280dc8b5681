//! Cleanup of raw model output into a single sentence.

/// Refine a raw completion into the first complete sentence.
///
/// Literal `\n` escapes, backslashes and double quotes are stripped, the text
/// is trimmed, and everything after the first `.` is dropped. Text without a
/// `.` refines to the empty string.
pub fn refine_reply(raw: &str) -> String {
    let cleaned = raw.replace("\\n", "").replace('\\', "").replace('"', "");
    let cleaned = cleaned.trim();

    match cleaned.find('.') {
        Some(end) => cleaned[..=end].to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_escapes_and_truncates() {
        let raw = r#"\n\n"The dragon \"roared\" loudly. And then the"#;
        assert_eq!(refine_reply(raw), "The dragon roared loudly.");
    }

    #[test]
    fn trims_real_whitespace() {
        assert_eq!(refine_reply("\n\n  She smiled.  "), "She smiled.");
    }

    #[test]
    fn no_period_is_empty() {
        assert_eq!(refine_reply("and then they"), "");
        assert_eq!(refine_reply(""), "");
        assert_eq!(refine_reply("\\n\\n"), "");
    }

    #[test]
    fn keeps_other_punctuation_before_period() {
        assert_eq!(refine_reply("Stop! he said. Run"), "Stop! he said.");
    }

    #[test]
    fn korean_reply() {
        assert_eq!(refine_reply("\n호랑이가 웃었다. 그리고"), "호랑이가 웃었다.");
    }
}

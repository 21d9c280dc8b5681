//! Locale bundles: input limits, display strings, and prompt phrasing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shortest sentence a human may submit, in characters.
pub const MIN_INPUT_CHARS: usize = 4;

/// A supported story language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "English", alias = "en")]
    English,
    #[serde(rename = "한국어", alias = "ko")]
    Korean,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::English, Locale::Korean];

    /// The name shown to users (and used on the wire).
    pub fn name(self) -> &'static str {
        match self {
            Locale::English => "English",
            Locale::Korean => "한국어",
        }
    }

    /// The locale the language toggle switches to.
    pub fn other(self) -> Self {
        match self {
            Locale::English => Locale::Korean,
            Locale::Korean => Locale::English,
        }
    }

    /// Maximum human sentence length, in characters.
    pub fn input_limit(self) -> usize {
        match self {
            Locale::English => 128,
            Locale::Korean => 128,
        }
    }

    /// Whether `input` has an acceptable length for this locale.
    pub fn accepts(self, input: &str) -> bool {
        let len = input.chars().count();
        (MIN_INPUT_CHARS..=self.input_limit()).contains(&len)
    }

    /// Wrap a prompt window in this locale's request template.
    ///
    /// Newlines are removed from the window first.
    pub fn prompt(self, window: &str) -> String {
        let window = window.replace('\n', "");
        match self {
            Locale::English => {
                format!("Can you suggest the next sentence for this novel? `{window}`")
            }
            Locale::Korean => format!("이 다음에 올 50자 이하의 소설 문장을 완성해줘. `{window}`"),
        }
    }

    pub fn strings(self) -> &'static LocaleStrings {
        match self {
            Locale::English => &ENGLISH,
            Locale::Korean => &KOREAN,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "English" | "english" | "en" => Ok(Locale::English),
            "한국어" | "Korean" | "korean" | "ko" => Ok(Locale::Korean),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

/// User-facing text for one locale.
#[derive(Debug, Clone, Serialize)]
pub struct LocaleStrings {
    pub app_title: &'static str,
    /// Suffix appended after the round number, e.g. `(3` + ` of 10 sentence)`.
    pub sentence_input_hint: &'static str,
    pub submit_button: &'static str,
    pub language_toggle: &'static str,
    pub invalid_sentence_alert: &'static str,
    pub human_speaker: &'static str,
    pub ai_speaker: &'static str,
    pub language_toggle_confirmation: &'static str,
    pub copy_button: &'static str,
    pub copied_notice: &'static str,
    pub api_key_help: &'static str,
    pub api_key_hint: &'static str,
    pub round_finish: &'static str,
    pub busy_notice: &'static str,
    pub unexpected_error: &'static str,
}

impl LocaleStrings {
    /// Placeholder for the sentence input, e.g. `(3 of 10 sentence)`.
    pub fn input_hint(&self, round: u32) -> String {
        format!("({round}{}", self.sentence_input_hint)
    }
}

static ENGLISH: LocaleStrings = LocaleStrings {
    app_title: "Writing a novel with Ghost Writer",
    sentence_input_hint: " of 10 sentence)",
    submit_button: "Enter",
    language_toggle: "한국어 모드",
    invalid_sentence_alert:
        "This sentence is invalid. Please input a valid sentence (4~128 length).",
    human_speaker: "You",
    ai_speaker: "Ghost Writer",
    language_toggle_confirmation:
        "Switch to the different language. Note that your current sentences will be deleted.",
    copy_button: "Copy Text",
    copied_notice: "Copied",
    api_key_help: "Get OpenAI API Key",
    api_key_hint: "Paste OpenAI API Key",
    round_finish: "Your novel is finished! Scroll up and check the result!",
    busy_notice: "Ghost Writer is still writing. Please wait a moment.",
    unexpected_error: "Sorry for the inconvenience. We got an unexpected error.",
};

static KOREAN: LocaleStrings = LocaleStrings {
    app_title: "유령 작가 스토리",
    sentence_input_hint: " /10번째 문장)",
    submit_button: "입력",
    language_toggle: "English Mode",
    invalid_sentence_alert:
        "문장에 오류가 있습니다. 유효한 문장을 입력해주세요. 유효한 문장의 길이는 4~128자 입니다.",
    human_speaker: "당신",
    ai_speaker: "유령 작가",
    language_toggle_confirmation:
        "사용 언어를 변경합니다. 현재 작성 중이 모든 내용이 초기화됩니다.",
    copy_button: "복사하기",
    copied_notice: "복사되었습니다",
    api_key_help: "API 키를 얻는 방법",
    api_key_hint: "OpenAI API Key를 입력하세요",
    round_finish: "소설이 완성되었습니다. 스크롤을 올려 결과를 확인해보세요!",
    busy_notice: "유령 작가가 아직 문장을 쓰고 있습니다. 잠시만 기다려주세요.",
    unexpected_error: "불편을 드려 죄송합니다. 예기치 않은 오류가 발생했습니다.",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_length_bounds() {
        let locale = Locale::English;
        assert!(!locale.accepts(""));
        assert!(!locale.accepts("abc"));
        assert!(locale.accepts("abcd"));
        assert!(locale.accepts(&"a".repeat(128)));
        assert!(!locale.accepts(&"a".repeat(129)));
    }

    #[test]
    fn test_input_length_counts_characters() {
        // 4 Hangul syllables are 12 bytes but 4 characters
        assert!(Locale::Korean.accepts("호랑이다"));
        assert!(Locale::Korean.accepts(&"가".repeat(128)));
        assert!(!Locale::Korean.accepts(&"가".repeat(129)));
    }

    #[test]
    fn test_prompt_templates() {
        assert_eq!(
            Locale::English.prompt("Once upon a time."),
            "Can you suggest the next sentence for this novel? `Once upon a time.`"
        );
        assert_eq!(
            Locale::Korean.prompt("옛날 옛적에."),
            "이 다음에 올 50자 이하의 소설 문장을 완성해줘. `옛날 옛적에.`"
        );
    }

    #[test]
    fn test_prompt_strips_newlines() {
        assert_eq!(
            Locale::English.prompt("a.\nb."),
            "Can you suggest the next sentence for this novel? `a.b.`"
        );
    }

    #[test]
    fn test_toggle_and_parse() {
        assert_eq!(Locale::English.other(), Locale::Korean);
        assert_eq!(Locale::Korean.other(), Locale::English);
        assert_eq!("한국어".parse::<Locale>().unwrap(), Locale::Korean);
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::English);
        assert!("Klingon".parse::<Locale>().is_err());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Locale::Korean).unwrap(), "\"한국어\"");
        let parsed: Locale = serde_json::from_str("\"English\"").unwrap();
        assert_eq!(parsed, Locale::English);
        let parsed: Locale = serde_json::from_str("\"ko\"").unwrap();
        assert_eq!(parsed, Locale::Korean);
    }

    #[test]
    fn test_input_hint() {
        assert_eq!(Locale::English.strings().input_hint(3), "(3 of 10 sentence)");
        assert_eq!(Locale::Korean.strings().input_hint(1), "(1 /10번째 문장)");
    }
}

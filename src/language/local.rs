//! Offline language identification with `whatlang`.

use crate::error::{Result, TubesumError};
use crate::language::{chinese_variant, sample_prefix, LanguageDetector};
use async_trait::async_trait;
use tracing::debug;

/// whatlang's ISO 639-3 codes and the short codes used by the language table.
///
/// Chinese (`cmn`) is split by script at detection time.
const WHATLANG_CODES: [(&str, &str); 68] = [
    ("afr", "af"),
    ("aka", "ak"),
    ("amh", "am"),
    ("ara", "ar"),
    ("aze", "az"),
    ("bel", "be"),
    ("ben", "bn"),
    ("bul", "bg"),
    ("cat", "ca"),
    ("ces", "cs"),
    ("dan", "da"),
    ("deu", "de"),
    ("ell", "el"),
    ("eng", "en"),
    ("epo", "eo"),
    ("est", "et"),
    ("fin", "fi"),
    ("fra", "fr"),
    ("guj", "gu"),
    ("heb", "he"),
    ("hin", "hi"),
    ("hrv", "hr"),
    ("hun", "hu"),
    ("hye", "hy"),
    ("ind", "id"),
    ("ita", "it"),
    ("jav", "jv"),
    ("jpn", "ja"),
    ("kan", "kn"),
    ("kat", "ka"),
    ("khm", "km"),
    ("kor", "ko"),
    ("lat", "la"),
    ("lav", "lv"),
    ("lit", "lt"),
    ("mal", "ml"),
    ("mar", "mr"),
    ("mkd", "mk"),
    ("mya", "my"),
    ("nep", "ne"),
    ("nld", "nl"),
    ("nob", "no"),
    ("ori", "or"),
    ("pan", "pa"),
    ("pes", "fa"),
    ("pol", "pl"),
    ("por", "pt"),
    ("ron", "ro"),
    ("rus", "ru"),
    ("sin", "si"),
    ("slk", "sk"),
    ("slv", "sl"),
    ("sna", "sn"),
    ("spa", "es"),
    ("srp", "sr"),
    ("swe", "sv"),
    ("tam", "ta"),
    ("tel", "te"),
    ("tgl", "tl"),
    ("tha", "th"),
    ("tuk", "tk"),
    ("tur", "tr"),
    ("ukr", "uk"),
    ("urd", "ur"),
    ("uzb", "uz"),
    ("vie", "vi"),
    ("yid", "yi"),
    ("zul", "zu"),
];

const MANDARIN: &str = "cmn";

pub struct WhatlangDetector {
    sample_chars: usize,
    vocabulary: Vec<&'static str>,
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl WhatlangDetector {
    pub fn new() -> Self {
        let mut vocabulary: Vec<&'static str> =
            WHATLANG_CODES.iter().map(|&(_, code)| code).collect();
        vocabulary.extend(["zh-cn", "zh-tw"]);

        Self {
            sample_chars: 2000,
            vocabulary,
        }
    }

    /// Only the first `chars` characters are classified.
    pub fn with_sample_chars(mut self, chars: usize) -> Self {
        self.sample_chars = chars;
        self
    }

    fn classify(&self, text: &str) -> Result<String> {
        let sample = sample_prefix(text, self.sample_chars);
        if sample.trim().is_empty() {
            return Err(TubesumError::LanguageDetection(
                "no text to classify".to_string(),
            ));
        }

        let info = whatlang::detect(sample).ok_or_else(|| {
            TubesumError::LanguageDetection("could not identify the language".to_string())
        })?;
        let iso = info.lang().code();
        debug!(
            "whatlang: {} (confidence {:.2}, reliable: {})",
            iso,
            info.confidence(),
            info.is_reliable()
        );

        if iso == MANDARIN {
            return Ok(chinese_variant(sample).to_string());
        }

        // Languages missing from the mapping come back as-is and are
        // rejected when resolved.
        Ok(WHATLANG_CODES
            .iter()
            .find(|(whatlang_code, _)| *whatlang_code == iso)
            .map(|&(_, code)| code.to_string())
            .unwrap_or_else(|| iso.to_string()))
    }
}

#[async_trait]
impl LanguageDetector for WhatlangDetector {
    async fn detect(&self, text: &str) -> Result<String> {
        self.classify(text)
    }

    fn vocabulary(&self) -> &[&str] {
        &self.vocabulary
    }

    fn name(&self) -> &'static str {
        "whatlang"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PREFERRED_LANGUAGES;
    use crate::language::{detector_coverage, LanguageTag, LANGUAGE_TAGS};

    #[test]
    fn test_preferred_caption_languages_are_detectable() {
        let detector = WhatlangDetector::new();
        for code in DEFAULT_PREFERRED_LANGUAGES {
            assert!(
                detector.vocabulary().contains(&code),
                "{} cannot be detected",
                code
            );
        }
    }

    #[test]
    fn test_vocabulary_covers_most_of_the_table() {
        let detector = WhatlangDetector::new();
        let coverage = detector_coverage(detector.vocabulary());

        for code in ["uk", "ko", "he", "zh-cn", "zh-tw", "fa", "no"] {
            assert!(coverage.supported.iter().any(|t| t.code == code), "{}", code);
        }
        assert!(coverage.rejected.contains(&"tl".to_string()));

        let unreachable: Vec<&str> = LANGUAGE_TAGS
            .iter()
            .map(|&(code, _)| code)
            .filter(|code| !detector.vocabulary().contains(code))
            .collect();
        assert_eq!(unreachable, vec!["bs", "ceb", "cy", "kk", "ms", "sq", "sw"]);
    }

    #[test]
    fn test_detect_german() {
        let detector = WhatlangDetector::new();
        let code = detector
            .classify(
                "Guten Morgen, liebe Freunde. Heute sprechen wir über die Geschichte der \
                 deutschen Sprache und wie sie sich im Laufe der Jahrhunderte entwickelt hat.",
            )
            .unwrap();
        assert_eq!(code, "de");
    }

    #[test]
    fn test_detect_ukrainian() {
        let detector = WhatlangDetector::new();
        let code = detector
            .classify(
                "Привіт, друзі! Сьогодні ми поговоримо про те, як приготувати справжній \
                 український борщ вдома. Це їжа, яку люблять усі в нашій родині.",
            )
            .unwrap();
        assert_eq!(code, "uk");
        assert_eq!(LanguageTag::lookup(&code).unwrap().tag, "ukr_Cyrl");
    }

    #[test]
    fn test_detect_chinese_scripts() {
        let detector = WhatlangDetector::new();
        assert_eq!(
            detector
                .classify("我们今天来说说这个国家的历史，这是一个很长的故事。")
                .unwrap(),
            "zh-cn"
        );
        assert_eq!(
            detector
                .classify("我們今天來說說這個國家的歷史，這是一個很長的故事。")
                .unwrap(),
            "zh-tw"
        );
    }

    #[test]
    fn test_detect_empty_text() {
        let detector = WhatlangDetector::new();
        assert!(matches!(
            detector.classify("   "),
            Err(TubesumError::LanguageDetection(_))
        ));
    }
}

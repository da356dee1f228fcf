pub mod huggingface;
pub mod local;

pub use huggingface::HfLanguageDetector;
pub use local::WhatlangDetector;

use crate::error::{Result, TubesumError};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashSet;

#[async_trait]
pub trait LanguageDetector: Send + Sync {
    /// Classify text into a short language code.
    async fn detect(&self, text: &str) -> Result<String>;

    /// Every code this detector can emit.
    fn vocabulary(&self) -> &[&str];

    fn name(&self) -> &'static str;
}

/// Detector short code paired with the script/region qualified tag the
/// translator expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageTag {
    pub code: &'static str,
    pub tag: &'static str,
}

impl LanguageTag {
    pub fn lookup(code: &str) -> Option<Self> {
        let normalized = normalize_code(code);
        LANGUAGE_TAGS
            .iter()
            .find(|(c, _)| *c == normalized)
            .map(|&(code, tag)| LanguageTag { code, tag })
    }

    pub fn english() -> Self {
        LanguageTag {
            code: ENGLISH_CODE,
            tag: "eng_Latn",
        }
    }

    pub fn is_english(&self) -> bool {
        self.code == ENGLISH_CODE
    }
}

impl std::fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code, self.tag)
    }
}

/// Map a detector code to its extended tag, rejecting codes outside the table.
pub fn resolve(code: &str) -> Result<LanguageTag> {
    LanguageTag::lookup(code)
        .ok_or_else(|| TubesumError::LanguageUnsupported(normalize_code(code)))
}

/// Lower-case and use `-` as the region separator (`zh_CN` -> `zh-cn`).
pub fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase().replace('_', "-")
}

/// The first `chars` characters of `text`, cut on a char boundary.
pub fn sample_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Characters written differently in the two Chinese scripts.
const SIMPLIFIED_ONLY: &str = "这们个来说时会为国对学过还没么发经问开关见长话现样让点边东车门书华语历";
const TRADITIONAL_ONLY: &str = "這們個來說時會為國對學過還沒麼發經問開關見長話現樣讓點邊東車門書華語歷";

/// Pick `zh-tw` or `zh-cn` for Chinese text by counting script-specific characters.
///
/// Ties, including text with no distinguishing characters, go to `zh-cn`.
pub fn chinese_variant(text: &str) -> &'static str {
    let (mut simplified, mut traditional) = (0usize, 0usize);
    for c in text.chars() {
        if SIMPLIFIED_ONLY.contains(c) {
            simplified += 1;
        } else if TRADITIONAL_ONLY.contains(c) {
            traditional += 1;
        }
    }
    if traditional > simplified {
        "zh-tw"
    } else {
        "zh-cn"
    }
}

/// Check the table is usable: unique codes, well-formed tags, English present.
pub fn validate_table() -> Result<()> {
    let tag_shape = Regex::new(r"^[a-z]{3}_[A-Z][a-z]{3}$")
        .map_err(|e| TubesumError::Config(e.to_string()))?;
    let mut seen = HashSet::new();

    for (code, tag) in LANGUAGE_TAGS.iter() {
        if !seen.insert(*code) {
            return Err(TubesumError::Config(format!(
                "Duplicate language code in table: {}",
                code
            )));
        }
        if !tag_shape.is_match(tag) {
            return Err(TubesumError::Config(format!(
                "Malformed extended tag for {}: {}",
                code, tag
            )));
        }
    }

    match LanguageTag::lookup(ENGLISH_CODE) {
        Some(en) if en == LanguageTag::english() => Ok(()),
        _ => Err(TubesumError::Config(
            "Language table has no English entry".to_string(),
        )),
    }
}

/// A detector vocabulary split into mapped and rejected codes.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DetectorCoverage {
    pub supported: Vec<LanguageTag>,
    pub rejected: Vec<String>,
}

pub fn detector_coverage(vocabulary: &[&str]) -> DetectorCoverage {
    let mut coverage = DetectorCoverage::default();
    for code in vocabulary {
        match LanguageTag::lookup(code) {
            Some(tag) => coverage.supported.push(tag),
            None => coverage.rejected.push(normalize_code(code)),
        }
    }
    coverage
}

const ENGLISH_CODE: &str = "en";

/// Closed mapping from detector codes to NLLB-200 language tags.
pub const LANGUAGE_TAGS: [(&str, &str); 66] = [
    ("af", "afr_Latn"),
    ("am", "amh_Ethi"),
    ("ar", "arb_Arab"),
    ("az", "azj_Latn"),
    ("be", "bel_Cyrl"),
    ("bn", "ben_Beng"),
    ("bs", "bos_Latn"),
    ("bg", "bul_Cyrl"),
    ("ca", "cat_Latn"),
    ("ceb", "ceb_Latn"),
    ("cs", "ces_Latn"),
    ("cy", "cym_Latn"),
    ("da", "dan_Latn"),
    ("de", "deu_Latn"),
    ("el", "ell_Grek"),
    ("en", "eng_Latn"),
    ("es", "spa_Latn"),
    ("et", "est_Latn"),
    ("fa", "pes_Arab"),
    ("fi", "fin_Latn"),
    ("fr", "fra_Latn"),
    ("gu", "guj_Gujr"),
    ("he", "heb_Hebr"),
    ("hi", "hin_Deva"),
    ("hr", "hrv_Latn"),
    ("hu", "hun_Latn"),
    ("id", "ind_Latn"),
    ("it", "ita_Latn"),
    ("ja", "jpn_Jpan"),
    ("jv", "jav_Latn"),
    ("ka", "kat_Geor"),
    ("kk", "kaz_Cyrl"),
    ("kn", "kan_Knda"),
    ("ko", "kor_Hang"),
    ("lt", "lit_Latn"),
    ("lv", "lvs_Latn"),
    ("ml", "mal_Mlym"),
    ("mr", "mar_Deva"),
    ("ms", "zsm_Latn"),
    ("my", "mya_Mymr"),
    ("ne", "npi_Deva"),
    ("nl", "nld_Latn"),
    ("no", "nob_Latn"),
    ("or", "ory_Orya"),
    ("pa", "pan_Guru"),
    ("pl", "pol_Latn"),
    ("pt", "por_Latn"),
    ("ro", "ron_Latn"),
    ("ru", "rus_Cyrl"),
    ("si", "sin_Sinh"),
    ("sk", "slk_Latn"),
    ("sl", "slv_Latn"),
    ("sq", "als_Latn"),
    ("sr", "srp_Cyrl"),
    ("sv", "swe_Latn"),
    ("sw", "swh_Latn"),
    ("ta", "tam_Taml"),
    ("te", "tel_Telu"),
    ("th", "tha_Thai"),
    ("tr", "tur_Latn"),
    ("uk", "ukr_Cyrl"),
    ("ur", "urd_Arab"),
    ("uz", "uzn_Latn"),
    ("vi", "vie_Latn"),
    ("zh-cn", "zho_Hans"),
    ("zh-tw", "zho_Hant"),
];

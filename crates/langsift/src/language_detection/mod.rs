//! Language detection using the whatlang library.
//!
//! The detector is modelled as a stateful [`LanguageModel`]: text handed to
//! [`LanguageModel::detect`] accumulates in the model until [`LanguageModel::reset`]
//! is called. Callers never use a model directly; they go through
//! [`LanguageClassifier`], which pairs every detect with a reset.

pub mod classifier;
pub mod names;

pub use classifier::{ClassifierSlot, LanguageClassification, LanguageClassifier, ModelLoader};
pub use names::{display_name, language_name};

use crate::core::config::LanguageDetectionConfig;
use crate::types::UNDETERMINED_LANGUAGE;
use crate::{LangsiftError, Result};
use whatlang::{Detector, Lang};

/// A single detection produced by a [`LanguageModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// ISO 639-1 code, or [`UNDETERMINED_LANGUAGE`]
    pub code: String,
    pub confidence: Option<f64>,
}

impl Detection {
    pub fn undetermined(confidence: Option<f64>) -> Self {
        Self {
            code: UNDETERMINED_LANGUAGE.to_string(),
            confidence,
        }
    }
}

/// A loaded language identification model with per-call internal state.
///
/// `detect` may leave statistics behind that influence the next call; `reset`
/// clears them. Implementations only need to be `Send`: the classifier serializes
/// access.
pub trait LanguageModel: Send {
    /// Identifier used in logs.
    fn name(&self) -> &str;

    /// Add `text` to the model and report the most likely language.
    fn detect(&mut self, text: &str) -> Result<Detection>;

    /// Drop any state accumulated by previous `detect` calls.
    fn reset(&mut self);
}

/// whatlang-backed model.
///
/// Text accumulates in an internal buffer across `detect` calls, so skipping
/// `reset` makes later detections reflect earlier documents.
pub struct WhatlangModel {
    detector: Detector,
    min_confidence: f64,
    buffer: String,
}

impl WhatlangModel {
    /// Build the detector described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `LangsiftError::ModelLoad` when the allowlist is empty or names a
    /// language whatlang has no profile for.
    pub fn load(config: &LanguageDetectionConfig) -> Result<Self> {
        let detector = match &config.allowed_languages {
            None => Detector::new(),
            Some(codes) => {
                if codes.is_empty() {
                    return Err(LangsiftError::model_load("allowed_languages cannot be empty"));
                }
                let allowlist = codes
                    .iter()
                    .map(|code| {
                        lang_from_iso639_1(code).ok_or_else(|| {
                            LangsiftError::model_load(format!("No language profile available for '{}'", code))
                        })
                    })
                    .collect::<Result<Vec<Lang>>>()?;
                Detector::with_allowlist(allowlist)
            }
        };

        tracing::debug!(
            allowed = ?config.allowed_languages,
            min_confidence = config.min_confidence,
            "Loaded whatlang language model"
        );

        Ok(Self {
            detector,
            min_confidence: config.min_confidence,
            buffer: String::new(),
        })
    }

    /// Bytes of text currently held between resets.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}

impl LanguageModel for WhatlangModel {
    fn name(&self) -> &str {
        "whatlang"
    }

    fn detect(&mut self, text: &str) -> Result<Detection> {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(text);

        if self.buffer.trim().is_empty() {
            return Ok(Detection::undetermined(None));
        }

        match self.detector.detect(&self.buffer) {
            Some(info) if info.confidence() >= self.min_confidence => Ok(Detection {
                code: lang_to_iso639_1(info.lang()).to_string(),
                confidence: Some(info.confidence()),
            }),
            Some(info) => Ok(Detection::undetermined(Some(info.confidence()))),
            None => Ok(Detection::undetermined(None)),
        }
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }
}

/// Resolve a two-letter code to the whatlang language it names.
pub fn lang_from_iso639_1(code: &str) -> Option<Lang> {
    let code = code.trim().to_ascii_lowercase();
    Lang::all().iter().copied().find(|lang| lang_to_iso639_1(*lang) == code)
}

/// Convert whatlang Lang enum to ISO 639-1 language code.
///
/// Macrolanguages map to their common two-letter code (Mandarin to `zh`,
/// Norwegian Bokmål to `no`, Iranian Persian to `fa`).
pub fn lang_to_iso639_1(lang: Lang) -> &'static str {
    match lang {
        Lang::Eng => "en",
        Lang::Rus => "ru",
        Lang::Cmn => "zh",
        Lang::Spa => "es",
        Lang::Por => "pt",
        Lang::Ita => "it",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ukr => "uk",
        Lang::Kat => "ka",
        Lang::Ara => "ar",
        Lang::Hin => "hi",
        Lang::Jpn => "ja",
        Lang::Heb => "he",
        Lang::Yid => "yi",
        Lang::Pol => "pl",
        Lang::Amh => "am",
        Lang::Jav => "jv",
        Lang::Kor => "ko",
        Lang::Nob => "no",
        Lang::Dan => "da",
        Lang::Swe => "sv",
        Lang::Fin => "fi",
        Lang::Tur => "tr",
        Lang::Nld => "nl",
        Lang::Hun => "hu",
        Lang::Ces => "cs",
        Lang::Ell => "el",
        Lang::Bul => "bg",
        Lang::Bel => "be",
        Lang::Mar => "mr",
        Lang::Kan => "kn",
        Lang::Ron => "ro",
        Lang::Slv => "sl",
        Lang::Hrv => "hr",
        Lang::Srp => "sr",
        Lang::Mkd => "mk",
        Lang::Lit => "lt",
        Lang::Lav => "lv",
        Lang::Est => "et",
        Lang::Tam => "ta",
        Lang::Vie => "vi",
        Lang::Urd => "ur",
        Lang::Tha => "th",
        Lang::Guj => "gu",
        Lang::Uzb => "uz",
        Lang::Pan => "pa",
        Lang::Aze => "az",
        Lang::Ind => "id",
        Lang::Tel => "te",
        Lang::Pes => "fa",
        Lang::Mal => "ml",
        Lang::Ori => "or",
        Lang::Mya => "my",
        Lang::Nep => "ne",
        Lang::Sin => "si",
        Lang::Khm => "km",
        Lang::Tuk => "tk",
        Lang::Aka => "ak",
        Lang::Zul => "zu",
        Lang::Sna => "sn",
        Lang::Afr => "af",
        Lang::Lat => "la",
        Lang::Slk => "sk",
        Lang::Cat => "ca",
        Lang::Tgl => "tl",
        Lang::Hye => "hy",
        Lang::Epo => "eo",
        Lang::Ben => "bn",
        Lang::Cym => "cy",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENGLISH: &str = "The quarterly report describes the financial position of the company. \
        Revenue increased compared with the previous year, and the board approved the budget \
        for the next twelve months. Employees will receive the new handbook before the meeting.";

    const FRENCH: &str = "Le rapport trimestriel décrit la situation financière de l'entreprise. \
        Le chiffre d'affaires a augmenté par rapport à l'année précédente.";

    fn default_model() -> WhatlangModel {
        WhatlangModel::load(&LanguageDetectionConfig::default()).unwrap()
    }

    #[test]
    fn test_detect_english() {
        let mut model = default_model();
        let detection = model.detect(ENGLISH).unwrap();
        assert_eq!(detection.code, "en");
        assert!(detection.confidence.unwrap() > 0.5);
    }

    #[test]
    fn test_detect_empty_text_is_undetermined() {
        let mut model = default_model();
        let detection = model.detect("   \n\t ").unwrap();
        assert_eq!(detection.code, UNDETERMINED_LANGUAGE);
        assert!(detection.confidence.is_none());
    }

    #[test]
    fn test_detect_accumulates_until_reset() {
        let mut model = default_model();
        let long_english = ENGLISH.repeat(4);
        model.detect(&long_english).unwrap();
        assert!(model.buffered_len() >= long_english.len());

        // Without a reset the English text dominates the buffer
        let contaminated = model.detect(FRENCH).unwrap();
        assert_eq!(contaminated.code, "en");

        model.reset();
        assert_eq!(model.buffered_len(), 0);
        let clean = model.detect(FRENCH).unwrap();
        assert_eq!(clean.code, "fr");
    }

    #[test]
    fn test_confidence_threshold_reports_undetermined() {
        let config = LanguageDetectionConfig {
            min_confidence: 1.0,
            allowed_languages: None,
        };
        let mut model = WhatlangModel::load(&config).unwrap();
        let detection = model.detect("ok").unwrap();
        assert_eq!(detection.code, UNDETERMINED_LANGUAGE);
    }

    #[test]
    fn test_allowlist_restricts_candidates() {
        let config = LanguageDetectionConfig {
            min_confidence: 0.0,
            allowed_languages: Some(vec!["fr".to_string(), "de".to_string()]),
        };
        let mut model = WhatlangModel::load(&config).unwrap();
        let detection = model.detect(ENGLISH).unwrap();
        assert!(detection.code == "fr" || detection.code == "de" || detection.code == UNDETERMINED_LANGUAGE);
    }

    #[test]
    fn test_unknown_allowlist_code_fails_to_load() {
        let config = LanguageDetectionConfig {
            min_confidence: 0.0,
            allowed_languages: Some(vec!["en".to_string(), "xx".to_string()]),
        };
        let err = WhatlangModel::load(&config).err().unwrap();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("'xx'"));
    }

    #[test]
    fn test_empty_allowlist_fails_to_load() {
        let config = LanguageDetectionConfig {
            min_confidence: 0.0,
            allowed_languages: Some(vec![]),
        };
        assert!(matches!(WhatlangModel::load(&config), Err(LangsiftError::ModelLoad { .. })));
    }

    #[test]
    fn test_iso639_1_round_trip_for_every_language() {
        for lang in Lang::all() {
            let code = lang_to_iso639_1(*lang);
            assert_eq!(code.len(), 2, "{:?} should map to a two-letter code", lang);
            assert_eq!(lang_from_iso639_1(code), Some(*lang));
        }
    }

    #[test]
    fn test_lang_from_iso639_1_is_case_insensitive() {
        assert_eq!(lang_from_iso639_1("RU"), Some(Lang::Rus));
        assert_eq!(lang_from_iso639_1("xx"), None);
    }
}

/*!
 * Language code registry.
 *
 * Every model backend names languages differently: Google-style endpoints
 * want ISO 639-1 two-letter codes, the IndicTrans family wants bare
 * three-letter codes, NLLB wants script-qualified Flores codes like
 * `hin_Deva`, and the speech backends deal in plain English names like
 * `hindi`. This module holds the single bidirectional mapping between all
 * of those and one canonical tag (the ISO 639-3 code), preloaded at
 * startup, so no adapter ever remaps codes inline.
 */

use std::collections::HashMap;
use std::fmt;

use isolang::Language;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::RegistryError;

/// Canonical language identifier, independent of any provider's scheme.
///
/// Wraps an ISO 639-3 language; the canonical textual form is the 639-3
/// code (`hin`, `eng`, `brx`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LanguageTag(Language);

impl LanguageTag {
    /// Canonical ISO 639-3 code
    pub fn code(&self) -> &'static str {
        self.0.to_639_3()
    }

    /// English name of the language
    pub fn name(&self) -> &'static str {
        self.0.to_name()
    }

    /// ISO 639-1 two-letter code, where one exists
    pub fn part1(&self) -> Option<&'static str> {
        self.0.to_639_1()
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for LanguageTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for LanguageTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Language::from_639_3(&code)
            .map(LanguageTag)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown 639-3 code: {}", code)))
    }
}

/// The external naming schemes the registry translates between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    /// ISO 639-1 two-letter codes ("hi") — Google MT, gTTS
    Iso639_1,
    /// Bare three-letter codes ("hin") — IndicTrans, Indic Conformer
    IndicTrans,
    /// Script-qualified Flores codes ("hin_Deva") — NLLB and the wire format
    Flores,
    /// Lowercase English names ("hindi") — Whisper LID, speech voice lookup
    SpeechName,
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Iso639_1 => "iso-639-1",
            Self::IndicTrans => "indictrans",
            Self::Flores => "flores",
            Self::SpeechName => "speech-name",
        };
        write!(f, "{}", name)
    }
}

/// One registered language: canonical 639-3 code plus the per-vocabulary
/// spellings that cannot be derived from it.
struct Row {
    code: &'static str,
    flores: &'static str,
    speech: &'static str,
}

/// The 22 scheduled Indian languages plus English. Flores codes follow the
/// NLLB naming (Nepali and Odia use the individual-language codes there).
static ROWS: &[Row] = &[
    Row { code: "eng", flores: "eng_Latn", speech: "english" },
    Row { code: "hin", flores: "hin_Deva", speech: "hindi" },
    Row { code: "ben", flores: "ben_Beng", speech: "bengali" },
    Row { code: "tam", flores: "tam_Taml", speech: "tamil" },
    Row { code: "tel", flores: "tel_Telu", speech: "telugu" },
    Row { code: "kan", flores: "kan_Knda", speech: "kannada" },
    Row { code: "mal", flores: "mal_Mlym", speech: "malayalam" },
    Row { code: "mar", flores: "mar_Deva", speech: "marathi" },
    Row { code: "guj", flores: "guj_Gujr", speech: "gujarati" },
    Row { code: "pan", flores: "pan_Guru", speech: "punjabi" },
    Row { code: "ori", flores: "ory_Orya", speech: "odia" },
    Row { code: "asm", flores: "asm_Beng", speech: "assamese" },
    Row { code: "urd", flores: "urd_Arab", speech: "urdu" },
    Row { code: "nep", flores: "npi_Deva", speech: "nepali" },
    Row { code: "san", flores: "san_Deva", speech: "sanskrit" },
    Row { code: "kas", flores: "kas_Arab", speech: "kashmiri" },
    Row { code: "snd", flores: "snd_Arab", speech: "sindhi" },
    Row { code: "mai", flores: "mai_Deva", speech: "maithili" },
    Row { code: "gom", flores: "gom_Deva", speech: "konkani" },
    Row { code: "doi", flores: "doi_Deva", speech: "dogri" },
    Row { code: "mni", flores: "mni_Beng", speech: "manipuri" },
    Row { code: "brx", flores: "brx_Deva", speech: "bodo" },
    Row { code: "sat", flores: "sat_Olck", speech: "santali" },
];

static GLOBAL: Lazy<LanguageRegistry> = Lazy::new(LanguageRegistry::new);

/// Preloaded, read-only mapping between all provider vocabularies and the
/// canonical tag. Lookups are pure; no I/O at call time.
pub struct LanguageRegistry {
    tags: Vec<LanguageTag>,
    by_canonical: HashMap<&'static str, usize>,
    by_part1: HashMap<&'static str, usize>,
    by_flores: HashMap<String, usize>,
    by_speech: HashMap<&'static str, usize>,
    flores_of: HashMap<&'static str, &'static str>,
    speech_of: HashMap<&'static str, &'static str>,
}

impl LanguageRegistry {
    /// Build the registry from the static table.
    pub fn new() -> Self {
        let mut tags = Vec::with_capacity(ROWS.len());
        let mut by_canonical = HashMap::new();
        let mut by_part1 = HashMap::new();
        let mut by_flores = HashMap::new();
        let mut by_speech = HashMap::new();
        let mut flores_of = HashMap::new();
        let mut speech_of = HashMap::new();

        for (idx, row) in ROWS.iter().enumerate() {
            let lang = Language::from_639_3(row.code)
                .unwrap_or_else(|| panic!("invalid 639-3 code in registry table: {}", row.code));
            let tag = LanguageTag(lang);

            tags.push(tag);
            by_canonical.insert(row.code, idx);
            if let Some(part1) = lang.to_639_1() {
                by_part1.insert(part1, idx);
            }
            by_flores.insert(row.flores.to_lowercase(), idx);
            by_speech.insert(row.speech, idx);
            flores_of.insert(row.code, row.flores);
            speech_of.insert(row.code, row.speech);
        }

        Self { tags, by_canonical, by_part1, by_flores, by_speech, flores_of, speech_of }
    }

    /// Process-wide registry instance, built once.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Map an external code in the given vocabulary to the canonical tag.
    ///
    /// Total over the registered codes of each vocabulary; anything else is
    /// an `UnknownLanguageCode` error, never a silent substitute.
    pub fn canonicalize(&self, code: &str, vocabulary: Vocabulary) -> Result<LanguageTag, RegistryError> {
        let normalized = code.trim().to_lowercase();

        let idx = match vocabulary {
            Vocabulary::Iso639_1 => self.by_part1.get(normalized.as_str()).copied(),
            Vocabulary::IndicTrans => self.by_canonical.get(normalized.as_str()).copied(),
            Vocabulary::Flores => self.by_flores.get(normalized.as_str()).copied(),
            Vocabulary::SpeechName => self.by_speech.get(normalized.as_str()).copied(),
        };

        idx.map(|i| self.tags[i]).ok_or_else(|| RegistryError::UnknownLanguageCode {
            code: code.trim().to_string(),
            vocabulary: vocabulary.to_string(),
        })
    }

    /// Map a canonical tag back to a vocabulary's spelling.
    ///
    /// Partial by design: a language without, say, an ISO 639-1 code yields
    /// `UnsupportedLanguageForVocabulary` rather than a guessed code.
    pub fn to_vocabulary(&self, tag: LanguageTag, vocabulary: Vocabulary) -> Result<&'static str, RegistryError> {
        let missing = || RegistryError::UnsupportedLanguageForVocabulary {
            language: tag.code().to_string(),
            vocabulary: vocabulary.to_string(),
        };

        if !self.by_canonical.contains_key(tag.code()) {
            return Err(missing());
        }

        match vocabulary {
            Vocabulary::Iso639_1 => tag.part1().ok_or_else(missing),
            Vocabulary::IndicTrans => Ok(tag.code()),
            Vocabulary::Flores => self.flores_of.get(tag.code()).copied().ok_or_else(missing),
            Vocabulary::SpeechName => self.speech_of.get(tag.code()).copied().ok_or_else(missing),
        }
    }

    /// Resolve a code in any vocabulary, trying the schemes from most to
    /// least specific. Convenience for the CLI boundary only; adapters use
    /// explicit vocabularies.
    pub fn resolve(&self, code: &str) -> Result<LanguageTag, RegistryError> {
        for vocabulary in [
            Vocabulary::Flores,
            Vocabulary::IndicTrans,
            Vocabulary::Iso639_1,
            Vocabulary::SpeechName,
        ] {
            if let Ok(tag) = self.canonicalize(code, vocabulary) {
                return Ok(tag);
            }
        }

        Err(RegistryError::UnknownLanguageCode {
            code: code.trim().to_string(),
            vocabulary: "any".to_string(),
        })
    }

    /// All registered languages.
    pub fn supported(&self) -> &[LanguageTag] {
        &self.tags
    }

    /// Whether a tag is one of the registered languages.
    pub fn is_supported(&self, tag: &LanguageTag) -> bool {
        self.by_canonical.contains_key(tag.code())
    }

    /// Look up a tag by canonical 639-3 code.
    pub fn by_code(&self, code: &str) -> Result<LanguageTag, RegistryError> {
        self.canonicalize(code, Vocabulary::IndicTrans)
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

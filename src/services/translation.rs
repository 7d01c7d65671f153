// Translation wrapper.
//
// Live path targets a hosted translation API. Without a credential the
// wrapper answers from a small built-in phrase dictionary and otherwise
// echoes the input with a marker, so the endpoint always responds.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

const TRANSLATE_API_URL: &str = "https://translation.googleapis.com/language/translate/v2";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub text: String,
    pub translated: String,
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phrase {
    pub english: String,
    pub translated: String,
    pub category: String,
}

pub struct TranslationClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl TranslationClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    /// Translate text from `source_lang` (auto-detected when `None`) into
    /// a target language. Never fails; without a credential it tries the
    /// built-in phrase dictionary and falls back to echoing the input
    /// with a language marker.
    pub async fn translate(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> Translation {
        let Some(key) = self.api_key.as_deref() else {
            debug!("no translation credential; serving dictionary fallback");
            return fallback_translate(text, source_lang, target_lang);
        };

        match self.translate_live(key, text, source_lang, target_lang).await {
            Ok(translation) => translation,
            Err(e) => {
                warn!("translation failed: {e}; serving dictionary fallback");
                fallback_translate(text, source_lang, target_lang)
            }
        }
    }

    async fn translate_live(
        &self,
        key: &str,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> anyhow::Result<Translation> {
        let mut request = serde_json::json!({ "q": text, "target": target_lang });
        if let Some(source) = source_lang {
            request["source"] = Value::String(source.to_string());
        }

        let body: Value = self
            .http
            .post(TRANSLATE_API_URL)
            .query(&[("key", key)])
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let translated = body
            .get("data")
            .and_then(|d| d.get("translations"))
            .and_then(Value::as_array)
            .and_then(|t| t.first())
            .and_then(|t| t.get("translatedText"))
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("unexpected translation payload"))?;

        Ok(Translation {
            text: text.to_string(),
            translated: translated.to_string(),
            source_lang: source_lang.unwrap_or("auto").to_string(),
            target_lang: target_lang.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Static catalog
// ---------------------------------------------------------------------------

const LANGUAGES: &[(&str, &str)] = &[
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ja", "Japanese"),
    ("zh", "Chinese"),
    ("ko", "Korean"),
    ("th", "Thai"),
    ("ar", "Arabic"),
    ("ru", "Russian"),
    ("nl", "Dutch"),
];

/// Languages the translate endpoint advertises.
pub fn languages() -> Vec<Language> {
    LANGUAGES
        .iter()
        .map(|&(code, name)| Language {
            code: code.to_string(),
            name: name.to_string(),
        })
        .collect()
}

// english phrase -> per-language renderings, used by both the phrasebook
// endpoint and the unkeyed translate fallback
const PHRASES: &[(&str, &str, &[(&str, &str)])] = &[
    (
        "hello",
        "greetings",
        &[
            ("es", "hola"),
            ("fr", "bonjour"),
            ("de", "hallo"),
            ("it", "ciao"),
            ("pt", "olá"),
            ("ja", "こんにちは"),
        ],
    ),
    (
        "thank you",
        "greetings",
        &[
            ("es", "gracias"),
            ("fr", "merci"),
            ("de", "danke"),
            ("it", "grazie"),
            ("pt", "obrigado"),
            ("ja", "ありがとう"),
        ],
    ),
    (
        "goodbye",
        "greetings",
        &[
            ("es", "adiós"),
            ("fr", "au revoir"),
            ("de", "auf wiedersehen"),
            ("it", "arrivederci"),
            ("pt", "adeus"),
            ("ja", "さようなら"),
        ],
    ),
    (
        "how much does this cost?",
        "shopping",
        &[
            ("es", "¿cuánto cuesta esto?"),
            ("fr", "combien ça coûte ?"),
            ("de", "wie viel kostet das?"),
            ("it", "quanto costa?"),
            ("pt", "quanto custa isto?"),
            ("ja", "これはいくらですか"),
        ],
    ),
    (
        "where is the bathroom?",
        "essentials",
        &[
            ("es", "¿dónde está el baño?"),
            ("fr", "où sont les toilettes ?"),
            ("de", "wo ist die toilette?"),
            ("it", "dov'è il bagno?"),
            ("pt", "onde fica a casa de banho?"),
            ("ja", "トイレはどこですか"),
        ],
    ),
    (
        "i need help",
        "essentials",
        &[
            ("es", "necesito ayuda"),
            ("fr", "j'ai besoin d'aide"),
            ("de", "ich brauche hilfe"),
            ("it", "ho bisogno di aiuto"),
            ("pt", "preciso de ajuda"),
            ("ja", "助けてください"),
        ],
    ),
    (
        "the check, please",
        "dining",
        &[
            ("es", "la cuenta, por favor"),
            ("fr", "l'addition, s'il vous plaît"),
            ("de", "die rechnung, bitte"),
            ("it", "il conto, per favore"),
            ("pt", "a conta, por favor"),
            ("ja", "お会計をお願いします"),
        ],
    ),
    (
        "a table for two",
        "dining",
        &[
            ("es", "una mesa para dos"),
            ("fr", "une table pour deux"),
            ("de", "ein tisch für zwei"),
            ("it", "un tavolo per due"),
            ("pt", "uma mesa para dois"),
            ("ja", "二人用のテーブル"),
        ],
    ),
];

/// Phrasebook entries for a target language. Languages outside the
/// dictionary get the echo-marker rendering.
pub fn phrasebook(target_lang: &str) -> Vec<Phrase> {
    PHRASES
        .iter()
        .map(|&(english, category, _)| Phrase {
            english: english.to_string(),
            translated: lookup_phrase(english, target_lang)
                .unwrap_or_else(|| echo_marker(english, target_lang)),
            category: category.to_string(),
        })
        .collect()
}

fn lookup_phrase(text: &str, target_lang: &str) -> Option<String> {
    let lower = text.trim().to_lowercase();
    PHRASES
        .iter()
        .find(|(english, _, _)| *english == lower)
        .and_then(|(_, _, renderings)| {
            renderings
                .iter()
                .find(|(code, _)| *code == target_lang)
                .map(|&(_, rendered)| rendered.to_string())
        })
}

fn echo_marker(text: &str, target_lang: &str) -> String {
    format!("[{target_lang}] {text}")
}

/// Dictionary hit when the phrase is known, echo with a marker otherwise.
/// The dictionary holds English phrases, so any explicitly non-English
/// source goes straight to the echo path.
pub fn fallback_translate(
    text: &str,
    source_lang: Option<&str>,
    target_lang: &str,
) -> Translation {
    let source = source_lang.unwrap_or("en");
    let translated = if source == "en" {
        lookup_phrase(text, target_lang).unwrap_or_else(|| echo_marker(text, target_lang))
    } else {
        echo_marker(text, target_lang)
    };
    Translation {
        text: text.to_string(),
        translated,
        source_lang: source.to_string(),
        target_lang: target_lang.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unkeyed_translate_uses_dictionary() {
        let client = TranslationClient::new(None);
        let t = client.translate("Thank you", None, "es").await;
        assert_eq!(t.translated, "gracias");
        assert_eq!(t.source_lang, "en");
        assert_eq!(t.target_lang, "es");
    }

    #[tokio::test]
    async fn unknown_phrase_echoes_with_marker() {
        let client = TranslationClient::new(None);
        let t = client.translate("the quick brown fox", None, "fr").await;
        assert_eq!(t.translated, "[fr] the quick brown fox");
    }

    #[tokio::test]
    async fn non_english_source_skips_the_dictionary() {
        let client = TranslationClient::new(None);
        // "thank you" is an English dictionary phrase, but the caller says
        // the text is German, so it must not map to the French entry.
        let t = client.translate("thank you", Some("de"), "fr").await;
        assert_eq!(t.translated, "[fr] thank you");
        assert_eq!(t.source_lang, "de");
        assert_eq!(t.target_lang, "fr");
    }

    #[tokio::test]
    async fn explicit_english_source_still_hits_dictionary() {
        let client = TranslationClient::new(None);
        let t = client.translate("hello", Some("en"), "pt").await;
        assert_eq!(t.translated, "olá");
        assert_eq!(t.source_lang, "en");
    }

    #[test]
    fn languages_list_is_stable() {
        let langs = languages();
        assert_eq!(langs.len(), LANGUAGES.len());
        assert!(langs.iter().any(|l| l.code == "ja" && l.name == "Japanese"));
    }

    #[test]
    fn phrasebook_covers_all_phrases() {
        let phrases = phrasebook("it");
        assert_eq!(phrases.len(), PHRASES.len());
        let check = phrases
            .iter()
            .find(|p| p.english == "the check, please")
            .unwrap();
        assert_eq!(check.translated, "il conto, per favore");
        assert_eq!(check.category, "dining");
    }

    #[test]
    fn phrasebook_unknown_language_echoes() {
        let phrases = phrasebook("xx");
        assert!(phrases.iter().all(|p| p.translated.starts_with("[xx] ")));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup_phrase("HELLO", "de").as_deref(), Some("hallo"));
        assert!(lookup_phrase("hello", "xx").is_none());
    }
}

//! Target language tags and `lang` attribute classification.

use std::fmt::Display;

use unic_langid::LanguageIdentifier;

/// The language a node resolves to: a full tag such as `en-us` and, when the
/// tag has exactly one `-`, its primary part (`en`).
///
/// Tags are stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetLanguage {
    full: String,
    primary: Option<String>,
}

/// How a `Value` element's `lang` attribute relates to the target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageMatch {
    Full,
    Primary,
    None,
}

impl TargetLanguage {
    pub fn parse(tag: &str) -> Self {
        let full = tag.to_lowercase();
        let primary = match full.split_once('-') {
            Some((primary, rest)) if !rest.contains('-') => Some(primary.to_string()),
            _ => None,
        };
        TargetLanguage { full, primary }
    }

    pub fn full(&self) -> &str {
        &self.full
    }

    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    /// `false` until a non-empty tag has been set.
    pub fn is_set(&self) -> bool {
        !self.full.is_empty()
    }

    /// Classifies `lang` case-insensitively. The full tag wins when both the
    /// full and the primary tag would match.
    pub fn classify(&self, lang: &str) -> LanguageMatch {
        let lang = lang.to_lowercase();
        if self.is_set() && lang == self.full {
            LanguageMatch::Full
        } else if self.primary.as_deref() == Some(lang.as_str()) {
            LanguageMatch::Primary
        } else {
            LanguageMatch::None
        }
    }

    /// Parses the full tag as a BCP 47 identifier, if it is one.
    pub fn identifier(&self) -> Option<LanguageIdentifier> {
        self.full.parse().ok()
    }
}

impl From<&LanguageIdentifier> for TargetLanguage {
    fn from(value: &LanguageIdentifier) -> Self {
        TargetLanguage::parse(&value.to_string())
    }
}

impl Display for TargetLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_region_tag() {
        let lang = TargetLanguage::parse("en-US");
        assert_eq!(lang.full(), "en-us");
        assert_eq!(lang.primary(), Some("en"));
        assert!(lang.is_set());
    }

    #[test]
    fn test_parse_without_separator() {
        let lang = TargetLanguage::parse("FR");
        assert_eq!(lang.full(), "fr");
        assert_eq!(lang.primary(), None);
    }

    #[test]
    fn test_parse_multiple_separators_has_no_primary() {
        let lang = TargetLanguage::parse("zh-Hant-TW");
        assert_eq!(lang.full(), "zh-hant-tw");
        assert_eq!(lang.primary(), None);
    }

    #[test]
    fn test_default_is_unset() {
        let lang = TargetLanguage::default();
        assert!(!lang.is_set());
        assert_eq!(lang.classify(""), LanguageMatch::None);
    }

    #[test]
    fn test_classify() {
        let lang = TargetLanguage::parse("en-us");
        assert_eq!(lang.classify("EN-us"), LanguageMatch::Full);
        assert_eq!(lang.classify("En"), LanguageMatch::Primary);
        assert_eq!(lang.classify("en-gb"), LanguageMatch::None);
        assert_eq!(lang.classify("es"), LanguageMatch::None);
    }

    #[test]
    fn test_identifier_round_trip() {
        let id: LanguageIdentifier = "pt-BR".parse().unwrap();
        let lang = TargetLanguage::from(&id);
        assert_eq!(lang.full(), "pt-br");
        assert_eq!(lang.primary(), Some("pt"));
        let parsed = lang.identifier().unwrap();
        assert_eq!(parsed.language.to_string(), "pt");
        assert_eq!(parsed.region.map(|r| r.to_string()), Some("BR".to_string()));
    }

    #[test]
    fn test_identifier_rejects_garbage() {
        assert!(TargetLanguage::parse("not a tag!").identifier().is_none());
    }
}

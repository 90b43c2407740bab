//! Localized user-facing strings via Fluent.
//!
//! English and Russian catalogs are embedded at compile time. Lookups take
//! the Telegram language code of the sender and fall back to English for
//! anything unsupported.

use anyhow::{anyhow, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::sync::LazyLock;
use unic_langid::LanguageIdentifier;

const EN_MAIN: &str = include_str!("../locales/en/main.ftl");
const RU_MAIN: &str = include_str!("../locales/ru/main.ftl");

const FALLBACK_LANGUAGE: &str = "en";

/// Localization manager holding one bundle per supported language.
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();
        bundles.insert("en".to_string(), Self::create_bundle("en", EN_MAIN)?);
        bundles.insert("ru".to_string(), Self::create_bundle("ru", RU_MAIN)?);
        Ok(Self { bundles })
    }

    fn create_bundle(locale: &str, source: &str) -> Result<FluentBundle<FluentResource>> {
        let langid: LanguageIdentifier = locale.parse()?;
        let mut bundle = FluentBundle::new_concurrent(vec![langid]);
        // Skip Unicode isolation marks around placeables; messages go to a
        // chat client, not a bidi-sensitive renderer.
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("Failed to parse {locale} catalog: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("Failed to load {locale} catalog: {errors:?}"))?;

        Ok(bundle)
    }

    pub fn is_language_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(language)
    }

    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(FALLBACK_LANGUAGE));

        let Some(bundle) = bundle else {
            return format!("Missing translation: {key}");
        };

        let Some(message) = bundle.get_message(key) else {
            return format!("Missing translation: {key}");
        };
        let Some(pattern) = message.value() else {
            return format!("Missing value for key: {key}");
        };

        let fluent_args = args.map(|args| {
            FluentArgs::from_iter(args.iter().map(|(k, v)| (*k, FluentValue::from(*v))))
        });

        let mut errors = vec![];
        bundle
            .format_pattern(pattern, fluent_args.as_ref(), &mut errors)
            .into_owned()
    }
}

static LOCALIZATION_MANAGER: LazyLock<LocalizationManager> =
    LazyLock::new(|| LocalizationManager::new().expect("Embedded message catalogs are valid"));

pub fn get_localization_manager() -> &'static LocalizationManager {
    &LOCALIZATION_MANAGER
}

/// Map a Telegram language code (possibly with a region, e.g. `ru-RU`) to a
/// supported catalog language, defaulting to English.
pub fn detect_language(language_code: Option<&str>) -> &'static str {
    let primary = language_code
        .map(|code| code.split(['-', '_']).next().unwrap_or(code))
        .unwrap_or(FALLBACK_LANGUAGE);

    match primary {
        "ru" => "ru",
        _ => FALLBACK_LANGUAGE,
    }
}

/// Get a localized message for a Telegram language code.
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    get_localization_manager().get_message_in_language(key, detect_language(language_code), None)
}

/// Get a localized message with arguments for a Telegram language code.
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
    get_localization_manager().get_message_in_language(
        key,
        detect_language(language_code),
        Some(&args_map),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_languages() {
        let manager = get_localization_manager();
        assert!(manager.is_language_supported("en"));
        assert!(manager.is_language_supported("ru"));
        assert!(!manager.is_language_supported("de"));
    }

    #[test]
    fn test_language_detection() {
        assert_eq!(detect_language(Some("ru")), "ru");
        assert_eq!(detect_language(Some("ru-RU")), "ru");
        assert_eq!(detect_language(Some("en-US")), "en");
        assert_eq!(detect_language(Some("de")), "en");
        assert_eq!(detect_language(None), "en");
    }

    #[test]
    fn test_messages_differ_between_languages() {
        let en = t_lang("authentication-prompt", Some("en"));
        let ru = t_lang("authentication-prompt", Some("ru"));
        assert!(!en.is_empty());
        assert!(!ru.is_empty());
        assert_ne!(en, ru);
    }

    #[test]
    fn test_arguments_are_interpolated_without_isolation_marks() {
        let message =
            t_args_lang("authorization-success", &[("winery", "Chateau Test")], Some("en"));
        assert!(message.contains("Chateau Test"), "got: {message}");
        assert!(!message.contains('\u{2068}'));
    }

    #[test]
    fn test_missing_key_is_flagged_not_fatal() {
        let message = t_lang("no-such-key", Some("en"));
        assert!(message.contains("Missing translation"));
    }
}

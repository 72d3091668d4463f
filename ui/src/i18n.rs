//! Localized dashboard strings.
//!
//! Messages live in `i18n/<locale>/gaitvision-ui.ftl` and are embedded at
//! compile time. en-US is the reference locale: `t!` keys are checked against
//! it by `i18n-embed-fl`, and any message missing from another locale falls
//! back to it.
//!
//! ```ignore
//! use crate::t;
//! let title = t!("dashboard-title");
//! let loaded = t!("upload-patient-loaded", count = 12, participant = "P07");
//! ```
//!
//! The initial locale comes from the OS on desktop and `navigator.languages`
//! on the web. The navbar switcher calls [`set_language`] afterwards.

use std::sync::Once;

use i18n_embed::fluent::FluentLanguageLoader;
use i18n_embed::I18nEmbedError;
use once_cell::sync::Lazy;
use rust_embed::Embed;
use tracing::{debug, warn};
use unic_langid::{langid, LanguageIdentifier};

#[doc(hidden)]
pub use i18n_embed_fl::fl;

/// Look up a message through the shared [`LOADER`].
///
/// `t!("nav-home")`, `t!("upload-calibration-loaded", count = 42)`.
#[macro_export]
macro_rules! t {
    ($key:literal) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key)
    };
    ($key:literal, $( $arg:ident = $value:expr ),+ $(,)?) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key, $( $arg = $value ),+ )
    };
}

/// Name of the `.ftl` file in every locale folder.
const DOMAIN: &str = "gaitvision-ui";

const FALLBACK: LanguageIdentifier = langid!("en-US");

#[derive(Embed)]
#[folder = "i18n"]
struct Localizations;

pub static LOADER: Lazy<FluentLanguageLoader> =
    Lazy::new(|| FluentLanguageLoader::new(DOMAIN, FALLBACK));

static INIT: Once = Once::new();

/// Load the platform's preferred locale. Safe to call on every render.
pub fn init() {
    INIT.call_once(|| {
        let requested = requested_languages();
        match i18n_embed::select(&*LOADER, &Localizations, &requested) {
            Ok(selected) => debug!(?selected, "locale selected"),
            Err(err) => warn!(%err, "locale selection failed; using en-US"),
        }
    });
}

/// Switch locale at runtime. Unparseable tags are rejected and leave the
/// current locale in place; well-formed tags without a bundle fall back to
/// en-US.
pub fn set_language(tag: &str) -> Result<(), I18nEmbedError> {
    let language: LanguageIdentifier = tag
        .parse()
        .map_err(|err| I18nEmbedError::ErrorParsingLocale(tag.to_string(), err))?;
    i18n_embed::select(&*LOADER, &Localizations, &[language])?;
    Ok(())
}

/// Locale the loader currently resolves messages in.
pub fn current_language() -> String {
    LOADER
        .current_languages()
        .first()
        .unwrap_or(&FALLBACK)
        .to_string()
}

/// Locale folders embedded in the binary, sorted.
pub fn available_languages() -> Vec<String> {
    let mut languages = Localizations::iter()
        .filter_map(|path| path.split('/').next().map(str::to_string))
        .collect::<Vec<_>>();
    languages.sort();
    languages.dedup();
    languages
}

#[cfg(target_arch = "wasm32")]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::WebLanguageRequester::requested_languages()
}

#[cfg(not(target_arch = "wasm32"))]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::DesktopLanguageRequester::requested_languages()
}

//! UI text resources: layered dictionaries, language switching and locale
//! formatting.
//!
//! The host base strings (`english.json`) sit at the bottom of the overlay.
//! The active host language (`<locale>.json`) goes on top when selected, and
//! each extension contributes `Localization/en_US.json` with its
//! `<locale>.json` directly above it. Lookups take the topmost non-empty value.

pub mod dictionary;
pub mod error;
pub mod languages;
pub mod locale;
pub mod localization;
pub mod overlay;

pub use {
    error::{LocalizationParseError, Result},
    languages::{Language, available_languages},
    locale::{LocaleContext, TextDirection},
    localization::Localization,
    overlay::{Layer, LayerOrigin, ResourceOverlay},
};

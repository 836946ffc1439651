//! Ordered stack of string dictionaries. Lookups scan from the top down.

use std::path::{Path, PathBuf};

use crate::dictionary::Dictionary;

/// Where a layer came from, so it can be found again for replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerOrigin {
    /// Host strings in the source language.
    Base,
    /// The active alternate host language.
    Language(String),
    /// An extension's source-language strings.
    ExtensionBase(PathBuf),
    /// An extension's strings for the active language.
    ExtensionTranslation { extension_dir: PathBuf, language: String },
}

impl LayerOrigin {
    pub fn extension_dir(&self) -> Option<&Path> {
        match self {
            Self::ExtensionBase(dir) | Self::ExtensionTranslation { extension_dir: dir, .. } => {
                Some(dir)
            },
            Self::Base | Self::Language(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Layer {
    pub origin: LayerOrigin,
    pub entries: Dictionary,
}

impl Layer {
    pub fn new(origin: LayerOrigin, entries: Dictionary) -> Self {
        Self { origin, entries }
    }
}

#[derive(Debug, Default)]
pub struct ResourceOverlay {
    layers: Vec<Layer>,
}

impl ResourceOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn pop_layer(&mut self) -> Option<Layer> {
        self.layers.pop()
    }

    /// Insert directly above the layer at `index` (clamped to the top).
    pub fn insert_above(&mut self, index: usize, layer: Layer) {
        let at = (index + 1).min(self.layers.len());
        self.layers.insert(at, layer);
    }

    pub fn position(&self, pred: impl Fn(&LayerOrigin) -> bool) -> Option<usize> {
        self.layers.iter().position(|l| pred(&l.origin))
    }

    /// Drop every layer matching `pred`, returning how many were removed.
    pub fn remove_where(&mut self, pred: impl Fn(&LayerOrigin) -> bool) -> usize {
        let before = self.layers.len();
        self.layers.retain(|l| !pred(&l.origin));
        before - self.layers.len()
    }

    /// Topmost non-empty value for `key`.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.layers
            .iter()
            .rev()
            .filter_map(|l| l.entries.get(key))
            .map(String::as_str)
            .find(|v| !v.is_empty())
    }

    /// Bottom to top.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn layer(origin: LayerOrigin, pairs: &[(&str, &str)]) -> Layer {
        Layer::new(
            origin,
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn empty_override_does_not_hide_base() {
        let mut overlay = ResourceOverlay::new();
        overlay.push_layer(layer(LayerOrigin::Base, &[("A", "x")]));
        overlay.push_layer(layer(LayerOrigin::Language("de_DE".into()), &[("A", "")]));
        assert_eq!(overlay.resolve("A"), Some("x"));
    }

    #[test]
    fn later_layer_wins() {
        let mut overlay = ResourceOverlay::new();
        overlay.push_layer(layer(LayerOrigin::ExtensionBase("/e/one".into()), &[("K", "one")]));
        overlay.push_layer(layer(LayerOrigin::ExtensionBase("/e/two".into()), &[("K", "two")]));
        assert_eq!(overlay.resolve("K"), Some("two"));

        overlay.pop_layer();
        assert_eq!(overlay.resolve("K"), Some("one"));
        assert_eq!(overlay.resolve("missing"), None);
    }

    #[test]
    fn insert_above_and_remove_where() {
        let mut overlay = ResourceOverlay::new();
        overlay.push_layer(layer(LayerOrigin::Base, &[]));
        overlay.push_layer(layer(LayerOrigin::ExtensionBase("/e".into()), &[("K", "en")]));
        overlay.push_layer(layer(LayerOrigin::Language("fr_FR".into()), &[]));

        let base = overlay
            .position(|o| *o == LayerOrigin::ExtensionBase("/e".into()))
            .unwrap();
        overlay.insert_above(base, layer(
            LayerOrigin::ExtensionTranslation {
                extension_dir: "/e".into(),
                language: "fr_FR".into(),
            },
            &[("K", "fr")],
        ));
        assert_eq!(overlay.len(), 4);
        assert!(matches!(
            overlay.layers()[2].origin,
            LayerOrigin::ExtensionTranslation { .. }
        ));
        assert_eq!(overlay.resolve("K"), Some("fr"));

        let removed =
            overlay.remove_where(|o| matches!(o, LayerOrigin::ExtensionTranslation { .. }));
        assert_eq!(removed, 1);
        assert_eq!(overlay.resolve("K"), Some("en"));
    }
}

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::KeyValueStore;

pub const THEME_KEY: &str = "theme";
/// Client hint carrying the OS colour scheme.
pub const COLOR_SCHEME_HINT: &str = "sec-ch-prefers-color-scheme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().trim_matches('"').to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

pub struct PreferenceStore {
    store: Arc<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The stored theme; otherwise the client's colour-scheme hint; otherwise light.
    pub async fn theme(&self, hint: Option<&str>) -> Theme {
        let stored = match self.store.get(THEME_KEY).await {
            Ok(value) => value.as_deref().and_then(Theme::parse),
            Err(e) => {
                warn!("Failed to load theme: {e:#}");
                None
            }
        };
        stored
            .or_else(|| hint.and_then(Theme::parse))
            .unwrap_or_default()
    }

    pub async fn set_theme(&self, theme: Theme) -> Theme {
        if let Err(e) = self.store.set(THEME_KEY, theme.as_str()).await {
            warn!("Failed to save theme: {e:#}");
        }
        theme
    }

    pub async fn toggle_theme(&self, hint: Option<&str>) -> Theme {
        let next = self.theme(hint).await.toggled();
        self.set_theme(next).await
    }
}

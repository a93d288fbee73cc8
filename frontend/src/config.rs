use log::warn;
use serde::Deserialize;

use crate::components::reveal::StatsEffect;
use crate::dom::{Element, Page};

pub const DEFAULT_SUPPORT_EMAIL: &str = "support@deanware.com";

#[cfg(debug_assertions)]
pub fn get_backend_url() -> &'static str {
    "http://localhost:3001"  // Development URL when running locally
}

#[cfg(not(debug_assertions))]
pub fn get_backend_url() -> &'static str {
    ""  // Production URL
}

/// Page-level settings, read from `<script type="application/json" id="site-config">`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Where contact requests go. Unset keeps the simulated submission.
    pub contact_endpoint: Option<String>,
    pub hero_stats: StatsEffect,
    pub support_email: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            contact_endpoint: None,
            hero_stats: StatsEffect::Fade,
            support_email: DEFAULT_SUPPORT_EMAIL.to_string(),
        }
    }
}

impl SiteConfig {
    pub fn from_page<P: Page>(page: &P) -> Self {
        match page.by_id("site-config") {
            Some(el) => Self::from_json(&el.text()),
            None => Self::default(),
        }
    }

    pub fn from_json(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str(raw) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring invalid site config: {}", e);
                Self::default()
            }
        }
    }

    /// The contact endpoint with relative paths resolved against the backend.
    pub fn contact_url(&self) -> Option<String> {
        self.contact_endpoint.as_ref().map(|endpoint| {
            if endpoint.starts_with('/') {
                format!("{}{}", get_backend_url(), endpoint)
            } else {
                endpoint.clone()
            }
        })
    }
}

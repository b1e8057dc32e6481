use std::path::PathBuf;

use log::warn;

use crate::env;
use crate::i18n::{DirResources, HttpResources, LocaleCode, Resources};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:1420";

/// Everything the UI needs to know about where things live.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub backend_url: String,
    pub resources: Resources,
    /// Locale forced from the command line; persisted like a user choice.
    pub locale_override: Option<LocaleCode>,
}

impl LauncherConfig {
    /// Resolve the resource source: an explicit directory wins, then an
    /// explicit URL, then the bundled directory when it exists, then the
    /// backend host.
    pub fn resolve(
        backend_url: Option<String>,
        assets_url: Option<String>,
        assets_dir: Option<PathBuf>,
        locale: Option<String>,
    ) -> Self {
        let backend_url = backend_url.unwrap_or_else(|| DEFAULT_BACKEND_URL.to_owned());
        let resources = match (assets_dir, assets_url) {
            (Some(dir), _) => Resources::Dir(DirResources::new(dir)),
            (None, Some(url)) => Resources::Http(HttpResources::new(url)),
            (None, None) => {
                let bundled = env::bundled_locales_dir();
                if bundled.is_dir() {
                    Resources::Dir(DirResources::new(bundled))
                } else {
                    Resources::Http(HttpResources::new(backend_url.clone()))
                }
            }
        };
        let locale_override = locale.and_then(|raw| match raw.parse::<LocaleCode>() {
            Ok(code) => Some(code),
            Err(err) => {
                warn!("config: ignoring --locale ({err})");
                None
            }
        });
        Self {
            backend_url,
            resources,
            locale_override,
        }
    }
}

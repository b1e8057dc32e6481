use std::sync::Arc;

use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::storage::{Preferences, PrefsError};

use super::{LOCALE_PREF_KEY, LoadOutcome, LocaleCode, LocaleError, Localizer, ResourceSource};

/// Announcement that the selected locale changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleChanged {
    pub locale: LocaleCode,
}

/// Result of a load triggered by a locale change, reported back to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleUpdate {
    Installed(LocaleCode),
    Failed(LocaleError),
}

/// Holder of the selected locale.
///
/// Changing it persists the choice and notifies every subscriber before
/// `set` returns.
pub struct LocaleStore {
    current: LocaleCode,
    prefs: Preferences,
    subscribers: Vec<mpsc::UnboundedSender<LocaleChanged>>,
}

impl LocaleStore {
    /// Seed from the persisted locale, or `fallback` when none (or an invalid
    /// one) was saved.
    pub fn restore(prefs: Preferences, fallback: LocaleCode) -> Self {
        let current = match prefs.get(LOCALE_PREF_KEY) {
            Some(saved) => saved.parse().unwrap_or_else(|err| {
                warn!("locale store: ignoring saved locale ({err})");
                fallback
            }),
            None => fallback,
        };
        debug!("locale store: starting with {current}");
        Self {
            current,
            prefs,
            subscribers: Vec::new(),
        }
    }

    pub fn current(&self) -> &LocaleCode {
        &self.current
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<LocaleChanged> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Select `locale`.
    ///
    /// Subscribers are notified even when `locale` is already selected, and
    /// even when persisting fails; the persistence error is returned after.
    pub fn set(&mut self, locale: LocaleCode) -> Result<(), PrefsError> {
        info!("locale store: {} -> {}", self.current, locale);
        self.current = locale.clone();
        let persisted = self.prefs.set(LOCALE_PREF_KEY, locale.as_str());
        if let Err(err) = &persisted {
            warn!("locale store: unable to persist {locale}: {err}");
        }
        self.subscribers.retain(|tx| {
            tx.send(LocaleChanged {
                locale: locale.clone(),
            })
            .is_ok()
        });
        persisted
    }

    /// Undo a selection whose load failed.
    ///
    /// If `failed` is still the current locale, go back to `active` and
    /// persist it again; subscribers are not notified since `active` is what
    /// the localizer already shows. Returns whether anything changed. A failure
    /// for a locale that has since been replaced is ignored.
    pub fn revert(&mut self, failed: &LocaleCode, active: LocaleCode) -> Result<bool, PrefsError> {
        if self.current != *failed {
            return Ok(false);
        }
        warn!("locale store: {failed} failed to load, back to {active}");
        self.current = active;
        self.prefs.set(LOCALE_PREF_KEY, self.current.as_str())?;
        Ok(true)
    }

    /// Ask subscribers to load the current locale again without changing or
    /// persisting anything. Used for the initial load at startup.
    pub fn request_reload(&mut self) {
        let locale = self.current.clone();
        self.subscribers.retain(|tx| {
            tx.send(LocaleChanged {
                locale: locale.clone(),
            })
            .is_ok()
        });
    }
}

/// Turn locale changes into loads.
///
/// Loads are issued in the order changes arrive; each runs as its own task so
/// a slow fetch never delays a newer one, and the localizer discards whichever
/// result is stale.
pub fn spawn_locale_listener<S: ResourceSource>(
    runtime: &Handle,
    localizer: Arc<Localizer<S>>,
    mut changes: mpsc::UnboundedReceiver<LocaleChanged>,
    reports: mpsc::UnboundedSender<LocaleUpdate>,
) -> JoinHandle<()> {
    let spawner = runtime.clone();
    runtime.spawn(async move {
        while let Some(LocaleChanged { locale }) = changes.recv().await {
            let load = localizer.load(locale);
            let reports = reports.clone();
            spawner.spawn(async move {
                match load.await {
                    Ok(LoadOutcome::Installed { locale, .. }) => {
                        let _ = reports.send(LocaleUpdate::Installed(locale));
                    }
                    Ok(LoadOutcome::Superseded { locale, generation }) => {
                        debug!("locale listener: dropped stale load #{generation} ({locale})");
                    }
                    Err(err) => {
                        let _ = reports.send(LocaleUpdate::Failed(err));
                    }
                }
            });
        }
        debug!("locale listener: store dropped, stopping");
    })
}

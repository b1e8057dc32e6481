use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use log::{error, info, warn};

use super::{LocaleCode, LocaleError, ResourceSource, TranslationTable, parse_resources};

/// A fully parsed table together with the request that produced it.
#[derive(Debug)]
pub struct Catalog {
    pub locale: LocaleCode,
    pub table: TranslationTable,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Installed {
        locale: LocaleCode,
        generation: u64,
        entries: usize,
    },
    /// A newer request was installed first; this result was dropped.
    Superseded { locale: LocaleCode, generation: u64 },
}

/// Owner of the active translation table.
///
/// Readers always see one complete catalog. Every `load` call is tagged with a
/// generation number when it is issued, and a finished load only replaces the
/// active catalog if nothing newer has been installed in the meantime.
pub struct Localizer<S> {
    source: S,
    active: RwLock<Arc<Catalog>>,
    requested: AtomicU64,
}

impl<S: ResourceSource> Localizer<S> {
    /// Start with an empty table for `initial`; lookups return raw keys until
    /// the first load lands.
    pub fn new(source: S, initial: LocaleCode) -> Self {
        Self {
            source,
            active: RwLock::new(Arc::new(Catalog {
                locale: initial,
                table: TranslationTable::default(),
                generation: 0,
            })),
            requested: AtomicU64::new(0),
        }
    }

    /// Fetch, parse and install the table for `locale`.
    ///
    /// The generation is taken when this is called, not when the future is
    /// first polled, so the returned future can be handed to a spawned task
    /// without losing request order. On error the active catalog is left as
    /// it was.
    pub fn load(
        self: &Arc<Self>,
        locale: LocaleCode,
    ) -> impl Future<Output = Result<LoadOutcome, LocaleError>> + Send + 'static {
        let generation = self.next_generation();
        let this = Arc::clone(self);
        async move { this.load_tagged(locale, generation).await }
    }

    fn next_generation(&self) -> u64 {
        self.requested.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn load_tagged(
        &self,
        locale: LocaleCode,
        generation: u64,
    ) -> Result<LoadOutcome, LocaleError> {
        match self.fetch_and_parse(&locale).await {
            Ok(table) => Ok(self.install(Catalog {
                locale,
                table,
                generation,
            })),
            Err(err) => {
                error!("locale load #{generation} failed: {err}");
                Err(err)
            }
        }
    }

    async fn fetch_and_parse(&self, locale: &LocaleCode) -> Result<TranslationTable, LocaleError> {
        let raw = self.source.fetch(locale).await?;
        parse_resources(locale, &raw)
    }

    fn install(&self, catalog: Catalog) -> LoadOutcome {
        let mut slot = self
            .active
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.generation >= catalog.generation {
            warn!(
                "locale load #{} for {} superseded by #{} ({})",
                catalog.generation, catalog.locale, slot.generation, slot.locale
            );
            return LoadOutcome::Superseded {
                locale: catalog.locale,
                generation: catalog.generation,
            };
        }
        let outcome = LoadOutcome::Installed {
            locale: catalog.locale.clone(),
            generation: catalog.generation,
            entries: catalog.table.len(),
        };
        info!(
            "locale {} installed ({} strings, load #{})",
            catalog.locale,
            catalog.table.len(),
            catalog.generation
        );
        *slot = Arc::new(catalog);
        outcome
    }

    /// Snapshot of the active catalog. Holding it never blocks an install.
    pub fn catalog(&self) -> Arc<Catalog> {
        self.active
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Translate `key`, falling back to the key itself.
    pub fn t(&self, key: &str) -> String {
        self.catalog().table.lookup(key).to_owned()
    }

    /// Run `f` against the active table without copying strings out.
    pub fn with_table<R>(&self, f: impl FnOnce(&TranslationTable) -> R) -> R {
        f(&self.catalog().table)
    }

    pub fn locale(&self) -> LocaleCode {
        self.catalog().locale.clone()
    }

    /// Generation of the installed catalog; 0 until the first load lands.
    pub fn generation(&self) -> u64 {
        self.catalog().generation
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use tokio::sync::oneshot;

    use super::*;

    /// In-memory documents, optionally held back until released.
    #[derive(Default)]
    pub(crate) struct ScriptedSource {
        documents: HashMap<String, String>,
        gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    }

    impl ScriptedSource {
        pub(crate) fn with(mut self, locale: &str, xml: &str) -> Self {
            self.documents.insert(locale.to_owned(), xml.to_owned());
            self
        }

        /// Hold the next fetch of `locale` until the returned sender fires.
        pub(crate) fn gate(&self, locale: &str) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(locale.to_owned(), rx);
            tx
        }
    }

    impl ResourceSource for ScriptedSource {
        async fn fetch(&self, locale: &LocaleCode) -> Result<String, LocaleError> {
            let gate = self.gates.lock().unwrap().remove(locale.as_str());
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.documents
                .get(locale.as_str())
                .cloned()
                .ok_or_else(|| LocaleError::ResourceUnavailable {
                    locale: locale.clone(),
                    reason: "no such document".into(),
                })
        }
    }

    pub(crate) const EN: &str = r#"<resources>
        <string id="app_name">Falcon</string>
        <string id="play">Play</string>
    </resources>"#;
    pub(crate) const FA: &str = r#"<resources>
        <string id="app_name">فالکون</string>
        <string id="play">اجرا</string>
    </resources>"#;

    pub(crate) fn code(raw: &str) -> LocaleCode {
        raw.parse().unwrap()
    }
}

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{self, Align, Color32, Layout, Margin, RichText, Stroke};
use log::{error, info, warn};
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;

use crate::backend::events::{BackendEvent, DownloadProgress, spawn_event_listener};
use crate::backend::models::{ModInfo, VersionCategory, VersionLoader};
use crate::backend::{BackendClient, BackendError};
use crate::config::LauncherConfig;
use crate::i18n::{
    self, LocaleCode, LocaleStore, LocaleUpdate, Localizer, Resources, spawn_locale_listener,
};
use crate::storage::Preferences;

mod mods;
mod settings;
mod version_selector;

use self::mods::ModList;
use self::settings::{RAM_STEP_MIB, RamSettings};
use self::version_selector::{VersionSelector, ViewMode};

const ACCENT: Color32 = Color32::from_rgb(92, 219, 195);
const SURFACE: Color32 = Color32::from_rgb(24, 30, 38);
const BORDER: Color32 = Color32::from_rgb(48, 58, 70);
const TEXT_MUTED: Color32 = Color32::from_rgb(167, 182, 197);
const DANGER: Color32 = Color32::from_rgb(239, 117, 117);
const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Home,
    Mods,
    Settings,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Home, Tab::Mods, Tab::Settings];

    fn label_key(self) -> &'static str {
        match self {
            Tab::Home => "home_tab",
            Tab::Mods => "mods_tab",
            Tab::Settings => "settings_tab",
        }
    }
}

struct NewsItem {
    title_key: &'static str,
    body_key: &'static str,
    date_key: &'static str,
}

const NEWS: [NewsItem; 2] = [
    NewsItem {
        title_key: "news_release_title",
        body_key: "news_release_body",
        date_key: "news_release_date",
    },
    NewsItem {
        title_key: "news_mods_title",
        body_key: "news_mods_body",
        date_key: "news_mods_date",
    },
];

#[derive(Debug)]
enum ProfileUpdate {
    Loaded {
        profiles: Vec<String>,
        username: Option<String>,
    },
    Created(String),
    Failed(String),
}

#[derive(Debug)]
enum VersionUpdate {
    Installed(Vec<String>),
    InstalledError(String),
    Categories {
        request: u64,
        result: Result<Vec<VersionCategory>, String>,
    },
    DownloadFinished { id: String, result: Result<(), String> },
}

#[derive(Debug)]
enum ModUpdate {
    Loaded(Vec<ModInfo>),
    LoadError(String),
    ToggleFailed {
        id: String,
        requested: bool,
        err: String,
    },
    Deleted { id: String, result: Result<(), String> },
    InstalledFromLocal(Result<(), String>),
}

#[derive(Debug)]
enum SettingsUpdate {
    TotalRam(u64),
    RamUsage(Option<u64>),
    BackendLanguage(String),
    Saved,
    Failed(String),
}

#[derive(Debug)]
enum LaunchUpdate {
    Launched,
    Failed(String),
}

fn build_runtime() -> Arc<Runtime> {
    match Runtime::new() {
        Ok(rt) => Arc::new(rt),
        Err(err) => {
            warn!(
                "ui: failed to create multithreaded runtime ({}); trying single-threaded runtime",
                err
            );
            match Builder::new_current_thread().enable_all().build() {
                Ok(rt) => Arc::new(rt),
                Err(fallback_err) => {
                    error!(
                        "ui: failed to create any Tokio runtime ({}); terminating launcher",
                        fallback_err
                    );
                    std::process::exit(1);
                }
            }
        }
    }
}

fn apply_theme(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.hyperlink_color = ACCENT;
    visuals.selection.bg_fill = ACCENT.gamma_multiply(0.35);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, BORDER);
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, BORDER);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.5, ACCENT);
    ctx.set_visuals(visuals);
}

fn section_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(SURFACE)
        .stroke(Stroke::new(1.0, BORDER))
        .corner_radius(10u8)
        .inner_margin(Margin::same(12))
}

async fn launch_sequence(
    backend: &BackendClient,
    username: &str,
    version: &str,
) -> Result<(), BackendError> {
    backend.set_username(username).await?;
    backend.save().await?;
    backend.play(version).await
}

pub struct LauncherApp {
    runtime: Arc<Runtime>,
    backend: BackendClient,
    localizer: Arc<Localizer<Resources>>,
    locale_store: LocaleStore,
    available_locales: Vec<LocaleCode>,
    /// A saved or command-line locale; the backend's language is then ignored.
    locale_pinned: bool,
    locale_rx: mpsc::UnboundedReceiver<LocaleUpdate>,
    events_rx: mpsc::UnboundedReceiver<BackendEvent>,
    profile_tx: mpsc::UnboundedSender<ProfileUpdate>,
    profile_rx: mpsc::UnboundedReceiver<ProfileUpdate>,
    version_tx: mpsc::UnboundedSender<VersionUpdate>,
    version_rx: mpsc::UnboundedReceiver<VersionUpdate>,
    mod_tx: mpsc::UnboundedSender<ModUpdate>,
    mod_rx: mpsc::UnboundedReceiver<ModUpdate>,
    settings_tx: mpsc::UnboundedSender<SettingsUpdate>,
    settings_rx: mpsc::UnboundedReceiver<SettingsUpdate>,
    launch_tx: mpsc::UnboundedSender<LaunchUpdate>,
    launch_rx: mpsc::UnboundedReceiver<LaunchUpdate>,
    active_tab: Tab,
    progress: DownloadProgress,
    backend_online: bool,
    profiles: Vec<String>,
    username: String,
    show_create_profile: bool,
    new_profile_name: String,
    installed_versions: Vec<String>,
    versions_loading: bool,
    selected_version: Option<String>,
    show_version_selector: bool,
    selector: VersionSelector,
    mods: ModList,
    ram: RamSettings,
    notice: Option<String>,
}

impl LauncherApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: LauncherConfig) -> Self {
        let runtime = build_runtime();
        apply_theme(&cc.egui_ctx);

        let backend = BackendClient::new(config.backend_url.clone());
        let prefs = Preferences::open_default();
        let locale_pinned =
            config.locale_override.is_some() || prefs.get(i18n::LOCALE_PREF_KEY).is_some();
        let mut locale_store = LocaleStore::restore(prefs, LocaleCode::default());
        let localizer = Arc::new(Localizer::new(
            config.resources,
            locale_store.current().clone(),
        ));

        let (locale_tx, locale_rx) = mpsc::unbounded_channel();
        spawn_locale_listener(
            runtime.handle(),
            Arc::clone(&localizer),
            locale_store.subscribe(),
            locale_tx,
        );
        match config.locale_override {
            Some(locale) => {
                if let Err(err) = locale_store.set(locale) {
                    warn!("ui: could not persist locale override ({err})");
                }
            }
            None => locale_store.request_reload(),
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        spawn_event_listener(runtime.handle(), backend.clone(), events_tx);

        let (profile_tx, profile_rx) = mpsc::unbounded_channel();
        let (version_tx, version_rx) = mpsc::unbounded_channel();
        let (mod_tx, mod_rx) = mpsc::unbounded_channel();
        let (settings_tx, settings_rx) = mpsc::unbounded_channel();
        let (launch_tx, launch_rx) = mpsc::unbounded_channel();

        info!("ui: talking to backend at {}", backend.base_url());

        let mut app = Self {
            runtime,
            backend,
            localizer,
            locale_store,
            available_locales: i18n::bundled_locales(),
            locale_pinned,
            locale_rx,
            events_rx,
            profile_tx,
            profile_rx,
            version_tx,
            version_rx,
            mod_tx,
            mod_rx,
            settings_tx,
            settings_rx,
            launch_tx,
            launch_rx,
            active_tab: Tab::Home,
            progress: DownloadProgress::new(String::new()),
            backend_online: true,
            profiles: Vec::new(),
            username: String::new(),
            show_create_profile: false,
            new_profile_name: String::new(),
            installed_versions: Vec::new(),
            versions_loading: false,
            selected_version: None,
            show_version_selector: false,
            selector: VersionSelector::default(),
            mods: ModList::default(),
            ram: RamSettings::default(),
            notice: None,
        };
        app.start_profile_load();
        app.start_installed_versions_load();
        app.start_mod_load();
        app.start_settings_load();
        if !app.locale_pinned {
            app.start_backend_language_load();
        }
        app
    }

    fn t(&self, key: &str) -> String {
        self.localizer.t(key)
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.runtime.spawn(task);
    }

    fn report_error(&mut self, context_key: &str, err: impl std::fmt::Display) {
        let message = format!("{}: {err}", self.t(context_key));
        error!("ui: {message}");
        self.notice = Some(message);
    }

    // Background work

    fn start_profile_load(&self) {
        let backend = self.backend.clone();
        let tx = self.profile_tx.clone();
        self.spawn(async move {
            let update = match backend.get_profiles().await {
                Ok(profiles) => {
                    let username = match backend.get_username().await {
                        Ok(name) if !name.is_empty() => Some(name),
                        Ok(_) => None,
                        Err(err) => {
                            warn!("ui: could not read current username ({err})");
                            None
                        }
                    };
                    ProfileUpdate::Loaded { profiles, username }
                }
                Err(err) => ProfileUpdate::Failed(err.to_string()),
            };
            let _ = tx.send(update);
        });
    }

    fn start_set_username(&self, username: String) {
        let backend = self.backend.clone();
        let tx = self.profile_tx.clone();
        self.spawn(async move {
            if let Err(err) = backend.set_username(&username).await {
                let _ = tx.send(ProfileUpdate::Failed(err.to_string()));
            }
        });
    }

    fn start_create_profile(&self, username: String) {
        let backend = self.backend.clone();
        let tx = self.profile_tx.clone();
        self.spawn(async move {
            let update = match backend.create_offline_profile(&username).await {
                Ok(()) => ProfileUpdate::Created(username),
                Err(err) => ProfileUpdate::Failed(err.to_string()),
            };
            let _ = tx.send(update);
        });
    }

    fn start_installed_versions_load(&mut self) {
        self.versions_loading = true;
        let backend = self.backend.clone();
        let tx = self.version_tx.clone();
        self.spawn(async move {
            let update = match backend.get_versions().await {
                Ok(versions) => VersionUpdate::Installed(versions),
                Err(err) => VersionUpdate::InstalledError(err.to_string()),
            };
            let _ = tx.send(update);
        });
    }

    fn start_categories_load(&mut self) {
        let (request, filters) = self.selector.begin_load();
        let backend = self.backend.clone();
        let tx = self.version_tx.clone();
        self.spawn(async move {
            let result = backend
                .load_categorized_versions(filters)
                .await
                .map_err(|err| err.to_string());
            let _ = tx.send(VersionUpdate::Categories { request, result });
        });
    }

    fn start_download_version(&mut self, loader: VersionLoader) {
        info!("ui: installing {} ({})", loader.id, loader.base.label());
        self.progress.start();
        let backend = self.backend.clone();
        let tx = self.version_tx.clone();
        self.spawn(async move {
            let result = backend
                .download_version(&loader)
                .await
                .map_err(|err| err.to_string());
            let _ = tx.send(VersionUpdate::DownloadFinished {
                id: loader.id,
                result,
            });
        });
    }

    fn start_mod_load(&mut self) {
        if !self.mods.begin_load() {
            return;
        }
        let backend = self.backend.clone();
        let tx = self.mod_tx.clone();
        self.spawn(async move {
            let update = match backend.get_mods().await {
                Ok(mods) => ModUpdate::Loaded(mods),
                Err(err) => ModUpdate::LoadError(err.to_string()),
            };
            let _ = tx.send(update);
        });
    }

    fn start_toggle_mod(&mut self, id: &str, enabled: bool) {
        let Some(entry) = self.mods.set_enabled(id, enabled) else {
            return;
        };
        let backend = self.backend.clone();
        let tx = self.mod_tx.clone();
        self.spawn(async move {
            if let Err(err) = backend.toggle_mod(&entry, enabled).await {
                let _ = tx.send(ModUpdate::ToggleFailed {
                    id: entry.id,
                    requested: enabled,
                    err: err.to_string(),
                });
            }
        });
    }

    fn start_delete_mod(&mut self, id: &str) {
        let Some(entry) = self.mods.begin_delete(id) else {
            return;
        };
        let backend = self.backend.clone();
        let tx = self.mod_tx.clone();
        self.spawn(async move {
            let result = backend
                .delete_mod(&entry)
                .await
                .map_err(|err| err.to_string());
            let _ = tx.send(ModUpdate::Deleted {
                id: entry.id,
                result,
            });
        });
    }

    fn start_install_mod_from_local(&self) {
        let backend = self.backend.clone();
        let tx = self.mod_tx.clone();
        self.spawn(async move {
            let result = backend
                .install_mod_from_local()
                .await
                .map_err(|err| err.to_string());
            let _ = tx.send(ModUpdate::InstalledFromLocal(result));
        });
    }

    fn start_settings_load(&self) {
        let backend = self.backend.clone();
        let tx = self.settings_tx.clone();
        self.spawn(async move {
            let total = backend.get_total_ram().await;
            let usage = backend.get_ram_usage().await;
            let _ = tx.send(match total {
                Ok(total) => SettingsUpdate::TotalRam(total),
                Err(err) => SettingsUpdate::Failed(err.to_string()),
            });
            let _ = tx.send(match usage {
                Ok(usage) => SettingsUpdate::RamUsage(usage),
                Err(err) => SettingsUpdate::Failed(err.to_string()),
            });
        });
    }

    fn start_backend_language_load(&self) {
        let backend = self.backend.clone();
        let tx = self.settings_tx.clone();
        self.spawn(async move {
            match backend.get_language().await {
                Ok(language) => {
                    let _ = tx.send(SettingsUpdate::BackendLanguage(language));
                }
                Err(err) => warn!("ui: could not read backend language ({err})"),
            }
        });
    }

    fn start_set_ram_usage(&self) {
        let usage = self.ram.usage();
        let backend = self.backend.clone();
        let tx = self.settings_tx.clone();
        self.spawn(async move {
            if let Err(err) = backend.set_ram_usage(usage).await {
                let _ = tx.send(SettingsUpdate::Failed(err.to_string()));
            }
        });
    }

    fn start_save_settings(&self) {
        let usage = self.ram.usage();
        let backend = self.backend.clone();
        let tx = self.settings_tx.clone();
        self.spawn(async move {
            let result: Result<(), BackendError> = async {
                backend.set_ram_usage(usage).await?;
                backend.save().await
            }
            .await;
            let _ = tx.send(match result {
                Ok(()) => SettingsUpdate::Saved,
                Err(err) => SettingsUpdate::Failed(err.to_string()),
            });
        });
    }

    fn start_sync_backend_language(&self, locale: &LocaleCode) {
        let language = locale.as_str().to_owned();
        let backend = self.backend.clone();
        let tx = self.settings_tx.clone();
        self.spawn(async move {
            if let Err(err) = backend.set_language(&language).await {
                let _ = tx.send(SettingsUpdate::Failed(err.to_string()));
            }
        });
    }

    fn start_play(&mut self) {
        if self.progress.downloading {
            return;
        }
        let Some(version) = self
            .selected_version
            .clone()
            .or_else(|| self.installed_versions.first().cloned())
        else {
            self.report_error("play_failed", self.t("no_version_selected"));
            return;
        };
        if self.username.trim().is_empty() {
            self.report_error("play_failed", self.t("no_profile_selected"));
            return;
        }
        info!("ui: launching {version} as {}", self.username);
        self.selected_version = Some(version.clone());
        self.notice = None;
        self.progress.start();

        let username = self.username.clone();
        let backend = self.backend.clone();
        let tx = self.launch_tx.clone();
        self.spawn(async move {
            let update = match launch_sequence(&backend, &username, &version).await {
                Ok(()) => LaunchUpdate::Launched,
                Err(err) => LaunchUpdate::Failed(err.to_string()),
            };
            let _ = tx.send(update);
        });
    }

    /// Follow the backend's language on first run, before the user picked one.
    fn adopt_backend_language(&mut self, language: &str) {
        if self.locale_pinned {
            return;
        }
        match language.parse::<LocaleCode>() {
            Ok(locale)
                if self.available_locales.contains(&locale)
                    && locale != *self.locale_store.current() =>
            {
                info!("ui: adopting backend language {locale}");
                self.change_locale(locale);
            }
            Ok(_) => {}
            Err(err) => warn!("ui: backend reported an unusable language ({err})"),
        }
    }

    fn change_locale(&mut self, locale: LocaleCode) {
        self.locale_pinned = true;
        if let Err(err) = self.locale_store.set(locale) {
            self.report_error("locale_save_failed", err);
        }
    }

    // Channel draining, once per frame

    fn sync_locale_updates(&mut self) {
        while let Ok(update) = self.locale_rx.try_recv() {
            match update {
                LocaleUpdate::Installed(locale) => {
                    info!(
                        "ui: interface language is now {locale} (load #{})",
                        self.localizer.generation()
                    );
                    if self.locale_pinned {
                        self.start_sync_backend_language(&locale);
                    }
                }
                LocaleUpdate::Failed(err) => {
                    self.revert_failed_locale(err.locale());
                    self.report_error("locale_load_failed", err);
                }
            }
        }
    }

    /// Point the selection back at what is actually shown. Before any table
    /// has loaded that is nothing, so fall back to the default locale and load it.
    fn revert_failed_locale(&mut self, failed: &LocaleCode) {
        let nothing_loaded = self.localizer.generation() == 0;
        let fallback = if nothing_loaded {
            LocaleCode::default()
        } else {
            self.localizer.locale()
        };
        warn!("ui: {failed} unavailable, keeping {fallback}");
        match self.locale_store.revert(failed, fallback.clone()) {
            Ok(true) if nothing_loaded && fallback != *failed => {
                self.locale_store.request_reload();
            }
            Ok(_) => {}
            Err(err) => self.report_error("locale_save_failed", err),
        }
    }

    fn sync_backend_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            if let BackendEvent::Disconnected(reason) = &event {
                self.backend_online = false;
                warn!("ui: backend events unavailable ({reason})");
            }
            self.progress.apply(&event);
        }
    }

    fn sync_profile_updates(&mut self) {
        while let Ok(update) = self.profile_rx.try_recv() {
            match update {
                ProfileUpdate::Loaded { profiles, username } => {
                    self.profiles = profiles;
                    if let Some(name) = username {
                        self.username = name;
                    }
                }
                ProfileUpdate::Created(name) => {
                    if !self.profiles.contains(&name) {
                        self.profiles.push(name.clone());
                    }
                    self.username = name.clone();
                    self.start_set_username(name);
                }
                ProfileUpdate::Failed(err) => self.report_error("profile_failed", err),
            }
        }
    }

    fn sync_version_updates(&mut self) {
        while let Ok(update) = self.version_rx.try_recv() {
            match update {
                VersionUpdate::Installed(versions) => {
                    self.versions_loading = false;
                    let still_installed = self
                        .selected_version
                        .as_ref()
                        .is_some_and(|v| versions.contains(v));
                    if !still_installed {
                        self.selected_version = versions.first().cloned();
                    }
                    self.installed_versions = versions;
                }
                VersionUpdate::InstalledError(err) => {
                    self.versions_loading = false;
                    self.report_error("versions_failed", err);
                }
                VersionUpdate::Categories { request, result } => {
                    let failure = result.as_ref().err().cloned();
                    if self.selector.finish_load(request, result)
                        && let Some(err) = failure
                    {
                        self.report_error("versions_failed", err);
                    }
                }
                VersionUpdate::DownloadFinished { id, result } => {
                    self.progress.stop();
                    match result {
                        Ok(()) => {
                            info!("ui: installed {id}");
                            self.start_installed_versions_load();
                        }
                        Err(err) => self.report_error("install_failed", err),
                    }
                }
            }
        }
    }

    fn sync_mod_updates(&mut self) {
        while let Ok(update) = self.mod_rx.try_recv() {
            match update {
                ModUpdate::Loaded(mods) => self.mods.replace(mods),
                ModUpdate::LoadError(err) => {
                    self.mods.load_failed(err.clone());
                    self.report_error("mods_failed", err);
                }
                ModUpdate::ToggleFailed { id, requested, err } => {
                    self.mods.toggle_failed(&id, requested, err.clone());
                    self.report_error("mods_failed", err);
                }
                ModUpdate::Deleted { id, result } => {
                    if let Err(err) = &result {
                        self.report_error("mods_failed", err);
                    }
                    self.mods.delete_finished(&id, result);
                }
                ModUpdate::InstalledFromLocal(result) => match result {
                    Ok(()) => self.start_mod_load(),
                    Err(err) => self.report_error("mods_failed", err),
                },
            }
        }
    }

    fn sync_settings_updates(&mut self) {
        while let Ok(update) = self.settings_rx.try_recv() {
            match update {
                SettingsUpdate::TotalRam(total) => self.ram.set_total(total),
                SettingsUpdate::RamUsage(Some(usage)) => self.ram.set_usage(usage),
                SettingsUpdate::RamUsage(None) => {}
                SettingsUpdate::BackendLanguage(language) => self.adopt_backend_language(&language),
                SettingsUpdate::Saved => self.notice = Some(self.t("settings_saved")),
                SettingsUpdate::Failed(err) => self.report_error("settings_failed", err),
            }
        }
    }

    fn sync_launch_updates(&mut self) {
        while let Ok(update) = self.launch_rx.try_recv() {
            self.progress.stop();
            match update {
                LaunchUpdate::Launched => info!("ui: game started"),
                LaunchUpdate::Failed(err) => self.report_error("play_failed", err),
            }
        }
    }

    // Rendering

    fn render_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(RichText::new(self.t("app_name")).color(ACCENT).strong());
            ui.label(RichText::new(concat!("v", env!("CARGO_PKG_VERSION"))).color(TEXT_MUTED).small());
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let current = self.locale_store.current().clone();
                let toggle = ui
                    .button(current.as_str().to_uppercase())
                    .on_hover_text(self.t("switch_language"));
                if toggle.clicked()
                    && let Some(next) = current.next_in(&self.available_locales)
                {
                    self.change_locale(next);
                }
                if !self.backend_online {
                    ui.label(RichText::new(self.t("backend_offline")).color(DANGER));
                }
            });
        });
    }

    fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.add_space(8.0);
        ui.label(RichText::new(self.t("select_profile")).color(TEXT_MUTED));
        let selected_text = if self.username.is_empty() {
            self.t("select_profile")
        } else {
            self.username.clone()
        };
        let mut chosen = None;
        egui::ComboBox::from_id_salt("profile_picker")
            .selected_text(selected_text)
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                for profile in &self.profiles {
                    if ui
                        .selectable_label(*profile == self.username, profile.as_str())
                        .clicked()
                    {
                        chosen = Some(profile.clone());
                    }
                }
            });
        if let Some(profile) = chosen {
            self.username = profile.clone();
            self.start_set_username(profile);
        }
        if ui.button(self.t("create_profile")).clicked() {
            self.show_create_profile = true;
        }

        ui.separator();
        ui.label(RichText::new(self.t("game_version")).color(TEXT_MUTED));
        let version_text = if self.versions_loading {
            self.t("loading")
        } else {
            self.selected_version
                .clone()
                .unwrap_or_else(|| self.t("no_versions_installed"))
        };
        let mut picked = None;
        egui::ComboBox::from_id_salt("version_picker")
            .selected_text(version_text)
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                for version in &self.installed_versions {
                    let selected = self.selected_version.as_ref() == Some(version);
                    if ui.selectable_label(selected, version.as_str()).clicked() {
                        picked = Some(version.clone());
                    }
                }
            });
        if picked.is_some() {
            self.selected_version = picked;
        }
        if ui.button(self.t("install_new_version")).clicked() {
            self.show_version_selector = true;
            if !self.selector.loading {
                self.start_categories_load();
            }
        }

        ui.separator();
        for tab in Tab::ALL {
            let label = self.t(tab.label_key());
            if ui
                .add_sized(
                    [ui.available_width(), 28.0],
                    egui::Button::new(label).selected(self.active_tab == tab),
                )
                .clicked()
            {
                self.active_tab = tab;
            }
        }

        ui.with_layout(Layout::bottom_up(Align::Min), |ui| {
            ui.add_space(8.0);
            let status = if self.progress.status.is_empty() {
                self.t("ready_to_play")
            } else {
                self.progress.status.clone()
            };
            ui.label(RichText::new(status).color(TEXT_MUTED).small());
            if self.progress.downloading {
                ui.add(
                    egui::ProgressBar::new(self.progress.fraction())
                        .show_percentage()
                        .desired_width(ui.available_width()),
                );
            }
            let label = if self.progress.downloading {
                self.t("downloading")
            } else {
                self.t("play")
            };
            let play = egui::Button::new(RichText::new(label).strong().size(18.0)).fill(ACCENT.gamma_multiply(0.6));
            if ui
                .add_enabled_ui(!self.progress.downloading, |ui| {
                    ui.add_sized([ui.available_width(), 40.0], play)
                })
                .inner
                .clicked()
            {
                self.start_play();
            }
        });
    }

    fn render_home(&self, ui: &mut egui::Ui) {
        ui.heading(self.t("minecraft_news"));
        ui.add_space(8.0);
        if self.localizer.with_table(|table| table.is_empty()) {
            ui.spinner();
            return;
        }
        let translated = NEWS
            .iter()
            .filter(|item| self.localizer.with_table(|table| table.contains(item.title_key)));
        for item in translated {
            section_frame().show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(self.t(item.title_key)).strong().size(16.0));
                ui.label(self.t(item.body_key));
                ui.label(RichText::new(self.t(item.date_key)).color(TEXT_MUTED).small());
            });
            ui.add_space(8.0);
        }
    }

    fn render_mods(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(format!("{} ({})", self.t("mod_manager"), self.mods.len()));
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button(self.t("install_mod")).on_hover_text(self.t("select_mod_file")).clicked() {
                    self.start_install_mod_from_local();
                }
                if ui.button(self.t("refresh")).clicked() {
                    self.start_mod_load();
                }
            });
        });
        let hint = self.t("mod_search");
        ui.add(
            egui::TextEdit::singleline(&mut self.mods.query)
                .hint_text(hint)
                .desired_width(f32::INFINITY),
        );
        ui.add_space(6.0);

        if self.mods.loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(self.t("loading"));
            });
            return;
        }
        if let Some(err) = &self.mods.error {
            ui.label(RichText::new(err.as_str()).color(DANGER));
        }

        let visible: Vec<ModInfo> = self.mods.visible().into_iter().cloned().collect();
        if visible.is_empty() {
            ui.label(RichText::new(self.t("no_mods_found")).color(TEXT_MUTED));
            return;
        }
        let deleting = self.mods.deleting().map(str::to_owned);
        let delete_label = self.t("delete");
        let mut toggled = None;
        let mut removed = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for entry in &visible {
                section_frame().show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        let mut enabled = entry.enabled;
                        if ui.checkbox(&mut enabled, "").changed() {
                            toggled = Some((entry.id.clone(), enabled));
                        }
                        ui.vertical(|ui| {
                            ui.label(RichText::new(entry.name.as_str()).strong());
                            if let Some(description) = &entry.description {
                                ui.label(RichText::new(description.as_str()).color(TEXT_MUTED));
                            }
                            if let Some(version) = &entry.version {
                                ui.label(RichText::new(version.as_str()).small().color(TEXT_MUTED));
                            }
                        });
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            let busy = deleting.as_deref() == Some(entry.id.as_str());
                            if busy {
                                ui.spinner();
                            } else if ui
                                .add_enabled(deleting.is_none(), egui::Button::new(delete_label.as_str()))
                                .clicked()
                            {
                                removed = Some(entry.id.clone());
                            }
                        });
                    });
                });
                ui.add_space(4.0);
            }
        });
        if let Some((id, enabled)) = toggled {
            self.start_toggle_mod(&id, enabled);
        }
        if let Some(id) = removed {
            self.start_delete_mod(&id);
        }
    }

    fn render_settings(&mut self, ui: &mut egui::Ui) {
        ui.heading(self.t("settings_tab"));
        ui.add_space(8.0);
        section_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(self.t("mem_alloc_title")).strong());
            ui.label(RichText::new(self.t("mem_alloc_description")).color(TEXT_MUTED));
            ui.horizontal(|ui| {
                let mut usage = self.ram.usage();
                let slider = ui.add(
                    egui::Slider::new(&mut usage, self.ram.range())
                        .step_by(RAM_STEP_MIB as f64)
                        .show_value(false),
                );
                if slider.changed() {
                    self.ram.set_usage(usage);
                }
                if slider.drag_stopped() {
                    self.start_set_ram_usage();
                }
                ui.label(RichText::new(self.ram.label()).color(ACCENT));
            });
        });
        ui.add_space(8.0);
        section_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(self.t("language")).strong());
            let current = self.locale_store.current().clone();
            let mut picked = None;
            egui::ComboBox::from_id_salt("language_picker")
                .selected_text(current.as_str())
                .show_ui(ui, |ui| {
                    for locale in &self.available_locales {
                        if ui.selectable_label(*locale == current, locale.as_str()).clicked() {
                            picked = Some(locale.clone());
                        }
                    }
                });
            if let Some(locale) = picked
                && locale != current
            {
                self.change_locale(locale);
            }
        });
        ui.add_space(12.0);
        if ui.button(self.t("save_settings")).clicked() {
            self.start_save_settings();
        }
    }

    fn render_create_profile(&mut self, ctx: &egui::Context) {
        if !self.show_create_profile {
            return;
        }
        let mut open = true;
        let mut submitted = false;
        let hint = self.t("username");
        let login = self.t("login");
        egui::Window::new(self.t("create_profile"))
            .id(egui::Id::new("create_profile_window"))
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                let field = ui.add(egui::TextEdit::singleline(&mut self.new_profile_name).hint_text(hint));
                let enter = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button(login).clicked() || enter {
                    submitted = true;
                }
            });
        if submitted {
            let name = self.new_profile_name.trim().to_owned();
            if !name.is_empty() {
                self.start_create_profile(name);
                self.new_profile_name.clear();
                self.show_create_profile = false;
            }
        }
        if !open {
            self.show_create_profile = false;
        }
    }

    fn render_version_selector(&mut self, ctx: &egui::Context) {
        if !self.show_version_selector {
            return;
        }
        let mut open = true;
        let mut install = None;
        egui::Window::new(self.t("version_installer_title"))
            .id(egui::Id::new("version_selector_window"))
            .open(&mut open)
            .default_size([720.0, 420.0])
            .collapsible(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let major = self.selector.active_major().unwrap_or("-").to_owned();
                    ui.heading(format!("{} {major}", self.t("minecraft_version")));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let list = self.t("list_view");
                        let grid = self.t("grid_view");
                        ui.selectable_value(&mut self.selector.view_mode, ViewMode::List, list);
                        ui.selectable_value(&mut self.selector.view_mode, ViewMode::Grid, grid);
                    });
                });
                ui.separator();
                ui.columns(3, |columns| {
                    self.render_loader_filters(&mut columns[0]);
                    self.render_builds(&mut columns[1]);
                    self.render_majors(&mut columns[2]);
                });
                ui.separator();
                ui.horizontal(|ui| {
                    let selected = self
                        .selector
                        .selected_build()
                        .map(|v| format!("{} ({})", v.id, v.base.label()))
                        .unwrap_or_default();
                    ui.label(RichText::new(selected).color(TEXT_MUTED));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let request = self.selector.install_request();
                        let enabled = request.is_some() && !self.progress.downloading;
                        if ui
                            .add_enabled(enabled, egui::Button::new(self.t("install_selected")))
                            .clicked()
                        {
                            install = request;
                        }
                    });
                });
            });
        if let Some(loader) = install {
            self.start_download_version(loader);
            self.show_version_selector = false;
        }
        if !open {
            self.show_version_selector = false;
        }
    }

    fn render_loader_filters(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new(self.t("mod_loaders")).strong());
        let before = self.selector.filters;
        let labels = [
            self.t("install_forge"),
            self.t("install_fabric"),
            self.t("install_neoforge"),
            self.t("install_liteloader"),
        ];
        let filters = &mut self.selector.filters;
        let [forge, fabric, neo_forge, lite_loader] = labels;
        ui.checkbox(&mut filters.forge, forge);
        ui.checkbox(&mut filters.fabric, fabric);
        ui.checkbox(&mut filters.neo_forge, neo_forge);
        ui.checkbox(&mut filters.lite_loader, lite_loader);
        if self.selector.filters != before {
            self.start_categories_load();
        }
    }

    fn render_builds(&mut self, ui: &mut egui::Ui) {
        if self.selector.loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(self.t("loading_versions"));
            });
            return;
        }
        if let Some(err) = &self.selector.error {
            ui.label(RichText::new(err.as_str()).color(DANGER));
            return;
        }
        if self.selector.builds().is_empty() {
            ui.label(RichText::new(self.t("no_versions_found")).color(TEXT_MUTED));
            return;
        }
        let selected = self.selector.selected_build().map(|v| v.id.clone());
        let mut picked = None;
        egui::ScrollArea::vertical()
            .id_salt("version_builds")
            .show(ui, |ui| {
                let builds = self.selector.builds();
                match self.selector.view_mode {
                    ViewMode::Grid => {
                        ui.horizontal_wrapped(|ui| {
                            for build in builds {
                                let mark = if build.is_installed { " ✔" } else { "" };
                                let text = format!("{}{mark}\n{}", build.id, build.date);
                                let active = selected.as_deref() == Some(build.id.as_str());
                                if ui
                                    .add_sized([110.0, 48.0], egui::Button::new(text).selected(active))
                                    .clicked()
                                {
                                    picked = Some(build.id.clone());
                                }
                            }
                        });
                    }
                    ViewMode::List => {
                        for build in builds {
                            let mark = if build.is_installed { " ✔" } else { "" };
                            let text = format!(
                                "{}{mark}  ·  {}  ·  {}",
                                build.id,
                                build.base.label(),
                                build.date
                            );
                            let active = selected.as_deref() == Some(build.id.as_str());
                            if ui.selectable_label(active, text).clicked() {
                                picked = Some(build.id.clone());
                            }
                        }
                    }
                }
            });
        if let Some(id) = picked {
            self.selector.select_build(&id);
        }
    }

    fn render_majors(&mut self, ui: &mut egui::Ui) {
        let active = self.selector.active_major().map(str::to_owned);
        let majors: Vec<String> = self.selector.majors().map(str::to_owned).collect();
        let mut picked = None;
        egui::ScrollArea::vertical()
            .id_salt("version_majors")
            .show(ui, |ui| {
                for major in &majors {
                    if ui
                        .selectable_label(active.as_ref() == Some(major), major.as_str())
                        .clicked()
                    {
                        picked = Some(major.clone());
                    }
                }
            });
        if let Some(major) = picked {
            self.selector.select_major(&major);
        }
    }
}

impl eframe::App for LauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_locale_updates();
        self.sync_backend_events();
        self.sync_profile_updates();
        self.sync_version_updates();
        self.sync_mod_updates();
        self.sync_settings_updates();
        self.sync_launch_updates();

        egui::TopBottomPanel::top("header")
            .frame(
                egui::Frame::new()
                    .fill(SURFACE)
                    .stroke(Stroke::new(1.0, BORDER))
                    .inner_margin(Margin::symmetric(16, 10)),
            )
            .show(ctx, |ui| self.render_header(ui));

        if let Some(notice) = self.notice.clone() {
            egui::TopBottomPanel::bottom("notice").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(notice).color(DANGER));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui.small_button("✕").clicked() {
                            self.notice = None;
                        }
                    });
                });
            });
        }

        egui::SidePanel::left("sidebar")
            .resizable(false)
            .exact_width(240.0)
            .show(ctx, |ui| self.render_sidebar(ui));

        egui::CentralPanel::default().show(ctx, |ui| match self.active_tab {
            Tab::Home => self.render_home(ui),
            Tab::Mods => self.render_mods(ui),
            Tab::Settings => self.render_settings(ui),
        });

        self.render_create_profile(ctx);
        self.render_version_selector(ctx);

        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}

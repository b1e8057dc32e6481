use log::debug;

use crate::backend::models::{MinecraftVersion, VersionCategory, VersionFilters, VersionLoader};

/// Major version opened first when the listing contains it.
pub const DEFAULT_MAJOR: &str = "1.21";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Grid,
    List,
}

/// State of the "install new version" dialog: loader filters, the
/// categorized listing they produce, and a two-level pick of major version
/// then build.
#[derive(Debug, Clone)]
pub struct VersionSelector {
    pub filters: VersionFilters,
    pub view_mode: ViewMode,
    pub loading: bool,
    pub error: Option<String>,
    categories: Vec<VersionCategory>,
    active_major: Option<String>,
    selected: Option<String>,
    latest_request: u64,
}

impl Default for VersionSelector {
    fn default() -> Self {
        Self {
            filters: VersionFilters::default(),
            view_mode: ViewMode::Grid,
            loading: false,
            error: None,
            categories: Vec::new(),
            active_major: None,
            selected: None,
            latest_request: 0,
        }
    }
}

impl VersionSelector {
    /// Mark a listing request as in flight and return its number together
    /// with the filters to send.
    pub fn begin_load(&mut self) -> (u64, VersionFilters) {
        self.loading = true;
        self.error = None;
        self.latest_request += 1;
        (self.latest_request, self.filters)
    }

    /// Apply the reply to request `request`. Replies to anything but the most
    /// recent request are dropped; returns whether this one was applied.
    pub fn finish_load(
        &mut self,
        request: u64,
        result: Result<Vec<VersionCategory>, String>,
    ) -> bool {
        if request != self.latest_request {
            debug!(
                "version selector: dropping reply #{request}, waiting for #{}",
                self.latest_request
            );
            return false;
        }
        match result {
            Ok(categories) => self.apply_categories(categories),
            Err(err) => self.load_failed(err),
        }
        true
    }

    pub fn load_failed(&mut self, err: String) {
        self.loading = false;
        self.error = Some(err);
    }

    /// Replace the listing. The open major survives when it still exists;
    /// otherwise [`DEFAULT_MAJOR`] or the first category is opened.
    pub fn apply_categories(&mut self, categories: Vec<VersionCategory>) {
        self.loading = false;
        self.error = None;
        self.categories = categories;

        let keep = self
            .active_major
            .as_deref()
            .is_some_and(|name| self.category(name).is_some());
        if !keep {
            self.active_major = if self.category(DEFAULT_MAJOR).is_some() {
                Some(DEFAULT_MAJOR.to_owned())
            } else {
                self.categories.first().map(|c| c.name.clone())
            };
        }

        let selection_valid = self
            .selected
            .as_deref()
            .is_some_and(|id| self.builds().iter().any(|v| v.id == id));
        if !selection_valid {
            self.selected = self.builds().first().map(|v| v.id.clone());
        }
    }

    pub fn majors(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn active_major(&self) -> Option<&str> {
        self.active_major.as_deref()
    }

    /// Builds of the open major version.
    pub fn builds(&self) -> &[MinecraftVersion] {
        self.active_major
            .as_deref()
            .and_then(|name| self.category(name))
            .map(|c| c.versions.as_slice())
            .unwrap_or(&[])
    }

    /// Open `name` and preselect its first build. Unknown names are ignored.
    pub fn select_major(&mut self, name: &str) {
        if self.category(name).is_none() || self.active_major.as_deref() == Some(name) {
            return;
        }
        self.active_major = Some(name.to_owned());
        self.selected = self.builds().first().map(|v| v.id.clone());
    }

    pub fn select_build(&mut self, id: &str) {
        if self.builds().iter().any(|v| v.id == id) {
            self.selected = Some(id.to_owned());
        }
    }

    pub fn selected_build(&self) -> Option<&MinecraftVersion> {
        let id = self.selected.as_deref()?;
        self.builds().iter().find(|v| v.id == id)
    }

    /// What "install selected" should download, if anything is picked.
    pub fn install_request(&self) -> Option<VersionLoader> {
        self.selected_build().map(VersionLoader::from)
    }

    fn category(&self, name: &str) -> Option<&VersionCategory> {
        self.categories.iter().find(|c| c.name == name)
    }
}

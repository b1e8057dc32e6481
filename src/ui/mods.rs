use crate::backend::models::ModInfo;

/// Mods tab state.
///
/// Toggles are applied locally first and rolled back if the backend rejects
/// them; deletions only take effect once the backend confirms.
#[derive(Debug, Default, Clone)]
pub struct ModList {
    pub query: String,
    pub loading: bool,
    pub error: Option<String>,
    mods: Vec<ModInfo>,
    deleting: Option<String>,
}

impl ModList {
    pub fn begin_load(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        self.error = None;
        true
    }

    pub fn replace(&mut self, mods: Vec<ModInfo>) {
        self.loading = false;
        self.error = None;
        self.mods = mods;
    }

    pub fn load_failed(&mut self, err: String) {
        self.loading = false;
        self.error = Some(err);
    }

    /// Mods whose name contains the search query, ignoring case.
    pub fn visible(&self) -> Vec<&ModInfo> {
        let needle = self.query.trim().to_lowercase();
        self.mods
            .iter()
            .filter(|m| needle.is_empty() || m.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    /// Flip `id` to `enabled` and return the updated entry to send.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Option<ModInfo> {
        let entry = self.mods.iter_mut().find(|m| m.id == id)?;
        entry.enabled = enabled;
        Some(entry.clone())
    }

    /// Undo a toggle the backend refused.
    pub fn toggle_failed(&mut self, id: &str, requested: bool, err: String) {
        if let Some(entry) = self.mods.iter_mut().find(|m| m.id == id) {
            entry.enabled = !requested;
        }
        self.error = Some(err);
    }

    /// Start deleting `id`; returns the entry to send, or `None` if another
    /// deletion is still running.
    pub fn begin_delete(&mut self, id: &str) -> Option<ModInfo> {
        if self.deleting.is_some() {
            return None;
        }
        let entry = self.mods.iter().find(|m| m.id == id)?.clone();
        self.deleting = Some(id.to_owned());
        Some(entry)
    }

    pub fn deleting(&self) -> Option<&str> {
        self.deleting.as_deref()
    }

    pub fn delete_finished(&mut self, id: &str, result: Result<(), String>) {
        self.deleting = None;
        match result {
            Ok(()) => {
                self.mods.retain(|m| m.id != id);
                self.error = None;
            }
            Err(err) => self.error = Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(id: &str, name: &str, enabled: bool) -> ModInfo {
        ModInfo {
            id: id.to_owned(),
            name: name.to_owned(),
            file_path: format!("/mods/{id}.jar"),
            enabled,
            description: None,
            version: None,
        }
    }

    fn list() -> ModList {
        let mut list = ModList::default();
        list.replace(vec![
            info("sodium", "Sodium", true),
            info("lithium", "Lithium", true),
            info("iris", "Iris Shaders", false),
        ]);
        list
    }

    #[test]
    fn filters_by_name_case_insensitively() {
        let mut list = list();
        assert_eq!(list.visible().len(), 3);

        list.query = "  IUM ".into();
        let names: Vec<&str> = list.visible().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Sodium", "Lithium"]);

        list.query = "optifine".into();
        assert!(list.visible().is_empty());
    }

    #[test]
    fn toggle_is_optimistic_and_reverts_on_failure() {
        let mut list = list();

        let sent = list.set_enabled("iris", true).unwrap();
        assert!(sent.enabled);
        assert!(list.visible()[2].enabled);

        list.toggle_failed("iris", true, "locked".into());
        assert!(!list.visible()[2].enabled);
        assert_eq!(list.error.as_deref(), Some("locked"));

        assert_eq!(list.set_enabled("missing", true), None);
    }

    #[test]
    fn delete_waits_for_confirmation() {
        let mut list = list();

        let sent = list.begin_delete("lithium").unwrap();
        assert_eq!(sent.file_path, "/mods/lithium.jar");
        assert_eq!(list.deleting(), Some("lithium"));
        assert_eq!(list.begin_delete("sodium"), None);
        assert_eq!(list.len(), 3);

        list.delete_finished("lithium", Err("in use".into()));
        assert_eq!(list.len(), 3);
        assert_eq!(list.error.as_deref(), Some("in use"));

        list.begin_delete("lithium").unwrap();
        list.delete_finished("lithium", Ok(()));
        assert_eq!(list.len(), 2);
        assert_eq!(list.deleting(), None);
        assert_eq!(list.error, None);
    }

    #[test]
    fn only_one_load_in_flight() {
        let mut list = ModList::default();
        assert!(list.begin_load());
        assert!(!list.begin_load());
        list.load_failed("offline".into());
        assert!(list.begin_load());
    }
}

use serde::{Deserialize, Serialize};

/// A mod file known to the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModInfo {
    pub id: String,
    pub name: String,
    pub file_path: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionBase {
    Fabric,
    Forge,
    NeoForge,
    LiteLoader,
    Vanilla,
}

impl VersionBase {
    pub fn label(self) -> &'static str {
        match self {
            VersionBase::Fabric => "Fabric",
            VersionBase::Forge => "Forge",
            VersionBase::NeoForge => "NeoForge",
            VersionBase::LiteLoader => "LiteLoader",
            VersionBase::Vanilla => "Vanilla",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinecraftVersion {
    pub id: String,
    #[serde(default)]
    pub is_installed: bool,
    pub base: VersionBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherited_version: Option<String>,
    #[serde(default)]
    pub date: String,
}

/// Builds grouped under one major version, e.g. `1.21`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionCategory {
    pub name: String,
    pub versions: Vec<MinecraftVersion>,
}

/// Mod loaders whose builds are included in the categorized listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionFilters {
    pub forge: bool,
    pub fabric: bool,
    pub neo_forge: bool,
    pub lite_loader: bool,
}

/// The build handed to `download_version`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionLoader {
    pub id: String,
    pub date: String,
    pub base: VersionBase,
}

impl From<&MinecraftVersion> for VersionLoader {
    fn from(version: &MinecraftVersion) -> Self {
        Self {
            id: version.id.clone(),
            date: version.date.clone(),
            base: version.base,
        }
    }
}

/// Error body returned by a failing command.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CommandError {
    pub code: i64,
    pub message: String,
}

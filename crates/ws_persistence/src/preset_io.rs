use std::fs;
use std::path::{Path, PathBuf};

use bevy::log::warn;
use serde::{Deserialize, Serialize};
use ws_world::GenerationPreset;

/// Default directory for saved generation presets.
pub const PRESETS_DIR: &str = "assets/presets";

/// Error type for preset I/O operations.
#[derive(Debug)]
pub enum PresetIoError {
    Io(std::io::Error),
    Ron(ron::Error),
    RonSpanned(ron::error::SpannedError),
    /// No saved preset with the given name.
    NotFound(String),
}

impl From<std::io::Error> for PresetIoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ron::Error> for PresetIoError {
    fn from(err: ron::Error) -> Self {
        Self::Ron(err)
    }
}

impl From<ron::error::SpannedError> for PresetIoError {
    fn from(err: ron::error::SpannedError) -> Self {
        Self::RonSpanned(err)
    }
}

impl std::fmt::Display for PresetIoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Ron(e) => write!(f, "RON serialization error: {}", e),
            Self::RonSpanned(e) => write!(f, "RON parse error: {}", e),
            Self::NotFound(name) => write!(f, "no preset named '{}'", name),
        }
    }
}

impl std::error::Error for PresetIoError {}

/// On-disk form of a preset: the display name as typed by the user,
/// since the filename is lossy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPreset {
    pub name: String,
    pub preset: GenerationPreset,
}

/// Saved-preset store rooted at one directory.
#[derive(bevy::prelude::Resource)]
pub struct PresetStore {
    dir: PathBuf,
}

impl Default for PresetStore {
    fn default() -> Self {
        Self::new(PRESETS_DIR)
    }
}

impl PresetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path for a preset name.
    pub fn preset_path(&self, name: &str) -> PathBuf {
        self.dir.join(preset_filename(name))
    }

    /// Save a preset under a name, overwriting any preset already
    /// saved under the same name.
    pub fn save(&self, name: &str, preset: &GenerationPreset) -> Result<(), PresetIoError> {
        fs::create_dir_all(&self.dir)?;

        let pretty_config = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true);

        let saved = SavedPreset {
            name: name.to_string(),
            preset: preset.clone(),
        };
        let ron_string = ron::ser::to_string_pretty(&saved, pretty_config)?;
        fs::write(self.preset_path(name), ron_string)?;
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<GenerationPreset, PresetIoError> {
        let path = self.preset_path(name);
        if !path.exists() {
            return Err(PresetIoError::NotFound(name.to_string()));
        }
        let contents = fs::read_to_string(path)?;
        let saved: SavedPreset = ron::from_str(&contents)?;
        Ok(saved.preset)
    }

    pub fn delete(&self, name: &str) -> Result<(), PresetIoError> {
        let path = self.preset_path(name);
        if !path.exists() {
            return Err(PresetIoError::NotFound(name.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.preset_path(name).exists()
    }

    /// Rename a saved preset, rewriting the stored display name.
    /// Overwrites any preset already saved under the new name.
    pub fn rename(&self, from: &str, to: &str) -> Result<(), PresetIoError> {
        let preset = self.load(from)?;
        self.save(to, &preset)?;
        if self.preset_path(from) != self.preset_path(to) {
            fs::remove_file(self.preset_path(from))?;
        }
        Ok(())
    }

    /// Display names of every saved preset, sorted. Unreadable files
    /// are skipped with a warning rather than failing the listing.
    pub fn list(&self) -> Result<Vec<String>, PresetIoError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("ron") {
                continue;
            }
            match fs::read_to_string(&path)
                .map_err(PresetIoError::from)
                .and_then(|s| ron::from_str::<SavedPreset>(&s).map_err(PresetIoError::from))
            {
                Ok(saved) => names.push(saved.name),
                Err(err) => warn!("skipping unreadable preset {}: {err}", path.display()),
            }
        }

        names.sort();
        Ok(names)
    }
}

/// Generate a filename from a preset name.
pub fn preset_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}.ron", sanitized.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use ws_world::AxialTilt;

    fn store() -> (tempfile::TempDir, PresetStore) {
        let dir = tempdir().unwrap();
        let store = PresetStore::new(dir.path());
        (dir, store)
    }

    fn sample_preset() -> GenerationPreset {
        let mut preset = GenerationPreset::default();
        preset.seed_string = "archipelago".to_string();
        preset.river_density = 1.6;
        preset.axial_tilt = AxialTilt::High;
        preset.biome_commonalities.insert("desert".into(), 3);
        preset
    }

    #[test]
    fn save_and_load_preset() {
        let (_dir, store) = store();
        let preset = sample_preset();
        store.save("Archipelago Run", &preset).unwrap();

        let loaded = store.load("Archipelago Run").unwrap();
        assert_eq!(loaded, preset);
    }

    #[test]
    fn save_overwrites_same_name() {
        let (_dir, store) = store();
        store.save("mine", &GenerationPreset::default()).unwrap();

        let mut updated = GenerationPreset::default();
        updated.sea_level = 1.4;
        store.save("mine", &updated).unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
        assert_eq!(store.load("mine").unwrap().sea_level, 1.4);
    }

    #[test]
    fn list_returns_display_names_sorted() {
        let (_dir, store) = store();
        store.save("Zebra", &GenerationPreset::default()).unwrap();
        store.save("Alpha World!", &GenerationPreset::default()).unwrap();

        assert_eq!(store.list().unwrap(), vec!["Alpha World!", "Zebra"]);
    }

    #[test]
    fn delete_removes_preset() {
        let (_dir, store) = store();
        store.save("gone", &GenerationPreset::default()).unwrap();
        store.delete("gone").unwrap();
        assert!(!store.exists("gone"));
        assert!(matches!(
            store.load("gone"),
            Err(PresetIoError::NotFound(_))
        ));
    }

    #[test]
    fn rename_moves_preset_and_display_name() {
        let (_dir, store) = store();
        store.save("Old Name", &sample_preset()).unwrap();
        store.rename("Old Name", "New Name").unwrap();

        assert!(!store.exists("Old Name"));
        assert_eq!(store.list().unwrap(), vec!["New Name"]);
        assert_eq!(store.load("New Name").unwrap(), sample_preset());
    }

    #[test]
    fn missing_preset_is_not_found() {
        let (_dir, store) = store();
        assert!(matches!(
            store.load("never saved"),
            Err(PresetIoError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("never saved"),
            Err(PresetIoError::NotFound(_))
        ));
    }

    #[test]
    fn preset_filename_sanitizes() {
        assert_eq!(preset_filename("My Preset"), "my_preset.ron");
        assert_eq!(preset_filename("Test-123"), "test-123.ron");
        assert_eq!(preset_filename("Ice & Fire"), "ice___fire.ron");
    }

    #[test]
    fn listing_skips_corrupt_files() {
        let (_dir, store) = store();
        store.save("good", &GenerationPreset::default()).unwrap();
        fs::write(store.dir().join("bad.ron"), "(not a preset").unwrap();

        assert_eq!(store.list().unwrap(), vec!["good"]);
    }
}

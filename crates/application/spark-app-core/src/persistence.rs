use crate::domain::{AppSettings, StudentProfile};
use crate::ports::{ProfileRepo, SettingsRepo};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;

const QUALIFIER: &str = "com";
const ORG: &str = "spark";
const APP: &str = "career";

const PROFILE_FILE: &str = "profile.json";
const SETTINGS_FILE: &str = "settings.json";

/// JSON files under the platform config dir, or under a fixed root.
#[derive(Debug, Clone, Default)]
pub struct FilePersistence {
    root: Option<Utf8PathBuf>,
}

impl FilePersistence {
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn with_root(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn config_dir(&self) -> Result<Utf8PathBuf> {
        let dir = match &self.root {
            Some(root) => root.clone(),
            None => {
                let proj_dirs = ProjectDirs::from(QUALIFIER, ORG, APP)
                    .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
                Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf())
                    .map_err(|p| anyhow::anyhow!("Config directory is not UTF-8: {}", p.display()))?
            }
        };
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create config directory {dir}"))?;
        }
        Ok(dir)
    }

    pub fn profile_path(&self) -> Result<Utf8PathBuf> {
        Ok(self.config_dir()?.join(PROFILE_FILE))
    }

    pub fn settings_path(&self) -> Result<Utf8PathBuf> {
        Ok(self.config_dir()?.join(SETTINGS_FILE))
    }

    pub fn load_profile(&self) -> Result<StudentProfile> {
        load_or_default(&self.profile_path()?, "profile")
    }

    pub fn save_profile(&self, profile: &StudentProfile) -> Result<()> {
        save_json(&self.profile_path()?, profile, "profile")
    }

    pub fn load_settings(&self) -> Result<AppSettings> {
        load_or_default(&self.settings_path()?, "settings")
    }

    pub fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        save_json(&self.settings_path()?, settings, "settings")
    }
}

impl ProfileRepo for FilePersistence {
    fn load(&self) -> Result<StudentProfile> {
        self.load_profile()
    }

    fn save(&self, profile: &StudentProfile) -> Result<()> {
        self.save_profile(profile)
    }
}

impl SettingsRepo for FilePersistence {
    fn load(&self) -> Result<AppSettings> {
        self.load_settings()
    }

    fn save(&self, settings: &AppSettings) -> Result<()> {
        self.save_settings(settings)
    }
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Utf8Path, what: &str) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {what}"))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {what} at {path}"))
}

fn save_json<T: Serialize>(path: &Utf8Path, value: &T, what: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, json.as_bytes()).with_context(|| format!("Failed to write {what}"))
}

fn atomic_write(path: &Utf8Path, contents: &[u8]) -> Result<()> {
    let tmp_path = Utf8PathBuf::from(format!("{path}.tmp"));

    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("Failed to create temp file {tmp_path}"))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write temp file {tmp_path}"))?;
    file.sync_all()
        .with_context(|| format!("Failed to sync temp file {tmp_path}"))?;
    drop(file);

    match fs::rename(&tmp_path, path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            fs::remove_file(path).ok();
            fs::rename(&tmp_path, path)
                .with_context(|| format!("Failed to replace destination file {path}"))?;
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to rename temp file {tmp_path} to {path}"));
        }
    }

    if let Some(parent) = path.parent() {
        if let Ok(dir) = fs::File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

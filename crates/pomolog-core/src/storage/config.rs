//! TOML-based application configuration.
//!
//! Stores:
//! - Timer settings (`[timer]`)
//! - Log location override (`[logs]`)
//! - The last task name used
//!
//! Configuration is stored at `~/.config/pomolog/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::data_dir;
use crate::error::ConfigError;
use crate::journal::LogLayout;
use crate::settings::{Settings, SettingsField};

const LOG_DIR_KEY: &str = "logs.dir";

/// Log location configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsConfig {
    /// Overrides `<data_dir>/logs`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pomolog/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Last task name used. Kept first: TOML wants plain values before tables.
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub timer: Settings,
    #[serde(default)]
    pub logs: LogsConfig,
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Object(_) => {
                        return Err(ConfigError::InvalidValue {
                            key: key.to_string(),
                            message: "is a section, not a value".into(),
                        })
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn collect_leaves(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
        match value {
            serde_json::Value::Object(map) => {
                for (name, child) in map {
                    let key = if prefix.is_empty() {
                        name.clone()
                    } else {
                        format!("{prefix}.{name}")
                    };
                    Self::collect_leaves(&key, child, out);
                }
            }
            leaf => out.push((prefix.to_string(), Self::render(leaf))),
        }
    }

    fn render(value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Build settings from a hand-edited `[timer]` table.
    ///
    /// Each key goes through the same validation as interactive input, so a
    /// wrong type or out-of-range number leaves that field at its default.
    fn read_timer(table: &toml::Value) -> Settings {
        let mut settings = Settings::default();
        let Some(table) = table.as_table() else {
            debug!("[timer] is not a table, using defaults");
            return settings;
        };
        for field in SettingsField::ALL {
            let raw = match table.get(field.key()) {
                None => continue,
                Some(toml::Value::String(s)) => s.clone(),
                Some(toml::Value::Integer(n)) => n.to_string(),
                Some(toml::Value::Boolean(b)) => b.to_string(),
                Some(other) => {
                    debug!(field = field.key(), value = %other, "ignoring unsupported setting value");
                    continue;
                }
            };
            settings.apply_input(field, &raw);
        }
        settings
    }

    /// `<data_dir>/config.toml`
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Like [`Config::load`], from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let load_failed = |message: String| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message,
        };
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let mut doc: toml::Table =
                    toml::from_str(&content).map_err(|e| load_failed(e.to_string()))?;
                let timer = doc.remove("timer");
                let mut cfg: Config = toml::Value::Table(doc)
                    .try_into()
                    .map_err(|e: toml::de::Error| load_failed(e.to_string()))?;
                cfg.timer = timer.map(|t| Self::read_timer(&t)).unwrap_or_default();
                cfg.task = cfg.task.trim().to_string();
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, writing defaults");
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(load_failed(e.to_string())),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::Object(_) => None,
            leaf => Some(Self::render(leaf)),
        }
    }

    /// Set a config value by key, in memory. Call `save()` to persist.
    ///
    /// `timer.*` keys go through settings validation: a bad value leaves the
    /// setting as it was and is not an error. An empty `logs.dir` clears the
    /// override.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or names a whole section.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        if let Some(name) = key.strip_prefix("timer.") {
            let field = SettingsField::ALL
                .into_iter()
                .find(|f| f.key() == name)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            self.timer.apply_input(field, value);
            return Ok(());
        }
        if key == LOG_DIR_KEY && value.trim().is_empty() {
            self.logs.dir = None;
            return Ok(());
        }

        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.task = self.task.trim().to_string();
        Ok(())
    }

    /// Every leaf key with its current value, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            Self::collect_leaves("", &json, &mut out);
        }
        out
    }

    /// Directory holding the day logs.
    pub fn log_root(&self) -> Result<PathBuf, ConfigError> {
        match &self.logs.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(data_dir()?.join("logs")),
        }
    }

    pub fn layout(&self) -> Result<LogLayout, ConfigError> {
        Ok(LogLayout::new(self.log_root()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config {
            task: "Essay".into(),
            logs: LogsConfig {
                dir: Some(PathBuf::from("/tmp/logs")),
            },
            ..Config::default()
        };
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.timer, Settings::default());
        assert_eq!(parsed.logs.dir, None);
        assert!(parsed.task.is_empty());
    }

    #[test]
    fn missing_file_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = Config::load_from(&path).unwrap();

        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn out_of_range_file_values_are_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer]\nwork_minutes = 0\nlong_break_minutes = 20\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();

        assert_eq!(cfg.timer.work_minutes, 25);
        assert_eq!(cfg.timer.long_break_minutes, 20);
    }

    #[test]
    fn wrongly_typed_timer_values_fall_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "task = \"Essay\"\n\n[timer]\nwork_minutes = -5\nshort_break_minutes = \"abc\"\n\
             long_break_minutes = 2.5\ncycles_before_long = \"3\"\nauto_start = \"yes\"\n\
             sound_enabled = [1]\n",
        )
        .unwrap();

        let cfg = Config::load_from(&path).unwrap();

        assert_eq!(cfg.task, "Essay");
        assert_eq!(cfg.timer.work_minutes, 25);
        assert_eq!(cfg.timer.short_break_minutes, 5);
        assert_eq!(cfg.timer.long_break_minutes, 15);
        assert_eq!(cfg.timer.cycles_before_long, 3);
        assert!(cfg.timer.auto_start);
        assert!(cfg.timer.sound_enabled);
    }

    #[test]
    fn timer_that_is_not_a_table_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timer = 5\n").unwrap();

        assert_eq!(Config::load_from(&path).unwrap().timer, Settings::default());
    }

    #[test]
    fn malformed_file_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.work_minutes").as_deref(), Some("25"));
        assert_eq!(cfg.get("timer.auto_start").as_deref(), Some("false"));
        assert_eq!(cfg.get("logs.dir").as_deref(), Some(""));
        assert!(cfg.get("timer").is_none());
        assert!(cfg.get("timer.missing_key").is_none());
    }

    #[test]
    fn set_timer_value_is_validated_silently() {
        let mut cfg = Config::default();
        cfg.set("timer.short_break_minutes", "7").unwrap();
        cfg.set("timer.short_break_minutes", "seven").unwrap();
        cfg.set("timer.cycles_before_long", "0").unwrap();
        assert_eq!(cfg.timer.short_break_minutes, 7);
        assert_eq!(cfg.timer.cycles_before_long, 4);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timer.volume", "3"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("ui.dark_mode", "true"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("logs", "x"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn set_and_clear_log_dir() {
        let mut cfg = Config::default();
        cfg.set("logs.dir", "/srv/journal").unwrap();
        assert_eq!(cfg.log_root().unwrap(), PathBuf::from("/srv/journal"));
        assert_eq!(cfg.layout().unwrap().root(), Path::new("/srv/journal"));
        cfg.set("logs.dir", "").unwrap();
        assert_eq!(cfg.logs.dir, None);
    }

    #[test]
    fn set_task_is_trimmed() {
        let mut cfg = Config::default();
        cfg.set("task", "  Thesis ").unwrap();
        assert_eq!(cfg.task, "Thesis");
    }

    #[test]
    fn entries_list_every_leaf() {
        let keys: Vec<String> = Config::default().entries().into_iter().map(|(k, _)| k).collect();
        assert!(keys.contains(&"task".to_string()));
        assert!(keys.contains(&"logs.dir".to_string()));
        for field in SettingsField::ALL {
            assert!(keys.contains(&format!("timer.{}", field.key())));
        }
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.set("timer.auto_start", "yes").unwrap();
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }
}

//! Persisted user settings: display language and both modes' pricing rules.
//!
//! Stored as flat key/value rows in a SQLite table, each value JSON-encoded.
//! Missing or malformed keys fall back to factory defaults one by one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{Mode, APP_NAME};
use crate::error::Result;
use crate::i18n::Language;
use crate::model::RuleSet;

const KEY_LANGUAGE: &str = "language";

/// Settings database file name.
pub const SETTINGS_DB_FILE: &str = "settings.db";

/// Legacy flat JSON settings file, migrated once into the database.
pub const LEGACY_SETTINGS_FILE: &str = "settings.json";

/// In-memory view of the persisted settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub language: Language,
    rules_3d: RuleSet,
    rules_laser: RuleSet,
}

impl Default for Settings {
    fn default() -> Self {
        Self::factory()
    }
}

impl Settings {
    /// Factory settings: French, factory rules for both modes.
    pub fn factory() -> Self {
        Self {
            language: Language::default(),
            rules_3d: RuleSet::FACTORY_3D,
            rules_laser: RuleSet::FACTORY_LASER,
        }
    }

    /// Saved rules for `mode`.
    pub fn rules_for(&self, mode: Mode) -> RuleSet {
        match mode {
            Mode::ThreeD => self.rules_3d,
            Mode::Laser => self.rules_laser,
        }
    }

    /// Remember `rules` as the defaults for `mode`.
    pub fn set_rules_for(&mut self, mode: Mode, rules: RuleSet) {
        let rules = rules.for_mode(mode);
        match mode {
            Mode::ThreeD => self.rules_3d = rules,
            Mode::Laser => self.rules_laser = rules,
        }
    }

    /// Reset `mode`'s rules to factory values and return them.
    pub fn restore_defaults(&mut self, mode: Mode) -> RuleSet {
        let rules = RuleSet::factory(mode);
        self.set_rules_for(mode, rules);
        rules
    }

    /// Build settings from stored key/value pairs.
    fn from_map(map: &BTreeMap<String, Value>) -> Self {
        let language = map
            .get(KEY_LANGUAGE)
            .and_then(Value::as_str)
            .and_then(Language::from_code)
            .unwrap_or_default();

        let mut settings = Self {
            language,
            ..Self::factory()
        };

        for mode in [Mode::ThreeD, Mode::Laser] {
            let factory = RuleSet::factory(mode);
            let get = |field: &str, fallback: f64| {
                let key = rule_key(mode, field);
                match map.get(&key).map(value_as_f64) {
                    Some(Some(v)) if v.is_finite() && v >= 0.0 => v,
                    Some(_) => {
                        warn!("Ignoring malformed setting {}", key);
                        fallback
                    }
                    None => fallback,
                }
            };

            let rules = match mode {
                Mode::ThreeD => RuleSet {
                    gram_price: get("gram_price", factory.gram_price),
                    normal_hour_price: get("normal_hour_price", factory.normal_hour_price),
                    exceed_hour_price: get("exceed_hour_price", factory.exceed_hour_price),
                    exceed_threshold_hours: get("exceed_threshold", factory.exceed_threshold_hours),
                    markup_percent: get("markup_percent", factory.markup_percent),
                },
                Mode::Laser => RuleSet::laser(
                    get("normal_hour_price", factory.normal_hour_price),
                    get("markup_percent", factory.markup_percent),
                ),
            };
            settings.set_rules_for(mode, rules);
        }

        settings
    }

    /// Flatten settings into key/value pairs.
    fn to_map(&self) -> BTreeMap<String, Value> {
        let mut map = BTreeMap::new();
        map.insert(KEY_LANGUAGE.to_string(), Value::from(self.language.code()));

        for (field, value) in self.rules_3d.fields() {
            map.insert(rule_key(Mode::ThreeD, field), Value::from(value));
        }

        let laser = self.rules_laser;
        map.insert(
            rule_key(Mode::Laser, "normal_hour_price"),
            Value::from(laser.normal_hour_price),
        );
        map.insert(
            rule_key(Mode::Laser, "markup_percent"),
            Value::from(laser.markup_percent),
        );
        map
    }
}

fn rule_key(mode: Mode, field: &str) -> String {
    format!("{}_{}", mode.settings_prefix(), field)
}

/// Accept numbers and numeric strings.
fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// SQLite-backed settings store.
pub struct SettingsStore {
    conn: Connection,
    path: PathBuf,
}

impl SettingsStore {
    /// Default database location: `<config dir>/FabriCost/settings.db`,
    /// falling back to the home directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME)
            .join(SETTINGS_DB_FILE)
    }

    /// Open or create the settings database at `db_path`.
    ///
    /// When the table is empty and a legacy `settings.json` sits next to the
    /// database, its entries are imported once.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )?;

        let mut store = Self {
            conn,
            path: db_path.to_path_buf(),
        };

        if store.count()? == 0 {
            let legacy = db_path.with_file_name(LEGACY_SETTINGS_FILE);
            if legacy.exists() {
                store.migrate_legacy_json(&legacy);
            }
        }

        info!("Opened settings database at {}", db_path.display());
        Ok(store)
    }

    /// Path of the backing database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, applying per-key factory fallbacks.
    pub fn load(&self) -> Result<Settings> {
        let map = self.read_all()?;
        debug!("Loaded {} setting(s)", map.len());
        Ok(Settings::from_map(&map))
    }

    /// Persist every setting.
    pub fn save(&mut self, settings: &Settings) -> Result<()> {
        let map = settings.to_map();
        let tx = self.conn.transaction()?;
        for (key, value) in &map {
            tx.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                params![key, serde_json::to_string(value)?],
            )?;
        }
        tx.commit()?;
        debug!("Saved {} setting(s)", map.len());
        Ok(())
    }

    fn count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))?)
    }

    fn read_all(&self) -> Result<BTreeMap<String, Value>> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM settings")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut map = BTreeMap::new();
        for row in rows {
            let (key, raw) = row?;
            // Values written by hand may not be JSON; keep them as strings.
            let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
            map.insert(key, value);
        }
        Ok(map)
    }

    /// Import a legacy JSON object. Failures are logged and skipped.
    fn migrate_legacy_json(&mut self, legacy: &Path) {
        let imported = std::fs::read_to_string(legacy)
            .map_err(crate::error::QuoteError::from)
            .and_then(|text| Ok(serde_json::from_str::<BTreeMap<String, Value>>(&text)?))
            .and_then(|map| {
                let tx = self.conn.transaction()?;
                for (key, value) in &map {
                    tx.execute(
                        "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                        params![key, serde_json::to_string(value)?],
                    )?;
                }
                tx.commit()?;
                Ok(map.len())
            });

        match imported {
            Ok(n) => info!("Migrated {} legacy setting(s) from {}", n, legacy.display()),
            Err(e) => warn!("Skipping legacy settings {}: {}", legacy.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SettingsStore {
        SettingsStore::open(&dir.path().join(SETTINGS_DB_FILE)).unwrap()
    }

    // ==================== Settings tests ====================

    #[test]
    fn test_factory_settings() {
        let settings = Settings::factory();
        assert_eq!(settings.language, Language::Fr);
        assert_eq!(settings.rules_for(Mode::ThreeD), RuleSet::FACTORY_3D);
        assert_eq!(settings.rules_for(Mode::Laser), RuleSet::FACTORY_LASER);
    }

    #[test]
    fn test_set_rules_for_laser_normalizes() {
        let mut settings = Settings::factory();
        settings.set_rules_for(Mode::Laser, RuleSet::FACTORY_3D);
        assert_eq!(settings.rules_for(Mode::Laser), RuleSet::laser(3.0, 20.0));
    }

    #[test]
    fn test_restore_defaults_only_touches_mode() {
        let mut settings = Settings::factory();
        settings.set_rules_for(Mode::ThreeD, RuleSet::laser(1.0, 1.0));
        settings.set_rules_for(Mode::Laser, RuleSet::laser(99.0, 1.0));

        let restored = settings.restore_defaults(Mode::ThreeD);

        assert_eq!(restored, RuleSet::FACTORY_3D);
        assert_eq!(settings.rules_for(Mode::ThreeD), RuleSet::FACTORY_3D);
        assert_eq!(settings.rules_for(Mode::Laser), RuleSet::laser(99.0, 1.0));
    }

    #[test]
    fn test_from_map_falls_back_per_key() {
        let mut map = BTreeMap::new();
        map.insert("language".to_string(), Value::from("en"));
        map.insert("3d_gram_price".to_string(), Value::from(0.25));
        map.insert("3d_markup_percent".to_string(), Value::from("not a number"));
        map.insert("laser_normal_hour_price".to_string(), Value::from("40"));

        let settings = Settings::from_map(&map);

        assert_eq!(settings.language, Language::En);
        let rules = settings.rules_for(Mode::ThreeD);
        assert_eq!(rules.gram_price, 0.25);
        assert_eq!(rules.markup_percent, 20.0);
        assert_eq!(rules.normal_hour_price, 3.0);
        assert_eq!(settings.rules_for(Mode::Laser), RuleSet::laser(40.0, 5.0));
    }

    #[test]
    fn test_from_map_unknown_language_is_french() {
        let mut map = BTreeMap::new();
        map.insert("language".to_string(), Value::from("de"));
        assert_eq!(Settings::from_map(&map).language, Language::Fr);
    }

    #[test]
    fn test_from_map_falls_back_per_key_invalid_values() {
        let mut map = BTreeMap::new();
        map.insert("3d_gram_price".to_string(), Value::from(-1.0));
        map.insert("3d_normal_hour_price".to_string(), Value::from(9.0));
        map.insert("laser_markup_percent".to_string(), Value::from("inf"));
        map.insert("laser_normal_hour_price".to_string(), Value::from(45.0));
        let settings = Settings::from_map(&map);

        // Only the bad key falls back; its valid neighbours are kept.
        assert_eq!(
            settings.rules_for(Mode::ThreeD),
            RuleSet {
                normal_hour_price: 9.0,
                ..RuleSet::FACTORY_3D
            }
        );
        assert_eq!(settings.rules_for(Mode::Laser), RuleSet::laser(45.0, 5.0));
    }

    #[test]
    fn test_to_map_keys() {
        let keys: Vec<String> = Settings::factory().to_map().into_keys().collect();
        assert_eq!(
            keys,
            vec![
                "3d_exceed_hour_price",
                "3d_exceed_threshold",
                "3d_gram_price",
                "3d_markup_percent",
                "3d_normal_hour_price",
                "language",
                "laser_markup_percent",
                "laser_normal_hour_price",
            ]
        );
    }

    // ==================== SettingsStore tests ====================

    #[test]
    fn test_first_run_yields_factory() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.load().unwrap(), Settings::factory());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let mut settings = Settings::factory();
        settings.language = Language::En;
        settings.set_rules_for(
            Mode::ThreeD,
            RuleSet {
                gram_price: 0.15,
                ..RuleSet::FACTORY_3D
            },
        );
        settings.set_rules_for(Mode::Laser, RuleSet::laser(35.0, 8.0));
        store.save(&settings).unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.load().unwrap(), settings);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join(SETTINGS_DB_FILE);
        let store = SettingsStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn test_migrates_legacy_json_once() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(LEGACY_SETTINGS_FILE),
            r#"{"language": "en", "laser_markup_percent": 12.5}"#,
        )
        .unwrap();

        let mut store = store_in(&dir);
        let settings = store.load().unwrap();
        assert_eq!(settings.language, Language::En);
        assert_eq!(settings.rules_for(Mode::Laser).markup_percent, 12.5);

        // Later edits win over the legacy file on reopen.
        let mut changed = settings.clone();
        changed.language = Language::Fr;
        store.save(&changed).unwrap();
        assert_eq!(store_in(&dir).load().unwrap().language, Language::Fr);
    }

    #[test]
    fn test_broken_legacy_json_is_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(LEGACY_SETTINGS_FILE), "{ not json").unwrap();
        let store = store_in(&dir);
        assert_eq!(store.load().unwrap(), Settings::factory());
    }
}

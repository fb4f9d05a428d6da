use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Inventory position analysis over a stock movement ledger
#[derive(Parser, Debug, Clone)]
#[command(
    name = "stock-ledger",
    about = "Inventory position analysis over a stock movement ledger",
    version
)]
pub struct Settings {
    /// Ledger CSV file (falls back to the last used ledger)
    #[arg(long, env = "STOCK_LEDGER_FILE", global = true)]
    pub ledger: Option<PathBuf>,

    /// Directory to search for the most recently modified ledger CSV
    /// (ignored when a ledger is given)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", global = true, value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path (logs go to stderr otherwise)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Clear the saved ledger path
    #[arg(long)]
    pub clear: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// One subcommand per inventory query.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Overall dashboard statistics (default)
    Stats,
    /// Totals per site
    Sites,
    /// Positions with negative quantity
    Shortages {
        /// Only shortages below this percentile of all quantities
        #[arg(long, value_parser = parse_percentile)]
        percentile: Option<f64>,
    },
    /// Positions at or below -(mean quantity x multiplier)
    Critical {
        #[arg(long, default_value_t = 2.0, value_parser = parse_multiplier)]
        multiplier: f64,
    },
    /// Positions above a quantity percentile
    Abundant {
        #[arg(long, default_value_t = 90.0, value_parser = parse_percentile)]
        percentile: f64,
    },
    /// Site-to-site shipping recommendations
    Shipping,
    /// Storage-location movement recommendations with value estimates
    Movements,
    /// Inventory of one site
    Site { site: String },
    /// Positions of one material across all sites
    Material { material: String },
    /// Location breakdown and recent transactions of one material
    Details { material: String },
    /// Every position
    Inventory,
    /// Shortage bottlenecks by site, location and material
    Bottlenecks,
    /// Where to focus attention first
    Focus,
    /// Shortages ranked by value impact
    TopShortages {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Positions without recent movement
    Inactive {
        #[arg(long, default_value_t = 90)]
        days: u32,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Rebuild whenever the ledger file changes and print dashboard snapshots
    Watch {
        /// Poll interval in seconds (1-3600)
        #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..=3600))]
        interval: u64,
    },
}

/// Accept a percentile in `0..=100`.
fn parse_percentile(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("percentile must be between 0 and 100, got {value}"))
    }
}

fn parse_multiplier(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("multiplier must be zero or positive, got {value}"))
    }
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.stock-ledger/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger: Option<PathBuf>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".stock-ledger").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments and fill in the ledger from the last run when none
    /// was given.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let mut settings = Settings::parse_from(args);

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return settings;
        }

        // An explicit ledger or data directory always wins.
        if settings.ledger.is_none() && settings.data_dir.is_none() {
            settings.ledger = LastUsedParams::load_from(config_path).ledger;
        }

        settings
    }

    /// Remember `ledger` for the next run.
    pub fn remember_ledger(
        ledger: &std::path::Path,
        config_path: &std::path::Path,
    ) -> Result<(), std::io::Error> {
        LastUsedParams {
            ledger: Some(ledger.to_path_buf()),
        }
        .save_to(config_path)
    }

    /// The subcommand to run; `stats` when none was given.
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Stats)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            ledger: Some(PathBuf::from("/data/movements.csv")),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.ledger, Some(PathBuf::from("/data/movements.csv")));
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            ledger: Some(PathBuf::from("a.csv")),
        }
        .save_to(&path)
        .expect("save");
        assert!(path.exists(), "file must exist after save");

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists(), "file must be gone after clear");
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert!(LastUsedParams::load_from(&path).ledger.is_none());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert!(LastUsedParams::load_from(&path).ledger.is_none());
    }

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["stock-ledger"]);
        assert!(settings.data_dir.is_none());
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.pretty);
        assert!(!settings.clear);
        assert_eq!(settings.command_or_default(), Command::Stats);
    }

    #[test]
    fn test_settings_subcommand_defaults() {
        let settings = Settings::parse_from(["stock-ledger", "critical"]);
        assert_eq!(settings.command, Some(Command::Critical { multiplier: 2.0 }));

        let settings = Settings::parse_from(["stock-ledger", "abundant"]);
        assert_eq!(settings.command, Some(Command::Abundant { percentile: 90.0 }));

        let settings = Settings::parse_from(["stock-ledger", "inactive"]);
        assert_eq!(
            settings.command,
            Some(Command::Inactive {
                days: 90,
                limit: 20
            })
        );

        let settings = Settings::parse_from(["stock-ledger", "top-shortages"]);
        assert_eq!(settings.command, Some(Command::TopShortages { limit: 10 }));
    }

    #[test]
    fn test_settings_shortages_percentile_optional() {
        let settings = Settings::parse_from(["stock-ledger", "shortages"]);
        assert_eq!(settings.command, Some(Command::Shortages { percentile: None }));

        let settings = Settings::parse_from(["stock-ledger", "shortages", "--percentile", "25"]);
        assert_eq!(
            settings.command,
            Some(Command::Shortages {
                percentile: Some(25.0)
            })
        );
    }

    #[test]
    fn test_settings_rejects_out_of_range_percentile() {
        let result = Settings::try_parse_from(["stock-ledger", "abundant", "--percentile", "120"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_critical_multiplier_must_be_non_negative() {
        let result = Settings::try_parse_from(["stock-ledger", "critical", "--multiplier=-1"]);
        assert!(result.is_err());

        let s = Settings::try_parse_from(["stock-ledger", "critical", "--multiplier", "0"]).unwrap();
        assert_eq!(s.command, Some(Command::Critical { multiplier: 0.0 }));
    }

    #[test]
    fn test_settings_positional_arguments() {
        let settings = Settings::parse_from(["stock-ledger", "details", "100234"]);
        assert_eq!(
            settings.command,
            Some(Command::Details {
                material: "100234".to_string()
            })
        );
    }

    #[test]
    fn test_settings_global_flags_after_subcommand() {
        let settings =
            Settings::parse_from(["stock-ledger", "sites", "--ledger", "/tmp/l.csv", "--pretty"]);
        assert_eq!(settings.ledger, Some(PathBuf::from("/tmp/l.csv")));
        assert!(settings.pretty);
    }

    #[test]
    fn test_load_with_last_used_fills_ledger() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        Settings::remember_ledger(std::path::Path::new("/data/prev.csv"), &config_path)
            .expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["stock-ledger".into()], &config_path);
        assert_eq!(settings.ledger, Some(PathBuf::from("/data/prev.csv")));
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        Settings::remember_ledger(std::path::Path::new("/data/prev.csv"), &config_path)
            .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["stock-ledger".into(), "--ledger".into(), "/data/new.csv".into()],
            &config_path,
        );
        assert_eq!(settings.ledger, Some(PathBuf::from("/data/new.csv")));
    }

    #[test]
    fn test_load_with_last_used_data_dir_skips_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        Settings::remember_ledger(std::path::Path::new("/data/prev.csv"), &config_path)
            .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["stock-ledger".into(), "--data-dir".into(), "/data".into()],
            &config_path,
        );
        assert!(settings.ledger.is_none());
    }

    #[test]
    fn test_load_with_last_used_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        Settings::remember_ledger(std::path::Path::new("/data/prev.csv"), &config_path)
            .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["stock-ledger".into(), "--clear".into()],
            &config_path,
        );
        assert!(settings.ledger.is_none());
        assert!(!config_path.exists());
    }

    #[test]
    fn test_debug_flag_forces_debug_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            vec!["stock-ledger".into(), "--debug".into()],
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.log_level, "DEBUG");
    }
}

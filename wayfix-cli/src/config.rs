//! Configuration file loading for wayfix.
//!
//! Discovers and loads `wayfix.toml` from the directory of the data file.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "wayfix.toml";

/// Top-level configuration from wayfix.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WayfixConfig {
    pub review: ReviewConfig,
    pub output: OutputConfig,
    pub apply: ApplyConfig,
}

/// Review section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Accept every proposed correction without prompting.
    pub auto_accept: bool,
}

/// Output section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,

    /// Artifact directory for `plan`, relative to the data file.
    pub out_dir: Option<Utf8PathBuf>,
}

/// Apply section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApplyConfig {
    /// Keep a copy of the data file before overwriting it.
    pub backup: bool,

    pub backup_suffix: String,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            backup: true,
            backup_suffix: ".wayfix.bak".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Discover the wayfix.toml config file in `dir`.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a wayfix.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<WayfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<WayfixConfig> {
    let config: WayfixConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load the explicit config file if given, else discover one next to the data file.
pub fn load_or_default(
    explicit: Option<&Utf8Path>,
    data_file: &Utf8Path,
) -> anyhow::Result<WayfixConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match discover_config(data_dir(data_file)) {
        Some(path) => load_config(&path),
        None => Ok(WayfixConfig::default()),
    }
}

/// Directory holding the data file; `.` for bare file names.
pub fn data_dir(data_file: &Utf8Path) -> &Utf8Path {
    match data_file.parent() {
        Some(dir) if !dir.as_str().is_empty() => dir,
        _ => Utf8Path::new("."),
    }
}

/// Merged configuration combining config file and CLI arguments.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub auto_accept: bool,
    pub format: OutputFormat,
    pub out_dir: Option<Utf8PathBuf>,
    pub backup: bool,
    pub backup_suffix: String,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: WayfixConfig,
}

impl ConfigMerger {
    pub fn new(config: WayfixConfig) -> Self {
        Self { config }
    }

    /// CLI format and out dir replace the config values when given.
    pub fn merge_output_args(
        self,
        cli_format: Option<OutputFormat>,
        cli_out_dir: Option<Utf8PathBuf>,
    ) -> MergedConfig {
        let mut merged = self.base();
        merged.format = cli_format.unwrap_or(merged.format);
        merged.out_dir = cli_out_dir.or(merged.out_dir);
        merged
    }

    /// `--yes` turns auto-accept on; it cannot be turned off from the CLI once configured.
    pub fn merge_reverse_args(self, cli_yes: bool, cli_no_backup: bool) -> MergedConfig {
        let mut merged = self.base();
        merged.auto_accept = cli_yes || merged.auto_accept;
        merged.backup = merged.backup && !cli_no_backup;
        merged
    }

    fn base(self) -> MergedConfig {
        MergedConfig {
            auto_accept: self.config.review.auto_accept,
            format: self.config.output.format.unwrap_or_default(),
            out_dir: self.config.output.out_dir,
            backup: self.config.apply.backup,
            backup_suffix: self.config.apply.backup_suffix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let contents = r#"
[review]
auto_accept = true

[output]
format = "json"
out_dir = "artifacts/wayfix"

[apply]
backup = false
backup_suffix = ".orig"
"#;

        let config = parse_config(contents).unwrap();
        assert!(config.review.auto_accept);
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert_eq!(
            config.output.out_dir,
            Some(Utf8PathBuf::from("artifacts/wayfix"))
        );
        assert!(!config.apply.backup);
        assert_eq!(config.apply.backup_suffix, ".orig");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert!(!config.review.auto_accept);
        assert!(config.output.format.is_none());
        assert!(config.apply.backup);
        assert_eq!(config.apply.backup_suffix, ".wayfix.bak");
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        let err = parse_config("[output]\nformat = \"yaml\"\n").expect_err("bad format");
        assert!(err.to_string().contains("invalid TOML"));
    }

    #[test]
    fn test_merge_output_args_cli_wins() {
        let config = parse_config("[output]\nformat = \"json\"\nout_dir = \"cfg\"\n").unwrap();
        let merged = ConfigMerger::new(config.clone())
            .merge_output_args(Some(OutputFormat::Text), Some(Utf8PathBuf::from("cli")));
        assert_eq!(merged.format, OutputFormat::Text);
        assert_eq!(merged.out_dir, Some(Utf8PathBuf::from("cli")));

        let merged = ConfigMerger::new(config).merge_output_args(None, None);
        assert_eq!(merged.format, OutputFormat::Json);
        assert_eq!(merged.out_dir, Some(Utf8PathBuf::from("cfg")));
    }

    #[test]
    fn test_merge_reverse_args() {
        let merged = ConfigMerger::new(WayfixConfig::default()).merge_reverse_args(true, false);
        assert!(merged.auto_accept);
        assert!(merged.backup);

        let config = parse_config("[review]\nauto_accept = true\n").unwrap();
        let merged = ConfigMerger::new(config).merge_reverse_args(false, true);
        assert!(merged.auto_accept);
        assert!(!merged.backup);
    }

    #[test]
    fn test_data_dir_of_bare_file_name() {
        assert_eq!(data_dir(Utf8Path::new("data.json")), Utf8Path::new("."));
        assert_eq!(data_dir(Utf8Path::new("a/b.json")), Utf8Path::new("a"));
    }

    #[test]
    fn test_load_or_default_discovers_next_to_data() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let data = root.join("data.json");

        let cfg = load_or_default(None, &data).expect("load default");
        assert!(!cfg.review.auto_accept);

        std::fs::write(root.join(CONFIG_FILE_NAME), "[review]\nauto_accept = true\n")
            .expect("write config");
        let cfg = load_or_default(None, &data).expect("load discovered");
        assert!(cfg.review.auto_accept);
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let missing = root.join("nope.toml");
        assert!(load_or_default(Some(&missing), &root.join("data.json")).is_err());
    }
}

//! YAML settings for the daily report run.
//!
//! Keys are upper-case, matching the historical `settings.yml` layout:
//!
//! ```yaml
//! BACKUP_DIR: /var/backups/network
//! RESULTS_DIR: results
//! COMMAND_GIT_DIFF: "git --no-pager diff HEAD^ HEAD {file}"
//! HOSTNAME_PREFIXES:
//!   - 'hostname (\S+)'
//! TRASH_LINES:
//!   - '! Last configuration change'
//! ```
//!
//! Unknown keys (mail settings and the like) are ignored. Relative
//! directories are resolved against the settings file's directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CfgDiffError, Result};
use crate::hostname::HostnameMatcher;
use crate::noise::NoiseFilter;
use crate::normalize::{NormalizeConfig, DEFAULT_MAX_VLANS_PER_LINE, DEFAULT_PREAMBLE_LINES};
use crate::vlan::{VlanId, DEFAULT_MAX_VLAN_ID};

/// Placeholder substituted with the config file name in `COMMAND_GIT_DIFF`.
pub const FILE_PLACEHOLDER: &str = "{file}";

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_git_diff_command() -> String {
    "git --no-pager diff HEAD^ HEAD {file}".to_string()
}

fn default_preamble_lines() -> usize {
    DEFAULT_PREAMBLE_LINES
}

fn default_max_vlans_per_line() -> usize {
    DEFAULT_MAX_VLANS_PER_LINE
}

fn default_max_vlan_id() -> VlanId {
    DEFAULT_MAX_VLAN_ID
}

fn default_max_concurrent() -> usize {
    4
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Settings {
    /// Git work tree holding one config file per device.
    pub backup_dir: PathBuf,

    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// Shell command producing the diff for `{file}`, run in `backup_dir`.
    #[serde(default = "default_git_diff_command")]
    pub command_git_diff: String,

    /// Regexes whose first capture group is the device hostname.
    #[serde(default)]
    pub hostname_prefixes: Vec<String>,

    /// Regexes for lines that change on every poll.
    #[serde(default)]
    pub trash_lines: Vec<String>,

    #[serde(default = "default_preamble_lines")]
    pub preamble_lines: usize,

    #[serde(default = "default_max_vlans_per_line")]
    pub max_vlans_per_line: usize,

    /// Trunk statements naming a higher id fail the device.
    #[serde(default = "default_max_vlan_id")]
    pub max_vlan_id: VlanId,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Settings {
    /// Parse and validate settings from YAML text. Paths are left as written.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`, resolving relative directories against the
    /// file's parent directory.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        let settings = Self::from_yaml_str(&yaml)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(settings.resolve_paths(base))
    }

    pub fn resolve_paths(mut self, base: &Path) -> Self {
        if self.backup_dir.is_relative() {
            self.backup_dir = base.join(&self.backup_dir);
        }
        if self.results_dir.is_relative() {
            self.results_dir = base.join(&self.results_dir);
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.command_git_diff.contains(FILE_PLACEHOLDER) {
            return Err(CfgDiffError::Settings(format!(
                "COMMAND_GIT_DIFF must contain {FILE_PLACEHOLDER}"
            )));
        }
        if self.max_vlans_per_line == 0 {
            return Err(CfgDiffError::Settings(
                "MAX_VLANS_PER_LINE must be at least 1".to_string(),
            ));
        }
        if self.max_vlan_id == 0 {
            return Err(CfgDiffError::Settings(
                "MAX_VLAN_ID must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent == 0 {
            return Err(CfgDiffError::Settings(
                "MAX_CONCURRENT must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the normalizer configuration, compiling `TRASH_LINES`.
    pub fn normalize_config(&self) -> Result<NormalizeConfig> {
        Ok(NormalizeConfig::default()
            .with_noise(NoiseFilter::new(&self.trash_lines)?)
            .with_preamble_lines(self.preamble_lines)
            .with_max_vlans_per_line(self.max_vlans_per_line)
            .with_max_vlan_id(self.max_vlan_id))
    }

    pub fn hostname_matcher(&self) -> Result<HostnameMatcher> {
        HostnameMatcher::new(&self.hostname_prefixes)
    }
}

//! Config loading, validation, and serialization.

use super::model::Config;
use crate::error::{Result, WorkshopError};
use std::path::{Component, Path};

impl Config {
    /// Load config from a YAML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(WorkshopError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            WorkshopError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content).map_err(|e| {
            WorkshopError::UserError(format!("{} (in '{}')", e, path.display()))
        })
    }

    /// Load config from `path` if the file exists, otherwise return defaults.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields are silently ignored for forward compatibility.
    /// A document that is empty or only comments yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let is_blank = yaml
            .lines()
            .map(str::trim)
            .all(|line| line.is_empty() || line.starts_with('#'));

        let config = if is_blank {
            Config::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| {
                WorkshopError::UserError(format!("failed to parse config YAML: {}", e))
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            WorkshopError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - `branches_dir`, `shared_dir` and `staging_dir` are single, plain path
    ///   components and pairwise distinct
    /// - `commit_message` is not blank
    /// - `main_branch`, when present, is not blank
    pub fn validate(&self) -> Result<()> {
        let dirs = [
            ("branches_dir", &self.branches_dir),
            ("shared_dir", &self.shared_dir),
            ("staging_dir", &self.staging_dir),
        ];

        for (field, value) in dirs {
            if !is_plain_dir_name(value) {
                return Err(WorkshopError::UserError(format!(
                    "config validation failed: {} must be a single directory name (found '{}')",
                    field, value
                )));
            }
        }

        for (i, (field_a, a)) in dirs.iter().enumerate() {
            for (field_b, b) in &dirs[i + 1..] {
                if a == b {
                    return Err(WorkshopError::UserError(format!(
                        "config validation failed: {} and {} must differ (both are '{}')",
                        field_a, field_b, a
                    )));
                }
            }
        }

        if self.commit_message.trim().is_empty() {
            return Err(WorkshopError::UserError(
                "config validation failed: commit_message must not be empty".to_string(),
            ));
        }

        if let Some(branch) = &self.main_branch
            && branch.trim().is_empty()
        {
            return Err(WorkshopError::UserError(
                "config validation failed: main_branch must not be empty when set".to_string(),
            ));
        }

        Ok(())
    }
}

fn is_plain_dir_name(value: &str) -> bool {
    let mut components = Path::new(value).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

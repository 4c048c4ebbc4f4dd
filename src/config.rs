//! Runtime configuration.
//!
//! The binaries take no flags. A JSON file named by `CIRCUIT_DESIGNER_CONFIG` may
//! override any of the defaults; every field is optional.
//!
//! ```json
//! {
//!   "seed": 42,
//!   "output_width": 5,
//!   "training": { "steps": 20, "lr": 0.01, "optimizer": { "kind": "adam" } }
//! }
//! ```

use std::env::{self, VarError};
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::designer::{MAX_OUTPUT_WIDTH, MIN_OUTPUT_WIDTH};
use crate::{Error, Result, TrainConfig};

/// Environment variable holding the path of an optional JSON config file.
pub const CONFIG_ENV: &str = "CIRCUIT_DESIGNER_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesignerConfig {
    /// Seed for parameter initialization and synthetic data; `None` draws from entropy.
    pub seed: Option<u64>,
    /// Width of the design output.
    pub output_width: usize,
    pub training: TrainConfig,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            output_width: MIN_OUTPUT_WIDTH,
            training: TrainConfig::default(),
        }
    }
}

impl DesignerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_OUTPUT_WIDTH..=MAX_OUTPUT_WIDTH).contains(&self.output_width) {
            return Err(Error::InvalidConfig(format!(
                "output_width must be in {MIN_OUTPUT_WIDTH}..={MAX_OUTPUT_WIDTH}, got {}",
                self.output_width
            )));
        }
        self.training.validate()
    }

    /// Parse and validate a config from JSON.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| Error::InvalidConfig(format!("invalid config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = std::fs::read_to_string(p)?;
        debug!("loaded config from {}", p.display());
        Self::from_json_str(&s)
    }

    /// Load from the file named by [`CONFIG_ENV`], or fall back to the defaults when the
    /// variable is unset.
    pub fn from_env() -> Result<Self> {
        Self::from_var(env::var(CONFIG_ENV))
    }

    fn from_var(var: std::result::Result<String, VarError>) -> Result<Self> {
        match var {
            Ok(path) => Self::from_path(path),
            Err(VarError::NotPresent) => {
                debug!("{CONFIG_ENV} not set, using default config");
                Ok(Self::default())
            }
            Err(e) => Err(Error::InvalidConfig(format!("{CONFIG_ENV}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Optimizer;

    #[test]
    fn empty_object_gives_defaults() {
        let cfg = DesignerConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, DesignerConfig::default());
        assert_eq!(cfg.output_width, 3);
        assert_eq!(cfg.training.steps, 20);
        assert_eq!(cfg.training.samples, 10);
        assert_eq!(cfg.training.report_every, 5);
        assert!((cfg.training.lr - 0.01).abs() < 1e-9);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = DesignerConfig::from_json_str(
            r#"{"seed": 7, "output_width": 5, "training": {"steps": 40, "optimizer": {"kind": "sgd"}}}"#,
        )
        .unwrap();
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.output_width, 5);
        assert_eq!(cfg.training.steps, 40);
        assert_eq!(cfg.training.samples, 10);
        assert_eq!(cfg.training.optimizer, Optimizer::Sgd);
    }

    #[test]
    fn rejects_out_of_range_width_and_unknown_fields() {
        assert!(DesignerConfig::from_json_str(r#"{"output_width": 2}"#).is_err());
        assert!(DesignerConfig::from_json_str(r#"{"output_width": 6}"#).is_err());
        assert!(DesignerConfig::from_json_str(r#"{"outptu_width": 4}"#).is_err());
        assert!(DesignerConfig::from_json_str(r#"{"training": {"lr": 0.0}}"#).is_err());
        assert!(DesignerConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn unset_variable_gives_defaults() {
        let cfg = DesignerConfig::from_var(Err(VarError::NotPresent)).unwrap();
        assert_eq!(cfg, DesignerConfig::default());
    }

    #[test]
    fn set_variable_loads_named_file() {
        let path = env::temp_dir().join(format!(
            "circuit-designer-env-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"seed": 3, "output_width": 5}"#).unwrap();
        let cfg = DesignerConfig::from_var(Ok(path.display().to_string()));
        std::fs::remove_file(&path).unwrap();

        let cfg = cfg.unwrap();
        assert_eq!(cfg.seed, Some(3));
        assert_eq!(cfg.output_width, 5);
    }

    #[test]
    fn non_unicode_variable_is_invalid_config() {
        let err = DesignerConfig::from_var(Err(VarError::NotUnicode("bad".into()))).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn from_path_reads_file_and_reports_missing_file() {
        let path = env::temp_dir().join(format!("circuit-designer-cfg-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"output_width": 4}"#).unwrap();
        let cfg = DesignerConfig::from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(cfg.output_width, 4);

        let err = DesignerConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}

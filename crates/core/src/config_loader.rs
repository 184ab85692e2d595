use crate::config::EngineConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

/// Environment variable prefix for overrides, e.g. `DELTAFLOW_RISK__STOP_MULTIPLE`.
pub const ENV_PREFIX: &str = "DELTAFLOW_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads engine configuration by merging defaults, an optional TOML file and
    /// `DELTAFLOW_` environment variables, then validates the result.
    ///
    /// A missing file is not an error; defaults and the environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the merged
    /// configuration fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<EngineConfig> {
        let config: EngineConfig = Self::figment(path.as_ref()).extract()?;
        config.validate()?;
        tracing::debug!(path = %path.as_ref().display(), "configuration loaded");
        Ok(config)
    }

    /// Loads configuration from defaults and the environment only.
    ///
    /// # Errors
    ///
    /// Returns an error if an override cannot be parsed or validation fails.
    pub fn from_env() -> Result<EngineConfig> {
        let config: EngineConfig = Figment::from(Serialized::defaults(EngineConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(EngineConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let config = ConfigLoader::load("definitely/not/here.toml").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn toml_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[signal]
delta_threshold = 200.0

[risk]
stop_multiple = 1.0
target_multiple = 3.0

[session]
timezone = "America/New_York"
open = 930
close = 1600
"#
        )
        .unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.signal.delta_threshold, 200.0);
        assert_eq!(config.signal.min_body_ticks, 1.0);
        assert_eq!(config.risk.stop_multiple, 1.0);
        assert_eq!(config.risk.target_multiple, 3.0);
        assert_eq!(config.risk.max_risk_fraction, 0.02);
        assert_eq!(config.session.timezone, "America/New_York");
        assert_eq!(config.session.open, 930);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[confidence]\nceiling = 2.0").unwrap();

        assert!(ConfigLoader::load(file.path()).is_err());
    }
}

use std::path::PathBuf;

/// Common configuration shared by every host embedding the hooks.
///
/// The host parses these from command-line arguments, then passes them to
/// storage initialization and module config loading.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Directory holding the database and module configuration files.
    pub data_dir: Option<PathBuf>,

    /// Path to the redb database file.
    /// Defaults to `{data_dir}/data.redb` if not specified.
    pub db_path: Option<PathBuf>,

    /// Path to the module configuration file (TOML).
    /// Defaults to `{data_dir}/serial.toml` if not specified.
    pub config_path: Option<PathBuf>,
}

impl ServiceConfig {
    /// Parse configuration from command-line arguments.
    ///
    /// Supported flags:
    /// - `--data-dir=PATH`
    /// - `--db=PATH`
    /// - `--config=PATH`
    ///
    /// Unknown flags are ignored; the host owns the rest of its argv.
    pub fn from_args(args: &[String]) -> Self {
        let mut config = ServiceConfig::default();

        for arg in args {
            if let Some(val) = arg.strip_prefix("--data-dir=") {
                config.data_dir = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--db=") {
                config.db_path = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--config=") {
                config.config_path = Some(PathBuf::from(val));
            }
        }

        config
    }

    /// Resolve the redb database path, falling back to `{data_dir}/data.redb`.
    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("data.redb"))
    }

    /// Resolve the module config path, falling back to `{data_dir}/serial.toml`.
    pub fn resolve_config_path(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("serial.toml"))
    }

    fn resolve_data_subpath(&self, name: &str) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(|d| d.join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_args() {
        let args = vec![
            "--data-dir=/tmp/snm".to_string(),
            "--db=/var/lib/snm/site.redb".to_string(),
            "--listen=127.0.0.1:9090".to_string(),
        ];
        let config = ServiceConfig::from_args(&args);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/snm")));
        assert_eq!(config.db_path, Some(PathBuf::from("/var/lib/snm/site.redb")));
        assert_eq!(config.config_path, None);
    }

    #[test]
    fn test_resolve_defaults() {
        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            ..Default::default()
        };
        assert_eq!(config.resolve_db_path(), PathBuf::from("/data/data.redb"));
        assert_eq!(config.resolve_config_path(), PathBuf::from("/data/serial.toml"));
    }

    #[test]
    fn test_resolve_without_data_dir() {
        let config = ServiceConfig::default();
        assert_eq!(config.resolve_db_path(), PathBuf::from("data.redb"));
    }
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 指定配置文件路径的环境变量。
pub const CONFIG_ENV: &str = "DUNGEN_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 自动发现配置文件：`DUNGEN_CONFIG` 指定的路径优先，其次是工作目录下的
    /// `config/default.toml`，两者都没有时使用默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        let base = env::current_dir().map_err(|source| ConfigError::Context {
            message: "获取当前工作目录失败".to_string(),
            source,
        })?;
        Self::discover_in(env::var_os(CONFIG_ENV).map(PathBuf::from), &base)
    }

    fn discover_in(explicit: Option<PathBuf>, base: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let fallback = base.join("config").join("default.toml");
        if fallback.is_file() {
            Self::from_file(fallback)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 演示布局参数：房间数量、矩形房间尺寸与相邻房间的间隔。
#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "DemoConfig::default_room_count")]
    pub room_count: u32,
    #[serde(default = "DemoConfig::default_room_width")]
    pub room_width: f64,
    #[serde(default = "DemoConfig::default_room_height")]
    pub room_height: f64,
    #[serde(default)]
    pub spacing: f64,
    #[serde(default = "DemoConfig::default_snap")]
    pub snap_to_grid: bool,
}

impl DemoConfig {
    fn default_room_count() -> u32 {
        4
    }

    fn default_room_width() -> f64 {
        20.0
    }

    fn default_room_height() -> f64 {
        10.0
    }

    fn default_snap() -> bool {
        true
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            room_count: Self::default_room_count(),
            room_width: Self::default_room_width(),
            room_height: Self::default_room_height(),
            spacing: 0.0,
            snap_to_grid: Self::default_snap(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// 出错的配置文件路径；与具体文件无关的错误返回 `None`。
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::Context { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_used_for_missing_sections() {
        let cfg: AppConfig = toml::from_str("").expect("empty config parses");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.demo.room_count, 4);
        assert_eq!(cfg.demo.room_width, 20.0);
        assert_eq!(cfg.demo.room_height, 10.0);
        assert_eq!(cfg.demo.spacing, 0.0);
        assert!(cfg.demo.snap_to_grid);
    }

    #[test]
    fn load_from_temp_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(
            file,
            r#"
            [logging]
            level = "debug"

            [demo]
            room_count = 6
            room_width = 12.5
            spacing = 2.0
            snap_to_grid = false
            "#
        )
        .unwrap();

        let cfg = AppConfig::from_file(file.path()).expect("load config");
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.demo.room_count, 6);
        assert_eq!(cfg.demo.room_width, 12.5);
        assert_eq!(cfg.demo.room_height, 10.0);
        assert_eq!(cfg.demo.spacing, 2.0);
        assert!(!cfg.demo.snap_to_grid);
    }

    #[test]
    fn missing_file_reports_io_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let missing = dir.path().join("absent.toml");
        match AppConfig::from_file(&missing) {
            Err(ConfigError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn discovery_prefers_explicit_path() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::create_dir(dir.path().join("config")).unwrap();
        fs::write(
            dir.path().join("config").join("default.toml"),
            "[demo]\nroom_count = 2\n",
        )
        .unwrap();
        let explicit = dir.path().join("custom.toml");
        fs::write(&explicit, "[demo]\nroom_count = 9\n").unwrap();

        let cfg = AppConfig::discover_in(Some(explicit), dir.path()).expect("explicit config");
        assert_eq!(cfg.demo.room_count, 9);

        let cfg = AppConfig::discover_in(None, dir.path()).expect("default.toml");
        assert_eq!(cfg.demo.room_count, 2);
    }

    #[test]
    fn discovery_without_files_uses_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let cfg = AppConfig::discover_in(None, dir.path()).expect("defaults");
        assert_eq!(cfg.demo.room_count, 4);

        let missing = dir.path().join("gone.toml");
        let err = AppConfig::discover_in(Some(missing.clone()), dir.path()).unwrap_err();
        assert_eq!(err.path(), Some(missing.as_path()));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "[demo]\nroom_count = \"many\"").unwrap();
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::app::LoggedAudio;
use engine::{resolve_app_paths, AppPaths, LoopConfig, Scene, StartupError};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay;

const CONFIG_FILE: &str = "config.json";
const DEFAULT_LEVEL: &str = "levels/level1.xml";

/// Contents of `assets/config.json`. Every field is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    /// Level file, relative to the asset directory.
    pub(crate) level: PathBuf,
    #[serde(rename = "loop")]
    pub(crate) loop_config: LoopConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            level: PathBuf::from(DEFAULT_LEVEL),
            loop_config: LoopConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path} at `{json_path}`: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) audio: Box<LoggedAudio>,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Tilehop Startup ===");

    let paths = resolve_app_paths()?;
    info!(root = %paths.root.display(), "project_root_resolved");
    let config = load_config(&paths)?;
    info!(
        level = %config.level.display(),
        target_tps = config.loop_config.target_tps,
        "game_config"
    );

    let scene = gameplay::build_scene(paths, config.level);
    Ok(AppWiring {
        config: config.loop_config,
        scene,
        audio: Box::new(LoggedAudio::new()),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn load_config(paths: &AppPaths) -> Result<GameConfig, ConfigError> {
    let path = paths.asset(Path::new(CONFIG_FILE));
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "config_missing_using_defaults");
            return Ok(GameConfig::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    parse_config(&path, &raw)
}

fn parse_config(path: &Path, raw: &str) -> Result<GameConfig, ConfigError> {
    let deserializer = &mut serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(deserializer).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        json_path: err.path().to_string(),
        source: err.into_inner(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn project() -> (TempDir, AppPaths) {
        let temp = TempDir::new().expect("temp");
        fs::create_dir(temp.path().join("assets")).expect("mkdir");
        let paths = AppPaths::from_root(temp.path().to_path_buf());
        (temp, paths)
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let (_temp, paths) = project();
        let config = load_config(&paths).expect("config");
        assert_eq!(config.level, PathBuf::from(DEFAULT_LEVEL));
        assert_eq!(config.loop_config.target_tps, 60);
        assert_eq!(config.loop_config.max_ticks_per_frame, Some(8));
    }

    #[test]
    fn config_overrides_level_and_loop_fields() {
        let (_temp, paths) = project();
        fs::write(
            paths.asset(Path::new(CONFIG_FILE)),
            r#"{
                "level": "levels/level2.xml",
                "loop": {"target_tps": 30, "end_screen_delay_ms": 500, "max_ticks_per_frame": null}
            }"#,
        )
        .expect("write");

        let config = load_config(&paths).expect("config");
        assert_eq!(config.level, PathBuf::from("levels/level2.xml"));
        assert_eq!(config.loop_config.target_tps, 30);
        assert_eq!(config.loop_config.end_screen_delay, Duration::from_millis(500));
        assert_eq!(config.loop_config.max_ticks_per_frame, None);
        assert_eq!(config.loop_config.window_title, "Tilehop");
    }

    #[test]
    fn parse_error_reports_json_path() {
        let err = parse_config(
            Path::new("config.json"),
            r#"{"loop": {"window_width": "wide"}}"#,
        )
        .expect_err("bad config");
        match err {
            ConfigError::Parse { json_path, .. } => assert_eq!(json_path, "loop.window_width"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_config(Path::new("config.json"), r#"{"levle": "x.xml"}"#)
            .expect_err("unknown key");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}

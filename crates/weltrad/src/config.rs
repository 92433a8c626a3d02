use crate::catalog::{self, Reaction, ReactionKind, Worldview};
use crate::events::AppEvent;
use async_channel::Sender;
use directories::ProjectDirs;
use kreisel::dial::DialConfig;
use kreisel::geometry::Point;
use kreisel::gesture::Millis;
use kreisel::quadrant::{DEFAULT_THRESHOLD_FRACTION, QuadrantConfig};
use kreisel::scroll::ScrollConfig;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use palette::{Srgb, WithAlpha};
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use std::path::{Path, PathBuf};
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

pub const DEFAULT_SOCKET_PATH: &str = "/tmp/weltrad.sock";

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceType {
    #[strum(serialize = "smartphone", serialize = "phone")]
    Smartphone,
    #[strum(serialize = "tablet")]
    Tablet,
    #[strum(serialize = "web-small", serialize = "websmall")]
    WebSmall,
    #[default]
    #[strum(serialize = "web-medium", serialize = "webmedium")]
    WebMedium,
    #[strum(serialize = "web-large", serialize = "weblarge")]
    WebLarge,
}

impl DeviceType {
    /// Classifies a viewport: native screens by their shorter side, web
    /// viewports by width.
    pub fn detect(width: f64, height: f64, web: bool) -> Self {
        if !web {
            return if width.min(height) < 600.0 {
                DeviceType::Smartphone
            } else {
                DeviceType::Tablet
            };
        }
        match width {
            w if !(w > 0.0) => DeviceType::default(),
            w if w < 768.0 => DeviceType::WebSmall,
            w if w < 1200.0 => DeviceType::WebMedium,
            _ => DeviceType::WebLarge,
        }
    }
}

/// Host viewport, used to pick a profile when `device` is not set.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_web")]
    pub web: bool,
}

fn default_web() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct DialProfile {
    pub circle_size: f64,
    pub circle_offset_x: f64,
    pub circle_offset_y: f64,
    pub min_tap_distance_from_center: f64,
}

impl DialProfile {
    pub fn for_device(device: DeviceType) -> Self {
        let (circle_size, circle_offset_y) = match device {
            DeviceType::Smartphone => (500.0, 500.0),
            DeviceType::Tablet | DeviceType::WebSmall => (700.0, 600.0),
            DeviceType::WebMedium => (750.0, 630.0),
            DeviceType::WebLarge => (800.0, 650.0),
        };
        Self {
            circle_size,
            circle_offset_x: -60.0,
            circle_offset_y,
            min_tap_distance_from_center: 20.0,
        }
    }

    pub fn to_config(&self) -> DialConfig {
        let half = self.circle_size / 2.0;
        DialConfig {
            center: Point::new(half + self.circle_offset_x, half + self.circle_offset_y),
            min_drag_distance: self.min_tap_distance_from_center,
            radius: half,
            ..DialConfig::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CrossProfile {
    pub container_size: f64,
    pub center_circle_size: f64,
    pub reaction_distance: f64,
}

impl Default for CrossProfile {
    fn default() -> Self {
        Self {
            container_size: 400.0,
            center_circle_size: 100.0,
            reaction_distance: 80.0,
        }
    }
}

impl CrossProfile {
    pub fn to_config(&self) -> QuadrantConfig {
        QuadrantConfig {
            radius: self.reaction_distance,
            center_zone: self.center_circle_size,
            threshold_fraction: DEFAULT_THRESHOLD_FRACTION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ListProfile {
    pub item_height: f64,
    pub visible_items: usize,
    pub snap_cooldown_ms: u64,
}

impl Default for ListProfile {
    fn default() -> Self {
        let defaults = ScrollConfig::default();
        Self {
            item_height: defaults.item_extent,
            visible_items: defaults.visible_items,
            snap_cooldown_ms: defaults.snap_cooldown.into(),
        }
    }
}

impl ListProfile {
    pub fn to_config(&self) -> ScrollConfig {
        ScrollConfig {
            item_extent: self.item_height,
            visible_items: self.visible_items,
            snap_cooldown: Millis(self.snap_cooldown_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReactionConfig {
    pub kind: ReactionKind,
    /// `#rrggbb`
    pub color: String,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

fn default_alpha() -> f64 {
    0.6
}

impl ReactionConfig {
    pub fn to_reaction(&self) -> Result<Reaction, ConfigError> {
        let rgb: Srgb<u8> = self.color.parse().map_err(|source| ConfigError::Color {
            value: self.color.clone(),
            source,
        })?;
        Ok(Reaction::new(
            self.kind,
            rgb.into_format::<f64>().with_alpha(self.alpha),
        ))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    pub device: Option<DeviceType>,
    pub viewport: Option<Viewport>,
    pub dial: Option<DialProfile>,
    pub cross: Option<CrossProfile>,
    pub list: Option<ListProfile>,
    #[serde(default)]
    pub reactions: Vec<ReactionConfig>,
    pub initial_worldview: Option<Worldview>,
    pub socket: Option<PathBuf>,
}

impl Config {
    pub fn device(&self) -> DeviceType {
        self.device
            .or_else(|| {
                self.viewport
                    .map(|v| DeviceType::detect(v.width, v.height, v.web))
            })
            .unwrap_or_default()
    }

    /// Explicit `[dial]` settings win over the device profile.
    pub fn dial_config(&self) -> DialConfig {
        self.dial
            .unwrap_or_else(|| DialProfile::for_device(self.device()))
            .to_config()
    }

    pub fn quadrant_config(&self) -> QuadrantConfig {
        self.cross.unwrap_or_default().to_config()
    }

    pub fn scroll_config(&self) -> ScrollConfig {
        self.list.unwrap_or_default().to_config()
    }

    /// Configured reactions, or the built-in set when none are given.
    pub fn reactions(&self) -> Result<Vec<Reaction>, ConfigError> {
        if self.reactions.is_empty() {
            return Ok(catalog::default_reactions());
        }
        self.reactions.iter().map(ReactionConfig::to_reaction).collect()
    }

    pub fn socket_path(&self) -> PathBuf {
        self.socket
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOCKET_PATH))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Invalid colour '{value}': {source}")]
    Color {
        value: String,
        source: palette::rgb::FromHexError,
    },
    #[error("Invalid control settings: {0}")]
    Control(#[from] kreisel::ConfigError),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "weltrad", "weltrad").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("WELTRAD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&get_config_path()?)
}

/// Loads the configuration, falling back to the built-in profile when the
/// file is unreadable.
pub fn load_or_default(path: Option<&Path>) -> Config {
    let loaded = match path {
        Some(p) => load_config_from(p),
        None => load_config(),
    };

    loaded.unwrap_or_else(|e| {
        log::warn!("Using default configuration: {}", e);
        Config::default()
    })
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

pub async fn run_async_watcher(config_path: PathBuf, tx: Sender<AppEvent>) {
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_device_deserialization() {
        let cases = vec![
            ("\"smartphone\"", DeviceType::Smartphone),
            ("\"Phone\"", DeviceType::Smartphone),
            ("\"web-large\"", DeviceType::WebLarge),
            ("\"WEBSMALL\"", DeviceType::WebSmall),
        ];

        for (json, expected) in cases {
            let deserialized: DeviceType = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
    }

    #[test]
    fn device_detection_thresholds() {
        assert_eq!(DeviceType::detect(390.0, 844.0, false), DeviceType::Smartphone);
        assert_eq!(DeviceType::detect(1024.0, 768.0, false), DeviceType::Tablet);
        assert_eq!(DeviceType::detect(767.0, 900.0, true), DeviceType::WebSmall);
        assert_eq!(DeviceType::detect(1199.0, 900.0, true), DeviceType::WebMedium);
        assert_eq!(DeviceType::detect(1600.0, 900.0, true), DeviceType::WebLarge);
        assert_eq!(DeviceType::detect(0.0, 0.0, true), DeviceType::WebMedium);
    }

    #[test]
    fn dial_profile_places_hub_in_touch_space() {
        let config = DialProfile::for_device(DeviceType::Smartphone).to_config();
        assert_eq!(config.center, Point::new(190.0, 750.0));
        assert_eq!(config.radius, 250.0);
        assert_eq!(config.min_drag_distance, 20.0);
        assert_eq!(config.positions, 12);
    }

    #[test]
    fn explicit_sections_override_device_profile() {
        let config = parse(
            r#"
            device = "tablet"

            [dial]
            circle_size = 400.0
            circle_offset_x = 0.0
            circle_offset_y = 0.0
            min_tap_distance_from_center = 30.0

            [cross]
            center_circle_size = 80.0

            [list]
            item_height = 40.0
            "#,
        );

        assert_eq!(config.device(), DeviceType::Tablet);
        assert_eq!(config.dial_config().center, Point::new(200.0, 200.0));
        assert_eq!(config.quadrant_config().threshold(), 60.0);
        assert_eq!(config.quadrant_config().radius, 80.0);
        assert_eq!(config.scroll_config().item_extent, 40.0);
        assert_eq!(config.scroll_config().visible_items, 5);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse("");
        assert_eq!(config.device(), DeviceType::WebMedium);
        assert_eq!(config.dial_config().radius, 375.0);
        assert_eq!(config.reactions().unwrap().len(), 5);
        assert_eq!(config.socket_path(), PathBuf::from(DEFAULT_SOCKET_PATH));
    }

    #[test]
    fn viewport_picks_profile_without_device() {
        let config = parse(
            r#"
            [viewport]
            width = 390.0
            height = 844.0
            web = false
            "#,
        );
        assert_eq!(config.device(), DeviceType::Smartphone);
        assert_eq!(config.dial_config().radius, 250.0);

        let config = parse(
            r#"
            device = "web-large"

            [viewport]
            width = 600.0
            height = 900.0
            "#,
        );
        assert_eq!(config.device(), DeviceType::WebLarge);

        let config = parse(
            r#"
            [viewport]
            width = 600.0
            height = 900.0
            "#,
        );
        assert_eq!(config.device(), DeviceType::WebSmall);
    }

    #[test]
    fn reaction_colours_are_parsed() {
        let config = parse(
            r##"
            [[reactions]]
            kind = "interesse"
            color = "#ffffff"

            [[reactions]]
            kind = "wut"
            color = "#d00c44"
            alpha = 0.8
            "##,
        );

        let reactions = config.reactions().unwrap();
        assert_eq!(reactions[1].kind, ReactionKind::Wut);
        assert!((reactions[1].color.red - 208.0 / 255.0).abs() < 1e-9);
        assert_eq!(reactions[1].color.alpha, 0.8);
        assert_eq!(reactions[0].color.alpha, 0.6);
    }

    #[test]
    fn bad_colour_is_reported() {
        let reaction = ReactionConfig {
            kind: ReactionKind::Wut,
            color: "crimson-ish".to_string(),
            alpha: 1.0,
        };
        assert!(matches!(
            reaction.to_reaction(),
            Err(ConfigError::Color { .. })
        ));
    }

    #[test]
    fn bundled_default_config_parses() {
        let config = parse(DEFAULT_CONFIG);
        let reactions = config.reactions().unwrap();
        assert_eq!(reactions.len(), 5);
        assert_eq!(reactions[0].kind, ReactionKind::Interesse);
        assert_eq!(config.initial_worldview, Some(Worldview::Materialismus));
    }
}

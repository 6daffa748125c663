use std::{fs, path::Path};

use serde::Deserialize;

use crate::Result;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// layout config
    #[serde(default)]
    pub layout: LayoutConfig,
    /// editor config
    #[serde(default)]
    pub editor: EditorConfig,
}

/// Geometry used by the layout engine.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// width of a node box
    pub node_width: f64,
    /// gap between two nodes of the same level
    pub horizontal_spacing: f64,
    /// distance between two levels
    pub vertical_spacing: f64,
    /// horizontal center of every row
    pub center_x: f64,
    /// y of level 0
    pub base_y: f64,
    /// y of the entry node
    pub entry_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 250.0,
            horizontal_spacing: 100.0,
            vertical_spacing: 150.0,
            center_x: 400.0,
            base_y: 200.0,
            entry_y: 50.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// capacity of the notification queue, defaults to 64
    pub notification_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            notification_capacity: 64,
        }
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref())?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_str)?;
        Ok(config)
    }
}

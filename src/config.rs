use crate::browser;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Settings for the [`GameLoop`](crate::engine::GameLoop)
/// - deserialized from camelCase JSON, missing keys fall back to defaults
///
/// ```json
/// { "fps": 30, "clearSurfaceEachFrame": false, "runWhenUnfocused": true }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoopConfig {
    /// fixed simulation rate, update() runs this many times per second
    pub fps: u32,
    /// clear the surface before each render pass
    pub clear_surface_each_frame: bool,
    /// keep simulating while the window has lost focus
    pub run_when_unfocused: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        LoopConfig {
            fps: 60,
            clear_surface_each_frame: true,
            run_when_unfocused: false,
        }
    }
}

impl LoopConfig {
    /// length of a fixed step in milliseconds
    pub fn delta_ms(&self) -> f64 {
        1000.0 / f64::from(self.fps)
    }

    /// length of a fixed step in seconds, the value handed to update()
    pub fn step(&self) -> f64 {
        1.0 / f64::from(self.fps)
    }

    /// Fetch a config from `path`
    /// # Returns
    /// * `Ok(LoopConfig)` - on fetch + parse success
    /// * `Err` - on network or parse failure
    pub async fn fetch(path: &str) -> Result<LoopConfig> {
        browser::fetch_json::<LoopConfig>(path)
            .await
            .with_context(|| format!("Failed to load loop config from : {}", path))
    }

    /// Same as [`LoopConfig::fetch`] but falls back to defaults on failure
    pub async fn fetch_or_default(path: &str) -> LoopConfig {
        match Self::fetch(path).await {
            Ok(config) => config,
            Err(err) => {
                log!("[config] using defaults : {:#}", err);
                LoopConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_match_sixty_fps() {
        let config = LoopConfig::default();
        assert_eq!(config.fps, 60);
        assert!(config.clear_surface_each_frame);
        assert!(!config.run_when_unfocused);
        assert_relative_eq!(config.delta_ms(), 1000.0 / 60.0);
        assert_relative_eq!(config.step(), 1.0 / 60.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: LoopConfig = serde_json::from_str(r#"{ "fps": 30 }"#).unwrap();
        assert_eq!(config.fps, 30);
        assert!(config.clear_surface_each_frame);

        let config: LoopConfig =
            serde_json::from_str(r#"{ "runWhenUnfocused": true, "clearSurfaceEachFrame": false }"#)
                .unwrap();
        assert_eq!(config.fps, 60);
        assert!(config.run_when_unfocused);
        assert!(!config.clear_surface_each_frame);
    }
}

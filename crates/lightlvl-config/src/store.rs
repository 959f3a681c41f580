use std::fs;
use std::path::{Path, PathBuf};

use lightlvl_geom::{MAX_RADIUS, ScanShape};

use crate::file::{ConfigError, LightConfig, LoadOutcome};
use crate::shared::SharedSettings;

/// Owns the on-disk config and republishes scanner settings after every change.
pub struct ConfigStore {
    path: PathBuf,
    config: LightConfig,
    shared: SharedSettings,
    // Text of our own last write, so watcher echoes of it can be ignored.
    last_written: Option<String>,
}

impl ConfigStore {
    /// Loads (or defaults) and immediately writes the file back so every
    /// setting is visible and editable.
    pub fn open(path: impl Into<PathBuf>) -> (Self, LoadOutcome) {
        let path = path.into();
        let (config, outcome) = LightConfig::load_or_default(&path);
        let shared = SharedSettings::new(config.compile());
        let mut store = Self {
            path,
            config,
            shared,
            last_written: None,
        };
        store.persist();
        (store, outcome)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &LightConfig {
        &self.config
    }

    /// Handle for the scan loop; stays valid across reloads.
    pub fn shared(&self) -> SharedSettings {
        self.shared.clone()
    }

    pub fn reload(&mut self) -> LoadOutcome {
        let (config, outcome) = LightConfig::load_or_default(&self.path);
        self.config = config;
        self.commit();
        log::info!(
            "config reloaded from {} ({:?}): radius={} shape={}",
            self.path.display(),
            outcome,
            self.config.radius,
            self.config.shape
        );
        outcome
    }

    /// Reloads only when the file differs from what this store last wrote.
    pub fn reload_if_changed(&mut self) -> Option<LoadOutcome> {
        let on_disk = fs::read_to_string(&self.path).ok();
        if on_disk.is_some() && on_disk == self.last_written {
            return None;
        }
        Some(self.reload())
    }

    /// Rejects values outside `1..=MAX_RADIUS` and leaves the current radius untouched.
    pub fn set_radius(&mut self, radius: i64) -> Result<u32, ConfigError> {
        if radius < 1 {
            return Err(ConfigError::NonPositiveRadius(radius));
        }
        let r = u32::try_from(radius)
            .ok()
            .filter(|r| *r <= MAX_RADIUS)
            .ok_or(ConfigError::RadiusTooLarge(radius))?;
        self.config.radius = r;
        self.commit();
        Ok(r)
    }

    pub fn set_shape(&mut self, shape: ScanShape) {
        self.config.shape = shape;
        self.commit();
    }

    /// Returns the new state.
    pub fn toggle_color_contrast(&mut self) -> bool {
        self.config.color_contrast = !self.config.color_contrast;
        self.commit();
        self.config.color_contrast
    }

    fn commit(&mut self) {
        self.shared.publish(self.config.compile());
        self.persist();
    }

    fn persist(&mut self) {
        match self.config.store(&self.path) {
            Ok(text) => {
                self.last_written = Some(text);
            }
            Err(e) => log::warn!("failed to write config {}: {}", self.path.display(), e),
        }
    }
}

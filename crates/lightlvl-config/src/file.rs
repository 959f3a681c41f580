use std::fs;
use std::io;
use std::path::Path;

use lightlvl_geom::{MAX_RADIUS, ScanShape};
use lightlvl_rules::{Classifier, FixedBands, RuleDef, RuleError, RuleSet};
use lightlvl_scan::{DEFAULT_RADIUS, ScanSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "lightlvl.toml";

const HEADER: &str = "\
# lightlvl settings. Rewritten by the game whenever a setting changes.
#
# radius: blocks scanned around the player, not counting the player's own block. 1 to 65536.
#   Large values keep frame rate but make the overlay update less smoothly.
# shape: \"sphere\" or \"cube\".
# color_contrast: swap red for blue and yellow for cyan in the built-in bands.
# include_transparent: also list lit floor blocks, with a fully transparent color. Off by default.
#
# Without [[rules]] the built-in bands are used: nothing when block and sun light are both
# at least 8, yellow when only sun light is, red when neither is.
# [[rules]] are evaluated top to bottom and the first match wins, so earlier rules override
# later ones. light_type is \"Block\" or \"Sun\"; over_or_under is \"Over\" (level >= light_level)
# or \"Under\" (level < light_level); red, green, blue and opacity are 0-255. Blocks matching
# no rule are not highlighted. Example:
#
# [[rules]]
# light_type = \"Block\"
# over_or_under = \"Over\"
# light_level = 8
# red = 0
# green = 255
# blue = 0
# opacity = 32

";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io: {0}")]
    Io(#[from] io::Error),
    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("radius must be at least 1, got {0}")]
    NonPositiveRadius(i64),
    #[error("radius {0} is too large")]
    RadiusTooLarge(i64),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Missing,
    /// File existed but was unusable; defaults were substituted.
    Recovered(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    #[serde(default = "default_radius")]
    pub radius: u32,
    #[serde(default)]
    pub shape: ScanShape,
    #[serde(default)]
    pub color_contrast: bool,
    #[serde(default = "default_include_transparent")]
    pub include_transparent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<RuleDef>>,
}

fn default_radius() -> u32 {
    DEFAULT_RADIUS
}
fn default_include_transparent() -> bool {
    false
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            shape: ScanShape::Sphere,
            color_contrast: false,
            include_transparent: default_include_transparent(),
            rules: None,
        }
    }
}

impl LightConfig {
    pub fn from_toml_str(s: &str) -> Result<LightConfig, ConfigError> {
        let cfg: LightConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<LightConfig, ConfigError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// Missing or broken files yield defaults; broken ones are logged.
    pub fn load_or_default(path: &Path) -> (LightConfig, LoadOutcome) {
        match Self::load(path) {
            Ok(cfg) => (cfg, LoadOutcome::Loaded),
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("no config at {}; using defaults", path.display());
                (LightConfig::default(), LoadOutcome::Missing)
            }
            Err(e) => {
                log::warn!("config file {} had errors, using defaults: {}", path.display(), e);
                (LightConfig::default(), LoadOutcome::Recovered(e.to_string()))
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.radius == 0 {
            return Err(ConfigError::NonPositiveRadius(0));
        }
        if self.radius > MAX_RADIUS {
            return Err(ConfigError::RadiusTooLarge(i64::from(self.radius)));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        let body = toml::to_string_pretty(self)?;
        Ok(format!("{HEADER}{body}"))
    }

    /// Writes the file and returns the text written.
    pub fn store(&self, path: &Path) -> Result<String, ConfigError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let text = self.to_toml_string()?;
        fs::write(path, &text)?;
        Ok(text)
    }

    /// Settings for the scanner, failing on a misconfigured rule.
    pub fn compile_checked(&self) -> Result<ScanSettings, RuleError> {
        let classifier = match self.rules.as_deref() {
            Some(defs) if !defs.is_empty() => Classifier::Rules(RuleSet::compile(defs)?),
            _ => Classifier::Fixed(FixedBands::new(self.color_contrast)),
        };
        Ok(ScanSettings::new(self.radius, self.shape, classifier)
            .with_include_transparent(self.include_transparent))
    }

    /// Like [`LightConfig::compile_checked`], but a bad rule list falls back to the fixed bands.
    pub fn compile(&self) -> ScanSettings {
        match self.compile_checked() {
            Ok(s) => s,
            Err(e) => {
                log::error!("{e}; rules disabled, using built-in light bands");
                ScanSettings::new(
                    self.radius,
                    self.shape,
                    Classifier::Fixed(FixedBands::new(self.color_contrast)),
                )
                .with_include_transparent(self.include_transparent)
            }
        }
    }
}

//! Configuration for the EAX layer and the ambisonic decoder

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration, loadable from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlConfig {
    /// EAX emulation settings
    pub eax: EaxConfig,

    /// Ambisonic decoder settings
    pub ambi: AmbiConfig,
}

/// EAX emulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EaxConfig {
    /// Whether the EAX layer may be created at all
    pub enabled: bool,

    /// Log every parsed property call at debug level
    pub trace_calls: bool,
}

impl Default for EaxConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trace_calls: false,
        }
    }
}

/// Physical output layouts that affect `.ambdec` speaker-label aliasing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputLayout {
    Quad,
    /// 5.1 with side surrounds (LB/RB alias to the sides)
    X51,
    /// 5.1 with rear surrounds (LS/RS alias to the backs)
    X51Rear,
    X61,
    X71,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::X51
    }
}

/// Ambisonic decoder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbiConfig {
    /// Device sample rate (Hz), used to normalize the crossover frequency
    pub sample_rate: u32,

    /// Decode two-band `.ambdec` files with both bands
    pub allow_dual_band: bool,

    /// Output layout for speaker-label aliasing
    pub layout: OutputLayout,
}

impl Default for AmbiConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            allow_dual_band: true,
            layout: OutputLayout::X51,
        }
    }
}

impl AlConfig {
    /// Parse from a JSON string; missing fields use defaults
    pub fn from_json(text: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("[Config] Loaded {}", path.as_ref().display());
        Self::from_json(&text)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Configuration with the EAX layer switched off
    pub fn without_eax() -> Self {
        Self {
            eax: EaxConfig {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Configuration for debugging call traffic
    pub fn tracing() -> Self {
        Self {
            eax: EaxConfig {
                trace_calls: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Builder pattern: set sample rate
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.ambi.sample_rate = sample_rate;
        self
    }

    /// Builder pattern: set output layout
    pub fn with_layout(mut self, layout: OutputLayout) -> Self {
        self.ambi.layout = layout;
        self
    }

    /// Builder pattern: enable or disable dual-band decoding
    pub fn with_dual_band(mut self, allow: bool) -> Self {
        self.ambi.allow_dual_band = allow;
        self
    }

    fn validate(&self) -> CoreResult<()> {
        if self.ambi.sample_rate == 0 {
            return Err(CoreError::InvalidConfig("sample_rate must be nonzero".into()));
        }
        Ok(())
    }
}

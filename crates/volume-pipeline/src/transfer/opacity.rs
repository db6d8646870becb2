//! Opacity channels and their presets.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Channel count of the compact opacity editor.
pub const COMPACT_CHANNELS: usize = 9;

/// Channel count of the detailed opacity editor.
pub const DETAILED_CHANNELS: usize = 18;

/// Narrow opaque band just above the bottom quarter of the range.
pub const SHARP_CORE: [f64; 9] = [0.1, 0.2, 1.0, 0.9, 0.2, 0.1, 0.0, 0.0, 0.0];

pub const SMOOTH_CORE: [f64; 9] = [0.3, 0.6, 1.0, 0.8, 0.4, 0.2, 0.1, 0.0, 0.0];

pub const WIDE_CORE: [f64; 9] = [0.4, 0.5, 1.0, 1.0, 0.5, 0.3, 0.1, 0.1, 0.0];

/// Default channels of a new session.
pub const DEFAULT_18: [f64; 18] = [
    0.0, 0.05, 0.1, 0.15, 0.2, 0.4, 0.6, 0.8, 1.0, 0.9, 0.7, 0.5, 0.3, 0.2, 0.1, 0.05, 0.0, 0.0,
];

/// Ordered opacity samples in `[0, 1]`, at least two of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct OpacityChannels(Vec<f64>);

impl OpacityChannels {
    /// Validate and clamp raw channel values.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.len() < 2 {
            return Err(PipelineError::invalid_channels(format!(
                "need at least 2 channels, got {}",
                values.len()
            )));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(PipelineError::invalid_channels(format!(
                "channel value {bad} is not finite"
            )));
        }
        Ok(Self(values.into_iter().map(|v| v.clamp(0.0, 1.0)).collect()))
    }

    /// Generate `n` channels from a preset.
    pub fn from_preset(preset: OpacityPreset, n: usize) -> Result<Self> {
        if n < 2 {
            return Err(PipelineError::invalid_channels(format!(
                "need at least 2 channels, got {n}"
            )));
        }
        Ok(Self(preset.samples(n)))
    }

    /// Look up a named profile.
    pub fn named(name: &str) -> Option<Self> {
        let values: &[f64] = match name {
            "sharp-core" => &SHARP_CORE,
            "smooth-core" => &SMOOTH_CORE,
            "wide-core" => &WIDE_CORE,
            "default-18" => &DEFAULT_18,
            _ => return None,
        };
        Some(Self(values.to_vec()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Linearly resample to `n` channels, keeping both end values.
    pub fn resized(&self, n: usize) -> Result<Self> {
        if n < 2 {
            return Err(PipelineError::invalid_channels(format!(
                "need at least 2 channels, got {n}"
            )));
        }
        if n == self.0.len() {
            return Ok(self.clone());
        }

        let last = (self.0.len() - 1) as f64;
        let values = (0..n)
            .map(|i| {
                let t = i as f64 / (n - 1) as f64 * last;
                let lo = t.floor() as usize;
                let hi = (lo + 1).min(self.0.len() - 1);
                let f = t - lo as f64;
                self.0[lo] * (1.0 - f) + self.0[hi] * f
            })
            .collect();
        Ok(Self(values))
    }
}

impl Default for OpacityChannels {
    fn default() -> Self {
        Self(DEFAULT_18.to_vec())
    }
}

impl TryFrom<Vec<f64>> for OpacityChannels {
    type Error = PipelineError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<OpacityChannels> for Vec<f64> {
    fn from(channels: OpacityChannels) -> Self {
        channels.0
    }
}

/// Shapes an opacity ramp can be reset to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpacityPreset {
    /// Everything opaque
    Full,
    /// Transparent low values, opaque high values
    LinearUp,
    LinearDown,
    /// Opaque middle, transparent ends
    MaxMiddle,
    MaxSides,
}

impl OpacityPreset {
    /// The preset sampled at `n >= 2` evenly spaced channels.
    pub fn samples(&self, n: usize) -> Vec<f64> {
        let last = (n - 1) as f64;
        let mid = last / 2.0;
        (0..n)
            .map(|i| {
                let i = i as f64;
                match self {
                    Self::Full => 1.0,
                    Self::LinearUp => i / last,
                    Self::LinearDown => (last - i) / last,
                    Self::MaxMiddle => (1.0 - (i - mid).abs() / mid).max(0.0),
                    Self::MaxSides => ((i - mid).abs() / mid).min(1.0),
                }
            })
            .collect()
    }
}

impl FromStr for OpacityPreset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "linear-up" => Ok(Self::LinearUp),
            "linear-down" => Ok(Self::LinearDown),
            "max-middle" => Ok(Self::MaxMiddle),
            "max-sides" => Ok(Self::MaxSides),
            _ => Err(format!("unknown opacity preset '{s}'")),
        }
    }
}

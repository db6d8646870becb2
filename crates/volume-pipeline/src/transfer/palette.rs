//! Named color palettes as anchor tables.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

/// An `(fraction, rgb)` anchor; fraction is in `[0, 1]`, channels in `[0, 1]`.
pub type Anchor = (f64, [f64; 3]);

const RD_YL_BU_R: &[Anchor] = &[
    (0.0, [0.0, 0.0, 1.0]),
    (0.3, [0.0, 1.0, 1.0]),
    (0.5, [1.0, 1.0, 0.0]),
    (0.7, [1.0, 0.5, 0.0]),
    (1.0, [1.0, 0.0, 0.0]),
];

const VIRIDIS: &[Anchor] = &[
    (0.0, [0.267, 0.004, 0.329]),
    (0.25, [0.229, 0.322, 0.545]),
    (0.5, [0.127, 0.566, 0.550]),
    (0.75, [0.369, 0.788, 0.382]),
    (1.0, [0.993, 0.906, 0.144]),
];

const PLASMA: &[Anchor] = &[
    (0.0, [0.050, 0.030, 0.529]),
    (0.25, [0.494, 0.016, 0.655]),
    (0.5, [0.808, 0.067, 0.472]),
    (0.75, [0.965, 0.451, 0.176]),
    (1.0, [0.984, 0.906, 0.145]),
];

const INFERNO: &[Anchor] = &[
    (0.0, [0.000, 0.000, 0.014]),
    (0.25, [0.341, 0.062, 0.429]),
    (0.5, [0.733, 0.216, 0.329]),
    (0.75, [0.976, 0.576, 0.176]),
    (1.0, [0.988, 0.998, 0.645]),
];

const JET: &[Anchor] = &[
    (0.0, [0.0, 0.0, 0.5]),
    (0.2, [0.0, 0.0, 1.0]),
    (0.4, [0.0, 1.0, 1.0]),
    (0.6, [1.0, 1.0, 0.0]),
    (0.8, [1.0, 0.0, 0.0]),
    (1.0, [0.5, 0.0, 0.0]),
];

const RAINBOW: &[Anchor] = &[
    (0.0, [0.5, 0.0, 1.0]),
    (0.17, [0.0, 0.0, 1.0]),
    (0.33, [0.0, 1.0, 1.0]),
    (0.5, [0.0, 1.0, 0.0]),
    (0.67, [1.0, 1.0, 0.0]),
    (0.83, [1.0, 0.5, 0.0]),
    (1.0, [1.0, 0.0, 0.0]),
];

/// Supported color palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Palette {
    /// Blue through yellow to red
    #[default]
    RdYlBuR,
    Viridis,
    Plasma,
    Inferno,
    Jet,
    Rainbow,
}

/// Lookup table: name → palette and its anchors.
const PALETTES: &[(&str, Palette, &[Anchor])] = &[
    ("RdYlBu_r", Palette::RdYlBuR, RD_YL_BU_R),
    ("viridis", Palette::Viridis, VIRIDIS),
    ("plasma", Palette::Plasma, PLASMA),
    ("inferno", Palette::Inferno, INFERNO),
    ("jet", Palette::Jet, JET),
    ("rainbow", Palette::Rainbow, RAINBOW),
];

impl Palette {
    pub const ALL: [Palette; 6] = [
        Palette::RdYlBuR,
        Palette::Viridis,
        Palette::Plasma,
        Palette::Inferno,
        Palette::Jet,
        Palette::Rainbow,
    ];

    /// Exact name lookup.
    pub fn lookup(name: &str) -> Option<Palette> {
        PALETTES
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|&(_, palette, _)| palette)
    }

    /// Name lookup that falls back to the default palette.
    pub fn from_name(name: &str) -> Palette {
        Self::lookup(name).unwrap_or_else(|| {
            warn!(palette = name, fallback = %Palette::default(), "Unknown palette, using default");
            Palette::default()
        })
    }

    pub fn name(&self) -> &'static str {
        self.entry().0
    }

    /// Ordered anchors of this palette.
    pub fn anchors(&self) -> &'static [Anchor] {
        self.entry().2
    }

    fn entry(&self) -> &'static (&'static str, Palette, &'static [Anchor]) {
        PALETTES
            .iter()
            .find(|(_, p, _)| p == self)
            .unwrap_or(&PALETTES[0])
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Palette {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| format!("unknown palette '{s}'"))
    }
}

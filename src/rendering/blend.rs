//! Per-pixel compositing operations.
//!
//! Colours are straight (non-premultiplied) RGBA8. The operation names follow
//! the canvas `globalCompositeOperation` vocabulary so configuration files and
//! the web target can share them.

use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    SourceOver,
    /// Erases the destination where the source is opaque ("punch a hole")
    DestinationOut,
    Multiply,
    Screen,
    Darken,
    Lighten,
    Lighter,
}

impl BlendMode {
    pub fn all() -> &'static [BlendMode] {
        &[
            BlendMode::SourceOver,
            BlendMode::DestinationOut,
            BlendMode::Multiply,
            BlendMode::Screen,
            BlendMode::Darken,
            BlendMode::Lighten,
            BlendMode::Lighter,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlendMode::SourceOver => "source-over",
            BlendMode::DestinationOut => "destination-out",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::Lighter => "lighter",
        }
    }

    /// Separable blend function `B(backdrop, source)` on normalized channels
    fn separable(&self, cb: f32, cs: f32) -> f32 {
        match self {
            BlendMode::Multiply => cb * cs,
            BlendMode::Screen => cb + cs - cb * cs,
            BlendMode::Darken => cb.min(cs),
            BlendMode::Lighten => cb.max(cs),
            _ => cs,
        }
    }

    /// Composites `src` onto `dst` in place, with `opacity` acting as global alpha
    pub fn apply(&self, dst: &mut Rgba<u8>, src: Rgba<u8>, opacity: f32) {
        let sa = (src[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let da = dst[3] as f32 / 255.0;

        match self {
            BlendMode::DestinationOut => {
                dst[3] = to_u8(da * (1.0 - sa));
            }
            BlendMode::Lighter => {
                let out_a = (sa + da).min(1.0);
                for i in 0..3 {
                    let premul =
                        (src[i] as f32 / 255.0 * sa + dst[i] as f32 / 255.0 * da).min(1.0);
                    dst[i] = if out_a > 0.0 { to_u8(premul / out_a) } else { 0 };
                }
                dst[3] = to_u8(out_a);
            }
            _ => {
                let out_a = sa + da * (1.0 - sa);
                for i in 0..3 {
                    let cs = src[i] as f32 / 255.0;
                    let cb = dst[i] as f32 / 255.0;
                    let mixed = (1.0 - da) * cs + da * self.separable(cb, cs);
                    let premul = sa * mixed + da * (1.0 - sa) * cb;
                    dst[i] = to_u8(premul / out_a);
                }
                dst[3] = to_u8(out_a);
            }
        }
    }
}

impl Default for BlendMode {
    fn default() -> Self {
        Self::SourceOver
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlendMode {
    type Err = crate::MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlendMode::all()
            .iter()
            .copied()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| crate::MapError::Render(format!("unknown blend mode '{s}'")))
    }
}

fn to_u8(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

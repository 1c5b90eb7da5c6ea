//! Light presentation types.
//!
//! The light shows exactly one thing at a time: either a static named
//! color or a running effect. [`LightState`] encodes that as a sum type,
//! so "both" and "neither" are unrepresentable.
//!
//! Color and effect names form closed sets. Parsing is case-insensitive
//! and ignores surrounding whitespace; anything outside the set is an
//! [`InvalidInput`].

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a closed, lowercase-named enum with parsing and display.
macro_rules! closed_set {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:expr) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
        #[serde(rename_all = "lowercase")]
        #[ts(export, export_to = "bindings/")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every supported value, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The canonical lowercase name.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = InvalidInput;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| InvalidInput::new($kind, s))
            }
        }
    };
}

closed_set! {
    /// A supported static light color.
    ColorName (InputKind::Color) {
        /// Red.
        Red => "red",
        /// Orange.
        Orange => "orange",
        /// Yellow.
        Yellow => "yellow",
        /// Green.
        Green => "green",
        /// Blue (the start-up color).
        Blue => "blue",
        /// Purple.
        Purple => "purple",
        /// Pink.
        Pink => "pink",
        /// Cool white.
        White => "white",
        /// Cyan.
        Cyan => "cyan",
        /// Magenta.
        Magenta => "magenta",
        /// Warm white.
        Warm => "warm",
        /// Light off.
        Off => "off",
    }
}

closed_set! {
    /// A supported light effect.
    EffectId (InputKind::Effect) {
        /// Continuous hue cycle.
        Rainbow => "rainbow",
        /// Fast white flashes.
        Strobe => "strobe",
        /// Sharp brightness pulses.
        Pulse => "pulse",
        /// Slow fade in and out.
        Breathe => "breathe",
        /// Alternating red and blue.
        Police => "police",
        /// Warm flicker.
        Candle => "candle",
    }
}

/// The current light presentation.
///
/// Serialized as `{"mode": "color", "value": "red"}` or
/// `{"mode": "effect", "value": "rainbow"}`. This is the payload pushed
/// to viewers and returned from mutation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "mode", content = "value", rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum LightState {
    /// A static color.
    Color(ColorName),
    /// A running effect.
    Effect(EffectId),
}

impl LightState {
    /// The presentation value as a plain string (color name or effect id).
    pub const fn value(self) -> &'static str {
        match self {
            Self::Color(c) => c.as_str(),
            Self::Effect(e) => e.as_str(),
        }
    }

    /// The presentation mode name (`color` or `effect`).
    pub const fn mode(self) -> &'static str {
        match self {
            Self::Color(_) => "color",
            Self::Effect(_) => "effect",
        }
    }
}

impl Default for LightState {
    fn default() -> Self {
        Self::Color(ColorName::Blue)
    }
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.mode(), self.value())
    }
}

/// Which closed set a rejected name was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A color name.
    Color,
    /// An effect id.
    Effect,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color => f.write_str("color"),
            Self::Effect => f.write_str("effect"),
        }
    }
}

/// A requested color or effect outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported {kind}: {value:?}")]
pub struct InvalidInput {
    /// Which set the value was checked against.
    pub kind: InputKind,
    /// The value as it was requested.
    pub value: String,
}

impl InvalidInput {
    /// Build a rejection for `value`.
    pub fn new(kind: InputKind, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

//! Viewer configuration.
//!
//! Every tunable the viewer reads lives in `ViewerConfig`. A config is built
//! once when a session is presented and never mutated by the gallery core.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Default delay before a press turns into a long press.
pub const DEFAULT_LONG_PRESS_DELAY: Duration = Duration::from_millis(800);

/// Swipe-to-close is on by default only where touch is the primary input.
pub const DEFAULT_SWIPE_TO_CLOSE: bool = cfg!(any(target_os = "ios", target_os = "android"));

pub const DEFAULT_DOUBLE_TAP_TO_ZOOM: bool = true;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid color {input:?}: {reason}")]
    InvalidColor { input: String, reason: &'static str },
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// RGBA colour with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let invalid = |reason| ConfigError::InvalidColor {
            input: input.to_string(),
            reason,
        };
        let hex = input
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| invalid("missing leading '#'"))?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid("non-hex digit"));
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid("non-hex digit"));
        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Color::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 | 8 => {
                let a = if hex.len() == 8 { channel(&hex[6..8])? } else { 255 };
                Ok(Color {
                    r: channel(&hex[0..2])?,
                    g: channel(&hex[2..4])?,
                    b: channel(&hex[4..6])?,
                    a,
                })
            }
            _ => Err(invalid("expected 3, 6 or 8 hex digits")),
        }
    }

    /// CSS `rgba()` form, used by the host's stylesheet.
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {:.3})",
            self.r,
            self.g,
            self.b,
            f64::from(self.a) / 255.0
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// How the presentation host animates the modal in and out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalAnimation {
    None,
    Slide,
    #[default]
    Fade,
}

impl ModalAnimation {
    /// Whether closing fades the content out.
    pub fn fades(self) -> bool {
        self == ModalAnimation::Fade
    }

    /// Whether closing slides the content off the bottom edge.
    pub fn slides(self) -> bool {
        self == ModalAnimation::Slide
    }

    /// `None` hides at once; the animated styles take time.
    pub fn is_animated(self) -> bool {
        self != ModalAnimation::None
    }
}

impl std::str::FromStr for ModalAnimation {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "none" => Ok(ModalAnimation::None),
            "slide" => Ok(ModalAnimation::Slide),
            "fade" => Ok(ModalAnimation::Fade),
            _ => Err(ConfigError::InvalidValue {
                key: "LIGHTBOX_ANIMATION",
                value: value.to_string(),
            }),
        }
    }
}

/// How the modal is laid over the presenting surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentationStyle {
    FullScreen,
    #[default]
    OverFullScreen,
    PageSheet,
}

impl PresentationStyle {
    /// Whether the viewer takes over the whole screen.
    pub fn covers_screen(self) -> bool {
        matches!(
            self,
            PresentationStyle::FullScreen | PresentationStyle::OverFullScreen
        )
    }

    /// Whether whatever is behind the viewer stays visible through a
    /// translucent backdrop.
    pub fn shows_presenter(self) -> bool {
        self == PresentationStyle::OverFullScreen
    }
}

impl std::str::FromStr for PresentationStyle {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "fullscreen" => Ok(PresentationStyle::FullScreen),
            "overfullscreen" => Ok(PresentationStyle::OverFullScreen),
            "pagesheet" => Ok(PresentationStyle::PageSheet),
            _ => Err(ConfigError::InvalidValue {
                key: "LIGHTBOX_PRESENTATION",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Allow vertical swipes on an unzoomed image to dismiss the viewer.
    pub swipe_to_close_enabled: bool,
    /// Toggle 2x zoom on double tap.
    pub double_tap_to_zoom_enabled: bool,
    /// Hold time before a press is reported as a long press.
    pub long_press_delay: Duration,
    /// Backdrop tint behind the pages.
    pub background_color: Color,
    /// Close transition run by the host after a close is accepted.
    pub animation: ModalAnimation,
    /// Window mode of the host.
    pub presentation: PresentationStyle,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            swipe_to_close_enabled: DEFAULT_SWIPE_TO_CLOSE,
            double_tap_to_zoom_enabled: DEFAULT_DOUBLE_TAP_TO_ZOOM,
            long_press_delay: DEFAULT_LONG_PRESS_DELAY,
            background_color: Color::BLACK,
            animation: ModalAnimation::default(),
            presentation: PresentationStyle::default(),
        }
    }
}

impl ViewerConfig {
    /// Defaults with `LIGHTBOX_*` environment overrides applied.
    ///
    /// Invalid overrides are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let apply = |key: &'static str, set: &mut dyn FnMut(&str) -> Result<(), ConfigError>| {
            if let Some(value) = lookup(key) {
                if let Err(err) = set(value.trim()) {
                    warn!(%err, "Ignoring environment override");
                }
            }
        };

        apply("LIGHTBOX_SWIPE_TO_CLOSE", &mut |v| {
            config.swipe_to_close_enabled = parse_flag("LIGHTBOX_SWIPE_TO_CLOSE", v)?;
            Ok(())
        });
        apply("LIGHTBOX_DOUBLE_TAP_ZOOM", &mut |v| {
            config.double_tap_to_zoom_enabled = parse_flag("LIGHTBOX_DOUBLE_TAP_ZOOM", v)?;
            Ok(())
        });
        apply("LIGHTBOX_LONG_PRESS_MS", &mut |v| {
            let ms = v
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "LIGHTBOX_LONG_PRESS_MS",
                    value: v.to_string(),
                })?;
            config.long_press_delay = Duration::from_millis(ms);
            Ok(())
        });
        apply("LIGHTBOX_BG_COLOR", &mut |v| {
            config.background_color = Color::parse(v)?;
            Ok(())
        });
        apply("LIGHTBOX_ANIMATION", &mut |v| {
            config.animation = v.parse()?;
            Ok(())
        });
        apply("LIGHTBOX_PRESENTATION", &mut |v| {
            config.presentation = v.parse()?;
            Ok(())
        });

        config
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

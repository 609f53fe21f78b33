//! RGBA color type used for cell foreground and background.
//!
//! Colors are stored as `f32` components in `[0.0, 1.0]` and quantized to
//! 8 bits only when an SGR sequence is written. Comparisons on the diff path
//! use [`Rgba::approx_eq`] so float rounding noise never forces a redraw.
//!
//! # Examples
//!
//! ```
//! use vtframe::Rgba;
//!
//! let accent = Rgba::from_hex("#1a1a2e").unwrap();
//! assert_eq!(accent.to_rgb_u8(), (0x1a, 0x1a, 0x2e));
//! assert!(Rgba::WHITE.approx_eq(Rgba::new(1.0, 1.0, 1.0 - 1e-7, 1.0)));
//! ```

/// Per-component tolerance for color equality on the diff path.
pub const COLOR_EPSILON: f32 = 1e-5;

/// Alpha below which a background is treated as the terminal default.
pub const TRANSPARENT_ALPHA_THRESHOLD: f32 = 0.001;

/// RGBA color with f32 components in range [0.0, 1.0].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Opaque red.
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);

    /// Create a new RGBA color from f32 components.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from f32 RGB components.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create an opaque color from u8 RGB components.
    #[must_use]
    pub fn from_rgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba_u8(r, g, b, 255)
    }

    /// Create a color from u8 RGBA components.
    #[must_use]
    pub fn from_rgba_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
            a: f32::from(a) / 255.0,
        }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the `#` is optional).
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, ch) in out.iter_mut().zip(hex.chars()) {
                    let v = ch.to_digit(16)? as u8;
                    *slot = v * 17;
                }
                Some(Self::from_rgb_u8(out[0], out[1], out[2]))
            }
            6 => Some(Self::from_rgb_u8(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
            )),
            8 => Some(Self::from_rgba_u8(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                byte(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Return a new color with the specified alpha value.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self::new(self.r, self.g, self.b, alpha)
    }

    /// Convert to u8 RGB tuple, clamping values to [0, 255].
    #[must_use]
    pub fn to_rgb_u8(self) -> (u8, u8, u8) {
        let to_u8 = |value: f32| (value * 255.0).round().clamp(0.0, 255.0) as u8;
        (to_u8(self.r), to_u8(self.g), to_u8(self.b))
    }

    /// Component-wise equality within [`COLOR_EPSILON`].
    #[inline]
    #[must_use]
    pub fn approx_eq(self, other: Self) -> bool {
        (self.r - other.r).abs() < COLOR_EPSILON
            && (self.g - other.g).abs() < COLOR_EPSILON
            && (self.b - other.b).abs() < COLOR_EPSILON
            && (self.a - other.a).abs() < COLOR_EPSILON
    }

    /// True when the alpha is low enough to mean "terminal default".
    #[inline]
    #[must_use]
    pub fn is_default_alpha(self) -> bool {
        self.a < TRANSPARENT_ALPHA_THRESHOLD
    }
}

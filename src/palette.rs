//! The fixed set of color tokens a category can carry, and the color math
//! used to shade its rows.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowers HSB brightness by `fraction` (0.0..=1.0), clamping at black.
    /// Hue and saturation are kept.
    pub fn darken(self, fraction: f64) -> Rgb {
        let brightness = f64::from(self.r.max(self.g).max(self.b)) / 255.0;
        if brightness == 0.0 {
            return self;
        }
        let target = (brightness - fraction.clamp(0.0, 1.0)).max(0.0);
        let scale = target / brightness;
        let channel = |c: u8| (f64::from(c) * scale).round() as u8;
        Rgb::new(channel(self.r), channel(self.g), channel(self.b))
    }

    /// Relative luminance per WCAG, in 0.0..=1.0.
    pub fn luminance(self) -> f64 {
        let linear = |c: u8| {
            let c = f64::from(c) / 255.0;
            if c <= 0.039_28 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    /// Flat black on light backgrounds, flat white on dark ones.
    pub fn contrast(self) -> Rgb {
        if self.luminance() > 0.5 {
            FLAT_BLACK
        } else {
            FLAT_WHITE
        }
    }
}

pub const FLAT_BLACK: Rgb = Rgb::new(0x26, 0x26, 0x26);
pub const FLAT_WHITE: Rgb = Rgb::new(0xEC, 0xF0, 0xF1);

pub const DEFAULT_TOKEN: &str = "purple";

pub const PALETTE: [(&str, Rgb); 10] = [
    ("red", Rgb::new(0xE7, 0x4C, 0x3C)),
    ("orange", Rgb::new(0xE6, 0x7E, 0x22)),
    ("yellow", Rgb::new(0xFF, 0xCD, 0x02)),
    ("green", Rgb::new(0x2E, 0xCC, 0x71)),
    ("mint", Rgb::new(0x1A, 0xBC, 0x9C)),
    ("teal", Rgb::new(0x3A, 0x6F, 0x81)),
    ("blue", Rgb::new(0x34, 0x98, 0xDB)),
    ("purple", Rgb::new(0x9B, 0x59, 0xB6)),
    ("pink", Rgb::new(0xF4, 0x7C, 0xC3)),
    ("gray", Rgb::new(0x95, 0xA5, 0xA6)),
];

pub fn lookup(token: &str) -> Option<Rgb> {
    PALETTE
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(token))
        .map(|(_, rgb)| *rgb)
}

/// Color for a category's token, falling back to the default entry for
/// missing or unknown tokens.
pub fn resolve(token: Option<&str>) -> Rgb {
    token
        .and_then(lookup)
        .or_else(|| lookup(DEFAULT_TOKEN))
        .unwrap_or(FLAT_WHITE)
}

pub fn token_names() -> Vec<&'static str> {
    PALETTE.iter().map(|(name, _)| *name).collect()
}

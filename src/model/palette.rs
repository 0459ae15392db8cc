use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn distance_sq(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

/// The closed set of colour labels a manifest entry may carry.
///
/// Declaration order is significant: it breaks ties in [`PaletteColor::nearest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaletteColor {
    Red,
    Orange,
    Yellow,
    Green,
    Teal,
    Blue,
    Purple,
    Pink,
    Brown,
    Black,
    White,
    Neutral,
}

impl PaletteColor {
    pub const ALL: [PaletteColor; 12] = [
        PaletteColor::Red,
        PaletteColor::Orange,
        PaletteColor::Yellow,
        PaletteColor::Green,
        PaletteColor::Teal,
        PaletteColor::Blue,
        PaletteColor::Purple,
        PaletteColor::Pink,
        PaletteColor::Brown,
        PaletteColor::Black,
        PaletteColor::White,
        PaletteColor::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaletteColor::Red => "Red",
            PaletteColor::Orange => "Orange",
            PaletteColor::Yellow => "Yellow",
            PaletteColor::Green => "Green",
            PaletteColor::Teal => "Teal",
            PaletteColor::Blue => "Blue",
            PaletteColor::Purple => "Purple",
            PaletteColor::Pink => "Pink",
            PaletteColor::Brown => "Brown",
            PaletteColor::Black => "Black",
            PaletteColor::White => "White",
            PaletteColor::Neutral => "Neutral",
        }
    }

    pub fn rgb(&self) -> Rgb {
        match self {
            PaletteColor::Red => Rgb::new(200, 40, 40),
            PaletteColor::Orange => Rgb::new(235, 130, 40),
            PaletteColor::Yellow => Rgb::new(235, 215, 60),
            PaletteColor::Green => Rgb::new(60, 150, 60),
            PaletteColor::Teal => Rgb::new(40, 150, 150),
            PaletteColor::Blue => Rgb::new(50, 90, 190),
            PaletteColor::Purple => Rgb::new(120, 60, 160),
            PaletteColor::Pink => Rgb::new(230, 140, 180),
            PaletteColor::Brown => Rgb::new(120, 80, 45),
            PaletteColor::Black => Rgb::new(20, 20, 20),
            PaletteColor::White => Rgb::new(240, 240, 240),
            PaletteColor::Neutral => Rgb::new(128, 128, 128),
        }
    }

    /// Case-insensitive lookup by palette name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|color| color.as_str().eq_ignore_ascii_case(name))
    }

    /// Palette entry closest to `rgb` by Euclidean distance.
    pub fn nearest(rgb: Rgb) -> Self {
        nearest_in(&Self::ALL, rgb).unwrap_or(PaletteColor::Neutral)
    }
}

fn nearest_in(candidates: &[PaletteColor], rgb: Rgb) -> Option<PaletteColor> {
    let mut best: Option<(PaletteColor, u32)> = None;
    for &color in candidates {
        let distance = rgb.distance_sq(color.rgb());
        // strict comparison keeps the earlier entry on ties
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((color, distance));
        }
    }
    best.map(|(color, _)| color)
}

impl std::fmt::Display for PaletteColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

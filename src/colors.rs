// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turns escape values into colors.  There are three families of
//! color scheme: a plain grayscale ramp, a walk around the hue wheel
//! that can be rotated by an offset, and a handful of fixed palettes
//! that are looked up by index.

use std::fmt;
use std::str::FromStr;

use crate::errors::Error;

/// A single 8-bit-per-channel color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Packs the color into the low 24 bits of a word, red highest.
    pub fn pack(self) -> u32 {
        (u32::from(self.0) << 16) | (u32::from(self.1) << 8) | u32::from(self.2)
    }

    /// The inverse of `pack`; the top byte is ignored.
    pub fn unpack(word: u32) -> Rgb {
        Rgb((word >> 16) as u8, (word >> 8) as u8, word as u8)
    }
}

/// The built-in lookup tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Palette {
    /// Black through red and orange to white.
    Fire,
    /// Deep navy through teal to pale cyan.
    Ocean,
    /// Dark violet through rose to cream.
    Twilight,
}

impl Palette {
    /// Every palette, in cycling order.
    pub const ALL: [Palette; 3] = [Palette::Fire, Palette::Ocean, Palette::Twilight];

    fn index(self) -> usize {
        match self {
            Palette::Fire => 0,
            Palette::Ocean => 1,
            Palette::Twilight => 2,
        }
    }

    // Control points of the gradient; the first must sit at 0 and the
    // last at 255.
    fn stops(self) -> &'static [(u8, Rgb)] {
        match self {
            Palette::Fire => &[
                (0, Rgb(0, 0, 0)),
                (64, Rgb(128, 0, 0)),
                (160, Rgb(255, 128, 0)),
                (224, Rgb(255, 255, 0)),
                (255, Rgb(255, 255, 255)),
            ],
            Palette::Ocean => &[
                (0, Rgb(0, 0, 32)),
                (96, Rgb(0, 64, 128)),
                (192, Rgb(0, 170, 200)),
                (255, Rgb(224, 255, 255)),
            ],
            Palette::Twilight => &[
                (0, Rgb(20, 10, 40)),
                (80, Rgb(120, 40, 140)),
                (170, Rgb(230, 120, 90)),
                (255, Rgb(250, 230, 180)),
            ],
        }
    }

    fn next(self) -> Option<Palette> {
        match self {
            Palette::Fire => Some(Palette::Ocean),
            Palette::Ocean => Some(Palette::Twilight),
            Palette::Twilight => None,
        }
    }
}

/// How escape values become colors.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorScheme {
    /// The escape value on all three channels.
    Grayscale,
    /// Fully saturated hue, rotated by the given number of degrees.
    HueCycle(u16),
    /// Verbatim lookup in one of the built-in tables.
    Indexed(Palette),
}

impl ColorScheme {
    /// The number of distinct schemes `cycle` walks through: grayscale,
    /// hue, and one per palette.
    pub const COUNT: usize = 5;

    /// The scheme after this one.  `hue_offset` is the rotation given
    /// to the hue scheme when we arrive at it.
    pub fn cycle(self, hue_offset: u16) -> ColorScheme {
        match self {
            ColorScheme::Grayscale => ColorScheme::HueCycle(hue_offset),
            ColorScheme::HueCycle(_) => ColorScheme::Indexed(Palette::ALL[0]),
            ColorScheme::Indexed(p) => match p.next() {
                Some(p) => ColorScheme::Indexed(p),
                None => ColorScheme::Grayscale,
            },
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::HueCycle(0)
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ColorScheme::Grayscale => write!(f, "gray"),
            ColorScheme::HueCycle(offset) => write!(f, "hue+{}", offset),
            ColorScheme::Indexed(Palette::Fire) => write!(f, "fire"),
            ColorScheme::Indexed(Palette::Ocean) => write!(f, "ocean"),
            ColorScheme::Indexed(Palette::Twilight) => write!(f, "twilight"),
        }
    }
}

impl FromStr for ColorScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gray" | "grey" | "grayscale" => Ok(ColorScheme::Grayscale),
            "hue" => Ok(ColorScheme::HueCycle(0)),
            "fire" => Ok(ColorScheme::Indexed(Palette::Fire)),
            "ocean" => Ok(ColorScheme::Indexed(Palette::Ocean)),
            "twilight" => Ok(ColorScheme::Indexed(Palette::Twilight)),
            _ => Err(Error::UnknownCommand(s.to_string())),
        }
    }
}

/// Standard six-sector HSV conversion.  `hue` is in degrees, `s` and
/// `v` in `0.0..=1.0`.  Channels are truncated, not rounded.
pub fn hsv_to_rgb(hue: u32, s: f32, v: f32) -> Rgb {
    let sector = (hue / 60) % 6;
    let f = hue as f32 / 60.0 - (hue / 60) as f32;
    let l = (255.0 * v * (1.0 - s)) as u8;
    let m = (255.0 * v * (1.0 - f * s)) as u8;
    let n = (255.0 * v * (1.0 - (1.0 - f) * s)) as u8;
    let v = (255.0 * v) as u8;
    match sector {
        0 => Rgb(v, n, l),
        1 => Rgb(m, v, l),
        2 => Rgb(l, v, n),
        3 => Rgb(l, m, v),
        4 => Rgb(n, l, v),
        _ => Rgb(v, l, m),
    }
}

type Table = [Rgb; 256];

fn build_table(stops: &[(u8, Rgb)]) -> Table {
    let mut table = [Rgb::default(); 256];
    for pair in stops.windows(2) {
        let (start, from) = (usize::from(pair[0].0), pair[0].1);
        let (end, to) = (usize::from(pair[1].0), pair[1].1);
        let span = (end - start) as f32;
        let lerp =
            |a: u8, b: u8, t: f32| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
        for (i, entry) in table.iter_mut().enumerate().take(end + 1).skip(start) {
            let t = (i - start) as f32 / span;
            *entry = Rgb(lerp(from.0, to.0, t), lerp(from.1, to.1, t), lerp(from.2, to.2, t));
        }
    }
    table
}

/// The lookup tables for every built-in palette, computed once.
pub struct PaletteSet {
    tables: Vec<Table>,
}

impl PaletteSet {
    /// Builds every table in `Palette::ALL`.
    pub fn new() -> Self {
        PaletteSet {
            tables: Palette::ALL.iter().map(|p| build_table(p.stops())).collect(),
        }
    }

    /// The 256-entry table for `palette`.
    pub fn table(&self, palette: Palette) -> &[Rgb; 256] {
        &self.tables[palette.index()]
    }
}

impl Default for PaletteSet {
    fn default() -> Self {
        PaletteSet::new()
    }
}

/// Maps escape values to colors.  Holds no per-frame state, so one
/// mapper is shared by every worker.
#[derive(Default)]
pub struct ColorMapper {
    palettes: PaletteSet,
}

impl ColorMapper {
    /// Builds the palette tables.
    pub fn new() -> Self {
        ColorMapper {
            palettes: PaletteSet::new(),
        }
    }

    /// The color of escape value `value` under `scheme`.
    pub fn map(&self, value: u8, scheme: ColorScheme) -> Rgb {
        match scheme {
            ColorScheme::Grayscale => Rgb(value, value, value),
            ColorScheme::HueCycle(offset) => {
                let hue = (u32::from(value) * 360 / 255 + u32::from(offset)) % 360;
                hsv_to_rgb(hue, 1.0, 1.0)
            }
            ColorScheme::Indexed(palette) => self.palettes.table(palette)[usize::from(value)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_copies_the_value() {
        let mapper = ColorMapper::new();
        assert_eq!(mapper.map(128, ColorScheme::Grayscale), Rgb(128, 128, 128));
        assert_eq!(mapper.map(0, ColorScheme::Grayscale), Rgb(0, 0, 0));
    }

    #[test]
    fn hue_zero_is_red() {
        let mapper = ColorMapper::new();
        assert_eq!(mapper.map(0, ColorScheme::HueCycle(0)), Rgb(255, 0, 0));
        // 255 maps to 360 degrees, which wraps back to red.
        assert_eq!(mapper.map(255, ColorScheme::HueCycle(0)), Rgb(255, 0, 0));
    }

    #[test]
    fn hue_sectors_interpolate() {
        let mapper = ColorMapper::new();
        // 64 * 360 / 255 = 90 degrees, halfway through the second sector.
        assert_eq!(mapper.map(64, ColorScheme::HueCycle(0)), Rgb(127, 255, 0));
        assert_eq!(mapper.map(0, ColorScheme::HueCycle(120)), Rgb(0, 255, 0));
        assert_eq!(mapper.map(0, ColorScheme::HueCycle(240)), Rgb(0, 0, 255));
    }

    #[test]
    fn hsv_respects_saturation_and_value() {
        assert_eq!(hsv_to_rgb(0, 0.0, 1.0), Rgb(255, 255, 255));
        assert_eq!(hsv_to_rgb(200, 1.0, 0.0), Rgb(0, 0, 0));
    }

    #[test]
    fn palettes_hit_their_stops() {
        let set = PaletteSet::new();
        for palette in Palette::ALL.iter() {
            let table = set.table(*palette);
            for (index, color) in palette.stops() {
                assert_eq!(table[usize::from(*index)], *color, "{:?} at {}", palette, index);
            }
        }
    }

    #[test]
    fn indexed_lookup_is_verbatim() {
        let mapper = ColorMapper::new();
        let set = PaletteSet::new();
        for v in 0..=255u8 {
            let scheme = ColorScheme::Indexed(Palette::Ocean);
            assert_eq!(mapper.map(v, scheme), set.table(Palette::Ocean)[usize::from(v)]);
        }
    }

    #[test]
    fn cycling_returns_to_the_start() {
        let start = ColorScheme::HueCycle(40);
        let mut scheme = start;
        let mut seen = vec![];
        for _ in 0..ColorScheme::COUNT {
            seen.push(scheme);
            scheme = scheme.cycle(40);
        }
        assert_eq!(scheme, start);
        seen.dedup();
        assert_eq!(seen.len(), ColorScheme::COUNT);
    }

    #[test]
    fn packing_keeps_channels() {
        let c = Rgb(1, 2, 3);
        assert_eq!(c.pack(), 0x0001_0203);
        assert_eq!(Rgb::unpack(c.pack()), c);
    }

    #[test]
    fn schemes_parse_by_name() {
        assert_eq!("fire".parse::<ColorScheme>().unwrap(), ColorScheme::Indexed(Palette::Fire));
        assert_eq!("gray".parse::<ColorScheme>().unwrap(), ColorScheme::Grayscale);
        assert!("plaid".parse::<ColorScheme>().is_err());
    }
}

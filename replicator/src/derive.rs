//! Pure mapping from native factions to wire records.
//!
//! Category and color are decided here, once, so sinks never repeat the
//! naming rules.

use codec::{Category, ClaimedAreaRecord, Rgb};

use crate::store::Faction;

/// Marker that prefixes a formatting code inside a display name.
pub const FORMAT_MARKER: char = '\u{a7}';

const UNCLAIMED_COLOR: Rgb = Rgb::new(100, 100, 100);
const PROTECTED_COLOR: Rgb = Rgb::new(0, 255, 0);
const CONTESTED_COLOR: Rgb = Rgb::new(255, 0, 0);

const HASH_SATURATION: f32 = 0.7;
const HASH_BRIGHTNESS: f32 = 0.9;

/// The sixteen named chat colors a faction may be formatted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Formatting {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl Formatting {
    pub const ALL: [Self; 16] = [
        Self::Black,
        Self::DarkBlue,
        Self::DarkGreen,
        Self::DarkAqua,
        Self::DarkRed,
        Self::DarkPurple,
        Self::Gold,
        Self::Gray,
        Self::DarkGray,
        Self::Blue,
        Self::Green,
        Self::Aqua,
        Self::Red,
        Self::LightPurple,
        Self::Yellow,
        Self::White,
    ];

    /// Returns the single-character formatting code (`0`-`9`, `a`-`f`).
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Black => '0',
            Self::DarkBlue => '1',
            Self::DarkGreen => '2',
            Self::DarkAqua => '3',
            Self::DarkRed => '4',
            Self::DarkPurple => '5',
            Self::Gold => '6',
            Self::Gray => '7',
            Self::DarkGray => '8',
            Self::Blue => '9',
            Self::Green => 'a',
            Self::Aqua => 'b',
            Self::Red => 'c',
            Self::LightPurple => 'd',
            Self::Yellow => 'e',
            Self::White => 'f',
        }
    }

    /// Parses a formatting code, case-insensitively.
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        let code = code.to_ascii_lowercase();
        Self::ALL.into_iter().find(|formatting| formatting.code() == code)
    }

    #[must_use]
    pub const fn rgb(self) -> Rgb {
        match self {
            Self::Black => Rgb::new(0, 0, 0),
            Self::DarkBlue => Rgb::new(0, 0, 170),
            Self::DarkGreen => Rgb::new(0, 170, 0),
            Self::DarkAqua => Rgb::new(0, 170, 170),
            Self::DarkRed => Rgb::new(170, 0, 0),
            Self::DarkPurple => Rgb::new(170, 0, 170),
            Self::Gold => Rgb::new(255, 170, 0),
            Self::Gray => Rgb::new(170, 170, 170),
            Self::DarkGray => Rgb::new(85, 85, 85),
            Self::Blue => Rgb::new(85, 85, 255),
            Self::Green => Rgb::new(85, 255, 85),
            Self::Aqua => Rgb::new(85, 255, 255),
            Self::Red => Rgb::new(255, 85, 85),
            Self::LightPurple => Rgb::new(255, 85, 255),
            Self::Yellow => Rgb::new(255, 255, 85),
            Self::White => Rgb::new(255, 255, 255),
        }
    }
}

/// Classifies a faction by its reserved name, ignoring ASCII case.
#[must_use]
pub fn category_for_name(name: &str) -> Category {
    if name.eq_ignore_ascii_case("wilderness") {
        Category::Unclaimed
    } else if name.eq_ignore_ascii_case("safezone") {
        Category::Protected
    } else if name.eq_ignore_ascii_case("warzone") {
        Category::Contested
    } else {
        Category::Default
    }
}

/// Prefixes `name` with its formatting marker, if any.
#[must_use]
pub fn display_name(name: &str, formatting: Option<Formatting>) -> String {
    match formatting {
        Some(formatting) => format!("{FORMAT_MARKER}{}{name}", formatting.code()),
        None => name.to_string(),
    }
}

/// Picks a record color: category palette, then formatting, then name hash.
#[must_use]
pub fn color_for(category: Category, formatting: Option<Formatting>, name: &str) -> Rgb {
    match category {
        Category::Unclaimed => UNCLAIMED_COLOR,
        Category::Protected => PROTECTED_COLOR,
        Category::Contested => CONTESTED_COLOR,
        Category::Default => formatting.map_or_else(|| hashed_color(name), Formatting::rgb),
    }
}

/// Hue in whole degrees derived from a stable hash of `name`.
#[must_use]
pub fn hue_degrees(name: &str) -> u16 {
    let hash = blake3::hash(name.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash.as_bytes()[..8]);
    (u64::from_le_bytes(prefix) % 360) as u16
}

fn hashed_color(name: &str) -> Rgb {
    hsb_to_rgb(
        f32::from(hue_degrees(name)) / 360.0,
        HASH_SATURATION,
        HASH_BRIGHTNESS,
    )
}

/// Converts hue, saturation and brightness (each in `0.0..=1.0`) to RGB.
#[must_use]
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> Rgb {
    let channel = |value: f32| (value * 255.0 + 0.5).clamp(0.0, 255.0) as u8;
    if saturation <= 0.0 {
        let v = channel(brightness);
        return Rgb::new(v, v, v);
    }

    let h = (hue - hue.floor()) * 6.0;
    let f = h - h.floor();
    let p = brightness * (1.0 - saturation);
    let q = brightness * (1.0 - saturation * f);
    let t = brightness * (1.0 - saturation * (1.0 - f));
    let (r, g, b) = match h as u8 {
        0 => (brightness, t, p),
        1 => (q, brightness, p),
        2 => (p, brightness, t),
        3 => (p, q, brightness),
        4 => (t, p, brightness),
        _ => (brightness, p, q),
    };
    Rgb::new(channel(r), channel(g), channel(b))
}

/// Builds the wire record for a native faction.
#[must_use]
pub fn record_for(faction: &Faction) -> ClaimedAreaRecord {
    let category = category_for_name(&faction.name);
    ClaimedAreaRecord {
        id: faction.id.clone(),
        name: faction.name.clone(),
        display_name: display_name(&faction.name, faction.formatting),
        category,
        color: Some(color_for(category, faction.formatting, &faction.name)),
        claimed_cells: faction.claims.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec::RecordId;

    #[test]
    fn reserved_names_ignore_case() {
        assert_eq!(category_for_name("Wilderness"), Category::Unclaimed);
        assert_eq!(category_for_name("SAFEZONE"), Category::Protected);
        assert_eq!(category_for_name("warzone"), Category::Contested);
        assert_eq!(category_for_name("warzones"), Category::Default);
        assert_eq!(category_for_name(""), Category::Default);
    }

    #[test]
    fn display_name_prefixes_code() {
        assert_eq!(display_name("red", Some(Formatting::Red)), "\u{a7}cred");
        assert_eq!(display_name("red", None), "red");
    }

    #[test]
    fn palette_beats_formatting() {
        assert_eq!(
            color_for(Category::Protected, Some(Formatting::Red), "safezone"),
            Rgb::new(0, 255, 0)
        );
        assert_eq!(
            color_for(Category::Unclaimed, None, "wilderness"),
            Rgb::new(100, 100, 100)
        );
    }

    #[test]
    fn formatting_beats_hash() {
        assert_eq!(
            color_for(Category::Default, Some(Formatting::Gold), "traders"),
            Rgb::new(255, 170, 0)
        );
    }

    #[test]
    fn hashed_color_is_stable() {
        let a = color_for(Category::Default, None, "nomads");
        let b = color_for(Category::Default, None, "nomads");
        assert_eq!(a, b);
        assert!(hue_degrees("nomads") < 360);
    }

    #[test]
    fn hsb_primaries() {
        assert_eq!(hsb_to_rgb(0.0, 1.0, 1.0), Rgb::new(255, 0, 0));
        assert_eq!(hsb_to_rgb(1.0 / 3.0, 1.0, 1.0), Rgb::new(0, 255, 0));
        assert_eq!(hsb_to_rgb(2.0 / 3.0, 1.0, 1.0), Rgb::new(0, 0, 255));
        assert_eq!(hsb_to_rgb(0.5, 0.0, 0.5), Rgb::new(128, 128, 128));
    }

    #[test]
    fn hsb_hashed_constants() {
        // hue 0 at S 0.7, B 0.9
        assert_eq!(hsb_to_rgb(0.0, 0.7, 0.9), Rgb::new(230, 69, 69));
    }

    #[test]
    fn formatting_codes_roundtrip() {
        for formatting in Formatting::ALL {
            assert_eq!(Formatting::from_code(formatting.code()), Some(formatting));
        }
        assert_eq!(Formatting::from_code('C'), Some(Formatting::Red));
        assert_eq!(Formatting::from_code('z'), None);
    }

    #[test]
    fn record_for_derives_every_field() {
        let faction = Faction {
            id: RecordId::from("f1"),
            name: "WarZone".to_string(),
            formatting: Some(Formatting::Blue),
            claims: [(1, 2).into()].into_iter().collect(),
        };
        let record = record_for(&faction);
        assert_eq!(record.category, Category::Contested);
        assert_eq!(record.display_name, "\u{a7}9WarZone");
        assert_eq!(record.color, Some(Rgb::new(255, 0, 0)));
        assert_eq!(record.claimed_cells, faction.claims);
    }
}

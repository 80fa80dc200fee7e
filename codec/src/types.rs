//! Core types for the replicated data model.

use std::collections::BTreeSet;
use std::fmt;

/// Opaque, stable identifier of a claimed-area record.
///
/// Identifiers are assigned by the authoritative store, never change for the
/// lifetime of a record and are not reused after deletion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RecordId(String);

impl RecordId {
    /// Creates a new record ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns the raw identifier.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A grid-cell coordinate, the unit of claimable area.
///
/// Ordered by `x`, then `z`, so cell sets iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellPos {
    pub x: i32,
    pub z: i32,
}

impl CellPos {
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

impl From<(i32, i32)> for CellPos {
    fn from((x, z): (i32, i32)) -> Self {
        Self { x, z }
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Closed set of record categories carried explicitly on the wire.
///
/// The source classifies records once; sinks interpret the code without
/// knowing the source's naming rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Category {
    #[default]
    Default = 0,
    Unclaimed = 1,
    Protected = 2,
    Contested = 3,
}

impl Category {
    /// Returns the wire code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Maps a wire code back to a category.
    ///
    /// Unknown codes fall back to [`Category::Default`] so a newer source can
    /// add categories without breaking older sinks.
    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Unclaimed,
            2 => Self::Protected,
            3 => Self::Contested,
            _ => Self::Default,
        }
    }
}

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packs the color as `0xRRGGBB`.
    #[must_use]
    pub const fn packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Unpacks `0xRRGGBB`; returns `None` if any bit above 24 is set.
    #[must_use]
    pub const fn from_packed(value: u32) -> Option<Self> {
        if value > 0x00FF_FFFF {
            return None;
        }
        Some(Self {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.packed())
    }
}

/// One faction-like owning entity and the cells it claims.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClaimedAreaRecord {
    pub id: RecordId,
    /// Short internal name.
    pub name: String,
    /// Presentation string; may embed formatting markers.
    pub display_name: String,
    pub category: Category,
    /// Explicit color. `None` is distinct from black.
    pub color: Option<Rgb>,
    pub claimed_cells: BTreeSet<CellPos>,
}

impl ClaimedAreaRecord {
    /// Creates a record with no cells, no color, the default category and a
    /// display name equal to `name`.
    #[must_use]
    pub fn new(id: impl Into<RecordId>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            display_name: name.clone(),
            name,
            category: Category::Default,
            color: None,
            claimed_cells: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    #[must_use]
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub const fn with_color(mut self, color: Option<Rgb>) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_cells<I, C>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CellPos>,
    {
        self.claimed_cells = cells.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if the record claims `cell`.
    #[must_use]
    pub fn claims(&self, cell: CellPos) -> bool {
        self.claimed_cells.contains(&cell)
    }
}

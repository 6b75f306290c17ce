use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::{CodecError, Result},
    pixel::ColorRgb,
};

pub type ColorIdx = u8; // Index into a palette (0 = transparent)

/// Maximum number of palette entries, including the transparent sentinel.
pub const MAX_COLORS: usize = 256;

/// Format a packed RGB value the way palette entries store it ("rrggbb").
pub fn hex_color(rgb: ColorRgb) -> String {
    format!("{:06x}", rgb & 0xFF_FFFF)
}

/// Parse "rrggbb" (an optional leading '#' is allowed, case-insensitive).
pub fn parse_hex_color(s: &str) -> Option<ColorRgb> {
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(s, 16).ok()
}

/// Ordered, append-only list of colors shared by every encode in a batch.
///
/// Entry 0 is always the empty-string sentinel standing for transparency. Other
/// entries get indices in the order they are first seen. The map mirrors the list
/// so lookups don't need a linear scan; the two are only ever updated together.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Palette {
    colors: Vec<String>,
    lookup: HashMap<String, ColorIdx>,
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new()
    }
}

impl PartialEq for Palette {
    fn eq(&self, other: &Self) -> bool {
        self.colors == other.colors
    }
}

impl Eq for Palette {}

impl Palette {
    pub fn new() -> Self {
        Palette {
            colors: vec![String::new()],
            lookup: HashMap::new(),
        }
    }

    /// Build a palette from persisted entries.
    ///
    /// The transparent sentinel is inserted at the front when missing. Entries
    /// must be distinct "rrggbb" colors and fit in a byte index.
    pub fn from_colors(entries: Vec<String>) -> Result<Self> {
        let mut pal = Palette::new();
        let mut entries = entries.into_iter().peekable();
        if entries.peek().is_some_and(|c| c.is_empty()) {
            entries.next();
        }
        for entry in entries {
            if parse_hex_color(&entry).is_none() || entry.starts_with('#') {
                return Err(CodecError::MalformedEncoding(format!(
                    "invalid palette color {:?}",
                    entry
                )));
            }
            let color = entry.to_ascii_lowercase();
            if pal.lookup.contains_key(&color) {
                return Err(CodecError::MalformedEncoding(format!(
                    "duplicate palette color {}",
                    color
                )));
            }
            pal.push(color)?;
        }
        Ok(pal)
    }

    fn push(&mut self, color: String) -> Result<ColorIdx> {
        if self.colors.len() >= MAX_COLORS {
            return Err(CodecError::LimitExceeded {
                what: "palette size",
                value: self.colors.len() + 1,
                max: MAX_COLORS,
            });
        }
        let idx = self.colors.len() as ColorIdx;
        self.lookup.insert(color.clone(), idx);
        self.colors.push(color);
        Ok(idx)
    }

    /// Index of `rgb`, appending it when it hasn't been seen before.
    pub fn index_for(&mut self, rgb: ColorRgb) -> Result<ColorIdx> {
        let color = hex_color(rgb);
        match self.lookup.get(&color) {
            Some(&idx) => Ok(idx),
            None => self.push(color),
        }
    }

    /// Color stored at `idx`; `None` for the transparent sentinel or an unknown index.
    pub fn color(&self, idx: ColorIdx) -> Option<&str> {
        match idx {
            0 => None,
            _ => self.colors.get(idx as usize).map(String::as_str),
        }
    }

    /// Number of entries, sentinel included.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// True when only the sentinel is present.
    pub fn is_empty(&self) -> bool {
        self.colors.len() <= 1
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }
}

impl TryFrom<Vec<String>> for Palette {
    type Error = CodecError;

    fn try_from(entries: Vec<String>) -> Result<Self> {
        Palette::from_colors(entries)
    }
}

impl From<Palette> for Vec<String> {
    fn from(pal: Palette) -> Self {
        pal.colors
    }
}

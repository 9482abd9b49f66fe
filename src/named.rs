//! Named-color table.
//!
//! Names are matched verbatim and case-sensitively (`darkGray`, not
//! `darkgray`). The default table is built once and never mutated; callers
//! that want more names build their own [`NamedColors`] and hand it to a
//! [`Codec`](crate::codec::Codec).

use std::collections::HashMap;
use std::sync::LazyLock;

/// Names recognized out of the box, with their RGB channels.
pub const DEFAULT_NAMED_COLORS: [(&str, [u8; 3]); 11] = [
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("gray", [128, 128, 128]),
    ("darkGray", [64, 64, 64]),
    ("lightGray", [192, 192, 192]),
];

static DEFAULT_TABLE: LazyLock<NamedColors> = LazyLock::new(|| {
    let mut colors = HashMap::with_capacity(DEFAULT_NAMED_COLORS.len());
    for (name, rgb) in DEFAULT_NAMED_COLORS {
        colors.insert(name.to_string(), rgb);
    }
    NamedColors { colors }
});

/// Lookup table from color name to RGB channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedColors {
    colors: HashMap<String, [u8; 3]>,
}

impl Default for NamedColors {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}

impl NamedColors {
    /// The shared default table.
    #[must_use]
    pub fn standard() -> &'static Self {
        &DEFAULT_TABLE
    }

    /// A table with no names at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            colors: HashMap::new(),
        }
    }

    /// Add or replace a name.
    #[must_use]
    pub fn with_color(mut self, name: impl Into<String>, rgb: [u8; 3]) -> Self {
        self.colors.insert(name.into(), rgb);
        self
    }

    /// Exact, case-sensitive lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<[u8; 3]> {
        self.colors.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.colors.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, [u8; 3])> for NamedColors {
    fn from_iter<I: IntoIterator<Item = (S, [u8; 3])>>(iter: I) -> Self {
        Self {
            colors: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

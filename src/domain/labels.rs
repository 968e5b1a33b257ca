//! Region labels and their display colours

use serde::{Deserialize, Serialize};

/// RGBA colour with channels in 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from HSV components, all in 0.0-1.0
    pub fn from_hsv(h: f32, s: f32, v: f32, a: f32) -> Self {
        let h6 = (h.rem_euclid(1.0)) * 6.0;
        let sector = h6.floor();
        let f = h6 - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match sector as u32 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self { r, g, b, a }
    }

    /// Same colour with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [c(self.r), c(self.g), c(self.b), c(self.a)]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        // Default red used for the initial "object" label
        Self::new(1.0, 0.0, 0.0, 0.9)
    }
}

impl From<[f32; 4]> for Rgba {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Rgba> for [f32; 4] {
    fn from(c: Rgba) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

/// Hue step between consecutively created labels
const HUE_STEP: f32 = 0.17;

/// Ordered, duplicate-free list of label names with a colour per label
///
/// Insertion order is significant: it is the palette and menu order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelSet {
    names: Vec<String>,
    colors: Vec<Option<Rgba>>,
}

impl LabelSet {
    /// Label set seeded with a single label
    pub fn with_label(name: &str, color: Rgba) -> Self {
        let mut set = Self::default();
        set.insert_with_color(name, color);
        set
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Append a label without assigning a colour yet
    ///
    /// Returns false if it was already present.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        self.colors.push(None);
        true
    }

    /// Append a label with an explicit colour
    pub fn insert_with_color(&mut self, name: &str, color: Rgba) -> bool {
        let added = self.insert(name);
        self.seed_color(name, color);
        added
    }

    /// Append a label with the next palette colour
    pub fn insert_generated(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        let hue = ((self.names.len() + 1) as f32 * HUE_STEP) % 1.0;
        self.insert_with_color(name, Rgba::from_hsv(hue, 0.8, 0.9, 0.9))
    }

    /// Give a colour to a label that has none yet
    pub fn seed_color(&mut self, name: &str, color: Rgba) {
        if let Some(i) = self.position(name)
            && self.colors[i].is_none()
        {
            self.colors[i] = Some(color);
        }
    }

    /// Colour for a label, falling back to the default red
    pub fn color(&self, name: &str) -> Rgba {
        self.position(name)
            .and_then(|i| self.colors[i])
            .unwrap_or_default()
    }

    /// Merge names from another list: existing order first, new names in their
    /// given order. Returns the names that were added.
    pub fn merge<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut added = Vec::new();
        for name in names {
            if self.insert(name) {
                added.push(name.to_string());
            }
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_and_rejects_duplicates() {
        let mut set = LabelSet::with_label("object", Rgba::default());
        assert!(set.insert("cell"));
        assert!(!set.insert("object"));
        assert_eq!(set.names(), ["object", "cell"]);
    }

    #[test]
    fn test_merge_appends_new_names_after_existing() {
        let mut set = LabelSet::with_label("object", Rgba::default());
        set.insert("cell");
        let added = set.merge(["nucleus", "object", "membrane"]);
        assert_eq!(added, ["nucleus", "membrane"]);
        assert_eq!(set.names(), ["object", "cell", "nucleus", "membrane"]);
    }

    #[test]
    fn test_generated_colors_follow_hue_steps() {
        let mut set = LabelSet::with_label("object", Rgba::default());
        set.insert_generated("cell");
        let c = set.color("cell");
        let expected = Rgba::from_hsv(0.34, 0.8, 0.9, 0.9);
        assert!((c.r - expected.r).abs() < 1e-6);
        assert!((c.g - expected.g).abs() < 1e-6);
        assert_eq!(c.a, 0.9);
    }

    #[test]
    fn test_seed_color_does_not_override() {
        let mut set = LabelSet::default();
        set.insert("a");
        set.seed_color("a", Rgba::new(0.0, 1.0, 0.0, 1.0));
        set.seed_color("a", Rgba::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(set.color("a"), Rgba::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(set.color("missing"), Rgba::default());
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(Rgba::from_hsv(0.0, 1.0, 1.0, 1.0), Rgba::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(Rgba::from_hsv(1.0 / 3.0, 1.0, 1.0, 1.0).to_rgba_u8(), [0, 255, 0, 255]);
    }
}

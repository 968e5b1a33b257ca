//! Shared drawing styles for annotations
//!
//! This module contains the colours and sizes shared between the scene
//! projection and the tiny-skia image renderer. Sizes are in view (screen)
//! pixels and stay constant under zoom.

use crate::domain::Rgba;

/// Committed region polygons
pub mod region {
    /// Outline width in view pixels
    pub const STROKE_WIDTH: f32 = 2.0;
    /// Outline width of the selected entity
    pub const HIGHLIGHT_WIDTH: f32 = 3.0;
    /// Upper bound of the fill alpha
    pub const FILL_ALPHA_MAX: f32 = 0.3;
    /// Fill alpha as a fraction of the label colour alpha
    pub const FILL_ALPHA_FACTOR: f32 = 0.5;
}

/// Boundary, scale and measurement outlines
pub mod line {
    use crate::domain::Rgba;

    pub const BOUNDARY: Rgba = Rgba::new(0.1, 0.7, 1.0, 0.9);
    pub const SCALE: Rgba = Rgba::new(0.0, 1.0, 0.0, 1.0);
    pub const MEASUREMENT: Rgba = Rgba::new(1.0, 0.5, 0.0, 1.0);
}

/// Live preview of the gesture in progress
pub mod scratch {
    use crate::domain::Rgba;

    pub const REGION: Rgba = Rgba::new(0.0, 1.0, 1.0, 1.0);
    pub const BOUNDARY: Rgba = Rgba::new(1.0, 1.0, 0.0, 1.0);
    /// Preview colour while the cursor snaps onto the first point
    pub const SNAP: Rgba = Rgba::new(1.0, 0.0, 1.0, 1.0);
    pub const WIDTH: f32 = 2.0;
    pub const SNAP_RING_RADIUS: f32 = 6.0;
}

/// Dots at clicked scratch points
pub mod marker {
    use crate::domain::Rgba;

    pub const RADIUS: f32 = 3.5;
    pub const POLYGON: Rgba = Rgba::new(0.0, 0.0, 1.0, 1.0);
    pub const SCALE: Rgba = Rgba::new(1.0, 0.0, 0.0, 1.0);
    pub const MEASUREMENT: Rgba = Rgba::new(0.0, 1.0, 0.0, 1.0);
}

/// Vertex handles of the selected entity
pub mod handle {
    use crate::domain::Rgba;

    pub const RADIUS: f32 = 5.0;
    pub const FILL: Rgba = Rgba::new(1.0, 1.0, 0.0, 1.0);
    pub const OUTLINE: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const OUTLINE_WIDTH: f32 = 1.0;
}

/// Circle bezier approximation constant: 4/3 * (sqrt(2) - 1)
pub const BEZIER_K: f32 = 0.552_284_8;

/// Translucent fill derived from a region's label colour
#[inline]
pub fn region_fill(color: Rgba) -> Rgba {
    let alpha = (color.a * region::FILL_ALPHA_FACTOR).clamp(0.0, region::FILL_ALPHA_MAX);
    color.with_alpha(alpha)
}

/// Outline width for an entity, wider when selected
#[inline]
pub fn stroke_width(selected: bool) -> f32 {
    if selected {
        region::HIGHLIGHT_WIDTH
    } else {
        region::STROKE_WIDTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_fill_alpha_is_capped() {
        assert_eq!(region_fill(Rgba::new(1.0, 0.0, 0.0, 0.9)).a, 0.3);
        assert_eq!(region_fill(Rgba::new(1.0, 0.0, 0.0, 0.4)).a, 0.2);
    }
}

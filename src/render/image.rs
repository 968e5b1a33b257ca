//! Image rendering for annotations using tiny-skia
//!
//! These functions draw annotations onto an RgbaImage, usually a
//! downscaled preview of the source image, for export to disk.

use image::RgbaImage;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::geometry::BEZIER_K;
use super::scene::{self, Canvas, PathStyle, PointStyle};
use crate::domain::{AnnotationSet, Point, Rgba};

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    // Copy back
    img.copy_from_slice(pixmap.data());
}

fn paint(color: Rgba) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

/// Build a circle path using cubic bezier curves
fn build_circle_path(cx: f32, cy: f32, r: f32) -> Option<tiny_skia::Path> {
    let k = r * BEZIER_K;

    let mut pb = PathBuilder::new();
    pb.move_to(cx, cy - r);
    pb.cubic_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy);
    pb.cubic_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r);
    pb.cubic_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy);
    pb.cubic_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r);
    pb.close();
    pb.finish()
}

/// `Canvas` drawing onto a tiny-skia pixmap
///
/// Points are in source image pixels and are multiplied by `scale` to land
/// on the pixmap; stroke widths and radii are used as-is.
pub struct PixmapCanvas<'a> {
    pixmap: &'a mut Pixmap,
    scale: f32,
}

impl<'a> PixmapCanvas<'a> {
    pub fn new(pixmap: &'a mut Pixmap, scale: f32) -> Self {
        Self { pixmap, scale }
    }

    fn map(&self, p: Point) -> (f32, f32) {
        (p.x as f32 * self.scale, p.y as f32 * self.scale)
    }
}

impl Canvas for PixmapCanvas<'_> {
    fn render_path(&mut self, points: &[Point], style: &PathStyle) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };

        let mut pb = PathBuilder::new();
        let (x, y) = self.map(*first);
        pb.move_to(x, y);
        for p in rest {
            let (x, y) = self.map(*p);
            pb.line_to(x, y);
        }
        if style.closed {
            pb.close();
        }
        let Some(path) = pb.finish() else {
            return;
        };

        if let Some(fill) = style.fill {
            self.pixmap.fill_path(
                &path,
                &paint(fill),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }

        let stroke = Stroke {
            width: style.width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint(style.stroke), &stroke, Transform::identity(), None);
    }

    fn render_point(&mut self, pos: Point, style: &PointStyle) {
        let (cx, cy) = self.map(pos);
        let Some(path) = build_circle_path(cx, cy, style.radius) else {
            return;
        };

        if let Some(fill) = style.fill {
            self.pixmap.fill_path(
                &path,
                &paint(fill),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
        if let Some((color, width)) = style.outline {
            let stroke = Stroke {
                width,
                ..Default::default()
            };
            self.pixmap
                .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
        }
    }
}

/// Draw committed annotations onto an image
///
/// `scale_factor` is the preview loader's source-to-preview ratio
/// (source width / preview width); 1.0 draws at full resolution.
pub fn draw_overlay(img: &mut RgbaImage, set: &AnnotationSet, scale_factor: f64) {
    let scale = if scale_factor > 0.0 {
        (1.0 / scale_factor) as f32
    } else {
        1.0
    };
    with_pixmap(img, |pixmap| {
        let mut canvas = PixmapCanvas::new(pixmap, scale);
        scene::draw_annotations(&mut canvas, set, None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Boundary, Measurement, Region};

    fn opaque(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba([0, 0, 0, 255]))
    }

    #[test]
    fn test_region_fill_tints_interior() {
        let mut img = opaque(40, 40);
        let set = AnnotationSet {
            regions: vec![Region {
                label: "object".into(),
                color: Rgba::default(),
                vertices: vec![
                    Point::new(5.0, 5.0),
                    Point::new(35.0, 5.0),
                    Point::new(35.0, 35.0),
                    Point::new(5.0, 35.0),
                ],
            }],
            ..Default::default()
        };
        draw_overlay(&mut img, &set, 1.0);

        let inside = img.get_pixel(20, 20);
        assert!(inside[0] > 0);
        assert_eq!(inside[1], 0);
        assert_eq!(*img.get_pixel(1, 1), image::Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_scale_factor_maps_to_preview() {
        let mut img = opaque(20, 20);
        let set = AnnotationSet {
            boundary: Some(Boundary {
                vertices: vec![
                    Point::new(0.0, 20.0),
                    Point::new(40.0, 20.0),
                    Point::new(40.0, 22.0),
                ],
            }),
            measurements: vec![Measurement {
                p1: Point::new(0.0, 30.0),
                p2: Point::new(38.0, 30.0),
            }],
            ..Default::default()
        };
        // Source is twice the preview size
        draw_overlay(&mut img, &set, 2.0);

        assert!(img.get_pixel(10, 10)[2] > 0);
        let orange = img.get_pixel(10, 15);
        assert!(orange[0] > 0 && orange[2] == 0);
        assert_eq!(*img.get_pixel(10, 3), image::Rgba([0, 0, 0, 255]));
    }
}

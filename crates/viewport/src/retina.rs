//! Point/pixel conversion.
//!
//! The domain store keeps positions in device-independent points; the canvas
//! works in pixels. `pixel_ratio` is the device pixel ratio of the canvas.

use graph_view_types::{Point, Viewport};

/// Stored position (points) to canvas position (pixels)
pub fn points_to_pixels(p: Point, pixel_ratio: f64) -> Point {
    p.scale(pixel_ratio)
}

/// Canvas position (pixels) to stored position (points)
pub fn pixels_to_points(p: Point, pixel_ratio: f64) -> Point {
    p.scale(1.0 / pixel_ratio)
}

/// Page position of a drop to model position (points).
///
/// `container_origin` is the page position of the canvas' top-left corner.
pub fn page_to_model(
    page: Point,
    container_origin: Point,
    viewport: &Viewport,
    pixel_ratio: f64,
) -> Point {
    let rendered = page.minus(container_origin);
    let model_pixels = rendered.minus(viewport.pan).scale(1.0 / viewport.zoom);
    pixels_to_points(model_pixels, pixel_ratio)
}

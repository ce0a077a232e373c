use geo_types::{coord, LineString};
use num_traits::FromPrimitive;
use std::f64::consts::PI;

/// Closed ring through `sides` evenly spaced points, first point repeated
/// at the end. Starts at angle `radians` (maths orientation).
pub fn regular_ring(sides: usize, x: f64, y: f64, radius: f64, radians: f64) -> LineString<f64> {
    let sides = sides.max(3);
    let mut ring: Vec<_> = (0..sides)
        .map(|i| {
            let angle = radians + (i as f64 / sides as f64) * (2.0 * PI);
            coord! {x: x + angle.cos() * radius, y: y + angle.sin() * radius}
        })
        .collect();
    ring.push(ring[0]);
    LineString::new(ring)
}

/// Enough sides that nobody can tell the difference, scaled to the radius.
pub fn circle_sides(radius: f64) -> usize {
    1000.min(32.max(usize::from_f64(radius.abs()).unwrap_or(1000) * 4))
}

/// A circle as a closed ring.
pub fn circle(x0: f64, y0: f64, radius: f64) -> LineString<f64> {
    let radius = radius.abs();
    regular_ring(circle_sides(radius), x0, y0, radius, 0.0)
}

//! Turning results into documents: SVG for looking at, polylines for the
//! post processor.
use std::path::Path;

pub use csscolorparser::Color as CssColor;
use geo_types::{coord, MultiLineString, Rect};
use serde::{Deserialize, Serialize};
use svg::node::element::{Circle as SvgCircle, Group, Rectangle};
use svg::Document;
use tracing::info;

use crate::errors::{PackingError, SvgCreationError};
use crate::geo_types::shapes;
use crate::geo_types::svg::{Arrangement, ToSvg};
use crate::packing::CircleCloud;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CircleStyle {
    pub background: CssColor,
    pub fill: CssColor,
    pub stroke: CssColor,
    /// In pixels.
    pub stroke_width: f64,
}

impl Default for CircleStyle {
    fn default() -> Self {
        Self {
            background: CssColor::from_rgba8(0, 0, 0, 255),
            fill: CssColor::from_rgba8(255, 255, 255, 255),
            // rgb(15%, 15%, 15%)
            stroke: CssColor::from_rgba8(38, 38, 38, 255),
            stroke_width: 1.0,
        }
    }
}

impl CircleStyle {
    /// Any CSS color string: names, hex, rgb(), hsl() and so on.
    pub fn parse(background: &str, fill: &str, stroke: &str) -> Result<CircleStyle, PackingError> {
        Ok(CircleStyle {
            background: parse_color(background)?,
            fill: parse_color(fill)?,
            stroke: parse_color(stroke)?,
            ..Default::default()
        })
    }
}

pub fn parse_color(color: &str) -> Result<CssColor, PackingError> {
    csscolorparser::parse(color).map_err(|_| PackingError::InvalidColor(color.to_string()))
}

/// The mask rectangle, in pixels.
pub fn cloud_page(cloud: &CircleCloud) -> Rect<f64> {
    Rect::new(
        coord! {x: 0.0, y: 0.0},
        coord! {x: cloud.width() as f64, y: cloud.height() as f64},
    )
}

/// Pixel space SVG: a background covering the whole mask, then each circle
/// in the order it was placed.
pub fn cloud_to_svg(cloud: &CircleCloud, style: &CircleStyle) -> Result<Document, SvgCreationError> {
    let mut doc = Arrangement::unit(&cloud_page(cloud)).create_svg_document("")?;
    doc = doc.add(
        Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", cloud.width())
            .set("height", cloud.height())
            .set("fill", style.background.to_css_hex()),
    );
    let fill = style.fill.to_css_hex();
    let stroke = style.stroke.to_css_hex();
    for circle in cloud.circles() {
        doc = doc.add(
            SvgCircle::new()
                .set("cx", circle.x)
                .set("cy", circle.y)
                .set("r", circle.radius)
                .set("fill", fill.clone())
                .set("stroke", stroke.clone())
                .set("stroke-width", style.stroke_width),
        );
    }
    Ok(doc)
}

/// Every accepted circle as a closed polygon, still in pixel space.
pub fn cloud_to_lines(cloud: &CircleCloud) -> MultiLineString<f64> {
    MultiLineString::new(
        cloud
            .circles()
            .iter()
            .map(|c| shapes::circle(c.x as f64, c.y as f64, c.radius as f64))
            .collect(),
    )
}

/// Line art on a millimetre page, stroked and unfilled.
pub fn lines_to_svg(
    lines: &MultiLineString<f64>,
    arrangement: &Arrangement,
    stroke: &CssColor,
    stroke_width: f64,
) -> Result<Document, SvgCreationError> {
    let doc = arrangement.create_svg_document("mm")?;
    Ok(doc.add(
        Group::new()
            .set("fill", "none")
            .set("stroke", stroke.to_css_hex())
            .set("stroke-width", stroke_width)
            .set("stroke-linecap", "round")
            .add(lines.to_path(arrangement)),
    ))
}

pub fn save_svg<P: AsRef<Path>>(path: P, doc: &Document) -> Result<(), SvgCreationError> {
    svg::save(path.as_ref(), doc)?;
    info!("Saved svg to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mask::OccupancyMask;
    use crate::packing::OverlapStrategy;
    use geo_types::LineString;

    fn cloud() -> CircleCloud {
        let mask = OccupancyMask::filled(40, 30, true);
        let mut cloud = CircleCloud::new(mask, OverlapStrategy::BruteForce);
        cloud.insert(10, 10, 5, 0.0).unwrap();
        cloud.insert(25, 15, 3, 0.0).unwrap();
        cloud
    }

    #[test]
    fn test_style() {
        let style = CircleStyle::default();
        assert_eq!(style.stroke.to_css_hex(), "#262626");
        let parsed = CircleStyle::parse("black", "white", "rgb(15%,15%,15%)").unwrap();
        assert_eq!(parsed.stroke.to_css_hex(), "#262626");
        assert_eq!(parsed.fill.to_css_hex(), "#ffffff");
        assert!(matches!(
            CircleStyle::parse("black", "not-a-colour", "red"),
            Err(PackingError::InvalidColor(c)) if c == "not-a-colour"
        ));
    }

    #[test]
    fn test_cloud_to_svg() {
        let text = cloud_to_svg(&cloud(), &CircleStyle::default())
            .unwrap()
            .to_string();
        assert!(text.contains("viewBox=\"0 0 40 30\""));
        assert!(text.contains("<rect"));
        assert_eq!(text.matches("<circle").count(), 2);
        // Placement order is kept.
        assert!(text.find("r=\"5\"").unwrap() < text.find("r=\"3\"").unwrap());
        assert!(text.contains("fill=\"#ffffff\""));
    }

    #[test]
    fn test_cloud_to_lines() {
        let lines = cloud_to_lines(&cloud());
        assert_eq!(lines.0.len(), 2);
        assert!(lines.0.iter().all(|l| l.is_closed()));
    }

    #[test]
    fn test_lines_to_svg_and_save() {
        let lines = MultiLineString::new(vec![LineString::from(vec![(0.0, 0.0), (5.0, 5.0)])]);
        let page = Rect::new(coord! {x: 0.0, y: 0.0}, coord! {x: 10.0, y: 10.0});
        let black = CssColor::from_rgba8(0, 0, 0, 255);
        let doc = lines_to_svg(&lines, &Arrangement::unit(&page), &black, 0.3).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.svg");
        save_svg(&path, &doc).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("width=\"10mm\""));
        assert!(text.contains("M0,0 L5,5"));
    }
}

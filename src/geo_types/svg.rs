use geo::bounding_rect::BoundingRect;
use geo_types::{Coord, LineString, MultiLineString, Rect};
use nalgebra::{Affine2, Matrix3, Point2 as NPoint2};
use svg::node::element::path::Data;
use svg::node::element::Path;
use svg::Document;

use crate::errors::SvgCreationError;

/// An arrangement is a plan for transformation of geometry onto a page.
/// The rect is the page (viewBox) the geometry ends up on.
#[derive(Clone, Debug, PartialEq)]
pub enum Arrangement {
    /// Leave the geometry alone.
    Unit(Rect<f64>),
    /// Mirror about the horizontal center line of the page, turning
    /// image space (y down) into machine space (y up) and back.
    FlipY(Rect<f64>),
    Transform(Rect<f64>, Affine2<f64>),
}

impl Arrangement {
    pub fn unit(window: &Rect<f64>) -> Arrangement {
        Arrangement::Unit(*window)
    }

    /// Scale image space by `scale` (e.g. mm per pixel), then flip so the
    /// origin ends up bottom left. `window` is the unscaled page.
    pub fn scaled_flip(window: &Rect<f64>, scale: f64) -> Arrangement {
        let page = Rect::new(window.min() * scale, window.max() * scale);
        let flip = (window.min().y + window.max().y) * scale;
        Arrangement::Transform(
            page,
            Affine2::from_matrix_unchecked(Matrix3::new(
                scale, 0.0, 0.0, //
                0.0, -scale, flip, //
                0.0, 0.0, 1.0,
            )),
        )
    }

    pub fn viewbox(&self) -> Rect<f64> {
        match self {
            Arrangement::Unit(viewbox)
            | Arrangement::FlipY(viewbox)
            | Arrangement::Transform(viewbox, _) => *viewbox,
        }
    }

    pub fn transformation(&self) -> Affine2<f64> {
        match self {
            Arrangement::Unit(_) => Affine2::identity(),
            Arrangement::FlipY(viewbox) => Affine2::from_matrix_unchecked(Matrix3::new(
                1.0, 0.0, 0.0, //
                0.0, -1.0, viewbox.min().y + viewbox.max().y, //
                0.0, 0.0, 1.0,
            )),
            Arrangement::Transform(_, affine) => affine.clone(),
        }
    }

    pub fn apply(&self, coord: Coord<f64>) -> Coord<f64> {
        let pt = self.transformation() * NPoint2::new(coord.x, coord.y);
        Coord { x: pt.x, y: pt.y }
    }

    /// An empty document covering the page. `unit` is appended to the
    /// width/height attributes ("mm", "px", or "" for user units).
    pub fn create_svg_document(&self, unit: &str) -> Result<Document, SvgCreationError> {
        let viewbox = self.viewbox();
        if viewbox.width() <= 0.0 || viewbox.height() <= 0.0 {
            return Err(SvgCreationError::NullGeometry);
        }
        Ok(Document::new()
            .set(
                "viewBox",
                (
                    viewbox.min().x,
                    viewbox.min().y,
                    viewbox.width(),
                    viewbox.height(),
                ),
            )
            .set("width", format!("{}{}", viewbox.width(), unit))
            .set("height", format!("{}{}", viewbox.height(), unit)))
    }
}

pub trait ToSvg {
    /// Run the arrangement's transformation over every coordinate.
    fn arrange(&self, arrangement: &Arrangement) -> Self
    where
        Self: Sized;

    /// (min x, min y, max x, max y) of the geometry, if it has any extent.
    fn viewbox(&self) -> Option<(f64, f64, f64, f64)>;

    /// Convert the Geometry into an SVG PathData item
    fn to_path_data(&self) -> Data;

    /// Convert the Geometry into an SVG Path, using the arrangement to place it
    fn to_path(&self, arrangement: &Arrangement) -> Path;
}

impl ToSvg for MultiLineString<f64> {
    fn arrange(&self, arrangement: &Arrangement) -> Self {
        let linestrings: Vec<LineString<f64>> = self
            .iter()
            .map(|linestring| {
                linestring
                    .coords()
                    .map(|coord| arrangement.apply(*coord))
                    .collect()
            })
            .collect();
        MultiLineString::new(linestrings)
    }

    fn viewbox(&self) -> Option<(f64, f64, f64, f64)> {
        let bounds = self.bounding_rect()?;
        Some((bounds.min().x, bounds.min().y, bounds.max().x, bounds.max().y))
    }

    fn to_path_data(&self) -> Data {
        let mut svg_data = Data::new();
        for tline in self {
            for point in tline.points().take(1) {
                svg_data = svg_data.move_to((point.x(), point.y()));
            }
            for point in tline.points().skip(1) {
                svg_data = svg_data.line_to((point.x(), point.y()));
            }
        }
        svg_data
    }

    fn to_path(&self, arrangement: &Arrangement) -> Path {
        Path::new().set("d", self.arrange(arrangement).to_path_data())
    }
}

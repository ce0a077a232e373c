//! Generative pen-plotter sketches.
//!
//! The main act is random circle packing inside a raster mask: load any
//! image, threshold it into allowed and forbidden pixels, then scatter
//! non-overlapping circles over the allowed part, biggest first. The result
//! goes out as SVG, and optionally as G-code for a servo pen plotter.
//!
//! Alongside it live two smaller sketches that share the same page and
//! post-processing plumbing: a noise driven arrow field and a stack of
//! noisily offset lines.
//!
//! *May spontaneously explode, might take your plotter with it.*

/// Error types for the library. The binaries wrap these in anyhow.
pub mod errors;

/// Binary occupancy masks built from images.
pub mod mask;

/// Circle placement inside a mask.
pub mod packing;

/// SVG documents and polylines from packed circles.
pub mod render;

/// Extensions/Traits for geo_types geometry: distances, rings and SVG
/// page arrangement.
pub mod geo_types;

/// Polylines to G-code via tera templates.
pub mod gcode;

/// The smaller line-art sketches.
pub mod sketches;

/// RON parameter files.
pub mod config;

/// Output naming and preflight checks.
pub mod output;

pub mod logging;

/// Make your life easy! Just import prelude::* and go.
pub mod prelude {
    pub use crate::errors::{MaskError, PackingError, PostError, SketchError, SvgCreationError};
    pub use crate::gcode::{PenSettings, PostMachine, PostProcessor};
    pub use crate::geo_types::svg::{Arrangement, ToSvg};
    pub use crate::geo_types::PointDistance;
    pub use crate::mask::OccupancyMask;
    pub use crate::packing::{
        Circle, CircleCloud, OverlapStrategy, PackingConfig, PlacementReport, RadiusDistribution,
    };
    pub use crate::render::{CircleStyle, CssColor};
    pub use crate::sketches::arrow_field::{ArrowField, ArrowFieldParams, NoiseKind};
    pub use crate::sketches::offset_lines::{OffsetLinesParams, OffsettableLine};
}

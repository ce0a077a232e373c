//! A grid of little arrows, each pointing wherever a fractal noise field
//! says. Everything is in millimetres with the origin top left, like the
//! SVG it ends up in.
use clap::ValueEnum;
use geo_types::{coord, Coord, LineString, MultiLineString, Rect};
use nalgebra::{Rotation2, Vector2};
use noise::{Fbm, MultiFractal, NoiseFn, Perlin, Simplex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::SketchError;
use crate::gcode::PenSettings;

/// Fbm octaves are capped by the noise crate.
const MAX_OCTAVES: usize = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NoiseKind {
    #[default]
    Simplex,
    Perlin,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowFieldParams {
    pub octaves: usize,
    pub lacunarity: f64,
    pub noise: NoiseKind,
    pub seed: u32,
    /// Top left corner of the field on the page.
    pub offset: (u32, u32),
    /// Distance between arrows. Must divide width and height.
    pub step: u32,
    pub width: u32,
    pub height: u32,
    pub arrow_length: f64,
    /// Fraction of `arrow_length` (or mm when `relative_tips` is off).
    /// Zero draws plain lines.
    pub tip_length: f64,
    pub relative_tips: bool,
    /// Angle between the shaft and each tip line, degrees.
    pub tip_angle: f64,
    /// Noise in [-1, 1] maps onto [-max_angle, max_angle] around max_angle.
    pub max_angle: f64,
    pub stroke_width: f64,
    pub pen: PenSettings,
}

impl Default for ArrowFieldParams {
    fn default() -> Self {
        ArrowFieldParams {
            octaves: 3,
            lacunarity: 2.0,
            noise: NoiseKind::default(),
            seed: 0,
            offset: (55, 55),
            step: 15,
            width: 120,
            height: 120,
            arrow_length: 4.0,
            tip_length: 0.4,
            relative_tips: true,
            tip_angle: 140.0,
            max_angle: 180.0,
            stroke_width: 0.3,
            pen: PenSettings::default(),
        }
    }
}

impl ArrowFieldParams {
    pub fn validate(&self) -> Result<(), SketchError> {
        if self.step == 0 {
            return Err(SketchError::ZeroStep);
        }
        if self.width % self.step != 0 {
            return Err(SketchError::GridNotDivisible {
                dimension: "width",
                size: self.width,
                step: self.step,
            });
        }
        if self.height % self.step != 0 {
            return Err(SketchError::GridNotDivisible {
                dimension: "height",
                size: self.height,
                step: self.step,
            });
        }
        Ok(())
    }

    pub fn columns(&self) -> u32 {
        self.width / self.step
    }

    pub fn rows(&self) -> u32 {
        self.height / self.step
    }

    /// Field plus its margin on every side.
    pub fn page(&self) -> Rect<f64> {
        Rect::new(
            coord! {x: 0.0, y: 0.0},
            coord! {
                x: (self.width + 2 * self.offset.0) as f64,
                y: (self.height + 2 * self.offset.1) as f64,
            },
        )
    }

    /// Base name used for output files, without extension.
    pub fn file_stem(&self) -> String {
        format!(
            "arrow_field-f{}-lac{}_{}x{}",
            self.octaves, self.lacunarity, self.width, self.height
        )
    }

    fn noise_fn(&self) -> Box<dyn NoiseFn<f64, 2>> {
        let octaves = self.octaves.clamp(1, MAX_OCTAVES);
        match self.noise {
            NoiseKind::Simplex => Box::new(
                Fbm::<Simplex>::new(self.seed)
                    .set_octaves(octaves)
                    .set_lacunarity(self.lacunarity),
            ),
            NoiseKind::Perlin => Box::new(
                Fbm::<Perlin>::new(self.seed)
                    .set_octaves(octaves)
                    .set_lacunarity(self.lacunarity),
            ),
        }
    }
}

/// Four points: shaft a->b, optional tips b->c and b->d.
///
/// ```text
///          c
///           \
/// a----------b
///           /
///          d
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Arrow {
    pub id: usize,
    pub a: Coord<f64>,
    pub b: Coord<f64>,
    pub tips: Option<(Coord<f64>, Coord<f64>)>,
}

impl Arrow {
    /// `direction` is in degrees, turning clockwise on screen (y down).
    pub fn new(
        id: usize,
        a: Coord<f64>,
        length: f64,
        direction: f64,
        tip_length: f64,
        relative_tips: bool,
        tip_angle: f64,
    ) -> Arrow {
        let start = Vector2::new(a.x, a.y);
        let shaft = Rotation2::new(-direction.to_radians()) * Vector2::new(length, 0.0);
        let end = start + shaft;
        let tips = if tip_length > 0.0 && length > 0.0 {
            let tip = if relative_tips {
                length * tip_length
            } else {
                tip_length
            };
            let v = shaft / length * tip;
            let c = end + Rotation2::new(-tip_angle.to_radians()) * v;
            let d = end + Rotation2::new(tip_angle.to_radians()) * v;
            Some((coord! {x: c.x, y: c.y}, coord! {x: d.x, y: d.y}))
        } else {
            None
        };
        Arrow {
            id,
            a,
            b: coord! {x: end.x, y: end.y},
            tips,
        }
    }

    pub fn lines(&self) -> Vec<LineString<f64>> {
        let mut lines = vec![LineString::new(vec![self.a, self.b])];
        if let Some((c, d)) = self.tips {
            lines.push(LineString::new(vec![c, self.b, d]));
        }
        lines
    }
}

/// The generated field. Arrow ids are handed out by the field itself.
#[derive(Clone, Debug)]
pub struct ArrowField {
    params: ArrowFieldParams,
    angles: Vec<i32>,
    arrows: Vec<Arrow>,
    next_id: usize,
}

impl ArrowField {
    pub fn new(params: ArrowFieldParams) -> Result<ArrowField, SketchError> {
        params.validate()?;
        let mut field = ArrowField {
            params,
            angles: vec![],
            arrows: vec![],
            next_id: 0,
        };
        field.generate();
        Ok(field)
    }

    fn generate(&mut self) {
        let noise = self.params.noise_fn();
        let freq = 16.0 * self.params.octaves as f64;
        let max_angle = self.params.max_angle;
        for row in 0..self.params.rows() {
            for col in 0..self.params.columns() {
                let n = noise.get([col as f64 / freq, row as f64 / freq]);
                let angle = (n * max_angle - 1.0 + max_angle) as i32;
                let at = coord! {
                    x: (self.params.offset.0 + col * self.params.step) as f64,
                    y: (self.params.offset.1 + row * self.params.step) as f64,
                };
                let arrow = Arrow::new(
                    self.next_id,
                    at,
                    self.params.arrow_length,
                    angle as f64,
                    self.params.tip_length,
                    self.params.relative_tips,
                    self.params.tip_angle,
                );
                self.next_id += 1;
                self.angles.push(angle);
                self.arrows.push(arrow);
            }
        }
        debug!(arrows = self.arrows.len(), "Generated arrow field");
    }

    pub fn params(&self) -> &ArrowFieldParams {
        &self.params
    }

    /// Row-major, one per arrow, in degrees.
    pub fn angles(&self) -> &[i32] {
        &self.angles
    }

    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    pub fn to_lines(&self) -> MultiLineString<f64> {
        MultiLineString::new(self.arrows.iter().flat_map(|a| a.lines()).collect())
    }
}

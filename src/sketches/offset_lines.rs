//! A wavy vertical line, copied over and over to the right, each copy a bit
//! further away and a bit noisier than the last.
//!
//! Coordinates are millimetres in plotter space (origin bottom left, y up),
//! so the lines go to the post processor untouched.
use std::f64::consts::PI;

use geo_types::{coord, LineString, MultiLineString, Rect};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::gcode::PenSettings;

/// One polyline as parallel coordinate lists.
#[derive(Clone, Debug, PartialEq)]
pub struct OffsettableLine {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl OffsettableLine {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> OffsettableLine {
        OffsettableLine { xs, ys }
    }

    pub fn len(&self) -> usize {
        self.xs.len().min(self.ys.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy moved right by `offset`, each point jittered by up to `dist`.
    ///
    /// `clip` drops that many points from both ends. A non-zero `shrink`
    /// respaces the points evenly over the y range, shortened by that
    /// fraction and kept centered. Returns `None` when nothing is left.
    pub fn offset<R: Rng>(
        &self,
        offset: f64,
        dist: f64,
        clip: usize,
        shrink: f64,
        rng: &mut R,
    ) -> Option<OffsettableLine> {
        let len = self.len();
        let mut xs: Vec<f64> = self.xs[..len]
            .iter()
            .map(|x| x + offset + dist * rng.gen::<f64>())
            .collect();
        let mut ys = self.ys[..len].to_vec();
        if clip > 0 {
            let end = len.saturating_sub(clip);
            if clip >= end {
                return None;
            }
            xs = xs[clip..end].to_vec();
            ys = ys[clip..end].to_vec();
        }
        if xs.is_empty() {
            return None;
        }
        if shrink != 0.0 {
            let y_min = ys.iter().copied().fold(f64::INFINITY, f64::min);
            let y_max = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let margin = (y_max - y_min) * shrink / 2.0;
            ys = linspace(y_min + margin, y_max - margin, xs.len());
        }
        Some(OffsettableLine { xs, ys })
    }

    pub fn to_linestring(&self) -> LineString<f64> {
        self.xs
            .iter()
            .zip(self.ys.iter())
            .map(|(&x, &y)| coord! {x: x, y: y})
            .collect()
    }
}

/// `count` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|i| start + step * i as f64).collect()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetLinesParams {
    /// Amplitude of the fast wave.
    pub a: f64,
    /// Amplitude of the slow envelope.
    pub b: f64,
    pub f1: f64,
    pub f2: f64,
    pub samples: usize,
    pub n_lines: usize,
    pub offset_start: f64,
    pub offset_step: f64,
    pub noise_start: f64,
    pub noise_step: f64,
    pub clip: usize,
    pub shrink: f64,
    pub seed: Option<u64>,
    pub stroke_width: f64,
    pub pen: PenSettings,
}

impl Default for OffsetLinesParams {
    fn default() -> Self {
        OffsetLinesParams {
            a: 2.0,
            b: 8.0,
            f1: 2.0,
            f2: 0.5,
            samples: 100,
            n_lines: 48,
            offset_start: 0.5,
            offset_step: 0.15,
            noise_start: 0.025,
            noise_step: 0.1,
            clip: 0,
            shrink: 0.0092,
            seed: None,
            stroke_width: 0.3,
            pen: PenSettings {
                pen_up: 270,
                pen_down: 70,
                dwell: 0.5,
                travel_speed: 5000,
                draw_speed: 1400,
            },
        }
    }
}

impl OffsetLinesParams {
    /// Preview page, with a 10mm margin around the 300mm plotting area.
    pub fn page(&self) -> Rect<f64> {
        Rect::new(coord! {x: -10.0, y: -10.0}, coord! {x: 310.0, y: 310.0})
    }

    /// The first line: a sine wave under a slow sine envelope, laid on its
    /// side. Runs 190mm up the page starting at (10, 10).
    pub fn base_curve(&self) -> OffsettableLine {
        let ts = linspace(0.0, PI, self.samples);
        let xs = ts
            .iter()
            .map(|t| {
                let wave = self.a * (2.0 * self.f1 * t).sin() + self.a;
                let envelope = self.b * (2.0 * self.f2 * t).sin();
                wave * envelope + 10.0
            })
            .collect();
        let ys = ts.iter().map(|t| 10.0 + t / PI * 190.0).collect();
        OffsettableLine::new(xs, ys)
    }

    /// Offset and jitter for line `i` of the stack (the base line excluded).
    pub fn step(&self, i: usize) -> (f64, f64) {
        let n = (i + 1) as f64;
        (
            self.offset_start + n * self.offset_step,
            self.noise_start + n * self.noise_step,
        )
    }
}

/// The base line followed by up to `n_lines` copies, each offset from the
/// one before it. Stops early once a copy comes back empty.
pub fn line_stack<R: Rng>(params: &OffsetLinesParams, rng: &mut R) -> Vec<OffsettableLine> {
    let mut lines = vec![params.base_curve()];
    for i in 0..params.n_lines {
        let (offset, dist) = params.step(i);
        let Some(previous) = lines.last() else {
            break;
        };
        match previous.offset(offset, dist, params.clip, params.shrink, rng) {
            Some(line) => lines.push(line),
            None => {
                warn!("Line {} came back empty, stopping at {} lines", i + 1, lines.len());
                break;
            }
        }
    }
    debug!(lines = lines.len(), "Built offset line stack");
    lines
}

/// Polylines for drawing. `reversed` puts the noisiest line first.
pub fn to_lines(lines: &[OffsettableLine], reversed: bool) -> MultiLineString<f64> {
    let strings: Vec<LineString<f64>> = if reversed {
        lines.iter().rev().map(|l| l.to_linestring()).collect()
    } else {
        lines.iter().map(|l| l.to_linestring()).collect()
    };
    MultiLineString::new(strings)
}

/// Leftmost and rightmost x over the whole stack.
pub fn x_extent(lines: &[OffsettableLine]) -> Option<(f64, f64)> {
    let mut coords = lines
        .iter()
        .flat_map(|l| l.xs.iter().copied())
        .peekable();
    coords.peek()?;
    Some(coords.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
        (lo.min(x), hi.max(x))
    }))
}

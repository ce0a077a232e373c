//! Module which provides Line->GCode post-processing
use std::path::Path;

use geo_types::MultiLineString;
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use tracing::{debug, info};

use crate::errors::PostError;

/// Every machine has to provide these.
pub const TEMPLATE_NAMES: [&str; 6] = ["prelude", "penup", "pendown", "moveto", "lineto", "epilog"];

/// Servo pen lift settings. Speeds are mm/min, dwell is seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenSettings {
    pub pen_up: u32,
    pub pen_down: u32,
    pub dwell: f64,
    pub travel_speed: u32,
    pub draw_speed: u32,
}

impl Default for PenSettings {
    fn default() -> Self {
        PenSettings {
            pen_up: 120,
            pen_down: 10,
            dwell: 0.5,
            travel_speed: 4000,
            draw_speed: 1000,
        }
    }
}

/// List of all available machines
pub enum PostMachine {
    /// Pen on a hobby servo, driven through the spindle PWM (M3 S<n>).
    ServoPen(PenSettings),
    /// Bring your own templates. `x` and `y` are available to moveto/lineto.
    CustomMachine(Tera),
}

/// Renders polylines into G-code with a machine's templates.
pub struct PostProcessor {
    templates: Tera,
    settings: Context,
}

impl PostProcessor {
    pub fn new(machine: PostMachine) -> Result<PostProcessor, PostError> {
        let (templates, settings) = match machine {
            PostMachine::ServoPen(pen) => {
                let mut templates = Tera::default();
                templates.add_raw_templates(vec![
                    (
                        "prelude",
                        "; GCODE generated by plotty-sketches\nG21; mm-mode\nG54; Work Coordinates\nG90; Absolute Positioning\nM3 S{{pen_up}}; pen up\nG0 Z0",
                    ),
                    ("penup", "M3 S{{pen_up}}; Pen up\nG4 P{{dwell}}; Pause"),
                    ("pendown", "M3 S{{pen_down}}; Pen down\nG4 P{{dwell}}; Pause"),
                    ("moveto", "G0 F{{travel_speed}} X{{x}} Y{{y}}"),
                    ("lineto", "G1 F{{draw_speed}} X{{x}} Y{{y}}"),
                    ("epilog", "M3 S{{pen_up}}; pen up\nG0 F{{travel_speed}} X0 Y0; go home"),
                ])?;
                (templates, Context::from_serialize(&pen)?)
            }
            PostMachine::CustomMachine(templates) => (templates, Context::new()),
        };
        let names: Vec<&str> = templates.get_template_names().collect();
        for required in TEMPLATE_NAMES {
            if !names.contains(&required) {
                return Err(PostError::MissingTemplate(required));
            }
        }
        Ok(PostProcessor {
            templates,
            settings,
        })
    }

    fn render(&self, name: &str, at: Option<(f64, f64)>) -> Result<Vec<String>, PostError> {
        let mut context = self.settings.clone();
        if let Some((x, y)) = at {
            context.insert("x", &format!("{:.3}", x));
            context.insert("y", &format!("{:.3}", y));
        }
        Ok(self
            .templates
            .render(name, &context)?
            .split('\n')
            .map(|s| s.to_string())
            .collect())
    }

    /// Given a set of lines, generate the full program. Lines with fewer
    /// than two points have nothing to draw and are skipped.
    pub fn post(&self, lines: &MultiLineString<f64>) -> Result<Vec<String>, PostError> {
        let mut program = self.render("prelude", None)?;
        let mut drawn = 0usize;
        for line in lines.iter().filter(|line| line.0.len() >= 2) {
            program.extend(self.render("penup", None)?);
            program.extend(self.render("moveto", Some((line.0[0].x, line.0[0].y)))?);
            program.extend(self.render("pendown", None)?);
            for coord in line.coords().skip(1) {
                program.extend(self.render("lineto", Some((coord.x, coord.y)))?);
            }
            drawn += 1;
        }
        program.extend(self.render("epilog", None)?);
        debug!(lines = drawn, commands = program.len(), "Post processed");
        Ok(program)
    }
}

/// Writes the program, one command per line.
pub fn save<P: AsRef<Path>>(path: P, program: &[String]) -> std::io::Result<()> {
    let mut text = program.join("\n");
    text.push('\n');
    std::fs::write(path.as_ref(), text)?;
    info!("Saved gcode to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use geo_types::{coord, LineString};

    #[test]
    fn test_post() {
        let post = PostProcessor::new(PostMachine::ServoPen(PenSettings::default())).unwrap();
        let lines = MultiLineString::new(vec![LineString::new(vec![
            coord! {x: 0.0, y: 0.0},
            coord! {x: 10.0, y: 0.0},
        ])]);
        let program = post.post(&lines).unwrap();
        let expected = vec![
            "; GCODE generated by plotty-sketches",
            "G21; mm-mode",
            "G54; Work Coordinates",
            "G90; Absolute Positioning",
            "M3 S120; pen up",
            "G0 Z0",
            "M3 S120; Pen up",
            "G4 P0.5; Pause",
            "G0 F4000 X0.000 Y0.000",
            "M3 S10; Pen down",
            "G4 P0.5; Pause",
            "G1 F1000 X10.000 Y0.000",
            "M3 S120; pen up",
            "G0 F4000 X0 Y0; go home",
        ];
        assert_eq!(program, expected);
    }

    #[test]
    fn test_skips_dots() {
        let post = PostProcessor::new(PostMachine::ServoPen(PenSettings::default())).unwrap();
        let lines = MultiLineString::new(vec![
            LineString::new(vec![coord! {x: 5.0, y: 5.0}]),
            LineString::new(vec![]),
        ]);
        let program = post.post(&lines).unwrap();
        assert!(!program.iter().any(|l| l.starts_with("G1 ")));
    }

    #[test]
    fn test_custom_machine() {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("prelude", "START"),
            ("penup", "UP"),
            ("pendown", "DOWN"),
            ("moveto", "MOVE {{x}} {{y}}"),
            ("lineto", "LINE {{x}} {{y}}"),
            ("epilog", "END"),
        ])
        .unwrap();
        let post = PostProcessor::new(PostMachine::CustomMachine(tera)).unwrap();
        let lines = MultiLineString::new(vec![LineString::new(vec![
            coord! {x: 1.0, y: 2.0},
            coord! {x: 3.5, y: 4.25},
        ])]);
        assert_eq!(
            post.post(&lines).unwrap(),
            vec!["START", "UP", "MOVE 1.000 2.000", "DOWN", "LINE 3.500 4.250", "END"]
        );
    }

    #[test]
    fn test_missing_template() {
        let mut tera = Tera::default();
        tera.add_raw_template("prelude", "START").unwrap();
        assert!(matches!(
            PostProcessor::new(PostMachine::CustomMachine(tera)),
            Err(PostError::MissingTemplate("penup"))
        ));
    }

    #[test]
    fn test_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gcode");
        save(&path, &["G0 X0 Y0".to_string(), "M2".to_string()]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "G0 X0 Y0\nM2\n");
    }
}

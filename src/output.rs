//! Output file naming and the checks done before any work starts.
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tracing::warn;

/// Replace anything that isn't an `.svg` extension, keeping the stem.
/// The extension check ignores case.
pub fn with_svg_extension(path: &Path) -> PathBuf {
    with_extension(path, "svg")
}

/// Same as [`with_svg_extension`] for any extension, warning when the
/// name had to change.
pub fn with_extension(path: &Path, extension: &str) -> PathBuf {
    let matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension));
    if matches {
        return path.to_path_buf();
    }
    let fixed = path.with_extension(extension);
    warn!(
        "Output file {} should end in .{}, writing {} instead",
        path.display(),
        extension,
        fixed.display()
    );
    fixed
}

/// `circles_<stem>_ma-<max_attempts>_n-<count>.svg` in the working directory.
pub fn default_circles_name(input: &Path, max_attempts: usize, count: usize) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mask".to_string());
    PathBuf::from(format!("circles_{}_ma-{}_n-{}.svg", stem, max_attempts, count))
}

pub const OFFSET_LINES_GCODE: &str = "offset_lines_example_200x310mm.gcode";
pub const OFFSET_LINES_PREVIEW: &str = "offset_lines_example.svg";

/// `dir/<stem>.svg` and `dir/<stem>.gcode`.
pub fn sketch_names(dir: &Path, stem: &str) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("{}.svg", stem)),
        dir.join(format!("{}.gcode", stem)),
    )
}

/// The input has to be a readable file.
pub fn check_input(input: &Path) -> anyhow::Result<()> {
    let meta = std::fs::metadata(input)
        .with_context(|| format!("Cannot read input {}", input.display()))?;
    if !meta.is_file() {
        bail!("Input {} is not a file", input.display());
    }
    std::fs::File::open(input).with_context(|| format!("Cannot open input {}", input.display()))?;
    Ok(())
}

/// The directory the output goes into has to exist already.
pub fn check_output(output: &Path) -> anyhow::Result<()> {
    match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            if !dir.is_dir() {
                bail!("Output directory {} does not exist", dir.display());
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

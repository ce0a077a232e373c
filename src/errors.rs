use thiserror::Error;

/// Problems loading or binarizing a mask image.
#[derive(Debug, Error)]
pub enum MaskError {
    #[error("Failed to read mask image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Mask has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

/// Problems with the inputs to the circle packer. Individual placement
/// failures are never errors, they just leave a slot empty.
#[derive(Debug, Error)]
pub enum PackingError {
    #[error("Invalid radius range: r_min={r_min}, r_max={r_max}")]
    InvalidRadiusRange { r_min: f64, r_max: f64 },
    #[error("Invalid offset {0}, must be finite and >= 0")]
    InvalidOffset(f64),
    #[error("Invalid color '{0}'")]
    InvalidColor(String),
}

#[derive(Debug, Error)]
pub enum SketchError {
    #[error("{dimension} ({size}) is not evenly divisible by step ({step})")]
    GridNotDivisible {
        dimension: &'static str,
        size: u32,
        step: u32,
    },
    #[error("Step must be > 0")]
    ZeroStep,
    #[error("Parameter file error: {0}")]
    Params(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum PostError {
    #[error("Machine is missing the '{0}' template")]
    MissingTemplate(&'static str),
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

#[derive(Debug, Error)]
pub enum SvgCreationError {
    #[error("Empty/Invalid/Dimensionless geometry")]
    NullGeometry,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_messages() {
        let err = SketchError::GridNotDivisible {
            dimension: "width",
            size: 100,
            step: 15,
        };
        assert_eq!(
            err.to_string(),
            "width (100) is not evenly divisible by step (15)"
        );
        let err = PackingError::InvalidRadiusRange {
            r_min: 5.,
            r_max: 2.,
        };
        assert!(err.to_string().contains("r_min=5"));
    }
}

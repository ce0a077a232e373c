/// Noise driven grid of arrows.
pub mod arrow_field;

/// Stacks of noisily offset copies of a single curve.
pub mod offset_lines;

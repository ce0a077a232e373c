use image::GrayImage;

/// Picks the binarization threshold that maximizes the between-class
/// variance of the luma histogram (Otsu's method). Pixels strictly
/// greater than the returned value are foreground.
///
/// A flat image has no useful split, so it gets a threshold of 0: any
/// non-black flat image becomes fully foreground.
pub fn otsu_threshold(image: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }
    let total = total as f64;
    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, count)| level as f64 * *count as f64)
        .sum();

    let mut best_threshold = 0u8;
    let mut best_sigma = 0f64;
    let mut background_weight = 0f64;
    let mut background_sum = 0f64;
    for (level, count) in histogram.iter().enumerate() {
        background_weight += *count as f64;
        background_sum += level as f64 * *count as f64;
        if background_weight == 0. {
            continue;
        }
        let foreground_weight = total - background_weight;
        if foreground_weight == 0. {
            break;
        }
        let background_mean = background_sum / background_weight;
        let foreground_mean = (weighted_total - background_sum) / foreground_weight;
        let sigma =
            background_weight * foreground_weight * (background_mean - foreground_mean).powi(2);
        if sigma > best_sigma {
            best_sigma = sigma;
            best_threshold = level as u8;
        }
    }
    best_threshold
}

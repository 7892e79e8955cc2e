//! Delta compression of close series.
//!
//! Consecutive closes differ by small amounts relative to their absolute
//! value, so a series is stored as one base price plus per-step deltas.
//! Used as a monitor diagnostic for the fetched window.

/// A delta-compressed close series.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedSeries {
    pub base_price: f64,
    pub deltas: Vec<f64>,
    pub original_len: usize,
}

/// Compress a close series. `None` for empty input.
pub fn compress(closes: &[f64]) -> Option<CompressedSeries> {
    let base_price = *closes.first()?;
    let deltas = closes.windows(2).map(|w| w[1] - w[0]).collect();

    Some(CompressedSeries {
        base_price,
        deltas,
        original_len: closes.len(),
    })
}

/// Reconstruct the close series from base price and cumulative deltas.
pub fn decompress(compressed: &CompressedSeries) -> Vec<f64> {
    let mut prices = Vec::with_capacity(compressed.deltas.len() + 1);
    let mut current = compressed.base_price;
    prices.push(current);

    for delta in &compressed.deltas {
        current += delta;
        prices.push(current);
    }

    prices
}

/// Ratio of original value count to stored value count.
pub fn compression_ratio(original_len: usize, compressed: &CompressedSeries) -> f64 {
    let stored = 1 + compressed.deltas.len();
    if stored == 0 {
        return 0.0;
    }
    original_len as f64 / stored as f64
}

//! Statistics primitives shared by the operations.
//!
//! All functions are pure. Functions over `&[f64]` expect the missing values to be filtered out
//! already (see [`present`]); functions over `&[Option<f64>]` handle missing values themselves.

use std::collections::BTreeMap;

use serde::Serialize;

/// Non-missing values of a numeric column, in row order.
pub fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median (the 0.5 quantile).
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile with linear interpolation between the closest ranks.
///
/// Position `q * (n - 1)` in the sorted values; `q` is clamped to `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(quantile_sorted(&sorted, q))
}

fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let (a, b) = (sorted[lo], sorted[hi]);
    a + (b - a) * (pos - lo as f64)
}

/// Sample standard deviation (`ddof = 1`). `None` with fewer than two values.
pub fn std_sample(values: &[f64]) -> Option<f64> {
    variance(values, 1).map(f64::sqrt)
}

/// Population standard deviation (`ddof = 0`). `None` for an empty slice.
pub fn std_population(values: &[f64]) -> Option<f64> {
    variance(values, 0).map(f64::sqrt)
}

fn variance(values: &[f64], ddof: usize) -> Option<f64> {
    if values.len() <= ddof {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some(ss / (values.len() - ddof) as f64)
}

/// Smallest value.
pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().min_by(f64::total_cmp)
}

/// Largest value.
pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().max_by(f64::total_cmp)
}

/// Most frequent value; ties resolve to the smallest value.
pub fn mode(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let v = sorted[i];
        let run = sorted[i..].iter().take_while(|&&x| x == v).count();
        if best.is_none_or(|(_, n)| run > n) {
            best = Some((v, run));
        }
        i += run;
    }
    best.map(|(v, _)| v)
}

/// Most frequent label; ties resolve to the lexicographically smallest label.
pub fn mode_text<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for (v, n) in counts {
        if best.is_none_or(|(_, m)| n > m) {
            best = Some((v, n));
        }
    }
    best.map(|(v, _)| v)
}

/// Absolute z-score of `value`. `None` when `std` is zero or not finite.
pub fn z_score(value: f64, mean: f64, std: f64) -> Option<f64> {
    if std == 0.0 || !std.is_finite() {
        return None;
    }
    Some(((value - mean) / std).abs())
}

/// Pearson correlation over rows where both values are present.
///
/// Returns `0.0` when the coefficient is undefined (fewer than two complete pairs or zero
/// variance on either side).
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return 0.0;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    let r = sxy / denom;
    if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 }
}

/// `Some(v)` if `v` is finite; used wherever a float is about to be serialized.
pub fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// `{mean, std, min, max}` snapshot of a numeric column, used for before/after audits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnStats {
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStats {
    /// Compute stats over the present values of `values`.
    pub fn of(values: &[Option<f64>]) -> Self {
        let v = present(values);
        Self {
            mean: mean(&v).and_then(finite),
            std: std_sample(&v).and_then(finite),
            min: min(&v),
            max: max(&v),
        }
    }
}

/// Describe-style statistics for a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub q50: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl Describe {
    /// Describe the present values of `values`; `None` if every value is missing.
    pub fn of(values: &[Option<f64>]) -> Option<Self> {
        let mut v = present(values);
        if v.is_empty() {
            return None;
        }
        let m = mean(&v).and_then(finite);
        let s = std_sample(&v).and_then(finite);
        v.sort_by(f64::total_cmp);
        Some(Self {
            count: v.len(),
            mean: m,
            std: s,
            min: v.first().copied(),
            q25: finite(quantile_sorted(&v, 0.25)),
            q50: finite(quantile_sorted(&v, 0.5)),
            q75: finite(quantile_sorted(&v, 0.75)),
            max: v.last().copied(),
        })
    }
}

/// Interquartile bounds `[Q1 - t*IQR, Q3 + t*IQR]`.
pub fn iqr_bounds(values: &[f64], threshold: f64) -> Option<(f64, f64)> {
    let q1 = quantile(values, 0.25)?;
    let q3 = quantile(values, 0.75)?;
    let iqr = q3 - q1;
    Some((q1 - threshold * iqr, q3 + threshold * iqr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_median_ignore_missing_values() {
        let v = present(&[Some(20.0), Some(21.0), None, Some(22.0), Some(1000.0)]);
        assert_eq!(mean(&v), Some(265.75));
        assert_eq!(median(&v), Some(21.5));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.25), Some(1.75));
        assert_eq!(quantile(&v, 0.75), Some(3.25));
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 1.0), Some(4.0));
        assert_eq!(quantile(&[7.0], 0.3), Some(7.0));
    }

    #[test]
    fn standard_deviations_use_the_right_denominator() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(std_population(&v), Some(2.0));
        let s = std_sample(&v).unwrap();
        assert!((s - 2.138_089_935_299_395).abs() < 1e-12);
        assert_eq!(std_sample(&[1.0]), None);
    }

    #[test]
    fn mode_prefers_smallest_on_ties() {
        assert_eq!(mode(&[3.0, 1.0, 3.0, 1.0, 2.0]), Some(1.0));
        assert_eq!(mode(&[5.0, 5.0, 1.0]), Some(5.0));
        assert_eq!(mode(&[]), None);
        assert_eq!(mode_text(["b", "a", "b", "a"]), Some("a"));
        assert_eq!(mode_text(["c", "b", "c"]), Some("c"));
    }

    #[test]
    fn pearson_uses_complete_pairs_and_zero_for_undefined() {
        let x = [Some(1.0), Some(2.0), Some(3.0), None];
        let y = [Some(2.0), Some(4.0), Some(6.0), Some(100.0)];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);

        let neg = [Some(3.0), Some(2.0), Some(1.0), Some(0.0)];
        assert!((pearson(&x, &neg) + 1.0).abs() < 1e-12);

        let constant = [Some(5.0), Some(5.0), Some(5.0), Some(5.0)];
        assert_eq!(pearson(&x, &constant), 0.0);
        assert_eq!(pearson(&[Some(1.0)], &[Some(2.0)]), 0.0);
    }

    #[test]
    fn z_score_is_undefined_for_constant_columns() {
        assert_eq!(z_score(3.0, 1.0, 2.0), Some(1.0));
        assert_eq!(z_score(3.0, 3.0, 0.0), None);
    }

    #[test]
    fn describe_reports_quartiles() {
        let d = Describe::of(&[Some(1.0), Some(2.0), None, Some(3.0), Some(4.0)]).unwrap();
        assert_eq!(d.count, 4);
        assert_eq!(d.q25, Some(1.75));
        assert_eq!(d.q50, Some(2.5));
        assert_eq!(d.max, Some(4.0));
        assert!(Describe::of(&[None, None]).is_none());
    }

    #[test]
    fn iqr_bounds_scale_with_threshold() {
        let v = [20.0, 21.0, 22.0, 265.75, 1000.0];
        let (lo, hi) = iqr_bounds(&v, 1.5).unwrap();
        assert_eq!((lo, hi), (-346.125, 632.875));
    }
}

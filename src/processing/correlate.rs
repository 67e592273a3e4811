//! Pairwise Pearson correlation between numeric columns.

use rayon::prelude::*;
use serde::Serialize;

use crate::processing::report::ColumnMap;
use crate::stats;
use crate::types::{ColumnData, Table};

/// Pairs at or above this magnitude are reported as notable.
pub const NOTABLE_CORRELATION: f64 = 0.5;
const STRONG_CORRELATION: f64 = 0.7;
const MAX_INSIGHTS: usize = 3;

/// Qualitative strength of a coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
}

impl Strength {
    fn of(r: f64) -> Self {
        match r.abs() {
            a if a >= STRONG_CORRELATION => Self::Strong,
            a if a >= NOTABLE_CORRELATION => Self::Moderate,
            _ => Self::Weak,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Weak => "weak",
        }
    }
}

/// Sign of a coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Positive,
    Negative,
}

/// One cell of the correlation matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationCell {
    pub value: f64,
    pub strength: Strength,
    pub col1: String,
    pub col2: String,
}

/// A pair whose coefficient magnitude reaches [`NOTABLE_CORRELATION`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrongCorrelation {
    pub col1: String,
    pub col2: String,
    pub correlation: f64,
    pub strength: Strength,
    pub direction: Direction,
}

/// Full matrix plus the notable pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub numerical_columns: Vec<String>,
    /// `matrix[a][b]`; symmetric.
    pub matrix: ColumnMap<ColumnMap<CorrelationCell>>,
    pub strong_correlations: Vec<StrongCorrelation>,
    pub insights: Vec<String>,
}

impl CorrelationMatrix {
    /// Coefficient between `a` and `b`.
    pub fn value(&self, a: &str, b: &str) -> Option<f64> {
        self.matrix.get(a)?.get(b).map(|c| c.value)
    }
}

/// Outcome of [`correlate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrelationResult {
    Computed(CorrelationMatrix),
    /// Fewer than two numeric columns.
    InsufficientColumns {
        numerical_columns: Vec<String>,
        insights: Vec<String>,
    },
}

/// Correlate every pair of numeric columns.
pub fn correlate(table: &Table) -> CorrelationResult {
    let numeric: Vec<(&str, &[Option<f64>])> = table
        .columns()
        .iter()
        .filter_map(|c| match &c.data {
            ColumnData::Numeric(v) => Some((c.name.as_str(), v.as_slice())),
            ColumnData::Categorical(_) => None,
        })
        .collect();
    let names: Vec<String> = numeric.iter().map(|(n, _)| n.to_string()).collect();

    if numeric.len() < 2 {
        return CorrelationResult::InsufficientColumns {
            numerical_columns: names,
            insights: vec![
                "Not enough numerical columns for correlation analysis. Need at least 2 numerical columns."
                    .to_string(),
            ],
        };
    }

    let n = numeric.len();
    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (i + 1..n).map(move |j| (i, j))).collect();
    let upper: Vec<f64> = pairs
        .par_iter()
        .map(|&(i, j)| stats::pearson(numeric[i].1, numeric[j].1))
        .collect();

    let mut values = vec![vec![0.0; n]; n];
    for (i, (_, column)) in numeric.iter().enumerate() {
        let std = stats::std_sample(&stats::present(column));
        values[i][i] = if std.is_some_and(|s| s > 0.0) { 1.0 } else { 0.0 };
    }
    for (&(i, j), &r) in pairs.iter().zip(&upper) {
        values[i][j] = r;
        values[j][i] = r;
    }

    let matrix: ColumnMap<ColumnMap<CorrelationCell>> = names
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let row: ColumnMap<CorrelationCell> = names
                .iter()
                .enumerate()
                .map(|(j, b)| {
                    let value = values[i][j];
                    let cell = CorrelationCell {
                        value,
                        strength: Strength::of(value),
                        col1: a.clone(),
                        col2: b.clone(),
                    };
                    (b.clone(), cell)
                })
                .collect();
            (a.clone(), row)
        })
        .collect();

    let strong_correlations: Vec<StrongCorrelation> = pairs
        .iter()
        .zip(&upper)
        .filter(|(_, r)| r.abs() >= NOTABLE_CORRELATION)
        .map(|(&(i, j), &r)| StrongCorrelation {
            col1: names[i].clone(),
            col2: names[j].clone(),
            correlation: r,
            strength: Strength::of(r),
            direction: if r > 0.0 { Direction::Positive } else { Direction::Negative },
        })
        .collect();

    CorrelationResult::Computed(CorrelationMatrix {
        insights: insights(&strong_correlations),
        numerical_columns: names,
        matrix,
        strong_correlations,
    })
}

fn insights(strong: &[StrongCorrelation]) -> Vec<String> {
    if strong.is_empty() {
        return vec!["No strong correlations found between variables.".to_string()];
    }
    let mut out = vec![format!("Found {} strong correlation(s).", strong.len())];
    out.extend(strong.iter().take(MAX_INSIGHTS).map(|s| {
        let direction = match s.direction {
            Direction::Positive => "positive",
            Direction::Negative => "negative",
        };
        format!(
            "{} and {} have a {} {} correlation ({:.3}).",
            s.col1,
            s.col2,
            s.strength.as_str(),
            direction,
            s.correlation
        )
    }));
    out
}

//! Dataset summaries: shape, types, missing counts and descriptive statistics.

use std::collections::HashMap;

use serde::Serialize;

use crate::processing::dedup::duplicate_row_count;
use crate::processing::report::ColumnMap;
use crate::stats::Describe;
use crate::types::{ColumnData, Table};

const TOP_VALUES: usize = 10;

/// A categorical value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Statistics of a categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalStats {
    pub unique_count: usize,
    /// Most frequent values, by count descending then first appearance.
    pub top_values: Vec<ValueCount>,
}

/// Snapshot of a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    /// `(rows, columns)`.
    pub shape: (usize, usize),
    pub columns: Vec<String>,
    pub dtypes: ColumnMap<&'static str>,
    pub missing_values: ColumnMap<usize>,
    pub memory_bytes: usize,
    /// `memory_bytes` rendered as kilobytes, e.g. `"1.25 KB"`.
    pub memory_usage: String,
    pub duplicate_rows: usize,
    /// Describe-style statistics; `None` for all-missing columns.
    pub numerical_stats: ColumnMap<Option<Describe>>,
    pub categorical_stats: ColumnMap<CategoricalStats>,
}

/// Summarize `table`.
pub fn summarize(table: &Table) -> DatasetSummary {
    let memory_bytes: usize = table.columns().iter().map(|c| c.estimated_bytes()).sum();
    let mut numerical_stats = ColumnMap::new();
    let mut categorical_stats = ColumnMap::new();
    for column in table.columns() {
        match &column.data {
            ColumnData::Numeric(values) => {
                numerical_stats.insert(column.name.clone(), Describe::of(values));
            }
            ColumnData::Categorical(values) => {
                categorical_stats.insert(column.name.clone(), categorical(values));
            }
        }
    }

    DatasetSummary {
        shape: table.shape(),
        columns: table.column_names(),
        dtypes: table
            .columns()
            .iter()
            .map(|c| (c.name.clone(), c.dtype_label()))
            .collect(),
        missing_values: table
            .columns()
            .iter()
            .map(|c| (c.name.clone(), c.missing_count()))
            .collect(),
        memory_bytes,
        memory_usage: format!("{:.2} KB", memory_bytes as f64 / 1024.0),
        duplicate_rows: duplicate_row_count(table),
        numerical_stats,
        categorical_stats,
    }
}

fn categorical(values: &[Option<String>]) -> CategoricalStats {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, v) in values.iter().flatten().enumerate() {
        counts.entry(v.as_str()).or_insert((0, pos)).0 += 1;
    }
    let mut ranked: Vec<(&str, usize, usize)> =
        counts.into_iter().map(|(v, (n, first))| (v, n, first)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    CategoricalStats {
        unique_count: ranked.len(),
        top_values: ranked
            .into_iter()
            .take(TOP_VALUES)
            .map(|(value, count, _)| ValueCount {
                value: value.to_string(),
                count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;

    fn table() -> Table {
        Table::new(vec![
            Column::numeric("age", vec![Some(20.0), Some(21.0), None, Some(22.0), Some(1000.0)]),
            Column::categorical(
                "city",
                vec![
                    Some("B".to_string()),
                    Some("A".to_string()),
                    Some("A".to_string()),
                    None,
                    Some("B".to_string()),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn summary_reports_shape_types_and_missing_counts() {
        let s = summarize(&table());
        assert_eq!(s.shape, (5, 2));
        assert_eq!(s.columns, vec!["age", "city"]);
        assert_eq!(s.dtypes.get("age"), Some(&"float64"));
        assert_eq!(s.dtypes.get("city"), Some(&"object"));
        assert_eq!(s.missing_values.get("age"), Some(&1));
        assert_eq!(s.duplicate_rows, 0);
        assert!(s.memory_usage.ends_with(" KB"));

        let age = s.numerical_stats.get("age").unwrap().unwrap();
        assert_eq!(age.count, 4);
        assert_eq!(age.mean, Some(265.75));
    }

    #[test]
    fn top_values_break_ties_by_first_appearance() {
        let s = summarize(&table());
        let city = s.categorical_stats.get("city").unwrap();
        assert_eq!(city.unique_count, 2);
        assert_eq!(city.top_values[0].value, "B");
        assert_eq!(city.top_values[0].count, 2);
        assert_eq!(city.top_values[1].value, "A");
    }

    #[test]
    fn summary_serializes_stats_with_percentile_keys() {
        let json = serde_json::to_value(summarize(&table())).unwrap();
        assert_eq!(json["shape"], serde_json::json!([5, 2]));
        assert_eq!(json["numerical_stats"]["age"]["50%"], serde_json::json!(21.5));
        assert_eq!(json["columns"][1], "city");
    }
}

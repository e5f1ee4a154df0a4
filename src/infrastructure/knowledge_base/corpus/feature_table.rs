//! Column-tolerant view over a feature store exported as JSON records

use serde_json::{Map, Value};
use std::path::Path;

use crate::domain::DomainError;

pub type Record = Map<String, Value>;

/// Rows of `{column: value}` with the union of their columns in first-seen order
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl FeatureTable {
    pub fn from_records(rows: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    /// Read a `[{...}, ...]` JSON file
    pub fn load(path: &Path) -> Result<Self, DomainError> {
        let raw = std::fs::read_to_string(path)?;
        let rows: Vec<Record> = serde_json::from_str(&raw).map_err(|e| {
            DomainError::validation(format!(
                "Feature store {} is not a JSON record array: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self::from_records(rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First candidate present in the table. A candidate matches exactly, or
    /// after both names are lowercased and stripped of non-alphanumerics.
    pub fn column(&self, candidates: &[&str]) -> Option<String> {
        for candidate in candidates {
            if let Some(found) = self.columns.iter().find(|c| c.as_str() == *candidate) {
                return Some(found.clone());
            }
            let wanted = normalize(candidate);
            if let Some(found) = self.columns.iter().find(|c| normalize(c) == wanted) {
                return Some(found.clone());
            }
        }
        None
    }

    /// Numeric cells of a column; nulls and non-numeric cells are skipped
    pub fn numbers(&self, column: &str) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.get(column).and_then(as_number))
            .collect()
    }

    /// Rows whose numeric value in `column` satisfies `predicate`
    pub fn filter(&self, column: &str, predicate: impl Fn(f64) -> bool) -> FeatureTable {
        let rows = self
            .rows
            .iter()
            .filter(|row| row.get(column).and_then(as_number).is_some_and(&predicate))
            .cloned()
            .collect();
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    pub fn count(&self, column: &str, predicate: impl Fn(f64) -> bool) -> usize {
        self.numbers(column).into_iter().filter(|v| predicate(*v)).count()
    }

    /// Partition by the value of `column`, keys in ascending order. Rows with
    /// a null or missing key are dropped.
    pub fn group_by(&self, column: &str) -> Vec<(GroupKey, FeatureTable)> {
        let mut groups: Vec<(GroupKey, Vec<Record>)> = Vec::new();
        for row in &self.rows {
            let Some(key) = row.get(column).and_then(GroupKey::from_value) else {
                continue;
            };
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, rows)) => rows.push(row.clone()),
                None => groups.push((key, vec![row.clone()])),
            }
        }

        groups.sort_by(|(a, _), (b, _)| a.cmp_key(b));
        groups
            .into_iter()
            .map(|(key, rows)| {
                (
                    key,
                    FeatureTable {
                        columns: self.columns.clone(),
                        rows,
                    },
                )
            })
            .collect()
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Group label, numeric when the underlying cell is a number
#[derive(Debug, Clone, PartialEq)]
pub struct GroupKey {
    label: String,
    numeric: Option<f64>,
}

impl GroupKey {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Self {
                label: s.clone(),
                numeric: None,
            }),
            other => {
                let number = as_number(other)?;
                Some(Self {
                    label: number_label(number),
                    numeric: Some(number),
                })
            }
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn as_number(&self) -> Option<f64> {
        self.numeric
    }

    fn cmp_key(&self, other: &Self) -> std::cmp::Ordering {
        match (self.numeric, other.numeric) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => self.label.cmp(&other.label),
        }
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

fn number_label(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Linear-interpolated quantile, `q` in `[0, 1]`
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// One decimal place, or `N/A` when there is nothing to summarise
pub fn fmt1(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "N/A".to_string(),
    }
}

/// Share of `part` in `total` as a one-decimal percentage
pub fn percent(part: usize, total: usize) -> String {
    if total == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", part as f64 / total as f64 * 100.0)
}

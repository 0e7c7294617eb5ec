//! Total, pure cell-to-field coercions.
//!
//! Every rule returns a canonical [`FieldValue`] for any input cell, never an
//! error: invalid content degrades to the rule's typed default so messy
//! human-authored rows import partially instead of failing outright.

use crate::types::{CellValue, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Declarative conversion rule attached to one field spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionRule {
    /// Base-10 integer; unparsable/empty/"N/A" → 0.
    Integer,
    /// Float with an asymmetric range: below `min` → 0, above `max` → `max`.
    BoundedFloat { min: f64, max: f64 },
    /// Trimmed text hard-truncated to `max_len` characters.
    TruncatedString { max_len: usize },
    /// Truthy-set membership → 1, else 0.
    BooleanFlag,
    /// Truthy-set membership (plus "tenured") → "Yes", else "No".
    TenureFlag,
    /// Normalized lookup in a named context table; miss → numeric fallback.
    EnumLookup { table: String },
}

/// Injected lookup state shared by all coercion calls.
///
/// Truthy sets are matched lowercase; enum-table keys uppercase.
#[derive(Debug, Clone, Default)]
pub struct CoercionContext {
    truthy: HashSet<String>,
    tenure_truthy: HashSet<String>,
    tables: HashMap<String, HashMap<String, i64>>,
}

impl CoercionContext {
    pub fn new(
        truthy: impl IntoIterator<Item = String>,
        tenure_extra: impl IntoIterator<Item = String>,
        tables: HashMap<String, HashMap<String, i64>>,
    ) -> Self {
        let truthy: HashSet<String> = truthy.into_iter().map(|s| s.to_lowercase()).collect();
        let mut tenure_truthy = truthy.clone();
        tenure_truthy.extend(tenure_extra.into_iter().map(|s| s.to_lowercase()));
        let tables = tables
            .into_iter()
            .map(|(name, table)| {
                let table = table
                    .into_iter()
                    .map(|(k, v)| (k.trim().to_uppercase(), v))
                    .collect();
                (name, table)
            })
            .collect();
        Self {
            truthy,
            tenure_truthy,
            tables,
        }
    }

    fn is_truthy(&self, text: &str) -> bool {
        self.truthy.contains(&text.trim().to_lowercase())
    }

    fn is_tenure_truthy(&self, text: &str) -> bool {
        self.tenure_truthy.contains(&text.trim().to_lowercase())
    }

    fn lookup(&self, table: &str, key: &str) -> Option<i64> {
        self.tables.get(table)?.get(&key.trim().to_uppercase()).copied()
    }
}

/// Apply one rule to one raw cell. Total: never panics, never errors.
pub fn coerce(rule: &CoercionRule, cell: &CellValue, ctx: &CoercionContext) -> FieldValue {
    match rule {
        CoercionRule::Integer => FieldValue::Int(to_integer(cell)),
        CoercionRule::BoundedFloat { min, max } => {
            FieldValue::Float(to_bounded_float(cell, *min, *max))
        }
        CoercionRule::TruncatedString { max_len } => {
            FieldValue::Text(to_truncated_string(cell, *max_len))
        }
        CoercionRule::BooleanFlag => {
            FieldValue::Int(if ctx.is_truthy(&cell.as_text()) { 1 } else { 0 })
        }
        CoercionRule::TenureFlag => {
            let flag = if ctx.is_tenure_truthy(&cell.as_text()) {
                "Yes"
            } else {
                "No"
            };
            FieldValue::Text(flag.to_string())
        }
        CoercionRule::EnumLookup { table } => {
            let text = cell.as_text();
            match ctx.lookup(table, &text) {
                Some(code) => FieldValue::Int(code),
                // Miss: best-effort numeric parse of the raw content.
                None => FieldValue::Int(to_integer(cell)),
            }
        }
    }
}

fn to_integer(cell: &CellValue) -> i64 {
    match cell {
        CellValue::Number(n) if n.is_finite() => n.trunc() as i64,
        _ => {
            let text = cell.as_text();
            if text.is_empty() || text.eq_ignore_ascii_case("n/a") {
                return 0;
            }
            text.parse::<i64>()
                .or_else(|_| text.parse::<f64>().map(|f| f.trunc() as i64))
                .unwrap_or(0)
        }
    }
}

// Below-min returns 0 rather than clamping up to `min`; above-max clamps.
// The asymmetry is deliberate and pinned by tests.
fn to_bounded_float(cell: &CellValue, min: f64, max: f64) -> f64 {
    let v = match cell.as_number() {
        Some(v) if v.is_finite() => v,
        _ => return 0.0,
    };
    if v < min {
        0.0
    } else if v > max {
        max
    } else {
        v
    }
}

fn to_truncated_string(cell: &CellValue, max_len: usize) -> String {
    let text = cell.as_text();
    match text.char_indices().nth(max_len) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text,
    }
}

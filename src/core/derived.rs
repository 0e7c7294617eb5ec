//! Derived-field computation.
//!
//! Totals left unset (or zero) in the source sheet are recomputed from their
//! component fields. The derived list is evaluated in its declared order, so
//! an overall total can consume sub-totals filled earlier in the same pass.
//! An explicitly supplied nonzero total is never overridden.

use crate::layout::DerivedField;
use crate::types::{DomainRecord, FieldValue};

pub fn fill_derived(record: &mut DomainRecord, derived: &[DerivedField]) {
    for field in derived {
        let current = record.get(&field.target);
        if matches!(current, Some(v) if !v.is_zero()) {
            continue;
        }
        let sum: f64 = field.components.iter().map(|c| record.number(c)).sum();
        record.set(field.target.clone(), FieldValue::Float(sum));
    }
}

//! Categorical partitioning for export.

use crate::types::DomainRecord;

/// Bucket records by the value of the named discriminator field.
///
/// Buckets appear in first-seen order and keep their records in source
/// order. Excluded discriminator values (compared case-insensitively, e.g.
/// the "REFERENCE" sentinel group) are dropped entirely.
pub fn partition_by_group(
    records: Vec<DomainRecord>,
    group_field: &str,
    exclusions: &[String],
) -> Vec<(String, Vec<DomainRecord>)> {
    let excluded: Vec<String> = exclusions.iter().map(|e| e.trim().to_uppercase()).collect();
    let mut buckets: Vec<(String, Vec<DomainRecord>)> = Vec::new();

    for record in records {
        let code = record.text(group_field).trim().to_string();
        if excluded.contains(&code.to_uppercase()) {
            continue;
        }
        match buckets.iter_mut().find(|(c, _)| *c == code) {
            Some((_, list)) => list.push(record),
            None => buckets.push((code, vec![record])),
        }
    }
    buckets
}

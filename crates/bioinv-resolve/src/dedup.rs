//! Multi-key deduplication of near-duplicate resource records.

use std::collections::HashMap;

use bioinv_core::{normalize_key, DedupKey, InventoryRecord};

/// Groups records sharing an identical composite key and merges each group
/// into one row.
///
/// Key text is case/whitespace-normalized. A record missing any requested
/// key field never groups with anything — absent keys must not glue
/// unrelated records together — so it passes through as a singleton.
/// Group order and within-group ID order follow first appearance, and all
/// non-ID fields come from the group's first record, so the merge is
/// deterministic. Running the pass on its own output is a no-op.
#[must_use]
pub fn deduplicate(records: Vec<InventoryRecord>, keys: &[DedupKey]) -> Vec<InventoryRecord> {
    let input_len = records.len();
    let mut output: Vec<InventoryRecord> = Vec::with_capacity(input_len);
    // Composite key → index into `output` of the group representative.
    let mut groups: HashMap<Vec<String>, usize> = HashMap::new();

    for record in records {
        match composite_key(&record, keys) {
            Some(key) => {
                if let Some(&idx) = groups.get(&key) {
                    output[idx].ids.extend(record.ids);
                } else {
                    groups.insert(key, output.len());
                    output.push(record);
                }
            }
            None => output.push(record),
        }
    }

    tracing::info!(
        input = input_len,
        output = output.len(),
        keys = %keys.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(","),
        "deduplicated records"
    );
    output
}

/// Normalized composite key for one record, or `None` when any requested
/// field is absent or blank.
fn composite_key(record: &InventoryRecord, keys: &[DedupKey]) -> Option<Vec<String>> {
    keys.iter()
        .map(|key| {
            let raw = match key {
                DedupKey::BestName => record.names.best_name.as_ref().map(|n| n.text.as_str()),
                DedupKey::CommonName => record.names.best_common.as_ref().map(|n| n.text.as_str()),
                DedupKey::FullName => record.names.best_full.as_ref().map(|n| n.text.as_str()),
                DedupKey::Url => record.primary_url(),
            }?;
            let normalized = normalize_key(raw);
            if normalized.is_empty() {
                None
            } else {
                Some(normalized)
            }
        })
        .collect()
}

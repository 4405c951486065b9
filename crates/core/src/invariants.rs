//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use std::collections::{HashMap, HashSet};

use crate::models::{MessageKey, MessageRecord, ViewEntry};

/// Validate that a reconciled transcript is internally consistent
pub fn assert_transcript_invariants(entries: &[ViewEntry]) {
    if !cfg!(debug_assertions) {
        return;
    }

    let mut confirmed = HashSet::new();
    let mut confirmed_pending = HashSet::new();
    let mut optimistic: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        // Keys are derived from the record they wrap
        if let Some(id) = entry.record.confirmed_key() {
            debug_assert!(
                matches!(&entry.key, MessageKey::Confirmed(c) if c.as_str() == id),
                "Entry {} wraps confirmed record {}",
                entry.key,
                id
            );
            let first = confirmed.insert(id);
            debug_assert!(first, "Confirmed id {} appears more than once", id);
        }
        if let Some(id) = entry.record.pending_key() {
            if entry.record.is_confirmed() {
                confirmed_pending.insert(id);
            } else {
                *optimistic.entry(id).or_default() += 1;
            }
        }
    }

    // An optimistic entry is shown once, and never next to its confirmation
    for (id, copies) in optimistic {
        debug_assert!(
            !confirmed_pending.contains(id),
            "Pending id {} shown alongside its confirmation",
            id
        );
        debug_assert!(copies == 1, "Pending id {} shown {} times", id, copies);
    }

    for (i, entry) in entries.iter().enumerate() {
        let expected = i == 0 || entries[i - 1].record.sender_id != entry.record.sender_id;
        debug_assert!(
            entry.show_sender_header == expected,
            "Entry {} has sender header {} but expected {}",
            entry.key,
            entry.show_sender_header,
            expected
        );
    }
}

/// Validate that a locally created record is a well-formed optimistic message
pub fn assert_optimistic_record(record: &MessageRecord) {
    debug_assert!(
        record.pending_key().is_some(),
        "Optimistic message from {} has no pending id",
        record.sender_id
    );
    debug_assert!(
        !record.is_confirmed(),
        "Optimistic message from {} already carries a confirmed id",
        record.sender_id
    );
}

//! Optimistic/confirmed message reconciliation
//!
//! Merges the raw message buffer of a chat session into a deduplicated
//! transcript. Records are processed in arrival order:
//!
//! - A confirmed record replaces any live entry with the same confirmed id,
//!   retires the optimistic placeholder sharing its pending id, and is
//!   appended.
//! - A pending record is appended unless some live entry already carries
//!   its pending id.
//! - A record with no identifiers is appended under a positional key.
//!
//! Order is arrival order, never timestamp order. The whole buffer is
//! reprocessed on every call, so the function keeps no state between calls.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::models::{MessageKey, MessageRecord, ViewEntry};

/// Reconcile a raw, arrival-ordered message buffer into display entries
pub fn reconcile(raw: &[MessageRecord]) -> Vec<ViewEntry> {
    let mut merge = Merge::new(raw);
    for position in 0..raw.len() {
        merge.apply(position);
    }

    let stats = merge.stats;
    let mut entries: Vec<ViewEntry> = merge
        .slots
        .into_iter()
        .flatten()
        .map(|position| ViewEntry {
            key: MessageKey::for_record(&raw[position], position),
            record: raw[position].clone(),
            show_sender_header: false,
        })
        .collect();
    mark_sender_headers(&mut entries);

    debug!(
        raw = raw.len(),
        shown = entries.len(),
        duplicates = stats.duplicates,
        superseded = stats.superseded,
        skipped = stats.skipped,
        malformed = stats.malformed,
        "Reconciled message buffer"
    );

    crate::invariants::assert_transcript_invariants(&entries);
    entries
}

/// Flag the first entry of every consecutive run by the same sender
pub fn mark_sender_headers(entries: &mut [ViewEntry]) {
    for i in 0..entries.len() {
        entries[i].show_sender_header =
            i == 0 || entries[i].record.sender_id != entries[i - 1].record.sender_id;
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct MergeStats {
    duplicates: usize,
    superseded: usize,
    skipped: usize,
    malformed: usize,
}

/// Working set of one reconciliation pass.
///
/// `slots` holds raw positions in output order; retired entries become
/// `None` so removal never shifts later slots.
struct Merge<'a> {
    raw: &'a [MessageRecord],
    slots: Vec<Option<usize>>,
    /// Live entry per confirmed id
    confirmed: HashMap<&'a str, usize>,
    /// Live unconfirmed entry per pending id
    unconfirmed: HashMap<&'a str, usize>,
    /// Number of live entries (confirmed or not) carrying each pending id
    pending_refs: HashMap<&'a str, usize>,
    stats: MergeStats,
}

impl<'a> Merge<'a> {
    fn new(raw: &'a [MessageRecord]) -> Self {
        Self {
            raw,
            slots: Vec::with_capacity(raw.len()),
            confirmed: HashMap::new(),
            unconfirmed: HashMap::new(),
            pending_refs: HashMap::new(),
            stats: MergeStats::default(),
        }
    }

    fn apply(&mut self, position: usize) {
        let raw = self.raw;
        let record = &raw[position];

        match (record.confirmed_key(), record.pending_key()) {
            (Some(confirmed_id), pending_id) => {
                if let Some(slot) = self.confirmed.remove(confirmed_id) {
                    self.retire(slot);
                    self.stats.duplicates += 1;
                }
                if let Some(pending_id) = pending_id {
                    if let Some(slot) = self.unconfirmed.remove(pending_id) {
                        self.retire(slot);
                        self.stats.superseded += 1;
                    }
                }
                let slot = self.append(position);
                self.confirmed.insert(confirmed_id, slot);
            }
            (None, Some(pending_id)) => {
                if self.pending_refs.get(pending_id).is_some_and(|n| *n > 0) {
                    self.stats.skipped += 1;
                    return;
                }
                let slot = self.append(position);
                self.unconfirmed.insert(pending_id, slot);
            }
            (None, None) => {
                warn!(
                    position,
                    sender = %record.sender_id,
                    "Message without identifiers, using positional key"
                );
                self.stats.malformed += 1;
                self.append(position);
            }
        }
    }

    fn append(&mut self, position: usize) -> usize {
        let raw = self.raw;
        if let Some(pending_id) = raw[position].pending_key() {
            *self.pending_refs.entry(pending_id).or_insert(0) += 1;
        }
        self.slots.push(Some(position));
        self.slots.len() - 1
    }

    fn retire(&mut self, slot: usize) {
        let Some(position) = self.slots[slot].take() else {
            return;
        };
        let raw = self.raw;
        if let Some(pending_id) = raw[position].pending_key() {
            if let Some(count) = self.pending_refs.get_mut(pending_id) {
                *count = count.saturating_sub(1);
            }
        }
    }
}

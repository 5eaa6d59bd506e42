//! Deferred ID assignment over the finished registry.
//!
//! Runs only after every line has been parsed, never interleaved with
//! parsing. The numbering is the correctness contract the linked program
//! depends on: the emitted `to_id()` bodies must match the persisted map.

use crate::symbols::extraction::SymbolRegistry;

/// Assign IDs: one flat, strictly increasing sequence starting at 1 across
/// all profilers and tags in first-seen order, no gaps, no reuse. Each
/// profiler's `offset` is the first ID its tags receive (the next counter
/// value even when it has no tags).
pub fn assign_ids(registry: &mut SymbolRegistry) {
    let mut counter: u64 = 1;
    for profiler in &mut registry.profilers {
        profiler.offset = Some(counter);
        for tag in &mut profiler.tags {
            tag.id = Some(counter);
            counter += 1;
        }
    }
}

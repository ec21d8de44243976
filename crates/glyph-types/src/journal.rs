//! Per-attempt mutation log enabling exact, bit-precise undo.
//!
//! A [`Journal`] marks a point in the [`crate::link::LinkTable`]'s
//! history; [`Journal::undo`] rewinds every cell mutated since that
//! point back to exactly what it was. The conceptual `linked`/`leveled`
//! lists from the type-checker this engine was modeled on (one list for
//! Unbound→Link transitions, one for level lowerings) are not kept as
//! two separate vectors here: both are just "the LinkState at this slot
//! changed", so they collapse into the single chronological undo log
//! `ena::snapshot_vec::SnapshotVec` already maintains. Replaying that log
//! in reverse restores both kinds of mutation, in the correct order,
//! without this crate tracking them separately.

use crate::error::EngineBug;
use crate::link::LinkTable;

/// A mark in the link table's mutation history.
///
/// Journals are not composable across threads (the engine itself is not
/// `Send`/`Sync`, see the crate's concurrency notes) and are owned by a
/// single unification attempt; undoing the same journal twice, or
/// undoing an older journal after a newer one has already been rolled
/// back, is an API misuse the caller must not do (see
/// [`crate::error::EngineBug::DoubleUndo`]).
pub struct Journal {
    snapshot: ena::snapshot_vec::Snapshot,
    undone: bool,
}

impl Journal {
    pub(crate) fn new(snapshot: ena::snapshot_vec::Snapshot) -> Self {
        Journal {
            snapshot,
            undone: false,
        }
    }

    /// Roll the link table back to exactly the state it had when this
    /// journal was created. Panics if called twice on the same journal.
    pub fn undo(mut self, table: &mut LinkTable) {
        if self.undone {
            panic!("{}", EngineBug::DoubleUndo);
        }
        table.rollback_to(self.snapshot);
        self.undone = true;
    }

    /// Discard this journal, keeping every mutation made since it was
    /// created. Used once a speculative unification attempt is accepted.
    pub fn commit(mut self, table: &mut LinkTable) {
        if self.undone {
            panic!("{}", EngineBug::DoubleUndo);
        }
        table.commit(self.snapshot);
        self.undone = true;
    }
}

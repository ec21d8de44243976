//! The mutable union-find cell: the only point of state in the type graph.

use ena::snapshot_vec::{SnapshotVec, SnapshotVecDelegate};

use crate::ids::{TypeTermId, TypeVarId};

/// State of a single union-find cell.
///
/// `Generic` is immutable after creation: nothing in this crate ever
/// transitions a `Generic` cell to anything else. `Unbound` is the only
/// state that transitions, either to `Link` (on unification) or to a
/// lower `level` (level adjustment during occurs-check); `Link` never
/// transitions back to `Unbound` or `Generic`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkState {
    /// A free variable at a given generalization level.
    Unbound { id: u32, level: u32, is_static: bool },
    /// A universally quantified, rigid parameter.
    Generic { id: u32, is_static: bool },
    /// A forwarding edge to another term (union-find representative).
    Link { target: TypeTermId },
}

impl LinkState {
    pub fn is_unbound(&self) -> bool {
        matches!(self, LinkState::Unbound { .. })
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, LinkState::Generic { .. })
    }

    pub fn is_link(&self) -> bool {
        matches!(self, LinkState::Link { .. })
    }
}

/// `ena::snapshot_vec` only needs a no-op reverse since every mutation we
/// perform goes through `set`/`update`, which records the prior value by
/// cloning it; we never push a custom [`SnapshotVecDelegate::Undo`]
/// action of our own.
struct LinkCellDelegate;

impl SnapshotVecDelegate for LinkCellDelegate {
    type Value = LinkState;
    type Undo = ();

    fn reverse(_values: &mut Vec<LinkState>, _action: ()) {}
}

/// Side table of [`LinkState`] cells, keyed by [`TypeVarId`].
///
/// Kept separate from the [`crate::arena::TypeArena`] so that journaling
/// a unification attempt only has to snapshot this table, not the whole
/// term graph: composite terms (`Class`, `Function`, `Static`, `Partial`)
/// are never mutated after creation, only `Var` terms' backing cells
/// here are.
pub struct LinkTable {
    cells: SnapshotVec<LinkCellDelegate>,
}

impl LinkTable {
    pub fn new() -> Self {
        LinkTable {
            cells: SnapshotVec::new(),
        }
    }

    /// Allocate a new cell and return the slot it was stored at.
    pub fn push(&mut self, state: LinkState) -> TypeVarId {
        TypeVarId(self.cells.push(state) as u32)
    }

    pub fn get(&self, var: TypeVarId) -> &LinkState {
        self.cells.get(var.0 as usize)
    }

    /// Overwrite the cell at `var`, recording its previous value on the
    /// undo log so a later [`LinkTable::rollback_to`] restores it.
    pub fn set(&mut self, var: TypeVarId, state: LinkState) {
        *self.cells.get_mut(var.0 as usize) = state;
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn start_snapshot(&mut self) -> ena::snapshot_vec::Snapshot {
        self.cells.start_snapshot()
    }

    pub fn rollback_to(&mut self, snapshot: ena::snapshot_vec::Snapshot) {
        self.cells.rollback_to(snapshot);
    }

    pub fn commit(&mut self, snapshot: ena::snapshot_vec::Snapshot) {
        self.cells.commit(snapshot);
    }
}

impl Default for LinkTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_get_roundtrips() {
        let mut table = LinkTable::new();
        let v = table.push(LinkState::Unbound {
            id: 0,
            level: 1,
            is_static: false,
        });
        assert!(table.get(v).is_unbound());
    }

    #[test]
    fn set_then_rollback_restores_previous_state() {
        let mut table = LinkTable::new();
        let v = table.push(LinkState::Unbound {
            id: 0,
            level: 1,
            is_static: false,
        });
        let snap = table.start_snapshot();
        table.set(
            v,
            LinkState::Link {
                target: TypeTermId(42),
            },
        );
        assert!(table.get(v).is_link());
        table.rollback_to(snap);
        assert!(table.get(v).is_unbound());
    }

    #[test]
    fn commit_keeps_mutation() {
        let mut table = LinkTable::new();
        let v = table.push(LinkState::Unbound {
            id: 0,
            level: 1,
            is_static: false,
        });
        let snap = table.start_snapshot();
        table.set(
            v,
            LinkState::Link {
                target: TypeTermId(1),
            },
        );
        table.commit(snap);
        assert!(table.get(v).is_link());
    }
}

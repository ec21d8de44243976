//! Fresh-id allocation and the handle types used to index the type graph.

/// Handle into a [`crate::arena::TypeArena`].
///
/// Composite terms (`Class`, `Function`, `Static`, `Partial`) and links
/// are all addressed uniformly through this handle; `follow`ing a term
/// never changes its `TypeTermId`, only the `LinkState` the id's `Var`
/// variant points through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeTermId(pub u32);

/// Handle into the [`crate::link::LinkTable`] side table.
///
/// This is a *slot* index, distinct from the logical variable `id`
/// stored inside the `LinkState` at that slot: every `Unbound` cell
/// created by [`crate::engine::Engine::fresh_unbound`] allocates both in
/// lockstep so they coincide, but a `Generic` cell produced by
/// `generalize` is a brand new slot whose stored `id` is copied from the
/// `Unbound` slot it replaces (see `generalize` in `crate::generalize`),
/// so the two numbers diverge from that point on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeVarId(pub u32);

/// Monotonic source of fresh variable identifiers.
///
/// One allocator lives per [`crate::engine::Engine`] instance; there is
/// no global/process-wide counter, so two engines (e.g. one per
/// translation unit in a sharded parallel driver) never collide.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    /// Create a fresh allocator starting at id 0.
    pub fn new() -> Self {
        IdAllocator { next: 0 }
    }

    /// Allocate and return the next fresh id.
    pub fn fresh(&mut self) -> u32 {
        let id = self.next;
        self.next = self
            .next
            .checked_add(1)
            .expect("fresh id counter overflowed u32");
        id
    }

    /// Number of ids handed out so far.
    pub fn count(&self) -> u32 {
        self.next
    }
}

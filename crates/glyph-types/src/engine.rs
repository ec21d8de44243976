//! The type-checker-facing façade: one `Engine` instance bundles every
//! piece of per-compilation state (the term arena, the link side table,
//! the fresh-id counter, and the current generalization level) and
//! exposes the operations in terms of it, so two engines never share
//! mutable state and a sharded parallel driver can hold one per shard.

use smallvec::SmallVec;

use crate::arena::TypeArena;
use crate::error::UnifyMismatch;
use crate::generalize::{self, InstantiateCache};
use crate::ids::{IdAllocator, TypeTermId, TypeVarId};
use crate::journal::Journal;
use crate::link::{LinkState, LinkTable};
use crate::predicates;
use crate::static_eval::{ExprHandle, StaticEvaluator};
use crate::term::{
    ClassData, Explicits, FunctionData, PartialData, StaticData, TypeTermKind, TYPE_ARGS_INLINE,
};
use crate::unify::{self, follow};
use fixedbitset::FixedBitSet;
use glyph_common::SourceLocation;

/// Owns the term arena, the link table, the fresh-id counter, and the
/// current generalization level for one compilation unit.
///
/// Not `Send`/`Sync`: per §5, a driver that wants parallelism shards by
/// translation unit and keeps one `Engine` per shard rather than sharing
/// one across threads.
pub struct Engine {
    arena: TypeArena,
    links: LinkTable,
    ids: IdAllocator,
    level: u32,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            arena: TypeArena::new(),
            links: LinkTable::new(),
            ids: IdAllocator::new(),
            level: 0,
        }
    }

    /// Current generalization level. Scopes in the source map to levels
    /// one-to-one via [`Engine::enter_scope`]/[`Engine::exit_scope`].
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Enter a new lexical scope, returning the level it was assigned.
    pub fn enter_scope(&mut self) -> u32 {
        self.level += 1;
        self.level
    }

    /// Exit the current scope, dropping back to the enclosing level.
    pub fn exit_scope(&mut self) {
        debug_assert!(self.level > 0, "exit_scope called without a matching enter_scope");
        self.level = self.level.saturating_sub(1);
    }

    // --- Id service -----------------------------------------------------

    pub fn fresh_id(&mut self) -> u32 {
        self.ids.fresh()
    }

    // --- Constructors -----------------------------------------------------

    pub fn fresh_unbound(&mut self, level: u32, is_static: bool) -> TypeTermId {
        let id = self.ids.fresh();
        let slot = self.links.push(LinkState::Unbound { id, level, is_static });
        self.arena.alloc(TypeTermKind::Var(slot))
    }

    pub fn fresh_generic(&mut self, id: u32, is_static: bool) -> TypeTermId {
        let slot = self.links.push(LinkState::Generic { id, is_static });
        self.arena.alloc(TypeTermKind::Var(slot))
    }

    pub fn class_of(
        &mut self,
        name: impl Into<String>,
        is_record: bool,
        args: &[TypeTermId],
        explicits: Explicits,
        parent: Option<TypeTermId>,
        location: SourceLocation,
    ) -> TypeTermId {
        self.arena.alloc(TypeTermKind::Class(ClassData {
            name: name.into(),
            is_record,
            args: SmallVec::<[TypeTermId; TYPE_ARGS_INLINE]>::from_slice(args),
            explicits,
            parent,
            location,
        }))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn function_of(
        &mut self,
        name: impl Into<String>,
        func_class: TypeTermId,
        args: &[TypeTermId],
        explicits: Explicits,
        parent: Option<TypeTermId>,
        ignore_parent_generics: bool,
        location: SourceLocation,
    ) -> TypeTermId {
        self.arena.alloc(TypeTermKind::Function(FunctionData {
            name: name.into(),
            func_class,
            args: SmallVec::<[TypeTermId; TYPE_ARGS_INLINE]>::from_slice(args),
            explicits,
            parent,
            ignore_parent_generics,
            location,
        }))
    }

    pub fn static_of(&mut self, explicits: Explicits, expr: ExprHandle, location: SourceLocation) -> TypeTermId {
        self.arena.alloc(TypeTermKind::Static(StaticData {
            explicits,
            expr,
            location,
        }))
    }

    pub fn partial_of(&mut self, wrapped: TypeTermId, known_types: FixedBitSet, location: SourceLocation) -> TypeTermId {
        self.arena.alloc(TypeTermKind::Partial(PartialData {
            wrapped,
            known_types,
            location,
        }))
    }

    // --- Operations -------------------------------------------------------

    pub fn follow(&self, t: TypeTermId) -> TypeTermId {
        follow(&self.arena, &self.links, t)
    }

    pub fn unify(&mut self, a: TypeTermId, b: TypeTermId) -> Result<u32, UnifyMismatch> {
        unify::unify(&self.arena, &mut self.links, a, b)
    }

    pub fn generalize(&mut self, t: TypeTermId) -> Result<TypeTermId, UnifyMismatch> {
        let level = self.level;
        generalize::generalize(&mut self.arena, &mut self.links, t, level)
    }

    pub fn instantiate(&mut self, t: TypeTermId, cache: &mut InstantiateCache) -> Result<TypeTermId, UnifyMismatch> {
        let level = self.level;
        generalize::instantiate(&mut self.arena, &mut self.links, &mut self.ids, t, level, cache)
    }

    pub fn can_realize(&self, eval: &dyn StaticEvaluator, t: TypeTermId) -> Result<bool, UnifyMismatch> {
        predicates::can_realize(&self.arena, &self.links, eval, t)
    }

    pub fn has_unbound(&self, t: TypeTermId) -> Result<bool, UnifyMismatch> {
        predicates::has_unbound(&self.arena, &self.links, t)
    }

    pub fn realize_string(&self, eval: &dyn StaticEvaluator, t: TypeTermId) -> Result<Option<String>, UnifyMismatch> {
        predicates::realize_string(&self.arena, &self.links, eval, t)
    }

    pub fn to_string(&self, t: TypeTermId, reduced: bool) -> String {
        predicates::to_string(&self.arena, &self.links, t, reduced)
    }

    // --- Journal ------------------------------------------------------

    pub fn new_journal(&mut self) -> Journal {
        Journal::new(self.links.start_snapshot())
    }

    pub fn undo(&mut self, journal: Journal) {
        journal.undo(&mut self.links);
    }

    pub fn commit(&mut self, journal: Journal) {
        journal.commit(&mut self.links);
    }

    // --- Inspection (for callers that need the raw var, e.g. to print a
    // diagnostic pointing at a specific Unbound id) -------------------

    pub fn var_of(&self, t: TypeTermId) -> Option<TypeVarId> {
        self.arena.get(t).as_var()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/engine.rs"]
mod tests;

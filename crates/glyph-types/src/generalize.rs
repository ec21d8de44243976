//! Level-based polymorphism control: `generalize` quantifies free
//! variables at a scope exit, `instantiate` replaces quantified
//! variables with fresh ones at a scope entry or polymorphic use site.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::arena::TypeArena;
use crate::error::UnifyMismatch;
use crate::ids::{IdAllocator, TypeTermId};
use crate::link::{LinkState, LinkTable};
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::term::{ClassData, Explicits, ExplicitGeneric, FunctionData, PartialData, StaticData, TypeTermKind};

/// Cache from a `Generic`'s declared id to the fresh term [`instantiate`]
/// already produced for it, so every occurrence of the same generic
/// parameter across one term maps to the same fresh variable. See
/// `INSTANTIATE_CACHE_CAPACITY` for the initial-capacity rationale.
pub type InstantiateCache = FxHashMap<u32, TypeTermId>;

pub fn new_instantiate_cache() -> InstantiateCache {
    FxHashMap::with_capacity_and_hasher(
        glyph_common::limits::INSTANTIATE_CACHE_CAPACITY,
        Default::default(),
    )
}

/// Quantify every `Unbound` variable at or above `level`, converting it
/// to a `Generic` carrying the same id. Does not mutate the `Unbound`
/// cell it starts from: a brand-new `Generic` cell is allocated instead,
/// carrying the same numeric id, leaving the original slot as it was
/// (it simply becomes unreachable once every handle to the old term is
/// replaced by the new one this function returns).
pub fn generalize(
    arena: &mut TypeArena,
    links: &mut LinkTable,
    t: TypeTermId,
    level: u32,
) -> Result<TypeTermId, UnifyMismatch> {
    let mut depth = DepthCounter::with_profile(RecursionProfile::Generalize);
    generalize_inner(arena, links, t, level, &mut depth)
}

fn generalize_inner(
    arena: &mut TypeArena,
    links: &mut LinkTable,
    t: TypeTermId,
    level: u32,
    depth: &mut DepthCounter,
) -> Result<TypeTermId, UnifyMismatch> {
    if !depth.enter() {
        return Err(UnifyMismatch::DepthExceeded);
    }
    let result = generalize_step(arena, links, t, level, depth);
    depth.leave();
    result
}

fn generalize_step(
    arena: &mut TypeArena,
    links: &mut LinkTable,
    t: TypeTermId,
    level: u32,
    depth: &mut DepthCounter,
) -> Result<TypeTermId, UnifyMismatch> {
    match arena.get(t).clone() {
        TypeTermKind::Var(v) => match links.get(v).clone() {
            LinkState::Unbound { id, level: l, is_static } => {
                if l >= level {
                    let new_slot = links.push(LinkState::Generic { id, is_static });
                    tracing::trace!(var = id, var_level = l, quantify_level = level, "quantified variable");
                    Ok(arena.alloc(TypeTermKind::Var(new_slot)))
                } else {
                    Ok(t)
                }
            }
            LinkState::Generic { .. } => Ok(t),
            LinkState::Link { target } => generalize_inner(arena, links, target, level, depth),
        },
        TypeTermKind::Class(c) => {
            let args = generalize_args(arena, links, &c.args, level, depth)?;
            let explicits = generalize_explicits(arena, links, &c.explicits, level, depth)?;
            let parent = c
                .parent
                .map(|p| generalize_inner(arena, links, p, level, depth))
                .transpose()?;
            Ok(arena.alloc(TypeTermKind::Class(ClassData {
                name: c.name,
                is_record: c.is_record,
                args,
                explicits,
                parent,
                location: c.location,
            })))
        }
        TypeTermKind::Function(f) => {
            let args = generalize_args(arena, links, &f.args, level, depth)?;
            let explicits = generalize_explicits(arena, links, &f.explicits, level, depth)?;
            let parent = f
                .parent
                .map(|p| generalize_inner(arena, links, p, level, depth))
                .transpose()?;
            Ok(arena.alloc(TypeTermKind::Function(FunctionData {
                name: f.name,
                // `func_class` only supplies stable per-position generic
                // ids to `crate::unify::class_view`; its own term content
                // never participates in unification, so it is carried
                // over unchanged rather than independently generalized.
                func_class: f.func_class,
                args,
                explicits,
                parent,
                ignore_parent_generics: f.ignore_parent_generics,
                location: f.location,
            })))
        }
        TypeTermKind::Static(s) => {
            let explicits = generalize_explicits(arena, links, &s.explicits, level, depth)?;
            Ok(arena.alloc(TypeTermKind::Static(StaticData {
                explicits,
                expr: s.expr,
                location: s.location,
            })))
        }
        TypeTermKind::Partial(p) => {
            let wrapped = generalize_inner(arena, links, p.wrapped, level, depth)?;
            Ok(arena.alloc(TypeTermKind::Partial(PartialData {
                wrapped,
                known_types: p.known_types,
                location: p.location,
            })))
        }
    }
}

fn generalize_args(
    arena: &mut TypeArena,
    links: &mut LinkTable,
    args: &SmallVec<[TypeTermId; crate::term::TYPE_ARGS_INLINE]>,
    level: u32,
    depth: &mut DepthCounter,
) -> Result<SmallVec<[TypeTermId; crate::term::TYPE_ARGS_INLINE]>, UnifyMismatch> {
    args.iter()
        .map(|a| generalize_inner(arena, links, *a, level, depth))
        .collect()
}

fn generalize_explicits(
    arena: &mut TypeArena,
    links: &mut LinkTable,
    explicits: &Explicits,
    level: u32,
    depth: &mut DepthCounter,
) -> Result<Explicits, UnifyMismatch> {
    let mut out = Explicits::new();
    for (name, eg) in explicits {
        let term = eg
            .term
            .map(|t| generalize_inner(arena, links, t, level, depth))
            .transpose()?;
        out.insert(name.clone(), ExplicitGeneric { term, id: eg.id });
    }
    Ok(out)
}

/// Replace every `Generic` with a fresh `Unbound` at `level`, sharing one
/// fresh variable across every occurrence of the same generic id within
/// this call (recorded in `cache`). This is what makes `forall a. (a, a)
/// -> a` instantiate to `(b, b) -> b` rather than `(b, c) -> d`.
pub fn instantiate(
    arena: &mut TypeArena,
    links: &mut LinkTable,
    ids: &mut IdAllocator,
    t: TypeTermId,
    level: u32,
    cache: &mut InstantiateCache,
) -> Result<TypeTermId, UnifyMismatch> {
    let mut depth = DepthCounter::with_profile(RecursionProfile::Generalize);
    instantiate_inner(arena, links, ids, t, level, cache, &mut depth)
}

fn instantiate_inner(
    arena: &mut TypeArena,
    links: &mut LinkTable,
    ids: &mut IdAllocator,
    t: TypeTermId,
    level: u32,
    cache: &mut InstantiateCache,
    depth: &mut DepthCounter,
) -> Result<TypeTermId, UnifyMismatch> {
    if !depth.enter() {
        return Err(UnifyMismatch::DepthExceeded);
    }
    let result = instantiate_step(arena, links, ids, t, level, cache, depth);
    depth.leave();
    result
}

fn instantiate_step(
    arena: &mut TypeArena,
    links: &mut LinkTable,
    ids: &mut IdAllocator,
    t: TypeTermId,
    level: u32,
    cache: &mut InstantiateCache,
    depth: &mut DepthCounter,
) -> Result<TypeTermId, UnifyMismatch> {
    match arena.get(t).clone() {
        TypeTermKind::Var(v) => match links.get(v).clone() {
            LinkState::Generic { id, is_static } => {
                if let Some(&cached) = cache.get(&id) {
                    return Ok(cached);
                }
                let fresh_id = ids.fresh();
                let slot = links.push(LinkState::Unbound {
                    id: fresh_id,
                    level,
                    is_static,
                });
                let fresh = arena.alloc(TypeTermKind::Var(slot));
                cache.insert(id, fresh);
                tracing::trace!(generic = id, fresh = fresh_id, level, "instantiated generic");
                Ok(fresh)
            }
            LinkState::Unbound { .. } => Ok(t),
            LinkState::Link { target } => instantiate_inner(arena, links, ids, target, level, cache, depth),
        },
        TypeTermKind::Class(c) => {
            let args = instantiate_args(arena, links, ids, &c.args, level, cache, depth)?;
            let explicits = instantiate_explicits(arena, links, ids, &c.explicits, level, cache, depth)?;
            let parent = c
                .parent
                .map(|p| instantiate_inner(arena, links, ids, p, level, cache, depth))
                .transpose()?;
            Ok(arena.alloc(TypeTermKind::Class(ClassData {
                name: c.name,
                is_record: c.is_record,
                args,
                explicits,
                parent,
                location: c.location,
            })))
        }
        TypeTermKind::Function(f) => {
            let args = instantiate_args(arena, links, ids, &f.args, level, cache, depth)?;
            let explicits = instantiate_explicits(arena, links, ids, &f.explicits, level, cache, depth)?;
            let parent = f
                .parent
                .map(|p| instantiate_inner(arena, links, ids, p, level, cache, depth))
                .transpose()?;
            Ok(arena.alloc(TypeTermKind::Function(FunctionData {
                name: f.name,
                func_class: f.func_class,
                args,
                explicits,
                parent,
                ignore_parent_generics: f.ignore_parent_generics,
                location: f.location,
            })))
        }
        TypeTermKind::Static(s) => {
            let explicits = instantiate_explicits(arena, links, ids, &s.explicits, level, cache, depth)?;
            Ok(arena.alloc(TypeTermKind::Static(StaticData {
                explicits,
                expr: s.expr,
                location: s.location,
            })))
        }
        TypeTermKind::Partial(p) => {
            let wrapped = instantiate_inner(arena, links, ids, p.wrapped, level, cache, depth)?;
            Ok(arena.alloc(TypeTermKind::Partial(PartialData {
                wrapped,
                known_types: p.known_types,
                location: p.location,
            })))
        }
    }
}

fn instantiate_args(
    arena: &mut TypeArena,
    links: &mut LinkTable,
    ids: &mut IdAllocator,
    args: &SmallVec<[TypeTermId; crate::term::TYPE_ARGS_INLINE]>,
    level: u32,
    cache: &mut InstantiateCache,
    depth: &mut DepthCounter,
) -> Result<SmallVec<[TypeTermId; crate::term::TYPE_ARGS_INLINE]>, UnifyMismatch> {
    args.iter()
        .map(|a| instantiate_inner(arena, links, ids, *a, level, cache, depth))
        .collect()
}

fn instantiate_explicits(
    arena: &mut TypeArena,
    links: &mut LinkTable,
    ids: &mut IdAllocator,
    explicits: &Explicits,
    level: u32,
    cache: &mut InstantiateCache,
    depth: &mut DepthCounter,
) -> Result<Explicits, UnifyMismatch> {
    let mut out = Explicits::new();
    for (name, eg) in explicits {
        let term = if let Some(&cached) = cache.get(&eg.id) {
            Some(cached)
        } else if let Some(t) = eg.term {
            let inst = instantiate_inner(arena, links, ids, t, level, cache, depth)?;
            cache.entry(eg.id).or_insert(inst);
            Some(inst)
        } else {
            None
        };
        out.insert(name.clone(), ExplicitGeneric { term, id: eg.id });
    }
    Ok(out)
}

#[cfg(test)]
#[path = "tests/generalize.rs"]
mod tests;

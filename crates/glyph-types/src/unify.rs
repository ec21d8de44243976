//! Structural unification.
//!
//! `unify` never undoes its own partial work on failure: the journal
//! records whatever prefix of mutations happened before the failing
//! comparison, and the caller decides whether to keep them (this
//! attempt was not actually speculative) or roll them back via
//! [`crate::journal::Journal::undo`].

use smallvec::SmallVec;

use crate::arena::TypeArena;
use crate::error::{UnifyMismatch, UnifyOutcome};
use crate::ids::{TypeTermId, TypeVarId};
use crate::link::{LinkState, LinkTable};
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::term::{
    chop, is_func, is_tuple, ClassData, Explicits, ExplicitGeneric, TypeTermKind,
    PARTIAL_WRAPPED_ID,
};

/// Stack red zone `stacker::maybe_grow` leaves before allocating a new
/// segment, and the size of the segment it allocates. `unify` recurses
/// once per nested type shape, so a deeply nested (but finite, per the
/// occurs-check) type graph can otherwise overflow the native stack.
const STACK_RED_ZONE: usize = 32 * 1024;
const STACK_SEGMENT: usize = 1024 * 1024;

/// Walk `Link` chains to the representative term. Does not mutate the
/// link table: path compression is optional per the type this engine
/// was modeled on, and skipping it keeps every mutation this module
/// performs funneled through the two journaled call sites
/// ([`unify_unbound_absorb`]'s occurs-clean absorb and its level-lowering
/// pass), which is what makes [`crate::journal::Journal::undo`] exact.
pub fn follow(arena: &TypeArena, links: &LinkTable, mut id: TypeTermId) -> TypeTermId {
    let mut steps = 0u32;
    loop {
        match arena.get(id) {
            TypeTermKind::Var(v) => match links.get(*v) {
                LinkState::Link { target } => {
                    id = *target;
                    steps += 1;
                    debug_assert!(
                        steps < glyph_common::limits::MAX_UNIFY_DEPTH,
                        "link chain longer than the occurs-check should ever allow"
                    );
                }
                _ => return id,
            },
            _ => return id,
        }
    }
}

fn term_is_static(arena: &TypeArena, links: &LinkTable, id: TypeTermId) -> bool {
    match arena.get(id) {
        TypeTermKind::Var(v) => match links.get(*v) {
            LinkState::Unbound { is_static, .. } | LinkState::Generic { is_static, .. } => {
                *is_static
            }
            LinkState::Link { .. } => unreachable!("term_is_static expects a followed id"),
        },
        TypeTermKind::Static(_) => true,
        TypeTermKind::Class(_) | TypeTermKind::Function(_) | TypeTermKind::Partial(_) => false,
    }
}

/// Attempt to make `a` and `b` structurally equal, returning a
/// non-negative match score on success (see [`unify_classes`]'s doc
/// comment for the scoring rule) or the reason they cannot unify.
pub fn unify(arena: &TypeArena, links: &mut LinkTable, a: TypeTermId, b: TypeTermId) -> UnifyOutcome {
    let outcome = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
        let mut depth = DepthCounter::with_profile(RecursionProfile::Unify);
        unify_inner(arena, links, a, b, &mut depth)
    });
    match &outcome {
        Ok(score) => tracing::trace!(a = a.0, b = b.0, score, "unify succeeded"),
        Err(mismatch) => tracing::trace!(a = a.0, b = b.0, ?mismatch, "unify failed"),
    }
    outcome
}

fn unify_inner(
    arena: &TypeArena,
    links: &mut LinkTable,
    a: TypeTermId,
    b: TypeTermId,
    depth: &mut DepthCounter,
) -> UnifyOutcome {
    if !depth.enter() {
        return Err(UnifyMismatch::DepthExceeded);
    }
    let result = unify_step(arena, links, a, b, depth);
    depth.leave();
    result
}

fn unify_step(
    arena: &TypeArena,
    links: &mut LinkTable,
    a: TypeTermId,
    b: TypeTermId,
    depth: &mut DepthCounter,
) -> UnifyOutcome {
    let a = follow(arena, links, a);
    let b = follow(arena, links, b);
    if a == b {
        return Ok(1);
    }

    let a_is_unbound_var = matches!(arena.get(a), TypeTermKind::Var(v) if links.get(*v).is_unbound());
    let b_is_unbound_var = matches!(arena.get(b), TypeTermKind::Var(v) if links.get(*v).is_unbound());

    if a_is_unbound_var {
        let TypeTermKind::Var(va) = arena.get(a) else {
            unreachable!()
        };
        return unify_unbound_absorb(arena, links, *va, b);
    }
    if b_is_unbound_var {
        let TypeTermKind::Var(vb) = arena.get(b) else {
            unreachable!()
        };
        return unify_unbound_absorb(arena, links, *vb, a);
    }

    match (arena.get(a), arena.get(b)) {
        (TypeTermKind::Var(va), TypeTermKind::Var(vb)) => {
            match (links.get(*va), links.get(*vb)) {
                (
                    LinkState::Generic { id: ia, is_static: sa },
                    LinkState::Generic { id: ib, is_static: sb },
                ) if ia == ib && sa == sb => Ok(1),
                _ => Err(UnifyMismatch::GenericRigidity),
            }
        }
        (TypeTermKind::Var(_), _) | (_, TypeTermKind::Var(_)) => {
            // The only remaining Var state post-follow is Generic, and a
            // Generic unifies only with an identical Generic (handled by
            // the `a == b` fast path above and the branch preceding this
            // one); anything else is a rigidity failure.
            Err(UnifyMismatch::GenericRigidity)
        }
        (TypeTermKind::Static(_), TypeTermKind::Static(_)) => unify_static(arena, links, a, b, depth),
        (TypeTermKind::Static(_), _) | (_, TypeTermKind::Static(_)) => {
            Err(UnifyMismatch::Unclassifiable)
        }
        (TypeTermKind::Partial(_), TypeTermKind::Partial(_)) => {
            unify_partial(arena, links, a, b, depth)
        }
        (TypeTermKind::Partial(_), _) | (_, TypeTermKind::Partial(_)) => {
            Err(UnifyMismatch::NotPartial)
        }
        (TypeTermKind::Class(_) | TypeTermKind::Function(_), TypeTermKind::Class(_) | TypeTermKind::Function(_)) => {
            let ca = class_view(arena, a);
            let cb = class_view(arena, b);
            unify_classes(arena, links, &ca, &cb, depth)
        }
    }
}

fn unify_unbound_absorb(
    arena: &TypeArena,
    links: &mut LinkTable,
    slot: TypeVarId,
    other: TypeTermId,
) -> UnifyOutcome {
    let (var_id, var_level, var_static) = match links.get(slot) {
        LinkState::Unbound { id, level, is_static } => (*id, *level, *is_static),
        _ => unreachable!("unify_unbound_absorb requires an Unbound slot"),
    };

    if term_is_static(arena, links, other) != var_static {
        return Err(UnifyMismatch::StaticFlagMismatch);
    }

    // Pure pass first: if `other` contains `slot`, fail without
    // mutating anything, including the level adjustments that would
    // otherwise happen during the same traversal.
    let mut occurs_depth = DepthCounter::with_profile(RecursionProfile::OccursCheck);
    if contains_var(arena, links, slot, other, &mut occurs_depth)? {
        return Err(UnifyMismatch::OccursCheck { var: var_id });
    }

    let mut level_depth = DepthCounter::with_profile(RecursionProfile::OccursCheck);
    lower_levels(arena, links, var_level, other, &mut level_depth)?;

    links.set(slot, LinkState::Link { target: other });
    tracing::trace!(var = var_id, level = var_level, target = other.0, "bound unbound variable");
    Ok(0)
}

fn contains_var(
    arena: &TypeArena,
    links: &LinkTable,
    target: TypeVarId,
    term: TypeTermId,
    depth: &mut DepthCounter,
) -> Result<bool, UnifyMismatch> {
    if !depth.enter() {
        return Err(UnifyMismatch::DepthExceeded);
    }
    let result = contains_var_step(arena, links, target, term, depth);
    depth.leave();
    result
}

fn contains_var_step(
    arena: &TypeArena,
    links: &LinkTable,
    target: TypeVarId,
    term: TypeTermId,
    depth: &mut DepthCounter,
) -> Result<bool, UnifyMismatch> {
    let term = follow(arena, links, term);
    match arena.get(term) {
        TypeTermKind::Var(v) => Ok(*v == target),
        TypeTermKind::Class(c) => {
            for arg in &c.args {
                if contains_var(arena, links, target, *arg, depth)? {
                    return Ok(true);
                }
            }
            if explicits_contain(arena, links, target, &c.explicits, depth)? {
                return Ok(true);
            }
            if let Some(p) = c.parent {
                if contains_var(arena, links, target, p, depth)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        TypeTermKind::Function(f) => {
            for arg in &f.args {
                if contains_var(arena, links, target, *arg, depth)? {
                    return Ok(true);
                }
            }
            if explicits_contain(arena, links, target, &f.explicits, depth)? {
                return Ok(true);
            }
            if let Some(p) = f.parent {
                if contains_var(arena, links, target, p, depth)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        TypeTermKind::Static(s) => explicits_contain(arena, links, target, &s.explicits, depth),
        TypeTermKind::Partial(p) => contains_var(arena, links, target, p.wrapped, depth),
    }
}

fn explicits_contain(
    arena: &TypeArena,
    links: &LinkTable,
    target: TypeVarId,
    explicits: &Explicits,
    depth: &mut DepthCounter,
) -> Result<bool, UnifyMismatch> {
    for eg in explicits.values() {
        if let Some(t) = eg.term {
            if contains_var(arena, links, target, t, depth)? {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn lower_levels(
    arena: &TypeArena,
    links: &mut LinkTable,
    absorb_level: u32,
    term: TypeTermId,
    depth: &mut DepthCounter,
) -> Result<(), UnifyMismatch> {
    if !depth.enter() {
        return Err(UnifyMismatch::DepthExceeded);
    }
    let result = lower_levels_step(arena, links, absorb_level, term, depth);
    depth.leave();
    result
}

fn lower_levels_step(
    arena: &TypeArena,
    links: &mut LinkTable,
    absorb_level: u32,
    term: TypeTermId,
    depth: &mut DepthCounter,
) -> Result<(), UnifyMismatch> {
    let term = follow(arena, links, term);
    match arena.get(term) {
        TypeTermKind::Var(v) => {
            let v = *v;
            if let LinkState::Unbound { id, level, is_static } = *links.get(v) {
                if level > absorb_level {
                    links.set(
                        v,
                        LinkState::Unbound {
                            id,
                            level: absorb_level,
                            is_static,
                        },
                    );
                    tracing::trace!(var = id, from = level, to = absorb_level, "lowered variable level");
                }
            }
            Ok(())
        }
        TypeTermKind::Class(c) => {
            let args = c.args.clone();
            let explicits: SmallVec<[TypeTermId; 4]> = c.explicits.values().filter_map(|e| e.term).collect();
            let parent = c.parent;
            for arg in args {
                lower_levels(arena, links, absorb_level, arg, depth)?;
            }
            for t in explicits {
                lower_levels(arena, links, absorb_level, t, depth)?;
            }
            if let Some(p) = parent {
                lower_levels(arena, links, absorb_level, p, depth)?;
            }
            Ok(())
        }
        TypeTermKind::Function(f) => {
            let args = f.args.clone();
            let explicits: SmallVec<[TypeTermId; 4]> = f.explicits.values().filter_map(|e| e.term).collect();
            let parent = f.parent;
            for arg in args {
                lower_levels(arena, links, absorb_level, arg, depth)?;
            }
            for t in explicits {
                lower_levels(arena, links, absorb_level, t, depth)?;
            }
            if let Some(p) = parent {
                lower_levels(arena, links, absorb_level, p, depth)?;
            }
            Ok(())
        }
        TypeTermKind::Static(s) => {
            let explicits: SmallVec<[TypeTermId; 4]> = s.explicits.values().filter_map(|e| e.term).collect();
            for t in explicits {
                lower_levels(arena, links, absorb_level, t, depth)?;
            }
            Ok(())
        }
        TypeTermKind::Partial(p) => lower_levels(arena, links, absorb_level, p.wrapped, depth),
    }
}

/// A transient, non-arena-allocated `Class` shape used to compare a
/// `Function` structurally, synthesized per [`crate::unify`]'s module
/// doc: same name and location as the function, `is_record = true`,
/// `args` the function's full argument/return list (index 0 included),
/// and one positional explicit generic per argument, reusing the
/// backing `func_class`'s own explicit ids where available so the same
/// generic parameter keeps the same id across the synthesized view.
pub fn class_view(arena: &TypeArena, id: TypeTermId) -> ClassData {
    match arena.get(id) {
        TypeTermKind::Class(c) => c.clone(),
        TypeTermKind::Function(f) => {
            let func_class = arena.get(f.func_class).as_class();
            let mut explicits = Explicits::new();
            for (i, arg) in f.args.iter().enumerate() {
                let id = func_class
                    .and_then(|c| c.explicits.get_index(i))
                    .map(|(_, eg)| eg.id)
                    .unwrap_or(i as u32);
                explicits.insert(format!("T{i}"), ExplicitGeneric::new(*arg, id));
            }
            ClassData {
                name: f.name.clone(),
                is_record: true,
                args: f.args.clone(),
                explicits,
                parent: None,
                location: f.location,
            }
        }
        TypeTermKind::Static(_) | TypeTermKind::Partial(_) => {
            unreachable!("class_view is only called on Class/Function shapes")
        }
    }
}

pub(crate) fn partial_class_view(p: &crate::term::PartialData) -> ClassData {
    let mut explicits = Explicits::new();
    explicits.insert(
        "T".to_string(),
        ExplicitGeneric::new(p.wrapped, PARTIAL_WRAPPED_ID),
    );
    ClassData {
        name: p.name(),
        is_record: true,
        args: SmallVec::new(),
        explicits,
        parent: None,
        location: p.location,
    }
}

/// Unify two class-shaped views structurally: arities and `isRecord`
/// flags must agree; field types unify pairwise left-to-right. Tuples
/// (record, name prefix `tuple.`) are structural whenever *either* side
/// carries the prefix; function-classes (record, name prefix
/// `function.`) are structural only when *both* sides do. Either case
/// returns the summed args score immediately, before names, parents, or
/// explicits are ever looked at. Every other record and every
/// non-record nominal class requires the chopped names to match, the
/// parent presence to agree (parents unify last), and explicit generics
/// to unify pairwise by position.
///
/// The returned score is simply the sum of every successful child
/// comparison — no bonus is added for matching at this level.
fn unify_classes(
    arena: &TypeArena,
    links: &mut LinkTable,
    a: &ClassData,
    b: &ClassData,
    depth: &mut DepthCounter,
) -> UnifyOutcome {
    if a.is_record != b.is_record {
        return Err(UnifyMismatch::RecordFlagMismatch);
    }
    if a.args.len() != b.args.len() {
        return Err(UnifyMismatch::ArityMismatch);
    }

    let mut score = 0u32;
    for (pa, pb) in a.args.iter().zip(b.args.iter()) {
        score += unify_inner(arena, links, *pa, *pb, depth)?;
    }

    let names_exempt = a.is_record
        && ((is_tuple(&a.name) || is_tuple(&b.name)) || (is_func(&a.name) && is_func(&b.name)));
    if names_exempt {
        return Ok(score);
    }

    if chop(&a.name) != chop(&b.name) {
        return Err(UnifyMismatch::NameMismatch);
    }

    match (a.parent, b.parent) {
        (Some(_), None) | (None, Some(_)) => return Err(UnifyMismatch::ParentPresenceMismatch),
        _ => {}
    }

    if a.explicits.len() != b.explicits.len() {
        return Err(UnifyMismatch::ArityMismatch);
    }
    for (ea, eb) in a.explicits.values().zip(b.explicits.values()) {
        if let (Some(ta), Some(tb)) = (ea.term, eb.term) {
            score += unify_inner(arena, links, ta, tb, depth)?;
        }
    }

    if let (Some(pa), Some(pb)) = (a.parent, b.parent) {
        score += unify_inner(arena, links, pa, pb, depth)?;
    }

    Ok(score)
}

fn unify_static(
    arena: &TypeArena,
    links: &mut LinkTable,
    a: TypeTermId,
    b: TypeTermId,
    depth: &mut DepthCounter,
) -> UnifyOutcome {
    let sa = arena.get(a).as_static().expect("a is Static");
    let sb = arena.get(b).as_static().expect("b is Static");
    if sa.expr.printed_form() != sb.expr.printed_form() {
        return Err(UnifyMismatch::ExpressionMismatch);
    }
    if sa.explicits.len() != sb.explicits.len() {
        return Err(UnifyMismatch::ArityMismatch);
    }
    let mut score = 0u32;
    let pairs: SmallVec<[(TypeTermId, TypeTermId); 4]> = sa
        .explicits
        .values()
        .zip(sb.explicits.values())
        .filter_map(|(ea, eb)| Some((ea.term?, eb.term?)))
        .collect();
    for (ta, tb) in pairs {
        score += unify_inner(arena, links, ta, tb, depth)?;
    }
    Ok(score)
}

fn unify_partial(
    arena: &TypeArena,
    links: &mut LinkTable,
    a: TypeTermId,
    b: TypeTermId,
    depth: &mut DepthCounter,
) -> UnifyOutcome {
    let pa = arena.get(a).as_partial().expect("a is Partial");
    let pb = arena.get(b).as_partial().expect("b is Partial");
    if pa.known_types.len() != pb.known_types.len() {
        return Err(UnifyMismatch::BitmaskMismatch);
    }
    for i in 0..pa.known_types.len() {
        if pa.known_types[i] != pb.known_types[i] {
            return Err(UnifyMismatch::BitmaskMismatch);
        }
    }
    let ca = partial_class_view(pa);
    let cb = partial_class_view(pb);
    unify_classes(arena, links, &ca, &cb, depth)
}

#[cfg(test)]
#[path = "tests/unify.rs"]
mod tests;

//! `canRealize`, `hasUnbound`, and the two printable forms
//! (`toString` for debugging, `realizeString` as codegen's cache key).
//!
//! All four share the same depth-bounded traversal shape and the same
//! `Function` asymmetry: `args[0]` (the self/return slot) is skipped by
//! `canRealize`/`hasUnbound`/`realizeString` (it is derivable once the
//! rest of the signature is concrete) but kept by `toString` (a human
//! reading a debug dump wants to see the return type).

use rustc_hash::FxHashMap;

use crate::arena::TypeArena;
use crate::error::UnifyMismatch;
use crate::ids::TypeTermId;
use crate::link::{LinkState, LinkTable};
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::static_eval::StaticEvaluator;
use crate::term::{chop, ClassData, TypeTermKind};
use crate::unify::{follow, partial_class_view};

/// True if every transitively reachable `Link` is `Link` (fully
/// resolved) and, for any `Static` along the way, its evaluator accepts
/// the bindings derived from its own explicit generics.
pub fn can_realize(
    arena: &TypeArena,
    links: &LinkTable,
    eval: &dyn StaticEvaluator,
    t: TypeTermId,
) -> Result<bool, UnifyMismatch> {
    let mut depth = DepthCounter::with_profile(RecursionProfile::Print);
    can_realize_inner(arena, links, eval, t, &mut depth)
}

fn can_realize_inner(
    arena: &TypeArena,
    links: &LinkTable,
    eval: &dyn StaticEvaluator,
    t: TypeTermId,
    depth: &mut DepthCounter,
) -> Result<bool, UnifyMismatch> {
    if !depth.enter() {
        return Err(UnifyMismatch::DepthExceeded);
    }
    let result = can_realize_step(arena, links, eval, t, depth);
    depth.leave();
    result
}

fn can_realize_step(
    arena: &TypeArena,
    links: &LinkTable,
    eval: &dyn StaticEvaluator,
    t: TypeTermId,
    depth: &mut DepthCounter,
) -> Result<bool, UnifyMismatch> {
    let t = follow(arena, links, t);
    match arena.get(t) {
        TypeTermKind::Var(v) => Ok(links.get(*v).is_link()),
        TypeTermKind::Class(c) => can_realize_class_like(arena, links, eval, c, depth),
        TypeTermKind::Function(f) => {
            for arg in f.args.iter().skip(1) {
                if !can_realize_inner(arena, links, eval, *arg, depth)? {
                    return Ok(false);
                }
            }
            for eg in f.explicits.values() {
                if let Some(term) = eg.term {
                    if !can_realize_inner(arena, links, eval, term, depth)? {
                        return Ok(false);
                    }
                }
            }
            can_realize_function_parent(arena, links, eval, f.parent, f.ignore_parent_generics, depth)
        }
        TypeTermKind::Static(_) => Ok(realize_static_inner(arena, links, eval, t, depth)?.is_some()),
        TypeTermKind::Partial(p) => can_realize_inner(arena, links, eval, p.wrapped, depth),
    }
}

fn can_realize_class_like(
    arena: &TypeArena,
    links: &LinkTable,
    eval: &dyn StaticEvaluator,
    c: &ClassData,
    depth: &mut DepthCounter,
) -> Result<bool, UnifyMismatch> {
    for arg in &c.args {
        if !can_realize_inner(arena, links, eval, *arg, depth)? {
            return Ok(false);
        }
    }
    for eg in c.explicits.values() {
        if let Some(term) = eg.term {
            if !can_realize_inner(arena, links, eval, term, depth)? {
                return Ok(false);
            }
        }
    }
    if let Some(p) = c.parent {
        return can_realize_inner(arena, links, eval, p, depth);
    }
    Ok(true)
}

/// Checks a `Function`'s `parent` for `canRealize`/`hasUnbound`. When
/// `ignore_parent_generics` is set, the immediate parent's own explicit
/// generics are assumed bound by the enclosing context and are not
/// required to realize here; its fields and its own parent still are.
fn can_realize_function_parent(
    arena: &TypeArena,
    links: &LinkTable,
    eval: &dyn StaticEvaluator,
    parent: Option<TypeTermId>,
    ignore_parent_generics: bool,
    depth: &mut DepthCounter,
) -> Result<bool, UnifyMismatch> {
    let Some(parent) = parent else { return Ok(true) };
    if !ignore_parent_generics {
        return can_realize_inner(arena, links, eval, parent, depth);
    }
    let followed = follow(arena, links, parent);
    match arena.get(followed) {
        TypeTermKind::Class(c) => {
            for arg in &c.args {
                if !can_realize_inner(arena, links, eval, *arg, depth)? {
                    return Ok(false);
                }
            }
            match c.parent {
                Some(gp) => can_realize_inner(arena, links, eval, gp, depth),
                None => Ok(true),
            }
        }
        _ => can_realize_inner(arena, links, eval, followed, depth),
    }
}

/// True if any transitively reachable `Link` is still `Unbound`.
pub fn has_unbound(arena: &TypeArena, links: &LinkTable, t: TypeTermId) -> Result<bool, UnifyMismatch> {
    let mut depth = DepthCounter::with_profile(RecursionProfile::Print);
    has_unbound_inner(arena, links, t, &mut depth)
}

fn has_unbound_inner(
    arena: &TypeArena,
    links: &LinkTable,
    t: TypeTermId,
    depth: &mut DepthCounter,
) -> Result<bool, UnifyMismatch> {
    if !depth.enter() {
        return Err(UnifyMismatch::DepthExceeded);
    }
    let result = has_unbound_step(arena, links, t, depth);
    depth.leave();
    result
}

fn has_unbound_step(
    arena: &TypeArena,
    links: &LinkTable,
    t: TypeTermId,
    depth: &mut DepthCounter,
) -> Result<bool, UnifyMismatch> {
    let t = follow(arena, links, t);
    match arena.get(t) {
        TypeTermKind::Var(v) => Ok(links.get(*v).is_unbound()),
        TypeTermKind::Class(c) => has_unbound_class_like(arena, links, c, depth),
        TypeTermKind::Function(f) => {
            for arg in f.args.iter().skip(1) {
                if has_unbound_inner(arena, links, *arg, depth)? {
                    return Ok(true);
                }
            }
            for eg in f.explicits.values() {
                if let Some(term) = eg.term {
                    if has_unbound_inner(arena, links, term, depth)? {
                        return Ok(true);
                    }
                }
            }
            if f.ignore_parent_generics {
                if let Some(parent) = f.parent {
                    let followed = follow(arena, links, parent);
                    return match arena.get(followed) {
                        TypeTermKind::Class(c) => {
                            for arg in &c.args {
                                if has_unbound_inner(arena, links, *arg, depth)? {
                                    return Ok(true);
                                }
                            }
                            match c.parent {
                                Some(gp) => has_unbound_inner(arena, links, gp, depth),
                                None => Ok(false),
                            }
                        }
                        _ => has_unbound_inner(arena, links, followed, depth),
                    };
                }
                Ok(false)
            } else {
                match f.parent {
                    Some(p) => has_unbound_inner(arena, links, p, depth),
                    None => Ok(false),
                }
            }
        }
        TypeTermKind::Static(s) => {
            for eg in s.explicits.values() {
                if let Some(term) = eg.term {
                    if has_unbound_inner(arena, links, term, depth)? {
                        return Ok(true);
                    }
                }
            }
            Ok(false)
        }
        TypeTermKind::Partial(p) => has_unbound_inner(arena, links, p.wrapped, depth),
    }
}

fn has_unbound_class_like(
    arena: &TypeArena,
    links: &LinkTable,
    c: &ClassData,
    depth: &mut DepthCounter,
) -> Result<bool, UnifyMismatch> {
    for arg in &c.args {
        if has_unbound_inner(arena, links, *arg, depth)? {
            return Ok(true);
        }
    }
    for eg in c.explicits.values() {
        if let Some(term) = eg.term {
            if has_unbound_inner(arena, links, term, depth)? {
                return Ok(true);
            }
        }
    }
    match c.parent {
        Some(p) => has_unbound_inner(arena, links, p, depth),
        None => Ok(false),
    }
}

/// Debug form. `Unbound` prints as `?id.level`, `Generic` as `#id`
/// (scenario 4's worked example shows the bare id; this engine follows
/// that rather than the grammar prose, which has apparently copied the
/// `.level` suffix from the `Unbound` line above it), `Link` is
/// transparent (the representative is printed instead). `reduced`
/// suppresses the `parent:` prefix.
pub fn to_string(arena: &TypeArena, links: &LinkTable, t: TypeTermId, reduced: bool) -> String {
    let mut depth = DepthCounter::with_profile(RecursionProfile::Print);
    to_string_inner(arena, links, t, reduced, &mut depth).unwrap_or_else(|_| "<depth exceeded>".to_string())
}

fn to_string_inner(
    arena: &TypeArena,
    links: &LinkTable,
    t: TypeTermId,
    reduced: bool,
    depth: &mut DepthCounter,
) -> Result<String, UnifyMismatch> {
    if !depth.enter() {
        return Err(UnifyMismatch::DepthExceeded);
    }
    let result = to_string_step(arena, links, t, reduced, depth);
    depth.leave();
    result
}

fn to_string_step(
    arena: &TypeArena,
    links: &LinkTable,
    t: TypeTermId,
    reduced: bool,
    depth: &mut DepthCounter,
) -> Result<String, UnifyMismatch> {
    let t = follow(arena, links, t);
    match arena.get(t) {
        TypeTermKind::Var(v) => match links.get(*v) {
            LinkState::Unbound { id, level, .. } => Ok(format!("?{id}.{level}")),
            LinkState::Generic { id, .. } => Ok(format!("#{id}")),
            LinkState::Link { .. } => unreachable!("to_string_step expects a followed id"),
        },
        TypeTermKind::Class(c) => to_string_class_like(arena, links, c, reduced, depth),
        TypeTermKind::Function(f) => {
            let mut parts = Vec::with_capacity(f.args.len());
            for arg in &f.args {
                parts.push(to_string_inner(arena, links, *arg, reduced, depth)?);
            }
            let body = format!("{}[{}]", chop(&f.name), parts.join(","));
            if reduced {
                return Ok(body);
            }
            match f.parent {
                Some(p) => {
                    let ps = to_string_inner(arena, links, p, reduced, depth)?;
                    Ok(format!("{ps}:{body}"))
                }
                None => Ok(body),
            }
        }
        TypeTermKind::Static(s) => {
            let mut parts = Vec::new();
            for (name, eg) in &s.explicits {
                if name.is_empty() {
                    continue;
                }
                if let Some(term) = eg.term {
                    parts.push(to_string_inner(arena, links, term, reduced, depth)?);
                }
            }
            if parts.is_empty() {
                Ok(s.expr.printed_form())
            } else {
                Ok(format!("{}[{}]", s.expr.printed_form(), parts.join(",")))
            }
        }
        TypeTermKind::Partial(p) => {
            let view = partial_class_view(p);
            to_string_class_like(arena, links, &view, reduced, depth)
        }
    }
}

fn to_string_class_like(
    arena: &TypeArena,
    links: &LinkTable,
    c: &ClassData,
    reduced: bool,
    depth: &mut DepthCounter,
) -> Result<String, UnifyMismatch> {
    let mut parts = Vec::new();
    for (name, eg) in &c.explicits {
        if name.is_empty() {
            continue;
        }
        if let Some(term) = eg.term {
            parts.push(to_string_inner(arena, links, term, reduced, depth)?);
        }
    }
    let body = if parts.is_empty() {
        chop(&c.name).to_string()
    } else {
        format!("{}[{}]", chop(&c.name), parts.join(","))
    };
    if reduced {
        return Ok(body);
    }
    match c.parent {
        Some(p) => {
            let ps = to_string_inner(arena, links, p, reduced, depth)?;
            Ok(format!("{ps}:{body}"))
        }
        None => Ok(body),
    }
}

/// Canonical monomorphization key. `None` if any reachable `Link` is not
/// yet `Link`, or any `Static`'s evaluator is not ready.
pub fn realize_string(
    arena: &TypeArena,
    links: &LinkTable,
    eval: &dyn StaticEvaluator,
    t: TypeTermId,
) -> Result<Option<String>, UnifyMismatch> {
    let mut depth = DepthCounter::with_profile(RecursionProfile::Print);
    realize_string_inner(arena, links, eval, t, &mut depth)
}

fn realize_string_inner(
    arena: &TypeArena,
    links: &LinkTable,
    eval: &dyn StaticEvaluator,
    t: TypeTermId,
    depth: &mut DepthCounter,
) -> Result<Option<String>, UnifyMismatch> {
    if !depth.enter() {
        return Err(UnifyMismatch::DepthExceeded);
    }
    let result = realize_string_step(arena, links, eval, t, depth);
    depth.leave();
    result
}

fn realize_string_step(
    arena: &TypeArena,
    links: &LinkTable,
    eval: &dyn StaticEvaluator,
    t: TypeTermId,
    depth: &mut DepthCounter,
) -> Result<Option<String>, UnifyMismatch> {
    let t = follow(arena, links, t);
    match arena.get(t) {
        TypeTermKind::Var(_) => Ok(None),
        TypeTermKind::Class(c) => realize_class_like(arena, links, eval, c, depth),
        TypeTermKind::Function(f) => {
            let mut parts = Vec::with_capacity(f.args.len().saturating_sub(1));
            for arg in f.args.iter().skip(1) {
                match realize_string_inner(arena, links, eval, *arg, depth)? {
                    Some(s) => parts.push(s),
                    None => return Ok(None),
                }
            }
            let body = format!("{}[{}]", chop(&f.name), parts.join(","));
            if f.ignore_parent_generics {
                return Ok(Some(body));
            }
            match f.parent {
                Some(p) => match realize_string_inner(arena, links, eval, p, depth)? {
                    Some(ps) => Ok(Some(format!("{ps}:{body}"))),
                    None => Ok(None),
                },
                None => Ok(Some(body)),
            }
        }
        TypeTermKind::Static(_) => Ok(realize_static_inner(arena, links, eval, t, depth)?.map(|(s, _)| s)),
        TypeTermKind::Partial(p) => {
            let view = partial_class_view(p);
            realize_class_like(arena, links, eval, &view, depth)
        }
    }
}

fn realize_class_like(
    arena: &TypeArena,
    links: &LinkTable,
    eval: &dyn StaticEvaluator,
    c: &ClassData,
    depth: &mut DepthCounter,
) -> Result<Option<String>, UnifyMismatch> {
    let mut parts = Vec::new();
    for (name, eg) in &c.explicits {
        if name.is_empty() {
            continue;
        }
        let Some(term) = eg.term else { continue };
        match realize_string_inner(arena, links, eval, term, depth)? {
            Some(s) => parts.push(s),
            None => return Ok(None),
        }
    }
    let body = if parts.is_empty() {
        chop(&c.name).to_string()
    } else {
        format!("{}[{}]", chop(&c.name), parts.join(","))
    };
    match c.parent {
        Some(p) => match realize_string_inner(arena, links, eval, p, depth)? {
            Some(ps) => Ok(Some(format!("{ps}:{body}"))),
            None => Ok(None),
        },
        None => Ok(Some(body)),
    }
}

/// Reduce a `Static` term to its `(printed STATIC_KEY, integer value)`
/// pair: each named explicit contributes `<its own STATIC_KEY>;` as a
/// prefix, followed by this term's own evaluated integer. A binding
/// that is not itself realizable yet yields `None` for the whole term.
fn realize_static_inner(
    arena: &TypeArena,
    links: &LinkTable,
    eval: &dyn StaticEvaluator,
    t: TypeTermId,
    depth: &mut DepthCounter,
) -> Result<Option<(String, i64)>, UnifyMismatch> {
    if !depth.enter() {
        return Err(UnifyMismatch::DepthExceeded);
    }
    let result = realize_static_step(arena, links, eval, t, depth);
    depth.leave();
    result
}

fn realize_static_step(
    arena: &TypeArena,
    links: &LinkTable,
    eval: &dyn StaticEvaluator,
    t: TypeTermId,
    depth: &mut DepthCounter,
) -> Result<Option<(String, i64)>, UnifyMismatch> {
    let t = follow(arena, links, t);
    let s = match arena.get(t).as_static() {
        Some(s) => s,
        None => return Ok(None),
    };

    let mut prefix = String::new();
    let mut bindings = FxHashMap::default();
    for (name, eg) in &s.explicits {
        let Some(bound) = eg.term else { return Ok(None) };
        match realize_static_inner(arena, links, eval, bound, depth)? {
            Some((text, value)) => {
                prefix.push_str(&text);
                prefix.push(';');
                bindings.insert(name.clone(), value);
            }
            None => return Ok(None),
        }
    }

    match eval.eval(&s.expr, &bindings) {
        crate::static_eval::EvalOutcome::Ready(value) => {
            prefix.push_str(&value.to_string());
            Ok(Some((prefix, value)))
        }
        crate::static_eval::EvalOutcome::NotReady => Ok(None),
    }
}

#[cfg(test)]
#[path = "tests/predicates.rs"]
mod tests;

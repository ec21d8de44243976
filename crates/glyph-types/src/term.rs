//! The tagged variant of type shapes that participate in unification.

use fixedbitset::FixedBitSet;
use glyph_common::SourceLocation;
use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::ids::{TypeTermId, TypeVarId};
use crate::static_eval::ExprHandle;

/// Inline capacity for `Class`/`Function` argument lists; see
/// `glyph_common::limits::TYPE_ARGS_INLINE`.
pub(crate) const TYPE_ARGS_INLINE: usize = glyph_common::limits::TYPE_ARGS_INLINE;

/// A nominal class's or function's explicit generic parameter.
///
/// `id` is the parameter's own declared identity, independent of
/// whatever `TypeTermId` (wrapping a `Var`) `term` currently points at —
/// see `crate::generalize::instantiate`'s cache, which is keyed by this
/// field rather than by the link id reachable through `term`. `term` is
/// `None` for a generic slot that has been declared but not yet bound to
/// a concrete Link, mirroring the `t.type ? … : nullptr` guard the
/// original unifier applies throughout.
#[derive(Clone, Debug)]
pub struct ExplicitGeneric {
    pub term: Option<TypeTermId>,
    pub id: u32,
}

impl ExplicitGeneric {
    pub fn new(term: TypeTermId, id: u32) -> Self {
        ExplicitGeneric {
            term: Some(term),
            id,
        }
    }
}

/// Ordered, name-addressable list of explicit generics.
///
/// `indexmap` keeps insertion order (so positional pairwise unification
/// between two classes' explicits is just "zip the two maps' values")
/// while still making name lookups and printing cheap.
pub type Explicits = IndexMap<String, ExplicitGeneric>;

/// A nominal composite: a record (structural identity) or a plain
/// nominal class (name + fields identity).
#[derive(Clone, Debug)]
pub struct ClassData {
    pub name: String,
    pub is_record: bool,
    pub args: SmallVec<[TypeTermId; TYPE_ARGS_INLINE]>,
    pub explicits: Explicits,
    pub parent: Option<TypeTermId>,
    pub location: SourceLocation,
}

/// A function type: like `Class` but distinguishes a self/return
/// position (`args[0]` by convention) and carries a backing `func_class`
/// used purely as a stable source of per-parameter generic ids (see
/// [`crate::unify::class_view`]).
#[derive(Clone, Debug)]
pub struct FunctionData {
    pub name: String,
    pub func_class: TypeTermId,
    pub args: SmallVec<[TypeTermId; TYPE_ARGS_INLINE]>,
    pub explicits: Explicits,
    pub parent: Option<TypeTermId>,
    pub ignore_parent_generics: bool,
    pub location: SourceLocation,
}

/// A compile-time-integer type: an expression over a set of named,
/// explicitly bound generics, realized by handing both to the external
/// [`crate::static_eval::StaticEvaluator`].
#[derive(Clone, Debug)]
pub struct StaticData {
    pub explicits: Explicits,
    pub expr: ExprHandle,
    pub location: SourceLocation,
}

/// Sentinel id used for a `Partial`'s sole explicit generic (the wrapped
/// function class), matching the original's `Generic("T", c, -1)`.
pub const PARTIAL_WRAPPED_ID: u32 = u32::MAX;

/// A partially-applied function: a `Class` specialization whose name is
/// deterministically `partial.<bitstring>` and whose single explicit
/// generic is the wrapped function's `Class`.
#[derive(Clone, Debug)]
pub struct PartialData {
    pub wrapped: TypeTermId,
    pub known_types: FixedBitSet,
    pub location: SourceLocation,
}

impl PartialData {
    /// `partial.<bitstring>`, one character per formal parameter (`1` if
    /// already supplied), matching the original's `v2b` helper.
    pub fn name(&self) -> String {
        format!("partial.{}", bitset_to_bitstring(&self.known_types))
    }
}

/// Render a `FixedBitSet` as a dense `0`/`1` string, one character per
/// bit in index order (the original's `v2b`).
pub fn bitset_to_bitstring(bits: &FixedBitSet) -> String {
    let mut s = String::with_capacity(bits.len());
    for i in 0..bits.len() {
        s.push(if bits[i] { '1' } else { '0' });
    }
    s
}

/// The tagged variant of type shapes. Every `TypeTerm` is exactly one of
/// these five; `Var` is the union-find cell, the rest are composites.
#[derive(Clone, Debug)]
pub enum TypeTermKind {
    /// Indirection into the `LinkTable`: `Unbound`, `Generic`, or `Link`.
    Var(TypeVarId),
    Class(ClassData),
    Function(FunctionData),
    Static(StaticData),
    Partial(PartialData),
}

impl TypeTermKind {
    pub fn as_class(&self) -> Option<&ClassData> {
        match self {
            TypeTermKind::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionData> {
        match self {
            TypeTermKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_static(&self) -> Option<&StaticData> {
        match self {
            TypeTermKind::Static(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_partial(&self) -> Option<&PartialData> {
        match self {
            TypeTermKind::Partial(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<TypeVarId> {
        match self {
            TypeTermKind::Var(v) => Some(*v),
            _ => None,
        }
    }
}

/// Strip the trailing `.N` suffix the source attaches to disambiguate
/// multiply-declared nominal types, matching the original's `chop`.
pub fn chop(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if name[dot + 1..].bytes().all(|b| b.is_ascii_digit()) && dot + 1 < name.len() => {
            &name[..dot]
        }
        _ => name,
    }
}

/// True if `name` (after chopping) names a tuple (an anonymous record).
pub fn is_tuple(name: &str) -> bool {
    chop(name).starts_with("tuple.")
}

/// True if `name` (after chopping) names a plain function class.
pub fn is_func(name: &str) -> bool {
    chop(name).starts_with("function.")
}

/// True if `name` (after chopping) names anything callable: a function
/// or a partial application of one.
pub fn is_callable(name: &str) -> bool {
    is_func(name) || chop(name).starts_with("partial.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chop_strips_trailing_numeric_suffix() {
        assert_eq!(chop("Foo.3"), "Foo");
        assert_eq!(chop("Foo"), "Foo");
        assert_eq!(chop("Foo.bar"), "Foo.bar");
        assert_eq!(chop("tuple.2"), "tuple");
    }

    #[test]
    fn name_predicates() {
        // Raw names carry an arity segment plus a trailing disambiguator
        // (`tuple.<arity>.<n>`); `chop` only strips the disambiguator.
        assert!(is_tuple("tuple.2.0"));
        assert!(!is_tuple("List.0"));
        assert!(is_func("function.1.0"));
        assert!(is_callable("function.1.0"));
        assert!(is_callable("partial.101"));
        assert!(!is_callable("List.0"));
    }

    #[test]
    fn bitstring_matches_bit_order() {
        let mut bits = FixedBitSet::with_capacity(3);
        bits.set(0, true);
        bits.set(2, true);
        assert_eq!(bitset_to_bitstring(&bits), "101");
    }
}

use std::{
    collections::HashSet,
    hash::{Hash, Hasher},
    ptr,
    rc::Rc,
};

use crate::{Chain, ObjectRef, Value};

/// A test over chains, usually composed into a visitor with
/// [`Filtered`](crate::Filtered).
///
/// Predicates may keep state, so `apply` takes `&mut self`. Any
/// `FnMut(&Chain) -> bool` closure is a predicate.
pub trait ChainPredicate {
    fn apply(&mut self, chain: &Chain) -> bool;

    /// Both predicates must hold. `other` is not consulted when `self`
    /// already rejected the chain.
    fn and<P>(self, other: P) -> And<Self, P>
    where
        Self: Sized,
        P: ChainPredicate,
    {
        And(self, other)
    }

    fn not(self) -> Not<Self>
    where
        Self: Sized,
    {
        Not(self)
    }
}

impl<F> ChainPredicate for F
where
    F: FnMut(&Chain) -> bool,
{
    #[inline]
    fn apply(&mut self, chain: &Chain) -> bool {
        self(chain)
    }
}

pub struct And<A, B>(A, B);

impl<A: ChainPredicate, B: ChainPredicate> ChainPredicate for And<A, B> {
    #[inline]
    fn apply(&mut self, chain: &Chain) -> bool {
        self.0.apply(chain) && self.1.apply(chain)
    }
}

pub struct Not<P>(P);

impl<P: ChainPredicate> ChainPredicate for Not<P> {
    #[inline]
    fn apply(&mut self, chain: &Chain) -> bool {
        !self.0.apply(chain)
    }
}

// keyed by storage address, never by value equality. Holding the Rc keeps
// the address from being reused while it is remembered.
struct Identity(ObjectRef);

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as *const ()).hash(state);
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl Eq for Identity {}

/// Permits each object the first time it is seen and rejects it after.
///
/// Type descriptors are shared singletons and always pass, as do null and
/// scalars, which have no identity. A guard that outlives one exploration
/// keeps rejecting what it saw there, which dedupes across several roots.
#[derive(Default)]
pub struct AtMostOnce {
    seen: HashSet<Identity, ahash::RandomState>,
}

impl AtMostOnce {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_seen(&self, value: &Value) -> bool {
        match value {
            Value::Object(object) => {
                self.seen.contains(&Identity(Rc::clone(object)))
            }
            _ => false,
        }
    }

    /// Number of distinct objects seen so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }
}

impl ChainPredicate for AtMostOnce {
    fn apply(&mut self, chain: &Chain) -> bool {
        match chain.value() {
            Value::Object(object) => {
                self.seen.insert(Identity(Rc::clone(object)))
            }
            _ => true,
        }
    }
}

/// Rejects chains declared with an enum type and chains holding a type
/// descriptor. Both are process-wide constants.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotEnumOrType;

impl ChainPredicate for NotEnumOrType {
    #[inline]
    fn apply(&mut self, chain: &Chain) -> bool {
        !(chain.value_type().is_enum() || chain.value().is_type())
    }
}

#[inline]
pub fn chain_to_value(chain: &Chain) -> Value {
    chain.value().clone()
}

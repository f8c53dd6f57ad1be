use crate::{Chain, ChainPredicate};

/// What the explorer should do with a visited chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Expand the value's members or elements.
    Explore,
    /// Leave the value's children unvisited.
    Skip,
}

impl From<bool> for Traversal {
    fn from(explore: bool) -> Self {
        if explore {
            Traversal::Explore
        } else {
            Traversal::Skip
        }
    }
}

/// Drives an exploration and builds its result.
///
/// `visit` is called once for every chain the explorer presents: every
/// expandable value reached, plus terminal values when the matching
/// [`Features`](crate::Features) flag is set. The answer only matters for
/// expandable values. `result` is called once, after the last visit.
pub trait ObjectVisitor {
    type Output;

    fn visit(&mut self, chain: &Chain) -> Traversal;

    fn result(&mut self) -> Self::Output;
}

impl<V: ObjectVisitor + ?Sized> ObjectVisitor for &mut V {
    type Output = V::Output;

    #[inline]
    fn visit(&mut self, chain: &Chain) -> Traversal {
        (**self).visit(chain)
    }

    #[inline]
    fn result(&mut self) -> Self::Output {
        (**self).result()
    }
}

/// Skips every chain the predicate rejects without telling the inner
/// visitor about it.
pub struct Filtered<P, V> {
    predicate: P,
    inner: V,
}

impl<P, V> Filtered<P, V> {
    pub fn new(predicate: P, inner: V) -> Self {
        Self { predicate, inner }
    }

    pub fn predicate(&self) -> &P {
        &self.predicate
    }

    pub fn inner(&self) -> &V {
        &self.inner
    }

    pub fn into_inner(self) -> V {
        self.inner
    }
}

impl<P: ChainPredicate, V: ObjectVisitor> ObjectVisitor for Filtered<P, V> {
    type Output = V::Output;

    fn visit(&mut self, chain: &Chain) -> Traversal {
        if self.predicate.apply(chain) {
            self.inner.visit(chain)
        } else {
            Traversal::Skip
        }
    }

    fn result(&mut self) -> Self::Output {
        self.inner.result()
    }
}

pub struct FnVisitor<F>(F);

/// A visitor made of a closure, with no result.
pub fn from_fn<F>(visit: F) -> FnVisitor<F>
where
    F: FnMut(&Chain) -> Traversal,
{
    FnVisitor(visit)
}

impl<F> ObjectVisitor for FnVisitor<F>
where
    F: FnMut(&Chain) -> Traversal,
{
    type Output = ();

    #[inline]
    fn visit(&mut self, chain: &Chain) -> Traversal {
        (self.0)(chain)
    }

    fn result(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    struct Counter(usize);

    impl ObjectVisitor for Counter {
        type Output = usize;

        fn visit(&mut self, _chain: &Chain) -> Traversal {
            self.0 += 1;
            Traversal::Explore
        }

        fn result(&mut self) -> usize {
            self.0
        }
    }

    #[test]
    fn traversal_from_bool() {
        assert_eq!(Traversal::from(true), Traversal::Explore);
        assert_eq!(Traversal::from(false), Traversal::Skip);
    }

    #[test]
    fn filtered_hides_rejected_chains_from_the_inner_visitor() {
        let mut visitor = Filtered::new(
            |chain: &Chain| chain.value() != &Value::I32(0),
            Counter(0),
        );

        assert_eq!(visitor.visit(&Chain::root(Value::I32(0))), Traversal::Skip);
        assert_eq!(
            visitor.visit(&Chain::root(Value::I32(1))),
            Traversal::Explore
        );
        assert_eq!(visitor.result(), 1);
        assert_eq!(visitor.into_inner().0, 1);
    }

    #[test]
    fn mutable_references_are_visitors() {
        let mut counter = Counter(0);
        {
            let mut by_ref = &mut counter;
            by_ref.visit(&Chain::root(Value::Null));
            assert_eq!(by_ref.result(), 1);
        }
        assert_eq!(counter.0, 1);
    }

    #[test]
    fn closure_visitor() {
        let mut seen = Vec::new();
        let mut visitor = from_fn(|chain| {
            seen.push(chain.to_string());
            Traversal::Skip
        });
        assert_eq!(visitor.visit(&Chain::root(Value::I32(7))), Traversal::Skip);
        visitor.result();
        assert_eq!(seen, ["7"]);
    }
}

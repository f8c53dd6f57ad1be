use log::{debug, trace, warn};

use crate::{
    AccessError, Chain, Error, Features, ObjectVisitor, Reflect, Result,
    Traversal, Value,
};

/// Configuration of an [`Explorer`].
#[derive(Debug, Clone, Copy)]
pub struct ExplorerCreateInfo {
    pub features: Features,
    /// Chains the work list holds before it first reallocates.
    pub work_list_capacity: usize,
}

impl Default for ExplorerCreateInfo {
    fn default() -> Self {
        Self {
            features: Features::empty(),
            work_list_capacity: 64,
        }
    }
}

/// LIFO of chains waiting to be visited.
///
/// Only expandable chains enter it: their value is neither null nor a
/// primitive.
pub struct WorkList {
    chains: Vec<Chain>,
    high_water: usize,
}

impl WorkList {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chains: Vec::with_capacity(capacity),
            high_water: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    #[inline]
    pub fn push(&mut self, chain: Chain) {
        self.chains.push(chain);
        self.high_water = self.high_water.max(self.chains.len());
    }

    #[inline]
    pub fn pop(&mut self) -> Option<Chain> {
        self.chains.pop()
    }

    /// Largest length reached since the last clear.
    #[inline]
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    pub fn clear(&mut self) {
        self.chains.clear();
        self.high_water = 0;
    }
}

impl Default for WorkList {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

/// Counters of the last exploration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExploreStats {
    /// Calls to `visit`, terminal chains included.
    pub visited: usize,
    /// Chains the visitor answered `Explore` for.
    pub expanded: usize,
    /// Longest the work list got.
    pub max_pending: usize,
}

/// Depth-first walker over everything reachable from a root value.
///
/// The walk keeps its own work list instead of recursing, so graph depth is
/// not limited by the call stack. One explorer runs one exploration at a
/// time and can be reused; it keeps the work list allocation between calls.
///
/// Children are ordered as follows. Array elements are read from the last
/// index to the first: terminal elements are visited right away, so they
/// arrive in descending order, while expandable ones are pushed and so come
/// off the work list in ascending order. Members are read in
/// [`instance_fields`](crate::TypeInfo::instance_fields) order: terminal
/// members are visited in that order, expandable ones are pushed and come
/// off in reverse. Visitors rely on this asymmetry.
pub struct Explorer {
    features: Features,
    work_list: WorkList,
    stats: ExploreStats,
}

impl Explorer {
    pub fn new(info: &ExplorerCreateInfo) -> Self {
        Self {
            features: info.features,
            work_list: WorkList::with_capacity(info.work_list_capacity),
            stats: ExploreStats::default(),
        }
    }

    #[inline]
    pub fn features(&self) -> Features {
        self.features
    }

    #[inline]
    pub fn stats(&self) -> ExploreStats {
        self.stats
    }

    /// Walks the graph under `root`, then returns the visitor's result.
    ///
    /// A null root visits nothing. A member that cannot be read aborts the
    /// walk with [`Error::Access`] and `result` is not called.
    pub fn explore<V>(
        &mut self,
        root: impl Into<Value>,
        visitor: &mut V,
    ) -> Result<V::Output>
    where
        V: ObjectVisitor + ?Sized,
    {
        self.work_list.clear();
        self.stats = ExploreStats::default();

        let root = root.into();
        if !root.is_null() {
            self.work_list.push(Chain::root(root));
        }

        let outcome = self.drain(visitor);
        self.stats.max_pending = self.work_list.high_water();
        if let Err(err) = outcome {
            self.work_list.clear();
            return Err(err);
        }

        debug!(
            "exploration done: {} visited, {} expanded, {} max pending",
            self.stats.visited, self.stats.expanded, self.stats.max_pending
        );
        Ok(visitor.result())
    }

    fn drain<V>(&mut self, visitor: &mut V) -> Result<()>
    where
        V: ObjectVisitor + ?Sized,
    {
        while let Some(chain) = self.work_list.pop() {
            if self.visit(visitor, &chain) == Traversal::Skip {
                continue;
            }
            self.stats.expanded += 1;

            // only objects and type descriptors have anything inside
            let Some(object) = chain.value().as_reflect() else {
                continue;
            };
            if object.type_info().is_array() {
                self.expand_elements(&chain, object, visitor)?;
            } else {
                self.expand_members(&chain, object, visitor)?;
            }
        }
        Ok(())
    }

    #[inline]
    fn visit<V>(&mut self, visitor: &mut V, chain: &Chain) -> Traversal
    where
        V: ObjectVisitor + ?Sized,
    {
        self.stats.visited += 1;
        trace!("visit {chain}");
        visitor.visit(chain)
    }

    /// Terminal chains are shown to the visitor but never expanded, so the
    /// verdict is dropped.
    #[inline]
    fn report<V>(&mut self, visitor: &mut V, chain: Chain)
    where
        V: ObjectVisitor + ?Sized,
    {
        let _ = self.visit(visitor, &chain);
    }

    #[inline]
    fn push(&mut self, chain: Chain) {
        trace!("push {chain}");
        self.work_list.push(chain);
    }

    fn expand_elements<V>(
        &mut self,
        chain: &Chain,
        array: &dyn Reflect,
        visitor: &mut V,
    ) -> Result<()>
    where
        V: ObjectVisitor + ?Sized,
    {
        let primitive = array
            .type_info()
            .component_type()
            .is_some_and(|component| component.is_primitive());
        let visit_primitives =
            self.features.contains(Features::VISIT_PRIMITIVES);
        let visit_null = self.features.contains(Features::VISIT_NULL);

        for index in (0..array.array_len()).rev() {
            if primitive && !visit_primitives {
                continue;
            }
            let element = array.read_element(index).map_err(|source| {
                access_failed(format!("{chain}->[{index}]"), source)
            })?;
            let child = chain.append_array_index(index, element);

            if primitive {
                self.report(visitor, child);
            } else if child.value().is_null() {
                if visit_null {
                    self.report(visitor, child);
                }
            } else {
                self.push(child);
            }
        }
        Ok(())
    }

    fn expand_members<V>(
        &mut self,
        chain: &Chain,
        object: &dyn Reflect,
        visitor: &mut V,
    ) -> Result<()>
    where
        V: ObjectVisitor + ?Sized,
    {
        for member in object.type_info().instance_fields() {
            let field = member.field();
            let value = object.read_field(member).map_err(|source| {
                access_failed(format!("{chain}->{}", field.name()), source)
            })?;

            if value.is_null() {
                if self.features.contains(Features::VISIT_NULL) {
                    self.report(visitor, chain.append_field(field, value));
                }
            } else if field.ty().is_primitive() {
                if self.features.contains(Features::VISIT_PRIMITIVES) {
                    self.report(visitor, chain.append_field(field, value));
                }
            } else {
                self.push(chain.append_field(field, value));
            }
        }
        Ok(())
    }
}

impl Default for Explorer {
    fn default() -> Self {
        Self::new(&ExplorerCreateInfo::default())
    }
}

fn access_failed(path: String, source: AccessError) -> Error {
    warn!("cannot read {path}: {source}");
    Error::Access { path, source }
}

/// Explores `root` without reporting terminal values.
pub fn explore<V>(root: impl Into<Value>, visitor: &mut V) -> Result<V::Output>
where
    V: ObjectVisitor + ?Sized,
{
    explore_object(root, visitor, Features::empty())
}

pub fn explore_object<V>(
    root: impl Into<Value>,
    visitor: &mut V,
    features: Features,
) -> Result<V::Output>
where
    V: ObjectVisitor + ?Sized,
{
    Explorer::new(&ExplorerCreateInfo {
        features,
        ..Default::default()
    })
    .explore(root, visitor)
}

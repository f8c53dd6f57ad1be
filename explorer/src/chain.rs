use std::{fmt, iter, rc::Rc};

use crate::{Error, FieldInfo, OBJECT, Result, TypeRef, Value};

/// How a chain was reached from its parent.
#[derive(Debug, Clone, Copy)]
pub enum Edge {
    Root,
    Field(&'static FieldInfo),
    ArrayIndex(usize),
}

struct Link {
    parent: Option<Chain>,
    edge: Edge,
    value: Value,
    value_type: TypeRef,
}

// unlink iteratively so dropping a long path never recurses once per link
impl Drop for Link {
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(Chain(link)) = parent {
            parent = match Rc::try_unwrap(link) {
                Ok(mut link) => link.parent.take(),
                Err(_) => None,
            };
        }
    }
}

/// An immutable path from the root of an exploration to one reachable
/// value.
///
/// Clones share the same link; appending creates a child that keeps its
/// parent alive.
#[derive(Clone)]
pub struct Chain(Rc<Link>);

impl Chain {
    /// A chain of one element. Its value type is the runtime type of
    /// `value`.
    pub fn root(value: Value) -> Chain {
        let value_type = value.runtime_type();
        Chain(Rc::new(Link {
            parent: None,
            edge: Edge::Root,
            value,
            value_type,
        }))
    }

    #[inline]
    pub fn has_parent(&self) -> bool {
        self.0.parent.is_some()
    }

    pub fn parent(&self) -> Result<&Chain> {
        self.0.parent.as_ref().ok_or(Error::RootHasNoParent)
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.0.value
    }

    /// The declared type of the edge that produced this value: the field
    /// type, or the component type of the array. For the root, its runtime
    /// type.
    #[inline]
    pub fn value_type(&self) -> TypeRef {
        self.0.value_type
    }

    #[inline]
    pub fn edge(&self) -> Edge {
        self.0.edge
    }

    /// The value at the start of the path.
    pub fn root_value(&self) -> &Value {
        let mut chain = self;
        while let Some(parent) = &chain.0.parent {
            chain = parent;
        }
        chain.value()
    }

    #[inline]
    pub fn is_primitive(&self) -> bool {
        self.0.value_type.is_primitive()
    }

    #[inline]
    pub fn is_through_field(&self) -> bool {
        matches!(self.0.edge, Edge::Field(_))
    }

    #[inline]
    pub fn is_through_array_index(&self) -> bool {
        matches!(self.0.edge, Edge::ArrayIndex(_))
    }

    pub fn field(&self) -> Option<&'static FieldInfo> {
        match self.0.edge {
            Edge::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn array_index(&self) -> Option<usize> {
        match self.0.edge {
            Edge::ArrayIndex(index) => Some(index),
            _ => None,
        }
    }

    pub fn append_field(
        &self,
        field: &'static FieldInfo,
        value: Value,
    ) -> Chain {
        self.append(Edge::Field(field), field.ty(), value)
    }

    /// The element type is the component type of this chain's value, which
    /// must be an array.
    pub fn append_array_index(&self, index: usize, value: Value) -> Chain {
        let component = self
            .value()
            .runtime_type()
            .component_type()
            .unwrap_or(&OBJECT);
        self.append(Edge::ArrayIndex(index), component, value)
    }

    fn append(&self, edge: Edge, value_type: TypeRef, value: Value) -> Chain {
        Chain(Rc::new(Link {
            parent: Some(self.clone()),
            edge,
            value,
            value_type,
        }))
    }

    /// This chain followed by its parent, grandparent and so on up to the
    /// root.
    pub fn ancestors(&self) -> impl Iterator<Item = &Chain> {
        iter::successors(Some(self), |chain| chain.0.parent.as_ref())
    }

    /// Number of edges between the root and this chain.
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut path: Vec<&Chain> = self.ancestors().collect();
        path.reverse();

        for chain in path {
            match chain.edge() {
                Edge::Root => write!(f, "{}", chain.0.value)?,
                Edge::Field(field) => write!(f, "->{}", field.name())?,
                Edge::ArrayIndex(index) => write!(f, "->[{index}]")?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("path", &format_args!("{self}"))
            .field("value", &self.0.value)
            .field("value_type", &self.0.value_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ArrayObject, FieldInfo, I32, Instance, OBJECT_ARRAY, TypeInfo,
    };

    static DUMMY_FIELDS: [FieldInfo; 3] = [
        FieldInfo::new("dummy1", &OBJECT),
        FieldInfo::new("dummy2", &OBJECT_ARRAY),
        FieldInfo::new("dummyint", &I32),
    ];
    static DUMMY: TypeInfo = TypeInfo::class("Dummy", &OBJECT, &DUMMY_FIELDS);

    fn dummy1() -> &'static FieldInfo {
        &DUMMY_FIELDS[0]
    }

    fn dummy2() -> &'static FieldInfo {
        &DUMMY_FIELDS[1]
    }

    fn dummyint() -> &'static FieldInfo {
        &DUMMY_FIELDS[2]
    }

    fn object() -> Value {
        Value::from(Instance::new(&OBJECT).expect("class"))
    }

    fn object_array(len: usize) -> Value {
        Value::from(ArrayObject::new(&OBJECT_ARRAY, len).expect("array"))
    }

    #[test]
    fn root() {
        let root = object();
        let chain = Chain::root(root.clone());

        assert!(!chain.has_parent());
        assert_eq!(chain.parent().map(|_| ()), Err(Error::RootHasNoParent));
        assert_eq!(chain.root_value(), &root);
        assert_eq!(chain.value(), &root);
        assert_eq!(chain.value_type(), &OBJECT);
        assert!(!chain.is_primitive());
        assert!(!chain.is_through_array_index());
        assert!(!chain.is_through_field());
        assert_eq!(chain.depth(), 0);
        assert_eq!(chain.to_string(), root.to_string());
    }

    #[test]
    fn root_of_a_declared_type_reports_its_runtime_type() {
        let root = Value::from(Instance::new(&DUMMY).expect("class"));
        assert_eq!(Chain::root(root).value_type(), &DUMMY);
    }

    #[test]
    fn one_field() {
        let root = object();
        let link1 = object();
        let chain =
            Chain::root(root.clone()).append_field(dummy1(), link1.clone());

        assert!(chain.has_parent());
        assert_eq!(chain.parent().expect("has parent").value(), &root);
        assert_eq!(chain.root_value(), &root);
        assert_eq!(chain.value(), &link1);
        assert_eq!(chain.value_type(), &OBJECT);
        assert!(!chain.is_primitive());
        assert!(!chain.is_through_array_index());
        assert!(chain.is_through_field());
        assert_eq!(chain.field().map(FieldInfo::name), Some("dummy1"));
        assert_eq!(chain.to_string(), format!("{root}->dummy1"));
    }

    #[test]
    fn two_fields() {
        let root = object();
        let link1 = object();
        let link2 = object_array(0);
        let chain = Chain::root(root.clone())
            .append_field(dummy1(), link1.clone())
            .append_field(dummy2(), link2.clone());

        assert_eq!(chain.parent().expect("has parent").value(), &link1);
        assert_eq!(chain.root_value(), &root);
        assert_eq!(chain.value(), &link2);
        assert_eq!(chain.value_type(), &OBJECT_ARRAY);
        assert!(chain.is_through_field());
        assert_eq!(chain.depth(), 2);
        assert_eq!(chain.to_string(), format!("{root}->dummy1->dummy2"));
    }

    #[test]
    fn array_index_0() {
        let root = object_array(1);
        let value0 = object();
        let chain =
            Chain::root(root.clone()).append_array_index(0, value0.clone());

        assert_eq!(chain.parent().expect("has parent").value(), &root);
        assert_eq!(chain.root_value(), &root);
        assert_eq!(chain.value(), &value0);
        assert_eq!(chain.value_type(), &OBJECT);
        assert!(!chain.is_primitive());
        assert!(chain.is_through_array_index());
        assert!(!chain.is_through_field());
        assert_eq!(chain.array_index(), Some(0));
        assert_eq!(chain.to_string(), format!("{root}->[0]"));
    }

    #[test]
    fn nested_array_indices() {
        let root = object_array(1);
        let value0 = object_array(2);
        let value01 = object();
        let chain = Chain::root(root.clone())
            .append_array_index(0, value0.clone())
            .append_array_index(1, value01.clone());

        assert_eq!(chain.parent().expect("has parent").value(), &value0);
        assert_eq!(chain.root_value(), &root);
        assert_eq!(chain.value(), &value01);
        assert_eq!(chain.value_type(), &OBJECT);
        assert_eq!(chain.to_string(), format!("{root}->[0]->[1]"));
    }

    #[test]
    fn array_reached_through_a_field_uses_its_runtime_component() {
        let root = object();
        let link1 = Value::from(
            ArrayObject::new(&crate::U8_ARRAY, 1).expect("array"),
        );
        let chain = Chain::root(root.clone())
            .append_field(dummy1(), link1.clone())
            .append_array_index(0, Value::U8(0));

        assert_eq!(chain.parent().expect("has parent").value(), &link1);
        assert_eq!(chain.value_type(), &crate::U8);
        assert!(chain.is_primitive());
        assert_eq!(chain.to_string(), format!("{root}->dummy1->[0]"));
    }

    #[test]
    fn field_then_index_then_field() {
        let root = object();
        let chain = Chain::root(root.clone())
            .append_field(dummy1(), object_array(3))
            .append_array_index(2, object())
            .append_field(dummy2(), object_array(0));

        assert_eq!(chain.to_string(), format!("{root}->dummy1->[2]->dummy2"));
        assert_eq!(chain.ancestors().count(), 4);
    }

    #[test]
    fn primitive_field() {
        let root = object();
        let chain = Chain::root(root.clone())
            .append_field(dummyint(), Value::I32(42));

        assert_eq!(chain.parent().expect("has parent").value(), &root);
        assert_eq!(chain.value(), &Value::I32(42));
        assert_eq!(chain.value_type(), &I32);
        assert!(chain.is_primitive());
        assert!(chain.is_through_field());
        assert_eq!(chain.to_string(), format!("{root}->dummyint"));
    }

    #[test]
    fn null_field() {
        let root = object();
        let chain = Chain::root(root).append_field(dummy1(), Value::Null);
        assert!(chain.value().is_null());
        assert_eq!(chain.value_type(), &OBJECT);
        assert!(!chain.is_primitive());
    }

    #[test]
    fn dropping_a_long_chain_does_not_recurse() {
        let root = object();
        let mut chain = Chain::root(root.clone());
        for index in 0..200_000 {
            chain = chain.append_field(dummy1(), Value::I32(index));
        }
        assert_eq!(chain.depth(), 200_000);
        assert_eq!(chain.root_value(), &root);
        drop(chain);
    }

    #[test]
    fn dropping_a_child_keeps_shared_parents() {
        let root = object();
        let parent = Chain::root(root.clone()).append_field(dummy1(), object());
        let child = parent.append_field(dummy1(), object());
        drop(child);
        assert_eq!(parent.root_value(), &root);
        assert_eq!(parent.depth(), 1);
    }
}

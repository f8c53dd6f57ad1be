use std::{cell::RefCell, fmt, mem, rc::Rc};

use crate::{
    AccessError, Error, Member, PrimitiveKind, Reflect, Result, TypeRef, Value,
};

/// The value a fresh slot of declared type `ty` starts with.
fn default_value(ty: TypeRef) -> Value {
    ty.primitive_kind()
        .map_or(Value::Null, PrimitiveKind::default_value)
}

/// Primitive slots only take a scalar of their own kind; reference slots
/// take anything.
fn check_assignable(
    target: impl FnOnce() -> String,
    declared: TypeRef,
    value: &Value,
) -> Result<()> {
    match declared.primitive_kind() {
        Some(kind) if value.primitive_kind() != Some(kind) => {
            Err(Error::TypeMismatch {
                target: target(),
                expected: declared.name(),
                actual: match value {
                    Value::Null => "null",
                    value => value.runtime_type().name(),
                },
            })
        }
        _ => Ok(()),
    }
}

/// Drops `pending` without recursing once per reference: an object whose
/// last strong reference is in hand gives up its children to the same stack
/// before it goes.
fn release(mut pending: Vec<Value>) {
    while let Some(value) = pending.pop() {
        if let Value::Object(object) = value {
            if Rc::strong_count(&object) == 1 {
                pending.extend(object.take_children());
            }
        }
    }
}

/// Empties `values` unless someone still borrows it, which cannot happen
/// once the owner is unreachable.
fn take_values(values: &RefCell<Vec<Value>>) -> Vec<Value> {
    values
        .try_borrow_mut()
        .map(|mut values| mem::take(&mut *values))
        .unwrap_or_default()
}

/// A record whose layout is given by its class descriptor.
///
/// Slots follow `class.instance_fields()` order. Interior mutability lets
/// callers close cycles after the objects exist.
pub struct Instance {
    class: TypeRef,
    slots: RefCell<Vec<Value>>,
}

impl Instance {
    pub fn new(class: TypeRef) -> Result<Rc<Instance>> {
        if !class.is_class() {
            return Err(Error::NotAClass(class.name()));
        }

        let slots = class
            .instance_fields()
            .map(|member| default_value(member.field().ty()))
            .collect();

        Ok(Rc::new(Instance {
            class,
            slots: RefCell::new(slots),
        }))
    }

    #[inline]
    pub fn class(&self) -> TypeRef {
        self.class
    }

    fn member(&self, name: &str) -> Result<Member> {
        self.class
            .instance_field(name)
            .ok_or_else(|| Error::NoSuchField {
                ty: self.class.name(),
                field: name.to_owned(),
            })
    }

    pub fn get(&self, name: &str) -> Result<Value> {
        let member = self.member(name)?;
        // an object that gave up its children reads as null
        Ok(self
            .slots
            .borrow()
            .get(member.slot())
            .cloned()
            .unwrap_or_default())
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let member = self.member(name)?;
        let value = value.into();
        check_assignable(
            || format!("{}.{}", self.class.name(), name),
            member.field().ty(),
            &value,
        )?;
        if let Some(slot) = self.slots.borrow_mut().get_mut(member.slot()) {
            *slot = value;
        }
        Ok(())
    }
}

impl Reflect for Instance {
    fn type_info(&self) -> TypeRef {
        self.class
    }

    fn read_field(
        &self,
        member: Member,
    ) -> std::result::Result<Value, AccessError> {
        self.slots
            .borrow()
            .get(member.slot())
            .cloned()
            .ok_or(AccessError::UnknownField {
                ty: self.class.name(),
                field: member.field().name(),
            })
    }

    fn take_children(&self) -> Vec<Value> {
        take_values(&self.slots)
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        release(mem::take(self.slots.get_mut()));
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.borrow();
        let mut s = f.debug_struct(self.class.name());
        for member in self.class.instance_fields() {
            let value = slots.get(member.slot()).unwrap_or(&Value::Null);
            s.field(member.field().name(), value);
        }
        s.finish()
    }
}

/// A fixed-length sequence typed by an array descriptor.
pub struct ArrayObject {
    ty: TypeRef,
    elements: RefCell<Vec<Value>>,
}

impl ArrayObject {
    /// An array of `len` default elements.
    pub fn new(ty: TypeRef, len: usize) -> Result<Rc<ArrayObject>> {
        let component =
            ty.component_type().ok_or(Error::NotAnArray(ty.name()))?;
        Ok(Rc::new(ArrayObject {
            ty,
            elements: RefCell::new(vec![default_value(component); len]),
        }))
    }

    pub fn from_values<I>(ty: TypeRef, values: I) -> Result<Rc<ArrayObject>>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let component =
            ty.component_type().ok_or(Error::NotAnArray(ty.name()))?;
        let elements = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| -> Result<Value> {
                let value = value.into();
                check_assignable(
                    || format!("{}[{}]", ty.name(), index),
                    component,
                    &value,
                )?;
                Ok(value)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Rc::new(ArrayObject {
            ty,
            elements: RefCell::new(elements),
        }))
    }

    #[inline]
    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.elements.borrow().get(index).cloned()
    }

    pub fn set(&self, index: usize, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let len = self.len();
        if index >= len {
            return Err(Error::IndexOutOfBounds { index, len });
        }
        if let Some(component) = self.ty.component_type() {
            check_assignable(
                || format!("{}[{}]", self.ty.name(), index),
                component,
                &value,
            )?;
        }
        if let Some(element) = self.elements.borrow_mut().get_mut(index) {
            *element = value;
        }
        Ok(())
    }
}

impl Reflect for ArrayObject {
    fn type_info(&self) -> TypeRef {
        self.ty
    }

    fn array_len(&self) -> usize {
        self.len()
    }

    fn read_element(
        &self,
        index: usize,
    ) -> std::result::Result<Value, AccessError> {
        let elements = self.elements.borrow();
        elements
            .get(index)
            .cloned()
            .ok_or(AccessError::IndexOutOfBounds {
                index,
                len: elements.len(),
            })
    }

    fn take_children(&self) -> Vec<Value> {
        take_values(&self.elements)
    }
}

impl Drop for ArrayObject {
    fn drop(&mut self) {
        release(mem::take(self.elements.get_mut()));
    }
}

impl fmt::Debug for ArrayObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.ty.name())?;
        f.debug_list().entries(self.elements.borrow().iter()).finish()
    }
}

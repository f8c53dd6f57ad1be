use std::fmt;

use thiserror::Error;

use crate::{Member, TYPE, TypeInfo, TypeRef, Value};

/// Why a value could not be read out of an object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("access denied: {reason}")]
    Denied { reason: String },
    #[error("`{ty}` has no field `{field}`")]
    UnknownField {
        ty: &'static str,
        field: &'static str,
    },
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Introspection over a value whose type the explorer does not know.
///
/// An implementation describes itself with a [`TypeInfo`] and hands out the
/// current value of each member on request. Records answer
/// [`read_field`](Reflect::read_field) for every member of
/// `type_info().instance_fields()`, private ones included; arrays answer
/// [`array_len`](Reflect::array_len) and
/// [`read_element`](Reflect::read_element).
pub trait Reflect: 'static {
    /// The runtime type.
    fn type_info(&self) -> TypeRef;

    fn read_field(&self, member: Member) -> Result<Value, AccessError> {
        Err(AccessError::UnknownField {
            ty: self.type_info().name(),
            field: member.field().name(),
        })
    }

    fn array_len(&self) -> usize {
        0
    }

    fn read_element(&self, index: usize) -> Result<Value, AccessError> {
        Err(AccessError::IndexOutOfBounds {
            index,
            len: self.array_len(),
        })
    }

    /// Moves every value held by this object out of it, leaving it empty.
    ///
    /// Only called on an object whose last strong reference is being
    /// released, so that its children can be dropped from a heap-allocated
    /// stack instead of recursively. Objects that hold no references can
    /// keep the default.
    fn take_children(&self) -> Vec<Value> {
        Vec::new()
    }

    /// The string form of the object, `TypeName@address` unless overridden.
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{:p}",
            self.type_info().name(),
            self as *const Self as *const ()
        )
    }
}

// type descriptors are values too
impl Reflect for TypeInfo {
    fn type_info(&self) -> TypeRef {
        &TYPE
    }

    fn read_field(&self, member: Member) -> Result<Value, AccessError> {
        let ty = match member.field().name() {
            "superclass" => self.superclass(),
            "component" => self.component_type(),
            field => {
                return Err(AccessError::UnknownField {
                    ty: TYPE.name(),
                    field,
                });
            }
        };
        Ok(ty.map_or(Value::Null, Value::Type))
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type {}", self.name())
    }
}

use std::{fmt, ptr, rc::Rc};

use crate::{OBJECT, PrimitiveKind, Reflect, TYPE, TypeRef};

/// Shared handle to an explorable object.
pub type ObjectRef = Rc<dyn Reflect>;

/// Anything that can sit in a field or an array slot.
///
/// Equality is identity for objects and type descriptors and plain value
/// equality for scalars.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Char(char),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Object(ObjectRef),
    /// A type descriptor used as a value.
    Type(TypeRef),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    #[inline]
    pub fn is_type(&self) -> bool {
        matches!(self, Value::Type(_))
    }

    #[inline]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    #[inline]
    pub fn as_type(&self) -> Option<TypeRef> {
        match self {
            Value::Type(ty) => Some(*ty),
            _ => None,
        }
    }

    /// The scalar kind, if this is a scalar.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        let kind = match self {
            Value::Bool(_) => PrimitiveKind::Bool,
            Value::Char(_) => PrimitiveKind::Char,
            Value::U8(_) => PrimitiveKind::U8,
            Value::U16(_) => PrimitiveKind::U16,
            Value::U32(_) => PrimitiveKind::U32,
            Value::U64(_) => PrimitiveKind::U64,
            Value::I8(_) => PrimitiveKind::I8,
            Value::I16(_) => PrimitiveKind::I16,
            Value::I32(_) => PrimitiveKind::I32,
            Value::I64(_) => PrimitiveKind::I64,
            Value::F32(_) => PrimitiveKind::F32,
            Value::F64(_) => PrimitiveKind::F64,
            Value::Null | Value::Object(_) | Value::Type(_) => return None,
        };
        Some(kind)
    }

    /// The runtime type of the value. `Null` has none of its own and
    /// reports the top type.
    pub fn runtime_type(&self) -> TypeRef {
        match self {
            Value::Null => &OBJECT,
            Value::Object(object) => object.type_info(),
            Value::Type(_) => &TYPE,
            scalar => scalar
                .primitive_kind()
                .map_or(&OBJECT, PrimitiveKind::type_info),
        }
    }

    /// The capability used to look inside the value. Scalars and null have
    /// nothing inside.
    pub fn as_reflect(&self) -> Option<&dyn Reflect> {
        match self {
            Value::Object(object) => Some(&**object),
            Value::Type(ty) => Some(*ty as &dyn Reflect),
            _ => None,
        }
    }

    /// Reference identity: the same object or the same type descriptor.
    pub fn same_instance(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => {
                ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
            }
            (Value::Type(a), Value::Type(b)) => ptr::eq(*a, *b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            _ => self.same_instance(other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Object(object) => object.fmt_value(f),
            Value::Type(ty) => write!(f, "type {}", ty.name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Char(v) => write!(f, "{v:?}"),
            _ => fmt::Display::fmt(self, f),
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

scalar_from! {
    bool => Bool,
    char => Char,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
}

impl<T: Reflect> From<Rc<T>> for Value {
    fn from(object: Rc<T>) -> Self {
        Value::Object(object)
    }
}

impl<T: Reflect> From<Option<Rc<T>>> for Value {
    fn from(object: Option<Rc<T>>) -> Self {
        object.map_or(Value::Null, Value::from)
    }
}

impl From<TypeRef> for Value {
    fn from(ty: TypeRef) -> Self {
        Value::Type(ty)
    }
}

use std::{fmt, iter, ptr};

use bitflags::bitflags;

use crate::Value;

/// Type descriptors are static items, so they are compared and shared by
/// address.
pub type TypeRef = &'static TypeInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Char,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl PrimitiveKind {
    /// Width of one value in bytes.
    pub const fn size(self) -> usize {
        match self {
            PrimitiveKind::Bool | PrimitiveKind::U8 | PrimitiveKind::I8 => 1,
            PrimitiveKind::U16 | PrimitiveKind::I16 => 2,
            PrimitiveKind::Char
            | PrimitiveKind::U32
            | PrimitiveKind::I32
            | PrimitiveKind::F32 => 4,
            PrimitiveKind::U64 | PrimitiveKind::I64 | PrimitiveKind::F64 => 8,
        }
    }

    /// The zero value a fresh slot of this kind holds.
    pub fn default_value(self) -> Value {
        match self {
            PrimitiveKind::Bool => Value::Bool(false),
            PrimitiveKind::Char => Value::Char('\0'),
            PrimitiveKind::U8 => Value::U8(0),
            PrimitiveKind::U16 => Value::U16(0),
            PrimitiveKind::U32 => Value::U32(0),
            PrimitiveKind::U64 => Value::U64(0),
            PrimitiveKind::I8 => Value::I8(0),
            PrimitiveKind::I16 => Value::I16(0),
            PrimitiveKind::I32 => Value::I32(0),
            PrimitiveKind::I64 => Value::I64(0),
            PrimitiveKind::F32 => Value::F32(0.0),
            PrimitiveKind::F64 => Value::F64(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    /// A record type with named fields.
    Class,
    /// A sequence type; carries the declared component type.
    Array(TypeRef),
    /// The type of type descriptors themselves.
    Metadata,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldFlags: u8 {
        const STATIC = 1 << 0;
        const PRIVATE = 1 << 1;
    }
}

/// A declared field: its name, its static type and its modifiers.
pub struct FieldInfo {
    name: &'static str,
    ty: TypeRef,
    flags: FieldFlags,
}

impl FieldInfo {
    pub const fn new(name: &'static str, ty: TypeRef) -> Self {
        Self::with_flags(name, ty, FieldFlags::empty())
    }

    pub const fn with_flags(
        name: &'static str,
        ty: TypeRef,
        flags: FieldFlags,
    ) -> Self {
        Self { name, ty, flags }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared type, which may differ from the runtime type of the
    /// value stored in the field.
    #[inline]
    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    #[inline]
    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.flags().contains(FieldFlags::STATIC)
    }

    #[inline]
    pub fn is_private(&self) -> bool {
        self.flags().contains(FieldFlags::PRIVATE)
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty.name)
    }
}

/// Shape descriptor of a runtime type.
///
/// Descriptors are declared as `static` items. Field lists live in their own
/// statics so that descriptors can point at each other, including cycles:
///
/// ```
/// use object_explorer::{FieldInfo, OBJECT, TypeInfo};
///
/// static NODE_FIELDS: [FieldInfo; 1] = [FieldInfo::new("next", &NODE)];
/// static NODE: TypeInfo = TypeInfo::class("Node", &OBJECT, &NODE_FIELDS);
///
/// assert_eq!(NODE.instance_fields().count(), 1);
/// ```
pub struct TypeInfo {
    name: &'static str,
    kind: TypeKind,
    superclass: Option<TypeRef>,
    fields: &'static [FieldInfo],
}

impl TypeInfo {
    pub const fn class(
        name: &'static str,
        superclass: TypeRef,
        fields: &'static [FieldInfo],
    ) -> Self {
        Self {
            name,
            kind: TypeKind::Class,
            superclass: Some(superclass),
            fields,
        }
    }

    /// A class without a superclass, the top of its own hierarchy.
    pub const fn root_class(
        name: &'static str,
        fields: &'static [FieldInfo],
    ) -> Self {
        Self {
            name,
            kind: TypeKind::Class,
            superclass: None,
            fields,
        }
    }

    pub const fn array(name: &'static str, component: TypeRef) -> Self {
        Self {
            name,
            kind: TypeKind::Array(component),
            superclass: None,
            fields: &[],
        }
    }

    const fn primitive(name: &'static str, kind: PrimitiveKind) -> Self {
        Self {
            name,
            kind: TypeKind::Primitive(kind),
            superclass: None,
            fields: &[],
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    pub fn superclass(&self) -> Option<TypeRef> {
        self.superclass
    }

    /// Fields declared directly on this type, statics included.
    #[inline]
    pub fn declared_fields(&self) -> &'static [FieldInfo] {
        self.fields
    }

    #[inline]
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_))
    }

    #[inline]
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.kind {
            TypeKind::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    #[inline]
    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class)
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array(_))
    }

    #[inline]
    pub fn is_metadata(&self) -> bool {
        matches!(self.kind, TypeKind::Metadata)
    }

    #[inline]
    pub fn component_type(&self) -> Option<TypeRef> {
        match self.kind {
            TypeKind::Array(component) => Some(component),
            _ => None,
        }
    }

    /// This type followed by each of its ancestors, up to the topmost one.
    pub fn hierarchy(&'static self) -> impl Iterator<Item = TypeRef> {
        iter::successors(Some(self), |ty| ty.superclass)
    }

    pub fn is_subtype_of(&'static self, other: &TypeInfo) -> bool {
        self.hierarchy().any(|ty| ptr::eq(ty, other))
    }

    /// Whether values of this type are enumerated constants.
    pub fn is_enum(&'static self) -> bool {
        self.is_subtype_of(&ENUM)
    }

    /// Every non-static field of an instance of this type: the fields of
    /// this type first, in declared order, then those of each ancestor.
    /// `Member::slot` numbers them in that order.
    pub fn instance_fields(&'static self) -> impl Iterator<Item = Member> {
        self.hierarchy()
            .flat_map(|owner| {
                owner.fields.iter().map(move |field| (owner, field))
            })
            .filter(|(_, field)| !field.is_static())
            .enumerate()
            .map(|(slot, (owner, field))| Member { owner, field, slot })
    }

    pub fn instance_field_count(&'static self) -> usize {
        self.instance_fields().count()
    }

    /// Looks a field up by name. A field shadowed by a more derived type
    /// resolves to the most derived one.
    pub fn instance_field(&'static self, name: &str) -> Option<Member> {
        self.instance_fields()
            .find(|member| member.field.name == name)
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

impl Eq for TypeInfo {}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A non-static field as seen from a concrete runtime type.
#[derive(Debug, Clone, Copy)]
pub struct Member {
    owner: TypeRef,
    field: &'static FieldInfo,
    slot: usize,
}

impl Member {
    /// The type that declares the field.
    #[inline]
    pub fn owner(&self) -> TypeRef {
        self.owner
    }

    #[inline]
    pub fn field(&self) -> &'static FieldInfo {
        self.field
    }

    /// Position among the instance fields of the runtime type.
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot
    }
}

macro_rules! primitive_types {
    ($(
        $kind:ident => $ty:ident, $array:ident,
        $name:literal, $array_name:literal;
    )*) => {
        $(
            pub static $ty: TypeInfo =
                TypeInfo::primitive($name, PrimitiveKind::$kind);
            pub static $array: TypeInfo = TypeInfo::array($array_name, &$ty);
        )*

        impl PrimitiveKind {
            pub fn type_info(self) -> TypeRef {
                match self {
                    $(PrimitiveKind::$kind => &$ty,)*
                }
            }

            pub fn array_type(self) -> TypeRef {
                match self {
                    $(PrimitiveKind::$kind => &$array,)*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(PrimitiveKind::$kind => $name,)*
                }
            }
        }
    };
}

primitive_types! {
    Bool => BOOL, BOOL_ARRAY, "bool", "[bool]";
    Char => CHAR, CHAR_ARRAY, "char", "[char]";
    U8 => U8, U8_ARRAY, "u8", "[u8]";
    U16 => U16, U16_ARRAY, "u16", "[u16]";
    U32 => U32, U32_ARRAY, "u32", "[u32]";
    U64 => U64, U64_ARRAY, "u64", "[u64]";
    I8 => I8, I8_ARRAY, "i8", "[i8]";
    I16 => I16, I16_ARRAY, "i16", "[i16]";
    I32 => I32, I32_ARRAY, "i32", "[i32]";
    I64 => I64, I64_ARRAY, "i64", "[i64]";
    F32 => F32, F32_ARRAY, "f32", "[f32]";
    F64 => F64, F64_ARRAY, "f64", "[f64]";
}

/// The top of every class hierarchy.
pub static OBJECT: TypeInfo = TypeInfo::root_class("Object", &[]);

pub static OBJECT_ARRAY: TypeInfo = TypeInfo::array("[Object]", &OBJECT);

static ENUM_FIELDS: [FieldInfo; 1] = [FieldInfo::new("ordinal", &I32)];

/// Base of all enumerated-constant types.
pub static ENUM: TypeInfo = TypeInfo::class("Enum", &OBJECT, &ENUM_FIELDS);

static TYPE_FIELDS: [FieldInfo; 2] = [
    FieldInfo::new("superclass", &TYPE),
    FieldInfo::new("component", &TYPE),
];

/// The type of type descriptor values.
pub static TYPE: TypeInfo = TypeInfo {
    name: "Type",
    kind: TypeKind::Metadata,
    superclass: Some(&OBJECT),
    fields: &TYPE_FIELDS,
};

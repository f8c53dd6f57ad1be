//! Attachment point for a memory-instrumentation capability.
//!
//! The explorer never measures anything itself. A host installs an
//! [`Instrumentation`] once, before any visitor needs it, and footprint
//! visitors query it through [`object_size`].

use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

use crate::{Error, Result, TypeKind, TypeRef, Value};

/// Answers the shallow size in bytes of a value.
pub trait Instrumentation: Send + Sync {
    fn object_size(&self, value: &Value) -> usize;
}

/// Holds at most one instrumentation, installed once.
pub struct InstrumentationSlot {
    inner: RwLock<Option<Arc<dyn Instrumentation>>>,
}

impl InstrumentationSlot {
    pub const fn new() -> Self {
        Self {
            inner: parking_lot::const_rwlock(None),
        }
    }

    pub fn install(
        &self,
        instrumentation: Arc<dyn Instrumentation>,
    ) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.is_some() {
            return Err(Error::AlreadyInstalled);
        }
        *inner = Some(instrumentation);
        debug!("instrumentation installed");
        Ok(())
    }

    pub fn is_installed(&self) -> bool {
        self.inner.read().is_some()
    }

    pub fn get(&self) -> Result<Arc<dyn Instrumentation>> {
        self.inner
            .read()
            .clone()
            .ok_or(Error::InstrumentationNotInstalled)
    }

    pub fn object_size(&self, value: &Value) -> Result<usize> {
        Ok(self.get()?.object_size(value))
    }
}

impl Default for InstrumentationSlot {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: InstrumentationSlot = InstrumentationSlot::new();

/// Installs the process-wide instrumentation. Fails with
/// [`Error::AlreadyInstalled`] on every call after the first.
pub fn install(instrumentation: impl Instrumentation + 'static) -> Result<()> {
    GLOBAL.install(Arc::new(instrumentation))
}

pub fn instrumentation() -> Result<Arc<dyn Instrumentation>> {
    GLOBAL.get()
}

/// Shallow size of `value` according to the process-wide instrumentation.
pub fn object_size(value: &Value) -> Result<usize> {
    GLOBAL.object_size(value)
}

/// Estimates shallow sizes from type descriptors alone.
///
/// An object is a header followed by one slot per instance field, primitive
/// slots as wide as their kind and reference slots `reference` bytes wide.
/// An array is a header followed by its elements. Totals are rounded up to
/// `alignment`. Scalars report their own width and null reports nothing.
#[derive(Debug, Clone, Copy)]
pub struct LayoutSizer {
    pub header: usize,
    pub reference: usize,
    pub alignment: usize,
}

impl Default for LayoutSizer {
    fn default() -> Self {
        Self {
            header: 16,
            reference: 8,
            alignment: 8,
        }
    }
}

impl LayoutSizer {
    #[inline]
    fn slot_width(&self, ty: TypeRef) -> usize {
        ty.primitive_kind().map_or(self.reference, |kind| kind.size())
    }

    #[inline]
    fn align(&self, size: usize) -> usize {
        size.next_multiple_of(self.alignment.max(1))
    }

    fn fields_size(&self, ty: TypeRef) -> usize {
        ty.instance_fields()
            .map(|member| self.slot_width(member.field().ty()))
            .sum()
    }
}

impl Instrumentation for LayoutSizer {
    fn object_size(&self, value: &Value) -> usize {
        match value {
            Value::Null => 0,
            Value::Object(object) => {
                let ty = object.type_info();
                let body = match ty.kind() {
                    TypeKind::Array(component) => {
                        object.array_len() * self.slot_width(component)
                    }
                    _ => self.fields_size(ty),
                };
                self.align(self.header + body)
            }
            Value::Type(_) => {
                self.align(self.header + self.fields_size(value.runtime_type()))
            }
            scalar => scalar.primitive_kind().map_or(0, |kind| kind.size()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ArrayObject, FieldInfo, I32, I32_ARRAY, Instance, OBJECT, TypeInfo,
        U8_ARRAY,
    };

    static FILE_FIELDS: [FieldInfo; 2] = [
        FieldInfo::new("contents", &U8_ARRAY),
        FieldInfo::new("created", &I32),
    ];
    static FILE: TypeInfo = TypeInfo::class("File", &OBJECT, &FILE_FIELDS);

    struct Fixed(usize);

    impl Instrumentation for Fixed {
        fn object_size(&self, _value: &Value) -> usize {
            self.0
        }
    }

    #[test]
    fn slot_must_be_installed_before_use() {
        let slot = InstrumentationSlot::new();
        assert!(!slot.is_installed());
        assert_eq!(
            slot.object_size(&Value::Null),
            Err(Error::InstrumentationNotInstalled)
        );
    }

    #[test]
    fn slot_installs_once() {
        let slot = InstrumentationSlot::default();
        slot.install(Arc::new(Fixed(24))).expect("first install");
        assert_eq!(
            slot.install(Arc::new(Fixed(32))).map(|_| ()),
            Err(Error::AlreadyInstalled)
        );
        // the first one stays
        assert_eq!(slot.object_size(&Value::I32(1)), Ok(24));
    }

    #[test]
    fn layout_of_records() {
        let sizer = LayoutSizer::default();
        let file = Instance::new(&FILE).expect("class");
        // header, one reference and an i32
        assert_eq!(sizer.object_size(&Value::from(file)), 32);
        let empty = Instance::new(&OBJECT).expect("class");
        assert_eq!(sizer.object_size(&Value::from(empty)), 16);
    }

    #[test]
    fn layout_of_arrays() {
        let sizer = LayoutSizer::default();
        let bytes =
            ArrayObject::from_values(&U8_ARRAY, [1u8, 2, 3]).expect("array");
        assert_eq!(sizer.object_size(&Value::from(bytes)), 24);
        let ints = ArrayObject::new(&I32_ARRAY, 3).expect("array");
        assert_eq!(sizer.object_size(&Value::from(ints)), 32);
    }

    #[test]
    fn layout_of_everything_else() {
        let sizer = LayoutSizer::default();
        assert_eq!(sizer.object_size(&Value::Null), 0);
        assert_eq!(sizer.object_size(&Value::I64(1)), 8);
        assert_eq!(sizer.object_size(&Value::Bool(true)), 1);
        assert_eq!(sizer.object_size(&Value::Type(&FILE)), 32);
    }
}

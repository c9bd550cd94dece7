//! Typed attributes owned by entities.
//!
//! A field holds a current value and a default value. Entities keep their
//! fields behind the object-safe [`Field`] trait, keyed by interned name;
//! [`TypedField`] is the generic implementation for every [`FieldValue`].

mod errors;
pub mod text;
mod value;

pub use errors::FieldError;
pub use text::TextCursor;
pub use value::FieldValue;

use std::any::Any;
use std::fmt::Debug;

/// Object-safe view of a field, used by the owning entity for copying,
/// resetting and text I/O without knowing the value type.
pub trait Field: Debug {
    /// Copy the value of `other` into this field. The default value is copied
    /// too when `default_too` is set. Fails when the value types differ.
    fn copy_from(&mut self, other: &dyn Field, default_too: bool) -> Result<(), FieldError>;

    /// False for internal fields that should not take part in copies and checksums.
    fn is_data_field(&self) -> bool;

    /// Whether the field should be written to a record.
    fn is_printable(&self) -> bool;

    fn is_default(&self) -> bool;

    /// Make the current value the new default.
    fn update_default(&mut self);

    /// Restore the default value.
    fn reset(&mut self);

    fn write(&self, out: &mut String);

    fn read(&mut self, cursor: &mut TextCursor<'_>) -> Result<(), FieldError>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// How a field takes part in copying and persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    /// Ordinary persisted field.
    #[default]
    Data,
    /// Internal field, never written nor read.
    NoPrint,
    /// Persisted, but left untouched when the entity is copied.
    NoCopy,
    /// Read from old records for conversion, never written again.
    Obsolete,
}

/// A field holding a value of type `T`.
///
/// # Example
///
/// ```
/// use fieldgraph::field::TypedField;
///
/// let mut length = TypedField::new(2.5);
/// assert!(length.is_default_value());
/// assert!(length.set_value(3.0));
/// assert!(!length.set_value(3.0));
/// length.reset_value();
/// assert_eq!(*length.value(), 2.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TypedField<T: FieldValue> {
    value: T,
    default: T,
    kind: FieldKind,
    was_read: bool,
}

impl<T: FieldValue> TypedField<T> {
    /// A data field whose value and default are both `default`.
    pub fn new(default: T) -> Self {
        Self::with_kind(default, FieldKind::Data)
    }

    pub fn with_kind(default: T, kind: FieldKind) -> Self {
        Self {
            value: default.clone(),
            default,
            kind,
            was_read: false,
        }
    }

    pub fn no_print(default: T) -> Self {
        Self::with_kind(default, FieldKind::NoPrint)
    }

    pub fn no_copy(default: T) -> Self {
        Self::with_kind(default, FieldKind::NoCopy)
    }

    pub fn obsolete() -> Self {
        Self::with_kind(T::default(), FieldKind::Obsolete)
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Set the value, returning whether it changed.
    pub fn set_value(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        true
    }

    /// Set the default, returning whether it changed.
    pub fn set_default(&mut self, default: T) -> bool {
        if self.default == default {
            return false;
        }
        self.default = default;
        true
    }

    pub fn is_default_value(&self) -> bool {
        self.value == self.default
    }

    pub fn reset_value(&mut self) {
        self.value = self.default.clone();
    }

    /// True once an obsolete field has been found in a record.
    pub fn was_read(&self) -> bool {
        self.was_read
    }
}

impl<T: FieldValue> Field for TypedField<T> {
    fn copy_from(&mut self, other: &dyn Field, default_too: bool) -> Result<(), FieldError> {
        if self.kind == FieldKind::NoCopy {
            return Ok(());
        }
        let Some(other) = other.as_any().downcast_ref::<TypedField<T>>() else {
            return Err(FieldError::TypeMismatch {
                expected: T::TYPE_NAME,
            });
        };
        self.value = other.value.clone();
        if default_too {
            self.default = other.default.clone();
        }
        if self.kind == FieldKind::Obsolete {
            self.was_read = other.was_read;
        }
        Ok(())
    }

    fn is_data_field(&self) -> bool {
        self.kind != FieldKind::NoPrint
    }

    fn is_printable(&self) -> bool {
        match self.kind {
            FieldKind::Data | FieldKind::NoCopy => self.value.is_printable(),
            FieldKind::NoPrint | FieldKind::Obsolete => false,
        }
    }

    fn is_default(&self) -> bool {
        self.is_default_value()
    }

    fn update_default(&mut self) {
        self.default = self.value.clone();
    }

    fn reset(&mut self) {
        self.reset_value();
    }

    fn write(&self, out: &mut String) {
        if matches!(self.kind, FieldKind::Data | FieldKind::NoCopy) {
            self.value.write_value(out);
        }
    }

    fn read(&mut self, cursor: &mut TextCursor<'_>) -> Result<(), FieldError> {
        match self.kind {
            FieldKind::NoPrint => Ok(()),
            FieldKind::Obsolete => {
                self.value = T::read_value(cursor)?;
                self.was_read = true;
                Ok(())
            }
            FieldKind::Data | FieldKind::NoCopy => {
                self.value = T::read_value(cursor)?;
                Ok(())
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//! JSON payload encoding and scalar wrapping.
//!
//! Payloads are [`serde_json::Value`]s: null, booleans, numbers, strings, arrays and
//! insertion-ordered objects. They are persisted as JSON text.
//!
//! Bare strings and numbers are stored through the same path as objects by wrapping them in a
//! one-element array. Reading such an entry with [`Store::get_object`](crate::Store::get_object)
//! yields the array; the typed scalar getters unwrap it.

use std::fmt;

use serde::ser::{self, Serialize};
pub use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::error::StoreError;

/// Encode a value as JSON text
pub fn encode(id: &str, value: &Value) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Encode { id: id.to_owned(), reason: e.to_string() })
}

/// Convert any serializable type into a [`Value`]. NaN and infinities anywhere in `value` are
/// rejected rather than written as `null`.
pub fn to_value<T: Serialize + ?Sized>(id: &str, value: &T) -> Result<Value, StoreError> {
    value.serialize(FiniteCheck).map_err(|e| StoreError::Encode { id: id.to_owned(), reason: e.to_string() })?;
    serde_json::to_value(value).map_err(|e| StoreError::Encode { id: id.to_owned(), reason: e.to_string() })
}

/// Decode stored JSON text. Fragments (bare scalars) are accepted.
pub fn decode(text: &str) -> Result<Value, serde_json::Error> { serde_json::from_str(text) }

/// A JSON number for `n`, rejecting NaN and the infinities
pub fn finite_number(id: &str, n: f64) -> Result<Number, StoreError> {
    Number::from_f64(n).ok_or_else(|| StoreError::Encode { id: id.to_owned(), reason: format!("{} is not a finite number", n) })
}

/// Wrap a scalar in a one-element array
pub fn wrap_scalar(value: impl Into<Value>) -> Value { Value::Array(vec![value.into()]) }

/// The sole element of a one-element array, if `value` is one
pub fn unwrap_scalar(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) if items.len() == 1 => items.first(),
        _ => None,
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
struct NotFinite(String);

impl ser::Error for NotFinite {
    fn custom<M: fmt::Display>(msg: M) -> Self { NotFinite(msg.to_string()) }
}

/// Walks a value without producing output, failing on the first non-finite float
#[derive(Clone, Copy)]
struct FiniteCheck;

impl FiniteCheck {
    fn float(n: f64) -> Result<(), NotFinite> {
        if n.is_finite() {
            Ok(())
        } else {
            Err(NotFinite(format!("{} is not a finite number", n)))
        }
    }
}

impl ser::Serializer for FiniteCheck {
    type Ok = ();
    type Error = NotFinite;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _: bool) -> Result<(), NotFinite> { Ok(()) }
    fn serialize_i8(self, _: i8) -> Result<(), NotFinite> { Ok(()) }
    fn serialize_i16(self, _: i16) -> Result<(), NotFinite> { Ok(()) }
    fn serialize_i32(self, _: i32) -> Result<(), NotFinite> { Ok(()) }
    fn serialize_i64(self, _: i64) -> Result<(), NotFinite> { Ok(()) }
    fn serialize_i128(self, _: i128) -> Result<(), NotFinite> { Ok(()) }
    fn serialize_u8(self, _: u8) -> Result<(), NotFinite> { Ok(()) }
    fn serialize_u16(self, _: u16) -> Result<(), NotFinite> { Ok(()) }
    fn serialize_u32(self, _: u32) -> Result<(), NotFinite> { Ok(()) }
    fn serialize_u64(self, _: u64) -> Result<(), NotFinite> { Ok(()) }
    fn serialize_u128(self, _: u128) -> Result<(), NotFinite> { Ok(()) }
    fn serialize_f32(self, v: f32) -> Result<(), NotFinite> { Self::float(f64::from(v)) }
    fn serialize_f64(self, v: f64) -> Result<(), NotFinite> { Self::float(v) }
    fn serialize_char(self, _: char) -> Result<(), NotFinite> { Ok(()) }
    fn serialize_str(self, _: &str) -> Result<(), NotFinite> { Ok(()) }
    fn serialize_bytes(self, _: &[u8]) -> Result<(), NotFinite> { Ok(()) }
    fn serialize_none(self) -> Result<(), NotFinite> { Ok(()) }
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<(), NotFinite> { value.serialize(self) }
    fn serialize_unit(self) -> Result<(), NotFinite> { Ok(()) }
    fn serialize_unit_struct(self, _: &'static str) -> Result<(), NotFinite> { Ok(()) }
    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> Result<(), NotFinite> { Ok(()) }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _: &'static str, value: &T) -> Result<(), NotFinite> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(self, _: &'static str, _: u32, _: &'static str, value: &T) -> Result<(), NotFinite> {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self, NotFinite> { Ok(self) }
    fn serialize_tuple(self, _: usize) -> Result<Self, NotFinite> { Ok(self) }
    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, NotFinite> { Ok(self) }
    fn serialize_tuple_variant(self, _: &'static str, _: u32, _: &'static str, _: usize) -> Result<Self, NotFinite> { Ok(self) }
    fn serialize_map(self, _: Option<usize>) -> Result<Self, NotFinite> { Ok(self) }
    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, NotFinite> { Ok(self) }
    fn serialize_struct_variant(self, _: &'static str, _: u32, _: &'static str, _: usize) -> Result<Self, NotFinite> { Ok(self) }
}

impl ser::SerializeSeq for FiniteCheck {
    type Ok = ();
    type Error = NotFinite;
    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), NotFinite> { value.serialize(*self) }
    fn end(self) -> Result<(), NotFinite> { Ok(()) }
}

impl ser::SerializeTuple for FiniteCheck {
    type Ok = ();
    type Error = NotFinite;
    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), NotFinite> { value.serialize(*self) }
    fn end(self) -> Result<(), NotFinite> { Ok(()) }
}

impl ser::SerializeTupleStruct for FiniteCheck {
    type Ok = ();
    type Error = NotFinite;
    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), NotFinite> { value.serialize(*self) }
    fn end(self) -> Result<(), NotFinite> { Ok(()) }
}

impl ser::SerializeTupleVariant for FiniteCheck {
    type Ok = ();
    type Error = NotFinite;
    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), NotFinite> { value.serialize(*self) }
    fn end(self) -> Result<(), NotFinite> { Ok(()) }
}

impl ser::SerializeMap for FiniteCheck {
    type Ok = ();
    type Error = NotFinite;
    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), NotFinite> { key.serialize(*self) }
    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), NotFinite> { value.serialize(*self) }
    fn end(self) -> Result<(), NotFinite> { Ok(()) }
}

impl ser::SerializeStruct for FiniteCheck {
    type Ok = ();
    type Error = NotFinite;
    fn serialize_field<T: ?Sized + Serialize>(&mut self, _: &'static str, value: &T) -> Result<(), NotFinite> { value.serialize(*self) }
    fn end(self) -> Result<(), NotFinite> { Ok(()) }
}

impl ser::SerializeStructVariant for FiniteCheck {
    type Ok = ();
    type Error = NotFinite;
    fn serialize_field<T: ?Sized + Serialize>(&mut self, _: &'static str, value: &T) -> Result<(), NotFinite> { value.serialize(*self) }
    fn end(self) -> Result<(), NotFinite> { Ok(()) }
}

//! Declarative big-endian structure decoding
//!
//! Every fixed-layout structure in an Archive II file is described by a
//! [`Schema`]: an ordered table of named fields with fixed widths. Decoding a
//! schema against a byte slice yields [`Fields`], from which the typed record
//! structs pull their values by name.

use byteorder::{BigEndian, ReadBytesExt};

use crate::{DecodeError, Result};

/// Storage type of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Unsigned 8-bit integer
    U8,
    /// Unsigned 16-bit integer
    U16,
    /// Unsigned 32-bit integer
    U32,
    /// Signed 8-bit integer
    I8,
    /// Signed 16-bit integer
    I16,
    /// Signed 32-bit integer
    I32,
    /// IEEE-754 single precision float
    F32,
    /// IEEE-754 double precision float
    F64,
    /// Fixed-length byte string
    Bytes(usize),
}

impl FieldKind {
    /// Width of the field in bytes
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::F64 => 8,
            Self::Bytes(n) => n,
        }
    }
}

/// Named field within a schema
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Field name
    pub name: &'static str,
    /// Field type
    pub kind: FieldKind,
}

impl Field {
    /// Create a field entry
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// Ordered field table describing one binary structure
#[derive(Debug)]
pub struct Schema {
    /// Structure name, used in error messages
    pub name: &'static str,
    /// Fields in on-disk order
    pub fields: &'static [Field],
}

impl Schema {
    /// Create a schema from a static field table
    #[must_use]
    pub const fn new(name: &'static str, fields: &'static [Field]) -> Self {
        Self { name, fields }
    }

    /// Total encoded size in bytes
    #[must_use]
    pub const fn size(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].kind.width();
            i += 1;
        }
        total
    }

    /// Decode the schema from the start of `bytes`
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Truncated`] if `bytes` is shorter than the schema
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Fields<'a>> {
        self.decode_at(bytes, 0)
    }

    /// Decode the schema at `offset` within `buf`
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Truncated`] if the structure runs past the end of `buf`
    pub fn decode_at<'a>(&self, buf: &'a [u8], offset: usize) -> Result<Fields<'a>> {
        let size = self.size();
        let available = buf.len().saturating_sub(offset);
        if available < size {
            return Err(DecodeError::Truncated {
                context: self.name,
                offset,
                needed: size,
                available,
            });
        }

        let mut cursor = &buf[offset..offset + size];
        let mut values = Vec::with_capacity(self.fields.len());

        for field in self.fields {
            let value = match field.kind {
                FieldKind::U8 => Value::Unsigned(u32::from(cursor.read_u8()?)),
                FieldKind::U16 => Value::Unsigned(u32::from(cursor.read_u16::<BigEndian>()?)),
                FieldKind::U32 => Value::Unsigned(cursor.read_u32::<BigEndian>()?),
                FieldKind::I8 => Value::Signed(i32::from(cursor.read_i8()?)),
                FieldKind::I16 => Value::Signed(i32::from(cursor.read_i16::<BigEndian>()?)),
                FieldKind::I32 => Value::Signed(cursor.read_i32::<BigEndian>()?),
                FieldKind::F32 => Value::Float32(cursor.read_f32::<BigEndian>()?),
                FieldKind::F64 => Value::Float64(cursor.read_f64::<BigEndian>()?),
                FieldKind::Bytes(n) => {
                    let (head, tail) = cursor.split_at(n);
                    cursor = tail;
                    Value::Bytes(head)
                }
            };
            values.push(value);
        }

        Ok(Fields {
            schema: self.name,
            layout: self.fields,
            values,
        })
    }
}

/// Decoded value of a single field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// Any unsigned integer field
    Unsigned(u32),
    /// Any signed integer field
    Signed(i32),
    /// Single precision float
    Float32(f32),
    /// Double precision float
    Float64(f64),
    /// Fixed-length byte string, borrowed from the source buffer
    Bytes(&'a [u8]),
}

/// Name-addressable result of decoding a schema
#[derive(Debug, Clone)]
pub struct Fields<'a> {
    schema: &'static str,
    layout: &'static [Field],
    values: Vec<Value<'a>>,
}

impl<'a> Fields<'a> {
    /// Name of the schema these fields were decoded with
    #[must_use]
    pub fn schema(&self) -> &'static str {
        self.schema
    }

    /// Look up a value by field name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value<'a>> {
        self.layout
            .iter()
            .position(|f| f.name == name)
            .map(|i| self.values[i])
    }

    /// Iterate `(name, value)` pairs in declared order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Value<'a>)> + '_ {
        self.layout
            .iter()
            .zip(self.values.iter())
            .map(|(f, v)| (f.name, *v))
    }

    fn typed(&self, name: &'static str, kind: FieldKind) -> Result<Value<'a>> {
        self.layout
            .iter()
            .position(|f| f.name == name && f.kind == kind)
            .map(|i| self.values[i])
            .ok_or(DecodeError::Schema {
                schema: self.schema,
                field: name,
            })
    }

    fn mismatch(&self, name: &'static str) -> DecodeError {
        DecodeError::Schema {
            schema: self.schema,
            field: name,
        }
    }

    /// Read a `U8` field
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Schema`] if the schema has no such `U8` field
    pub fn u8(&self, name: &'static str) -> Result<u8> {
        match self.typed(name, FieldKind::U8)? {
            Value::Unsigned(v) => u8::try_from(v).map_err(|_| self.mismatch(name)),
            _ => Err(self.mismatch(name)),
        }
    }

    /// Read a `U16` field
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Schema`] if the schema has no such `U16` field
    pub fn u16(&self, name: &'static str) -> Result<u16> {
        match self.typed(name, FieldKind::U16)? {
            Value::Unsigned(v) => u16::try_from(v).map_err(|_| self.mismatch(name)),
            _ => Err(self.mismatch(name)),
        }
    }

    /// Read a `U32` field
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Schema`] if the schema has no such `U32` field
    pub fn u32(&self, name: &'static str) -> Result<u32> {
        match self.typed(name, FieldKind::U32)? {
            Value::Unsigned(v) => Ok(v),
            _ => Err(self.mismatch(name)),
        }
    }

    /// Read an `I8` field
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Schema`] if the schema has no such `I8` field
    pub fn i8(&self, name: &'static str) -> Result<i8> {
        match self.typed(name, FieldKind::I8)? {
            Value::Signed(v) => i8::try_from(v).map_err(|_| self.mismatch(name)),
            _ => Err(self.mismatch(name)),
        }
    }

    /// Read an `I16` field
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Schema`] if the schema has no such `I16` field
    pub fn i16(&self, name: &'static str) -> Result<i16> {
        match self.typed(name, FieldKind::I16)? {
            Value::Signed(v) => i16::try_from(v).map_err(|_| self.mismatch(name)),
            _ => Err(self.mismatch(name)),
        }
    }

    /// Read an `I32` field
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Schema`] if the schema has no such `I32` field
    pub fn i32(&self, name: &'static str) -> Result<i32> {
        match self.typed(name, FieldKind::I32)? {
            Value::Signed(v) => Ok(v),
            _ => Err(self.mismatch(name)),
        }
    }

    /// Read an `F32` field
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Schema`] if the schema has no such `F32` field
    pub fn f32(&self, name: &'static str) -> Result<f32> {
        match self.typed(name, FieldKind::F32)? {
            Value::Float32(v) => Ok(v),
            _ => Err(self.mismatch(name)),
        }
    }

    /// Read an `F64` field
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Schema`] if the schema has no such `F64` field
    pub fn f64(&self, name: &'static str) -> Result<f64> {
        match self.typed(name, FieldKind::F64)? {
            Value::Float64(v) => Ok(v),
            _ => Err(self.mismatch(name)),
        }
    }

    /// Read a fixed-length byte string field
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Schema`] if the schema has no byte string named `name`
    pub fn bytes(&self, name: &'static str) -> Result<&'a [u8]> {
        match self.get(name) {
            Some(Value::Bytes(b)) => Ok(b),
            _ => Err(self.mismatch(name)),
        }
    }

    /// Read a byte string field as text, dropping NUL and space padding
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Schema`] if the schema has no byte string named `name`
    pub fn text(&self, name: &'static str) -> Result<String> {
        let raw = self.bytes(name)?;
        Ok(String::from_utf8_lossy(raw)
            .trim_end_matches(['\0', ' '])
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MIXED: Schema = Schema::new(
        "mixed",
        &[
            Field { name: "a", kind: FieldKind::U8 },
            Field { name: "b", kind: FieldKind::U16 },
            Field { name: "c", kind: FieldKind::U32 },
            Field { name: "d", kind: FieldKind::I8 },
            Field { name: "e", kind: FieldKind::I16 },
            Field { name: "f", kind: FieldKind::I32 },
            Field { name: "g", kind: FieldKind::F32 },
            Field { name: "h", kind: FieldKind::F64 },
            Field { name: "name", kind: FieldKind::Bytes(4) },
        ],
    );

    #[allow(clippy::too_many_arguments)]
    fn encode(a: u8, b: u16, c: u32, d: i8, e: i16, f: i32, g: f32, h: f64, name: [u8; 4]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.push(a);
        buf.extend_from_slice(&b.to_be_bytes());
        buf.extend_from_slice(&c.to_be_bytes());
        buf.extend_from_slice(&d.to_be_bytes());
        buf.extend_from_slice(&e.to_be_bytes());
        buf.extend_from_slice(&f.to_be_bytes());
        buf.extend_from_slice(&g.to_be_bytes());
        buf.extend_from_slice(&h.to_be_bytes());
        buf.extend_from_slice(&name);
        buf
    }

    #[test]
    fn test_schema_size() {
        assert_eq!(MIXED.size(), 1 + 2 + 4 + 1 + 2 + 4 + 4 + 8 + 4);
    }

    #[test]
    fn test_decode_known_fixture() {
        let bytes = encode(7, 0x0102, 0xDEAD_BEEF, -3, -300, -70_000, 2.5, -0.125, *b"KTLX");
        let fields = MIXED.decode(&bytes).unwrap();

        assert_eq!(fields.u8("a").unwrap(), 7);
        assert_eq!(fields.u16("b").unwrap(), 0x0102);
        assert_eq!(fields.u32("c").unwrap(), 0xDEAD_BEEF);
        assert_eq!(fields.i8("d").unwrap(), -3);
        assert_eq!(fields.i16("e").unwrap(), -300);
        assert_eq!(fields.i32("f").unwrap(), -70_000);
        assert_eq!(fields.f32("g").unwrap(), 2.5);
        assert_eq!(fields.f64("h").unwrap(), -0.125);
        assert_eq!(fields.text("name").unwrap(), "KTLX");
    }

    #[test]
    fn test_decode_truncated() {
        let bytes = vec![0u8; MIXED.size() - 1];
        let err = MIXED.decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Truncated {
                context: "mixed",
                needed: 30,
                available: 29,
                ..
            }
        ));
    }

    #[test]
    fn test_decode_at_offset() {
        let mut buf = vec![0xFF; 5];
        buf.extend(encode(1, 2, 3, 4, 5, 6, 7.0, 8.0, *b"SW  "));
        let fields = MIXED.decode_at(&buf, 5).unwrap();
        assert_eq!(fields.u16("b").unwrap(), 2);
        assert_eq!(fields.text("name").unwrap(), "SW");
    }

    #[test]
    fn test_wrong_type_is_schema_error() {
        let bytes = encode(0, 0, 0, 0, 0, 0, 0.0, 0.0, [0; 4]);
        let fields = MIXED.decode(&bytes).unwrap();
        assert!(matches!(fields.u32("b"), Err(DecodeError::Schema { field: "b", .. })));
        assert!(fields.f32("missing").is_err());
        assert_eq!(fields.iter().count(), MIXED.fields.len());
    }

    proptest! {
        #[test]
        fn prop_decode_reproduces_encoded_values(
            a in any::<u8>(),
            b in any::<u16>(),
            c in any::<u32>(),
            d in any::<i8>(),
            e in any::<i16>(),
            f in any::<i32>(),
            g in -1.0e6f32..1.0e6, h in -1.0e12f64..1.0e12,
            name in prop::array::uniform4(b'A'..=b'Z'),
        ) {
            let bytes = encode(a, b, c, d, e, f, g, h, name);
            let fields = MIXED.decode(&bytes).unwrap();
            prop_assert_eq!(fields.u8("a").unwrap(), a);
            prop_assert_eq!(fields.u16("b").unwrap(), b);
            prop_assert_eq!(fields.u32("c").unwrap(), c);
            prop_assert_eq!(fields.i8("d").unwrap(), d);
            prop_assert_eq!(fields.i16("e").unwrap(), e);
            prop_assert_eq!(fields.i32("f").unwrap(), f);
            prop_assert_eq!(fields.f32("g").unwrap().to_bits(), g.to_bits());
            prop_assert_eq!(fields.f64("h").unwrap().to_bits(), h.to_bits());
            prop_assert_eq!(fields.bytes("name").unwrap(), &name[..]);
        }
    }
}

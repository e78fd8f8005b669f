use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One compiled type declaration.
///
/// Serializes as an internally-tagged JSON object (`"type": "..."`) whose
/// field names are fixed by the codec wire contract. Optional fields are
/// omitted entirely when absent, never emitted as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Schema {
    Any,
    Boolean,
    String,
    Number {
        /// Absent means a 64-bit float by convention.
        #[serde(rename = "scalarType", skip_serializing_if = "Option::is_none", default)]
        scalar_type: Option<ScalarType>,
    },
    Buffer {
        /// Absent for the generic `ArrayBuffer`.
        #[serde(rename = "arrayType", skip_serializing_if = "Option::is_none", default)]
        array_type: Option<BufferArrayType>,
    },
    NonPrimitive,
    Array {
        #[serde(rename = "elementType")]
        element_type: Box<Schema>,
    },
    Tuple {
        #[serde(rename = "elementTypes")]
        element_types: Vec<Schema>,
    },
    Literal {
        /// An `undefined` literal omits the field (JSON has no undefined).
        #[serde(skip_serializing_if = "LiteralValue::is_undefined", default)]
        literal: LiteralValue,
    },
    Enum {
        members: Vec<EnumMemberSchema>,
    },
    Interface {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        extends: Option<Vec<ExtendsEntry>>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        properties: Option<Vec<PropertySchema>>,
        #[serde(
            rename = "indexSignature",
            skip_serializing_if = "Option::is_none",
            default
        )]
        index_signature: Option<IndexSignatureSchema>,
    },
    Union {
        members: Vec<MemberSchema>,
    },
    Intersection {
        members: Vec<MemberSchema>,
    },
    IndexedAccess {
        index: String,
        #[serde(rename = "objectType")]
        object_type: Box<Schema>,
    },
    Reference(SchemaRef),
    Pick {
        target: Box<Schema>,
        keys: Vec<String>,
    },
    Omit {
        target: Box<Schema>,
        keys: Vec<String>,
    },
    Partial {
        target: Box<Schema>,
    },
    Overwrite {
        target: Box<Schema>,
        overwrite: Box<Schema>,
    },
}

impl Schema {
    /// Whether two schemas are the same tagged variant. ID regeneration only
    /// reuses a compatible schema of the same variant.
    pub fn same_kind(&self, other: &Schema) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// A pointer to another declaration, by optional module path and name.
/// `path` is absent exactly when the target lives in the same file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaRef {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub path: Option<String>,
    #[serde(rename = "targetName")]
    pub target_name: String,
}

/// The ten fixed scalar numeric type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
}

/// The ten typed-array names; the generic `ArrayBuffer` carries no array type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BufferArrayType {
    Int8Array,
    Int16Array,
    Int32Array,
    BigInt64Array,
    Uint8Array,
    Uint16Array,
    Uint32Array,
    BigUint64Array,
    Float32Array,
    Float64Array,
}

/// A literal type's value. `Undefined` never appears in serialized output;
/// the enclosing `literal` field is omitted instead.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
    Undefined,
}

impl Serialize for LiteralValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LiteralValue::String(s) => serializer.serialize_str(s),
            LiteralValue::Number(n) => serialize_json_number(*n, serializer),
            LiteralValue::Bool(b) => serializer.serialize_bool(*b),
            // Undefined is skipped at the field level; a forced
            // serialization degrades to null.
            LiteralValue::Null | LiteralValue::Undefined => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for LiteralValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LiteralVisitor;

        impl<'de> Visitor<'de> for LiteralVisitor {
            type Value = LiteralValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, number, boolean, or null literal")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(LiteralValue::String(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(LiteralValue::String(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(LiteralValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(LiteralValue::Number(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(LiteralValue::Number(v as f64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(LiteralValue::Number(v))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(LiteralValue::Null)
            }
        }

        deserializer.deserialize_any(LiteralVisitor)
    }
}

impl LiteralValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, LiteralValue::Undefined)
    }

    /// The literal rendered the way the host language stringifies it, used
    /// for pick keys and indexed-access keys.
    pub fn to_key(&self) -> String {
        match self {
            LiteralValue::String(s) => s.clone(),
            LiteralValue::Number(n) => format_number(*n),
            LiteralValue::Bool(b) => b.to_string(),
            LiteralValue::Null => "null".to_owned(),
            LiteralValue::Undefined => "undefined".to_owned(),
        }
    }
}

impl Default for LiteralValue {
    fn default() -> Self {
        LiteralValue::Undefined
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMemberSchema {
    pub id: u32,
    pub value: EnumValue,
}

/// An enum member value: auto-increment numbers, or strings once a string
/// initializer is seen. A `NaN` number serializes as JSON `null` and loads
/// back as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    Number(f64),
    String(String),
}

impl Serialize for EnumValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EnumValue::Number(n) => serialize_json_number(*n, serializer),
            EnumValue::String(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for EnumValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EnumValueVisitor;

        impl<'de> Visitor<'de> for EnumValueVisitor {
            type Value = EnumValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number, a string, or null")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(EnumValue::String(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(EnumValue::String(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(EnumValue::Number(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(EnumValue::Number(v as f64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(EnumValue::Number(v))
            }

            // A string-poisoned counter value round-trips through null.
            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(EnumValue::Number(f64::NAN))
            }
        }

        deserializer.deserialize_any(EnumValueVisitor)
    }
}

impl EnumValue {
    pub fn to_key(&self) -> String {
        match self {
            EnumValue::Number(n) => format_number(*n),
            EnumValue::String(s) => s.clone(),
        }
    }
}

/// One entry of an interface `extends` clause. The type is always a
/// [`Schema::Reference`] when produced by the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendsEntry {
    pub id: u32,
    #[serde(rename = "type")]
    pub type_: Schema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: Schema,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub optional: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSignatureSchema {
    #[serde(rename = "keyType")]
    pub key_type: IndexKeyType,
    #[serde(rename = "type")]
    pub type_: Box<Schema>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexKeyType {
    Number,
    String,
}

/// One member of a union or intersection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSchema {
    pub id: u32,
    #[serde(rename = "type")]
    pub type_: Schema,
}

/// Renders a number the way the host language's string conversion does:
/// whole numbers without a fraction, everything else in shortest form.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Same whole-number rule as [`format_number`], applied to JSON output:
/// `5.0` must serialize as `5`, not `5.0`. Non-finite values go through the
/// serializer's float handling, which renders them as `null` in JSON.
fn serialize_json_number<S: Serializer>(n: f64, serializer: S) -> Result<S::Ok, S::Error> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        serializer.serialize_i64(n as i64)
    } else {
        serializer.serialize_f64(n)
    }
}

//! Tolerant decoding of the `isEmployee` column.
//!
//! Different historical write paths left the flag behind as a boolean, the
//! string `"true"`, or the integer `1`. Every read goes through this newtype
//! so normalization cannot be skipped at one call site and applied at another.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Normalized employee flag.
///
/// Accepts `true`, `"true"`, and `1` as truthy on deserialization; every other
/// value (including null and a missing field) is false. Always serializes as a
/// plain boolean — new writes do not perpetuate the legacy encodings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmployeeFlag(pub bool);

impl EmployeeFlag {
    /// The normalized boolean value.
    pub fn as_bool(self) -> bool {
        self.0
    }
}

impl From<bool> for EmployeeFlag {
    fn from(value: bool) -> Self {
        EmployeeFlag(value)
    }
}

impl Serialize for EmployeeFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.0)
    }
}

struct FlagVisitor;

impl<'de> Visitor<'de> for FlagVisitor {
    type Value = EmployeeFlag;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean, the string \"true\", or the integer 1")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(EmployeeFlag(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(EmployeeFlag(v == 1))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(EmployeeFlag(v == 1))
    }

    fn visit_f64<E: de::Error>(self, _v: f64) -> Result<Self::Value, E> {
        Ok(EmployeeFlag(false))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(EmployeeFlag(v == "true"))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(EmployeeFlag(false))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(EmployeeFlag(false))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(FlagVisitor)
    }
}

impl<'de> Deserialize<'de> for EmployeeFlag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FlagVisitor)
    }
}

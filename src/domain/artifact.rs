//! Artifact and attribute model
//!
//! Artifacts are typed annotations attached to a content node. Every attribute
//! declares a value type; the in-memory value must agree with it exactly, and a
//! disagreement is reported as [`PortableCaseError::AttributeKindMismatch`].

use super::errors::PortableCaseError;
use super::ids::{ArtifactId, ArtifactTypeId, AttributeTypeId, ObjectId};
use super::result::Result;
use serde::{Deserialize, Serialize};

/// Attribute type name that links one artifact to another
pub const ASSOCIATED_ARTIFACT_ATTRIBUTE: &str = "TSK_ASSOCIATED_ARTIFACT";

/// Attribute type name holding the interesting-item set an artifact belongs to
pub const SET_NAME_ATTRIBUTE: &str = "TSK_SET_NAME";

/// Declared value type of an attribute type
///
/// `DateTime` values are stored as 64-bit seconds and `Json` values as text, so
/// both travel through the same storage as `Long` and `String`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeValueType {
    String,
    Integer,
    Long,
    Double,
    Byte,
    DateTime,
    Json,
    /// A value type code this crate does not know how to copy
    Unrecognized(i64),
}

impl AttributeValueType {
    pub fn code(self) -> i64 {
        match self {
            Self::String => 0,
            Self::Integer => 1,
            Self::Long => 2,
            Self::Double => 3,
            Self::Byte => 4,
            Self::DateTime => 5,
            Self::Json => 6,
            Self::Unrecognized(code) => code,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::String,
            1 => Self::Integer,
            2 => Self::Long,
            3 => Self::Double,
            4 => Self::Byte,
            5 => Self::DateTime,
            6 => Self::Json,
            other => Self::Unrecognized(other),
        }
    }

    /// Checks that `value` has the representation this type requires
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedValueType` for unrecognised type codes and
    /// `AttributeKindMismatch` when the value's representation differs.
    pub fn check(self, attribute: &str, value: &AttributeValue) -> Result<()> {
        let matches = match (self, value) {
            (Self::String | Self::Json, AttributeValue::String(_)) => true,
            (Self::Integer, AttributeValue::Integer(_)) => true,
            (Self::Long | Self::DateTime, AttributeValue::Long(_)) => true,
            (Self::Double, AttributeValue::Double(_)) => true,
            (Self::Byte, AttributeValue::Bytes(_)) => true,
            (Self::Unrecognized(code), _) => {
                return Err(PortableCaseError::UnsupportedValueType(format!(
                    "attribute {attribute} has value type code {code}"
                )))
            }
            _ => false,
        };

        if matches {
            Ok(())
        } else {
            Err(PortableCaseError::AttributeKindMismatch(format!(
                "attribute {attribute} is declared {self:?} but holds a {} value",
                value.kind_name()
            )))
        }
    }
}

/// An attribute value in its storage representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Bytes(Vec<u8>),
    Double(f64),
    Integer(i32),
    Long(i64),
    String(String),
}

impl AttributeValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bytes(_) => "byte",
            Self::Double(_) => "double",
            Self::Integer(_) => "integer",
            Self::Long(_) => "long",
            Self::String(_) => "string",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactType {
    pub id: ArtifactTypeId,
    /// Unique name, e.g. `TSK_INTERESTING_FILE_HIT`
    pub type_name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeType {
    pub id: AttributeTypeId,
    pub type_name: String,
    pub display_name: String,
    pub value_type: AttributeValueType,
}

/// A single typed fact on an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub attribute_type: AttributeType,
    pub value: AttributeValue,
    /// Provenance: the modules that produced this value
    pub sources: Vec<String>,
}

impl AttributeRecord {
    /// Builds an attribute, rejecting values that disagree with the type
    pub fn new(
        attribute_type: AttributeType,
        value: AttributeValue,
        sources: Vec<String>,
    ) -> Result<Self> {
        attribute_type
            .value_type
            .check(&attribute_type.type_name, &value)?;
        Ok(Self {
            attribute_type,
            value,
            sources,
        })
    }

    /// Provenance list in its stored, comma separated form
    pub fn joined_sources(&self) -> String {
        self.sources.join(",")
    }

    pub fn is_associated_artifact(&self) -> bool {
        self.attribute_type.type_name == ASSOCIATED_ARTIFACT_ATTRIBUTE
    }
}

/// A typed annotation on a content node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub id: ArtifactId,
    /// The artifact's own object id, used when it is addressed as content
    pub obj_id: ObjectId,
    pub artifact_type: ArtifactType,
    /// The content node the artifact is attached to
    pub source_obj_id: ObjectId,
    pub attributes: Vec<AttributeRecord>,
}

impl ArtifactRecord {
    pub fn attribute(&self, type_name: &str) -> Option<&AttributeRecord> {
        self.attributes
            .iter()
            .find(|a| a.attribute_type.type_name == type_name)
    }

    /// Interesting-item set this artifact belongs to, if any
    pub fn set_name(&self) -> Option<&str> {
        self.attribute(SET_NAME_ATTRIBUTE)
            .and_then(|a| a.value.as_str())
    }

    /// Source artifact referenced through the associated-artifact attribute
    ///
    /// # Errors
    ///
    /// Returns `AttributeKindMismatch` if the attribute does not hold a long.
    pub fn associated_artifact(&self) -> Result<Option<(ArtifactId, &AttributeRecord)>> {
        match self.attribute(ASSOCIATED_ARTIFACT_ATTRIBUTE) {
            None => Ok(None),
            Some(attr) => match attr.value.as_long() {
                Some(raw) => Ok(Some((ArtifactId::new(raw), attr))),
                None => Err(PortableCaseError::AttributeKindMismatch(format!(
                    "{ASSOCIATED_ARTIFACT_ATTRIBUTE} on artifact {} holds a {} value",
                    self.id,
                    attr.value.kind_name()
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr_type(name: &str, value_type: AttributeValueType) -> AttributeType {
        AttributeType {
            id: AttributeTypeId::new(1),
            type_name: name.to_string(),
            display_name: name.to_string(),
            value_type,
        }
    }

    #[test]
    fn test_datetime_accepts_long_value() {
        let attr = AttributeRecord::new(
            attr_type("TSK_DATETIME", AttributeValueType::DateTime),
            AttributeValue::Long(1_700_000_000),
            vec!["mod".to_string()],
        );
        assert!(attr.is_ok());
    }

    #[test]
    fn test_kind_mismatch_is_an_error() {
        let err = AttributeRecord::new(
            attr_type("TSK_NAME", AttributeValueType::String),
            AttributeValue::Double(1.5),
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, PortableCaseError::AttributeKindMismatch(_)));
    }

    #[test]
    fn test_unrecognized_value_type_is_an_error() {
        let err = AttributeValueType::from_code(42)
            .check("X", &AttributeValue::Long(1))
            .unwrap_err();
        assert!(matches!(err, PortableCaseError::UnsupportedValueType(_)));
    }

    #[test]
    fn test_joined_sources() {
        let attr = AttributeRecord::new(
            attr_type("TSK_SET_NAME", AttributeValueType::String),
            AttributeValue::String("Set A".to_string()),
            vec!["a".to_string(), "b".to_string()],
        )
        .unwrap();
        assert_eq!(attr.joined_sources(), "a,b");
    }
}

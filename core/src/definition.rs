//! Serializable schema definitions.
//!
//! These types mirror the schema tree in a plain, nested shape suitable for
//! YAML or JSON definition files. [`SchemaRoot::from_def`] attaches every
//! node through the regular `add_*` methods, so name checks apply exactly as
//! they do for hand-built schemas. Length rules are left to validation.
//!
//! # Example YAML
//!
//! ```yaml
//! name: Telecom
//! description: Switch call detail records
//! views:
//!   - name: Cdr
//!     bit_length: 40
//!     records:
//!       - name: Header
//!         bit_length: 40
//!         fields:
//!           - name: Answered
//!             data_type: boolean
//!             bit_length: 1
//!           - name: Reserved
//!             data_type: reserved
//!             bit_length: 7
//!           - name: Trunks
//!             data_type: integer_array
//!             element_bits: 8
//!             bit_length: 32
//!             fragments:
//!               - { offset: 0, length: 8 }
//!               - { offset: 16, length: 8 }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::schema::{FieldRef, PATH_SEPARATOR};
use crate::{DataType, FieldSpec, FragmentSpec, RecordSpec, SchemaRoot, ViewSpec};

/// Data type tag as written in definition files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataTypeDef {
    Zero,
    Reserved,
    Boolean,
    Integer,
    Enumeration,
    Currency,
    Date,
    Time,
    Datetime,
    BitArray,
    ByteArray,
    /// Requires `element_bits` on the field.
    IntegerArray,
}

/// Top-level schema definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub views: Vec<ViewDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub bit_length: u32,
    #[serde(default)]
    pub records: Vec<RecordDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub bit_length: u32,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub data_type: DataTypeDef,
    /// Element width for `integer_array` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_bits: Option<u32>,
    pub bit_length: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fragments: Vec<FragmentDef>,
}

/// Fragment position relative to the start of its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentDef {
    pub offset: u32,
    pub length: u32,
}

impl FieldDef {
    /// Resolves the tag and `element_bits` into a [`DataType`].
    ///
    /// `path` is only used in error messages.
    pub fn resolve_data_type(&self, path: &str) -> Result<DataType> {
        let data_type = match self.data_type {
            DataTypeDef::IntegerArray => {
                let Some(element_bits) = self.element_bits else {
                    return Err(SchemaError::MissingElementWidth {
                        path: path.to_string(),
                    });
                };
                return Ok(DataType::IntegerArray { element_bits });
            }
            DataTypeDef::Zero => DataType::Zero,
            DataTypeDef::Reserved => DataType::Reserved,
            DataTypeDef::Boolean => DataType::Boolean,
            DataTypeDef::Integer => DataType::Integer,
            DataTypeDef::Enumeration => DataType::Enumeration,
            DataTypeDef::Currency => DataType::Currency,
            DataTypeDef::Date => DataType::Date,
            DataTypeDef::Time => DataType::Time,
            DataTypeDef::Datetime => DataType::Datetime,
            DataTypeDef::BitArray => DataType::BitArray,
            DataTypeDef::ByteArray => DataType::ByteArray,
        };

        match self.element_bits {
            Some(element_bits) => Err(SchemaError::UnexpectedElementWidth {
                path: path.to_string(),
                data_type,
                element_bits,
            }),
            None => Ok(data_type),
        }
    }
}

impl From<DataType> for DataTypeDef {
    fn from(value: DataType) -> Self {
        match value {
            DataType::Zero => DataTypeDef::Zero,
            DataType::Reserved => DataTypeDef::Reserved,
            DataType::Boolean => DataTypeDef::Boolean,
            DataType::Integer => DataTypeDef::Integer,
            DataType::Enumeration => DataTypeDef::Enumeration,
            DataType::Currency => DataTypeDef::Currency,
            DataType::Date => DataTypeDef::Date,
            DataType::Time => DataTypeDef::Time,
            DataType::Datetime => DataTypeDef::Datetime,
            DataType::BitArray => DataTypeDef::BitArray,
            DataType::ByteArray => DataTypeDef::ByteArray,
            DataType::IntegerArray { .. } => DataTypeDef::IntegerArray,
        }
    }
}

impl From<FragmentDef> for FragmentSpec {
    fn from(value: FragmentDef) -> Self {
        FragmentSpec::new(value.offset, value.length)
    }
}

impl From<FragmentSpec> for FragmentDef {
    fn from(value: FragmentSpec) -> Self {
        FragmentDef {
            offset: value.offset(),
            length: value.length(),
        }
    }
}

impl From<FieldRef<'_>> for FieldDef {
    fn from(field: FieldRef<'_>) -> Self {
        let data_type = field.data_type();
        FieldDef {
            name: field.name().to_string(),
            description: field.description().to_string(),
            data_type: data_type.into(),
            element_bits: match data_type {
                DataType::IntegerArray { element_bits } => Some(element_bits),
                _ => None,
            },
            bit_length: field.bit_length(),
            fragments: field.fragments().iter().copied().map(Into::into).collect(),
        }
    }
}

impl SchemaRoot {
    /// Builds an unvalidated schema from a definition.
    ///
    /// # Errors
    ///
    /// Fails on the first empty or duplicate name, or on a field whose
    /// `element_bits` does not match its data type.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitschema_core::{SchemaDef, SchemaRoot};
    ///
    /// let def: SchemaDef = serde_json::from_str(r#"{
    ///     "name": "Legacy",
    ///     "views": [{
    ///         "name": "Msg", "bit_length": 9,
    ///         "records": [{
    ///             "name": "Head", "bit_length": 9,
    ///             "fields": [
    ///                 { "name": "Ok", "data_type": "boolean", "bit_length": 1 },
    ///                 { "name": "Code", "data_type": "byte_array", "bit_length": 8 }
    ///             ]
    ///         }]
    ///     }]
    /// }"#).unwrap();
    ///
    /// let schema = SchemaRoot::from_def(&def).unwrap();
    /// assert!(schema.validate().is_ok());
    /// assert_eq!(schema.to_def(), def);
    /// ```
    pub fn from_def(def: &SchemaDef) -> Result<SchemaRoot> {
        let mut schema = SchemaRoot::new(def.name.clone(), def.description.clone());

        for view_def in &def.views {
            let view = schema.add_view(
                ViewSpec::new(view_def.name.clone(), view_def.bit_length)
                    .with_description(view_def.description.clone()),
            )?;

            for record_def in &view_def.records {
                let record = schema.add_record(
                    view,
                    RecordSpec::new(record_def.name.clone(), record_def.bit_length)
                        .with_description(record_def.description.clone()),
                )?;

                for field_def in &record_def.fields {
                    let path = format!(
                        "{}{PATH_SEPARATOR}{}{PATH_SEPARATOR}{}",
                        view_def.name, record_def.name, field_def.name
                    );
                    let data_type = field_def.resolve_data_type(&path)?;
                    let field = field_def.fragments.iter().fold(
                        FieldSpec::new(field_def.name.clone(), data_type, field_def.bit_length)
                            .with_description(field_def.description.clone()),
                        |field, fragment| field.with_fragment((*fragment).into()),
                    );
                    schema.add_field(record, field)?;
                }
            }
        }

        Ok(schema)
    }

    /// Exports the tree as a definition.
    pub fn to_def(&self) -> SchemaDef {
        SchemaDef {
            name: self.name().to_string(),
            description: self.description().to_string(),
            views: self
                .views()
                .map(|view| ViewDef {
                    name: view.name().to_string(),
                    description: view.description().to_string(),
                    bit_length: view.bit_length(),
                    records: view
                        .records()
                        .map(|record| RecordDef {
                            name: record.name().to_string(),
                            description: record.description().to_string(),
                            bit_length: record.bit_length(),
                            fields: record.fields().map(FieldDef::from).collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl TryFrom<&SchemaDef> for SchemaRoot {
    type Error = SchemaError;

    fn try_from(value: &SchemaDef) -> Result<Self> {
        SchemaRoot::from_def(value)
    }
}

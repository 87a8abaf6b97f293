//! The schema arena and borrowed navigators over it.
//!
//! [`SchemaRoot`] owns every view, record and field in flat vectors. Parent
//! links are indices written once when a node is attached; nothing ever
//! rewrites them. Each parent keeps a name index of its children and the
//! running bit offset of the next child, so attaching, lookups by name and
//! offset queries do not scan siblings.
//!
//! [`ViewRef`], [`RecordRef`] and [`FieldRef`] are cheap `Copy` cursors that
//! pair an index with the root to answer read queries such as names, dotted
//! paths and bit offsets.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{NodeKind, Result, SchemaError};
use crate::{
    DataType, FieldId, FieldSpec, FragmentSpec, ItemSpec, RecordId, RecordSpec, ViewId, ViewSpec,
};

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '.';

static NEXT_SCHEMA_KEY: AtomicU64 = AtomicU64::new(1);

fn next_schema_key() -> u64 {
    NEXT_SCHEMA_KEY.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
struct ViewNode {
    spec: ViewSpec,
    records: Vec<usize>,
    record_names: HashMap<String, usize>,
    records_bit_length: u64,
}

#[derive(Debug, Clone)]
struct RecordNode {
    spec: RecordSpec,
    view: usize,
    bit_offset: u64,
    fields: Vec<usize>,
    field_names: HashMap<String, usize>,
    fields_bit_length: u64,
}

#[derive(Debug, Clone)]
struct FieldNode {
    spec: FieldSpec,
    record: usize,
    bit_offset: u64,
}

/// Top-level named container of views.
///
/// Nodes are attached top-down with [`add_view`](Self::add_view),
/// [`add_record`](Self::add_record) and [`add_field`](Self::add_field).
/// Attaching checks that the name is non-empty and unique among siblings;
/// every other rule is checked by the validation pass.
///
/// The handles returned by attaching are only accepted by the schema that
/// issued them. A clone is a separate schema with its own identity.
///
/// # Examples
///
/// ```
/// use bitschema_core::*;
///
/// let mut schema = SchemaRoot::new("Telecom", "Switch records");
/// let view = schema.add_view(ViewSpec::new("Cdr", 16)).unwrap();
/// let record = schema.add_record(view, RecordSpec::new("Header", 16)).unwrap();
/// schema
///     .add_field(record, FieldSpec::new("Version", DataType::Integer, 4))
///     .unwrap();
/// schema
///     .add_field(record, FieldSpec::new("Kind", DataType::Enumeration, 12))
///     .unwrap();
///
/// let field = schema.field_by_path("Cdr.Header.Kind").unwrap();
/// assert_eq!(field.bit_offset(), 4);
/// assert!(schema.validate().is_ok());
/// ```
#[derive(Debug)]
pub struct SchemaRoot {
    key: u64,
    name: String,
    description: String,
    views: Vec<ViewNode>,
    view_names: HashMap<String, usize>,
    records: Vec<RecordNode>,
    fields: Vec<FieldNode>,
}

impl Clone for SchemaRoot {
    fn clone(&self) -> Self {
        Self {
            key: next_schema_key(),
            name: self.name.clone(),
            description: self.description.clone(),
            views: self.views.clone(),
            view_names: self.view_names.clone(),
            records: self.records.clone(),
            fields: self.fields.clone(),
        }
    }
}

impl SchemaRoot {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: next_schema_key(),
            name: name.into(),
            description: description.into(),
            views: Vec::new(),
            view_names: HashMap::new(),
            records: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Attaches a view to the root.
    ///
    /// # Errors
    ///
    /// [`SchemaError::EmptyName`] or [`SchemaError::DuplicateName`].
    pub fn add_view(&mut self, view: ViewSpec) -> Result<ViewId> {
        check_name(NodeKind::View, view.name(), &self.name)?;
        if self.view_names.contains_key(view.name()) {
            return Err(SchemaError::DuplicateName {
                kind: NodeKind::View,
                name: view.name().to_string(),
                parent: self.name.clone(),
            });
        }

        let index = self.views.len();
        self.view_names.insert(view.name().to_string(), index);
        self.views.push(ViewNode {
            spec: view,
            records: Vec::new(),
            record_names: HashMap::new(),
            records_bit_length: 0,
        });
        Ok(self.view_id(index))
    }

    /// Attaches a record to a view.
    ///
    /// # Errors
    ///
    /// [`SchemaError::EmptyName`] or [`SchemaError::DuplicateName`], or a
    /// message error if `view` does not belong to this schema.
    pub fn add_record(&mut self, view: ViewId, record: RecordSpec) -> Result<RecordId> {
        let parent = self
            .view_at(view)
            .ok_or_else(|| self.foreign_handle("view", view.index))?;
        check_name(NodeKind::Record, record.name(), parent.name())?;
        if parent.node().record_names.contains_key(record.name()) {
            return Err(SchemaError::DuplicateName {
                kind: NodeKind::Record,
                name: record.name().to_string(),
                parent: parent.path(),
            });
        }

        let index = self.records.len();
        let node = &mut self.views[view.index];
        let bit_offset = node.records_bit_length;
        node.records_bit_length += u64::from(record.bit_length());
        node.records.push(index);
        node.record_names.insert(record.name().to_string(), index);
        self.records.push(RecordNode {
            spec: record,
            view: view.index,
            bit_offset,
            fields: Vec::new(),
            field_names: HashMap::new(),
            fields_bit_length: 0,
        });
        Ok(self.record_id(index))
    }

    /// Attaches a field to a record.
    ///
    /// # Errors
    ///
    /// [`SchemaError::EmptyName`] or [`SchemaError::DuplicateName`], or a
    /// message error if `record` does not belong to this schema.
    pub fn add_field(&mut self, record: RecordId, field: FieldSpec) -> Result<FieldId> {
        let parent = self
            .record_at(record)
            .ok_or_else(|| self.foreign_handle("record", record.index))?;
        let parent_path = parent.path();
        check_name(NodeKind::Field, field.name(), &parent_path)?;
        if parent.node().field_names.contains_key(field.name()) {
            return Err(SchemaError::DuplicateName {
                kind: NodeKind::Field,
                name: field.name().to_string(),
                parent: parent_path,
            });
        }

        let index = self.fields.len();
        let node = &mut self.records[record.index];
        let bit_offset = node.fields_bit_length;
        node.fields_bit_length += u64::from(field.bit_length());
        node.fields.push(index);
        node.field_names.insert(field.name().to_string(), index);
        self.fields.push(FieldNode {
            spec: field,
            record: record.index,
            bit_offset,
        });
        Ok(self.field_id(index))
    }

    /// Appends a fragment to an attached field.
    ///
    /// Bounds and overlap are checked by validation.
    pub fn add_fragment(&mut self, field: FieldId, fragment: FragmentSpec) -> Result<()> {
        if self.field_at(field).is_none() {
            return Err(self.foreign_handle("field", field.index));
        }
        self.fields[field.index].spec.push_fragment(fragment);
        Ok(())
    }

    /// Views in insertion order.
    pub fn views(&self) -> impl ExactSizeIterator<Item = ViewRef<'_>> + '_ {
        (0..self.views.len()).map(move |index| ViewRef {
            schema: self,
            index,
        })
    }

    /// Looks up a view by exact name.
    pub fn view(&self, name: &str) -> Option<ViewRef<'_>> {
        let index = *self.view_names.get(name)?;
        Some(ViewRef {
            schema: self,
            index,
        })
    }

    pub fn view_at(&self, id: ViewId) -> Option<ViewRef<'_>> {
        (id.schema == self.key && id.index < self.views.len()).then_some(ViewRef {
            schema: self,
            index: id.index,
        })
    }

    pub fn record_at(&self, id: RecordId) -> Option<RecordRef<'_>> {
        (id.schema == self.key && id.index < self.records.len()).then_some(RecordRef {
            schema: self,
            index: id.index,
        })
    }

    pub fn field_at(&self, id: FieldId) -> Option<FieldRef<'_>> {
        (id.schema == self.key && id.index < self.fields.len()).then_some(FieldRef {
            schema: self,
            index: id.index,
        })
    }

    /// Resolves an exact `View.Record.Field` path.
    pub fn field_by_path(&self, path: &str) -> Option<FieldRef<'_>> {
        let mut segments = path.split(PATH_SEPARATOR);
        let view = self.view(segments.next()?)?;
        let record = view.record(segments.next()?)?;
        let field = record.field(segments.next()?)?;
        segments.next().is_none().then_some(field)
    }

    /// Every field of every view, depth-first in insertion order.
    pub fn all_fields(&self) -> impl Iterator<Item = FieldRef<'_>> + '_ {
        self.views()
            .flat_map(|view| view.records())
            .flat_map(|record| record.fields())
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    fn view_id(&self, index: usize) -> ViewId {
        ViewId {
            schema: self.key,
            index,
        }
    }

    fn record_id(&self, index: usize) -> RecordId {
        RecordId {
            schema: self.key,
            index,
        }
    }

    fn field_id(&self, index: usize) -> FieldId {
        FieldId {
            schema: self.key,
            index,
        }
    }

    fn foreign_handle(&self, kind: &str, index: usize) -> SchemaError {
        SchemaError::msg(format!(
            "{kind} handle {index} does not belong to schema '{}'",
            self.name
        ))
    }
}

fn check_name(kind: NodeKind, name: &str, parent: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SchemaError::EmptyName {
            kind,
            parent: parent.to_string(),
        });
    }
    Ok(())
}

/// Borrowed cursor over a view.
#[derive(Debug, Clone, Copy)]
pub struct ViewRef<'a> {
    schema: &'a SchemaRoot,
    index: usize,
}

impl<'a> ViewRef<'a> {
    fn node(self) -> &'a ViewNode {
        &self.schema.views[self.index]
    }

    pub fn id(self) -> ViewId {
        self.schema.view_id(self.index)
    }

    pub fn schema(self) -> &'a SchemaRoot {
        self.schema
    }

    pub fn spec(self) -> &'a ViewSpec {
        &self.node().spec
    }

    pub fn name(self) -> &'a str {
        self.node().spec.name()
    }

    pub fn description(self) -> &'a str {
        self.node().spec.description()
    }

    pub fn bit_length(self) -> u32 {
        self.node().spec.bit_length()
    }

    /// Path of a view is its own name.
    pub fn path(self) -> String {
        self.name().to_string()
    }

    /// Records in insertion order.
    pub fn records(self) -> impl ExactSizeIterator<Item = RecordRef<'a>> + 'a {
        let schema = self.schema;
        self.node()
            .records
            .iter()
            .map(move |&index| RecordRef { schema, index })
    }

    /// Looks up a record by exact name.
    pub fn record(self, name: &str) -> Option<RecordRef<'a>> {
        let index = *self.node().record_names.get(name)?;
        Some(RecordRef {
            schema: self.schema,
            index,
        })
    }

    /// Sum of the lengths of the attached records.
    pub fn records_bit_length(self) -> u64 {
        self.node().records_bit_length
    }
}

/// Borrowed cursor over a record.
#[derive(Debug, Clone, Copy)]
pub struct RecordRef<'a> {
    schema: &'a SchemaRoot,
    index: usize,
}

impl<'a> RecordRef<'a> {
    fn node(self) -> &'a RecordNode {
        &self.schema.records[self.index]
    }

    pub fn id(self) -> RecordId {
        self.schema.record_id(self.index)
    }

    pub fn spec(self) -> &'a RecordSpec {
        &self.node().spec
    }

    pub fn name(self) -> &'a str {
        self.node().spec.name()
    }

    pub fn description(self) -> &'a str {
        self.node().spec.description()
    }

    pub fn bit_length(self) -> u32 {
        self.node().spec.bit_length()
    }

    /// Owning view.
    pub fn view(self) -> ViewRef<'a> {
        ViewRef {
            schema: self.schema,
            index: self.node().view,
        }
    }

    /// `View.Record`
    pub fn path(self) -> String {
        format!("{}{PATH_SEPARATOR}{}", self.view().name(), self.name())
    }

    /// Fields in insertion order.
    pub fn fields(self) -> impl ExactSizeIterator<Item = FieldRef<'a>> + 'a {
        let schema = self.schema;
        self.node()
            .fields
            .iter()
            .map(move |&index| FieldRef { schema, index })
    }

    /// Looks up a field by exact name.
    pub fn field(self, name: &str) -> Option<FieldRef<'a>> {
        let index = *self.node().field_names.get(name)?;
        Some(FieldRef {
            schema: self.schema,
            index,
        })
    }

    /// Bit offset of this record from the start of its view.
    pub fn bit_offset(self) -> u64 {
        self.node().bit_offset
    }

    /// Sum of the lengths of the attached fields.
    pub fn fields_bit_length(self) -> u64 {
        self.node().fields_bit_length
    }
}

/// Borrowed cursor over a field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'a> {
    schema: &'a SchemaRoot,
    index: usize,
}

impl<'a> FieldRef<'a> {
    fn node(self) -> &'a FieldNode {
        &self.schema.fields[self.index]
    }

    pub fn id(self) -> FieldId {
        self.schema.field_id(self.index)
    }

    pub fn spec(self) -> &'a FieldSpec {
        &self.node().spec
    }

    pub fn item(self) -> &'a ItemSpec {
        self.node().spec.item()
    }

    pub fn name(self) -> &'a str {
        self.node().spec.name()
    }

    pub fn description(self) -> &'a str {
        self.node().spec.description()
    }

    pub fn data_type(self) -> DataType {
        self.node().spec.data_type()
    }

    pub fn bit_length(self) -> u32 {
        self.node().spec.bit_length()
    }

    pub fn fragments(self) -> &'a [FragmentSpec] {
        self.node().spec.fragments()
    }

    /// Owning record.
    pub fn record(self) -> RecordRef<'a> {
        RecordRef {
            schema: self.schema,
            index: self.node().record,
        }
    }

    /// `View.Record.Field`
    pub fn path(self) -> String {
        format!("{}{PATH_SEPARATOR}{}", self.record().path(), self.name())
    }

    /// Bit offset of this field from the start of its record.
    pub fn bit_offset(self) -> u64 {
        self.node().bit_offset
    }

    /// Bit offset of this field from the start of its view.
    pub fn absolute_bit_offset(self) -> u64 {
        self.record().bit_offset() + self.bit_offset()
    }
}

/// A schema that passed validation.
///
/// Only shared access to the underlying [`SchemaRoot`] is exposed, so a
/// validated schema cannot be mutated. It is `Send + Sync` and is usually
/// shared behind an [`Arc`](std::sync::Arc).
#[derive(Debug, Clone)]
pub struct ValidatedSchema {
    root: SchemaRoot,
}

impl ValidatedSchema {
    pub(crate) fn new(root: SchemaRoot) -> Self {
        Self { root }
    }

    /// Gives the tree back for further editing; it must be validated again.
    pub fn into_inner(self) -> SchemaRoot {
        self.root
    }
}

impl Deref for ValidatedSchema {
    type Target = SchemaRoot;

    fn deref(&self) -> &SchemaRoot {
        &self.root
    }
}

use bqrs_types::{
    ColumnType, ColumnValue, ElementValue, LocationStyle, LocationValue, PrimitiveKind,
    PrimitiveValue, TableSchema,
};

use crate::error::BindError;

/// Whether an element column must, may, or must not carry a part.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Requirement {
    #[default]
    Required,
    Optional,
    Forbidden,
}

impl Requirement {
    fn check(
        self,
        table: &str,
        index: usize,
        part: &'static str,
        present: bool,
    ) -> Result<(), BindError> {
        match (self, present) {
            (Self::Required, false) => Err(BindError::MissingElementPart {
                table: table.to_string(),
                index,
                part,
            }),
            (Self::Forbidden, true) => Err(BindError::ForbiddenElementPart {
                table: table.to_string(),
                index,
                part,
            }),
            _ => Ok(()),
        }
    }
}

/// What an element binding expects of its column. Both parts default to
/// [`Requirement::Required`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ElementOptions {
    pub label: Requirement,
    pub location: Requirement,
}

impl ElementOptions {
    /// Accept any element column.
    pub const ANY: Self = Self {
        label: Requirement::Optional,
        location: Requirement::Optional,
    };
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum FieldKind {
    String,
    Element(ElementOptions),
    Any,
    Group(Vec<(usize, FieldKind)>),
}

/// Bindings for a nested group of columns.
///
/// Indexes inside a group are relative to the column the group starts at.
/// A group maps to one [`BoundValue::Group`] holding its fields in binding
/// order.
#[derive(Clone, Debug, Default)]
pub struct GroupBinding {
    fields: Vec<(usize, FieldKind)>,
}

impl GroupBinding {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind column `offset`, which must be a plain string column.
    #[must_use]
    pub fn string(mut self, offset: usize) -> Self {
        self.fields.push((offset, FieldKind::String));
        self
    }

    /// Bind column `offset`, which must be an element column whose label
    /// and location satisfy `options`.
    #[must_use]
    pub fn element(mut self, offset: usize, options: ElementOptions) -> Self {
        self.fields.push((offset, FieldKind::Element(options)));
        self
    }

    /// Bind column `offset` whatever its type.
    #[must_use]
    pub fn any(mut self, offset: usize) -> Self {
        self.fields.push((offset, FieldKind::Any));
        self
    }

    /// Bind a nested group starting at column `offset`.
    #[must_use]
    pub fn group(
        mut self,
        offset: usize,
        bind: impl FnOnce(GroupBinding) -> GroupBinding,
    ) -> Self {
        self.fields.push((offset, FieldKind::Group(bind(GroupBinding::new()).fields)));
        self
    }
}

/// How a field turns decoded columns into a [`BoundValue`].
#[derive(Clone, Debug)]
enum FieldPlan {
    Column {
        index: usize,
        keep_label: bool,
        keep_location: bool,
    },
    Group(Vec<FieldPlan>),
    List(Vec<FieldPlan>),
}

/// Builder describing how the columns of one table are bound.
///
/// Bindings are collected first and checked together by
/// [`build`](Self::build), so the builder chains without `?`:
///
/// ```rust
/// use bqrs_binding::{ElementOptions, Requirement, TableBinding};
/// use bqrs_types::{ColumnSchema, ColumnType, LocationStyle, PrimitiveKind, TableSchema};
///
/// let schema = TableSchema::new(
///     "#select",
///     0,
///     vec![
///         ColumnSchema::new(
///             "call",
///             ColumnType::Element {
///                 primitive: PrimitiveKind::Integer,
///                 location_style: LocationStyle::FivePart,
///                 has_label: true,
///             },
///         ),
///         ColumnSchema::new("message", ColumnType::Primitive(PrimitiveKind::String)),
///     ],
/// );
///
/// let mapper = TableBinding::new(&schema)
///     .element(0, ElementOptions::default())
///     .string(1)
///     .build()
///     .unwrap();
/// assert_eq!(mapper.field_count(), 2);
///
/// let err = TableBinding::new(&schema)
///     .element(0, ElementOptions { label: Requirement::Forbidden, ..ElementOptions::default() })
///     .string(1)
///     .build();
/// assert!(err.is_err());
/// ```
#[derive(Clone, Debug)]
pub struct TableBinding {
    table: String,
    columns: Vec<ColumnType>,
    root: GroupBinding,
    rests: Vec<(usize, FieldKind)>,
}

impl TableBinding {
    #[must_use]
    pub fn new(schema: &TableSchema) -> Self {
        Self {
            table: schema.name.clone(),
            columns: schema.columns.iter().map(|c| c.column_type).collect(),
            root: GroupBinding::new(),
            rests: Vec::new(),
        }
    }

    /// Bind column `index`, which must be a plain string column.
    #[must_use]
    pub fn string(mut self, index: usize) -> Self {
        self.root = self.root.string(index);
        self
    }

    /// Bind column `index`, which must be an element column whose label
    /// and location satisfy `options`.
    #[must_use]
    pub fn element(mut self, index: usize, options: ElementOptions) -> Self {
        self.root = self.root.element(index, options);
        self
    }

    /// Bind column `index` whatever its type.
    #[must_use]
    pub fn any(mut self, index: usize) -> Self {
        self.root = self.root.any(index);
        self
    }

    /// Bind the columns `bind` describes, counted from `index`, as one
    /// nested group field.
    #[must_use]
    pub fn group(mut self, index: usize, bind: impl FnOnce(GroupBinding) -> GroupBinding) -> Self {
        self.root = self.root.group(index, bind);
        self
    }

    /// Bind every column from `start` to the end as one list field, placed
    /// after all other fields. The columns may have any type.
    #[must_use]
    pub fn rest(mut self, start: usize) -> Self {
        self.rests.push((start, FieldKind::Any));
        self
    }

    /// Like [`rest`](Self::rest), but every column must be a plain string.
    #[must_use]
    pub fn rest_strings(mut self, start: usize) -> Self {
        self.rests.push((start, FieldKind::String));
        self
    }

    /// Like [`rest`](Self::rest), but every column must be an element
    /// column satisfying `options`.
    #[must_use]
    pub fn rest_elements(mut self, start: usize, options: ElementOptions) -> Self {
        self.rests.push((start, FieldKind::Element(options)));
        self
    }

    /// Bind the columns from `start` to the end as a list of repeated
    /// groups. Each group begins on the column after the last column of
    /// the one before.
    #[must_use]
    pub fn rest_groups(
        mut self,
        start: usize,
        bind: impl FnOnce(GroupBinding) -> GroupBinding,
    ) -> Self {
        self.rests.push((start, FieldKind::Group(bind(GroupBinding::new()).fields)));
        self
    }

    /// Check the bindings against the table and produce the mapper.
    ///
    /// # Errors
    ///
    /// The first [`BindError`] found, checking fields in the order they
    /// were added, then the rest binding, then for unbound columns.
    pub fn build(self) -> Result<TupleMapper, BindError> {
        if self.rests.len() > 1 {
            return Err(BindError::MultipleRest { table: self.table });
        }

        let mut bound = vec![false; self.columns.len()];
        let (mut fields, _) = self.bind_group(0, &self.root.fields, &mut bound)?;

        if let Some((start, kind)) = self.rests.first() {
            let mut items = Vec::new();
            let mut index = *start;
            while index < self.columns.len() {
                let (plan, last) = self.bind_field(index, kind, &mut bound)?;
                items.push(plan);
                index = last + 1;
            }
            fields.push(FieldPlan::List(items));
        }

        if let Some(index) = bound.iter().position(|&b| !b) {
            return Err(BindError::UnboundColumn {
                table: self.table,
                index,
            });
        }

        Ok(TupleMapper {
            column_count: self.columns.len(),
            fields,
        })
    }

    /// Bind `children` relative to `start`. Returns their plans and the
    /// highest column index any of them used.
    fn bind_group(
        &self,
        start: usize,
        children: &[(usize, FieldKind)],
        bound: &mut [bool],
    ) -> Result<(Vec<FieldPlan>, usize), BindError> {
        let mut plans = Vec::with_capacity(children.len());
        let mut last = start;
        for (offset, kind) in children {
            let (plan, child_last) = self.bind_field(start + offset, kind, bound)?;
            plans.push(plan);
            last = last.max(child_last);
        }
        Ok((plans, last))
    }

    fn bind_field(
        &self,
        index: usize,
        kind: &FieldKind,
        bound: &mut [bool],
    ) -> Result<(FieldPlan, usize), BindError> {
        if index >= self.columns.len() {
            return Err(BindError::ColumnOutOfRange {
                table: self.table.clone(),
                index,
                column_count: self.columns.len(),
            });
        }
        if let FieldKind::Group(children) = kind {
            let (plans, last) = self.bind_group(index, children, bound)?;
            return Ok((FieldPlan::Group(plans), last));
        }
        Ok((self.bind_column(index, kind, bound)?, index))
    }

    fn bind_column(
        &self,
        index: usize,
        kind: &FieldKind,
        bound: &mut [bool],
    ) -> Result<FieldPlan, BindError> {
        let column_type = self.columns[index];
        if bound[index] {
            return Err(BindError::ColumnBoundTwice {
                table: self.table.clone(),
                index,
            });
        }

        let mismatch = |expected| BindError::TypeMismatch {
            table: self.table.clone(),
            index,
            expected,
            actual: column_type,
        };
        let (has_label, has_location) = match column_type {
            ColumnType::Element {
                has_label,
                location_style,
                ..
            } => (has_label, location_style != LocationStyle::None),
            ColumnType::Primitive(_) => (false, false),
        };

        match kind {
            FieldKind::String => {
                if column_type != ColumnType::Primitive(PrimitiveKind::String) {
                    return Err(mismatch("string"));
                }
            }
            FieldKind::Element(options) => {
                if !column_type.is_element() {
                    return Err(mismatch("element"));
                }
                options.label.check(&self.table, index, "label", has_label)?;
                options
                    .location
                    .check(&self.table, index, "location", has_location)?;
            }
            FieldKind::Any | FieldKind::Group(_) => {}
        }

        bound[index] = true;
        Ok(FieldPlan::Column {
            index,
            keep_label: has_label,
            keep_location: has_location,
        })
    }
}

/// A bound value: a column value, a nested group, or the list produced by
/// a rest binding.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundValue {
    Primitive(PrimitiveValue),
    Element(ElementValue),
    Group(BoundRow),
    List(Vec<BoundValue>),
}

impl BoundValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Primitive(value) => value.as_str(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_element(&self) -> Option<&ElementValue> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_group(&self) -> Option<&BoundRow> {
        match self {
            Self::Group(row) => Some(row),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[BoundValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// One mapped row: fields in binding order, rest list last.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundRow {
    pub fields: Vec<BoundValue>,
}

impl BoundRow {
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&BoundValue> {
        self.fields.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Maps decoded rows of one table to [`BoundRow`]s.
#[derive(Clone, Debug)]
pub struct TupleMapper {
    column_count: usize,
    fields: Vec<FieldPlan>,
}

impl TupleMapper {
    /// Number of fields in each mapped row, counting a group or the rest
    /// list as one.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Map one decoded row.
    ///
    /// # Errors
    ///
    /// [`BindError::RowWidthMismatch`] if `row` does not have one value per
    /// column of the table the mapper was built for.
    pub fn map(&self, row: &[ColumnValue]) -> Result<BoundRow, BindError> {
        if row.len() != self.column_count {
            return Err(BindError::RowWidthMismatch {
                expected: self.column_count,
                actual: row.len(),
            });
        }
        Ok(project_all(row, &self.fields))
    }
}

fn project_all(row: &[ColumnValue], plans: &[FieldPlan]) -> BoundRow {
    BoundRow {
        fields: plans.iter().map(|plan| project(row, plan)).collect(),
    }
}

fn project(row: &[ColumnValue], plan: &FieldPlan) -> BoundValue {
    match plan {
        FieldPlan::Column {
            index,
            keep_label,
            keep_location,
        } => match &row[*index] {
            ColumnValue::Primitive(value) => BoundValue::Primitive(value.clone()),
            ColumnValue::Element(element) => BoundValue::Element(ElementValue {
                id: element.id.clone(),
                label: element.label.clone().filter(|_| *keep_label),
                location: if *keep_location {
                    element.location.clone()
                } else {
                    LocationValue::None
                },
            }),
        },
        FieldPlan::Group(plans) => BoundValue::Group(project_all(row, plans)),
        FieldPlan::List(plans) => {
            BoundValue::List(plans.iter().map(|plan| project(row, plan)).collect())
        }
    }
}

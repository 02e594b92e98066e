//! Model declarations (what a struct exposes to the admin) and the registered model metadata.

use crate::case::short_type_name;
use crate::field::Field;
use serde::Serialize;
use std::any::TypeId;

/// Kind of a host struct field, used to infer the default field variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Int,
    Float,
    Bool,
    /// Nested struct value (dates and times).
    Struct(&'static str),
    /// Reference to another model: a foreign key.
    Pointer {
        target: TypeId,
        target_name: &'static str,
    },
    /// Anything else; registered as text with a warning.
    Other(&'static str),
}

/// Host types with a known [`FieldKind`].
pub trait FieldType {
    fn kind() -> FieldKind;
}

macro_rules! field_type {
    ($kind:expr => $($t:ty),+) => {
        $(impl FieldType for $t {
            fn kind() -> FieldKind {
                $kind
            }
        })+
    };
}

field_type!(FieldKind::String => String, &'static str);
field_type!(FieldKind::Int => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
field_type!(FieldKind::Float => f32, f64);
field_type!(FieldKind::Bool => bool);
field_type!(FieldKind::Struct("NaiveDateTime") => chrono::NaiveDateTime);
field_type!(FieldKind::Struct("NaiveDate") => chrono::NaiveDate);
field_type!(FieldKind::Struct("DateTime") => chrono::DateTime<chrono::Utc>);

/// One struct field as seen by the admin: name, kind and tag options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    pub tag: &'static str,
}

impl FieldDescriptor {
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        FieldDescriptor { name, kind, tag: "" }
    }

    pub fn of<T: FieldType>(name: &'static str) -> Self {
        FieldDescriptor::new(name, T::kind())
    }

    pub fn foreign_key<T: AdminModel>(name: &'static str) -> Self {
        FieldDescriptor::new(
            name,
            FieldKind::Pointer {
                target: TypeId::of::<T>(),
                target_name: short_type_name(std::any::type_name::<T>()),
            },
        )
    }

    /// Tag options, e.g. `"search,label=Full name,width=6"` or `"-"`.
    pub fn tag(mut self, tag: &'static str) -> Self {
        self.tag = tag;
        self
    }
}

/// A struct that can be managed through the admin. The first field is the identifier.
pub trait AdminModel: 'static {
    fn fields() -> Vec<FieldDescriptor>;

    /// Display name; defaults to the type name.
    fn admin_name() -> Option<String> {
        None
    }
}

/// Registered model. Frozen once the registry is built.
#[derive(Debug)]
pub struct Model {
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) table_name: String,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) fields: Vec<Field>,
}

impl Model {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The identifier field (always position 0).
    pub fn identifier(&self) -> &Field {
        &self.fields[0]
    }

    /// Fields a form submission may set.
    pub fn editable_fields(&self) -> &[Field] {
        &self.fields[1..]
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(Field::name).collect()
    }

    pub fn table_columns(&self) -> Vec<&str> {
        self.fields.iter().map(Field::column_name).collect()
    }

    pub fn list_fields(&self) -> Vec<&Field> {
        self.fields.iter().filter(|f| f.is_list()).collect()
    }

    /// Labels of list-visible fields, for table headers.
    pub fn list_columns(&self) -> Vec<&str> {
        self.fields.iter().filter(|f| f.is_list()).map(Field::label).collect()
    }

    pub fn list_table_columns(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.is_list())
            .map(Field::column_name)
            .collect()
    }

    pub fn searchable_columns(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.is_searchable())
            .map(Field::column_name)
            .collect()
    }
}

/// Named collection of models for navigation. Models are indexes into the registry, in registration order.
#[derive(Clone, Debug, Serialize)]
pub struct ModelGroup {
    pub name: String,
    pub slug: String,
    #[serde(skip)]
    pub(crate) models: Vec<usize>,
}

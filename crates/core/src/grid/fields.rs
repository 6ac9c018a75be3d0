//! Named per-node value arrays

use crate::error::{Error, Result};
use ndarray::Array1;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Storage for one node field.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Float(Array1<f64>),
    Int(Array1<i64>),
    Bool(Array1<bool>),
}

impl Field {
    /// Number of values in the field
    pub fn len(&self) -> usize {
        match self {
            Field::Float(a) => a.len(),
            Field::Int(a) => a.len(),
            Field::Bool(a) => a.len(),
        }
    }

    /// Whether the field holds no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the element type held by this field
    pub fn type_name(&self) -> &'static str {
        match self {
            Field::Float(_) => f64::TYPE_NAME,
            Field::Int(_) => i64::TYPE_NAME,
            Field::Bool(_) => bool::TYPE_NAME,
        }
    }
}

/// Trait for types that can be stored in a node field.
pub trait FieldElement: Copy + Clone + Debug + Default + PartialEq + Send + Sync + 'static {
    /// Short name used in error messages
    const TYPE_NAME: &'static str;

    /// Wrap an array of this type as a field
    fn into_field(values: Array1<Self>) -> Field;

    /// Borrow the array inside a field, if it holds this type
    fn from_field(field: &Field) -> Option<&Array1<Self>>;

    /// Mutably borrow the array inside a field, if it holds this type
    fn from_field_mut(field: &mut Field) -> Option<&mut Array1<Self>>;
}

macro_rules! impl_field_element {
    ($t:ty, $variant:ident, $name:expr) => {
        impl FieldElement for $t {
            const TYPE_NAME: &'static str = $name;

            fn into_field(values: Array1<Self>) -> Field {
                Field::$variant(values)
            }

            fn from_field(field: &Field) -> Option<&Array1<Self>> {
                match field {
                    Field::$variant(a) => Some(a),
                    _ => None,
                }
            }

            fn from_field_mut(field: &mut Field) -> Option<&mut Array1<Self>> {
                match field {
                    Field::$variant(a) => Some(a),
                    _ => None,
                }
            }
        }
    };
}

impl_field_element!(f64, Float, "float");
impl_field_element!(i64, Int, "int");
impl_field_element!(bool, Bool, "bool");

/// Collection of named fields defined at grid nodes.
///
/// Every field has exactly one value per node. Names follow the
/// `quantity__descriptor` convention, e.g. `topographic__elevation`.
#[derive(Debug, Clone, Default)]
pub struct NodeFields {
    size: usize,
    fields: BTreeMap<String, Field>,
}

impl NodeFields {
    /// Create an empty store for a grid with `size` nodes
    pub fn new(size: usize) -> Self {
        Self {
            size,
            fields: BTreeMap::new(),
        }
    }

    /// Number of values each field must hold
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the store holds no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether a field with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Untyped access to a field
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Add a new field. Fails if the name is taken.
    pub fn add_field<T: FieldElement>(
        &mut self,
        name: impl Into<String>,
        values: impl Into<Array1<T>>,
    ) -> Result<&mut Array1<T>> {
        let name = name.into();
        let values = self.check_size(values.into())?;
        match self.fields.entry(name) {
            Entry::Occupied(e) => Err(Error::FieldExists(e.key().clone())),
            Entry::Vacant(e) => {
                let name = e.key().clone();
                let field = e.insert(T::into_field(values));
                let actual = field.type_name();
                T::from_field_mut(field).ok_or(Error::FieldType {
                    name,
                    expected: T::TYPE_NAME,
                    actual,
                })
            }
        }
    }

    /// Add a field or replace an existing one of any type
    pub fn set_field<T: FieldElement>(
        &mut self,
        name: impl Into<String>,
        values: impl Into<Array1<T>>,
    ) -> Result<()> {
        let values = self.check_size(values.into())?;
        self.fields.insert(name.into(), T::into_field(values));
        Ok(())
    }

    /// Add a new field filled with the type's default value
    pub fn add_zeros<T: FieldElement>(&mut self, name: impl Into<String>) -> Result<&mut Array1<T>> {
        let size = self.size;
        self.add_field(name, Array1::<T>::from_elem(size, T::default()))
    }

    /// Borrow a field as an array of `T`
    pub fn get<T: FieldElement>(&self, name: &str) -> Result<&Array1<T>> {
        let field = self
            .fields
            .get(name)
            .ok_or_else(|| Error::FieldNotFound(name.to_string()))?;
        T::from_field(field).ok_or_else(|| Error::FieldType {
            name: name.to_string(),
            expected: T::TYPE_NAME,
            actual: field.type_name(),
        })
    }

    /// Mutably borrow a field as an array of `T`
    pub fn get_mut<T: FieldElement>(&mut self, name: &str) -> Result<&mut Array1<T>> {
        let field = self
            .fields
            .get_mut(name)
            .ok_or_else(|| Error::FieldNotFound(name.to_string()))?;
        let actual = field.type_name();
        T::from_field_mut(field).ok_or_else(|| Error::FieldType {
            name: name.to_string(),
            expected: T::TYPE_NAME,
            actual,
        })
    }

    /// Remove a field, returning it if present
    pub fn remove(&mut self, name: &str) -> Option<Field> {
        self.fields.remove(name)
    }

    fn check_size<T>(&self, values: Array1<T>) -> Result<Array1<T>> {
        if values.len() != self.size {
            return Err(Error::SizeMismatch {
                what: "node field",
                expected: self.size,
                actual: values.len(),
            });
        }
        Ok(values)
    }
}

//! # Model Layer
//!
//! The pieces every other module is built on: how a model type is
//! identified, how its fields are named, and how values are erased and
//! recovered.
//!
//! Design rule: no storage types, no I/O here. This module is pure data.

pub mod type_tag;
pub mod key_path;
pub mod value;

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::schema::{AnySchema, Schema};

pub use type_tag::TypeTag;
pub use key_path::{AnyKeyPath, Hop, KeyPath};
pub use value::{AnyValue, ValueMap};

// ============================================================================
// Model
// ============================================================================

/// An application entity whose fields are described by a [`Schema`].
///
/// Implementations keep their schema in a `static` [`OnceLock`] so it is
/// built once and shared:
///
/// ```rust
/// use std::sync::OnceLock;
/// use schemata::{KeyPath, Model, Property, Schema};
///
/// #[derive(Clone)]
/// struct Tag { label: String }
///
/// impl Tag {
///     fn label() -> KeyPath<Tag, String> {
///         KeyPath::new("label", |t: &Tag| t.label.clone())
///     }
/// }
///
/// impl Model for Tag {
///     fn schema() -> &'static Schema<Self> {
///         static SCHEMA: OnceLock<Schema<Tag>> = OnceLock::new();
///         SCHEMA.get_or_init(|| {
///             Schema::builder()
///                 .property(Property::value(Tag::label(), "label"))
///                 .build()
///                 .expect("Tag schema")
///         })
///     }
/// }
///
/// assert_eq!(Tag::schema().name(), "Tag");
/// ```
///
/// A schema initializer may look up another model's schema (an inverse
/// to-many does), but two schemas must not look each other up while
/// initializing.
///
/// [`OnceLock`]: std::sync::OnceLock
pub trait Model: Sized + Send + Sync + 'static {
    fn schema() -> &'static Schema<Self>;

    /// Name used for a schema built without an explicit one.
    fn schema_name() -> &'static str {
        type_tag::short_type_name(std::any::type_name::<Self>())
    }
}

// ============================================================================
// ModelValue
// ============================================================================

/// Marker for scalar types a property may store directly.
///
/// Implement it for application newtypes and enums that the storage layer
/// knows how to encode.
pub trait ModelValue: Clone + Send + Sync + 'static {}

macro_rules! impl_model_value {
    ($($ty:ty),* $(,)?) => {
        $(impl ModelValue for $ty {})*
    };
}

impl_model_value!(
    String, bool, char,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
    NaiveDate, NaiveTime, NaiveDateTime, DateTime<Utc>,
);

// ============================================================================
// ModelRef
// ============================================================================

/// Handle on a related model type, resolving its erased schema on demand.
///
/// Holding a function instead of the schema itself lets two models refer
/// to each other without either schema being built first.
#[derive(Clone, Copy)]
pub struct ModelRef {
    tag: TypeTag,
    schema: fn() -> &'static AnySchema,
}

impl ModelRef {
    pub fn of<M: Model>() -> Self {
        Self {
            tag: TypeTag::of::<M>(),
            schema: any_schema_of::<M>,
        }
    }

    pub fn type_tag(&self) -> TypeTag {
        self.tag
    }

    /// The related model's erased schema. Builds it on first use.
    pub fn schema(&self) -> &'static AnySchema {
        (self.schema)()
    }
}

fn any_schema_of<M: Model>() -> &'static AnySchema {
    M::schema().as_any()
}

impl PartialEq for ModelRef {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
    }
}

impl Eq for ModelRef {}

impl Hash for ModelRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag.hash(state);
    }
}

impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelRef({})", self.tag.short_name())
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag.short_name())
    }
}

//! Properties — one field of a model bound to a storage path and a kind.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::model::{AnyKeyPath, KeyPath, Model, ModelRef, ModelValue, TypeTag};
use crate::{Error, Result};
use super::describe::PropertyKind;

// ============================================================================
// PropertyType
// ============================================================================

/// What a property holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    /// A scalar, possibly nullable.
    Value { ty: TypeTag, nullable: bool },
    /// A list of scalars stored at one path.
    List { element: TypeTag },
    /// A single related model, possibly absent.
    ToOne { model: ModelRef, nullable: bool },
    /// A collection of related models pointing back through a to-one.
    ToMany { model: ModelRef },
}

impl PropertyType {
    pub fn is_relationship(&self) -> bool {
        matches!(self, PropertyType::ToOne { .. } | PropertyType::ToMany { .. })
    }

    /// The related model, for relationships.
    pub fn related(&self) -> Option<ModelRef> {
        match self {
            PropertyType::ToOne { model, .. } | PropertyType::ToMany { model } => Some(*model),
            PropertyType::Value { .. } | PropertyType::List { .. } => None,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            PropertyType::Value { nullable, .. } | PropertyType::ToOne { nullable, .. } => *nullable,
            PropertyType::List { .. } | PropertyType::ToMany { .. } => false,
        }
    }

    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyType::Value { .. } => PropertyKind::Value,
            PropertyType::List { .. } => PropertyKind::List,
            PropertyType::ToOne { .. } => PropertyKind::ToOne,
            PropertyType::ToMany { .. } => PropertyKind::ToMany,
        }
    }

    /// Tag of the stored scalar, list element, or related model.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            PropertyType::Value { ty, .. } => *ty,
            PropertyType::List { element } => *element,
            PropertyType::ToOne { model, .. } | PropertyType::ToMany { model } => model.type_tag(),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyType::Value { ty, nullable: false } => write!(f, "{ty}"),
            PropertyType::Value { ty, nullable: true } => write!(f, "{ty}?"),
            PropertyType::List { element } => write!(f, "[{element}]"),
            PropertyType::ToOne { model, nullable: false } => write!(f, "--> {model}"),
            PropertyType::ToOne { model, nullable: true } => write!(f, "-?> {model}"),
            PropertyType::ToMany { model } => write!(f, "<<- {model}"),
        }
    }
}

// ============================================================================
// Property (typed)
// ============================================================================

/// A field of `M` holding a `V`, mapped to a storage path.
///
/// Constructors exist only for accessor/kind pairs that make sense, so a
/// `Property` is consistent by construction.
pub struct Property<M, V> {
    key_path: KeyPath<M, V>,
    path: String,
    ty: PropertyType,
}

impl<M, V> Property<M, V> {
    pub fn key_path(&self) -> &KeyPath<M, V> {
        &self.key_path
    }

    pub fn erased(&self) -> &AnyKeyPath {
        self.key_path.erased()
    }

    /// Storage location (column, document field, ...).
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn property_type(&self) -> PropertyType {
        self.ty
    }

    pub(crate) fn from_parts(key_path: KeyPath<M, V>, path: String, ty: PropertyType) -> Self {
        Self { key_path, path, ty }
    }
}

impl<M: 'static, V: ModelValue> Property<M, V> {
    /// Scalar stored at `path`.
    pub fn value(key_path: KeyPath<M, V>, path: impl Into<String>) -> Self {
        Self::from_parts(
            key_path,
            path.into(),
            PropertyType::Value { ty: TypeTag::of::<V>(), nullable: false },
        )
    }
}

impl<M: 'static, V: ModelValue> Property<M, Option<V>> {
    /// Nullable scalar stored at `path`.
    pub fn optional(key_path: KeyPath<M, Option<V>>, path: impl Into<String>) -> Self {
        Self::from_parts(
            key_path,
            path.into(),
            PropertyType::Value { ty: TypeTag::of::<V>(), nullable: true },
        )
    }
}

impl<M: 'static, V: ModelValue> Property<M, Vec<V>> {
    /// List of scalars stored at `path`.
    pub fn list(key_path: KeyPath<M, Vec<V>>, path: impl Into<String>) -> Self {
        Self::from_parts(key_path, path.into(), PropertyType::List { element: TypeTag::of::<V>() })
    }
}

impl<M: 'static, B: Model> Property<M, B> {
    /// Required to-one relationship whose foreign key lives at `path`.
    pub fn to_one(key_path: KeyPath<M, B>, path: impl Into<String>) -> Self {
        Self::from_parts(
            key_path,
            path.into(),
            PropertyType::ToOne { model: ModelRef::of::<B>(), nullable: false },
        )
    }
}

impl<M: 'static, B: Model> Property<M, Option<B>> {
    /// Nullable to-one relationship whose foreign key lives at `path`.
    pub fn optional_to_one(key_path: KeyPath<M, Option<B>>, path: impl Into<String>) -> Self {
        Self::from_parts(
            key_path,
            path.into(),
            PropertyType::ToOne { model: ModelRef::of::<B>(), nullable: true },
        )
    }
}

impl<M: 'static, B: Model> Property<M, Vec<B>> {
    /// To-many relationship, the inverse of `inverse` on `B`.
    ///
    /// The storage path is not declared here: it is the path of the last
    /// property `B`'s schema resolves for `inverse`, so both directions
    /// share one foreign key. That property must be a to-one relationship
    /// back to `M`. Builds `B`'s schema if needed.
    pub fn to_many<I>(key_path: KeyPath<M, Vec<B>>, inverse: &KeyPath<B, I>) -> Result<Self> {
        let related = B::schema();
        let resolved = related.properties_for(inverse);
        let last = resolved.last().ok_or_else(|| Error::MissingInverse {
            model: related.name().to_string(),
            inverse: inverse.erased().to_string(),
        })?;
        let owner = TypeTag::of::<M>();
        match last.property_type() {
            PropertyType::ToOne { model, .. } if model.type_tag() == owner => {}
            found => {
                return Err(Error::InvalidInverse {
                    model: related.name().to_string(),
                    inverse: inverse.erased().to_string(),
                    expected: owner.short_name().to_string(),
                    found: found.to_string(),
                });
            }
        }
        tracing::trace!(
            inverse = %inverse.erased(),
            path = last.path(),
            "derived to-many storage path from inverse"
        );
        Ok(Self::from_parts(
            key_path,
            last.path().to_string(),
            PropertyType::ToMany { model: ModelRef::of::<B>() },
        ))
    }
}

impl<M, V> Clone for Property<M, V> {
    fn clone(&self) -> Self {
        Self {
            key_path: self.key_path.clone(),
            path: self.path.clone(),
            ty: self.ty,
        }
    }
}

impl<M, V> PartialEq for Property<M, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key_path == other.key_path && self.path == other.path && self.ty == other.ty
    }
}

impl<M, V> fmt::Debug for Property<M, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("key_path", self.key_path.erased())
            .field("path", &self.path)
            .field("type", &self.ty)
            .finish()
    }
}

// ============================================================================
// PartialProperty (value type erased)
// ============================================================================

/// A property of `M` with its value type erased. The accessor is kept only
/// as an identity; it cannot be used to read a model.
pub struct PartialProperty<M> {
    key_path: AnyKeyPath,
    path: String,
    ty: PropertyType,
    _model: PhantomData<fn() -> M>,
}

impl<M> PartialProperty<M> {
    pub fn key_path(&self) -> &AnyKeyPath {
        &self.key_path
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn property_type(&self) -> PropertyType {
        self.ty
    }

    /// Drop the model type as well.
    pub fn to_any(&self) -> AnyProperty {
        AnyProperty {
            key_path: self.key_path.clone(),
            path: self.path.clone(),
            ty: self.ty,
        }
    }
}

impl<M, V> From<Property<M, V>> for PartialProperty<M> {
    fn from(property: Property<M, V>) -> Self {
        Self {
            key_path: property.key_path.erased().clone(),
            path: property.path,
            ty: property.ty,
            _model: PhantomData,
        }
    }
}

impl<M> Clone for PartialProperty<M> {
    fn clone(&self) -> Self {
        Self {
            key_path: self.key_path.clone(),
            path: self.path.clone(),
            ty: self.ty,
            _model: PhantomData,
        }
    }
}

impl<M> PartialEq for PartialProperty<M> {
    fn eq(&self, other: &Self) -> bool {
        self.key_path == other.key_path && self.path == other.path && self.ty == other.ty
    }
}

impl<M> Eq for PartialProperty<M> {}

impl<M> Hash for PartialProperty<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_path.hash(state);
        self.path.hash(state);
        self.ty.hash(state);
    }
}

impl<M> fmt::Debug for PartialProperty<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialProperty")
            .field("key_path", &self.key_path)
            .field("path", &self.path)
            .field("type", &self.ty)
            .finish()
    }
}

impl<M> fmt::Display for PartialProperty<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} @ {:?}", self.key_path.last().field, self.ty, self.path)
    }
}

// ============================================================================
// AnyProperty (fully erased)
// ============================================================================

/// A property with both model and value types erased; the unit of
/// relationship-path resolution across models.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnyProperty {
    key_path: AnyKeyPath,
    path: String,
    ty: PropertyType,
}

impl AnyProperty {
    /// The model declaring this property.
    pub fn model(&self) -> TypeTag {
        self.key_path.root()
    }

    pub fn key_path(&self) -> &AnyKeyPath {
        &self.key_path
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn property_type(&self) -> PropertyType {
        self.ty
    }
}

impl<M> From<&PartialProperty<M>> for AnyProperty {
    fn from(property: &PartialProperty<M>) -> Self {
        property.to_any()
    }
}

impl<M, V> From<Property<M, V>> for AnyProperty {
    fn from(property: Property<M, V>) -> Self {
        PartialProperty::from(property).to_any()
    }
}

impl fmt::Display for AnyProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} @ {:?}", self.key_path, self.ty, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        id: i64,
        note: Option<String>,
        tags: Vec<String>,
    }

    #[test]
    fn test_scalar_families() {
        let id = Property::value(KeyPath::new("id", |r: &Row| r.id), "id");
        let note = Property::optional(KeyPath::new("note", |r: &Row| r.note.clone()), "note");
        let tags = Property::list(KeyPath::new("tags", |r: &Row| r.tags.clone()), "tags");

        assert_eq!(id.property_type(), PropertyType::Value { ty: TypeTag::of::<i64>(), nullable: false });
        assert_eq!(note.property_type(), PropertyType::Value { ty: TypeTag::of::<String>(), nullable: true });
        assert_eq!(tags.property_type(), PropertyType::List { element: TypeTag::of::<String>() });
        assert!(!tags.property_type().is_relationship());
        assert!(note.property_type().is_nullable());
        assert_eq!(tags.property_type().related(), None);
    }

    #[test]
    fn test_display() {
        let note = Property::optional(KeyPath::new("note", |r: &Row| r.note.clone()), "note_text");
        let partial = PartialProperty::from(note.clone());
        assert_eq!(partial.to_string(), "note: String? @ \"note_text\"");
        assert_eq!(AnyProperty::from(note).to_string(), "Row.note: String? @ \"note_text\"");
    }

    #[test]
    fn test_erasure_keeps_identity() {
        let id = Property::value(KeyPath::new("id", |r: &Row| r.id), "id");
        let partial = PartialProperty::from(id.clone());
        let any = partial.to_any();
        assert_eq!(partial.key_path(), id.erased());
        assert_eq!(any.key_path(), id.erased());
        assert_eq!(any.model(), TypeTag::of::<Row>());
        assert_eq!(any.path(), "id");
    }
}

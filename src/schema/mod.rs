//! # Schemas
//!
//! A [`Schema`] is the complete set of property declarations for one model
//! type. It is built once (normally inside [`Model::schema`]) and never
//! changes afterwards, so it can be shared freely between threads.
//!
//! Every schema carries an erased twin, [`AnySchema`], which is what
//! relationship-path resolution walks when a chain crosses into other
//! model types.

pub mod property;
pub mod traversal;
pub mod describe;

use std::fmt;

use hashbrown::HashMap;

use crate::model::{AnyKeyPath, KeyPath, Model, TypeTag, ValueMap};
use crate::projection::Projection;
use crate::{Error, Result};

pub use property::{AnyProperty, PartialProperty, Property, PropertyType};
pub use traversal::ResolverConfig;
pub use describe::{PropertyDescription, PropertyKind, SchemaDescription};

use traversal::PathCache;

// ============================================================================
// Builder
// ============================================================================

/// Accumulates property declarations for `M`.
pub struct SchemaBuilder<M> {
    name: String,
    properties: Vec<PartialProperty<M>>,
    constructor: Option<Projection<M, M>>,
    config: ResolverConfig,
}

impl<M: Model> SchemaBuilder<M> {
    fn new(name: String) -> Self {
        Self {
            name,
            properties: Vec::new(),
            constructor: None,
            config: ResolverConfig::default(),
        }
    }

    /// Declare a property. Declaration order is kept.
    pub fn property(mut self, property: impl Into<PartialProperty<M>>) -> Self {
        self.properties.push(property.into());
        self
    }

    /// Declare how a model instance is rebuilt from its property values.
    pub fn constructor(mut self, constructor: Projection<M, M>) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Finish the schema.
    ///
    /// Fails when an accessor is declared twice, or when the constructor
    /// depends on an accessor that is not declared.
    pub fn build(self) -> Result<Schema<M>> {
        let mut properties: HashMap<AnyKeyPath, PartialProperty<M>> =
            HashMap::with_capacity(self.properties.len());
        let mut order = Vec::with_capacity(self.properties.len());

        for property in self.properties {
            let key = property.key_path().clone();
            if properties.contains_key(&key) {
                return Err(Error::DuplicateProperty {
                    model: self.name,
                    key: key.to_string(),
                });
            }
            order.push(key.clone());
            properties.insert(key, property);
        }

        if let Some(constructor) = &self.constructor {
            if let Some(missing) = constructor.key_paths().iter().find(|k| !properties.contains_key(*k)) {
                return Err(Error::UndeclaredProperty {
                    model: self.name,
                    key: missing.to_string(),
                });
            }
        }

        let erased = AnySchema {
            name: self.name.clone(),
            model: TypeTag::of::<M>(),
            properties: properties.values().map(|p| (p.key_path().clone(), p.to_any())).collect(),
            order: order.clone(),
            config: self.config,
            cache: PathCache::default(),
        };

        tracing::debug!(
            schema = %self.name,
            properties = order.len(),
            constructor = self.constructor.is_some(),
            "built schema"
        );

        Ok(Schema {
            name: self.name,
            properties,
            order,
            constructor: self.constructor,
            erased,
        })
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Property declarations for one model type.
pub struct Schema<M> {
    name: String,
    properties: HashMap<AnyKeyPath, PartialProperty<M>>,
    order: Vec<AnyKeyPath>,
    constructor: Option<Projection<M, M>>,
    erased: AnySchema,
}

impl<M: Model> Schema<M> {
    /// Start a schema named after the model type.
    pub fn builder() -> SchemaBuilder<M> {
        SchemaBuilder::new(M::schema_name().to_string())
    }

    /// Start a schema with an explicit name.
    pub fn named(name: impl Into<String>) -> SchemaBuilder<M> {
        SchemaBuilder::new(name.into())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All properties, keyed by accessor.
    pub fn properties(&self) -> &HashMap<AnyKeyPath, PartialProperty<M>> {
        &self.properties
    }

    /// Properties in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &PartialProperty<M>> {
        self.order.iter().filter_map(|key| self.properties.get(key))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, key: impl AsRef<AnyKeyPath>) -> Option<&PartialProperty<M>> {
        self.properties.get(key.as_ref())
    }

    /// The property declared for `key`.
    ///
    /// # Panics
    ///
    /// When `key` is not declared on this schema. That is a bug in the
    /// caller; use [`get`](Self::get) to check first.
    pub fn partial(&self, key: impl AsRef<AnyKeyPath>) -> &PartialProperty<M> {
        let key = key.as_ref();
        match self.properties.get(key) {
            Some(property) => property,
            None => panic!("{}", self.undeclared(key)),
        }
    }

    /// The typed property declared for `key_path`.
    ///
    /// # Panics
    ///
    /// When `key_path` is not declared on this schema.
    pub fn property<V: 'static>(&self, key_path: &KeyPath<M, V>) -> Property<M, V> {
        match self.try_property(key_path) {
            Ok(property) => property,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_property<V: 'static>(&self, key_path: &KeyPath<M, V>) -> Result<Property<M, V>> {
        let partial = self
            .properties
            .get(key_path.erased())
            .ok_or_else(|| self.undeclared(key_path.erased()))?;
        Ok(Property::from_parts(
            key_path.clone(),
            partial.path().to_string(),
            partial.property_type(),
        ))
    }

    /// The fully erased property declared for `key`.
    ///
    /// # Panics
    ///
    /// When `key` is not declared on this schema.
    pub fn any_property(&self, key: impl AsRef<AnyKeyPath>) -> AnyProperty {
        self.partial(key).to_any()
    }

    /// Resolve an accessor chain, possibly crossing relationships, to one
    /// property per hop. Empty when unreachable.
    pub fn properties_for(&self, key: impl AsRef<AnyKeyPath>) -> Vec<AnyProperty> {
        self.erased.properties_for(key)
    }

    /// Like [`properties_for`](Self::properties_for), but an unreachable
    /// chain is an error naming the chain and this schema. A chain longer
    /// than the configured `max_depth` is reported as
    /// [`Error::PathTooDeep`] rather than unreachable.
    pub fn resolve(&self, key: impl AsRef<AnyKeyPath>) -> Result<Vec<AnyProperty>> {
        let key = key.as_ref();
        let max_depth = self.erased.config().max_depth;
        if key.root() == self.erased.model() && key.len() > max_depth {
            return Err(Error::PathTooDeep {
                root: self.name.clone(),
                chain: key.to_string(),
                depth: key.len(),
                max_depth,
            });
        }
        let properties = self.erased.properties_for(key);
        if properties.is_empty() {
            return Err(Error::UnreachablePath {
                root: self.name.clone(),
                chain: key.to_string(),
            });
        }
        Ok(properties)
    }

    pub fn constructor(&self) -> Option<&Projection<M, M>> {
        self.constructor.as_ref()
    }

    /// Rebuild a model from resolved property values using the declared
    /// constructor.
    pub fn make(&self, values: &ValueMap<M>) -> Result<M> {
        let constructor = self
            .constructor
            .as_ref()
            .ok_or_else(|| Error::NoConstructor(self.name.clone()))?;
        constructor.try_make_value(values)
    }

    /// The erased form used for cross-model traversal.
    pub fn as_any(&self) -> &AnySchema {
        &self.erased
    }

    /// Serializable description, in declaration order.
    pub fn describe(&self) -> SchemaDescription {
        self.erased.describe()
    }

    fn undeclared(&self, key: &AnyKeyPath) -> Error {
        Error::UndeclaredProperty {
            model: self.name.clone(),
            key: key.to_string(),
        }
    }
}

impl<M> PartialEq for Schema<M> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.properties == other.properties
    }
}

impl<M> Eq for Schema<M> {}

impl<M> fmt::Debug for Schema<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("properties", &self.erased.order.len())
            .field("constructor", &self.constructor.is_some())
            .finish()
    }
}

impl<M> fmt::Display for Schema<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = self.properties.values().map(|p| format!("\t{p}")).collect();
        lines.sort();
        write!(f, "{} {{\n{}\n}}", self.name, lines.join("\n"))
    }
}

// ============================================================================
// AnySchema
// ============================================================================

/// A schema with the model type erased.
pub struct AnySchema {
    name: String,
    model: TypeTag,
    properties: HashMap<AnyKeyPath, AnyProperty>,
    order: Vec<AnyKeyPath>,
    config: ResolverConfig,
    cache: PathCache,
}

impl AnySchema {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> TypeTag {
        self.model
    }

    pub fn properties(&self) -> &HashMap<AnyKeyPath, AnyProperty> {
        &self.properties
    }

    /// Properties in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &AnyProperty> {
        self.order.iter().filter_map(|key| self.properties.get(key))
    }

    pub fn get(&self, key: impl AsRef<AnyKeyPath>) -> Option<&AnyProperty> {
        self.properties.get(key.as_ref())
    }

    pub fn config(&self) -> ResolverConfig {
        self.config
    }

    pub fn describe(&self) -> SchemaDescription {
        SchemaDescription {
            name: self.name.clone(),
            properties: self
                .iter()
                .map(|p| {
                    let ty = p.property_type();
                    PropertyDescription {
                        key: p.key_path().to_string(),
                        path: p.path().to_string(),
                        kind: ty.kind(),
                        type_name: ty.type_tag().short_name().to_string(),
                        nullable: ty.is_nullable(),
                    }
                })
                .collect(),
        }
    }
}

impl PartialEq for AnySchema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.model == other.model && self.properties == other.properties
    }
}

impl Eq for AnySchema {}

impl fmt::Debug for AnySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnySchema")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("properties", &self.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        label: String,
        weight: Option<i32>,
    }

    impl Tag {
        fn label() -> KeyPath<Tag, String> {
            KeyPath::new("label", |t: &Tag| t.label.clone())
        }

        fn weight() -> KeyPath<Tag, Option<i32>> {
            KeyPath::new("weight", |t: &Tag| t.weight)
        }

        fn declare() -> SchemaBuilder<Tag> {
            Schema::builder()
                .property(Property::value(Tag::label(), "label"))
                .property(Property::optional(Tag::weight(), "weight"))
        }
    }

    impl Model for Tag {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: OnceLock<Schema<Tag>> = OnceLock::new();
            SCHEMA.get_or_init(|| Tag::declare().build().expect("Tag schema"))
        }
    }

    #[test]
    fn test_default_name_is_type_name() {
        assert_eq!(Tag::schema().name(), "Tag");
        assert_eq!(Schema::<Tag>::named("tags").build().unwrap().name(), "tags");
    }

    #[test]
    fn test_declaration_order_kept() {
        let keys: Vec<String> = Tag::schema().iter().map(|p| p.path().to_string()).collect();
        assert_eq!(keys, vec!["label", "weight"]);
        assert_eq!(Tag::schema().len(), 2);
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = Tag::declare()
            .property(Property::value(Tag::label(), "label_again"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateProperty { .. }), "{err}");
    }

    #[test]
    fn test_typed_lookup() {
        let weight = Tag::schema().property(&Tag::weight());
        assert_eq!(weight.path(), "weight");
        assert!(weight.property_type().is_nullable());
        assert_eq!(weight.key_path().get(&Tag { label: "x".into(), weight: Some(3) }), Some(3));
    }

    #[test]
    #[should_panic(expected = "not declared on bare")]
    fn test_undeclared_lookup_panics() {
        let bare = Schema::<Tag>::named("bare").build().unwrap();
        bare.partial(Tag::label());
    }

    #[test]
    fn test_display_sorted() {
        assert_eq!(
            Tag::schema().to_string(),
            "Tag {\n\tlabel: String @ \"label\"\n\tweight: i32? @ \"weight\"\n}"
        );
    }

    #[test]
    fn test_describe() {
        let description = Tag::schema().describe();
        assert_eq!(description.name, "Tag");
        assert_eq!(description.properties[1].key, "Tag.weight");
        assert_eq!(description.properties[1].kind, PropertyKind::Value);
        assert_eq!(description.properties[1].type_name, "i32");
        assert!(description.properties[1].nullable);
    }

    #[test]
    fn test_cache_disabled_stores_nothing() {
        let schema = Tag::declare()
            .config(ResolverConfig::default().without_cache())
            .build()
            .unwrap();
        assert_eq!(schema.properties_for(Tag::label()).len(), 1);
        assert_eq!(schema.as_any().cached_paths(), 0);
    }
}

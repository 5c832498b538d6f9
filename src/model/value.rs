//! Type-erased values and the key → value maps handed to projections.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use hashbrown::HashMap;

use super::{AnyKeyPath, KeyPath, TypeTag};
use crate::{Error, Result};

/// A boxed value of any `Send + Sync` type, tagged with its runtime type.
///
/// Cloning shares the payload.
#[derive(Clone)]
pub struct AnyValue {
    tag: TypeTag,
    value: Arc<dyn Any + Send + Sync>,
}

impl AnyValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            tag: TypeTag::of::<T>(),
            value: Arc::new(value),
        }
    }

    pub fn type_tag(&self) -> TypeTag {
        self.tag
    }

    pub fn is<T: Any>(&self) -> bool {
        self.tag.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        if !self.is::<T>() {
            return None;
        }
        self.value.downcast_ref::<T>()
    }

    /// Recover an owned `T`, or `None` when the payload is another type.
    pub fn narrow<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyValue(<{}>)", self.tag.name())
    }
}

/// Resolved property values for one model, keyed by accessor.
///
/// This is what a storage/decoding layer fills in before asking a
/// [`Projection`](crate::Projection) to build a result.
pub struct ValueMap<M> {
    values: HashMap<AnyKeyPath, AnyValue>,
    _model: PhantomData<fn() -> M>,
}

impl<M> ValueMap<M> {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            _model: PhantomData,
        }
    }

    /// Store a value under a typed accessor. The value type is checked
    /// statically, so later narrowing through the same accessor succeeds.
    pub fn insert<V: Any + Send + Sync>(&mut self, key: &KeyPath<M, V>, value: V) -> Option<AnyValue> {
        self.values.insert(key.erased().clone(), AnyValue::new(value))
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with<V: Any + Send + Sync>(mut self, key: &KeyPath<M, V>, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Store an already-erased value. Nothing checks that its type matches
    /// the accessor; a mismatch surfaces when the value is narrowed.
    pub fn insert_any(&mut self, key: AnyKeyPath, value: AnyValue) -> Option<AnyValue> {
        self.values.insert(key, value)
    }

    pub fn get(&self, key: &AnyKeyPath) -> Option<&AnyValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &AnyKeyPath) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &AnyKeyPath> {
        self.values.keys()
    }

    /// Look up `key` and recover its value as `V`.
    pub fn narrow<V: Any + Clone>(&self, key: &AnyKeyPath) -> Result<V> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| Error::MissingValue { key: key.to_string() })?;
        value.narrow::<V>().ok_or_else(|| Error::TypeMismatch {
            key: key.to_string(),
            expected: std::any::type_name::<V>(),
            got: value.type_tag().name(),
        })
    }
}

impl<M> Default for ValueMap<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for ValueMap<M> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            _model: PhantomData,
        }
    }
}

impl<M> fmt::Debug for ValueMap<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.values.iter()).finish()
    }
}

impl<M> FromIterator<(AnyKeyPath, AnyValue)> for ValueMap<M> {
    fn from_iter<I: IntoIterator<Item = (AnyKeyPath, AnyValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
            _model: PhantomData,
        }
    }
}

//! Accessors — typed key paths and their erased, comparable form.
//!
//! A key path names a field on a model, or a chain of fields that crosses
//! relationships (`Author.books.title`). The erased form, [`AnyKeyPath`],
//! is the identity used everywhere a schema needs a map key; the typed
//! form, [`KeyPath`], additionally carries the getter.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use smallvec::SmallVec;

use super::{Model, TypeTag};

/// One field access: which model owns the field, and the field's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hop {
    pub owner: TypeTag,
    pub field: &'static str,
}

/// Opaque, equality-comparable accessor chain.
///
/// Two chains are equal when they start at the same model and visit the
/// same fields in the same order. Chains are never empty.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AnyKeyPath {
    root: TypeTag,
    hops: SmallVec<[Hop; 4]>,
}

impl AnyKeyPath {
    /// A single-hop chain naming `field` on `owner`.
    pub fn field(owner: TypeTag, field: &'static str) -> Self {
        let mut hops = SmallVec::new();
        hops.push(Hop { owner, field });
        Self { root: owner, hops }
    }

    /// The model the chain starts at.
    pub fn root(&self) -> TypeTag {
        self.root
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// Number of field accesses in the chain (always >= 1).
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// The last field access.
    pub fn last(&self) -> &Hop {
        // Chains are constructed from at least one hop and only ever grow.
        &self.hops[self.hops.len() - 1]
    }

    /// Concatenate `other` onto this chain.
    ///
    /// The erased form cannot check that `other` starts where this chain
    /// ends; typed composition on [`KeyPath`] does that statically.
    pub fn appending(&self, other: &AnyKeyPath) -> AnyKeyPath {
        let mut hops = self.hops.clone();
        hops.extend(other.hops.iter().copied());
        AnyKeyPath { root: self.root, hops }
    }

    /// True when `self` is `other` or a leading part of it.
    pub fn is_prefix_of(&self, other: &AnyKeyPath) -> bool {
        self.root == other.root
            && self.hops.len() <= other.hops.len()
            && self.hops.iter().zip(other.hops.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Display for AnyKeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for hop in &self.hops {
            write!(f, ".{}", hop.field)?;
        }
        Ok(())
    }
}

impl fmt::Debug for AnyKeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\\{self}")
    }
}

/// Typed accessor from `M` to a value of type `V`.
///
/// Cloning is cheap: the getter is shared.
pub struct KeyPath<M, V> {
    erased: AnyKeyPath,
    getter: Arc<dyn Fn(&M) -> V + Send + Sync>,
}

impl<M, V> KeyPath<M, V> {
    pub fn erased(&self) -> &AnyKeyPath {
        &self.erased
    }

    /// Read the value from a model instance.
    pub fn get(&self, model: &M) -> V {
        (self.getter)(model)
    }
}

impl<M: 'static, V: 'static> KeyPath<M, V> {
    /// Declare field `field` on `M`, read with `getter`.
    pub fn new(field: &'static str, getter: impl Fn(&M) -> V + Send + Sync + 'static) -> Self {
        Self {
            erased: AnyKeyPath::field(TypeTag::of::<M>(), field),
            getter: Arc::new(getter),
        }
    }

    fn chain<W: 'static>(
        &self,
        next: &AnyKeyPath,
        getter: impl Fn(&M) -> W + Send + Sync + 'static,
    ) -> KeyPath<M, W> {
        KeyPath {
            erased: self.erased.appending(next),
            getter: Arc::new(getter),
        }
    }
}

impl<M: 'static, V: Model> KeyPath<M, V> {
    /// Continue through a to-one relationship: `book.author` + `author.name`.
    pub fn appending<W: 'static>(&self, next: &KeyPath<V, W>) -> KeyPath<M, W> {
        let first = Arc::clone(&self.getter);
        let second = Arc::clone(&next.getter);
        self.chain(&next.erased, move |model| second(&first(model)))
    }
}

impl<M: 'static, B: Model> KeyPath<M, Option<B>> {
    /// Continue through a nullable to-one relationship.
    pub fn appending_optional<W: 'static>(&self, next: &KeyPath<B, W>) -> KeyPath<M, Option<W>> {
        let first = Arc::clone(&self.getter);
        let second = Arc::clone(&next.getter);
        self.chain(&next.erased, move |model| first(model).map(|related| second(&related)))
    }
}

impl<M: 'static, B: Model> KeyPath<M, Vec<B>> {
    /// Continue through a to-many relationship, collecting one value per element.
    pub fn each<W: 'static>(&self, next: &KeyPath<B, W>) -> KeyPath<M, Vec<W>> {
        let first = Arc::clone(&self.getter);
        let second = Arc::clone(&next.getter);
        self.chain(&next.erased, move |model| {
            first(model).iter().map(|related| second(related)).collect()
        })
    }
}

impl<M, V> Clone for KeyPath<M, V> {
    fn clone(&self) -> Self {
        Self {
            erased: self.erased.clone(),
            getter: Arc::clone(&self.getter),
        }
    }
}

impl<M, V> PartialEq for KeyPath<M, V> {
    fn eq(&self, other: &Self) -> bool {
        self.erased == other.erased
    }
}

impl<M, V> Eq for KeyPath<M, V> {}

impl<M, V> Hash for KeyPath<M, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.erased.hash(state);
    }
}

impl<M, V> fmt::Debug for KeyPath<M, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.erased, f)
    }
}

impl<M, V> From<&KeyPath<M, V>> for AnyKeyPath {
    fn from(key_path: &KeyPath<M, V>) -> Self {
        key_path.erased.clone()
    }
}

impl<M, V> AsRef<AnyKeyPath> for KeyPath<M, V> {
    fn as_ref(&self) -> &AnyKeyPath {
        &self.erased
    }
}

impl AsRef<AnyKeyPath> for AnyKeyPath {
    fn as_ref(&self) -> &AnyKeyPath {
        self
    }
}

impl<M, V> From<KeyPath<M, V>> for AnyKeyPath {
    fn from(key_path: KeyPath<M, V>) -> Self {
        key_path.erased
    }
}

//! # Projections
//!
//! A [`Projection`] rebuilds a typed value from resolved property values.
//! It records which accessors it needs, so a storage layer knows what to
//! fetch, and narrows each erased value back to its declared type before
//! calling the construction function positionally.
//!
//! ```rust
//! use schemata::{KeyPath, Projection, ValueMap};
//!
//! struct Point { x: i64, y: i64 }
//!
//! let x = KeyPath::new("x", |p: &Point| p.x);
//! let y = KeyPath::new("y", |p: &Point| p.y);
//! let sum = Projection::new((x.clone(), y.clone()), |(x, y)| x + y);
//!
//! let values = ValueMap::new().with(&x, 2_i64).with(&y, 3_i64);
//! assert_eq!(sum.make_value(&values), 5);
//! assert_eq!(sum.project(&Point { x: 10, y: 1 }), 11);
//! ```

mod key_paths;

use std::fmt;
use std::sync::Arc;

use hashbrown::HashSet;

use crate::model::{AnyKeyPath, ValueMap};
use crate::Result;

pub use key_paths::KeyPaths;

/// Construction of a `V` from the values of some of `M`'s accessors.
pub struct Projection<M, V> {
    key_paths: HashSet<AnyKeyPath>,
    make: Arc<dyn Fn(&ValueMap<M>) -> Result<V> + Send + Sync>,
    project: Arc<dyn Fn(&M) -> V + Send + Sync>,
}

impl<M: 'static, V: 'static> Projection<M, V> {
    /// `key_paths` is one [`KeyPath`](crate::KeyPath) or a tuple of up to
    /// eight; `make` receives the matching values in the same order.
    pub fn new<K, F>(key_paths: K, make: F) -> Self
    where
        K: KeyPaths<M>,
        F: Fn(K::Values) -> V + Send + Sync + 'static,
    {
        let declared = key_paths.erased().into_iter().collect();
        let shared = Arc::new((key_paths, make));
        let for_values = Arc::clone(&shared);
        let for_model = shared;

        Self {
            key_paths: declared,
            make: Arc::new(move |values: &ValueMap<M>| {
                let (keys, make) = &*for_values;
                keys.narrow(values).map(make)
            }),
            project: Arc::new(move |model: &M| {
                let (keys, make) = &*for_model;
                make(keys.read(model))
            }),
        }
    }

    /// Post-compose the construction function.
    pub fn map<W: 'static>(self, f: impl Fn(V) -> W + Send + Sync + 'static) -> Projection<M, W> {
        let f = Arc::new(f);
        let for_values = Arc::clone(&f);
        let make = self.make;
        let project = self.project;
        Projection {
            key_paths: self.key_paths,
            make: Arc::new(move |values: &ValueMap<M>| make(values).map(|v| for_values(v))),
            project: Arc::new(move |model: &M| f(project(model))),
        }
    }
}

impl<M, V> Projection<M, V> {
    /// Accessors whose values [`make_value`](Self::make_value) needs.
    /// These are the top-level accessors as declared, not resolved paths.
    pub fn key_paths(&self) -> &HashSet<AnyKeyPath> {
        &self.key_paths
    }

    pub fn contains(&self, key: impl AsRef<AnyKeyPath>) -> bool {
        self.key_paths.contains(key.as_ref())
    }

    /// Build the value, reporting a missing or mistyped entry as an error.
    pub fn try_make_value(&self, values: &ValueMap<M>) -> Result<V> {
        (self.make)(values)
    }

    /// Build the value.
    ///
    /// # Panics
    ///
    /// When `values` lacks an entry for a declared accessor, or holds a
    /// value of the wrong type. Supplying correctly typed values is the
    /// caller's contract.
    pub fn make_value(&self, values: &ValueMap<M>) -> V {
        match (self.make)(values) {
            Ok(value) => value,
            Err(err) => panic!("projection contract violated: {err}"),
        }
    }

    /// Evaluate directly against an in-memory model through the getters.
    pub fn project(&self, model: &M) -> V {
        (self.project)(model)
    }
}

impl<M, V> Clone for Projection<M, V> {
    fn clone(&self) -> Self {
        Self {
            key_paths: self.key_paths.clone(),
            make: Arc::clone(&self.make),
            project: Arc::clone(&self.project),
        }
    }
}

impl<M, V> fmt::Debug for Projection<M, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projection")
            .field("key_paths", &self.key_paths)
            .finish_non_exhaustive()
    }
}

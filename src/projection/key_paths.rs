//! Fixed-arity groups of accessors, implemented for a single [`KeyPath`]
//! and for tuples of up to eight.

use std::any::Any;

use crate::model::{AnyKeyPath, KeyPath, ValueMap};
use crate::Result;

/// An ordered group of accessors on `M` and the tuple of values they yield.
pub trait KeyPaths<M>: Send + Sync + 'static {
    type Values;

    /// Erased accessors, in declaration order.
    fn erased(&self) -> Vec<AnyKeyPath>;

    /// Pull each accessor's value out of `values`, narrowing to its type.
    fn narrow(&self, values: &ValueMap<M>) -> Result<Self::Values>;

    /// Read each accessor straight from a model.
    fn read(&self, model: &M) -> Self::Values;
}

impl<M, T> KeyPaths<M> for KeyPath<M, T>
where
    M: 'static,
    T: Any + Clone + Send + Sync,
{
    type Values = T;

    fn erased(&self) -> Vec<AnyKeyPath> {
        vec![self.erased().clone()]
    }

    fn narrow(&self, values: &ValueMap<M>) -> Result<T> {
        values.narrow::<T>(self.erased())
    }

    fn read(&self, model: &M) -> T {
        self.get(model)
    }
}

macro_rules! impl_key_paths_tuple {
    ($($name:ident),+) => {
        impl<M, $($name),+> KeyPaths<M> for ($($name,)+)
        where
            M: 'static,
            $($name: KeyPaths<M>,)+
        {
            type Values = ($($name::Values,)+);

            #[allow(non_snake_case)]
            fn erased(&self) -> Vec<AnyKeyPath> {
                let ($($name,)+) = self;
                let mut keys = Vec::new();
                $(keys.extend($name.erased());)+
                keys
            }

            #[allow(non_snake_case)]
            fn narrow(&self, values: &ValueMap<M>) -> Result<Self::Values> {
                let ($($name,)+) = self;
                Ok(($($name.narrow(values)?,)+))
            }

            #[allow(non_snake_case)]
            fn read(&self, model: &M) -> Self::Values {
                let ($($name,)+) = self;
                ($($name.read(model),)+)
            }
        }
    };
}

impl_key_paths_tuple!(A);
impl_key_paths_tuple!(A, B);
impl_key_paths_tuple!(A, B, C);
impl_key_paths_tuple!(A, B, C, D);
impl_key_paths_tuple!(A, B, C, D, E);
impl_key_paths_tuple!(A, B, C, D, E, F);
impl_key_paths_tuple!(A, B, C, D, E, F, G);
impl_key_paths_tuple!(A, B, C, D, E, F, G, H);

//! # schemata — Typed Schema Metadata for Model Types
//!
//! Declare which field of a model maps to which storage path, what kind of
//! value it holds, and how a model is rebuilt from resolved values. Chains
//! of fields that cross relationships (`author.books.title`) resolve to the
//! concrete properties a storage layer has to read.
//!
//! ## Design Principles
//!
//! 1. **Built once, read forever**: schemas and projections are immutable after construction
//! 2. **Typed at the edges, erased in the middle**: `KeyPath<M, V>` in, `AnyKeyPath` for lookups, typed values back out
//! 3. **Absence is data, misuse is a bug**: unreachable chains are empty results; undeclared accessors panic
//! 4. **No storage here**: this crate describes what to fetch, never fetches it
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::OnceLock;
//! use schemata::{KeyPath, Model, Projection, Property, Schema, ValueMap};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct User { name: String, email: Option<String> }
//!
//! impl User {
//!     fn name() -> KeyPath<User, String> { KeyPath::new("name", |u: &User| u.name.clone()) }
//!     fn email() -> KeyPath<User, Option<String>> { KeyPath::new("email", |u: &User| u.email.clone()) }
//! }
//!
//! impl Model for User {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: OnceLock<Schema<User>> = OnceLock::new();
//!         SCHEMA.get_or_init(|| {
//!             Schema::builder()
//!                 .property(Property::value(User::name(), "user_name"))
//!                 .property(Property::optional(User::email(), "email"))
//!                 .constructor(Projection::new((User::name(), User::email()), |(name, email)| User { name, email }))
//!                 .build()
//!                 .expect("User schema")
//!         })
//!     }
//! }
//!
//! let path = User::schema().properties_for(User::name());
//! assert_eq!(path[0].path(), "user_name");
//!
//! let values = ValueMap::new()
//!     .with(&User::name(), "Ada".to_string())
//!     .with(&User::email(), None);
//! let user = User::schema().make(&values)?;
//! assert_eq!(user, User { name: "Ada".into(), email: None });
//! # Ok::<(), schemata::Error>(())
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod schema;
pub mod projection;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Model, ModelValue, ModelRef, TypeTag,
    KeyPath, AnyKeyPath, Hop,
    AnyValue, ValueMap,
};

// ============================================================================
// Re-exports: Schema
// ============================================================================

pub use schema::{
    Schema, SchemaBuilder, AnySchema, ResolverConfig,
    Property, PartialProperty, AnyProperty, PropertyType,
    SchemaDescription, PropertyDescription, PropertyKind,
};

// ============================================================================
// Re-exports: Projection
// ============================================================================

pub use projection::{Projection, KeyPaths};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Duplicate property: {key} is declared more than once on {model}")]
    DuplicateProperty { model: String, key: String },

    #[error("Undeclared property: {key} is not declared on {model}")]
    UndeclaredProperty { model: String, key: String },

    #[error("Missing inverse: {inverse} resolves to no property on {model}")]
    MissingInverse { model: String, inverse: String },

    #[error("Invalid inverse: {inverse} on {model} is {found}, expected a to-one relationship to {expected}")]
    InvalidInverse { model: String, inverse: String, expected: String, found: String },

    #[error("Unreachable path: {chain} cannot be reached from {root}")]
    UnreachablePath { root: String, chain: String },

    #[error("Path too deep: {chain} has {depth} hops, {root} resolves at most {max_depth}")]
    PathTooDeep { root: String, chain: String, depth: usize, max_depth: usize },

    #[error("No constructor declared on {0}")]
    NoConstructor(String),

    #[error("Missing value for {key}")]
    MissingValue { key: String },

    #[error("Type error at {key}: expected {expected}, got {got}")]
    TypeMismatch { key: String, expected: &'static str, got: &'static str },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

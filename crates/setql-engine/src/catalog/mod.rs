//! Operator catalog.
//!
//! Overloads are registered through a [`CatalogBuilder`], which validates
//! each declaration and rejects duplicates, and then frozen into an
//! immutable [`Catalog`] that can be shared across threads.

mod builtin;
mod signature;

pub use builtin::builtin_signatures;
pub use signature::{
    DeclaredType, OperatorImpl, OperatorKind, OperatorSignature, ParameterKind, ParameterSpec,
    ReturnSpec,
};

use hashbrown::HashSet;
use indexmap::IndexMap;
use setql_common::utils::error::CatalogError;
use std::sync::Arc;

/// Collects operator declarations.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    operators: IndexMap<String, Vec<Arc<OperatorSignature>>>,
    identities: HashSet<(String, Vec<DeclaredType>)>,
}

impl CatalogBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder preloaded with the built-in operator family.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in declaration is rejected.
    pub fn with_builtins() -> Result<Self, CatalogError> {
        let mut builder = Self::new();
        builder.register_all(builtin_signatures())?;
        Ok(builder)
    }

    /// Registers one overload.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidSignature` for a malformed declaration
    /// and `CatalogError::DuplicateSignature` if an overload with the same
    /// name and parameter types exists.
    pub fn register(&mut self, signature: OperatorSignature) -> Result<(), CatalogError> {
        signature.validate()?;
        if !self.identities.insert(signature.identity()) {
            return Err(CatalogError::DuplicateSignature {
                signature: signature.specialized_name(),
            });
        }
        self.operators
            .entry(signature.name.clone())
            .or_default()
            .push(Arc::new(signature));
        Ok(())
    }

    /// Registers declarations in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first registration error.
    pub fn register_all<I>(&mut self, signatures: I) -> Result<(), CatalogError>
    where
        I: IntoIterator<Item = OperatorSignature>,
    {
        for signature in signatures {
            self.register(signature)?;
        }
        Ok(())
    }

    /// Freezes the catalog.
    #[must_use]
    pub fn build(self) -> Catalog {
        Catalog {
            operators: self.operators,
        }
    }
}

/// Frozen table of operator overloads, keyed by name.
///
/// Overloads of one name are kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    operators: IndexMap<String, Vec<Arc<OperatorSignature>>>,
}

impl Catalog {
    /// Builds the catalog of built-in operators.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in declaration is rejected.
    pub fn builtin() -> Result<Self, CatalogError> {
        Ok(CatalogBuilder::with_builtins()?.build())
    }

    /// Returns all overloads of `name`, or an empty slice.
    #[must_use]
    pub fn lookup(&self, name: &str) -> &[Arc<OperatorSignature>] {
        match self.operators.get(name) {
            Some(overloads) => overloads,
            None => &[],
        }
    }

    /// Returns true if `name` has at least one overload.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    /// Returns operator names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operators.keys().map(String::as_str)
    }

    /// Returns every overload, grouped by name.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<OperatorSignature>> {
        self.operators.values().flatten()
    }

    /// Returns the number of overloads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operators.values().map(Vec::len).sum()
    }

    /// Returns true if the catalog holds no overloads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

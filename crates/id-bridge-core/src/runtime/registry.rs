// crates/id-bridge-core/src/runtime/registry.rs
// ============================================================================
// Module: IdBridge Recipe Registry
// Description: Explicit registration table of non-auth recipe storages.
// Purpose: Enumerate the recipes consulted by the referential-integrity guard.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! The recipe registry is a closed, explicitly enumerated list of non-auth
//! recipe storages assembled at process startup. Each recipe is added once;
//! there is no runtime type scanning. Exempt recipes never store
//! identity-scoped data and are excluded from referential-integrity checks.
//!
//! Invariants:
//! - Recipe names are unique within the registry.
//! - Iteration order is registration order, making the first offending
//!   recipe deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::interfaces::RecipeStorage;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registry errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A recipe with the same name is already registered.
    #[error("recipe already registered: {0}")]
    DuplicateRecipe(String),
}

// ============================================================================
// SECTION: Recipe Registry
// ============================================================================

/// A registered recipe storage together with its exemption flag.
struct RegisteredRecipe {
    /// Recipe storage implementation behind a trait object.
    storage: Box<dyn RecipeStorage + Send + Sync>,
    /// True when the recipe is exempt from referential-integrity checks.
    exempt: bool,
}

/// Explicit registration table of non-auth recipe storages.
///
/// # Invariants
/// - Recipe names are unique within the registry.
/// - Registered storages are `Send + Sync` and stored behind trait objects.
#[derive(Default)]
pub struct RecipeRegistry {
    /// Registered recipes in registration order.
    recipes: Vec<RegisteredRecipe>,
}

impl RecipeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            recipes: Vec::new(),
        }
    }

    /// Registers a recipe storage that participates in referential-integrity
    /// checks.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateRecipe`] when a recipe with the same
    /// name is already registered.
    pub fn register(
        &mut self,
        storage: impl RecipeStorage + Send + Sync + 'static,
    ) -> Result<(), RegistryError> {
        self.register_inner(Box::new(storage), false)
    }

    /// Registers an exempt recipe storage.
    ///
    /// Exempt recipes never key records by user id and are skipped by the
    /// referential-integrity guard.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateRecipe`] when a recipe with the same
    /// name is already registered.
    pub fn register_exempt(
        &mut self,
        storage: impl RecipeStorage + Send + Sync + 'static,
    ) -> Result<(), RegistryError> {
        self.register_inner(Box::new(storage), true)
    }

    /// Adds a recipe after checking name uniqueness.
    fn register_inner(
        &mut self,
        storage: Box<dyn RecipeStorage + Send + Sync>,
        exempt: bool,
    ) -> Result<(), RegistryError> {
        let name = storage.recipe_name();
        if self.recipes.iter().any(|recipe| recipe.storage.recipe_name() == name) {
            return Err(RegistryError::DuplicateRecipe(name.to_string()));
        }
        self.recipes.push(RegisteredRecipe {
            storage,
            exempt,
        });
        Ok(())
    }

    /// Iterates the non-exempt recipes in registration order.
    pub fn checked_recipes(&self) -> impl Iterator<Item = &(dyn RecipeStorage + Send + Sync)> {
        self.recipes
            .iter()
            .filter(|recipe| !recipe.exempt)
            .map(|recipe| recipe.storage.as_ref())
    }

    /// Returns the number of registered recipes, exempt ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Returns true when no recipe is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

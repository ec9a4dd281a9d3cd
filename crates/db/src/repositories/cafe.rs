//! Café (tenant) repository.
//!
//! Cafés are the tenants themselves and are not row-level scoped. Only
//! platform administrators manage them.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use tracing::info;

use cafedesk_shared::types::CafeId;

use super::is_unique_violation;
use crate::entities::cafes;

/// Longest DNS label accepted as a subdomain.
const MAX_SUBDOMAIN_LEN: usize = 63;

/// Error types for café operations.
#[derive(Debug, thiserror::Error)]
pub enum CafeError {
    /// No café matches the id or subdomain.
    #[error("Cafe not found: {0}")]
    NotFound(String),

    /// Name is blank.
    #[error("Cafe name is required")]
    EmptyName,

    /// Subdomain is not a lowercase DNS label.
    #[error("Invalid subdomain '{0}'")]
    InvalidSubdomain(String),

    /// Subdomain taken.
    #[error("Subdomain '{0}' is already in use")]
    DuplicateSubdomain(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a café.
#[derive(Debug, Clone)]
pub struct CreateCafeInput {
    /// Display name.
    pub name: String,
    /// Subdomain the café is reached under.
    pub subdomain: String,
}

/// Input for updating a café.
#[derive(Debug, Clone, Default)]
pub struct UpdateCafeInput {
    /// New name.
    pub name: Option<String>,
    /// New subdomain.
    pub subdomain: Option<String>,
    /// Enable or disable the café.
    pub active: Option<bool>,
}

/// Café repository.
#[derive(Debug, Clone)]
pub struct CafeRepository {
    db: DatabaseConnection,
}

impl CafeRepository {
    /// Creates a new café repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all cafés by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<cafes::Model>, CafeError> {
        Ok(cafes::Entity::find()
            .order_by_asc(cafes::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Finds a café by id.
    ///
    /// # Errors
    ///
    /// Returns `CafeError::NotFound` if no café has this id.
    pub async fn find(&self, id: CafeId) -> Result<cafes::Model, CafeError> {
        cafes::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| CafeError::NotFound(id.to_string()))
    }

    /// Finds a café by subdomain.
    ///
    /// # Errors
    ///
    /// Returns `CafeError::NotFound` if no café uses this subdomain.
    pub async fn find_by_subdomain(&self, subdomain: &str) -> Result<cafes::Model, CafeError> {
        cafes::Entity::find()
            .filter(cafes::Column::Subdomain.eq(subdomain.to_lowercase()))
            .one(&self.db)
            .await?
            .ok_or_else(|| CafeError::NotFound(subdomain.to_string()))
    }

    /// Resolves a tenant key that is either a café UUID or a subdomain.
    ///
    /// # Errors
    ///
    /// Returns `CafeError::NotFound` if nothing matches.
    pub async fn resolve(&self, key: &str) -> Result<cafes::Model, CafeError> {
        let key = key.trim();
        match key.parse::<CafeId>() {
            Ok(id) => self.find(id).await,
            Err(_) => self.find_by_subdomain(key).await,
        }
    }

    /// Creates an active café.
    ///
    /// # Errors
    ///
    /// Returns `CafeError::EmptyName`, `CafeError::InvalidSubdomain` or
    /// `CafeError::DuplicateSubdomain`.
    pub async fn create(&self, input: CreateCafeInput) -> Result<cafes::Model, CafeError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(CafeError::EmptyName);
        }
        let subdomain = normalize_subdomain(&input.subdomain)?;

        let now = chrono::Utc::now().into();
        let cafe = cafes::ActiveModel {
            id: Set(CafeId::new().into_inner()),
            name: Set(name),
            subdomain: Set(subdomain.clone()),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| map_write_error(e, &subdomain))?;

        info!(cafe_id = %cafe.id, subdomain = %cafe.subdomain, "Cafe created");
        Ok(cafe)
    }

    /// Updates a café.
    ///
    /// # Errors
    ///
    /// Returns `CafeError::NotFound` or a validation error.
    pub async fn update(
        &self,
        id: CafeId,
        input: UpdateCafeInput,
    ) -> Result<cafes::Model, CafeError> {
        let cafe = self.find(id).await?;
        let mut active: cafes::ActiveModel = cafe.into();

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(CafeError::EmptyName);
            }
            active.name = Set(name);
        }
        let mut subdomain = String::new();
        if let Some(raw) = input.subdomain {
            subdomain = normalize_subdomain(&raw)?;
            active.subdomain = Set(subdomain.clone());
        }
        if let Some(flag) = input.active {
            active.active = Set(flag);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        active
            .update(&self.db)
            .await
            .map_err(|e| map_write_error(e, &subdomain))
    }

    /// Deletes a café and everything it owns.
    ///
    /// # Errors
    ///
    /// Returns `CafeError::NotFound` if no café has this id.
    pub async fn delete(&self, id: CafeId) -> Result<(), CafeError> {
        let result = cafes::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(CafeError::NotFound(id.to_string()));
        }
        info!(cafe_id = %id, "Cafe deleted");
        Ok(())
    }
}

/// Lowercases and validates a subdomain label.
///
/// # Errors
///
/// Returns `CafeError::InvalidSubdomain` unless the label is 1 to 63 chars of
/// `[a-z0-9-]` not starting with a hyphen.
pub fn normalize_subdomain(raw: &str) -> Result<String, CafeError> {
    let subdomain = raw.trim().to_lowercase();
    let valid = !subdomain.is_empty()
        && subdomain.len() <= MAX_SUBDOMAIN_LEN
        && !subdomain.starts_with('-')
        && subdomain
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(subdomain)
    } else {
        Err(CafeError::InvalidSubdomain(raw.to_string()))
    }
}

fn map_write_error(e: DbErr, subdomain: &str) -> CafeError {
    if is_unique_violation(&e) {
        CafeError::DuplicateSubdomain(subdomain.to_string())
    } else {
        CafeError::Database(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("demo", "demo")]
    #[case("  Altia-Cafe ", "altia-cafe")]
    #[case("cafe42", "cafe42")]
    fn test_normalize_subdomain_accepts(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_subdomain(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("-demo")]
    #[case("demo.cafe")]
    #[case("café")]
    #[case("under_score")]
    fn test_normalize_subdomain_rejects(#[case] raw: &str) {
        assert!(matches!(
            normalize_subdomain(raw),
            Err(CafeError::InvalidSubdomain(_))
        ));
    }

    #[test]
    fn test_subdomain_length_limit() {
        assert!(normalize_subdomain(&"a".repeat(63)).is_ok());
        assert!(normalize_subdomain(&"a".repeat(64)).is_err());
    }
}

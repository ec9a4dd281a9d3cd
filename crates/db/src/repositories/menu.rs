//! Menu repository.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::info;

use cafedesk_core::money::fits_money_scale;
use cafedesk_shared::types::{CafeId, MenuItemId};

use crate::entities::menu_items;
use crate::rls::TenantTransaction;

/// Error types for menu operations.
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    /// Menu item not found.
    #[error("Menu item not found: {0}")]
    NotFound(MenuItemId),

    /// Name is blank.
    #[error("Menu item name is required")]
    EmptyName,

    /// Price below zero.
    #[error("Price cannot be negative, got {0}")]
    NegativePrice(Decimal),

    /// Price finer than cents.
    #[error("Price must have at most 2 decimal places, got {0}")]
    PriceTooPrecise(Decimal),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Filters for listing the menu.
#[derive(Debug, Clone, Default)]
pub struct MenuFilter {
    /// Only items of this category.
    pub category: Option<String>,
    /// Only available (or unavailable) items.
    pub available: Option<bool>,
}

/// Input for creating a menu item.
#[derive(Debug, Clone)]
pub struct CreateMenuItemInput {
    /// Item name.
    pub name: String,
    /// Category, e.g. "Coffee".
    pub category: String,
    /// Unit price.
    pub price: Decimal,
    /// Description.
    pub description: String,
    /// Whether it can be ordered.
    pub available: bool,
}

/// Input for updating a menu item.
#[derive(Debug, Clone, Default)]
pub struct UpdateMenuItemInput {
    /// New name.
    pub name: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New price.
    pub price: Option<Decimal>,
    /// New description.
    pub description: Option<String>,
    /// New availability.
    pub available: Option<bool>,
}

/// Menu repository.
#[derive(Debug, Clone)]
pub struct MenuRepository {
    db: DatabaseConnection,
}

impl MenuRepository {
    /// Creates a new menu repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists menu items ordered by category then name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        cafe_id: CafeId,
        filter: MenuFilter,
    ) -> Result<Vec<menu_items::Model>, MenuError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;

        let mut query =
            menu_items::Entity::find().filter(menu_items::Column::CafeId.eq(cafe_id.into_inner()));
        if let Some(category) = filter.category.filter(|c| !c.is_empty()) {
            query = query.filter(menu_items::Column::Category.eq(category));
        }
        if let Some(available) = filter.available {
            query = query.filter(menu_items::Column::Available.eq(available));
        }

        let items = query
            .order_by_asc(menu_items::Column::Category)
            .order_by_asc(menu_items::Column::Name)
            .all(txn.conn())
            .await?;
        txn.commit().await?;
        Ok(items)
    }

    /// Distinct categories in use, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn categories(&self, cafe_id: CafeId) -> Result<Vec<String>, MenuError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let categories = menu_items::Entity::find()
            .select_only()
            .column(menu_items::Column::Category)
            .distinct()
            .filter(menu_items::Column::CafeId.eq(cafe_id.into_inner()))
            .filter(menu_items::Column::Category.ne(""))
            .order_by_asc(menu_items::Column::Category)
            .into_tuple::<String>()
            .all(txn.conn())
            .await?;
        txn.commit().await?;
        Ok(categories)
    }

    /// Finds a menu item.
    ///
    /// # Errors
    ///
    /// Returns `MenuError::NotFound` if the item is not in the café.
    pub async fn find(
        &self,
        cafe_id: CafeId,
        id: MenuItemId,
    ) -> Result<menu_items::Model, MenuError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let item = menu_items::Entity::find_by_id(id.into_inner())
            .filter(menu_items::Column::CafeId.eq(cafe_id.into_inner()))
            .one(txn.conn())
            .await?
            .ok_or(MenuError::NotFound(id))?;
        txn.commit().await?;
        Ok(item)
    }

    /// Creates a menu item.
    ///
    /// # Errors
    ///
    /// Returns `MenuError::EmptyName`, `MenuError::NegativePrice` or
    /// `MenuError::PriceTooPrecise`.
    pub async fn create(
        &self,
        cafe_id: CafeId,
        input: CreateMenuItemInput,
    ) -> Result<menu_items::Model, MenuError> {
        let name = validate_name(&input.name)?;
        validate_price(input.price)?;

        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let now = chrono::Utc::now().into();
        let item = menu_items::ActiveModel {
            id: Set(MenuItemId::new().into_inner()),
            cafe_id: Set(cafe_id.into_inner()),
            name: Set(name),
            category: Set(input.category.trim().to_string()),
            price: Set(input.price),
            description: Set(input.description),
            available: Set(input.available),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn.conn())
        .await?;
        txn.commit().await?;

        info!(cafe_id = %cafe_id, menu_item_id = %item.id, name = %item.name, "Menu item created");
        Ok(item)
    }

    /// Updates a menu item.
    ///
    /// # Errors
    ///
    /// Returns `MenuError::NotFound`, `MenuError::EmptyName` or
    /// `MenuError::NegativePrice` or `MenuError::PriceTooPrecise`.
    pub async fn update(
        &self,
        cafe_id: CafeId,
        id: MenuItemId,
        input: UpdateMenuItemInput,
    ) -> Result<menu_items::Model, MenuError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let item = menu_items::Entity::find_by_id(id.into_inner())
            .filter(menu_items::Column::CafeId.eq(cafe_id.into_inner()))
            .one(txn.conn())
            .await?
            .ok_or(MenuError::NotFound(id))?;

        let mut active: menu_items::ActiveModel = item.into();
        if let Some(name) = input.name {
            active.name = Set(validate_name(&name)?);
        }
        if let Some(category) = input.category {
            active.category = Set(category.trim().to_string());
        }
        if let Some(price) = input.price {
            validate_price(price)?;
            active.price = Set(price);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(available) = input.available {
            active.available = Set(available);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let item = active.update(txn.conn()).await?;
        txn.commit().await?;
        Ok(item)
    }

    /// Deletes a menu item. Existing order items keep their copied name and price.
    ///
    /// # Errors
    ///
    /// Returns `MenuError::NotFound` if the item is not in the café.
    pub async fn delete(&self, cafe_id: CafeId, id: MenuItemId) -> Result<(), MenuError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let result = menu_items::Entity::delete_many()
            .filter(menu_items::Column::Id.eq(id.into_inner()))
            .filter(menu_items::Column::CafeId.eq(cafe_id.into_inner()))
            .exec(txn.conn())
            .await?;
        if result.rows_affected == 0 {
            return Err(MenuError::NotFound(id));
        }
        txn.commit().await?;

        info!(cafe_id = %cafe_id, menu_item_id = %id, "Menu item deleted");
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String, MenuError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MenuError::EmptyName);
    }
    Ok(name.to_string())
}

fn validate_price(price: Decimal) -> Result<(), MenuError> {
    if price < Decimal::ZERO {
        return Err(MenuError::NegativePrice(price));
    }
    if !fits_money_scale(price) {
        return Err(MenuError::PriceTooPrecise(price));
    }
    Ok(())
}

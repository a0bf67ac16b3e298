//! Product catalog - Validation, CRUD and the in-memory catalog snapshot.
//!
//! Invalid packaging sizes and rations are rejected here so that the calculator never sees
//! them. Edits never recompute months that were already submitted.

use crate::{
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::BTreeMap;

/// Fields required to create a product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    /// Display name
    pub name: String,
    /// Measurement unit
    pub unit: String,
    /// Quantity per person per meal
    pub ration: f64,
    /// Size of one packaging unit
    pub package_size: f64,
    /// Packaging label
    pub package_kind: String,
    /// Price per packaging unit
    pub unit_price: f64,
    /// Optional category label
    pub category: Option<String>,
}

/// Settable product fields. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    /// New display name
    pub name: Option<String>,
    /// New measurement unit
    pub unit: Option<String>,
    /// New ration
    pub ration: Option<f64>,
    /// New packaging size
    pub package_size: Option<f64>,
    /// New packaging label
    pub package_kind: Option<String>,
    /// New price
    pub unit_price: Option<f64>,
    /// New category; `Some(None)` clears it
    pub category: Option<Option<String>>,
}

/// Active products keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: BTreeMap<i64, product::Model>,
}

impl Catalog {
    /// Builds a catalog, leaving out soft-deleted products.
    pub fn new(products: impl IntoIterator<Item = product::Model>) -> Self {
        Self {
            products: products
                .into_iter()
                .filter(|p| !p.is_deleted)
                .map(|p| (p.id, p))
                .collect(),
        }
    }

    /// Looks up a product; `None` when unknown or deleted.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&product::Model> {
        self.products.get(&id)
    }

    /// Products in id order.
    pub fn iter(&self) -> impl Iterator<Item = &product::Model> {
        self.products.values()
    }

    /// Number of active products
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog holds no product
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

fn validate_text(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidProduct {
            field,
            value: format!("'{value}'"),
        });
    }
    Ok(())
}

fn validate_positive(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidProduct {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Checks every field of a product definition.
///
/// # Errors
/// Returns `InvalidProduct` for an empty name or unit, a ration or packaging size that is
/// zero, negative or not finite, or a negative or non-finite price.
pub fn validate_product(product: &NewProduct) -> Result<()> {
    validate_text("name", &product.name)?;
    validate_text("unit", &product.unit)?;
    validate_positive("ration", product.ration)?;
    validate_positive("package_size", product.package_size)?;
    if !product.unit_price.is_finite() || product.unit_price < 0.0 {
        return Err(Error::InvalidProduct {
            field: "unit_price",
            value: product.unit_price.to_string(),
        });
    }
    Ok(())
}

/// Retrieves all active (non-deleted) products, ordered alphabetically by name.
pub async fn get_all_active_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::IsDeleted.eq(false))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads the active catalog used by the computation engine.
pub async fn load_catalog(db: &DatabaseConnection) -> Result<Catalog> {
    Ok(Catalog::new(get_all_active_products(db).await?))
}

/// Finds a specific product by its name, returning None if not found or deleted.
pub async fn get_product_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<product::Model>> {
    Product::find()
        .filter(product::Column::Name.eq(name))
        .filter(product::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID, deleted or not.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new product after validation.
///
/// # Errors
/// Returns `InvalidProduct` when validation fails, or a database error.
pub async fn create_product(db: &DatabaseConnection, new: NewProduct) -> Result<product::Model> {
    validate_product(&new)?;

    let now = chrono::Utc::now().naive_utc();
    let product = product::ActiveModel {
        name: Set(new.name.trim().to_string()),
        unit: Set(new.unit.trim().to_string()),
        ration: Set(new.ration),
        package_size: Set(new.package_size),
        package_kind: Set(new.package_kind),
        unit_price: Set(new.unit_price),
        category: Set(new.category),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Applies a partial update; the merged product is validated as a whole.
///
/// # Errors
/// Returns `ProductNotFound` for unknown or deleted products and `InvalidProduct` when the
/// merged definition is invalid.
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    update: ProductUpdate,
) -> Result<product::Model> {
    let existing = Product::find_by_id(product_id)
        .one(db)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let merged = NewProduct {
        name: update.name.unwrap_or_else(|| existing.name.clone()),
        unit: update.unit.unwrap_or_else(|| existing.unit.clone()),
        ration: update.ration.unwrap_or(existing.ration),
        package_size: update.package_size.unwrap_or(existing.package_size),
        package_kind: update
            .package_kind
            .unwrap_or_else(|| existing.package_kind.clone()),
        unit_price: update.unit_price.unwrap_or(existing.unit_price),
        category: update.category.unwrap_or_else(|| existing.category.clone()),
    };
    validate_product(&merged)?;

    let mut product: product::ActiveModel = existing.into();
    product.name = Set(merged.name.trim().to_string());
    product.unit = Set(merged.unit.trim().to_string());
    product.ration = Set(merged.ration);
    product.package_size = Set(merged.package_size);
    product.package_kind = Set(merged.package_kind);
    product.unit_price = Set(merged.unit_price);
    product.category = Set(merged.category);
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    product.update(db).await.map_err(Into::into)
}

/// Soft deletes a product. Menu plans keep the id and aggregation skips it.
///
/// # Errors
/// Returns `ProductNotFound` if the product does not exist or is already deleted.
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let existing = Product::find_by_id(product_id)
        .one(db)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let mut product: product::ActiveModel = existing.into();
    product.is_deleted = Set(true);
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    product.update(db).await.map_err(Into::into)
}

/// Re-enables a soft-deleted product with a fresh definition.
pub(crate) async fn restore_product(
    db: &DatabaseConnection,
    existing: product::Model,
    definition: NewProduct,
) -> Result<product::Model> {
    validate_product(&definition)?;

    let mut product: product::ActiveModel = existing.into();
    product.unit = Set(definition.unit.trim().to_string());
    product.ration = Set(definition.ration);
    product.package_size = Set(definition.package_size);
    product.package_kind = Set(definition.package_kind);
    product.unit_price = Set(definition.unit_price);
    product.category = Set(definition.category);
    product.is_deleted = Set(false);
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    product.update(db).await.map_err(Into::into)
}

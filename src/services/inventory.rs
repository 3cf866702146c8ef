use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::entities::release_format;
use crate::errors::ServiceError;

/// Stock bookkeeping for release formats.
///
/// Decrements are expressed as one conditional UPDATE so that two
/// concurrent fulfillments can never drive a SKU below zero: the
/// database serializes the check and the write.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Attempts to decrement `qty` units of a SKU.
    ///
    /// Returns `true` when the decrement applied, `false` when the SKU
    /// does not exist or has insufficient stock (in which case nothing
    /// was written).
    #[instrument(skip(self))]
    pub async fn try_decrement_stock(
        &self,
        release_id: &str,
        sku: &str,
        qty: i32,
    ) -> Result<bool, ServiceError> {
        if qty < 1 {
            return Err(ServiceError::InvalidArgument(format!(
                "decrement quantity must be >= 1, got {qty}"
            )));
        }

        // stock = stock - qty WHERE ... AND stock >= qty
        let result = release_format::Entity::update_many()
            .col_expr(
                release_format::Column::Stock,
                Expr::col(release_format::Column::Stock).sub(qty),
            )
            .filter(release_format::Column::ReleaseId.eq(release_id))
            .filter(release_format::Column::Sku.eq(sku))
            .filter(release_format::Column::Stock.gte(qty))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            warn!(release_id, sku, qty, "stock decrement skipped (unknown sku or insufficient stock)");
        }
        Ok(result.rows_affected > 0)
    }

    /// Sets the absolute stock level of a SKU (admin operation).
    #[instrument(skip(self))]
    pub async fn set_stock(
        &self,
        release_id: &str,
        sku: &str,
        stock: i32,
    ) -> Result<(), ServiceError> {
        if stock < 0 {
            return Err(ServiceError::InvalidArgument(
                "stock must be a non-negative integer".to_string(),
            ));
        }

        let result = release_format::Entity::update_many()
            .col_expr(release_format::Column::Stock, Expr::value(stock))
            .filter(release_format::Column::ReleaseId.eq(release_id))
            .filter(release_format::Column::Sku.eq(sku))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "format {sku} of release {release_id} not found"
            )));
        }
        Ok(())
    }

    pub async fn get_format(
        &self,
        release_id: &str,
        sku: &str,
    ) -> Result<Option<release_format::Model>, ServiceError> {
        Ok(release_format::Entity::find()
            .filter(release_format::Column::ReleaseId.eq(release_id))
            .filter(release_format::Column::Sku.eq(sku))
            .one(&*self.db)
            .await?)
    }
}

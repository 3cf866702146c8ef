use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{order, order_item};
use crate::errors::ServiceError;

/// Read side of orders. Orders are only ever created by the payment
/// reconciler; this service serves buyer history and admin review.
pub struct OrderService {
    db: Arc<DatabaseConnection>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<order::Model>, ServiceError> {
        Ok(order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    pub async fn list_all(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<order::Model>, u64), ServiceError> {
        let paginator = order::Entity::find()
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db, per_page.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Fetches one order with its lines. `requester_uid` must own the
    /// order unless the requester is an admin.
    pub async fn get_order(
        &self,
        order_id: Uuid,
        requester_uid: &str,
        requester_is_admin: bool,
    ) -> Result<(order::Model, Vec<order_item::Model>), ServiceError> {
        let found = order::Entity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order {order_id} not found")))?;

        if !requester_is_admin && found.user_id != requester_uid {
            return Err(ServiceError::PermissionDenied(
                "order belongs to another account".to_string(),
            ));
        }

        let lines = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(&*self.db)
            .await?;

        Ok((found, lines))
    }
}

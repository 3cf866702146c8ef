use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::{contact_message, merch_item, release, release_format};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Validated admin mutations and public reads over the catalog
/// collections: releases (+ formats), merch, contact messages.
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct FormatInput {
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    /// One of `vinyl`, `cd`, `cassette`
    pub format_type: String,
    pub variant: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub stripe_price_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReleaseInput {
    /// Slug identifier, unique within the collection
    #[validate(length(min = 1, max = 100))]
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub artist_id: String,
    pub label_id: Option<String>,
    pub catalog_number: Option<String>,
    pub barcode: Option<String>,
    pub release_date: Option<String>,
    #[validate(url)]
    pub cover_url: Option<String>,
    pub description: Option<String>,
    #[validate]
    pub formats: Vec<FormatInput>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateReleaseInput {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub label_id: Option<String>,
    pub catalog_number: Option<String>,
    pub barcode: Option<String>,
    pub release_date: Option<String>,
    #[validate(url)]
    pub cover_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMerchInput {
    #[validate(length(min = 1, max = 100))]
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    #[validate(url)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateMerchInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    #[validate(url)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitContactMessageInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 200))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
}

fn validate_format(input: &FormatInput) -> Result<release_format::FormatType, ServiceError> {
    if input.price < Decimal::ZERO {
        return Err(ServiceError::InvalidArgument(format!(
            "format {}: price must not be negative",
            input.sku
        )));
    }
    if input.stock < 0 {
        return Err(ServiceError::InvalidArgument(format!(
            "format {}: stock must be a non-negative integer",
            input.sku
        )));
    }
    release_format::FormatType::from_str(&input.format_type)
        .map_err(ServiceError::InvalidArgument)
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    // ---- Releases ----

    #[instrument(skip(self, input), fields(release_id = %input.id))]
    pub async fn create_release(
        &self,
        input: CreateReleaseInput,
    ) -> Result<release::Model, ServiceError> {
        input.validate()?;

        let mut seen = HashSet::new();
        for format in &input.formats {
            validate_format(format)?;
            if !seen.insert(format.sku.clone()) {
                return Err(ServiceError::InvalidArgument(format!(
                    "duplicate sku {} within release",
                    format.sku
                )));
            }
        }

        if release::Entity::find_by_id(&input.id)
            .one(&*self.db)
            .await?
            .is_some()
        {
            return Err(ServiceError::AlreadyExists(format!(
                "release slug {} is taken",
                input.id
            )));
        }

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let model = release::ActiveModel {
            id: Set(input.id.clone()),
            title: Set(input.title),
            artist_id: Set(input.artist_id),
            label_id: Set(input.label_id),
            catalog_number: Set(input.catalog_number),
            barcode: Set(input.barcode),
            release_date: Set(input.release_date),
            cover_url: Set(input.cover_url),
            mbid: Set(None),
            country: Set(None),
            description: Set(input.description),
            is_archived: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model.insert(&txn).await?;

        for format in input.formats {
            let format_type = validate_format(&format)?;
            release_format::ActiveModel {
                id: Set(Uuid::new_v4()),
                release_id: Set(input.id.clone()),
                sku: Set(format.sku),
                format_type: Set(format_type),
                variant: Set(format.variant),
                price: Set(format.price),
                stock: Set(format.stock),
                stripe_price_id: Set(format.stripe_price_id),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        info!("release created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_release(
        &self,
        release_id: &str,
        input: UpdateReleaseInput,
    ) -> Result<release::Model, ServiceError> {
        input.validate()?;

        let existing = release::Entity::find_by_id(release_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("release {release_id} not found")))?;

        let mut model: release::ActiveModel = existing.into();
        if let Some(title) = input.title {
            model.title = Set(title);
        }
        if let Some(label_id) = input.label_id {
            model.label_id = Set(Some(label_id));
        }
        if let Some(catalog_number) = input.catalog_number {
            model.catalog_number = Set(Some(catalog_number));
        }
        if let Some(barcode) = input.barcode {
            model.barcode = Set(Some(barcode));
        }
        if let Some(release_date) = input.release_date {
            model.release_date = Set(Some(release_date));
        }
        if let Some(cover_url) = input.cover_url {
            model.cover_url = Set(Some(cover_url));
        }
        if let Some(description) = input.description {
            model.description = Set(Some(description));
        }
        model.updated_at = Set(Utc::now());

        Ok(model.update(&*self.db).await?)
    }

    /// Creates or updates one format of a release, keyed by SKU.
    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn upsert_format(
        &self,
        release_id: &str,
        input: FormatInput,
    ) -> Result<release_format::Model, ServiceError> {
        input.validate()?;
        let format_type = validate_format(&input)?;

        release::Entity::find_by_id(release_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("release {release_id} not found")))?;

        let existing = release_format::Entity::find()
            .filter(release_format::Column::ReleaseId.eq(release_id))
            .filter(release_format::Column::Sku.eq(&input.sku))
            .one(&*self.db)
            .await?;

        let model = match existing {
            Some(found) => {
                let mut model: release_format::ActiveModel = found.into();
                model.format_type = Set(format_type);
                model.variant = Set(input.variant);
                model.price = Set(input.price);
                model.stock = Set(input.stock);
                model.stripe_price_id = Set(input.stripe_price_id);
                model.update(&*self.db).await?
            }
            None => {
                release_format::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    release_id: Set(release_id.to_string()),
                    sku: Set(input.sku),
                    format_type: Set(format_type),
                    variant: Set(input.variant),
                    price: Set(input.price),
                    stock: Set(input.stock),
                    stripe_price_id: Set(input.stripe_price_id),
                }
                .insert(&*self.db)
                .await?
            }
        };
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn archive_release(&self, release_id: &str) -> Result<(), ServiceError> {
        let existing = release::Entity::find_by_id(release_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("release {release_id} not found")))?;

        let mut model: release::ActiveModel = existing.into();
        model.is_archived = Set(true);
        model.updated_at = Set(Utc::now());
        model.update(&*self.db).await?;
        Ok(())
    }

    pub async fn get_release(
        &self,
        release_id: &str,
    ) -> Result<(release::Model, Vec<release_format::Model>), ServiceError> {
        let found = release::Entity::find_by_id(release_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("release {release_id} not found")))?;

        let formats = release_format::Entity::find()
            .filter(release_format::Column::ReleaseId.eq(release_id))
            .order_by_asc(release_format::Column::Sku)
            .all(&*self.db)
            .await?;

        Ok((found, formats))
    }

    /// Public list: archived releases are hidden.
    pub async fn list_releases(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<release::Model>, u64), ServiceError> {
        let paginator = release::Entity::find()
            .filter(release::Column::IsArchived.eq(false))
            .order_by_asc(release::Column::Id)
            .paginate(&*self.db, per_page.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    // ---- Merch ----

    #[instrument(skip(self, input), fields(merch_id = %input.id))]
    pub async fn create_merch(
        &self,
        input: CreateMerchInput,
    ) -> Result<merch_item::Model, ServiceError> {
        input.validate()?;
        if input.price < Decimal::ZERO {
            return Err(ServiceError::InvalidArgument(
                "price must not be negative".to_string(),
            ));
        }
        if input.stock < 0 {
            return Err(ServiceError::InvalidArgument(
                "stock must be a non-negative integer".to_string(),
            ));
        }

        if merch_item::Entity::find_by_id(&input.id)
            .one(&*self.db)
            .await?
            .is_some()
        {
            return Err(ServiceError::AlreadyExists(format!(
                "merch slug {} is taken",
                input.id
            )));
        }

        let now = Utc::now();
        let model = merch_item::ActiveModel {
            id: Set(input.id),
            name: Set(input.name),
            price: Set(input.price),
            stock: Set(input.stock),
            image_url: Set(input.image_url),
            is_archived: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&*self.db).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn update_merch(
        &self,
        merch_id: &str,
        input: UpdateMerchInput,
    ) -> Result<merch_item::Model, ServiceError> {
        input.validate()?;
        if matches!(input.price, Some(p) if p < Decimal::ZERO) {
            return Err(ServiceError::InvalidArgument(
                "price must not be negative".to_string(),
            ));
        }
        if matches!(input.stock, Some(s) if s < 0) {
            return Err(ServiceError::InvalidArgument(
                "stock must be a non-negative integer".to_string(),
            ));
        }

        let existing = merch_item::Entity::find_by_id(merch_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("merch {merch_id} not found")))?;

        let mut model: merch_item::ActiveModel = existing.into();
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(price) = input.price {
            model.price = Set(price);
        }
        if let Some(stock) = input.stock {
            model.stock = Set(stock);
        }
        if let Some(image_url) = input.image_url {
            model.image_url = Set(Some(image_url));
        }
        model.updated_at = Set(Utc::now());
        Ok(model.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn archive_merch(&self, merch_id: &str) -> Result<(), ServiceError> {
        let existing = merch_item::Entity::find_by_id(merch_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("merch {merch_id} not found")))?;

        let mut model: merch_item::ActiveModel = existing.into();
        model.is_archived = Set(true);
        model.updated_at = Set(Utc::now());
        model.update(&*self.db).await?;
        Ok(())
    }

    // ---- Contact messages ----

    #[instrument(skip(self, input))]
    pub async fn submit_contact_message(
        &self,
        input: SubmitContactMessageInput,
    ) -> Result<contact_message::Model, ServiceError> {
        input.validate()?;

        let model = contact_message::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            email: Set(input.email),
            subject: Set(input.subject),
            body: Set(input.body),
            is_read: Set(false),
            created_at: Set(Utc::now()),
        };
        let created = model.insert(&*self.db).await?;

        self.event_sender
            .send(Event::ContactMessageReceived {
                message_id: created.id,
            })
            .await;
        Ok(created)
    }

    pub async fn list_contact_messages(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<contact_message::Model>, u64), ServiceError> {
        let paginator = contact_message::Entity::find()
            .order_by_desc(contact_message::Column::CreatedAt)
            .paginate(&*self.db, per_page.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    #[instrument(skip(self))]
    pub async fn mark_contact_message_read(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = contact_message::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("contact message {id} not found")))?;

        let mut model: contact_message::ActiveModel = existing.into();
        model.is_read = Set(true);
        model.update(&*self.db).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_contact_message(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = contact_message::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "contact message {id} not found"
            )));
        }
        Ok(())
    }
}

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A catalog entry for one musical work, purchasable through one or more
/// formats (see [`super::release_format`]).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "releases")]
pub struct Model {
    /// Slug identifier, e.g. `blasphemous-death-ritual`
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub artist_id: String,
    #[sea_orm(nullable)]
    pub label_id: Option<String>,
    #[sea_orm(nullable)]
    pub catalog_number: Option<String>,
    #[sea_orm(nullable)]
    pub barcode: Option<String>,
    #[sea_orm(nullable)]
    pub release_date: Option<String>,
    #[sea_orm(nullable)]
    pub cover_url: Option<String>,
    /// MusicBrainz release id, filled by the enrichment proxy
    #[sea_orm(nullable)]
    pub mbid: Option<String>,
    #[sea_orm(nullable)]
    pub country: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::artist::Entity",
        from = "Column::ArtistId",
        to = "super::artist::Column::Id"
    )]
    Artist,
    #[sea_orm(
        belongs_to = "super::label::Entity",
        from = "Column::LabelId",
        to = "super::label::Column::Id"
    )]
    Label,
    #[sea_orm(has_many = "super::release_format::Entity")]
    Formats,
}

impl Related<super::artist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Artist.def()
    }
}

impl Related<super::label::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Label.def()
    }
}

impl Related<super::release_format::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Formats.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

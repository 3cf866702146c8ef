use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One purchasable variant of a release, identified by its SKU.
///
/// `stock` is the oversell guard: it is only ever decremented through a
/// single conditional UPDATE (`stock >= qty`), never via read-then-write.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "release_formats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub release_id: String,
    /// Unique within the release (enforced by index)
    pub sku: String,
    pub format_type: FormatType,
    #[sea_orm(nullable)]
    pub variant: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub price: Decimal,
    pub stock: i32,
    /// Gateway price reference; required for a format to be checkout-able
    #[sea_orm(nullable)]
    pub stripe_price_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::release::Entity",
        from = "Column::ReleaseId",
        to = "super::release::Column::Id"
    )]
    Release,
}

impl Related<super::release::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Release.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    #[sea_orm(string_value = "vinyl")]
    Vinyl,
    #[sea_orm(string_value = "cd")]
    Cd,
    #[sea_orm(string_value = "cassette")]
    Cassette,
}

impl std::str::FromStr for FormatType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vinyl" => Ok(Self::Vinyl),
            "cd" => Ok(Self::Cd),
            "cassette" => Ok(Self::Cassette),
            other => Err(format!("unknown format type: {other}")),
        }
    }
}

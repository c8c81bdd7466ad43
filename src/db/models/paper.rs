//! Paper entity
//!
//! One fetched literature record. Titles are the dedup key used by the
//! fetcher but are deliberately not unique at the schema level; callers
//! pre-check with `find_paper_by_title` before inserting.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "papers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    /// May hold the "No abstract available" placeholder when the source
    /// article carried no abstract.
    #[sea_orm(column_name = "abstract", column_type = "Text")]
    pub abstract_text: String,

    /// Author extraction is unimplemented upstream; rows carry the
    /// literal "Authors not implemented" placeholder.
    #[sea_orm(column_type = "Text")]
    pub authors: String,

    #[sea_orm(column_type = "Text")]
    pub url: String,

    pub fetch_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::paper_summary::Entity")]
    Summary,
}

impl Related<super::paper_summary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Summary.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

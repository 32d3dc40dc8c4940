use sea_orm::entity::prelude::*;

use crate::status::Status;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "saved_list")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub public_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: Status,
    pub fixed: bool,
    pub global: bool,
    /// Comma separated ids of watching users.
    pub watcher_ids: Option<String>,
    pub displayed_fields_long: Option<String>,
    pub displayed_fields_short: Option<String>,
    #[sea_orm(indexed)]
    pub job_id: Option<i64>,
    pub registered_job: bool,
    pub tbb_short_name: Option<String>,
    pub published_doc_link: Option<String>,
    pub folderlink: Option<String>,
    pub folderjdlink: Option<String>,
    pub file_jd_name: Option<String>,
    pub file_jd_link: Option<String>,
    /// Set only for selection lists: the search whose results this list records.
    #[sea_orm(indexed)]
    pub saved_search_id: Option<i64>,
    pub saved_search_source_id: Option<i64>,
    #[sea_orm(indexed)]
    pub created_by: i64,
    pub created_date: DateTimeWithTimeZone,
    pub updated_by: Option<i64>,
    pub updated_date: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Owner,
    #[sea_orm(
        belongs_to = "super::salesforce_job_opp::Entity",
        from = "Column::JobId",
        to = "super::salesforce_job_opp::Column::Id",
        on_delete = "SetNull"
    )]
    JobOpp,
    #[sea_orm(has_many = "super::export_column::Entity")]
    ExportColumn,
    #[sea_orm(has_many = "super::saved_list_user::Entity")]
    SavedListUser,
}

impl Related<super::salesforce_job_opp::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobOpp.def()
    }
}

impl Related<super::export_column::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExportColumn.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        super::saved_list_user::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::saved_list_user::Relation::SavedList.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

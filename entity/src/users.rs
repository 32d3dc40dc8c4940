use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::status::Status;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
    pub status: Status,
    pub created_date: DateTimeWithTimeZone,
}

impl Model {
    /// First and last name joined by a space, or whichever one is present.
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().map(str::trim).unwrap_or("");
        let last = self.last_name.as_deref().map(str::trim).unwrap_or("");
        match (first.is_empty(), last.is_empty()) {
            (false, false) => format!(
                "{} {}",
                self.first_name.as_deref().unwrap_or_default(),
                self.last_name.as_deref().unwrap_or_default()
            ),
            (false, true) => self.first_name.clone().unwrap_or_default(),
            (true, false) => self.last_name.clone().unwrap_or_default(),
            (true, true) => String::new(),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::saved_list_user::Entity")]
    SavedListUser,
    #[sea_orm(has_many = "super::saved_search_user::Entity")]
    SavedSearchUser,
    #[sea_orm(has_one = "super::candidate::Entity")]
    Candidate,
}

impl Related<super::saved_list::Entity> for Entity {
    fn to() -> RelationDef {
        super::saved_list_user::Relation::SavedList.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::saved_list_user::Relation::User.def().rev())
    }
}

impl Related<super::saved_search::Entity> for Entity {
    fn to() -> RelationDef {
        super::saved_search_user::Relation::SavedSearch.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::saved_search_user::Relation::User.def().rev())
    }
}

impl Related<super::candidate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Candidate.def()
    }
}

#[derive(
    Copy, Clone, Debug, Default, EnumIter, DeriveActiveEnum, Eq, PartialEq, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "systemadmin")]
    Systemadmin,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "partneradmin")]
    Partneradmin,
    #[sea_orm(string_value = "semilimited")]
    Semilimited,
    #[sea_orm(string_value = "limited")]
    Limited,
    #[default]
    #[sea_orm(string_value = "user")]
    User,
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per registered person. Rows are never deleted; see [`CandidateStatus::Deleted`].
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "candidate")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub candidate_number: String,
    #[sea_orm(indexed)]
    pub user_id: i64,
    pub status: CandidateStatus,
    pub gender: Option<Gender>,
    pub dob: Option<Date>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub nationality: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub address1: Option<String>,
    pub additional_info: Option<String>,
    pub candidate_message: Option<String>,
    pub linked_in_link: Option<String>,
    pub shareable_cv_attachment_id: Option<i64>,
    pub shareable_doc_attachment_id: Option<i64>,

    // Intake
    pub avail_immediate: Option<YesNo>,
    pub avail_immediate_notes: Option<String>,
    pub family_move: Option<YesNo>,
    pub family_move_notes: Option<String>,
    pub int_recruit_reasons: Option<String>,
    pub left_home_reasons: Option<String>,
    pub home_location: Option<String>,
    pub residence_status: Option<String>,
    pub work_abroad: Option<YesNo>,
    pub work_abroad_notes: Option<String>,
    pub host_entry_year: Option<i32>,
    pub unhcr_status: Option<String>,
    pub unhcr_number: Option<String>,
    pub ielts_score: Option<String>,
    pub marital_status: Option<String>,
    pub number_dependants: Option<i32>,
    pub conflict: Option<YesNo>,
    pub conflict_notes: Option<String>,
    pub crime_convict: Option<YesNo>,
    pub crime_convict_notes: Option<String>,
    pub visa_reject: Option<YesNo>,
    pub visa_reject_notes: Option<String>,
    pub driving_license: Option<String>,
    pub mini_intake_completed_date: Option<DateTimeWithTimeZone>,
    pub full_intake_completed_date: Option<DateTimeWithTimeZone>,

    pub created_date: DateTimeWithTimeZone,
    pub updated_date: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::candidate_attachment::Entity")]
    Attachment,
    #[sea_orm(has_many = "super::candidate_note::Entity")]
    Note,
    #[sea_orm(has_many = "super::candidate_property::Entity")]
    Property,
    #[sea_orm(has_many = "super::candidate_opportunity::Entity")]
    Opportunity,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::candidate_attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachment.def()
    }
}

impl Related<super::candidate_note::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Note.def()
    }
}

impl Related<super::candidate_property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl Related<super::candidate_opportunity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Opportunity.def()
    }
}

#[derive(
    Copy, Clone, Debug, Default, EnumIter, DeriveActiveEnum, Eq, PartialEq, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "camelCase")]
pub enum CandidateStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "autonomousEmployment")]
    AutonomousEmployment,
    #[sea_orm(string_value = "deleted")]
    Deleted,
    #[default]
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "employed")]
    Employed,
    #[sea_orm(string_value = "incomplete")]
    Incomplete,
    #[sea_orm(string_value = "ineligible")]
    Ineligible,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "unreachable")]
    Unreachable,
    #[sea_orm(string_value = "withdrawn")]
    Withdrawn,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[sea_orm(string_value = "male")]
    Male,
    #[sea_orm(string_value = "female")]
    Female,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(8))")]
pub enum YesNo {
    #[sea_orm(string_value = "Yes")]
    Yes,
    #[sea_orm(string_value = "No")]
    No,
}

impl ActiveModelBehavior for ActiveModel {}

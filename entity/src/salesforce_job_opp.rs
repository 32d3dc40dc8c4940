use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Job opportunity mirrored from the CRM.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "salesforce_job_opp")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub sf_id: Option<String>,
    pub name: String,
    pub account_id: Option<String>,
    pub employer: Option<String>,
    pub country: Option<String>,
    pub description: Option<String>,
    pub stage: Stage,
    pub stage_order: i32,
    pub closed: bool,
    pub won: bool,
    pub next_step: Option<String>,
    pub next_step_due_date: Option<Date>,
    pub closing_comments: Option<String>,
    pub evergreen: bool,
    pub submission_due_date: Option<Date>,
    pub submission_list_id: Option<i64>,
    pub suggested_list_id: Option<i64>,
    pub exclusion_list_id: Option<i64>,
    pub hiring_commitment: Option<i64>,
    pub created_date: DateTimeWithTimeZone,
    pub updated_date: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::candidate_opportunity::Entity")]
    CandidateOpportunity,
}

impl Related<super::candidate_opportunity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CandidateOpportunity.def()
    }
}

/// Stages of a job opportunity, in pipeline order.
#[derive(
    Copy,
    Clone,
    Debug,
    EnumIter,
    DeriveActiveEnum,
    Eq,
    PartialEq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(64))")]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    #[sea_orm(string_value = "prospect")]
    Prospect,
    #[sea_orm(string_value = "briefing")]
    Briefing,
    #[sea_orm(string_value = "pitching")]
    Pitching,
    #[sea_orm(string_value = "mou")]
    Mou,
    #[sea_orm(string_value = "mouIssue")]
    MouIssue,
    #[sea_orm(string_value = "identifyingRoles")]
    IdentifyingRoles,
    #[sea_orm(string_value = "candidateSearch")]
    CandidateSearch,
    #[sea_orm(string_value = "visaEligibility")]
    VisaEligibility,
    #[sea_orm(string_value = "cvPreparation")]
    CvPreparation,
    #[sea_orm(string_value = "cvReview")]
    CvReview,
    #[sea_orm(string_value = "recruitmentProcess")]
    RecruitmentProcess,
    #[sea_orm(string_value = "jobOffer")]
    JobOffer,
    #[sea_orm(string_value = "visaPreparation")]
    VisaPreparation,
    #[sea_orm(string_value = "postHireEngagement")]
    PostHireEngagement,
    #[sea_orm(string_value = "hiringCompleted")]
    HiringCompleted,
    #[sea_orm(string_value = "ineligibleEmployer")]
    IneligibleEmployer,
    #[sea_orm(string_value = "ineligibleOccupation")]
    IneligibleOccupation,
    #[sea_orm(string_value = "ineligibleRegion")]
    IneligibleRegion,
    #[sea_orm(string_value = "noInterest")]
    NoInterest,
    #[sea_orm(string_value = "noJobOffer")]
    NoJobOffer,
    #[sea_orm(string_value = "noPrPathway")]
    NoPrPathway,
    #[sea_orm(string_value = "noSuitableCandidates")]
    NoSuitableCandidates,
    #[sea_orm(string_value = "noVisa")]
    NoVisa,
    #[sea_orm(string_value = "tooExpensive")]
    TooExpensive,
    #[sea_orm(string_value = "tooHighWage")]
    TooHighWage,
    #[sea_orm(string_value = "tooLong")]
    TooLong,
}

impl ActiveModelBehavior for ActiveModel {}

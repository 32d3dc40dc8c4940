use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A candidate's progress through one job opportunity, mirrored from the CRM.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "candidate_opportunity")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub sf_id: Option<String>,
    pub name: Option<String>,
    #[sea_orm(indexed)]
    pub candidate_id: i64,
    #[sea_orm(indexed)]
    pub job_opp_id: Option<i64>,
    pub stage: Stage,
    pub last_active_stage: Option<Stage>,
    pub stage_order: i32,
    pub closed: bool,
    pub won: bool,
    pub next_step: Option<String>,
    pub next_step_due_date: Option<Date>,
    pub closing_comments: Option<String>,
    pub closing_comments_for_candidate: Option<String>,
    pub employer_feedback: Option<String>,
    pub created_date: DateTimeWithTimeZone,
    pub updated_date: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::candidate::Entity",
        from = "Column::CandidateId",
        to = "super::candidate::Column::Id",
        on_delete = "Cascade"
    )]
    Candidate,
    #[sea_orm(
        belongs_to = "super::salesforce_job_opp::Entity",
        from = "Column::JobOppId",
        to = "super::salesforce_job_opp::Column::Id",
        on_delete = "SetNull"
    )]
    JobOpp,
}

impl Related<super::candidate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Candidate.def()
    }
}

impl Related<super::salesforce_job_opp::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobOpp.def()
    }
}

/// Stages of a candidate opportunity, in pipeline order.
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
    #[sea_orm(string_value = "miniIntake")]
    MiniIntake,
    #[sea_orm(string_value = "fullIntake")]
    FullIntake,
    #[sea_orm(string_value = "visaEligibility")]
    VisaEligibility,
    #[sea_orm(string_value = "cvPreparation")]
    CvPreparation,
    #[sea_orm(string_value = "cvReview")]
    CvReview,
    #[sea_orm(string_value = "oneWayPreparation")]
    OneWayPreparation,
    #[sea_orm(string_value = "oneWayReview")]
    OneWayReview,
    #[sea_orm(string_value = "testPreparation")]
    TestPreparation,
    #[sea_orm(string_value = "testing")]
    Testing,
    #[sea_orm(string_value = "twoWayPreparation")]
    TwoWayPreparation,
    #[sea_orm(string_value = "twoWayReview")]
    TwoWayReview,
    #[sea_orm(string_value = "offer")]
    Offer,
    #[sea_orm(string_value = "acceptance")]
    Acceptance,
    #[sea_orm(string_value = "provincialVisaPreparation")]
    ProvincialVisaPreparation,
    #[sea_orm(string_value = "provincialVisaProcessing")]
    ProvincialVisaProcessing,
    #[sea_orm(string_value = "visaPreparation")]
    VisaPreparation,
    #[sea_orm(string_value = "visaProcessing")]
    VisaProcessing,
    #[sea_orm(string_value = "relocating")]
    Relocating,
    #[sea_orm(string_value = "relocated")]
    Relocated,
    #[sea_orm(string_value = "settled")]
    Settled,
    #[sea_orm(string_value = "durableSolution")]
    DurableSolution,
    #[sea_orm(string_value = "noJobOffer")]
    NoJobOffer,
    #[sea_orm(string_value = "noVisa")]
    NoVisa,
    #[sea_orm(string_value = "notFitForRole")]
    NotFitForRole,
    #[sea_orm(string_value = "notEligibleForTC")]
    #[serde(rename = "notEligibleForTC")]
    NotEligibleForTc,
    #[sea_orm(string_value = "notEligibleForVisa")]
    NotEligibleForVisa,
    #[sea_orm(string_value = "noInterview")]
    NoInterview,
    #[sea_orm(string_value = "candidateLeavesDestination")]
    CandidateLeavesDestination,
    #[sea_orm(string_value = "candidateRejectsOffer")]
    CandidateRejectsOffer,
    #[sea_orm(string_value = "candidateWithdraws")]
    CandidateWithdraws,
    #[sea_orm(string_value = "candidateMistakenProspect")]
    CandidateMistakenProspect,
    #[sea_orm(string_value = "jobIneligible")]
    JobIneligible,
    #[sea_orm(string_value = "jobWithdrawn")]
    JobWithdrawn,
    #[sea_orm(string_value = "relocatedNoJobOfferPathway")]
    RelocatedNoJobOfferPathway,
}

impl ActiveModelBehavior for ActiveModel {}

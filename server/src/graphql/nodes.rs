use async_graphql::{Json, SimpleObject};
use chrono::NaiveDate;
use entity::candidate_opportunity::Stage as CandidateStage;
use entity::salesforce_job_opp::Stage as JobStage;
use entity::{candidate, candidate_opportunity, salesforce_job_opp, saved_list, saved_search};
use platform_api::internal_error;
use products_talent::source::{ExportColumnDef, SourceCommon};
use products_talent::stage::{CandidateStageExt, is_recruiting};
use products_talent::{CandidateSource, OpportunityStage, SavedList, SavedSearch};
use sea_orm::ActiveEnum;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value;

use super::talent_error;

#[derive(Clone, Debug, SimpleObject)]
pub struct StageNode {
    /// Stored value, also accepted as mutation input.
    pub value: String,
    /// CRM stage name.
    pub label: String,
    pub ordinal: i32,
    pub closed: bool,
    pub won: bool,
    /// Only set for candidate stages.
    pub employed: Option<bool>,
}

impl StageNode {
    pub fn of<S>(stage: S) -> Self
    where
        S: OpportunityStage + ActiveEnum<Value = String>,
    {
        Self {
            value: stage.to_value(),
            label: stage.salesforce_stage_name().to_string(),
            ordinal: stage.ordinal(),
            closed: stage.is_closed(),
            won: stage.is_won(),
            employed: None,
        }
    }

    pub fn candidate(stage: CandidateStage) -> Self {
        Self {
            employed: Some(stage.is_employed()),
            ..Self::of(stage)
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct ExportColumnNode {
    pub key: String,
    pub index: i32,
    pub properties: Option<Json<Value>>,
}

impl From<ExportColumnDef> for ExportColumnNode {
    fn from(column: ExportColumnDef) -> Self {
        Self {
            key: column.key,
            index: column.index,
            properties: column.properties.map(Json),
        }
    }
}

/// Columns every candidate source carries.
struct SourceFields {
    id: i64,
    public_id: String,
    name: String,
    description: Option<String>,
    status: String,
    fixed: bool,
    global: bool,
    created_by: i64,
    job_id: Option<i64>,
    users: Vec<i64>,
    watcher_user_ids: Vec<i64>,
    displayed_fields_long: Vec<String>,
    displayed_fields_short: Vec<String>,
    export_columns: Vec<ExportColumnNode>,
}

impl SourceFields {
    fn read(common: &SourceCommon) -> async_graphql::Result<Self> {
        let watchers = common.watcher_user_ids().map_err(talent_error)?;
        Ok(Self {
            id: common.id,
            public_id: common.public_id.clone(),
            name: common.name.clone(),
            description: common.description.clone(),
            status: common.status.to_value(),
            fixed: common.is_fixed(),
            global: common.is_global(),
            created_by: common.created_by,
            job_id: common.job_id,
            users: common.users().iter().copied().collect(),
            watcher_user_ids: watchers.into_iter().collect(),
            displayed_fields_long: common.displayed_fields_long.clone(),
            displayed_fields_short: common.displayed_fields_short.clone(),
            export_columns: common
                .export_columns()
                .iter()
                .cloned()
                .map(ExportColumnNode::from)
                .collect(),
        })
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct SavedListNode {
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub fixed: bool,
    pub global: bool,
    pub created_by: i64,
    pub job_id: Option<i64>,
    pub users: Vec<i64>,
    pub watcher_user_ids: Vec<i64>,
    pub displayed_fields_long: Vec<String>,
    pub displayed_fields_short: Vec<String>,
    pub export_columns: Vec<ExportColumnNode>,
    pub registered_job: bool,
    pub tbb_short_name: Option<String>,
    pub published_doc_link: Option<String>,
    pub file_jd_name: Option<String>,
    pub file_jd_link: Option<String>,
    pub saved_search_id: Option<i64>,
    pub saved_search_source_id: Option<i64>,
    pub selection_list: bool,
    pub sf_job_stage: Option<StageNode>,
    pub sf_opp_is_closed: bool,
}

impl SavedListNode {
    pub fn build(list: &SavedList) -> async_graphql::Result<Self> {
        let fields = SourceFields::read(list.common())?;
        Ok(Self {
            id: fields.id,
            public_id: fields.public_id,
            name: fields.name,
            description: fields.description,
            status: fields.status,
            fixed: fields.fixed,
            global: fields.global,
            created_by: fields.created_by,
            job_id: fields.job_id,
            users: fields.users,
            watcher_user_ids: fields.watcher_user_ids,
            displayed_fields_long: fields.displayed_fields_long,
            displayed_fields_short: fields.displayed_fields_short,
            export_columns: fields.export_columns,
            registered_job: list.is_registered_job(),
            tbb_short_name: list.tbb_short_name.clone(),
            published_doc_link: list.published_doc_link.clone(),
            file_jd_name: list.file_jd_name.clone(),
            file_jd_link: list.file_jd_link.clone(),
            saved_search_id: list.saved_search_id,
            saved_search_source_id: list.saved_search_source_id,
            selection_list: list.is_selection_list(),
            sf_job_stage: list.sf_job_stage().map(StageNode::of::<JobStage>),
            sf_opp_is_closed: list.sf_opp_is_closed(),
        })
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct SavedSearchNode {
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub fixed: bool,
    pub global: bool,
    pub created_by: i64,
    pub job_id: Option<i64>,
    pub users: Vec<i64>,
    pub watcher_user_ids: Vec<i64>,
    pub displayed_fields_long: Vec<String>,
    pub displayed_fields_short: Vec<String>,
    pub export_columns: Vec<ExportColumnNode>,
    /// `type` or `type/subtype`.
    pub search_type: Option<String>,
    pub default_search: bool,
    pub reviewable: bool,
    pub simple_query_string: Option<String>,
    pub keyword: Option<String>,
    pub statuses: Vec<String>,
    pub any_opps: Option<bool>,
    pub closed_opps: Option<bool>,
    pub relocated_opps: Option<bool>,
}

impl SavedSearchNode {
    pub fn build(search: &SavedSearch) -> async_graphql::Result<Self> {
        let fields = SourceFields::read(search.common())?;
        Ok(Self {
            id: fields.id,
            public_id: fields.public_id,
            name: fields.name,
            description: fields.description,
            status: fields.status,
            fixed: fields.fixed,
            global: fields.global,
            created_by: fields.created_by,
            job_id: fields.job_id,
            users: fields.users,
            watcher_user_ids: fields.watcher_user_ids,
            displayed_fields_long: fields.displayed_fields_long,
            displayed_fields_short: fields.displayed_fields_short,
            export_columns: fields.export_columns,
            search_type: search.type_string(),
            default_search: search.is_default_search(),
            reviewable: search.is_reviewable(),
            simple_query_string: search.simple_query_string.clone(),
            keyword: search.keyword.clone(),
            statuses: search.statuses.clone(),
            any_opps: search.any_opps,
            closed_opps: search.closed_opps,
            relocated_opps: search.relocated_opps,
        })
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct SourceSummaryNode {
    pub id: i64,
    pub name: String,
    pub fixed: bool,
    pub created_by: i64,
}

impl From<saved_list::Model> for SourceSummaryNode {
    fn from(model: saved_list::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            fixed: model.fixed,
            created_by: model.created_by,
        }
    }
}

impl From<saved_search::Model> for SourceSummaryNode {
    fn from(model: saved_search::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            fixed: model.fixed,
            created_by: model.created_by,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct SharedSourcesNode {
    pub saved_lists: Vec<SourceSummaryNode>,
    pub saved_searches: Vec<SourceSummaryNode>,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct OpportunityNode {
    pub id: i64,
    pub sf_id: Option<String>,
    pub name: Option<String>,
    pub candidate_id: i64,
    pub job_opp_id: Option<i64>,
    pub stage: StageNode,
    pub last_active_stage: Option<StageNode>,
    pub stage_order: i32,
    pub closed: bool,
    pub won: bool,
    pub next_step: Option<String>,
    pub next_step_due_date: Option<NaiveDate>,
    pub closing_comments: Option<String>,
    pub closing_comments_for_candidate: Option<String>,
    pub employer_feedback: Option<String>,
    pub updated_date: Option<DateTimeWithTimeZone>,
}

impl From<candidate_opportunity::Model> for OpportunityNode {
    fn from(model: candidate_opportunity::Model) -> Self {
        Self {
            id: model.id,
            sf_id: model.sf_id,
            name: model.name,
            candidate_id: model.candidate_id,
            job_opp_id: model.job_opp_id,
            stage: StageNode::candidate(model.stage),
            last_active_stage: model.last_active_stage.map(StageNode::candidate),
            stage_order: model.stage_order,
            closed: model.closed,
            won: model.won,
            next_step: model.next_step,
            next_step_due_date: model.next_step_due_date,
            closing_comments: model.closing_comments,
            closing_comments_for_candidate: model.closing_comments_for_candidate,
            employer_feedback: model.employer_feedback,
            updated_date: model.updated_date,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct JobOpportunityNode {
    pub id: i64,
    pub sf_id: Option<String>,
    pub name: String,
    pub employer: Option<String>,
    pub country: Option<String>,
    pub stage: StageNode,
    pub stage_order: i32,
    pub closed: bool,
    pub won: bool,
    /// Candidates are being sought or assessed.
    pub recruiting: bool,
    pub next_step: Option<String>,
    pub next_step_due_date: Option<NaiveDate>,
    pub updated_date: Option<DateTimeWithTimeZone>,
}

impl From<salesforce_job_opp::Model> for JobOpportunityNode {
    fn from(model: salesforce_job_opp::Model) -> Self {
        Self {
            id: model.id,
            sf_id: model.sf_id,
            name: model.name,
            employer: model.employer,
            country: model.country,
            stage: StageNode::of(model.stage),
            stage_order: model.stage_order,
            closed: model.closed,
            won: model.won,
            recruiting: is_recruiting(model.stage),
            next_step: model.next_step,
            next_step_due_date: model.next_step_due_date,
            updated_date: model.updated_date,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct CandidateStageOutcomeNode {
    pub opportunity: OpportunityNode,
    /// Status the candidate was moved to as a side effect, if any.
    pub new_candidate_status: Option<String>,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct CandidateNode {
    pub id: i64,
    pub candidate_number: String,
    pub user_id: i64,
    pub status: String,
    pub candidate_message: Option<String>,
    pub mini_intake_completed_date: Option<DateTimeWithTimeZone>,
    pub full_intake_completed_date: Option<DateTimeWithTimeZone>,
    /// Every stored column, camelCased.
    pub profile: Json<Value>,
}

impl CandidateNode {
    pub fn build(model: candidate::Model) -> async_graphql::Result<Self> {
        let profile = serde_json::to_value(&model).map_err(internal_error)?;
        Ok(Self {
            id: model.id,
            candidate_number: model.candidate_number,
            user_id: model.user_id,
            status: model.status.to_value(),
            candidate_message: model.candidate_message,
            mini_intake_completed_date: model.mini_intake_completed_date,
            full_intake_completed_date: model.full_intake_completed_date,
            profile: Json(profile),
        })
    }
}

use async_graphql::{Context, InputObject, Object};
use chrono::NaiveDate;
use entity::candidate_opportunity::{self, Stage as CandidateStage};
use entity::salesforce_job_opp::{self, Stage as JobStage};
use products_talent::OpportunityStage;
use products_talent::opportunity::{
    CandidateStageOutcome, CrmOpportunityRecord, StageChange, move_candidate_opportunity_stage,
    move_job_opportunity_stage, sync_candidate_opportunity,
};
use sea_orm::{ActiveEnum, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::instrument;

use super::nodes::{CandidateStageOutcomeNode, JobOpportunityNode, OpportunityNode, StageNode};
use super::{bad_request, data, require_user, talent_error};
use platform_api::internal_error;

/// Accepts either the stored value (`cvReview`) or the CRM name (`CV review`).
pub(crate) fn parse_stage<S>(raw: &str) -> async_graphql::Result<S>
where
    S: OpportunityStage + ActiveEnum<Value = String>,
{
    S::try_from_value(&raw.to_string())
        .or_else(|_| S::text_to_enum(raw))
        .map_err(|_| bad_request(format!("unknown stage `{raw}`")))
}

#[derive(Clone, Debug, InputObject)]
pub struct MoveStageInput {
    pub id: i64,
    pub stage: String,
    pub next_step: Option<String>,
    pub next_step_due_date: Option<NaiveDate>,
}

impl MoveStageInput {
    fn change<S>(&self) -> async_graphql::Result<StageChange<S>>
    where
        S: OpportunityStage + ActiveEnum<Value = String>,
    {
        Ok(StageChange {
            stage: parse_stage(&self.stage)?,
            next_step: self.next_step.clone(),
            next_step_due_date: self.next_step_due_date,
        })
    }
}

/// Opportunity as reported by the CRM. `nextStepDueDate` is `YYYY-MM-DD` text.
#[derive(Clone, Debug, InputObject)]
pub struct CrmOpportunityInput {
    pub sf_id: String,
    pub name: Option<String>,
    pub stage_name: Option<String>,
    pub next_step: Option<String>,
    pub next_step_due_date: Option<String>,
    pub closing_comments: Option<String>,
    pub closing_comments_for_candidate: Option<String>,
    pub employer_feedback: Option<String>,
}

impl From<CrmOpportunityInput> for CrmOpportunityRecord {
    fn from(input: CrmOpportunityInput) -> Self {
        Self {
            sf_id: input.sf_id,
            name: input.name,
            stage_name: input.stage_name,
            next_step: input.next_step,
            next_step_due_date: input.next_step_due_date,
            closing_comments: input.closing_comments,
            closing_comments_for_candidate: input.closing_comments_for_candidate,
            employer_feedback: input.employer_feedback,
        }
    }
}

fn outcome_node(outcome: CandidateStageOutcome) -> CandidateStageOutcomeNode {
    CandidateStageOutcomeNode {
        opportunity: outcome.opportunity.into(),
        new_candidate_status: outcome.new_candidate_status.map(|status| status.to_value()),
    }
}

#[derive(Default)]
pub struct PipelineQuery;

#[Object]
impl PipelineQuery {
    async fn candidate_stages(&self) -> Vec<StageNode> {
        CandidateStage::all()
            .into_iter()
            .map(StageNode::candidate)
            .collect()
    }

    async fn job_stages(&self) -> Vec<StageNode> {
        JobStage::all().into_iter().map(StageNode::of).collect()
    }

    #[instrument(name = "graphql.candidate_opportunities", skip(self, ctx))]
    async fn candidate_opportunities(
        &self,
        ctx: &Context<'_>,
        candidate_id: i64,
    ) -> async_graphql::Result<Vec<OpportunityNode>> {
        let data = data(ctx)?;
        let rows = candidate_opportunity::Entity::find()
            .filter(candidate_opportunity::Column::CandidateId.eq(candidate_id))
            .order_by_asc(candidate_opportunity::Column::StageOrder)
            .order_by_asc(candidate_opportunity::Column::Id)
            .all(data.db.as_ref())
            .await
            .map_err(internal_error)?;
        Ok(rows.into_iter().map(OpportunityNode::from).collect())
    }

    #[instrument(name = "graphql.job_opportunity", skip(self, ctx))]
    async fn job_opportunity(
        &self,
        ctx: &Context<'_>,
        id: i64,
    ) -> async_graphql::Result<Option<JobOpportunityNode>> {
        let data = data(ctx)?;
        let job = salesforce_job_opp::Entity::find_by_id(id)
            .one(data.db.as_ref())
            .await
            .map_err(internal_error)?;
        Ok(job.map(JobOpportunityNode::from))
    }
}

#[derive(Default)]
pub struct PipelineMutation;

#[Object]
impl PipelineMutation {
    async fn move_candidate_opportunity_stage(
        &self,
        ctx: &Context<'_>,
        input: MoveStageInput,
    ) -> async_graphql::Result<CandidateStageOutcomeNode> {
        let user = require_user(ctx)?;
        let change = input.change::<CandidateStage>()?;
        let data = data(ctx)?;
        let outcome = move_candidate_opportunity_stage(&data.db, input.id, change, Some(user.id))
            .await
            .map_err(talent_error)?;
        Ok(outcome_node(outcome))
    }

    async fn move_job_opportunity_stage(
        &self,
        ctx: &Context<'_>,
        input: MoveStageInput,
    ) -> async_graphql::Result<JobOpportunityNode> {
        require_user(ctx)?;
        let change = input.change::<JobStage>()?;
        let data = data(ctx)?;
        let job = move_job_opportunity_stage(&data.db, input.id, change)
            .await
            .map_err(talent_error)?;
        Ok(job.into())
    }

    /// Create or update the opportunity with the record's `sfId`.
    async fn sync_candidate_opportunity(
        &self,
        ctx: &Context<'_>,
        candidate_id: i64,
        job_opp_id: Option<i64>,
        record: CrmOpportunityInput,
    ) -> async_graphql::Result<CandidateStageOutcomeNode> {
        require_user(ctx)?;
        let data = data(ctx)?;
        let outcome = sync_candidate_opportunity(&data.db, candidate_id, job_opp_id, record.into())
            .await
            .map_err(talent_error)?;
        Ok(outcome_node(outcome))
    }
}

//! Stage bookkeeping for job and candidate opportunities.
//!
//! `stage_order`, `closed` and `won` are derived from the stage. The types here keep
//! those fields private so [`OpportunityProgress::set_stage`] is the only way to move
//! an opportunity.

use chrono::{Duration, NaiveDate, Utc};
use entity::candidate::CandidateStatus;
use entity::candidate_opportunity::{self, Stage as CandidateStage};
use entity::salesforce_job_opp::{self, Stage as JobStage};
use entity::{candidate, candidate_opportunity::Entity as CandidateOpportunity};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, info_span};

use crate::candidate::record_status_change;
use crate::error::{TalentError, TalentResult};
use crate::stage::{CandidateStageExt, OpportunityStage};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpportunityProgress<S> {
    stage: S,
    stage_order: i32,
    closed: bool,
    won: bool,
}

impl<S: OpportunityStage> OpportunityProgress<S> {
    pub fn new(stage: S) -> Self {
        Self {
            stage,
            stage_order: stage.ordinal(),
            closed: stage.is_closed(),
            won: stage.is_won(),
        }
    }

    /// Move to `stage`, recomputing the derived columns. Any stage may follow any other.
    pub fn set_stage(&mut self, stage: S) {
        self.stage = stage;
        self.stage_order = stage.ordinal();
        self.closed = stage.is_closed();
        self.won = stage.is_won();
    }

    pub fn stage(&self) -> S {
        self.stage
    }

    pub fn stage_order(&self) -> i32 {
        self.stage_order
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_won(&self) -> bool {
        self.won
    }
}

impl OpportunityProgress<JobStage> {
    pub fn from_job(model: &salesforce_job_opp::Model) -> Self {
        Self::new(model.stage)
    }

    pub fn apply_to(&self, active: &mut salesforce_job_opp::ActiveModel) {
        active.stage = Set(self.stage);
        active.stage_order = Set(self.stage_order);
        active.closed = Set(self.closed);
        active.won = Set(self.won);
    }
}

/// Candidate opportunities also remember the last stage they reached while open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CandidateOpportunityProgress {
    progress: OpportunityProgress<CandidateStage>,
    last_active_stage: Option<CandidateStage>,
}

impl CandidateOpportunityProgress {
    pub fn new(stage: CandidateStage) -> Self {
        let mut progress = Self {
            progress: OpportunityProgress::new(stage),
            last_active_stage: None,
        };
        progress.set_stage(stage);
        progress
    }

    pub fn from_model(model: &candidate_opportunity::Model) -> Self {
        Self {
            progress: OpportunityProgress::new(model.stage),
            last_active_stage: model.last_active_stage.filter(|stage| !stage.is_closed()),
        }
    }

    pub fn set_stage(&mut self, stage: CandidateStage) {
        self.progress.set_stage(stage);
        if !self.progress.is_closed() {
            self.last_active_stage = Some(stage);
        }
    }

    pub fn stage(&self) -> CandidateStage {
        self.progress.stage()
    }

    pub fn stage_order(&self) -> i32 {
        self.progress.stage_order()
    }

    pub fn is_closed(&self) -> bool {
        self.progress.is_closed()
    }

    pub fn is_won(&self) -> bool {
        self.progress.is_won()
    }

    pub fn last_active_stage(&self) -> Option<CandidateStage> {
        self.last_active_stage
    }

    pub fn apply_to(&self, active: &mut candidate_opportunity::ActiveModel) {
        active.stage = Set(self.stage());
        active.stage_order = Set(self.stage_order());
        active.closed = Set(self.is_closed());
        active.won = Set(self.is_won());
        active.last_active_stage = Set(self.last_active_stage);
    }
}

/// Status a candidate should be moved to after one of their opportunities reaches
/// `stage`, if any.
pub fn auto_status_for_stage(
    stage: CandidateStage,
    current: CandidateStatus,
) -> Option<CandidateStatus> {
    let target = if stage.is_employed() {
        CandidateStatus::Employed
    } else if stage == CandidateStage::NotEligibleForTc {
        CandidateStatus::Ineligible
    } else if stage == CandidateStage::RelocatedNoJobOfferPathway {
        CandidateStatus::Withdrawn
    } else {
        return None;
    };
    (target != current).then_some(target)
}

/// Requested stage move plus optional follow-up fields. `None` leaves a field unchanged.
#[derive(Clone, Debug)]
pub struct StageChange<S> {
    pub stage: S,
    pub next_step: Option<String>,
    pub next_step_due_date: Option<NaiveDate>,
}

impl<S> StageChange<S> {
    pub fn to(stage: S) -> Self {
        Self {
            stage,
            next_step: None,
            next_step_due_date: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CandidateStageOutcome {
    pub opportunity: candidate_opportunity::Model,
    /// Set when the move also changed the candidate's status.
    pub new_candidate_status: Option<CandidateStatus>,
}

pub async fn move_job_opportunity_stage(
    db: &DatabaseConnection,
    job_id: i64,
    change: StageChange<JobStage>,
) -> TalentResult<salesforce_job_opp::Model> {
    let span = info_span!("talent.job_opportunity.move_stage", job_id, stage = ?change.stage);
    async move {
        let txn = db.begin().await?;
        let existing = salesforce_job_opp::Entity::find_by_id(job_id)
            .one(&txn)
            .await?
            .ok_or_else(|| TalentError::not_found("job opportunity", job_id))?;

        let mut progress = OpportunityProgress::from_job(&existing);
        progress.set_stage(change.stage);

        let mut active: salesforce_job_opp::ActiveModel = existing.into();
        progress.apply_to(&mut active);
        if let Some(next_step) = change.next_step {
            active.next_step = Set(Some(next_step));
        }
        if let Some(due) = change.next_step_due_date {
            active.next_step_due_date = Set(Some(due));
        }
        active.updated_date = Set(Some(Utc::now().into()));
        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }
    .instrument(span)
    .await
}

pub async fn move_candidate_opportunity_stage(
    db: &DatabaseConnection,
    opportunity_id: i64,
    change: StageChange<CandidateStage>,
    actor: Option<i64>,
) -> TalentResult<CandidateStageOutcome> {
    let span = info_span!(
        "talent.candidate_opportunity.move_stage",
        opportunity_id,
        stage = ?change.stage
    );
    async move {
        let txn = db.begin().await?;
        let existing = CandidateOpportunity::find_by_id(opportunity_id)
            .one(&txn)
            .await?
            .ok_or_else(|| TalentError::not_found("candidate opportunity", opportunity_id))?;

        let mut progress = CandidateOpportunityProgress::from_model(&existing);
        progress.set_stage(change.stage);

        let mut active: candidate_opportunity::ActiveModel = existing.into();
        progress.apply_to(&mut active);
        if let Some(next_step) = change.next_step {
            active.next_step = Set(Some(next_step));
        }
        if let Some(due) = change.next_step_due_date {
            active.next_step_due_date = Set(Some(due));
        }
        active.updated_date = Set(Some(Utc::now().into()));
        let updated = active.update(&txn).await?;

        let new_candidate_status = apply_auto_status(&txn, &updated, actor).await?;
        txn.commit().await?;
        Ok(CandidateStageOutcome {
            opportunity: updated,
            new_candidate_status,
        })
    }
    .instrument(span)
    .await
}

async fn apply_auto_status<C: ConnectionTrait>(
    conn: &C,
    opportunity: &candidate_opportunity::Model,
    actor: Option<i64>,
) -> TalentResult<Option<CandidateStatus>> {
    let candidate = candidate::Entity::find_by_id(opportunity.candidate_id)
        .one(conn)
        .await?
        .ok_or_else(|| TalentError::not_found("candidate", opportunity.candidate_id))?;

    let Some(status) = auto_status_for_stage(opportunity.stage, candidate.status) else {
        return Ok(None);
    };

    let job_name = match opportunity.job_opp_id {
        Some(job_id) => salesforce_job_opp::Entity::find_by_id(job_id)
            .one(conn)
            .await?
            .map(|job| job.name),
        None => None,
    }
    .or_else(|| opportunity.name.clone())
    .unwrap_or_default();

    let comment = format!(
        "Status changed automatically due to candidate's stage in the '{}' job opportunity changing to '{}'",
        job_name,
        opportunity.stage.salesforce_stage_name()
    );
    tracing::info!(
        candidate_id = candidate.id,
        status = ?status,
        "candidate status changed by opportunity stage"
    );
    record_status_change(conn, candidate, status, Some(comment), actor).await?;
    Ok(Some(status))
}

/// Opportunity fields as the CRM reports them.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmOpportunityRecord {
    pub sf_id: String,
    pub name: Option<String>,
    pub stage_name: Option<String>,
    pub next_step: Option<String>,
    pub next_step_due_date: Option<String>,
    pub closing_comments: Option<String>,
    pub closing_comments_for_candidate: Option<String>,
    pub employer_feedback: Option<String>,
}

/// Copy a CRM record onto an opportunity. Bad stage names fall back to prospect and
/// bad due dates are skipped; both are logged rather than failing the sync.
pub fn apply_crm_opportunity(
    record: &CrmOpportunityRecord,
    progress: &mut CandidateOpportunityProgress,
    active: &mut candidate_opportunity::ActiveModel,
) {
    active.sf_id = Set(Some(record.sf_id.clone()));
    active.name = Set(record.name.clone());

    let stage = match record.stage_name.as_deref() {
        Some(label) => CandidateStage::text_to_enum(label).unwrap_or_else(|err| {
            tracing::error!(sf_id = %record.sf_id, error = %err, "using prospect for unknown CRM stage");
            CandidateStage::Prospect
        }),
        None => CandidateStage::Prospect,
    };
    progress.set_stage(stage);
    progress.apply_to(active);

    active.next_step = Set(record.next_step.clone());
    if let Some(raw) = record.next_step_due_date.as_deref() {
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => active.next_step_due_date = Set(Some(date)),
            Err(err) => tracing::error!(
                sf_id = %record.sf_id,
                value = raw,
                error = %err,
                "could not parse CRM next step due date"
            ),
        }
    }
    active.closing_comments = Set(record.closing_comments.clone());
    active.closing_comments_for_candidate = Set(record.closing_comments_for_candidate.clone());
    active.employer_feedback = Set(record.employer_feedback.clone());
}

const NEW_OPPORTUNITY_NEXT_STEP: &str = "Contact candidate and do intake";

/// New opportunities are due two weeks out unless the CRM says otherwise.
pub fn default_next_step_due_date() -> NaiveDate {
    Utc::now().date_naive() + Duration::weeks(2)
}

/// Create or update the candidate opportunity matching `record.sf_id`. An existing
/// opportunity must belong to `candidate_id`.
pub async fn sync_candidate_opportunity(
    db: &DatabaseConnection,
    candidate_id: i64,
    job_opp_id: Option<i64>,
    record: CrmOpportunityRecord,
) -> TalentResult<CandidateStageOutcome> {
    let span = info_span!("talent.candidate_opportunity.sync", candidate_id, sf_id = %record.sf_id);
    async move {
        let txn = db.begin().await?;
        let existing = CandidateOpportunity::find()
            .filter(candidate_opportunity::Column::SfId.eq(record.sf_id.as_str()))
            .one(&txn)
            .await?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let saved = match existing {
            Some(model) if model.candidate_id != candidate_id => {
                return Err(TalentError::InvalidRequest(format!(
                    "opportunity {} belongs to candidate {}, not {candidate_id}",
                    record.sf_id, model.candidate_id
                )));
            }
            Some(model) => {
                let mut progress = CandidateOpportunityProgress::from_model(&model);
                let mut active: candidate_opportunity::ActiveModel = model.into();
                apply_crm_opportunity(&record, &mut progress, &mut active);
                if job_opp_id.is_some() {
                    active.job_opp_id = Set(job_opp_id);
                }
                active.updated_date = Set(Some(now));
                active.update(&txn).await?
            }
            None => {
                if candidate::Entity::find_by_id(candidate_id)
                    .one(&txn)
                    .await?
                    .is_none()
                {
                    return Err(TalentError::not_found("candidate", candidate_id));
                }
                let mut progress = CandidateOpportunityProgress::new(CandidateStage::Prospect);
                let mut active = candidate_opportunity::ActiveModel {
                    candidate_id: Set(candidate_id),
                    job_opp_id: Set(job_opp_id),
                    next_step_due_date: Set(Some(default_next_step_due_date())),
                    created_date: Set(now),
                    updated_date: Set(None),
                    ..Default::default()
                };
                apply_crm_opportunity(&record, &mut progress, &mut active);
                if record.next_step.is_none() {
                    active.next_step = Set(Some(NEW_OPPORTUNITY_NEXT_STEP.to_string()));
                }
                active.insert(&txn).await?
            }
        };

        let new_candidate_status = apply_auto_status(&txn, &saved, None).await?;
        txn.commit().await?;
        Ok(CandidateStageOutcome {
            opportunity: saved,
            new_candidate_status,
        })
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ActiveValue, DatabaseBackend, MockDatabase};

    #[test]
    fn set_stage_keeps_derived_columns_consistent() {
        let mut progress = CandidateOpportunityProgress::new(CandidateStage::Prospect);
        for stage in CandidateStage::all() {
            progress.set_stage(stage);
            assert_eq!(progress.stage_order(), stage.ordinal());
            assert_eq!(progress.is_closed(), stage.is_closed());
            assert_eq!(progress.is_won(), stage.is_won());
        }

        let mut job = OpportunityProgress::new(JobStage::Prospect);
        for stage in JobStage::all() {
            job.set_stage(stage);
            assert_eq!(job.stage_order(), stage.ordinal());
            assert_eq!(job.is_closed(), stage.is_closed());
            assert_eq!(job.is_won(), stage.is_won());
        }
    }

    #[test]
    fn last_active_stage_skips_closed_stages() {
        let mut progress = CandidateOpportunityProgress::new(CandidateStage::Prospect);
        assert_eq!(progress.last_active_stage(), Some(CandidateStage::Prospect));

        progress.set_stage(CandidateStage::CvReview);
        progress.set_stage(CandidateStage::NoJobOffer);
        assert_eq!(progress.stage(), CandidateStage::NoJobOffer);
        assert_eq!(progress.last_active_stage(), Some(CandidateStage::CvReview));

        progress.set_stage(CandidateStage::Settled);
        assert_eq!(progress.last_active_stage(), Some(CandidateStage::CvReview));

        progress.set_stage(CandidateStage::Offer);
        assert_eq!(progress.last_active_stage(), Some(CandidateStage::Offer));
    }

    #[test]
    fn auto_status_rules() {
        use CandidateStatus::*;
        assert_eq!(auto_status_for_stage(CandidateStage::Acceptance, Active), Some(Employed));
        assert_eq!(auto_status_for_stage(CandidateStage::Settled, Employed), None);
        assert_eq!(
            auto_status_for_stage(CandidateStage::NotEligibleForTc, Active),
            Some(Ineligible)
        );
        assert_eq!(
            auto_status_for_stage(CandidateStage::RelocatedNoJobOfferPathway, Active),
            Some(Withdrawn)
        );
        assert_eq!(auto_status_for_stage(CandidateStage::CvReview, Active), None);
    }

    #[test]
    fn crm_record_with_unknown_stage_falls_back_to_prospect() {
        let record = CrmOpportunityRecord {
            sf_id: "006A".into(),
            stage_name: Some("Mystery".into()),
            next_step_due_date: Some("31/12/2024".into()),
            ..Default::default()
        };
        let mut progress = CandidateOpportunityProgress::new(CandidateStage::CvReview);
        let mut active = <candidate_opportunity::ActiveModel as Default>::default();
        apply_crm_opportunity(&record, &mut progress, &mut active);

        assert_eq!(progress.stage(), CandidateStage::Prospect);
        assert_eq!(active.stage, ActiveValue::Set(CandidateStage::Prospect));
        assert_eq!(active.next_step_due_date, ActiveValue::NotSet);
    }

    #[test]
    fn crm_record_copies_fields() {
        let record = CrmOpportunityRecord {
            sf_id: "006B".into(),
            name: Some("Amina - Nurse".into()),
            stage_name: Some("Visa processing".into()),
            next_step: Some("Lodge visa".into()),
            next_step_due_date: Some("2024-11-05".into()),
            employer_feedback: Some("Strong".into()),
            ..Default::default()
        };
        let mut progress = CandidateOpportunityProgress::new(CandidateStage::Prospect);
        let mut active = <candidate_opportunity::ActiveModel as Default>::default();
        apply_crm_opportunity(&record, &mut progress, &mut active);

        assert_eq!(active.stage, ActiveValue::Set(CandidateStage::VisaProcessing));
        assert_eq!(
            active.stage_order,
            ActiveValue::Set(CandidateStage::VisaProcessing.ordinal())
        );
        assert_eq!(
            active.next_step_due_date,
            ActiveValue::Set(NaiveDate::from_ymd_opt(2024, 11, 5))
        );
        assert_eq!(active.employer_feedback, ActiveValue::Set(Some("Strong".into())));
        assert_eq!(
            active.last_active_stage,
            ActiveValue::Set(Some(CandidateStage::VisaProcessing))
        );
    }

    fn job(stage: JobStage) -> salesforce_job_opp::Model {
        let progress = OpportunityProgress::new(stage);
        salesforce_job_opp::Model {
            id: 3,
            sf_id: Some("006J".into()),
            name: "Nurses for Ontario".into(),
            account_id: None,
            employer: Some("Acme Health".into()),
            country: Some("Canada".into()),
            description: None,
            stage,
            stage_order: progress.stage_order(),
            closed: progress.is_closed(),
            won: progress.is_won(),
            next_step: None,
            next_step_due_date: None,
            closing_comments: None,
            evergreen: false,
            submission_due_date: None,
            submission_list_id: None,
            suggested_list_id: None,
            exclusion_list_id: None,
            hiring_commitment: None,
            created_date: Utc::now().into(),
            updated_date: None,
        }
    }

    #[tokio::test]
    async fn moving_a_job_updates_derived_columns() {
        let before = job(JobStage::CandidateSearch);
        let after = job(JobStage::HiringCompleted);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![before]])
            .append_query_results([vec![after.clone()]])
            .into_connection();

        let updated = move_job_opportunity_stage(&db, 3, StageChange::to(JobStage::HiringCompleted))
            .await
            .unwrap();
        assert_eq!(updated, after);

        let log = db.into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains("stage_order"), "{sql}");
        assert!(sql.contains("hiringCompleted"), "{sql}");
    }

    fn opportunity(candidate_id: i64) -> candidate_opportunity::Model {
        let progress = CandidateOpportunityProgress::new(CandidateStage::CvReview);
        candidate_opportunity::Model {
            id: 11,
            sf_id: Some("006OWN".into()),
            name: Some("Amina - Nurse".into()),
            candidate_id,
            job_opp_id: None,
            stage: progress.stage(),
            last_active_stage: progress.last_active_stage(),
            stage_order: progress.stage_order(),
            closed: progress.is_closed(),
            won: progress.is_won(),
            next_step: None,
            next_step_due_date: None,
            closing_comments: None,
            closing_comments_for_candidate: None,
            employer_feedback: None,
            created_date: Utc::now().into(),
            updated_date: None,
        }
    }

    #[tokio::test]
    async fn sync_refuses_an_opportunity_owned_by_another_candidate() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![opportunity(1)]])
            .into_connection();
        let record = CrmOpportunityRecord {
            sf_id: "006OWN".into(),
            stage_name: Some("Offer".into()),
            ..Default::default()
        };
        let err = sync_candidate_opportunity(&db, 2, None, record)
            .await
            .unwrap_err();
        assert!(matches!(err, TalentError::InvalidRequest(_)), "{err:?}");

        let sql = format!("{:?}", db.into_transaction_log());
        assert!(!sql.contains("UPDATE"), "{sql}");
    }

    #[test]
    fn new_opportunities_are_due_in_two_weeks() {
        let today = Utc::now().date_naive();
        let due = default_next_step_due_date();
        assert!(due == today + Duration::days(14) || due == today + Duration::days(15));
    }

    #[tokio::test]
    async fn moving_a_missing_job_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<salesforce_job_opp::Model>::new()])
            .into_connection();
        let err = move_job_opportunity_stage(&db, 99, StageChange::to(JobStage::Briefing))
            .await
            .unwrap_err();
        assert!(matches!(err, TalentError::NotFound { id: 99, .. }));
    }
}

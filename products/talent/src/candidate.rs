//! Candidate registration, intake and status changes.

use chrono::Utc;
use entity::candidate::{self, CandidateStatus, Gender, YesNo};
use entity::{Status, candidate_note, users};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{Instrument, info_span};
use uuid::Uuid;

use crate::error::{TalentError, TalentResult};

/// Partial intake questionnaire. Every `None` leaves the stored value alone.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntakeUpdate {
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
}

macro_rules! set_if_present {
    ($update:expr, $active:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $update.$field.clone() {
                $active.$field = Set(Some(value));
            }
        )+
    };
}

impl IntakeUpdate {
    pub fn is_empty(&self) -> bool {
        let mut scratch = <candidate::ActiveModel as Default>::default();
        self.apply_to(&mut scratch);
        !scratch.is_changed()
    }

    pub fn apply_to(&self, active: &mut candidate::ActiveModel) {
        set_if_present!(
            self,
            active,
            avail_immediate,
            avail_immediate_notes,
            family_move,
            family_move_notes,
            int_recruit_reasons,
            left_home_reasons,
            home_location,
            residence_status,
            work_abroad,
            work_abroad_notes,
            host_entry_year,
            unhcr_status,
            unhcr_number,
            ielts_score,
            marital_status,
            number_dependants,
            conflict,
            conflict_notes,
            crime_convict,
            crime_convict_notes,
            visa_reject,
            visa_reject_notes,
            driving_license,
        );
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntakeKind {
    Mini,
    Full,
}

pub async fn update_candidate_intake(
    db: &DatabaseConnection,
    candidate_id: i64,
    update: IntakeUpdate,
) -> TalentResult<candidate::Model> {
    let existing = find_candidate(db, candidate_id).await?;
    if update.is_empty() {
        return Ok(existing);
    }
    let mut active: candidate::ActiveModel = existing.into();
    update.apply_to(&mut active);
    active.updated_date = Set(Some(now()));
    let updated = active
        .update(db)
        .instrument(info_span!("talent.candidate.update_intake", candidate_id))
        .await?;
    Ok(updated)
}

/// Stamp the intake completion date.
pub async fn complete_intake(
    db: &DatabaseConnection,
    candidate_id: i64,
    kind: IntakeKind,
) -> TalentResult<candidate::Model> {
    let existing = find_candidate(db, candidate_id).await?;
    let stamp = now();
    let mut active: candidate::ActiveModel = existing.into();
    match kind {
        IntakeKind::Mini => active.mini_intake_completed_date = Set(Some(stamp)),
        IntakeKind::Full => active.full_intake_completed_date = Set(Some(stamp)),
    }
    active.updated_date = Set(Some(stamp));
    Ok(active.update(db).await?)
}

#[derive(Clone, Debug)]
pub struct StatusChange {
    pub status: CandidateStatus,
    pub candidate_message: Option<String>,
    pub comment: Option<String>,
}

pub async fn update_candidate_status(
    db: &DatabaseConnection,
    candidate_id: i64,
    change: StatusChange,
    actor: Option<i64>,
) -> TalentResult<candidate::Model> {
    let span = info_span!("talent.candidate.update_status", candidate_id, status = ?change.status);
    async move {
        let txn = db.begin().await?;
        let existing = find_candidate(&txn, candidate_id).await?;
        let existing = if existing.candidate_message != change.candidate_message {
            let mut active: candidate::ActiveModel = existing.into();
            active.candidate_message = Set(change.candidate_message);
            active.update(&txn).await?
        } else {
            existing
        };
        let updated =
            record_status_change(&txn, existing, change.status, change.comment, actor).await?;
        txn.commit().await?;
        Ok(updated)
    }
    .instrument(span)
    .await
}

/// Candidates are never removed; deleting one is a status change.
pub async fn soft_delete_candidate(
    db: &DatabaseConnection,
    candidate_id: i64,
    comment: Option<String>,
    actor: Option<i64>,
) -> TalentResult<candidate::Model> {
    update_candidate_status(
        db,
        candidate_id,
        StatusChange {
            status: CandidateStatus::Deleted,
            candidate_message: None,
            comment,
        },
        actor,
    )
    .await
}

/// Write `status`, note the transition and keep the login's status in step.
pub(crate) async fn record_status_change<C: ConnectionTrait>(
    conn: &C,
    candidate: candidate::Model,
    status: CandidateStatus,
    comment: Option<String>,
    actor: Option<i64>,
) -> TalentResult<candidate::Model> {
    let original = candidate.status;
    let user_id = candidate.user_id;
    let candidate_id = candidate.id;

    let updated = if original == status {
        candidate
    } else {
        let stamp = now();
        let mut active: candidate::ActiveModel = candidate.into();
        active.status = Set(status);
        active.updated_date = Set(Some(stamp));
        let updated = active.update(conn).await?;

        candidate_note::ActiveModel {
            candidate_id: Set(candidate_id),
            note_type: Set(candidate_note::NoteType::Admin),
            title: Set(status_change_title(original, status)),
            comment: Set(comment),
            created_by: Set(actor),
            created_date: Set(stamp),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        updated
    };

    if let Some(user) = users::Entity::find_by_id(user_id).one(conn).await? {
        let user_status = match (status, user.status) {
            (CandidateStatus::Deleted, Status::Deleted) => None,
            (CandidateStatus::Deleted, _) => Some(Status::Deleted),
            (_, Status::Deleted) => Some(Status::Active),
            _ => None,
        };
        if let Some(user_status) = user_status {
            let mut active: users::ActiveModel = user.into();
            active.status = Set(user_status);
            active.update(conn).await?;
        }
    }

    Ok(updated)
}

pub fn status_change_title(from: CandidateStatus, to: CandidateStatus) -> String {
    format!("Status change from {} to {}", from.to_value(), to.to_value())
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub country: Option<String>,
}

/// Create a login plus a draft candidate. The candidate number is the zero-padded id.
pub async fn register_candidate(
    db: &DatabaseConnection,
    registration: Registration,
) -> TalentResult<candidate::Model> {
    let span = info_span!("talent.candidate.register", username = %registration.username);
    async move {
        let txn = db.begin().await?;
        let taken = users::Entity::find()
            .filter(users::Column::Username.eq(registration.username.as_str()))
            .one(&txn)
            .await?;
        if taken.is_some() {
            return Err(TalentError::UsernameTaken(registration.username));
        }

        let stamp = now();
        let user = users::ActiveModel {
            username: Set(registration.username),
            first_name: Set(registration.first_name),
            last_name: Set(registration.last_name),
            email: Set(registration.email),
            role: Set(users::Role::User),
            status: Set(Status::Active),
            created_date: Set(stamp),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let draft = candidate::ActiveModel {
            candidate_number: Set(placeholder_candidate_number()),
            user_id: Set(user.id),
            status: Set(CandidateStatus::Draft),
            gender: Set(registration.gender),
            phone: Set(registration.phone),
            whatsapp: Set(registration.whatsapp),
            country: Set(registration.country),
            created_date: Set(stamp),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let number = candidate_number_for(draft.id);
        let mut active: candidate::ActiveModel = draft.into();
        active.candidate_number = Set(number);
        let created = active.update(&txn).await?;
        txn.commit().await?;
        tracing::info!(candidate_id = created.id, "candidate registered");
        Ok(created)
    }
    .instrument(span)
    .await
}

pub fn candidate_number_for(id: i64) -> String {
    format!("{id:04}")
}

/// Unique stand-in until the row id is known. Fits the 32 character column.
fn placeholder_candidate_number() -> String {
    let mut number = format!("TEMP{}", Uuid::new_v4().simple());
    number.truncate(CANDIDATE_NUMBER_LEN);
    number
}

const CANDIDATE_NUMBER_LEN: usize = 32;

pub(crate) async fn find_candidate<C: ConnectionTrait>(
    conn: &C,
    candidate_id: i64,
) -> TalentResult<candidate::Model> {
    candidate::Entity::find_by_id(candidate_id)
        .one(conn)
        .await?
        .ok_or_else(|| TalentError::not_found("candidate", candidate_id))
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

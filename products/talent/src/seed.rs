//! Demo data for local development and integration tests.

use chrono::Utc;
use entity::candidate_opportunity::Stage as CandidateStage;
use entity::salesforce_job_opp::Stage as JobStage;
use entity::{
    Status, candidate, candidate_attachment, candidate_opportunity, candidate_property,
    salesforce_job_opp, saved_list, saved_search, users,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::candidate::{Registration, register_candidate};
use crate::error::TalentResult;
use crate::opportunity::{CandidateOpportunityProgress, OpportunityProgress};

#[derive(Clone, Debug)]
pub struct SeededRecords {
    pub admin: users::Model,
    pub colleague: users::Model,
    pub job: salesforce_job_opp::Model,
    pub candidate: candidate::Model,
    pub opportunity: candidate_opportunity::Model,
    pub saved_list: saved_list::Model,
    pub saved_search: saved_search::Model,
}

async fn seed_user(
    db: &DatabaseConnection,
    username: &str,
    first_name: &str,
    last_name: &str,
    role: users::Role,
    now: DateTimeWithTimeZone,
) -> TalentResult<users::Model> {
    if let Some(existing) = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await?
    {
        return Ok(existing);
    }
    Ok(users::ActiveModel {
        username: Set(username.to_string()),
        first_name: Set(Some(first_name.to_string())),
        last_name: Set(Some(last_name.to_string())),
        email: Set(Some(format!("{username}@example.org"))),
        role: Set(role),
        status: Set(Status::Active),
        created_date: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Insert a small, consistent data set. Usernames are suffixed so repeated runs do not
/// collide on the candidate login.
pub async fn seed_demo(db: &DatabaseConnection) -> TalentResult<SeededRecords> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let admin = seed_user(db, "admin", "Ada", "Admin", users::Role::Admin, now).await?;
    let colleague =
        seed_user(db, "recruiter", "Rui", "Recruiter", users::Role::Partneradmin, now).await?;

    let job_progress = OpportunityProgress::new(JobStage::CandidateSearch);
    let mut job = salesforce_job_opp::ActiveModel {
        sf_id: Set(Some(format!("006{}", &Uuid::new_v4().simple().to_string()[..12]))),
        name: Set("Registered nurses - Ontario".into()),
        employer: Set(Some("Northern Health".into())),
        country: Set(Some("Canada".into())),
        evergreen: Set(false),
        created_date: Set(now),
        ..Default::default()
    };
    job_progress.apply_to(&mut job);
    let job = job.insert(db).await?;

    let suffix = Uuid::new_v4().simple().to_string();
    let candidate = register_candidate(
        db,
        Registration {
            username: format!("amina-{}", &suffix[..8]),
            first_name: Some("Amina".into()),
            last_name: Some("Haddad".into()),
            email: Some("amina@example.org".into()),
            phone: Some("+961 70 000 000".into()),
            country: Some("Lebanon".into()),
            ..Default::default()
        },
    )
    .await?;

    let cv = candidate_attachment::ActiveModel {
        candidate_id: Set(candidate.id),
        name: Set("Amina Haddad CV".into()),
        location: Set("https://docs.example.org/cv/amina".into()),
        attachment_type: Set(candidate_attachment::AttachmentType::Link),
        cv: Set(true),
        created_date: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let mut with_cv: candidate::ActiveModel = candidate.into();
    with_cv.status = Set(candidate::CandidateStatus::Active);
    with_cv.shareable_cv_attachment_id = Set(Some(cv.id));
    with_cv.number_dependants = Set(Some(2));
    let candidate = with_cv.update(db).await?;

    candidate_property::ActiveModel {
        candidate_id: Set(candidate.id),
        name: Set("dependants".into()),
        value: Set(Some(
            r#"[{"user":"Omar","relation":"child"},{"user":"Lina","relation":"spouse"}]"#.into(),
        )),
    }
    .insert(db)
    .await?;

    let progress = CandidateOpportunityProgress::new(CandidateStage::CvReview);
    let mut opportunity = candidate_opportunity::ActiveModel {
        name: Set(Some(format!("{} - {}", candidate.candidate_number, job.name))),
        candidate_id: Set(candidate.id),
        job_opp_id: Set(Some(job.id)),
        created_date: Set(now),
        ..Default::default()
    };
    progress.apply_to(&mut opportunity);
    let opportunity = opportunity.insert(db).await?;

    let saved_search = saved_search::ActiveModel {
        public_id: Set(Uuid::new_v4().to_string()),
        name: Set("Nurses in Lebanon".into()),
        status: Set(Status::Active),
        fixed: Set(false),
        global: Set(false),
        search_type: Set(Some("profession/nurse".into())),
        default_search: Set(false),
        reviewable: Set(true),
        keyword: Set(Some("nurse".into())),
        created_by: Set(admin.id),
        created_date: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let saved_list = saved_list::ActiveModel {
        public_id: Set(Uuid::new_v4().to_string()),
        name: Set("Ontario nurse submissions".into()),
        status: Set(Status::Active),
        fixed: Set(true),
        global: Set(false),
        job_id: Set(Some(job.id)),
        registered_job: Set(true),
        created_by: Set(admin.id),
        created_date: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(
        candidate = %candidate.candidate_number,
        saved_list = saved_list.id,
        "seeded demo records"
    );

    Ok(SeededRecords {
        admin,
        colleague,
        job,
        candidate,
        opportunity,
        saved_list,
        saved_search,
    })
}

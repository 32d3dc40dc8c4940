use async_graphql::{Context, Enum, InputObject, Json, Object};
use entity::candidate::{self, CandidateStatus, Gender};
use platform_api::internal_error;
use products_talent::TalentError;
use products_talent::candidate::{
    IntakeKind, IntakeUpdate, Registration, StatusChange, complete_intake, register_candidate,
    soft_delete_candidate, update_candidate_intake, update_candidate_status,
};
use products_talent::published_doc::{ColumnDef, PublishedDocBuilder, load_candidate_views};
use sea_orm::{ActiveEnum, EntityTrait};
use serde_json::Value;
use tracing::instrument;

use super::nodes::CandidateNode;
use super::{bad_request, data, require_user, talent_error};

fn parse_status(raw: &str) -> async_graphql::Result<CandidateStatus> {
    CandidateStatus::try_from_value(&raw.to_string())
        .map_err(|_| bad_request(format!("unknown candidate status `{raw}`")))
}

fn parse_gender(raw: &str) -> async_graphql::Result<Gender> {
    Gender::try_from_value(&raw.to_lowercase())
        .map_err(|_| bad_request(format!("unknown gender `{raw}`")))
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum IntakeKindInput {
    #[graphql(name = "MINI")]
    Mini,
    #[graphql(name = "FULL")]
    Full,
}

impl From<IntakeKindInput> for IntakeKind {
    fn from(kind: IntakeKindInput) -> Self {
        match kind {
            IntakeKindInput::Mini => IntakeKind::Mini,
            IntakeKindInput::Full => IntakeKind::Full,
        }
    }
}

#[derive(Clone, Debug, InputObject)]
pub struct RegisterCandidateInput {
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub country: Option<String>,
}

impl RegisterCandidateInput {
    fn into_registration(self) -> async_graphql::Result<Registration> {
        let username = self.username.trim().to_string();
        if username.is_empty() {
            return Err(bad_request("username must not be empty"));
        }
        let gender = self.gender.as_deref().map(parse_gender).transpose()?;
        Ok(Registration {
            username,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            gender,
            phone: self.phone,
            whatsapp: self.whatsapp,
            country: self.country,
        })
    }
}

#[derive(Clone, Debug, InputObject)]
pub struct StatusChangeInput {
    pub status: String,
    pub candidate_message: Option<String>,
    pub comment: Option<String>,
}

#[derive(Default)]
pub struct CandidateQuery;

#[Object]
impl CandidateQuery {
    #[instrument(name = "graphql.candidate", skip(self, ctx))]
    async fn candidate(&self, ctx: &Context<'_>, id: i64) -> async_graphql::Result<CandidateNode> {
        require_user(ctx)?;
        let data = data(ctx)?;
        let model = candidate::Entity::find_by_id(id)
            .one(data.db.as_ref())
            .await
            .map_err(internal_error)?
            .ok_or_else(|| talent_error(TalentError::not_found("candidate", id)))?;
        CandidateNode::build(model)
    }

    /// Rows a published sheet would hold for these candidates, title row first.
    #[instrument(name = "graphql.publish_preview", skip(self, ctx, columns))]
    async fn publish_preview(
        &self,
        ctx: &Context<'_>,
        candidate_ids: Vec<i64>,
        columns: Json<Vec<ColumnDef>>,
    ) -> async_graphql::Result<Json<Vec<Vec<Value>>>> {
        require_user(ctx)?;
        let data = data(ctx)?;
        let views = load_candidate_views(data.db.as_ref(), &candidate_ids)
            .await
            .map_err(talent_error)?;
        let builder = PublishedDocBuilder::new(data.tokens.as_ref())
            .with_public_cv_base_url(data.public_cv_base_url.clone());
        Ok(Json(builder.build_doc(&views, &columns.0)))
    }
}

#[derive(Default)]
pub struct CandidateMutation;

#[Object]
impl CandidateMutation {
    async fn register_candidate(
        &self,
        ctx: &Context<'_>,
        input: RegisterCandidateInput,
    ) -> async_graphql::Result<CandidateNode> {
        let registration = input.into_registration()?;
        let data = data(ctx)?;
        let created = register_candidate(&data.db, registration)
            .await
            .map_err(talent_error)?;
        CandidateNode::build(created)
    }

    /// Fields omitted or null in `intake` keep their stored values.
    async fn update_candidate_intake(
        &self,
        ctx: &Context<'_>,
        id: i64,
        intake: Json<Value>,
    ) -> async_graphql::Result<CandidateNode> {
        require_user(ctx)?;
        let update: IntakeUpdate = serde_json::from_value(intake.0)
            .map_err(|err| bad_request(format!("invalid intake: {err}")))?;
        let data = data(ctx)?;
        let updated = update_candidate_intake(&data.db, id, update)
            .await
            .map_err(talent_error)?;
        CandidateNode::build(updated)
    }

    async fn complete_intake(
        &self,
        ctx: &Context<'_>,
        id: i64,
        kind: IntakeKindInput,
    ) -> async_graphql::Result<CandidateNode> {
        require_user(ctx)?;
        let data = data(ctx)?;
        let updated = complete_intake(&data.db, id, kind.into())
            .await
            .map_err(talent_error)?;
        CandidateNode::build(updated)
    }

    async fn update_candidate_status(
        &self,
        ctx: &Context<'_>,
        id: i64,
        input: StatusChangeInput,
    ) -> async_graphql::Result<CandidateNode> {
        let user = require_user(ctx)?;
        let change = StatusChange {
            status: parse_status(&input.status)?,
            candidate_message: input.candidate_message,
            comment: input.comment,
        };
        let data = data(ctx)?;
        let updated = update_candidate_status(&data.db, id, change, Some(user.id))
            .await
            .map_err(talent_error)?;
        CandidateNode::build(updated)
    }

    async fn soft_delete_candidate(
        &self,
        ctx: &Context<'_>,
        id: i64,
        comment: Option<String>,
    ) -> async_graphql::Result<CandidateNode> {
        let user = require_user(ctx)?;
        let data = data(ctx)?;
        let deleted = soft_delete_candidate(&data.db, id, comment, Some(user.id))
            .await
            .map_err(talent_error)?;
        CandidateNode::build(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_use_stored_values() {
        assert_eq!(parse_status("employed").unwrap(), CandidateStatus::Employed);
        assert!(parse_status("Employed").is_err());
    }

    #[test]
    fn registration_rejects_blank_username() {
        let input = RegisterCandidateInput {
            username: "  ".into(),
            first_name: None,
            last_name: None,
            email: None,
            gender: Some("female".into()),
            phone: None,
            whatsapp: None,
            country: None,
        };
        assert!(input.into_registration().is_err());
    }

    #[test]
    fn registration_parses_gender_case_insensitively() {
        let input = RegisterCandidateInput {
            username: "amira".into(),
            first_name: Some("Amira".into()),
            last_name: None,
            email: None,
            gender: Some("Female".into()),
            phone: None,
            whatsapp: None,
            country: Some("Jordan".into()),
        };
        let registration = input.into_registration().unwrap();
        assert_eq!(registration.gender, Some(Gender::Female));
        assert_eq!(registration.country.as_deref(), Some("Jordan"));
    }
}

mod candidates;
mod nodes;
mod pipeline;
mod sources;

use std::sync::Arc;

use async_graphql::{
    Context, EmptySubscription, Error, ErrorExtensions, MergedObject, Object, Schema, SimpleObject,
};
use platform_api::{ApiError, ApiResult, internal_error};
use products_talent::TalentError;
use products_talent::cv_token::CandidateTokenProvider;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::instrument;

use self::candidates::{CandidateMutation, CandidateQuery};
use self::pipeline::{PipelineMutation, PipelineQuery};
use self::sources::{SourceMutation, SourceQuery};

pub type SchemaType = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Handles shared by every resolver.
#[derive(Clone)]
pub struct GraphqlData {
    pub db: Arc<DatabaseConnection>,
    pub tokens: Arc<dyn CandidateTokenProvider>,
    pub public_cv_base_url: String,
}

/// Caller identity, taken from the `x-user-id` header the gateway sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestUser {
    pub id: i64,
}

pub fn build_schema(data: GraphqlData) -> SchemaType {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(data)
        .finish()
}

#[derive(Default)]
pub struct QueryRoot;

#[derive(Default)]
pub struct MutationRoot;

#[derive(MergedObject, Default)]
pub struct TalentQuery(SourceQuery, PipelineQuery, CandidateQuery);

#[derive(MergedObject, Default)]
pub struct TalentMutation(SourceMutation, PipelineMutation, CandidateMutation);

#[Object]
impl QueryRoot {
    #[instrument(name = "graphql.health", skip_all)]
    async fn health(&self) -> ApiResult<HealthPayload> {
        Ok(HealthPayload { ok: true })
    }

    #[instrument(name = "graphql.version", skip_all)]
    async fn version(&self) -> ApiResult<String> {
        Ok(env!("CARGO_PKG_VERSION").to_string())
    }

    async fn talent(&self) -> TalentQuery {
        TalentQuery::default()
    }
}

#[Object]
impl MutationRoot {
    async fn talent(&self) -> TalentMutation {
        TalentMutation::default()
    }
}

#[derive(Clone, Debug, SimpleObject, Serialize)]
pub struct HealthPayload {
    pub ok: bool,
}

pub(crate) fn data<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a GraphqlData> {
    ctx.data::<GraphqlData>()
        .map_err(|_| internal_error(anyhow::anyhow!("GraphQL data missing from schema")))
}

pub(crate) fn require_user(ctx: &Context<'_>) -> async_graphql::Result<RequestUser> {
    ctx.data_opt::<RequestUser>()
        .copied()
        .ok_or_else(|| ApiError::Unauthorized.extend())
}

pub(crate) fn bad_request(message: impl Into<String>) -> Error {
    ApiError::InvalidInput(message.into()).extend()
}

fn api_error(err: TalentError) -> ApiError {
    match err {
        TalentError::NotFound { entity, id } => ApiError::not_found(format!("{entity} {id}")),
        err @ TalentError::NotOwner { .. } => ApiError::Forbidden(err.to_string()),
        err @ (TalentError::UsernameTaken(_)
        | TalentError::UnknownStage(_)
        | TalentError::InvalidWatcherIds(_)
        | TalentError::InvalidRequest(_)) => ApiError::InvalidInput(err.to_string()),
        TalentError::Db(err) => ApiError::internal(err.into()),
    }
}

pub(crate) fn talent_error(err: TalentError) -> Error {
    api_error(err).extend()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::{Request, Value};
    use products_talent::cv_token::JwtTokenProvider;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    fn schema() -> SchemaType {
        build_schema(GraphqlData {
            db: Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection()),
            tokens: Arc::new(JwtTokenProvider::new("test-secret")),
            public_cv_base_url: "https://cv.example/".into(),
        })
    }

    fn error_code(response: &async_graphql::Response) -> Option<Value> {
        response.errors.first().and_then(|err| {
            err.extensions
                .as_ref()
                .and_then(|ext| ext.get("code"))
                .cloned()
        })
    }

    #[tokio::test]
    async fn health_query_returns_ok() {
        let response = schema().execute(Request::new("{ health { ok } }")).await;
        assert!(response.errors.is_empty());
        let body = response.data.into_json().unwrap();
        assert_eq!(body, json!({"health": {"ok": true}}));
    }

    #[tokio::test]
    async fn candidate_stages_are_listed_in_pipeline_order() {
        let response = schema()
            .execute(Request::new(
                "{ talent { candidateStages { value label ordinal closed won employed } } }",
            ))
            .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let body = response.data.into_json().unwrap();
        let stages = body["talent"]["candidateStages"].as_array().unwrap();
        assert_eq!(
            stages[0],
            json!({
                "value": "prospect",
                "label": "Prospect",
                "ordinal": 0,
                "closed": false,
                "won": false,
                "employed": false
            })
        );
        assert!(
            stages
                .iter()
                .enumerate()
                .all(|(index, stage)| stage["ordinal"] == json!(index))
        );
        let settled = stages.iter().find(|stage| stage["value"] == "settled").unwrap();
        assert_eq!(settled["won"], json!(true));
        assert_eq!(settled["employed"], json!(true));
    }

    #[tokio::test]
    async fn job_stages_have_no_employed_flag() {
        let response = schema()
            .execute(Request::new(
                "{ talent { jobStages { value label employed } } }",
            ))
            .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let body = response.data.into_json().unwrap();
        let stages = body["talent"]["jobStages"].as_array().unwrap();
        assert_eq!(stages[0]["label"], json!("Prospect"));
        assert!(stages.iter().all(|stage| stage["employed"].is_null()));
    }

    #[tokio::test]
    async fn candidate_reads_require_a_caller() {
        let schema = schema();
        for query in [
            "{ talent { candidate(id: 1) { id } } }",
            r#"{ talent { publishPreview(candidateIds: [1], columns: []) } }"#,
        ] {
            let response = schema.execute(Request::new(query)).await;
            assert_eq!(error_code(&response), Some(Value::from("UNAUTHORIZED")), "{query}");
        }
    }

    #[tokio::test]
    async fn mutations_require_a_caller() {
        let response = schema()
            .execute(Request::new(
                "mutation { talent { watchSource(source: {kind: SAVED_LIST, id: 1}) } }",
            ))
            .await;
        assert_eq!(error_code(&response), Some(Value::from("UNAUTHORIZED")));
    }

    #[tokio::test]
    async fn unknown_stage_is_a_bad_request() {
        let request = Request::new(
            r#"mutation { talent { moveJobOpportunityStage(input: {id: 1, stage: "nowhere"}) { id } } }"#,
        )
        .data(RequestUser { id: 1 });
        let response = schema().execute(request).await;
        assert_eq!(error_code(&response), Some(Value::from("BAD_REQUEST")));
    }

    #[test]
    fn talent_errors_map_to_api_codes() {
        assert_eq!(
            api_error(TalentError::not_found("saved list", 4)).code(),
            "NOT_FOUND"
        );
        assert_eq!(
            api_error(TalentError::NotOwner {
                entity: "saved list",
                id: 4
            })
            .code(),
            "FORBIDDEN"
        );
        assert_eq!(
            api_error(TalentError::UnknownStage("Nope".into())).code(),
            "BAD_REQUEST"
        );
        assert_eq!(
            api_error(TalentError::InvalidRequest("wrong candidate".into())).code(),
            "BAD_REQUEST"
        );
        assert_eq!(
            api_error(TalentError::Db(sea_orm::DbErr::Custom("down".into()))).code(),
            "INTERNAL"
        );
    }
}

use async_graphql::{Request, Value, Variables};
use entity::candidate::{self, CandidateStatus, YesNo};
use entity::{Status, candidate_note, users};
use products_talent::candidate::{
    IntakeUpdate, StatusChange, soft_delete_candidate, update_candidate_intake,
    update_candidate_status,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use talent_tests::PgTestContext;

fn error_code(resp: &async_graphql::Response) -> Option<Value> {
    resp.errors
        .first()
        .and_then(|err| err.extensions.as_ref())
        .and_then(|ext| ext.get("code"))
        .cloned()
}

#[tokio::test]
async fn registration_numbers_draft_candidates() {
    let Some(ctx) = PgTestContext::new_seeded().await else {
        return;
    };
    let mutation = r#"
        mutation Register($input: RegisterCandidateInput!) {
            talent {
                registerCandidate(input: $input) { id candidateNumber status userId }
            }
        }
    "#;
    let variables = json!({
        "input": {
            "username": "yusuf.k",
            "firstName": "Yusuf",
            "lastName": "Karimi",
            "gender": "male",
            "country": "Afghanistan"
        }
    });
    let resp = ctx
        .schema
        .execute(Request::new(mutation).variables(Variables::from_json(variables.clone())))
        .await;
    assert!(resp.errors.is_empty(), "errors: {:?}", resp.errors);
    let body = resp.data.into_json().unwrap();
    let created = &body["talent"]["registerCandidate"];
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["status"], json!("draft"));
    assert_eq!(created["candidateNumber"], json!(format!("{id:04}")));

    let resp = ctx
        .schema
        .execute(Request::new(mutation).variables(Variables::from_json(variables)))
        .await;
    assert_eq!(error_code(&resp), Some(Value::from("BAD_REQUEST")));

    ctx.cleanup().await;
}

#[tokio::test]
async fn intake_update_leaves_missing_fields_alone() {
    let Some(ctx) = PgTestContext::new_seeded().await else {
        return;
    };
    let candidate_id = ctx.seeded.candidate.id;
    let first = IntakeUpdate {
        avail_immediate: Some(YesNo::Yes),
        home_location: Some("Tripoli".into()),
        ..Default::default()
    };
    update_candidate_intake(&ctx.db, candidate_id, first)
        .await
        .unwrap();

    let mutation = r#"
        mutation Intake($id: Int!, $intake: JSON!) {
            talent { updateCandidateIntake(id: $id, intake: $intake) { profile } }
        }
    "#;
    let request = Request::new(mutation).variables(Variables::from_json(json!({
        "id": candidate_id,
        "intake": { "homeLocation": null, "maritalStatus": "Married", "numberDependants": 3 }
    })));
    let resp = ctx.execute_as(ctx.seeded.admin.id, request).await;
    assert!(resp.errors.is_empty(), "errors: {:?}", resp.errors);
    let body = resp.data.into_json().unwrap();
    let profile = &body["talent"]["updateCandidateIntake"]["profile"];
    assert_eq!(profile["availImmediate"], json!("Yes"));
    assert_eq!(profile["homeLocation"], json!("Tripoli"));
    assert_eq!(profile["maritalStatus"], json!("Married"));
    assert_eq!(profile["numberDependants"], json!(3));

    let resp = ctx
        .execute_as(
            ctx.seeded.admin.id,
            Request::new(format!(
                "mutation {{ talent {{ completeIntake(id: {candidate_id}, kind: MINI) {{ miniIntakeCompletedDate fullIntakeCompletedDate }} }} }}"
            )),
        )
        .await;
    assert!(resp.errors.is_empty(), "errors: {:?}", resp.errors);
    let body = resp.data.into_json().unwrap();
    let stamped = &body["talent"]["completeIntake"];
    assert!(stamped["miniIntakeCompletedDate"].is_string());
    assert!(stamped["fullIntakeCompletedDate"].is_null());

    ctx.cleanup().await;
}

#[tokio::test]
async fn soft_delete_keeps_row_and_disables_login() {
    let Some(ctx) = PgTestContext::new_seeded().await else {
        return;
    };
    let candidate_id = ctx.seeded.candidate.id;
    let user_id = ctx.seeded.candidate.user_id;
    let admin = ctx.seeded.admin.id;

    let deleted = soft_delete_candidate(&ctx.db, candidate_id, Some("duplicate".into()), Some(admin))
        .await
        .unwrap();
    assert_eq!(deleted.status, CandidateStatus::Deleted);
    assert!(
        candidate::Entity::find_by_id(candidate_id)
            .one(ctx.db.as_ref())
            .await
            .unwrap()
            .is_some()
    );
    let login = users::Entity::find_by_id(user_id)
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(login.status, Status::Deleted);

    let restored = update_candidate_status(
        &ctx.db,
        candidate_id,
        StatusChange {
            status: CandidateStatus::Active,
            candidate_message: Some("Welcome back".into()),
            comment: None,
        },
        Some(admin),
    )
    .await
    .unwrap();
    assert_eq!(restored.status, CandidateStatus::Active);
    assert_eq!(restored.candidate_message.as_deref(), Some("Welcome back"));
    let login = users::Entity::find_by_id(user_id)
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(login.status, Status::Active);

    // Same status again: nothing to note, but the message is cleared.
    let unchanged = update_candidate_status(
        &ctx.db,
        candidate_id,
        StatusChange {
            status: CandidateStatus::Active,
            candidate_message: None,
            comment: Some("no-op".into()),
        },
        Some(admin),
    )
    .await
    .unwrap();
    assert_eq!(unchanged.candidate_message, None);
    let notes = candidate_note::Entity::find()
        .filter(candidate_note::Column::CandidateId.eq(candidate_id))
        .count(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(notes, 2);

    ctx.cleanup().await;
}

#[tokio::test]
async fn status_mutation_requires_caller_and_known_status() {
    let Some(ctx) = PgTestContext::new_seeded().await else {
        return;
    };
    let mutation = format!(
        r#"mutation {{ talent {{ updateCandidateStatus(id: {}, input: {{ status: "employed" }}) {{ status }} }} }}"#,
        ctx.seeded.candidate.id
    );
    let resp = ctx.schema.execute(Request::new(mutation.clone())).await;
    assert_eq!(error_code(&resp), Some(Value::from("UNAUTHORIZED")));

    let resp = ctx
        .execute_as(ctx.seeded.admin.id, Request::new(mutation.replace("employed", "hired")))
        .await;
    assert_eq!(error_code(&resp), Some(Value::from("BAD_REQUEST")));

    let resp = ctx
        .execute_as(ctx.seeded.admin.id, Request::new(mutation))
        .await;
    assert!(resp.errors.is_empty(), "errors: {:?}", resp.errors);
    assert_eq!(
        resp.data.into_json().unwrap()["talent"]["updateCandidateStatus"]["status"],
        json!("employed")
    );

    let resp = ctx
        .execute_as(
            ctx.seeded.admin.id,
            Request::new(r#"mutation { talent { softDeleteCandidate(id: 987654) { id } } }"#),
        )
        .await;
    assert_eq!(error_code(&resp), Some(Value::from("NOT_FOUND")));

    ctx.cleanup().await;
}

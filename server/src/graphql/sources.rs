use async_graphql::{Context, Enum, InputObject, Json, Object};
use products_talent::sharing::{
    self, SourceKind, SourceRef, load_saved_list, load_saved_search, shared_with,
};
use products_talent::source::ExportColumnDef;
use serde_json::Value;
use tracing::instrument;

use super::nodes::{
    ExportColumnNode, SavedListNode, SavedSearchNode, SharedSourcesNode, SourceSummaryNode,
};
use super::{data, require_user, talent_error};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum SourceKindInput {
    #[graphql(name = "SAVED_LIST")]
    SavedList,
    #[graphql(name = "SAVED_SEARCH")]
    SavedSearch,
}

#[derive(Clone, Copy, Debug, InputObject)]
pub struct SourceInput {
    pub kind: SourceKindInput,
    pub id: i64,
}

impl From<SourceInput> for SourceRef {
    fn from(input: SourceInput) -> Self {
        let kind = match input.kind {
            SourceKindInput::SavedList => SourceKind::SavedList,
            SourceKindInput::SavedSearch => SourceKind::SavedSearch,
        };
        SourceRef { kind, id: input.id }
    }
}

#[derive(Clone, Debug, InputObject)]
pub struct ExportColumnInput {
    pub key: String,
    pub properties: Option<Json<Value>>,
}

fn ids(set: std::collections::BTreeSet<i64>) -> Vec<i64> {
    set.into_iter().collect()
}

#[derive(Default)]
pub struct SourceQuery;

#[Object]
impl SourceQuery {
    #[instrument(name = "graphql.saved_list", skip(self, ctx))]
    async fn saved_list(&self, ctx: &Context<'_>, id: i64) -> async_graphql::Result<SavedListNode> {
        let data = data(ctx)?;
        let list = load_saved_list(data.db.as_ref(), id)
            .await
            .map_err(talent_error)?;
        SavedListNode::build(&list)
    }

    #[instrument(name = "graphql.saved_search", skip(self, ctx))]
    async fn saved_search(
        &self,
        ctx: &Context<'_>,
        id: i64,
    ) -> async_graphql::Result<SavedSearchNode> {
        let data = data(ctx)?;
        let search = load_saved_search(data.db.as_ref(), id)
            .await
            .map_err(talent_error)?;
        SavedSearchNode::build(&search)
    }

    /// Lists and searches other users have shared with the caller.
    #[instrument(name = "graphql.shared_with_me", skip_all)]
    async fn shared_with_me(&self, ctx: &Context<'_>) -> async_graphql::Result<SharedSourcesNode> {
        let user = require_user(ctx)?;
        let data = data(ctx)?;
        let (lists, searches) = shared_with(data.db.as_ref(), user.id)
            .await
            .map_err(talent_error)?;
        Ok(SharedSourcesNode {
            saved_lists: lists.into_iter().map(SourceSummaryNode::from).collect(),
            saved_searches: searches.into_iter().map(SourceSummaryNode::from).collect(),
        })
    }
}

#[derive(Default)]
pub struct SourceMutation;

/// Mutations return the ids the source is shared with or watched by afterwards.
#[Object]
impl SourceMutation {
    async fn share_source(
        &self,
        ctx: &Context<'_>,
        source: SourceInput,
        user_id: i64,
    ) -> async_graphql::Result<Vec<i64>> {
        let user = require_user(ctx)?;
        let data = data(ctx)?;
        sharing::share_source(&data.db, user.id, source.into(), user_id)
            .await
            .map(ids)
            .map_err(talent_error)
    }

    async fn unshare_source(
        &self,
        ctx: &Context<'_>,
        source: SourceInput,
        user_id: i64,
    ) -> async_graphql::Result<Vec<i64>> {
        let user = require_user(ctx)?;
        let data = data(ctx)?;
        sharing::unshare_source(&data.db, user.id, source.into(), user_id)
            .await
            .map(ids)
            .map_err(talent_error)
    }

    async fn set_source_users(
        &self,
        ctx: &Context<'_>,
        source: SourceInput,
        user_ids: Vec<i64>,
    ) -> async_graphql::Result<Vec<i64>> {
        let user = require_user(ctx)?;
        let data = data(ctx)?;
        sharing::set_source_users(&data.db, user.id, source.into(), &user_ids)
            .await
            .map(ids)
            .map_err(talent_error)
    }

    /// Watch as the caller unless `userId` names someone else.
    async fn watch_source(
        &self,
        ctx: &Context<'_>,
        source: SourceInput,
        user_id: Option<i64>,
    ) -> async_graphql::Result<Vec<i64>> {
        let user = require_user(ctx)?;
        let data = data(ctx)?;
        let watcher = user_id.unwrap_or(user.id);
        sharing::watch_source(&data.db, user.id, source.into(), watcher)
            .await
            .map(ids)
            .map_err(talent_error)
    }

    async fn unwatch_source(
        &self,
        ctx: &Context<'_>,
        source: SourceInput,
        user_id: Option<i64>,
    ) -> async_graphql::Result<Vec<i64>> {
        let user = require_user(ctx)?;
        let data = data(ctx)?;
        let watcher = user_id.unwrap_or(user.id);
        sharing::unwatch_source(&data.db, user.id, source.into(), watcher)
            .await
            .map(ids)
            .map_err(talent_error)
    }

    /// Replace the export columns; indices follow the order given.
    async fn set_export_columns(
        &self,
        ctx: &Context<'_>,
        source: SourceInput,
        columns: Vec<ExportColumnInput>,
    ) -> async_graphql::Result<Vec<ExportColumnNode>> {
        let user = require_user(ctx)?;
        let data = data(ctx)?;
        let columns = columns
            .into_iter()
            .map(|column| ExportColumnDef {
                key: column.key,
                index: 0,
                properties: column.properties.map(|Json(value)| value),
            })
            .collect();
        let saved = sharing::set_export_columns(&data.db, user.id, source.into(), columns)
            .await
            .map_err(talent_error)?;
        Ok(saved.into_iter().map(ExportColumnNode::from).collect())
    }
}

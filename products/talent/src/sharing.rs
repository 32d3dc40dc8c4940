//! Persistent sharing, watching and export-column changes for candidate sources.
//!
//! Each call loads the source into its domain type, applies the change there and writes
//! the difference back inside one transaction.

use std::collections::BTreeSet;

use chrono::Utc;
use entity::{
    export_column, salesforce_job_opp, saved_list, saved_list_user, saved_search,
    saved_search_user, users,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{Instrument, info_span};

use crate::error::{TalentError, TalentResult};
use crate::source::{
    CandidateSource, ExportColumnDef, JobSummary, SavedList, SavedSearch, SourceCommon, User,
    UserDirectory,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    SavedList,
    SavedSearch,
}

/// Address of a saved list or saved search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceRef {
    pub kind: SourceKind,
    pub id: i64,
}

impl SourceRef {
    pub fn list(id: i64) -> Self {
        Self {
            kind: SourceKind::SavedList,
            id,
        }
    }

    pub fn search(id: i64) -> Self {
        Self {
            kind: SourceKind::SavedSearch,
            id,
        }
    }
}

/// A source loaded with its users and export columns.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadedSource {
    List(SavedList),
    Search(SavedSearch),
}

impl LoadedSource {
    pub fn common(&self) -> &SourceCommon {
        match self {
            LoadedSource::List(list) => list.common(),
            LoadedSource::Search(search) => search.common(),
        }
    }

    fn common_mut(&mut self) -> &mut SourceCommon {
        match self {
            LoadedSource::List(list) => list.common_mut(),
            LoadedSource::Search(search) => search.common_mut(),
        }
    }

    fn ensure_modifiable(&self, actor: i64) -> TalentResult<()> {
        match self {
            LoadedSource::List(list) => list.ensure_modifiable(actor),
            LoadedSource::Search(search) => search.ensure_modifiable(actor),
        }
    }

    fn add_user(&mut self, user: &mut User) {
        match self {
            LoadedSource::List(list) => list.add_user(user),
            LoadedSource::Search(search) => search.add_user(user),
        }
    }

    fn remove_user(&mut self, user: &mut User) {
        match self {
            LoadedSource::List(list) => list.remove_user(user),
            LoadedSource::Search(search) => search.remove_user(user),
        }
    }

    fn set_users(&mut self, directory: &mut UserDirectory, ids: &[i64]) -> TalentResult<()> {
        match self {
            LoadedSource::List(list) => list.set_users(directory, ids),
            LoadedSource::Search(search) => search.set_users(directory, ids),
        }
    }
}

pub async fn load_saved_list<C: ConnectionTrait>(conn: &C, id: i64) -> TalentResult<SavedList> {
    let model = saved_list::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| TalentError::not_found("saved list", id))?;
    let users = saved_list_user::Entity::find()
        .filter(saved_list_user::Column::SavedListId.eq(id))
        .all(conn)
        .await?;
    let columns = export_column::Entity::find()
        .filter(export_column::Column::SavedListId.eq(id))
        .order_by_asc(export_column::Column::Index)
        .all(conn)
        .await?;
    let job = match model.job_id {
        Some(job_id) => salesforce_job_opp::Entity::find_by_id(job_id)
            .one(conn)
            .await?
            .map(|job| JobSummary {
                stage: job.stage,
                closed: job.closed,
            }),
        None => None,
    };
    Ok(SavedList::from_model(
        model,
        users.into_iter().map(|row| row.user_id),
        columns,
        job,
    ))
}

pub async fn load_saved_search<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> TalentResult<SavedSearch> {
    let model = saved_search::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| TalentError::not_found("saved search", id))?;
    let users = saved_search_user::Entity::find()
        .filter(saved_search_user::Column::SavedSearchId.eq(id))
        .all(conn)
        .await?;
    let columns = export_column::Entity::find()
        .filter(export_column::Column::SavedSearchId.eq(id))
        .order_by_asc(export_column::Column::Index)
        .all(conn)
        .await?;
    Ok(SavedSearch::from_model(
        model,
        users.into_iter().map(|row| row.user_id),
        columns,
    ))
}

pub async fn load_source<C: ConnectionTrait>(
    conn: &C,
    source: SourceRef,
) -> TalentResult<LoadedSource> {
    Ok(match source.kind {
        SourceKind::SavedList => LoadedSource::List(load_saved_list(conn, source.id).await?),
        SourceKind::SavedSearch => LoadedSource::Search(load_saved_search(conn, source.id).await?),
    })
}

/// Sources shared with `user_id`.
pub async fn shared_with<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
) -> TalentResult<(Vec<saved_list::Model>, Vec<saved_search::Model>)> {
    let user = users::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| TalentError::not_found("user", user_id))?;
    let lists = user
        .find_related(saved_list::Entity)
        .order_by_asc(saved_list::Column::Name)
        .all(conn)
        .await?;
    let searches = user
        .find_related(saved_search::Entity)
        .order_by_asc(saved_search::Column::Name)
        .all(conn)
        .await?;
    Ok((lists, searches))
}

async fn directory_for<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = i64>,
) -> TalentResult<UserDirectory> {
    let ids: Vec<i64> = ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    if ids.is_empty() {
        return Ok(UserDirectory::default());
    }
    let found = users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .all(conn)
        .await?;
    Ok(UserDirectory::new(found.into_iter().map(|user| User::new(user.id))))
}

async fn write_shares<C: ConnectionTrait>(
    conn: &C,
    source: SourceRef,
    before: &BTreeSet<i64>,
    after: &BTreeSet<i64>,
) -> TalentResult<()> {
    let removed: Vec<i64> = before.difference(after).copied().collect();
    let added: Vec<i64> = after.difference(before).copied().collect();
    match source.kind {
        SourceKind::SavedList => {
            if !removed.is_empty() {
                saved_list_user::Entity::delete_many()
                    .filter(saved_list_user::Column::SavedListId.eq(source.id))
                    .filter(saved_list_user::Column::UserId.is_in(removed))
                    .exec(conn)
                    .await?;
            }
            if !added.is_empty() {
                saved_list_user::Entity::insert_many(added.into_iter().map(|user_id| {
                    saved_list_user::ActiveModel {
                        saved_list_id: Set(source.id),
                        user_id: Set(user_id),
                    }
                }))
                .exec_without_returning(conn)
                .await?;
            }
        }
        SourceKind::SavedSearch => {
            if !removed.is_empty() {
                saved_search_user::Entity::delete_many()
                    .filter(saved_search_user::Column::SavedSearchId.eq(source.id))
                    .filter(saved_search_user::Column::UserId.is_in(removed))
                    .exec(conn)
                    .await?;
            }
            if !added.is_empty() {
                saved_search_user::Entity::insert_many(added.into_iter().map(|user_id| {
                    saved_search_user::ActiveModel {
                        saved_search_id: Set(source.id),
                        user_id: Set(user_id),
                    }
                }))
                .exec_without_returning(conn)
                .await?;
            }
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug)]
enum ShareChange<'a> {
    Add(i64),
    Remove(i64),
    Replace(&'a [i64]),
}

async fn change_shares(
    db: &DatabaseConnection,
    actor: i64,
    source: SourceRef,
    change: ShareChange<'_>,
) -> TalentResult<BTreeSet<i64>> {
    let txn = db.begin().await?;
    let mut loaded = load_source(&txn, source).await?;
    loaded.ensure_modifiable(actor)?;
    let before = loaded.common().users().clone();

    match change {
        ShareChange::Add(user_id) | ShareChange::Remove(user_id) => {
            let mut directory = directory_for(&txn, [user_id]).await?;
            let user = directory
                .get_mut(user_id)
                .ok_or_else(|| TalentError::not_found("user", user_id))?;
            if matches!(change, ShareChange::Add(_)) {
                loaded.add_user(user);
            } else {
                loaded.remove_user(user);
            }
        }
        ShareChange::Replace(user_ids) => {
            let mut directory =
                directory_for(&txn, before.iter().chain(user_ids).copied()).await?;
            loaded.set_users(&mut directory, user_ids)?;
        }
    }

    let after = loaded.common().users().clone();
    write_shares(&txn, source, &before, &after).await?;
    txn.commit().await?;
    Ok(after)
}

/// Share a source with one more user. Returns the ids it is now shared with.
pub async fn share_source(
    db: &DatabaseConnection,
    actor: i64,
    source: SourceRef,
    user_id: i64,
) -> TalentResult<BTreeSet<i64>> {
    change_shares(db, actor, source, ShareChange::Add(user_id))
        .instrument(info_span!("talent.source.share", ?source, user_id))
        .await
}

pub async fn unshare_source(
    db: &DatabaseConnection,
    actor: i64,
    source: SourceRef,
    user_id: i64,
) -> TalentResult<BTreeSet<i64>> {
    change_shares(db, actor, source, ShareChange::Remove(user_id))
        .instrument(info_span!("talent.source.unshare", ?source, user_id))
        .await
}

/// Share with exactly `user_ids`.
pub async fn set_source_users(
    db: &DatabaseConnection,
    actor: i64,
    source: SourceRef,
    user_ids: &[i64],
) -> TalentResult<BTreeSet<i64>> {
    change_shares(db, actor, source, ShareChange::Replace(user_ids))
        .instrument(info_span!("talent.source.set_users", ?source, count = user_ids.len()))
        .await
}

async fn write_source_header<C: ConnectionTrait>(
    conn: &C,
    source: SourceRef,
    watcher_ids: Option<String>,
    actor: i64,
) -> TalentResult<()> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    match source.kind {
        SourceKind::SavedList => {
            saved_list::Entity::update_many()
                .col_expr(saved_list::Column::WatcherIds, Expr::value(watcher_ids))
                .col_expr(saved_list::Column::UpdatedBy, Expr::value(Some(actor)))
                .col_expr(saved_list::Column::UpdatedDate, Expr::value(Some(now)))
                .filter(saved_list::Column::Id.eq(source.id))
                .exec(conn)
                .await?;
        }
        SourceKind::SavedSearch => {
            saved_search::Entity::update_many()
                .col_expr(saved_search::Column::WatcherIds, Expr::value(watcher_ids))
                .col_expr(saved_search::Column::UpdatedBy, Expr::value(Some(actor)))
                .col_expr(saved_search::Column::UpdatedDate, Expr::value(Some(now)))
                .filter(saved_search::Column::Id.eq(source.id))
                .exec(conn)
                .await?;
        }
    }
    Ok(())
}

async fn change_watchers(
    db: &DatabaseConnection,
    actor: i64,
    source: SourceRef,
    user_id: i64,
    watch: bool,
) -> TalentResult<BTreeSet<i64>> {
    let txn = db.begin().await?;
    let mut loaded = load_source(&txn, source).await?;
    // Anyone may watch or unwatch for themselves.
    if user_id != actor {
        loaded.ensure_modifiable(actor)?;
    }
    if users::Entity::find_by_id(user_id).one(&txn).await?.is_none() {
        return Err(TalentError::not_found("user", user_id));
    }

    let common = loaded.common_mut();
    if watch {
        common.add_watcher(user_id)?;
    } else {
        common.remove_watcher(user_id)?;
    }
    let watchers = common.watcher_user_ids()?;
    write_source_header(&txn, source, common.watcher_ids_raw().map(str::to_string), actor).await?;
    txn.commit().await?;
    Ok(watchers)
}

pub async fn watch_source(
    db: &DatabaseConnection,
    actor: i64,
    source: SourceRef,
    user_id: i64,
) -> TalentResult<BTreeSet<i64>> {
    change_watchers(db, actor, source, user_id, true)
        .instrument(info_span!("talent.source.watch", ?source, user_id))
        .await
}

pub async fn unwatch_source(
    db: &DatabaseConnection,
    actor: i64,
    source: SourceRef,
    user_id: i64,
) -> TalentResult<BTreeSet<i64>> {
    change_watchers(db, actor, source, user_id, false)
        .instrument(info_span!("talent.source.unwatch", ?source, user_id))
        .await
}

/// Replace the source's export columns, renumbered in the given order.
pub async fn set_export_columns(
    db: &DatabaseConnection,
    actor: i64,
    source: SourceRef,
    columns: Vec<ExportColumnDef>,
) -> TalentResult<Vec<ExportColumnDef>> {
    let span = info_span!("talent.source.set_export_columns", ?source, count = columns.len());
    async move {
        let txn = db.begin().await?;
        let mut loaded = load_source(&txn, source).await?;
        loaded.ensure_modifiable(actor)?;
        loaded.common_mut().set_export_columns(columns);
        let columns = loaded.common().export_columns().to_vec();

        let (list_id, search_id, owner_column) = match source.kind {
            SourceKind::SavedList => (Some(source.id), None, export_column::Column::SavedListId),
            SourceKind::SavedSearch => {
                (None, Some(source.id), export_column::Column::SavedSearchId)
            }
        };
        export_column::Entity::delete_many()
            .filter(owner_column.eq(source.id))
            .exec(&txn)
            .await?;
        if !columns.is_empty() {
            export_column::Entity::insert_many(columns.iter().map(|column| {
                export_column::ActiveModel {
                    saved_list_id: Set(list_id),
                    saved_search_id: Set(search_id),
                    key: Set(column.key.clone()),
                    index: Set(column.index),
                    properties: Set(column.properties.clone()),
                    ..Default::default()
                }
            }))
            .exec_without_returning(&txn)
            .await?;
        }
        let watcher_ids = loaded.common().watcher_ids_raw().map(str::to_string);
        write_source_header(&txn, source, watcher_ids, actor).await?;
        txn.commit().await?;
        Ok(columns)
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity::Status;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn fixed_list(owner: i64) -> saved_list::Model {
        saved_list::Model {
            id: 4,
            public_id: "7c1e6b8e-5d3c-4c59-9b55-1f1a4a3c9e01".into(),
            name: "Nurses".into(),
            description: None,
            status: Status::Active,
            fixed: true,
            global: false,
            watcher_ids: Some("3".into()),
            displayed_fields_long: None,
            displayed_fields_short: None,
            job_id: None,
            registered_job: false,
            tbb_short_name: None,
            published_doc_link: None,
            folderlink: None,
            folderjdlink: None,
            file_jd_name: None,
            file_jd_link: None,
            saved_search_id: None,
            saved_search_source_id: None,
            created_by: owner,
            created_date: Utc::now().into(),
            updated_by: None,
            updated_date: None,
        }
    }

    #[tokio::test]
    async fn non_owner_cannot_share_fixed_list() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![fixed_list(1)]])
            .append_query_results([Vec::<saved_list_user::Model>::new()])
            .append_query_results([Vec::<export_column::Model>::new()])
            .into_connection();

        let err = share_source(&db, 2, SourceRef::list(4), 5).await.unwrap_err();
        assert!(matches!(err, TalentError::NotOwner { entity: "saved list", id: 4 }));
    }

    #[tokio::test]
    async fn sharing_missing_list_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<saved_list::Model>::new()])
            .into_connection();

        let err = share_source(&db, 1, SourceRef::list(4), 5).await.unwrap_err();
        assert!(matches!(err, TalentError::NotFound { entity: "saved list", id: 4 }));
    }
}

use sea_orm_migration::prelude::*;

use crate::m20240901_000001_users_and_jobs::{SalesforceJobOpp, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut saved_search = Table::create();
        saved_search.table(SavedSearch::Table).if_not_exists();
        source_columns(
            &mut saved_search,
            SavedSearch::Table.into_iden(),
            "fk_saved_search_owner",
            "fk_saved_search_job",
        );
        saved_search
            .col(ColumnDef::new(SavedSearch::Type).string_len(64))
            .col(
                ColumnDef::new(SavedSearch::DefaultSearch)
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(
                ColumnDef::new(SavedSearch::Reviewable)
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(ColumnDef::new(SavedSearch::SimpleQueryString).text())
            .col(ColumnDef::new(SavedSearch::Keyword).text())
            .col(ColumnDef::new(SavedSearch::Statuses).text())
            .col(ColumnDef::new(SavedSearch::AnyOpps).boolean())
            .col(ColumnDef::new(SavedSearch::ClosedOpps).boolean())
            .col(ColumnDef::new(SavedSearch::RelocatedOpps).boolean())
            .col(ColumnDef::new(SavedSearch::ExclusionListId).big_integer());
        manager.create_table(saved_search.to_owned()).await?;

        let mut saved_list = Table::create();
        saved_list.table(SavedList::Table).if_not_exists();
        source_columns(
            &mut saved_list,
            SavedList::Table.into_iden(),
            "fk_saved_list_owner",
            "fk_saved_list_job",
        );
        saved_list
            .col(
                ColumnDef::new(SavedList::RegisteredJob)
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(ColumnDef::new(SavedList::TbbShortName).string_len(64).unique_key())
            .col(ColumnDef::new(SavedList::PublishedDocLink).string())
            .col(ColumnDef::new(SavedList::Folderlink).string())
            .col(ColumnDef::new(SavedList::Folderjdlink).string())
            .col(ColumnDef::new(SavedList::FileJdName).string())
            .col(ColumnDef::new(SavedList::FileJdLink).string())
            .col(ColumnDef::new(SavedList::SavedSearchId).big_integer())
            .col(ColumnDef::new(SavedList::SavedSearchSourceId).big_integer())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_saved_list_selection_search")
                    .from(SavedList::Table, SavedList::SavedSearchId)
                    .to(SavedSearch::Table, Source::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            );
        manager.create_table(saved_list.to_owned()).await?;

        manager
            .create_table(
                Table::create()
                    .table(SavedListUser::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavedListUser::SavedListId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SavedListUser::UserId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(SavedListUser::SavedListId)
                            .col(SavedListUser::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_saved_list_user_list")
                            .from(SavedListUser::Table, SavedListUser::SavedListId)
                            .to(SavedList::Table, Source::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_saved_list_user_user")
                            .from(SavedListUser::Table, SavedListUser::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SavedSearchUser::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavedSearchUser::SavedSearchId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavedSearchUser::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(SavedSearchUser::SavedSearchId)
                            .col(SavedSearchUser::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_saved_search_user_search")
                            .from(SavedSearchUser::Table, SavedSearchUser::SavedSearchId)
                            .to(SavedSearch::Table, Source::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_saved_search_user_user")
                            .from(SavedSearchUser::Table, SavedSearchUser::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExportColumn::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExportColumn::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExportColumn::SavedListId).big_integer())
                    .col(ColumnDef::new(ExportColumn::SavedSearchId).big_integer())
                    .col(ColumnDef::new(ExportColumn::Key).string_len(64).not_null())
                    .col(ColumnDef::new(ExportColumn::Index).integer().not_null())
                    .col(ColumnDef::new(ExportColumn::Properties).json_binary())
                    .check(Expr::cust(
                        "(saved_list_id IS NULL) <> (saved_search_id IS NULL)",
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_export_column_list")
                            .from(ExportColumn::Table, ExportColumn::SavedListId)
                            .to(SavedList::Table, Source::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_export_column_search")
                            .from(ExportColumn::Table, ExportColumn::SavedSearchId)
                            .to(SavedSearch::Table, Source::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, table, column) in [
            ("idx_saved_list_created_by", SavedList::Table.into_iden(), Source::CreatedBy),
            ("idx_saved_search_created_by", SavedSearch::Table.into_iden(), Source::CreatedBy),
            ("idx_saved_list_job", SavedList::Table.into_iden(), Source::JobId),
            ("idx_saved_search_job", SavedSearch::Table.into_iden(), Source::JobId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            ExportColumn::Table.into_iden(),
            SavedSearchUser::Table.into_iden(),
            SavedListUser::Table.into_iden(),
            SavedList::Table.into_iden(),
            SavedSearch::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

/// Columns shared by saved lists and saved searches.
fn source_columns(
    table: &mut TableCreateStatement,
    name: DynIden,
    owner_fk: &str,
    job_fk: &str,
) {
    table
        .col(
            ColumnDef::new(Source::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(Source::PublicId)
                .string_len(36)
                .not_null()
                .unique_key(),
        )
        .col(ColumnDef::new(Source::Name).string().not_null())
        .col(ColumnDef::new(Source::Description).text())
        .col(
            ColumnDef::new(Source::Status)
                .string_len(16)
                .not_null()
                .default("active"),
        )
        .col(ColumnDef::new(Source::Fixed).boolean().not_null().default(false))
        .col(ColumnDef::new(Source::Global).boolean().not_null().default(false))
        .col(ColumnDef::new(Source::WatcherIds).text())
        .col(ColumnDef::new(Source::DisplayedFieldsLong).text())
        .col(ColumnDef::new(Source::DisplayedFieldsShort).text())
        .col(ColumnDef::new(Source::JobId).big_integer())
        .col(ColumnDef::new(Source::CreatedBy).big_integer().not_null())
        .col(
            ColumnDef::new(Source::CreatedDate)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(ColumnDef::new(Source::UpdatedBy).big_integer())
        .col(ColumnDef::new(Source::UpdatedDate).timestamp_with_time_zone())
        .foreign_key(
            ForeignKey::create()
                .name(owner_fk)
                .from(name.clone(), Source::CreatedBy)
                .to(Users::Table, Users::Id),
        )
        .foreign_key(
            ForeignKey::create()
                .name(job_fk)
                .from(name, Source::JobId)
                .to(SalesforceJobOpp::Table, SalesforceJobOpp::Id)
                .on_delete(ForeignKeyAction::SetNull),
        );
}

#[derive(DeriveIden)]
enum Source {
    Id,
    PublicId,
    Name,
    Description,
    Status,
    Fixed,
    Global,
    WatcherIds,
    DisplayedFieldsLong,
    DisplayedFieldsShort,
    JobId,
    CreatedBy,
    CreatedDate,
    UpdatedBy,
    UpdatedDate,
}

#[derive(DeriveIden)]
enum SavedSearch {
    Table,
    Type,
    DefaultSearch,
    Reviewable,
    SimpleQueryString,
    Keyword,
    Statuses,
    AnyOpps,
    ClosedOpps,
    RelocatedOpps,
    ExclusionListId,
}

#[derive(DeriveIden)]
enum SavedList {
    Table,
    RegisteredJob,
    TbbShortName,
    PublishedDocLink,
    Folderlink,
    Folderjdlink,
    FileJdName,
    FileJdLink,
    SavedSearchId,
    SavedSearchSourceId,
}

#[derive(DeriveIden)]
enum SavedListUser {
    Table,
    SavedListId,
    UserId,
}

#[derive(DeriveIden)]
enum SavedSearchUser {
    Table,
    SavedSearchId,
    UserId,
}

#[derive(DeriveIden)]
enum ExportColumn {
    Table,
    Id,
    SavedListId,
    SavedSearchId,
    Key,
    Index,
    Properties,
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::FirstName).string())
                    .col(ColumnDef::new(Users::LastName).string())
                    .col(ColumnDef::new(Users::Email).string())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(16)
                            .not_null()
                            .default("user"),
                    )
                    .col(
                        ColumnDef::new(Users::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedDate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SalesforceJobOpp::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SalesforceJobOpp::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SalesforceJobOpp::SfId).string_len(32).unique_key())
                    .col(ColumnDef::new(SalesforceJobOpp::Name).string().not_null())
                    .col(ColumnDef::new(SalesforceJobOpp::AccountId).string_len(32))
                    .col(ColumnDef::new(SalesforceJobOpp::Employer).string())
                    .col(ColumnDef::new(SalesforceJobOpp::Country).string())
                    .col(ColumnDef::new(SalesforceJobOpp::Description).text())
                    .col(
                        ColumnDef::new(SalesforceJobOpp::Stage)
                            .string_len(64)
                            .not_null()
                            .default("prospect"),
                    )
                    .col(
                        ColumnDef::new(SalesforceJobOpp::StageOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SalesforceJobOpp::Closed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SalesforceJobOpp::Won)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(SalesforceJobOpp::NextStep).text())
                    .col(ColumnDef::new(SalesforceJobOpp::NextStepDueDate).date())
                    .col(ColumnDef::new(SalesforceJobOpp::ClosingComments).text())
                    .col(
                        ColumnDef::new(SalesforceJobOpp::Evergreen)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(SalesforceJobOpp::SubmissionDueDate).date())
                    .col(ColumnDef::new(SalesforceJobOpp::SubmissionListId).big_integer())
                    .col(ColumnDef::new(SalesforceJobOpp::SuggestedListId).big_integer())
                    .col(ColumnDef::new(SalesforceJobOpp::ExclusionListId).big_integer())
                    .col(ColumnDef::new(SalesforceJobOpp::HiringCommitment).big_integer())
                    .col(
                        ColumnDef::new(SalesforceJobOpp::CreatedDate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(SalesforceJobOpp::UpdatedDate).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_salesforce_job_opp_stage_order")
                    .table(SalesforceJobOpp::Table)
                    .col(SalesforceJobOpp::StageOrder)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SalesforceJobOpp::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Username,
    FirstName,
    LastName,
    Email,
    Role,
    Status,
    CreatedDate,
}

#[derive(DeriveIden)]
pub(crate) enum SalesforceJobOpp {
    Table,
    Id,
    SfId,
    Name,
    AccountId,
    Employer,
    Country,
    Description,
    Stage,
    StageOrder,
    Closed,
    Won,
    NextStep,
    NextStepDueDate,
    ClosingComments,
    Evergreen,
    SubmissionDueDate,
    SubmissionListId,
    SuggestedListId,
    ExclusionListId,
    HiringCommitment,
    CreatedDate,
    UpdatedDate,
}

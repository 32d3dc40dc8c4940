use sea_orm_migration::prelude::*;

use crate::m20240901_000001_users_and_jobs::{SalesforceJobOpp, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Candidate::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Candidate::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Candidate::CandidateNumber)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Candidate::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Candidate::Status)
                            .string_len(32)
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Candidate::Gender).string_len(16))
                    .col(ColumnDef::new(Candidate::Dob).date())
                    .col(ColumnDef::new(Candidate::Phone).string_len(64))
                    .col(ColumnDef::new(Candidate::Whatsapp).string_len(64))
                    .col(ColumnDef::new(Candidate::Nationality).string())
                    .col(ColumnDef::new(Candidate::Country).string())
                    .col(ColumnDef::new(Candidate::City).string())
                    .col(ColumnDef::new(Candidate::Address1).string())
                    .col(ColumnDef::new(Candidate::AdditionalInfo).text())
                    .col(ColumnDef::new(Candidate::CandidateMessage).text())
                    .col(ColumnDef::new(Candidate::LinkedInLink).string())
                    .col(ColumnDef::new(Candidate::ShareableCvAttachmentId).big_integer())
                    .col(ColumnDef::new(Candidate::ShareableDocAttachmentId).big_integer())
                    .col(ColumnDef::new(Candidate::AvailImmediate).string_len(8))
                    .col(ColumnDef::new(Candidate::AvailImmediateNotes).text())
                    .col(ColumnDef::new(Candidate::FamilyMove).string_len(8))
                    .col(ColumnDef::new(Candidate::FamilyMoveNotes).text())
                    .col(ColumnDef::new(Candidate::IntRecruitReasons).text())
                    .col(ColumnDef::new(Candidate::LeftHomeReasons).text())
                    .col(ColumnDef::new(Candidate::HomeLocation).string())
                    .col(ColumnDef::new(Candidate::ResidenceStatus).string_len(64))
                    .col(ColumnDef::new(Candidate::WorkAbroad).string_len(8))
                    .col(ColumnDef::new(Candidate::WorkAbroadNotes).text())
                    .col(ColumnDef::new(Candidate::HostEntryYear).integer())
                    .col(ColumnDef::new(Candidate::UnhcrStatus).string_len(64))
                    .col(ColumnDef::new(Candidate::UnhcrNumber).string_len(64))
                    .col(ColumnDef::new(Candidate::IeltsScore).string_len(16))
                    .col(ColumnDef::new(Candidate::MaritalStatus).string_len(32))
                    .col(ColumnDef::new(Candidate::NumberDependants).integer())
                    .col(ColumnDef::new(Candidate::Conflict).string_len(8))
                    .col(ColumnDef::new(Candidate::ConflictNotes).text())
                    .col(ColumnDef::new(Candidate::CrimeConvict).string_len(8))
                    .col(ColumnDef::new(Candidate::CrimeConvictNotes).text())
                    .col(ColumnDef::new(Candidate::VisaReject).string_len(8))
                    .col(ColumnDef::new(Candidate::VisaRejectNotes).text())
                    .col(ColumnDef::new(Candidate::DrivingLicense).string_len(32))
                    .col(
                        ColumnDef::new(Candidate::MiniIntakeCompletedDate)
                            .timestamp_with_time_zone(),
                    )
                    .col(
                        ColumnDef::new(Candidate::FullIntakeCompletedDate)
                            .timestamp_with_time_zone(),
                    )
                    .col(
                        ColumnDef::new(Candidate::CreatedDate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Candidate::UpdatedDate).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_candidate_user")
                            .from(Candidate::Table, Candidate::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CandidateAttachment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CandidateAttachment::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CandidateAttachment::CandidateId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CandidateAttachment::Name).string().not_null())
                    .col(
                        ColumnDef::new(CandidateAttachment::Location)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CandidateAttachment::AttachmentType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CandidateAttachment::Cv)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CandidateAttachment::CreatedDate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_candidate_attachment_candidate")
                            .from(CandidateAttachment::Table, CandidateAttachment::CandidateId)
                            .to(Candidate::Table, Candidate::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CandidateNote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CandidateNote::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CandidateNote::CandidateId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CandidateNote::NoteType)
                            .string_len(16)
                            .not_null()
                            .default("admin"),
                    )
                    .col(ColumnDef::new(CandidateNote::Title).string().not_null())
                    .col(ColumnDef::new(CandidateNote::Comment).text())
                    .col(ColumnDef::new(CandidateNote::CreatedBy).big_integer())
                    .col(
                        ColumnDef::new(CandidateNote::CreatedDate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_candidate_note_candidate")
                            .from(CandidateNote::Table, CandidateNote::CandidateId)
                            .to(Candidate::Table, Candidate::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_candidate_note_author")
                            .from(CandidateNote::Table, CandidateNote::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CandidateProperty::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CandidateProperty::CandidateId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CandidateProperty::Name)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CandidateProperty::Value).text())
                    .primary_key(
                        Index::create()
                            .col(CandidateProperty::CandidateId)
                            .col(CandidateProperty::Name),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_candidate_property_candidate")
                            .from(CandidateProperty::Table, CandidateProperty::CandidateId)
                            .to(Candidate::Table, Candidate::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CandidateOpportunity::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CandidateOpportunity::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CandidateOpportunity::SfId)
                            .string_len(32)
                            .unique_key(),
                    )
                    .col(ColumnDef::new(CandidateOpportunity::Name).string())
                    .col(
                        ColumnDef::new(CandidateOpportunity::CandidateId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CandidateOpportunity::JobOppId).big_integer())
                    .col(
                        ColumnDef::new(CandidateOpportunity::Stage)
                            .string_len(64)
                            .not_null()
                            .default("prospect"),
                    )
                    .col(ColumnDef::new(CandidateOpportunity::LastActiveStage).string_len(64))
                    .col(
                        ColumnDef::new(CandidateOpportunity::StageOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CandidateOpportunity::Closed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CandidateOpportunity::Won)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(CandidateOpportunity::NextStep).text())
                    .col(ColumnDef::new(CandidateOpportunity::NextStepDueDate).date())
                    .col(ColumnDef::new(CandidateOpportunity::ClosingComments).text())
                    .col(ColumnDef::new(CandidateOpportunity::ClosingCommentsForCandidate).text())
                    .col(ColumnDef::new(CandidateOpportunity::EmployerFeedback).text())
                    .col(
                        ColumnDef::new(CandidateOpportunity::CreatedDate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CandidateOpportunity::UpdatedDate)
                            .timestamp_with_time_zone(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_candidate_opportunity_candidate")
                            .from(CandidateOpportunity::Table, CandidateOpportunity::CandidateId)
                            .to(Candidate::Table, Candidate::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_candidate_opportunity_job")
                            .from(CandidateOpportunity::Table, CandidateOpportunity::JobOppId)
                            .to(SalesforceJobOpp::Table, SalesforceJobOpp::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_candidate_opportunity_candidate")
                    .table(CandidateOpportunity::Table)
                    .col(CandidateOpportunity::CandidateId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_candidate_opportunity_job")
                    .table(CandidateOpportunity::Table)
                    .col(CandidateOpportunity::JobOppId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_candidate_status")
                    .table(Candidate::Table)
                    .col(Candidate::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            CandidateOpportunity::Table.into_iden(),
            CandidateProperty::Table.into_iden(),
            CandidateNote::Table.into_iden(),
            CandidateAttachment::Table.into_iden(),
            Candidate::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Candidate {
    Table,
    Id,
    CandidateNumber,
    UserId,
    Status,
    Gender,
    Dob,
    Phone,
    Whatsapp,
    Nationality,
    Country,
    City,
    Address1,
    AdditionalInfo,
    CandidateMessage,
    LinkedInLink,
    ShareableCvAttachmentId,
    ShareableDocAttachmentId,
    AvailImmediate,
    AvailImmediateNotes,
    FamilyMove,
    FamilyMoveNotes,
    IntRecruitReasons,
    LeftHomeReasons,
    HomeLocation,
    ResidenceStatus,
    WorkAbroad,
    WorkAbroadNotes,
    HostEntryYear,
    UnhcrStatus,
    UnhcrNumber,
    IeltsScore,
    MaritalStatus,
    NumberDependants,
    Conflict,
    ConflictNotes,
    CrimeConvict,
    CrimeConvictNotes,
    VisaReject,
    VisaRejectNotes,
    DrivingLicense,
    MiniIntakeCompletedDate,
    FullIntakeCompletedDate,
    CreatedDate,
    UpdatedDate,
}

#[derive(DeriveIden)]
enum CandidateAttachment {
    Table,
    Id,
    CandidateId,
    Name,
    Location,
    AttachmentType,
    Cv,
    CreatedDate,
}

#[derive(DeriveIden)]
enum CandidateNote {
    Table,
    Id,
    CandidateId,
    NoteType,
    Title,
    Comment,
    CreatedBy,
    CreatedDate,
}

#[derive(DeriveIden)]
enum CandidateProperty {
    Table,
    CandidateId,
    Name,
    Value,
}

#[derive(DeriveIden)]
enum CandidateOpportunity {
    Table,
    Id,
    SfId,
    Name,
    CandidateId,
    JobOppId,
    Stage,
    LastActiveStage,
    StageOrder,
    Closed,
    Won,
    NextStep,
    NextStepDueDate,
    ClosingComments,
    ClosingCommentsForCandidate,
    EmployerFeedback,
    CreatedDate,
    UpdatedDate,
}

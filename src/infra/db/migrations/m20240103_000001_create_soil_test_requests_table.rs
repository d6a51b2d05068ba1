//! Migration: Create soil_test_requests table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SoilTestRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SoilTestRequests::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SoilTestRequests::UserId).uuid().null())
                    .col(ColumnDef::new(SoilTestRequests::Crop).string_len(50).not_null())
                    .col(ColumnDef::new(SoilTestRequests::FarmArea).double().not_null())
                    .col(
                        ColumnDef::new(SoilTestRequests::SurveyNumber)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SoilTestRequests::AddressLine)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SoilTestRequests::City).string_len(50).not_null())
                    .col(ColumnDef::new(SoilTestRequests::State).string_len(50).not_null())
                    .col(ColumnDef::new(SoilTestRequests::Pincode).string_len(6).not_null())
                    .col(ColumnDef::new(SoilTestRequests::Contact).string_len(20).null())
                    .col(
                        ColumnDef::new(SoilTestRequests::PackageType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SoilTestRequests::PackagePrice).double().null())
                    .col(ColumnDef::new(SoilTestRequests::BagItems).json_binary().not_null())
                    .col(ColumnDef::new(SoilTestRequests::TotalBags).integer().null())
                    .col(
                        ColumnDef::new(SoilTestRequests::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(SoilTestRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SoilTestRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_soil_test_requests_user")
                            .from(SoilTestRequests::Table, SoilTestRequests::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_soil_test_requests_status")
                    .table(SoilTestRequests::Table)
                    .col(SoilTestRequests::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SoilTestRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SoilTestRequests {
    Table,
    Id,
    UserId,
    Crop,
    FarmArea,
    SurveyNumber,
    AddressLine,
    City,
    State,
    Pincode,
    Contact,
    PackageType,
    PackagePrice,
    BagItems,
    TotalBags,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

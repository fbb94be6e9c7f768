//! Initial schema migration - creates all back-office tables.
//!
//! - `creditors`: companies and people the business owes, with a cached
//!   running total
//! - `external_debts`: the creditor ledger
//! - `representatives`: delivery staff collecting cash
//! - `customer_transactions`: the customer ledger
//! - `temp_orders` / `sub_orders`: temporary batch orders and their lines
//! - `orders`: regular orders
//! - `deposits`: prepaid customer deposits
//!
//! Amounts are stored as `*_minor` integers (hundredths).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Creditors {
    Table,
    Id,
    Name,
    Kind,
    Phone,
    Currency,
    TotalDebtMinor,
    CreatedAt,
}

#[derive(Iden)]
enum ExternalDebts {
    Table,
    Id,
    CreditorId,
    CreditorName,
    AmountMinor,
    AccountType,
    Date,
    Status,
    Notes,
}

#[derive(Iden)]
enum Representatives {
    Table,
    Id,
    Name,
    Phone,
    CreatedAt,
}

#[derive(Iden)]
enum CustomerTransactions {
    Table,
    Id,
    CustomerId,
    CustomerName,
    AmountMinor,
    AccountType,
    Description,
    Date,
}

#[derive(Iden)]
enum TempOrders {
    Table,
    Id,
    InvoiceName,
    TotalAmountMinor,
    RemainingAmountMinor,
    Status,
    AssignedUserId,
    AssignedUserName,
    ParentInvoiceId,
    CreatedAt,
}

#[derive(Iden)]
enum SubOrders {
    Table,
    Id,
    TempOrderId,
    Position,
    CustomerName,
    CustomerPhone,
    CustomerAddress,
    PurchasePriceUsdMinor,
    SellingPriceLydMinor,
    DownPaymentLydMinor,
    RemainingAmountMinor,
    Status,
    RepresentativeId,
    RepresentativeName,
}

#[derive(Iden)]
enum Orders {
    Table,
    Id,
    CustomerId,
    CustomerName,
    TrackingNumber,
    SellingPriceLydMinor,
    RemainingAmountMinor,
    CollectedAmountMinor,
    Status,
    RepresentativeId,
    RepresentativeName,
    DeliveryDate,
    TempOrderId,
    CreatedAt,
}

#[derive(Iden)]
enum Deposits {
    Table,
    Id,
    CustomerName,
    CustomerPhone,
    AmountMinor,
    Description,
    Status,
    RepresentativeId,
    RepresentativeName,
    CreatedAt,
    CollectedDate,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Creditors
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Creditors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Creditors::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Creditors::Name).string().not_null())
                    .col(
                        ColumnDef::new(Creditors::Kind)
                            .string()
                            .not_null()
                            .default("company"),
                    )
                    .col(ColumnDef::new(Creditors::Phone).string())
                    .col(
                        ColumnDef::new(Creditors::Currency)
                            .string()
                            .not_null()
                            .default("LYD"),
                    )
                    .col(
                        ColumnDef::new(Creditors::TotalDebtMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Creditors::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. External debts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExternalDebts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExternalDebts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExternalDebts::CreditorId).string().not_null())
                    .col(
                        ColumnDef::new(ExternalDebts::CreditorName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExternalDebts::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    // Nullable: rows without an account type count as cash.
                    .col(ColumnDef::new(ExternalDebts::AccountType).string())
                    .col(ColumnDef::new(ExternalDebts::Date).timestamp().not_null())
                    .col(
                        ColumnDef::new(ExternalDebts::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(ExternalDebts::Notes)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-external_debts-creditor_id")
                            .from(ExternalDebts::Table, ExternalDebts::CreditorId)
                            .to(Creditors::Table, Creditors::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-external_debts-creditor_id-date")
                    .table(ExternalDebts::Table)
                    .col(ExternalDebts::CreditorId)
                    .col(ExternalDebts::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Representatives
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Representatives::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Representatives::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Representatives::Name).string().not_null())
                    .col(ColumnDef::new(Representatives::Phone).string())
                    .col(
                        ColumnDef::new(Representatives::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Customer transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CustomerTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomerTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CustomerTransactions::CustomerId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomerTransactions::CustomerName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomerTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CustomerTransactions::AccountType).string())
                    .col(
                        ColumnDef::new(CustomerTransactions::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(CustomerTransactions::Date)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-customer_transactions-customer_id")
                    .table(CustomerTransactions::Table)
                    .col(CustomerTransactions::CustomerId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Temporary orders
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TempOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TempOrders::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TempOrders::InvoiceName).string().not_null())
                    .col(
                        ColumnDef::new(TempOrders::TotalAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TempOrders::RemainingAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TempOrders::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(TempOrders::AssignedUserId).string())
                    .col(ColumnDef::new(TempOrders::AssignedUserName).string())
                    .col(ColumnDef::new(TempOrders::ParentInvoiceId).string())
                    .col(ColumnDef::new(TempOrders::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Sub-orders
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SubOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubOrders::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SubOrders::TempOrderId).string().not_null())
                    .col(ColumnDef::new(SubOrders::Position).integer().not_null())
                    .col(ColumnDef::new(SubOrders::CustomerName).string().not_null())
                    .col(ColumnDef::new(SubOrders::CustomerPhone).string())
                    .col(ColumnDef::new(SubOrders::CustomerAddress).string())
                    .col(
                        ColumnDef::new(SubOrders::PurchasePriceUsdMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SubOrders::SellingPriceLydMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubOrders::DownPaymentLydMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SubOrders::RemainingAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubOrders::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(SubOrders::RepresentativeId).string())
                    .col(ColumnDef::new(SubOrders::RepresentativeName).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sub_orders-temp_order_id")
                            .from(SubOrders::Table, SubOrders::TempOrderId)
                            .to(TempOrders::Table, TempOrders::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sub_orders-temp_order_id-position")
                    .table(SubOrders::Table)
                    .col(SubOrders::TempOrderId)
                    .col(SubOrders::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sub_orders-representative_id")
                    .table(SubOrders::Table)
                    .col(SubOrders::RepresentativeId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Orders
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::CustomerId).string())
                    .col(ColumnDef::new(Orders::CustomerName).string().not_null())
                    .col(ColumnDef::new(Orders::TrackingNumber).string())
                    .col(
                        ColumnDef::new(Orders::SellingPriceLydMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::RemainingAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::CollectedAmountMinor).big_integer())
                    .col(
                        ColumnDef::new(Orders::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Orders::RepresentativeId).string())
                    .col(ColumnDef::new(Orders::RepresentativeName).string())
                    .col(ColumnDef::new(Orders::DeliveryDate).timestamp())
                    .col(ColumnDef::new(Orders::TempOrderId).string())
                    .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-orders-representative_id")
                    .table(Orders::Table)
                    .col(Orders::RepresentativeId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Deposits
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Deposits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Deposits::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Deposits::CustomerName).string().not_null())
                    .col(ColumnDef::new(Deposits::CustomerPhone).string())
                    .col(
                        ColumnDef::new(Deposits::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Deposits::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Deposits::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Deposits::RepresentativeId).string())
                    .col(ColumnDef::new(Deposits::RepresentativeName).string())
                    .col(ColumnDef::new(Deposits::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Deposits::CollectedDate).timestamp())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-deposits-representative_id")
                    .table(Deposits::Table)
                    .col(Deposits::RepresentativeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Deposits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubOrders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TempOrders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CustomerTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Representatives::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExternalDebts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Creditors::Table).to_owned())
            .await?;
        Ok(())
    }
}

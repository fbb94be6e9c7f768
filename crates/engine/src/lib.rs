//! Ledger reconciliation and status engine for the shipping back office.
//!
//! The crate is split in two layers:
//!
//! - pure rules: [`balances`], [`financial_log`], the status tables in
//!   [`OrderStatus`]/[`DepositStatus`] and [`TempOrder::apply_payment`];
//! - persistence: [`Engine`], which runs every mutation inside one database
//!   transaction so a failed operation writes nothing.

pub use balances::{Balances, BucketReport, LedgerFilter, LedgerRecord, LedgerReport};
pub use commands::{
    CreditorUpdate, DepositUpdate, NewCreditor, NewDeposit, NewExternalDebt, NewOrder,
    NewRepresentative, NewSubOrder, NewTempOrder, TempOrderPayment, TempOrderUpdate,
};
pub use creditors::{Creditor, CreditorKind};
pub use currency::{AccountType, Currency};
pub use customer_transactions::{CustomerTransaction, temp_customer_id};
pub use dates::{DateRange, Period};
pub use deposits::Deposit;
pub use error::EngineError;
pub use external_debts::{DebtStatus, ExternalDebt};
pub use financial_log::{FinancialLog, FinancialLogEntry, LogEntryKind, LogFilter, LogSummary};
pub use money::Money;
pub use ops::{Engine, EngineBuilder};
pub use orders::Order;
pub use representatives::{Representative, RepresentativeSummary};
pub use status::{DepositStatus, OrderStatus};
pub use sub_orders::SubOrder;
pub use temp_orders::TempOrder;

pub mod balances;
mod commands;
mod creditors;
mod currency;
mod customer_transactions;
mod dates;
mod deposits;
mod error;
mod external_debts;
pub mod financial_log;
mod money;
mod ops;
mod orders;
mod representatives;
mod status;
mod sub_orders;
mod temp_orders;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

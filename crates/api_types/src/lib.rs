use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Lyd,
    Usd,
}

impl Currency {
    /// Returns the canonical code used by the engine/database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lyd => "LYD",
            Self::Usd => "USD",
        }
    }
}

/// Treasury bucket an amount moves through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Cash,
    Bank,
    Usd,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::Usd => "usd",
        }
    }
}

/// Filter body shared by the ledger report endpoints.
///
/// `from`/`to` are inclusive calendar days. Leaving both out means no date
/// filter; a single bound covers just that day.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LedgerReportRequest {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub account_type: Option<AccountType>,
    pub text: Option<String>,
}

/// Body for the endpoints that attach or detach a representative.
#[derive(Debug, Serialize, Deserialize)]
pub struct RepresentativeAssign {
    /// `null` removes the current representative.
    pub representative_id: Option<Uuid>,
}

pub mod creditor {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CreditorKind {
        #[default]
        Company,
        Person,
    }

    impl CreditorKind {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Company => "company",
                Self::Person => "person",
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreditorNew {
        pub name: String,
        pub kind: Option<CreditorKind>,
        pub phone: Option<String>,
        pub currency: Option<Currency>,
        /// Opening balance in minor units, written as a first `cash` entry.
        #[serde(default)]
        pub initial_balance_minor: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CreditorUpdate {
        pub name: Option<String>,
        pub kind: Option<CreditorKind>,
        pub phone: Option<String>,
        pub currency: Option<Currency>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreditorTotal {
        pub creditor_id: Uuid,
        pub total_debt_minor: i64,
    }
}

pub mod debt {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtNew {
        pub creditor_id: Uuid,
        /// Positive adds to the debt, negative records a payment.
        pub amount_minor: i64,
        pub account_type: Option<AccountType>,
        /// Defaults to now.
        pub occurred_at: Option<DateTime<FixedOffset>>,
        pub notes: Option<String>,
    }
}

pub mod order {
    use super::*;

    /// Shipping pipeline status of orders, temp orders and sub-orders.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum OrderStatus {
        Pending,
        Processed,
        Ready,
        Shipped,
        ArrivedDubai,
        ArrivedBenghazi,
        ArrivedTobruk,
        OutForDelivery,
        Delivered,
        Cancelled,
    }

    impl OrderStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Pending => "pending",
                Self::Processed => "processed",
                Self::Ready => "ready",
                Self::Shipped => "shipped",
                Self::ArrivedDubai => "arrived_dubai",
                Self::ArrivedBenghazi => "arrived_benghazi",
                Self::ArrivedTobruk => "arrived_tobruk",
                Self::OutForDelivery => "out_for_delivery",
                Self::Delivered => "delivered",
                Self::Cancelled => "cancelled",
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderNew {
        pub customer_id: Option<String>,
        pub customer_name: String,
        pub tracking_number: Option<String>,
        pub selling_price_lyd_minor: i64,
        #[serde(default)]
        pub down_payment_lyd_minor: i64,
        pub representative_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusUpdate {
        pub status: OrderStatus,
    }

    /// Cash a representative brings back for a delivered order.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderCollect {
        pub collected_amount_minor: i64,
    }
}

pub mod temp_order {
    use super::*;
    use crate::order::OrderStatus;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubOrderNew {
        pub customer_name: String,
        pub customer_phone: Option<String>,
        pub customer_address: Option<String>,
        #[serde(default)]
        pub purchase_price_usd_minor: i64,
        pub selling_price_lyd_minor: i64,
        #[serde(default)]
        pub down_payment_lyd_minor: i64,
        pub representative_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TempOrderNew {
        pub invoice_name: String,
        pub assigned_user_id: Option<String>,
        pub assigned_user_name: Option<String>,
        pub sub_orders: Vec<SubOrderNew>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TempOrderUpdate {
        pub invoice_name: Option<String>,
        pub status: Option<OrderStatus>,
        pub assigned_user_id: Option<String>,
        pub assigned_user_name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TempOrderPayment {
        pub sub_order_id: Uuid,
        pub amount_minor: i64,
        pub account_type: Option<AccountType>,
        pub notes: Option<String>,
        /// Defaults to now.
        pub occurred_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubOrderStatusUpdate {
        pub status: OrderStatus,
    }
}

pub mod deposit {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DepositStatus {
        Pending,
        Collected,
        Cancelled,
    }

    impl DepositStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Pending => "pending",
                Self::Collected => "collected",
                Self::Cancelled => "cancelled",
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepositNew {
        pub customer_name: String,
        pub customer_phone: Option<String>,
        pub amount_minor: i64,
        pub description: Option<String>,
        pub representative_id: Option<Uuid>,
    }

    /// Partial update of a pending deposit.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DepositUpdate {
        pub customer_name: Option<String>,
        pub customer_phone: Option<String>,
        pub amount_minor: Option<i64>,
        pub description: Option<String>,
        pub representative_id: Option<Uuid>,
        /// Detach the current representative. Ignored when
        /// `representative_id` is set.
        #[serde(default)]
        pub clear_representative: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepositStatusUpdate {
        pub status: DepositStatus,
    }
}

pub mod representative {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RepresentativeNew {
        pub name: String,
        pub phone: Option<String>,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum LogPeriod {
        #[default]
        All,
        Daily,
        Weekly,
        Monthly,
        Yearly,
        Custom,
    }

    /// Financial log filter. `from`/`to` are only read for `custom`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LogRequest {
        #[serde(default)]
        pub period: LogPeriod,
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
        pub text: Option<String>,
    }
}

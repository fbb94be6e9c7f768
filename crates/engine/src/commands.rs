//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AccountType, CreditorKind, Currency, Money, OrderStatus};

/// Create a creditor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewCreditor {
    pub name: String,
    pub kind: CreditorKind,
    pub phone: Option<String>,
    pub currency: Currency,
}

impl NewCreditor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CreditorKind::default(),
            phone: None,
            currency: Currency::default(),
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: CreditorKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }
}

/// Partial update of a creditor. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreditorUpdate {
    pub name: Option<String>,
    pub kind: Option<CreditorKind>,
    pub phone: Option<String>,
    pub currency: Option<Currency>,
}

/// Append an entry to a creditor's ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewExternalDebt {
    pub creditor_id: Uuid,
    /// Positive: the creditor is owed more. Negative: a payment.
    pub amount: Money,
    pub account_type: AccountType,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl NewExternalDebt {
    #[must_use]
    pub fn new(creditor_id: Uuid, amount: Money, date: DateTime<Utc>) -> Self {
        Self {
            creditor_id,
            amount,
            account_type: AccountType::default(),
            date,
            notes: None,
        }
    }

    #[must_use]
    pub fn account_type(mut self, account_type: AccountType) -> Self {
        self.account_type = account_type;
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// One customer line of a new temporary order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewSubOrder {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub purchase_price_usd: Money,
    pub selling_price_lyd: Money,
    pub down_payment_lyd: Money,
    pub representative_id: Option<Uuid>,
}

impl NewSubOrder {
    #[must_use]
    pub fn new(customer_name: impl Into<String>, selling_price_lyd: Money) -> Self {
        Self {
            customer_name: customer_name.into(),
            customer_phone: None,
            customer_address: None,
            purchase_price_usd: Money::ZERO,
            selling_price_lyd,
            down_payment_lyd: Money::ZERO,
            representative_id: None,
        }
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.customer_phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.customer_address = Some(address.into());
        self
    }

    #[must_use]
    pub fn purchase_price_usd(mut self, price: Money) -> Self {
        self.purchase_price_usd = price;
        self
    }

    #[must_use]
    pub fn down_payment(mut self, down_payment: Money) -> Self {
        self.down_payment_lyd = down_payment;
        self
    }

    #[must_use]
    pub fn representative(mut self, representative_id: Uuid) -> Self {
        self.representative_id = Some(representative_id);
        self
    }
}

/// Create a temporary batch order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewTempOrder {
    pub invoice_name: String,
    pub assigned_user_id: Option<String>,
    pub assigned_user_name: Option<String>,
    pub sub_orders: Vec<NewSubOrder>,
}

impl NewTempOrder {
    #[must_use]
    pub fn new(invoice_name: impl Into<String>) -> Self {
        Self {
            invoice_name: invoice_name.into(),
            assigned_user_id: None,
            assigned_user_name: None,
            sub_orders: Vec::new(),
        }
    }

    #[must_use]
    pub fn assigned_user(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.assigned_user_id = Some(id.into());
        self.assigned_user_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn sub_order(mut self, sub_order: NewSubOrder) -> Self {
        self.sub_orders.push(sub_order);
        self
    }
}

/// Partial update of a temporary order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TempOrderUpdate {
    pub invoice_name: Option<String>,
    pub status: Option<OrderStatus>,
    pub assigned_user_id: Option<String>,
    pub assigned_user_name: Option<String>,
}

/// Record a payment against one sub-order of a temporary order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TempOrderPayment {
    pub temp_order_id: Uuid,
    pub sub_order_id: Uuid,
    pub amount: Money,
    pub notes: Option<String>,
    pub account_type: AccountType,
    pub date: DateTime<Utc>,
}

impl TempOrderPayment {
    #[must_use]
    pub fn new(temp_order_id: Uuid, sub_order_id: Uuid, amount: Money, date: DateTime<Utc>) -> Self {
        Self {
            temp_order_id,
            sub_order_id,
            amount,
            notes: None,
            account_type: AccountType::default(),
            date,
        }
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn account_type(mut self, account_type: AccountType) -> Self {
        self.account_type = account_type;
        self
    }
}

/// Create a regular order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub tracking_number: Option<String>,
    pub selling_price_lyd: Money,
    pub down_payment_lyd: Money,
    pub representative_id: Option<Uuid>,
}

impl NewOrder {
    #[must_use]
    pub fn new(customer_name: impl Into<String>, selling_price_lyd: Money) -> Self {
        Self {
            customer_id: None,
            customer_name: customer_name.into(),
            tracking_number: None,
            selling_price_lyd,
            down_payment_lyd: Money::ZERO,
            representative_id: None,
        }
    }

    #[must_use]
    pub fn customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    #[must_use]
    pub fn tracking_number(mut self, tracking_number: impl Into<String>) -> Self {
        self.tracking_number = Some(tracking_number.into());
        self
    }

    #[must_use]
    pub fn down_payment(mut self, down_payment: Money) -> Self {
        self.down_payment_lyd = down_payment;
        self
    }

    #[must_use]
    pub fn representative(mut self, representative_id: Uuid) -> Self {
        self.representative_id = Some(representative_id);
        self
    }
}

/// Create a deposit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewDeposit {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub amount: Money,
    pub description: Option<String>,
    pub representative_id: Option<Uuid>,
}

impl NewDeposit {
    #[must_use]
    pub fn new(customer_name: impl Into<String>, amount: Money) -> Self {
        Self {
            customer_name: customer_name.into(),
            customer_phone: None,
            amount,
            description: None,
            representative_id: None,
        }
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.customer_phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn representative(mut self, representative_id: Uuid) -> Self {
        self.representative_id = Some(representative_id);
        self
    }
}

/// Partial update of a pending deposit. Status changes go through
/// `update_deposit_status`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DepositUpdate {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub amount: Option<Money>,
    pub description: Option<String>,
    /// `Some(None)` removes the representative.
    pub representative_id: Option<Option<Uuid>>,
}

/// Create a representative.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewRepresentative {
    pub name: String,
    pub phone: Option<String>,
}

impl NewRepresentative {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: None,
        }
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

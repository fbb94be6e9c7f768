//! Status transition tables for orders and deposits.
//!
//! Transitions are only ever triggered by an admin or a representative;
//! nothing here moves on a timer. Each machine lists its allowed
//! `(from, to)` pairs explicitly and rejects everything else.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Shipping pipeline shared by regular orders, temp orders and sub-orders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
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

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    #[must_use]
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Pending, Processed)
                | (Processed, Ready)
                | (Ready, Shipped)
                | (Shipped, ArrivedDubai | ArrivedBenghazi | ArrivedTobruk)
                | (ArrivedDubai, ArrivedBenghazi | ArrivedTobruk | OutForDelivery)
                | (ArrivedBenghazi | ArrivedTobruk, OutForDelivery)
                | (OutForDelivery, Delivered)
                | (_, Cancelled)
        )
    }

    /// Returns `next` when the move is allowed.
    pub fn transition(self, next: OrderStatus) -> ResultEngine<OrderStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(EngineError::InvalidTransition(format!(
                "order status {self} cannot move to {next}"
            )))
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for OrderStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "processed" => Ok(Self::Processed),
            "ready" => Ok(Self::Ready),
            "shipped" => Ok(Self::Shipped),
            "arrived_dubai" => Ok(Self::ArrivedDubai),
            "arrived_benghazi" => Ok(Self::ArrivedBenghazi),
            "arrived_tobruk" => Ok(Self::ArrivedTobruk),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::InvalidInput(format!(
                "invalid order status: {other}"
            ))),
        }
    }
}

/// Lifecycle of a prepaid deposit. `Pending` is the only non-terminal state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    #[default]
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

    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn transition(self, next: DepositStatus) -> ResultEngine<DepositStatus> {
        match (self, next) {
            (Self::Pending, Self::Collected | Self::Cancelled) => Ok(next),
            _ => Err(EngineError::InvalidTransition(format!(
                "deposit status {self} cannot move to {next}"
            ))),
        }
    }
}

impl fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DepositStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "collected" => Ok(Self::Collected),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::InvalidInput(format!(
                "invalid deposit status: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ORDER: [OrderStatus; 10] = [
        OrderStatus::Pending,
        OrderStatus::Processed,
        OrderStatus::Ready,
        OrderStatus::Shipped,
        OrderStatus::ArrivedDubai,
        OrderStatus::ArrivedBenghazi,
        OrderStatus::ArrivedTobruk,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    #[test]
    fn happy_path_reaches_delivered() {
        let path = [
            OrderStatus::Processed,
            OrderStatus::Ready,
            OrderStatus::Shipped,
            OrderStatus::ArrivedDubai,
            OrderStatus::ArrivedBenghazi,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ];
        let mut status = OrderStatus::Pending;
        for next in path {
            status = status.transition(next).unwrap();
        }
        assert_eq!(status, OrderStatus::Delivered);
    }

    #[test]
    fn terminal_order_states_reject_everything() {
        for from in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            for to in ALL_ORDER {
                assert!(from.transition(to).is_err(), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn cancel_is_reachable_from_any_open_state() {
        for from in ALL_ORDER.into_iter().filter(|s| !s.is_terminal()) {
            assert_eq!(
                from.transition(OrderStatus::Cancelled),
                Ok(OrderStatus::Cancelled)
            );
        }
    }

    #[test]
    fn skipping_and_going_back_are_rejected() {
        assert!(OrderStatus::Pending.transition(OrderStatus::Shipped).is_err());
        assert!(OrderStatus::Shipped.transition(OrderStatus::Ready).is_err());
        assert!(OrderStatus::Ready.transition(OrderStatus::Ready).is_err());
        assert!(OrderStatus::Ready.transition(OrderStatus::Delivered).is_err());
    }

    #[test]
    fn deposit_terminal_states_are_final() {
        use DepositStatus::*;

        assert_eq!(Pending.transition(Collected), Ok(Collected));
        assert_eq!(Pending.transition(Cancelled), Ok(Cancelled));
        assert!(Pending.transition(Pending).is_err());
        for from in [Collected, Cancelled] {
            for to in [Pending, Collected, Cancelled] {
                assert!(from.transition(to).is_err());
            }
        }
    }

    #[test]
    fn statuses_parse_their_own_names() {
        for status in ALL_ORDER {
            assert_eq!(OrderStatus::try_from(status.as_str()), Ok(status));
        }
        assert!(OrderStatus::try_from("lost").is_err());
    }
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::lab::format::{format_cop, format_optional_datetime};
use crate::lab::patients::PatientId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendiente",
            Self::Confirmed => "Confirmada",
            Self::Completed => "Completada",
            Self::Cancelled => "Cancelada",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendiente",
            Self::Paid => "Pagado",
            Self::Refunded => "Reembolsado",
        }
    }
}

pub fn payment_label(status: Option<PaymentStatus>) -> &'static str {
    status.map(PaymentStatus::label).unwrap_or("N/A")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Catalog code of the ordered service.
    pub service_id: String,
    pub service_name: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<PatientId>,
    pub pos_id: String,
    pub status: OrderStatus,
    pub total: u64,
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walk_in_ticket_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walk_in_ticket_expiry: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl Order {
    pub fn items_total(&self) -> u64 {
        self.items.iter().map(|item| item.total).sum()
    }

    /// A walk-in ticket without an expiry never lapses; an order without a
    /// ticket has nothing to expire.
    pub fn ticket_expired(&self, now: NaiveDateTime) -> bool {
        match (&self.walk_in_ticket_code, self.walk_in_ticket_expiry) {
            (Some(_), Some(expiry)) => expiry <= now,
            _ => false,
        }
    }

    pub fn view(&self, now: NaiveDateTime) -> OrderView {
        OrderView {
            order: self.clone(),
            status_label: self.status.label(),
            payment_status_label: payment_label(self.payment_status),
            formatted_total: format_cop(self.total),
            formatted_created_at: format_optional_datetime(self.created_at),
            item_count: self.items.len(),
            ticket_expired: self.ticket_expired(now),
        }
    }
}

/// Order plus the labels the order table shows next to each row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub status_label: &'static str,
    pub payment_status_label: &'static str,
    pub formatted_total: String,
    pub formatted_created_at: String,
    pub item_count: usize,
    pub ticket_expired: bool,
}

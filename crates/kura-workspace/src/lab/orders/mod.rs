//! Patient orders: lookups by number and user, plus the order search box.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{payment_label, Order, OrderItem, OrderStatus, OrderView, PaymentStatus};
pub use router::order_router;
pub use service::{OrderError, OrderService};

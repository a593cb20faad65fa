use std::sync::Arc;

use super::domain::Order;
use crate::lab::format::matches_query;
use crate::lab::repository::{OrderRepository, RepositoryError};

/// Read-side order lookups used by the orders page and the dashboard.
pub struct OrderService<R> {
    repository: Arc<R>,
}

impl<R> OrderService<R>
where
    R: OrderRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn get_order(&self, order_number: &str) -> Result<Order, OrderError> {
        let wanted = order_number.trim().to_ascii_uppercase();
        self.repository
            .order_by_number(&wanted)?
            .ok_or(OrderError::NotFound(wanted))
    }

    pub fn orders_by_user(&self, user_id: &str) -> Result<Vec<Order>, OrderError> {
        let wanted = user_id.trim();
        let orders = self
            .repository
            .orders()?
            .into_iter()
            .filter(|order| order.user_id == wanted)
            .collect();
        Ok(newest_first(orders))
    }

    /// Substring match on the order number; a blank query lists every order.
    pub fn search_orders(&self, query: &str) -> Result<Vec<Order>, OrderError> {
        let orders = self
            .repository
            .orders()?
            .into_iter()
            .filter(|order| matches_query(query, &[&order.order_number]))
            .collect();
        Ok(newest_first(orders))
    }

    pub fn recent_orders(&self, limit: usize) -> Result<Vec<Order>, OrderError> {
        let mut orders = newest_first(self.repository.orders()?);
        orders.truncate(limit);
        Ok(orders)
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.order_number.cmp(&a.order_number))
    });
    orders
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("order {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    Critical,
    Low,
    Ok,
}

impl StockStatus {
    /// Below the minimum is critical, below twice the minimum is low.
    pub fn classify(current_stock: u32, min_stock: u32) -> Self {
        if current_stock < min_stock {
            Self::Critical
        } else if u64::from(current_stock) < u64::from(min_stock) * 2 {
            Self::Low
        } else {
            Self::Ok
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Crítico",
            Self::Low => "Bajo",
            Self::Ok => "OK",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub current_stock: u32,
    pub min_stock: u32,
    pub location: String,
}

impl InventoryItem {
    pub fn status(&self) -> StockStatus {
        StockStatus::classify(self.current_stock, self.min_stock)
    }

    pub fn view(&self) -> InventoryView {
        let status = self.status();
        InventoryView {
            item: self.clone(),
            status,
            status_label: status.label(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryView {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub status: StockStatus,
    pub status_label: &'static str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub status: Option<StockStatus>,
}

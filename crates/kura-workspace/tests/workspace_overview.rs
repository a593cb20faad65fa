//! Orders, inventory and the dashboard summary over the seeded store.

use std::sync::Arc;

use kura_workspace::lab::inventory::{InventoryQuery, InventoryService, StockStatus};
use kura_workspace::lab::orders::{OrderError, OrderService, OrderStatus};
use kura_workspace::lab::{DashboardService, InMemoryLabStore};

fn store() -> Arc<InMemoryLabStore> {
    Arc::new(InMemoryLabStore::seeded())
}

#[test]
fn order_search_is_newest_first_and_case_insensitive() {
    let orders = OrderService::new(store());

    let all = orders.search_orders("").expect("all orders");
    let numbers: Vec<_> = all.iter().map(|order| order.order_number.as_str()).collect();
    assert_eq!(
        numbers,
        vec![
            "ORD-2025-00142",
            "ORD-2025-00141",
            "ORD-2025-00140",
            "ORD-2025-00139",
            "ORD-2025-00138",
        ]
    );

    let found = orders.search_orders("ord-2025-0014").expect("search");
    assert_eq!(found.len(), 3);

    let order = orders.get_order("ord-2025-00140").expect("lookup");
    assert_eq!(order.items_total(), 245_000);
    assert!(matches!(
        orders.get_order("ORD-2025-99999"),
        Err(OrderError::NotFound(_))
    ));

    let by_user = orders.orders_by_user("usr-002").expect("by user");
    assert_eq!(by_user.len(), 1);
    assert_eq!(by_user[0].status, OrderStatus::Confirmed);
}

#[test]
fn inventory_lists_most_urgent_first() {
    let inventory = InventoryService::new(store());

    let items = inventory.list(&InventoryQuery::default()).expect("list");
    let statuses: Vec<_> = items.iter().map(|view| view.status).collect();
    let mut sorted = statuses.clone();
    sorted.sort();
    assert_eq!(statuses, sorted);
    assert_eq!(items[0].status, StockStatus::Critical);
    assert_eq!(items[0].status_label, "Crítico");

    let reagents = inventory
        .list(&InventoryQuery {
            q: Some("reactivo".to_string()),
            status: None,
        })
        .expect("reagents");
    assert_eq!(reagents.len(), 3);

    let critical = inventory
        .list(&InventoryQuery {
            q: None,
            status: Some(StockStatus::Critical),
        })
        .expect("critical");
    let skus: Vec<_> = critical.iter().map(|view| view.item.sku.as_str()).collect();
    assert_eq!(skus, vec!["REA-001", "TUB-001"]);

    assert_eq!(inventory.low_stock_count().expect("count"), 5);
}

#[test]
fn dashboard_summarizes_the_workspace() {
    let dashboard = DashboardService::new(store(), "Laboratorio Central KURA");
    let summary = dashboard.summary().expect("summary");

    assert_eq!(summary.lab_name, "Laboratorio Central KURA");
    let values: Vec<_> = summary
        .stats
        .iter()
        .map(|card| (card.title, card.value.as_str(), card.alert))
        .collect();
    assert_eq!(
        values,
        vec![
            ("Total Órdenes", "5", false),
            ("Órdenes Pendientes", "1", false),
            ("Servicios Activos", "8", false),
            ("Inventario Bajo", "5", true),
        ]
    );

    assert_eq!(summary.recent_orders.len(), 5);
    let first = &summary.recent_orders[0];
    assert_eq!(first.order_number, "ORD-2025-00142");
    assert_eq!(first.patient, "María González");
    assert_eq!(first.date, "17 feb 2025, 08:30");
    assert_eq!(first.status_label, "Pendiente");
    assert_eq!(first.formatted_total, "$ 125.000");
}

#[test]
fn dashboard_alert_clears_when_stock_is_healthy() {
    let store = InMemoryLabStore::seeded().with_inventory(Vec::new());
    let summary = DashboardService::new(Arc::new(store), "Sede Norte")
        .summary()
        .expect("summary");
    let low = summary
        .stats
        .iter()
        .find(|card| card.title == "Inventario Bajo")
        .expect("card");
    assert_eq!(low.value, "0");
    assert!(!low.alert);
}

mod routing {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use kura_workspace::lab::inventory::{inventory_router, InventoryService};
    use kura_workspace::lab::orders::{order_router, OrderService};
    use kura_workspace::lab::{dashboard_router, DashboardService, InMemoryLabStore};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn build_router() -> axum::Router {
        let store = Arc::new(InMemoryLabStore::seeded());
        order_router(Arc::new(OrderService::new(Arc::clone(&store))))
            .merge(inventory_router(Arc::new(InventoryService::new(Arc::clone(
                &store,
            )))))
            .merge(dashboard_router(Arc::new(DashboardService::new(
                store,
                "Laboratorio Central KURA",
            ))))
    }

    async fn get_json(router: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router dispatch");
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        (status, serde_json::from_slice(&body).expect("json"))
    }

    #[tokio::test]
    async fn order_lookup_includes_labels() {
        let (status, payload) =
            get_json(build_router(), "/api/v1/commerce/orders/ORD-2025-00138").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["statusLabel"], json!("Cancelada"));
        assert_eq!(payload["paymentStatusLabel"], json!("Reembolsado"));
        assert_eq!(payload["formattedTotal"], json!("$ 67.000"));
        assert_eq!(payload["itemCount"], json!(2));

        let (status, _) = get_json(build_router(), "/api/v1/commerce/orders/ORD-0").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn inventory_filters_by_status() {
        let (status, payload) = get_json(build_router(), "/api/v1/inventory?status=LOW").await;
        assert_eq!(status, StatusCode::OK);
        let items = payload.as_array().expect("array");
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|item| item["statusLabel"] == json!("Bajo")));
    }

    #[tokio::test]
    async fn dashboard_endpoint_serializes_camel_case() {
        let (status, payload) = get_json(build_router(), "/api/v1/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["labName"], json!("Laboratorio Central KURA"));
        assert_eq!(payload["recentOrders"][1]["patient"], json!("Carlos Rodríguez"));
        assert_eq!(payload["stats"][3]["alert"], json!(true));
    }
}

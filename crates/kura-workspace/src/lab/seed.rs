//! Fixture data the workspace starts with: the sample catalog, the five most
//! recent orders with their results, the matching patients, and stock levels.

use chrono::NaiveDateTime;

use super::catalog::{LabService, ServiceId, ServiceType};
use super::inventory::InventoryItem;
use super::orders::{Order, OrderItem, OrderStatus, PaymentStatus};
use super::patients::{Patient, PatientId};
use super::results::{LabResult, ResultId, ResultStatus};

fn timestamp(raw: &str) -> Option<NaiveDateTime> {
    raw.parse().ok()
}

fn single(id: &str, code: &str, name: &str, category: &str, price: u64) -> LabService {
    LabService {
        id: ServiceId(id.to_string()),
        code: code.to_string(),
        name: name.to_string(),
        description: None,
        category: category.to_string(),
        base_price: price,
        service_type: ServiceType::Single,
        is_custom: false,
        child_service_ids: Vec::new(),
    }
}

pub fn services() -> Vec<LabService> {
    let mut services = vec![
        single("svc-001", "LAB-001", "Hemograma Completo", "Hematología", 45_000),
        single("svc-002", "LAB-002", "Perfil Lipídico", "Química Sanguínea", 80_000),
        single("svc-003", "LAB-003", "Perfil Tiroideo", "Endocrinología", 125_000),
        single("svc-004", "LAB-004", "Glucosa en Ayunas", "Química Sanguínea", 25_000),
        single("svc-005", "LAB-005", "Uroanálisis", "Uroanálisis", 35_000),
        single("svc-006", "LAB-006", "Examen General de Orina", "Uroanálisis", 29_000),
        single(
            "svc-007",
            "LAB-007",
            "Panel Básico de Metabolismo",
            "Química Sanguínea",
            95_000,
        ),
    ];
    services.push(LabService {
        id: ServiceId("svc-008".to_string()),
        code: "CHK-001".to_string(),
        name: "Chequeo Ejecutivo".to_string(),
        description: Some("Hemograma, perfil lipídico y glucosa en ayunas".to_string()),
        category: "Paquetes".to_string(),
        base_price: 130_000,
        service_type: ServiceType::Bundle,
        is_custom: false,
        child_service_ids: ["svc-001", "svc-002", "svc-004"]
            .into_iter()
            .map(|id| ServiceId(id.to_string()))
            .collect(),
    });
    services
}

fn item(code: &str, name: &str, unit_price: u64) -> OrderItem {
    OrderItem {
        id: None,
        service_id: code.to_string(),
        service_name: name.to_string(),
        quantity: 1,
        unit_price,
        total: unit_price,
    }
}

#[allow(clippy::too_many_arguments)]
fn order(
    id: &str,
    order_number: &str,
    patient: &str,
    pos_id: &str,
    status: OrderStatus,
    payment: PaymentStatus,
    ticket: (&str, &str),
    created_at: &str,
    items: Vec<OrderItem>,
) -> Order {
    Order {
        id: id.to_string(),
        order_number: order_number.to_string(),
        user_id: id.replace("ord-", "usr-"),
        patient_id: Some(PatientId(patient.to_string())),
        pos_id: pos_id.to_string(),
        status,
        total: items.iter().map(|item| item.total).sum(),
        items,
        walk_in_ticket_code: Some(ticket.0.to_string()),
        walk_in_ticket_expiry: timestamp(ticket.1),
        payment_status: Some(payment),
        created_at: timestamp(created_at),
    }
}

pub fn orders() -> Vec<Order> {
    vec![
        order(
            "ord-001",
            "ORD-2025-00142",
            "pat-001",
            "Sede Principal",
            OrderStatus::Pending,
            PaymentStatus::Pending,
            ("WALK-ABC123", "2025-02-18T10:00:00"),
            "2025-02-17T08:30:00",
            vec![
                item("LAB-001", "Hemograma Completo", 45_000),
                item("LAB-002", "Perfil Lipídico", 80_000),
            ],
        ),
        order(
            "ord-002",
            "ORD-2025-00141",
            "pat-002",
            "Sede Principal",
            OrderStatus::Confirmed,
            PaymentStatus::Paid,
            ("WALK-DEF456", "2025-02-18T14:00:00"),
            "2025-02-17T09:15:00",
            vec![
                item("LAB-004", "Glucosa en Ayunas", 25_000),
                item("LAB-005", "Uroanálisis", 35_000),
                item("LAB-006", "Examen General de Orina", 29_000),
            ],
        ),
        order(
            "ord-003",
            "ORD-2025-00140",
            "pat-003",
            "Sucursal Norte",
            OrderStatus::Completed,
            PaymentStatus::Paid,
            ("WALK-GHI789", "2025-02-17T18:00:00"),
            "2025-02-16T14:20:00",
            vec![
                item("LAB-003", "Perfil Tiroideo", 125_000),
                item("LAB-007", "Panel Básico de Metabolismo", 95_000),
                item("LAB-001", "Hemograma Completo", 25_000),
            ],
        ),
        order(
            "ord-004",
            "ORD-2025-00139",
            "pat-004",
            "Sede Principal",
            OrderStatus::Completed,
            PaymentStatus::Paid,
            ("WALK-JKL012", "2025-02-16T16:00:00"),
            "2025-02-16T10:45:00",
            vec![
                item("LAB-002", "Perfil Lipídico", 78_000),
                item("LAB-004", "Glucosa en Ayunas", 25_000),
                item("LAB-001", "Hemograma Completo", 53_000),
            ],
        ),
        order(
            "ord-005",
            "ORD-2025-00138",
            "pat-005",
            "Sucursal Sur",
            OrderStatus::Cancelled,
            PaymentStatus::Refunded,
            ("WALK-MNO345", "2025-02-15T12:00:00"),
            "2025-02-15T09:00:00",
            vec![
                item("LAB-005", "Uroanálisis", 35_000),
                item("LAB-004", "Glucosa en Ayunas", 32_000),
            ],
        ),
    ]
}

fn result(
    id: &str,
    order_id: &str,
    patient: &str,
    code: &str,
    name: &str,
    status: ResultStatus,
) -> LabResult {
    LabResult {
        id: ResultId(id.to_string()),
        order_id: order_id.to_string(),
        patient_id: PatientId(patient.to_string()),
        service_id: code.to_string(),
        service_name: name.to_string(),
        status,
        sample_taken_at: None,
        completed_at: None,
        result_data: None,
        audio_url: None,
        share_uuid: None,
    }
}

pub fn results() -> Vec<LabResult> {
    vec![
        result(
            "res-001",
            "ord-001",
            "pat-001",
            "LAB-001",
            "Hemograma Completo",
            ResultStatus::Pending,
        ),
        LabResult {
            sample_taken_at: timestamp("2025-02-17T09:30:00"),
            ..result(
                "res-002",
                "ord-001",
                "pat-001",
                "LAB-002",
                "Perfil Lipídico",
                ResultStatus::SampleTaken,
            )
        },
        LabResult {
            sample_taken_at: timestamp("2025-02-17T10:00:00"),
            completed_at: timestamp("2025-02-17T11:30:00"),
            result_data: Some("Glucosa: 95 mg/dL (Normal)".to_string()),
            share_uuid: Some("share-uuid-123".to_string()),
            ..result(
                "res-003",
                "ord-002",
                "pat-002",
                "LAB-004",
                "Glucosa en Ayunas",
                ResultStatus::Completed,
            )
        },
        LabResult {
            sample_taken_at: timestamp("2025-02-16T15:00:00"),
            completed_at: timestamp("2025-02-16T17:30:00"),
            result_data: Some(
                "TSH: 2.5 mIU/L\nT3 Libre: 3.2 pg/mL\nT4 Libre: 1.2 ng/dL".to_string(),
            ),
            share_uuid: Some("share-uuid-456".to_string()),
            ..result(
                "res-004",
                "ord-003",
                "pat-003",
                "LAB-003",
                "Perfil Tiroideo",
                ResultStatus::Completed,
            )
        },
        LabResult {
            sample_taken_at: timestamp("2025-02-16T11:00:00"),
            ..result(
                "res-005",
                "ord-004",
                "pat-004",
                "LAB-002",
                "Perfil Lipídico",
                ResultStatus::InProgress,
            )
        },
    ]
}

fn patient(id: &str, document_id: &str, full_name: &str, email: &str, phone: &str) -> Patient {
    Patient {
        id: PatientId(id.to_string()),
        document_id: document_id.to_string(),
        full_name: full_name.to_string(),
        email: Some(email.to_string()),
        phone: Some(phone.to_string()),
    }
}

pub fn patients() -> Vec<Patient> {
    vec![
        patient(
            "pat-001",
            "1020304050",
            "María González",
            "maria.gonzalez@correo.co",
            "+57 300 111 2233",
        ),
        patient(
            "pat-002",
            "79845120",
            "Carlos Rodríguez",
            "carlos.rodriguez@correo.co",
            "+57 310 222 3344",
        ),
        patient(
            "pat-003",
            "52311987",
            "Ana Martínez",
            "ana.martinez@correo.co",
            "+57 315 333 4455",
        ),
        patient(
            "pat-004",
            "80123456",
            "Luis Pérez",
            "luis.perez@correo.co",
            "+57 320 444 5566",
        ),
        patient(
            "pat-005",
            "43987654",
            "Carmen López",
            "carmen.lopez@correo.co",
            "+57 301 555 6677",
        ),
    ]
}

fn stock(
    sku: &str,
    name: &str,
    category: &str,
    unit: &str,
    current: u32,
    min: u32,
) -> InventoryItem {
    InventoryItem {
        sku: sku.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        unit: unit.to_string(),
        current_stock: current,
        min_stock: min,
        location: "Almacén Principal".to_string(),
    }
}

pub fn inventory() -> Vec<InventoryItem> {
    vec![
        stock("REA-001", "Reactivo Hemograma", "Reactivos", "kit", 3, 5),
        stock("REA-002", "Reactivo Glucosa", "Reactivos", "frasco", 12, 10),
        stock("REA-003", "Reactivo Perfil Lipídico", "Reactivos", "kit", 25, 8),
        stock("TUB-001", "Tubos EDTA", "Consumibles", "caja", 4, 10),
        stock("TUB-002", "Tubos Secos", "Consumibles", "caja", 18, 10),
        stock("AGU-001", "Agujas Vacutainer 21G", "Consumibles", "caja", 40, 15),
        stock("GUA-001", "Guantes de Nitrilo M", "Protección", "caja", 7, 6),
        stock("ORI-001", "Frascos para Orina", "Consumibles", "unidad", 120, 50),
    ]
}

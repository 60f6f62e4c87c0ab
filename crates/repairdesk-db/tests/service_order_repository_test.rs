//! Integration tests for the ServiceOrder repository using in-memory
//! SurrealDB.

use chrono::Utc;
use repairdesk_core::error::ShopError;
use repairdesk_core::ids;
use repairdesk_core::models::customer::CreateCustomer;
use repairdesk_core::models::equipment::CreateEquipment;
use repairdesk_core::models::service_order::{CreateServiceOrder, OrderStatus, StatusUpdate};
use repairdesk_core::models::technician::CreateTechnician;
use repairdesk_core::repository::{
    CustomerRepository, EquipmentRepository, ServiceOrderRepository, TechnicianRepository,
};
use repairdesk_db::repository::Repositories;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

struct Fixture {
    db: Surreal<Db>,
    repos: Repositories<Db>,
    customer_id: String,
    equipment_id: String,
    technician_id: String,
}

/// Helper: in-memory DB with one customer, one device and one technician.
async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    repairdesk_db::run_migrations(&db).await.unwrap();
    let allocator = repairdesk_db::initialize_counters(&db).await.unwrap();
    let repos = Repositories::new(db.clone(), ids::shared(allocator));

    let customer = repos
        .customers
        .create(CreateCustomer {
            name: "Ana Silva".into(),
            phone: "11987654321".into(),
            city: Some("Campinas".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let equipment = repos
        .equipment
        .create(CreateEquipment {
            customer_id: customer.id.clone(),
            equipment_type: "Notebook".into(),
            brand: Some("Dell".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let technician = repos
        .technicians
        .create(CreateTechnician {
            name: "Carlos Souza".into(),
            specialty: Some("Eletrônica".into()),
        })
        .await
        .unwrap();

    Fixture {
        db,
        repos,
        customer_id: customer.id,
        equipment_id: equipment.id,
        technician_id: technician.id,
    }
}

impl Fixture {
    fn order(&self, problem: &str) -> CreateServiceOrder {
        CreateServiceOrder {
            customer_id: self.customer_id.clone(),
            equipment_id: self.equipment_id.clone(),
            technician_id: self.technician_id.clone(),
            problem_description: problem.into(),
        }
    }
}

#[tokio::test]
async fn new_order_is_open_without_close_date() {
    let fx = setup().await;
    let before = Utc::now();

    let order = fx
        .repos
        .orders
        .create(fx.order("  Não liga  "))
        .await
        .unwrap();

    assert_eq!(order.id, "OS00001");
    assert_eq!(order.status, OrderStatus::Open);
    assert_eq!(order.closed_at, None);
    assert_eq!(order.solution_description, None);
    assert_eq!(order.problem_description, "Não liga");
    assert!(order.opened_at >= before);

    let fetched = fx.repos.orders.get_by_id("OS00001").await.unwrap();
    assert_eq!(fetched, order);
}

#[tokio::test]
async fn order_references_must_exist() {
    let fx = setup().await;

    let mut input = fx.order("Tela quebrada");
    input.technician_id = "TEC00099".into();
    let err = fx.repos.orders.create(input).await.unwrap_err();
    match err {
        ShopError::NotFound { entity, id } => {
            assert_eq!(entity, "technician");
            assert_eq!(id, "TEC00099");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }

    let mut input = fx.order("Tela quebrada");
    input.equipment_id = "EQP00099".into();
    let err = fx.repos.orders.create(input).await.unwrap_err();
    assert!(matches!(err, ShopError::NotFound { .. }));
}

#[tokio::test]
async fn status_update_writes_close_date_and_solution() {
    let fx = setup().await;
    let order = fx.repos.orders.create(fx.order("Não liga")).await.unwrap();
    let closed_at = Utc::now();

    let closed = fx
        .repos
        .orders
        .apply_status_update(
            &order.id,
            StatusUpdate {
                status: OrderStatus::Closed,
                closed_at: Some(Some(closed_at)),
                solution_description: Some("Troca da fonte".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(closed.status, OrderStatus::Closed);
    assert_eq!(closed.closed_at, Some(closed_at));
    assert_eq!(closed.solution_description.as_deref(), Some("Troca da fonte"));

    let reopened = fx
        .repos
        .orders
        .apply_status_update(
            &order.id,
            StatusUpdate {
                status: OrderStatus::InProgress,
                closed_at: Some(None),
                solution_description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(reopened.status, OrderStatus::InProgress);
    assert_eq!(reopened.closed_at, None);
    // Solution text is kept when not overwritten.
    assert_eq!(
        reopened.solution_description.as_deref(),
        Some("Troca da fonte")
    );
}

#[tokio::test]
async fn status_update_on_unknown_order_is_not_found() {
    let fx = setup().await;

    let err = fx
        .repos
        .orders
        .apply_status_update(
            "OS00077",
            StatusUpdate {
                status: OrderStatus::InProgress,
                closed_at: None,
                solution_description: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::NotFound { .. }));
}

#[tokio::test]
async fn view_joins_customer_equipment_and_technician() {
    let fx = setup().await;
    let order = fx.repos.orders.create(fx.order("Não liga")).await.unwrap();

    let view = fx.repos.orders.get_view(&order.id).await.unwrap();

    assert_eq!(view.id, order.id);
    assert_eq!(view.status, OrderStatus::Open);
    assert_eq!(view.customer_id, fx.customer_id);
    assert_eq!(view.customer_name.as_deref(), Some("Ana Silva"));
    assert_eq!(view.customer_phone.as_deref(), Some("11987654321"));
    assert_eq!(view.customer_city.as_deref(), Some("Campinas"));
    assert_eq!(view.customer_email, None);
    assert_eq!(view.equipment_type.as_deref(), Some("Notebook"));
    assert_eq!(view.equipment_brand.as_deref(), Some("Dell"));
    assert_eq!(view.technician_name.as_deref(), Some("Carlos Souza"));
    assert_eq!(view.technician_specialty.as_deref(), Some("Eletrônica"));
}

#[tokio::test]
async fn view_of_order_with_deleted_reference_has_empty_joined_fields() {
    let fx = setup().await;
    let order = fx.repos.orders.create(fx.order("Não liga")).await.unwrap();

    fx.db
        .query("DELETE type::record('technician', $id)")
        .bind(("id", fx.technician_id.clone()))
        .await
        .unwrap()
        .check()
        .unwrap();

    let view = fx.repos.orders.get_view(&order.id).await.unwrap();
    assert_eq!(view.technician_id, fx.technician_id);
    assert_eq!(view.technician_name, None);
    assert_eq!(view.customer_name.as_deref(), Some("Ana Silva"));
}

#[tokio::test]
async fn search_lists_newest_first_and_matches_id_or_customer_name() {
    let fx = setup().await;
    for problem in ["Primeira", "Segunda", "Terceira"] {
        fx.repos.orders.create(fx.order(problem)).await.unwrap();
    }

    let all = fx.repos.orders.search(None).await.unwrap();
    let ids: Vec<&str> = all.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, ["OS00003", "OS00002", "OS00001"]);
    for window in all.windows(2) {
        assert!(window[0].opened_at >= window[1].opened_at);
    }

    let by_id = fx.repos.orders.search(Some("os00002")).await.unwrap();
    assert_eq!(by_id.len(), 1);
    assert_eq!(by_id[0].problem_description, "Segunda");

    let by_customer = fx.repos.orders.search(Some("SILVA")).await.unwrap();
    assert_eq!(by_customer.len(), 3);

    assert!(fx.repos.orders.search(Some("costa")).await.unwrap().is_empty());
}

#[tokio::test]
async fn search_without_term_is_capped_at_fifty() {
    let fx = setup().await;
    for i in 0..55 {
        fx.repos
            .orders
            .create(fx.order(&format!("Defeito {i}")))
            .await
            .unwrap();
    }

    let recent = fx.repos.orders.search(None).await.unwrap();
    assert_eq!(recent.len(), 50);
    assert_eq!(recent[0].id, "OS00055");

    assert_eq!(fx.repos.orders.search(Some("OS000")).await.unwrap().len(), 55);
}

#[tokio::test]
async fn count_open_ignores_closed_orders() {
    let fx = setup().await;
    let first = fx.repos.orders.create(fx.order("A")).await.unwrap();
    fx.repos.orders.create(fx.order("B")).await.unwrap();

    assert_eq!(fx.repos.orders.count_open().await.unwrap(), 2);

    fx.repos
        .orders
        .apply_status_update(
            &first.id,
            StatusUpdate {
                status: OrderStatus::Closed,
                closed_at: Some(Some(Utc::now())),
                solution_description: Some("Resolvido".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(fx.repos.orders.count_open().await.unwrap(), 1);
}

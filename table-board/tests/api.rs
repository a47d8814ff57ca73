// table-board/tests/api.rs
// 看板 HTTP API 测试 (tower oneshot + MemoryOrderService)

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use order_client::MemoryOrderService;
use rust_decimal::Decimal;
use serde_json::Value;
use shared::{Order, OrderItem, TableId};
use std::sync::Arc;
use table_board::{AppState, build_app};
use table_engine::{EngineConfig, Reconciler};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

struct TestBoard {
    app: Router,
    service: MemoryOrderService,
    shutdown: CancellationToken,
}

async fn board() -> TestBoard {
    let service = MemoryOrderService::new();
    service
        .push_order(
            Order::new(
                1,
                TableId::new("T1").unwrap(),
                vec![OrderItem::new("Coke", 2, Some(Decimal::from(3)))],
            )
            .with_total(Decimal::from(6)),
        )
        .await;

    let shutdown = CancellationToken::new();
    let (reconciler, dashboard) = Reconciler::new(
        Arc::new(service.clone()),
        vec![TableId::new("T1").unwrap(), TableId::new("T2").unwrap()],
        EngineConfig::default(),
        shutdown.clone(),
    )
    .unwrap();
    tokio::spawn(reconciler.run());

    TestBoard {
        app: build_app(AppState::new(dashboard)),
        service,
        shutdown,
    }
}

async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let board = board().await;
    let (status, body) = send(&board.app, Method::GET, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["feed"].is_object());
}

#[tokio::test]
async fn test_refresh_then_list() {
    let board = board().await;

    let (status, body) = send(&board.app, Method::POST, "/api/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "E0000");
    assert_eq!(body["data"]["feed"]["online"], true);

    let (status, body) = send(&board.app, Method::GET, "/api/tables").await;
    assert_eq!(status, StatusCode::OK);
    let tables = body["data"]["tables"].as_array().unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0]["tableId"], "T1");
    assert_eq!(tables[0]["status"], "ordered");
    assert_eq!(tables[0]["badge"], "blue");
    assert_eq!(tables[0]["aggregate"]["mergedItems"]["Coke"], 2);
    assert_eq!(tables[0]["totalDisplay"], "6.00");
    assert_eq!(tables[1]["status"], "empty");
}

#[tokio::test]
async fn test_get_single_table() {
    let board = board().await;

    let (status, body) = send(&board.app, Method::GET, "/api/tables/t2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tableId"], "T2");
    assert_eq!(body["data"]["label"], "Libre");

    let (status, body) = send(&board.app, Method::GET, "/api/tables/T9").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E0003");
}

#[tokio::test]
async fn test_print_moves_table_to_preparing() {
    let board = board().await;

    let (status, body) = send(&board.app, Method::POST, "/api/tables/T1/print").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Ticket printed");
    assert_eq!(body["data"]["status"], "preparing");
    assert_eq!(body["data"]["pendingTimer"], "escalation");
    assert_eq!(board.service.printed().await, vec![TableId::new("T1").unwrap()]);
}

#[tokio::test]
async fn test_failed_confirm_is_bad_gateway() {
    let board = board().await;
    send(&board.app, Method::POST, "/api/refresh").await;
    board.service.set_fail_confirm(true).await;

    let (status, body) = send(&board.app, Method::POST, "/api/tables/T1/confirm").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "E5001");

    let (_, body) = send(&board.app, Method::GET, "/api/tables/T1").await;
    assert_eq!(body["data"]["status"], "ordered");
    assert_eq!(body["data"]["lastError"]["action"], "confirmPayment");
}

#[tokio::test]
async fn test_confirm_pays_table() {
    let board = board().await;

    let (status, body) = send(&board.app, Method::POST, "/api/tables/T1/confirm").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "paid");
    assert_eq!(body["data"]["label"], "Payé");
    assert_eq!(board.service.confirmed().await, vec![TableId::new("T1").unwrap()]);
}

#[tokio::test]
async fn test_action_on_unknown_table() {
    let board = board().await;
    let (status, body) = send(&board.app, Method::POST, "/api/tables/T9/confirm").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E0003");
    assert!(board.service.confirmed().await.is_empty());
}

#[tokio::test]
async fn test_stopped_engine_is_unavailable() {
    let board = board().await;
    board.shutdown.cancel();

    // wait for the reconciler to drop its command receiver
    let mut attempts = 0;
    loop {
        let (status, body) = send(&board.app, Method::POST, "/api/refresh").await;
        if status == StatusCode::SERVICE_UNAVAILABLE {
            assert_eq!(body["code"], "E9003");
            break;
        }
        attempts += 1;
        assert!(attempts < 100, "reconciler did not stop");
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_health_reports_stopped_engine() {
    let board = board().await;
    let (status, body) = send(&board.app, Method::GET, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["engine_running"], true);

    board.shutdown.cancel();
    let mut attempts = 0;
    loop {
        let (status, body) = send(&board.app, Method::GET, "/health").await;
        if status == StatusCode::SERVICE_UNAVAILABLE {
            assert_eq!(body["status"], "stopped");
            assert_eq!(body["engine_running"], false);
            break;
        }
        attempts += 1;
        assert!(attempts < 100, "reconciler did not stop");
        tokio::task::yield_now().await;
    }
}

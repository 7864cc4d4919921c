use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use paperdesk::{create_router, AppState, SqlitePersistence};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_app() -> Router {
    let db = SqlitePersistence::in_memory()
        .await
        .expect("Failed to create in-memory database");
    create_router(AppState::new(db), None)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

fn btc_long() -> Value {
    json!({
        "symbol": "btcusdt",
        "direction": "LONG",
        "entry_price": 100.0,
        "stop_loss": 95.0,
        "take_profit": 110.0,
        "quantity": 1.0,
        "risk_amount": 5.0,
        "risk_percentage": 5.0,
        "position_value": 100.0,
        "potential_loss": 5.0,
        "potential_profit": 10.0,
        "risk_reward_ratio": 2.0
    })
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_paper_trade_close_updates_stats() {
    let app = test_app().await;

    let (status, before) = send(&app, Method::GET, "/api/paper-trades/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(before["general"]["total_trades"], 0);
    assert_eq!(before["general"]["total_pnl"], 0.0);
    assert!(before["general"]["avg_pnl"].is_null());

    let (status, created) = send(&app, Method::POST, "/api/paper-trades", Some(btc_long())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["symbol"], "BTCUSDT");
    assert_eq!(created["direction"], "LONG");
    let id = created["id"].as_i64().unwrap();

    let (_, trades) = send(&app, Method::GET, "/api/paper-trades", None).await;
    assert_eq!(trades[0]["status"], "planned");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/paper-trades/{}", id),
        Some(json!({ "status": "closed", "actual_profit_loss": 8.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, after) = send(&app, Method::GET, "/api/paper-trades/stats", None).await;
    assert_eq!(after["general"]["total_pnl"], 8.0);
    assert_eq!(after["general"]["winning_trades"], 1);
    assert_eq!(after["general"]["closed_trades"], 1);
    assert_eq!(after["by_symbol"][0]["symbol"], "BTCUSDT");
    assert_eq!(after["by_direction"][0]["direction"], "LONG");
    assert_eq!(after["by_direction"][0]["avg_pnl"], 8.0);
}

#[tokio::test]
async fn test_invalid_trades_rejected_and_not_persisted() {
    let app = test_app().await;

    let mut bad_long = btc_long();
    bad_long["stop_loss"] = json!(101.0);
    let (status, body) = send(&app, Method::POST, "/api/paper-trades", Some(bad_long)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("LONG"));

    let mut long_levels_as_short = btc_long();
    long_levels_as_short["direction"] = json!("SHORT");
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/paper-trades",
        Some(long_levels_as_short),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut sideways = btc_long();
    sideways["direction"] = json!("SIDEWAYS");
    let (status, _) = send(&app, Method::POST, "/api/paper-trades", Some(sideways)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut no_quantity = btc_long();
    no_quantity["quantity"] = json!(0.0);
    let (status, _) = send(&app, Method::POST, "/api/paper-trades", Some(no_quantity)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/paper-trades",
        Some(json!({ "symbol": "BTCUSDT" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, trades) = send(&app, Method::GET, "/api/paper-trades", None).await;
    assert_eq!(trades.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_short_trade_and_filters() {
    let app = test_app().await;

    let mut short = btc_long();
    short["symbol"] = json!("ETHUSDT");
    short["direction"] = json!("SHORT");
    short["stop_loss"] = json!(105.0);
    short["take_profit"] = json!(90.0);
    let (status, _) = send(&app, Method::POST, "/api/paper-trades", Some(short)).await;
    assert_eq!(status, StatusCode::OK);
    send(&app, Method::POST, "/api/paper-trades", Some(btc_long())).await;

    let (_, eth) = send(&app, Method::GET, "/api/paper-trades?symbol=ethusdt", None).await;
    assert_eq!(eth.as_array().unwrap().len(), 1);
    assert_eq!(eth[0]["direction"], "SHORT");

    let (_, planned) = send(&app, Method::GET, "/api/paper-trades?status=planned", None).await;
    assert_eq!(planned.as_array().unwrap().len(), 2);

    let (status, _) = send(&app, Method::GET, "/api/paper-trades?status=open", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blank_filters_list_every_trade() {
    let app = test_app().await;
    send(&app, Method::POST, "/api/paper-trades", Some(btc_long())).await;
    let mut eth = btc_long();
    eth["symbol"] = json!("ETHUSDT");
    send(&app, Method::POST, "/api/paper-trades", Some(eth)).await;

    let (status, trades) = send(&app, Method::GET, "/api/paper-trades?status=&symbol=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trades.as_array().unwrap().len(), 2);

    let (status, trades) = send(&app, Method::GET, "/api/paper-trades?status=&symbol=ETHUSDT", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trades.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_close_with_naive_exit_time() {
    let app = test_app().await;
    let (_, created) = send(&app, Method::POST, "/api/paper-trades", Some(btc_long())).await;
    let uri = format!("/api/paper-trades/{}", created["id"]);

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({
            "status": "closed",
            "exit_time": "2024-06-01T12:00:00",
            "actual_profit_loss": 8.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, trade) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(trade["status"], "closed");
    assert_eq!(trade["actual_profit_loss"], 8.0);
    assert!(trade["exit_time"].as_str().unwrap().starts_with("2024-06-01T12:00:00"));

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "exit_time": "soon" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("exit_time"));
}

#[tokio::test]
async fn test_malformed_id_returns_json_detail() {
    let app = test_app().await;

    for (method, uri) in [
        (Method::GET, "/api/paper-trades/abc"),
        (Method::DELETE, "/api/paper-trades/abc"),
        (Method::DELETE, "/api/watchlist/abc"),
    ] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
    }

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/paper-trades/abc",
        Some(json!({ "status": "active" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_paper_trade_update_and_delete_errors() {
    let app = test_app().await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/paper-trades/99",
        Some(json!({ "status": "active" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, created) = send(&app, Method::POST, "/api/paper-trades", Some(btc_long())).await;
    let uri = format!("/api/paper-trades/{}", created["id"]);

    let (status, trade) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trade["symbol"], "BTCUSDT");

    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "status": "done" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favorites_duplicate_and_reorder() {
    let app = test_app().await;

    for symbol in ["ausdt", "busdt", "cusdt"] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/favorites",
            Some(json!({ "symbol": symbol })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/favorites",
        Some(json!({ "symbol": "AUSDT" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("AUSDT"));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/favorites/reorder",
        Some(json!({ "symbol_order": ["BUSDT", "AUSDT", "CUSDT"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, favorites) = send(&app, Method::GET, "/api/favorites", None).await;
    let favorites = favorites.as_array().unwrap();
    assert_eq!(favorites.len(), 3);
    let order: Vec<(&str, i64)> = favorites
        .iter()
        .map(|f| (f["symbol"].as_str().unwrap(), f["sort_order"].as_i64().unwrap()))
        .collect();
    assert_eq!(order, vec![("BUSDT", 0), ("AUSDT", 1), ("CUSDT", 2)]);
}

#[tokio::test]
async fn test_favorite_update_and_delete() {
    let app = test_app().await;
    send(
        &app,
        Method::POST,
        "/api/favorites",
        Some(json!({ "symbol": "SOLUSDT", "notes": "range" })),
    )
    .await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/favorites/solusdt",
        Some(json!({ "color": "#00FFAA" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, favorites) = send(&app, Method::GET, "/api/favorites", None).await;
    assert_eq!(favorites[0]["color"], "#00FFAA");
    assert_eq!(favorites[0]["notes"], "range");

    let (status, body) = send(&app, Method::DELETE, "/api/favorites/%20solusdt%20", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "SOLUSDT removed from favorites");

    let (status, _) = send(&app, Method::DELETE, "/api/favorites/SOLUSDT", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::PUT, "/api/favorites/SOLUSDT", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_watchlist_tracks_favorites() {
    let app = test_app().await;

    let (status, added) = send(
        &app,
        Method::POST,
        "/api/watchlist",
        Some(json!({ "symbol": "btcusdt" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = added["id"].as_i64().unwrap();

    send(
        &app,
        Method::POST,
        "/api/favorites",
        Some(json!({ "symbol": "BTCUSDT" })),
    )
    .await;

    let (_, watchlist) = send(&app, Method::GET, "/api/watchlist", None).await;
    assert_eq!(watchlist[0]["symbol"], "BTCUSDT");
    assert_eq!(watchlist[0]["is_favorite"], true);

    send(&app, Method::DELETE, "/api/favorites/BTCUSDT", None).await;

    let (_, watchlist) = send(&app, Method::GET, "/api/watchlist", None).await;
    assert_eq!(watchlist[0]["is_favorite"], false);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/watchlist/{}", id),
        Some(json!({ "symbol": " ethusdt ", "is_active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "ETHUSDT updated");

    let (_, watchlist) = send(&app, Method::GET, "/api/watchlist", None).await;
    assert_eq!(watchlist[0]["symbol"], "ETHUSDT");
    assert_eq!(watchlist[0]["is_active"], false);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/watchlist",
        Some(json!({ "symbol": "ETHUSDT" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/watchlist/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/watchlist/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

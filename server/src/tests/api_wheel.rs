use axum::http::{Method, StatusCode};
use serde_json::json;

use super::{app, send, test_state};

#[tokio::test]
async fn manual_roster_management() {
    let state = test_state();
    let app = app(&state);

    for name in ["alice", "bob", "alice"] {
        let body = json!({ "name": name }).to_string();
        let (status, _) = send(&app, Method::POST, "/api/wheel/participants", Some(&body)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, Method::DELETE, "/api/wheel/participants/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], true);
    assert_eq!(body["wheel"]["entries"], json!(["bob", "alice"]));

    let (_, body) = send(&app, Method::POST, "/api/wheel/participants/remove-last", None).await;
    assert_eq!(body["removed"], "alice");

    let (_, body) = send(&app, Method::POST, "/api/wheel/clear", None).await;
    assert_eq!(body["removed"], 1);
    assert_eq!(body["wheel"]["totalEntries"], 0);

    let (_, body) = send(&app, Method::POST, "/api/wheel/participants/remove-last", None).await;
    assert_eq!(body["removed"], json!(null));
}

#[tokio::test]
async fn add_participant_rejections() {
    let state = test_state();
    let app = app(&state);

    let (status, body) =
        send(&app, Method::POST, "/api/wheel/participants", Some(r#"{"name": "   "}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    send(&app, Method::PUT, "/api/wheel/config", Some(r#"{"maxLimit": 1}"#)).await;
    let (status, _) =
        send(&app, Method::POST, "/api/wheel/participants", Some(r#"{"username": "a"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) =
        send(&app, Method::POST, "/api/wheel/participants", Some(r#"{"name": "b"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Roster is full");
}

#[tokio::test]
async fn config_update_is_partial_and_switches_mode() {
    let state = test_state();
    let app = app(&state);

    let (_, body) = send(&app, Method::GET, "/api/wheel", None).await;
    assert_eq!(body["mode"], "count");

    let (status, body) = send(&app, Method::PUT, "/api/wheel/config", Some(r#"{"minCoins": 100}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["config"], json!({ "maxLimit": 0, "minCoins": 100 }));
    assert_eq!(body["wheel"]["mode"], "coin");

    let (_, body) = send(&app, Method::PUT, "/api/wheel/config", Some(r#"{"maxLimit": 20}"#)).await;
    assert_eq!(body["config"], json!({ "maxLimit": 20, "minCoins": 100 }));

    assert_eq!(state.db().load_min_coins().unwrap(), 100);
    assert_eq!(state.db().load_max_limit().unwrap(), 20);
}

#[tokio::test]
async fn spin_needs_entries_and_picks_a_listed_winner() {
    let state = test_state();
    let app = app(&state);
    let mut rx = state.subscribe_ws();

    let (status, body) = send(&app, Method::POST, "/api/wheel/spin", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no participants");

    for name in ["a", "b", "c"] {
        let body = json!({ "name": name }).to_string();
        send(&app, Method::POST, "/api/wheel/participants", Some(&body)).await;
    }

    let (status, plan) = send(&app, Method::POST, "/api/wheel/spin", None).await;
    assert_eq!(status, StatusCode::OK);
    let index = plan["winnerIndex"].as_u64().unwrap() as usize;
    assert!(index < 3);
    assert_eq!(plan["winner"], ["a", "b", "c"][index]);
    assert_eq!(plan["totalEntries"], 3);
    assert_eq!(plan["durationMs"], 4000);

    let mut saw_spin = false;
    while let Ok(raw) = rx.try_recv() {
        let msg: serde_json::Value = serde_json::from_str(&raw).unwrap();
        if msg["type"] == "wheel_spin" {
            assert_eq!(msg["data"]["winnerIndex"], plan["winnerIndex"]);
            saw_spin = true;
        }
    }
    assert!(saw_spin);
}

#[tokio::test]
async fn leaderboard_views_and_reset() {
    let state = test_state();
    let app = app(&state);

    for i in 0..12u64 {
        let payload = json!({ "uniqueId": format!("user{i:02}"), "giftId": "rose", "coins": i + 1 });
        send(&app, Method::POST, "/webhook", Some(&payload.to_string())).await;
    }

    let (_, board) = send(&app, Method::GET, "/api/leaderboard", None).await;
    assert_eq!(board["entries"].as_array().unwrap().len(), 10);
    assert_eq!(board["entries"][0]["username"], "user11");
    assert_eq!(board["entries"][0]["rank"], 1);
    assert_eq!(board["totalUsers"], 12);

    let (_, board) = send(&app, Method::GET, "/api/leaderboard?limit=all", None).await;
    assert_eq!(board["entries"].as_array().unwrap().len(), 12);

    let (status, _) = send(&app, Method::POST, "/api/leaderboard/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, board) = send(&app, Method::GET, "/api/leaderboard", None).await;
    assert_eq!(board["entries"], json!([]));

    let (_, wheel) = send(&app, Method::GET, "/api/wheel", None).await;
    assert_eq!(wheel["totalEntries"], 12);
}

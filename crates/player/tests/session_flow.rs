//! End-to-end session flow against an in-process room server.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};

use gemduel_player::{
    ApiAdapter, PlayerConfig, RoomSocketClient, SessionError, SessionService, SessionState,
};
use gemduel_shared::{GameStatus, PlayerAction};

const WAIT: Duration = Duration::from_secs(5);

/// Frames the fake server pushes right after a player announces itself
const SCRIPT: &[&str] = &[
    r#"{"type":"room_info","data":{"id":"room-1","name":"Duel","createdAt":"2026-10-17T10:00:00Z"}}"#,
    r#"{"type":"player_joined","data":{"playerId":"p1","playerName":"Alice"}}"#,
    r#"{"type":"player_joined","data":{"playerId":"p2","playerName":"Bob"}}"#,
    r#"{"type":"chat_message","playerId":"p2","playerName":"Bob","message":"hi"}"#,
    r#"{"type":"game_start","data":{"id":"room-1","name":"Duel","gameState":{"status":"playing","currentTurn":"p1","players":[{"id":"p1","name":"Alice"},{"id":"p2","name":"Bob"}]}}}"#,
    r#"{"type":"game_action","action":{"playerId":"p2","playerName":"Bob","type":"takeGems","description":"took 3 gems"}}"#,
    r#"{"type":"mystery_message","data":{}}"#,
];

#[derive(Clone)]
struct FakeServer {
    /// Every text frame received from players
    received: mpsc::UnboundedSender<Value>,
    /// Open socket's outbound side, so tests can close it
    close: Arc<Mutex<Option<mpsc::UnboundedSender<()>>>>,
}

async fn create_room(Json(body): Json<Value>) -> impl IntoResponse {
    let name = body["roomName"].as_str().unwrap_or_default().to_string();
    Json(json!({
        "success": true,
        "message": "room created",
        "data": {
            "room": {"id": "room-1", "name": name, "gameState": null},
            "playerId": "p1"
        }
    }))
}

async fn join_room(Json(body): Json<Value>) -> impl IntoResponse {
    if body["roomName"] == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "message": "room not found"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {"room": {"id": "room-1", "name": "Duel"}, "playerId": "p2"}
        })),
    )
}

async fn room_socket(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    State(server): State<FakeServer>,
) -> impl IntoResponse {
    assert_eq!(room_id, "room-1");
    ws.on_upgrade(move |socket| handle_socket(socket, server))
}

async fn handle_socket(mut socket: WebSocket, server: FakeServer) {
    let (close_tx, mut close_rx) = mpsc::unbounded_channel();
    *server.close.lock().await = Some(close_tx);

    let mut announced = false;
    loop {
        tokio::select! {
            frame = socket.recv() => {
                let Some(Ok(frame)) = frame else { return };
                let Message::Text(text) = frame else { continue };
                let value: Value = serde_json::from_str(text.as_str()).unwrap();
                let is_join = value["type"] == "player_join";
                server.received.send(value).unwrap();

                if is_join && !announced {
                    announced = true;
                    for frame in SCRIPT {
                        socket.send(Message::Text((*frame).into())).await.unwrap();
                    }
                }
            }
            _ = close_rx.recv() => {
                let _ = socket.send(Message::Close(None)).await;
                return;
            }
        }
    }
}

async fn start_server() -> (String, FakeServer, mpsc::UnboundedReceiver<Value>) {
    let (received, received_rx) = mpsc::unbounded_channel();
    let server = FakeServer {
        received,
        close: Arc::new(Mutex::new(None)),
    };

    let app = Router::new()
        .route("/api/rooms", post(create_room))
        .route("/api/rooms/join", post(join_room))
        .route("/ws/{room_id}", get(room_socket))
        .with_state(server.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), server, received_rx)
}

fn session_for(base_url: &str) -> SessionService {
    let config = PlayerConfig::for_server(base_url);
    let api = Arc::new(ApiAdapter::new(&config.api_base_url, config.request_timeout));
    SessionService::new(api, Arc::new(RoomSocketClient::new()), config)
}

async fn next_frame(rx: &mut mpsc::UnboundedReceiver<Value>) -> Value {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("server gone")
}

async fn wait_for(session: &SessionService, done: impl Fn(&SessionState) -> bool) {
    tokio::time::timeout(WAIT, async {
        while !done(&session.snapshot()) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("timed out waiting for session state");
}

#[tokio::test]
async fn test_failed_join_leaves_session_empty() {
    let (base_url, _server, _received) = start_server().await;
    let session = session_for(&base_url);

    let outcome = session.join_room("missing", "Bob").await;

    assert_eq!(outcome.message(), Some("room not found"));
    assert_eq!(session.snapshot(), SessionState::default());
    assert!(matches!(
        session.connect_websocket("room-1").await,
        Err(SessionError::NoPlayer)
    ));
}

#[tokio::test]
async fn test_full_session() {
    let (base_url, server, mut received) = start_server().await;
    let session = session_for(&base_url);

    let outcome = session.create_room("Duel", "Alice").await;
    assert_eq!(outcome.room_id(), Some("room-1"));

    session.connect_websocket("room-1").await.unwrap();
    assert!(session.is_connected());

    let join = next_frame(&mut received).await;
    assert_eq!(
        join,
        json!({"type": "player_join", "playerId": "p1", "playerName": "Alice"})
    );

    wait_for(&session, |s| s.game_history.len() == 1).await;
    let state = session.snapshot();
    let game = state.game_state.as_ref().unwrap();
    assert_eq!(game.status, GameStatus::Playing);
    assert_eq!(game.current_turn, "p1");
    assert_eq!(game.players.len(), 2);
    assert!(state.current_room.as_ref().unwrap().created_at.is_some());
    assert_eq!(state.chat_messages.len(), 1);
    assert_eq!(state.chat_messages[0].message, "hi");
    assert_eq!(state.game_history[0].description, "took 3 gems");

    session.send_chat_message(" gg ").await;
    assert_eq!(
        next_frame(&mut received).await,
        json!({"type": "chat_message", "playerId": "p1", "playerName": "Alice", "message": "gg"})
    );

    session
        .perform_game_action(PlayerAction::new("endTurn"))
        .await;
    assert_eq!(
        next_frame(&mut received).await,
        json!({"type": "game_action", "playerId": "p1", "playerName": "Alice", "actionType": "endTurn", "data": {}})
    );

    session.disconnect().await;
    assert_eq!(session.snapshot(), SessionState::default());
    assert!(matches!(
        session.send_game_action("endTurn", json!({})).await,
        Err(SessionError::NotConnected)
    ));
    drop(server);
}

#[tokio::test]
async fn test_server_close_keeps_room_but_drops_connection() {
    let (base_url, server, mut received) = start_server().await;
    let session = session_for(&base_url);

    assert!(session.create_room("Duel", "Alice").await.is_success());
    session.connect_websocket("room-1").await.unwrap();
    next_frame(&mut received).await;
    wait_for(&session, |s| s.game_history.len() == 1).await;

    let close = server.close.lock().await.clone().unwrap();
    close.send(()).unwrap();

    wait_for(&session, |s| !s.is_connected).await;
    let state = session.snapshot();
    assert_eq!(state.room_id(), Some("room-1"));
    assert_eq!(state.chat_messages.len(), 1);

    // Silently dropped once the socket is gone
    session.send_chat_message("anyone?").await;
    assert!(tokio::time::timeout(Duration::from_millis(200), received.recv())
        .await
        .map_or(true, |frame| frame.is_none()));
}

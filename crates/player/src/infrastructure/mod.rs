//! Infrastructure adapters: HTTP room API, room WebSocket, configuration

pub mod config;
pub mod http_client;
pub mod websocket;

pub use config::PlayerConfig;
pub use http_client::ApiAdapter;
pub use websocket::RoomSocketClient;

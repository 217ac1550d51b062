mod artists;
mod auth;
mod avatars;
mod context;
mod docs;
mod errors;
mod groups;
mod rankings;
mod schemas;
mod serialized;
mod settings;
mod users;

pub mod logging;

use std::{
    env,
    net::{Ipv6Addr, SocketAddr},
    sync::Arc,
};

use axum::routing::get;
use log::info;
use rooranking_core::Festival;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use context::ServerContext;

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 9070;

pub type Router = axum::Router<ServerContext>;

/// Starts the Roo Ranking server
pub async fn run_server(festival: Festival) {
    let port = env::var("ROO_SERVER_PORT")
        .map(|x| x.parse::<u16>().expect("Port must be a number"))
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let context = ServerContext {
        festival: Arc::new(festival),
    };

    let version_one_router = Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/artists", artists::router())
        .nest("/groups", groups::router())
        .nest("/rankings", rankings::router())
        .nest("/settings", settings::router())
        .nest("/avatars", avatars::router());

    let root_router = Router::new()
        .nest("/v1", version_one_router)
        .route("/api.json", get(docs::docs))
        .layer(cors)
        .with_state(context);

    let listener = TcpListener::bind(&addr).await.expect("listens on address");

    info!("Listening on port {port}.");

    axum::serve(listener, root_router.into_make_service())
        .await
        .expect("server runs");
}

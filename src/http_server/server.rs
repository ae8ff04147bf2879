//! Builds and serves the Axum router for whichever role this process runs.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, AllowOrigin, CorsLayer};

use super::master_routes;
use super::slave_routes::{self, SlaveState};
use super::state::AppState;
use crate::config::ArtificialDelayConfig;
use crate::observability::Logger;

pub struct HttpServer {
    listen: String,
    router: Router,
}

impl HttpServer {
    pub fn primary(state: AppState, cors_origins: &[String]) -> Self {
        let listen = String::new();
        let router = master_routes::router(state).layer(Self::cors(cors_origins));
        Self { listen, router }
    }

    pub fn secondary(
        state: AppState,
        delay: ArtificialDelayConfig,
        cors_origins: &[String],
    ) -> Self {
        let listen = String::new();
        let router = slave_routes::router(SlaveState { app: state, delay })
            .layer(Self::cors(cors_origins));
        Self { listen, router }
    }

    pub fn listen_on(mut self, addr: impl Into<String>) -> Self {
        self.listen = addr.into();
        self
    }

    fn cors(origins: &[String]) -> CorsLayer {
        if origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(parsed))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }

    pub fn router(self) -> Router {
        self.router
    }

    pub async fn serve(self) -> std::io::Result<()> {
        let addr: SocketAddr = self
            .listen
            .parse()
            .unwrap_or_else(|_| panic!("invalid listen address: {}", self.listen));

        Logger::info(
            "http_server_listening",
            &[("addr", addr.to_string().as_str())],
        );

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Role;
    use crate::health::HealthMap;
    use crate::log::Log;
    use crate::replication::{BackoffConfig, Replicator};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn primary_router_builds() {
        let log = Arc::new(Log::new());
        let health = Arc::new(HealthMap::new(&["s1".into()]));
        let replicator = Replicator::new(
            health.clone(),
            vec!["s1".into()],
            Duration::from_secs(5),
            BackoffConfig::default(),
            Duration::from_secs(5),
        );
        let state = AppState::primary(log, health, replicator);
        assert_eq!(state.role, Role::Master);
        let server = HttpServer::primary(state, &[]).listen_on("127.0.0.1:0");
        let _router = server.router();
    }

    #[test]
    fn secondary_router_builds() {
        let log = Arc::new(Log::new());
        let health = Arc::new(HealthMap::new(&[]));
        let state = AppState::secondary(log, health);
        let server =
            HttpServer::secondary(state, ArtificialDelayConfig::default(), &[]).listen_on("127.0.0.1:0");
        let _router = server.router();
    }
}

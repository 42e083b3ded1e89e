mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post, put},
    Router,
};

use crate::api::API;
use crate::error::{unexpected_error, Error};
use crate::server::handlers::{comparisons, connections, distances, estimates, places, profiles};

type DynAPI = Arc<dyn API + Send + Sync>;

pub fn router<T: API + Sync + Send + 'static>(api: T) -> Router {
    let api = Arc::new(api) as DynAPI;

    Router::new()
        .route("/estimates", post(estimates::create))
        .route("/comparisons", post(comparisons::create))
        .route(
            "/comparisons/:id",
            get(comparisons::find).delete(comparisons::close),
        )
        .route("/comparisons/:id/request", put(comparisons::update))
        .route("/comparisons/:id/refresh", post(comparisons::refresh))
        .route("/distances", post(distances::create))
        .route("/places/suggestions", get(places::find_suggestions))
        .route("/places/:id", get(places::find))
        .route(
            "/users/:id/profile",
            get(profiles::find).put(profiles::update),
        )
        .route("/users/:id/connections", get(connections::find))
        .route(
            "/users/:id/connections/:provider",
            put(connections::update),
        )
        .layer(Extension(api))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) -> Result<(), Error> {
    let app = router(api);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| {
            tracing::error!(?err, "server error");
            unexpected_error()
        })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(?err, "failed to listen for shutdown signal");
        futures::future::pending::<()>().await;
    }

    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use uuid::Uuid;

    use super::*;
    use crate::auth::USER_ID_HEADER;
    use crate::db::MemoryStore;
    use crate::engine::test_engine;

    fn spawn_server() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(test_engine(Arc::new(MemoryStore::default())));

        tokio::spawn(
            axum::Server::from_tcp(listener)
                .unwrap()
                .serve(app.into_make_service()),
        );

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn estimate_quotes_every_provider() {
        let base = spawn_server();

        let body: Value = reqwest::Client::new()
            .post(format!("{}/estimates", base))
            .json(&json!({
                "pickup": "Koramangala",
                "destination": "Indiranagar",
                "category": "sedan",
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let quotes = body["quotes"].as_object().unwrap();
        assert_eq!(quotes.len(), 3);
        assert!(quotes.contains_key(body["cheapest"].as_str().unwrap()));

        let prices: Vec<u64> = quotes
            .values()
            .map(|quote| quote["price"].as_u64().unwrap())
            .collect();
        let spread = prices.iter().max().unwrap() - prices.iter().min().unwrap();
        assert_eq!(body["savings"].as_u64(), Some(spread));
    }

    #[tokio::test]
    async fn incomplete_estimate_is_null() {
        let base = spawn_server();

        let body: Value = reqwest::Client::new()
            .post(format!("{}/estimates", base))
            .json(&json!({ "pickup": "  ", "destination": "Indiranagar" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert!(body.is_null());
    }

    #[tokio::test]
    async fn unknown_comparison_is_not_found() {
        let base = spawn_server();

        let response = reqwest::get(format!("{}/comparisons/{}", base, Uuid::new_v4()))
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn profile_requires_the_owner() {
        let base = spawn_server();
        let client = reqwest::Client::new();
        let owner = Uuid::new_v4();
        let url = format!("{}/users/{}/profile", base, owner);

        let anonymous = client.get(&url).send().await.unwrap();
        assert_eq!(anonymous.status(), reqwest::StatusCode::FORBIDDEN);

        let stranger = client
            .get(&url)
            .header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .send()
            .await
            .unwrap();
        assert_eq!(stranger.status(), reqwest::StatusCode::FORBIDDEN);

        let own = client
            .get(&url)
            .header(USER_ID_HEADER, owner.to_string())
            .send()
            .await
            .unwrap();
        assert_eq!(own.status(), reqwest::StatusCode::OK);
    }

    #[tokio::test]
    async fn connect_provider() {
        let base = spawn_server();
        let owner = Uuid::new_v4();

        let body: Value = reqwest::Client::new()
            .put(format!("{}/users/{}/connections/uber", base, owner))
            .header(USER_ID_HEADER, owner.to_string())
            .json(&json!({ "connected": true }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["providers"]["uber"], json!(true));
        assert_eq!(body["providers"]["ola"], json!(false));
    }
}

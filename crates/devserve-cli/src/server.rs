//! Router wiring
//!
//! One fallback handler dispatches every request: proxy-rule match
//! forwards upstream, anything else is served from the static root.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    response::Response,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use devserve_config::ServerConfig;
use devserve_proxy::ProxyService;
use devserve_static_files::FileService;

/// Shared per-process state, built once at startup
pub struct AppContext {
    pub proxy: ProxyService,
    pub files: FileService,
}

pub fn build_router(config: &ServerConfig) -> anyhow::Result<Router> {
    let proxy = ProxyService::from_rules(&config.proxy)?;
    let files = FileService::new(config.root.clone(), config.index.clone());
    let ctx = Arc::new(AppContext { proxy, files });

    let mut router = Router::new().fallback(root_handler).with_state(ctx);

    if config.cors {
        // Allow all origins for local development
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    Ok(router.layer(TraceLayer::new_for_http()))
}

async fn root_handler(State(ctx): State<Arc<AppContext>>, req: Request) -> Response {
    let path = req.uri().path().to_owned();

    if let Some(rule_match) = ctx.proxy.resolve(&path) {
        return ctx.proxy.forward(rule_match, req).await;
    }

    devserve_static_files::serve(&ctx.files, &path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, StatusCode},
    };
    use devserve_config::{ProxyRule, RewriteStrategy};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn static_root() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<html>app</html>").unwrap();
        std::fs::write(dir.path().join("app.js"), b"console.log(1)").unwrap();
        dir
    }

    fn config_with(root: &std::path::Path, proxy: Vec<ProxyRule>) -> ServerConfig {
        ServerConfig {
            root: root.to_path_buf(),
            proxy,
            ..Default::default()
        }
    }

    fn api_rule(upstream: &str) -> ProxyRule {
        ProxyRule {
            prefix: "/api".to_string(),
            upstream: upstream.to_string(),
            change_origin: true,
            verify_tls: true,
            rewrite: RewriteStrategy::StripPrefix,
        }
    }

    async fn spawn_upstream() -> std::net::SocketAddr {
        let app = Router::new().fallback(|req: Request| async move {
            format!("upstream saw {}", req.uri().path())
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn unmatched_paths_are_served_from_the_static_root() {
        let root = static_root();
        let addr = spawn_upstream().await;
        let router = build_router(&config_with(
            root.path(),
            vec![api_rule(&format!("http://{addr}"))],
        ))
        .unwrap();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/app.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "console.log(1)");
    }

    #[tokio::test]
    async fn matched_paths_are_forwarded_with_the_prefix_stripped() {
        let root = static_root();
        let addr = spawn_upstream().await;
        let router = build_router(&config_with(
            root.path(),
            vec![api_rule(&format!("http://{addr}"))],
        ))
        .unwrap();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/users/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "upstream saw /users/1");
    }

    #[tokio::test]
    async fn dead_upstream_does_not_take_down_local_serving() {
        let root = static_root();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead = listener.local_addr().unwrap();
        drop(listener);

        let router = build_router(&config_with(
            root.path(),
            vec![api_rule(&format!("http://{dead}"))],
        ))
        .unwrap();

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        // the server keeps answering unrelated requests
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "<html>app</html>");
    }

    #[tokio::test]
    async fn cors_headers_are_present_when_enabled() {
        let root = static_root();
        let router = build_router(&config_with(root.path(), vec![])).unwrap();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/app.js")
                    .header(header::ORIGIN, "http://localho.st:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn cors_can_be_disabled() {
        let root = static_root();
        let mut config = config_with(root.path(), vec![]);
        config.cors = false;
        let router = build_router(&config).unwrap();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/app.js")
                    .header(header::ORIGIN, "http://localho.st:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn spa_navigation_falls_back_to_the_index_document() {
        let root = static_root();
        let router = build_router(&config_with(root.path(), vec![])).unwrap();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/settings/profile")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "<html>app</html>");
    }
}

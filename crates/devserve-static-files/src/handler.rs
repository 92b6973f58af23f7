//! Static file responses
//!
//! Maps file-service results onto HTTP responses

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use devserve_core::SERVER_NAME;

use crate::service::FileService;

/// Serve `request_path` from the static root
pub async fn serve(service: &FileService, request_path: &str) -> Response {
    debug!("GET {} (static)", request_path);

    match service.get_file(request_path).await {
        Ok(served) => {
            let content_type = mime_guess::from_path(&served.path)
                .first_or_octet_stream()
                .to_string();
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::SERVER, SERVER_NAME.to_string()),
                ],
                served.content,
            )
                .into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("File not found: {}", request_path);
            (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "text/plain")],
                format!("File not found: {}", request_path),
            )
                .into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            error!("Access denied: {}", request_path);
            (
                StatusCode::FORBIDDEN,
                [(header::CONTENT_TYPE, "text/plain")],
                "Access denied",
            )
                .into_response()
        }
        Err(e) => {
            error!("Error reading file {}: {}", request_path, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                format!("Error reading file: {}", e),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn fixture() -> (tempfile::TempDir, FileService) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<html>app</html>").unwrap();
        std::fs::write(dir.path().join("style.css"), b"body{}").unwrap();
        let service = FileService::new(dir.path().to_path_buf(), "index.html".to_string());
        (dir, service)
    }

    #[tokio::test]
    async fn known_extensions_get_their_content_type() {
        let (_dir, service) = fixture().await;
        let response = serve(&service, "/style.css").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/css"
        );
    }

    #[tokio::test]
    async fn missing_assets_map_to_404() {
        let (_dir, service) = fixture().await;
        let response = serve(&service, "/missing.png").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn served_responses_carry_the_server_header() {
        let (_dir, service) = fixture().await;
        let response = serve(&service, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::SERVER).unwrap(), SERVER_NAME);
    }
}

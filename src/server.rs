//! HTTP surface: the interactive page and a JSON translation API.
//!
//! | Route            | Method | Description                    |
//! |------------------|--------|--------------------------------|
//! | `/`              | GET    | Interactive page               |
//! | `/health`        | GET    | Liveness and version           |
//! | `/api/parse`     | POST   | DDL in, Go source out          |

use axum::{
    Router,
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::error::{GenError, GenResult};
use crate::options::{Options, split_prefixes};
use crate::pipeline::translate;

/// Default listen address of `--serve`.
pub const DEFAULT_ADDRESS: &str = "0.0.0.0:18080";

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Body of `POST /api/parse`. Flags accept JSON booleans or the strings
/// `"true"` / `"false"`, which is what HTML form values look like.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ParseRequest {
    pub sql: String,
    pub package: String,
    pub table_prefix: String,
    pub col_prefix: String,
    #[serde(deserialize_with = "flexible_bool")]
    pub json: bool,
    pub json_style: String,
    #[serde(deserialize_with = "flexible_bool")]
    pub no_null: bool,
    pub null_style: String,
    #[serde(deserialize_with = "flexible_bool")]
    pub gorm_type: bool,
    #[serde(deserialize_with = "flexible_bool")]
    pub force_tablename: bool,
    pub charset: String,
    pub collation: String,
}

impl ParseRequest {
    /// Convert the request fields to generation options.
    pub fn to_options(&self) -> GenResult<Options> {
        let non_empty = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        Ok(Options {
            charset: non_empty(&self.charset),
            collation: non_empty(&self.collation),
            json_tag: self.json,
            json_style: self.json_style.parse()?,
            table_prefix: split_prefixes(&self.table_prefix),
            column_prefix: split_prefixes(&self.col_prefix),
            no_null_type: self.no_null,
            null_style: self.null_style.parse()?,
            package: non_empty(&self.package),
            gorm_type: self.gorm_type,
            force_table_name: self.force_tablename,
        })
    }
}

fn flexible_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "on" => Ok(true),
            "false" | "0" | "off" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "invalid boolean '{}'",
                other
            ))),
        },
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParseResponse {
    pub code: String,
}

/// Error body; `kind` is a [`GenError::kind`] code.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: impl Into<String>, kind: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.into(),
            kind: kind.to_string(),
        }),
    )
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn parse_sql(Json(req): Json<ParseRequest>) -> Result<Json<ParseResponse>, ApiError> {
    if req.sql.trim().is_empty() {
        return Err(bad_request("Empty SQL", "EMPTY_SQL"));
    }

    let result = req.to_options().and_then(|opts| translate(&req.sql, &opts));
    match result {
        Ok(code) => {
            tracing::info!(bytes = code.len(), "translated DDL");
            Ok(Json(ParseResponse { code }))
        }
        Err(e) => {
            tracing::warn!("Translate error: {}", e);
            Err(bad_request(e.to_string(), e.kind()))
        }
    }
}

/// Create the router.
pub fn create_router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/parse", post(parse_sql))
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str) -> GenResult<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| GenError::Config(format!("Failed to bind to {}: {}", addr, e)))?;
    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, create_router()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn post_json(body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = create_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/parse")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_parse_ok() {
        let (status, body) = post_json(serde_json::json!({
            "sql": "CREATE TABLE t_user (id INT NOT NULL, PRIMARY KEY (id))",
            "table_prefix": "t_",
            "json": "true",
            "package": "entity",
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        let code = body["code"].as_str().unwrap();
        assert!(code.starts_with("package entity\n"));
        assert!(code.contains("type User struct"));
        assert!(code.contains("json:\"id\""));
        assert!(code.contains("return \"t_user\""));
    }

    #[tokio::test]
    async fn test_parse_error_kind() {
        let (status, body) = post_json(serde_json::json!({
            "sql": "CREATE TABLE t (id INT",
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "SYNTAX_ERROR");
        assert!(body.get("code").is_none());
        assert!(body["error"].as_str().unwrap().contains("line 1"));
    }

    #[tokio::test]
    async fn test_bad_null_style() {
        let (status, body) = post_json(serde_json::json!({
            "sql": "CREATE TABLE t (id INT)",
            "null_style": "maybe",
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "CONFIG_ERROR");
    }

    #[tokio::test]
    async fn test_empty_sql() {
        let (status, body) = post_json(serde_json::json!({ "sql": "  " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "EMPTY_SQL");
    }

    #[tokio::test]
    async fn test_health_and_index() {
        let response = create_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = create_router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("/api/parse"));
    }

    #[test]
    fn test_flexible_bool() {
        let req: ParseRequest =
            serde_json::from_str(r#"{"json": true, "no_null": "false", "gorm_type": "1"}"#).unwrap();
        assert!(req.json);
        assert!(!req.no_null);
        assert!(req.gorm_type);
        assert!(serde_json::from_str::<ParseRequest>(r#"{"json": "yes please"}"#).is_err());
    }
}

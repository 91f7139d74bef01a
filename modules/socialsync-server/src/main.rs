use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::info;
use tracing_subscriber::EnvFilter;

use socialsync_common::Config;
use socialsync_server::SyncContext;

struct AppState {
    ctx: SyncContext,
}

const INDEX_PAGE: &str = r#"<!doctype html>
<html>
<head><title>Social Sync</title></head>
<body>
  <h1>Social Sync</h1>
  <p>Fetch Threads + Telegram posts and save them to the database.</p>
  <button onclick="runSync()">Sync now</button>
  <pre id="status"></pre>
  <script>
    async function runSync() {
      document.getElementById('status').textContent = 'Running...';
      const resp = await fetch('/sync', { method: 'POST' });
      document.getElementById('status').textContent = await resp.text();
    }
  </script>
</body>
</html>"#;

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

/// The trigger boundary never raises: every failure is rendered as a
/// one-line "Error: ..." status for the operator.
async fn sync_handler(State(state): State<Arc<AppState>>) -> String {
    match state.ctx.run_sync().await {
        Ok(status) => status,
        Err(e) => format!("Error: {e:#}"),
    }
}

/// Optional HTTP Basic auth gate, active only when both credentials are
/// configured.
async fn basic_auth(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let Some((ref user, ref pass)) = state.ctx.config.basic_auth else {
        return next.run(req).await;
    };

    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .and_then(|b64| BASE64.decode(b64).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .map(|cred| cred == format!("{user}:{pass}"))
        .unwrap_or(false);

    if authorized {
        next.run(req).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"socialsync\"")],
            "unauthorized",
        )
            .into_response()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("socialsync=info".parse()?))
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env();
    config.log_redacted();

    let host = config.web_host.clone();
    let port = config.web_port;

    let state = Arc::new(AppState {
        ctx: SyncContext::init(config).await?,
    });

    let app = Router::new()
        .route("/", get(index))
        .route("/sync", post(sync_handler))
        .layer(middleware::from_fn_with_state(state.clone(), basic_auth))
        .with_state(state)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{host}:{port}");
    info!("Social Sync trigger UI starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

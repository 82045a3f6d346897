use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde_json::json;

/// Root handler: a small HTML landing page listing the API surface
pub async fn root_handler() -> impl IntoResponse {
    Html(r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
  <title>Finance Tracker API</title>
  <style>
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body { font-family: 'Segoe UI', system-ui, sans-serif; background: #0f172a; color: #e2e8f0; min-height: 100vh; padding: 40px 20px; }
    .container { max-width: 860px; margin: 0 auto; }
    header { text-align: center; margin-bottom: 40px; }
    header h1 { font-size: 2.6rem; font-weight: 800; color: #34d399; margin-bottom: 8px; }
    header p { color: #94a3b8; }
    .routes { background: #1e293b; border: 1px solid #334155; border-radius: 12px; padding: 24px; }
    .route-group { margin-bottom: 18px; }
    .route-group h4 { font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.1em; color: #64748b; margin-bottom: 6px; }
    .route-item { font-family: monospace; font-size: 0.9rem; padding: 3px 0; }
    .method { display: inline-block; width: 64px; color: #38bdf8; font-weight: 700; }
    a { color: #38bdf8; }
  </style>
</head>
<body>
<div class="container">
  <header>
    <h1>Finance Tracker API</h1>
    <p>Monthly budgets, loans and EMIs rolled up into one live summary.</p>
    <p><a href="/docs">Swagger UI</a> · <a href="/health">Health</a></p>
  </header>
  <div class="routes">
    <div class="route-group">
      <h4>Accounts</h4>
      <div class="route-item"><span class="method">POST</span>/api/v1/auth/signup</div>
      <div class="route-item"><span class="method">POST</span>/api/v1/auth/login</div>
      <div class="route-item"><span class="method">GET</span>/api/v1/users/me</div>
      <div class="route-item"><span class="method">PUT</span>/api/v1/users/me</div>
    </div>
    <div class="route-group">
      <h4>Budget, loans, EMIs</h4>
      <div class="route-item"><span class="method">GET</span>/api/v1/budget · /loans · /emis</div>
      <div class="route-item"><span class="method">POST</span>/api/v1/budget · /loans · /emis</div>
      <div class="route-item"><span class="method">PUT</span>/api/v1/budget/{id} · /loans/{id} · /emis/{id}</div>
      <div class="route-item"><span class="method">DELETE</span>/api/v1/budget/{id} · /loans/{id} · /emis/{id}</div>
    </div>
    <div class="route-group">
      <h4>Salary and summary</h4>
      <div class="route-item"><span class="method">GET</span>/api/v1/salary</div>
      <div class="route-item"><span class="method">PUT</span>/api/v1/salary</div>
      <div class="route-item"><span class="method">GET</span>/api/v1/summary</div>
      <div class="route-item"><span class="method">GET</span>/api/v1/summary/live</div>
      <div class="route-item"><span class="method">DELETE</span>/api/v1/summary/live</div>
    </div>
  </div>
</div>
</body>
</html>"#)
}

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let backend = state.stores.health.backend_name();
    match state.stores.health.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "storage": backend,
                "service": "finance-tracker",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "storage": backend,
                "error": e.to_string()
            })),
        ),
    }
}

// src/middleware/subscription.rs

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState, models::auth::CurrentUser};

/// Gate de assinatura: bloqueia métodos mutantes quando a assinatura do
/// tenant não está ativa (nem em trial válido). Leituras continuam
/// passando: o operador ainda enxerga seus dados com a conta suspensa.
///
/// Precisa rodar DEPOIS do auth_guard (depende do CurrentUser nas
/// extensions).
pub async fn subscription_guard(
    State(app_state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let is_read = matches!(*request.method(), Method::GET | Method::HEAD);

    if !is_read {
        let user = request
            .extensions()
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)?;

        app_state
            .subscription_service
            .ensure_writable(user.tenant_id)
            .await?;
    }

    Ok(next.run(request).await)
}

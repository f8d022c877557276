// src/middleware/auth.rs

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{common::error::AppError, config::AppState, models::auth::CurrentUser};

/// Middleware de autenticação: resolve o bearer token para a identidade
/// {usuário, tenant, esquema, papel} e a insere nas extensions. Toda rota
/// de tenant depende dele: é aqui que nasce a decisão "qual esquema
/// consultar".
pub async fn auth_guard(
    State(app_state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = app_state.auth_service.validate_token(bearer.token()).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Extrator para obter a identidade autenticada diretamente nos handlers.
pub struct Authenticated(pub CurrentUser);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(Authenticated)
            .ok_or(AppError::InvalidToken)
    }
}

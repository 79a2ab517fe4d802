// src/middleware/empresa.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, models::auth::User};

// O nome do nosso cabeçalho HTTP customizado
const EMPRESA_ID_HEADER: &str = "x-empresa-id";

// O extrator do tenant: guarda o UUID da empresa que o usuário quer acessar.
#[derive(Debug, Clone)]
pub struct EmpresaContext(pub Uuid);

impl<S> FromRequestParts<S> for EmpresaContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<EmpresaContext>()
            .cloned()
            .ok_or(AppError::EmpresaNotFound)
    }
}

/// Guarda de tenant: exige usuário autenticado (via auth_guard, acima na
/// pilha), lê o X-Empresa-ID e confirma que a empresa pertence ao usuário
/// antes de injetar o contexto.
pub async fn empresa_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or(AppError::InvalidToken)?;

    let empresa_id = request
        .headers()
        .get(EMPRESA_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .ok_or(AppError::EmpresaNotFound)?;

    app_state
        .empresa_repo
        .find_for_user(empresa_id, user.id)
        .await?
        .ok_or(AppError::EmpresaNotFound)?;

    request.extensions_mut().insert(EmpresaContext(empresa_id));
    Ok(next.run(request).await)
}

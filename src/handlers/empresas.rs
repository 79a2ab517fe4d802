// src/handlers/empresas.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::empresa::{CriarEmpresaPayload, Empresa},
};

#[utoipa::path(
    post,
    path = "/api/empresas",
    request_body = CriarEmpresaPayload,
    responses((status = 201, description = "Empresa criada", body = Empresa)),
    security(("bearer_auth" = [])),
    tag = "empresas"
)]
pub async fn criar_empresa(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CriarEmpresaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let empresa = app_state
        .empresa_repo
        .create(&app_state.db_pool, &payload.nome, user.0.id)
        .await?;

    Ok((StatusCode::CREATED, Json(empresa)))
}

#[utoipa::path(
    get,
    path = "/api/empresas",
    responses((status = 200, description = "Empresas do usuário", body = [Empresa])),
    security(("bearer_auth" = [])),
    tag = "empresas"
)]
pub async fn listar_empresas(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let empresas = app_state.empresa_repo.list_for_user(user.0.id).await?;

    Ok((StatusCode::OK, Json(empresas)))
}

// src/handlers/parcelamentos.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, empresa::EmpresaContext},
    models::conta::{EdicaoParcelamento, ResultadoEdicao},
    models::historico::HistoricoParcelamento,
};

#[utoipa::path(
    put,
    path = "/api/parcelamentos/{id}",
    params(("id" = String, Path, description = "Id do grupo (uuid) ou id numérico da conta macro")),
    request_body = EdicaoParcelamento,
    responses(
        (status = 200, description = "Edição aplicada", body = ResultadoEdicao),
        (status = 400, description = "Redução bloqueada por parcelas pagas"),
        (status = 404, description = "Parcelamento não encontrado"),
    ),
    security(("bearer_auth" = [])),
    tag = "parcelamentos"
)]
pub async fn editar_parcelamento(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    empresa: EmpresaContext,
    Path(id): Path<String>,
    Json(payload): Json<EdicaoParcelamento>,
) -> Result<impl IntoResponse, AppError> {
    let resultado = app_state
        .parcelamento_service
        .editar_parcelamento(empresa.0, user.0.id, &id, &payload)
        .await?;

    Ok((StatusCode::OK, Json(resultado)))
}

#[utoipa::path(
    delete,
    path = "/api/parcelamentos/{id}",
    params(("id" = String, Path, description = "Id do grupo (uuid) ou id numérico da conta macro")),
    responses(
        (status = 204, description = "Parcelamento excluído"),
        (status = 404, description = "Parcelamento não encontrado"),
    ),
    security(("bearer_auth" = [])),
    tag = "parcelamentos"
)]
pub async fn excluir_parcelamento(
    State(app_state): State<AppState>,
    empresa: EmpresaContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .parcelamento_service
        .excluir_parcelamento(empresa.0, &id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/parcelamentos/{id}/historico",
    params(("id" = String, Path, description = "Id do grupo (uuid)")),
    responses((status = 200, description = "Trilha de auditoria do grupo", body = [HistoricoParcelamento])),
    security(("bearer_auth" = [])),
    tag = "parcelamentos"
)]
pub async fn historico_parcelamento(
    State(app_state): State<AppState>,
    empresa: EmpresaContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let grupo = id
        .parse::<uuid::Uuid>()
        .map_err(|_| AppError::ParcelamentoNaoEncontrado)?;

    let historicos = app_state
        .historico_repo
        .list_by_grupo(&app_state.db_pool, empresa.0, grupo)
        .await?;

    Ok((StatusCode::OK, Json(historicos)))
}

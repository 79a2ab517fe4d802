// src/handlers/centros_custo.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::empresa::EmpresaContext,
    models::centro_custo::{CentroCusto, CriarCentroCustoPayload},
};

#[utoipa::path(
    post,
    path = "/api/centros-custo",
    request_body = CriarCentroCustoPayload,
    responses((status = 201, description = "Centro de custo criado", body = CentroCusto)),
    security(("bearer_auth" = [])),
    tag = "centros-custo"
)]
pub async fn criar_centro_custo(
    State(app_state): State<AppState>,
    empresa: EmpresaContext,
    Json(payload): Json<CriarCentroCustoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let centro = app_state
        .centro_custo_repo
        .create(
            &app_state.db_pool,
            empresa.0,
            &payload.sigla,
            &payload.nome,
            payload.parent_id,
            payload.is_socio,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(centro)))
}

#[utoipa::path(
    get,
    path = "/api/centros-custo",
    responses((status = 200, description = "Centros de custo da empresa", body = [CentroCusto])),
    security(("bearer_auth" = [])),
    tag = "centros-custo"
)]
pub async fn listar_centros_custo(
    State(app_state): State<AppState>,
    empresa: EmpresaContext,
) -> Result<impl IntoResponse, AppError> {
    let centros = app_state
        .centro_custo_repo
        .list(&app_state.db_pool, empresa.0)
        .await?;

    Ok((StatusCode::OK, Json(centros)))
}

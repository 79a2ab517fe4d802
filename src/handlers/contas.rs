// src/handlers/contas.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::empresa::EmpresaContext,
    models::conta::{Conta, NovaContaAvulsa, NovoParcelamento, TipoParcelamento},
};

// ---
// Payload: CriarConta — conta avulsa ou, com totalParcelas >= 2, um plano
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriarContaPayload {
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub descricao: String,

    /// Valor da conta; em um parcelamento, o valor de cada parcela.
    pub valor: Decimal,

    #[schema(value_type = String, format = Date)]
    pub data_vencimento: NaiveDate,

    #[serde(default = "uma_parcela")]
    pub total_parcelas: i32,

    #[serde(default = "primeira_parcela")]
    pub parcela_inicial: i32,

    pub tipo_parcelamento: Option<TipoParcelamento>,
    pub codigo_tipo: Option<String>,
    pub beneficiario: Option<String>,
    pub categoria: Option<String>,
    pub subcategoria: Option<String>,
    pub cartao_id: Option<Uuid>,
    pub conta_bancaria: Option<String>,

    /// Conta avulsa já paga, ou primeira parcela paga no ato do plano.
    #[serde(default)]
    pub pago: bool,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_pagamento: Option<NaiveDate>,
}

fn uma_parcela() -> i32 {
    1
}

fn primeira_parcela() -> i32 {
    1
}

impl CriarContaPayload {
    fn validate_consistency(&self) -> Result<(), ValidationError> {
        if self.valor <= Decimal::ZERO {
            return Err(ValidationError::new("ValorNaoPositivo"));
        }
        if self.total_parcelas < 1 {
            return Err(ValidationError::new("TotalParcelasInvalido"));
        }
        if self.parcela_inicial < 1 || self.parcela_inicial > self.total_parcelas {
            return Err(ValidationError::new("ParcelaInicialForaDoPlano"));
        }
        Ok(())
    }
}

#[utoipa::path(
    post,
    path = "/api/contas",
    request_body = CriarContaPayload,
    responses(
        (status = 201, description = "Conta (ou plano de parcelamento) criada"),
        (status = 400, description = "Payload inválido"),
    ),
    security(("bearer_auth" = [])),
    tag = "contas"
)]
pub async fn criar_conta(
    State(app_state): State<AppState>,
    empresa: EmpresaContext,
    Json(payload): Json<CriarContaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    payload.validate_consistency().map_err(|e| {
        let mut errors = validator::ValidationErrors::new();
        errors.add("valor", e);
        AppError::ValidationError(errors)
    })?;

    // Duas ou mais parcelas: modo plano, com macro + filhas.
    if payload.total_parcelas >= 2 {
        let plano = NovoParcelamento {
            descricao: payload.descricao,
            valor_parcela: payload.valor,
            data_primeira_parcela: payload.data_vencimento,
            quantidade: payload.total_parcelas,
            parcela_inicial: payload.parcela_inicial,
            tipo_parcelamento: payload.tipo_parcelamento,
            codigo_tipo: payload.codigo_tipo,
            beneficiario: payload.beneficiario,
            categoria: payload.categoria,
            subcategoria: payload.subcategoria,
            cartao_id: payload.cartao_id,
            conta_bancaria: payload.conta_bancaria,
            primeira_paga: payload.pago,
            data_pagamento_primeira: payload.data_pagamento,
        };

        let criado = app_state
            .parcelamento_service
            .criar_parcelamento(empresa.0, &plano)
            .await?;

        return Ok((StatusCode::CREATED, Json(serde_json::json!(criado))));
    }

    let avulsa = NovaContaAvulsa {
        descricao: payload.descricao,
        valor: payload.valor,
        data_vencimento: payload.data_vencimento,
        codigo_tipo: payload.codigo_tipo,
        beneficiario: payload.beneficiario,
        categoria: payload.categoria,
        subcategoria: payload.subcategoria,
        cartao_id: payload.cartao_id,
        conta_bancaria: payload.conta_bancaria,
        pago: payload.pago,
        data_pagamento: payload.data_pagamento,
    };

    let conta = app_state
        .parcelamento_service
        .criar_conta_avulsa(empresa.0, &avulsa)
        .await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!(conta))))
}

#[utoipa::path(
    get,
    path = "/api/contas",
    responses((status = 200, description = "Contas da empresa", body = [Conta])),
    security(("bearer_auth" = [])),
    tag = "contas"
)]
pub async fn listar_contas(
    State(app_state): State<AppState>,
    empresa: EmpresaContext,
) -> Result<impl IntoResponse, AppError> {
    let contas = app_state
        .conta_repo
        .list_by_empresa(&app_state.db_pool, empresa.0)
        .await?;

    Ok((StatusCode::OK, Json(contas)))
}

// src/models/cartao.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Cartão de crédito da empresa. O dia de fechamento decide em qual fatura
/// mensal cada compra cai.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartaoCredito {
    pub id: Uuid,

    #[schema(ignore)]
    pub empresa_id: Uuid,

    #[schema(example = "Cartão corporativo")]
    pub nome: String,

    #[schema(example = 25)]
    pub dia_fechamento: i32,

    #[schema(example = 5)]
    pub dia_vencimento: i32,
}

/// Fatura mensal de um cartão. Sempre recalculada por inteiro a partir das
/// contas do período, nunca incrementada.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaturaCartao {
    pub id: i64,

    #[schema(ignore)]
    pub empresa_id: Uuid,

    pub cartao_id: Uuid,
    pub ano: i32,
    pub mes: i32,
    pub valor_total: Decimal,
}

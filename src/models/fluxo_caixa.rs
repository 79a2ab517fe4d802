// src/models/fluxo_caixa.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_lancamento", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TipoLancamento {
    Entrada,
    Saida,
}

impl TipoLancamento {
    /// Sinal do lançamento na soma corrente do saldo.
    pub fn sinal(self) -> Decimal {
        match self {
            TipoLancamento::Entrada => Decimal::ONE,
            TipoLancamento::Saida => -Decimal::ONE,
        }
    }
}

/// Um lançamento do fluxo de caixa. `saldo_acumulado` é a soma corrente em
/// ordem cronológica; após remoções no meio da sequência ele é recalculado
/// por inteiro, nunca apenas decrementado.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LancamentoFluxoCaixa {
    pub id: i64,

    #[schema(ignore)]
    pub empresa_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-01-15")]
    pub data: NaiveDate,

    /// Sigla do centro de custo vinculado, quando houver.
    pub codigo: Option<String>,

    pub contraparte: Option<String>,

    #[schema(example = "100.00")]
    pub valor: Decimal,

    pub tipo: TipoLancamento,

    pub saldo_acumulado: Decimal,

    /// Conta que originou o lançamento (parcela paga).
    pub conta_id: Option<i64>,

    pub created_at: Option<DateTime<Utc>>,
}

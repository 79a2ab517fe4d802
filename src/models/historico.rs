// src/models/historico.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Classificação de uma edição de parcelamento. Uma edição recebe exatamente
/// uma classificação: a primeira que casar na ordem quantidade > valor total >
/// edições individuais (ver services::snapshot::detectar_tipo_alteracao).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_alteracao_parcelamento", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoAlteracao {
    Quantidade,
    ValorTotal,
    EdicaoIndividual,
}

/// Resultado do detector de alterações.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlteracaoDetectada {
    pub tipo: TipoAlteracao,
    pub descricao: String,
}

/// Retrato de uma parcela no momento anterior à edição. Datas normalizadas
/// para string ISO-8601.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotParcela {
    pub id: i64,
    pub numero_parcela: Option<String>,
    pub valor: Decimal,
    pub data_vencimento: String,
    pub pago: bool,
    pub data_pagamento: Option<String>,
    pub status: super::conta::StatusConta,
}

/// Retrato de um grupo de parcelamento em um instante, serializado dentro do
/// registro de histórico.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotParcelamento {
    pub valor_total: Decimal,
    pub total_parcelas: usize,
    pub descricao: String,
    pub beneficiario: Option<String>,
    pub codigo_tipo: Option<String>,
    pub parcelas: Vec<SnapshotParcela>,
}

/// Registro de auditoria de um parcelamento: um por edição com alteração
/// detectada. A gravação é de melhor esforço e nunca aborta a edição.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricoParcelamento {
    pub id: i64,

    #[schema(ignore)]
    pub empresa_id: Uuid,

    pub grupo_parcelamento_id: Uuid,
    pub conta_macro_id: Option<i64>,
    pub tipo_alteracao: TipoAlteracao,
    pub descricao: String,

    #[schema(value_type = Object)]
    pub snapshot_anterior: serde_json::Value,

    pub valor_total_anterior: Decimal,
    pub valor_total_novo: Decimal,
    pub quantidade_anterior: i32,
    pub quantidade_nova: i32,

    pub usuario_id: Uuid,
    pub created_at: Option<DateTime<Utc>>,
}

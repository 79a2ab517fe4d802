// src/models/centro_custo.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Centro de custo com totais acumulados. Todo incremento feito em uma folha
/// é espelhado em toda a cadeia de ancestrais (ver CentroCustoRepository).
/// Centros com `is_socio` representam um sócio e acumulam também os descontos
/// que alimentam o recálculo de pró-labore.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CentroCusto {
    pub id: Uuid,

    #[schema(ignore)]
    pub empresa_id: Uuid,

    #[schema(example = "ADM")]
    pub sigla: String,

    #[schema(example = "Administrativo")]
    pub nome: String,

    #[schema(example = "1500.00")]
    pub previsto: Decimal,
    #[schema(example = "900.00")]
    pub realizado: Decimal,

    pub desconto_previsto: Decimal,
    pub desconto_real: Decimal,

    pub parent_id: Option<Uuid>,
    pub is_socio: bool,
}

/// Campos numéricos incrementáveis de um centro de custo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampoCentroCusto {
    Previsto,
    Realizado,
    DescontoPrevisto,
    DescontoReal,
}

impl CampoCentroCusto {
    pub fn coluna(self) -> &'static str {
        match self {
            CampoCentroCusto::Previsto => "previsto",
            CampoCentroCusto::Realizado => "realizado",
            CampoCentroCusto::DescontoPrevisto => "desconto_previsto",
            CampoCentroCusto::DescontoReal => "desconto_real",
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriarCentroCustoPayload {
    #[validate(length(min = 1, message = "A sigla é obrigatória."))]
    pub sigla: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub nome: String,

    pub parent_id: Option<Uuid>,

    #[serde(default)]
    pub is_socio: bool,
}

// src/models/conta.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_conta", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StatusConta {
    Pendente,
    Pago,
    Cancelado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_parcelamento", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TipoParcelamento {
    Avista,
    ValorTotal,
    ValorParcela,
}

// --- Structs ---

/// Uma conta a pagar. Quando `is_conta_macro` é verdadeiro, o registro
/// representa o plano de parcelamento inteiro: nunca é pago diretamente e
/// nunca entra no fluxo de caixa; apenas as parcelas filhas entram.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Conta {
    pub id: i64,

    #[schema(ignore)]
    pub empresa_id: Uuid,

    #[schema(example = "Aluguel do escritório")]
    pub descricao: String,

    #[schema(example = "100.00")]
    pub valor: Decimal,

    #[schema(value_type = String, format = Date, example = "2026-01-15")]
    pub data_vencimento: NaiveDate,

    pub pago: bool,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_pagamento: Option<NaiveDate>,
    pub valor_pago: Option<Decimal>,
    pub status: StatusConta,

    // Campos de parcelamento
    #[schema(example = "1/3")]
    pub numero_parcela: Option<String>,
    pub total_parcelas: Option<i32>,
    pub grupo_parcelamento_id: Option<Uuid>,
    pub valor_total: Option<Decimal>,
    pub tipo_parcelamento: Option<TipoParcelamento>,

    // Hierarquia macro/filha
    pub is_conta_macro: bool,
    pub parent_id: Option<i64>,

    // Classificação
    pub codigo_tipo: Option<String>,
    pub beneficiario: Option<String>,
    pub categoria: Option<String>,
    pub subcategoria: Option<String>,
    pub cartao_id: Option<Uuid>,
    pub conta_bancaria: Option<String>,
    pub socio_responsavel_id: Option<Uuid>,
    pub prolabore_processado: bool,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Conta {
    /// Numerador do `numero_parcela` ("3/12" -> 3), quando presente e válido.
    pub fn numero_inicial(&self) -> Option<i32> {
        let (inicio, _) = self.numero_parcela.as_deref()?.split_once('/')?;
        inicio.parse().ok()
    }
}

// --- DTOs de entrada do motor de parcelamento ---

/// Dados para criação de um plano de parcelamento (quantidade >= 2).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NovoParcelamento {
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub descricao: String,

    /// Valor de cada parcela.
    pub valor_parcela: Decimal,

    #[schema(value_type = String, format = Date)]
    pub data_primeira_parcela: NaiveDate,

    #[validate(range(min = 2, message = "Um parcelamento precisa de pelo menos 2 parcelas."))]
    pub quantidade: i32,

    /// Número da primeira parcela (normalmente 1; planos importados podem
    /// começar adiante).
    #[serde(default = "padrao_parcela_inicial")]
    pub parcela_inicial: i32,

    pub tipo_parcelamento: Option<TipoParcelamento>,
    pub codigo_tipo: Option<String>,
    pub beneficiario: Option<String>,
    pub categoria: Option<String>,
    pub subcategoria: Option<String>,
    pub cartao_id: Option<Uuid>,
    pub conta_bancaria: Option<String>,

    /// A primeira parcela já foi paga no ato.
    #[serde(default)]
    pub primeira_paga: bool,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_pagamento_primeira: Option<NaiveDate>,
}

fn padrao_parcela_inicial() -> i32 {
    1
}

/// Dados para criação de uma conta avulsa (sem parcelamento).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NovaContaAvulsa {
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub descricao: String,

    pub valor: Decimal,

    #[schema(value_type = String, format = Date)]
    pub data_vencimento: NaiveDate,

    pub codigo_tipo: Option<String>,
    pub beneficiario: Option<String>,
    pub categoria: Option<String>,
    pub subcategoria: Option<String>,
    pub cartao_id: Option<Uuid>,
    pub conta_bancaria: Option<String>,

    #[serde(default)]
    pub pago: bool,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_pagamento: Option<NaiveDate>,
}

/// Instrução de edição de uma parcela individual dentro de
/// `parcelasAtualizadas`. Sem `id` (ou com id <= 0) a parcela é criada.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParcelaAtualizada {
    pub id: Option<i64>,
    pub valor: Decimal,
    #[schema(value_type = String, format = Date)]
    pub data_vencimento: NaiveDate,
    #[serde(default)]
    pub pago: bool,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_pagamento: Option<NaiveDate>,
    pub status: Option<StatusConta>,
}

/// Corpo do PUT de um grupo de parcelamento. Todos os gatilhos são opcionais;
/// a ordem de aplicação é fixa no motor.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EdicaoParcelamento {
    pub valor_total: Option<Decimal>,
    pub nova_quantidade: Option<i32>,
    /// Sinônimo aceito de `novaQuantidade`.
    pub total_parcelas: Option<i32>,
    pub parcelas_atualizadas: Option<Vec<ParcelaAtualizada>>,
    pub tipo_parcelamento: Option<TipoParcelamento>,

    // Campos compartilhados: propagados para todas as parcelas e para a macro.
    pub descricao: Option<String>,
    pub beneficiario: Option<String>,
    pub codigo_tipo: Option<String>,
    pub socio_responsavel_id: Option<Uuid>,
}

impl EdicaoParcelamento {
    pub fn quantidade_solicitada(&self) -> Option<i32> {
        self.nova_quantidade.or(self.total_parcelas)
    }
}

/// Resultado de uma edição bem-sucedida: contagens + resumo final do grupo.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultadoEdicao {
    pub grupo_parcelamento_id: Uuid,
    pub conta_macro_id: Option<i64>,
    pub parcelas_modificadas: usize,
    pub parcelas_criadas: usize,
    pub parcelas_removidas: usize,
    pub valor_total: Decimal,
    pub total_parcelas: i32,
}

/// Resultado da criação de um plano.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParcelamentoCriado {
    pub conta_macro: Conta,
    pub parcelas: Vec<Conta>,
}

// src/db/historico_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::historico::{HistoricoParcelamento, TipoAlteracao},
};

#[derive(Clone)]
pub struct HistoricoRepository {
    pool: PgPool,
}

impl HistoricoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        grupo_id: Uuid,
        conta_macro_id: Option<i64>,
        tipo: TipoAlteracao,
        descricao: &str,
        snapshot_anterior: serde_json::Value,
        valor_total_anterior: Decimal,
        valor_total_novo: Decimal,
        quantidade_anterior: i32,
        quantidade_nova: i32,
        usuario_id: Uuid,
    ) -> Result<HistoricoParcelamento, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let historico = sqlx::query_as::<_, HistoricoParcelamento>(
            r#"
            INSERT INTO historico_parcelamentos (
                empresa_id, grupo_parcelamento_id, conta_macro_id,
                tipo_alteracao, descricao, snapshot_anterior,
                valor_total_anterior, valor_total_novo,
                quantidade_anterior, quantidade_nova, usuario_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(empresa_id)
        .bind(grupo_id)
        .bind(conta_macro_id)
        .bind(tipo)
        .bind(descricao)
        .bind(snapshot_anterior)
        .bind(valor_total_anterior)
        .bind(valor_total_novo)
        .bind(quantidade_anterior)
        .bind(quantidade_nova)
        .bind(usuario_id)
        .fetch_one(executor)
        .await?;

        Ok(historico)
    }

    pub async fn list_by_grupo<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        grupo_id: Uuid,
    ) -> Result<Vec<HistoricoParcelamento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let historicos = sqlx::query_as::<_, HistoricoParcelamento>(
            r#"
            SELECT * FROM historico_parcelamentos
            WHERE empresa_id = $1 AND grupo_parcelamento_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(empresa_id)
        .bind(grupo_id)
        .fetch_all(executor)
        .await?;

        Ok(historicos)
    }
}

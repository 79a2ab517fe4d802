// src/db/cartao_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::cartao::{CartaoCredito, FaturaCartao},
};

#[derive(Clone)]
pub struct CartaoRepository {
    pool: PgPool,
}

impl CartaoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        id: Uuid,
    ) -> Result<Option<CartaoCredito>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let cartao = sqlx::query_as::<_, CartaoCredito>(
            "SELECT * FROM cartoes_credito WHERE empresa_id = $1 AND id = $2",
        )
        .bind(empresa_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(cartao)
    }

    /// Grava o total recalculado da fatura do mês (insere ou substitui — o
    /// valor nunca é incrementado).
    pub async fn upsert_fatura<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        cartao_id: Uuid,
        ano: i32,
        mes: i32,
        valor_total: Decimal,
    ) -> Result<FaturaCartao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let fatura = sqlx::query_as::<_, FaturaCartao>(
            r#"
            INSERT INTO faturas_cartao (empresa_id, cartao_id, ano, mes, valor_total)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (cartao_id, ano, mes)
            DO UPDATE SET valor_total = EXCLUDED.valor_total
            RETURNING *
            "#,
        )
        .bind(empresa_id)
        .bind(cartao_id)
        .bind(ano)
        .bind(mes)
        .bind(valor_total)
        .fetch_one(executor)
        .await?;

        Ok(fatura)
    }
}

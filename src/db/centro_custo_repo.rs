// src/db/centro_custo_repo.rs

use std::collections::HashSet;

use rust_decimal::Decimal;
use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::centro_custo::{CampoCentroCusto, CentroCusto},
};

#[derive(Clone)]
pub struct CentroCustoRepository {
    pool: PgPool,
}

impl CentroCustoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        id: Uuid,
    ) -> Result<Option<CentroCusto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let centro = sqlx::query_as::<_, CentroCusto>(
            "SELECT * FROM centros_custo WHERE empresa_id = $1 AND id = $2",
        )
        .bind(empresa_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(centro)
    }

    pub async fn find_by_sigla<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        sigla: &str,
    ) -> Result<Option<CentroCusto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let centro = sqlx::query_as::<_, CentroCusto>(
            "SELECT * FROM centros_custo WHERE empresa_id = $1 AND sigla = $2",
        )
        .bind(empresa_id)
        .bind(sigla)
        .fetch_optional(executor)
        .await?;

        Ok(centro)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
    ) -> Result<Vec<CentroCusto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let centros = sqlx::query_as::<_, CentroCusto>(
            "SELECT * FROM centros_custo WHERE empresa_id = $1 ORDER BY sigla ASC",
        )
        .bind(empresa_id)
        .fetch_all(executor)
        .await?;

        Ok(centros)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        sigla: &str,
        nome: &str,
        parent_id: Option<Uuid>,
        is_socio: bool,
    ) -> Result<CentroCusto, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let centro = sqlx::query_as::<_, CentroCusto>(
            r#"
            INSERT INTO centros_custo (empresa_id, sigla, nome, parent_id, is_socio)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(empresa_id)
        .bind(sigla)
        .bind(nome)
        .bind(parent_id)
        .bind(is_socio)
        .fetch_one(executor)
        .await?;

        Ok(centro)
    }

    /// Incremento atômico no próprio banco (`campo = campo + delta`): nunca
    /// read-modify-write no código da aplicação.
    pub async fn incrementar<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        campo: CampoCentroCusto,
        delta: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let coluna = campo.coluna();
        let sql = format!("UPDATE centros_custo SET {coluna} = {coluna} + $2 WHERE id = $1");
        sqlx::query(&sql).bind(id).bind(delta).execute(executor).await?;

        Ok(())
    }

    /// Incrementa a folha e espelha o mesmo delta por toda a cadeia de
    /// ancestrais. Caminhada iterativa com conjunto de visitados: um ciclo
    /// acidental na hierarquia interrompe a subida em vez de travar.
    pub async fn incrementar_com_ancestrais(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        id: Uuid,
        campo: CampoCentroCusto,
        delta: Decimal,
    ) -> Result<(), AppError> {
        let mut visitados: HashSet<Uuid> = HashSet::new();
        let mut atual = Some(id);

        while let Some(centro_id) = atual {
            if !visitados.insert(centro_id) {
                tracing::warn!(
                    "Ciclo na hierarquia de centros de custo detectado em {centro_id}; propagação interrompida"
                );
                break;
            }

            self.incrementar(&mut *conn, centro_id, campo, delta).await?;

            atual = sqlx::query_scalar::<_, Option<Uuid>>(
                "SELECT parent_id FROM centros_custo WHERE empresa_id = $1 AND id = $2",
            )
            .bind(empresa_id)
            .bind(centro_id)
            .fetch_optional(&mut *conn)
            .await?
            .flatten();
        }

        Ok(())
    }
}

// src/db/empresa_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::empresa::Empresa};

#[derive(Clone)]
pub struct EmpresaRepository {
    pool: PgPool,
}

impl EmpresaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        nome: &str,
        owner_user_id: Uuid,
    ) -> Result<Empresa, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let empresa = sqlx::query_as::<_, Empresa>(
            "INSERT INTO empresas (nome, owner_user_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(nome)
        .bind(owner_user_id)
        .fetch_one(executor)
        .await?;

        Ok(empresa)
    }

    /// Busca a empresa garantindo que o usuário tem acesso a ela.
    pub async fn find_for_user(
        &self,
        empresa_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Empresa>, AppError> {
        let empresa = sqlx::query_as::<_, Empresa>(
            "SELECT * FROM empresas WHERE id = $1 AND owner_user_id = $2",
        )
        .bind(empresa_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(empresa)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Empresa>, AppError> {
        let empresas = sqlx::query_as::<_, Empresa>(
            "SELECT * FROM empresas WHERE owner_user_id = $1 ORDER BY nome ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(empresas)
    }
}

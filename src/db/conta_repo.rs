// src/db/conta_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::conta::{Conta, StatusConta, TipoParcelamento},
};

/// Campos de inserção de uma conta. O motor de parcelamento monta este
/// registro tanto para a macro quanto para cada parcela filha.
#[derive(Debug, Clone)]
pub struct NovaConta {
    pub descricao: String,
    pub valor: Decimal,
    pub data_vencimento: NaiveDate,
    pub pago: bool,
    pub data_pagamento: Option<NaiveDate>,
    pub valor_pago: Option<Decimal>,
    pub status: StatusConta,
    pub numero_parcela: Option<String>,
    pub total_parcelas: Option<i32>,
    pub grupo_parcelamento_id: Option<Uuid>,
    pub valor_total: Option<Decimal>,
    pub tipo_parcelamento: Option<TipoParcelamento>,
    pub is_conta_macro: bool,
    pub parent_id: Option<i64>,
    pub codigo_tipo: Option<String>,
    pub beneficiario: Option<String>,
    pub categoria: Option<String>,
    pub subcategoria: Option<String>,
    pub cartao_id: Option<Uuid>,
    pub conta_bancaria: Option<String>,
    pub socio_responsavel_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct ContaRepository {
    pool: PgPool,
}

impl ContaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        id: i64,
    ) -> Result<Option<Conta>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let conta = sqlx::query_as::<_, Conta>(
            "SELECT * FROM contas WHERE empresa_id = $1 AND id = $2",
        )
        .bind(empresa_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(conta)
    }

    pub async fn list_by_empresa<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
    ) -> Result<Vec<Conta>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contas = sqlx::query_as::<_, Conta>(
            "SELECT * FROM contas WHERE empresa_id = $1 ORDER BY data_vencimento ASC, id ASC",
        )
        .bind(empresa_id)
        .fetch_all(executor)
        .await?;

        Ok(contas)
    }

    /// Todos os registros de um grupo (macro incluída), em ordem de
    /// vencimento. O chamador separa macro e filhas por `is_conta_macro` —
    /// registros legados sem `parent_id` entram pelo próprio grupo.
    pub async fn find_grupo<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        grupo_id: Uuid,
    ) -> Result<Vec<Conta>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contas = sqlx::query_as::<_, Conta>(
            r#"
            SELECT * FROM contas
            WHERE empresa_id = $1 AND grupo_parcelamento_id = $2
            ORDER BY data_vencimento ASC, id ASC
            "#,
        )
        .bind(empresa_id)
        .bind(grupo_id)
        .fetch_all(executor)
        .await?;

        Ok(contas)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        nova: &NovaConta,
    ) -> Result<Conta, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let conta = sqlx::query_as::<_, Conta>(
            r#"
            INSERT INTO contas (
                empresa_id, descricao, valor, data_vencimento,
                pago, data_pagamento, valor_pago, status,
                numero_parcela, total_parcelas, grupo_parcelamento_id,
                valor_total, tipo_parcelamento, is_conta_macro, parent_id,
                codigo_tipo, beneficiario, categoria, subcategoria,
                cartao_id, conta_bancaria, socio_responsavel_id
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22
            )
            RETURNING *
            "#,
        )
        .bind(empresa_id)
        .bind(&nova.descricao)
        .bind(nova.valor)
        .bind(nova.data_vencimento)
        .bind(nova.pago)
        .bind(nova.data_pagamento)
        .bind(nova.valor_pago)
        .bind(nova.status)
        .bind(&nova.numero_parcela)
        .bind(nova.total_parcelas)
        .bind(nova.grupo_parcelamento_id)
        .bind(nova.valor_total)
        .bind(nova.tipo_parcelamento)
        .bind(nova.is_conta_macro)
        .bind(nova.parent_id)
        .bind(&nova.codigo_tipo)
        .bind(&nova.beneficiario)
        .bind(&nova.categoria)
        .bind(&nova.subcategoria)
        .bind(nova.cartao_id)
        .bind(&nova.conta_bancaria)
        .bind(nova.socio_responsavel_id)
        .fetch_one(executor)
        .await?;

        Ok(conta)
    }

    pub async fn update_valor<'e, E>(
        &self,
        executor: E,
        id: i64,
        valor: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE contas SET valor = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(valor)
            .execute(executor)
            .await?;

        Ok(())
    }

    /// Atualização completa de uma parcela vinda da lista
    /// `parcelasAtualizadas`. `data_pagamento` só é gravada quando paga.
    pub async fn update_parcela<'e, E>(
        &self,
        executor: E,
        id: i64,
        valor: Decimal,
        data_vencimento: NaiveDate,
        pago: bool,
        data_pagamento: Option<NaiveDate>,
        status: StatusConta,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE contas SET
                valor = $2,
                data_vencimento = $3,
                pago = $4,
                data_pagamento = CASE WHEN $4 THEN $5 ELSE NULL END,
                valor_pago = CASE WHEN $4 THEN $2 ELSE NULL END,
                status = $6,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(valor)
        .bind(data_vencimento)
        .bind(pago)
        .bind(data_pagamento)
        .bind(status)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn update_numeracao<'e, E>(
        &self,
        executor: E,
        id: i64,
        numero_parcela: &str,
        total_parcelas: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE contas SET numero_parcela = $2, total_parcelas = $3, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(numero_parcela)
        .bind(total_parcelas)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Sincroniza a macro com o agregado das filhas.
    pub async fn update_macro_totais<'e, E>(
        &self,
        executor: E,
        id: i64,
        valor_total: Decimal,
        total_parcelas: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE contas SET
                valor = $2,
                valor_total = $2,
                total_parcelas = $3,
                updated_at = now()
            WHERE id = $1 AND is_conta_macro = TRUE
            "#,
        )
        .bind(id)
        .bind(valor_total)
        .bind(total_parcelas)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Escrita em difusão dos campos compartilhados: atinge todas as linhas do
    /// grupo (macro e filhas), independente dos demais passos da edição.
    pub async fn broadcast_campos<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        grupo_id: Uuid,
        descricao: Option<&str>,
        beneficiario: Option<&str>,
        codigo_tipo: Option<&str>,
        socio_responsavel_id: Option<Uuid>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE contas SET
                descricao = COALESCE($3, descricao),
                beneficiario = COALESCE($4, beneficiario),
                codigo_tipo = COALESCE($5, codigo_tipo),
                socio_responsavel_id = COALESCE($6, socio_responsavel_id),
                updated_at = now()
            WHERE empresa_id = $1 AND grupo_parcelamento_id = $2
            "#,
        )
        .bind(empresa_id)
        .bind(grupo_id)
        .bind(descricao)
        .bind(beneficiario)
        .bind(codigo_tipo)
        .bind(socio_responsavel_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM contas WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(())
    }

    /// Soma das contas de cartão (não macro, não canceladas) com vencimento
    /// dentro da janela `[inicio, fim)` de uma fatura.
    pub async fn soma_cartao_janela<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        cartao_id: Uuid,
        inicio: NaiveDate,
        fim: NaiveDate,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let soma = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT SUM(valor) FROM contas
            WHERE empresa_id = $1
              AND cartao_id = $2
              AND is_conta_macro = FALSE
              AND status <> 'cancelado'
              AND data_vencimento >= $3
              AND data_vencimento < $4
            "#,
        )
        .bind(empresa_id)
        .bind(cartao_id)
        .bind(inicio)
        .bind(fim)
        .fetch_one(executor)
        .await?;

        Ok(soma.unwrap_or(Decimal::ZERO))
    }

    /// Total de contas pendentes vinculadas a um sócio (deduções previstas do
    /// pró-labore).
    pub async fn soma_pendentes_socio<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        socio_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let soma = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT SUM(valor) FROM contas
            WHERE empresa_id = $1
              AND socio_responsavel_id = $2
              AND is_conta_macro = FALSE
              AND status = 'pendente'
            "#,
        )
        .bind(empresa_id)
        .bind(socio_id)
        .fetch_one(executor)
        .await?;

        Ok(soma.unwrap_or(Decimal::ZERO))
    }

    /// Total de contas pagas ainda não processadas pelo fechamento mensal do
    /// pró-labore.
    pub async fn soma_pagas_nao_processadas_socio<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        socio_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let soma = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT SUM(COALESCE(valor_pago, valor)) FROM contas
            WHERE empresa_id = $1
              AND socio_responsavel_id = $2
              AND is_conta_macro = FALSE
              AND pago = TRUE
              AND prolabore_processado = FALSE
            "#,
        )
        .bind(empresa_id)
        .bind(socio_id)
        .fetch_one(executor)
        .await?;

        Ok(soma.unwrap_or(Decimal::ZERO))
    }

    /// A conta corrente de pró-labore de um sócio: categoria "Pró-labore",
    /// não paga, com o código do centro do sócio.
    pub async fn find_conta_prolabore<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        sigla: &str,
    ) -> Result<Option<Conta>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let conta = sqlx::query_as::<_, Conta>(
            r#"
            SELECT * FROM contas
            WHERE empresa_id = $1
              AND categoria = 'Pró-labore'
              AND pago = FALSE
              AND codigo_tipo = $2
            ORDER BY data_vencimento ASC
            LIMIT 1
            "#,
        )
        .bind(empresa_id)
        .bind(sigla)
        .fetch_optional(executor)
        .await?;

        Ok(conta)
    }
}

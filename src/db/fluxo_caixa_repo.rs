// src/db/fluxo_caixa_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::fluxo_caixa::{LancamentoFluxoCaixa, TipoLancamento},
};

#[derive(Clone)]
pub struct FluxoCaixaRepository {
    pool: PgPool,
}

impl FluxoCaixaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cria um lançamento. O saldo gravado assume inserção no fim da ordem
    /// cronológica; inserções retroativas são corrigidas pelo recálculo
    /// completo (`recalcular_saldos`).
    pub async fn create<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        data: NaiveDate,
        codigo: Option<&str>,
        contraparte: Option<&str>,
        valor: Decimal,
        tipo: TipoLancamento,
        conta_id: Option<i64>,
    ) -> Result<LancamentoFluxoCaixa, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lancamento = sqlx::query_as::<_, LancamentoFluxoCaixa>(
            r#"
            INSERT INTO fluxo_caixa (empresa_id, data, codigo, contraparte, valor, tipo, conta_id, saldo_acumulado)
            VALUES (
                $1, $2, $3, $4, $5, $6, $7,
                COALESCE(
                    (SELECT saldo_acumulado FROM fluxo_caixa
                     WHERE empresa_id = $1 ORDER BY data DESC, id DESC LIMIT 1),
                    0
                ) + $5 * $8
            )
            RETURNING *
            "#,
        )
        .bind(empresa_id)
        .bind(data)
        .bind(codigo)
        .bind(contraparte)
        .bind(valor)
        .bind(tipo)
        .bind(conta_id)
        .bind(tipo.sinal())
        .fetch_one(executor)
        .await?;

        Ok(lancamento)
    }

    /// Remove os lançamentos vinculados a uma conta. Retorna quantos saíram,
    /// para o chamador decidir se dispara o recálculo de saldos.
    pub async fn delete_by_conta<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        conta_id: i64,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM fluxo_caixa WHERE empresa_id = $1 AND conta_id = $2")
            .bind(empresa_id)
            .bind(conta_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Soma dos lançamentos de saída de um código (sigla de centro de custo)
    /// com data dentro de `[inicio, fim)` — as despesas diretas do mês que
    /// entram como dedução no pró-labore.
    pub async fn soma_saidas_codigo_periodo<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        codigo: &str,
        inicio: NaiveDate,
        fim: NaiveDate,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let soma = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT SUM(valor) FROM fluxo_caixa
            WHERE empresa_id = $1
              AND codigo = $2
              AND tipo = 'saida'
              AND data >= $3
              AND data < $4
            "#,
        )
        .bind(empresa_id)
        .bind(codigo)
        .bind(inicio)
        .bind(fim)
        .fetch_one(executor)
        .await?;

        Ok(soma.unwrap_or(Decimal::ZERO))
    }

    /// Recalcula `saldo_acumulado` de todos os lançamentos da empresa em
    /// ordem cronológica. Os saldos posteriores dependem da ordem, então o
    /// recálculo é sempre completo — decrementar pontualmente deixaria a
    /// cauda errada.
    pub async fn recalcular_saldos(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
    ) -> Result<(), AppError> {
        let lancamentos = sqlx::query_as::<_, LancamentoFluxoCaixa>(
            "SELECT * FROM fluxo_caixa WHERE empresa_id = $1 ORDER BY data ASC, id ASC",
        )
        .bind(empresa_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut saldo = Decimal::ZERO;
        for lancamento in &lancamentos {
            saldo += lancamento.valor * lancamento.tipo.sinal();
            if saldo != lancamento.saldo_acumulado {
                sqlx::query("UPDATE fluxo_caixa SET saldo_acumulado = $2 WHERE id = $1")
                    .bind(lancamento.id)
                    .bind(saldo)
                    .execute(&mut *conn)
                    .await?;
            }
        }

        Ok(())
    }
}

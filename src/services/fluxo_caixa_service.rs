// src/services/fluxo_caixa_service.rs
//
// Efeitos da vida das parcelas sobre o fluxo de caixa: uma parcela paga gera
// um lançamento de saída; estornar ou remover uma parcela paga desfaz o
// lançamento. O saldo corrente é recalculado por inteiro depois de remoções.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FluxoCaixaRepository,
    models::{conta::Conta, fluxo_caixa::TipoLancamento},
};

#[derive(Clone)]
pub struct FluxoCaixaService {
    pool: PgPool,
    repo: FluxoCaixaRepository,
}

impl FluxoCaixaService {
    pub fn new(pool: PgPool, repo: FluxoCaixaRepository) -> Self {
        Self { pool, repo }
    }

    /// Lança a saída correspondente a uma parcela paga. Contas macro nunca
    /// chegam aqui: só parcelas entram no fluxo.
    pub async fn registrar_pagamento(
        &self,
        conn: &mut PgConnection,
        conta: &Conta,
    ) -> Result<(), AppError> {
        debug_assert!(!conta.is_conta_macro);

        let data = conta.data_pagamento.unwrap_or(conta.data_vencimento);
        let valor = conta.valor_pago.unwrap_or(conta.valor);

        self.repo
            .create(
                &mut *conn,
                conta.empresa_id,
                data,
                conta.codigo_tipo.as_deref(),
                conta.beneficiario.as_deref(),
                valor,
                TipoLancamento::Saida,
                Some(conta.id),
            )
            .await?;

        Ok(())
    }

    /// Remove os lançamentos de uma parcela (estorno ou exclusão). Devolve
    /// quantos saíram para o chamador decidir sobre o recálculo de saldos.
    pub async fn desvincular_conta(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        conta_id: i64,
    ) -> Result<u64, AppError> {
        self.repo.delete_by_conta(&mut *conn, empresa_id, conta_id).await
    }

    /// Recalcula a soma corrente de toda a empresa. Usado como efeito não
    /// crítico após remoções no meio da sequência cronológica.
    pub async fn recalcular_saldos(&self, empresa_id: Uuid) -> Result<(), AppError> {
        let mut conn = self.pool.acquire().await?;
        self.repo.recalcular_saldos(&mut conn, empresa_id).await?;
        tracing::info!("Saldos do fluxo de caixa recalculados para a empresa {empresa_id}");
        Ok(())
    }
}

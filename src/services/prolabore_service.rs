// src/services/prolabore_service.rs
//
// Recálculo do pró-labore líquido de um sócio. Sempre deriva os totais do
// estado atual do banco — nada é incrementado — então repetir o recálculo sem
// escritas no meio produz o mesmo resultado.

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CentroCustoRepository, ContaRepository, FluxoCaixaRepository},
};

#[derive(Clone)]
pub struct ProLaboreService {
    pool: PgPool,
    centros: CentroCustoRepository,
    contas: ContaRepository,
    fluxo: FluxoCaixaRepository,
}

impl ProLaboreService {
    pub fn new(
        pool: PgPool,
        centros: CentroCustoRepository,
        contas: ContaRepository,
        fluxo: FluxoCaixaRepository,
    ) -> Self {
        Self { pool, centros, contas, fluxo }
    }

    /// Recalcula o pró-labore líquido do sócio dono do centro `centro_id`:
    ///
    ///   líquido = previsto − (descontos recorrentes
    ///                         + contas pendentes vinculadas
    ///                         + contas pagas ainda não processadas
    ///                         + saídas diretas do mês corrente)
    ///
    /// e grava o resultado na conta corrente de pró-labore do sócio
    /// (categoria "Pró-labore", não paga, com o código do centro).
    pub async fn recalcular(&self, empresa_id: Uuid, centro_id: Uuid) -> Result<(), AppError> {
        let Some(centro) = self.centros.find_by_id(&self.pool, empresa_id, centro_id).await? else {
            tracing::warn!("Centro de custo {centro_id} não encontrado para recálculo de pró-labore");
            return Ok(());
        };

        if !centro.is_socio {
            return Ok(());
        }

        let pendentes = self
            .contas
            .soma_pendentes_socio(&self.pool, empresa_id, centro.id)
            .await?;
        let pagas_nao_processadas = self
            .contas
            .soma_pagas_nao_processadas_socio(&self.pool, empresa_id, centro.id)
            .await?;

        let hoje = Utc::now().date_naive();
        let (inicio_mes, fim_mes) = janela_mes(hoje);
        let saidas_diretas = self
            .fluxo
            .soma_saidas_codigo_periodo(&self.pool, empresa_id, &centro.sigla, inicio_mes, fim_mes)
            .await?;

        let deducoes = centro.desconto_previsto + pendentes + pagas_nao_processadas + saidas_diretas;
        let liquido = (centro.previsto - deducoes).max(Decimal::ZERO);

        let Some(conta_prolabore) = self
            .contas
            .find_conta_prolabore(&self.pool, empresa_id, &centro.sigla)
            .await?
        else {
            tracing::warn!(
                "Sócio {} sem conta de pró-labore em aberto; recálculo ignorado",
                centro.sigla
            );
            return Ok(());
        };

        self.contas
            .update_valor(&self.pool, conta_prolabore.id, liquido)
            .await?;

        tracing::info!(
            "Pró-labore do sócio {} recalculado: {liquido} (deduções {deducoes})",
            centro.sigla
        );

        Ok(())
    }
}

/// Janela `[primeiro dia do mês, primeiro dia do mês seguinte)`.
fn janela_mes(dia: NaiveDate) -> (NaiveDate, NaiveDate) {
    let inicio = dia.with_day(1).unwrap_or(dia);
    let fim = crate::services::parcelas::data_apos_meses(inicio, 1);
    (inicio, fim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn janela_do_mes_cobre_o_mes_inteiro() {
        let (inicio, fim) = janela_mes("2026-08-06".parse().unwrap());
        assert_eq!(inicio, "2026-08-01".parse::<NaiveDate>().unwrap());
        assert_eq!(fim, "2026-09-01".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn janela_de_dezembro_termina_em_janeiro() {
        let (inicio, fim) = janela_mes("2026-12-25".parse().unwrap());
        assert_eq!(inicio, "2026-12-01".parse::<NaiveDate>().unwrap());
        assert_eq!(fim, "2027-01-01".parse::<NaiveDate>().unwrap());
    }
}

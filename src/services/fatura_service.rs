// src/services/fatura_service.rs
//
// Recálculo da fatura mensal de um cartão. A fatura nunca é incrementada:
// cada recálculo soma de novo as contas do período no estado atual do banco e
// grava o total — rodar duas vezes seguidas produz o mesmo resultado.

use chrono::{Datelike, NaiveDate};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CartaoRepository, ContaRepository},
};

/// Competência (ano, mês) da fatura em que cai uma compra: antes do dia de
/// fechamento ela pertence à fatura do próprio mês; do fechamento em diante,
/// à do mês seguinte, com dezembro virando janeiro do ano seguinte.
pub fn competencia_fatura(data: NaiveDate, dia_fechamento: u32) -> (i32, u32) {
    let (ano, mes) = (data.year(), data.month());
    if data.day() < dia_fechamento {
        (ano, mes)
    } else if mes == 12 {
        (ano + 1, 1)
    } else {
        (ano, mes + 1)
    }
}

/// Janela de datas `[inicio, fim)` coberta pela fatura de competência
/// (ano, mes): do fechamento do mês anterior até a véspera do fechamento do
/// próprio mês.
pub fn janela_fatura(ano: i32, mes: u32, dia_fechamento: u32) -> (NaiveDate, NaiveDate) {
    let (ano_anterior, mes_anterior) = if mes == 1 { (ano - 1, 12) } else { (ano, mes - 1) };
    let inicio = dia_no_mes(ano_anterior, mes_anterior, dia_fechamento);
    let fim = dia_no_mes(ano, mes, dia_fechamento);
    (inicio, fim)
}

// Dia limitado ao último dia do mês (fechamento 31 em fevereiro).
fn dia_no_mes(ano: i32, mes: u32, dia: u32) -> NaiveDate {
    (1..=dia)
        .rev()
        .find_map(|d| NaiveDate::from_ymd_opt(ano, mes, d))
        .unwrap_or_default()
}

#[derive(Clone)]
pub struct FaturaService {
    pool: PgPool,
    cartoes: CartaoRepository,
    contas: ContaRepository,
}

impl FaturaService {
    pub fn new(pool: PgPool, cartoes: CartaoRepository, contas: ContaRepository) -> Self {
        Self { pool, cartoes, contas }
    }

    /// Recalcula a fatura do período em que `data_referencia` cai, para o
    /// cartão dado. Deriva o total inteiro do estado atual das contas.
    pub async fn recalcular_fatura(
        &self,
        empresa_id: Uuid,
        cartao_id: Uuid,
        data_referencia: NaiveDate,
    ) -> Result<(), AppError> {
        let Some(cartao) = self.cartoes.find_by_id(&self.pool, empresa_id, cartao_id).await? else {
            tracing::warn!("Cartão {cartao_id} não encontrado para recálculo de fatura");
            return Ok(());
        };

        let dia_fechamento = cartao.dia_fechamento.max(1) as u32;
        let (ano, mes) = competencia_fatura(data_referencia, dia_fechamento);
        let (inicio, fim) = janela_fatura(ano, mes, dia_fechamento);

        let total = self
            .contas
            .soma_cartao_janela(&self.pool, empresa_id, cartao_id, inicio, fim)
            .await?;

        self.cartoes
            .upsert_fatura(&self.pool, empresa_id, cartao_id, ano, mes as i32, total)
            .await?;

        tracing::info!(
            "Fatura do cartão {cartao_id} recalculada: {mes:02}/{ano} = {total}"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dia(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn compra_antes_do_fechamento_fica_no_mes() {
        assert_eq!(competencia_fatura(dia("2026-03-10"), 25), (2026, 3));
    }

    #[test]
    fn compra_no_fechamento_vai_para_o_mes_seguinte() {
        assert_eq!(competencia_fatura(dia("2026-03-25"), 25), (2026, 4));
        assert_eq!(competencia_fatura(dia("2026-03-28"), 25), (2026, 4));
    }

    #[test]
    fn virada_de_dezembro_para_janeiro() {
        assert_eq!(competencia_fatura(dia("2026-12-26"), 25), (2027, 1));
        assert_eq!(competencia_fatura(dia("2026-12-10"), 25), (2026, 12));
    }

    #[test]
    fn janela_cobre_do_fechamento_anterior_ao_atual() {
        let (inicio, fim) = janela_fatura(2026, 4, 25);
        assert_eq!(inicio, dia("2026-03-25"));
        assert_eq!(fim, dia("2026-04-25"));
    }

    #[test]
    fn janela_de_janeiro_comeca_em_dezembro() {
        let (inicio, fim) = janela_fatura(2027, 1, 25);
        assert_eq!(inicio, dia("2026-12-25"));
        assert_eq!(fim, dia("2027-01-25"));
    }

    #[test]
    fn fechamento_alem_do_fim_do_mes_e_limitado() {
        let (inicio, _) = janela_fatura(2026, 3, 31);
        // Fevereiro não tem dia 31; a janela começa no último dia possível.
        assert_eq!(inicio, dia("2026-02-28"));
    }

    #[test]
    fn competencia_e_janela_sao_consistentes() {
        // Toda data dentro da janela de uma competência mapeia de volta para
        // a mesma competência.
        let fechamento = 15;
        let (inicio, fim) = janela_fatura(2026, 6, fechamento);
        let mut data = inicio;
        while data < fim {
            assert_eq!(competencia_fatura(data, fechamento), (2026, 6), "data {data}");
            data = data.succ_opt().unwrap();
        }
    }
}

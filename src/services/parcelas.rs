// src/services/parcelas.rs
//
// Funções puras de cálculo de parcelas: divisão de valores, datas mensais,
// numeração e seleção de parcelas removíveis. O motor de parcelamento orquestra
// o banco; a aritmética mora aqui, sem efeitos.

use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::conta::Conta;

/// Tolerância de arredondamento (um centavo) para comparações de valores.
pub const TOLERANCIA: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Divide `total` igualmente em `quantidade` parcelas. Cada cota é truncada
/// para centavos e o resto vai para a última parcela, de modo que a soma das
/// parcelas é exatamente `total` (o invariante de soma é exato, não
/// aproximado).
pub fn dividir_valor(total: Decimal, quantidade: usize) -> Vec<Decimal> {
    if quantidade == 0 {
        return Vec::new();
    }

    let n = Decimal::from(quantidade as u64);
    let base = (total / n).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let mut valores = vec![base; quantidade];
    valores[quantidade - 1] = total - base * Decimal::from((quantidade - 1) as u64);
    valores
}

/// Data da parcela `meses` meses após `base`, com o dia limitado ao fim do
/// mês de destino (31/jan + 1 mês = 28/fev). O overflow de `checked_add_months`
/// só ocorre além do ano 262143.
pub fn data_apos_meses(base: NaiveDate, meses: u32) -> NaiveDate {
    base.checked_add_months(Months::new(meses)).unwrap_or(base)
}

/// Numeração contígua "{i}/{total}" a partir de `inicio`. O denominador é
/// sempre a contagem final de parcelas, mesmo quando a numeração preservada
/// começa adiante de 1.
pub fn numerar(inicio: i32, total: i32) -> Vec<String> {
    (inicio..inicio + total)
        .map(|i| format!("{i}/{total}"))
        .collect()
}

/// Número inicial a preservar na renumeração: planos do tipo valor_parcela
/// mantêm o numerador histórico da primeira sobrevivente; os demais voltam a 1.
pub fn inicio_numeracao(preservar_inicio: bool, primeira: Option<&Conta>) -> i32 {
    if preservar_inicio {
        primeira.and_then(Conta::numero_inicial).unwrap_or(1)
    } else {
        1
    }
}

/// Escolhe as parcelas a remover numa redução de quantidade: apenas pendentes,
/// preferindo os vencimentos mais tardios. Se não houver pendentes
/// suficientes, devolve quantas parcelas pagas bloqueiam a redução — o
/// chamador rejeita a edição inteira, sem mutação parcial.
pub fn selecionar_remocao(parcelas: &[Conta], remover: usize) -> Result<Vec<i64>, usize> {
    let pendentes: Vec<&Conta> = parcelas.iter().filter(|p| !p.pago).collect();

    if pendentes.len() < remover {
        return Err(parcelas.len() - pendentes.len());
    }

    // `parcelas` já chega ordenada por vencimento ascendente; os últimos
    // pendentes são os de vencimento mais tardio.
    Ok(pendentes
        .iter()
        .rev()
        .take(remover)
        .map(|p| p.id)
        .collect())
}

/// Fixture compartilhada pelos testes dos módulos de cálculo.
#[cfg(test)]
pub(crate) mod tests_support {
    use rust_decimal::Decimal;

    use crate::models::conta::{Conta, StatusConta};

    pub(crate) fn conta_basica(id: i64, valor: Decimal, venc: &str, pago: bool) -> Conta {
        Conta {
            id,
            empresa_id: uuid::Uuid::nil(),
            descricao: "Parcela de teste".into(),
            valor,
            data_vencimento: venc.parse().unwrap(),
            pago,
            data_pagamento: pago.then(|| venc.parse().unwrap()),
            valor_pago: pago.then_some(valor),
            status: if pago { StatusConta::Pago } else { StatusConta::Pendente },
            numero_parcela: None,
            total_parcelas: None,
            grupo_parcelamento_id: None,
            valor_total: None,
            tipo_parcelamento: None,
            is_conta_macro: false,
            parent_id: None,
            codigo_tipo: None,
            beneficiario: None,
            categoria: None,
            subcategoria: None,
            cartao_id: None,
            conta_bancaria: None,
            socio_responsavel_id: None,
            prolabore_processado: false,
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::tests_support::conta_basica as parcela;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn divisao_exata() {
        assert_eq!(dividir_valor(dec!(300), 3), vec![dec!(100), dec!(100), dec!(100)]);
        assert_eq!(dividir_valor(dec!(300), 5), vec![dec!(60); 5]);
    }

    #[test]
    fn divisao_com_resto_vai_para_a_ultima() {
        let valores = dividir_valor(dec!(100), 3);
        assert_eq!(valores, vec![dec!(33.33), dec!(33.33), dec!(33.34)]);
        assert_eq!(valores.iter().sum::<Decimal>(), dec!(100));
    }

    #[test]
    fn divisao_de_centavo_unico() {
        let valores = dividir_valor(dec!(0.01), 3);
        assert_eq!(valores, vec![dec!(0), dec!(0), dec!(0.01)]);
        assert_eq!(valores.iter().sum::<Decimal>(), dec!(0.01));
    }

    #[test]
    fn datas_mensais_do_plano() {
        let primeira: NaiveDate = "2026-01-15".parse().unwrap();
        assert_eq!(data_apos_meses(primeira, 1), "2026-02-15".parse().unwrap());
        assert_eq!(data_apos_meses(primeira, 2), "2026-03-15".parse().unwrap());
        assert_eq!(data_apos_meses(primeira, 12), "2027-01-15".parse().unwrap());
    }

    #[test]
    fn data_mensal_limita_ao_fim_do_mes() {
        let base: NaiveDate = "2026-01-31".parse().unwrap();
        assert_eq!(data_apos_meses(base, 1), "2026-02-28".parse().unwrap());
        assert_eq!(data_apos_meses(base, 3), "2026-04-30".parse().unwrap());
    }

    #[test]
    fn numeracao_padrao_comeca_em_um() {
        assert_eq!(numerar(1, 3), vec!["1/3", "2/3", "3/3"]);
    }

    #[test]
    fn numeracao_preservada_mantem_denominador_final() {
        assert_eq!(numerar(4, 3), vec!["4/3", "5/3", "6/3"]);
    }

    #[test]
    fn inicio_preservado_extrai_do_numero_anterior() {
        let mut primeira = parcela(1, dec!(50), "2026-03-10", false);
        primeira.numero_parcela = Some("4/12".into());
        assert_eq!(inicio_numeracao(true, Some(&primeira)), 4);
        assert_eq!(inicio_numeracao(false, Some(&primeira)), 1);
        assert_eq!(inicio_numeracao(true, None), 1);
    }

    #[test]
    fn remocao_prefere_vencimentos_tardios() {
        let parcelas = vec![
            parcela(1, dec!(100), "2026-01-15", false),
            parcela(2, dec!(100), "2026-02-15", false),
            parcela(3, dec!(100), "2026-03-15", false),
        ];
        assert_eq!(selecionar_remocao(&parcelas, 2).unwrap(), vec![3, 2]);
    }

    #[test]
    fn remocao_pula_parcelas_pagas() {
        let parcelas = vec![
            parcela(1, dec!(100), "2026-01-15", false),
            parcela(2, dec!(100), "2026-02-15", true),
            parcela(3, dec!(100), "2026-03-15", false),
        ];
        // A paga de fevereiro fica; saem as pendentes mais tardias.
        assert_eq!(selecionar_remocao(&parcelas, 2).unwrap(), vec![3, 1]);
    }

    #[test]
    fn remocao_bloqueada_informa_quantas_pagas() {
        let parcelas = vec![
            parcela(1, dec!(100), "2026-01-15", true),
            parcela(2, dec!(100), "2026-02-15", false),
            parcela(3, dec!(100), "2026-03-15", false),
        ];
        // Reduzir de 3 para 1 exigiria remover 2, mas só há 2 pendentes —
        // remover ambas é permitido; remover 3 não.
        assert_eq!(selecionar_remocao(&parcelas, 3), Err(1));
        assert!(selecionar_remocao(&parcelas, 2).is_ok());
    }
}

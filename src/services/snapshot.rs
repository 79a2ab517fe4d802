// src/services/snapshot.rs
//
// Retrato de um grupo de parcelamento e detecção do tipo de alteração de uma
// edição. Funções puras, computadas antes de qualquer mutação; o resultado só
// alimenta a trilha de auditoria.

use rust_decimal::Decimal;

use crate::{
    models::{
        conta::{Conta, EdicaoParcelamento},
        historico::{AlteracaoDetectada, SnapshotParcela, SnapshotParcelamento, TipoAlteracao},
    },
    services::parcelas::TOLERANCIA,
};

/// Quantas observações entram na descrição de uma edição individual; o resto
/// vira um sufixo "(+N)".
const MAX_OBSERVACOES: usize = 3;

/// Monta o retrato do grupo a partir das parcelas atuais (sem a macro) e da
/// macro, se houver. Campos compartilhados saem da macro, senão da primeira
/// parcela, senão vazios. A ordem das parcelas de saída é a ordem de entrada —
/// quem precisa de determinismo ordena por vencimento antes.
pub fn montar_snapshot(parcelas: &[Conta], conta_macro: Option<&Conta>) -> SnapshotParcelamento {
    let referencia = conta_macro.or_else(|| parcelas.first());

    SnapshotParcelamento {
        valor_total: parcelas.iter().map(|p| p.valor).sum(),
        total_parcelas: parcelas.len(),
        descricao: referencia.map(|c| c.descricao.clone()).unwrap_or_default(),
        beneficiario: referencia.and_then(|c| c.beneficiario.clone()),
        codigo_tipo: referencia.and_then(|c| c.codigo_tipo.clone()),
        parcelas: parcelas
            .iter()
            .map(|p| SnapshotParcela {
                id: p.id,
                numero_parcela: p.numero_parcela.clone(),
                valor: p.valor,
                data_vencimento: p.data_vencimento.to_string(),
                pago: p.pago,
                data_pagamento: p.data_pagamento.map(|d| d.to_string()),
                status: p.status,
            })
            .collect(),
    }
}

fn formatar_moeda(valor: Decimal) -> String {
    format!("R$ {:.2}", valor)
}

fn rotulo_parcela(parcela: &SnapshotParcela) -> String {
    parcela
        .numero_parcela
        .clone()
        .unwrap_or_else(|| format!("#{}", parcela.id))
}

/// Classifica a edição pedida contra o retrato anterior. Primeira regra que
/// casar vence, na ordem quantidade > valor total > edições individuais — uma
/// edição recebe exatamente uma classificação, mesmo combinando gatilhos
/// (política de produto: a trilha de auditoria guarda um registro por edição,
/// com a categoria mais significativa).
///
/// Uma troca pura de pago/não pago, com valor e vencimento idênticos, não é
/// classificada: o efeito dela aparece no fluxo de caixa, não na trilha.
pub fn detectar_tipo_alteracao(
    anterior: &SnapshotParcelamento,
    pedido: &EdicaoParcelamento,
) -> Option<AlteracaoDetectada> {
    // 1. Mudança de quantidade.
    if let Some(nova) = pedido.quantidade_solicitada() {
        if nova as usize != anterior.total_parcelas {
            return Some(AlteracaoDetectada {
                tipo: TipoAlteracao::Quantidade,
                descricao: format!(
                    "Alterado de {} para {} parcelas",
                    anterior.total_parcelas, nova
                ),
            });
        }
    }

    // 2. Mudança de valor total.
    if let Some(novo_total) = pedido.valor_total {
        if (novo_total - anterior.valor_total).abs() > TOLERANCIA {
            return Some(AlteracaoDetectada {
                tipo: TipoAlteracao::ValorTotal,
                descricao: format!(
                    "Valor total alterado de {} para {}",
                    formatar_moeda(anterior.valor_total),
                    formatar_moeda(novo_total)
                ),
            });
        }
    }

    // 3. Edições individuais.
    let lista = pedido.parcelas_atualizadas.as_deref().unwrap_or(&[]);
    if lista.is_empty() {
        return None;
    }

    let mut observacoes: Vec<String> = Vec::new();

    for entrada in lista {
        let existente = entrada
            .id
            .filter(|id| *id > 0)
            .and_then(|id| anterior.parcelas.iter().find(|p| p.id == id));

        match existente {
            None => observacoes.push("Nova parcela adicionada".to_string()),
            Some(parcela) => {
                if (entrada.valor - parcela.valor).abs() > TOLERANCIA {
                    observacoes.push(format!(
                        "Parcela {} teve o valor alterado de {} para {}",
                        rotulo_parcela(parcela),
                        formatar_moeda(parcela.valor),
                        formatar_moeda(entrada.valor)
                    ));
                }
                // Compara só a porção de data, ignorando hora.
                let data_anterior = &parcela.data_vencimento[..10.min(parcela.data_vencimento.len())];
                if entrada.data_vencimento.to_string() != data_anterior {
                    observacoes.push(format!(
                        "Parcela {} teve o vencimento alterado de {} para {}",
                        rotulo_parcela(parcela),
                        data_anterior,
                        entrada.data_vencimento
                    ));
                }
            }
        }
    }

    // Parcelas do retrato ausentes da lista foram removidas.
    for parcela in &anterior.parcelas {
        let presente = lista
            .iter()
            .any(|e| e.id.is_some_and(|id| id == parcela.id));
        if !presente {
            observacoes.push(format!("Parcela {} removida", rotulo_parcela(parcela)));
        }
    }

    if observacoes.is_empty() {
        return None;
    }

    let suprimidas = observacoes.len().saturating_sub(MAX_OBSERVACOES);
    let mut descricao = observacoes
        .iter()
        .take(MAX_OBSERVACOES)
        .cloned()
        .collect::<Vec<_>>()
        .join("; ");
    if suprimidas > 0 {
        descricao.push_str(&format!(" (+{suprimidas})"));
    }

    Some(AlteracaoDetectada {
        tipo: TipoAlteracao::EdicaoIndividual,
        descricao,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::conta::{ParcelaAtualizada, StatusConta};
    use rust_decimal_macros::dec;

    fn parcela_snapshot(id: i64, numero: &str, valor: Decimal, venc: &str, pago: bool) -> SnapshotParcela {
        SnapshotParcela {
            id,
            numero_parcela: Some(numero.into()),
            valor,
            data_vencimento: venc.into(),
            pago,
            data_pagamento: pago.then(|| venc.into()),
            status: if pago { StatusConta::Pago } else { StatusConta::Pendente },
        }
    }

    fn snapshot_tres_parcelas() -> SnapshotParcelamento {
        SnapshotParcelamento {
            valor_total: dec!(300),
            total_parcelas: 3,
            descricao: "Notebook em 3x".into(),
            beneficiario: Some("Loja de informática".into()),
            codigo_tipo: Some("ADM".into()),
            parcelas: vec![
                parcela_snapshot(1, "1/3", dec!(100), "2026-01-15", false),
                parcela_snapshot(2, "2/3", dec!(100), "2026-02-15", false),
                parcela_snapshot(3, "3/3", dec!(100), "2026-03-15", false),
            ],
        }
    }

    fn entrada(id: Option<i64>, valor: Decimal, venc: &str, pago: bool) -> ParcelaAtualizada {
        ParcelaAtualizada {
            id,
            valor,
            data_vencimento: venc.parse().unwrap(),
            pago,
            data_pagamento: pago.then(|| venc.parse().unwrap()),
            status: None,
        }
    }

    #[test]
    fn quantidade_tem_prioridade_sobre_valor_total() {
        let pedido = EdicaoParcelamento {
            nova_quantidade: Some(5),
            valor_total: Some(dec!(500)),
            ..Default::default()
        };

        let alteracao = detectar_tipo_alteracao(&snapshot_tres_parcelas(), &pedido).unwrap();
        assert_eq!(alteracao.tipo, TipoAlteracao::Quantidade);
        assert_eq!(alteracao.descricao, "Alterado de 3 para 5 parcelas");
    }

    #[test]
    fn valor_total_descreve_antes_e_depois() {
        let pedido = EdicaoParcelamento {
            valor_total: Some(dec!(330)),
            ..Default::default()
        };

        let alteracao = detectar_tipo_alteracao(&snapshot_tres_parcelas(), &pedido).unwrap();
        assert_eq!(alteracao.tipo, TipoAlteracao::ValorTotal);
        assert!(alteracao.descricao.contains("R$ 300.00"));
        assert!(alteracao.descricao.contains("R$ 330.00"));
    }

    #[test]
    fn valor_total_dentro_da_tolerancia_nao_conta() {
        let pedido = EdicaoParcelamento {
            valor_total: Some(dec!(300.01)),
            ..Default::default()
        };

        assert_eq!(detectar_tipo_alteracao(&snapshot_tres_parcelas(), &pedido), None);
    }

    #[test]
    fn quantidade_igual_cai_para_proxima_regra() {
        let pedido = EdicaoParcelamento {
            nova_quantidade: Some(3),
            valor_total: Some(dec!(330)),
            ..Default::default()
        };

        let alteracao = detectar_tipo_alteracao(&snapshot_tres_parcelas(), &pedido).unwrap();
        assert_eq!(alteracao.tipo, TipoAlteracao::ValorTotal);
    }

    #[test]
    fn edicao_individual_nomeia_a_parcela() {
        let pedido = EdicaoParcelamento {
            parcelas_atualizadas: Some(vec![
                entrada(Some(1), dec!(150), "2026-01-15", false),
                entrada(Some(2), dec!(100), "2026-02-15", false),
                entrada(Some(3), dec!(100), "2026-03-15", false),
            ]),
            ..Default::default()
        };

        let alteracao = detectar_tipo_alteracao(&snapshot_tres_parcelas(), &pedido).unwrap();
        assert_eq!(alteracao.tipo, TipoAlteracao::EdicaoIndividual);
        assert!(alteracao.descricao.contains("Parcela 1/3"));
        assert!(alteracao.descricao.contains("R$ 150.00"));
    }

    #[test]
    fn remocao_e_adicao_sao_observadas() {
        // A parcela 3 sumiu da lista e entrou uma sem id.
        let pedido = EdicaoParcelamento {
            parcelas_atualizadas: Some(vec![
                entrada(Some(1), dec!(100), "2026-01-15", false),
                entrada(Some(2), dec!(100), "2026-02-15", false),
                entrada(None, dec!(100), "2026-04-15", false),
            ]),
            ..Default::default()
        };

        let alteracao = detectar_tipo_alteracao(&snapshot_tres_parcelas(), &pedido).unwrap();
        assert_eq!(alteracao.tipo, TipoAlteracao::EdicaoIndividual);
        assert!(alteracao.descricao.contains("Nova parcela adicionada"));
        assert!(alteracao.descricao.contains("Parcela 3/3 removida"));
    }

    #[test]
    fn observacoes_excedentes_viram_sufixo() {
        // Quatro observações: três mudanças de valor e uma de vencimento.
        let pedido = EdicaoParcelamento {
            parcelas_atualizadas: Some(vec![
                entrada(Some(1), dec!(150), "2026-01-20", false),
                entrada(Some(2), dec!(150), "2026-02-15", false),
                entrada(Some(3), dec!(150), "2026-03-15", false),
            ]),
            ..Default::default()
        };

        let alteracao = detectar_tipo_alteracao(&snapshot_tres_parcelas(), &pedido).unwrap();
        assert!(alteracao.descricao.ends_with("(+1)"));
        assert_eq!(alteracao.descricao.matches(';').count(), 2);
    }

    #[test]
    fn troca_pura_de_status_de_pagamento_nao_e_classificada() {
        // Mesmo valor, mesma data, só o pago mudou: o detector devolve None;
        // o efeito no fluxo de caixa acontece fora da trilha de auditoria.
        let pedido = EdicaoParcelamento {
            parcelas_atualizadas: Some(vec![
                entrada(Some(1), dec!(100), "2026-01-15", true),
                entrada(Some(2), dec!(100), "2026-02-15", false),
                entrada(Some(3), dec!(100), "2026-03-15", false),
            ]),
            ..Default::default()
        };

        assert_eq!(detectar_tipo_alteracao(&snapshot_tres_parcelas(), &pedido), None);
    }

    #[test]
    fn sem_gatilhos_devolve_none() {
        assert_eq!(
            detectar_tipo_alteracao(&snapshot_tres_parcelas(), &EdicaoParcelamento::default()),
            None
        );
    }

    #[test]
    fn snapshot_usa_macro_como_referencia() {
        use crate::services::parcelas::tests_support::conta_basica;

        let mut macro_conta = conta_basica(10, dec!(300), "2026-01-15", false);
        macro_conta.descricao = "Plano completo".into();
        macro_conta.is_conta_macro = true;

        let filhas = vec![
            conta_basica(1, dec!(100), "2026-01-15", false),
            conta_basica(2, dec!(100), "2026-02-15", true),
            conta_basica(3, dec!(100), "2026-03-15", false),
        ];

        let snapshot = montar_snapshot(&filhas, Some(&macro_conta));
        assert_eq!(snapshot.valor_total, dec!(300));
        assert_eq!(snapshot.total_parcelas, 3);
        assert_eq!(snapshot.descricao, "Plano completo");
        assert_eq!(snapshot.parcelas[1].data_pagamento.as_deref(), Some("2026-02-15"));
        assert_eq!(snapshot.parcelas[0].data_vencimento, "2026-01-15");
    }
}

// src/services/parcelamento_service.rs
//
// O motor de parcelamento: cria o conjunto macro + parcelas, aplica edições
// (valor total, quantidade, lista de parcelas) convergindo para os
// invariantes do grupo — soma das filhas == valor da macro, contagem casada,
// numeração contígua — e dispara os recálculos derivados (fatura de cartão,
// pró-labore, saldos do fluxo).
//
// Toda mutação multi-passo roda numa única transação, serializada por grupo
// com um advisory lock do Postgres. Os efeitos derivados rodam depois do
// commit como efeitos não críticos: falha neles nunca desfaz a edição.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{efeito::nao_critico, error::AppError},
    db::{
        CentroCustoRepository, ContaRepository, HistoricoRepository, conta_repo::NovaConta,
    },
    models::{
        centro_custo::{CampoCentroCusto, CentroCusto},
        conta::{
            Conta, EdicaoParcelamento, NovoParcelamento, ParcelamentoCriado, ResultadoEdicao,
            StatusConta, TipoParcelamento,
        },
    },
    services::{
        fatura_service::FaturaService,
        fluxo_caixa_service::FluxoCaixaService,
        parcelas::{
            TOLERANCIA, data_apos_meses, dividir_valor, inicio_numeracao, numerar,
            selecionar_remocao,
        },
        prolabore_service::ProLaboreService,
        snapshot::{detectar_tipo_alteracao, montar_snapshot},
    },
};

#[derive(Clone)]
pub struct ParcelamentoService {
    pool: PgPool,
    contas: ContaRepository,
    centros: CentroCustoRepository,
    historico: HistoricoRepository,
    fluxo: FluxoCaixaService,
    faturas: FaturaService,
    prolabore: ProLaboreService,
}

fn soma_valores(parcelas: &[Conta]) -> Decimal {
    parcelas.iter().map(|p| p.valor).sum()
}

// Centros de sócio acumulam nos campos de desconto; os demais, nos totais.
fn campo_agregado(centro: &CentroCusto, previsto: bool) -> CampoCentroCusto {
    match (centro.is_socio, previsto) {
        (true, true) => CampoCentroCusto::DescontoPrevisto,
        (true, false) => CampoCentroCusto::DescontoReal,
        (false, true) => CampoCentroCusto::Previsto,
        (false, false) => CampoCentroCusto::Realizado,
    }
}

impl ParcelamentoService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        contas: ContaRepository,
        centros: CentroCustoRepository,
        historico: HistoricoRepository,
        fluxo: FluxoCaixaService,
        faturas: FaturaService,
        prolabore: ProLaboreService,
    ) -> Self {
        Self { pool, contas, centros, historico, fluxo, faturas, prolabore }
    }

    // =========================================================================
    //  CRIAÇÃO
    // =========================================================================

    /// Cria a conta macro e as parcelas filhas de um novo plano. A macro nasce
    /// com o agregado exato das filhas; se a primeira parcela já veio paga, o
    /// lançamento no fluxo e o realizado do centro de custo saem na mesma
    /// transação.
    pub async fn criar_parcelamento(
        &self,
        empresa_id: Uuid,
        input: &NovoParcelamento,
    ) -> Result<ParcelamentoCriado, AppError> {
        let mut tx = self.pool.begin().await?;

        let grupo = Uuid::new_v4();
        let quantidade = input.quantidade;
        let valor_total = input.valor_parcela * Decimal::from(quantidade);

        let centro = match input.codigo_tipo.as_deref() {
            Some(codigo) => self.centros.find_by_sigla(&mut *tx, empresa_id, codigo).await?,
            None => None,
        };
        let socio_id = centro.as_ref().filter(|c| c.is_socio).map(|c| c.id);

        if let Some(centro) = &centro {
            self.centros
                .incrementar_com_ancestrais(
                    &mut tx,
                    empresa_id,
                    centro.id,
                    campo_agregado(centro, true),
                    valor_total,
                )
                .await?;
        }

        let tipo = input.tipo_parcelamento.or(Some(TipoParcelamento::ValorTotal));

        let conta_macro = self
            .contas
            .create(
                &mut *tx,
                empresa_id,
                &NovaConta {
                    descricao: input.descricao.clone(),
                    valor: valor_total,
                    data_vencimento: input.data_primeira_parcela,
                    pago: false,
                    data_pagamento: None,
                    valor_pago: None,
                    status: StatusConta::Pendente,
                    numero_parcela: None,
                    total_parcelas: Some(quantidade),
                    grupo_parcelamento_id: Some(grupo),
                    valor_total: Some(valor_total),
                    tipo_parcelamento: tipo,
                    is_conta_macro: true,
                    parent_id: None,
                    codigo_tipo: input.codigo_tipo.clone(),
                    beneficiario: input.beneficiario.clone(),
                    categoria: input.categoria.clone(),
                    subcategoria: input.subcategoria.clone(),
                    cartao_id: input.cartao_id,
                    conta_bancaria: input.conta_bancaria.clone(),
                    socio_responsavel_id: socio_id,
                },
            )
            .await?;

        let mut parcelas = Vec::with_capacity(quantidade as usize);

        for i in input.parcela_inicial..=quantidade {
            let deslocamento = (i - input.parcela_inicial) as u32;
            let vencimento = data_apos_meses(input.data_primeira_parcela, deslocamento);
            let paga = input.primeira_paga && i == input.parcela_inicial;
            let data_pagamento = paga
                .then(|| input.data_pagamento_primeira.unwrap_or(vencimento));

            let parcela = self
                .contas
                .create(
                    &mut *tx,
                    empresa_id,
                    &NovaConta {
                        descricao: input.descricao.clone(),
                        valor: input.valor_parcela,
                        data_vencimento: vencimento,
                        pago: paga,
                        data_pagamento,
                        valor_pago: paga.then_some(input.valor_parcela),
                        status: if paga { StatusConta::Pago } else { StatusConta::Pendente },
                        numero_parcela: Some(format!("{i}/{quantidade}")),
                        total_parcelas: Some(quantidade),
                        grupo_parcelamento_id: Some(grupo),
                        valor_total: None,
                        tipo_parcelamento: tipo,
                        is_conta_macro: false,
                        parent_id: Some(conta_macro.id),
                        codigo_tipo: input.codigo_tipo.clone(),
                        beneficiario: input.beneficiario.clone(),
                        categoria: input.categoria.clone(),
                        subcategoria: input.subcategoria.clone(),
                        cartao_id: input.cartao_id,
                        conta_bancaria: input.conta_bancaria.clone(),
                        socio_responsavel_id: socio_id,
                    },
                )
                .await?;

            if paga {
                self.fluxo.registrar_pagamento(&mut tx, &parcela).await?;
                if let Some(centro) = &centro {
                    self.centros
                        .incrementar_com_ancestrais(
                            &mut tx,
                            empresa_id,
                            centro.id,
                            campo_agregado(centro, false),
                            input.valor_parcela,
                        )
                        .await?;
                }
            }

            parcelas.push(parcela);
        }

        tx.commit().await?;

        tracing::info!(
            "Parcelamento {grupo} criado: {} parcelas, total {valor_total}",
            parcelas.len()
        );

        if let Some(cartao_id) = input.cartao_id {
            let datas: HashSet<NaiveDate> = parcelas.iter().map(|p| p.data_vencimento).collect();
            for data in datas {
                nao_critico(
                    "recálculo de fatura",
                    self.faturas.recalcular_fatura(empresa_id, cartao_id, data),
                )
                .await;
            }
        }

        if let Some(socio) = socio_id {
            nao_critico(
                "recálculo de pró-labore",
                self.prolabore.recalcular(empresa_id, socio),
            )
            .await;
        }

        Ok(ParcelamentoCriado { conta_macro, parcelas })
    }

    /// Caminho sem parcelamento: uma conta única, sem grupo nem macro. Os
    /// agregados e efeitos derivados seguem a mesma política do plano.
    pub async fn criar_conta_avulsa(
        &self,
        empresa_id: Uuid,
        input: &crate::models::conta::NovaContaAvulsa,
    ) -> Result<Conta, AppError> {
        let mut tx = self.pool.begin().await?;

        let centro = match input.codigo_tipo.as_deref() {
            Some(codigo) => self.centros.find_by_sigla(&mut *tx, empresa_id, codigo).await?,
            None => None,
        };
        let socio_id = centro.as_ref().filter(|c| c.is_socio).map(|c| c.id);

        if let Some(centro) = &centro {
            self.centros
                .incrementar_com_ancestrais(
                    &mut tx,
                    empresa_id,
                    centro.id,
                    campo_agregado(centro, true),
                    input.valor,
                )
                .await?;
        }

        let conta = self
            .contas
            .create(
                &mut *tx,
                empresa_id,
                &NovaConta {
                    descricao: input.descricao.clone(),
                    valor: input.valor,
                    data_vencimento: input.data_vencimento,
                    pago: input.pago,
                    data_pagamento: input
                        .pago
                        .then(|| input.data_pagamento.unwrap_or(input.data_vencimento)),
                    valor_pago: input.pago.then_some(input.valor),
                    status: if input.pago { StatusConta::Pago } else { StatusConta::Pendente },
                    numero_parcela: None,
                    total_parcelas: None,
                    grupo_parcelamento_id: None,
                    valor_total: None,
                    tipo_parcelamento: None,
                    is_conta_macro: false,
                    parent_id: None,
                    codigo_tipo: input.codigo_tipo.clone(),
                    beneficiario: input.beneficiario.clone(),
                    categoria: input.categoria.clone(),
                    subcategoria: input.subcategoria.clone(),
                    cartao_id: input.cartao_id,
                    conta_bancaria: input.conta_bancaria.clone(),
                    socio_responsavel_id: socio_id,
                },
            )
            .await?;

        if conta.pago {
            self.fluxo.registrar_pagamento(&mut tx, &conta).await?;
            if let Some(centro) = &centro {
                self.centros
                    .incrementar_com_ancestrais(
                        &mut tx,
                        empresa_id,
                        centro.id,
                        campo_agregado(centro, false),
                        input.valor,
                    )
                    .await?;
            }
        }

        tx.commit().await?;

        if let Some(cartao_id) = input.cartao_id {
            nao_critico(
                "recálculo de fatura",
                self.faturas
                    .recalcular_fatura(empresa_id, cartao_id, input.data_vencimento),
            )
            .await;
        }
        if let Some(socio) = socio_id {
            nao_critico(
                "recálculo de pró-labore",
                self.prolabore.recalcular(empresa_id, socio),
            )
            .await;
        }

        Ok(conta)
    }

    // =========================================================================
    //  EDIÇÃO
    // =========================================================================

    /// Aplica uma edição a um grupo, identificado pelo id do grupo (uuid) ou
    /// pelo id numérico de qualquer conta do grupo. Os passos rodam em ordem
    /// fixa; a lista explícita de parcelas, quando presente, é a fonte de
    /// verdade do conjunto final e suprime a mudança de quantidade.
    pub async fn editar_parcelamento(
        &self,
        empresa_id: Uuid,
        usuario_id: Uuid,
        identificador: &str,
        pedido: &EdicaoParcelamento,
    ) -> Result<ResultadoEdicao, AppError> {
        let mut tx = self.pool.begin().await?;

        let grupo = self.resolver_grupo(&mut tx, empresa_id, identificador).await?;

        // Serializa edições concorrentes do mesmo grupo.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(grupo.to_string())
            .execute(&mut *tx)
            .await?;

        let (conta_macro, mut filhas) = self.carregar_grupo(&mut tx, empresa_id, grupo).await?;

        // Passo 1: retrato e classificação antes de qualquer mutação.
        let retrato = montar_snapshot(&filhas, conta_macro.as_ref());
        let alteracao = detectar_tipo_alteracao(&retrato, pedido);
        let valor_total_anterior = retrato.valor_total;
        let quantidade_anterior = filhas.len();

        let mut faturas_marcadas: HashSet<(Uuid, NaiveDate)> = HashSet::new();
        let mut socio_envolvido: Option<Uuid> =
            filhas.iter().find_map(|f| f.socio_responsavel_id);
        let mut houve_estorno = false;
        let mut modificadas = 0usize;
        let mut criadas = 0usize;
        let mut removidas = 0usize;

        // Passo 2: redistribuição por novo valor total.
        if let Some(novo_total) = pedido.valor_total {
            if !filhas.is_empty() && (novo_total - soma_valores(&filhas)).abs() > TOLERANCIA {
                let valores = dividir_valor(novo_total, filhas.len());
                for (filha, valor) in filhas.iter().zip(&valores) {
                    if *valor != filha.valor {
                        self.contas.update_valor(&mut *tx, filha.id, *valor).await?;
                        modificadas += 1;
                        if let Some(cartao) = filha.cartao_id {
                            faturas_marcadas.insert((cartao, filha.data_vencimento));
                        }
                    }
                }
                if let Some(conta_macro) = &conta_macro {
                    self.contas
                        .update_macro_totais(&mut *tx, conta_macro.id, novo_total, filhas.len() as i32)
                        .await?;
                }
                filhas = self.recarregar_filhas(&mut tx, empresa_id, grupo).await?;
            }
        }

        // Passo 3: mudança de quantidade. A lista explícita de parcelas tem
        // precedência e já carrega a contagem implícita.
        if pedido.parcelas_atualizadas.is_none() {
            if let Some(nova_quantidade) = pedido.quantidade_solicitada() {
                let nova_quantidade = nova_quantidade.max(0) as usize;
                if nova_quantidade > 0 && nova_quantidade != filhas.len() {
                    let total_apos = if nova_quantidade > filhas.len() {
                        self.crescer_plano(
                            &mut tx,
                            empresa_id,
                            grupo,
                            conta_macro.as_ref(),
                            &filhas,
                            nova_quantidade,
                            pedido,
                            &mut faturas_marcadas,
                            &mut modificadas,
                            &mut criadas,
                        )
                        .await?
                    } else {
                        self.encolher_plano(
                            &mut tx,
                            empresa_id,
                            &filhas,
                            nova_quantidade,
                            &mut faturas_marcadas,
                            &mut houve_estorno,
                            &mut modificadas,
                            &mut removidas,
                        )
                        .await?
                    };

                    if let Some(conta_macro) = &conta_macro {
                        self.contas
                            .update_macro_totais(
                                &mut *tx,
                                conta_macro.id,
                                total_apos,
                                nova_quantidade as i32,
                            )
                            .await?;
                    }
                    filhas = self.recarregar_filhas(&mut tx, empresa_id, grupo).await?;
                }
            }
        }

        // Passo 4: difusão dos campos compartilhados para o grupo inteiro.
        let mut socio_difusao = pedido.socio_responsavel_id;
        if socio_difusao.is_none() {
            if let Some(codigo) = pedido.codigo_tipo.as_deref() {
                socio_difusao = self
                    .centros
                    .find_by_sigla(&mut *tx, empresa_id, codigo)
                    .await?
                    .filter(|c| c.is_socio)
                    .map(|c| c.id);
            }
        }
        if pedido.descricao.is_some()
            || pedido.beneficiario.is_some()
            || pedido.codigo_tipo.is_some()
            || socio_difusao.is_some()
        {
            self.contas
                .broadcast_campos(
                    &mut *tx,
                    empresa_id,
                    grupo,
                    pedido.descricao.as_deref(),
                    pedido.beneficiario.as_deref(),
                    pedido.codigo_tipo.as_deref(),
                    socio_difusao,
                )
                .await?;
            if socio_difusao.is_some() {
                socio_envolvido = socio_difusao;
            }
        }

        // Passo 5: lista explícita de parcelas — fonte de verdade do conjunto
        // final onde houver sobreposição com os passos anteriores.
        if let Some(lista) = pedido.parcelas_atualizadas.as_deref() {
            if !lista.is_empty() {
                filhas = self.recarregar_filhas(&mut tx, empresa_id, grupo).await?;
                self.aplicar_lista(
                    &mut tx,
                    empresa_id,
                    grupo,
                    conta_macro.as_ref(),
                    &filhas,
                    lista,
                    pedido,
                    &mut faturas_marcadas,
                    &mut socio_envolvido,
                    &mut houve_estorno,
                    &mut modificadas,
                    &mut criadas,
                    &mut removidas,
                )
                .await?;
            }
        }

        // Passo 6: renumeração contígua por vencimento.
        let filhas = self.recarregar_filhas(&mut tx, empresa_id, grupo).await?;
        let modo = pedido
            .tipo_parcelamento
            .or(conta_macro.as_ref().and_then(|m| m.tipo_parcelamento))
            .or(filhas.first().and_then(|f| f.tipo_parcelamento));
        let preservar_inicio = matches!(modo, Some(TipoParcelamento::ValorParcela));
        let inicio = inicio_numeracao(preservar_inicio, filhas.first());
        let total_final = filhas.len() as i32;
        for (filha, numero) in filhas.iter().zip(numerar(inicio, total_final)) {
            if filha.numero_parcela.as_deref() != Some(numero.as_str())
                || filha.total_parcelas != Some(total_final)
            {
                self.contas
                    .update_numeracao(&mut *tx, filha.id, &numero, total_final)
                    .await?;
            }
        }

        // Passo 7: sincronização final do agregado e delta no centro de custo.
        let valor_total_final = soma_valores(&filhas);
        if let Some(conta_macro) = &conta_macro {
            self.contas
                .update_macro_totais(&mut *tx, conta_macro.id, valor_total_final, total_final)
                .await?;
        }

        let delta = valor_total_final - valor_total_anterior;
        if delta != Decimal::ZERO {
            let codigo = pedido
                .codigo_tipo
                .clone()
                .or_else(|| conta_macro.as_ref().and_then(|m| m.codigo_tipo.clone()))
                .or_else(|| filhas.first().and_then(|f| f.codigo_tipo.clone()));
            if let Some(codigo) = codigo {
                if let Some(centro) =
                    self.centros.find_by_sigla(&mut *tx, empresa_id, &codigo).await?
                {
                    self.centros
                        .incrementar_com_ancestrais(
                            &mut tx,
                            empresa_id,
                            centro.id,
                            campo_agregado(&centro, true),
                            delta,
                        )
                        .await?;
                }
            }
        }

        tx.commit().await?;

        tracing::info!(
            "Parcelamento {grupo} editado: {modificadas} modificada(s), {criadas} criada(s), {removidas} removida(s)"
        );

        // Passo 8: efeitos derivados, todos não críticos.
        for (cartao, data) in &faturas_marcadas {
            nao_critico(
                "recálculo de fatura",
                self.faturas.recalcular_fatura(empresa_id, *cartao, *data),
            )
            .await;
        }
        if let Some(socio) = socio_envolvido {
            nao_critico(
                "recálculo de pró-labore",
                self.prolabore.recalcular(empresa_id, socio),
            )
            .await;
        }
        if houve_estorno {
            nao_critico("recálculo de saldos", self.fluxo.recalcular_saldos(empresa_id)).await;
        }
        if let Some(alteracao) = alteracao {
            nao_critico("gravação de histórico", async {
                let snapshot_json = serde_json::to_value(&retrato)
                    .map_err(|e| AppError::InternalServerError(e.into()))?;
                self.historico
                    .create(
                        &self.pool,
                        empresa_id,
                        grupo,
                        conta_macro.as_ref().map(|m| m.id),
                        alteracao.tipo,
                        &alteracao.descricao,
                        snapshot_json,
                        valor_total_anterior,
                        valor_total_final,
                        quantidade_anterior as i32,
                        total_final,
                        usuario_id,
                    )
                    .await
            })
            .await;
        }

        Ok(ResultadoEdicao {
            grupo_parcelamento_id: grupo,
            conta_macro_id: conta_macro.as_ref().map(|m| m.id),
            parcelas_modificadas: modificadas,
            parcelas_criadas: criadas,
            parcelas_removidas: removidas,
            valor_total: valor_total_final,
            total_parcelas: total_final,
        })
    }

    // =========================================================================
    //  EXCLUSÃO
    // =========================================================================

    /// Remove o grupo inteiro: cada parcela (desvinculando lançamentos das
    /// pagas e revertendo os agregados do centro de custo) e por fim a macro.
    pub async fn excluir_parcelamento(
        &self,
        empresa_id: Uuid,
        identificador: &str,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let grupo = self.resolver_grupo(&mut tx, empresa_id, identificador).await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(grupo.to_string())
            .execute(&mut *tx)
            .await?;

        let (conta_macro, filhas) = self.carregar_grupo(&mut tx, empresa_id, grupo).await?;

        let total_grupo = soma_valores(&filhas);
        let total_pago: Decimal = filhas
            .iter()
            .filter(|f| f.pago)
            .map(|f| f.valor_pago.unwrap_or(f.valor))
            .sum();
        let codigo = conta_macro
            .as_ref()
            .and_then(|m| m.codigo_tipo.clone())
            .or_else(|| filhas.first().and_then(|f| f.codigo_tipo.clone()));
        let socio = filhas.iter().find_map(|f| f.socio_responsavel_id);

        let mut houve_pagamento = false;
        for filha in &filhas {
            let desvinculados = self.fluxo.desvincular_conta(&mut tx, empresa_id, filha.id).await?;
            if filha.pago || desvinculados > 0 {
                houve_pagamento = true;
            }
            self.contas.delete(&mut *tx, filha.id).await?;
        }

        if let Some(codigo) = codigo {
            if let Some(centro) = self.centros.find_by_sigla(&mut *tx, empresa_id, &codigo).await? {
                self.centros
                    .incrementar_com_ancestrais(
                        &mut tx,
                        empresa_id,
                        centro.id,
                        campo_agregado(&centro, true),
                        -total_grupo,
                    )
                    .await?;
                if total_pago > Decimal::ZERO {
                    self.centros
                        .incrementar_com_ancestrais(
                            &mut tx,
                            empresa_id,
                            centro.id,
                            campo_agregado(&centro, false),
                            -total_pago,
                        )
                        .await?;
                }
            }
        }

        if let Some(conta_macro) = &conta_macro {
            self.contas.delete(&mut *tx, conta_macro.id).await?;
        }

        tx.commit().await?;

        tracing::info!("Parcelamento {grupo} excluído ({} parcela(s))", filhas.len());

        if let Some(socio) = socio {
            nao_critico(
                "recálculo de pró-labore",
                self.prolabore.recalcular(empresa_id, socio),
            )
            .await;
        }
        if houve_pagamento {
            nao_critico("recálculo de saldos", self.fluxo.recalcular_saldos(empresa_id)).await;
        }

        Ok(())
    }

    // =========================================================================
    //  APOIO INTERNO
    // =========================================================================

    /// Aceita o id do grupo (uuid) ou o id numérico de uma conta do grupo
    /// (macro ou parcela).
    async fn resolver_grupo(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        identificador: &str,
    ) -> Result<Uuid, AppError> {
        if let Ok(grupo) = identificador.parse::<Uuid>() {
            return Ok(grupo);
        }

        if let Ok(id) = identificador.parse::<i64>() {
            if let Some(conta) = self.contas.find_by_id(&mut *conn, empresa_id, id).await? {
                if let Some(grupo) = conta.grupo_parcelamento_id {
                    return Ok(grupo);
                }
            }
        }

        Err(AppError::ParcelamentoNaoEncontrado)
    }

    async fn carregar_grupo(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        grupo: Uuid,
    ) -> Result<(Option<Conta>, Vec<Conta>), AppError> {
        let registros = self.contas.find_grupo(&mut *conn, empresa_id, grupo).await?;
        if registros.is_empty() {
            return Err(AppError::ParcelamentoNaoEncontrado);
        }

        let (macros, filhas): (Vec<Conta>, Vec<Conta>) =
            registros.into_iter().partition(|c| c.is_conta_macro);

        Ok((macros.into_iter().next(), filhas))
    }

    async fn recarregar_filhas(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        grupo: Uuid,
    ) -> Result<Vec<Conta>, AppError> {
        let (_, filhas) = self.carregar_grupo(conn, empresa_id, grupo).await?;
        Ok(filhas)
    }

    /// Crescimento do plano: redistribui o total atual pela nova contagem e
    /// anexa parcelas com vencimentos mensais a partir da última existente,
    /// herdando os campos compartilhados. Devolve o total (preservado).
    #[allow(clippy::too_many_arguments)]
    async fn crescer_plano(
        &self,
        tx: &mut PgConnection,
        empresa_id: Uuid,
        grupo: Uuid,
        conta_macro: Option<&Conta>,
        filhas: &[Conta],
        nova_quantidade: usize,
        pedido: &EdicaoParcelamento,
        faturas_marcadas: &mut HashSet<(Uuid, NaiveDate)>,
        modificadas: &mut usize,
        criadas: &mut usize,
    ) -> Result<Decimal, AppError> {
        let total = soma_valores(filhas);
        let valores = dividir_valor(total, nova_quantidade);

        for (filha, valor) in filhas.iter().zip(&valores) {
            if *valor != filha.valor {
                self.contas.update_valor(&mut *tx, filha.id, *valor).await?;
                *modificadas += 1;
                if let Some(cartao) = filha.cartao_id {
                    faturas_marcadas.insert((cartao, filha.data_vencimento));
                }
            }
        }

        let modelo = filhas.first().or(conta_macro);
        let base = filhas
            .last()
            .or(conta_macro)
            .map(|c| c.data_vencimento)
            .unwrap_or_default();

        for indice in filhas.len()..nova_quantidade {
            let vencimento = data_apos_meses(base, (indice - filhas.len() + 1) as u32);
            let nova = NovaConta {
                descricao: pedido
                    .descricao
                    .clone()
                    .or_else(|| modelo.map(|m| m.descricao.clone()))
                    .unwrap_or_default(),
                valor: valores[indice],
                data_vencimento: vencimento,
                pago: false,
                data_pagamento: None,
                valor_pago: None,
                status: StatusConta::Pendente,
                numero_parcela: None,
                total_parcelas: None,
                grupo_parcelamento_id: Some(grupo),
                valor_total: None,
                tipo_parcelamento: modelo.and_then(|m| m.tipo_parcelamento),
                is_conta_macro: false,
                parent_id: conta_macro
                    .map(|m| m.id)
                    .or_else(|| filhas.first().and_then(|f| f.parent_id)),
                codigo_tipo: pedido
                    .codigo_tipo
                    .clone()
                    .or_else(|| modelo.and_then(|m| m.codigo_tipo.clone())),
                beneficiario: pedido
                    .beneficiario
                    .clone()
                    .or_else(|| modelo.and_then(|m| m.beneficiario.clone())),
                categoria: modelo.and_then(|m| m.categoria.clone()),
                subcategoria: modelo.and_then(|m| m.subcategoria.clone()),
                cartao_id: modelo.and_then(|m| m.cartao_id),
                conta_bancaria: modelo.and_then(|m| m.conta_bancaria.clone()),
                socio_responsavel_id: pedido
                    .socio_responsavel_id
                    .or_else(|| modelo.and_then(|m| m.socio_responsavel_id)),
            };

            let parcela = self.contas.create(&mut *tx, empresa_id, &nova).await?;
            *criadas += 1;
            if let Some(cartao) = parcela.cartao_id {
                faturas_marcadas.insert((cartao, parcela.data_vencimento));
            }
        }

        Ok(total)
    }

    /// Redução do plano: remove apenas pendentes, das mais tardias para trás;
    /// qualquer insuficiência rejeita a edição inteira antes de mutar. Devolve
    /// o total remanescente, redistribuído pelas sobreviventes.
    #[allow(clippy::too_many_arguments)]
    async fn encolher_plano(
        &self,
        tx: &mut PgConnection,
        empresa_id: Uuid,
        filhas: &[Conta],
        nova_quantidade: usize,
        faturas_marcadas: &mut HashSet<(Uuid, NaiveDate)>,
        houve_estorno: &mut bool,
        modificadas: &mut usize,
        removidas: &mut usize,
    ) -> Result<Decimal, AppError> {
        let remover = filhas.len() - nova_quantidade;
        let ids_remocao = selecionar_remocao(filhas, remover)
            .map_err(|parcelas_pagas| AppError::ReducaoBloqueada { parcelas_pagas })?;
        let ids_remocao: HashSet<i64> = ids_remocao.into_iter().collect();

        let mut total_removido = Decimal::ZERO;
        for filha in filhas.iter().filter(|f| ids_remocao.contains(&f.id)) {
            let desvinculados = self.fluxo.desvincular_conta(&mut *tx, empresa_id, filha.id).await?;
            if desvinculados > 0 {
                *houve_estorno = true;
            }
            self.contas.delete(&mut *tx, filha.id).await?;
            total_removido += filha.valor;
            *removidas += 1;
            if let Some(cartao) = filha.cartao_id {
                faturas_marcadas.insert((cartao, filha.data_vencimento));
            }
        }

        let sobreviventes: Vec<&Conta> =
            filhas.iter().filter(|f| !ids_remocao.contains(&f.id)).collect();
        let total_restante = soma_valores(filhas) - total_removido;
        let valores = dividir_valor(total_restante, sobreviventes.len());

        for (filha, valor) in sobreviventes.iter().zip(&valores) {
            if *valor != filha.valor {
                self.contas.update_valor(&mut *tx, filha.id, *valor).await?;
                *modificadas += 1;
                if let Some(cartao) = filha.cartao_id {
                    faturas_marcadas.insert((cartao, filha.data_vencimento));
                }
            }
        }

        Ok(total_restante)
    }

    /// Aplica a lista explícita de parcelas: atualiza as existentes, cria as
    /// sem id e remove as ausentes.
    #[allow(clippy::too_many_arguments)]
    async fn aplicar_lista(
        &self,
        tx: &mut PgConnection,
        empresa_id: Uuid,
        grupo: Uuid,
        conta_macro: Option<&Conta>,
        filhas: &[Conta],
        lista: &[crate::models::conta::ParcelaAtualizada],
        pedido: &EdicaoParcelamento,
        faturas_marcadas: &mut HashSet<(Uuid, NaiveDate)>,
        socio_envolvido: &mut Option<Uuid>,
        houve_estorno: &mut bool,
        modificadas: &mut usize,
        criadas: &mut usize,
        removidas: &mut usize,
    ) -> Result<(), AppError> {
        let ids_informados: HashSet<i64> =
            lista.iter().filter_map(|e| e.id.filter(|id| *id > 0)).collect();

        for entrada in lista {
            let existente = entrada
                .id
                .filter(|id| *id > 0)
                .and_then(|id| filhas.iter().find(|f| f.id == id));

            match existente {
                Some(filha) => {
                    let status = entrada
                        .status
                        .unwrap_or(if entrada.pago { StatusConta::Pago } else { StatusConta::Pendente });
                    let data_pagamento = entrada.pago.then(|| {
                        entrada
                            .data_pagamento
                            .or(filha.data_pagamento)
                            .unwrap_or(entrada.data_vencimento)
                    });

                    let mudou_status = filha.pago != entrada.pago;
                    let mudou_valor = (entrada.valor - filha.valor).abs() > TOLERANCIA;
                    let mudou_vencimento = entrada.data_vencimento != filha.data_vencimento;

                    self.contas
                        .update_parcela(
                            &mut *tx,
                            filha.id,
                            entrada.valor,
                            entrada.data_vencimento,
                            entrada.pago,
                            data_pagamento,
                            status,
                        )
                        .await?;

                    if mudou_status || mudou_valor || mudou_vencimento || status != filha.status {
                        *modificadas += 1;
                    }

                    if mudou_status {
                        if entrada.pago {
                            let paga = Conta {
                                valor: entrada.valor,
                                data_vencimento: entrada.data_vencimento,
                                pago: true,
                                data_pagamento,
                                valor_pago: Some(entrada.valor),
                                status,
                                ..filha.clone()
                            };
                            self.fluxo.registrar_pagamento(&mut *tx, &paga).await?;
                            self.aplicar_realizado(
                                &mut *tx,
                                empresa_id,
                                filha.codigo_tipo.as_deref(),
                                entrada.valor,
                            )
                            .await?;
                        } else {
                            let desvinculados =
                                self.fluxo.desvincular_conta(&mut *tx, empresa_id, filha.id).await?;
                            if desvinculados > 0 {
                                *houve_estorno = true;
                            }
                            self.aplicar_realizado(
                                &mut *tx,
                                empresa_id,
                                filha.codigo_tipo.as_deref(),
                                -filha.valor_pago.unwrap_or(filha.valor),
                            )
                            .await?;
                        }
                    }

                    if mudou_valor || mudou_vencimento {
                        if let Some(cartao) = filha.cartao_id {
                            faturas_marcadas.insert((cartao, filha.data_vencimento));
                            faturas_marcadas.insert((cartao, entrada.data_vencimento));
                        }
                    }
                }
                None => {
                    let modelo = filhas.first().or(conta_macro);
                    let status = entrada
                        .status
                        .unwrap_or(if entrada.pago { StatusConta::Pago } else { StatusConta::Pendente });
                    let data_pagamento = entrada
                        .pago
                        .then(|| entrada.data_pagamento.unwrap_or(entrada.data_vencimento));

                    let nova = NovaConta {
                        descricao: pedido
                            .descricao
                            .clone()
                            .or_else(|| modelo.map(|m| m.descricao.clone()))
                            .unwrap_or_default(),
                        valor: entrada.valor,
                        data_vencimento: entrada.data_vencimento,
                        pago: entrada.pago,
                        data_pagamento,
                        valor_pago: entrada.pago.then_some(entrada.valor),
                        status,
                        numero_parcela: None,
                        total_parcelas: None,
                        grupo_parcelamento_id: Some(grupo),
                        valor_total: None,
                        tipo_parcelamento: modelo.and_then(|m| m.tipo_parcelamento),
                        is_conta_macro: false,
                        parent_id: conta_macro
                            .map(|m| m.id)
                            .or_else(|| filhas.first().and_then(|f| f.parent_id)),
                        codigo_tipo: pedido
                            .codigo_tipo
                            .clone()
                            .or_else(|| modelo.and_then(|m| m.codigo_tipo.clone())),
                        beneficiario: pedido
                            .beneficiario
                            .clone()
                            .or_else(|| modelo.and_then(|m| m.beneficiario.clone())),
                        categoria: modelo.and_then(|m| m.categoria.clone()),
                        subcategoria: modelo.and_then(|m| m.subcategoria.clone()),
                        cartao_id: modelo.and_then(|m| m.cartao_id),
                        conta_bancaria: modelo.and_then(|m| m.conta_bancaria.clone()),
                        socio_responsavel_id: pedido
                            .socio_responsavel_id
                            .or_else(|| modelo.and_then(|m| m.socio_responsavel_id)),
                    };

                    let parcela = self.contas.create(&mut *tx, empresa_id, &nova).await?;
                    *criadas += 1;

                    if parcela.pago {
                        self.fluxo.registrar_pagamento(&mut *tx, &parcela).await?;
                        self.aplicar_realizado(
                            &mut *tx,
                            empresa_id,
                            parcela.codigo_tipo.as_deref(),
                            parcela.valor,
                        )
                        .await?;
                    }
                    if let Some(cartao) = parcela.cartao_id {
                        faturas_marcadas.insert((cartao, parcela.data_vencimento));
                    }
                    if let Some(socio) = parcela.socio_responsavel_id {
                        socio_envolvido.get_or_insert(socio);
                    }
                }
            }
        }

        // Parcelas atuais ausentes da lista são removidas, desvinculando o
        // fluxo antes.
        for filha in filhas.iter().filter(|f| !ids_informados.contains(&f.id)) {
            let desvinculados = self.fluxo.desvincular_conta(&mut *tx, empresa_id, filha.id).await?;
            if filha.pago || desvinculados > 0 {
                *houve_estorno = true;
                self.aplicar_realizado(
                    &mut *tx,
                    empresa_id,
                    filha.codigo_tipo.as_deref(),
                    -filha.valor_pago.unwrap_or(filha.valor),
                )
                .await?;
            }
            self.contas.delete(&mut *tx, filha.id).await?;
            *removidas += 1;
            if let Some(cartao) = filha.cartao_id {
                faturas_marcadas.insert((cartao, filha.data_vencimento));
            }
        }

        Ok(())
    }

    /// Aplica um delta de realizado (ou desconto real, para centro de sócio)
    /// ao centro de custo do código dado, com propagação aos ancestrais.
    async fn aplicar_realizado(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        codigo: Option<&str>,
        delta: Decimal,
    ) -> Result<(), AppError> {
        let Some(codigo) = codigo else { return Ok(()) };
        if let Some(centro) = self.centros.find_by_sigla(&mut *conn, empresa_id, codigo).await? {
            self.centros
                .incrementar_com_ancestrais(
                    conn,
                    empresa_id,
                    centro.id,
                    campo_agregado(&centro, false),
                    delta,
                )
                .await?;
        }
        Ok(())
    }
}

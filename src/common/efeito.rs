// src/common/efeito.rs

use std::future::Future;

use crate::common::error::AppError;

/// Executa um efeito colateral não crítico: gravação de histórico, recálculo
/// de fatura, recálculo de pró-labore, recálculo de saldos. Falha vira um
/// `warn!` e nunca se propaga — a mutação principal já foi confirmada e não
/// pode ser desfeita por manutenção derivada.
pub async fn nao_critico<T, F>(contexto: &str, fut: F)
where
    F: Future<Output = Result<T, AppError>>,
{
    if let Err(e) = fut.await {
        tracing::warn!("Efeito não crítico falhou ({contexto}): {e}");
    }
}

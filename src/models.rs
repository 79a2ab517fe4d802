pub mod auth;
pub mod cartao;
pub mod centro_custo;
pub mod conta;
pub mod empresa;
pub mod fluxo_caixa;
pub mod historico;

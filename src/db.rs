pub mod user_repo;
pub use user_repo::UserRepository;
pub mod empresa_repo;
pub use empresa_repo::EmpresaRepository;
pub mod conta_repo;
pub use conta_repo::ContaRepository;
pub mod centro_custo_repo;
pub use centro_custo_repo::CentroCustoRepository;
pub mod fluxo_caixa_repo;
pub use fluxo_caixa_repo::FluxoCaixaRepository;
pub mod historico_repo;
pub use historico_repo::HistoricoRepository;
pub mod cartao_repo;
pub use cartao_repo::CartaoRepository;

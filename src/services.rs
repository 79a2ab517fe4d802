pub mod auth;
pub use auth::AuthService;
pub mod parcelas;
pub mod snapshot;
pub mod parcelamento_service;
pub use parcelamento_service::ParcelamentoService;
pub mod fatura_service;
pub use fatura_service::FaturaService;
pub mod prolabore_service;
pub use prolabore_service::ProLaboreService;
pub mod fluxo_caixa_service;
pub use fluxo_caixa_service::FluxoCaixaService;

pub mod auth;
pub mod centros_custo;
pub mod contas;
pub mod empresas;
pub mod parcelamentos;

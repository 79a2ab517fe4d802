pub mod efeito;
pub mod error;

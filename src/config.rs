// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{
        CartaoRepository, CentroCustoRepository, ContaRepository, EmpresaRepository,
        FluxoCaixaRepository, HistoricoRepository, UserRepository,
    },
    services::{
        AuthService, FaturaService, FluxoCaixaService, ParcelamentoService, ProLaboreService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub auth_service: AuthService,
    pub empresa_repo: EmpresaRepository,
    pub conta_repo: ContaRepository,
    pub centro_custo_repo: CentroCustoRepository,
    pub historico_repo: HistoricoRepository,
    pub parcelamento_service: ParcelamentoService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let empresa_repo = EmpresaRepository::new(db_pool.clone());
        let conta_repo = ContaRepository::new(db_pool.clone());
        let centro_custo_repo = CentroCustoRepository::new(db_pool.clone());
        let fluxo_repo = FluxoCaixaRepository::new(db_pool.clone());
        let historico_repo = HistoricoRepository::new(db_pool.clone());
        let cartao_repo = CartaoRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, jwt_secret.clone(), db_pool.clone());
        let fluxo_service = FluxoCaixaService::new(db_pool.clone(), fluxo_repo.clone());
        let fatura_service =
            FaturaService::new(db_pool.clone(), cartao_repo, conta_repo.clone());
        let prolabore_service = ProLaboreService::new(
            db_pool.clone(),
            centro_custo_repo.clone(),
            conta_repo.clone(),
            fluxo_repo,
        );
        let parcelamento_service = ParcelamentoService::new(
            db_pool.clone(),
            conta_repo.clone(),
            centro_custo_repo.clone(),
            historico_repo.clone(),
            fluxo_service,
            fatura_service,
            prolabore_service,
        );

        Ok(Self {
            db_pool,
            jwt_secret,
            auth_service,
            empresa_repo,
            conta_repo,
            centro_custo_repo,
            historico_repo,
            parcelamento_service,
        })
    }
}

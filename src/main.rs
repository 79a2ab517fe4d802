// src/main.rs

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::{auth::auth_guard, empresa::empresa_guard};

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let empresa_routes = Router::new()
        .route(
            "/",
            post(handlers::empresas::criar_empresa).get(handlers::empresas::listar_empresas),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Rotas de negócio: exigem usuário autenticado E o cabeçalho X-Empresa-ID.
    // A última layer adicionada roda primeiro: auth_guard antes de empresa_guard.
    let financeiro_routes = Router::new()
        .route(
            "/contas",
            post(handlers::contas::criar_conta).get(handlers::contas::listar_contas),
        )
        .route(
            "/parcelamentos/{id}",
            put(handlers::parcelamentos::editar_parcelamento)
                .delete(handlers::parcelamentos::excluir_parcelamento),
        )
        .route(
            "/parcelamentos/{id}/historico",
            get(handlers::parcelamentos::historico_parcelamento),
        )
        .route(
            "/centros-custo",
            post(handlers::centros_custo::criar_centro_custo)
                .get(handlers::centros_custo::listar_centros_custo),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            empresa_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/empresas", empresa_routes)
        .nest("/api", financeiro_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}

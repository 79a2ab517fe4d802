// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Empresas ---
        handlers::empresas::criar_empresa,
        handlers::empresas::listar_empresas,

        // --- Contas ---
        handlers::contas::criar_conta,
        handlers::contas::listar_contas,

        // --- Parcelamentos ---
        handlers::parcelamentos::editar_parcelamento,
        handlers::parcelamentos::excluir_parcelamento,
        handlers::parcelamentos::historico_parcelamento,

        // --- Centros de custo ---
        handlers::centros_custo::criar_centro_custo,
        handlers::centros_custo::listar_centros_custo,
    ),
    components(schemas(
        models::auth::User,
        models::auth::RegisterUserPayload,
        models::auth::LoginUserPayload,
        models::auth::AuthResponse,
        models::empresa::Empresa,
        models::empresa::CriarEmpresaPayload,
        models::conta::Conta,
        models::conta::StatusConta,
        models::conta::TipoParcelamento,
        models::conta::NovoParcelamento,
        models::conta::NovaContaAvulsa,
        models::conta::ParcelaAtualizada,
        models::conta::EdicaoParcelamento,
        models::conta::ResultadoEdicao,
        models::conta::ParcelamentoCriado,
        models::centro_custo::CentroCusto,
        models::centro_custo::CriarCentroCustoPayload,
        models::fluxo_caixa::LancamentoFluxoCaixa,
        models::fluxo_caixa::TipoLancamento,
        models::historico::HistoricoParcelamento,
        models::historico::TipoAlteracao,
        models::historico::SnapshotParcelamento,
        models::historico::SnapshotParcela,
        models::cartao::CartaoCredito,
        models::cartao::FaturaCartao,
        handlers::contas::CriarContaPayload,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Autenticação e usuários"),
        (name = "empresas", description = "Empresas (tenants)"),
        (name = "contas", description = "Contas a pagar"),
        (name = "parcelamentos", description = "Grupos de parcelamento"),
        (name = "centros-custo", description = "Centros de custo"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

use frostline_core::models;
use frostline_cortex::{
    AnalystClient, CompletionClient, SearchClient, UreqTransport, WarehouseClient,
};
use frostline_session::Orchestrator;
use frostline_store::FrostlineConfig;

/// Build the authenticated transport from resolved config.
pub fn transport(config: &FrostlineConfig) -> anyhow::Result<UreqTransport> {
    let url = config.require_account_url()?;
    let token = config.require_token()?;
    tracing::debug!(account_url = url, token_type = %config.token_type, "connecting");
    Ok(UreqTransport::new(url, token, config.token_type.clone()))
}

/// The model a new session starts with: `--model` wins over config.
pub fn session_model(flag: Option<&str>, config: &FrostlineConfig) -> anyhow::Result<String> {
    Ok(match flag {
        Some(name) => models::validate_model(name)?,
        None => config.initial_model()?,
    })
}

/// All four service clients over one transport.
pub struct Clients<'a> {
    analyst: AnalystClient<'a>,
    search: SearchClient<'a>,
    completion: CompletionClient<'a>,
    warehouse: WarehouseClient<'a>,
}

impl<'a> Clients<'a> {
    pub fn new(http: &'a UreqTransport, config: &FrostlineConfig) -> Self {
        Self {
            analyst: AnalystClient::new(http),
            search: SearchClient::new(http),
            completion: CompletionClient::new(http),
            warehouse: WarehouseClient::new(http)
                .with_warehouse(config.warehouse.clone())
                .with_role(config.role.clone()),
        }
    }

    pub fn orchestrator(&self) -> Orchestrator<'_> {
        Orchestrator::new(
            &self.analyst,
            &self.search,
            &self.completion,
            &self.warehouse,
        )
    }
}

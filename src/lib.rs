pub mod config;
pub mod error;
pub mod models;
pub mod api;
pub mod seat_map;
pub mod selection;
pub mod forms;
pub mod session;
pub mod flow;
pub mod view;

use tracing::info;

// Общее состояние клиента на весь процесс
pub struct AppState {
    pub config: config::Config,
    pub api: api::HttpTicketingClient,
    pub session: session::SessionManager,
}

impl AppState {
    pub fn new(config: config::Config) -> error::Result<Self> {
        let api = api::HttpTicketingClient::from_config(&config.api, &config.circuit_breaker)?;
        info!("Booking API at {}", api.base_url());

        let store = session::FileSessionStore::new(config.session.storage_path.clone());
        let session = session::SessionManager::init(Box::new(store));

        Ok(Self { config, api, session })
    }
}

use crate::config::types::server::ServerConfig;

#[derive(Debug, Clone)]
pub struct ServerParams {
    pub host: String,
    pub port: u16,
    pub admin_enabled: bool,
}

impl From<&ServerConfig> for ServerParams {
    fn from(value: &ServerConfig) -> Self {
        Self { host: value.host.clone(), port: value.port, admin_enabled: value.admin_enabled }
    }
}

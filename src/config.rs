use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};
use tracing::warn;

const DEFAULT_DATA_PATH: &str = "data/checkin_data.json";
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_path: PathBuf,
    /// Shared secret for retroactive check-ins. `None` refuses every attempt.
    pub retroactive_password: Option<String>,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn new(data_path: impl Into<PathBuf>, retroactive_password: Option<String>) -> Self {
        Self {
            data_path: data_path.into(),
            retroactive_password,
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
        }
    }

    /// Reads `APP_DATA_PATH`, `APP_RETROACTIVE_PASSWORD`, `APP_BIND_ADDR` and `PORT`.
    pub fn from_env() -> Self {
        let data_path = env::var("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH));

        let retroactive_password = env::var("APP_RETROACTIVE_PASSWORD")
            .ok()
            .filter(|value| !value.is_empty());
        if retroactive_password.is_none() {
            warn!("APP_RETROACTIVE_PASSWORD is not set; retroactive check-ins are disabled");
        }

        let host = match env::var("APP_BIND_ADDR") {
            Ok(value) => value.parse::<IpAddr>().unwrap_or_else(|err| {
                warn!("invalid APP_BIND_ADDR {value:?} ({err}); using 0.0.0.0");
                IpAddr::V4(Ipv4Addr::UNSPECIFIED)
            }),
            Err(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            data_path,
            retroactive_password,
            bind_addr: SocketAddr::new(host, port),
        }
    }

    pub fn password_matches(&self, candidate: &str) -> bool {
        self.retroactive_password
            .as_deref()
            .is_some_and(|secret| secret == candidate)
    }
}

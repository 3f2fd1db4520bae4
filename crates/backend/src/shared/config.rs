use once_cell::sync::OnceCell;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// Legacy VertisConnect endpoint returning the NFe controle array.
    pub url: String,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
port = 3000

[upstream]
url = "http://177.11.209.38/vertis/VertisConnect.dll/api/V1.1/get_nfe_controle"
"#;

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Initialize the global config cell. Called once from `main`.
pub fn init() -> anyhow::Result<&'static Config> {
    let config = load_config()?;
    Ok(CONFIG.get_or_init(|| config))
}

/// Global config accessor. Falls back to the embedded default if `init`
/// was never called (unit tests).
pub fn get() -> &'static Config {
    CONFIG.get_or_init(|| toml::from_str(DEFAULT_CONFIG).expect("embedded default config is valid"))
}

use std::env;

const DEFAULT_WHATSAPP_PHONE: &str = "5544984292510";
const DEFAULT_WHATSAPP_MESSAGE: &str =
    "Hello! I would like to place an order or ask a question about the menu.";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub whatsapp_phone: String,
    pub whatsapp_message: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let whatsapp_phone =
            env::var("WHATSAPP_PHONE").unwrap_or_else(|_| DEFAULT_WHATSAPP_PHONE.to_string());
        let whatsapp_message =
            env::var("WHATSAPP_MESSAGE").unwrap_or_else(|_| DEFAULT_WHATSAPP_MESSAGE.to_string());
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            whatsapp_phone,
            whatsapp_message,
        })
    }

    /// Configuration for tests and tools that only need a database.
    pub fn for_database(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: "test-secret".to_string(),
            whatsapp_phone: DEFAULT_WHATSAPP_PHONE.to_string(),
            whatsapp_message: DEFAULT_WHATSAPP_MESSAGE.to_string(),
        }
    }
}

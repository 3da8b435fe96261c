use configkit::{Config, ConfigError, Configuration};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct DatabaseConfig;

impl Configuration for DatabaseConfig {
    fn additional_checks(data: &Value) -> Result<(), ConfigError> {
        if data.get("database").is_none() {
            return Err(ConfigError::semantic("'database' section is required"));
        }
        Ok(())
    }
}

trait DatabaseSettings {
    fn db_host(&self) -> Result<Value, ConfigError>;
    fn db_port(&self) -> Value;
}

impl DatabaseSettings for Config<DatabaseConfig> {
    fn db_host(&self) -> Result<Value, ConfigError> {
        self.get("database.host")
    }

    fn db_port(&self) -> Value {
        self.get_or("database.port", 5432)
    }
}

fn main() -> Result<(), configkit::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "configkit=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Config::<DatabaseConfig>::load("demos/config.json", "demos/schema.json")?;

    // Later lookups need no paths.
    let config = Config::<DatabaseConfig>::instance()?;

    println!("{}", config.db_host()?);
    println!("{}", config.db_port());

    Ok(())
}

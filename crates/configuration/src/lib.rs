use crate::error::ConfigError;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{Config, DatabaseSettings, LoggingSettings, RetentionSettings, SslMode};

/// Plain `DB_*` variables that older deployments set, and the keys they override.
const DATABASE_ENV_VARS: [(&str, &str); 6] = [
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_NAME", "database.name"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("DB_SSL_MODE", "database.ssl_mode"),
];

/// Loads the application configuration.
///
/// Sources, lowest precedence first: built-in defaults, an optional
/// `config.toml` (or `config.yaml`) in the working directory,
/// `TELEMONITOR__SECTION__KEY` environment variables, the plain `DB_HOST`,
/// `DB_PORT`, `DB_NAME`, `DB_USER`, `DB_PASSWORD` and `DB_SSL_MODE` variables,
/// and finally `DATABASE_URL`. A `.env` file is honoured.
pub fn load_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();

    let builder = config::Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("TELEMONITOR")
                .separator("__")
                .try_parsing(true),
        );

    finish(apply_env_overrides(builder, |var| std::env::var(var).ok())?)
}

/// Layers the `DB_*` variables and `DATABASE_URL` over everything else.
fn apply_env_overrides(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (var, key) in DATABASE_ENV_VARS {
        builder = builder.set_override_option(key, lookup(var))?;
    }
    Ok(builder.set_override_option("database.url", lookup("DATABASE_URL"))?)
}

/// Loads the configuration from an in-memory TOML document, without consulting
/// the environment.
pub fn load_config_from_str(toml: &str) -> Result<Config, ConfigError> {
    finish(config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.build()?.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}

pub mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        pub database_url: String,
        #[serde(default = "default_port")]
        pub port: u16,
    }

    impl Config {
        /// Loads configuration from environment variables.
        ///
        /// Fails when `DATABASE_URL` is missing or blank.
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_source(config::Environment::default())
        }

        /// Loads configuration from the given environment source.
        pub fn from_source(source: config::Environment) -> anyhow::Result<Self> {
            let settings = config::Config::builder().add_source(source).build()?;

            let config: Config = settings.try_deserialize()?;
            if config.database_url.trim().is_empty() {
                anyhow::bail!("DATABASE_URL is set but empty");
            }
            Ok(config)
        }
    }

    fn default_port() -> u16 {
        8080
    }

}

pub mod database;
pub mod task;
pub mod web;

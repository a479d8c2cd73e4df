pub mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        #[serde(default = "default_port")]
        pub port: u16,
        #[serde(default = "default_data_file")]
        pub data_file: String,
    }

    impl Config {
        /// Loads configuration from environment variables (`PORT`, `DATA_FILE`).
        pub fn from_env() -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(config::Environment::default())
                .build()?;
            Self::from_settings(settings)
        }

        fn from_settings(settings: config::Config) -> anyhow::Result<Self> {
            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }
    }

    fn default_port() -> u16 {
        3000
    }

    fn default_data_file() -> String {
        "data/todo-data.json".to_string()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn can_fall_back_to_defaults_when_nothing_is_set() {
            let settings = config::Config::builder().build().unwrap();
            let config = Config::from_settings(settings).unwrap();

            assert_eq!(config.port, 3000);
            assert_eq!(config.data_file, "data/todo-data.json");
        }

        #[test]
        fn can_override_port_and_data_file() {
            let settings = config::Config::builder()
                .set_override("port", 8081)
                .unwrap()
                .set_override("data_file", "/tmp/lists.json")
                .unwrap()
                .build()
                .unwrap();
            let config = Config::from_settings(settings).unwrap();

            assert_eq!(config.port, 8081);
            assert_eq!(config.data_file, "/tmp/lists.json");
        }
    }
}

pub mod store;
pub mod task_list;
pub mod web;

use ordinals::config::{
    first_inscription_height, jubilee_activation_height, Config, LogConfig, NetworkConfig,
    QueryConfig, ResourcesConfig, StorageConfig, DEFAULT_INGESTION_QUEUE_SIZE,
    DEFAULT_MAX_PAGE_LIMIT, DEFAULT_PAGE_LIMIT, DEFAULT_WORKING_DIR,
};
use ordinals::types::BitcoinNetwork;
use std::fs::File;
use std::io::{BufReader, Read};

#[derive(Deserialize, Debug, Clone)]
pub struct ConfigFile {
    pub storage: StorageConfigFile,
    pub network: NetworkConfigFile,
    pub query: Option<QueryConfigFile>,
    pub resources: Option<ResourcesConfigFile>,
    pub logs: Option<LogConfigFile>,
}

impl ConfigFile {
    pub fn from_file_path(file_path: &str) -> Result<Config, String> {
        let file = File::open(file_path)
            .map_err(|e| format!("unable to read file {}\n{:?}", file_path, e))?;
        let mut file_reader = BufReader::new(file);
        let mut file_buffer = vec![];
        file_reader
            .read_to_end(&mut file_buffer)
            .map_err(|e| format!("unable to read file {}\n{:?}", file_path, e))?;

        let config_file: ConfigFile = match toml::from_slice(&file_buffer) {
            Ok(s) => s,
            Err(e) => {
                return Err(format!("Config file malformatted {}", e));
            }
        };
        ConfigFile::from_config_file(config_file)
    }

    pub fn from_config_file(config_file: ConfigFile) -> Result<Config, String> {
        let bitcoin_network: BitcoinNetwork = config_file
            .network
            .mode
            .parse()
            .map_err(|_| "network.mode not supported".to_string())?;

        let query = config_file.query.unwrap_or_default();
        let default_page_limit = query.default_page_limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        let max_page_limit = query.max_page_limit.unwrap_or(DEFAULT_MAX_PAGE_LIMIT);
        if default_page_limit == 0 || default_page_limit > max_page_limit {
            return Err(format!(
                "query.default_page_limit must be within [1, {}]",
                max_page_limit
            ));
        }

        let config = Config {
            storage: StorageConfig {
                working_dir: Some(
                    config_file
                        .storage
                        .working_dir
                        .unwrap_or(DEFAULT_WORKING_DIR.into()),
                ),
            },
            network: NetworkConfig {
                jubilee_height: config_file
                    .network
                    .jubilee_height
                    .unwrap_or(jubilee_activation_height(&bitcoin_network)),
                first_inscription_height: config_file
                    .network
                    .first_inscription_height
                    .unwrap_or(first_inscription_height(&bitcoin_network)),
                bitcoin_network,
            },
            query: QueryConfig {
                default_page_limit,
                max_page_limit,
            },
            resources: ResourcesConfig {
                ingestion_queue_size: config_file
                    .resources
                    .and_then(|r| r.ingestion_queue_size)
                    .unwrap_or(DEFAULT_INGESTION_QUEUE_SIZE)
                    .max(1),
            },
            logs: LogConfig {
                ingestion_internals: config_file
                    .logs
                    .as_ref()
                    .and_then(|l| l.ingestion_internals)
                    .unwrap_or(true),
            },
        };
        Ok(config)
    }

    pub fn default(
        devnet: bool,
        testnet: bool,
        mainnet: bool,
        config_path: &Option<String>,
    ) -> Result<Config, String> {
        let config = match (devnet, testnet, mainnet, config_path) {
            (true, false, false, _) => Config::devnet_default(),
            (false, true, false, _) => Config::testnet_default(),
            (false, false, true, _) => Config::mainnet_default(),
            (false, false, false, Some(config_path)) => ConfigFile::from_file_path(config_path)?,
            _ => Err("Invalid combination of arguments".to_string())?,
        };
        Ok(config)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct StorageConfigFile {
    pub working_dir: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NetworkConfigFile {
    pub mode: String,
    pub jubilee_height: Option<u64>,
    pub first_inscription_height: Option<u64>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct QueryConfigFile {
    pub default_page_limit: Option<usize>,
    pub max_page_limit: Option<usize>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ResourcesConfigFile {
    pub ingestion_queue_size: Option<usize>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LogConfigFile {
    pub ingestion_internals: Option<bool>,
}

#[cfg(test)]
mod test {
    use ordinals::types::BitcoinNetwork;
    use test_case::test_case;

    use super::ConfigFile;
    use crate::config::generator::generate_config;

    fn parse(source: &str) -> Result<ordinals::config::Config, String> {
        let config_file: ConfigFile = toml::from_str(source).map_err(|e| e.to_string())?;
        ConfigFile::from_config_file(config_file)
    }

    #[test_case(BitcoinNetwork::Mainnet, 824544; "mainnet")]
    #[test_case(BitcoinNetwork::Testnet, 2544192; "testnet")]
    #[test_case(BitcoinNetwork::Regtest, 110; "regtest")]
    fn generated_config_is_loadable(network: BitcoinNetwork, jubilee_height: u64) {
        let config = parse(&generate_config(&network)).unwrap();
        assert_eq!(config.network.bitcoin_network, network);
        assert_eq!(config.network.jubilee_height, jubilee_height);
        assert_eq!(config.storage.working_dir.as_deref(), Some("ordinals"));
        assert_eq!(config.query.default_page_limit, 20);
        assert_eq!(config.query.max_page_limit, 60);
    }

    #[test]
    fn applies_overrides() {
        let config = parse(
            r#"
            [storage]
            working_dir = "/tmp/index"

            [network]
            mode = "devnet"
            jubilee_height = 5

            [query]
            max_page_limit = 100

            [logs]
            ingestion_internals = false
            "#,
        )
        .unwrap();
        assert_eq!(config.network.bitcoin_network, BitcoinNetwork::Regtest);
        assert_eq!(config.network.jubilee_height, 5);
        assert_eq!(config.network.first_inscription_height, 1);
        assert_eq!(config.query.max_page_limit, 100);
        assert!(!config.logs.ingestion_internals);
    }

    #[test_case("[storage]\n[network]\nmode = \"simnet\"\n"; "unknown network")]
    #[test_case("[storage]\n[network]\nmode = \"mainnet\"\n[query]\ndefault_page_limit = 80\n"; "default above max")]
    #[test_case("[network]\nmode = \"mainnet\"\n"; "missing storage")]
    fn rejects_invalid_files(source: &str) {
        assert!(parse(source).is_err());
    }

    #[test]
    fn rejects_conflicting_flags() {
        assert!(ConfigFile::default(true, false, true, &None).is_err());
        assert!(ConfigFile::default(false, false, false, &None).is_err());
    }
}

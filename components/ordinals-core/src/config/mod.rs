use crate::core::IndexingConfig;
use crate::types::BitcoinNetwork;
use std::path::PathBuf;

pub const DEFAULT_WORKING_DIR: &str = "ordinals";
pub const DEFAULT_PAGE_LIMIT: usize = 20;
pub const DEFAULT_MAX_PAGE_LIMIT: usize = 60;
pub const DEFAULT_INGESTION_QUEUE_SIZE: usize = 8;

#[derive(Clone, Debug)]
pub struct Config {
    pub storage: StorageConfig,
    pub network: NetworkConfig,
    pub query: QueryConfig,
    pub resources: ResourcesConfig,
    pub logs: LogConfig,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    /// `None` keeps the whole index in memory.
    pub working_dir: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NetworkConfig {
    pub bitcoin_network: BitcoinNetwork,
    pub jubilee_height: u64,
    pub first_inscription_height: u64,
}

#[derive(Clone, Debug)]
pub struct QueryConfig {
    pub default_page_limit: usize,
    pub max_page_limit: usize,
}

#[derive(Clone, Debug)]
pub struct ResourcesConfig {
    pub ingestion_queue_size: usize,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub ingestion_internals: bool,
}

pub fn jubilee_activation_height(network: &BitcoinNetwork) -> u64 {
    match network {
        BitcoinNetwork::Mainnet => 824544,
        BitcoinNetwork::Testnet => 2544192,
        BitcoinNetwork::Signet => 175392,
        BitcoinNetwork::Regtest => 110,
    }
}

pub fn first_inscription_height(network: &BitcoinNetwork) -> u64 {
    match network {
        BitcoinNetwork::Mainnet => 767430,
        BitcoinNetwork::Testnet => 2413343,
        BitcoinNetwork::Signet => 112402,
        BitcoinNetwork::Regtest => 1,
    }
}

impl Config {
    pub fn get_indexing_config(&self) -> IndexingConfig {
        IndexingConfig {
            jubilee_height: self.network.jubilee_height,
            first_inscription_height: self.network.first_inscription_height,
            logs: self.logs.clone(),
        }
    }

    pub fn expected_cache_path(&self) -> Option<PathBuf> {
        self.storage.working_dir.as_ref().map(|dir| {
            let mut destination_path = PathBuf::new();
            destination_path.push(dir);
            destination_path
        })
    }

    pub fn default_for_network(network: BitcoinNetwork) -> Config {
        Config {
            storage: StorageConfig {
                working_dir: Some(DEFAULT_WORKING_DIR.into()),
            },
            network: NetworkConfig {
                jubilee_height: jubilee_activation_height(&network),
                first_inscription_height: first_inscription_height(&network),
                bitcoin_network: network,
            },
            query: QueryConfig {
                default_page_limit: DEFAULT_PAGE_LIMIT,
                max_page_limit: DEFAULT_MAX_PAGE_LIMIT,
            },
            resources: ResourcesConfig {
                ingestion_queue_size: DEFAULT_INGESTION_QUEUE_SIZE,
            },
            logs: LogConfig {
                ingestion_internals: true,
            },
        }
    }

    pub fn devnet_default() -> Config {
        Config::default_for_network(BitcoinNetwork::Regtest)
    }

    pub fn testnet_default() -> Config {
        Config::default_for_network(BitcoinNetwork::Testnet)
    }

    pub fn mainnet_default() -> Config {
        Config::default_for_network(BitcoinNetwork::Mainnet)
    }

    /// Mainnet parameters over an in-memory store.
    pub fn test_default() -> Config {
        let mut config = Config::mainnet_default();
        config.storage.working_dir = None;
        config.logs.ingestion_internals = false;
        config
    }
}

#[cfg(test)]
mod test {
    use test_case::test_case;

    use super::{jubilee_activation_height, Config};
    use crate::types::BitcoinNetwork;

    #[test_case(BitcoinNetwork::Mainnet => 824544; "mainnet")]
    #[test_case(BitcoinNetwork::Testnet => 2544192; "testnet")]
    #[test_case(BitcoinNetwork::Signet => 175392; "signet")]
    #[test_case(BitcoinNetwork::Regtest => 110; "regtest")]
    fn jubilee_heights(network: BitcoinNetwork) -> u64 {
        jubilee_activation_height(&network)
    }

    #[test]
    fn test_default_is_in_memory() {
        let config = Config::test_default();
        assert!(config.expected_cache_path().is_none());
        assert_eq!(config.get_indexing_config().jubilee_height, 824544);
    }
}

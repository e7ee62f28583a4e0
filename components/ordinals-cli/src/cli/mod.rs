use crate::config::file::ConfigFile;
use crate::config::generator::generate_config;
use clap::{Parser, Subcommand};
use hiro_system_kit;
use ordinals::config::Config;
use ordinals::core::pipeline::processors::inscription_indexing::start_inscription_ingestion_processor;
use ordinals::db::locations::find_broken_location_chains;
use ordinals::db::open_readonly_ordinals_db_conn;
use ordinals::db::stats::find_inconsistent_accumulations;
use ordinals::initialize_db;
use ordinals::ord::rarity::Rarity;
use ordinals::query::inscriptions::{
    get_inscription, get_inscription_content, get_inscription_locations, list_inscriptions,
    InscriptionFilters,
};
use ordinals::query::stats::{get_indexed_chain_tip, inscription_stats};
use ordinals::query::transfers::get_transfers_per_block;
use ordinals::query::{InscriptionIdentifier, Order, OrderBy, Pagination};
use ordinals::rusqlite::Connection;
use ordinals::types::BitcoinInscriptionsPayload;
use ordinals::utils::Context;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Command {
    /// Generate a new configuration file
    #[clap(subcommand)]
    Config(ConfigCommand),
    /// Perform maintenance operations on the local index
    #[clap(subcommand)]
    Db(DbCommand),
    /// Query indexed inscriptions
    #[clap(subcommand)]
    Inscriptions(InscriptionsCommand),
    /// Query indexed blocks
    #[clap(subcommand)]
    Blocks(BlocksCommand),
    /// Inscription counts per block
    #[clap(name = "stats", bin_name = "stats")]
    Stats(StatsCommand),
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum ConfigCommand {
    /// Generate new config
    #[clap(name = "new", bin_name = "new", aliases = &["generate"])]
    New(NewConfig),
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct NewConfig {
    /// Target Regtest network
    #[clap(
        long = "regtest",
        conflicts_with = "testnet",
        conflicts_with = "mainnet"
    )]
    pub regtest: bool,
    /// Target Testnet network
    #[clap(
        long = "testnet",
        conflicts_with = "regtest",
        conflicts_with = "mainnet"
    )]
    pub testnet: bool,
    /// Target Mainnet network
    #[clap(
        long = "mainnet",
        conflicts_with = "testnet",
        conflicts_with = "regtest"
    )]
    pub mainnet: bool,
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct NetworkArgs {
    /// Target Regtest network
    #[clap(
        long = "regtest",
        conflicts_with = "testnet",
        conflicts_with = "mainnet"
    )]
    pub regtest: bool,
    /// Target Testnet network
    #[clap(
        long = "testnet",
        conflicts_with = "regtest",
        conflicts_with = "mainnet"
    )]
    pub testnet: bool,
    /// Target Mainnet network
    #[clap(
        long = "mainnet",
        conflicts_with = "testnet",
        conflicts_with = "regtest"
    )]
    pub mainnet: bool,
    /// Load config file path
    #[clap(
        long = "config-path",
        conflicts_with = "mainnet",
        conflicts_with = "testnet",
        conflicts_with = "regtest"
    )]
    pub config_path: Option<String>,
}

impl NetworkArgs {
    fn load_config(&self) -> Result<Config, String> {
        ConfigFile::default(self.regtest, self.testnet, self.mainnet, &self.config_path)
    }
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum DbCommand {
    /// Initialize a new index
    #[clap(name = "new", bin_name = "new")]
    New(DbNewCommand),
    /// Apply chain observer payloads, in the order given
    #[clap(name = "apply", bin_name = "apply")]
    Apply(DbApplyCommand),
    /// Check the integrity of the index
    #[clap(name = "check", bin_name = "check")]
    Check(DbCheckCommand),
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct DbNewCommand {
    #[clap(flatten)]
    pub network: NetworkArgs,
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct DbApplyCommand {
    /// Path to JSON payloads ({"apply": [..], "rollback": [..]})
    #[clap(required = true)]
    pub payload_paths: Vec<String>,
    #[clap(flatten)]
    pub network: NetworkArgs,
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct DbCheckCommand {
    #[clap(flatten)]
    pub network: NetworkArgs,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum InscriptionsCommand {
    /// Display an inscription
    #[clap(name = "show", bin_name = "show")]
    Show(InscriptionCommand),
    /// Display the location history of an inscription
    #[clap(name = "transfers", bin_name = "transfers")]
    Transfers(InscriptionTransfersCommand),
    /// Write the content of an inscription to a file
    #[clap(name = "content", bin_name = "content")]
    Content(InscriptionContentCommand),
    /// List inscriptions
    #[clap(name = "list", bin_name = "list")]
    List(ListInscriptionsCommand),
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct InscriptionCommand {
    /// Inscription id or number
    pub inscription: String,
    #[clap(flatten)]
    pub network: NetworkArgs,
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct InscriptionTransfersCommand {
    /// Inscription id or number
    pub inscription: String,
    #[clap(flatten)]
    pub page: PageArgs,
    #[clap(flatten)]
    pub network: NetworkArgs,
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct InscriptionContentCommand {
    /// Inscription id or number
    pub inscription: String,
    /// Destination file
    #[clap(long = "output")]
    pub output: String,
    #[clap(flatten)]
    pub network: NetworkArgs,
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct ListInscriptionsCommand {
    /// Current owner (repeatable)
    #[clap(long = "address")]
    pub address: Vec<String>,
    /// Mime type (repeatable)
    #[clap(long = "mime-type")]
    pub mime_type: Vec<String>,
    /// Sat rarity (repeatable)
    #[clap(long = "rarity")]
    pub rarity: Vec<String>,
    /// Only cursed, or only blessed, inscriptions
    #[clap(long = "cursed")]
    pub cursed: Option<bool>,
    /// Only recursive, or only non recursive, inscriptions
    #[clap(long = "recursive")]
    pub recursive: Option<bool>,
    /// genesis_block_height, number, ordinal or rarity
    #[clap(long = "order-by")]
    pub order_by: Option<String>,
    /// asc or desc
    #[clap(long = "order")]
    pub order: Option<String>,
    #[clap(flatten)]
    pub page: PageArgs,
    #[clap(flatten)]
    pub network: NetworkArgs,
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct PageArgs {
    #[clap(long = "offset")]
    pub offset: Option<usize>,
    #[clap(long = "limit")]
    pub limit: Option<usize>,
}

impl PageArgs {
    fn pagination(&self) -> Pagination {
        Pagination {
            offset: self.offset,
            limit: self.limit,
        }
    }
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum BlocksCommand {
    /// Inscriptions transferred in a block
    #[clap(name = "transfers", bin_name = "transfers")]
    Transfers(BlockTransfersCommand),
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct BlockTransfersCommand {
    pub block_height: u64,
    #[clap(flatten)]
    pub page: PageArgs,
    #[clap(flatten)]
    pub network: NetworkArgs,
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct StatsCommand {
    #[clap(long = "from-height")]
    pub from_height: Option<u64>,
    #[clap(long = "to-height")]
    pub to_height: Option<u64>,
    #[clap(flatten)]
    pub network: NetworkArgs,
}

pub fn main() {
    let logger = hiro_system_kit::log::setup_logger();
    let _guard = hiro_system_kit::log::setup_global_logger(logger.clone());
    let ctx = Context {
        logger: Some(logger),
        tracer: false,
    };

    let opts: Opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            println!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = handle_command(opts, &ctx) {
        error!(ctx.expect_logger(), "{e}");
        std::thread::sleep(std::time::Duration::from_millis(500));
        process::exit(1);
    }
}

fn handle_command(opts: Opts, ctx: &Context) -> Result<(), String> {
    match opts.command {
        Command::Config(subcmd) => match subcmd {
            ConfigCommand::New(cmd) => {
                let config = ConfigFile::default(cmd.regtest, cmd.testnet, cmd.mainnet, &None)?;
                let config_content = generate_config(&config.network.bitcoin_network);
                let mut file_path = PathBuf::new();
                file_path.push("Ordinals.toml");
                let mut file = File::create(&file_path)
                    .map_err(|e| format!("unable to open file {}\n{}", file_path.display(), e))?;
                file.write_all(config_content.as_bytes())
                    .map_err(|e| format!("unable to write file {}\n{}", file_path.display(), e))?;
                println!("Created file Ordinals.toml");
            }
        },
        Command::Db(DbCommand::New(cmd)) => {
            let config = cmd.network.load_config()?;
            initialize_db(&config, ctx).map_err(|e| e.to_string())?;
            info!(
                ctx.expect_logger(),
                "Index initialized in {}",
                config.storage.working_dir.unwrap_or_default()
            );
        }
        Command::Db(DbCommand::Apply(cmd)) => {
            let config = cmd.network.load_config()?;
            let mut payloads = vec![];
            for payload_path in cmd.payload_paths.iter() {
                payloads.push(load_payload(payload_path)?);
            }
            let controller =
                start_inscription_ingestion_processor(&config, ctx).map_err(|e| e.to_string())?;
            let mut result = Ok(());
            for (payload_path, payload) in cmd.payload_paths.iter().zip(payloads) {
                match controller.apply_payload(payload) {
                    Ok(report) => {
                        info!(ctx.expect_logger(), "Payload {payload_path} committed");
                        print_json(&report)?;
                    }
                    Err(e) => {
                        result = Err(format!("payload {payload_path} rejected: {e}"));
                        break;
                    }
                }
            }
            controller.terminate().map_err(|e| e.to_string())?;
            result?;
        }
        Command::Db(DbCommand::Check(cmd)) => {
            let config = cmd.network.load_config()?;
            let conn = open_readonly_db(&config, ctx)?;
            let broken_accumulations =
                find_inconsistent_accumulations(&conn).map_err(|e| e.to_string())?;
            let broken_chains = find_broken_location_chains(&conn).map_err(|e| e.to_string())?;
            for block_height in broken_accumulations.iter() {
                warn!(
                    ctx.expect_logger(),
                    "Block #{block_height}: inscription_count_accum is inconsistent"
                );
            }
            for inscription_id in broken_chains.iter() {
                warn!(
                    ctx.expect_logger(),
                    "Inscription {inscription_id}: location chain is broken"
                );
            }
            if !broken_accumulations.is_empty() || !broken_chains.is_empty() {
                return Err(format!(
                    "index is inconsistent ({} blocks, {} inscriptions)",
                    broken_accumulations.len(),
                    broken_chains.len()
                ));
            }
            match get_indexed_chain_tip(&conn).map_err(|e| e.to_string())? {
                Some(tip) => info!(
                    ctx.expect_logger(),
                    "Index is consistent up to block #{} ({})", tip.index, tip.hash
                ),
                None => info!(ctx.expect_logger(), "Index is empty"),
            }
        }
        Command::Inscriptions(InscriptionsCommand::Show(cmd)) => {
            let config = cmd.network.load_config()?;
            let conn = open_readonly_db(&config, ctx)?;
            let identifier = parse_identifier(&cmd.inscription)?;
            match get_inscription(&identifier, &conn).map_err(|e| e.to_string())? {
                Some(inscription) => print_json(&inscription)?,
                None => return Err(format!("inscription {} not found", cmd.inscription)),
            }
        }
        Command::Inscriptions(InscriptionsCommand::Transfers(cmd)) => {
            let config = cmd.network.load_config()?;
            let conn = open_readonly_db(&config, ctx)?;
            let identifier = parse_identifier(&cmd.inscription)?;
            let locations =
                get_inscription_locations(&identifier, &cmd.page.pagination(), &config.query, &conn)
                    .map_err(|e| e.to_string())?;
            match locations {
                Some(locations) => print_json(&locations)?,
                None => return Err(format!("inscription {} not found", cmd.inscription)),
            }
        }
        Command::Inscriptions(InscriptionsCommand::Content(cmd)) => {
            let config = cmd.network.load_config()?;
            let conn = open_readonly_db(&config, ctx)?;
            let identifier = parse_identifier(&cmd.inscription)?;
            let Some(content) =
                get_inscription_content(&identifier, &conn).map_err(|e| e.to_string())?
            else {
                return Err(format!("inscription {} not found", cmd.inscription));
            };
            let mut file = File::create(&cmd.output)
                .map_err(|e| format!("unable to open file {}\n{}", cmd.output, e))?;
            file.write_all(&content.bytes)
                .map_err(|e| format!("unable to write file {}\n{}", cmd.output, e))?;
            info!(
                ctx.expect_logger(),
                "{} bytes of {} written to {}",
                content.content_length,
                content.content_type,
                cmd.output
            );
        }
        Command::Inscriptions(InscriptionsCommand::List(cmd)) => {
            let config = cmd.network.load_config()?;
            let conn = open_readonly_db(&config, ctx)?;
            let filters = cmd.filters()?;
            let order_by = match cmd.order_by {
                Some(ref order_by) => order_by.parse::<OrderBy>()?,
                None => OrderBy::default(),
            };
            let order = match cmd.order {
                Some(ref order) => order.parse::<Order>()?,
                None => Order::default(),
            };
            let page = list_inscriptions(
                &filters,
                order_by,
                order,
                &cmd.page.pagination(),
                &config.query,
                &conn,
            )
            .map_err(|e| e.to_string())?;
            print_json(&page)?;
        }
        Command::Blocks(BlocksCommand::Transfers(cmd)) => {
            let config = cmd.network.load_config()?;
            let conn = open_readonly_db(&config, ctx)?;
            let page = get_transfers_per_block(
                cmd.block_height,
                &cmd.page.pagination(),
                &config.query,
                &conn,
            )
            .map_err(|e| e.to_string())?;
            print_json(&page)?;
        }
        Command::Stats(cmd) => {
            let config = cmd.network.load_config()?;
            let conn = open_readonly_db(&config, ctx)?;
            let stats = inscription_stats(cmd.from_height, cmd.to_height, &conn)
                .map_err(|e| e.to_string())?;
            print_json(&stats)?;
        }
    }
    Ok(())
}

impl ListInscriptionsCommand {
    fn filters(&self) -> Result<InscriptionFilters, String> {
        let sat_rarity = self
            .rarity
            .iter()
            .map(|rarity| rarity.parse::<Rarity>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(InscriptionFilters {
            address: self.address.clone(),
            mime_type: self.mime_type.clone(),
            sat_rarity,
            cursed: self.cursed,
            recursive: self.recursive,
            ..Default::default()
        })
    }
}

fn parse_identifier(value: &str) -> Result<InscriptionIdentifier, String> {
    value
        .parse::<InscriptionIdentifier>()
        .map_err(|e| e.to_string())
}

fn open_readonly_db(config: &Config, ctx: &Context) -> Result<Connection, String> {
    let Some(base_dir) = config.expected_cache_path() else {
        return Err("storage.working_dir must be set".to_string());
    };
    open_readonly_ordinals_db_conn(&base_dir, ctx).map_err(|e| e.to_string())
}

fn load_payload(file_path: &str) -> Result<BitcoinInscriptionsPayload, String> {
    let file = File::open(file_path)
        .map_err(|e| format!("unable to read file {}\n{:?}", file_path, e))?;
    let mut file_reader = BufReader::new(file);
    let mut file_buffer = vec![];
    file_reader
        .read_to_end(&mut file_buffer)
        .map_err(|e| format!("unable to read file {}\n{:?}", file_path, e))?;
    serde_json::from_slice(&file_buffer)
        .map_err(|e| format!("payload {} malformatted: {}", file_path, e))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let output = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod test {
    use clap::Parser;
    use ordinals::ord::rarity::Rarity;

    use super::{Command, InscriptionsCommand, Opts};

    #[test]
    fn parses_list_filters() {
        let opts = Opts::try_parse_from([
            "ordinals",
            "inscriptions",
            "list",
            "--rarity",
            "epic",
            "--rarity",
            "mythic",
            "--mime-type",
            "image/png",
            "--limit",
            "5",
            "--mainnet",
        ])
        .unwrap();
        let Command::Inscriptions(InscriptionsCommand::List(cmd)) = opts.command else {
            panic!("unexpected command");
        };
        let filters = cmd.filters().unwrap();
        assert_eq!(filters.sat_rarity, vec![Rarity::Epic, Rarity::Mythic]);
        assert_eq!(filters.mime_type, vec!["image/png".to_string()]);
        assert_eq!(cmd.page.pagination().limit, Some(5));
        assert!(cmd.network.mainnet);
    }

    #[test]
    fn rejects_conflicting_network_flags() {
        assert!(Opts::try_parse_from(["ordinals", "stats", "--mainnet", "--testnet"]).is_err());
        assert!(Opts::try_parse_from([
            "ordinals",
            "db",
            "check",
            "--config-path",
            "Ordinals.toml",
            "--regtest"
        ])
        .is_err());
    }

    #[test]
    fn rejects_unknown_rarity() {
        let opts =
            Opts::try_parse_from(["ordinals", "inscriptions", "list", "--rarity", "shiny"]).unwrap();
        let Command::Inscriptions(InscriptionsCommand::List(cmd)) = opts.command else {
            panic!("unexpected command");
        };
        assert!(cmd.filters().is_err());
    }
}

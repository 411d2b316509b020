//! Keyring daemon: deploys a credential registry and inspects credentials.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use keyring_oracle::ChannelAuthority;
use keyring_registry::{init_logging, CredentialRegistry, DeploymentRecord, LogFormat, RegistryConfig};
use keyring_store_lmdb::LmdbEnvironment;
use keyring_types::{Address, NetworkId, Timestamp};

#[derive(Parser)]
#[command(name = "keyring-daemon", about = "Keyring credential registry daemon")]
struct Cli {
    /// Network the deployment targets: mainnet, ropsten, rinkeby, goerli, kovan, hardhat.
    #[arg(long, env = "KEYRING_NETWORK")]
    network: Option<NetworkId>,

    /// Data directory for credential storage.
    #[arg(long, env = "KEYRING_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Where `deploy` writes the deployment record.
    #[arg(long, env = "KEYRING_DEPLOYMENTS_PATH")]
    deployments_path: Option<PathBuf>,

    /// Attestation authority address.
    #[arg(long, env = "KEYRING_AUTHORITY")]
    authority: Option<Address>,

    /// Fee per verification request in whole payment-token units, e.g. "0.1".
    #[arg(long, env = "KEYRING_FEE")]
    fee: Option<String>,

    /// Payment tokens to fund the registry with after deployment.
    #[arg(long, env = "KEYRING_INITIAL_FUNDING")]
    initial_funding: Option<String>,

    /// Seconds an issued credential stays valid (0 = forever).
    #[arg(long, env = "KEYRING_VALIDITY_WINDOW")]
    validity_window_secs: Option<u64>,

    /// Seconds before an unanswered verification request expires (0 = never).
    #[arg(long, env = "KEYRING_REQUEST_TIMEOUT")]
    request_timeout_secs: Option<u64>,

    /// Log format: "human" or "json".
    #[arg(long, env = "KEYRING_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "KEYRING_LOG_LEVEL")]
    log_level: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "KEYRING_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Construct the registry, fund it and write the deployment record.
    Deploy,
    /// Show the credential status and current validity of one identity.
    Status {
        #[arg(long)]
        identity: Address,
    },
    /// Print the effective configuration as TOML.
    Config,
}

impl Cli {
    /// File settings (or defaults) with CLI flags and env vars layered on top.
    fn effective_config(&self) -> anyhow::Result<RegistryConfig> {
        let base = match &self.config {
            Some(path) => RegistryConfig::from_toml_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => RegistryConfig::default(),
        };
        Ok(RegistryConfig {
            network: self.network.unwrap_or(base.network),
            data_dir: self.data_dir.clone().unwrap_or(base.data_dir),
            deployments_path: self.deployments_path.clone().unwrap_or(base.deployments_path),
            authority: self.authority.unwrap_or(base.authority),
            fee: self.fee.clone().unwrap_or(base.fee),
            initial_funding: self.initial_funding.clone().unwrap_or(base.initial_funding),
            validity_window_secs: self.validity_window_secs.unwrap_or(base.validity_window_secs),
            request_timeout_secs: self.request_timeout_secs.unwrap_or(base.request_timeout_secs),
            log_format: self.log_format.clone().unwrap_or(base.log_format),
            log_level: self.log_level.clone().unwrap_or(base.log_level),
            ..base
        })
    }
}

fn open_registry(
    config: &RegistryConfig,
) -> anyhow::Result<CredentialRegistry<LmdbEnvironment, ChannelAuthority>> {
    let params = config.to_params().context("invalid registry parameters")?;
    let store = LmdbEnvironment::open(&config.data_dir, LmdbEnvironment::DEFAULT_MAP_SIZE)
        .with_context(|| format!("opening credential store at {}", config.data_dir.display()))?;
    // The daemon never requests credentials, so nothing reads the job queue.
    let (authority, _jobs) = ChannelAuthority::new("channel-oracle");
    Ok(CredentialRegistry::new(params, store, authority))
}

fn deploy(config: &RegistryConfig) -> anyhow::Result<()> {
    let mut registry = open_registry(config)?;
    let funding = config
        .initial_funding_amount()
        .context("invalid initial funding")?;
    if !funding.is_zero() {
        registry.fund(funding)?;
    }

    println!("CredentialRegistry deployed to: {}", registry.address());
    let record = DeploymentRecord::new(config.network, registry.address(), chrono::Utc::now());
    record
        .write_to(&config.deployments_path)
        .with_context(|| format!("writing {}", config.deployments_path.display()))?;
    let fee_balance = registry.fee_balance()?;
    tracing::info!(
        network = %config.network,
        registry = %registry.address(),
        fee_balance = %fee_balance,
        "deployment complete"
    );
    Ok(())
}

fn status(config: &RegistryConfig, identity: &Address) -> anyhow::Result<()> {
    let registry = open_registry(config)?;
    let now = Timestamp::now();
    let record = registry.credential_of(identity)?;

    println!("identity:  {identity}");
    println!("status:    {:?}", registry.status_of(identity)?);
    if let Some(record) = &record {
        println!("token id:  {}", record.token_id);
        if let Some(issued_at) = record.issued_at {
            println!("issued at: {issued_at}");
        }
        if let Some(expires_at) = registry.expiry().expires_at(record) {
            println!("expires:   {expires_at}");
        }
    }
    println!("valid:     {}", registry.is_valid(identity, now));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.effective_config()?;

    let log_format: LogFormat = config
        .log_format
        .parse()
        .map_err(anyhow::Error::msg)
        .context("invalid log format")?;
    init_logging(log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "loaded config file");
    }

    match &cli.command {
        Command::Deploy => deploy(&config)?,
        Command::Status { identity } => status(&config, identity)?,
        Command::Config => print!("{}", config.to_toml_string()?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_timeout_flag_overrides_config() {
        let cli = Cli::try_parse_from(["keyring-daemon", "--request-timeout-secs", "600", "config"]).unwrap();
        assert_eq!(cli.effective_config().unwrap().request_timeout_secs, 600);
    }
}

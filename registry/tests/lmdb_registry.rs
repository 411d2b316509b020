//! Registry over the LMDB backend: the whole flow through real storage,
//! a channel-backed authority and the async service.

use std::path::Path;

use keyring_oracle::ChannelAuthority;
use keyring_registry::{
    CredentialRegistry, DeploymentRecord, RegistryConfig, RegistryError, RegistryService,
};
use keyring_store::CredentialStatus;
use keyring_store_lmdb::LmdbEnvironment;
use keyring_types::{Address, RegistryParams, Timestamp, TokenAmount};

fn open(dir: &Path) -> LmdbEnvironment {
    LmdbEnvironment::open(dir, LmdbEnvironment::DEFAULT_MAP_SIZE).expect("open env")
}

fn params() -> RegistryParams {
    RegistryParams {
        fee: TokenAmount::new(10),
        validity_window_secs: 100,
        ..RegistryParams::rinkeby_defaults()
    }
}

#[tokio::test]
async fn oracle_task_answers_through_the_service() {
    let dir = tempfile::tempdir().unwrap();
    let (authority, mut jobs) = ChannelAuthority::new("test-oracle");
    let registry = CredentialRegistry::new(params(), open(dir.path()), authority);
    let service = RegistryService::new(registry);
    service.fund(TokenAmount::new(20)).await.unwrap();

    // Oracle node: attests every subject except 0x02..02.
    let oracle = {
        let service = service.clone();
        tokio::spawn(async move {
            for _ in 0..2 {
                let job = jobs.recv().await.expect("job");
                assert_eq!(job.callback, service.address());
                let attested = job.subject != Address::new([2; 20]);
                service
                    .deliver(RegistryParams::RINKEBY_ORACLE, job.answer(attested, Timestamp::new(50)))
                    .await
                    .expect("deliver");
            }
        })
    };

    service.create(Address::new([1; 20]), Timestamp::new(40)).await.unwrap();
    service.create(Address::new([2; 20]), Timestamp::new(41)).await.unwrap();
    oracle.await.unwrap();

    assert!(service.is_valid(Address::new([1; 20]), Timestamp::new(150)).await);
    assert!(!service.is_valid(Address::new([1; 20]), Timestamp::new(151)).await);
    assert!(!service.is_valid(Address::new([2; 20]), Timestamp::new(60)).await);
    assert!(service.fee_balance().await.unwrap().is_zero());
    assert!(matches!(
        service.create(Address::new([3; 20]), Timestamp::new(60)).await,
        Err(RegistryError::InsufficientFunds { .. })
    ));
}

#[test]
fn credentials_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let alice = Address::new([1; 20]);
    let (authority, _jobs) = ChannelAuthority::new("test-oracle");

    let pending = {
        let mut registry = CredentialRegistry::new(params(), open(dir.path()), authority);
        registry.fund(TokenAmount::new(10)).unwrap();
        registry.create(&alice, Timestamp::new(1)).unwrap()
    };

    // The outstanding request is durable too: the callback lands after restart.
    let (authority, _jobs) = ChannelAuthority::new("test-oracle");
    let mut registry = CredentialRegistry::new(params(), open(dir.path()), authority);
    assert_eq!(registry.status_of(&alice).unwrap(), CredentialStatus::Pending);
    registry
        .on_attestation(&RegistryParams::RINKEBY_ORACLE, &pending, true, Timestamp::new(2))
        .unwrap();
    drop(registry);

    let (authority, _jobs) = ChannelAuthority::new("test-oracle");
    let registry = CredentialRegistry::new(params(), open(dir.path()), authority);
    assert!(registry.is_valid(&alice, Timestamp::new(3)));
    assert_eq!(registry.balance_of(&alice).unwrap(), 1);
}

#[test]
fn fee_balance_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (authority, _jobs) = ChannelAuthority::new("test-oracle");
        let mut registry = CredentialRegistry::new(params(), open(dir.path()), authority);
        assert_eq!(registry.fund(TokenAmount::new(25)).unwrap(), TokenAmount::new(25));
        registry.create(&Address::new([1; 20]), Timestamp::new(1)).unwrap();
    }

    let (authority, _jobs) = ChannelAuthority::new("test-oracle");
    let mut registry = CredentialRegistry::new(params(), open(dir.path()), authority);
    assert_eq!(registry.fee_balance().unwrap(), TokenAmount::new(15));
    registry.create(&Address::new([2; 20]), Timestamp::new(2)).unwrap();
    assert_eq!(registry.fee_balance().unwrap(), TokenAmount::new(5));
    assert!(matches!(
        registry.create(&Address::new([3; 20]), Timestamp::new(3)),
        Err(RegistryError::InsufficientFunds { .. })
    ));
}

#[test]
fn default_config_deploys_reference_registry() {
    let dir = tempfile::tempdir().unwrap();
    let config = RegistryConfig {
        deployments_path: dir.path().join("deployments/addresses.json"),
        ..RegistryConfig::default()
    };
    let (authority, _jobs) = ChannelAuthority::new("test-oracle");
    let registry = CredentialRegistry::new(
        config.to_params().unwrap(),
        open(&dir.path().join("data")),
        authority,
    );

    let record = DeploymentRecord::new(config.network, registry.address(), chrono::Utc::now());
    record.write_to(&config.deployments_path).unwrap();

    let read = DeploymentRecord::read_from(&config.deployments_path).unwrap();
    assert_eq!(read.chain_id, 4);
    assert_eq!(read.registry_address(), Some(registry.address()));
}

//! Full provisioning runs against an in-memory network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use localnet_engine::bindings::{CLAIM_TXN_HASH, GIFT_ADDRESS, MODULE_ID};
use localnet_engine::{
    ApiError, ChainCli, CliError, CliInvocation, CliOutput, NodeApi, ProvisionError, StepContext, StepFailure, Workflow,
};
use localnet_types::{IdentitySet, ProvisioningConfig, TransactionResult};
use serde_json::{Value, json};
use url::Url;

#[derive(Debug, Clone)]
struct Gift {
    address: String,
    creator: String,
    coin_type: String,
    share_count: u64,
    expiry: u64,
    per_share_amount: u64,
    claims: Vec<String>,
}

#[derive(Default)]
struct Ledger {
    /// profile name -> account address
    accounts: HashMap<String, String>,
    /// module ids, e.g. `0x5322::hongbao`
    modules: Vec<String>,
    gifts: Vec<Gift>,
    transactions: HashMap<String, TransactionResult>,
    next_id: u64,
}

impl Ledger {
    fn next_hash(&mut self) -> String {
        self.next_id += 1;
        format!("0x{:064x}", self.next_id)
    }

    fn record(&mut self, changes: Value) -> String {
        let hash = self.next_hash();
        let transaction: TransactionResult = serde_json::from_value(json!({
            "hash": hash,
            "success": true,
            "vm_status": "Executed successfully",
            "changes": changes,
        }))
        .unwrap();
        self.transactions.insert(hash.clone(), transaction);
        hash
    }
}

/// A minimal localnet: the CLI writes to the ledger, the API reads it.
struct SimulatedNetwork {
    identities: IdentitySet,
    module_name: String,
    ledger: Mutex<Ledger>,
}

impl SimulatedNetwork {
    fn new(identities: IdentitySet) -> Self {
        Self {
            identities,
            module_name: "hongbao".into(),
            ledger: Mutex::new(Ledger::default()),
        }
    }

    fn address_for_key(&self, private_key: &str) -> Option<String> {
        self.identities
            .iter()
            .find(|identity| identity.private_key == private_key)
            .map(|identity| identity.address.clone())
    }

    fn submitted(hash: &str) -> String {
        json!({ "Result": { "transaction_hash": hash, "success": true, "vm_status": "Executed successfully" } }).to_string()
    }

    fn run(&self, ledger: &mut Ledger, profile: &str, function_id: &str, type_args: &[String], args: &[String]) -> Result<String, String> {
        let sender = ledger.accounts.get(profile).cloned().ok_or(format!("unknown profile {profile}"))?;
        let (module_id, function) = function_id.rsplit_once("::").ok_or("malformed function id")?;
        if !ledger.modules.iter().any(|module| module == module_id) {
            return Err(format!("LINKER_ERROR: module {module_id} not published"));
        }

        match function {
            "create_gift_coin" => {
                let [share_count, expiry, per_share_amount, paylink, keyless] = args else {
                    return Err(format!("create_gift_coin expects 5 args, got {}", args.len()));
                };
                assert_eq!(paylink, "u8:[]");
                assert_eq!(keyless, "bool:false");
                let address = format!("0x{:064x}", 0xa11ce + ledger.gifts.len() as u64);
                let gift = Gift {
                    address: address.clone(),
                    creator: sender.clone(),
                    coin_type: type_args.first().cloned().ok_or("missing coin type")?,
                    share_count: parse_u64(share_count)?,
                    expiry: parse_u64(expiry)?,
                    per_share_amount: parse_u64(per_share_amount)?,
                    claims: Vec::new(),
                };
                ledger.gifts.push(gift);
                // The gift record sits between unrelated writes, and a second object
                // carries the gift type as a later duplicate.
                Ok(ledger.record(json!([
                    { "type": "write_resource", "address": sender, "data": { "type": "0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>" } },
                    { "type": "write_resource", "address": address, "data": { "type": "0x1::object::ObjectCore" } },
                    { "type": "write_table_item", "data": { "key": "0x01", "value": "0x02" } },
                    { "type": "write_resource", "address": address, "data": { "type": format!("{module_id}::Gift") } },
                    { "type": "write_resource", "address": "0xdecoy", "data": { "type": format!("{module_id}::Gift") } },
                ])))
            }
            "snatch_packet" => {
                let [gift, _paylink_signature, _keyless_proof] = args else {
                    return Err(format!("snatch_packet expects 3 args, got {}", args.len()));
                };
                let gift_address = gift.strip_prefix("address:").ok_or("gift must be an address")?;
                let gift = ledger
                    .gifts
                    .iter_mut()
                    .find(|gift| gift.address == gift_address)
                    .ok_or(format!("EGIFT_NOT_FOUND: {gift_address}"))?;
                if gift.claims.contains(&sender) {
                    return Err("EALREADY_SNATCHED".into());
                }
                gift.claims.push(sender.clone());
                Ok(ledger.record(json!([
                    { "type": "write_resource", "address": sender, "data": { "type": "0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>" } },
                ])))
            }
            other => Err(format!("FUNCTION_RESOLUTION_FAILURE: {other}")),
        }
    }
}

fn parse_u64(arg: &str) -> Result<u64, String> {
    arg.strip_prefix("u64:")
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| format!("expected u64 arg, got {arg}"))
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let position = args.iter().position(|arg| arg == flag)?;
    args.get(position + 1).map(String::as_str)
}

/// Values following `flag` up to the next `--` flag.
fn flag_values(args: &[String], flag: &str) -> Vec<String> {
    args.iter()
        .skip_while(|arg| *arg != flag)
        .skip(1)
        .take_while(|arg| !arg.starts_with("--"))
        .cloned()
        .collect()
}

#[async_trait]
impl ChainCli for SimulatedNetwork {
    async fn invoke(&self, invocation: &CliInvocation) -> Result<CliOutput, CliError> {
        let args = invocation.to_args();
        let label = invocation.label();
        let mut ledger = self.ledger.lock().unwrap();

        let outcome = match invocation {
            CliInvocation::Init { private_key, profile, .. } => match self.address_for_key(private_key) {
                None => Err("invalid private key".to_string()),
                Some(_) if ledger.accounts.contains_key(profile) => Err(format!("profile {profile} already exists")),
                Some(address) => {
                    ledger.accounts.insert(profile.clone(), address);
                    Ok(json!({ "Result": "Success" }).to_string())
                }
            },
            CliInvocation::Publish { profile, .. } => {
                let named = flag_value(&args, "--named-addresses").unwrap_or_default();
                let address = named.strip_prefix("addr=").unwrap_or_default().to_string();
                let module_id = format!("{address}::{}", self.module_name);
                if ledger.accounts.get(profile) != Some(&address) {
                    Err(format!("profile {profile} does not own {address}"))
                } else if ledger.modules.contains(&module_id) {
                    Err("EMODULE_ALREADY_EXISTS".to_string())
                } else {
                    ledger.modules.push(module_id);
                    let hash = ledger.record(json!([]));
                    Ok(Self::submitted(&hash))
                }
            }
            CliInvocation::Run { profile, function_id, .. } => {
                let type_args = flag_values(&args, "--type-args");
                let move_args = flag_values(&args, "--args");
                // Aborted entry functions come back as an error envelope.
                return self
                    .run(&mut ledger, profile, function_id, &type_args, &move_args)
                    .map(|hash| CliOutput::new(label, Self::submitted(&hash)))
                    .map_err(|message| CliError::rejected(label, message));
            }
        };

        outcome
            .map(|stdout| CliOutput::new(label, stdout))
            .map_err(|message| CliError::failed(label, "exit status: 1", message))
    }
}

#[async_trait]
impl NodeApi for SimulatedNetwork {
    async fn transaction_by_hash(&self, hash: &str) -> Result<TransactionResult, ApiError> {
        self.ledger
            .lock()
            .unwrap()
            .transactions
            .get(hash)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                url: format!("http://127.0.0.1:8080/v1/transactions/by_hash/{hash}"),
                status: 404,
                body: "transaction_not_found".into(),
            })
    }
}

fn config() -> ProvisioningConfig {
    ProvisioningConfig::new(IdentitySet::localnet_defaults(), "move", Url::parse("http://127.0.0.1:8080").unwrap())
}

#[tokio::test]
async fn fresh_network_reaches_demo_state() {
    let config = config();
    let network = SimulatedNetwork::new(config.identities.clone());
    let ctx = StepContext::new(&config, &network, &network);

    let report = Workflow::standard().unwrap().run(&ctx).await.unwrap();
    let now = Utc::now().timestamp() as u64;
    let ledger = network.ledger.lock().unwrap();

    // Three registered identities.
    assert_eq!(ledger.accounts.len(), 3);
    for identity in config.identities.iter() {
        assert_eq!(ledger.accounts.get(&identity.name), Some(&identity.address));
    }

    // One module at the deployer's address.
    let deployer = &config.identities.deployer.address;
    assert_eq!(ledger.modules, vec![format!("{deployer}::hongbao")]);
    assert_eq!(report.bindings.get(MODULE_ID), Some(format!("{deployer}::hongbao").as_str()));

    // One gift with the fixed parameters.
    assert_eq!(ledger.gifts.len(), 1);
    let gift = &ledger.gifts[0];
    assert_eq!(&gift.creator, deployer);
    assert_eq!(gift.coin_type, "0x1::aptos_coin::AptosCoin");
    assert_eq!(gift.share_count, 4);
    assert_eq!(gift.per_share_amount, 10_000_000);
    assert!(gift.expiry.abs_diff(now + 1800) <= 5, "expiry {} vs now {now}", gift.expiry);

    // The first matching record wins over the later decoy.
    assert_eq!(report.gift_address(), Some(gift.address.as_str()));
    assert_eq!(report.bindings.get(GIFT_ADDRESS), Some(gift.address.as_str()));

    // One successful claim by the first non-deployer identity.
    assert_eq!(gift.claims, vec![config.identities.claimant.address.clone()]);
    let claim_hash = report.bindings.get(CLAIM_TXN_HASH).unwrap();
    assert!(ledger.transactions.contains_key(claim_hash));

    assert_eq!(report.steps.len(), 5);
}

#[tokio::test]
async fn rerun_on_provisioned_network_fails_at_identities() {
    let config = config();
    let network = SimulatedNetwork::new(config.identities.clone());
    let ctx = StepContext::new(&config, &network, &network);

    Workflow::standard().unwrap().run(&ctx).await.unwrap();
    let error = Workflow::standard().unwrap().run(&ctx).await.unwrap_err();

    assert!(
        matches!(
            error,
            ProvisionError::Step {
                index: 1,
                step: "create-identities",
                source: StepFailure::Cli(CliError::Failed { .. })
            }
        ),
        "{error}"
    );
    let ledger = network.ledger.lock().unwrap();
    assert_eq!(ledger.modules.len(), 1);
    assert_eq!(ledger.gifts.len(), 1);
}

#[tokio::test]
async fn publish_under_foreign_address_fails() {
    let mut config = config();
    // The named address no longer matches the account behind the deployer profile.
    config.identities.deployer.address = config.identities.claimant.address.clone();
    let network = SimulatedNetwork::new(IdentitySet::localnet_defaults());
    let ctx = StepContext::new(&config, &network, &network);

    let error = Workflow::standard().unwrap().run(&ctx).await.unwrap_err();
    assert_eq!(error.failed_step(), Some("publish-module"));
    assert!(network.ledger.lock().unwrap().gifts.is_empty());
}

#[tokio::test]
async fn uppercase_deployer_address_still_reaches_demo_state() {
    let mut config = config();
    // Same account, written the way a hand-edited identities file might.
    let deployer = config.identities.deployer.address.clone();
    config.identities.deployer.address = format!("0x{}", deployer.trim_start_matches("0x").to_uppercase());
    let network = SimulatedNetwork::new(IdentitySet::localnet_defaults());
    let ctx = StepContext::new(&config, &network, &network);

    let report = Workflow::standard().unwrap().run(&ctx).await.unwrap();

    assert_eq!(report.bindings.get(MODULE_ID), Some(format!("{deployer}::hongbao").as_str()));
    let ledger = network.ledger.lock().unwrap();
    assert_eq!(report.gift_address(), Some(ledger.gifts[0].address.as_str()));
}

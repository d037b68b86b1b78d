//! Contract address and ABI files produced by the Foundry toolchain.
//!
//! Deployments are described either by a literal address, by a small
//! `{"address": "0x…"}` file, or by the broadcast log Foundry writes to
//! `broadcast/<Script>.s.sol/<chain id>/run-latest.json`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::{json_abi::JsonAbi, primitives::Address};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    config::Config,
    contracts::{FACTORY_FUNCTIONS, FUNDRAISER_FUNCTIONS, HELLO_FUNCTIONS},
    error::ServiceError,
    models::hex::parse_hex_address,
    service::ContractBook,
};

/// Files written by [`export_bundle`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedBundle {
    pub address: Address,
    pub abi_path: PathBuf,
    pub address_path: PathBuf,
}

fn read_json(path: &Path) -> Result<Value, ServiceError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| ServiceError::ArtifactError(format!("Cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| ServiceError::ArtifactError(format!("Invalid JSON in {}: {}", path.display(), e)))
}

/// Find the deployed address inside an address file or a broadcast log.
///
/// Broadcast logs are searched in `receipts[0].contractAddress` first and then
/// `transactions[0].contractAddress`.
pub fn address_from_json(value: &Value) -> Result<Address, ServiceError> {
    // Foundry writes `"contractAddress": null` for receipts of plain calls
    let candidate = ["/address", "/receipts/0/contractAddress", "/transactions/0/contractAddress"]
        .iter()
        .find_map(|pointer| value.pointer(pointer).and_then(Value::as_str))
        .ok_or_else(|| {
            ServiceError::ArtifactError("Cannot find contractAddress in deployment JSON".to_string())
        })?;

    parse_hex_address(candidate).map_err(ServiceError::ArtifactError)
}

/// Resolve a configured contract location to an address.
///
/// `source` is either an address literal or a path to an address file / broadcast log.
pub fn resolve_address(source: &str) -> Result<Address, ServiceError> {
    let source = source.trim();
    if let Ok(address) = parse_hex_address(source) {
        return Ok(address);
    }

    let value = read_json(Path::new(source))?;
    let address = address_from_json(&value)?;
    debug!("Resolved contract address {} from {}", address, source);
    Ok(address)
}

/// Load an ABI from a compiler output file (`{"abi": [...]}`) or a bare ABI array.
pub fn load_abi(path: impl AsRef<Path>) -> Result<JsonAbi, ServiceError> {
    let path = path.as_ref();
    let value = read_json(path)?;
    let abi = match value {
        Value::Object(mut artifact) => artifact.remove("abi").ok_or_else(|| {
            ServiceError::ArtifactError(format!("No abi field in {}", path.display()))
        })?,
        array => array,
    };

    serde_json::from_value(abi)
        .map_err(|e| ServiceError::ArtifactError(format!("Malformed ABI in {}: {}", path.display(), e)))
}

/// Check that an ABI declares every function the gateway is going to call.
pub fn ensure_functions(abi: &JsonAbi, required: &[&str]) -> Result<(), ServiceError> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| abi.function(name).is_none())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::ArtifactError(format!(
            "ABI is missing functions: {}",
            missing.join(", ")
        )))
    }
}

/// Write `<name>-abi.json` and `<name>-addr.json` into `out_dir` for front-end use.
pub fn export_bundle(
    artifact_path: impl AsRef<Path>,
    deployment_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    name: &str,
) -> Result<ExportedBundle, ServiceError> {
    let abi = load_abi(artifact_path)?;
    let address = address_from_json(&read_json(deployment_path.as_ref())?)?;

    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)
        .map_err(|e| ServiceError::ArtifactError(format!("Cannot create {}: {}", out_dir.display(), e)))?;

    let abi_path = out_dir.join(format!("{name}-abi.json"));
    let address_path = out_dir.join(format!("{name}-addr.json"));
    write_pretty(&abi_path, &abi)?;
    write_pretty(&address_path, &serde_json::json!({ "address": address }))?;

    info!("Exported {} bundle to {}", name, out_dir.display());
    Ok(ExportedBundle {
        address,
        abi_path,
        address_path,
    })
}

fn write_pretty<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), ServiceError> {
    let body = serde_json::to_string_pretty(value)
        .map_err(|e| ServiceError::ArtifactError(e.to_string()))?;
    fs::write(path, body)
        .map_err(|e| ServiceError::ArtifactError(format!("Cannot write {}: {}", path.display(), e)))
}

/// Resolve and check one configured contract, exporting its bundle when asked to.
fn load_contract(
    name: &str,
    source: Option<&str>,
    abi_path: Option<&str>,
    required: &[&str],
    export_dir: Option<&str>,
) -> Result<Option<Address>, ServiceError> {
    if let Some(abi_path) = abi_path {
        ensure_functions(&load_abi(abi_path)?, required)?;
        debug!("{} ABI at {} exposes every required function", name, abi_path);
    }

    let Some(source) = source else {
        info!("{} contract not configured", name);
        return Ok(None);
    };

    // A bundle needs both the compiler output and a deployment file
    if let (Some(dir), Some(abi_path)) = (export_dir, abi_path) {
        if parse_hex_address(source).is_err() {
            let bundle = export_bundle(abi_path, source, dir, name)?;
            return Ok(Some(bundle.address));
        }
    }

    let address = resolve_address(source)?;
    info!("{} contract at {}", name, address);
    Ok(Some(address))
}

/// Build the contract book from configuration.
///
/// The Fundraiser ABI has no address of its own (instances come from the factory),
/// so it is only checked.
pub fn load_contracts(config: &Config) -> Result<ContractBook, ServiceError> {
    let export_dir = config.artifact_export_dir.as_deref();

    let hello = load_contract(
        "Hello",
        config.hello_contract.as_deref(),
        config.hello_abi.as_deref(),
        HELLO_FUNCTIONS,
        export_dir,
    )?;
    let fundraiser_factory = load_contract(
        "FundraiserFactory",
        config.fundraiser_factory.as_deref(),
        config.fundraiser_factory_abi.as_deref(),
        FACTORY_FUNCTIONS,
        export_dir,
    )?;
    if let Some(abi_path) = config.fundraiser_abi.as_deref() {
        ensure_functions(&load_abi(abi_path)?, FUNDRAISER_FUNCTIONS)?;
    }

    Ok(ContractBook {
        hello,
        fundraiser_factory,
    })
}

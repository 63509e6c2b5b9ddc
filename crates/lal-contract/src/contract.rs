use lal_identity::{Base64IdentityResolver, CallerToken, IdentityResolver};
use lal_store::LedgerStore;
use lal_types::{Asset, AssetState, TypeError};
use tracing::{debug, info, warn};

use crate::error::{ContractError, ContractResult};
use crate::seed::SEED_ASSETS;

/// Loan asset service over a ledger store.
///
/// Mutating operations perform exactly one `put` or `delete` per affected
/// key. There is no multi-key atomicity beyond what the store provides and
/// no internal locking; per-key serializability is the host's concern.
pub struct AssetContract<S, R = Base64IdentityResolver> {
    store: S,
    resolver: R,
}

impl<S: LedgerStore> AssetContract<S> {
    /// Service whose callers present base64-encoded identities.
    pub fn new(store: S) -> Self {
        Self::with_resolver(store, Base64IdentityResolver)
    }
}

impl<S: LedgerStore, R: IdentityResolver> AssetContract<S, R> {
    pub fn with_resolver(store: S, resolver: R) -> Self {
        Self { store, resolver }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ---- Lifecycle ----

    /// Write the six demonstration assets, attributed to the caller.
    ///
    /// Existing seed keys are overwritten. Stops at the first failure; seeds
    /// already written stay committed.
    pub fn init_ledger(&self, caller: &CallerToken) -> ContractResult<Vec<Asset>> {
        let lender = self.resolver.resolve(caller)?;
        let mut assets = Vec::with_capacity(SEED_ASSETS.len());
        for seed in &SEED_ASSETS {
            let asset = seed
                .issue(&lender)
                .map_err(|e| ContractError::from_entity(seed.id, e))?;
            self.write(seed.id, &asset)?;
            assets.push(asset);
        }
        info!(count = assets.len(), lender = %lender, "seeded ledger");
        Ok(assets)
    }

    /// Issue a new asset under `id`, lent by the caller.
    pub fn create_asset(
        &self,
        caller: &CallerToken,
        id: &str,
        start_date: i64,
        end_date: i64,
        amount: i64,
    ) -> ContractResult<Asset> {
        if id.is_empty() {
            return Err(ContractError::InvalidAssetId);
        }
        if self.asset_exists(id)? {
            warn!(id, "create rejected: asset exists");
            return Err(ContractError::AlreadyExists(id.to_string()));
        }
        let lender = self.resolver.resolve(caller)?;
        let asset = Asset::new(id, lender, start_date, end_date, amount)
            .map_err(|e| ContractError::from_entity(id, e))?;
        self.write(id, &asset)?;
        info!(id, lender = %asset.lender, amount, "asset issued");
        Ok(asset)
    }

    pub fn read_asset(&self, id: &str) -> ContractResult<Asset> {
        let bytes = self
            .store
            .get(id)?
            .ok_or_else(|| ContractError::NotFound(id.to_string()))?;
        debug!(id, bytes = bytes.len(), "read asset");
        decode(id, &bytes)
    }

    /// Remove the asset entirely.
    ///
    /// The stored record is read first: a missing asset is `NotFound` and a
    /// redeemed one is rejected like any other mutation.
    pub fn delete_asset(&self, id: &str) -> ContractResult<()> {
        let asset = self.read_asset(id).inspect_err(|e| {
            if matches!(e, ContractError::NotFound(_)) {
                warn!(id, "delete rejected: asset missing");
            }
        })?;
        if let Err(e) = asset.ensure_mutable() {
            warn!(id, error = %e, "delete rejected");
            return Err(ContractError::from_entity(id, e));
        }
        self.store.delete(id)?;
        info!(id, "asset deleted");
        Ok(())
    }

    pub fn asset_exists(&self, id: &str) -> ContractResult<bool> {
        Ok(self.store.exists(id)?)
    }

    /// Reassign the borrower. Every other field, including state, is kept.
    pub fn transfer_asset(&self, id: &str, new_borrower: &str) -> ContractResult<Asset> {
        let asset = self.modify(id, |asset| asset.assign_borrower(new_borrower))?;
        info!(id, borrower = new_borrower, "asset transferred");
        Ok(asset)
    }

    /// Every asset in the ledger, in key order.
    ///
    /// The keyspace is assumed to hold only assets: the first value that does
    /// not decode aborts the listing.
    pub fn get_all_assets(&self) -> ContractResult<Vec<Asset>> {
        let mut assets = Vec::new();
        for entry in self.store.scan_range("", "")? {
            let (key, bytes) = entry?;
            assets.push(decode(&key, &bytes)?);
        }
        debug!(count = assets.len(), "listed assets");
        Ok(assets)
    }

    // ---- State machine ----

    pub fn get_state(&self, id: &str) -> ContractResult<AssetState> {
        Ok(self.read_asset(id)?.state())
    }

    /// Move the asset to `to` if the transition table allows it.
    pub fn transition_asset(&self, id: &str, to: AssetState) -> ContractResult<Asset> {
        let mut from = AssetState::default();
        let asset = self.modify(id, |asset| {
            from = asset.state();
            asset.transition_to(to)
        })?;
        info!(id, %from, %to, "asset state changed");
        Ok(asset)
    }

    // ---- Payments ----

    /// Append a payment hash to the asset's history.
    pub fn record_payment(&self, id: &str, payment_hash: &str) -> ContractResult<Asset> {
        let asset = self.modify(id, |asset| asset.record_payment(payment_hash))?;
        info!(
            id,
            payments = asset.payment_hashes().len(),
            "payment recorded"
        );
        Ok(asset)
    }

    /// Set the borrower and investor payment-routing addresses.
    pub fn assign_addresses(
        &self,
        id: &str,
        borrower_address: &str,
        investor_address: &str,
    ) -> ContractResult<Asset> {
        let asset = self.modify(id, |asset| {
            asset.assign_addresses(borrower_address, investor_address)
        })?;
        info!(id, "payment addresses assigned");
        Ok(asset)
    }

    // ---- Internals ----

    /// Read, apply `change`, write back. Nothing is written if `change` fails.
    fn modify<F>(&self, id: &str, change: F) -> ContractResult<Asset>
    where
        F: FnOnce(&mut Asset) -> Result<(), TypeError>,
    {
        let mut asset = self.read_asset(id)?;
        if let Err(e) = change(&mut asset) {
            warn!(id, error = %e, "mutation rejected");
            return Err(ContractError::from_entity(id, e));
        }
        self.write(id, &asset)?;
        Ok(asset)
    }

    /// Store `asset` under `key`, which is always the id the caller named.
    fn write(&self, key: &str, asset: &Asset) -> ContractResult<()> {
        let bytes = asset.to_bytes().map_err(|source| ContractError::Serialization {
            id: key.to_string(),
            source,
        })?;
        self.store.put(key, &bytes)?;
        Ok(())
    }
}

/// Decode the value stored at `key`. The record's own `assetID` must match.
fn decode(key: &str, bytes: &[u8]) -> ContractResult<Asset> {
    let asset = Asset::from_bytes(bytes).map_err(|source| ContractError::Deserialization {
        id: key.to_string(),
        source,
    })?;
    if asset.id() != key {
        return Err(ContractError::KeyMismatch {
            key: key.to_string(),
            found: asset.id().to_string(),
        });
    }
    Ok(asset)
}

impl<S: std::fmt::Debug, R> std::fmt::Debug for AssetContract<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetContract")
            .field("store", &self.store)
            .finish()
    }
}

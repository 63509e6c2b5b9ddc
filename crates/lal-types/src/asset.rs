use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TypeError;
use crate::state::AssetState;

/// A single loan instrument as stored in the ledger.
///
/// The JSON field names are the public record shape shared with external
/// tooling. `id`, `state` and `payment_hashes` are only reachable through
/// accessors so that the id stays fixed, state changes go through the
/// transition table and payment history stays append-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(rename = "assetID")]
    id: String,
    pub lender: String,
    pub borrower: String,

    #[serde(rename = "startDate")]
    pub start_date: i64,
    pub amount: i64,
    #[serde(rename = "endDate")]
    pub end_date: i64,

    #[serde(rename = "senderAddress")]
    pub borrower_address: String,
    #[serde(rename = "investorAddress")]
    pub investor_address: String,
    #[serde(rename = "paymentHashes", default, deserialize_with = "null_as_empty")]
    payment_hashes: Vec<String>,

    #[serde(default)]
    state: AssetState,
}

impl Asset {
    /// Create a freshly issued asset attributed to `lender`.
    ///
    /// Dates are `YYYYMMDD` integers.
    pub fn new(
        id: impl Into<String>,
        lender: impl Into<String>,
        start_date: i64,
        end_date: i64,
        amount: i64,
    ) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::EmptyAssetId);
        }
        Ok(Self {
            id,
            lender: lender.into(),
            borrower: String::new(),
            start_date,
            amount,
            end_date,
            borrower_address: String::new(),
            investor_address: String::new(),
            payment_hashes: Vec::new(),
            state: AssetState::Issued,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> AssetState {
        self.state
    }

    pub fn payment_hashes(&self) -> &[String] {
        &self.payment_hashes
    }

    /// Returns `true` once the asset has been redeemed.
    pub fn is_redeemed(&self) -> bool {
        self.state == AssetState::Redeemed
    }

    /// Fails when the asset is in a terminal state.
    pub fn ensure_mutable(&self) -> Result<(), TypeError> {
        if self.state.is_terminal() {
            return Err(TypeError::Terminal { state: self.state });
        }
        Ok(())
    }

    /// Move to `to` if the transition table allows it.
    pub fn transition_to(&mut self, to: AssetState) -> Result<(), TypeError> {
        self.state = self.state.transition(to)?;
        Ok(())
    }

    pub fn mark_issued(&mut self) -> Result<(), TypeError> {
        self.transition_to(AssetState::Issued)
    }

    pub fn mark_pending(&mut self) -> Result<(), TypeError> {
        self.transition_to(AssetState::Pending)
    }

    pub fn mark_trading(&mut self) -> Result<(), TypeError> {
        self.transition_to(AssetState::Trading)
    }

    pub fn mark_redeemed(&mut self) -> Result<(), TypeError> {
        self.transition_to(AssetState::Redeemed)
    }

    /// Reassign the borrower. State is left untouched.
    pub fn assign_borrower(&mut self, borrower: impl Into<String>) -> Result<(), TypeError> {
        self.ensure_mutable()?;
        self.borrower = borrower.into();
        Ok(())
    }

    /// Set the payment-routing addresses.
    pub fn assign_addresses(
        &mut self,
        borrower_address: impl Into<String>,
        investor_address: impl Into<String>,
    ) -> Result<(), TypeError> {
        self.ensure_mutable()?;
        self.borrower_address = borrower_address.into();
        self.investor_address = investor_address.into();
        Ok(())
    }

    /// Append a payment event reference.
    pub fn record_payment(&mut self, hash: impl Into<String>) -> Result<(), TypeError> {
        self.ensure_mutable()?;
        let hash = hash.into();
        if hash.trim().is_empty() {
            return Err(TypeError::EmptyPaymentHash);
        }
        self.payment_hashes.push(hash);
        Ok(())
    }

    /// Encode as the stored JSON record.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode a stored JSON record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Earlier writers stored an empty history as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn loan() -> Asset {
        Asset::new("loan-7", "lenderA", 20230101, 20240101, 1000).unwrap()
    }

    fn trading_loan() -> Asset {
        let mut asset = loan();
        asset.mark_trading().unwrap();
        asset
    }

    fn redeemed_loan() -> Asset {
        let mut asset = trading_loan();
        asset.mark_redeemed().unwrap();
        asset
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn new_asset_is_issued() {
        let asset = loan();
        assert_eq!(asset.id(), "loan-7");
        assert_eq!(asset.lender, "lenderA");
        assert_eq!(asset.amount, 1000);
        assert_eq!(asset.state(), AssetState::Issued);
        assert!(asset.borrower.is_empty());
        assert!(asset.payment_hashes().is_empty());
    }

    #[test]
    fn empty_id_rejected() {
        assert_eq!(
            Asset::new("", "lenderA", 1, 2, 3),
            Err(TypeError::EmptyAssetId)
        );
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    #[test]
    fn full_lifecycle() {
        let mut asset = loan();
        asset.mark_pending().unwrap();
        asset.mark_issued().unwrap();
        asset.mark_trading().unwrap();
        asset.mark_redeemed().unwrap();
        assert!(asset.is_redeemed());
    }

    #[test]
    fn illegal_transition_leaves_state() {
        let mut asset = loan();
        let err = asset.mark_redeemed().unwrap_err();
        assert_eq!(
            err,
            TypeError::IllegalTransition {
                from: AssetState::Issued,
                to: AssetState::Redeemed
            }
        );
        assert_eq!(asset.state(), AssetState::Issued);
    }

    #[test]
    fn redeemed_rejects_mutation() {
        let mut asset = redeemed_loan();
        let before = asset.clone();
        let terminal = TypeError::Terminal { state: AssetState::Redeemed };
        assert_eq!(asset.assign_borrower("someone"), Err(terminal.clone()));
        assert_eq!(asset.assign_addresses("a", "b"), Err(terminal.clone()));
        assert_eq!(asset.record_payment("0xabc"), Err(terminal.clone()));
        assert_eq!(asset.mark_pending(), Err(terminal));
        assert_eq!(asset, before);
    }

    #[test]
    fn assign_borrower_keeps_state() {
        let mut asset = trading_loan();
        asset.assign_borrower("borrowerB").unwrap();
        assert_eq!(asset.borrower, "borrowerB");
        assert_eq!(asset.state(), AssetState::Trading);
    }

    #[test]
    fn payments_append_in_order() {
        let mut asset = loan();
        asset.record_payment("0x01").unwrap();
        asset.record_payment("0x02").unwrap();
        assert_eq!(asset.payment_hashes(), ["0x01", "0x02"]);
        assert_eq!(asset.record_payment("  "), Err(TypeError::EmptyPaymentHash));
        assert_eq!(asset.payment_hashes().len(), 2);
    }

    // -----------------------------------------------------------------------
    // Stored shape
    // -----------------------------------------------------------------------

    #[test]
    fn json_field_names() {
        let mut asset = loan();
        asset.assign_addresses("addr-b", "addr-i").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&asset.to_bytes().unwrap()).unwrap();
        assert_eq!(value["assetID"], "loan-7");
        assert_eq!(value["lender"], "lenderA");
        assert_eq!(value["startDate"], 20230101);
        assert_eq!(value["endDate"], 20240101);
        assert_eq!(value["senderAddress"], "addr-b");
        assert_eq!(value["investorAddress"], "addr-i");
        assert_eq!(value["paymentHashes"], serde_json::json!([]));
        assert_eq!(value["state"], "ISSUED");
    }

    #[test]
    fn state_survives_reload() {
        let asset = trading_loan();
        let reloaded = Asset::from_bytes(&asset.to_bytes().unwrap()).unwrap();
        assert_eq!(reloaded.state(), AssetState::Trading);
    }

    #[test]
    fn record_without_state_loads_as_issued() {
        let legacy = br#"{"assetID":"asset1","lender":"x509::alice","borrower":"","startDate":20210101,"amount":300,"endDate":20220101,"senderAddress":"","investorAddress":"","paymentHashes":null}"#;
        let asset = Asset::from_bytes(legacy).unwrap();
        assert_eq!(asset.state(), AssetState::Issued);
        assert!(asset.payment_hashes().is_empty());

        let legacy = br#"{"assetID":"asset1","lender":"x509::alice","borrower":"","startDate":20210101,"amount":300,"endDate":20220101,"senderAddress":"","investorAddress":""}"#;
        let asset = Asset::from_bytes(legacy).unwrap();
        assert_eq!(asset.state(), AssetState::Issued);
        assert!(asset.payment_hashes().is_empty());
    }

    #[test]
    fn unknown_state_name_is_rejected() {
        let bytes = br#"{"assetID":"a","lender":"","borrower":"","startDate":0,"amount":0,"endDate":0,"senderAddress":"","investorAddress":"","paymentHashes":[],"state":"DEFAULTED"}"#;
        assert!(Asset::from_bytes(bytes).is_err());
    }

    #[test]
    fn malformed_bytes_rejected() {
        assert!(Asset::from_bytes(b"not json").is_err());
    }

    proptest! {
        #[test]
        fn stored_bytes_are_stable(
            id in "[a-z0-9-]{1,16}",
            lender in "[A-Za-z]{0,12}",
            start in 19000101i64..21000101,
            end in 19000101i64..21000101,
            amount in 0i64..1_000_000_000,
            hashes in prop::collection::vec("0x[0-9a-f]{1,8}", 0..4),
        ) {
            let mut asset = Asset::new(id, lender, start, end, amount).unwrap();
            for hash in hashes {
                asset.record_payment(hash).unwrap();
            }
            let bytes = asset.to_bytes().unwrap();
            let decoded = Asset::from_bytes(&bytes).unwrap();
            prop_assert_eq!(&decoded, &asset);
            prop_assert_eq!(decoded.to_bytes().unwrap(), bytes);
        }
    }
}

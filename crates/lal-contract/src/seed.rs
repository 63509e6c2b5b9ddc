use lal_types::{Asset, TypeError};

/// Preset terms for one demonstration asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedAsset {
    pub id: &'static str,
    pub start_date: i64,
    pub end_date: i64,
    pub amount: i64,
}

const fn seed(id: &'static str, amount: i64) -> SeedAsset {
    SeedAsset {
        id,
        start_date: 20210101,
        end_date: 20220101,
        amount,
    }
}

impl SeedAsset {
    /// Issue this seed as a fresh asset lent by `lender`.
    pub fn issue(&self, lender: &str) -> Result<Asset, TypeError> {
        Asset::new(self.id, lender, self.start_date, self.end_date, self.amount)
    }
}

/// Demonstration assets written by `init_ledger`.
pub const SEED_ASSETS: [SeedAsset; 6] = [
    seed("asset1", 300),
    seed("asset2", 400),
    seed("asset3", 500),
    seed("asset4", 600),
    seed("asset5", 700),
    seed("asset6", 800),
];

/// Build the seed assets, issued and attributed to `lender`.
pub fn seed_assets(lender: &str) -> Result<Vec<Asset>, TypeError> {
    SEED_ASSETS
        .iter()
        .map(|s| s.issue(lender))
        .collect()
}

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context as _};
use hashmint_codec::{serde_decimal, CollectionConfig, ContentSet, MiningState, RoyaltyParams};
use hashmint_collection::CollectionHandle;
use hashmint_tree::TreeBuilder;
use hashmint_types::Address;
use serde::{Deserialize, Serialize};

/// A collection described in TOML.
///
/// Every field has a default, so a deploy file only names what it changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployFile {
    pub chain_id: i8,
    /// Deployed address. When absent, the content address of the initial
    /// state is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub owner: Address,
    pub next_item_index: u64,
    /// Item template code as hex bytes, sealed into a single node.
    pub item_code: String,
    pub content: ContentSet,
    pub royalty: RoyaltyParams,
    pub mining: MiningSection,
}

impl Default for DeployFile {
    fn default() -> Self {
        Self {
            chain_id: 0,
            address: None,
            owner: Address::None,
            next_item_index: 0,
            item_code: String::new(),
            content: ContentSet::new(
                "https://example.org/collection.json",
                "https://example.org/items/",
            ),
            royalty: RoyaltyParams::new(5, 100, Address::None),
            mining: MiningSection::default(),
        }
    }
}

/// Mining parameters. Big numbers are strings: decimal, `0x` hex, or `2^N`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningSection {
    pub threshold: String,
    pub last_success: u32,
    pub seed: String,
    pub target_interval: u32,
    pub min_exponent: u8,
    pub max_exponent: u8,
}

impl Default for MiningSection {
    fn default() -> Self {
        Self {
            threshold: "2^240".into(),
            last_success: 0,
            seed: "0".into(),
            target_interval: 900,
            min_exponent: 200,
            max_exponent: 252,
        }
    }
}

impl MiningSection {
    pub fn to_state(&self) -> anyhow::Result<MiningState> {
        let threshold = serde_decimal::parse(&self.threshold)
            .ok_or_else(|| anyhow!("invalid threshold: {:?}", self.threshold))?;
        if threshold.bits() > 256 {
            return Err(anyhow!("threshold does not fit in 256 bits"));
        }
        let seed = serde_decimal::parse(&self.seed)
            .and_then(|value| u128::try_from(&value).ok())
            .ok_or_else(|| anyhow!("invalid seed: {:?}", self.seed))?;
        Ok(MiningState {
            threshold,
            last_success: self.last_success,
            seed,
            target_interval: self.target_interval,
            min_exponent: self.min_exponent,
            max_exponent: self.max_exponent,
        })
    }
}

impl DeployFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading deploy file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing deploy file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let raw = toml::to_string_pretty(self).context("serializing deploy file")?;
        fs::write(path, raw).with_context(|| format!("writing deploy file {}", path.display()))
    }

    /// Assemble the initial persisted state.
    pub fn to_config(&self) -> anyhow::Result<CollectionConfig> {
        let code_bytes = hex::decode(&self.item_code).context("item_code is not hex")?;
        let mut code = TreeBuilder::new();
        code.append_bytes(&code_bytes)
            .context("item_code does not fit in one node")?;
        Ok(CollectionConfig {
            owner: self.owner,
            next_item_index: self.next_item_index,
            content: self.content.clone(),
            item_template_code: code.seal(),
            royalty: self.royalty.clone(),
            mining: self.mining.to_state()?,
        })
    }

    /// Handle for `config`, honoring an explicit address.
    pub fn handle(&self, config: &CollectionConfig) -> anyhow::Result<CollectionHandle> {
        match self.address {
            Some(address) => Ok(CollectionHandle::new(address)),
            None => CollectionHandle::for_deployment(self.chain_id, config)
                .context("encoding initial state"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashmint_collection::threshold_for_exponent;

    #[test]
    fn default_deploy_file() {
        let file = DeployFile::default();
        assert_eq!(file.chain_id, 0);
        assert!(file.address.is_none());
        let config = file.to_config().unwrap();
        assert_eq!(config.mining.threshold, threshold_for_exponent(240));
        assert_eq!(config.mining.target_interval, 900);
        assert!(config.item_template_code.bits().is_empty());
    }

    #[test]
    fn load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collection.toml");
        let owner = format!("0:{}", "ab".repeat(32));
        fs::write(
            &path,
            format!(
                r#"
owner = "{owner}"
item_code = "c0ffee"

[mining]
threshold = "0x1000"
seed = "7"
"#
            ),
        )
        .unwrap();

        let file = DeployFile::load(&path).unwrap();
        let config = file.to_config().unwrap();
        assert_eq!(config.owner, owner.parse::<Address>().unwrap());
        assert_eq!(config.mining.threshold, threshold_for_exponent(12));
        assert_eq!(config.mining.seed, 7);
        assert_eq!(config.mining.max_exponent, 252);
        assert_eq!(config.item_template_code.bits().len(), 24);
        assert_eq!(file.content, DeployFile::default().content);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.toml");
        let mut file = DeployFile::default();
        file.address = Some(Address::std(-1, [9; 32]));
        file.save(&path).unwrap();

        let loaded = DeployFile::load(&path).unwrap();
        assert_eq!(loaded.address, file.address);
        let handle = loaded.handle(&loaded.to_config().unwrap()).unwrap();
        assert_eq!(*handle.address(), Address::std(-1, [9; 32]));
    }

    #[test]
    fn derived_address_is_state_hash() {
        let file = DeployFile::default();
        let config = file.to_config().unwrap();
        let handle = file.handle(&config).unwrap();
        assert_eq!(
            handle.address().account_id(),
            Some(config.encode().unwrap().hash().as_bytes())
        );
    }

    #[test]
    fn rejects_bad_values() {
        let mut file = DeployFile::default();
        file.mining.threshold = "2^256".into();
        assert!(file.to_config().is_err());

        let mut file = DeployFile::default();
        file.item_code = "zz".into();
        assert!(file.to_config().is_err());

        let mut file = DeployFile::default();
        file.mining.seed = "not a number".into();
        assert!(file.to_config().is_err());
    }
}

use serde::Deserialize;

use crate::error::{Result, RoundError};

fn default_starting_balance() -> u32 {
    50
}

/// Table settings supplied by the host page.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    #[serde(default = "default_starting_balance")]
    pub starting_balance: u32,
    /// Fixed shuffle seed. Without one the deck is seeded from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            starting_balance: default_starting_balance(),
            seed: None,
        }
    }
}

impl TableConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TableConfig =
            serde_json::from_str(json).map_err(|err| RoundError::Config(err.to_string()))?;
        config.validate()
    }

    pub fn validate(self) -> Result<Self> {
        if self.starting_balance == 0 {
            return Err(RoundError::Config(
                "startingBalance must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }
}

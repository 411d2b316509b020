//! Network identifier.

use crate::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The chain a registry is deployed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Mainnet,
    Ropsten,
    Rinkeby,
    Goerli,
    Kovan,
    /// Local development chain.
    Hardhat,
}

impl NetworkId {
    pub const ALL: [NetworkId; 6] = [
        Self::Mainnet,
        Self::Ropsten,
        Self::Rinkeby,
        Self::Goerli,
        Self::Kovan,
        Self::Hardhat,
    ];

    /// EIP-155 chain id recorded in the deployment address book.
    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Mainnet => 1,
            Self::Ropsten => 3,
            Self::Rinkeby => 4,
            Self::Goerli => 5,
            Self::Kovan => 42,
            Self::Hardhat => 31337,
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Ropsten => "ropsten",
            Self::Rinkeby => "rinkeby",
            Self::Goerli => "goerli",
            Self::Kovan => "kovan",
            Self::Hardhat => "hardhat",
        }
    }
}

impl FromStr for NetworkId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|n| n.as_str() == lower)
            .ok_or_else(|| TypesError::UnknownNetwork(s.to_string()))
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for n in NetworkId::ALL {
            assert_eq!(n.as_str().parse::<NetworkId>().unwrap(), n);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(
            "polygon".parse::<NetworkId>(),
            Err(TypesError::UnknownNetwork("polygon".into()))
        );
    }

    #[test]
    fn hardhat_uses_local_chain_id() {
        assert_eq!("Hardhat".parse::<NetworkId>().unwrap().chain_id(), 31337);
    }
}

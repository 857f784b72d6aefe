//! Router allow-list
//!
//! Maps a transaction's destination to the router family that knows how to
//! decode it. The table is read once (built-in `config/routers.toml` or a
//! user file) and only read afterwards.
//!
//! Config file: config/routers.toml

use alloy::primitives::Address;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, error};

const BUILTIN_ROUTERS: &str = include_str!("../config/routers.toml");

static BUILTIN: Lazy<RouterTable> = Lazy::new(|| match RouterTable::from_toml_str(BUILTIN_ROUTERS) {
    Ok(table) => table,
    Err(e) => {
        error!("Built-in router table is invalid: {:#}", e);
        RouterTable::default()
    }
});

/// Router family of a transaction destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterKind {
    V2,
    V3,
    Universal,
    Unknown,
}

impl fmt::Display for RouterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterKind::V2 => write!(f, "uniswap-v2"),
            RouterKind::V3 => write!(f, "uniswap-v3"),
            RouterKind::Universal => write!(f, "universal-router"),
            RouterKind::Unknown => write!(f, "unknown"),
        }
    }
}

// ---------------------------------------------------------------------------
// TOML structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouterEntry {
    pub address: Address,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChainRouters {
    #[serde(default)]
    pub v2: Vec<RouterEntry>,
    #[serde(default)]
    pub v3: Vec<RouterEntry>,
    #[serde(default)]
    pub universal: Vec<RouterEntry>,
}

impl ChainRouters {
    /// Families in classification priority order
    fn families(&self) -> [(RouterKind, &[RouterEntry]); 3] {
        [
            (RouterKind::V2, self.v2.as_slice()),
            (RouterKind::V3, self.v3.as_slice()),
            (RouterKind::Universal, self.universal.as_slice()),
        ]
    }
}

/// Per-chain router allow-list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouterTable {
    /// Keyed by lowercase chain name
    #[serde(default)]
    chains: HashMap<String, ChainRouters>,
}

impl RouterTable {
    /// The table shipped with the crate
    pub fn builtin() -> &'static RouterTable {
        &BUILTIN
    }

    /// Load a router table from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read router table: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RouterTable =
            toml::from_str(content).context("Failed to parse router table TOML")?;

        let chains = raw
            .chains
            .into_iter()
            .map(|(name, routers)| (name.to_lowercase(), routers))
            .collect();
        Ok(Self { chains })
    }

    /// Router family of `address` on `chain`: the first of v2, v3, universal
    /// that lists it, `Unknown` otherwise (including unknown chains).
    pub fn classify(&self, chain: &str, address: Address) -> RouterKind {
        self.find(chain, address)
            .map(|(kind, _)| kind)
            .unwrap_or(RouterKind::Unknown)
    }

    /// Like `classify`, also returning the matching entry
    pub fn find(&self, chain: &str, address: Address) -> Option<(RouterKind, &RouterEntry)> {
        let routers = self.chain(chain)?;
        let found = routers.families().into_iter().find_map(|(kind, entries)| {
            entries
                .iter()
                .find(|entry| entry.address == address)
                .map(|entry| (kind, entry))
        });
        if let Some((kind, entry)) = found {
            debug!("{} on {} is {} ({})", address, chain, entry.name, kind);
        }
        found
    }

    pub fn chain(&self, chain: &str) -> Option<&ChainRouters> {
        self.chains.get(&chain.to_lowercase())
    }

    /// Known chain names, sorted
    pub fn chain_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.chains.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

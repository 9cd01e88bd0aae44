/* Copyright (C) 2026 Open Information Security Foundation
 *
 * You can copy, redistribute or modify this Program under the terms of
 * the GNU General Public License version 2 as published by the Free
 * Software Foundation.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * version 2 along with this program; if not, write to the Free Software
 * Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA
 * 02110-1301, USA.
 */

//! Constant table registry.
//!
//! The per protocol tables (`*/types.rs`) are plain statics. The registry
//! indexes all of them once, keyed by protocol and table name, and is
//! read-only afterwards.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    Rpc,
    Nfs3,
    Nlm4,
    RpcOrdma,
}

impl Protocol {
    pub fn name(&self) -> &'static str {
        match self {
            Protocol::Rpc => "RPC",
            Protocol::Nfs3 => "NFS3",
            Protocol::Nlm4 => "NLM4",
            Protocol::RpcOrdma => "RPCORDMA",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stability {
    Normal,
    /// Value fixed for all versions.
    Fixed,
    /// Reserved by the protocol, a compliant peer never sends it.
    NotToBeUsed,
}

#[derive(Debug)]
pub struct EnumEntry {
    pub value: i32,
    pub name: &'static str,
    pub stability: Stability,
}

impl EnumEntry {
    pub const fn new(value: u32, name: &'static str) -> EnumEntry {
        EnumEntry { value: value as i32, name, stability: Stability::Normal }
    }

    pub const fn fixed(value: u32, name: &'static str) -> EnumEntry {
        EnumEntry { value: value as i32, name, stability: Stability::Fixed }
    }

    pub const fn not_to_be_used(value: u32, name: &'static str) -> EnumEntry {
        EnumEntry { value: value as i32, name, stability: Stability::NotToBeUsed }
    }
}

#[derive(Debug)]
pub struct EnumTable {
    pub protocol: Protocol,
    pub name: &'static str,
    pub entries: &'static [EnumEntry],
}

#[derive(Debug)]
pub struct SizeLimit {
    pub protocol: Protocol,
    pub name: &'static str,
    pub value: u32,
}

struct TableIndex {
    table: &'static EnumTable,
    by_value: HashMap<i32, &'static EnumEntry>,
    by_name: HashMap<&'static str, i32>,
}

pub struct Registry {
    tables: HashMap<(Protocol, &'static str), TableIndex>,
    limits: HashMap<(Protocol, &'static str), u32>,
}

impl Registry {
    fn build() -> Registry {
        let mut registry = Registry {
            tables: HashMap::new(),
            limits: HashMap::new(),
        };
        let tables = crate::rpc::types::TABLES.iter()
            .chain(crate::nfs::nfs3_types::TABLES.iter())
            .chain(crate::nfs::nlm4_types::TABLES.iter())
            .chain(crate::rpcordma::types::TABLES.iter());
        for &table in tables {
            registry.add_table(table);
        }
        let limits = crate::rpc::types::LIMITS.iter()
            .chain(crate::nfs::nfs3_types::LIMITS.iter())
            .chain(crate::nfs::nlm4_types::LIMITS.iter());
        for limit in limits {
            registry.limits.insert((limit.protocol, limit.name), limit.value);
        }
        registry
    }

    fn add_table(&mut self, table: &'static EnumTable) {
        let mut by_value = HashMap::with_capacity(table.entries.len());
        let mut by_name = HashMap::with_capacity(table.entries.len());
        for entry in table.entries {
            by_value.insert(entry.value, entry);
            by_name.insert(entry.name, entry.value);
        }
        self.tables.insert((table.protocol, table.name),
                           TableIndex { table, by_value, by_name });
    }

    pub fn table(&self, protocol: Protocol, table: &'static str) -> Option<&'static EnumTable> {
        self.tables.get(&(protocol, table)).map(|t| t.table)
    }

    pub fn entry(&self, protocol: Protocol, table: &'static str, code: i32) -> Option<&'static EnumEntry> {
        self.tables.get(&(protocol, table))
            .and_then(|t| t.by_value.get(&code).copied())
    }

    pub fn lookup(&self, protocol: Protocol, table: &'static str, code: i32) -> Option<&'static str> {
        self.entry(protocol, table, code).map(|e| e.name)
    }

    pub fn code_of(&self, protocol: Protocol, table: &'static str, name: &str) -> Option<i32> {
        self.tables.get(&(protocol, table))
            .and_then(|t| t.by_name.get(name).copied())
    }

    pub fn limit(&self, protocol: Protocol, name: &'static str) -> Option<u32> {
        self.limits.get(&(protocol, name)).copied()
    }
}

lazy_static! {
    static ref REGISTRY: Registry = Registry::build();
}

pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Symbolic name of `code` in `table`, if the table knows it.
pub fn lookup(protocol: Protocol, table: &'static str, code: i32) -> Option<&'static str> {
    registry().lookup(protocol, table, code)
}

/// Name of `code` or the synthesized `UNKNOWN(n)` label.
pub fn label(protocol: Protocol, table: &'static str, code: i32) -> String {
    match lookup(protocol, table, code) {
        Some(name) => name.to_string(),
        None => format!("UNKNOWN({})", code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup(Protocol::Nlm4, "nlm4_stats", 5), Some("NLM4_DEADLCK"));
        assert_eq!(lookup(Protocol::Nlm4, "nlm_proc4", 20), Some("NLMPROC4_SHARE"));
        assert_eq!(lookup(Protocol::Nlm4, "nlm_proc4", 16), None);
        assert_eq!(lookup(Protocol::RpcOrdma, "rdma_proc", 4), Some("RDMA_ERROR"));
        assert_eq!(lookup(Protocol::Nfs3, "no_such_table", 0), None);
    }

    #[test]
    fn test_label_unknown() {
        assert_eq!(label(Protocol::Nlm4, "nlm4_stats", 42), "UNKNOWN(42)");
        assert_eq!(label(Protocol::Rpc, "msg_type", 1), "REPLY");
    }

    #[test]
    fn test_stability() {
        let r = registry();
        let msgp = r.entry(Protocol::RpcOrdma, "rdma_proc", 2).unwrap();
        assert_eq!(msgp.stability, Stability::NotToBeUsed);
        let msg = r.entry(Protocol::RpcOrdma, "rdma_proc", 0).unwrap();
        assert_eq!(msg.stability, Stability::Fixed);
        let chunk = r.entry(Protocol::RpcOrdma, "rpc_rdma_errcode", 2).unwrap();
        assert_eq!(chunk.stability, Stability::Normal);
    }

    #[test]
    fn test_limits_and_names() {
        let r = registry();
        assert_eq!(r.limit(Protocol::Nlm4, "MAXNETOBJ_SZ"), Some(1024));
        assert_eq!(r.limit(Protocol::Nlm4, "MAXNAMELEN"), Some(1025));
        assert_eq!(r.limit(Protocol::Nfs3, "NFS3_FHSIZE"), Some(64));
        assert_eq!(r.code_of(Protocol::Nfs3, "nfs_proc3", "READDIRPLUS"), Some(17));
    }
}

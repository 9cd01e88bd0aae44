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

//! Procedure argument and result shapes of the RPC programs we decode,
//! keyed by (program, version, procedure).

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::error::DecodeError;
use crate::registry::{registry, Protocol};
use crate::xdr::{ChunkMap, XdrDecoder, XdrType, XdrValue};

pub struct Procedure {
    pub number: u32,
    pub name: &'static str,
    pub args: XdrType,
    pub res: XdrType,
}

pub struct Program {
    pub protocol: Protocol,
    pub program: u32,
    pub version: u32,
    procedures: HashMap<u32, Procedure>,
    proc_table: &'static str,
}

impl Program {
    pub fn new(protocol: Protocol, program: u32, version: u32,
               proc_table: &'static str) -> Program
    {
        Program {
            protocol,
            program,
            version,
            procedures: HashMap::new(),
            proc_table,
        }
    }

    /// Register a procedure. The name comes from the procedure table.
    pub fn procedure(mut self, number: u32, args: XdrType, res: XdrType) -> Program {
        let name = registry()
            .lookup(self.protocol, self.proc_table, number as i32)
            .unwrap_or("UNKNOWN");
        self.procedures.insert(number, Procedure { number, name, args, res });
        self
    }

    pub fn get(&self, procedure: u32) -> Option<&Procedure> {
        self.procedures.get(&procedure)
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }
}

lazy_static! {
    static ref PROGRAMS: HashMap<(u32, u32), Program> = {
        let mut m = HashMap::new();
        for p in [crate::nfs::nfs3_records::program(), crate::nfs::nlm4_records::program()] {
            m.insert((p.program, p.version), p);
        }
        m
    };
}

pub fn lookup_program(program: u32, version: u32) -> Option<&'static Program> {
    PROGRAMS.get(&(program, version))
}

pub fn lookup_procedure(program: u32, version: u32, procedure: u32)
    -> Option<(&'static Program, &'static Procedure)>
{
    let p = lookup_program(program, version)?;
    Some((p, p.get(procedure)?))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Args,
    Results,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BodyOptions<'a> {
    pub strict_enums: bool,
    /// Out-of-line data of an RPC-over-RDMA message.
    pub chunks: Option<&'a ChunkMap>,
}

/// A decoded procedure body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Body {
    pub protocol: Option<Protocol>,
    /// Procedure name, `None` for unknown procedures.
    pub procedure: Option<&'static str>,
    pub value: XdrValue,
    /// Bytes of the message the body decoder did not use.
    pub trailing: usize,
}

/// Decode the arguments or results of `procedure`, starting at `offset`
/// of `message`. Unknown procedures keep the body as opaque bytes.
pub fn decode_body(program: u32, version: u32, procedure: u32, kind: BodyKind,
                   message: &[u8], offset: usize, opts: BodyOptions)
    -> Result<Body, DecodeError>
{
    let (prog, procd) = match lookup_procedure(program, version, procedure) {
        Some(found) => found,
        None => {
            SCLogDebug!("no shape for program {} version {} procedure {}",
                        program, version, procedure);
            let raw = message.get(offset..).unwrap_or(&[]);
            return Ok(Body {
                protocol: None,
                procedure: None,
                value: XdrValue::Opaque(raw.to_vec()),
                trailing: 0,
            });
        }
    };
    let ty = match kind {
        BodyKind::Args => &procd.args,
        BodyKind::Results => &procd.res,
    };
    let mut decoder = XdrDecoder::at(message, offset).strict_enums(opts.strict_enums);
    if let Some(chunks) = opts.chunks {
        decoder = decoder.with_chunks(chunks, kind == BodyKind::Results);
    }
    let value = decoder.decode(ty).map_err(|e| e.in_protocol(prog.protocol.name()))?;
    let trailing = message.len() - decoder.offset();
    if trailing > 0 {
        SCLogDebug!("{} {}: {} trailing bytes", prog.protocol, procd.name, trailing);
    }
    Ok(Body {
        protocol: Some(prog.protocol),
        procedure: Some(procd.name),
        value,
        trailing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::types::{NFS_PROGRAM, NLM_PROGRAM};

    #[test]
    fn test_program_tables() {
        let nfs = lookup_program(NFS_PROGRAM, 3).unwrap();
        assert_eq!(nfs.len(), 22);
        assert_eq!(nfs.get(17).unwrap().name, "READDIRPLUS");
        let nlm = lookup_program(NLM_PROGRAM, 4).unwrap();
        assert_eq!(nlm.len(), 20);
        assert_eq!(nlm.get(20).unwrap().name, "NLMPROC4_SHARE");
        assert!(lookup_program(NFS_PROGRAM, 4).is_none());
    }

    #[test]
    fn test_unknown_procedure_kept_opaque() {
        let msg = [0u8, 0, 0, 1, 0xde, 0xad, 0xbe, 0xef];
        let body = decode_body(NFS_PROGRAM, 3, 99, BodyKind::Args, &msg, 4,
                               BodyOptions::default()).unwrap();
        assert_eq!(body.procedure, None);
        assert_eq!(body.value, XdrValue::Opaque(vec![0xde, 0xad, 0xbe, 0xef]));

        let body = decode_body(100005, 3, 1, BodyKind::Results, &msg, 0,
                               BodyOptions::default()).unwrap();
        assert_eq!(body.value.as_bytes().map(|b| b.len()), Some(8));
    }
}

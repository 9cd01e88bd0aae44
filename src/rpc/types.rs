/* Copyright (C) 2017-2026 Open Information Security Foundation
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

/* RFC 5531, ONC RPC version 2 */

use crate::registry::{EnumEntry, EnumTable, Protocol, SizeLimit};

pub const RPC_VERSION: u32 = 2;

pub const NFS_PROGRAM: u32 = 100003;
pub const NLM_PROGRAM: u32 = 100021;

pub const MAX_AUTH_BYTES: u32 = 400;
pub const MAX_MACHINE_NAME: u32 = 255;
pub const MAX_AUTH_GIDS: u32 = 16;

pub const CALL:  u32 = 0;
pub const REPLY: u32 = 1;

pub const MSG_ACCEPTED: u32 = 0;
pub const MSG_DENIED:   u32 = 1;

pub const SUCCESS:       u32 = 0;
pub const PROG_UNAVAIL:  u32 = 1;
pub const PROG_MISMATCH: u32 = 2;
pub const PROC_UNAVAIL:  u32 = 3;
pub const GARBAGE_ARGS:  u32 = 4;
pub const SYSTEM_ERR:    u32 = 5;

pub const RPC_MISMATCH: u32 = 0;
pub const AUTH_ERROR:   u32 = 1;

pub const AUTH_NONE:  u32 = 0;
pub const AUTH_SYS:   u32 = 1;
pub const AUTH_SHORT: u32 = 2;
pub const AUTH_DH:    u32 = 3;
pub const RPCSEC_GSS: u32 = 6;

pub static MSG_TYPE: EnumTable = EnumTable {
    protocol: Protocol::Rpc,
    name: "msg_type",
    entries: &[
        EnumEntry::new(CALL, "CALL"),
        EnumEntry::new(REPLY, "REPLY"),
    ],
};

pub static REPLY_STAT: EnumTable = EnumTable {
    protocol: Protocol::Rpc,
    name: "reply_stat",
    entries: &[
        EnumEntry::new(MSG_ACCEPTED, "MSG_ACCEPTED"),
        EnumEntry::new(MSG_DENIED, "MSG_DENIED"),
    ],
};

pub static ACCEPT_STAT: EnumTable = EnumTable {
    protocol: Protocol::Rpc,
    name: "accept_stat",
    entries: &[
        EnumEntry::new(SUCCESS, "SUCCESS"),
        EnumEntry::new(PROG_UNAVAIL, "PROG_UNAVAIL"),
        EnumEntry::new(PROG_MISMATCH, "PROG_MISMATCH"),
        EnumEntry::new(PROC_UNAVAIL, "PROC_UNAVAIL"),
        EnumEntry::new(GARBAGE_ARGS, "GARBAGE_ARGS"),
        EnumEntry::new(SYSTEM_ERR, "SYSTEM_ERR"),
    ],
};

pub static REJECT_STAT: EnumTable = EnumTable {
    protocol: Protocol::Rpc,
    name: "reject_stat",
    entries: &[
        EnumEntry::new(RPC_MISMATCH, "RPC_MISMATCH"),
        EnumEntry::new(AUTH_ERROR, "AUTH_ERROR"),
    ],
};

pub static AUTH_FLAVOR: EnumTable = EnumTable {
    protocol: Protocol::Rpc,
    name: "auth_flavor",
    entries: &[
        EnumEntry::new(AUTH_NONE, "AUTH_NONE"),
        EnumEntry::new(AUTH_SYS, "AUTH_SYS"),
        EnumEntry::new(AUTH_SHORT, "AUTH_SHORT"),
        EnumEntry::new(AUTH_DH, "AUTH_DH"),
        EnumEntry::new(RPCSEC_GSS, "RPCSEC_GSS"),
    ],
};

pub static AUTH_STAT: EnumTable = EnumTable {
    protocol: Protocol::Rpc,
    name: "auth_stat",
    entries: &[
        EnumEntry::new(0, "AUTH_OK"),
        EnumEntry::new(1, "AUTH_BADCRED"),
        EnumEntry::new(2, "AUTH_REJECTEDCRED"),
        EnumEntry::new(3, "AUTH_BADVERF"),
        EnumEntry::new(4, "AUTH_REJECTEDVERF"),
        EnumEntry::new(5, "AUTH_TOOWEAK"),
        EnumEntry::new(6, "AUTH_INVALIDRESP"),
        EnumEntry::new(7, "AUTH_FAILED"),
        EnumEntry::new(8, "AUTH_KERB_GENERIC"),
        EnumEntry::new(9, "AUTH_TIMEEXPIRE"),
        EnumEntry::new(10, "AUTH_TKT_FILE"),
        EnumEntry::new(11, "AUTH_DECODE"),
        EnumEntry::new(12, "AUTH_NET_ADDR"),
        EnumEntry::new(13, "RPCSEC_GSS_CREDPROBLEM"),
        EnumEntry::new(14, "RPCSEC_GSS_CTXPROBLEM"),
    ],
};

pub static TABLES: &[&EnumTable] = &[
    &MSG_TYPE,
    &REPLY_STAT,
    &ACCEPT_STAT,
    &REJECT_STAT,
    &AUTH_FLAVOR,
    &AUTH_STAT,
];

pub static LIMITS: &[SizeLimit] = &[
    SizeLimit { protocol: Protocol::Rpc, name: "MAX_AUTH_BYTES", value: MAX_AUTH_BYTES },
    SizeLimit { protocol: Protocol::Rpc, name: "MAX_MACHINE_NAME", value: MAX_MACHINE_NAME },
    SizeLimit { protocol: Protocol::Rpc, name: "MAX_AUTH_GIDS", value: MAX_AUTH_GIDS },
];

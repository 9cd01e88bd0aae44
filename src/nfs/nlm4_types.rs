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

/* Network Lock Manager, version 4 (nlm4.x) */

use crate::registry::{EnumEntry, EnumTable, Protocol, SizeLimit};

pub const LM_MAXSTRLEN: u32 = 1024;
pub const MAXNAMELEN:   u32 = LM_MAXSTRLEN + 1;
pub const MAXNETOBJ_SZ: u32 = 1024;

pub const NLM4_GRANTED:             u32 = 0;
pub const NLM4_DENIED:              u32 = 1;
pub const NLM4_DENIED_NOLOCKS:      u32 = 2;
pub const NLM4_BLOCKED:             u32 = 3;
pub const NLM4_DENIED_GRACE_PERIOD: u32 = 4;
pub const NLM4_DEADLCK:             u32 = 5;
pub const NLM4_ROFS:                u32 = 6;
pub const NLM4_STALE_FH:            u32 = 7;
pub const NLM4_FBIG:                u32 = 8;
pub const NLM4_FAILED:              u32 = 9;

pub const NLMPROC4_NULL:        u32 = 0;
pub const NLMPROC4_TEST:        u32 = 1;
pub const NLMPROC4_LOCK:        u32 = 2;
pub const NLMPROC4_CANCEL:      u32 = 3;
pub const NLMPROC4_UNLOCK:      u32 = 4;
pub const NLMPROC4_GRANTED:     u32 = 5;
pub const NLMPROC4_TEST_MSG:    u32 = 6;
pub const NLMPROC4_LOCK_MSG:    u32 = 7;
pub const NLMPROC4_CANCEL_MSG:  u32 = 8;
pub const NLMPROC4_UNLOCK_MSG:  u32 = 9;
pub const NLMPROC4_GRANTED_MSG: u32 = 10;
pub const NLMPROC4_TEST_RES:    u32 = 11;
pub const NLMPROC4_LOCK_RES:    u32 = 12;
pub const NLMPROC4_CANCEL_RES:  u32 = 13;
pub const NLMPROC4_UNLOCK_RES:  u32 = 14;
pub const NLMPROC4_GRANTED_RES: u32 = 15;
pub const NLMPROC4_SHARE:       u32 = 20;
pub const NLMPROC4_UNSHARE:     u32 = 21;
pub const NLMPROC4_NM_LOCK:     u32 = 22;
pub const NLMPROC4_FREE_ALL:    u32 = 23;

pub static NFS_BOOL: EnumTable = EnumTable {
    protocol: Protocol::Nlm4,
    name: "nfs_bool",
    entries: &[
        EnumEntry::new(0, "FALSE"),
        EnumEntry::new(1, "TRUE"),
    ],
};

pub static NLM4_STATS: EnumTable = EnumTable {
    protocol: Protocol::Nlm4,
    name: "nlm4_stats",
    entries: &[
        EnumEntry::new(NLM4_GRANTED, "NLM4_GRANTED"),
        EnumEntry::new(NLM4_DENIED, "NLM4_DENIED"),
        EnumEntry::new(NLM4_DENIED_NOLOCKS, "NLM4_DENIED_NOLOCKS"),
        EnumEntry::new(NLM4_BLOCKED, "NLM4_BLOCKED"),
        EnumEntry::new(NLM4_DENIED_GRACE_PERIOD, "NLM4_DENIED_GRACE_PERIOD"),
        EnumEntry::new(NLM4_DEADLCK, "NLM4_DEADLCK"),
        EnumEntry::new(NLM4_ROFS, "NLM4_ROFS"),
        EnumEntry::new(NLM4_STALE_FH, "NLM4_STALE_FH"),
        EnumEntry::new(NLM4_FBIG, "NLM4_FBIG"),
        EnumEntry::new(NLM4_FAILED, "NLM4_FAILED"),
    ],
};

pub static FSH4_MODE: EnumTable = EnumTable {
    protocol: Protocol::Nlm4,
    name: "fsh4_mode",
    entries: &[
        EnumEntry::new(0, "fsm_DN"),
        EnumEntry::new(1, "fsm_DR"),
        EnumEntry::new(2, "fsm_DW"),
        EnumEntry::new(3, "fsm_DRW"),
    ],
};

pub static FSH4_ACCESS: EnumTable = EnumTable {
    protocol: Protocol::Nlm4,
    name: "fsh4_access",
    entries: &[
        EnumEntry::new(0, "fsa_NONE"),
        EnumEntry::new(1, "fsa_R"),
        EnumEntry::new(2, "fsa_W"),
        EnumEntry::new(3, "fsa_RW"),
    ],
};

pub static NLM_PROC4: EnumTable = EnumTable {
    protocol: Protocol::Nlm4,
    name: "nlm_proc4",
    entries: &[
        EnumEntry::new(NLMPROC4_NULL, "NLMPROC4_NULL"),
        EnumEntry::new(NLMPROC4_TEST, "NLMPROC4_TEST"),
        EnumEntry::new(NLMPROC4_LOCK, "NLMPROC4_LOCK"),
        EnumEntry::new(NLMPROC4_CANCEL, "NLMPROC4_CANCEL"),
        EnumEntry::new(NLMPROC4_UNLOCK, "NLMPROC4_UNLOCK"),
        EnumEntry::new(NLMPROC4_GRANTED, "NLMPROC4_GRANTED"),
        EnumEntry::new(NLMPROC4_TEST_MSG, "NLMPROC4_TEST_MSG"),
        EnumEntry::new(NLMPROC4_LOCK_MSG, "NLMPROC4_LOCK_MSG"),
        EnumEntry::new(NLMPROC4_CANCEL_MSG, "NLMPROC4_CANCEL_MSG"),
        EnumEntry::new(NLMPROC4_UNLOCK_MSG, "NLMPROC4_UNLOCK_MSG"),
        EnumEntry::new(NLMPROC4_GRANTED_MSG, "NLMPROC4_GRANTED_MSG"),
        EnumEntry::new(NLMPROC4_TEST_RES, "NLMPROC4_TEST_RES"),
        EnumEntry::new(NLMPROC4_LOCK_RES, "NLMPROC4_LOCK_RES"),
        EnumEntry::new(NLMPROC4_CANCEL_RES, "NLMPROC4_CANCEL_RES"),
        EnumEntry::new(NLMPROC4_UNLOCK_RES, "NLMPROC4_UNLOCK_RES"),
        EnumEntry::new(NLMPROC4_GRANTED_RES, "NLMPROC4_GRANTED_RES"),
        EnumEntry::new(NLMPROC4_SHARE, "NLMPROC4_SHARE"),
        EnumEntry::new(NLMPROC4_UNSHARE, "NLMPROC4_UNSHARE"),
        EnumEntry::new(NLMPROC4_NM_LOCK, "NLMPROC4_NM_LOCK"),
        EnumEntry::new(NLMPROC4_FREE_ALL, "NLMPROC4_FREE_ALL"),
    ],
};

pub static TABLES: &[&EnumTable] = &[
    &NFS_BOOL,
    &NLM4_STATS,
    &FSH4_MODE,
    &FSH4_ACCESS,
    &NLM_PROC4,
];

pub static LIMITS: &[SizeLimit] = &[
    SizeLimit { protocol: Protocol::Nlm4, name: "LM_MAXSTRLEN", value: LM_MAXSTRLEN },
    SizeLimit { protocol: Protocol::Nlm4, name: "MAXNAMELEN", value: MAXNAMELEN },
    SizeLimit { protocol: Protocol::Nlm4, name: "MAXNETOBJ_SZ", value: MAXNETOBJ_SZ },
];

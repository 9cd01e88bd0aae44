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

//! NLMv4 argument and result shapes

use crate::nfs::nlm4_types::*;
use crate::registry::Protocol;
use crate::rpc::programs::Program;
use crate::rpc::types::NLM_PROGRAM;
use crate::xdr::types::*;

fn netobj() -> XdrType {
    opaque(Some(MAXNETOBJ_SZ))
}

fn nlm4_stats() -> XdrType {
    enumeration(Protocol::Nlm4, "nlm4_stats")
}

fn nlm4_lock() -> XdrType {
    structure(vec![
        field("caller_name", string(Some(LM_MAXSTRLEN))),
        field("fh", netobj()),
        field("oh", netobj()),
        field("svid", int()),
        field("l_offset", uhyper()),
        field("l_len", uhyper()),
    ])
}

fn nlm4_holder() -> XdrType {
    structure(vec![
        field("exclusive", boolean()),
        field("svid", int()),
        field("oh", netobj()),
        field("l_offset", uhyper()),
        field("l_len", uhyper()),
    ])
}

fn nlm4_testargs() -> XdrType {
    structure(vec![
        field("cookie", netobj()),
        field("exclusive", boolean()),
        field("alock", nlm4_lock()),
    ])
}

fn nlm4_lockargs() -> XdrType {
    structure(vec![
        field("cookie", netobj()),
        field("block", boolean()),
        field("exclusive", boolean()),
        field("alock", nlm4_lock()),
        field("reclaim", boolean()),
        field("state", int()),
    ])
}

fn nlm4_cancargs() -> XdrType {
    structure(vec![
        field("cookie", netobj()),
        field("block", boolean()),
        field("exclusive", boolean()),
        field("alock", nlm4_lock()),
    ])
}

fn nlm4_unlockargs() -> XdrType {
    structure(vec![
        field("cookie", netobj()),
        field("alock", nlm4_lock()),
    ])
}

fn nlm4_res() -> XdrType {
    structure(vec![
        field("cookie", netobj()),
        field("stat", structure(vec![field("stat", nlm4_stats())])),
    ])
}

fn nlm4_testres() -> XdrType {
    structure(vec![
        field("cookie", netobj()),
        field("stat", union(nlm4_stats())
              .arm(NLM4_DENIED, "holder", nlm4_holder())
              .default_arm("void", void())
              .build()),
    ])
}

fn nlm4_shareargs() -> XdrType {
    structure(vec![
        field("cookie", netobj()),
        field("share", structure(vec![
            field("caller_name", string(Some(LM_MAXSTRLEN))),
            field("fh", netobj()),
            field("oh", netobj()),
            field("mode", enumeration(Protocol::Nlm4, "fsh4_mode")),
            field("access", enumeration(Protocol::Nlm4, "fsh4_access")),
        ])),
        field("reclaim", boolean()),
    ])
}

fn nlm4_shareres() -> XdrType {
    structure(vec![
        field("cookie", netobj()),
        field("stat", nlm4_stats()),
        field("sequence", int()),
    ])
}

fn nlm4_notify() -> XdrType {
    structure(vec![
        field("name", string(Some(MAXNAMELEN))),
        field("state", int()),
    ])
}

/// NLM program 100021 version 4.
pub fn program() -> Program {
    let procs: Vec<(u32, XdrType, XdrType)> = vec![
        (NLMPROC4_NULL, void(), void()),
        (NLMPROC4_TEST, nlm4_testargs(), nlm4_testres()),
        (NLMPROC4_LOCK, nlm4_lockargs(), nlm4_res()),
        (NLMPROC4_CANCEL, nlm4_cancargs(), nlm4_res()),
        (NLMPROC4_UNLOCK, nlm4_unlockargs(), nlm4_res()),
        (NLMPROC4_GRANTED, nlm4_testargs(), nlm4_res()),
        // asynchronous variants: the answer is a separate _RES call
        (NLMPROC4_TEST_MSG, nlm4_testargs(), void()),
        (NLMPROC4_LOCK_MSG, nlm4_lockargs(), void()),
        (NLMPROC4_CANCEL_MSG, nlm4_cancargs(), void()),
        (NLMPROC4_UNLOCK_MSG, nlm4_unlockargs(), void()),
        (NLMPROC4_GRANTED_MSG, nlm4_testargs(), void()),
        (NLMPROC4_TEST_RES, nlm4_testres(), void()),
        (NLMPROC4_LOCK_RES, nlm4_res(), void()),
        (NLMPROC4_CANCEL_RES, nlm4_res(), void()),
        (NLMPROC4_UNLOCK_RES, nlm4_res(), void()),
        (NLMPROC4_GRANTED_RES, nlm4_res(), void()),
        (NLMPROC4_SHARE, nlm4_shareargs(), nlm4_shareres()),
        (NLMPROC4_UNSHARE, nlm4_shareargs(), nlm4_shareres()),
        (NLMPROC4_NM_LOCK, nlm4_lockargs(), nlm4_res()),
        (NLMPROC4_FREE_ALL, nlm4_notify(), void()),
    ];
    procs.into_iter().fold(Program::new(Protocol::Nlm4, NLM_PROGRAM, 4, "nlm_proc4"),
                           |p, (n, args, res)| p.procedure(n, args, res))
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::nfs::nlm4_types::*;
    use crate::rpc::programs::*;
    use crate::rpc::types::NLM_PROGRAM;
    use crate::xdr::{encode, XdrType, XdrValue};
    use test_case::test_case;

    fn decode(procedure: u32, kind: BodyKind, buf: &[u8])
        -> Result<Body, crate::error::DecodeError>
    {
        decode_body(NLM_PROGRAM, 4, procedure, kind, buf, 0, BodyOptions::default())
    }

    fn descriptor(procedure: u32, kind: BodyKind) -> &'static XdrType {
        let (_, p) = lookup_procedure(NLM_PROGRAM, 4, procedure).unwrap();
        match kind {
            BodyKind::Args => &p.args,
            BodyKind::Results => &p.res,
        }
    }

    fn test_res_denied() -> Vec<u8> {
        vec![
            0x00, 0x00, 0x00, 0x00, // cookie
            0x00, 0x00, 0x00, 0x01, // NLM4_DENIED
            0x00, 0x00, 0x00, 0x01, // exclusive
            0x00, 0x00, 0x00, 0x07, // svid
            0x00, 0x00, 0x00, 0x00, // oh
            0, 0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0, 0, 0, 1,
        ]
    }

    fn share_args() -> Vec<u8> {
        vec![
            0x00, 0x00, 0x00, 0x00, // cookie
            0x00, 0x00, 0x00, 0x01, b'h', 0x00, 0x00, 0x00, // caller_name
            0x00, 0x00, 0x00, 0x00, // fh
            0x00, 0x00, 0x00, 0x00, // oh
            0x00, 0x00, 0x00, 0x01, // fsm_DR
            0x00, 0x00, 0x00, 0x03, // fsa_RW
            0x00, 0x00, 0x00, 0x00, // reclaim
        ]
    }

    fn lock_args(fh_len: u32) -> Vec<u8> {
        let mut buf = vec![
            0x00, 0x00, 0x00, 0x04, 0xc0, 0x0c, 0x1e, 0x01, // cookie
            0x00, 0x00, 0x00, 0x01, // block
            0x00, 0x00, 0x00, 0x01, // exclusive
            0x00, 0x00, 0x00, 0x06, b'c', b'l', b'i', b'e', b'n', b't', 0x00, 0x00,
        ];
        buf.extend_from_slice(&fh_len.to_be_bytes());
        let padded = ((fh_len + 3) & !3) as usize;
        buf.extend(std::iter::repeat(0x11).take(fh_len as usize));
        buf.extend(std::iter::repeat(0x00).take(padded - fh_len as usize));
        buf.extend_from_slice(&[
            0x00, 0x00, 0x00, 0x02, 0x22, 0x22, 0x00, 0x00, // oh
            0x00, 0x00, 0x01, 0x00, // svid
            0, 0, 0, 0, 0, 0, 0, 0, // l_offset
            0, 0, 0, 0, 0, 0, 0x10, 0, // l_len
            0x00, 0x00, 0x00, 0x00, // reclaim
            0x00, 0x00, 0x00, 0x03, // state
        ]);
        buf
    }

    #[test]
    fn test_nlm4_lock_args() {
        let buf = lock_args(32);
        let body = decode(NLMPROC4_LOCK, BodyKind::Args, &buf).unwrap();
        assert_eq!(body.procedure, Some("NLMPROC4_LOCK"));
        assert_eq!(body.trailing, 0);
        let v = &body.value;
        assert_eq!(v.path("block"), Some(&XdrValue::Bool(true)));
        assert_eq!(v.path("alock.caller_name").unwrap().as_bytes(), Some(&b"client"[..]));
        assert_eq!(v.path("alock.svid"), Some(&XdrValue::Int(256)));
        assert_eq!(v.path("alock.l_len").unwrap().as_u64(), Some(0x1000));
        assert_eq!(v.path("state"), Some(&XdrValue::Int(3)));
    }

    #[test_case(1024, true ; "netobj at the limit")]
    #[test_case(1025, false ; "netobj over the limit")]
    fn test_nlm4_netobj_limit(fh_len: u32, ok: bool) {
        let buf = lock_args(fh_len);
        let r = decode(NLMPROC4_LOCK_MSG, BodyKind::Args, &buf);
        if ok {
            assert!(r.is_ok());
        } else {
            let err = r.unwrap_err();
            assert_eq!(err.kind, ErrorKind::LengthExceeded { length: 1025, max: 1024 });
            assert_eq!(err.path, "alock.fh");
            assert_eq!(err.protocol, "NLM4");
        }
    }

    #[test]
    fn test_nlm4_test_res_denied() {
        let buf = test_res_denied();
        let body = decode(NLMPROC4_TEST_RES, BodyKind::Args, &buf).unwrap();
        let stat = body.value.path("stat").unwrap().as_union().unwrap();
        assert_eq!(stat.discriminant.as_enum().unwrap().label(), "NLM4_DENIED");
        assert_eq!(body.value.path("stat.holder.svid"), Some(&XdrValue::Int(7)));
    }

    #[test]
    fn test_nlm4_res_deadlock() {
        let buf: &[u8] = &[
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x05,
        ];
        let body = decode(NLMPROC4_LOCK, BodyKind::Results, buf).unwrap();
        let stat = body.value.path("stat.stat").unwrap().as_enum().unwrap();
        assert_eq!(stat.label(), "NLM4_DEADLCK");
    }

    #[test]
    fn test_nlm4_share() {
        let buf = share_args();
        let body = decode(NLMPROC4_SHARE, BodyKind::Args, &buf).unwrap();
        assert_eq!(body.value.path("share.mode").unwrap().as_enum().unwrap().label(), "fsm_DR");
        assert_eq!(body.value.path("share.access").unwrap().as_enum().unwrap().label(), "fsa_RW");
    }

    #[test]
    fn test_nlm4_free_all() {
        let buf: &[u8] = &[
            0x00, 0x00, 0x00, 0x02, b'h', b'1', 0x00, 0x00,
            0x00, 0x00, 0x00, 0x09,
        ];
        let body = decode(NLMPROC4_FREE_ALL, BodyKind::Args, buf).unwrap();
        assert_eq!(body.procedure, Some("NLMPROC4_FREE_ALL"));
        assert_eq!(body.value.path("state"), Some(&XdrValue::Int(9)));
    }

    #[test_case(NLMPROC4_LOCK, BodyKind::Args, lock_args(32) ; "lock args")]
    #[test_case(NLMPROC4_LOCK, BodyKind::Args, lock_args(1021) ; "lock args padded netobj")]
    #[test_case(NLMPROC4_TEST_RES, BodyKind::Args, test_res_denied() ; "test res denied")]
    #[test_case(NLMPROC4_SHARE, BodyKind::Args, share_args() ; "share args")]
    #[test_case(NLMPROC4_LOCK, BodyKind::Results, vec![0, 0, 0, 0, 0, 0, 0, 5] ; "lock results")]
    fn test_nlm4_reencode(procedure: u32, kind: BodyKind, buf: Vec<u8>) {
        let body = decode(procedure, kind, &buf).unwrap();
        let out = encode(&body.value, descriptor(procedure, kind)).unwrap();
        assert_eq!(out, buf);
        assert_eq!(decode(procedure, kind, &out).unwrap(), body);
    }

    #[test_case(NLMPROC4_LOCK, lock_args(32) ; "lock args")]
    #[test_case(NLMPROC4_TEST_RES, test_res_denied() ; "test res denied")]
    #[test_case(NLMPROC4_SHARE, share_args() ; "share args")]
    fn test_nlm4_truncated_at_every_word(procedure: u32, buf: Vec<u8>) {
        for cut in (0..buf.len()).step_by(4) {
            let err = decode(procedure, BodyKind::Args, &buf[..cut]).unwrap_err();
            assert!(err.is_truncated(), "cut at {}: {:?}", cut, err);
            assert_eq!(err.protocol, "NLM4");
        }
    }
}

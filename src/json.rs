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

//! JSON rendering of decoded records and pipeline events.

use serde_json::{json, Map, Value};

use crate::decoder::{Event, Message};
use crate::error::DecodeError;
use crate::rpc::matcher::FlowKey;
use crate::rpcordma::rpcordma_records::RdmaHeader;
use crate::xdr::{ChunkRef, XdrValue};

pub fn bytes_to_hex(bytes: &[u8]) -> String {
    let strings: Vec<String> = bytes.iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    strings.join("")
}

fn chunk_ref_json(c: &ChunkRef) -> Value {
    json!({
        "kind": c.kind.as_str(),
        "index": c.index,
        "position": c.position,
        "length": c.length,
        "handles": c.handles,
    })
}

/// A decoded value. Enums render as `{"value", "name"}`, opaque data as
/// hex, strings as text when they are valid UTF-8.
pub fn value_to_json(v: &XdrValue) -> Value {
    match v {
        XdrValue::Void => Value::Null,
        XdrValue::Int(i) => json!(i),
        XdrValue::UInt(u) => json!(u),
        XdrValue::Hyper(i) => json!(i),
        XdrValue::UHyper(u) => json!(u),
        XdrValue::Bool(b) => json!(b),
        XdrValue::Enum(e) => json!({ "value": e.value, "name": e.label() }),
        XdrValue::Opaque(b) => Value::String(bytes_to_hex(b)),
        XdrValue::String(b) => match std::str::from_utf8(b) {
            Ok(s) => Value::String(s.to_string()),
            Err(_) => Value::String(bytes_to_hex(b)),
        },
        XdrValue::Array(items) => Value::Array(items.iter().map(value_to_json).collect()),
        XdrValue::Struct(r) => {
            let mut m = Map::new();
            for (name, v) in r.iter() {
                m.insert(name.to_string(), value_to_json(v));
            }
            Value::Object(m)
        }
        XdrValue::Union(u) => {
            let mut m = Map::new();
            m.insert("discriminant".to_string(), value_to_json(&u.discriminant));
            m.insert(u.arm.to_string(), value_to_json(&u.value));
            Value::Object(m)
        }
        XdrValue::Optional(None) => Value::Null,
        XdrValue::Optional(Some(v)) => value_to_json(v),
        XdrValue::Unresolved(c) => json!({ "unresolved": chunk_ref_json(c) }),
    }
}

fn flow_json(flow: &FlowKey) -> Value {
    json!({
        "client": flow.client.to_string(),
        "server": flow.server.to_string(),
    })
}

pub fn error_to_json(e: &DecodeError) -> Value {
    json!({
        "protocol": e.protocol,
        "kind": e.kind_name(),
        "message": e.kind.to_string(),
        "path": e.path,
        "offset": e.offset,
    })
}

fn rdma_json(h: &RdmaHeader) -> Value {
    value_to_json(&h.record)
}

pub fn message_to_json(m: &Message) -> Value {
    let mut js = Map::new();
    js.insert("seq".to_string(), json!(m.seq));
    if let Some(ts) = m.timestamp {
        js.insert("timestamp".to_string(), json!(ts.as_secs_f64()));
    }
    js.insert("flow".to_string(), flow_json(&m.flow));
    js.insert("transport".to_string(), json!(m.transport.as_str()));
    js.insert("direction".to_string(), json!(m.direction.as_str()));
    js.insert("xid".to_string(), json!(m.xid));
    if let Some(header) = &m.header {
        js.insert("rpc".to_string(), value_to_json(&header.record));
        if let Some(auth_sys) = header.call().and_then(|c| c.auth_sys.as_ref()) {
            js.insert("auth_sys".to_string(), value_to_json(auth_sys));
        }
    }
    if let Some(rdma) = &m.rdma {
        js.insert("rdma".to_string(), rdma_json(rdma));
    }
    if let Some(body) = &m.body {
        if let Some(protocol) = body.protocol {
            js.insert("protocol".to_string(), json!(protocol.name()));
        }
        if let Some(procedure) = body.procedure {
            js.insert("procedure".to_string(), json!(procedure));
        }
        js.insert("body".to_string(), value_to_json(&body.value));
    }
    Value::Object(js)
}

pub fn event_to_json(e: &Event) -> Value {
    let mut js = match e {
        Event::Message(m) => json!({ "message": message_to_json(m) }),
        Event::Matched { call, reply, retransmissions } => json!({
            "call": message_to_json(call),
            "reply": message_to_json(reply),
            "retransmissions": retransmissions,
        }),
        Event::OrphanReply { reply } => json!({ "reply": message_to_json(reply) }),
        Event::Retransmission { flow, xid, count, seq } => json!({
            "flow": flow_json(flow),
            "xid": xid,
            "count": count,
            "seq": seq,
        }),
        Event::Timeout { call, retransmissions } => json!({
            "call": message_to_json(call),
            "retransmissions": retransmissions,
        }),
        Event::Unresolved { seq, xid, chunk } => json!({
            "seq": seq,
            "xid": xid,
            "chunk": chunk_ref_json(chunk),
        }),
        Event::RdmaError { seq, src, dst, header } => json!({
            "seq": seq,
            "src": src.to_string(),
            "dst": dst.to_string(),
            "rdma": rdma_json(header),
        }),
        Event::Error { seq, src, dst, transport, error } => json!({
            "seq": seq,
            "src": src.to_string(),
            "dst": dst.to_string(),
            "transport": transport.as_str(),
            "error": error_to_json(error),
        }),
    };
    if let Value::Object(m) = &mut js {
        m.insert("event_type".to_string(), json!(e.name()));
    }
    js
}

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

//! Packet level pipeline: transport framing, header and body decoding,
//! call/reply matching.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use crate::conf::{ConfError, ConfNode};
use crate::error::DecodeError;
use crate::rpc::matcher::{AgingPolicy, FlowKey, MatchEvent, MatcherConfig, Observation,
                          RpcMatcher};
use crate::rpc::programs::{decode_body, Body, BodyKind, BodyOptions};
use crate::rpc::reorder::ReorderBuffer;
use crate::rpc::rpc_records::{decode_rpc_header, read_record, Direction, RpcHeader};
use crate::rpc::types::RPC_VERSION;
use crate::rpcordma::reassembly::{check_xid, reassemble, ChunkSource, NoChunkData,
                                  RdmaMessage, RdmaPayload};
use crate::rpcordma::rpcordma_records::RdmaHeader;
use crate::xdr::{ChunkKind, ChunkMap, ChunkRef, XdrValue};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transport {
    Udp,
    /// Byte stream with RPC record marking.
    Tcp,
    /// Payload of an RDMA SEND, starting with the RPC-over-RDMA header.
    Rdma,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Udp => "udp",
            Transport::Tcp => "tcp",
            Transport::Rdma => "rdma",
        }
    }
}

/// One captured payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    /// Capture sequence number.
    pub seq: u64,
    pub timestamp: Option<Duration>,
    pub src: SocketAddr,
    pub dst: SocketAddr,
    pub transport: Transport,
    pub payload: Vec<u8>,
}

impl Packet {
    pub fn new(seq: u64, src: SocketAddr, dst: SocketAddr, transport: Transport,
               payload: Vec<u8>) -> Packet {
        Packet { seq, timestamp: None, src, dst, transport, payload }
    }

    pub fn with_timestamp(mut self, timestamp: Duration) -> Packet {
        self.timestamp = Some(timestamp);
        self
    }

    fn observation(&self) -> Observation {
        Observation { seq: self.seq, timestamp: self.timestamp }
    }
}

/// A decoded RPC message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub seq: u64,
    pub timestamp: Option<Duration>,
    pub flow: FlowKey,
    pub transport: Transport,
    pub xid: u32,
    pub direction: Direction,
    /// `None` when only the RDMA transport header was seen: an
    /// RDMA_NOMSG whose message chunk is not captured, or RDMA_ERROR.
    pub header: Option<RpcHeader>,
    /// Transport header when the message came over RDMA.
    pub rdma: Option<RdmaHeader>,
    /// Procedure arguments or results. `None` when the reply carries no
    /// results or the body failed to decode.
    pub body: Option<Body>,
}

impl Message {
    /// Message known only from its RDMA transport header.
    fn from_rdma(packet: &Packet, direction: Direction, rdma: RdmaHeader,
                 body: Option<Body>) -> Message {
        let flow = match direction {
            Direction::Call => FlowKey::for_call(packet.src, packet.dst),
            Direction::Reply => FlowKey::for_reply(packet.src, packet.dst),
        };
        Message {
            seq: packet.seq,
            timestamp: packet.timestamp,
            flow,
            transport: packet.transport,
            xid: rdma.xid,
            direction,
            header: None,
            rdma: Some(rdma),
            body,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Message(Box<Message>),
    Matched {
        call: Box<Message>,
        reply: Box<Message>,
        retransmissions: u32,
    },
    OrphanReply {
        reply: Box<Message>,
    },
    Retransmission {
        flow: FlowKey,
        xid: u32,
        count: u32,
        seq: u64,
    },
    Timeout {
        call: Box<Message>,
        retransmissions: u32,
    },
    /// Chunk data the capture does not have.
    Unresolved {
        seq: u64,
        xid: u32,
        chunk: ChunkRef,
    },
    RdmaError {
        seq: u64,
        src: SocketAddr,
        dst: SocketAddr,
        header: RdmaHeader,
    },
    Error {
        seq: u64,
        src: SocketAddr,
        dst: SocketAddr,
        transport: Transport,
        error: DecodeError,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Message(_) => "message",
            Event::Matched { .. } => "matched",
            Event::OrphanReply { .. } => "orphan_reply",
            Event::Retransmission { .. } => "retransmission",
            Event::Timeout { .. } => "timeout",
            Event::Unresolved { .. } => "unresolved",
            Event::RdmaError { .. } => "rdma_error",
            Event::Error { .. } => "error",
        }
    }
}

pub trait EventSink {
    fn event(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn event(&mut self, event: Event) {
        self.push(event);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub packets: u64,
    pub messages: u64,
    pub calls: u64,
    pub replies: u64,
    /// Decode errors by kind name.
    pub errors: HashMap<&'static str, u64>,
    pub matched: u64,
    pub orphans: u64,
    pub timeouts: u64,
    pub retransmissions: u64,
    pub unresolved: u64,
    pub rdma_errors: u64,
}

impl Stats {
    pub fn error_count(&self) -> u64 {
        self.errors.values().sum()
    }
}

/// Default upper bound of one reassembled TCP record.
pub const TCP_MAX_RECORD_DEFAULT: usize = 1_048_576;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Unknown values of non-fixed enums are errors instead of
    /// `UNKNOWN(n)`.
    pub strict_enums: bool,
    pub matcher: MatcherConfig,
    /// The RPC xid inside an RDMA message must equal the transport xid.
    pub rdma_require_xid_match: bool,
    pub tcp_max_record: usize,
    /// Packets held to restore capture order. Zero handles packets as
    /// they come.
    pub reorder_window: usize,
    /// Sequence number the capture starts at. `None` starts at the first
    /// packet handed in.
    pub reorder_first: Option<u64>,
}

impl Default for DecoderConfig {
    fn default() -> DecoderConfig {
        DecoderConfig {
            strict_enums: false,
            matcher: MatcherConfig::default(),
            rdma_require_xid_match: true,
            tcp_max_record: TCP_MAX_RECORD_DEFAULT,
            reorder_window: 0,
            reorder_first: None,
        }
    }
}

impl DecoderConfig {
    /// Build from the `nfs-decode` configuration node. Missing keys keep
    /// their defaults.
    pub fn from_conf(node: &ConfNode) -> Result<DecoderConfig, ConfError> {
        let mut config = DecoderConfig::default();
        config.strict_enums = node.get_child_bool("strict-enums");

        let eviction = node.get_child_value("matcher.eviction")
            .unwrap_or_else(|| "packets".to_string());
        config.matcher.aging = match eviction.as_str() {
            "none" => AgingPolicy::Disabled,
            "packets" => match node.get_child_u64("matcher.max-age")? {
                Some(n) => AgingPolicy::Packets(n),
                None => AgingPolicy::default(),
            },
            "time" => match node.get_child_timeval("matcher.max-age")? {
                Some(d) => AgingPolicy::Time(d),
                None => AgingPolicy::Time(Duration::from_secs(60)),
            },
            _ => {
                return Err(ConfError::invalid("matcher.eviction", &eviction,
                                              "expected none, packets or time"));
            }
        };
        config.matcher.flush_on_finish =
            node.get_child_bool_or("matcher.flush-on-finish", true);
        config.rdma_require_xid_match =
            node.get_child_bool_or("rdma.require-xid-match", true);
        if let Some(max) = node.get_child_memval("tcp.max-record")? {
            config.tcp_max_record = max as usize;
        }
        if let Some(window) = node.get_child_u64("reorder-window")? {
            config.reorder_window = window as usize;
        }
        config.reorder_first = node.get_child_u64("reorder-first-seq")?;
        SCLogConfig!("nfs-decode: strict-enums {} aging {:?} flush-on-finish {}",
                     config.strict_enums, config.matcher.aging,
                     config.matcher.flush_on_finish);
        Ok(config)
    }
}

fn opaque_body(stream: &[u8], offset: usize) -> Body {
    Body {
        protocol: None,
        procedure: None,
        value: XdrValue::Opaque(stream.get(offset..).unwrap_or(&[]).to_vec()),
        trailing: 0,
    }
}

pub struct Decoder {
    config: DecoderConfig,
    matcher: RpcMatcher<Message>,
    /// Unconsumed TCP bytes per (source, destination).
    streams: HashMap<(SocketAddr, SocketAddr), Vec<u8>>,
    reorder: Option<ReorderBuffer<Packet>>,
    chunk_source: Box<dyn ChunkSource>,
    stats: Stats,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Decoder {
        let reorder = match (config.reorder_window, config.reorder_first) {
            (0, _) => None,
            (window, Some(first)) => Some(ReorderBuffer::new(first, window)),
            (window, None) => Some(ReorderBuffer::unseeded(window)),
        };
        Decoder {
            matcher: RpcMatcher::new(config.matcher),
            config,
            streams: HashMap::new(),
            reorder,
            chunk_source: Box::new(NoChunkData),
            stats: Stats::default(),
        }
    }

    /// Where RDMA chunk data is looked up.
    pub fn with_chunk_source(mut self, source: Box<dyn ChunkSource>) -> Decoder {
        self.chunk_source = source;
        self
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Calls waiting for a reply.
    pub fn pending(&self) -> usize {
        self.matcher.len()
    }

    pub fn handle(&mut self, packet: Packet, sink: &mut dyn EventSink) {
        let ready = match self.reorder.as_mut() {
            Some(reorder) => reorder.push(packet.seq, packet),
            None => vec![packet],
        };
        for packet in ready {
            self.process(packet, sink);
        }
    }

    /// End of capture: release held packets, report partial TCP records
    /// and settle pending calls.
    pub fn finish(&mut self, sink: &mut dyn EventSink) {
        if let Some(reorder) = self.reorder.as_mut() {
            let held = reorder.flush();
            for packet in held {
                self.process(packet, sink);
            }
        }
        let mut streams: Vec<_> = self.streams.drain().collect();
        streams.sort_by_key(|((src, dst), _)| (*src, *dst));
        for ((src, dst), buf) in streams {
            if let Err(e) = read_record(&buf, self.config.tcp_max_record) {
                SCLogDebug!("{} -> {}: {} bytes left in stream", src, dst, buf.len());
                self.count_error(&e);
                sink.event(Event::Error { seq: 0, src, dst, transport: Transport::Tcp, error: e });
            }
        }
        let events = self.matcher.finish();
        self.match_events(events, None, sink);
    }

    fn process(&mut self, packet: Packet, sink: &mut dyn EventSink) {
        self.stats.packets += 1;
        match packet.transport {
            Transport::Udp => self.handle_message(&packet, &packet.payload, None, None, sink),
            Transport::Tcp => self.handle_tcp(&packet, sink),
            Transport::Rdma => self.handle_rdma(&packet, sink),
        }
    }

    fn count_error(&mut self, e: &DecodeError) {
        *self.stats.errors.entry(e.kind_name()).or_insert(0) += 1;
    }

    fn error(&mut self, packet: &Packet, error: DecodeError, sink: &mut dyn EventSink) {
        SCLogDebug!("packet {}: {}", packet.seq, error);
        self.count_error(&error);
        sink.event(Event::Error {
            seq: packet.seq,
            src: packet.src,
            dst: packet.dst,
            transport: packet.transport,
            error,
        });
    }

    fn handle_tcp(&mut self, packet: &Packet, sink: &mut dyn EventSink) {
        let key = (packet.src, packet.dst);
        let mut buf = self.streams.remove(&key).unwrap_or_default();
        buf.extend_from_slice(&packet.payload);
        let mut used = 0;
        while used < buf.len() {
            match read_record(&buf[used..], self.config.tcp_max_record) {
                Ok((record, n)) => {
                    used += n;
                    self.handle_message(packet, &record, None, None, sink);
                }
                Err(e) if e.is_truncated() => {
                    SCLogDebug!("buffering {} bytes for more data", buf.len() - used);
                    break;
                }
                Err(e) => {
                    // record boundaries are lost, drop the stream
                    self.error(packet, e.at_base(used), sink);
                    used = buf.len();
                }
            }
        }
        buf.drain(..used);
        if !buf.is_empty() {
            self.streams.insert(key, buf);
        }
    }

    fn handle_rdma(&mut self, packet: &Packet, sink: &mut dyn EventSink) {
        let msg = match reassemble(&packet.payload, self.chunk_source.as_ref(),
                                   self.config.strict_enums) {
            Ok(msg) => msg,
            Err(e) => {
                self.error(packet, e, sink);
                return;
            }
        };
        let RdmaMessage { header, payload } = msg;
        match payload {
            RdmaPayload::Error(_) => {
                // the responder answers the call with an RDMA_ERROR
                self.stats.rdma_errors += 1;
                sink.event(Event::RdmaError {
                    seq: packet.seq,
                    src: packet.src,
                    dst: packet.dst,
                    header: header.clone(),
                });
                self.stats.replies += 1;
                let message = Message::from_rdma(packet, Direction::Reply, header, None);
                self.track(message, packet.observation(), sink);
            }
            RdmaPayload::Unresolved(chunk) => {
                self.stats.unresolved += 1;
                sink.event(Event::Unresolved {
                    seq: packet.seq,
                    xid: header.xid,
                    chunk: chunk.clone(),
                });
                // a position zero read chunk carries a call, the reply
                // chunk a reply
                let direction = match chunk.kind {
                    ChunkKind::Read => Direction::Call,
                    _ => Direction::Reply,
                };
                match direction {
                    Direction::Call => self.stats.calls += 1,
                    Direction::Reply => self.stats.replies += 1,
                }
                self.stats.messages += 1;
                let body = Body {
                    protocol: None,
                    procedure: None,
                    value: XdrValue::Unresolved(chunk),
                    trailing: 0,
                };
                let message = Message::from_rdma(packet, direction, header, Some(body));
                sink.event(Event::Message(Box::new(message.clone())));
                self.track(message, packet.observation(), sink);
            }
            RdmaPayload::Message { stream, chunks } => {
                self.handle_message(packet, &stream, Some(&chunks), Some(header), sink);
            }
        }
    }

    fn handle_message(&mut self, packet: &Packet, stream: &[u8], chunks: Option<&ChunkMap>,
                      rdma: Option<RdmaHeader>, sink: &mut dyn EventSink)
    {
        let strict_enums = self.config.strict_enums;
        let header = match decode_rpc_header(stream, strict_enums) {
            Ok(header) => header,
            Err(e) => {
                self.error(packet, e, sink);
                return;
            }
        };
        if let Some(rdma) = &rdma {
            if self.config.rdma_require_xid_match {
                if let Err(e) = check_xid(rdma, header.xid) {
                    self.error(packet, e, sink);
                    return;
                }
            }
        }
        self.stats.messages += 1;
        let opts = BodyOptions { strict_enums, chunks };
        let xid = header.xid;
        let offset = header.body_offset;

        let (flow, body) = match header.direction() {
            Direction::Call => {
                self.stats.calls += 1;
                let flow = FlowKey::for_call(packet.src, packet.dst);
                let body = match header.call() {
                    Some(call) if call.rpcvers == RPC_VERSION => {
                        decode_body(call.program, call.version, call.procedure,
                                    BodyKind::Args, stream, offset, opts).map(Some)
                    }
                    _ => {
                        SCLogDebug!("xid {:08x}: rpc version is not 2, body kept opaque", xid);
                        Ok(Some(opaque_body(stream, offset)))
                    }
                };
                (flow, body)
            }
            Direction::Reply => {
                self.stats.replies += 1;
                let flow = FlowKey::for_reply(packet.src, packet.dst);
                let expired = self.matcher.expire(packet.observation());
                self.match_events(expired, None, sink);
                let success = header.reply().map(|r| r.is_success()).unwrap_or(false);
                let procedure = self.matcher.get(&flow, xid)
                    .and_then(|pending| pending.call.header.as_ref())
                    .and_then(|header| header.call())
                    .map(|c| (c.program, c.version, c.procedure));
                let body = match (success, procedure) {
                    (false, _) => Ok(None),
                    (true, Some((program, version, procedure))) => {
                        decode_body(program, version, procedure, BodyKind::Results,
                                    stream, offset, opts).map(Some)
                    }
                    (true, None) => Ok(Some(opaque_body(stream, offset))),
                };
                (flow, body)
            }
        };
        let body = match body {
            Ok(body) => body,
            Err(e) => {
                self.error(packet, e, sink);
                None
            }
        };

        let message = Message {
            seq: packet.seq,
            timestamp: packet.timestamp,
            flow,
            transport: packet.transport,
            xid,
            direction: header.direction(),
            header: Some(header),
            rdma,
            body,
        };
        if let Some(body) = &message.body {
            for chunk in body.value.unresolved() {
                self.stats.unresolved += 1;
                sink.event(Event::Unresolved { seq: packet.seq, xid, chunk: chunk.clone() });
            }
        }
        sink.event(Event::Message(Box::new(message.clone())));
        self.track(message, packet.observation(), sink);
    }

    /// Hand a message to the matcher.
    fn track(&mut self, message: Message, seen: Observation, sink: &mut dyn EventSink) {
        let (flow, xid) = (message.flow, message.xid);
        match message.direction {
            Direction::Call => {
                let events = self.matcher.on_call(flow, xid, message, seen);
                self.match_events(events, None, sink);
            }
            Direction::Reply => {
                let events = self.matcher.on_reply(flow, xid, seen);
                self.match_events(events, Some(message), sink);
            }
        }
    }

    fn match_events(&mut self, events: Vec<MatchEvent<Message>>, reply: Option<Message>,
                    sink: &mut dyn EventSink)
    {
        let mut reply = reply;
        for event in events {
            match event {
                MatchEvent::Matched { call, .. } => {
                    self.stats.matched += 1;
                    if let Some(reply) = reply.take() {
                        sink.event(Event::Matched {
                            retransmissions: call.retransmissions,
                            call: Box::new(call.call),
                            reply: Box::new(reply),
                        });
                    }
                }
                MatchEvent::OrphanReply { .. } => {
                    self.stats.orphans += 1;
                    if let Some(reply) = reply.take() {
                        sink.event(Event::OrphanReply { reply: Box::new(reply) });
                    }
                }
                MatchEvent::Retransmission { flow, xid, count, seen } => {
                    self.stats.retransmissions += 1;
                    sink.event(Event::Retransmission { flow, xid, count, seq: seen.seq });
                }
                MatchEvent::Timeout { call, .. } => {
                    self.stats.timeouts += 1;
                    sink.event(Event::Timeout {
                        retransmissions: call.retransmissions,
                        call: Box::new(call.call),
                    });
                }
            }
        }
    }
}

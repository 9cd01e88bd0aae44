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

//! Call/reply matching by xid, per client/server endpoint pair.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FlowKey {
    pub client: SocketAddr,
    pub server: SocketAddr,
}

impl FlowKey {
    /// Flow of a call sent from `src` to `dst`.
    pub fn for_call(src: SocketAddr, dst: SocketAddr) -> FlowKey {
        FlowKey { client: src, server: dst }
    }

    /// Flow of a reply sent from `src` to `dst`.
    pub fn for_reply(src: SocketAddr, dst: SocketAddr) -> FlowKey {
        FlowKey { client: dst, server: src }
    }
}

/// Position of an observation in the capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Observation {
    pub seq: u64,
    /// Capture time, if the capture has one.
    pub timestamp: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgingPolicy {
    /// Never evict, for offline analysis of complete captures.
    Disabled,
    /// Evict calls older than this many capture packets.
    Packets(u64),
    /// Evict calls older than this much capture time.
    Time(Duration),
}

impl Default for AgingPolicy {
    fn default() -> AgingPolicy {
        AgingPolicy::Packets(100_000)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatcherConfig {
    pub aging: AgingPolicy,
    /// Report calls still pending at finish as timeouts instead of
    /// dropping them.
    pub flush_on_finish: bool,
}

impl Default for MatcherConfig {
    fn default() -> MatcherConfig {
        MatcherConfig {
            aging: AgingPolicy::default(),
            flush_on_finish: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingCall<T> {
    pub xid: u32,
    pub call: T,
    /// First observation of the call.
    pub seen: Observation,
    pub retransmissions: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchEvent<T> {
    Matched {
        flow: FlowKey,
        call: PendingCall<T>,
        reply: Observation,
    },
    OrphanReply {
        flow: FlowKey,
        xid: u32,
        reply: Observation,
    },
    Retransmission {
        flow: FlowKey,
        xid: u32,
        /// Retransmissions seen so far, including this one.
        count: u32,
        seen: Observation,
    },
    Timeout {
        flow: FlowKey,
        call: PendingCall<T>,
    },
}

pub struct RpcMatcher<T> {
    config: MatcherConfig,
    flows: HashMap<FlowKey, HashMap<u32, PendingCall<T>>>,
    /// Calls in arrival order for eviction. Entries whose call is gone
    /// are skipped when they reach the front.
    order: VecDeque<(u64, FlowKey, u32)>,
    pending: usize,
}

impl<T> RpcMatcher<T> {
    pub fn new(config: MatcherConfig) -> RpcMatcher<T> {
        RpcMatcher {
            config,
            flows: HashMap::new(),
            order: VecDeque::new(),
            pending: 0,
        }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Number of pending calls over all flows.
    pub fn len(&self) -> usize {
        self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending == 0
    }

    pub fn get(&self, flow: &FlowKey, xid: u32) -> Option<&PendingCall<T>> {
        self.flows.get(flow).and_then(|calls| calls.get(&xid))
    }

    pub fn on_call(&mut self, flow: FlowKey, xid: u32, call: T, seen: Observation)
        -> Vec<MatchEvent<T>>
    {
        let mut events = self.expire(seen);
        let calls = self.flows.entry(flow).or_default();
        if let Some(pending) = calls.get_mut(&xid) {
            pending.retransmissions += 1;
            SCLogDebug!("xid {:08x} retransmitted ({})", xid, pending.retransmissions);
            events.push(MatchEvent::Retransmission {
                flow,
                xid,
                count: pending.retransmissions,
                seen,
            });
            return events;
        }
        calls.insert(xid, PendingCall { xid, call, seen, retransmissions: 0 });
        self.pending += 1;
        if self.can_age(&seen) {
            self.order.push_back((seen.seq, flow, xid));
        }
        events
    }

    pub fn on_reply(&mut self, flow: FlowKey, xid: u32, reply: Observation)
        -> Vec<MatchEvent<T>>
    {
        let mut events = self.expire(reply);
        match self.remove(&flow, xid) {
            Some(call) => {
                SCLogDebug!("xid {:08x} matched, call seen at {}", xid, call.seen.seq);
                events.push(MatchEvent::Matched { flow, call, reply });
            }
            None => {
                SCLogDebug!("xid {:08x} reply without pending call", xid);
                events.push(MatchEvent::OrphanReply { flow, xid, reply });
            }
        }
        events
    }

    fn remove(&mut self, flow: &FlowKey, xid: u32) -> Option<PendingCall<T>> {
        let calls = self.flows.get_mut(flow)?;
        let call = calls.remove(&xid)?;
        if calls.is_empty() {
            self.flows.remove(flow);
        }
        self.pending -= 1;
        Some(call)
    }

    /// Whether a call first seen at `seen` can ever be evicted. Under time
    /// aging a call without a capture time never is, and must not hold
    /// back the calls queued after it.
    fn can_age(&self, seen: &Observation) -> bool {
        match self.config.aging {
            AgingPolicy::Disabled => false,
            AgingPolicy::Packets(_) => true,
            AgingPolicy::Time(_) => seen.timestamp.is_some(),
        }
    }

    fn is_expired(&self, call: &PendingCall<T>, now: Observation) -> bool {
        match self.config.aging {
            AgingPolicy::Disabled => false,
            AgingPolicy::Packets(max) => now.seq.saturating_sub(call.seen.seq) > max,
            AgingPolicy::Time(max) => match (call.seen.timestamp, now.timestamp) {
                (Some(then), Some(now)) => now.saturating_sub(then) > max,
                _ => false,
            },
        }
    }

    /// Evict calls that aged out as of `now`, oldest first.
    pub fn expire(&mut self, now: Observation) -> Vec<MatchEvent<T>> {
        let mut events = Vec::new();
        while let Some(&(seq, flow, xid)) = self.order.front() {
            // stale: matched, or replaced by a later call with the same xid
            let (live, expired) = match self.get(&flow, xid) {
                Some(call) if call.seen.seq == seq => (true, self.is_expired(call, now)),
                _ => (false, false),
            };
            if !live {
                self.order.pop_front();
                continue;
            }
            if !expired {
                break;
            }
            self.order.pop_front();
            if let Some(call) = self.remove(&flow, xid) {
                SCLogDebug!("xid {:08x} timed out", xid);
                events.push(MatchEvent::Timeout { flow, call });
            }
        }
        events
    }

    /// End of capture. Pending calls become timeouts when configured,
    /// otherwise they are dropped.
    pub fn finish(&mut self) -> Vec<MatchEvent<T>> {
        self.order.clear();
        self.pending = 0;
        let flows = std::mem::take(&mut self.flows);
        if !self.config.flush_on_finish {
            return Vec::new();
        }
        let mut calls: Vec<(FlowKey, PendingCall<T>)> = flows
            .into_iter()
            .flat_map(|(flow, calls)| calls.into_values().map(move |c| (flow, c)))
            .collect();
        calls.sort_by_key(|(_, c)| c.seen.seq);
        calls.into_iter()
            .map(|(flow, call)| MatchEvent::Timeout { flow, call })
            .collect()
    }
}

/// Matcher split in independently locked shards. A flow always maps to
/// the same shard, so updates to one flow stay serialized while
/// different flows proceed in parallel.
pub struct ShardedMatcher<T> {
    shards: Vec<Mutex<RpcMatcher<T>>>,
}

impl<T> ShardedMatcher<T> {
    pub fn new(shards: usize, config: MatcherConfig) -> ShardedMatcher<T> {
        let n = shards.max(1);
        ShardedMatcher {
            shards: (0..n).map(|_| Mutex::new(RpcMatcher::new(config))).collect(),
        }
    }

    fn shard(&self, flow: &FlowKey) -> MutexGuard<'_, RpcMatcher<T>> {
        let mut hasher = DefaultHasher::new();
        flow.hash(&mut hasher);
        let idx = (hasher.finish() % self.shards.len() as u64) as usize;
        match self.shards[idx].lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn on_call(&self, flow: FlowKey, xid: u32, call: T, seen: Observation)
        -> Vec<MatchEvent<T>>
    {
        self.shard(&flow).on_call(flow, xid, call, seen)
    }

    pub fn on_reply(&self, flow: FlowKey, xid: u32, reply: Observation) -> Vec<MatchEvent<T>> {
        self.shard(&flow).on_reply(flow, xid, reply)
    }

    pub fn len(&self) -> usize {
        self.shards.iter()
            .map(|s| match s.lock() {
                Ok(g) => g.len(),
                Err(p) => p.into_inner().len(),
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn finish(&self) -> Vec<MatchEvent<T>> {
        let mut events = Vec::new();
        for shard in &self.shards {
            let mut guard = match shard.lock() {
                Ok(g) => g,
                Err(p) => p.into_inner(),
            };
            events.extend(guard.finish());
        }
        events.sort_by_key(|e| match e {
            MatchEvent::Timeout { call, .. } => call.seen.seq,
            _ => 0,
        });
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn flow() -> FlowKey {
        FlowKey::for_call("10.0.0.1:800".parse().unwrap(), "10.0.0.2:2049".parse().unwrap())
    }

    fn obs(seq: u64) -> Observation {
        Observation { seq, timestamp: None }
    }

    fn matcher(aging: AgingPolicy) -> RpcMatcher<&'static str> {
        RpcMatcher::new(MatcherConfig { aging, flush_on_finish: true })
    }

    #[test]
    fn test_pairs_in_order() {
        let mut m = matcher(AgingPolicy::Disabled);
        let f = flow();
        assert!(m.on_call(f, 7, "C1", obs(1)).is_empty());
        assert!(m.on_call(f, 9, "C2", obs(2)).is_empty());
        let reply_flow = FlowKey::for_reply(f.server, f.client);
        assert_eq!(reply_flow, f);
        let e1 = m.on_reply(reply_flow, 7, obs(3));
        let e2 = m.on_reply(reply_flow, 9, obs(4));
        match (&e1[..], &e2[..]) {
            ([MatchEvent::Matched { call: c1, .. }], [MatchEvent::Matched { call: c2, .. }]) => {
                assert_eq!(c1.call, "C1");
                assert_eq!(c2.call, "C2");
            }
            _ => panic!("unexpected {:?} {:?}", e1, e2),
        }
        assert!(m.is_empty());
    }

    #[test]
    fn test_orphan_reply() {
        let mut m = matcher(AgingPolicy::Disabled);
        let events = m.on_reply(flow(), 42, obs(1));
        assert_eq!(events, vec![MatchEvent::OrphanReply { flow: flow(), xid: 42, reply: obs(1) }]);
        assert!(m.is_empty());
    }

    #[test]
    fn test_same_xid_other_flow_is_orphan() {
        let mut m = matcher(AgingPolicy::Disabled);
        m.on_call(flow(), 7, "C1", obs(1));
        let other = FlowKey::for_call("10.0.0.3:800".parse().unwrap(),
                                      "10.0.0.2:2049".parse().unwrap());
        let events = m.on_reply(other, 7, obs(2));
        assert!(matches!(events[..], [MatchEvent::OrphanReply { .. }]));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_retransmission() {
        let mut m = matcher(AgingPolicy::Disabled);
        let f = flow();
        m.on_call(f, 7, "C1", obs(1));
        let events = m.on_call(f, 7, "C1 again", obs(2));
        assert_eq!(events, vec![MatchEvent::Retransmission { flow: f, xid: 7, count: 1,
                                                             seen: obs(2) }]);
        assert_eq!(m.len(), 1);
        assert_eq!(m.get(&f, 7).unwrap().retransmissions, 1);
        match &m.on_reply(f, 7, obs(3))[..] {
            [MatchEvent::Matched { call, .. }] => {
                assert_eq!(call.call, "C1");
                assert_eq!(call.seen, obs(1));
                assert_eq!(call.retransmissions, 1);
            }
            e => panic!("unexpected {:?}", e),
        }
    }

    #[test]
    fn test_packet_aging() {
        let mut m = matcher(AgingPolicy::Packets(10));
        let f = flow();
        m.on_call(f, 1, "old", obs(1));
        m.on_call(f, 2, "new", obs(8));
        let events = m.on_reply(f, 2, obs(12));
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], MatchEvent::Timeout { call, .. } if call.xid == 1));
        assert!(matches!(&events[1], MatchEvent::Matched { call, .. } if call.xid == 2));
        assert!(m.is_empty());
    }

    #[test]
    fn test_time_aging() {
        let mut m = matcher(AgingPolicy::Time(Duration::from_secs(30)));
        let f = flow();
        let at = |seq, secs| Observation { seq, timestamp: Some(Duration::from_secs(secs)) };
        m.on_call(f, 1, "C1", at(1, 100));
        assert!(m.expire(at(2, 129)).is_empty());
        let events = m.expire(at(3, 131));
        assert_eq!(events.len(), 1);
        let events = m.on_reply(f, 1, at(4, 132));
        assert!(matches!(events[..], [MatchEvent::OrphanReply { .. }]));
    }

    #[test]
    fn test_time_aging_call_without_timestamp() {
        let mut m = matcher(AgingPolicy::Time(Duration::from_secs(30)));
        let f = flow();
        let at = |seq, secs| Observation { seq, timestamp: Some(Duration::from_secs(secs)) };
        m.on_call(f, 1, "untimed", obs(1));
        m.on_call(f, 2, "timed", at(2, 0));
        let events = m.expire(at(3, 1000));
        match &events[..] {
            [MatchEvent::Timeout { call, .. }] => assert_eq!(call.xid, 2),
            e => panic!("unexpected {:?}", e),
        }
        // the untimed call stays pending until its reply or finish
        assert_eq!(m.len(), 1);
        assert!(matches!(m.on_reply(f, 1, at(4, 1001))[..], [MatchEvent::Matched { .. }]));
    }

    #[test]
    fn test_finish() {
        let mut m = matcher(AgingPolicy::Disabled);
        m.on_call(flow(), 3, "C3", obs(3));
        m.on_call(flow(), 1, "C1", obs(1));
        let events = m.finish();
        let xids: Vec<u32> = events.iter().map(|e| match e {
            MatchEvent::Timeout { call, .. } => call.xid,
            _ => 0,
        }).collect();
        assert_eq!(xids, vec![1, 3]);
        assert!(m.is_empty());

        let mut m: RpcMatcher<&str> = RpcMatcher::new(MatcherConfig {
            aging: AgingPolicy::Disabled,
            flush_on_finish: false,
        });
        m.on_call(flow(), 3, "C3", obs(3));
        assert!(m.finish().is_empty());
        assert!(m.is_empty());
    }

    #[test]
    fn test_sharded_parallel_flows() {
        let m = Arc::new(ShardedMatcher::<u32>::new(4, MatcherConfig::default()));
        let handles: Vec<_> = (0..4u16).map(|t| {
            let m = Arc::clone(&m);
            thread::spawn(move || {
                let f = FlowKey::for_call(format!("10.0.0.{}:800", t + 1).parse().unwrap(),
                                          "10.0.0.100:2049".parse().unwrap());
                let mut matched = 0;
                for xid in 0..100u32 {
                    m.on_call(f, xid, xid, obs(xid as u64 * 2));
                    let events = m.on_reply(f, xid, obs(xid as u64 * 2 + 1));
                    if matches!(events[..], [MatchEvent::Matched { .. }]) {
                        matched += 1;
                    }
                }
                matched
            })
        }).collect();
        let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 400);
        assert!(m.is_empty());
    }
}

use core::fmt;

use common::protocol::NodeId;
use heapless::Vec;
use tracing::{debug, warn};

use crate::routing::{ForwardingTable, MergeOutcome, Route, MAX_ROUTES, MAX_TTL};

/// 有界距离向量路由表
///
/// 条目按首次出现的顺序保存，过期清理后剩余条目保持原有相对顺序。
/// 同一目的地最多一条路由；表满后新的目的地被静默丢弃。
///
/// 路由表本身不做任何同步，通告接收与过期清理必须串行调用。
pub struct RoutingTable<A = NodeId, const N: usize = MAX_ROUTES> {
    routes: Vec<Route<A>, N>,
}

impl<A, const N: usize> Default for RoutingTable<A, N> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<A: fmt::Debug, const N: usize> fmt::Debug for RoutingTable<A, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingTable")
            .field("len", &self.routes.len())
            .field("capacity", &N)
            .field("routes", &self.routes.as_slice())
            .finish()
    }
}

impl<A, const N: usize> RoutingTable<A, N>
where
    A: Copy + PartialEq + fmt::Debug,
{
    /// 创建空路由表
    pub fn new() -> Self {
        Self::default()
    }

    /// 寻找指定目的地的路由表项
    pub fn find_route(&self, destination: &A) -> Option<usize> {
        self.routes
            .iter()
            .position(|route| route.destination == *destination)
    }

    /// 合并一条邻居通告的候选路由
    ///
    /// 判定顺序：
    /// 1. 已有条目且 `cost + 1` 严格更小：采用新路径；
    /// 2. 已有条目且来自当前下一跳：无论好坏都以下一跳的最新代价为准；
    /// 3. 其余已有条目的更新：忽略；
    /// 4. 新目的地：有空位则追加，否则丢弃。
    ///
    /// 被采用的条目代价为 `cost + 1`，存活时间重置为 [`MAX_TTL`]。
    pub fn merge_route(&mut self, candidate: Route<A>) -> MergeOutcome {
        let cost = candidate.cost.saturating_add(1);

        let Some(index) = self.find_route(&candidate.destination) else {
            let route = Route {
                destination: candidate.destination,
                next_hop: candidate.next_hop,
                cost,
                ttl: MAX_TTL,
            };
            if self.routes.push(route).is_err() {
                warn!(
                    destination = ?candidate.destination,
                    capacity = N,
                    "routing table full, dropping new destination"
                );
                return MergeOutcome::TableFull;
            }
            debug!(destination = ?route.destination, next_hop = ?route.next_hop, cost, "route added");
            return MergeOutcome::Inserted;
        };

        let existing = &mut self.routes[index];
        let outcome = if cost < existing.cost {
            MergeOutcome::Improved
        } else if candidate.next_hop == existing.next_hop {
            MergeOutcome::Refreshed
        } else {
            return MergeOutcome::Ignored;
        };

        debug!(
            destination = ?existing.destination,
            old_next_hop = ?existing.next_hop,
            next_hop = ?candidate.next_hop,
            old_cost = existing.cost,
            cost,
            ?outcome,
            "route updated"
        );
        existing.next_hop = candidate.next_hop;
        existing.cost = cost;
        existing.ttl = MAX_TTL;
        outcome
    }

    /// 按顺序合并一次通告中的全部候选路由
    ///
    /// 各条目互相独立，表满时前面的条目已生效、后面的新目的地被丢弃。
    pub fn update_routing_table<I>(&mut self, candidates: I)
    where
        I: IntoIterator<Item = Route<A>>,
    {
        for candidate in candidates {
            self.merge_route(candidate);
        }
    }

    /// 所有条目的存活时间减去 `elapsed_seconds`，移除归零的条目，返回移除数量
    pub fn age_and_expire(&mut self, elapsed_seconds: u32) -> usize {
        let elapsed = u16::try_from(elapsed_seconds).unwrap_or(u16::MAX);
        let before = self.routes.len();

        for route in self.routes.iter_mut() {
            route.ttl = route.ttl.saturating_sub(elapsed);
        }
        self.routes.retain(|route| {
            if route.ttl == 0 {
                debug!(destination = ?route.destination, next_hop = ?route.next_hop, "route expired");
            }
            route.ttl > 0
        });

        before - self.routes.len()
    }

    pub fn get(&self, destination: &A) -> Option<&Route<A>> {
        self.find_route(destination).map(|index| &self.routes[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route<A>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.routes.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<A, const N: usize> ForwardingTable<A> for RoutingTable<A, N>
where
    A: Copy + PartialEq + fmt::Debug,
{
    fn get_next_hop(&self, destination: &A) -> Option<A> {
        self.get(destination).map(|route| route.next_hop)
    }

    fn routes(&self) -> &[Route<A>] {
        &self.routes
    }
}

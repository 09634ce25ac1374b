//! 距离向量路由
//!
//! [`RoutingTable`] 是核心：有界路由表 + Bellman-Ford 松弛合并。
//! 周边协作者（通告收发、过期计时）分别位于 [`advertisement`] 与 [`expiry`]。

pub mod advertisement;
pub mod distance_vector;
pub mod expiry;

use common::protocol::NodeId;

pub use distance_vector::RoutingTable;

/// 路由表容量
pub const MAX_ROUTES: usize = 128;
/// 路由条目的最大存活时间（秒）
pub const MAX_TTL: u16 = 120;

/// 路由表项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Route<A = NodeId> {
    /// 目的地节点
    pub destination: A,
    /// 下一跳节点
    pub next_hop: A,
    /// 距离度量（跳数）
    pub cost: u32,
    /// 剩余存活时间（秒）
    pub ttl: u16,
}

impl<A> Route<A> {
    /// 邻居通告中的候选路由，`cost` 为邻居自身的代价，`ttl` 在合并时重置
    pub const fn candidate(destination: A, next_hop: A, cost: u32) -> Self {
        Self {
            destination,
            next_hop,
            cost,
            ttl: 0,
        }
    }
}

/// 单条候选路由的合并结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MergeOutcome {
    /// 新目的地，已追加
    Inserted,
    /// 找到更短路径
    Improved,
    /// 当前下一跳的代价更新（可能变差）
    Refreshed,
    /// 既不更优也不来自当前下一跳
    Ignored,
    /// 路由表已满，新目的地被丢弃
    TableFull,
}

impl MergeOutcome {
    pub fn is_accepted(self) -> bool {
        matches!(
            self,
            MergeOutcome::Inserted | MergeOutcome::Improved | MergeOutcome::Refreshed
        )
    }
}

/// 转发与广播组件对路由表的只读访问
pub trait ForwardingTable<A = NodeId> {
    /// 查询到达目的地的下一跳
    fn get_next_hop(&self, destination: &A) -> Option<A>;

    /// 按表内顺序返回全部路由
    fn routes(&self) -> &[Route<A>];
}

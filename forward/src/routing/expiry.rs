use core::fmt;

use crate::routing::RoutingTable;

/// 路由过期计时器
///
/// 每隔 `interval_ms` 对路由表执行一次老化，按整秒扣减存活时间，
/// 不足一秒的部分累积到下一次。
#[derive(Debug, Clone)]
pub struct ExpiryTimer {
    interval_ms: u64,
    last_sweep_ms: u64,
    carry_ms: u64,
}

impl ExpiryTimer {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_sweep_ms: 0,
            carry_ms: 0,
        }
    }

    /// 以 `now_ms` 作为计时起点
    pub fn reset(&mut self, now_ms: u64) {
        self.last_sweep_ms = now_ms;
        self.carry_ms = 0;
    }

    /// 到期则老化路由表并返回被移除的条目数，未到期返回 `None`
    pub fn poll<A, const N: usize>(
        &mut self,
        now_ms: u64,
        table: &mut RoutingTable<A, N>,
    ) -> Option<usize>
    where
        A: Copy + PartialEq + fmt::Debug,
    {
        let elapsed_ms = now_ms.saturating_sub(self.last_sweep_ms);
        if elapsed_ms < self.interval_ms {
            return None;
        }

        let total_ms = elapsed_ms + self.carry_ms;
        let elapsed_seconds = u32::try_from(total_ms / 1000).unwrap_or(u32::MAX);
        self.carry_ms = total_ms % 1000;
        self.last_sweep_ms = now_ms;

        Some(table.age_and_expire(elapsed_seconds))
    }
}

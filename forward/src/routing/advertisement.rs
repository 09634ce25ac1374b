//! 通告接收与广播：线上通告与路由表之间的转换

use core::slice;

use common::protocol::{AdvertisedRoute, Advertisement, NodeId};
use tracing::{debug, trace};

use crate::routing::{ForwardingTable, Route, RoutingTable};

/// 把邻居的一帧通告交给路由表
///
/// 候选路由的下一跳即通告的发送者。指向本节点的条目被跳过，
/// 本节点自己发出的通告整帧忽略。返回交给路由表的候选数。
pub fn receive_advertisement<const N: usize>(
    table: &mut RoutingTable<NodeId, N>,
    local_id: NodeId,
    advertisement: &Advertisement,
) -> usize {
    let neighbor = advertisement.source;
    if neighbor == local_id {
        trace!(node = %local_id, "ignoring own advertisement");
        return 0;
    }

    let mut handed_over = 0;
    let candidates = advertisement
        .routes()
        .iter()
        .filter(|route| route.destination != local_id)
        .map(|route| Route::candidate(route.destination, neighbor, route.cost))
        .inspect(|_| handed_over += 1);
    table.update_routing_table(candidates);

    debug!(
        node = %local_id,
        %neighbor,
        entries = advertisement.len(),
        handed_over,
        table_len = table.len(),
        "advertisement merged"
    );
    handed_over
}

/// 把路由表切分为若干帧通告
///
/// 第一条总是本节点自身（代价 0），其后按表内顺序列出全部路由。
pub fn advertisements<T>(table: &T, local_id: NodeId) -> AdvertisementChunks<'_>
where
    T: ForwardingTable<NodeId> + ?Sized,
{
    AdvertisementChunks {
        source: local_id,
        announced_self: false,
        routes: table.routes().iter(),
    }
}

/// [`advertisements`] 返回的迭代器
pub struct AdvertisementChunks<'a> {
    source: NodeId,
    announced_self: bool,
    routes: slice::Iter<'a, Route<NodeId>>,
}

impl Iterator for AdvertisementChunks<'_> {
    type Item = Advertisement;

    fn next(&mut self) -> Option<Advertisement> {
        let mut advertisement = Advertisement::new(self.source);

        if !self.announced_self {
            self.announced_self = true;
            let _ = advertisement.push(AdvertisedRoute::new(self.source, 0));
        }

        while !advertisement.is_full() {
            let Some(route) = self.routes.next() else {
                break;
            };
            // 容量已在循环条件中检查
            let _ = advertisement.push(AdvertisedRoute::new(route.destination, route.cost));
        }

        (!advertisement.is_empty()).then_some(advertisement)
    }
}

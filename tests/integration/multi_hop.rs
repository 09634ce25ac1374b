#[cfg(test)]
mod multi_hop_tests {
    use common::hal::simulator::{SimChannel, SimClock, SimHardware};
    use common::hal::Hardware;
    use common::protocol::NodeId;
    use forward::{RouterConfig, RouterDaemon};

    const TICK_MS: u64 = 100;

    struct Node {
        hardware: SimHardware,
        daemon: RouterDaemon,
    }

    fn config() -> RouterConfig {
        RouterConfig::default()
            .with_advertise_interval_ms(1_000)
            .with_poll_interval_ms(TICK_MS as u32)
    }

    fn node_id(last: u8) -> NodeId {
        NodeId::new([0x02, 0x00, 0x00, 0x00, 0x00, last])
    }

    fn start(ids: &[NodeId], medium: &SimChannel, clock: &SimClock) -> Vec<Node> {
        let mut nodes: Vec<Node> = ids
            .iter()
            .map(|&id| {
                let hardware = SimHardware::new(id, medium.clone(), clock.clone());
                let daemon = RouterDaemon::new(hardware.get_node_id(), config()).unwrap();
                Node { hardware, daemon }
            })
            .collect();
        for node in nodes.iter_mut() {
            node.daemon.start(&mut node.hardware).unwrap();
        }
        nodes
    }

    fn run_for(nodes: &mut [Node], clock: &SimClock, duration_ms: u64) {
        let deadline = clock.now_ms() + duration_ms;
        while clock.now_ms() < deadline {
            for node in nodes.iter_mut() {
                node.daemon.poll(&mut node.hardware).unwrap();
            }
            clock.advance(TICK_MS);
        }
    }

    #[test]
    fn test_line_topology_converges() {
        let medium = SimChannel::new();
        let clock = SimClock::new();
        let ids = [node_id(0x0A), node_id(0x0B), node_id(0x0C), node_id(0x0D)];
        // A - B - C - D
        for (i, a) in ids.iter().enumerate() {
            for b in ids.iter().skip(i + 2) {
                medium.cut_link(*a, *b);
            }
        }

        let mut nodes = start(&ids, &medium, &clock);
        run_for(&mut nodes, &clock, 10_000);

        for (i, node) in nodes.iter().enumerate() {
            let table = node.daemon.table();
            assert_eq!(table.len(), ids.len() - 1, "node {} table {:?}", ids[i], table);
            assert!(table.get(&ids[i]).is_none());

            for (j, destination) in ids.iter().enumerate() {
                if i == j {
                    continue;
                }
                let route = table.get(destination).unwrap();
                let expected_hop = if j > i { ids[i + 1] } else { ids[i - 1] };
                assert_eq!(route.next_hop, expected_hop);
                assert_eq!(route.cost as usize, i.abs_diff(j));
            }
        }
    }

    #[test]
    fn test_shorter_path_wins_after_link_restored() {
        let medium = SimChannel::new();
        let clock = SimClock::new();
        let (a, b, c) = (node_id(0x0A), node_id(0x0B), node_id(0x0C));
        medium.cut_link(a, c);

        let mut nodes = start(&[a, b, c], &medium, &clock);
        run_for(&mut nodes, &clock, 5_000);
        assert_eq!(nodes[0].daemon.next_hop(&c), Some(b));
        assert_eq!(nodes[0].daemon.table().get(&c).unwrap().cost, 2);

        medium.restore_link(a, c);
        run_for(&mut nodes, &clock, 5_000);

        assert_eq!(nodes[0].daemon.next_hop(&c), Some(c));
        assert_eq!(nodes[0].daemon.table().get(&c).unwrap().cost, 1);
        assert_eq!(nodes[2].daemon.next_hop(&a), Some(a));
    }

    #[test]
    fn test_late_joiner_learns_table_on_request() {
        let medium = SimChannel::new();
        let clock = SimClock::new();
        let (a, b, c) = (node_id(0x0A), node_id(0x0B), node_id(0x0C));
        medium.cut_link(a, c);

        let mut nodes = start(&[a, b], &medium, &clock);
        run_for(&mut nodes, &clock, 3_000);

        // C 加入后发出路由请求，B 在下一轮立即回复完整路由表
        let mut late = start(&[c], &medium, &clock);
        nodes.append(&mut late);
        for node in nodes.iter_mut().take(2) {
            node.daemon.poll(&mut node.hardware).unwrap();
        }
        let joiner = &mut nodes[2];
        joiner.daemon.poll(&mut joiner.hardware).unwrap();

        assert_eq!(nodes[2].daemon.next_hop(&b), Some(b));
        assert_eq!(nodes[2].daemon.next_hop(&a), Some(b));
        assert_eq!(nodes[2].daemon.table().get(&a).unwrap().cost, 2);
    }
}

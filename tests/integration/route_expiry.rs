#[cfg(test)]
mod route_expiry_tests {
    use common::hal::simulator::{SimChannel, SimClock, SimHardware};
    use common::protocol::NodeId;
    use forward::{RouterConfig, RouterDaemon, MAX_TTL};

    const TICK_MS: u64 = 100;

    const A: NodeId = NodeId::new([0x02, 0, 0, 0, 0, 0x0A]);
    const B: NodeId = NodeId::new([0x02, 0, 0, 0, 0, 0x0B]);
    const C: NodeId = NodeId::new([0x02, 0, 0, 0, 0, 0x0C]);

    struct Node {
        hardware: SimHardware,
        daemon: RouterDaemon,
    }

    fn run_for(nodes: &mut [Node], clock: &SimClock, duration_ms: u64) -> usize {
        let mut expired = 0;
        let deadline = clock.now_ms() + duration_ms;
        while clock.now_ms() < deadline {
            for node in nodes.iter_mut() {
                expired += node.daemon.poll(&mut node.hardware).unwrap().expired;
            }
            clock.advance(TICK_MS);
        }
        expired
    }

    /// A - B - C 收敛后摘除中间的 B
    fn converge_and_detach_middle() -> (SimClock, Vec<Node>) {
        let medium = SimChannel::new();
        let clock = SimClock::new();
        medium.cut_link(A, C);
        let config = RouterConfig::default().with_advertise_interval_ms(1_000);

        let mut nodes: Vec<Node> = [A, B, C]
            .into_iter()
            .map(|id| Node {
                hardware: SimHardware::new(id, medium.clone(), clock.clone()),
                daemon: RouterDaemon::new(id, config).unwrap(),
            })
            .collect();
        for node in nodes.iter_mut() {
            node.daemon.start(&mut node.hardware).unwrap();
        }
        run_for(&mut nodes, &clock, 5_000);
        assert_eq!(nodes[0].daemon.table().len(), 2);
        assert_eq!(nodes[2].daemon.table().len(), 2);

        medium.detach(B);
        nodes.remove(1);
        (clock, nodes)
    }

    #[test]
    fn test_routes_survive_until_ttl_runs_out() {
        let (clock, mut nodes) = converge_and_detach_middle();

        run_for(&mut nodes, &clock, (u64::from(MAX_TTL) - 10) * 1_000);

        assert_eq!(nodes[0].daemon.next_hop(&C), Some(B));
        assert_eq!(nodes[1].daemon.next_hop(&A), Some(B));
    }

    #[test]
    fn test_unreachable_routes_expire() {
        let (clock, mut nodes) = converge_and_detach_middle();

        let expired = run_for(&mut nodes, &clock, (u64::from(MAX_TTL) + 5) * 1_000);

        assert_eq!(expired, 4);
        for node in &nodes {
            assert!(node.daemon.table().is_empty(), "{:?}", node.daemon.table());
            assert_eq!(node.daemon.next_hop(&B), None);
        }
    }
}

//! 模拟器入口：四个节点组成一条链 A - B - C - D，
//! 观察路由收敛，随后摘除 B，孤立的 A 上的路由逐条过期。

use common::hal::simulator::{SimChannel, SimClock, SimHardware};
use common::hal::Hardware;
use common::protocol::NodeId;
use forward::{RouterConfig, RouterDaemon, MAX_TTL};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

struct SimNode {
    hardware: SimHardware,
    daemon: RouterDaemon,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = simulate() {
        error!(%err, "simulation failed");
        std::process::exit(1);
    }
}

fn simulate() -> Result<(), Box<dyn std::error::Error>> {
    let ids = [
        NodeId::new([0x02, 0, 0, 0, 0, 0x0A]),
        NodeId::new([0x02, 0, 0, 0, 0, 0x0B]),
        NodeId::new([0x02, 0, 0, 0, 0, 0x0C]),
        NodeId::new([0x02, 0, 0, 0, 0, 0x0D]),
    ];
    let config = RouterConfig::default().with_advertise_interval_ms(5_000);

    let medium = SimChannel::new();
    let clock = SimClock::new();

    // 只保留相邻节点之间的链路
    for (i, a) in ids.iter().enumerate() {
        for b in ids.iter().skip(i + 2) {
            medium.cut_link(*a, *b);
        }
    }

    let mut nodes = Vec::with_capacity(ids.len());
    for id in ids {
        let hardware = SimHardware::new(id, medium.clone(), clock.clone());
        let daemon = RouterDaemon::new(hardware.get_node_id(), config)?;
        let mut node = SimNode { hardware, daemon };
        node.daemon.start(&mut node.hardware)?;
        nodes.push(node);
    }

    info!("waiting for convergence");
    step(&mut nodes, &clock, u64::from(config.poll_interval_ms), 20_000)?;
    dump_tables(&nodes);

    let departed = ids[1];
    medium.detach(departed);
    nodes.retain(|node| node.daemon.node_id() != departed);
    info!(node = %departed, "node detached, waiting for stale routes to expire");

    step(
        &mut nodes,
        &clock,
        u64::from(config.poll_interval_ms),
        (u64::from(MAX_TTL) + 10) * 1_000,
    )?;
    dump_tables(&nodes);

    Ok(())
}

/// 以 `tick_ms` 为步长推进共享时钟 `duration_ms`，每步轮询所有节点
fn step(
    nodes: &mut [SimNode],
    clock: &SimClock,
    tick_ms: u64,
    duration_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let deadline = clock.now_ms() + duration_ms;
    while clock.now_ms() < deadline {
        for node in nodes.iter_mut() {
            node.daemon.poll(&mut node.hardware)?;
        }
        clock.advance(tick_ms);
    }
    Ok(())
}

fn dump_tables(nodes: &[SimNode]) {
    for node in nodes {
        info!(node = %node.daemon.node_id(), routes = node.daemon.table().len(), "routing table");
        for route in node.daemon.table().iter() {
            info!(
                destination = %route.destination,
                next_hop = %route.next_hop,
                cost = route.cost,
                ttl = route.ttl,
                "  route"
            );
        }
    }
}

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam::channel::{unbounded, Receiver, Sender, TryRecvError};
use embedded_hal::blocking::delay::DelayMs;
use tracing::trace;

use crate::hal::{Hardware, RadioInterface};
use crate::protocol::NodeId;

/// 模拟器错误类型
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error("radio channel {0} is outside 11..=26")]
    InvalidChannel(u8),
    #[error("transmit power {0} dBm exceeds 30 dBm")]
    InvalidPower(u8),
    #[error("frame of {len} bytes does not fit into a {capacity} byte buffer")]
    FrameTooLarge { len: usize, capacity: usize },
    #[error("node {0} is detached from the simulated medium")]
    Detached(NodeId),
}

/// 所有模拟节点共享的手动时钟（毫秒）
#[derive(Clone, Default)]
pub struct SimClock {
    now_ms: Arc<AtomicU64>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

struct Port {
    node_id: NodeId,
    sender: Sender<Vec<u8>>,
}

#[derive(Default)]
struct Medium {
    ports: Vec<Port>,
    /// 被切断的链路，按 (小, 大) 顺序保存
    cut_links: HashSet<(NodeId, NodeId)>,
}

fn link_key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// 共享广播介质：一个节点发送的帧会投递到所有其他仍连通的节点
#[derive(Clone, Default)]
pub struct SimChannel {
    medium: Arc<Mutex<Medium>>,
}

impl SimChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn attach(&self, node_id: NodeId) -> Receiver<Vec<u8>> {
        let (sender, receiver) = unbounded();
        if let Ok(mut medium) = self.medium.lock() {
            medium.ports.retain(|port| port.node_id != node_id);
            medium.ports.push(Port { node_id, sender });
        }
        receiver
    }

    /// 把节点从介质上摘除，之后它既收不到也发不出任何帧
    pub fn detach(&self, node_id: NodeId) {
        if let Ok(mut medium) = self.medium.lock() {
            medium.ports.retain(|port| port.node_id != node_id);
        }
    }

    /// 切断两个节点之间的链路
    pub fn cut_link(&self, a: NodeId, b: NodeId) {
        if let Ok(mut medium) = self.medium.lock() {
            medium.cut_links.insert(link_key(a, b));
        }
    }

    /// 恢复两个节点之间的链路
    pub fn restore_link(&self, a: NodeId, b: NodeId) {
        if let Ok(mut medium) = self.medium.lock() {
            medium.cut_links.remove(&link_key(a, b));
        }
    }

    /// 广播一帧，返回收到该帧的节点数
    pub fn broadcast(&self, source: NodeId, frame: &[u8]) -> usize {
        let Ok(medium) = self.medium.lock() else {
            return 0;
        };

        let mut delivered = 0;
        for port in medium.ports.iter() {
            if port.node_id == source || medium.cut_links.contains(&link_key(source, port.node_id)) {
                continue;
            }
            if port.sender.send(frame.to_vec()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    fn is_attached(&self, node_id: NodeId) -> bool {
        self.medium
            .lock()
            .map(|medium| medium.ports.iter().any(|port| port.node_id == node_id))
            .unwrap_or(false)
    }
}

/// 模拟无线电接口
pub struct SimRadio {
    channel: u8,
    power: u8,
    medium: SimChannel,
    inbox: Receiver<Vec<u8>>,
    node_id: NodeId,
}

impl SimRadio {
    pub fn new(medium: SimChannel, node_id: NodeId) -> Self {
        let inbox = medium.attach(node_id);
        Self {
            channel: 11,
            power: 20,
            medium,
            inbox,
            node_id,
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn power(&self) -> u8 {
        self.power
    }
}

impl RadioInterface for SimRadio {
    type Error = SimulatorError;

    fn send_frame(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        if !self.medium.is_attached(self.node_id) {
            return Err(SimulatorError::Detached(self.node_id));
        }
        let delivered = self.medium.broadcast(self.node_id, frame);
        trace!(node = %self.node_id, len = frame.len(), delivered, "frame sent");
        Ok(())
    }

    fn receive_frame(&mut self, buffer: &mut [u8]) -> Result<Option<usize>, Self::Error> {
        match self.inbox.try_recv() {
            Ok(frame) => {
                if frame.len() > buffer.len() {
                    return Err(SimulatorError::FrameTooLarge {
                        len: frame.len(),
                        capacity: buffer.len(),
                    });
                }
                buffer[..frame.len()].copy_from_slice(&frame);
                Ok(Some(frame.len()))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(SimulatorError::Detached(self.node_id)),
        }
    }

    fn configure(&mut self, channel: u8, power: u8) -> Result<(), Self::Error> {
        if !(11..=26).contains(&channel) {
            return Err(SimulatorError::InvalidChannel(channel));
        }

        if power > 30 {
            return Err(SimulatorError::InvalidPower(power));
        }

        self.channel = channel;
        self.power = power;
        Ok(())
    }
}

/// 模拟器硬件实现
pub struct SimHardware {
    node_id: NodeId,
    radio: SimRadio,
    clock: SimClock,
}

impl SimHardware {
    pub fn new(node_id: NodeId, medium: SimChannel, clock: SimClock) -> Self {
        Self {
            node_id,
            radio: SimRadio::new(medium, node_id),
            clock,
        }
    }
}

impl DelayMs<u32> for SimHardware {
    // 模拟时间由延时推进，不真正休眠
    fn delay_ms(&mut self, ms: u32) {
        self.clock.advance(u64::from(ms));
    }
}

impl Hardware for SimHardware {
    type Error = SimulatorError;
    type Radio = SimRadio;

    fn get_node_id(&self) -> NodeId {
        self.node_id
    }

    fn get_radio(&mut self) -> &mut Self::Radio {
        &mut self.radio
    }

    fn get_timestamp_ms(&self) -> Result<u64, Self::Error> {
        Ok(self.clock.now_ms())
    }
}

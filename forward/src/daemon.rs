//! 路由守护进程
//!
//! 单线程轮询：每轮先执行过期清理，再收完待处理的帧，最后按需广播。
//! 接收失败只丢弃当前帧，发送与时钟错误才会中止轮询。
//! 路由表只在这一条执行路径上被修改，接收与过期天然串行。

use core::convert::Infallible;
use core::fmt;

use common::hal::{Hardware, RadioInterface};
use common::protocol::{
    decode_frame, encode_advertisement, encode_route_request, EncodeError, Frame, NodeId,
    MAX_PACKET_SIZE,
};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, RouterConfig};
use crate::routing::advertisement::{advertisements, receive_advertisement};
use crate::routing::expiry::ExpiryTimer;
use crate::routing::{ForwardingTable, RoutingTable};

/// 守护进程错误
#[derive(Debug)]
pub enum DaemonError<HE, RE> {
    /// 硬件（时钟等）错误
    Hardware(HE),
    /// 无线电收发错误
    Radio(RE),
    /// 帧编码失败
    Encode(EncodeError),
}

impl<HE: fmt::Debug, RE: fmt::Debug> fmt::Display for DaemonError<HE, RE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaemonError::Hardware(err) => write!(f, "hardware error: {err:?}"),
            DaemonError::Radio(err) => write!(f, "radio error: {err:?}"),
            DaemonError::Encode(err) => write!(f, "encode error: {err}"),
        }
    }
}

#[cfg(feature = "simulator")]
impl<HE: fmt::Debug, RE: fmt::Debug> std::error::Error for DaemonError<HE, RE> {}

impl<HE, RE> From<EncodeError> for DaemonError<HE, RE> {
    fn from(err: EncodeError) -> Self {
        DaemonError::Encode(err)
    }
}

/// 某个硬件实现对应的守护进程错误
pub type HardwareError<H> =
    DaemonError<<H as Hardware>::Error, <<H as Hardware>::Radio as RadioInterface>::Error>;

/// 一轮轮询的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// 过期移除的路由数
    pub expired: usize,
    /// 成功解码的帧数
    pub frames_received: usize,
    /// 接收或解码失败被丢弃的帧数
    pub frames_dropped: usize,
    /// 本轮发出的通告帧数
    pub advertised: usize,
}

pub struct RouterDaemon {
    node_id: NodeId,
    config: RouterConfig,
    table: RoutingTable,
    expiry: ExpiryTimer,
    last_advertised_ms: u64,
    rx_buffer: [u8; MAX_PACKET_SIZE],
    tx_buffer: [u8; MAX_PACKET_SIZE],
}

impl RouterDaemon {
    pub fn new(node_id: NodeId, config: RouterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            node_id,
            config,
            table: RoutingTable::new(),
            expiry: ExpiryTimer::new(config.expiry_sweep_interval_ms),
            last_advertised_ms: 0,
            rx_buffer: [0; MAX_PACKET_SIZE],
            tx_buffer: [0; MAX_PACKET_SIZE],
        })
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// 查询到达目的地的下一跳
    pub fn next_hop(&self, destination: &NodeId) -> Option<NodeId> {
        self.table.get_next_hop(destination)
    }

    /// 配置无线电、向邻居请求路由表并广播自身
    pub fn start<H: Hardware>(&mut self, hardware: &mut H) -> Result<(), HardwareError<H>> {
        hardware
            .get_radio()
            .configure(self.config.radio_channel, self.config.radio_power)
            .map_err(HardwareError::<H>::Radio)?;

        let now = hardware.get_timestamp_ms().map_err(HardwareError::<H>::Hardware)?;
        self.expiry.reset(now);

        let len = encode_route_request(self.node_id, &mut self.tx_buffer)?;
        hardware
            .get_radio()
            .send_frame(&self.tx_buffer[..len])
            .map_err(HardwareError::<H>::Radio)?;

        let frames = self.broadcast(hardware, now)?;
        info!(
            node = %self.node_id,
            channel = self.config.radio_channel,
            power = self.config.radio_power,
            capacity = self.table.capacity(),
            frames,
            "router started"
        );
        Ok(())
    }

    /// 执行一轮：过期清理、接收、按需广播
    pub fn poll<H: Hardware>(&mut self, hardware: &mut H) -> Result<PollSummary, HardwareError<H>> {
        let now = hardware.get_timestamp_ms().map_err(HardwareError::<H>::Hardware)?;
        let mut summary = PollSummary::default();

        if let Some(expired) = self.expiry.poll(now, &mut self.table) {
            summary.expired = expired;
            if expired > 0 {
                info!(node = %self.node_id, expired, remaining = self.table.len(), "routes expired");
            }
        }

        let mut broadcast_due = false;
        loop {
            let len = match hardware.get_radio().receive_frame(&mut self.rx_buffer) {
                Ok(Some(len)) => len,
                Ok(None) => break,
                Err(err) => {
                    // 接收失败的帧已离开收件队列，本轮不再继续接收
                    summary.frames_dropped += 1;
                    warn!(node = %self.node_id, ?err, "receive failed, dropping frame");
                    break;
                }
            };
            match decode_frame(&self.rx_buffer[..len]) {
                Ok(Frame::RouteRequest { source }) => {
                    summary.frames_received += 1;
                    if source != self.node_id {
                        debug!(node = %self.node_id, %source, "route request received");
                        broadcast_due = true;
                    }
                }
                Ok(Frame::Advertisement(advertisement)) => {
                    summary.frames_received += 1;
                    receive_advertisement(&mut self.table, self.node_id, &advertisement);
                }
                Err(err) => {
                    summary.frames_dropped += 1;
                    warn!(node = %self.node_id, len, %err, "dropping malformed frame");
                }
            }
        }

        let interval_elapsed =
            now.saturating_sub(self.last_advertised_ms) >= self.config.advertise_interval_ms;
        if broadcast_due || interval_elapsed {
            summary.advertised = self.broadcast(hardware, now)?;
        }

        Ok(summary)
    }

    /// 启动后无限轮询，每轮之间延时 `poll_interval_ms`
    pub fn run<H: Hardware>(&mut self, hardware: &mut H) -> Result<Infallible, HardwareError<H>> {
        self.start(hardware)?;
        loop {
            self.poll(hardware)?;
            hardware.delay_ms(self.config.poll_interval_ms);
        }
    }

    /// 广播完整路由表，返回发出的帧数
    fn broadcast<H: Hardware>(
        &mut self,
        hardware: &mut H,
        now: u64,
    ) -> Result<usize, HardwareError<H>> {
        let mut frames = 0;
        for advertisement in advertisements(&self.table, self.node_id) {
            let len = encode_advertisement(&advertisement, &mut self.tx_buffer)?;
            hardware
                .get_radio()
                .send_frame(&self.tx_buffer[..len])
                .map_err(HardwareError::<H>::Radio)?;
            frames += 1;
        }

        self.last_advertised_ms = now;
        debug!(node = %self.node_id, frames, routes = self.table.len(), "routing table advertised");
        Ok(frames)
    }
}

#[cfg(feature = "simulator")]
pub mod simulator;

use core::fmt::Debug;

use embedded_hal::blocking::delay::DelayMs;

use crate::protocol::NodeId;

/// 无线电接口抽象，所有发送均为本地广播
pub trait RadioInterface {
    type Error: Debug;

    /// 广播一帧
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), Self::Error>;

    /// 接收一帧，没有待收数据时返回 `None`
    fn receive_frame(&mut self, buffer: &mut [u8]) -> Result<Option<usize>, Self::Error>;

    /// 配置无线电
    fn configure(&mut self, channel: u8, power: u8) -> Result<(), Self::Error>;
}

/// 硬件抽象层接口
pub trait Hardware: DelayMs<u32> {
    type Error: Debug;
    type Radio: RadioInterface;

    /// 获取本节点ID
    fn get_node_id(&self) -> NodeId;

    /// 获取无线电接口
    fn get_radio(&mut self) -> &mut Self::Radio;

    /// 获取当前时间戳（毫秒）
    fn get_timestamp_ms(&self) -> Result<u64, Self::Error>;
}

use core::fmt;

pub mod advertisement;

pub use advertisement::{
    decode_frame, encode_advertisement, encode_route_request, AdvertisedRoute, Advertisement,
    DecodeError, EncodeError, Frame, FrameHeader, WireRoute,
};

// 协议常量和公共类型定义
pub const MAX_PACKET_SIZE: usize = 256;
pub const PROTOCOL_VERSION: u8 = 1;
pub const FRAME_MAGIC: u16 = 0xAA55;

/// 帧头长度（字节）
pub const HEADER_LEN: usize = core::mem::size_of::<FrameHeader>();
/// 单条路由条目长度（字节）
pub const ENTRY_LEN: usize = core::mem::size_of::<WireRoute>();
/// 单帧最多携带的路由条目数
pub const MAX_ENTRIES_PER_PACKET: usize = (MAX_PACKET_SIZE - HEADER_LEN) / ENTRY_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PacketType {
    RouteRequest = 0x01,  // 请求邻居发送完整路由表
    Advertisement = 0x02, // 路由通告
}

impl TryFrom<u8> for PacketType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(PacketType::RouteRequest),
            0x02 => Ok(PacketType::Advertisement),
            other => Err(other),
        }
    }
}

/// 节点地址（6字节），路由表只关心它能否判等
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeId(pub [u8; 6]);

impl NodeId {
    pub const fn new(id: [u8; 6]) -> Self {
        Self(id)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

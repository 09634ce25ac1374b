//! 路由通告帧的编解码
//!
//! 帧格式（大端序）：
//!
//! ```text
//! +-------+---------+------+--------+-------+----------+----------+
//! | magic | version | type | source | count | reserved | checksum |
//! |  u16  |   u8    |  u8  | [u8;6] |  u8   |    u8    |   u16    |
//! +-------+---------+------+--------+-------+----------+----------+
//! | destination [u8;6] | cost u32 |  x count
//! +--------------------+----------+
//! ```
//!
//! 校验和为整帧（校验和字段置 0）的 CRC-16，帧尾的填充字节不参与校验。

use core::fmt;

use heapless::Vec;
use zerocopy::byteorder::{BigEndian, U16, U32};
use zerocopy::{AsBytes, FromBytes, LayoutVerified, Unaligned};

use crate::protocol::{
    NodeId, PacketType, ENTRY_LEN, FRAME_MAGIC, HEADER_LEN, MAX_ENTRIES_PER_PACKET,
    PROTOCOL_VERSION,
};
use crate::utils::checksum::{calculate_checksum, calculate_checksum_parts};

/// 帧头，按线上字节布局定义，可零拷贝解析
#[repr(C)]
#[derive(AsBytes, FromBytes, Unaligned, Clone, Copy, Debug)]
pub struct FrameHeader {
    pub magic: U16<BigEndian>,
    pub version: u8,
    pub packet_type: u8,
    pub source: [u8; 6],
    pub entry_count: u8,
    pub reserved: u8,
    pub checksum: U16<BigEndian>,
}

/// 线上路由条目
#[repr(C)]
#[derive(AsBytes, FromBytes, Unaligned, Clone, Copy, Debug)]
pub struct WireRoute {
    pub destination: [u8; 6],
    pub cost: U32<BigEndian>,
}

/// 通告中的一条路由：邻居到目的地的代价（尚未加一跳）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdvertisedRoute {
    pub destination: NodeId,
    pub cost: u32,
}

impl AdvertisedRoute {
    pub const fn new(destination: NodeId, cost: u32) -> Self {
        Self { destination, cost }
    }
}

/// 一帧路由通告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    pub source: NodeId,
    entries: Vec<AdvertisedRoute, MAX_ENTRIES_PER_PACKET>,
}

impl Advertisement {
    pub fn new(source: NodeId) -> Self {
        Self {
            source,
            entries: Vec::new(),
        }
    }

    /// 追加一条路由，帧已满时原样返回该路由
    pub fn push(&mut self, route: AdvertisedRoute) -> Result<(), AdvertisedRoute> {
        self.entries.push(route)
    }

    pub fn routes(&self) -> &[AdvertisedRoute] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.is_full()
    }
}

/// 解码后的帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// 邻居请求完整路由表
    RouteRequest { source: NodeId },
    /// 邻居的路由通告
    Advertisement(Advertisement),
}

impl Frame {
    pub fn source(&self) -> NodeId {
        match self {
            Frame::RouteRequest { source } => *source,
            Frame::Advertisement(advertisement) => advertisement.source,
        }
    }

    pub fn packet_type(&self) -> PacketType {
        match self {
            Frame::RouteRequest { .. } => PacketType::RouteRequest,
            Frame::Advertisement(_) => PacketType::Advertisement,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    BufferTooSmall { needed: usize, available: usize },
    TooManyEntries(usize),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::BufferTooSmall { needed, available } => {
                write!(f, "buffer too small: need {needed} bytes, have {available}")
            }
            EncodeError::TooManyEntries(count) => {
                write!(f, "{count} entries exceed the per-frame limit of {MAX_ENTRIES_PER_PACKET}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    Truncated { needed: usize, available: usize },
    BadMagic(u16),
    UnsupportedVersion(u8),
    UnknownPacketType(u8),
    TooManyEntries(usize),
    UnexpectedEntries(usize),
    ChecksumMismatch { expected: u16, actual: u16 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Truncated { needed, available } => {
                write!(f, "truncated frame: need {needed} bytes, got {available}")
            }
            DecodeError::BadMagic(magic) => write!(f, "bad frame magic {magic:#06x}"),
            DecodeError::UnsupportedVersion(version) => {
                write!(f, "unsupported protocol version {version}")
            }
            DecodeError::UnknownPacketType(kind) => write!(f, "unknown packet type {kind:#04x}"),
            DecodeError::TooManyEntries(count) => {
                write!(f, "{count} entries exceed the per-frame limit of {MAX_ENTRIES_PER_PACKET}")
            }
            DecodeError::UnexpectedEntries(count) => {
                write!(f, "route request carries {count} entries")
            }
            DecodeError::ChecksumMismatch { expected, actual } => {
                write!(f, "checksum mismatch: header says {expected:#06x}, computed {actual:#06x}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// 编码路由通告，返回写入的字节数
pub fn encode_advertisement(
    advertisement: &Advertisement,
    buffer: &mut [u8],
) -> Result<usize, EncodeError> {
    encode_frame(
        PacketType::Advertisement,
        advertisement.source,
        advertisement.routes(),
        buffer,
    )
}

/// 编码路由请求，返回写入的字节数
pub fn encode_route_request(source: NodeId, buffer: &mut [u8]) -> Result<usize, EncodeError> {
    encode_frame(PacketType::RouteRequest, source, &[], buffer)
}

fn encode_frame(
    packet_type: PacketType,
    source: NodeId,
    routes: &[AdvertisedRoute],
    buffer: &mut [u8],
) -> Result<usize, EncodeError> {
    if routes.len() > MAX_ENTRIES_PER_PACKET {
        return Err(EncodeError::TooManyEntries(routes.len()));
    }

    let frame_len = HEADER_LEN + routes.len() * ENTRY_LEN;
    if buffer.len() < frame_len {
        return Err(EncodeError::BufferTooSmall {
            needed: frame_len,
            available: buffer.len(),
        });
    }

    let mut header = FrameHeader {
        magic: U16::new(FRAME_MAGIC),
        version: PROTOCOL_VERSION,
        packet_type: packet_type as u8,
        source: source.0,
        entry_count: routes.len() as u8,
        reserved: 0,
        checksum: U16::new(0),
    };
    buffer[..HEADER_LEN].copy_from_slice(header.as_bytes());

    for (slot, route) in buffer[HEADER_LEN..frame_len]
        .chunks_exact_mut(ENTRY_LEN)
        .zip(routes)
    {
        let wire = WireRoute {
            destination: route.destination.0,
            cost: U32::new(route.cost),
        };
        slot.copy_from_slice(wire.as_bytes());
    }

    header.checksum = U16::new(calculate_checksum(&buffer[..frame_len]));
    buffer[..HEADER_LEN].copy_from_slice(header.as_bytes());

    Ok(frame_len)
}

/// 解码一帧；帧尾多余的填充字节会被忽略
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, DecodeError> {
    let (header, body) = LayoutVerified::<_, FrameHeader>::new_unaligned_from_prefix(bytes)
        .ok_or(DecodeError::Truncated {
            needed: HEADER_LEN,
            available: bytes.len(),
        })?;
    let header: FrameHeader = *header;

    if header.magic.get() != FRAME_MAGIC {
        return Err(DecodeError::BadMagic(header.magic.get()));
    }
    if header.version != PROTOCOL_VERSION {
        return Err(DecodeError::UnsupportedVersion(header.version));
    }
    let packet_type =
        PacketType::try_from(header.packet_type).map_err(DecodeError::UnknownPacketType)?;

    let entry_count = header.entry_count as usize;
    if entry_count > MAX_ENTRIES_PER_PACKET {
        return Err(DecodeError::TooManyEntries(entry_count));
    }
    let body_len = entry_count * ENTRY_LEN;
    if body.len() < body_len {
        return Err(DecodeError::Truncated {
            needed: HEADER_LEN + body_len,
            available: bytes.len(),
        });
    }
    let body = &body[..body_len];

    let mut zeroed = header;
    zeroed.checksum = U16::new(0);
    let actual = calculate_checksum_parts(&[zeroed.as_bytes(), body]);
    if actual != header.checksum.get() {
        return Err(DecodeError::ChecksumMismatch {
            expected: header.checksum.get(),
            actual,
        });
    }

    let source = NodeId(header.source);
    match packet_type {
        PacketType::RouteRequest if entry_count != 0 => {
            Err(DecodeError::UnexpectedEntries(entry_count))
        }
        PacketType::RouteRequest => Ok(Frame::RouteRequest { source }),
        PacketType::Advertisement => {
            let mut advertisement = Advertisement::new(source);
            for chunk in body.chunks_exact(ENTRY_LEN) {
                let wire = LayoutVerified::<_, WireRoute>::new_unaligned(chunk).ok_or(
                    DecodeError::Truncated {
                        needed: HEADER_LEN + body_len,
                        available: bytes.len(),
                    },
                )?;
                advertisement
                    .push(AdvertisedRoute::new(NodeId(wire.destination), wire.cost.get()))
                    .map_err(|_| DecodeError::TooManyEntries(entry_count))?;
            }
            Ok(Frame::Advertisement(advertisement))
        }
    }
}

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod protocol;
pub mod hal;
pub mod utils;

// 重新导出核心模块
pub use protocol::{Advertisement, AdvertisedRoute, Frame, NodeId};
pub use hal::{Hardware, RadioInterface};
pub use utils::calculate_checksum;

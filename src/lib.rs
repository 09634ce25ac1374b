//! AetherRoute：无线节点间的距离向量路由
//!
//! - [`common`]：线上协议、硬件抽象与模拟器
//! - [`forward`]：路由表、通告收发与守护进程

pub use common;
pub use forward;

pub mod checksum;

pub use checksum::{calculate_checksum, calculate_checksum_parts};

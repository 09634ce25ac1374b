use crc::{Crc, CRC_16_IBM_3740};

/// CRC-16/IBM-3740（即 CCITT-FALSE：多项式 0x1021，初始值 0xFFFF）
const FRAME_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// 计算帧校验和
pub fn calculate_checksum(data: &[u8]) -> u16 {
    FRAME_CRC.checksum(data)
}

/// 分段计算校验和，帧头中的校验和字段需要被当作 0 参与计算
pub fn calculate_checksum_parts(parts: &[&[u8]]) -> u16 {
    let mut digest = FRAME_CRC.digest();
    for part in parts {
        digest.update(part);
    }
    digest.finalize()
}

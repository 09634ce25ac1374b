use core::fmt;

/// 路由守护进程配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// 周期广播路由表的间隔（毫秒）
    pub advertise_interval_ms: u64,
    /// 过期清理的间隔（毫秒）
    pub expiry_sweep_interval_ms: u64,
    /// 主循环每轮之间的延时（毫秒）
    pub poll_interval_ms: u32,
    /// 无线电信道（11-26）
    pub radio_channel: u8,
    /// 发射功率（dBm）
    pub radio_power: u8,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            advertise_interval_ms: 30_000,
            expiry_sweep_interval_ms: 1_000,
            poll_interval_ms: 100,
            radio_channel: 15,
            radio_power: 20,
        }
    }
}

impl RouterConfig {
    pub const fn with_advertise_interval_ms(mut self, interval_ms: u64) -> Self {
        self.advertise_interval_ms = interval_ms;
        self
    }

    pub const fn with_expiry_sweep_interval_ms(mut self, interval_ms: u64) -> Self {
        self.expiry_sweep_interval_ms = interval_ms;
        self
    }

    pub const fn with_poll_interval_ms(mut self, interval_ms: u32) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    pub const fn with_radio(mut self, channel: u8, power: u8) -> Self {
        self.radio_channel = channel;
        self.radio_power = power;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.advertise_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("advertise_interval_ms"));
        }
        if self.expiry_sweep_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("expiry_sweep_interval_ms"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("poll_interval_ms"));
        }
        if !(11..=26).contains(&self.radio_channel) {
            return Err(ConfigError::ChannelOutOfRange(self.radio_channel));
        }
        if self.radio_power > 30 {
            return Err(ConfigError::PowerTooHigh(self.radio_power));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    ZeroInterval(&'static str),
    ChannelOutOfRange(u8),
    PowerTooHigh(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroInterval(field) => write!(f, "{field} must be greater than zero"),
            ConfigError::ChannelOutOfRange(channel) => {
                write!(f, "radio channel {channel} is outside 11..=26")
            }
            ConfigError::PowerTooHigh(power) => {
                write!(f, "transmit power {power} dBm exceeds 30 dBm")
            }
        }
    }
}

#[cfg(feature = "simulator")]
impl std::error::Error for ConfigError {}

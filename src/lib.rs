mod codec;
mod config;
mod diff;
mod error;
mod logger;
mod protocol;
mod session;
mod transport;
mod types;

pub use codec::{decode, decode_power, encode};
pub use config::{DEFAULT_NAME, DEFAULT_PORT, DEFAULT_TIMEOUT_MS, DeviceConfig};
pub use error::{Error, Result};
pub use logger::MessageLogMode;
pub use protocol::{
    CURRENT_TEMPERATURE_REGISTER, Command, HEATING_RELAY_REGISTER, MODE_REGISTER,
    POWER_OFF_REGISTER, Register, RegisterKind, SETPOINT_REGISTER, command_message,
};
pub use session::{DeviceSession, DeviceSessionBuilder, SessionState};
pub use types::*;

use std::fmt;

/// Lowest setpoint the device accepts, in degrees Celsius.
pub const MIN_SETPOINT_C: f64 = 5.0;
/// Highest setpoint the device accepts, in degrees Celsius.
pub const MAX_SETPOINT_C: f64 = 45.0;
/// Step exposed to consumers for target temperature adjustments.
pub const TARGET_TEMPERATURE_STEP_C: f64 = 1.0;

/// Temperature stored as Celsius.
/// The device transmits temperatures as whole tenths of a degree.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Temperature(f64);

impl Temperature {
    pub fn from_celsius(c: f64) -> Self {
        Self(c)
    }

    pub fn from_tenths(tenths: i32) -> Self {
        Self(tenths as f64 / 10.0)
    }

    pub fn celsius(&self) -> f64 {
        self.0
    }

    /// Round to the device's wire precision (tenths of a degree).
    pub fn to_tenths(&self) -> i32 {
        (self.0 * 10.0).round() as i32
    }

    pub fn is_valid_setpoint(&self) -> bool {
        (MIN_SETPOINT_C..=MAX_SETPOINT_C).contains(&self.0)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}\u{00b0}C", self.0)
    }
}

/// Operating mode as presented to consumers.
///
/// `Heat` is the device's manual mode (hold the setpoint); `Auto` follows the
/// on-device schedule. `Off` is reported whenever the power-off register is
/// set, whatever the mode register says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermostatMode {
    Auto,
    Heat,
    Off,
}

impl ThermostatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThermostatMode::Auto => "auto",
            ThermostatMode::Heat => "heat",
            ThermostatMode::Off => "off",
        }
    }
}

impl fmt::Display for ThermostatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mode values a caller can write to the mode register.
/// Turning the device off is a power intent, not a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    Auto,
    Heat,
}

impl From<ControlMode> for ThermostatMode {
    fn from(mode: ControlMode) -> Self {
        match mode {
            ControlMode::Auto => ThermostatMode::Auto,
            ControlMode::Heat => ThermostatMode::Heat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HvacAction {
    Off,
    Heating,
    Idle,
}

/// Decoded status snapshot. Each field is `None` when its register was
/// missing or unparseable.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceAttributes {
    pub current_temperature: Option<Temperature>,
    pub setpoint: Option<Temperature>,
    pub mode: Option<ThermostatMode>,
    pub heating_active: Option<bool>,
}

impl DeviceAttributes {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn action(&self) -> Option<HvacAction> {
        if self.mode == Some(ThermostatMode::Off) {
            return Some(HvacAction::Off);
        }
        match self.heating_active? {
            true => Some(HvacAction::Heating),
            false => Some(HvacAction::Idle),
        }
    }
}

/// A caller-level request to change device state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    SetPower(bool),
    SetMode(ControlMode),
    SetSetpoint(f64),
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::SetPower(_) => "set_power",
            Intent::SetMode(_) => "set_mode",
            Intent::SetSetpoint(_) => "set_setpoint",
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Who and where the device is. Fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub serial: String,
    pub host: String,
    pub port: u16,
    pub credentials: Option<Credentials>,
}

impl DeviceIdentity {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

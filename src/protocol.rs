use serde_json::{Map, Value, json};

pub const API_PATH: &str = "/api.cgi";

pub const POWER_OFF_REGISTER: u16 = 125;
pub const MODE_REGISTER: u16 = 2;
pub const SETPOINT_REGISTER: u16 = 5;
pub const CURRENT_TEMPERATURE_REGISTER: u16 = 31;
pub const HEATING_RELAY_REGISTER: u16 = 32;

pub const MODE_OFF: i32 = -1;
pub const MODE_AUTO: i32 = 0;
pub const MODE_MANUAL: i32 = 3;

/// Command ids understood by the `/api.cgi` endpoint.
///
/// `Control` serves both reads (no `par`) and writes (with `par`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Control,
    Status,
}

impl Command {
    pub fn id(&self) -> u8 {
        match self {
            Command::Control => 1,
            Command::Status => 4,
        }
    }
}

/// Interpretation of a register's string value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterKind {
    TemperatureTenths,
    Enum,
    Flag,
}

impl RegisterKind {
    pub fn tag(&self) -> u8 {
        match self {
            RegisterKind::TemperatureTenths => 1,
            RegisterKind::Enum => 2,
            RegisterKind::Flag => 7,
        }
    }

    pub fn from_tag(tag: u64) -> Option<Self> {
        match tag {
            1 => Some(RegisterKind::TemperatureTenths),
            2 => Some(RegisterKind::Enum),
            7 => Some(RegisterKind::Flag),
            _ => None,
        }
    }
}

/// One `[id, tag, "value"]` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub id: u16,
    pub kind: RegisterKind,
    pub raw: String,
}

impl Register {
    pub fn new(id: u16, kind: RegisterKind, raw: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            raw: raw.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!([self.id, self.kind.tag(), self.raw])
    }
}

/// Build the request body. `par` is left out entirely when there is
/// nothing to send; some firmware treats `"par": []` differently.
pub fn command_message(command: Command, serial: &str, params: &[Register]) -> Value {
    let mut body = Map::new();
    body.insert("cmd".to_string(), json!(command.id()));
    body.insert("sn".to_string(), json!(serial));
    if !params.is_empty() {
        let par = params.iter().map(Register::to_json).collect();
        body.insert("par".to_string(), Value::Array(par));
    }
    Value::Object(body)
}

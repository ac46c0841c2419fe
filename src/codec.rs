use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, trace};

use crate::protocol::{
    CURRENT_TEMPERATURE_REGISTER, HEATING_RELAY_REGISTER, MODE_AUTO, MODE_MANUAL, MODE_OFF,
    MODE_REGISTER, POWER_OFF_REGISTER, Register, RegisterKind, SETPOINT_REGISTER,
};
use crate::types::*;
use crate::{Error, Result};

#[derive(Debug, Default)]
struct StatusFields {
    power_off: Option<bool>,
    mode: Option<i32>,
    setpoint: Option<Temperature>,
    current_temperature: Option<Temperature>,
    heating_active: Option<bool>,
}

impl StatusFields {
    fn resolve(self) -> DeviceAttributes {
        let mode = match self.power_off {
            Some(true) => Some(ThermostatMode::Off),
            _ => self.mode.map(mode_from_raw),
        };
        DeviceAttributes {
            current_temperature: self.current_temperature,
            setpoint: self.setpoint,
            mode,
            heating_active: self.heating_active,
        }
    }
}

type FieldDecoder = fn(&str, &mut StatusFields);

const STATUS_REGISTERS: &[(u16, RegisterKind, FieldDecoder)] = &[
    (POWER_OFF_REGISTER, RegisterKind::Flag, decode_power_off),
    (MODE_REGISTER, RegisterKind::Enum, decode_mode),
    (SETPOINT_REGISTER, RegisterKind::TemperatureTenths, decode_setpoint),
    (
        CURRENT_TEMPERATURE_REGISTER,
        RegisterKind::TemperatureTenths,
        decode_current_temperature,
    ),
    (HEATING_RELAY_REGISTER, RegisterKind::Flag, decode_heating_relay),
];

fn decode_power_off(raw: &str, fields: &mut StatusFields) {
    fields.power_off = parse_flag(raw);
}

fn decode_mode(raw: &str, fields: &mut StatusFields) {
    fields.mode = parse_int(raw);
}

fn decode_setpoint(raw: &str, fields: &mut StatusFields) {
    fields.setpoint = parse_int(raw)
        .map(Temperature::from_tenths)
        .filter(Temperature::is_valid_setpoint);
}

fn decode_current_temperature(raw: &str, fields: &mut StatusFields) {
    fields.current_temperature = parse_int(raw).map(Temperature::from_tenths);
}

fn decode_heating_relay(raw: &str, fields: &mut StatusFields) {
    fields.heating_active = parse_flag(raw);
}

fn parse_int(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}

fn mode_from_raw(value: i32) -> ThermostatMode {
    match value {
        MODE_OFF => ThermostatMode::Off,
        MODE_MANUAL => ThermostatMode::Heat,
        _ => ThermostatMode::Auto,
    }
}

fn mode_to_raw(mode: ControlMode) -> i32 {
    match mode {
        ControlMode::Auto => MODE_AUTO,
        ControlMode::Heat => MODE_MANUAL,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn register_entries(response: &Value) -> Result<&[Value]> {
    match response {
        Value::Array(entries) => Ok(entries),
        Value::Object(map) => match map.get("par") {
            Some(Value::Array(entries)) => Ok(entries),
            None => Ok(&[][..]),
            Some(other) => Err(Error::MalformedResponse(format!(
                "\"par\" is {}, expected array",
                json_type(other)
            ))),
        },
        other => Err(Error::MalformedResponse(format!(
            "expected register container, got {}",
            json_type(other)
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RawRegister {
    tag: Option<u64>,
    value: String,
}

fn parse_triple(entry: &Value) -> Option<(u16, RawRegister)> {
    let triple = entry.as_array().filter(|t| t.len() == 3)?;
    let id = u16::try_from(triple[0].as_u64()?).ok()?;
    let value = match &triple[2] {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Some((id, RawRegister { tag: triple[1].as_u64(), value }))
}

fn tagged_registers(response: &Value) -> Result<BTreeMap<u16, RawRegister>> {
    let mut registers = BTreeMap::new();
    for entry in register_entries(response)? {
        match parse_triple(entry) {
            Some((id, register)) => {
                registers.insert(id, register);
            }
            None => debug!(%entry, "skipping malformed register entry"),
        }
    }
    Ok(registers)
}

/// Collect register values by id. Later duplicates replace earlier ones;
/// entries that are not `[id, tag, value]` triples are skipped.
pub(crate) fn raw_registers(response: &Value) -> Result<BTreeMap<u16, String>> {
    Ok(tagged_registers(response)?
        .into_iter()
        .map(|(id, register)| (id, register.value))
        .collect())
}

/// Whether the incoming tag names the kind the table expects for `id`.
/// A mismatch is only logged: values are always interpreted by register id.
fn tag_matches(id: u16, expected: RegisterKind, tag: Option<u64>) -> bool {
    let kind = tag.and_then(RegisterKind::from_tag);
    if kind == Some(expected) {
        return true;
    }
    debug!(
        id,
        ?tag,
        expected = expected.tag(),
        "register tag does not match its kind"
    );
    false
}

/// Decode a status response into attributes.
///
/// Only fails when `response` is not a register container. Missing or
/// unparseable registers leave their attribute `None`.
pub fn decode(response: &Value) -> Result<DeviceAttributes> {
    let registers = tagged_registers(response)?;
    let mut fields = StatusFields::default();
    for &(id, kind, decode_field) in STATUS_REGISTERS {
        if let Some(register) = registers.get(&id) {
            tag_matches(id, kind, register.tag);
            decode_field(register.value.as_str(), &mut fields);
        }
    }
    trace!(?fields, "decoded status registers");
    Ok(fields.resolve())
}

/// Read the power state from a control response: `Some(true)` when the
/// device is powered on.
pub fn decode_power(response: &Value) -> Result<Option<bool>> {
    let registers = raw_registers(response)?;
    Ok(registers
        .get(&POWER_OFF_REGISTER)
        .and_then(|raw| parse_flag(raw))
        .map(|off| !off))
}

pub fn encode(intent: &Intent) -> Result<Vec<Register>> {
    let register = match *intent {
        Intent::SetPower(on) => {
            Register::new(POWER_OFF_REGISTER, RegisterKind::Flag, if on { "0" } else { "1" })
        }
        Intent::SetMode(mode) => {
            Register::new(MODE_REGISTER, RegisterKind::Enum, mode_to_raw(mode).to_string())
        }
        Intent::SetSetpoint(celsius) => {
            let temp = Temperature::from_celsius(celsius);
            if !temp.is_valid_setpoint() {
                return Err(Error::OutOfRange {
                    value: celsius,
                    min: MIN_SETPOINT_C,
                    max: MAX_SETPOINT_C,
                });
            }
            Register::new(
                SETPOINT_REGISTER,
                RegisterKind::TemperatureTenths,
                temp.to_tenths().to_string(),
            )
        }
    };
    Ok(vec![register])
}

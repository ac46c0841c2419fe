use serde_json::json;
use terneo::{
    ControlMode, Error, Intent, MODE_REGISTER, POWER_OFF_REGISTER, Register, RegisterKind,
    Temperature, ThermostatMode, decode, encode,
};

#[test]
fn temperature_from_tenths() {
    let t = Temperature::from_tenths(215);
    assert_eq!(t.celsius(), 21.5);
    assert_eq!(t.to_tenths(), 215);
    assert_eq!(Temperature::from_tenths(-45).celsius(), -4.5);
}

#[test]
fn temperature_rounds_to_tenths() {
    assert_eq!(Temperature::from_celsius(22.34).to_tenths(), 223);
    assert_eq!(Temperature::from_celsius(22.36).to_tenths(), 224);
}

#[test]
fn display() {
    let t = Temperature::from_celsius(22.5);
    assert_eq!(format!("{t}"), "22.5\u{00b0}C");
    assert_eq!(ThermostatMode::Heat.to_string(), "heat");
}

#[test]
fn power_overrides_heat_mode() {
    let response = json!({"par": [[2, 2, "3"], [125, 7, "1"]]});
    assert_eq!(decode(&response).unwrap().mode, Some(ThermostatMode::Off));

    let response = json!({"par": [[2, 2, "3"], [125, 7, "0"]]});
    assert_eq!(decode(&response).unwrap().mode, Some(ThermostatMode::Heat));
}

#[test]
fn mode_roundtrip_through_wire_json() {
    for mode in [ControlMode::Auto, ControlMode::Heat] {
        let regs = encode(&Intent::SetMode(mode)).unwrap();
        let wire = terneo::command_message(terneo::Command::Control, "SN", &regs);
        let decoded = decode(&wire).unwrap();
        assert_eq!(decoded.mode, Some(ThermostatMode::from(mode)));
    }
}

#[test]
fn set_mode_leaves_power_register_alone() {
    let regs = encode(&Intent::SetMode(ControlMode::Heat)).unwrap();
    assert_eq!(regs.len(), 1);
    assert_eq!(regs[0].id, MODE_REGISTER);
    assert!(regs.iter().all(|r| r.id != POWER_OFF_REGISTER));
}

#[test]
fn setpoint_bounds() {
    assert_eq!(
        encode(&Intent::SetSetpoint(5.0)).unwrap(),
        vec![Register::new(5, RegisterKind::TemperatureTenths, "50")]
    );
    assert_eq!(encode(&Intent::SetSetpoint(45.0)).unwrap()[0].raw, "450");
    let err = encode(&Intent::SetSetpoint(50.0)).unwrap_err();
    assert!(matches!(err, Error::OutOfRange { value, .. } if value == 50.0));
}

#[test]
fn register_json_shape() {
    let reg = Register::new(125, RegisterKind::Flag, "1");
    assert_eq!(reg.to_json(), json!([125, 7, "1"]));
}

#[test]
fn empty_response_decodes_to_nothing() {
    assert!(decode(&json!([])).unwrap().is_empty());
    assert!(decode(&json!({"par": []})).unwrap().is_empty());
}

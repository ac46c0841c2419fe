use std::time::Duration;

use tracing::{Instrument, Span, debug, debug_span, warn};

use crate::codec::{decode, decode_power, encode};
use crate::config::DeviceConfig;
use crate::logger::{MessageLogMode, MessageLogger};
use crate::protocol::Command;
use crate::transport::Transport;
use crate::types::*;
use crate::Result;

/// Cached view of the device, replaced wholesale by every `refresh`.
///
/// When `available` is false every attribute is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionState {
    pub available: bool,
    pub attributes: DeviceAttributes,
}

impl SessionState {
    fn online(attributes: DeviceAttributes) -> Self {
        Self {
            available: true,
            attributes,
        }
    }

    fn unavailable() -> Self {
        Self::default()
    }
}

pub struct DeviceSessionBuilder {
    config: DeviceConfig,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
    span: Option<Span>,
}

impl DeviceSessionBuilder {
    pub fn new(serial: impl Into<String>, host: impl Into<String>) -> Self {
        Self::from_config(DeviceConfig::new(serial, host))
    }

    pub fn from_config(config: DeviceConfig) -> Self {
        Self {
            config,
            log_mode: None,
            log_path: None,
            span: None,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = Some(password.into());
        self
    }

    pub fn credentials(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username(username).password(password)
    }

    /// Per-request timeout, rounded up to whole milliseconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.config.timeout_ms = u64::try_from(millis).unwrap_or(u64::MAX);
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    /// Span every request of the session is recorded under.
    /// Defaults to `terneo{sn=<serial>}`.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn build(self) -> Result<DeviceSession> {
        let identity = self.config.identity()?;

        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => Some(MessageLogger::new(mode, &path)?),
            _ => None,
        };

        let transport = Transport::new(&identity, self.config.timeout(), logger)?;
        let span = self
            .span
            .unwrap_or_else(|| debug_span!("terneo", sn = %identity.serial));

        Ok(DeviceSession {
            identity,
            name: self.config.name,
            transport,
            state: SessionState::unavailable(),
            span,
        })
    }
}

/// The caller-facing handle for one thermostat.
///
/// Nothing runs in the background: the caller decides when to `refresh`.
/// Operations take `&mut self`, so sharing a session across tasks needs a
/// mutex around it.
pub struct DeviceSession {
    identity: DeviceIdentity,
    name: String,
    transport: Transport,
    state: SessionState,
    span: Span,
}

impl DeviceSession {
    pub fn builder(serial: impl Into<String>, host: impl Into<String>) -> DeviceSessionBuilder {
        DeviceSessionBuilder::new(serial, host)
    }

    pub fn from_config(config: &DeviceConfig) -> Result<Self> {
        DeviceSessionBuilder::from_config(config.clone()).build()
    }

    /// Read the full status and replace the cached state.
    ///
    /// Never fails: an unreachable device, a bad HTTP reply or an
    /// unrecognizable body all leave the session unavailable.
    pub async fn refresh(&mut self) {
        let span = self.span.clone();
        async {
            let was_available = self.state.available;
            self.state = match self.fetch_status().await {
                Ok(attributes) => {
                    debug!(?attributes, "status refreshed");
                    SessionState::online(attributes)
                }
                Err(e) => {
                    if was_available {
                        warn!(error = %e, "device became unavailable");
                    } else {
                        debug!(error = %e, "device still unavailable");
                    }
                    SessionState::unavailable()
                }
            };
        }
        .instrument(span)
        .await
    }

    async fn fetch_status(&mut self) -> Result<DeviceAttributes> {
        let response = self
            .transport
            .send(Command::Status, &self.identity.serial, &[])
            .await?;
        decode(&response)
    }

    /// Send one control intent. Returns whether the device took the request.
    ///
    /// The cached state is left alone; call `refresh` to observe the result.
    /// Fails only with `Error::OutOfRange`, in which case nothing is sent.
    pub async fn apply(&mut self, intent: Intent) -> Result<bool> {
        let span = self.span.clone();
        async {
            let registers = match encode(&intent) {
                Ok(registers) => registers,
                Err(e) => {
                    warn!(intent = intent.name(), error = %e, "rejected command");
                    return Err(e);
                }
            };

            match self
                .transport
                .send(Command::Control, &self.identity.serial, &registers)
                .await
            {
                Ok(ack) => {
                    debug!(intent = intent.name(), %ack, "command sent");
                    Ok(true)
                }
                Err(e) => {
                    warn!(intent = intent.name(), error = %e, "command not applied");
                    Ok(false)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Read the power-off register with a control read (command 1 without
    /// parameters). `Some(true)` means powered on; `None` means unknown.
    /// Does not touch the cached state.
    pub async fn query_power(&mut self) -> Option<bool> {
        let span = self.span.clone();
        async {
            self.transport
                .send(Command::Control, &self.identity.serial, &[])
                .await
                .and_then(|response| decode_power(&response))
                .inspect_err(|e| debug!(error = %e, "power query failed"))
                .ok()
                .flatten()
        }
        .instrument(span)
        .await
    }

    pub async fn turn_on(&mut self) -> Result<bool> {
        self.apply(Intent::SetPower(true)).await
    }

    pub async fn turn_off(&mut self) -> Result<bool> {
        self.apply(Intent::SetPower(false)).await
    }

    /// `Off` powers the device down; `Auto`/`Heat` only write the mode
    /// register and leave the power state as it is.
    pub async fn set_hvac_mode(&mut self, mode: ThermostatMode) -> Result<bool> {
        let intent = match mode {
            ThermostatMode::Off => Intent::SetPower(false),
            ThermostatMode::Auto => Intent::SetMode(ControlMode::Auto),
            ThermostatMode::Heat => Intent::SetMode(ControlMode::Heat),
        };
        self.apply(intent).await
    }

    pub async fn set_temperature(&mut self, celsius: f64) -> Result<bool> {
        self.apply(Intent::SetSetpoint(celsius)).await
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn attributes(&self) -> &DeviceAttributes {
        &self.state.attributes
    }

    pub fn available(&self) -> bool {
        self.state.available
    }

    pub fn current_temperature(&self) -> Option<Temperature> {
        self.state.attributes.current_temperature
    }

    pub fn setpoint(&self) -> Option<Temperature> {
        self.state.attributes.setpoint
    }

    pub fn mode(&self) -> Option<ThermostatMode> {
        self.state.attributes.mode
    }

    pub fn heating_active(&self) -> Option<bool> {
        self.state.attributes.heating_active
    }

    pub fn action(&self) -> Option<HvacAction> {
        self.state.attributes.action()
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn unique_id(&self) -> &str {
        &self.identity.serial
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    pub fn min_temp(&self) -> f64 {
        MIN_SETPOINT_C
    }

    pub fn max_temp(&self) -> f64 {
        MAX_SETPOINT_C
    }

    pub fn target_temperature_step(&self) -> f64 {
        TARGET_TEMPERATURE_STEP_C
    }
}

impl std::fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("identity", &self.identity)
            .field("name", &self.name)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn build_rejects_empty_serial() {
        let err = DeviceSession::builder("", "10.0.0.2").build().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn build_rejects_partial_credentials() {
        let err = DeviceSession::builder("sn", "10.0.0.2")
            .password("secret")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn new_session_starts_unavailable() {
        let session = DeviceSession::builder("sn", "10.0.0.2")
            .port(8080)
            .build()
            .unwrap();
        assert!(!session.available());
        assert!(session.attributes().is_empty());
        assert_eq!(session.endpoint(), "http://10.0.0.2:8080/api.cgi");
        assert_eq!(session.unique_id(), "sn");
        assert_eq!(session.name(), "Terneo");
    }

    #[test]
    fn zero_timeout_is_configuration_error() {
        let err = DeviceSession::builder("sn", "10.0.0.2")
            .timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn sub_millisecond_timeout_rounds_up() {
        let builder =
            DeviceSession::builder("sn", "10.0.0.2").timeout(Duration::from_micros(500));
        assert_eq!(builder.config.timeout_ms, 1);
        builder.build().unwrap();

        let builder =
            DeviceSession::builder("sn", "10.0.0.2").timeout(Duration::from_micros(1_500));
        assert_eq!(builder.config.timeout_ms, 2);
        let builder = builder.timeout(Duration::from_millis(250));
        assert_eq!(builder.config.timeout_ms, 250);
    }
}

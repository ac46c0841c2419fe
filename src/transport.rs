use std::time::Duration;

use serde_json::Value;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::logger::MessageLogger;
use crate::protocol::{API_PATH, Command, Register, command_message};
use crate::types::{Credentials, DeviceIdentity};
use crate::{Error, Result};

/// One HTTP request/response cycle against the device's `/api.cgi`.
/// Holds no device state; every call is independent and never retried.
pub(crate) struct Transport {
    http: reqwest::Client,
    endpoint: String,
    credentials: Option<Credentials>,
    logger: Option<MessageLogger>,
}

impl Transport {
    pub fn new(
        identity: &DeviceIdentity,
        timeout: Duration,
        logger: Option<MessageLogger>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: format!("{}{}", identity.base_url(), API_PATH),
            credentials: identity.credentials.clone(),
            logger,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `command` and return the parsed body untouched.
    pub async fn send(
        &mut self,
        command: Command,
        serial: &str,
        params: &[Register],
    ) -> Result<Value> {
        let body = command_message(command, serial, params);
        let exchange = Uuid::new_v4();
        debug!(cmd = command.id(), registers = params.len(), "sending command");

        if let Some(ref mut logger) = self.logger {
            logger.log_request(exchange, command, &body);
        }

        match self.post(&body).await {
            Ok((status, response)) => {
                trace!(status, %response, "device response");
                if let Some(ref mut logger) = self.logger {
                    logger.log_response(exchange, command, status, &response);
                }
                Ok(response)
            }
            Err(e) => {
                debug!(cmd = command.id(), error = %e, "command failed");
                if let Some(ref mut logger) = self.logger {
                    logger.log_failure(exchange, command, &e.to_string());
                }
                Err(e)
            }
        }
    }

    async fn post(&self, body: &Value) -> Result<(u16, Value)> {
        let mut request = self.http.post(&self.endpoint).json(body);
        if let Some(ref creds) = self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        let resp = request.send().await.map_err(Error::Unreachable)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Protocol(format!("HTTP status {status}")));
        }

        let text = resp.text().await.map_err(Error::Unreachable)?;
        let parsed = serde_json::from_str(&text)
            .map_err(|e| Error::Protocol(format!("response is not JSON: {e}")))?;
        Ok((status.as_u16(), parsed))
    }
}

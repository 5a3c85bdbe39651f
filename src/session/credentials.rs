use crate::error::ConnectionError;
use crate::transport::OpenParams;
use serde_derive::Deserialize;
use std::collections::HashMap;

/// What pairing with the bridge hands out.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    /// Host name or IP address of the bridge
    pub address: String,
    /// Application key for the configuration API
    pub username: String,
    /// Pre-shared key for the streaming link, as hex
    pub client_key: String,
    /// PSK identity, the application id
    pub app_id: String,
}

impl Credentials {
    pub fn new(address: &str, username: &str, client_key: &str, app_id: &str) -> Credentials {
        Credentials {
            address: address.to_string(),
            username: username.to_string(),
            client_key: client_key.to_string(),
            app_id: app_id.to_string(),
        }
    }

    /// Check that nothing is missing
    pub fn validate(&self) -> Result<(), ConnectionError> {
        let fields = [
            ("address", &self.address),
            ("username", &self.username),
            ("client key", &self.client_key),
            ("app id", &self.app_id),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ConnectionError::MissingCredential(name));
            }
        }
        Ok(())
    }

    /// Decoded pre-shared key
    pub fn psk(&self) -> Result<Vec<u8>, ConnectionError> {
        decode_hex(self.client_key.trim()).map_err(ConnectionError::InvalidKey)
    }

    pub fn open_params(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<OpenParams, ConnectionError> {
        self.validate()?;
        Ok(OpenParams {
            address: self.address.trim().to_string(),
            psk: self.psk()?,
            identity: self.app_id.trim().to_string(),
            params: params.clone(),
        })
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>, String> {
    if s.len() % 2 != 0 {
        return Err("Odd number of hex digits".to_string());
    }
    let mut bytes = Vec::with_capacity(s.len() / 2);
    let mut high = None;
    for c in s.chars() {
        let d = match c.to_digit(16) {
            Some(d) => d as u8,
            None => return Err(format!("Invalid hex digit '{}'", c)),
        };
        match high.take() {
            None => high = Some(d),
            Some(h) => bytes.push((h << 4) | d),
        }
    }
    Ok(bytes)
}

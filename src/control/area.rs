use crate::error::ControlPlaneError;
use serde_derive::Deserialize;

/// An entertainment area as configured on the bridge.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Area {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Channel ids in the order the bridge lists them
    pub channels: Vec<u8>,
}

impl Area {
    pub fn new(id: &str, channels: &[u8]) -> Area {
        Area {
            id: id.to_string(),
            name: None,
            channels: channels.to_vec(),
        }
    }
}

// Response to GET clip/v2/resource/entertainment_configuration

#[derive(Debug, Deserialize)]
struct AreaResponse {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
    #[serde(default)]
    data: Vec<AreaDescriptor>,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct AreaDescriptor {
    id: String,
    id_v1: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    metadata: Option<AreaMetadata>,
    configuration_type: Option<String>,
    channels: Option<Vec<AreaChannel>>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AreaMetadata {
    name: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct AreaChannel {
    channel_id: u8,
    position: Option<ChannelPosition>,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct ChannelPosition {
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
}

impl From<AreaDescriptor> for Area {
    fn from(desc: AreaDescriptor) -> Area {
        Area {
            id: desc.id,
            name: desc.metadata.and_then(|m| m.name),
            channels: desc
                .channels
                .unwrap_or_default()
                .into_iter()
                .map(|c| c.channel_id)
                .collect(),
        }
    }
}

/// Parse the bridge's list of entertainment configurations.
pub fn parse_areas(json: &str) -> Result<Vec<Area>, ControlPlaneError> {
    let response: AreaResponse = serde_json::from_str(json)?;
    if !response.errors.is_empty() {
        let errors: Vec<String> = response.errors.iter().map(|e| e.to_string()).collect();
        return Err(ControlPlaneError::Rejected(format!(
            "Error loading areas: {}",
            errors.join(", ")
        )));
    }
    if response.data.is_empty() {
        return Err(ControlPlaneError::NoAreas);
    }
    Ok(response.data.into_iter().map(Area::from).collect())
}

//! Area provisioning on the bridge.

pub mod area;
pub mod control_plane;

pub use area::{parse_areas, Area};
pub use control_plane::{ControlCall, ControlPlane, StaticControlPlane};

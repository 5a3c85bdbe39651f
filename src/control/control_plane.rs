use super::area::Area;
use crate::error::{ControlPlaneError, DynFuture};
use log::info;
use std::sync::{Mutex, MutexGuard};

/// The bridge's configuration API, as far as streaming needs it.
pub trait ControlPlane: Send + Sync {
    fn areas(&self) -> DynFuture<'_, Result<Vec<Area>, ControlPlaneError>>;

    /// Tell the bridge to accept streamed frames for the area
    fn activate<'a>(&'a self, area_id: &'a str) -> DynFuture<'a, Result<(), ControlPlaneError>>;

    fn deactivate<'a>(&'a self, area_id: &'a str)
        -> DynFuture<'a, Result<(), ControlPlaneError>>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum ControlCall {
    Activate(String),
    Deactivate(String),
}

#[derive(Default)]
struct ControlState {
    active: Option<String>,
    calls: Vec<ControlCall>,
    reject: bool,
}

/// Control plane with a fixed set of areas, for bridge emulators and tests.
pub struct StaticControlPlane {
    areas: Vec<Area>,
    state: Mutex<ControlState>,
}

impl StaticControlPlane {
    pub fn new(areas: Vec<Area>) -> StaticControlPlane {
        StaticControlPlane {
            areas,
            state: Mutex::new(ControlState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Reject all following activation and deactivation requests
    pub fn reject_requests(&self, reject: bool) {
        self.state().reject = reject;
    }

    pub fn active_area(&self) -> Option<String> {
        self.state().active.clone()
    }

    pub fn calls(&self) -> Vec<ControlCall> {
        self.state().calls.clone()
    }

    fn set_active(&self, call: ControlCall) -> Result<(), ControlPlaneError> {
        let mut state = self.state();
        state.calls.push(call.clone());
        if state.reject {
            return Err(ControlPlaneError::Rejected("Request refused".to_string()));
        }
        match call {
            ControlCall::Activate(id) => {
                if !self.areas.iter().any(|a| a.id == id) {
                    return Err(ControlPlaneError::Rejected(format!("Unknown area {}", id)));
                }
                match &state.active {
                    Some(active) if *active != id => {
                        return Err(ControlPlaneError::Rejected(format!(
                            "Area {} is already streaming",
                            active
                        )));
                    }
                    _ => {}
                }
                info!("Area {} active", id);
                state.active = Some(id);
            }
            ControlCall::Deactivate(id) => {
                if state.active.as_deref() == Some(id.as_str()) {
                    info!("Area {} inactive", id);
                    state.active = None;
                }
            }
        }
        Ok(())
    }
}

impl ControlPlane for StaticControlPlane {
    fn areas(&self) -> DynFuture<'_, Result<Vec<Area>, ControlPlaneError>> {
        let res = if self.areas.is_empty() {
            Err(ControlPlaneError::NoAreas)
        } else {
            Ok(self.areas.clone())
        };
        Box::pin(std::future::ready(res))
    }

    fn activate<'a>(&'a self, area_id: &'a str) -> DynFuture<'a, Result<(), ControlPlaneError>> {
        let res = self.set_active(ControlCall::Activate(area_id.to_string()));
        Box::pin(std::future::ready(res))
    }

    fn deactivate<'a>(
        &'a self,
        area_id: &'a str,
    ) -> DynFuture<'a, Result<(), ControlPlaneError>> {
        let res = self.set_active(ControlCall::Deactivate(area_id.to_string()));
        Box::pin(std::future::ready(res))
    }
}

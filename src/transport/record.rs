use crate::error::{DynFuture, DynFutureStatic};
use crate::protocol::{Frame, AREA_ID_LEN};
use crate::transport::transport::{
    Connector, OpenError, OpenParams, OpenResult, SendResult, Transport, TransportInfo,
};
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq)]
pub enum RecordEvent {
    Opened { address: String, identity: String },
    Frame(Vec<u8>),
    Closed,
}

#[derive(Default)]
struct RecorderState {
    events: Vec<RecordEvent>,
    open_links: usize,
    refuse_open: bool,
    link_down: bool,
}

/// Hands out in-memory links that keep every frame sent through them.
#[derive(Clone, Default)]
pub struct Recorder {
    state: Arc<Mutex<RecorderState>>,
}

impl Recorder {
    pub fn new() -> Recorder {
        Recorder::default()
    }

    fn state(&self) -> MutexGuard<'_, RecorderState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn events(&self) -> Vec<RecordEvent> {
        self.state().events.clone()
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.state()
            .events
            .iter()
            .filter_map(|e| match e {
                RecordEvent::Frame(f) => Some(f.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn open_links(&self) -> usize {
        self.state().open_links
    }

    /// Make the following open calls fail
    pub fn refuse_open(&self, refuse: bool) {
        self.state().refuse_open = refuse;
    }

    /// Make sends on open links report that the link closed
    pub fn link_down(&self, down: bool) {
        self.state().link_down = down;
    }
}

impl Connector for Recorder {
    fn open(&self, params: OpenParams) -> DynFutureStatic<OpenResult> {
        let mut state = self.state();
        let res: OpenResult = if state.refuse_open {
            Err(OpenError::TransportError("Connection refused".into()))
        } else {
            state.events.push(RecordEvent::Opened {
                address: params.address,
                identity: params.identity,
            });
            state.open_links += 1;
            Ok(Box::new(RecordTransport {
                recorder: self.clone(),
                open: true,
            }))
        };
        Box::pin(std::future::ready(res))
    }
}

pub struct RecordTransport {
    recorder: Recorder,
    open: bool,
}

impl Transport for RecordTransport {
    fn send(&mut self, frame: &[u8]) -> SendResult {
        if !self.open {
            return SendResult::Closed("Link closed".to_string());
        }
        let mut state = self.recorder.state();
        if state.link_down {
            return SendResult::Closed("Link down".to_string());
        }
        match Frame::parse(frame, AREA_ID_LEN) {
            Ok(f) => debug!("Frame for {}: {} channels", f.area_id, f.channels.len()),
            Err(e) => debug!("Frame of {} bytes ({})", frame.len(), e),
        }
        state.events.push(RecordEvent::Frame(frame.to_vec()));
        SendResult::Ok
    }

    fn close(&mut self) -> DynFuture<'_, ()> {
        if self.open {
            self.open = false;
            let mut state = self.recorder.state();
            state.open_links -= 1;
            state.events.push(RecordEvent::Closed);
        }
        Box::pin(std::future::ready(()))
    }
}

impl Drop for RecordTransport {
    fn drop(&mut self) {
        if self.open {
            self.open = false;
            let mut state = self.recorder.state();
            state.open_links -= 1;
            state.events.push(RecordEvent::Closed);
        }
    }
}

fn transport_open(params: OpenParams) -> DynFutureStatic<OpenResult> {
    Recorder::new().open(params)
}

pub fn transport_info() -> TransportInfo {
    TransportInfo {
        name: "RECORD".to_string(),
        description: "Keeps frames in memory and logs them. Sends nothing.".to_string(),
        open: transport_open,
    }
}

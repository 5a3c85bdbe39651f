use super::credentials::Credentials;
use crate::animation::{
    Animation, AnimationCurve, AreaUpdate, ChannelAssignment, Scheduler, SchedulerConfig,
    Timestamp,
};
use crate::color::Rgb;
use crate::control::{Area, ControlPlane};
use crate::error::{ConnectionError, ControlPlaneError, SessionError};
use crate::transport::{Connector, SendResult, Transport};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Link open, no area streaming
    Connected,
    Streaming,
    Stopped,
}

#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    pub scheduler: SchedulerConfig,
    /// Passed on to the transport when connecting
    pub transport_params: HashMap<String, String>,
}

pub type Clock<Instant> = Box<dyn Fn() -> Instant + Send + Sync>;

enum StartOutcome {
    Started,
    AlreadyStreaming,
    Abandoned(SessionError),
}

struct SessionInner<Instant> {
    state: SessionState,
    transport: Option<Box<dyn Transport>>,
    area: Option<Area>,
    scheduler: Scheduler<Instant>,
}

impl<Instant> SessionInner<Instant>
where
    Instant: Timestamp,
{
    fn link_lost(&mut self, reason: &str) {
        error!("Streaming link lost: {}", reason);
        if let Some(area) = self.area.take() {
            warn!("Area {} may still be active on the bridge", area.id);
        }
        self.transport = None;
        self.scheduler.clear();
        self.state = SessionState::Idle;
    }
}

/// Streams animated colors to one entertainment area.
///
/// All methods take `&self` so the session can be shared with the driver
/// calling `tick`. State is kept behind a mutex that is never held while
/// waiting for the bridge or the transport.
pub struct StreamingSession<Instant = tokio::time::Instant> {
    connector: Arc<dyn Connector>,
    control: Arc<dyn ControlPlane>,
    transport_params: HashMap<String, String>,
    clock: Clock<Instant>,
    inner: Mutex<SessionInner<Instant>>,
}

impl StreamingSession<tokio::time::Instant> {
    pub fn new(
        connector: Arc<dyn Connector>,
        control: Arc<dyn ControlPlane>,
        config: SessionConfig,
    ) -> StreamingSession<tokio::time::Instant> {
        StreamingSession::with_clock(
            connector,
            control,
            config,
            Box::new(tokio::time::Instant::now),
        )
    }
}

impl<Instant> StreamingSession<Instant>
where
    Instant: Timestamp,
{
    pub fn with_clock(
        connector: Arc<dyn Connector>,
        control: Arc<dyn ControlPlane>,
        config: SessionConfig,
        clock: Clock<Instant>,
    ) -> StreamingSession<Instant> {
        StreamingSession {
            connector,
            control,
            transport_params: config.transport_params,
            clock,
            inner: Mutex::new(SessionInner {
                state: SessionState::Idle,
                transport: None,
                area: None,
                scheduler: Scheduler::new(config.scheduler),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner<Instant>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn now(&self) -> Instant {
        (self.clock)()
    }

    pub fn current_state(&self) -> SessionState {
        self.lock().state
    }

    pub fn active_area(&self) -> Option<Area> {
        self.lock().area.clone()
    }

    /// Number of updates still animating
    pub fn pending_updates(&self) -> usize {
        self.lock().scheduler.len()
    }

    /// Areas configured on the bridge
    pub async fn areas(&self) -> Result<Vec<Area>, SessionError> {
        Ok(self.control.areas().await?)
    }

    /// Open the streaming link. Allowed from `Idle` and `Stopped`.
    pub async fn connect(&self, credentials: &Credentials) -> Result<(), SessionError> {
        match self.current_state() {
            SessionState::Idle | SessionState::Stopped => {}
            _ => return Err(ConnectionError::AlreadyConnected.into()),
        }
        let params = credentials.open_params(&self.transport_params)?;
        info!("Connecting to {} as {}", params.address, params.identity);
        let transport = self.connector.open(params).await?;
        let stale = {
            let mut inner = self.lock();
            match inner.state {
                SessionState::Idle | SessionState::Stopped => {
                    inner.transport = Some(transport);
                    inner.area = None;
                    inner.scheduler.clear();
                    inner.state = SessionState::Connected;
                    None
                }
                _ => Some(transport),
            }
        };
        if let Some(mut transport) = stale {
            // Someone else connected while we were opening
            transport.close().await;
            return Err(ConnectionError::AlreadyConnected.into());
        }
        debug!("Connected");
        Ok(())
    }

    /// Ask the bridge to start streaming to `area`.
    pub async fn start(&self, area: &Area) -> Result<(), SessionError> {
        {
            let inner = self.lock();
            match (inner.state, &inner.area) {
                (SessionState::Connected, _) => {}
                (SessionState::Streaming, Some(active)) => {
                    return Err(ControlPlaneError::Rejected(format!(
                        "Already streaming to area {}",
                        active.id
                    ))
                    .into())
                }
                _ => return Err(ConnectionError::NotConnected.into()),
            }
        }
        self.control.activate(&area.id).await?;
        let outcome = {
            let mut inner = self.lock();
            let same_area = inner.area.as_ref().map_or(false, |a| a.id == area.id);
            match inner.state {
                SessionState::Connected => {
                    inner.area = Some(area.clone());
                    inner.state = SessionState::Streaming;
                    StartOutcome::Started
                }
                // A concurrent start won. The activation on the bridge is
                // shared and must stay when it is for the same area.
                SessionState::Streaming if same_area => StartOutcome::AlreadyStreaming,
                SessionState::Streaming => StartOutcome::Abandoned(
                    ControlPlaneError::Rejected("Streaming to another area".to_string()).into(),
                ),
                _ => StartOutcome::Abandoned(ConnectionError::NotConnected.into()),
            }
        };
        match outcome {
            StartOutcome::Started => {}
            StartOutcome::AlreadyStreaming => {
                return Err(ControlPlaneError::Rejected(format!(
                    "Already streaming to area {}",
                    area.id
                ))
                .into())
            }
            StartOutcome::Abandoned(err) => {
                warn!("Area {} activated but can't be streamed to: {}", area.id, err);
                if let Err(e) = self.control.deactivate(&area.id).await {
                    warn!("Failed to deactivate area {}: {}", area.id, e);
                }
                return Err(err);
            }
        }
        info!(
            "Streaming to area {} ({} channels)",
            area.id,
            area.channels.len()
        );
        Ok(())
    }

    /// Stop streaming.
    ///
    /// When streaming, the end state of running updates is sent as a last
    /// frame, the area is deactivated and then the link is closed. The
    /// session ends up `Stopped` even if deactivation fails. Stopping a
    /// session that is only connected closes the link and returns to
    /// `Idle`.
    pub async fn stop(&self) -> Result<(), SessionError> {
        let (transport, area) = {
            let mut guard = self.lock();
            let inner = &mut *guard;
            match inner.state {
                SessionState::Idle => return Err(ConnectionError::NotConnected.into()),
                SessionState::Stopped => return Err(ControlPlaneError::NoActiveArea.into()),
                SessionState::Connected => {
                    inner.state = SessionState::Idle;
                    (inner.transport.take(), None)
                }
                SessionState::Streaming => {
                    inner.state = SessionState::Stopped;
                    match inner.transport.as_mut() {
                        Some(transport) => {
                            inner.scheduler.flush(|frame| {
                                if let SendResult::Closed(reason) = transport.send(frame) {
                                    warn!("Final frame not sent: {}", reason);
                                }
                            });
                        }
                        None => inner.scheduler.clear(),
                    }
                    (inner.transport.take(), inner.area.take())
                }
            }
        };
        let res = match &area {
            Some(area) => {
                info!("Stopping area {}", area.id);
                self.control
                    .deactivate(&area.id)
                    .await
                    .map_err(SessionError::from)
            }
            None => Ok(()),
        };
        if let Some(mut transport) = transport {
            transport.close().await;
        }
        res
    }

    /// Fade the area's channels to `colors`, starting now.
    pub fn enqueue(
        &self,
        colors: ChannelAssignment,
        ramp_seconds: f64,
        curve: AnimationCurve,
    ) -> Result<(), SessionError> {
        let start = self.now();
        self.enqueue_at(colors, start, ramp_seconds, curve)
    }

    pub fn enqueue_at(
        &self,
        colors: ChannelAssignment,
        start: Instant,
        ramp_seconds: f64,
        curve: AnimationCurve,
    ) -> Result<(), SessionError> {
        let mut inner = self.lock();
        let area_id = match (inner.state, &inner.area) {
            (SessionState::Streaming, Some(area)) => {
                if let Some(c) = colors.keys().find(|c| !area.channels.contains(*c)) {
                    debug!("Channel {} is not part of area {}", c, area.id);
                }
                area.id.clone()
            }
            _ => return Err(ControlPlaneError::NoActiveArea.into()),
        };
        inner.scheduler.enqueue(AreaUpdate::new(
            &area_id,
            colors,
            Animation::new(start, ramp_seconds, curve),
        ));
        Ok(())
    }

    fn area_channels(&self) -> Result<Vec<u8>, SessionError> {
        let inner = self.lock();
        match (inner.state, &inner.area) {
            (SessionState::Streaming, Some(area)) => Ok(area.channels.clone()),
            _ => Err(ControlPlaneError::NoActiveArea.into()),
        }
    }

    /// Assign `colors` to the area's channels in turn, repeating the
    /// palette when there are more channels than colors.
    pub fn turn_on(
        &self,
        colors: &[Rgb],
        ramp_seconds: f64,
        curve: AnimationCurve,
    ) -> Result<(), SessionError> {
        let channels = self.area_channels()?;
        if colors.is_empty() {
            warn!("No colors to turn on");
            return Ok(());
        }
        let assignment = channels
            .iter()
            .enumerate()
            .map(|(i, c)| (*c, colors[i % colors.len()]))
            .collect();
        self.enqueue(assignment, ramp_seconds, curve)
    }

    /// Set every channel of the area to black immediately.
    pub fn turn_off(&self) -> Result<(), SessionError> {
        let channels = self.area_channels()?;
        let assignment = channels.iter().map(|c| (*c, Rgb::BLACK)).collect();
        self.enqueue(assignment, 0.0, AnimationCurve::default())
    }

    /// Send one frame per running update. Does nothing unless streaming.
    /// Returns the number of frames handed to the transport.
    pub fn tick(&self, now: &Instant) -> usize {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if inner.state != SessionState::Streaming {
            return 0;
        }
        let transport = match inner.transport.as_mut() {
            Some(t) => t,
            None => return 0,
        };
        let mut closed = None;
        let sent = inner.scheduler.tick(now, |frame| {
            if closed.is_some() {
                return;
            }
            match transport.send(frame) {
                SendResult::Ok => {}
                SendResult::Dropped => debug!("Frame dropped"),
                SendResult::Closed(reason) => closed = Some(reason),
            }
        });
        if let Some(reason) = closed {
            inner.link_lost(&reason);
            return 0;
        }
        sent
    }

    /// Report that the link failed outside of a send.
    pub fn transport_failed(&self, reason: &str) {
        let mut inner = self.lock();
        match inner.state {
            SessionState::Connected | SessionState::Streaming => inner.link_lost(reason),
            _ => {}
        }
    }
}

use super::session::{SessionState, StreamingSession};
use log::{debug, error};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

/// Running tick task. Dropping the handle stops it.
pub struct DriverHandle {
    stop: watch::Sender<bool>,
    join: JoinHandle<usize>,
}

impl DriverHandle {
    /// Stop ticking. Returns the number of frames sent.
    pub async fn stop(self) -> usize {
        let _ = self.stop.send(true);
        self.join().await
    }

    /// Wait for the task to end by itself, when the session stops streaming.
    pub async fn join(self) -> usize {
        let DriverHandle { stop, join } = self;
        let res = join.await;
        drop(stop);
        match res {
            Ok(frames) => frames,
            Err(e) => {
                error!("Driver task failed: {}", e);
                0
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

async fn drive(
    session: Arc<StreamingSession>,
    period: Duration,
    mut stop: watch::Receiver<bool>,
) -> usize {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut ticks = IntervalStream::new(interval);
    let mut frames = 0;
    loop {
        tokio::select! {
            tick = ticks.next() => {
                let now = match tick {
                    Some(now) => now,
                    None => break,
                };
                if session.current_state() != SessionState::Streaming {
                    debug!("Session no longer streaming");
                    break;
                }
                frames += session.tick(&now);
            }
            res = stop.changed() => {
                if res.is_err() || *stop.borrow() {
                    break;
                }
            }
        }
    }
    debug!("Driver done, {} frames sent", frames);
    frames
}

/// Call `tick` on the session every `period` until it stops streaming.
/// Ticks that fall behind are skipped, not made up for.
pub fn spawn_driver(session: Arc<StreamingSession>, period: Duration) -> DriverHandle {
    let (stop_tx, stop_rx) = watch::channel(false);
    let join = tokio::spawn(drive(session, period, stop_rx));
    DriverHandle {
        stop: stop_tx,
        join,
    }
}

#[cfg(test)]
mod test {
    use super::spawn_driver;
    use crate::animation::AnimationCurve;
    use crate::color::Rgb;
    use crate::control::{Area, StaticControlPlane};
    use crate::session::{Credentials, SessionConfig, SessionState, StreamingSession};
    use crate::transport::record::Recorder;
    use std::sync::Arc;
    use std::time::Duration;

    async fn streaming(recorder: &Recorder) -> Arc<StreamingSession> {
        let area = Area::new("area", &[0, 1]);
        let session = Arc::new(StreamingSession::new(
            Arc::new(recorder.clone()),
            Arc::new(StaticControlPlane::new(vec![area.clone()])),
            SessionConfig::default(),
        ));
        session
            .connect(&Credentials::new("10.0.0.2", "user", "00ff", "app"))
            .await
            .unwrap();
        session.start(&area).await.unwrap();
        session
    }

    #[tokio::test]
    async fn ticks_until_stopped() {
        let recorder = Recorder::new();
        let session = streaming(&recorder).await;
        session
            .turn_on(&[Rgb::new(1.0, 0.5, 0.0)], 0.02, AnimationCurve::Linear)
            .unwrap();
        let driver = spawn_driver(session.clone(), Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(session.pending_updates(), 0);
        assert!(!driver.is_finished());
        let frames = driver.stop().await;
        assert!(frames >= 1);
        assert_eq!(recorder.frames().len(), frames);
    }

    #[tokio::test]
    async fn exits_when_session_stops() {
        let recorder = Recorder::new();
        let session = streaming(&recorder).await;
        let driver = spawn_driver(session.clone(), Duration::from_millis(5));
        session.stop().await.unwrap();
        assert_eq!(session.current_state(), SessionState::Stopped);
        let frames = tokio::time::timeout(Duration::from_secs(1), driver.join())
            .await
            .unwrap();
        assert_eq!(frames, 0);
    }
}

use super::animation::Animation;
use super::timestamp::Timestamp;
use crate::color::{DeviceColor, Gamut, Rgb};
use crate::protocol::Frame;
use log::debug;
use std::collections::BTreeMap;

pub type ChannelAssignment = BTreeMap<u8, Rgb>;

#[derive(Clone, Copy, Debug, Default)]
pub struct SchedulerConfig {
    /// Gamut of the lamps in the area
    pub gamut: Gamut,
    /// Ramp every color to full brightness instead of its own luminance
    pub force_full_brightness: bool,
}

/// A set of channel colors faded in over an animation.
#[derive(Clone, Debug)]
pub struct AreaUpdate<Instant> {
    pub area_id: String,
    pub channels: ChannelAssignment,
    pub animation: Animation<Instant>,
}

impl<Instant> AreaUpdate<Instant>
where
    Instant: Timestamp,
{
    pub fn new(
        area_id: &str,
        channels: ChannelAssignment,
        animation: Animation<Instant>,
    ) -> AreaUpdate<Instant> {
        AreaUpdate {
            area_id: area_id.to_string(),
            channels,
            animation,
        }
    }

    /// Device colors with brightness scaled by `level` (0.0 - 1.0)
    pub fn device_colors(&self, level: f64, config: &SchedulerConfig) -> BTreeMap<u8, DeviceColor> {
        self.channels
            .iter()
            .map(|(id, rgb)| {
                let base = if rgb.is_black() {
                    0.0
                } else if config.force_full_brightness {
                    1.0
                } else {
                    rgb.luminance()
                };
                (
                    *id,
                    DeviceColor::from_rgb(rgb, &config.gamut, Some(level * base)),
                )
            })
            .collect()
    }

    pub fn frame(&self, level: f64, config: &SchedulerConfig) -> Frame {
        Frame::xy_brightness(&self.area_id, &self.device_colors(level, config))
    }
}

/// Keeps track of running animations and turns them into frames.
pub struct Scheduler<Instant> {
    config: SchedulerConfig,
    active: Vec<AreaUpdate<Instant>>, // In insertion order
    buffer: Vec<u8>,
}

impl<Instant> Scheduler<Instant>
where
    Instant: Timestamp,
{
    pub fn new(config: SchedulerConfig) -> Scheduler<Instant> {
        Scheduler {
            config,
            active: Vec::new(),
            buffer: Vec::with_capacity(256),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn active(&self) -> &[AreaUpdate<Instant>] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Add an update. Updates are never merged, overlapping channels are
    /// written by each update in the order they were added.
    pub fn enqueue(&mut self, update: AreaUpdate<Instant>) {
        self.active.push(update);
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Send one frame for each active update, then drop the updates that
    /// reached their end state. Returns the number of frames sent.
    pub fn tick<F>(&mut self, now: &Instant, mut send: F) -> usize
    where
        F: FnMut(&[u8]),
    {
        if self.active.is_empty() {
            return 0;
        }
        let mut done = Vec::with_capacity(self.active.len());
        for update in &self.active {
            let level = update.animation.value(now);
            self.buffer.clear();
            update.frame(level, &self.config).write_to(&mut self.buffer);
            send(&self.buffer);
            done.push(update.animation.is_complete(now));
        }
        let sent = done.len();
        let mut done = done.into_iter();
        self.active.retain(|_| !done.next().unwrap_or(false));
        if self.active.len() < sent {
            debug!(
                "{} updates completed, {} active",
                sent - self.active.len(),
                self.active.len()
            );
        }
        sent
    }

    /// Send the end state of every active update and clear the set.
    pub fn flush<F>(&mut self, mut send: F) -> usize
    where
        F: FnMut(&[u8]),
    {
        let sent = self.active.len();
        for update in self.active.drain(..) {
            self.buffer.clear();
            update.frame(1.0, &self.config).write_to(&mut self.buffer);
            send(&self.buffer);
        }
        sent
    }
}

#[cfg(test)]
mod test {
    use super::{AreaUpdate, ChannelAssignment, Scheduler, SchedulerConfig};
    use crate::animation::{Animation, AnimationCurve};
    use crate::color::{gamut::GAMUT_C, DeviceColor, Rgb};
    use crate::protocol::{ColorMode, Frame};

    const AREA: &str = "area";

    fn config(force_full_brightness: bool) -> SchedulerConfig {
        SchedulerConfig {
            gamut: GAMUT_C,
            force_full_brightness,
        }
    }

    fn channels(ids: &[u8], color: Rgb) -> ChannelAssignment {
        ids.iter().map(|id| (*id, color)).collect()
    }

    fn update(ids: &[u8], color: Rgb, start: f64, duration: f64, curve: AnimationCurve) -> AreaUpdate<f64> {
        AreaUpdate::new(AREA, channels(ids, color), Animation::new(start, duration, curve))
    }

    fn collect_tick(seq: &mut Scheduler<f64>, now: f64) -> Vec<Frame> {
        let mut frames = Vec::new();
        seq.tick(&now, |bytes| frames.push(Frame::parse(bytes, AREA.len()).unwrap()));
        frames
    }

    #[test]
    fn empty_tick_sends_nothing() {
        let mut seq = Scheduler::<f64>::new(config(false));
        let mut count = 0;
        assert_eq!(seq.tick(&0.0, |_| count += 1), 0);
        assert_eq!(count, 0);
    }

    #[test]
    fn ease_out_ramp() {
        let mut seq = Scheduler::new(config(true));
        seq.enqueue(update(
            &[0, 1, 2],
            Rgb::new(1.0, 0.0, 0.0),
            0.0,
            2.0,
            AnimationCurve::EaseOut,
        ));
        let mut levels = Vec::new();
        for t in [0.0, 1.0, 2.0] {
            let frames = collect_tick(&mut seq, t);
            assert_eq!(frames.len(), 1);
            let frame = &frames[0];
            assert_eq!(frame.color_mode, ColorMode::XyBrightness);
            assert_eq!(frame.channels.len(), 3);
            let level = frame.channels[0].values[2];
            for record in &frame.channels {
                assert_eq!(record.values[2], level);
            }
            let expected = 1.0 - (1.0 - t / 2.0f64).powi(5);
            assert!((level - expected).abs() <= 1.0 / 65535.0);
            levels.push(level);
            // Still active through the final tick
            if t < 2.0 {
                assert_eq!(seq.len(), 1);
            }
        }
        assert!(levels[0] < levels[1] && levels[1] < levels[2]);
        assert!(seq.is_empty());
        assert!(collect_tick(&mut seq, 3.0).is_empty());
    }

    #[test]
    fn removed_after_settled_frame() {
        let mut seq = Scheduler::new(config(true));
        seq.enqueue(update(&[4], Rgb::new(0.0, 0.0, 1.0), 0.0, 1.0, AnimationCurve::Linear));
        let frames = collect_tick(&mut seq, 5.0);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].channels[0].values[2], 1.0);
        assert!(seq.is_empty());
    }

    #[test]
    fn own_luminance_as_brightness() {
        let mut seq = Scheduler::new(config(false));
        let green = Rgb::new(0.0, 1.0, 0.0);
        seq.enqueue(update(&[1], green, 0.0, 0.0, AnimationCurve::Linear));
        let frames = collect_tick(&mut seq, 0.0);
        let expected = DeviceColor::from_rgb(&green, &GAMUT_C, None);
        let values = frames[0].channels[0].values;
        assert!((values[0] - expected.x).abs() <= 1.0 / 65535.0);
        assert!((values[1] - expected.y).abs() <= 1.0 / 65535.0);
        assert!((values[2] - 0.743075).abs() <= 1.0 / 65535.0);
    }

    #[test]
    fn black_stays_dark() {
        let mut seq = Scheduler::new(config(true));
        seq.enqueue(update(&[0, 1], Rgb::BLACK, 0.0, 0.0, AnimationCurve::Linear));
        let frames = collect_tick(&mut seq, 0.0);
        for record in &frames[0].channels {
            assert_eq!(record.values, [0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn overlapping_updates_in_order() {
        let mut seq = Scheduler::new(config(true));
        seq.enqueue(update(&[0], Rgb::new(1.0, 0.0, 0.0), 0.0, 1.0, AnimationCurve::Linear));
        seq.enqueue(update(&[0], Rgb::new(0.0, 0.0, 1.0), 0.0, 4.0, AnimationCurve::Linear));
        let frames = collect_tick(&mut seq, 1.0);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].channels[0].values[2], 1.0);
        assert!((frames[1].channels[0].values[2] - 0.25).abs() <= 1.0 / 65535.0);
        // The first one is done, the second keeps running
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.active()[0].animation.duration, 4.0);
    }

    #[test]
    fn flush_sends_end_state() {
        let mut seq = Scheduler::new(config(true));
        seq.enqueue(update(&[2], Rgb::new(1.0, 1.0, 1.0), 0.0, 10.0, AnimationCurve::EaseIn));
        let mut frames = Vec::new();
        assert_eq!(seq.flush(|b| frames.push(Frame::parse(b, AREA.len()).unwrap())), 1);
        assert_eq!(frames[0].channels[0].values[2], 1.0);
        assert!(seq.is_empty());
    }
}

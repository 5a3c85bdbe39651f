pub mod animation;
pub mod curve;
pub mod scheduler;
pub mod timestamp;

pub use animation::Animation;
pub use curve::AnimationCurve;
pub use scheduler::{AreaUpdate, ChannelAssignment, Scheduler, SchedulerConfig};
pub use timestamp::Timestamp;

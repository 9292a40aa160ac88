#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod progress;
pub mod time;

pub use error::Error;
pub use progress::{
    Breakdown, ChapterStats, MicrotopicStats, ProgressStats, StatsNode, SubjectStats, aggregate,
};
pub use time::Clock;

pub mod archive;
pub mod backup;
pub mod content;
pub mod devotional;
pub mod journal;
pub mod progress;
pub mod stats;
pub mod status;

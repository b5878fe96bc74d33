pub mod keep_awake;
pub mod layout;

pub use keep_awake::{KeepAwake, WakeCommand};
pub use layout::FontSizes;

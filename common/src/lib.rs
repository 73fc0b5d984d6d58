mod float_ext;
mod log_setup;

pub use float_ext::FloatExt;
pub use log_setup::setup_logging;

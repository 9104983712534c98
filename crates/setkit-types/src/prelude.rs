pub use crate::error::{Error, SkResult};

pub use tracing::{debug, debug_span, error, info, info_span, warn};

// vim: ts=4

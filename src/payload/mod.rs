pub mod loader;

pub use loader::{expect_kind, load_event, PayloadError};

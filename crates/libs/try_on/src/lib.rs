#![deny(clippy::unwrap_used)]
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

mod error;
mod orchestrator;
mod placeholder;
mod region;
mod replicate;
mod synthesis;
mod validation;
mod vision;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::TryOnError;
pub use orchestrator::*;
pub use placeholder::compose_placeholder;
pub use region::*;
pub use replicate::ReplicateSynthesizer;
pub use synthesis::*;
pub use validation::*;
pub use vision::*;

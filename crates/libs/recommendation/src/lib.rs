#![deny(clippy::unwrap_used)]
#![allow(
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]

mod eligibility;
mod matcher;
mod scorer;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use eligibility::*;
pub use matcher::*;
pub use scorer::*;

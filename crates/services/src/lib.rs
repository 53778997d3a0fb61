//! meritboard/crates/services/src/lib.rs
//!
//! Application services over the domain ports: the verification lifecycle
//! engine, read views, vocabulary management, account tools, and export.

pub mod accounts;
pub mod export;
mod gate;
pub mod lifecycle;
pub mod validate;
pub mod views;
pub mod vocabulary;

pub use accounts::Accounts;
pub use export::Export;
pub use lifecycle::{Lifecycle, Submission, Upload};
pub use views::Views;
pub use vocabulary::Vocabulary;

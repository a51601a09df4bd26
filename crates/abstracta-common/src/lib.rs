//! abstracta-common: Shared settings, errors, records and the on-disk
//! table store used by every pipeline stage.

pub mod error;
pub mod models;
pub mod settings;
pub mod store;

pub use error::{AbstractaError, Result};
pub use models::{Publication, ScholarName};
pub use settings::{OnExisting, QuantileScope, Settings};
pub use store::{should_write, DataStore};

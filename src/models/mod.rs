pub mod enums;
pub mod plant;
pub mod record;

pub use enums::*;
pub use plant::*;
pub use record::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid value '{value}' for {field}")]
    InvalidEnum { field: String, value: String },
}

pub mod geo;
pub mod serde;

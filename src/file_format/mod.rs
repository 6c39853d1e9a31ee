pub mod compressed_index;
pub mod location;
pub mod unit_index;

extern crate flate2;
#[macro_use]
extern crate log;
extern crate rusqlite;
extern crate serde;
extern crate serde_json;

pub mod errors;
pub mod file_format;
pub mod frontend;
pub mod store;
pub mod unit_pipeline;
pub mod unit_visitor;

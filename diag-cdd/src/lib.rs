pub mod catalog;
pub mod cdd_model;
pub mod parser;
pub mod reader;
pub mod ref_resolver;

pub use catalog::{load_data_types, DataType, DataTypeCatalog};
pub use parser::{parse_cdd, parse_cdd_with, CddParseError, ParsedCdd};
pub use reader::{read_cdd_file, CddReadError};

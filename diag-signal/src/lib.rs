pub mod codec;
pub mod database;
pub mod diagnostics;
pub mod layout;
pub mod types;
pub mod validate;

pub use codec::{CodecError, SignalBase, SignalBaseBuilder};
pub use database::{Data, Did, InternalDatabase, Signal};
pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink};
pub use layout::cdd_offset_to_dbc_start_bit;
pub use types::*;
pub use validate::{validate_database, ValidationError};

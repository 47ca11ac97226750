pub mod compiler;
pub mod evaluator;
pub mod formatter;
pub mod normalizer;
pub mod options;
pub mod parser;
pub mod rules;

pub use crate::domain::model::{
    AttributeError, ClockReading, ErrorKind, Errors, MessageKey, Operand, RawValue,
    RestrictionKind, TemporalType, TemporalValue,
};
pub use crate::domain::ports::{Clock, RawValueAccess, Record, TimezoneAwareness, Translator};
pub use crate::utils::error::Result;

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::{
    clock::FixedClock, clock::SystemClock, i18n::MessageCatalog, json_record::JsonRecord,
};
pub use crate::config::{toml_config::RulesConfig, Settings};
pub use crate::core::{
    compiler::{compile, ValidationSpec},
    evaluator::{TimelinessValidator, ValidationOutcome, ValidationReport},
    options::{OptionValue, ValidatorOptions},
    rules::RuleSet,
};
pub use crate::core::{
    Clock, Operand, RawValue, Record, RestrictionKind, TemporalType, TemporalValue, Translator,
};
pub use crate::utils::error::{Result, TimelinessError};

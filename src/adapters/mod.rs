// Adapters layer: concrete implementations of the domain ports.

pub mod clock;
pub mod i18n;
pub mod json_record;

//! Input-side building blocks of the lookup pipeline: settling raw
//! keystrokes, turning settled text into a lookup key, and formatting
//! catalog names for display.

mod debounce;
mod format;
mod validate;

pub use debounce::{Debouncer, Settled};
pub use format::{capitalize_first, format_record_number};
pub use validate::{validate, validate_in, KeyRange, MAX_KEY, MIN_KEY};

//! Output formatting for CLI.

mod json;
mod text;

pub use json::{AuthStatusOutput, JsonFormatter, TemperatureOutput, columns_output};
pub use text::TextFormatter;

mod discovery;
mod parser;
mod reader;

pub use discovery::{LogFile, find_latest};
pub use parser::{HTTP_METHODS, LogRecord, ParseFailure, parse_line};
pub use reader::LogReader;

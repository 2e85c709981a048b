mod buffered_stdout;
mod prompt;

pub use buffered_stdout::BufferedStdout;
pub use prompt::{read_line, read_secret};

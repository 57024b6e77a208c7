use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message} at offset {pos}")]
pub struct ParseError {
    pub pos: u32,
    pub message: String,
}

impl ParseError {
    pub fn new(pos: u32, message: impl Into<String>) -> Self {
        ParseError {
            pos,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("failed to parse {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: ParseError,
    },
    #[error("duplicate file name {0}")]
    DuplicateFile(String),
}

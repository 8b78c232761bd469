use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("failed to load configuration")]
    Config,
    #[display("failed to set up storage")]
    Storage,
    #[display("failed to generate metadata")]
    Generation,
    #[display("failed to bind to {_0}")]
    Bind(#[error(not(source))] String),
    #[display("server stopped unexpectedly")]
    Serve,
    /// Unknown stream, invalid path or missing file. Answered with a 404.
    #[display("not found")]
    NotFound,
}

/// The kind of error that occurred during an exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The exchange could not be opened: the request failed, the remote
    /// answered with a non-success status, or there is no body to read.
    Open,
    /// Pulling the next chunk from an open body failed.
    Read,
    /// The body is not valid UTF-8.
    Decode,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Open => write!(f, "Open failure"),
            ErrorKind::Read => write!(f, "Read failure"),
            ErrorKind::Decode => write!(f, "Decode failure"),
        }
    }
}

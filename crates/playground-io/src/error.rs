use futures_util::task::SpawnError;

/// Everything that can go wrong while binding a widget to a component.
///
/// An unknown descriptor type is not an error: it renders as a text widget.
#[derive(Debug)]
pub enum Error {
    /// The host element's text content is not a descriptor.
    MalformedDescriptor(serde_json::Error),
    /// A descriptor could not be written out as JSON.
    Encode(serde_json::Error),
    /// The host element has no attribute with this name.
    MissingAttribute(&'static str),
    /// The `index` attribute is not a non-negative integer.
    InvalidIndex(String),
    /// The application registry has no slot at this index.
    UnknownApplication(usize),
    /// The application at this index has no root component.
    NoRootComponent(usize),
    /// A call into the host page (DOM or JS) threw.
    Host(String),
    /// The executor refused to run a commit.
    Spawn(SpawnError),
    /// The runtime configuration was rejected.
    InvalidConfig(String),
}

impl Error {
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host(message.into())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MalformedDescriptor(error) => write!(f, "malformed descriptor: {error}"),
            Error::Encode(error) => write!(f, "cannot encode descriptor: {error}"),
            Error::MissingAttribute(name) => write!(f, "host element has no `{name}` attribute"),
            Error::InvalidIndex(index) => write!(f, "invalid application index `{index}`"),
            Error::UnknownApplication(index) => {
                write!(f, "no application registered at index {index}")
            }
            Error::NoRootComponent(index) => write!(f, "application {index} has no root component"),
            Error::Host(message) => write!(f, "host error: {message}"),
            Error::Spawn(error) => write!(f, "cannot spawn commit: {error}"),
            Error::InvalidConfig(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MalformedDescriptor(error) | Error::Encode(error) => Some(error),
            Error::Spawn(error) => Some(error),
            _ => None,
        }
    }
}

impl From<SpawnError> for Error {
    fn from(error: SpawnError) -> Self {
        Self::Spawn(error)
    }
}

/// Failure loading level or replay data from a file or string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    Parse(String),
    /// A replay record is scheduled earlier than the one before it.
    OutOfOrder {
        index: usize,
        frame: u32,
        previous: u32,
    },
    Io(String),
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(m) => write!(f, "parse error: {m}"),
            Self::OutOfOrder {
                index,
                frame,
                previous,
            } => write!(
                f,
                "record {index} is scheduled for frame {frame}, before frame {previous}"
            ),
            Self::Io(m) => write!(f, "i/o error: {m}"),
        }
    }
}

impl std::error::Error for DataError {}

impl From<toml::de::Error> for DataError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<toml::ser::Error> for DataError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<std::io::Error> for DataError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

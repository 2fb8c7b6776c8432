use std::fmt;

/// Logical errors raised while building engine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A maze needs room for a border plus at least one interior corridor.
    MazeTooSmall { width: u32, height: u32 },
    /// Either side exceeds `MAX_MAZE_SIDE`.
    MazeTooLarge { width: u32, height: u32 },
    /// Option sets need the correct answer plus at least one distractor.
    InvalidOptionCount { count: usize },
    /// A configuration value is out of range.
    InvalidConfig(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MazeTooSmall { width, height } => {
                write!(f, "maze too small: {width}x{height} (minimum 5x5)")
            },
            Self::MazeTooLarge { width, height } => {
                write!(f, "maze too large: {width}x{height} (maximum 512 per side)")
            },
            Self::InvalidOptionCount { count } => {
                write!(f, "invalid option count: {count} (need at least 2)")
            },
            Self::InvalidConfig(m) => write!(f, "invalid config: {m}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Errors from reading a TOML config file.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: String,
        source: std::io::Error,
    },
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {path}: {source}"),
            Self::Parse { path, source } => write!(f, "failed to parse {path}: {source}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

use std::fmt;

/// A failure while expanding `%%...%%` directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// An opening `%%` without a closing one.
    Unterminated { unit: String },
    /// `%%  %%` with nothing inside.
    EmptyDirective { unit: String },
    /// `%%include%%` without a name.
    MissingIncludeName { unit: String },
    /// A placeholder with no registered value.
    UnknownGlobal { key: String, unit: String },
    /// An include with no registered source.
    UnknownInclude { name: String, unit: String },
    /// An include chain that leads back to itself.
    CircularInclude { chain: Vec<String> },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unterminated { unit } => {
                write!(f, "unterminated directive (missing closing %%) in `{unit}`")
            }
            Self::EmptyDirective { unit } => write!(f, "empty directive in `{unit}`"),
            Self::MissingIncludeName { unit } => {
                write!(f, "expected a source name after `include` in `{unit}`")
            }
            Self::UnknownGlobal { key, unit } => write!(f, "unknown global `{key}` in `{unit}`"),
            Self::UnknownInclude { name, unit } => {
                write!(f, "unknown include `{name}` in `{unit}`")
            }
            Self::CircularInclude { chain } => {
                write!(f, "circular include: {}", chain.join(" -> "))
            }
        }
    }
}

impl std::error::Error for ShaderError {}

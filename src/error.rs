use thiserror::Error;

/// Every way a compile can fail. All of these abort the whole compile
/// call; no partial assembly is ever emitted.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unbound variable `{0}`")]
    UnboundVariable(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("non-flat input: {0}")]
    NonFlatInput(String),

    #[error("internal node misuse: {0}")]
    InternalNodeMisuse(String),

    #[error("unsupported operand: {0}")]
    UnsupportedOperand(String),

    #[error("coloring produced {got} colors for {want} graph nodes")]
    ColoringInvariant { got: usize, want: usize },

    #[error("malformed input to read: {0:?}")]
    MalformedInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        CompileError::TypeMismatch(msg.into())
    }
}

use std::fmt;
use thiserror::Error;

/// Adapter capability that was being invoked when a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterOp {
    Init,
    Update,
    Resize,
    Destroy,
}

impl AdapterOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AdapterOp::Init => "init",
            AdapterOp::Update => "update",
            AdapterOp::Resize => "resize",
            AdapterOp::Destroy => "destroy",
        }
    }
}

impl fmt::Display for AdapterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("chart adapter {op} failed: {source}")]
    Adapter {
        op: AdapterOp,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid chart config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Lua error: {0}")]
    Lua(#[from] mlua::Error),
}

impl ChartError {
    pub(crate) fn adapter(op: AdapterOp, source: anyhow::Error) -> Self {
        ChartError::Adapter { op, source }
    }

    /// The adapter operation that failed, if this is an adapter failure
    pub fn adapter_op(&self) -> Option<AdapterOp> {
        match self {
            ChartError::Adapter { op, .. } => Some(*op),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;

/// Errors raised by the mind map core.
///
/// `ParentNotFound`, `NodeNotFound` and `DuplicateName` are recovered by the
/// controller (logged, no state change). `NotImplemented` marks a layout or
/// renderer variant that is missing a required operation and is always
/// propagated to the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MindMapError {
    #[error("parent node \"{0}\" not found")]
    ParentNotFound(String),
    #[error("node \"{0}\" not found")]
    NodeNotFound(String),
    #[error("a node named \"{0}\" already exists")]
    DuplicateName(String),
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
    #[error("unknown event \"{0}\"")]
    UnknownEvent(String),
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },
    #[error("invalid zoom extent [{min_scale}, {max_scale}] with wheel step {wheel_step}")]
    InvalidZoom {
        min_scale: f32,
        max_scale: f32,
        wheel_step: f32,
    },
}

impl MindMapError {
    /// True for the errors the controller absorbs after logging.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ParentNotFound(_) | Self::NodeNotFound(_) | Self::DuplicateName(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MindMapError>;

use eyecolor_core::EyeColorError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no image loaded")]
    NoImage,
    #[error("no face points to edit")]
    NoFace,
    #[error("point index {index} out of range ({len} points)")]
    PointIndex { index: usize, len: usize },
    #[error("no palette measurement in flight")]
    NothingPending,
    #[error(transparent)]
    Core(#[from] EyeColorError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

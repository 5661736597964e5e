use thiserror::Error;

/// Errors raised while exporting a [`crate::Transform`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    #[error("invalid transform: component `{component}` is {value}")]
    NonFinite { component: &'static str, value: f64 },
}

/// Errors raised while parsing a color string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("could not parse color: {0}")]
    Unrecognized(String),
}

/// Errors that can occur while fetching or decoding a bitmap
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("unsupported image source: {0}")]
    Unsupported(String),

    #[error("image unavailable: {0}")]
    Unavailable(String),
}

/// Errors produced by shape editing and painting
#[derive(Debug, Error)]
pub enum ShapeError {
    /// The requested resize would flip the sign of a scale axis. The input
    /// layer should clamp pointer movement; the shape is left untouched.
    #[error("transform limit reached")]
    TransformLimitReached,

    #[error("no modifier for nib `{0}`")]
    UnknownNib(String),

    /// Nib edits need the bounding box of a previous paint.
    #[error("shape has not been painted yet")]
    NotPainted,

    #[error("image failed to load: {0}")]
    Image(#[from] ImageLoadError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Errors produced while reading or writing a scene record
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("invalid scene data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not a canvas record: {0}")]
    NotACanvas(String),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

pub type ShapeResult<T> = Result<T, ShapeError>;

pub type SceneResult<T> = Result<T, SceneError>;

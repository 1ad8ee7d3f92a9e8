use std::path::PathBuf;

/// Failures while bringing a capture into the session.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{} is neither a decodable image nor a numeric array", path.display())]
    Unrecognized { path: PathBuf },
}

/// Operations refused to keep cross-image state consistent.
#[derive(thiserror::Error, Debug)]
pub enum StateError {
    #[error("image is {got_w}x{got_h} but the session frame size is {want_w}x{want_h}")]
    SizeMismatch {
        want_w: u32,
        want_h: u32,
        got_w: u32,
        got_h: u32,
    },

    #[error("no image named {} in the store", path.display())]
    UnknownImage { path: PathBuf },

    #[error("the current image is not the designated reference")]
    NotReference,

    #[error("segmentation produced no usable unit masks")]
    Unavailable,
}

//! Infrastructure adapters: image codecs, the vision API, and artifact storage.

pub mod image;
pub mod store;
pub mod vision;

pub use self::image::{DecodedImage, EMOTE_SIZE, MAX_DIMENSION};
pub use store::{ArtifactStore, FsStore};
pub use vision::{OpenAiVisionClient, VisionClient, VisionError, VisionRequest};

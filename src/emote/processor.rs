//! Per-image processing: renditions, the vision call, and persistence.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::core::{ItemError, ItemProcessor, ItemResult, WorkItem};
use crate::emote::{
    response_schema, EmoteDescription, RESPONSE_TOOL, RESPONSE_TOOL_DESCRIPTION,
};
use crate::infra::image::{self, EMOTE_SIZE};
use crate::infra::{ArtifactStore, VisionClient, VisionError, VisionRequest};
use crate::util::paths;

/// One encoded rendition of the input image.
#[derive(Debug, Clone)]
struct Rendition {
    key: &'static str,
    bytes: Vec<u8>,
}

impl Rendition {
    fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}.{}", self.key, image::extension_for(&self.bytes))
    }
}

/// Stored alongside the renditions as `{filename}.json`.
#[derive(Serialize)]
struct StoredRecord<'a> {
    #[serde(flatten)]
    description: &'a EmoteDescription,
    #[serde(serialize_with = "paths::serialize_lossy")]
    source: &'a Path,
    #[serde(serialize_with = "paths::serialize_lossy_seq")]
    destination: &'a [PathBuf],
}

/// Tags one emote image per item.
pub struct EmoteProcessor<V, St> {
    vision: Arc<V>,
    store: Arc<St>,
    prompt: String,
    name_prefix: String,
}

impl<V, St> EmoteProcessor<V, St>
where
    V: VisionClient,
    St: ArtifactStore,
{
    /// Create a processor.
    pub fn new(
        vision: V,
        store: St,
        prompt: impl Into<String>,
        name_prefix: impl Into<String>,
    ) -> Self {
        Self {
            vision: Arc::new(vision),
            store: Arc::new(store),
            prompt: prompt.into(),
            name_prefix: name_prefix.into(),
        }
    }

    async fn describe(&self, renditions: &[Rendition]) -> Result<EmoteDescription, ItemError> {
        let request = VisionRequest {
            prompt: self.prompt.clone(),
            image_urls: renditions.iter().map(|r| image::data_uri(&r.bytes)).collect(),
            tool_name: RESPONSE_TOOL.to_string(),
            tool_description: RESPONSE_TOOL_DESCRIPTION.to_string(),
            parameters: response_schema(),
        };
        let arguments = self.vision.call_tool(request).await?;
        let mut description: EmoteDescription = serde_json::from_str(&arguments)
            .map_err(|e| VisionError::Json(format!("{e}: {arguments}")))?;
        description.apply_prefix(&self.name_prefix);
        Ok(description)
    }

    async fn store(&self, name: String, bytes: Vec<u8>) -> Result<PathBuf, ItemError> {
        let store = Arc::clone(&self.store);
        run_blocking(move || store.put(&name, &bytes)).await
    }
}

#[async_trait]
impl<V, St> ItemProcessor for EmoteProcessor<V, St>
where
    V: VisionClient,
    St: ArtifactStore,
{
    type Payload = EmoteDescription;

    async fn process(&self, item: &WorkItem) -> ItemResult<EmoteDescription> {
        let mut result = ItemResult::for_item(item);

        let source = item.source.clone();
        let renditions = match run_blocking(move || render(&source)).await {
            Ok(renditions) => renditions,
            Err(e) => return result.with_error(e),
        };

        let description = match self.describe(&renditions).await {
            Ok(description) => description,
            Err(e) => return result.with_error(e),
        };
        debug!(index = item.index, name = %description.twitch_emote_name, "described");

        for rendition in renditions {
            let name = rendition.file_name(&description.filename);
            match self.store(name, rendition.bytes).await {
                Ok(path) => result.push_artifact(path),
                Err(e) => return result.with_payload(description).with_error(e),
            }
        }

        let record = StoredRecord {
            description: &description,
            source: &item.source,
            destination: &result.artifacts,
        };
        let stored = match serde_json::to_vec_pretty(&record) {
            Ok(bytes) => self.store(format!("{}.json", description.filename), bytes).await,
            Err(e) => Err(ItemError::Encode(e.to_string())),
        };
        match stored {
            Ok(path) => {
                result.push_artifact(path);
                result.with_payload(description)
            }
            Err(e) => result.with_payload(description).with_error(e),
        }
    }
}

fn render(path: &Path) -> Result<Vec<Rendition>, ItemError> {
    let decoded = image::load(path)?;
    let original = decoded.encode()?;
    let small = decoded.to_square(EMOTE_SIZE).encode()?;
    Ok(vec![
        Rendition {
            key: "original",
            bytes: original,
        },
        Rendition {
            key: "28x28",
            bytes: small,
        },
    ])
}

async fn run_blocking<F, T>(f: F) -> Result<T, ItemError>
where
    F: FnOnce() -> Result<T, ItemError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ItemError::Join(e.to_string()))?
}

use super::{MaskedLanguageModel, Prediction, ServiceError, SyntaxTagger, TaggedToken};

/// Model used when no fill-mask endpoint is configured. It never proposes anything.
#[derive(Debug, Clone)]
pub struct OfflineModel {
    mask_token: String,
}

impl Default for OfflineModel {
    fn default() -> Self {
        Self {
            mask_token: "<mask>".into(),
        }
    }
}

impl MaskedLanguageModel for OfflineModel {
    fn mask_token(&self) -> &str {
        &self.mask_token
    }

    fn is_available(&self) -> bool {
        false
    }

    fn fill_mask(&self, _masked: &str, _top_k: usize) -> Result<Vec<Prediction>, ServiceError> {
        Err(ServiceError::Unavailable(
            "no masked language model configured".into(),
        ))
    }
}

/// Tagger used when no tagging endpoint is configured. Every sentence is left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTagger;

impl SyntaxTagger for OfflineTagger {
    fn tag(&self, _sentence: &str) -> Result<Vec<TaggedToken>, ServiceError> {
        Err(ServiceError::Unavailable("no syntax tagger configured".into()))
    }
}

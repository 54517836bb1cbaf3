//! Encoder insertion point discovery
//!
//! Raw packets are written at the handler that follows a known marker in the
//! outbound chain, skipping everything that translates typed messages. The
//! handler name is looked up on first use and then reused: every connection
//! of a given host build has the same chain shape.

use std::sync::OnceLock;

use super::pipeline::Pipeline;
use crate::error::ProtocolError;

/// Name of the marker handler the host installs ahead of the encoder
pub const DEFAULT_ENCODER_MARKER: &str = "framedimage:encoder";

/// Resolve-once cache of the encoder handler name
#[derive(Debug)]
pub struct EncoderContext {
    marker: String,
    resolved: OnceLock<String>,
}

impl EncoderContext {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            resolved: OnceLock::new(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Cached handler name, if discovery has run
    pub fn resolved(&self) -> Option<&str> {
        self.resolved.get().map(String::as_str)
    }

    /// Handler to write raw packets at on this pipeline
    ///
    /// Uses the cached name when the pipeline has it. Otherwise scans this
    /// pipeline; the first successful scan fills the cache.
    pub fn resolve(&self, pipeline: &dyn Pipeline) -> Result<String, ProtocolError> {
        let names = pipeline.handler_names();

        if let Some(cached) = self.resolved.get() {
            if names.iter().any(|n| n == cached) {
                return Ok(cached.clone());
            }
            tracing::debug!(
                handler = %cached,
                "Cached encoder handler missing from pipeline, rescanning"
            );
        }

        let found = handler_after(&names, &self.marker).ok_or_else(|| {
            ProtocolError::EncoderHandlerNotFound {
                marker: self.marker.clone(),
            }
        })?;

        self.resolved.get_or_init(|| {
            tracing::info!(marker = %self.marker, handler = %found, "Resolved encoder handler");
            found.to_string()
        });

        Ok(found.to_string())
    }
}

impl Default for EncoderContext {
    fn default() -> Self {
        Self::new(DEFAULT_ENCODER_MARKER)
    }
}

/// Name of the handler directly after `marker`
pub fn handler_after<'a>(names: &'a [String], marker: &str) -> Option<&'a str> {
    let position = names.iter().position(|n| n == marker)?;
    names.get(position + 1).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::recording::RecordingPipeline;

    fn chain(names: &[&str]) -> RecordingPipeline {
        RecordingPipeline::new(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_handler_after_marker() {
        let names: Vec<String> = ["splitter", "framedimage:encoder", "encoder", "handler"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(handler_after(&names, "framedimage:encoder"), Some("encoder"));
        assert_eq!(handler_after(&names, "handler"), None);
        assert_eq!(handler_after(&names, "missing"), None);
    }

    #[test]
    fn test_resolve_caches() {
        let context = EncoderContext::default();
        assert!(context.resolved().is_none());

        let pipeline = chain(&["framedimage:encoder", "encoder"]);
        assert_eq!(context.resolve(&pipeline).unwrap(), "encoder");
        assert_eq!(context.resolved(), Some("encoder"));

        // a second pipeline with the same shape uses the cache
        let other = chain(&["decoder", "framedimage:encoder", "encoder"]);
        assert_eq!(context.resolve(&other).unwrap(), "encoder");
    }

    #[test]
    fn test_resolve_missing_marker() {
        let context = EncoderContext::default();
        let pipeline = chain(&["decoder", "encoder"]);

        let err = context.resolve(&pipeline).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::EncoderHandlerNotFound {
                marker: DEFAULT_ENCODER_MARKER.into()
            }
        );
        assert!(context.resolved().is_none());
    }

    #[test]
    fn test_marker_at_tail() {
        let context = EncoderContext::new("tail");
        let pipeline = chain(&["encoder", "tail"]);
        assert!(context.resolve(&pipeline).is_err());
    }

    #[test]
    fn test_rescan_when_cached_name_absent() {
        let context = EncoderContext::default();
        context
            .resolve(&chain(&["framedimage:encoder", "encoder"]))
            .unwrap();

        let renamed = chain(&["framedimage:encoder", "via-encoder"]);
        assert_eq!(context.resolve(&renamed).unwrap(), "via-encoder");
        assert_eq!(context.resolved(), Some("encoder"));
    }
}

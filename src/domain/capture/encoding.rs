//! Encoding negotiation

use super::artifact::VideoMimeType;

/// Ordered list of acceptable recording encodings.
/// Negotiation picks the first entry the device supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingPreference {
    candidates: Vec<VideoMimeType>,
}

impl EncodingPreference {
    pub fn new(candidates: Vec<VideoMimeType>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[VideoMimeType] {
        &self.candidates
    }

    /// First candidate accepted by `is_supported`, if any
    pub fn negotiate<F>(&self, is_supported: F) -> Option<VideoMimeType>
    where
        F: Fn(&VideoMimeType) -> bool,
    {
        self.candidates.iter().find(|m| is_supported(m)).cloned()
    }
}

impl Default for EncodingPreference {
    fn default() -> Self {
        Self::new(vec![
            VideoMimeType::WebmVp8,
            VideoMimeType::WebmVp9,
            VideoMimeType::Webm,
            VideoMimeType::Mp4,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prefers_vp8() {
        let pref = EncodingPreference::default();
        assert_eq!(pref.negotiate(|_| true), Some(VideoMimeType::WebmVp8));
    }

    #[test]
    fn falls_through_to_first_supported() {
        let pref = EncodingPreference::default();
        let chosen = pref.negotiate(|m| *m == VideoMimeType::Mp4);
        assert_eq!(chosen, Some(VideoMimeType::Mp4));
    }

    #[test]
    fn none_when_nothing_supported() {
        let pref = EncodingPreference::default();
        assert!(pref.negotiate(|_| false).is_none());
        assert!(EncodingPreference::new(vec![]).negotiate(|_| true).is_none());
    }
}

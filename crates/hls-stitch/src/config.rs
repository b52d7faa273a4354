/// Limits applied to one reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StitchConfig {
    /// Master-to-variant transitions allowed before giving up.
    pub max_playlist_hops: usize,
    /// Segment downloads in flight at once.
    pub segment_concurrency: usize,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            max_playlist_hops: 8,
            segment_concurrency: 4,
        }
    }
}

impl StitchConfig {
    pub fn with_max_playlist_hops(mut self, hops: usize) -> Self {
        self.max_playlist_hops = hops;
        self
    }

    pub fn with_segment_concurrency(mut self, concurrency: usize) -> Self {
        self.segment_concurrency = concurrency.max(1);
        self
    }
}

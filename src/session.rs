//! The logged-in viewer, if any.

/// Stand-in viewer id used to query the feed when nobody is logged in.
pub const SENTINEL_VIEWER_ID: &str = "404";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    viewer_id: Option<String>,
}

impl Session {
    /// Blank ids are treated as no session.
    pub fn new(viewer_id: Option<String>) -> Self {
        Self {
            viewer_id: viewer_id.filter(|id| !id.trim().is_empty()),
        }
    }

    pub fn logged_in(viewer_id: impl Into<String>) -> Self {
        Self::new(Some(viewer_id.into()))
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn viewer_id(&self) -> Option<&str> {
        self.viewer_id.as_deref()
    }

    pub fn viewer_or_sentinel(&self) -> &str {
        self.viewer_id().unwrap_or(SENTINEL_VIEWER_ID)
    }

    pub fn is_logged_in(&self) -> bool {
        self.viewer_id.is_some()
    }
}

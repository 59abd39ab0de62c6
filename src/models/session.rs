/// Lifecycle phase of one viewer session.
///
/// `Hidden -> Visible -> Closing -> Hidden`. `Closing` never returns to
/// `Visible`; only hiding the viewer ends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Hidden,
    Visible,
    Closing,
}

impl SessionPhase {
    pub fn is_shown(self) -> bool {
        matches!(self, SessionPhase::Visible | SessionPhase::Closing)
    }
}

/// Read-only snapshot of the per-session viewer state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerSession {
    pub phase: SessionPhase,
    pub current_index: usize,
    pub is_zoomed: bool,
    pub vertical_offset: f64,
    pub is_closing: bool,
}

use crate::timer::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueKind {
    IntervalStarted(Mode),
    IntervalFinished(Mode),
}

/// Audible/visual cue. Fire-and-forget: implementations must not block and
/// have no way to report failure.
pub trait Cue: Send {
    fn play(&self, cue: CueKind);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCue;

impl Cue for SilentCue {
    fn play(&self, _cue: CueKind) {}
}

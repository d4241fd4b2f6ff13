//! Event types and sinks for observing ecosystem runs.
//!
//! Events are emitted by [`crate::ecosystem::Ecosystem`] from the calling
//! thread, between colour classes, never from worker tasks.
use crate::ecosystem::{PinkNoiseSummary, PlacedPlant, PlacementSummary, Stage};
use crate::grid::PointPass;

/// Describes events emitted while running the pipeline.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum EcosystemEvent {
    /// A pipeline step finished and the ecosystem moved to `stage`.
    StageCompleted { stage: Stage },

    /// Work on one colour class of a pass is about to start.
    ColorStarted {
        pass: PointPass,
        color: usize,
        /// Number of cells (and parallel tasks) of this colour.
        cells: usize,
    },

    /// All tasks of one colour class have finished and were merged.
    ColorFinished {
        pass: PointPass,
        color: usize,
        /// Points sampled or plants placed by this colour.
        produced: usize,
    },

    /// Point sampling finished for both passes.
    PinkNoiseFinished { summary: PinkNoiseSummary },

    /// A plant was accepted.
    PlantPlaced { plant: PlacedPlant },

    /// Plant assignment finished for both passes.
    PlacementFinished { summary: PlacementSummary },

    /// Point sampling gave up; all sampled points were discarded.
    GenerationFailed { message: String },

    /// Non-fatal warning.
    Warning { context: String, message: String },
}

impl EcosystemEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EcosystemEvent::StageCompleted { .. } => EventKind::StageCompleted,
            EcosystemEvent::ColorStarted { .. } => EventKind::ColorStarted,
            EcosystemEvent::ColorFinished { .. } => EventKind::ColorFinished,
            EcosystemEvent::PinkNoiseFinished { .. } => EventKind::PinkNoiseFinished,
            EcosystemEvent::PlantPlaced { .. } => EventKind::PlantPlaced,
            EcosystemEvent::PlacementFinished { .. } => EventKind::PlacementFinished,
            EcosystemEvent::GenerationFailed { .. } => EventKind::GenerationFailed,
            EcosystemEvent::Warning { .. } => EventKind::Warning,
        }
    }
}

/// Discriminant of [`EcosystemEvent`], used to filter what a sink receives.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StageCompleted,
    ColorStarted,
    ColorFinished,
    PinkNoiseFinished,
    PlantPlaced,
    PlacementFinished,
    GenerationFailed,
    Warning,
}

/// A generic event sink that accepts [`EcosystemEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: EcosystemEvent);

    /// Whether events of `kind` should be built and sent at all.
    #[inline]
    fn wants(&self, _kind: EventKind) -> bool {
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: EcosystemEvent) {}

    #[inline]
    fn wants(&self, _kind: EventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(EcosystemEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(EcosystemEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(EcosystemEvent),
{
    #[inline]
    fn send(&mut self, event: EcosystemEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally only some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<EcosystemEvent>,
    only: Option<Vec<EventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect only events of the given kinds.
    pub fn filtered(kinds: impl IntoIterator<Item = EventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<EcosystemEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[EcosystemEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of collected events of `kind`.
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: EcosystemEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: EventKind) -> bool {
        self.only.as_ref().is_none_or(|k| k.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: EcosystemEvent) {
        let kind = event.kind();
        let mut targets: Vec<&mut S> = self.sinks.iter_mut().filter(|s| s.wants(kind)).collect();
        if let Some(last) = targets.pop() {
            for sink in targets {
                sink.send(event.clone());
            }
            last.send(event);
        }
    }

    fn wants(&self, kind: EventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(context: &str) -> EcosystemEvent {
        EcosystemEvent::Warning {
            context: context.into(),
            message: "msg".into(),
        }
    }

    #[test]
    fn unit_sink_wants_nothing() {
        assert!(!().wants(EventKind::Warning));
    }

    #[test]
    fn vec_sink_collects_events() {
        let mut sink = VecSink::new();
        assert!(sink.is_empty());
        sink.send(warning("a"));
        sink.send(EcosystemEvent::StageCompleted {
            stage: Stage::TerrainLoaded,
        });
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.count(EventKind::Warning), 1);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn filtered_vec_sink_drops_other_kinds() {
        let mut sink = VecSink::filtered([EventKind::StageCompleted]);
        assert!(!sink.wants(EventKind::PlantPlaced));
        sink.send(warning("a"));
        sink.send(EcosystemEvent::StageCompleted {
            stage: Stage::GridInitialized,
        });
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn multi_sink_fans_out_to_interested_sinks() {
        let mut multi = MultiSink::with_sinks(vec![
            VecSink::new(),
            VecSink::filtered([EventKind::ColorStarted]),
            VecSink::new(),
        ]);
        multi.send(warning("ctx"));
        assert_eq!(multi.len(), 3);
        assert_eq!(multi.sinks[0].len(), 1);
        assert_eq!(multi.sinks[1].len(), 0);
        assert_eq!(multi.sinks[2].len(), 1);
        assert!(multi.wants(EventKind::Warning));
        assert!(!MultiSink::<VecSink>::new().wants(EventKind::Warning));
    }

    #[test]
    fn fn_sink_invokes_callback() {
        let mut count = 0;
        let mut sink = FnSink::new(|_event| {
            count += 1;
        });
        sink.send(warning("ctx"));
        sink.send(warning("ctx"));
        drop(sink);
        assert_eq!(count, 2);
    }
}

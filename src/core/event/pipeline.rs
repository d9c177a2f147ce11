//=========================================================================
// Event Pipeline
//=========================================================================
//
// Ordered registries of translators and listeners, and the per-tick
// poll → translate → dispatch pass.
//
// Per tick:
//   1. kernel.pending_events(now); empty batch → done
//   2. every translator, in registration order, sees the full batch;
//      outputs are concatenated (translator order, then output order)
//   3. each output is rebuilt into a GameEvent
//   4. each event goes to listeners in registration order until one
//      reports it handled
//
// Registration order is the only ordering: no priorities, no per-kind
// subscriptions.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, trace};

//=== Internal Dependencies ===============================================

use super::{
    EventTranslator, GameEvent, GameEventListener, ListenerId, TranslatedEvent, TranslatorId,
};
use crate::core::error::EngineResult;
use crate::core::input::RawEvent;
use crate::core::kernel::Kernel;

//=== DispatchReport ======================================================

/// What one dispatch pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Raw events polled from the kernel.
    pub raw_events: usize,

    /// Game events produced by all translators.
    pub game_events: usize,

    /// Game events some listener reported as handled.
    pub handled: usize,
}

//=== EventPipeline =======================================================

/// Owns the registered translators and listeners.
///
/// Registration returns an id; unregistering with that id hands the
/// object back. Nothing is deduplicated: registering two equal
/// translators yields two entries, both invoked every tick.
pub struct EventPipeline {
    translators: Vec<(TranslatorId, Box<dyn EventTranslator>)>,
    listeners: Vec<(ListenerId, Box<dyn GameEventListener>)>,
    next_id: u64,
}

impl EventPipeline {
    pub fn new() -> Self {
        Self {
            translators: Vec::new(),
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    //--- Translator Registry ---------------------------------------------

    /// Appends a translator. It runs after every translator registered
    /// before it.
    pub fn register_translator<T>(&mut self, translator: T) -> TranslatorId
    where
        T: EventTranslator + 'static,
    {
        let id = TranslatorId(self.allocate_id());
        self.translators.push((id, Box::new(translator)));
        debug!("Registered translator {:?} ({} total)", id, self.translators.len());
        id
    }

    /// Removes a translator and returns it. Unknown ids are ignored.
    pub fn unregister_translator(&mut self, id: TranslatorId) -> Option<Box<dyn EventTranslator>> {
        let pos = self.translators.iter().position(|(entry, _)| *entry == id)?;
        debug!("Unregistered translator {:?}", id);
        Some(self.translators.remove(pos).1)
    }

    pub fn translator_count(&self) -> usize {
        self.translators.len()
    }

    //--- Listener Registry ------------------------------------------------

    /// Appends a listener. It sees an event only if no earlier listener
    /// handled it.
    pub fn register_listener<L>(&mut self, listener: L) -> ListenerId
    where
        L: GameEventListener + 'static,
    {
        let id = ListenerId(self.allocate_id());
        self.listeners.push((id, Box::new(listener)));
        debug!("Registered listener {:?} ({} total)", id, self.listeners.len());
        id
    }

    /// Removes a listener and returns it. Unknown ids are ignored.
    pub fn unregister_listener(&mut self, id: ListenerId) -> Option<Box<dyn GameEventListener>> {
        let pos = self.listeners.iter().position(|(entry, _)| *entry == id)?;
        debug!("Unregistered listener {:?}", id);
        Some(self.listeners.remove(pos).1)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    //--- Dispatch ---------------------------------------------------------

    /// Polls the kernel for `now` and dispatches the resulting events.
    pub fn dispatch_pending_events(
        &mut self,
        kernel: &mut dyn Kernel,
        now: u32,
    ) -> EngineResult<DispatchReport> {
        let events = kernel.pending_events(now);
        self.dispatch(&events)
    }

    /// Translates and dispatches a raw batch.
    ///
    /// Every payload is rebuilt before the first listener runs, so a
    /// malformed payload aborts the pass without partial delivery.
    pub fn dispatch(&mut self, events: &[RawEvent]) -> EngineResult<DispatchReport> {
        if events.is_empty() {
            return Ok(DispatchReport::default());
        }

        let game_events = self.translate(events)?;

        let mut report = DispatchReport {
            raw_events: events.len(),
            game_events: game_events.len(),
            handled: 0,
        };

        for event in &game_events {
            if self.deliver(event) {
                report.handled += 1;
            }
        }

        trace!(
            "Dispatched {} raw → {} game events ({} handled)",
            report.raw_events,
            report.game_events,
            report.handled
        );

        Ok(report)
    }

    /// Runs every translator over `events` and rebuilds their output.
    pub fn translate(&self, events: &[RawEvent]) -> EngineResult<Vec<GameEvent>> {
        let translated: Vec<TranslatedEvent> = self
            .translators
            .iter()
            .flat_map(|(_, translator)| translator.translate(events))
            .collect();

        translated
            .iter()
            .map(|t| GameEvent::deserialize(&t.payload, t.timestamp))
            .collect()
    }

    //--- deliver() --------------------------------------------------------
    //
    // First listener returning `true` stops delivery of this event.
    //
    fn deliver(&mut self, event: &GameEvent) -> bool {
        self.listeners
            .iter_mut()
            .any(|(_, listener)| listener.on_event(event))
    }
}

impl Default for EventPipeline {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EngineError;
    use crate::core::event::GameEventId;
    use crate::core::input::{KeyCode, RawEventKind};
    use crate::core::kernel::ChannelKernel;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    //--- Test Helpers -----------------------------------------------------

    type Log = Rc<RefCell<Vec<String>>>;

    /// Emits one event per raw event, tagged with the translator's id.
    fn tagging_translator(tag: u32) -> impl EventTranslator {
        move |events: &[RawEvent]| -> Vec<TranslatedEvent> {
            events
                .iter()
                .map(|e| TranslatedEvent::from(GameEvent::new(GameEventId(tag), e.timestamp)))
                .collect()
        }
    }

    /// Records "<name>:<id>@<ts>" and reports `handles` as the result.
    fn recording_listener(name: &'static str, log: &Log, handles: bool) -> impl GameEventListener {
        let log = Rc::clone(log);
        move |event: &GameEvent| {
            log.borrow_mut()
                .push(format!("{}:{}@{}", name, event.id().0, event.timestamp()));
            handles
        }
    }

    fn batch() -> Vec<RawEvent> {
        vec![
            RawEvent::key_down(1, KeyCode::KeyA),
            RawEvent::key_down(2, KeyCode::KeyB),
        ]
    }

    //=====================================================================
    // Translation Tests
    //=====================================================================

    #[test]
    fn output_is_concatenation_in_registration_order() {
        let mut pipeline = EventPipeline::new();
        pipeline.register_translator(tagging_translator(10));
        pipeline.register_translator(tagging_translator(20));

        let events = pipeline.translate(&batch()).unwrap();
        let ids: Vec<(u32, u32)> = events.iter().map(|e| (e.id().0, e.timestamp())).collect();

        assert_eq!(ids, vec![(10, 1), (10, 2), (20, 1), (20, 2)]);
    }

    #[test]
    fn every_translator_sees_the_full_batch() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut pipeline = EventPipeline::new();

        for _ in 0..3 {
            let seen = Rc::clone(&seen);
            pipeline.register_translator(move |events: &[RawEvent]| -> Vec<TranslatedEvent> {
                seen.borrow_mut().push(events.len());
                Vec::new()
            });
        }

        pipeline.dispatch(&batch()).unwrap();

        assert_eq!(*seen.borrow(), vec![2, 2, 2]);
    }

    #[test]
    fn duplicate_registration_runs_twice() {
        let mut pipeline = EventPipeline::new();
        pipeline.register_translator(tagging_translator(1));
        pipeline.register_translator(tagging_translator(1));

        let events = pipeline.translate(&[RawEvent::quit(0)]).unwrap();

        assert_eq!(events.len(), 2);
    }

    #[test]
    fn malformed_payload_aborts_before_delivery() {
        let log: Log = Rc::default();
        let mut pipeline = EventPipeline::new();
        pipeline.register_translator(tagging_translator(1));
        pipeline.register_translator(|_: &[RawEvent]| -> Vec<TranslatedEvent> {
            vec![TranslatedEvent {
                timestamp: 0,
                payload: "garbage".into(),
            }]
        });
        pipeline.register_listener(recording_listener("a", &log, false));

        let result = pipeline.dispatch(&batch());

        assert!(matches!(result, Err(EngineError::Dispatch(_))));
        assert!(log.borrow().is_empty());
    }

    //=====================================================================
    // Dispatch Tests
    //=====================================================================

    #[test]
    fn empty_batch_invokes_nobody() {
        let calls = Rc::new(Cell::new(0));
        let mut pipeline = EventPipeline::new();
        {
            let calls = Rc::clone(&calls);
            pipeline.register_translator(move |_: &[RawEvent]| -> Vec<TranslatedEvent> {
                calls.set(calls.get() + 1);
                vec![GameEvent::new(GameEventId::USER, 0).into()]
            });
        }
        let log: Log = Rc::default();
        pipeline.register_listener(recording_listener("a", &log, false));

        let report = pipeline.dispatch(&[]).unwrap();

        assert_eq!(report, DispatchReport::default());
        assert_eq!(calls.get(), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let log: Log = Rc::default();
        let mut pipeline = EventPipeline::new();
        pipeline.register_translator(tagging_translator(5));
        pipeline.register_listener(recording_listener("a", &log, false));
        pipeline.register_listener(recording_listener("b", &log, false));

        let report = pipeline.dispatch(&[RawEvent::quit(9)]).unwrap();

        assert_eq!(*log.borrow(), vec!["a:5@9", "b:5@9"]);
        assert_eq!(report.handled, 0);
    }

    #[test]
    fn handled_event_stops_at_first_handler_only() {
        let log: Log = Rc::default();
        let mut pipeline = EventPipeline::new();
        pipeline.register_translator(tagging_translator(5));
        pipeline.register_listener(recording_listener("a", &log, false));
        pipeline.register_listener(recording_listener("b", &log, true));
        pipeline.register_listener(recording_listener("c", &log, false));

        let report = pipeline.dispatch(&batch()).unwrap();

        // Both events reach a and b; c never sees either.
        assert_eq!(*log.borrow(), vec!["a:5@1", "b:5@1", "a:5@2", "b:5@2"]);
        assert_eq!(report.game_events, 2);
        assert_eq!(report.handled, 2);
    }

    #[test]
    fn handling_one_event_does_not_affect_the_next() {
        let log: Log = Rc::default();
        let mut pipeline = EventPipeline::new();
        pipeline.register_translator(tagging_translator(1));
        pipeline.register_translator(tagging_translator(2));
        {
            let log = Rc::clone(&log);
            pipeline.register_listener(move |event: &GameEvent| {
                log.borrow_mut().push(format!("first:{}", event.id().0));
                event.id() == GameEventId(1)
            });
        }
        pipeline.register_listener(recording_listener("second", &log, false));

        pipeline.dispatch(&[RawEvent::quit(0)]).unwrap();

        assert_eq!(*log.borrow(), vec!["first:1", "first:2", "second:2@0"]);
    }

    //=====================================================================
    // Registry Tests
    //=====================================================================

    #[test]
    fn unregistered_listener_no_longer_receives() {
        let log: Log = Rc::default();
        let mut pipeline = EventPipeline::new();
        pipeline.register_translator(tagging_translator(1));
        let a = pipeline.register_listener(recording_listener("a", &log, false));
        pipeline.register_listener(recording_listener("b", &log, false));

        assert!(pipeline.unregister_listener(a).is_some());
        pipeline.dispatch(&[RawEvent::quit(0)]).unwrap();

        assert_eq!(*log.borrow(), vec!["b:1@0"]);
    }

    #[test]
    fn unregistering_unknown_ids_is_a_noop() {
        let mut pipeline = EventPipeline::new();
        let t = pipeline.register_translator(tagging_translator(1));
        let l = pipeline.register_listener(|_: &GameEvent| false);

        assert!(pipeline.unregister_translator(t).is_some());
        assert!(pipeline.unregister_translator(t).is_none());
        assert!(pipeline.unregister_listener(l).is_some());
        assert!(pipeline.unregister_listener(l).is_none());
        assert_eq!(pipeline.translator_count(), 0);
        assert_eq!(pipeline.listener_count(), 0);
    }

    #[test]
    fn unregister_returns_ownership() {
        let mut pipeline = EventPipeline::new();
        let id = pipeline.register_translator(tagging_translator(7));

        let translator = pipeline.unregister_translator(id).unwrap();
        let out = translator.translate(&[RawEvent::quit(1)]);

        assert_eq!(out.len(), 1);
    }

    //=====================================================================
    // Kernel Polling Tests
    //=====================================================================

    #[test]
    fn dispatch_pending_events_polls_the_kernel() {
        let (mut kernel, feed) = ChannelKernel::new(8);
        feed.send(RawEvent::new(3, RawEventKind::MouseMotion { x: 1.0, y: 1.0 }));
        feed.send(RawEvent::quit(40));

        let log: Log = Rc::default();
        let mut pipeline = EventPipeline::new();
        pipeline.register_translator(tagging_translator(2));
        pipeline.register_listener(recording_listener("a", &log, false));

        let report = pipeline.dispatch_pending_events(&mut kernel, 10).unwrap();
        assert_eq!(report.raw_events, 1);
        assert_eq!(*log.borrow(), vec!["a:2@3"]);

        let report = pipeline.dispatch_pending_events(&mut kernel, 40).unwrap();
        assert_eq!(report.raw_events, 1);
        assert_eq!(*log.borrow(), vec!["a:2@3", "a:2@40"]);
    }
}

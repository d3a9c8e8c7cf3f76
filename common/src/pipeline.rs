//! Button event pipeline: raw edge notifications in, debounced
//! `Pressed`/`Released`/`LongPress` callbacks out.
//!
//! Producer side: [`EdgeSender::raw_edge`] enqueues a line id into a bounded
//! queue and returns immediately; a full queue drops the edge. Consumer
//! side: one worker thread drains the queue, waits out the settle delay,
//! samples the line through the injected sampler and feeds the result to
//! [`ButtonEngine`]. The pipeline is an owned instance, so several of them
//! can run side by side (the tests do).
//!
//! The embedded backend wires the same engine to a FreeRTOS queue instead;
//! this runtime is what hosts and tests use.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, SyncSender},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crate::button::{ButtonConfig, ButtonEngine, ButtonEvent, Level, LineId};

/// Pending raw edges the queue can hold before new ones are dropped.
pub const EDGE_QUEUE_CAPACITY: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to allocate the edge queue")]
    QueueAllocationFailed,
    #[error("failed to start the debounce worker: {0}")]
    WorkerStartFailed(#[from] std::io::Error),
}

type Callback = Box<dyn Fn(LineId, ButtonEvent) + Send>;

/// Producer handle, safe to invoke from the edge-notification context.
#[derive(Clone)]
pub struct EdgeSender {
    tx: SyncSender<LineId>,
}

impl EdgeSender {
    /// Enqueue a raw edge without blocking. Returns `false` when the edge
    /// was dropped (queue full or pipeline shut down); dropping is defined
    /// behavior, not an error.
    pub fn raw_edge(&self, line: LineId) -> bool {
        self.tx.try_send(line).is_ok()
    }
}

pub struct ButtonPipeline {
    lines: [LineId; 2],
    tx: SyncSender<LineId>,
    stop: Arc<AtomicBool>,
    callback: Arc<Mutex<Option<Callback>>>,
    worker: Option<JoinHandle<()>>,
}

impl ButtonPipeline {
    /// Build the line table, allocate the edge queue and start the worker.
    ///
    /// `sampler` is the hardware read primitive: handed a line id, it
    /// returns the line's current electrical level. It is called only from
    /// the worker, after each settle delay.
    pub fn initialize<S>(
        line_ids: [LineId; 2],
        config: ButtonConfig,
        mut sampler: S,
    ) -> Result<Self, PipelineError>
    where
        S: FnMut(LineId) -> Level + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel::<LineId>(EDGE_QUEUE_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let callback: Arc<Mutex<Option<Callback>>> = Arc::new(Mutex::new(None));

        let mut engine = ButtonEngine::new(config, &line_ids);
        let settle_delay = Duration::from_millis(config.debounce_ms);
        let epoch = Instant::now();

        let worker_stop = stop.clone();
        let worker_callback = callback.clone();
        let worker = thread::Builder::new()
            .name("button-debounce".to_string())
            .spawn(move || {
                while let Ok(line) = rx.recv() {
                    if worker_stop.load(Ordering::Acquire) {
                        break;
                    }

                    // Settle delay; further edges keep queueing meanwhile.
                    thread::sleep(settle_delay);

                    let level = sampler(line);
                    let now_ms = epoch.elapsed().as_millis() as u64;

                    for event in engine.settle(line, level, now_ms) {
                        if let Some(handler) = worker_callback.lock().unwrap().as_ref() {
                            handler(line, event);
                        }
                    }
                }
            })?;

        Ok(Self {
            lines: line_ids,
            tx,
            stop,
            callback,
            worker: Some(worker),
        })
    }

    /// Install the consumer invoked once per emitted event, on the worker,
    /// in emission order. Re-registration replaces the previous handler.
    pub fn register_callback<F>(&self, handler: F)
    where
        F: Fn(LineId, ButtonEvent) + Send + 'static,
    {
        *self.callback.lock().unwrap() = Some(Box::new(handler));
    }

    /// The two monitored line ids, in registration order.
    pub fn lines(&self) -> [LineId; 2] {
        self.lines
    }

    pub fn edge_sender(&self) -> EdgeSender {
        EdgeSender {
            tx: self.tx.clone(),
        }
    }

    /// Stop the worker and wait for it to exit. Edges still queued are
    /// discarded.
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::Release);
        // Wake the worker if it is parked on an empty queue; a full queue
        // means it is already busy and will see the flag on the next edge.
        let _ = self.tx.try_send(self.lines[0]);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    type Events = Arc<Mutex<Vec<(LineId, ButtonEvent)>>>;
    type Levels = Arc<Mutex<HashMap<LineId, Level>>>;

    const LINE0: LineId = LineId(1);
    const LINE1: LineId = LineId(2);

    fn fast_config() -> ButtonConfig {
        ButtonConfig {
            debounce_ms: 10,
            long_press_ms: 80,
            ..ButtonConfig::default()
        }
    }

    fn level_map() -> Levels {
        let mut levels = HashMap::new();
        levels.insert(LINE0, Level::Low);
        levels.insert(LINE1, Level::Low);
        Arc::new(Mutex::new(levels))
    }

    fn sampler_for(levels: &Levels) -> impl FnMut(LineId) -> Level + Send + 'static {
        let levels = levels.clone();
        move |line| levels.lock().unwrap()[&line]
    }

    fn recording_pipeline(config: ButtonConfig) -> (ButtonPipeline, Levels, Events) {
        let levels = level_map();
        let pipeline =
            ButtonPipeline::initialize([LINE0, LINE1], config, sampler_for(&levels)).unwrap();

        let events: Events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        pipeline.register_callback(move |line, event| {
            sink.lock().unwrap().push((line, event));
        });

        (pipeline, levels, events)
    }

    fn wait_for_events(events: &Events, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while events.lock().unwrap().len() < count {
            assert!(
                Instant::now() < deadline,
                "timed out waiting for {count} events, got {:?}",
                events.lock().unwrap()
            );
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn set_level(levels: &Levels, line: LineId, level: Level) {
        levels.lock().unwrap().insert(line, level);
    }

    #[test]
    fn press_and_release_reach_the_callback() {
        let (pipeline, levels, events) = recording_pipeline(fast_config());
        let sender = pipeline.edge_sender();

        set_level(&levels, LINE0, Level::High);
        assert!(sender.raw_edge(LINE0));
        wait_for_events(&events, 1);

        set_level(&levels, LINE0, Level::Low);
        assert!(sender.raw_edge(LINE0));
        wait_for_events(&events, 2);

        assert_eq!(
            *events.lock().unwrap(),
            vec![(LINE0, ButtonEvent::Pressed), (LINE0, ButtonEvent::Released)]
        );
        pipeline.shutdown();
    }

    #[test]
    fn bounce_burst_settles_to_a_single_press() {
        let (pipeline, levels, events) = recording_pipeline(fast_config());
        let sender = pipeline.edge_sender();

        // A bouncy press: several edges in quick succession, all settling on
        // the active level.
        set_level(&levels, LINE0, Level::High);
        for _ in 0..4 {
            sender.raw_edge(LINE0);
        }
        wait_for_events(&events, 1);

        set_level(&levels, LINE0, Level::Low);
        sender.raw_edge(LINE0);
        wait_for_events(&events, 2);

        assert_eq!(
            *events.lock().unwrap(),
            vec![(LINE0, ButtonEvent::Pressed), (LINE0, ButtonEvent::Released)]
        );
        pipeline.shutdown();
    }

    #[test]
    fn long_press_fires_on_edge_activity_while_held() {
        let (pipeline, levels, events) = recording_pipeline(fast_config());
        let sender = pipeline.edge_sender();

        set_level(&levels, LINE0, Level::High);
        sender.raw_edge(LINE0);
        wait_for_events(&events, 1);

        // Hold past the threshold, then let contact chatter deliver another
        // edge; only that edge triggers the long-press check.
        thread::sleep(Duration::from_millis(120));
        sender.raw_edge(LINE0);
        wait_for_events(&events, 2);

        set_level(&levels, LINE0, Level::Low);
        sender.raw_edge(LINE0);
        wait_for_events(&events, 3);

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                (LINE0, ButtonEvent::Pressed),
                (LINE0, ButtonEvent::LongPress),
                (LINE0, ButtonEvent::Released),
            ]
        );
        pipeline.shutdown();
    }

    #[test]
    fn quiet_hold_emits_no_long_press() {
        let (pipeline, levels, events) = recording_pipeline(fast_config());
        let sender = pipeline.edge_sender();

        set_level(&levels, LINE0, Level::High);
        sender.raw_edge(LINE0);
        wait_for_events(&events, 1);

        // Held chatter-free well past the threshold: nothing may fire until
        // the release edge, and the release itself is not a long press.
        thread::sleep(Duration::from_millis(150));
        assert_eq!(events.lock().unwrap().len(), 1);

        set_level(&levels, LINE0, Level::Low);
        sender.raw_edge(LINE0);
        wait_for_events(&events, 2);

        assert_eq!(
            *events.lock().unwrap(),
            vec![(LINE0, ButtonEvent::Pressed), (LINE0, ButtonEvent::Released)]
        );
        pipeline.shutdown();
    }

    #[test]
    fn queue_full_drops_excess_edges() {
        // The settle delay keeps the worker busy while the queue fills.
        let config = ButtonConfig {
            debounce_ms: 30,
            long_press_ms: 80,
            ..ButtonConfig::default()
        };
        let (pipeline, levels, events) = recording_pipeline(config);
        let sender = pipeline.edge_sender();

        set_level(&levels, LINE0, Level::High);
        let accepted = (0..12).filter(|_| sender.raw_edge(LINE0)).count();

        // Capacity is 10; the worker can have dequeued at most one edge by
        // now, so at least one of the twelve must have been dropped.
        assert!(accepted < 12, "expected at least one dropped edge");
        assert!(accepted >= EDGE_QUEUE_CAPACITY);

        // Every accepted edge samples the same settled level, so the burst
        // still collapses to exactly one press.
        wait_for_events(&events, 1);
        thread::sleep(Duration::from_millis(600));
        assert_eq!(*events.lock().unwrap(), vec![(LINE0, ButtonEvent::Pressed)]);
        pipeline.shutdown();
    }

    #[test]
    fn re_registration_replaces_the_handler() {
        let (pipeline, levels, first_events) = recording_pipeline(fast_config());
        let sender = pipeline.edge_sender();

        set_level(&levels, LINE0, Level::High);
        sender.raw_edge(LINE0);
        wait_for_events(&first_events, 1);

        let second_events: Events = Arc::new(Mutex::new(Vec::new()));
        let sink = second_events.clone();
        pipeline.register_callback(move |line, event| {
            sink.lock().unwrap().push((line, event));
        });

        set_level(&levels, LINE0, Level::Low);
        sender.raw_edge(LINE0);
        wait_for_events(&second_events, 1);

        assert_eq!(
            *first_events.lock().unwrap(),
            vec![(LINE0, ButtonEvent::Pressed)]
        );
        assert_eq!(
            *second_events.lock().unwrap(),
            vec![(LINE0, ButtonEvent::Released)]
        );
        pipeline.shutdown();
    }

    #[test]
    fn events_without_a_callback_are_discarded() {
        let levels = level_map();
        let pipeline =
            ButtonPipeline::initialize([LINE0, LINE1], fast_config(), sampler_for(&levels))
                .unwrap();
        let sender = pipeline.edge_sender();

        set_level(&levels, LINE0, Level::High);
        sender.raw_edge(LINE0);
        thread::sleep(Duration::from_millis(50));

        // Late registration only sees events from later edges.
        let events: Events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        pipeline.register_callback(move |line, event| {
            sink.lock().unwrap().push((line, event));
        });

        set_level(&levels, LINE0, Level::Low);
        sender.raw_edge(LINE0);
        wait_for_events(&events, 1);

        assert_eq!(
            *events.lock().unwrap(),
            vec![(LINE0, ButtonEvent::Released)]
        );
        pipeline.shutdown();
    }

    #[test]
    fn pipelines_are_independent() {
        let (first, first_levels, first_events) = recording_pipeline(fast_config());
        let (second, second_levels, second_events) = recording_pipeline(fast_config());

        set_level(&first_levels, LINE0, Level::High);
        first.edge_sender().raw_edge(LINE0);
        set_level(&second_levels, LINE1, Level::High);
        second.edge_sender().raw_edge(LINE1);

        wait_for_events(&first_events, 1);
        wait_for_events(&second_events, 1);

        assert_eq!(
            *first_events.lock().unwrap(),
            vec![(LINE0, ButtonEvent::Pressed)]
        );
        assert_eq!(
            *second_events.lock().unwrap(),
            vec![(LINE1, ButtonEvent::Pressed)]
        );

        first.shutdown();
        second.shutdown();
    }

    #[test]
    fn lines_accessor_reports_registration_order() {
        let levels = level_map();
        let pipeline =
            ButtonPipeline::initialize([LINE1, LINE0], fast_config(), sampler_for(&levels))
                .unwrap();
        assert_eq!(pipeline.lines(), [LINE1, LINE0]);
        pipeline.shutdown();
    }

    #[test]
    fn shutdown_joins_and_drops_later_edges() {
        let (pipeline, _levels, events) = recording_pipeline(fast_config());
        let sender = pipeline.edge_sender();

        pipeline.shutdown();

        // The channel is gone; producers observe silent drops.
        assert!(!sender.raw_edge(LINE0));
        assert!(events.lock().unwrap().is_empty());
    }
}

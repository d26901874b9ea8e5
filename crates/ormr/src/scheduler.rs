//! # FrameScheduler: the adaptive frame-skip cycle driver
//!
//! One cycle is: pop at most one queued callback, run the process phase,
//! decide whether a draw fits the time budget, maybe draw, and report how
//! long to wait before the next cycle. The budget is the target frame
//! interval times a frame-skip multiplier:
//!
//! - On time (budget exceeds the time since the last draw): draw, reset the
//!   multiplier to 1, and wait out the rest of the budget.
//! - Behind: skip the draw, grow the multiplier, and retry after a minimal
//!   delay. The growing multiplier widens the budget until a draw fits
//!   again, so a slow machine drops frames instead of freezing.
//!
//! Scheduling is cooperative and single threaded: [`run`](FrameScheduler::run)
//! only sleeps between cycles, so a cycle always completes before the next
//! one starts and nothing ever queues up concurrently. There is no stop
//! operation; the loop ends when the host tears the process down.
//!
//! The scheduler knows nothing about entities. It drives whatever implements
//! [`CycleHooks`], which the engine provides via
//! [`EngineFrame`](crate::engine::EngineFrame).

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Delay used when a cycle is already over budget and should retry at once.
const MIN_DELAY: Duration = Duration::from_millis(1);

// ── Clocks ───────────────────────────────────────────────────────────────

/// Source of monotonic time, injectable so tests and headless hosts can run
/// on a synthetic timeline.
pub trait Clock {
    fn now(&mut self) -> Instant;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> Instant {
        Instant::now()
    }
}

/// A clock advanced by hand. Clones share the same timeline, so a test can
/// keep a handle while the scheduler owns the original.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> Instant {
        self.base + self.offset.get()
    }
}

// ── Cycle contract ───────────────────────────────────────────────────────

/// The process/draw callback pair a scheduler drives.
pub trait CycleHooks {
    /// The process phase. Runs every cycle.
    fn process(&mut self);

    /// The draw phase. Runs only when the cycle's time budget allows it.
    fn draw(&mut self);
}

/// What one cycle did and when the next one should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    pub drew: bool,
    /// The multiplier after this cycle: 1 right after a draw, higher while
    /// draws are being skipped.
    pub frame_skip: u32,
    /// How long to wait before the next cycle.
    pub delay: Duration,
}

// ── Scheduler ────────────────────────────────────────────────────────────

type QueuedCallback<C> = Box<dyn FnOnce(&mut FrameScheduler<C>)>;

/// Drives the fixed-timestep loop. See the module docs for the policy.
pub struct FrameScheduler<C: Clock = SystemClock> {
    clock: C,
    queue: VecDeque<QueuedCallback<C>>,
    interval: Duration,
    frame_skip: u32,
    /// The moment the last draw was committed to, not when it finished, so
    /// a slow draw shows up in the next cycle's elapsed time.
    last_draw: Instant,
    started: bool,
}

impl FrameScheduler<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for FrameScheduler<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + 'static> FrameScheduler<C> {
    pub fn with_clock(mut clock: C) -> Self {
        let now = clock.now();
        Self {
            clock,
            queue: VecDeque::new(),
            interval: Duration::ZERO,
            frame_skip: 1,
            last_draw: now,
            started: false,
        }
    }

    /// Arm the scheduler with a target frame rate. Must be called before
    /// [`cycle`](Self::cycle) or [`run`](Self::run).
    ///
    /// # Panics
    ///
    /// Panics if `fps` is zero.
    pub fn start(&mut self, fps: u32) {
        assert!(fps > 0, "target fps must be nonzero");
        self.interval = Duration::from_secs_f64(1.0 / f64::from(fps));
        self.frame_skip = 1;
        self.last_draw = self.clock.now();
        self.started = true;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn frame_skip(&self) -> u32 {
        self.frame_skip
    }

    /// Queue a one-shot callback. Each cycle pops and runs at most one, in
    /// FIFO order, before the process phase.
    pub fn enqueue(&mut self, callback: impl FnOnce(&mut Self) + 'static) {
        self.queue.push_back(Box::new(callback));
    }

    /// Polling wait: check `condition` once per cycle (by re-enqueueing
    /// itself) until it holds, then run `action`. This is how hosts wait for
    /// asynchronous work, e.g. resource decoding, without blocking the loop.
    pub fn enqueue_when(
        &mut self,
        condition: impl FnMut() -> bool + 'static,
        action: impl FnOnce(&mut Self) + 'static,
    ) {
        self.enqueue(poll_task(condition, action));
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Run one full cycle and report the delay until the next.
    ///
    /// # Panics
    ///
    /// Panics if the scheduler was never started.
    pub fn cycle(&mut self, hooks: &mut dyn CycleHooks) -> CycleOutcome {
        assert!(self.started, "FrameScheduler::cycle called before start");

        if let Some(callback) = self.queue.pop_front() {
            callback(self);
        }

        hooks.process();

        let now = self.clock.now();
        let elapsed = now - self.last_draw;
        let budget = self.interval * self.frame_skip;

        if budget > elapsed {
            self.last_draw = now;
            self.frame_skip = 1;
            hooks.draw();
            CycleOutcome {
                drew: true,
                frame_skip: self.frame_skip,
                delay: budget - elapsed,
            }
        } else {
            self.frame_skip += 1;
            CycleOutcome {
                drew: false,
                frame_skip: self.frame_skip,
                delay: MIN_DELAY,
            }
        }
    }

    /// Cycle forever against the real clock, sleeping between cycles.
    pub fn run(&mut self, hooks: &mut dyn CycleHooks) -> ! {
        loop {
            let outcome = self.cycle(hooks);
            std::thread::sleep(outcome.delay);
        }
    }
}

fn poll_task<C: Clock + 'static>(
    mut condition: impl FnMut() -> bool + 'static,
    action: impl FnOnce(&mut FrameScheduler<C>) + 'static,
) -> QueuedCallback<C> {
    Box::new(move |scheduler| {
        if condition() {
            action(scheduler);
        } else {
            scheduler.enqueue(poll_task(condition, action));
        }
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Hooks that advance a shared manual clock to fake slow phases.
    struct TimedHooks {
        clock: ManualClock,
        process_cost: Duration,
        draw_cost: Duration,
        processed: u32,
        drawn: u32,
    }

    impl CycleHooks for TimedHooks {
        fn process(&mut self) {
            self.clock.advance(self.process_cost);
            self.processed += 1;
        }

        fn draw(&mut self) {
            self.clock.advance(self.draw_cost);
            self.drawn += 1;
        }
    }

    fn fixture(process_ms: u64, draw_ms: u64) -> (FrameScheduler<ManualClock>, TimedHooks) {
        let clock = ManualClock::new();
        let hooks = TimedHooks {
            clock: clock.clone(),
            process_cost: Duration::from_millis(process_ms),
            draw_cost: Duration::from_millis(draw_ms),
            processed: 0,
            drawn: 0,
        };
        (FrameScheduler::with_clock(clock), hooks)
    }

    #[test]
    #[should_panic(expected = "before start")]
    fn cycling_before_start_panics() {
        let (mut scheduler, mut hooks) = fixture(0, 0);
        scheduler.cycle(&mut hooks);
    }

    #[test]
    #[should_panic(expected = "nonzero")]
    fn zero_fps_panics() {
        let (mut scheduler, _) = fixture(0, 0);
        scheduler.start(0);
    }

    #[test]
    fn fast_cycles_draw_and_pace() {
        // 100 fps target, 2 ms of process work, instant draws.
        let (mut scheduler, mut hooks) = fixture(2, 0);
        scheduler.start(100);

        let outcome = scheduler.cycle(&mut hooks);
        assert!(outcome.drew);
        assert_eq!(outcome.frame_skip, 1);
        assert_eq!(outcome.delay, Duration::from_millis(8));
        assert_eq!((hooks.processed, hooks.drawn), (1, 1));
    }

    #[test]
    fn slow_draws_grow_the_skip_until_a_draw_fits() {
        // 100 fps target (10 ms budget), draws cost 30 ms.
        let (mut scheduler, mut hooks) = fixture(2, 30);
        scheduler.start(100);

        let outcomes: Vec<CycleOutcome> = (0..5).map(|_| scheduler.cycle(&mut hooks)).collect();

        let drew: Vec<bool> = outcomes.iter().map(|o| o.drew).collect();
        assert_eq!(drew, vec![true, false, false, false, true]);

        // Monotonic growth while skipping, reset to 1 once the draw fits.
        let skips: Vec<u32> = outcomes.iter().map(|o| o.frame_skip).collect();
        assert_eq!(skips, vec![1, 2, 3, 4, 1]);

        // Skipped cycles retry almost immediately.
        assert_eq!(outcomes[1].delay, Duration::from_millis(1));
        assert_eq!(outcomes[2].delay, Duration::from_millis(1));

        // The recovering draw waits out what is left of the widened budget.
        assert_eq!(outcomes[4].delay, Duration::from_millis(2));
        assert_eq!(hooks.drawn, 2);
        assert_eq!(hooks.processed, 5);
    }

    #[test]
    fn every_cycle_processes_even_when_skipping_draws() {
        let (mut scheduler, mut hooks) = fixture(20, 0);
        scheduler.start(100);
        for _ in 0..4 {
            scheduler.cycle(&mut hooks);
        }
        assert_eq!(hooks.processed, 4);
    }

    #[test]
    fn queue_pops_one_callback_per_cycle() {
        let (mut scheduler, mut hooks) = fixture(0, 0);
        scheduler.start(30);

        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let order = Rc::clone(&order);
            scheduler.enqueue(move |_| order.borrow_mut().push(tag));
        }

        scheduler.cycle(&mut hooks);
        assert_eq!(order.borrow().as_slice(), &["first"]);
        assert_eq!(scheduler.queued(), 1);

        scheduler.cycle(&mut hooks);
        assert_eq!(order.borrow().as_slice(), &["first", "second"]);
        assert_eq!(scheduler.queued(), 0);
    }

    #[test]
    fn callbacks_can_reconfigure_the_scheduler() {
        let (mut scheduler, mut hooks) = fixture(0, 0);
        scheduler.start(30);
        scheduler.enqueue(|scheduler| scheduler.start(60));
        scheduler.cycle(&mut hooks);
        assert_eq!(scheduler.interval(), Duration::from_secs_f64(1.0 / 60.0));
    }

    #[test]
    fn enqueue_when_polls_until_the_condition_holds() {
        let (mut scheduler, mut hooks) = fixture(0, 0);
        scheduler.start(30);

        let countdown = Rc::new(Cell::new(3u32));
        let fired = Rc::new(Cell::new(false));
        {
            let countdown = Rc::clone(&countdown);
            let fired = Rc::clone(&fired);
            scheduler.enqueue_when(
                move || {
                    if countdown.get() == 0 {
                        true
                    } else {
                        countdown.set(countdown.get() - 1);
                        false
                    }
                },
                move |_| fired.set(true),
            );
        }

        for _ in 0..3 {
            scheduler.cycle(&mut hooks);
            assert!(!fired.get());
        }
        scheduler.cycle(&mut hooks);
        assert!(fired.get());
        assert_eq!(scheduler.queued(), 0);
    }
}

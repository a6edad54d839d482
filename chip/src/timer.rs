use {
    crate::definitions::timer,
    std::{
        ops::ControlFlow,
        sync::{
            mpsc::{self, RecvTimeoutError, SyncSender},
            Arc,
        },
        thread::{self, JoinHandle},
        time::{Duration, Instant},
    },
};

#[cfg_attr(test, mockall::automock)]
/// Gets called every time the sound timer runs out.
pub trait TimerCallback {
    fn handle(&mut self);
}

/// Used when nobody listens for the beep.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCallback;

impl TimerCallback for NoCallback {
    fn handle(&mut self) {}
}

/// The delay and the sound timer of the chip.
///
/// Both count down at 60 hertz until they reach 0. The timers are driven by the
/// instruction cycle, every cycle adds its duration to a pending budget and every
/// full timer interval in that budget is a single decrement. This keeps the
/// timers at 60 hertz independent of the configured cpu speed.
pub struct Timers<S: TimerCallback> {
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    delay: u8,
    /// Sound timer: This timer is used for sound effects. When its value is nonzero, a beeping
    /// sound is made.
    sound: u8,
    /// The duration of a single instruction cycle
    per_cycle: Duration,
    /// The elapsed time that has not yet been turned into a tick
    pending: Duration,
    /// Called when the sound timer runs out
    callback: S,
}

impl<S: TimerCallback> Timers<S> {
    /// Will create the timers for a cpu running a cycle every `per_cycle`.
    pub fn new(per_cycle: Duration, callback: S) -> Self {
        Self {
            delay: 0,
            sound: 0,
            per_cycle,
            pending: Duration::ZERO,
            callback,
        }
    }

    /// Timers that tick exactly once per cycle.
    pub fn lockstep(callback: S) -> Self {
        Self::new(timer::INTERVAL, callback)
    }

    pub fn delay(&self) -> u8 {
        self.delay
    }

    pub fn set_delay(&mut self, value: u8) {
        self.delay = value;
    }

    pub fn sound(&self) -> u8 {
        self.sound
    }

    pub fn set_sound(&mut self, value: u8) {
        self.sound = value;
    }

    /// Accounts for a finished instruction cycle.
    pub fn cycle(&mut self) {
        self.pending += self.per_cycle;
        while self.pending >= timer::INTERVAL {
            self.pending -= timer::INTERVAL;
            self.tick();
        }
    }

    /// A single 60 hertz decrement.
    pub fn tick(&mut self) {
        if self.delay > 0 {
            self.delay -= 1;
        }
        if self.sound > 0 {
            self.sound -= 1;
            if self.sound == 0 {
                log::info!("beep");
                self.callback.handle();
            }
        }
        log::trace!("timers delay {} sound {}", self.delay, self.sound);
    }
}

pub trait TimedWorker {
    fn new() -> Self;
    /// Will run the callback every interval until the callback breaks or the
    /// worker is stopped.
    fn start<T>(&mut self, callback: T, interval: Duration)
    where
        T: Send + FnMut() -> ControlFlow<()> + 'static;
    fn stop(&mut self);
    fn is_alive(&self) -> bool;
}

/// Is the internal worker, that exists on the
/// second thread.
pub struct Worker {
    /// Contains the actuall thread, that is running.
    thread: Option<JoinHandle<()>>,
    /// Contains the sync sender used to gracefull shutdown the thread.
    shutdown: Option<SyncSender<()>>,
    /// Counts the threads still holding on to it, as long as the thread
    /// runs the count is bigger then one.
    alive: Arc<()>,
}

impl TimedWorker for Worker {
    /// Will initialize the new worker.
    fn new() -> Self {
        Self {
            thread: None,
            shutdown: None,
            alive: Arc::new(()),
        }
    }

    /// Will start the worker that will run the callback function
    /// every interval.
    /// Attention the worker assumes the callback will finish
    /// calculation faster then the interval.
    fn start<T>(&mut self, mut callback: T, interval: Duration)
    where
        T: Send + FnMut() -> ControlFlow<()> + 'static,
    {
        let (send, recv) = mpsc::sync_channel::<()>(1);
        let alive = self.alive.clone();
        let thread = thread::spawn(move || {
            // this is to count the references, as it will not actually
            // be used ```_``` is used in front of the name.
            let _alive = alive;
            let mut timeout = interval;
            loop {
                match recv.recv_timeout(timeout) {
                    Err(RecvTimeoutError::Timeout) => {
                        let start = Instant::now();

                        if callback().is_break() {
                            break;
                        }

                        // make sure there the system will at most wait the interval
                        timeout = interval.saturating_sub(start.elapsed());
                    }
                    Ok(_) | Err(_) => break, // shutdown
                }
            }
        });

        self.thread = Some(thread);
        self.shutdown = Some(send);
    }

    /// Will stop the worker.
    fn stop(&mut self) {
        // The thread might already be gone if the callback asked for it,
        // in that case the send fails and there is nothing to do.
        if let Some(sender) = self.shutdown.take() {
            let _ = sender.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("The worker thread panicked.");
            }
        }
    }

    /// Checks if the thread is alive.
    fn is_alive(&self) -> bool {
        Arc::strong_count(&self.alive) > 1
    }
}

impl Drop for Worker {
    /// Will drop the worker
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_lockstep_countdown() {
        let mut timers = Timers::lockstep(NoCallback);
        timers.set_delay(2);
        timers.cycle();
        assert_eq!(1, timers.delay());
        timers.cycle();
        assert_eq!(0, timers.delay());
        timers.cycle();
        assert_eq!(0, timers.delay());
    }

    #[test]
    /// the fastest configurable cpu still moves the timers
    fn test_gigahertz_countdown() {
        let interval = crate::Config {
            cpu_hertz: 2_000_000_000,
        }
        .cycle_interval();
        let mut timers = Timers::new(interval, NoCallback);
        timers.set_delay(1);

        for _ in 0..timer::INTERVAL.as_nanos() {
            timers.cycle();
        }
        assert_eq!(0, timers.delay());
    }

    #[test]
    fn test_accumulated_countdown() {
        // 500 hertz cpu, a tick every 8 and a third cycles
        let mut timers = Timers::new(Duration::from_millis(2), NoCallback);
        timers.set_delay(10);
        for _ in 0..8 {
            timers.cycle();
        }
        assert_eq!(10, timers.delay());
        timers.cycle();
        assert_eq!(9, timers.delay());
        // one second of cycles is 60 ticks
        timers.set_delay(255);
        for _ in 0..500 {
            timers.cycle();
        }
        assert!((194..=196).contains(&timers.delay()));
    }

    #[test]
    fn test_slow_cpu_ticks_multiple_times() {
        let mut timers = Timers::new(Duration::from_millis(100), NoCallback);
        timers.set_delay(10);
        timers.cycle();
        assert_eq!(4, timers.delay());
    }

    #[test]
    fn test_beep_once() {
        let mut callback = MockTimerCallback::new();
        callback.expect_handle().times(1).return_const(());

        let mut timers = Timers::lockstep(callback);
        timers.set_sound(2);
        for _ in 0..5 {
            timers.cycle();
        }
        assert_eq!(0, timers.sound());
    }

    #[test]
    fn test_worker() {
        let counter = Arc::new(AtomicUsize::new(0));
        let ccounter = counter.clone();

        let mut worker = Worker::new();
        worker.start(
            move || {
                if ccounter.fetch_add(1, Ordering::SeqCst) + 1 >= 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
            Duration::from_millis(1),
        );

        std::thread::sleep(Duration::from_millis(200));
        assert!(!worker.is_alive());
        assert_eq!(3, counter.load(Ordering::SeqCst));

        // stopping a finished worker is fine
        worker.stop();
    }

    #[test]
    fn test_worker_stop() {
        let mut worker = Worker::new();
        worker.start(|| ControlFlow::Continue(()), Duration::from_millis(1));
        assert!(worker.is_alive());
        worker.stop();
        assert!(!worker.is_alive());
    }
}

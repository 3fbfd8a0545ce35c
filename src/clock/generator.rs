use crate::event_loop::EngineMessage;
use crossbeam::channel::Sender;
use log::{info, trace};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Sends [`EngineMessage::Tick`] at a fixed interval from its own thread.
pub struct TickGenerator {
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl Default for TickGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TickGenerator {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    pub fn start(&mut self, interval: Duration, tick_tx: Sender<EngineMessage>) {
        if self.thread_handle.is_some() {
            return; // Already running
        }

        let running = Arc::clone(&self.running);
        self.running.store(true, Ordering::SeqCst);
        info!("Tick generator started, interval {:?}", interval);

        self.thread_handle = Some(thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                let tick_start = Instant::now();

                if tick_tx.send(EngineMessage::Tick).is_err() {
                    trace!("Tick receiver gone, generator exiting");
                    break;
                }

                // Sleep off the rest of the interval to keep a steady rate
                let elapsed = tick_start.elapsed();
                if elapsed < interval {
                    thread::sleep(interval - elapsed);
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
            info!("Tick generator stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for TickGenerator {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::unbounded;

    #[test]
    fn test_generator_sends_ticks_until_stopped() {
        let (tx, rx) = unbounded();
        let mut generator = TickGenerator::new();
        generator.start(Duration::from_millis(1), tx);
        assert!(generator.is_running());

        let first = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(first, EngineMessage::Tick);

        generator.stop();
        assert!(!generator.is_running());
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(10));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_generator_exits_when_receiver_dropped() {
        let (tx, rx) = unbounded();
        let mut generator = TickGenerator::new();
        generator.start(Duration::from_millis(1), tx);
        drop(rx);
        // Join must not hang once sends start failing
        generator.stop();
    }
}

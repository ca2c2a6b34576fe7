use crate::run::ring::FramePublisher;
use log::{debug, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// A blocking producer of decoded frames: a camera socket, a referee
/// socket, or a scripted source in tests. Returning `None` ends the
/// receiver thread.
pub trait FrameSource<T>: Send {
    fn next_frame(&mut self) -> Option<T>;
}

impl<T, F> FrameSource<T> for F
where
    F: FnMut() -> Option<T> + Send,
{
    fn next_frame(&mut self) -> Option<T> {
        self()
    }
}

/// Handle to one receiver thread.
pub struct ReceiverHandle {
    name: String,
    handle: JoinHandle<()>,
}

impl ReceiverHandle {
    /// Wait for the thread to observe the stop flag, detaching it with a
    /// warning if it is still stuck in a blocking read after the timeout.
    pub fn join_with_timeout(self, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        while !self.handle.is_finished() {
            if Instant::now() >= deadline {
                warn!("receiver '{}' did not stop within {:?}, detaching", self.name, timeout);
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        let _ = self.handle.join();
    }
}

/// Spawn one receiver thread that pumps frames from a blocking source into
/// a capacity-1 ring until the shared running flag clears.
pub fn spawn_receiver<T, S>(
    name: &str,
    mut source: S,
    publisher: FramePublisher<T>,
    running: Arc<AtomicBool>,
) -> ReceiverHandle
where
    T: Send + 'static,
    S: FrameSource<T> + 'static,
{
    let thread_name = name.to_string();
    let handle = std::thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            while running.load(Ordering::Relaxed) {
                match source.next_frame() {
                    Some(frame) => publisher.offer(frame),
                    None => break,
                }
            }
            debug!("receiver thread exiting");
        })
        .expect("failed to spawn receiver thread");

    ReceiverHandle {
        name: name.to_string(),
        handle,
    }
}

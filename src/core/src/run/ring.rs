use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded};

/// Capacity-1 hand-off between a receiver thread and the strategy runner.
/// Newest wins: offering into a full ring drops the stale entry. Exactly
/// one producer and one consumer per ring.
pub fn frame_ring<T>() -> (FramePublisher<T>, FrameConsumer<T>) {
    let (tx, rx) = bounded(1);
    (
        FramePublisher {
            tx,
            drain: rx.clone(),
        },
        FrameConsumer { rx },
    )
}

pub struct FramePublisher<T> {
    tx: Sender<T>,
    // Producer-side handle used only to evict the stale entry.
    drain: Receiver<T>,
}

impl<T> FramePublisher<T> {
    /// Publish a frame, evicting the unconsumed one if the consumer is
    /// behind.
    pub fn offer(&self, value: T) {
        if let Err(err) = self.tx.try_send(value) {
            let _ = self.drain.try_recv();
            let _ = self.tx.try_send(err.into_inner());
        }
    }
}

pub struct FrameConsumer<T> {
    rx: Receiver<T>,
}

impl<T> FrameConsumer<T> {
    /// Take the pending frame, if any. Never blocks.
    pub fn poll(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(value) => Some(value),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_frame_round_trip() {
        let (publisher, consumer) = frame_ring();
        publisher.offer(1);
        assert_eq!(consumer.poll(), Some(1));
        assert_eq!(consumer.poll(), None);
    }

    #[test]
    fn test_newest_wins_on_full_ring() {
        let (publisher, consumer) = frame_ring();
        publisher.offer(1);
        publisher.offer(2);
        publisher.offer(3);
        assert_eq!(consumer.poll(), Some(3));
        assert_eq!(consumer.poll(), None);
    }

    #[test]
    fn test_cross_thread_hand_off() {
        let (publisher, consumer) = frame_ring();
        let producer = std::thread::spawn(move || {
            for i in 0..100 {
                publisher.offer(i);
            }
        });
        producer.join().unwrap();
        // Whatever survives is the most recent publication.
        assert_eq!(consumer.poll(), Some(99));
    }
}

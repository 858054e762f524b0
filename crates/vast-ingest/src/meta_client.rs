//! The meta store actor: a dedicated thread owning a [`vast_meta::MetaStore`]
//! and a mailbox. `MetaClient` is the sending half every importer holds;
//! a replenish is the "suspension point" of §5: the importer blocks on
//! the reply channel until the meta actor answers.

use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, Sender};
use vast_meta::MetaStore;

use crate::error::IngestError;

enum MetaMessage {
    Add {
        key: String,
        n: u64,
        reply: Sender<Result<u64, vast_meta::MetaError>>,
    },
    Shutdown,
}

/// Handle for the `MetaStore` actor thread.
pub struct MetaActor {
    tx: Sender<MetaMessage>,
    handle: Option<JoinHandle<()>>,
}

impl MetaActor {
    pub fn spawn(store: MetaStore) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded::<MetaMessage>();
        let handle = std::thread::spawn(move || run(store, rx));
        Self { tx, handle: Some(handle) }
    }

    pub fn client(&self) -> MetaClient {
        MetaClient { tx: self.tx.clone() }
    }
}

impl Drop for MetaActor {
    fn drop(&mut self) {
        let _ = self.tx.send(MetaMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(store: MetaStore, rx: Receiver<MetaMessage>) {
    for msg in rx {
        match msg {
            MetaMessage::Add { key, n, reply } => {
                let result = store.add(&key, n);
                // A dropped reply receiver (cancelled caller) just
                // discards the late answer, per §7.
                let _ = reply.send(result);
            }
            MetaMessage::Shutdown => break,
        }
    }
}

/// A cloneable handle importers use to request replenishment. Blocking
/// on the reply is the only suspension point in the ID allocation
/// protocol (§5a).
#[derive(Clone)]
pub struct MetaClient {
    tx: Sender<MetaMessage>,
}

impl MetaClient {
    /// Request `add(key, n)` from the meta store and block for the
    /// prior counter value. `IngestError::Unspecified` if the actor
    /// thread is gone (no meta store reachable, §7).
    pub fn add(&self, key: &str, n: u64) -> Result<u64, IngestError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.tx
            .send(MetaMessage::Add {
                key: key.to_string(),
                n,
                reply: reply_tx,
            })
            .map_err(|_| IngestError::Unspecified)?;
        reply_rx
            .recv()
            .map_err(|_| IngestError::Unspecified)?
            .map_err(IngestError::from)
    }
}

//! Ready-made fetch collaborator running on a background thread (native only).
//!
//! `BackgroundFetcher` owns one worker thread that runs a host-supplied
//! blocking fetch function for each request and completes the `FetchReply`
//! from there. Requests are served in order. Dropping the fetcher never
//! blocks: the worker is told to stop and finishes any fetch in progress on
//! its own.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::error::FetchError;
use crate::loader::{ContentDescriptor, ContentFetcher, FetchReply, FetchRequest};

/// Blocking fetch function run on the worker thread.
pub type FetchFn = dyn Fn(&FetchRequest) -> Result<ContentDescriptor, FetchError> + Send;

/// Message sent to the fetch thread.
enum ThreadMessage {
    Fetch(FetchRequest, FetchReply),
    Shutdown,
}

/// Runs fetches on a dedicated thread, detached on drop.
pub struct BackgroundFetcher {
    request_tx: Sender<ThreadMessage>,
    thread_handle: Option<JoinHandle<()>>,
}

impl BackgroundFetcher {
    /// Spawn the worker thread.
    ///
    /// Returns `Err` if the thread fails to spawn.
    pub fn spawn<F>(fetch: F) -> std::io::Result<Self>
    where
        F: Fn(&FetchRequest) -> Result<ContentDescriptor, FetchError> + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<ThreadMessage>();
        let fetch: Box<FetchFn> = Box::new(fetch);

        let thread_handle = thread::Builder::new()
            .name("flyer-fetch".to_string())
            .spawn(move || {
                log::info!("Flyer fetch thread started");
                Self::thread_loop(request_rx, fetch);
                log::info!("Flyer fetch thread exiting");
            })?;

        Ok(Self {
            request_tx,
            thread_handle: Some(thread_handle),
        })
    }

    fn thread_loop(request_rx: Receiver<ThreadMessage>, fetch: Box<FetchFn>) {
        loop {
            match request_rx.recv() {
                Ok(ThreadMessage::Fetch(request, reply)) => {
                    log::debug!("Fetching flyer {} for {:?}", request.flyer_id, reply.token());
                    reply.send(fetch(&request));
                }
                Ok(ThreadMessage::Shutdown) => {
                    log::debug!("Received shutdown signal");
                    break;
                }
                Err(_) => {
                    log::debug!("Request channel closed, fetch thread exiting");
                    break;
                }
            }
        }
    }
}

impl ContentFetcher for BackgroundFetcher {
    fn fetch(&self, request: FetchRequest, reply: FetchReply) {
        // On failure the reply comes back inside the error and is dropped,
        // which completes it as abandoned
        if self
            .request_tx
            .send(ThreadMessage::Fetch(request, reply))
            .is_err()
        {
            log::error!("Failed to queue fetch: worker thread is gone");
        }
    }
}

impl Drop for BackgroundFetcher {
    fn drop(&mut self) {
        let _ = self.request_tx.send(ThreadMessage::Shutdown);
        // A worker still inside a host fetch is left to finish on its own
        if let Some(handle) = self.thread_handle.take() {
            if handle.is_finished() {
                if handle.join().is_err() {
                    log::error!("Flyer fetch thread panicked");
                }
            } else {
                log::debug!("Detaching flyer fetch thread");
            }
        }
    }
}

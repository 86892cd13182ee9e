//! Background thread that executes page requests off the UI loop.

use std::{
    io,
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::Duration,
};

use pokedex_core::{Command, FetchFailure, FetchFailureKind, PageRequest, Pokemon};
use tracing::{debug, warn};

use crate::client::PageSource;

/// Outcome of a single page request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageResponse {
    /// Request the outcome answers.
    pub request: PageRequest,
    /// Records on success, the failure otherwise.
    pub result: Result<Vec<Pokemon>, FetchFailure>,
}

impl PageResponse {
    /// Converts the outcome into the world command that applies it.
    #[must_use]
    pub fn into_command(self) -> Command {
        match self.result {
            Ok(pokemon) => Command::CompletePageLoad {
                request: self.request,
                pokemon,
            },
            Err(failure) => Command::FailPageLoad {
                request: self.request,
                failure,
            },
        }
    }
}

/// Runs a [`PageSource`] on a dedicated thread.
///
/// Requests are executed one at a time in submission order. Dropping the
/// loader closes the request channel and joins the thread once the request in
/// progress, if any, returns.
#[derive(Debug)]
pub struct PageLoader {
    requests: Option<Sender<PageRequest>>,
    responses: Receiver<PageResponse>,
    orphaned: Vec<PageResponse>,
    worker: Option<JoinHandle<()>>,
}

impl PageLoader {
    /// Spawns the loader thread around the provided source.
    pub fn spawn<S>(source: S) -> io::Result<Self>
    where
        S: PageSource,
    {
        let (request_sender, request_receiver) = mpsc::channel::<PageRequest>();
        let (response_sender, response_receiver) = mpsc::channel::<PageResponse>();

        let worker = thread::Builder::new()
            .name("pokedex-page-loader".to_owned())
            .spawn(move || {
                for request in request_receiver {
                    let result = source
                        .fetch_page(request.page)
                        .map_err(|error| error.to_failure());
                    if response_sender
                        .send(PageResponse { request, result })
                        .is_err()
                    {
                        break;
                    }
                }
                debug!("page loader stopped");
            })?;

        Ok(Self {
            requests: Some(request_sender),
            responses: response_receiver,
            orphaned: Vec::new(),
            worker: Some(worker),
        })
    }

    /// Queues a request for the loader thread.
    ///
    /// If the thread is gone the request fails immediately with
    /// [`FetchFailureKind::LoaderGone`] so the world can clear its loading flag.
    pub fn submit(&mut self, request: PageRequest) {
        let delivered = self
            .requests
            .as_ref()
            .is_some_and(|sender| sender.send(request).is_ok());
        if !delivered {
            warn!(page = request.page.get(), "page loader is not running");
            self.orphaned.push(PageResponse {
                request,
                result: Err(FetchFailure::new(
                    FetchFailureKind::LoaderGone,
                    "request could not be queued",
                )),
            });
        }
    }

    /// Drains every response that is ready without blocking.
    pub fn drain(&mut self) -> Vec<PageResponse> {
        let mut ready: Vec<PageResponse> = self.orphaned.drain(..).collect();
        ready.extend(self.responses.try_iter());
        ready
    }

    /// Waits up to `timeout` for the next response.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<PageResponse> {
        if !self.orphaned.is_empty() {
            return Some(self.orphaned.remove(0));
        }
        match self.responses.recv_timeout(timeout) {
            Ok(response) => Some(response),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for PageLoader {
    fn drop(&mut self) {
        drop(self.requests.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("page loader thread panicked");
            }
        }
    }
}

//! Background network worker.
//!
//! A dedicated thread runs a tokio runtime and executes [`Job`]s concurrently.
//! Each finished job is sent back to the UI thread as a [`Completion`] over a
//! std channel, followed by a repaint request so the frame loop picks it up.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tracing::{debug, error};

use super::api::{
    AlignResponse, ClearResponse, DatasetAlignRequest, DatasetDataResponse, GroupAlignRequest,
    RawSeries, RenameRequest, SeriesMap, UploadResponse,
};
use super::client::HttpClient;
use crate::data::datasets::Dataset;
use crate::data::series::DatasetId;
use crate::data::window_cache::WindowRequest;
use crate::error::Result;

#[derive(Debug, Clone)]
pub enum Job {
    FetchSeries,
    Upload { path: PathBuf, multi_channel: bool },
    Clear,
    AlignGroups(GroupAlignRequest),
    AlignDatasets(DatasetAlignRequest),
    ListDatasets,
    DatasetData(DatasetId),
    Window(WindowRequest),
    Rename { id: DatasetId, name: String, previous: String },
}

impl Job {
    fn label(&self) -> &'static str {
        match self {
            Job::FetchSeries => "fetch series",
            Job::Upload { .. } => "upload",
            Job::Clear => "clear",
            Job::AlignGroups(_) => "align groups",
            Job::AlignDatasets(_) => "align datasets",
            Job::ListDatasets => "list datasets",
            Job::DatasetData(_) => "dataset data",
            Job::Window(_) => "channel window",
            Job::Rename { .. } => "rename",
        }
    }
}

#[derive(Debug)]
pub enum Completion {
    Series(Result<SeriesMap>),
    Uploaded(Result<UploadResponse>),
    Cleared(Result<ClearResponse>),
    Aligned(Result<AlignResponse>),
    Datasets(Result<Vec<Dataset>>),
    DatasetData {
        id: DatasetId,
        result: Result<DatasetDataResponse>,
    },
    Window {
        request: WindowRequest,
        result: Result<RawSeries>,
    },
    Renamed {
        id: DatasetId,
        previous: String,
        result: Result<()>,
    },
}

async fn run(client: &HttpClient, job: Job) -> Completion {
    match job {
        Job::FetchSeries => Completion::Series(client.fetch_series().await),
        Job::Upload { path, multi_channel } => {
            Completion::Uploaded(client.upload(&path, multi_channel).await)
        }
        Job::Clear => Completion::Cleared(client.clear().await),
        Job::AlignGroups(request) => Completion::Aligned(client.align_groups(&request).await),
        Job::AlignDatasets(request) => Completion::Aligned(client.align_datasets(&request).await),
        Job::ListDatasets => Completion::Datasets(client.list_datasets().await),
        Job::DatasetData(id) => {
            let result = client.dataset_data(&id).await;
            Completion::DatasetData { id, result }
        }
        Job::Window(request) => {
            let result = client.channel_window(&request).await;
            Completion::Window { request, result }
        }
        Job::Rename { id, name, previous } => {
            let body = RenameRequest {
                dataset_id: id.clone(),
                name,
            };
            let result = client.rename_dataset(&body).await;
            Completion::Renamed {
                id,
                previous,
                result,
            }
        }
    }
}

/// Handle to the worker thread, owned by the UI.
pub struct Dispatcher {
    jobs: UnboundedSender<Job>,
    completions: Receiver<Completion>,
    in_flight: usize,
}

impl Dispatcher {
    /// Spawn the worker thread. `repaint` is woken after every completion.
    pub fn spawn(client: HttpClient, repaint: Option<egui::Context>) -> Self {
        let (job_tx, mut job_rx) = unbounded_channel::<Job>();
        let (done_tx, done_rx): (Sender<Completion>, Receiver<Completion>) = mpsc::channel();

        std::thread::spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    error!("failed to start network runtime: {e}");
                    return;
                }
            };
            rt.block_on(async move {
                while let Some(job) = job_rx.recv().await {
                    let client = client.clone();
                    let done_tx = done_tx.clone();
                    let repaint = repaint.clone();
                    tokio::spawn(async move {
                        let label = job.label();
                        let completion = run(&client, job).await;
                        debug!(job = label, "job finished");
                        if done_tx.send(completion).is_ok() {
                            if let Some(ctx) = repaint {
                                ctx.request_repaint();
                            }
                        }
                    });
                }
            });
        });

        Self {
            jobs: job_tx,
            completions: done_rx,
            in_flight: 0,
        }
    }

    /// Queue a job. Returns `false` when the worker has gone away.
    pub fn submit(&mut self, job: Job) -> bool {
        debug!(job = job.label(), "job submitted");
        let sent = self.jobs.send(job).is_ok();
        if sent {
            self.in_flight += 1;
        } else {
            error!("network worker is not running");
        }
        sent
    }

    /// Every completion received since the last call.
    pub fn drain(&mut self) -> Vec<Completion> {
        let done: Vec<Completion> = self.completions.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(done.len());
        done
    }

    /// Jobs submitted but not yet drained.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

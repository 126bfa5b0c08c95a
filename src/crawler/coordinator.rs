//! Freeze coordinator - the crawl loop
//!
//! The `Freezer` owns the seed generator registry. Each call to `freeze()`
//! builds a fresh `Run` holding the work queue, the dedup registries and the
//! records collected so far, then drives it breadth-first until the queue is
//! empty.

use crate::app::{Application, Request, Response};
use crate::config::{FreezerConfig, DEFAULT_DESTINATION};
use crate::crawler::parser::extract_anchors;
use crate::crawler::seeds::RouteTableSeeds;
use crate::crawler::{GenerationTask, SeedGenerator};
use crate::output::{body_digest, FreezeReport, FrozenRecord, OutputWriter};
use crate::routing::{discovery_channel, InterceptingUrlGenerator, UrlGenerator, UrlKind};
use crate::state::{CrawlState, TaskState};
use crate::url::{classify_link, fetch_key, LinkClass};
use crate::FreezeError;
use chrono::Utc;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

/// Run-level settings for a `Freezer`
#[derive(Debug, Clone)]
pub struct FreezerOptions {
    /// Directory the static files are written to
    pub destination: PathBuf,

    /// Queue every URL generated while rendering
    pub intercept_url_generation: bool,

    /// Upper bound on the duration of a whole run
    pub timeout: Option<Duration>,
}

impl FreezerOptions {
    pub fn from_config(config: &FreezerConfig) -> Self {
        Self {
            destination: PathBuf::from(&config.destination),
            intercept_url_generation: config.intercept_url_generation,
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }
}

impl Default for FreezerOptions {
    fn default() -> Self {
        Self {
            destination: PathBuf::from(DEFAULT_DESTINATION),
            intercept_url_generation: true,
            timeout: None,
        }
    }
}

/// Cooperative cancellation flag shared with a running freeze
///
/// The crawl loop checks it between queue pops; a cancelled run ends with
/// `FreezeError::Cancelled`.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Turns an `Application` into a tree of static files
pub struct Freezer<A: Application> {
    app: A,
    options: FreezerOptions,
    generators: Vec<Box<dyn SeedGenerator>>,
    cancel: CancelHandle,
}

impl<A: Application> Freezer<A> {
    /// Creates a freezer with the default route table generator registered
    pub fn new(app: A, options: FreezerOptions) -> Self {
        let routes = RouteTableSeeds::new(app.routes());

        let mut freezer = Self {
            app,
            options,
            generators: Vec::new(),
            cancel: CancelHandle::new(),
        };
        freezer.register_generator(routes);
        freezer
    }

    /// Appends a seed generator; generators run in registration order
    pub fn register_generator<G>(&mut self, generator: G) -> &mut Self
    where
        G: SeedGenerator + 'static,
    {
        self.generators.push(Box::new(generator));
        self
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    pub fn options(&self) -> &FreezerOptions {
        &self.options
    }

    /// Handle that cancels runs of this freezer
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Runs every registered generator and concatenates their tasks
    ///
    /// The first generator error aborts with `FreezeError::GeneratorFailure`.
    pub fn seed_tasks(&self) -> Result<Vec<GenerationTask>, FreezeError> {
        let mut tasks = Vec::new();

        for generator in &self.generators {
            let generated =
                generator
                    .generate()
                    .map_err(|source| FreezeError::GeneratorFailure {
                        generator: generator.name().to_string(),
                        source,
                    })?;
            tracing::debug!(
                "Generator '{}' yielded {} tasks",
                generator.name(),
                generated.len()
            );
            tasks.extend(generated);
        }

        Ok(tasks)
    }

    /// Freezes the application into the destination directory
    ///
    /// Per-task problems (unknown routes, non-2xx responses, failed writes)
    /// are recorded in the returned report. Only a destination that cannot be
    /// created, a failing generator, cancellation or the run timeout end the
    /// run with an error.
    pub async fn freeze(&self) -> Result<FreezeReport, FreezeError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let deadline = self.options.timeout.map(|timeout| clock + timeout);

        tracing::info!("Freezing into {}", self.options.destination.display());

        let writer = OutputWriter::new(&self.options.destination);
        writer
            .prepare()
            .map_err(|source| FreezeError::Destination {
                path: self.options.destination.clone(),
                source,
            })?;

        let seeds = self.seed_tasks()?;
        tracing::info!("Seeded {} tasks from {} generators", seeds.len(), self.generators.len());

        let plain = self.app.url_generator();
        let (render, discoveries) = if self.options.intercept_url_generation {
            let (sink, rx) = discovery_channel();
            let intercepting: Arc<dyn UrlGenerator> =
                Arc::new(InterceptingUrlGenerator::new(Arc::clone(&plain), sink));
            (intercepting, Some(rx))
        } else {
            (Arc::clone(&plain), None)
        };

        let mut run = Run {
            app: &self.app,
            writer,
            plain,
            render,
            discoveries,
            queue: seeds.into(),
            state: CrawlState::new(),
            records: Vec::new(),
            deduplicated: 0,
            clock,
            deadline,
        };

        let mut processed = 0usize;
        while let Some(task) = run.queue.pop_front() {
            if self.cancel.is_cancelled() {
                tracing::warn!("Freeze cancelled with {} tasks queued", run.queue.len() + 1);
                return Err(FreezeError::Cancelled);
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(FreezeError::TimedOut {
                        elapsed: clock.elapsed(),
                    });
                }
            }

            run.process(task).await?;
            run.drain_discoveries();

            processed += 1;
            if processed % 50 == 0 {
                tracing::info!(
                    "Progress: {} tasks processed, {} pages written, {} queued",
                    processed,
                    run.state.urls_fetched(),
                    run.queue.len()
                );
            }
        }

        let report = FreezeReport {
            records: run.records,
            deduplicated: run.deduplicated,
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "Freeze completed: {} written, {} skipped, {} failed in {:?}",
            report.written_count(),
            report.skipped_count(),
            report.failed_count(),
            clock.elapsed()
        );

        Ok(report)
    }
}

/// State owned by a single `freeze()` call
struct Run<'a, A: Application> {
    app: &'a A,
    writer: OutputWriter,
    /// Resolves queued named routes; never reports discoveries
    plain: Arc<dyn UrlGenerator>,
    /// Handed to the application while it renders
    render: Arc<dyn UrlGenerator>,
    discoveries: Option<UnboundedReceiver<GenerationTask>>,
    queue: VecDeque<GenerationTask>,
    state: CrawlState,
    records: Vec<FrozenRecord>,
    deduplicated: usize,
    clock: Instant,
    deadline: Option<Instant>,
}

impl<A: Application> Run<'_, A> {
    /// Drives one task to a terminal state
    ///
    /// Only state machine violations and the run timeout escape as errors.
    async fn process(&mut self, task: GenerationTask) -> Result<(), FreezeError> {
        let mut state = TaskState::Queued;

        let url = match &task {
            GenerationTask::NamedRoute { name, params } => {
                let key = task.route_key().unwrap_or_else(|| name.clone());
                if !self.state.claim_route(&key) {
                    tracing::debug!("Route {} already resolved", key);
                    self.deduplicated += 1;
                    return Ok(());
                }

                state.advance(TaskState::Resolving)?;
                match self.plain.generate(name, params, UrlKind::Path) {
                    Ok(url) => url,
                    Err(e) => {
                        state.advance(TaskState::Failed)?;
                        tracing::warn!("Cannot resolve {}: {}", task, e);
                        self.records.push(FrozenRecord::failed(key, e.to_string()));
                        return Ok(());
                    }
                }
            }
            GenerationTask::RawUrl { url } => match classify_link(url, "/") {
                LinkClass::Local(resolved) => resolved,
                LinkClass::External => return self.record_external(url),
                LinkClass::Ignored => {
                    state.advance(TaskState::Resolving)?;
                    state.advance(TaskState::Failed)?;
                    tracing::warn!("Seed URL {} does not name a page", url);
                    self.records
                        .push(FrozenRecord::failed(url.clone(), "not a page URL"));
                    return Ok(());
                }
            },
        };

        let url = fetch_key(&url).to_string();
        if !self.state.claim_url(&url) {
            tracing::debug!("URL {} already frozen", url);
            self.deduplicated += 1;
            return Ok(());
        }

        state.advance(TaskState::Fetching)?;
        let response = self.fetch(&url).await?;

        if !response.is_success() {
            state.advance(TaskState::SkippedNonOk)?;
            tracing::warn!("Skipping {} (status {})", url, response.status);
            self.records
                .push(FrozenRecord::skipped_non_ok(url, response.status));
            return Ok(());
        }

        match self.writer.write(&url, response.body.as_bytes()) {
            Ok(path) => {
                state.advance(TaskState::Written)?;
                tracing::info!("Froze {} to {}", url, path.display());
                self.records.push(FrozenRecord::written(
                    url.clone(),
                    path,
                    response.status,
                    body_digest(response.body.as_bytes()),
                ));
            }
            Err(e) => {
                state.advance(TaskState::Failed)?;
                tracing::error!("{}", e);
                self.records
                    .push(FrozenRecord::failed(url, e.to_string()).with_status(response.status));
                return Ok(());
            }
        }

        if response.is_html() {
            self.follow_links(&url, &response.body)?;
        }

        Ok(())
    }

    /// Requests `url` from the application, bounded by the run deadline
    async fn fetch(&self, url: &str) -> Result<Response, FreezeError> {
        let respond = self
            .app
            .respond(Request::get(url), Arc::clone(&self.render));

        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, respond)
                .await
                .map_err(|_| FreezeError::TimedOut {
                    elapsed: self.clock.elapsed(),
                }),
            None => Ok(respond.await),
        }
    }

    /// Queues the local anchors of a written page
    fn follow_links(&mut self, page_url: &str, body: &str) -> Result<(), FreezeError> {
        for href in extract_anchors(body) {
            match classify_link(&href, page_url) {
                LinkClass::Local(url) => {
                    if !self.state.is_url_frozen(fetch_key(&url)) {
                        self.queue.push_back(GenerationTask::raw_url(url));
                    }
                }
                LinkClass::External => self.record_external(&href)?,
                LinkClass::Ignored => {}
            }
        }
        Ok(())
    }

    /// Records an off-site link once per run
    fn record_external(&mut self, href: &str) -> Result<(), FreezeError> {
        if !self.state.claim_external(href) {
            return Ok(());
        }

        let mut state = TaskState::Queued;
        state.advance(TaskState::SkippedExternal)?;
        tracing::debug!("Skipping external link {}", href);
        self.records.push(FrozenRecord::skipped_external(href));
        Ok(())
    }

    /// Moves URLs generated during the last render onto the queue
    fn drain_discoveries(&mut self) {
        let Some(rx) = self.discoveries.as_mut() else {
            return;
        };

        while let Ok(task) = rx.try_recv() {
            let known = task
                .route_key()
                .is_some_and(|key| self.state.is_route_frozen(&key));
            if !known {
                tracing::trace!("Discovered {}", task);
                self.queue.push_back(task);
            }
        }
    }
}

//! Sequential harvest engine.
//!
//! Root page → discipline list → discipline pages → qualifying program pages
//! → document downloads, followed by the static cycle resources. Every
//! request is awaited in turn; a pause separates successive disciplines.
//! Only the root fetch and the discipline list are fatal, every later
//! failure skips the enclosing unit and is counted in the report.

use std::time::{Duration, Instant};

use reqwest::Client;
use scraper::Html;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use eduscol_shared::{
    Discipline, EduscolError, HarvestConfig, ProgramCandidate, ProgressReporter, Result,
    document_filename, sanitize_filename,
};

use crate::adapters::{EduscolAdapter, SiteAdapter};
use crate::download::{Downloader, filename_from_url};
use crate::policy::{TitleDecision, TitlePolicy};

/// User-Agent string for harvest requests.
const USER_AGENT: &str = concat!("eduscol-harvester/", env!("CARGO_PKG_VERSION"));

/// Folder used when a discipline name sanitizes to nothing.
const UNNAMED_FOLDER: &str = "unnamed";

// ---------------------------------------------------------------------------
// HarvestReport
// ---------------------------------------------------------------------------

/// Summary of a completed harvest.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HarvestReport {
    /// Entries in the discipline navigation list.
    pub disciplines_found: usize,
    /// Disciplines skipped (page unreachable or program block missing).
    pub disciplines_skipped: usize,
    /// Program entries accepted by the title policy.
    pub programs_included: usize,
    /// Program entries rejected as cycle-specific duplicates.
    pub programs_excluded: usize,
    /// Program entries without the title separator.
    pub programs_malformed: usize,
    /// Titles no policy rule recognised, kept for manual review.
    pub ambiguous_titles: Vec<String>,
    /// Program pages that could not be fetched.
    pub program_pages_failed: usize,
    /// Program pages where neither extraction pattern found a link.
    pub programs_without_links: usize,
    /// Documents written under the download directory.
    pub documents_downloaded: usize,
    /// Document downloads that failed.
    pub documents_failed: usize,
    /// Static resources written.
    pub static_downloaded: usize,
    /// Static resources that failed.
    pub static_failed: usize,
    /// Errors encountered (URL, error message).
    pub errors: Vec<(String, String)>,
    /// Wall-clock duration in milliseconds.
    pub elapsed_ms: u64,
}

// ---------------------------------------------------------------------------
// Harvester
// ---------------------------------------------------------------------------

/// Crawls the portal and downloads every referenced curriculum document.
pub struct Harvester {
    config: HarvestConfig,
    client: Client,
    adapter: Box<dyn SiteAdapter>,
    policy: TitlePolicy,
    downloader: Downloader,
}

impl Harvester {
    /// Create a harvester with the eduscol adapter and the standard title policy.
    pub fn new(config: HarvestConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| EduscolError::Network(format!("failed to build HTTP client: {e}")))?;

        let downloader = Downloader::new(client.clone(), config.download_timeout);

        Ok(Self {
            config,
            client,
            adapter: Box::new(EduscolAdapter),
            policy: TitlePolicy::standard(),
            downloader,
        })
    }

    /// Replace the markup adapter.
    pub fn with_adapter(mut self, adapter: Box<dyn SiteAdapter>) -> Self {
        self.adapter = adapter;
        self
    }

    /// Replace the program title policy.
    pub fn with_policy(mut self, policy: TitlePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the full harvest.
    ///
    /// Fails only when the root page is unreachable or carries no
    /// discipline list.
    #[instrument(skip_all, fields(root = %self.config.root_url))]
    pub async fn run(&self, progress: &dyn ProgressReporter) -> Result<HarvestReport> {
        let start = Instant::now();
        let mut report = HarvestReport::default();

        info!(
            adapter = self.adapter.name(),
            download_dir = %self.config.download_dir.display(),
            delay_ms = self.config.discipline_delay.as_millis() as u64,
            "starting harvest"
        );

        progress.phase("Resolving disciplines");
        let disciplines = self.resolve_disciplines().await?;
        report.disciplines_found = disciplines.len();

        for discipline in &disciplines {
            debug!(name = %discipline.name, url = %discipline.url, "discipline");
        }

        progress.phase("Crawling program pages");
        let total = disciplines.len();
        for (i, discipline) in disciplines.iter().enumerate() {
            if i > 0 {
                pause(self.config.discipline_delay).await;
            }
            progress.discipline_started(&discipline.name, i + 1, total);
            self.process_discipline(discipline, &mut report, progress)
                .await;
        }

        if self.config.include_static {
            progress.phase("Downloading static resources");
            self.load_static_resources(&mut report, progress).await;
        }

        report.elapsed_ms = start.elapsed().as_millis() as u64;

        info!(
            disciplines = report.disciplines_found,
            skipped = report.disciplines_skipped,
            programs = report.programs_included,
            ambiguous = report.ambiguous_titles.len(),
            downloaded = report.documents_downloaded,
            failed = report.documents_failed,
            static_downloaded = report.static_downloaded,
            duration_ms = report.elapsed_ms,
            "harvest completed"
        );

        Ok(report)
    }

    /// Fetch the site root and return its discipline list in document order.
    #[instrument(skip_all)]
    pub async fn resolve_disciplines(&self) -> Result<Vec<Discipline>> {
        let root = self.config.root()?;
        let html = self.fetch_html(&root).await?;

        let disciplines = {
            let doc = Html::parse_document(&html);
            self.adapter.find_discipline_list(&doc, &root)?
        };

        info!(count = disciplines.len(), "disciplines resolved");
        Ok(disciplines)
    }

    /// Fetch a discipline page and return the program entries the title policy accepts.
    ///
    /// Excluded, malformed and ambiguous entries are tallied in `report`.
    #[instrument(skip_all, fields(discipline = %discipline.name))]
    pub async fn resolve_programs(
        &self,
        discipline: &Discipline,
        report: &mut HarvestReport,
    ) -> Result<Vec<ProgramCandidate>> {
        let base = parse_url(&discipline.url)?;
        let html = self.fetch_html(&base).await?;

        let entries = {
            let doc = Html::parse_document(&html);
            self.adapter.find_program_entries(&doc, &base)?
        };

        let mut included = Vec::new();
        for entry in entries {
            match self.policy.decide(&entry.title) {
                TitleDecision::Include { rule } => {
                    info!(title = %entry.title, url = %entry.url, rule, "program included");
                    report.programs_included += 1;
                    included.push(ProgramCandidate {
                        title: entry.title,
                        url: entry.url,
                        discipline: discipline.clone(),
                    });
                }
                TitleDecision::Exclude { rule } => {
                    debug!(title = %entry.title, rule, "program excluded");
                    report.programs_excluded += 1;
                }
                TitleDecision::Malformed => {
                    debug!(title = %entry.title, "program title without separator");
                    report.programs_malformed += 1;
                }
                TitleDecision::Ambiguous => {
                    warn!(
                        title = %entry.title,
                        url = %entry.url,
                        "ambiguous program title, logged for manual review"
                    );
                    report.ambiguous_titles.push(entry.title);
                }
            }
        }

        Ok(included)
    }

    /// Extract the document links of one program page and download them.
    #[instrument(skip_all, fields(title = %candidate.title))]
    pub async fn harvest_program(
        &self,
        candidate: &ProgramCandidate,
        report: &mut HarvestReport,
        progress: &dyn ProgressReporter,
    ) {
        let page = match parse_url(&candidate.url) {
            Ok(url) => self.fetch_html(&url).await.map(|html| (url, html)),
            Err(e) => Err(e),
        };

        let (base, html) = match page {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %candidate.url, error = %e, "failed to fetch program page");
                report.program_pages_failed += 1;
                report.errors.push((candidate.url.clone(), e.to_string()));
                return;
            }
        };

        let links = {
            let doc = Html::parse_document(&html);
            self.adapter.find_program_links(&doc, &base)
        };

        if links.is_empty() {
            info!(url = %candidate.url, "no links found");
            report.programs_without_links += 1;
            return;
        }

        let folder = self
            .config
            .download_dir
            .join(folder_name(&candidate.discipline.name));

        for link in &links {
            let filename = document_filename(&link.label);
            info!(
                url = %link.url,
                folder = %folder.display(),
                filename = %filename,
                "downloading document"
            );
            if self.downloader.download(&link.url, &folder, &filename).await {
                report.documents_downloaded += 1;
                progress.document_saved(&folder.join(&filename).display().to_string());
            } else {
                report.documents_failed += 1;
                report
                    .errors
                    .push((link.url.clone(), "download failed".to_string()));
            }
        }
    }

    /// Download the configured cycle documents into `<download_dir>/<cycle>/`.
    #[instrument(skip_all, fields(cycles = self.config.static_resources.len()))]
    pub async fn load_static_resources(
        &self,
        report: &mut HarvestReport,
        progress: &dyn ProgressReporter,
    ) {
        for (cycle, urls) in &self.config.static_resources {
            let folder = self.config.download_dir.join(folder_name(cycle));
            for url in urls {
                let Some(filename) = filename_from_url(url) else {
                    warn!(%url, %cycle, "static resource URL has no file name");
                    report.static_failed += 1;
                    report
                        .errors
                        .push((url.clone(), "no file name in URL".to_string()));
                    continue;
                };

                info!(%url, folder = %folder.display(), %filename, "downloading static resource");
                if self.downloader.download(url, &folder, &filename).await {
                    report.static_downloaded += 1;
                    progress.document_saved(&folder.join(&filename).display().to_string());
                } else {
                    report.static_failed += 1;
                    report
                        .errors
                        .push((url.clone(), "download failed".to_string()));
                }
            }
        }
    }

    /// Process one discipline. Failures skip the discipline only.
    async fn process_discipline(
        &self,
        discipline: &Discipline,
        report: &mut HarvestReport,
        progress: &dyn ProgressReporter,
    ) {
        info!(name = %discipline.name, url = %discipline.url, "processing discipline");

        let candidates = match self.resolve_programs(discipline, report).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(
                    name = %discipline.name,
                    url = %discipline.url,
                    error = %e,
                    "skipping discipline"
                );
                report.disciplines_skipped += 1;
                report.errors.push((discipline.url.clone(), e.to_string()));
                return;
            }
        };

        for candidate in &candidates {
            self.harvest_program(candidate, report, progress).await;
        }
    }

    /// GET a page with the page timeout and return its body as text.
    async fn fetch_html(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching page");

        let response = self
            .client
            .get(url.as_str())
            .timeout(self.config.page_timeout)
            .send()
            .await
            .map_err(|e| EduscolError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EduscolError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| EduscolError::Network(format!("{url}: body read failed: {e}")))
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| EduscolError::validation(format!("invalid URL '{raw}': {e}")))
}

/// Download folder for a discipline or cycle name.
fn folder_name(name: &str) -> String {
    let sanitized = sanitize_filename(name);
    if sanitized.is_empty() {
        UNNAMED_FOLDER.to_string()
    } else {
        sanitized
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

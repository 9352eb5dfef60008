use std::path::PathBuf;
use std::sync::Arc;
use subgrab::ledger::LedgerStore;
use subgrab::sinks::{StdoutSink, TextFileSink, TranscriptSink};
use subgrab::utils::filename::channel_slug;
use subgrab::utils::fs;
use subgrab::{
    AcquisitionMachine, CsvLedgerStore, LanguageSelector, MemoryLedgerStore, PipelineController,
    ResumeLedger, RunOptions, RunSummary, SourceSpec, TranscriptionConfig,
};
use tracing::{info, warn};
use yt_source::ChannelEnumerator;
use yt_source::whisper::WhisperTranscriber;
use yt_source::ytdlp::{YtDlp, YtDlpConfig, version};

use crate::cli::{Args, OutputFormat};
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::output::OutputManager;

/// Where a run writes its artifacts.
enum Destination {
    /// Ledger and transcripts under a directory.
    Directory(PathBuf),
    /// Transcripts on stdout, ledger in memory.
    Stdout,
}

pub struct CommandExecutor {
    config: AppConfig,
    ytdlp: YtDlp,
    whisper: bool,
    whisper_model: String,
    output_format: OutputFormat,
    output_manager: OutputManager,
}

impl CommandExecutor {
    /// Merge command-line overrides into the loaded configuration.
    pub fn new(config: AppConfig, args: &Args) -> Self {
        let ytdlp = YtDlp::new(YtDlpConfig {
            binary_path: config.ytdlp.binary_path.clone(),
            cookie_file: args.cookies.clone().or_else(|| config.cookie_file.clone()),
            extra_args: config.ytdlp.extra_args.clone(),
        });
        let whisper = args.whisper || config.whisper.enabled;
        let whisper_model = args
            .whisper_model
            .clone()
            .unwrap_or_else(|| config.whisper.model.clone());

        Self {
            config,
            ytdlp,
            whisper,
            whisper_model,
            output_format: args.output,
            output_manager: OutputManager::new(true),
        }
    }

    pub async fn process_channel(
        &self,
        handle: &str,
        limit: Option<usize>,
        full: bool,
        no_incremental: bool,
        output_dir: Option<PathBuf>,
        urls_file: Option<PathBuf>,
    ) -> Result<()> {
        let spec = SourceSpec::channel(handle)?;
        let SourceSpec::Channel { handle } = &spec else {
            return Err(CliError::InvalidInput(format!("not a channel: {handle}")));
        };
        let slug = channel_slug(handle);
        let output_dir = output_dir.unwrap_or_else(|| self.default_output_dir(&slug));
        let url_list = match urls_file {
            Some(p) if p.is_relative() => output_dir.join(p),
            Some(p) => p,
            None => output_dir.join(format!("{slug}-list.txt")),
        };

        info!(channel = %handle, "Starting channel transcript run");
        let options = RunOptions {
            limit,
            incremental: !no_incremental,
            full,
            url_list: Some(url_list),
        };
        let summary = self
            .execute(&spec, &options, Destination::Directory(output_dir))
            .await?;
        self.print_summary(&summary, false)
    }

    pub async fn process_video(
        &self,
        url: &str,
        channel: Option<String>,
        output_dir: Option<PathBuf>,
        print: bool,
        no_summary: bool,
    ) -> Result<()> {
        let mut channel = channel;
        let destination = if print {
            Destination::Stdout
        } else {
            match output_dir {
                Some(dir) => Destination::Directory(dir),
                None => {
                    let name = match &channel {
                        Some(c) => c.clone(),
                        None => self.detect_channel(url).await?,
                    };
                    let dir = self.default_output_dir(&channel_slug(&name));
                    channel = Some(name);
                    Destination::Directory(dir)
                }
            }
        };
        let spec = SourceSpec::video(url, channel)?;

        // A single video is always processed, ledgered or not.
        let options = RunOptions {
            incremental: false,
            ..Default::default()
        };
        let summary = self.execute(&spec, &options, destination).await?;
        if no_summary {
            return Ok(());
        }
        self.print_summary(&summary, print)
    }

    async fn execute(
        &self,
        spec: &SourceSpec,
        options: &RunOptions,
        destination: Destination,
    ) -> Result<RunSummary> {
        self.check_ytdlp().await;

        let (store, sink): (Box<dyn LedgerStore>, Arc<dyn TranscriptSink>) = match &destination {
            Destination::Directory(dir) => {
                fs::ensure_dir_all_with_op("creating output directory", dir).await?;
                let store: Box<dyn LedgerStore> = Box::new(CsvLedgerStore::in_dir(dir));
                let sink: Arc<dyn TranscriptSink> = Arc::new(TextFileSink::new(dir));
                (store, sink)
            }
            Destination::Stdout => {
                let store: Box<dyn LedgerStore> = Box::new(MemoryLedgerStore::default());
                let sink: Arc<dyn TranscriptSink> = Arc::new(StdoutSink);
                (store, sink)
            }
        };
        let ledger = ResumeLedger::open(store)?;
        let mut controller =
            PipelineController::new(Arc::new(self.ytdlp.clone()), self.machine(), ledger)
                .with_sink(sink);
        Ok(controller.run(spec, options).await?)
    }

    fn machine(&self) -> AcquisitionMachine {
        let machine = AcquisitionMachine::new(Arc::new(self.ytdlp.clone()))
            .with_selector(LanguageSelector::with_priority(
                self.config.languages.clone(),
            ))
            .with_retry_policy(self.config.retry.policy());
        if !self.whisper {
            return machine;
        }
        let transcriber =
            WhisperTranscriber::new(self.config.whisper.binary_path.clone(), self.ytdlp.clone());
        machine.with_transcriber(
            Arc::new(transcriber),
            TranscriptionConfig {
                enabled: true,
                model: self.whisper_model.clone(),
            },
        )
    }

    async fn detect_channel(&self, url: &str) -> Result<String> {
        info!(url, "Extracting channel name from video metadata");
        let probe = self
            .ytdlp
            .probe_video(url)
            .await
            .map_err(|e| CliError::InvalidInput(format!("could not inspect {url}: {e}")))?;
        probe.channel.ok_or_else(|| {
            CliError::InvalidInput(
                "could not determine channel name from video metadata; pass --channel".into(),
            )
        })
    }

    /// Never fails the run; an outdated or missing yt-dlp only warns.
    async fn check_ytdlp(&self) {
        if !self.config.ytdlp.check_version {
            return;
        }
        let status = version::check(&self.ytdlp).await;
        if !status.needs_update {
            info!(
                version = status.version.as_deref().unwrap_or("unknown"),
                "yt-dlp is up to date"
            );
            return;
        }
        warn!(
            version = status.version.as_deref().unwrap_or("unknown"),
            age_days = status.age_days,
            "yt-dlp may be outdated: {}",
            status.hint.as_deref().unwrap_or("update recommended")
        );
        if self.config.ytdlp.auto_update {
            if version::update(&self.ytdlp).await {
                info!("yt-dlp updated");
            } else {
                warn!("yt-dlp update failed, continuing with the installed version");
            }
        }
    }

    fn default_output_dir(&self, slug: &str) -> PathBuf {
        self.config
            .output_root
            .join(format!("from-channel-{slug}"))
    }

    /// In print mode stdout carries the transcript, so the pretty summary
    /// goes to stderr.
    fn print_summary(&self, summary: &RunSummary, print_mode: bool) -> Result<()> {
        let text = self
            .output_manager
            .format_summary(summary, self.output_format)?;
        if print_mode && self.output_format == OutputFormat::Pretty {
            eprint!("{text}");
        } else {
            print!("{text}");
        }
        Ok(())
    }
}

/// `--log-dir` wins over the configured directory.
pub fn log_dir(config: &AppConfig, args: &Args) -> Option<PathBuf> {
    args.log_dir.clone().or_else(|| config.log_dir.clone())
}

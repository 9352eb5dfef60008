//! End-to-end runs against an on-disk ledger and transcript directory.

mod common;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use common::*;
use subgrab::ledger::LEDGER_FILE_NAME;
use subgrab::sinks::{FINAL_DIR, TextFileSink};
use subgrab::{
    CsvLedgerStore, PipelineController, ResumeLedger, RunOptions, SourceSpec, SubtitleSource,
};
use yt_source::media::CaptionTrack;

fn captions() -> Arc<FakeCaptions> {
    Arc::new(
        FakeCaptions::default()
            .with("V1", vec![CaptionTrack::manual("en")])
            .with("V2", vec![CaptionTrack::auto("zh")])
            .with("V3", vec![]),
    )
}

fn pipeline_in(dir: &Path, ids: &[&str], captions: Arc<FakeCaptions>) -> PipelineController {
    let ledger =
        ResumeLedger::open(Box::new(CsvLedgerStore::in_dir(dir))).expect("ledger should open");
    PipelineController::new(
        Arc::new(FakeEnumerator::with_ids(ids)),
        machine(captions),
        ledger,
    )
    .with_sink(Arc::new(TextFileSink::new(dir)))
}

fn read_rows(dir: &Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(dir.join(LEDGER_FILE_NAME)).expect("ledger exists");
    reader.records().map(|r| r.expect("valid row")).collect()
}

mod disk_tests {
    use super::*;

    #[tokio::test]
    async fn test_rows_and_transcripts_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline_in(dir.path(), &["V1", "V2", "V3"], captions());

        let summary = pipeline
            .run(
                &SourceSpec::channel("@fake").unwrap(),
                &RunOptions {
                    url_list: Some(dir.path().join("fake-list.txt")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(summary.processed, 3);

        let rows = read_rows(dir.path());
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "V1");
        assert_eq!(&rows[0][3], "2024-01-15");
        assert_eq!(&rows[0][4], "300");
        assert_eq!(&rows[0][6], "en");
        assert_eq!(&rows[0][7], "manual");
        assert_eq!(&rows[1][7], "auto-caption");
        assert_eq!(&rows[2][5], "");
        assert_eq!(&rows[2][7], "none");

        let transcript = dir.path().join(&rows[0][5]);
        assert!(rows[0][5].starts_with(FINAL_DIR));
        let text = std::fs::read_to_string(transcript).unwrap();
        assert!(text.contains("--- Subtitle (en) ---\nhello"));

        let transcripts = std::fs::read_dir(dir.path().join(FINAL_DIR)).unwrap().count();
        assert_eq!(transcripts, 2);

        let urls = std::fs::read_to_string(dir.path().join("fake-list.txt")).unwrap();
        assert_eq!(urls.lines().count(), 3);
        assert!(urls.lines().next().unwrap().ends_with("V1"));
    }

    #[tokio::test]
    async fn test_resume_after_restart() {
        let dir = tempfile::tempdir().unwrap();
        let spec = SourceSpec::channel("fake").unwrap();
        let limited = RunOptions {
            limit: Some(2),
            ..Default::default()
        };

        let mut first = pipeline_in(dir.path(), &["V1", "V2", "V3"], captions());
        first.run(&spec, &limited).await.unwrap();
        drop(first);
        assert_eq!(read_rows(dir.path()).len(), 2);

        let captions = captions();
        let mut second = pipeline_in(dir.path(), &["V1", "V2", "V3"], captions.clone());
        let summary = second.run(&spec, &RunOptions::default()).await.unwrap();

        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.results[0].video_id, "V3");
        assert_eq!(captions.fetches.load(Ordering::SeqCst), 0);
        assert_eq!(read_rows(dir.path()).len(), 3);
    }

    #[tokio::test]
    async fn test_legacy_ledger_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(LEDGER_FILE_NAME),
            "video_id,title,url,upload_date,duration,subtitle_path,languages\n\
             V1,Old,https://www.youtube.com/watch?v=V1,2023-01-01,60,final/old.txt,en\n",
        )
        .unwrap();

        let mut pipeline = pipeline_in(dir.path(), &["V1", "V2"], captions());
        let summary = pipeline
            .run(&SourceSpec::channel("fake").unwrap(), &RunOptions::default())
            .await
            .unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.results[0].subtitle_source, SubtitleSource::AutoCaption);

        let rows = read_rows(dir.path());
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "V1");
        assert_eq!(&rows[0][5], "final/old.txt");
        assert_eq!(&rows[1][0], "V2");
    }

    #[tokio::test]
    async fn test_full_run_replaces_rows() {
        let dir = tempfile::tempdir().unwrap();
        let spec = SourceSpec::channel("fake").unwrap();

        let mut first = pipeline_in(dir.path(), &["V1", "V2"], captions());
        first.run(&spec, &RunOptions::default()).await.unwrap();
        drop(first);

        let mut second = pipeline_in(dir.path(), &["V1", "V2"], captions());
        let summary = second
            .run(
                &spec,
                &RunOptions {
                    full: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(summary.processed, 2);
        let rows = read_rows(dir.path());
        let ids: Vec<_> = rows.iter().map(|r| r[0].to_string()).collect();
        assert_eq!(ids, vec!["V1", "V2"]);
    }
}

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::{TranscriptSink, compose_transcript};
use crate::Result;
use crate::domain::AcquisitionResult;

/// Prints each transcript to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

#[async_trait]
impl TranscriptSink for StdoutSink {
    fn reference(&self, _result: &AcquisitionResult) -> Option<String> {
        None
    }

    async fn deliver(&self, result: &AcquisitionResult) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(compose_transcript(result).as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}

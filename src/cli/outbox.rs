use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::ConfigError;
use crate::form::payload::{DonationPayload, DonationSubmitter, SubmissionError, SubmissionReceipt};
use crate::utils::write_atomic;

/// Submission collaborator that drops each payload into a directory as JSON.
#[derive(Debug, Clone)]
pub struct OutboxSubmitter {
    dir: PathBuf,
}

impl OutboxSubmitter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, reference: &str, payload: &DonationPayload) -> Result<PathBuf, ConfigError> {
        let path = self.dir.join(format!("{reference}.json"));
        let json = serde_json::to_string_pretty(payload)?;
        write_atomic(&path, &json)?;
        Ok(path)
    }
}

#[async_trait]
impl DonationSubmitter for OutboxSubmitter {
    async fn submit_donation(
        &self,
        payload: DonationPayload,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let reference = Uuid::new_v4().to_string();
        let path = self
            .write(&reference, &payload)
            .map_err(|err| SubmissionError::new(err.to_string()))?;
        tracing::debug!(path = %path.display(), "donation written to outbox");
        Ok(SubmissionReceipt { reference })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::payload::Cause;
    use crate::form::state::DonationForm;
    use tempfile::TempDir;

    #[tokio::test]
    async fn payload_lands_in_outbox() {
        let temp = TempDir::new().unwrap();
        let submitter = OutboxSubmitter::new(temp.path().join("outbox"));
        let mut form = DonationForm::new();
        form.card_number = "4111 1111 1111 9876".into();
        let payload = DonationPayload::from_form(&Cause::new("c-1", "Roof"), &form, 10.0);

        let receipt = submitter.submit_donation(payload.clone()).await.unwrap();
        let path = submitter.dir().join(format!("{}.json", receipt.reference));
        let stored: DonationPayload =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(stored, payload);
    }

    #[tokio::test]
    async fn unwritable_outbox_reports_failure() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let submitter = OutboxSubmitter::new(blocker.join("outbox"));
        let payload =
            DonationPayload::from_form(&Cause::new("c-1", "Roof"), &DonationForm::new(), 10.0);

        assert!(submitter.submit_donation(payload).await.is_err());
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use tracing::{info, warn};

use crate::{
    EditorEvent, Notice, ParametresBackend, TransferOutcome, TransferRecord, TransferRequest,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    MissingSource,
    MissingTarget,
    SameRedacteur,
    UnknownRedacteur(String),
    AlreadyRunning,
}

impl std::fmt::Display for TransferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSource => f.write_str("choose the rédacteur to transfer from"),
            Self::MissingTarget => f.write_str("choose the rédacteur to transfer to"),
            Self::SameRedacteur => {
                f.write_str("source and target rédacteur must be different")
            }
            Self::UnknownRedacteur(name) => {
                write!(f, "{name} is not in the rédacteurs list -- reload and retry")
            }
            Self::AlreadyRunning => f.write_str("a transfer is already in progress"),
        }
    }
}

impl std::error::Error for TransferError {}

pub fn validate_transfer(
    source: &str,
    target: &str,
    redacteurs: &[String],
) -> std::result::Result<TransferRequest, TransferError> {
    if source.trim().is_empty() {
        return Err(TransferError::MissingSource);
    }
    if target.trim().is_empty() {
        return Err(TransferError::MissingTarget);
    }
    if source == target {
        return Err(TransferError::SameRedacteur);
    }
    for name in [source, target] {
        if !redacteurs.iter().any(|known| known == name) {
            return Err(TransferError::UnknownRedacteur(name.to_owned()));
        }
    }
    Ok(TransferRequest {
        source_redacteur: source.to_owned(),
        target_redacteur: target.to_owned(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortfolioTransfer {
    in_flight: Option<TransferRequest>,
    last_outcome: Option<TransferOutcome>,
}

impl PortfolioTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<&TransferRequest> {
        self.in_flight.as_ref()
    }

    pub const fn last_outcome(&self) -> Option<TransferOutcome> {
        self.last_outcome
    }

    pub fn begin(
        &mut self,
        source: &str,
        target: &str,
        redacteurs: &[String],
    ) -> std::result::Result<TransferRequest, TransferError> {
        if self.in_flight.is_some() {
            return Err(TransferError::AlreadyRunning);
        }
        let request = validate_transfer(source, target, redacteurs)?;
        self.in_flight = Some(request.clone());
        Ok(request)
    }

    pub fn finish(&mut self, result: Result<TransferOutcome>) -> Vec<EditorEvent> {
        let Some(request) = self.in_flight.take() else {
            return Vec::new();
        };
        match result {
            Ok(outcome) => {
                info!(
                    source = %request.source_redacteur,
                    target = %request.target_redacteur,
                    affaires = outcome.affaires_modifiees,
                    "portfolio transferred"
                );
                self.last_outcome = Some(outcome);
                vec![EditorEvent::Notice(Notice::Success(format!(
                    "{} case file(s) moved from {} to {}",
                    outcome.affaires_modifiees,
                    request.source_redacteur,
                    request.target_redacteur
                )))]
            }
            Err(error) => {
                warn!(
                    source = %request.source_redacteur,
                    target = %request.target_redacteur,
                    error = %error,
                    "portfolio transfer failed"
                );
                vec![EditorEvent::Notice(Notice::Error(
                    "portfolio transfer failed -- please retry in a moment".to_owned(),
                ))]
            }
        }
    }

    pub fn run(
        &mut self,
        backend: &mut dyn ParametresBackend,
        source: &str,
        target: &str,
        redacteurs: &[String],
    ) -> Vec<EditorEvent> {
        let request = match self.begin(source, target, redacteurs) {
            Ok(request) => request,
            Err(error) => return vec![EditorEvent::Notice(Notice::Error(error.to_string()))],
        };
        let result = backend.transfer_portfolio(&request);
        self.finish(result)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferHistory {
    records: Vec<TransferRecord>,
    error: Option<String>,
}

impl TransferHistory {
    pub fn records(&self) -> &[TransferRecord] {
        &self.records
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn load(&mut self, backend: &mut dyn ParametresBackend) {
        match backend.transfer_history() {
            Ok(records) => {
                self.records = records;
                self.error = None;
            }
            Err(error) => {
                warn!(error = %error, "transfer history load failed");
                self.records.clear();
                self.error = Some(format!("could not load transfer history: {error:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PortfolioTransfer, TransferError, TransferHistory, validate_transfer};
    use crate::{
        EditorEvent, Notice, Parametres, ParametresBackend, ReferenceListKind, TransferOutcome,
        TransferRecord, TransferRequest, TransferStatus,
    };
    use anyhow::{Result, anyhow, bail};
    use time::OffsetDateTime;

    #[derive(Debug, Default)]
    struct TransferBackend {
        requests: Vec<TransferRequest>,
        fail: bool,
        history: Vec<TransferRecord>,
    }

    impl ParametresBackend for TransferBackend {
        fn fetch_parametres(&mut self) -> Result<Parametres> {
            Ok(Parametres::new())
        }

        fn append_value(&mut self, _kind: ReferenceListKind, _value: &str) -> Result<()> {
            Ok(())
        }

        fn delete_value(&mut self, _kind: ReferenceListKind, _index: usize) -> Result<()> {
            Ok(())
        }

        fn replace_values(&mut self, _kind: ReferenceListKind, _values: &[String]) -> Result<()> {
            Ok(())
        }

        fn transfer_portfolio(&mut self, request: &TransferRequest) -> Result<TransferOutcome> {
            self.requests.push(request.clone());
            if self.fail {
                bail!("server error (500): database locked");
            }
            Ok(TransferOutcome {
                affaires_modifiees: 12,
            })
        }

        fn transfer_history(&mut self) -> Result<Vec<TransferRecord>> {
            if self.fail {
                return Err(anyhow!("server error (503)"));
            }
            Ok(self.history.clone())
        }
    }

    fn redacteurs() -> Vec<String> {
        vec!["Dupont".to_owned(), "Leroy".to_owned(), "Moreau".to_owned()]
    }

    #[test]
    fn validation_rejects_blank_same_and_unknown_names() {
        let names = redacteurs();
        assert_eq!(
            validate_transfer("", "Leroy", &names),
            Err(TransferError::MissingSource)
        );
        assert_eq!(
            validate_transfer("Dupont", " ", &names),
            Err(TransferError::MissingTarget)
        );
        assert_eq!(
            validate_transfer("Dupont", "Dupont", &names),
            Err(TransferError::SameRedacteur)
        );
        assert_eq!(
            validate_transfer("Dupont", "Martin", &names),
            Err(TransferError::UnknownRedacteur("Martin".to_owned()))
        );
        assert!(validate_transfer("Dupont", "Leroy", &names).is_ok());
    }

    #[test]
    fn same_source_and_target_never_reach_the_backend() {
        let mut backend = TransferBackend::default();
        let mut transfer = PortfolioTransfer::new();

        let events = transfer.run(&mut backend, "Leroy", "Leroy", &redacteurs());
        assert!(backend.requests.is_empty());
        assert_eq!(
            events,
            vec![EditorEvent::Notice(Notice::Error(
                "source and target rédacteur must be different".to_owned()
            ))]
        );
        assert!(!transfer.is_in_flight());
    }

    #[test]
    fn successful_transfer_reports_modified_count() {
        let mut backend = TransferBackend::default();
        let mut transfer = PortfolioTransfer::new();

        let events = transfer.run(&mut backend, "Dupont", "Moreau", &redacteurs());
        assert_eq!(
            backend.requests,
            vec![TransferRequest {
                source_redacteur: "Dupont".to_owned(),
                target_redacteur: "Moreau".to_owned(),
            }]
        );
        assert_eq!(
            events,
            vec![EditorEvent::Notice(Notice::Success(
                "12 case file(s) moved from Dupont to Moreau".to_owned()
            ))]
        );
        assert_eq!(
            transfer.last_outcome(),
            Some(TransferOutcome {
                affaires_modifiees: 12
            })
        );
    }

    #[test]
    fn failed_transfer_reports_generic_retry_message() {
        let mut backend = TransferBackend {
            fail: true,
            ..TransferBackend::default()
        };
        let mut transfer = PortfolioTransfer::new();

        let events = transfer.run(&mut backend, "Dupont", "Leroy", &redacteurs());
        let [EditorEvent::Notice(notice)] = events.as_slice() else {
            panic!("expected one notice, got {events:?}");
        };
        assert!(notice.is_error());
        assert!(notice.message().contains("retry"));
        assert!(!notice.message().contains("database locked"));
        assert!(!transfer.is_in_flight());
    }

    #[test]
    fn second_transfer_is_rejected_while_one_is_in_flight() {
        let mut transfer = PortfolioTransfer::new();
        let names = redacteurs();

        transfer.begin("Dupont", "Leroy", &names).expect("first transfer starts");
        assert_eq!(
            transfer.begin("Dupont", "Leroy", &names),
            Err(TransferError::AlreadyRunning)
        );

        transfer.finish(Ok(TransferOutcome {
            affaires_modifiees: 0,
        }));
        assert!(transfer.begin("Dupont", "Leroy", &names).is_ok());
    }

    #[test]
    fn history_load_keeps_server_rows_and_reports_failures() {
        let record = TransferRecord {
            date: OffsetDateTime::UNIX_EPOCH,
            source_redacteur: "Dupont".to_owned(),
            target_redacteur: "Leroy".to_owned(),
            affaires_modifiees: 3,
            statut: TransferStatus::Succes,
            message: None,
        };
        let mut backend = TransferBackend {
            history: vec![record.clone()],
            ..TransferBackend::default()
        };
        let mut history = TransferHistory::default();

        history.load(&mut backend);
        assert_eq!(history.records(), &[record]);
        assert!(history.error().is_none());

        backend.fail = true;
        history.load(&mut backend);
        assert!(history.records().is_empty());
        assert!(history.error().is_some());
    }
}

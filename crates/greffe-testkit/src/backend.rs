// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use greffe_app::{
    Parametres, ParametresBackend, ReferenceListKind, TransferOutcome, TransferRecord,
    TransferRequest, TransferStatus,
};
use std::collections::BTreeSet;

use crate::fixture_datetime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
    Fetch,
    Append,
    Delete,
    Replace,
    Transfer,
    History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Fetch,
    Append {
        kind: ReferenceListKind,
        value: String,
    },
    Delete {
        kind: ReferenceListKind,
        index: usize,
    },
    Replace {
        kind: ReferenceListKind,
        values: Vec<String>,
    },
    Transfer(TransferRequest),
    History,
}

impl BackendCall {
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Fetch => Operation::Fetch,
            Self::Append { .. } => Operation::Append,
            Self::Delete { .. } => Operation::Delete,
            Self::Replace { .. } => Operation::Replace,
            Self::Transfer(_) => Operation::Transfer,
            Self::History => Operation::History,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryParametres {
    parametres: Parametres,
    calls: Vec<BackendCall>,
    failing: BTreeSet<Operation>,
    transfer_count: u64,
    history: Vec<TransferRecord>,
}

impl InMemoryParametres {
    pub fn new(parametres: Parametres) -> Self {
        Self {
            parametres,
            ..Self::default()
        }
    }

    pub fn parametres(&self) -> &Parametres {
        &self.parametres
    }

    pub fn parametres_mut(&mut self) -> &mut Parametres {
        &mut self.parametres
    }

    pub fn values(&self, kind: ReferenceListKind) -> Vec<String> {
        self.parametres.values(kind)
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn fail(&mut self, operation: Operation) {
        self.failing.insert(operation);
    }

    pub fn recover(&mut self, operation: Operation) {
        self.failing.remove(&operation);
    }

    pub fn set_transfer_count(&mut self, count: u64) {
        self.transfer_count = count;
    }

    pub fn history(&self) -> &[TransferRecord] {
        &self.history
    }

    fn record(&mut self, call: BackendCall) -> Result<()> {
        let operation = call.operation();
        self.calls.push(call);
        if self.failing.contains(&operation) {
            bail!("server error (500): injected {operation:?} failure");
        }
        Ok(())
    }
}

impl ParametresBackend for InMemoryParametres {
    fn fetch_parametres(&mut self) -> Result<Parametres> {
        self.record(BackendCall::Fetch)?;
        Ok(self.parametres.clone())
    }

    fn append_value(&mut self, kind: ReferenceListKind, value: &str) -> Result<()> {
        self.record(BackendCall::Append {
            kind,
            value: value.to_owned(),
        })?;
        let mut values = self.parametres.values(kind);
        values.push(value.to_owned());
        self.parametres.set_values(kind, values);
        Ok(())
    }

    fn delete_value(&mut self, kind: ReferenceListKind, index: usize) -> Result<()> {
        self.record(BackendCall::Delete { kind, index })?;
        let mut values = self.parametres.values(kind);
        if index >= values.len() {
            bail!("server error (400): index {index} out of range");
        }
        values.remove(index);
        self.parametres.set_values(kind, values);
        Ok(())
    }

    fn replace_values(&mut self, kind: ReferenceListKind, values: &[String]) -> Result<()> {
        self.record(BackendCall::Replace {
            kind,
            values: values.to_vec(),
        })?;
        self.parametres.set_values(kind, values.to_vec());
        Ok(())
    }

    fn transfer_portfolio(&mut self, request: &TransferRequest) -> Result<TransferOutcome> {
        let failed = self.record(BackendCall::Transfer(request.clone()));
        let (statut, message) = match &failed {
            Ok(()) => (TransferStatus::Succes, None),
            Err(error) => (TransferStatus::Echec, Some(error.to_string())),
        };
        self.history.push(TransferRecord {
            date: fixture_datetime(),
            source_redacteur: request.source_redacteur.clone(),
            target_redacteur: request.target_redacteur.clone(),
            affaires_modifiees: if failed.is_ok() { self.transfer_count } else { 0 },
            statut,
            message,
        });
        failed?;
        Ok(TransferOutcome {
            affaires_modifiees: self.transfer_count,
        })
    }

    fn transfer_history(&mut self) -> Result<Vec<TransferRecord>> {
        self.record(BackendCall::History)?;
        let mut records = self.history.clone();
        records.reverse();
        Ok(records)
    }
}

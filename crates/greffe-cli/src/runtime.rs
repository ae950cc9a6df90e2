// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use greffe_api::Client;
use greffe_app::{
    Lawyer, LawyerId, LawyerInput, LawyerSuggestions, ParametresBackend, TemplateInfo,
    TransferRequest,
};
use greffe_tui::InternalEvent;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;
use tracing::{debug, info};

pub struct ApiRuntime {
    client: Client,
    download_dir: PathBuf,
}

impl ApiRuntime {
    pub fn new(client: Client, download_dir: PathBuf) -> Self {
        Self {
            client,
            download_dir,
        }
    }
}

impl greffe_tui::AppRuntime for ApiRuntime {
    fn parametres(&mut self) -> &mut dyn ParametresBackend {
        &mut self.client
    }

    fn load_lawyers(&mut self) -> Result<Vec<Lawyer>> {
        self.client.list_lawyers()
    }

    fn save_lawyer(&mut self, id: Option<LawyerId>, input: &LawyerInput) -> Result<Lawyer> {
        match id {
            Some(id) => self.client.update_lawyer(id, input),
            None => self.client.create_lawyer(input),
        }
    }

    fn delete_lawyer(&mut self, id: LawyerId) -> Result<()> {
        self.client.delete_lawyer(id)
    }

    fn load_suggestions(&mut self) -> Result<LawyerSuggestions> {
        self.client.suggestions()
    }

    fn load_templates(&mut self) -> Result<Vec<TemplateInfo>> {
        self.client.list_templates()
    }

    fn download_template(&mut self, name: &str) -> Result<PathBuf> {
        let download = self.client.download_template(name)?;
        let path = download.save_into(&self.download_dir)?;
        info!(template = name, path = %path.display(), "template downloaded");
        Ok(path)
    }

    fn restore_template(&mut self, name: &str) -> Result<()> {
        self.client.restore_template(name)
    }

    fn spawn_transfer(&mut self, request: TransferRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name("greffe-transfer".to_owned())
            .spawn(move || {
                let result = client
                    .transfer_portfolio(&request)
                    .map_err(|error| format!("{error:#}"));
                if tx.send(InternalEvent::TransferFinished(result)).is_err() {
                    debug!("transfer finished after the UI closed");
                }
            })
            .context("spawn transfer thread")?;
        Ok(())
    }
}

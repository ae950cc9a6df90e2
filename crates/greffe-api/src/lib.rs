// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod download;

pub use download::{Download, file_name_from_disposition};

use anyhow::{Context, Result, anyhow, bail};
use greffe_app::{
    DocumentFormat, DossierId, Lawyer, LawyerId, LawyerInput, LawyerSuggestions, Parametres,
    ParametresBackend, ReferenceListKind, TemplateInfo, TransferOutcome, TransferRecord,
    TransferRequest,
};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response, multipart};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    token: Option<String>,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration, token: Option<&str>) -> Result<Self> {
        let base_url = validate_base_url(base_url)?;
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            token: token
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_owned),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn fetch_parametres(&self) -> Result<Parametres> {
        let response = self.send(self.http.get(self.endpoint(&["parametres"])?))?;
        response.json().context("decode parametres")
    }

    pub fn append_value(&self, kind: ReferenceListKind, value: &str) -> Result<()> {
        let url = self.endpoint(&["parametres", kind.as_str()])?;
        self.send(
            self.http
                .put(url)
                .json(&serde_json::json!({ "valeur": value })),
        )?;
        debug!(list = kind.as_str(), "value appended");
        Ok(())
    }

    pub fn delete_value(&self, kind: ReferenceListKind, index: usize) -> Result<()> {
        let index = index.to_string();
        let url = self.endpoint(&["parametres", kind.as_str(), &index])?;
        self.send(self.http.delete(url))?;
        debug!(list = kind.as_str(), index = %index, "value deleted");
        Ok(())
    }

    pub fn replace_values(&self, kind: ReferenceListKind, values: &[String]) -> Result<()> {
        let url = self.endpoint(&["parametres", kind.as_str()])?;
        self.send(
            self.http
                .post(url)
                .json(&serde_json::json!({ "valeurs": values })),
        )?;
        debug!(list = kind.as_str(), count = values.len(), "list replaced");
        Ok(())
    }

    pub fn transfer_portfolio(&self, request: &TransferRequest) -> Result<TransferOutcome> {
        let url = self.endpoint(&["parametres", "transfert-portefeuille"])?;
        let response = self.send(self.http.post(url).json(request))?;
        response.json().context("decode transfer outcome")
    }

    pub fn transfer_history(&self) -> Result<Vec<TransferRecord>> {
        self.get_json(&["parametres", "historique-transferts"], "decode transfer history")
    }

    pub fn list_lawyers(&self) -> Result<Vec<Lawyer>> {
        self.get_json(&["avocats"], "decode lawyers")
    }

    pub fn create_lawyer(&self, input: &LawyerInput) -> Result<Lawyer> {
        let url = self.endpoint(&["avocats"])?;
        let response = self.send(self.http.post(url).json(input))?;
        response.json().context("decode created lawyer")
    }

    pub fn update_lawyer(&self, id: LawyerId, input: &LawyerInput) -> Result<Lawyer> {
        let id = id.to_string();
        let url = self.endpoint(&["avocats", &id])?;
        let response = self.send(self.http.put(url).json(input))?;
        response.json().context("decode updated lawyer")
    }

    pub fn delete_lawyer(&self, id: LawyerId) -> Result<()> {
        let id = id.to_string();
        let url = self.endpoint(&["avocats", &id])?;
        self.send(self.http.delete(url))?;
        Ok(())
    }

    pub fn list_cabinets(&self) -> Result<Vec<String>> {
        self.get_json(&["avocats", "utils", "cabinets"], "decode cabinets")
    }

    pub fn list_villes(&self) -> Result<Vec<String>> {
        self.get_json(&["avocats", "utils", "villes"], "decode villes")
    }

    pub fn suggestions(&self) -> Result<LawyerSuggestions> {
        Ok(LawyerSuggestions {
            cabinets: self.list_cabinets()?,
            villes: self.list_villes()?,
        })
    }

    pub fn list_templates(&self) -> Result<Vec<TemplateInfo>> {
        self.get_json(&["templates"], "decode templates")
    }

    pub fn download_template(&self, name: &str) -> Result<Download> {
        let url = self.endpoint(&["templates", name, "download"])?;
        let response = self.send(self.http.get(url))?;
        read_download(response, name)
    }

    pub fn upload_template(&self, name: &str, file: &Path) -> Result<()> {
        let form = multipart::Form::new()
            .file("template", file)
            .with_context(|| format!("read template file {}", file.display()))?;
        let url = self.endpoint(&["templates", name, "upload"])?;
        self.send(self.http.post(url).multipart(form))?;
        debug!(template = name, "template uploaded");
        Ok(())
    }

    pub fn restore_template(&self, name: &str) -> Result<()> {
        let url = self.endpoint(&["templates", name])?;
        self.send(self.http.delete(url))?;
        debug!(template = name, "template restored");
        Ok(())
    }

    pub fn generate_document(
        &self,
        dossier: DossierId,
        template: &str,
        format: DocumentFormat,
    ) -> Result<Download> {
        let dossier = dossier.to_string();
        let url = self.endpoint(&["documents", &dossier, template])?;
        let response = self.send(
            self.http
                .get(url)
                .query(&[("format", format.as_str())]),
        )?;
        read_download(response, &format!("{template}.{}", format.as_str()))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("server.base_url cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, segments: &[&str], what: &'static str) -> Result<T> {
        let response = self.send(self.http.get(self.endpoint(segments)?))?;
        response.json().context(what)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request
            .send()
            .map_err(|error| connection_error(self.base_url.as_str(), error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }
}

impl ParametresBackend for Client {
    fn fetch_parametres(&mut self) -> Result<Parametres> {
        Client::fetch_parametres(self)
    }

    fn append_value(&mut self, kind: ReferenceListKind, value: &str) -> Result<()> {
        Client::append_value(self, kind, value)
    }

    fn delete_value(&mut self, kind: ReferenceListKind, index: usize) -> Result<()> {
        Client::delete_value(self, kind, index)
    }

    fn replace_values(&mut self, kind: ReferenceListKind, values: &[String]) -> Result<()> {
        Client::replace_values(self, kind, values)
    }

    fn transfer_portfolio(&mut self, request: &TransferRequest) -> Result<TransferOutcome> {
        Client::transfer_portfolio(self, request)
    }

    fn transfer_history(&mut self) -> Result<Vec<TransferRecord>> {
        Client::transfer_history(self)
    }
}

pub fn validate_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("server.base_url must not be empty");
    }
    let url = Url::parse(trimmed).with_context(|| format!("parse server.base_url {trimmed:?}"))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        bail!(
            "server.base_url must be an http(s) URL -- got {:?}",
            url.as_str()
        );
    }
    Ok(url)
}

fn read_download(response: Response, fallback_name: &str) -> Result<Download> {
    let headers = response.headers();
    let file_name = headers
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(file_name_from_disposition)
        .unwrap_or_else(|| fallback_name.to_owned());
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_owned();
    let bytes = response.bytes().context("read download body")?.to_vec();
    Ok(Download {
        file_name,
        content_type,
        bytes,
    })
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check that the server is running and server.base_url in the config ({})",
        base_url,
        error
    )
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed
            .message
            .or(parsed.error)
            .filter(|message| !message.trim().is_empty())
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    if !body.trim().is_empty() && body.len() < 100 && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body.trim());
    }

    anyhow!("server returned {}", status.as_u16())
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use time::OffsetDateTime;

use crate::ids::*;

pub const TRANSFER_HISTORY_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReferenceListKind {
    Regions,
    Grades,
    Departements,
    Circonstances,
    Redacteurs,
}

impl ReferenceListKind {
    pub const ALL: [Self; 5] = [
        Self::Regions,
        Self::Grades,
        Self::Departements,
        Self::Circonstances,
        Self::Redacteurs,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regions => "regions",
            Self::Grades => "grades",
            Self::Departements => "departements",
            Self::Circonstances => "circonstances",
            Self::Redacteurs => "redacteurs",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "regions" => Some(Self::Regions),
            "grades" => Some(Self::Grades),
            "departements" => Some(Self::Departements),
            "circonstances" => Some(Self::Circonstances),
            "redacteurs" => Some(Self::Redacteurs),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Regions => "régions",
            Self::Grades => "grades",
            Self::Departements => "départements",
            Self::Circonstances => "circonstances",
            Self::Redacteurs => "rédacteurs",
        }
    }

    // Departements are ordered by the server (by code); every other list
    // keeps the order its users give it.
    pub const fn can_reorder(self) -> bool {
        !matches!(self, Self::Departements)
    }

    pub const fn supports_transfer(self) -> bool {
        matches!(self, Self::Redacteurs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parametres(BTreeMap<String, Value>);

impl Parametres {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, kind: ReferenceListKind, values: &[&str]) -> Self {
        self.set_values(
            kind,
            values.iter().map(|value| (*value).to_owned()).collect(),
        );
        self
    }

    pub fn values(&self, kind: ReferenceListKind) -> Vec<String> {
        self.0
            .get(kind.as_str())
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_values(&mut self, kind: ReferenceListKind, values: Vec<String>) {
        self.0.insert(
            kind.as_str().to_owned(),
            Value::Array(values.into_iter().map(Value::String).collect()),
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub numero: String,
    pub rue: String,
    pub code_postal: String,
    pub ville: String,
}

impl Address {
    pub fn one_line(&self) -> String {
        let street = [self.numero.trim(), self.rue.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let city = [self.code_postal.trim(), self.ville.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        match (street.is_empty(), city.is_empty()) {
            (false, false) => format!("{street}, {city}"),
            (false, true) => street,
            (true, _) => city,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lawyer {
    pub id: LawyerId,
    #[serde(default)]
    pub nom: String,
    #[serde(default)]
    pub prenom: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub cabinet: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub telephone_public_1: String,
    #[serde(default)]
    pub telephone_public_2: String,
    #[serde(default)]
    pub telephone_prive: String,
    #[serde(default)]
    pub siret_ou_rcs: String,
    #[serde(default)]
    pub adresse: Address,
    #[serde(default)]
    pub villes_intervention: Vec<String>,
    #[serde(default)]
    pub conventionne: bool,
}

impl Lawyer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.prenom.trim(), self.nom.trim())
            .trim()
            .to_owned()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawyerInput {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub cabinet: String,
    pub region: String,
    pub telephone_public_1: String,
    pub telephone_public_2: String,
    pub telephone_prive: String,
    pub siret_ou_rcs: String,
    pub adresse: Address,
    pub villes_intervention: Vec<String>,
    pub conventionne: bool,
}

impl LawyerInput {
    pub fn into_lawyer(self, id: LawyerId) -> Lawyer {
        Lawyer {
            id,
            nom: self.nom,
            prenom: self.prenom,
            email: self.email,
            cabinet: self.cabinet,
            region: self.region,
            telephone_public_1: self.telephone_public_1,
            telephone_public_2: self.telephone_public_2,
            telephone_prive: self.telephone_prive,
            siret_ou_rcs: self.siret_ou_rcs,
            adresse: self.adresse,
            villes_intervention: self.villes_intervention,
            conventionne: self.conventionne,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LawyerSuggestions {
    pub cabinets: Vec<String>,
    pub villes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub source_redacteur: String,
    pub target_redacteur: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub affaires_modifiees: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Succes,
    Echec,
}

impl TransferStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Succes => "succes",
            Self::Echec => "echec",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Succes => "ok",
            Self::Echec => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub source_redacteur: String,
    pub target_redacteur: String,
    #[serde(default)]
    pub affaires_modifiees: u64,
    pub statut: TransferStatus,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub custom: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl TemplateInfo {
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    Pdf,
    Odt,
    Docx,
}

impl DocumentFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Odt => "odt",
            Self::Docx => "docx",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "odt" => Some(Self::Odt),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Odt => "application/vnd.oasis.opendocument.text",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabKind {
    Lawyers,
    Settings,
    Templates,
}

impl TabKind {
    pub const ALL: [Self; 3] = [Self::Lawyers, Self::Settings, Self::Templates];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Lawyers => "avocats",
            Self::Settings => "paramètres",
            Self::Templates => "modèles",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lawyers => "lawyers",
            Self::Settings => "settings",
            Self::Templates => "templates",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "lawyers" => Some(Self::Lawyers),
            "settings" => Some(Self::Settings),
            "templates" => Some(Self::Templates),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    Nav,
    Search,
    Input,
    Form,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "↑",
            Self::Desc => "↓",
        }
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Address, Lawyer, LawyerInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LawyerField {
    Nom,
    Prenom,
    Email,
    Cabinet,
    Region,
    TelephonePublic1,
    TelephonePublic2,
    TelephonePrive,
    SiretOuRcs,
    Numero,
    Rue,
    CodePostal,
    Ville,
    VillesIntervention,
    Conventionne,
}

impl LawyerField {
    pub const ALL: [Self; 15] = [
        Self::Nom,
        Self::Prenom,
        Self::Email,
        Self::Cabinet,
        Self::Region,
        Self::TelephonePublic1,
        Self::TelephonePublic2,
        Self::TelephonePrive,
        Self::SiretOuRcs,
        Self::Numero,
        Self::Rue,
        Self::CodePostal,
        Self::Ville,
        Self::VillesIntervention,
        Self::Conventionne,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Nom => "nom",
            Self::Prenom => "prénom",
            Self::Email => "email",
            Self::Cabinet => "cabinet",
            Self::Region => "région",
            Self::TelephonePublic1 => "téléphone public 1",
            Self::TelephonePublic2 => "téléphone public 2",
            Self::TelephonePrive => "téléphone privé",
            Self::SiretOuRcs => "SIRET / RCS",
            Self::Numero => "numéro",
            Self::Rue => "rue",
            Self::CodePostal => "code postal",
            Self::Ville => "ville",
            Self::VillesIntervention => "villes d'intervention",
            Self::Conventionne => "conventionné",
        }
    }

    pub const fn is_flag(self) -> bool {
        matches!(self, Self::Conventionne)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: LawyerField,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    errors: Vec<FieldError>,
}

impl FormErrors {
    fn push(&mut self, field: LawyerField, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn for_field(&self, field: LawyerField) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|error| format!("{}: {}", error.field.label(), error.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for FormErrors {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LawyerFormInput {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub cabinet: String,
    pub region: String,
    pub telephone_public_1: String,
    pub telephone_public_2: String,
    pub telephone_prive: String,
    pub siret_ou_rcs: String,
    pub numero: String,
    pub rue: String,
    pub code_postal: String,
    pub ville: String,
    pub villes_intervention: String,
    pub conventionne: bool,
}

impl LawyerFormInput {
    pub fn from_lawyer(lawyer: &Lawyer) -> Self {
        Self {
            nom: lawyer.nom.clone(),
            prenom: lawyer.prenom.clone(),
            email: lawyer.email.clone(),
            cabinet: lawyer.cabinet.clone(),
            region: lawyer.region.clone(),
            telephone_public_1: lawyer.telephone_public_1.clone(),
            telephone_public_2: lawyer.telephone_public_2.clone(),
            telephone_prive: lawyer.telephone_prive.clone(),
            siret_ou_rcs: lawyer.siret_ou_rcs.clone(),
            numero: lawyer.adresse.numero.clone(),
            rue: lawyer.adresse.rue.clone(),
            code_postal: lawyer.adresse.code_postal.clone(),
            ville: lawyer.adresse.ville.clone(),
            villes_intervention: lawyer.villes_intervention.join(", "),
            conventionne: lawyer.conventionne,
        }
    }

    pub fn text(&self, field: LawyerField) -> &str {
        match field {
            LawyerField::Nom => &self.nom,
            LawyerField::Prenom => &self.prenom,
            LawyerField::Email => &self.email,
            LawyerField::Cabinet => &self.cabinet,
            LawyerField::Region => &self.region,
            LawyerField::TelephonePublic1 => &self.telephone_public_1,
            LawyerField::TelephonePublic2 => &self.telephone_public_2,
            LawyerField::TelephonePrive => &self.telephone_prive,
            LawyerField::SiretOuRcs => &self.siret_ou_rcs,
            LawyerField::Numero => &self.numero,
            LawyerField::Rue => &self.rue,
            LawyerField::CodePostal => &self.code_postal,
            LawyerField::Ville => &self.ville,
            LawyerField::VillesIntervention => &self.villes_intervention,
            LawyerField::Conventionne => {
                if self.conventionne {
                    "oui"
                } else {
                    "non"
                }
            }
        }
    }

    pub fn text_mut(&mut self, field: LawyerField) -> Option<&mut String> {
        match field {
            LawyerField::Nom => Some(&mut self.nom),
            LawyerField::Prenom => Some(&mut self.prenom),
            LawyerField::Email => Some(&mut self.email),
            LawyerField::Cabinet => Some(&mut self.cabinet),
            LawyerField::Region => Some(&mut self.region),
            LawyerField::TelephonePublic1 => Some(&mut self.telephone_public_1),
            LawyerField::TelephonePublic2 => Some(&mut self.telephone_public_2),
            LawyerField::TelephonePrive => Some(&mut self.telephone_prive),
            LawyerField::SiretOuRcs => Some(&mut self.siret_ou_rcs),
            LawyerField::Numero => Some(&mut self.numero),
            LawyerField::Rue => Some(&mut self.rue),
            LawyerField::CodePostal => Some(&mut self.code_postal),
            LawyerField::Ville => Some(&mut self.ville),
            LawyerField::VillesIntervention => Some(&mut self.villes_intervention),
            LawyerField::Conventionne => None,
        }
    }

    pub fn validate(&self) -> Result<LawyerInput, FormErrors> {
        let mut errors = FormErrors::default();

        if self.nom.trim().is_empty() {
            errors.push(LawyerField::Nom, "required");
        }
        if self.prenom.trim().is_empty() {
            errors.push(LawyerField::Prenom, "required");
        }
        if !self.email.trim().is_empty() && !is_valid_email(self.email.trim()) {
            errors.push(LawyerField::Email, "expected an address like nom@cabinet.fr");
        }
        for (field, value) in [
            (LawyerField::TelephonePublic1, &self.telephone_public_1),
            (LawyerField::TelephonePublic2, &self.telephone_public_2),
            (LawyerField::TelephonePrive, &self.telephone_prive),
        ] {
            if !value.trim().is_empty() && !is_valid_phone(value) {
                errors.push(field, "expected 10 digits starting with 0, or +33 and 9 digits");
            }
        }
        if !self.siret_ou_rcs.trim().is_empty() && !is_valid_siret_or_siren(&self.siret_ou_rcs) {
            errors.push(
                LawyerField::SiretOuRcs,
                "expected a 14-digit SIRET or a 9-digit SIREN",
            );
        }
        let code_postal = self.code_postal.trim();
        if !code_postal.is_empty()
            && !(code_postal.len() == 5 && code_postal.chars().all(|ch| ch.is_ascii_digit()))
        {
            errors.push(LawyerField::CodePostal, "expected 5 digits");
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(LawyerInput {
            nom: self.nom.trim().to_owned(),
            prenom: self.prenom.trim().to_owned(),
            email: self.email.trim().to_owned(),
            cabinet: self.cabinet.trim().to_owned(),
            region: self.region.trim().to_owned(),
            telephone_public_1: self.telephone_public_1.trim().to_owned(),
            telephone_public_2: self.telephone_public_2.trim().to_owned(),
            telephone_prive: self.telephone_prive.trim().to_owned(),
            siret_ou_rcs: self.siret_ou_rcs.trim().to_owned(),
            adresse: Address {
                numero: self.numero.trim().to_owned(),
                rue: self.rue.trim().to_owned(),
                code_postal: code_postal.to_owned(),
                ville: self.ville.trim().to_owned(),
            },
            villes_intervention: parse_city_list(&self.villes_intervention),
            conventionne: self.conventionne,
        })
    }
}

pub fn parse_city_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|city| !city.is_empty())
        .map(str::to_owned)
        .collect()
}

pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((name, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !name.is_empty() && tld.len() >= 2
}

pub fn is_valid_phone(value: &str) -> bool {
    let compact = value
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '.' | '-'))
        .collect::<String>();
    if let Some(rest) = compact.strip_prefix("+33") {
        return rest.len() == 9 && rest.chars().all(|ch| ch.is_ascii_digit());
    }
    compact.len() == 10 && compact.starts_with('0') && compact.chars().all(|ch| ch.is_ascii_digit())
}

pub fn is_valid_siret_or_siren(value: &str) -> bool {
    let compact = value
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<String>();
    matches!(compact.len(), 9 | 14) && compact.chars().all(|ch| ch.is_ascii_digit())
}

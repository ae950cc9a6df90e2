// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod backend;
mod mock;

pub use backend::{BackendCall, InMemoryParametres, Operation};
pub use mock::{MockResponse, MockServer, RecordedRequest};

use anyhow::{Context, Result};
use greffe_app::{Address, Lawyer, LawyerId, Parametres, ReferenceListKind};
use time::OffsetDateTime;
use time::macros::datetime;

const NOMS: [&str; 16] = [
    "Bernard", "Dubois", "Durand", "Faure", "Fournier", "Girard", "Lambert", "Lefebvre", "Leroy",
    "Martin", "Mercier", "Moreau", "Petit", "Richard", "Roux", "Vincent",
];

const PRENOMS: [&str; 14] = [
    "Alice", "Antoine", "Camille", "Claire", "Élise", "Hugo", "Julien", "Léa", "Louis", "Manon",
    "Nicolas", "Paul", "Sarah", "Thomas",
];

const REGIONS: [&str; 6] = [
    "Bretagne",
    "Normandie",
    "Occitanie",
    "Île-de-France",
    "Nouvelle-Aquitaine",
    "Auvergne-Rhône-Alpes",
];

const VILLES: [&str; 12] = [
    "Brest", "Rennes", "Caen", "Rouen", "Toulouse", "Montpellier", "Paris", "Versailles",
    "Bordeaux", "Limoges", "Lyon", "Grenoble",
];

const CABINET_SUFFIXES: [&str; 4] = ["Avocats", "& Associés", "Conseil", "Juris"];

const RUES: [&str; 8] = [
    "rue de la République",
    "boulevard Victor Hugo",
    "place du Palais",
    "rue des Lices",
    "quai de la Fosse",
    "avenue Jean Jaurès",
    "rue Nationale",
    "cours Gambetta",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

#[derive(Debug, Clone)]
pub struct LawyerFaker {
    rng: DeterministicRng,
    next_id: i64,
}

impl LawyerFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    pub fn lawyer(&mut self) -> Lawyer {
        let id = LawyerId::new(self.next_id);
        self.next_id += 1;

        let nom = self.pick(&NOMS);
        let prenom = self.pick(&PRENOMS);
        let region_index = self.rng.int_n(REGIONS.len());
        // Two cities per region, in the same order as REGIONS.
        let home = VILLES[region_index * 2 + self.rng.int_n(2)];
        let mut villes = vec![home.to_owned()];
        let extra = self.pick(&VILLES);
        if extra != home {
            villes.push(extra.to_owned());
        }

        Lawyer {
            id,
            nom: nom.to_owned(),
            prenom: prenom.to_owned(),
            email: format!(
                "{}.{}@barreau.example",
                ascii_slug(prenom),
                ascii_slug(nom)
            ),
            cabinet: format!("{nom} {}", self.pick(&CABINET_SUFFIXES)),
            region: REGIONS[region_index].to_owned(),
            telephone_public_1: format!("0{}{:08}", self.rng.int_n(5) + 1, self.digits(8)),
            telephone_public_2: String::new(),
            telephone_prive: if self.rng.bool() {
                format!("06{:08}", self.digits(8))
            } else {
                String::new()
            },
            siret_ou_rcs: format!("{:014}", self.digits(14)),
            adresse: Address {
                numero: (self.rng.int_n(120) + 1).to_string(),
                rue: self.pick(&RUES).to_owned(),
                code_postal: format!("{:05}", 10_000 + self.digits(5) % 85_000),
                ville: home.to_owned(),
            },
            villes_intervention: villes,
            conventionne: self.rng.bool(),
        }
    }

    pub fn lawyers(&mut self, count: usize) -> Vec<Lawyer> {
        (0..count).map(|_| self.lawyer()).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn digits(&mut self, width: u32) -> u64 {
        self.rng.next_u64() % 10_u64.pow(width)
    }
}

fn ascii_slug(value: &str) -> String {
    value
        .chars()
        .map(|ch| match ch {
            'É' | 'é' | 'è' | 'ê' => 'e',
            'Î' | 'î' => 'i',
            other => other.to_ascii_lowercase(),
        })
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

pub fn sample_parametres() -> Parametres {
    Parametres::new()
        .with_list(
            ReferenceListKind::Regions,
            &["Bretagne", "Normandie", "Occitanie"],
        )
        .with_list(
            ReferenceListKind::Grades,
            &["Brigadier", "Maréchal des logis", "Adjudant"],
        )
        .with_list(
            ReferenceListKind::Departements,
            &["29 - Finistère", "35 - Ille-et-Vilaine", "56 - Morbihan"],
        )
        .with_list(
            ReferenceListKind::Circonstances,
            &["En service", "Hors service", "Trajet"],
        )
        .with_list(
            ReferenceListKind::Redacteurs,
            &["Dupont", "Leroy", "Moreau"],
        )
}

pub fn sample_lawyers() -> Vec<Lawyer> {
    vec![
        lawyer(1, "Bernard", "Alice")
            .region("Bretagne")
            .cabinet("Cabinet Armor")
            .villes(&["Rennes", "Saint-Martin-de-Ré"])
            .conventionne(true)
            .build(),
        lawyer(2, "Durand", "Paul")
            .region("Occitanie")
            .cabinet("Durand & Associés")
            .villes(&["Toulouse"])
            .build(),
        lawyer(3, "Martin", "Claire")
            .region("Bretagne")
            .cabinet("Cabinet Armor")
            .villes(&["Brest"])
            .conventionne(true)
            .build(),
    ]
}

pub fn lawyer(id: i64, nom: &str, prenom: &str) -> LawyerBuilder {
    LawyerBuilder {
        lawyer: Lawyer {
            id: LawyerId::new(id),
            nom: nom.to_owned(),
            prenom: prenom.to_owned(),
            email: String::new(),
            cabinet: String::new(),
            region: String::new(),
            telephone_public_1: String::new(),
            telephone_public_2: String::new(),
            telephone_prive: String::new(),
            siret_ou_rcs: String::new(),
            adresse: Address::default(),
            villes_intervention: Vec::new(),
            conventionne: false,
        },
    }
}

#[derive(Debug, Clone)]
pub struct LawyerBuilder {
    lawyer: Lawyer,
}

impl LawyerBuilder {
    pub fn region(mut self, region: &str) -> Self {
        self.lawyer.region = region.to_owned();
        self
    }

    pub fn cabinet(mut self, cabinet: &str) -> Self {
        self.lawyer.cabinet = cabinet.to_owned();
        self
    }

    pub fn villes(mut self, villes: &[&str]) -> Self {
        self.lawyer.villes_intervention = villes.iter().map(|ville| (*ville).to_owned()).collect();
        self
    }

    pub fn conventionne(mut self, conventionne: bool) -> Self {
        self.lawyer.conventionne = conventionne;
        self
    }

    pub fn email(mut self, email: &str) -> Self {
        self.lawyer.email = email.to_owned();
        self
    }

    pub fn build(self) -> Lawyer {
        self.lawyer
    }
}

pub fn temp_download_dir() -> Result<tempfile::TempDir> {
    tempfile::tempdir().context("create temp download dir")
}

pub fn fixture_datetime() -> OffsetDateTime {
    datetime!(2026-02-19 12:34:56 UTC)
}

#[cfg(test)]
mod tests {
    use super::{LawyerFaker, ascii_slug, sample_lawyers, sample_parametres};
    use greffe_app::{LawyerFormInput, ReferenceListKind};
    use std::collections::BTreeSet;

    #[test]
    fn faker_is_deterministic_per_seed() {
        let left = LawyerFaker::new(42).lawyers(5);
        let right = LawyerFaker::new(42).lawyers(5);
        assert_eq!(left, right);
    }

    #[test]
    fn faker_assigns_sequential_ids() {
        let ids = LawyerFaker::new(7)
            .lawyers(4)
            .into_iter()
            .map(|lawyer| lawyer.id.get())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn faked_lawyers_pass_form_validation() {
        let mut faker = LawyerFaker::new(3);
        for lawyer in faker.lawyers(50) {
            let form = LawyerFormInput::from_lawyer(&lawyer);
            assert!(form.validate().is_ok(), "invalid fake lawyer: {lawyer:?}");
        }
    }

    #[test]
    fn home_city_is_always_an_intervention_city() {
        let mut faker = LawyerFaker::new(11);
        for lawyer in faker.lawyers(30) {
            assert!(
                lawyer
                    .villes_intervention
                    .contains(&lawyer.adresse.ville)
            );
            let unique = lawyer.villes_intervention.iter().collect::<BTreeSet<_>>();
            assert_eq!(unique.len(), lawyer.villes_intervention.len());
        }
    }

    #[test]
    fn slug_drops_accents_and_spaces() {
        assert_eq!(ascii_slug("Élise"), "elise");
        assert_eq!(ascii_slug("Le Roux"), "leroux");
    }

    #[test]
    fn sample_fixtures_cover_every_list() {
        let parametres = sample_parametres();
        for kind in ReferenceListKind::ALL {
            assert!(!parametres.values(kind).is_empty(), "{kind:?} is empty");
        }
        assert_eq!(sample_lawyers().len(), 3);
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use greffe_api::Client;
use greffe_app::{
    DocumentFormat, DossierId, LawyerFormInput, LawyerId, ParametresBackend,
    ReferenceListEditor, ReferenceListKind, TransferRequest, TransferStatus,
};
use greffe_testkit::{MockResponse, MockServer};
use serde_json::json;
use std::time::Duration;

fn client(server: &MockServer) -> Result<Client> {
    Client::new(server.base_url(), Duration::from_secs(2), None)
}

#[test]
fn unreachable_server_error_names_the_config_key() -> Result<()> {
    let client = Client::new("http://127.0.0.1:1", Duration::from_millis(50), None)?;
    let error = client
        .fetch_parametres()
        .expect_err("fetch should fail for an unreachable server");
    let message = error.to_string();
    assert!(message.contains("127.0.0.1:1"));
    assert!(message.contains("server.base_url"));
    Ok(())
}

#[test]
fn list_mutations_use_positional_endpoints() -> Result<()> {
    let server = MockServer::start(vec![
        MockResponse::json(200, &json!({"ok": true})),
        MockResponse::empty(204),
        MockResponse::json(200, &json!({"ok": true})),
    ])?;
    let client = client(&server)?;

    client.append_value(ReferenceListKind::Grades, "Major")?;
    client.delete_value(ReferenceListKind::Grades, 2)?;
    client.replace_values(
        ReferenceListKind::Grades,
        &["Adjudant".to_owned(), "Brigadier".to_owned()],
    )?;

    let requests = server.finish()?;
    assert_eq!(requests.len(), 3);

    assert_eq!(requests[0].method, "PUT");
    assert_eq!(requests[0].url, "/parametres/grades");
    assert_eq!(requests[0].body_json()?, json!({"valeur": "Major"}));

    assert_eq!(requests[1].method, "DELETE");
    assert_eq!(requests[1].url, "/parametres/grades/2");

    assert_eq!(requests[2].method, "POST");
    assert_eq!(requests[2].url, "/parametres/grades");
    assert_eq!(
        requests[2].body_json()?,
        json!({"valeurs": ["Adjudant", "Brigadier"]})
    );
    Ok(())
}

#[test]
fn editor_drives_the_http_backend() -> Result<()> {
    let before = json!({"regions": ["Bretagne", "Normandie"], "grades": []});
    let after = json!({"regions": ["Bretagne", "Corse", "Normandie"], "grades": []});
    let server = MockServer::start(vec![
        MockResponse::json(200, &before),
        MockResponse::json(200, &json!({"ok": true})),
        MockResponse::json(200, &after),
    ])?;
    let mut client = client(&server)?;
    let mut editor = ReferenceListEditor::new(ReferenceListKind::Regions);

    editor.load(&mut client);
    editor.add(&mut client, "Corse");
    assert_eq!(editor.items(), ["Bretagne", "Corse", "Normandie"]);

    let requests = server.finish()?;
    let calls = requests
        .iter()
        .map(|request| format!("{} {}", request.method, request.url))
        .collect::<Vec<_>>();
    assert_eq!(
        calls,
        vec![
            "GET /parametres",
            "PUT /parametres/regions",
            "GET /parametres"
        ]
    );
    Ok(())
}

#[test]
fn server_error_body_is_surfaced() -> Result<()> {
    let server = MockServer::start(vec![MockResponse::json(
        409,
        &json!({"message": "Cette valeur existe déjà"}),
    )])?;
    let client = client(&server)?;

    let error = client
        .append_value(ReferenceListKind::Regions, "Bretagne")
        .expect_err("append should fail");
    assert_eq!(
        error.to_string(),
        "server error (409): Cette valeur existe déjà"
    );
    server.finish()?;
    Ok(())
}

#[test]
fn transfer_and_history() -> Result<()> {
    let server = MockServer::start(vec![
        MockResponse::json(200, &json!({"affairesModifiees": 5})),
        MockResponse::json(
            200,
            &json!([{
                "date": "2026-03-02T10:15:00Z",
                "sourceRedacteur": "Dupont",
                "targetRedacteur": "Leroy",
                "affairesModifiees": 5,
                "statut": "succes"
            }]),
        ),
    ])?;
    let mut client = client(&server)?;

    let outcome = ParametresBackend::transfer_portfolio(
        &mut client,
        &TransferRequest {
            source_redacteur: "Dupont".to_owned(),
            target_redacteur: "Leroy".to_owned(),
        },
    )?;
    assert_eq!(outcome.affaires_modifiees, 5);

    let history = client.transfer_history()?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].statut, TransferStatus::Succes);

    let requests = server.finish()?;
    assert_eq!(requests[0].url, "/parametres/transfert-portefeuille");
    assert_eq!(
        requests[0].body_json()?,
        json!({"sourceRedacteur": "Dupont", "targetRedacteur": "Leroy"})
    );
    assert_eq!(requests[1].url, "/parametres/historique-transferts");
    Ok(())
}

#[test]
fn lawyer_crud_and_suggestions() -> Result<()> {
    let saved = json!({
        "id": 12,
        "nom": "Martin",
        "prenom": "Claire",
        "villesIntervention": ["Brest"],
        "conventionne": true
    });
    let server = MockServer::start(vec![
        MockResponse::json(200, &json!([saved.clone()])),
        MockResponse::json(201, &saved),
        MockResponse::json(200, &saved),
        MockResponse::empty(204),
        MockResponse::json(200, &json!(["Cabinet Armor"])),
        MockResponse::json(200, &json!(["Brest", "Rennes"])),
    ])?;
    let client = client(&server)?;

    let lawyers = client.list_lawyers()?;
    assert_eq!(lawyers[0].id, LawyerId::new(12));

    let input = LawyerFormInput {
        nom: "Martin".to_owned(),
        prenom: "Claire".to_owned(),
        villes_intervention: "Brest".to_owned(),
        conventionne: true,
        ..LawyerFormInput::default()
    }
    .validate()?;
    let created = client.create_lawyer(&input)?;
    assert_eq!(created.full_name(), "Claire Martin");
    client.update_lawyer(created.id, &input)?;
    client.delete_lawyer(created.id)?;

    let suggestions = client.suggestions()?;
    assert_eq!(suggestions.cabinets, vec!["Cabinet Armor".to_owned()]);
    assert_eq!(suggestions.villes.len(), 2);

    let requests = server.finish()?;
    let calls = requests
        .iter()
        .map(|request| format!("{} {}", request.method, request.url))
        .collect::<Vec<_>>();
    assert_eq!(
        calls,
        vec![
            "GET /avocats",
            "POST /avocats",
            "PUT /avocats/12",
            "DELETE /avocats/12",
            "GET /avocats/utils/cabinets",
            "GET /avocats/utils/villes",
        ]
    );
    let body = requests[1].body_json()?;
    assert_eq!(body["villesIntervention"], json!(["Brest"]));
    assert_eq!(body["telephonePublic1"], json!(""));
    Ok(())
}

#[test]
fn templates_download_upload_restore() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let upload = dir.path().join("convocation.odt");
    std::fs::write(&upload, b"odt-bytes")?;

    let server = MockServer::start(vec![
        MockResponse::json(
            200,
            &json!([{"name": "convocation", "label": "Convocation", "custom": true}]),
        ),
        MockResponse::bytes(200, "application/vnd.oasis.opendocument.text", b"ODT")
            .with_header("Content-Disposition", r#"attachment; filename="convocation.odt""#),
        MockResponse::json(200, &json!({"ok": true})),
        MockResponse::empty(204),
    ])?;
    let client = client(&server)?;

    let templates = client.list_templates()?;
    assert_eq!(templates[0].display_label(), "Convocation");
    assert!(templates[0].updated_at.is_none());

    let download = client.download_template("convocation")?;
    assert_eq!(download.file_name, "convocation.odt");
    assert_eq!(download.bytes, b"ODT");
    let saved = download.save_into(dir.path())?;
    assert_eq!(std::fs::read(saved)?, b"ODT");

    client.upload_template("convocation", &upload)?;
    client.restore_template("convocation")?;

    let requests = server.finish()?;
    assert_eq!(requests[1].url, "/templates/convocation/download");
    assert_eq!(requests[2].method, "POST");
    assert_eq!(requests[2].url, "/templates/convocation/upload");
    let content_type = requests[2].header("content-type").unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = requests[2].body_text();
    assert!(body.contains(r#"name="template""#));
    assert!(body.contains("odt-bytes"));
    assert_eq!(requests[3].method, "DELETE");
    assert_eq!(requests[3].url, "/templates/convocation");
    Ok(())
}

#[test]
fn generated_document_uses_format_query_and_fallback_name() -> Result<()> {
    let server = MockServer::start(vec![MockResponse::bytes(
        200,
        "application/pdf",
        b"%PDF-1.7",
    )])?;
    let client = client(&server)?;

    let document =
        client.generate_document(DossierId::new(481), "convocation", DocumentFormat::Pdf)?;
    assert_eq!(document.file_name, "convocation.pdf");
    assert_eq!(document.content_type, "application/pdf");

    let requests = server.finish()?;
    assert_eq!(requests[0].url, "/documents/481/convocation?format=pdf");
    Ok(())
}

#[test]
fn bearer_token_is_sent_when_configured() -> Result<()> {
    let server = MockServer::start(vec![MockResponse::json(200, &json!({}))])?;
    let client = Client::new(server.base_url(), Duration::from_secs(2), Some("s3cret"))?;

    let parametres = client.fetch_parametres()?;
    assert!(parametres.values(ReferenceListKind::Regions).is_empty());

    let requests = server.finish()?;
    assert_eq!(requests[0].header("authorization"), Some("Bearer s3cret"));
    Ok(())
}

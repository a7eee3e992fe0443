mod support;

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use serde_json::{Value, json};
use slackvault_config::TrashMode;
use slackvault_core::{HttpTransport, Persister};
use slackvault_store::LocalVault;
use slackvault_test_support::fixtures::{
    sample_result_with_refs, temp_vault, write_vault_settings,
};
use support::{COOKIE, Event, Journal, RecordingNotifier};

async fn pipeline(root: &std::path::Path, journal: &Journal) -> anyhow::Result<Persister> {
    let vault = LocalVault::open(root, TrashMode::Local).await?;
    let transport = HttpTransport::new(Duration::from_secs(5), "slackvault-tests")?;
    Ok(Persister::new(
        Arc::new(vault),
        Arc::new(transport),
        Arc::new(RecordingNotifier::new(journal.clone())),
    ))
}

#[tokio::test]
async fn saves_record_and_attachment_into_a_real_vault() -> anyhow::Result<()> {
    let dir = temp_vault()?;
    write_vault_settings(dir.path(), &json!({"attachmentFolderPath": "att"}))?;

    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/files/img.png")
            .header("cookie", format!("d={COOKIE}"));
        then.status(200).body(b"PNGDATA");
    });

    let journal = Journal::default();
    let persister = pipeline(dir.path(), &journal).await?;
    let url = server.url("/files/img.png");
    let report = persister
        .process_json(
            COOKIE,
            sample_result_with_refs("msg1.json", &[("img.png", url.as_str())]),
        )
        .await;

    mock.assert();
    assert!(report.is_success());
    assert_eq!(fs::read(dir.path().join("att/img.png"))?, b"PNGDATA");

    let record: Value = serde_json::from_str(&fs::read_to_string(dir.path().join("att/msg1.json"))?)?;
    assert_eq!(record["file_name"], "msg1.json");
    assert_eq!(record["users"]["kind"], "map");
    assert!(record.get("attachment_refs").is_none());
    assert!(
        journal
            .events()
            .contains(&Event::Clipboard("msg1.json".into()))
    );
    Ok(())
}

#[tokio::test]
async fn repeated_download_moves_previous_copy_to_vault_trash() -> anyhow::Result<()> {
    let dir = temp_vault()?;
    write_vault_settings(dir.path(), &json!({"attachmentFolderPath": "att"}))?;
    fs::create_dir_all(dir.path().join("att"))?;
    fs::write(dir.path().join("att/msg1.json"), "previous download")?;

    let journal = Journal::default();
    let persister = pipeline(dir.path(), &journal).await?;
    let report = persister
        .process_json(COOKIE, sample_result_with_refs("msg1.json", &[]))
        .await;

    assert!(report.is_success());
    assert_eq!(
        fs::read_to_string(dir.path().join(".trash/msg1.json"))?,
        "previous download"
    );
    let current = fs::read_to_string(dir.path().join("att/msg1.json"))?;
    assert!(current.contains("\"file_name\": \"msg1.json\""));
    assert!(current.ends_with("}\n"));
    Ok(())
}

#[tokio::test]
async fn rejected_download_leaves_primary_and_alerts() -> anyhow::Result<()> {
    let dir = temp_vault()?;
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/files/private.png");
        then.status(403);
    });

    let journal = Journal::default();
    let persister = pipeline(dir.path(), &journal).await?;
    let url = server.url("/files/private.png");
    let report = persister
        .process_json(
            COOKIE,
            sample_result_with_refs("msg1.json", &[("private.png", url.as_str())]),
        )
        .await;

    assert!(report.is_partial());
    assert!(dir.path().join("msg1.json").exists());
    assert!(!dir.path().join("private.png").exists());
    let alerts: Vec<Event> = journal
        .events()
        .into_iter()
        .filter(|event| matches!(event, Event::Alert(_)))
        .collect();
    assert_eq!(alerts.len(), 1);
    Ok(())
}

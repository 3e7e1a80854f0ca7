//! End-to-end tests for the message pipeline
//!
//! These tests load real language files from a temporary directory and go
//! through the public API only: store, locale resolution, formatting and
//! delivery.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;

use tokio_test::assert_ok;

use locale_messenger::config::I18nConfig;
use locale_messenger::locale::resolve_language;
use locale_messenger::markup::{NamedColor, TextColor};
use locale_messenger::messenger::{
    BufferedRecipient, FormatTask, MessageError, Messenger, Placeholders, Recipient,
};
use locale_messenger::template::{create_template_store, TemplateSet};

const EN: &str = r#"
prefix: "&8[&bServer&8] "
greeting:
  welcome: "&aWelcome, {player}!"
  farewell: "&7Goodbye, &f%player%&7."
counter: "&e#{n}"
"#;

const IT: &str = r#"
greeting:
  welcome: "&aBenvenuto, {player}!"
counter: "&e#{n}"
"#;

fn write_language(dir: &Path, code: &str, body: &str) {
    fs::write(dir.join(format!("lang_{}.yml", code)), body).unwrap();
}

async fn messenger_with_languages(dir: &Path) -> Messenger {
    write_language(dir, "en", EN);
    write_language(dir, "it", IT);
    let config = I18nConfig {
        language_dir: dir.to_path_buf(),
        seed_default: false,
        ..I18nConfig::default()
    };
    Messenger::start(config).await
}

#[tokio::test]
async fn test_recipient_locale_selects_language() {
    let dir = tempfile::tempdir().unwrap();
    let messenger = messenger_with_languages(dir.path()).await;
    let italian = Arc::new(BufferedRecipient::new("marco", Some("it_IT")));

    let receipt = assert_ok!(
        messenger
            .send(
                italian.clone(),
                "greeting.welcome",
                Placeholders::new().with("{player}", "Marco"),
            )
            .unwrap()
            .wait()
            .await
    );

    assert_eq!(receipt.language, "it");
    let messages = italian.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].plain_text(), "Benvenuto, Marco!");
    assert_eq!(
        messages[0].spans()[0].style.color,
        Some(TextColor::Named(NamedColor::Green))
    );
}

#[tokio::test]
async fn test_unloaded_locale_falls_back_to_active() {
    let dir = tempfile::tempdir().unwrap();
    let messenger = messenger_with_languages(dir.path()).await;
    assert!(messenger.set_active_language("it"));

    let german = Arc::new(BufferedRecipient::new("hans", Some("de_DE")));
    messenger
        .send_flat(german.clone(), "greeting.welcome", ["player", "Hans"])
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(german.texts(), vec!["Benvenuto, Hans!"]);
}

#[tokio::test]
async fn test_key_missing_in_resolved_language_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let messenger = messenger_with_languages(dir.path()).await;
    let italian = Arc::new(BufferedRecipient::new("marco", Some("it")));

    // Present in en, absent in it: no cross-language fallback
    let receipt = messenger
        .send(italian.clone(), "greeting.farewell", Placeholders::new())
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert!(receipt.missing_key);
    assert_eq!(italian.texts(), vec!["Missing key: greeting.farewell"]);
}

#[tokio::test]
async fn test_set_active_rejects_unloaded_language() {
    let dir = tempfile::tempdir().unwrap();
    let messenger = messenger_with_languages(dir.path()).await;

    assert!(!messenger.set_active_language("de"));
    assert_eq!(messenger.store().active_language(), "en");
}

#[tokio::test]
async fn test_odd_flat_placeholders_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let messenger = messenger_with_languages(dir.path()).await;
    let recipient = Arc::new(BufferedRecipient::new("steve", None));

    let result = messenger.send_flat(recipient.clone(), "greeting.welcome", ["a", "1", "b"]);
    assert!(matches!(
        result,
        Err(MessageError::OddPlaceholderCount { count: 3 })
    ));

    messenger.shutdown().await;
    assert!(recipient.texts().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_per_recipient_order_is_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let messenger = messenger_with_languages(dir.path()).await;
    let steve = Arc::new(BufferedRecipient::new("steve", Some("en_US")));
    let marco = Arc::new(BufferedRecipient::new("marco", Some("it_IT")));

    let mut tasks = Vec::new();
    for n in 0..100 {
        for recipient in [&steve, &marco] {
            let task = messenger
                .send(
                    recipient.clone() as Arc<dyn Recipient>,
                    "counter",
                    Placeholders::new().with("n", n),
                )
                .unwrap();
            tasks.push(task);
        }
    }

    let receipts = FormatTask::join_all(tasks).await;
    assert!(receipts.iter().all(Result::is_ok));

    let expected: Vec<String> = (0..100).map(|n| format!("#{}", n)).collect();
    assert_eq!(steve.texts(), expected);
    assert_eq!(marco.texts(), expected);

    let stats = messenger.shutdown().await.unwrap();
    assert_eq!(stats.total_delivered, 200);
    assert_eq!(stats.total_skipped, 0);
}

#[tokio::test]
async fn test_shutdown_twice_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let messenger = messenger_with_languages(dir.path()).await;

    assert!(messenger.shutdown().await.is_some());
    assert!(messenger.shutdown().await.is_none());
    assert!(messenger.dispatcher_stats().is_none());
}

#[tokio::test]
async fn test_start_seeds_bundled_default_language() {
    let dir = tempfile::tempdir().unwrap();
    let config = I18nConfig {
        language_dir: dir.path().join("languages"),
        ..I18nConfig::default()
    };
    let messenger = Messenger::start(config).await;

    assert!(dir.path().join("languages").join("lang_en.yml").exists());
    assert!(messenger.store().has_language("en"));
    assert!(messenger.store().lookup("en", "greeting.welcome").is_some());
}

#[tokio::test]
async fn test_reload_skips_broken_file() {
    let dir = tempfile::tempdir().unwrap();
    let messenger = messenger_with_languages(dir.path()).await;
    write_language(dir.path(), "fr", "greeting: [unclosed");

    let report = messenger.reload().await.unwrap();

    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].file.contains("lang_fr"));
    assert!(!messenger.store().has_language("fr"));
    assert!(messenger.store().has_language("it"));
}

#[test]
fn test_concurrent_installs_do_not_disturb_readers() {
    let store = create_template_store("en");
    store.install(
        "es",
        [("greeting", "Hola")].into_iter().collect::<TemplateSet>(),
    );

    let writers: Vec<_> = ["en", "it"]
        .into_iter()
        .map(|code| {
            let store = store.clone();
            thread::spawn(move || {
                for round in 0..50 {
                    let value = format!("{}-{}", code, round);
                    store.install(
                        code,
                        [("greeting", value.as_str())]
                            .into_iter()
                            .collect::<TemplateSet>(),
                    );
                }
            })
        })
        .collect();

    let reader = {
        let store = store.clone();
        thread::spawn(move || {
            for _ in 0..500 {
                assert_eq!(store.lookup("es", "greeting").as_deref(), Some("Hola"));
            }
        })
    };

    for writer in writers {
        writer.join().unwrap();
    }
    reader.join().unwrap();

    assert_eq!(store.lookup("en", "greeting").as_deref(), Some("en-49"));
    assert_eq!(store.lookup("it", "greeting").as_deref(), Some("it-49"));
    assert_eq!(resolve_language(Some("it_IT"), &store).unwrap(), "it");
}

#[test]
fn test_concurrent_directory_loads_keep_third_language_intact() {
    let english_dir = tempfile::tempdir().unwrap();
    let italian_dir = tempfile::tempdir().unwrap();
    write_language(english_dir.path(), "en", EN);
    write_language(italian_dir.path(), "it", IT);

    let store = create_template_store("en");
    store.install(
        "es",
        [("greeting.welcome", "Hola, {player}!")]
            .into_iter()
            .collect::<TemplateSet>(),
    );

    // Both scans seed the default language; the Italian directory has no en file
    let barrier = Arc::new(Barrier::new(3));
    let loaders: Vec<_> = [english_dir.path().to_path_buf(), italian_dir.path().to_path_buf()]
        .into_iter()
        .map(|dir| {
            let store = store.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..20 {
                    let report = store.load_dir(&dir, true).unwrap();
                    assert!(report.is_clean());
                }
            })
        })
        .collect();

    let reader = {
        let store = store.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
            barrier.wait();
            for _ in 0..1000 {
                assert_eq!(
                    store.lookup("es", "greeting.welcome").as_deref(),
                    Some("Hola, {player}!")
                );
            }
        })
    };

    for loader in loaders {
        loader.join().unwrap();
    }
    reader.join().unwrap();

    assert!(italian_dir.path().join("lang_en.yml").exists());
    assert_eq!(
        store.lookup("it", "greeting.welcome").as_deref(),
        Some("&aBenvenuto, {player}!")
    );
    assert!(store.lookup("en", "greeting.welcome").is_some());
    assert_eq!(
        resolve_language(Some("es_MX"), &store).unwrap(),
        "es"
    );
}

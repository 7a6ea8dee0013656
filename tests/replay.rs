//! End-to-end handshake and pipeline tests, replayed from fixtures.
//!
//! Every test here runs with zero network access: the fixture file stands
//! in for the remote service, exercising the same pipeline code path that
//! live traffic takes (body encryption, URL building, envelope parsing).

use std::{env, fs, path::PathBuf};

use serde_json::json;

use pandora_api::{
    client::Pandora,
    config::{Config, Credentials, Partner},
    crypt,
    error::Error,
    transport::Mode,
    util,
};

const ENCRYPT_KEY: &str = "outbound-test-key";
const DECRYPT_KEY: &str = "inbound-test-key";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn partner() -> Partner {
    Partner::from_toml(&format!(
        r#"
            username = "android"
            password = "partner-password"
            device_model = "android-generic"
            version = "5"
            encrypt_key = "{ENCRYPT_KEY}"
            decrypt_key = "{DECRYPT_KEY}"
        "#
    ))
    .unwrap()
}

fn replay_config(fixture_file: &PathBuf) -> Config {
    let mut config = Config::new(partner()).unwrap();
    config.mode = Mode::Replay;
    config.fixture_file = fixture_file.clone();
    config
}

fn write_fixtures(name: &str, fixtures: &serde_json::Value) -> PathBuf {
    let path = env::temp_dir().join(format!(
        "pandora-api-replay-{}-{name}.json",
        std::process::id()
    ));
    fs::write(&path, fixtures.to_string()).unwrap();
    path
}

/// Builds an `auth.partnerLogin` envelope whose encrypted `syncTime` puts
/// the server clock `offset` seconds ahead of ours.
fn partner_login_envelope(offset: u64) -> serde_json::Value {
    let server_time = util::now_from_epoch() + offset;
    // 4 junk bytes, then the epoch seconds in ASCII, as the service sends.
    let mut plaintext = vec![0xDE, 0xAD, 0xBE, 0xEF];
    plaintext.extend(server_time.to_string().into_bytes());
    let sync_time = crypt::encrypt(DECRYPT_KEY.as_bytes(), &plaintext).unwrap();

    json!({
        "stat": "ok",
        "result": {
            "syncTime": sync_time,
            "partnerId": "42",
            "partnerAuthToken": "PAT-token"
        }
    })
}

fn user_login_envelope() -> serde_json::Value {
    json!({
        "stat": "ok",
        "result": {
            "userId": "10001",
            "userAuthToken": "UAT-token"
        }
    })
}

#[tokio::test]
async fn partner_handshake_negotiates_clock_offset() {
    init_logging();
    let path = write_fixtures(
        "partner-offset",
        &json!({ "auth.partnerLogin": partner_login_envelope(7200) }),
    );

    let client = Pandora::new(replay_config(&path)).unwrap();
    let partner = client.partner_login().await.unwrap();

    // The fixture put the server clock two hours ahead; allow a few
    // seconds of test wall-clock skew.
    assert!(
        (7195..=7200).contains(&partner.sync_time_offset),
        "offset was {}",
        partner.sync_time_offset
    );
    assert_eq!(partner.partner_id, "42");

    fs::remove_file(path).ok();
}

#[tokio::test]
async fn wrong_credentials_yield_user_login_error() {
    init_logging();
    let path = write_fixtures(
        "bad-credentials",
        &json!({
            "auth.partnerLogin": partner_login_envelope(0),
            "auth.userLogin": {
                "stat": "fail",
                "code": 1002,
                "message": "Invalid username and/or password"
            }
        }),
    );

    let client = Pandora::new(replay_config(&path)).unwrap();
    let e = client
        .login(&Credentials::new("listener@example.com", "wrong"))
        .await
        .unwrap_err();

    assert!(matches!(e, Error::UserLogin { .. }), "got {e}");
    assert_eq!(e.code(), Some(1002));

    fs::remove_file(path).ok();
}

#[tokio::test]
async fn full_login_then_playlist_replays_deterministically() {
    init_logging();
    let playlist_envelope = json!({
        "stat": "ok",
        "result": {
            "items": [
                { "adToken": "ad-1" },
                {
                    "trackToken": "tr-1",
                    "songName": "Eyes Like the Sky",
                    "artistName": "King Gizzard",
                    "audioUrlMap": {
                        "highQuality": {
                            "audioUrl": "https://audio.example/hq",
                            "bitrate": "192",
                            "encoding": "mp3"
                        }
                    }
                }
            ]
        }
    });
    let path = write_fixtures(
        "login-playlist",
        &json!({
            "auth.partnerLogin": partner_login_envelope(7200),
            "auth.userLogin": user_login_envelope(),
            "station.getPlaylist": playlist_envelope
        }),
    );

    let client = Pandora::new(replay_config(&path)).unwrap();
    let session = client
        .login(&Credentials::new("listener@example.com", "hunter2"))
        .await
        .unwrap();

    assert_eq!(session.user_id, "10001");
    assert_eq!(session.partner_id, "42");
    assert!((7195..=7200).contains(&session.sync_time_offset));

    let first = client.playlist(&session, "station-token").await.unwrap();
    let second = client.playlist(&session, "station-token").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.items.len(), 2);
    assert!(first.items[0].is_ad());
    assert_eq!(
        first.items[1].song_name.as_deref(),
        Some("Eyes Like the Sky")
    );

    // The session is a plain value: replaying calls cannot have touched it.
    assert_eq!(session.sync_time_offset, session.clone().sync_time_offset);

    fs::remove_file(path).ok();
}

#[tokio::test]
async fn replay_without_fixture_fails_explicitly() {
    init_logging();
    let path = write_fixtures(
        "missing-playlist",
        &json!({
            "auth.partnerLogin": partner_login_envelope(0),
            "auth.userLogin": user_login_envelope()
        }),
    );

    let client = Pandora::new(replay_config(&path)).unwrap();
    let session = client
        .login(&Credentials::new("listener@example.com", "hunter2"))
        .await
        .unwrap();

    let e = client.playlist(&session, "station-token").await.unwrap_err();
    assert!(matches!(e, Error::NotFound(_)), "got {e}");
    assert!(e.to_string().contains("record mode"), "got {e}");

    fs::remove_file(path).ok();
}

#[tokio::test]
async fn remote_failure_codes_surface_with_the_original_code() {
    init_logging();
    let path = write_fixtures(
        "station-gone",
        &json!({
            "auth.partnerLogin": partner_login_envelope(0),
            "auth.userLogin": user_login_envelope(),
            "station.getStation": {
                "stat": "fail",
                "code": 1006,
                "message": "Station does not exist"
            }
        }),
    );

    let client = Pandora::new(replay_config(&path)).unwrap();
    let session = client
        .login(&Credentials::new("listener@example.com", "hunter2"))
        .await
        .unwrap();

    let e = client.station(&session, "gone").await.unwrap_err();
    assert!(matches!(e, Error::NotFound(_)), "got {e}");

    fs::remove_file(path).ok();
}

//! End-to-end sends against a local mock gateway, once per transport

use fcm_push::{DeviceToken, Firebase, FirebaseError, Message, Payload, Priority, ServerKey, TransportKind};
use std::time::Duration;
use tokio::sync::oneshot;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TRANSPORTS: [TransportKind; 2] = [TransportKind::Http, TransportKind::Curl];

fn client(server: &MockServer, kind: TransportKind) -> Firebase {
    Firebase::builder(ServerKey::new("K"))
        .endpoint(format!("{}/fcm/send", server.uri()))
        .transport(kind)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

fn hello() -> Message {
    Message::new(Payload::new("hi"))
}

async fn gateway_replying(status: u16, body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fcm/send"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_request_wire_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fcm/send"))
        .and(header("Authorization", "key=K"))
        .and(header("Content-Type", "application/json"))
        .and(body_string(r#"{"to":"T","message":"hi"}"#))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"multicast_id":108,"success":1,"failure":0,"canonical_ids":0,"results":[{"message_id":"1:08"}]}"#,
        ))
        .expect(2)
        .mount(&server)
        .await;

    for kind in TRANSPORTS {
        let response = client(&server, kind)
            .send(&hello(), &DeviceToken::new("T"))
            .unwrap()
            .await;

        assert!(response.success, "{}: {:?}", kind, response.error);
        assert!(response.error.is_none());
        assert_eq!(response.status_code, Some(200));
        assert_eq!(response.message_id(), Some("1:08"));
    }
}

#[tokio::test]
async fn test_delivery_options_follow_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string(r#"{"to":"T","badge":2,"message":"hi","priority":"high"}"#))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success":1,"results":[{"message_id":"m"}]}"#))
        .expect(2)
        .mount(&server)
        .await;

    let message = Message::new(Payload::new("hi").with_field("badge", 2)).with_priority(Priority::High);
    for kind in TRANSPORTS {
        let response = client(&server, kind).send(&message, &DeviceToken::new("T")).unwrap().await;
        assert!(response.success, "{}: {:?}", kind, response.error);
    }
}

#[tokio::test]
async fn test_status_classification() {
    let cases: [(u16, &str, fn(&FirebaseError) -> bool); 4] = [
        (400, "", |e| matches!(e, FirebaseError::InvalidJson)),
        (401, "Unauthorized", |e| matches!(e, FirebaseError::InvalidServerKey)),
        (500, "", |e| matches!(e, FirebaseError::ServerError)),
        (503, r#"{"results":[{"error":"NotRegistered"}]}"#, |e| {
            matches!(e, FirebaseError::ServerError)
        }),
    ];

    for (status, body, check) in cases {
        let server = gateway_replying(status, body).await;
        for kind in TRANSPORTS {
            let response = client(&server, kind).send(&hello(), &DeviceToken::new("T")).unwrap().await;

            assert!(!response.success);
            assert_eq!(response.status_code, Some(status));
            let error = response.error.expect("error expected");
            assert!(check(&error), "{} via {}: {:?}", status, kind, error);
        }
    }
}

#[tokio::test]
async fn test_gateway_reported_errors() {
    let server = gateway_replying(
        200,
        r#"{"multicast_id":1,"success":0,"failure":1,"canonical_ids":0,"results":[{"error":"NotRegistered"}]}"#,
    )
    .await;

    for kind in TRANSPORTS {
        let response = client(&server, kind).send(&hello(), &DeviceToken::new("T")).unwrap().await;

        assert!(!response.success);
        assert_eq!(response.status_code, Some(200));
        assert!(matches!(response.error, Some(FirebaseError::NotRegistered)), "{:?}", response.error);
    }

    let server = gateway_replying(200, r#"{"results":[{"error":"InvalidRegistration"},{"error":"Bogus"}]}"#).await;
    for kind in TRANSPORTS {
        let response = client(&server, kind).send(&hello(), &DeviceToken::new("T")).unwrap().await;
        match response.error {
            Some(FirebaseError::Multiple(errors)) => {
                assert!(matches!(errors[0], FirebaseError::InvalidRegistration));
                assert!(matches!(errors[1], FirebaseError::Unknown));
            }
            other => panic!("Expected multiple errors via {}, got {:?}", kind, other),
        }
    }
}

#[tokio::test]
async fn test_unreachable_gateway() {
    for kind in TRANSPORTS {
        let client = Firebase::builder(ServerKey::new("K"))
            .endpoint("http://127.0.0.1:9/fcm/send")
            .transport(kind)
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        let response = client.send(&hello(), &DeviceToken::new("T")).unwrap().await;

        assert!(!response.success);
        assert_eq!(response.status_code, None);
        assert!(
            matches!(response.error, Some(FirebaseError::Transport { .. })),
            "{}: {:?}",
            kind,
            response.error
        );
    }
}

#[tokio::test]
async fn test_callback_receives_response() {
    let server = gateway_replying(200, r#"{"success":1,"results":[{"message_id":"cb"}]}"#).await;

    for kind in TRANSPORTS {
        let (tx, rx) = oneshot::channel();
        let handle = client(&server, kind)
            .send_with_callback(&hello(), &DeviceToken::new("T"), move |response| {
                let _ = tx.send(response);
            })
            .unwrap();

        let response = rx.await.unwrap();
        assert!(response.success);
        assert_eq!(response.message_id(), Some("cb"));
        if let Some(handle) = handle {
            handle.await.unwrap();
        }
    }
}

#[tokio::test]
async fn test_line_break_in_server_key_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("X-Injected", "yes"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success":1,"results":[{"message_id":"m"}]}"#))
        .expect(0)
        .mount(&server)
        .await;

    for kind in TRANSPORTS {
        let client = Firebase::builder(ServerKey::new("K\r\nX-Injected: yes"))
            .endpoint(format!("{}/fcm/send", server.uri()))
            .transport(kind)
            .build()
            .unwrap();

        let response = client.send(&hello(), &DeviceToken::new("T")).unwrap().await;

        assert!(!response.success, "{}", kind);
        assert_eq!(response.status_code, None, "{}", kind);
        let error = response.error.expect("error expected");
        assert!(matches!(error, FirebaseError::Transport { .. }), "{}: {:?}", kind, error);
        assert_eq!(
            error.to_string(),
            "Transport error: Invalid value for header 'Authorization'",
            "{}",
            kind
        );
    }
}

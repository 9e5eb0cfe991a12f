#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand::thread_rng;
use serde_json::{json, Value};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const KID: &str = "key-1";
pub const METHOD_ARN: &str = "arn:aws:execute-api:us-east-1:123456789012:abcxyz/prod/GET/posts";

pub struct EcKey {
    signing_key: SigningKey,
    pub kid: String,
}

impl EcKey {
    pub fn new(kid: &str) -> Self {
        Self {
            signing_key: SigningKey::random(&mut thread_rng()),
            kid: kid.to_string(),
        }
    }

    pub fn jwks_json(&self) -> String {
        let verifying_key = VerifyingKey::from(&self.signing_key);
        let point = verifying_key.to_encoded_point(false);
        json!({
            "keys": [{
                "kty": "EC",
                "crv": "P-256",
                "x": URL_SAFE_NO_PAD.encode(point.x().expect("x coord")),
                "y": URL_SAFE_NO_PAD.encode(point.y().expect("y coord")),
                "use": "sig",
                "kid": self.kid,
                "alg": "ES256",
            }]
        })
        .to_string()
    }

    pub fn token(&self, issuer: &str) -> String {
        let header = json!({"alg": "ES256", "kid": self.kid, "typ": "JWT"});
        let claims = json!({
            "iss": issuer,
            "sub": "user-123",
            "aud": "authenticated",
            "email": "a@b.com",
            "role": "authenticated",
            "exp": jsonwebtoken::get_current_timestamp() + 3600,
        });
        self.sign(&header, &claims)
    }

    pub fn sign(&self, header: &Value, claims: &Value) -> String {
        let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(header).expect("header"));
        let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).expect("payload"));
        let signing_input = format!("{header_b64}.{payload_b64}");
        let signature: Signature = self.signing_key.sign(signing_input.as_bytes());
        format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        )
    }
}

pub fn json_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

pub struct TestServer {
    pub base_url: String,
    pub count: Arc<AtomicUsize>,
    pub paths: Arc<Mutex<Vec<String>>>,
    shutdown: Sender<()>,
    handle: thread::JoinHandle<()>,
}

impl TestServer {
    pub fn hits(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn stop(self) {
        let _ = self.shutdown.send(());
        self.handle.join().expect("server");
    }
}

/// Answers successive connections with `responses`, repeating the last one.
pub fn serve_sequence(responses: Vec<String>) -> TestServer {
    serve(responses, Duration::ZERO)
}

/// Accepts connections but waits `delay` before answering.
pub fn serve_slowly(response: String, delay: Duration) -> TestServer {
    serve(vec![response], delay)
}

fn serve(responses: Vec<String>, delay: Duration) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.set_nonblocking(true).expect("nonblocking");
    let addr = listener.local_addr().expect("addr");
    let count = Arc::new(AtomicUsize::new(0));
    let paths = Arc::new(Mutex::new(Vec::new()));
    let (count_thread, paths_thread) = (Arc::clone(&count), Arc::clone(&paths));
    let (shutdown, shutdown_rx) = mpsc::channel();
    let handle = thread::spawn(move || loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }
        match listener.accept() {
            Ok((mut stream, _)) => {
                let _ = stream.set_nonblocking(false);
                let idx = count_thread.fetch_add(1, Ordering::SeqCst);
                let response = responses
                    .get(idx)
                    .unwrap_or_else(|| responses.last().expect("response"));
                let mut buf = [0u8; 2048];
                let read = stream.read(&mut buf).unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..read]);
                if let Some(path) = request.split_whitespace().nth(1) {
                    paths_thread.lock().unwrap().push(path.to_string());
                }
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(5));
            }
            Err(_) => break,
        }
    });
    TestServer {
        base_url: format!("http://{addr}"),
        count,
        paths,
        shutdown,
        handle,
    }
}

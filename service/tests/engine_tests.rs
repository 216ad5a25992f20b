//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! End-to-end connection engine tests over an in-memory duplex stream: the
//! test plays the Telnet client, the engine runs its full task trio.

use async_trait::async_trait;
use mudgate_service::{
    Capabilities, ColorMode, Connection, OptionRegistry, ServiceConfig, SessionHandle,
    SessionHandler, ShutdownCause, ShutdownHandle,
};
use mudgate_telnetcodec::consts;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::sync::mpsc;

const TIMEOUT: Duration = Duration::from_secs(5);

struct CapturingHandler {
    ready: mpsc::UnboundedSender<SessionHandle>,
    closed: mpsc::UnboundedSender<ShutdownCause>,
}

#[async_trait]
impl SessionHandler for CapturingHandler {
    async fn on_session_ready(&self, session: SessionHandle) {
        let _ = self.ready.send(session);
    }

    async fn on_session_closed(&self, _session: SessionHandle, cause: ShutdownCause) {
        let _ = self.closed.send(cause);
    }
}

struct Harness {
    client: DuplexStream,
    session: SessionHandle,
    ready: mpsc::UnboundedReceiver<SessionHandle>,
    closed: mpsc::UnboundedReceiver<ShutdownCause>,
    shutdown: ShutdownHandle,
}

fn connect() -> Harness {
    let (server_side, client_side) = tokio::io::duplex(16 * 1024);
    let (ready_tx, ready_rx) = mpsc::unbounded_channel();
    let (closed_tx, closed_rx) = mpsc::unbounded_channel();
    let shutdown = ShutdownHandle::new();
    let mut initial = Capabilities::default();
    initial.session_name = "telnet-1".to_string();
    let session = Connection::spawn(
        server_side,
        OptionRegistry::with_defaults(),
        initial,
        &ServiceConfig::default(),
        Arc::new(CapturingHandler {
            ready: ready_tx,
            closed: closed_tx,
        }),
        shutdown.clone(),
    );
    Harness {
        client: client_side,
        session,
        ready: ready_rx,
        closed: closed_rx,
        shutdown,
    }
}

/// The full startup burst: one request per starting option, registry order.
const STARTUP_BURST: &[u8] = &[
    consts::IAC,
    consts::WILL,
    consts::option::SGA,
    consts::IAC,
    consts::DO,
    consts::option::MTTS,
    consts::IAC,
    consts::DO,
    consts::option::NAWS,
    consts::IAC,
    consts::WILL,
    consts::option::LINEMODE,
    consts::IAC,
    consts::WILL,
    consts::option::MSSP,
    consts::IAC,
    consts::WILL,
    consts::option::MCCP2,
    consts::IAC,
    consts::WILL,
    consts::option::MCCP3,
    consts::IAC,
    consts::WILL,
    consts::option::GMCP,
];

async fn read_exact(client: &mut DuplexStream, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    tokio::time::timeout(TIMEOUT, client.read_exact(&mut buf))
        .await
        .expect("read timed out")
        .expect("read failed");
    buf
}

/// Wait until the session's capabilities satisfy `predicate`.
async fn wait_for_caps(
    session: &SessionHandle,
    predicate: impl FnMut(&Capabilities) -> bool,
) -> Capabilities {
    let mut watch = session.watch_capabilities();
    tokio::time::timeout(TIMEOUT, watch.wait_for(predicate))
        .await
        .expect("capability change timed out")
        .expect("capability channel closed")
        .clone()
}

#[tokio::test(start_paused = true)]
async fn startup_negotiation_requests_every_option() {
    let mut harness = connect();
    let burst = read_exact(&mut harness.client, STARTUP_BURST.len()).await;
    assert_eq!(burst, STARTUP_BURST);
}

#[tokio::test(start_paused = true)]
async fn received_lines_reach_the_application_without_idle() {
    let mut harness = connect();
    harness
        .client
        .write_all(b"hello\r\nIDLE\r\nworld\r\n")
        .await
        .unwrap();

    let first = tokio::time::timeout(TIMEOUT, harness.session.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.text, "hello");
    // IDLE keep-alives never surface.
    let second = tokio::time::timeout(TIMEOUT, harness.session.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.text, "world");
}

#[tokio::test(start_paused = true)]
async fn split_line_is_assembled_once_complete() {
    let mut harness = connect();
    harness.client.write_all(b"nor").await.unwrap();
    harness.client.flush().await.unwrap();
    harness.client.write_all(b"th\r\n").await.unwrap();

    let command = tokio::time::timeout(TIMEOUT, harness.session.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(command.text, "north");
}

#[tokio::test(start_paused = true)]
async fn mssp_handshake_enables_capability_and_session_ready_fires() {
    let mut harness = connect();
    read_exact(&mut harness.client, STARTUP_BURST.len()).await;

    harness
        .client
        .write_all(&[consts::IAC, consts::DO, consts::option::MSSP])
        .await
        .unwrap();

    let caps = wait_for_caps(&harness.session, |caps| caps.mssp).await;
    assert!(caps.mssp);

    // The barrier releases (other options time out) and hands over a session.
    let ready = tokio::time::timeout(TIMEOUT, harness.ready.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(ready.capabilities().mssp);
}

#[tokio::test(start_paused = true)]
async fn naws_report_updates_window_size() {
    let mut harness = connect();
    read_exact(&mut harness.client, STARTUP_BURST.len()).await;

    harness
        .client
        .write_all(&[consts::IAC, consts::WILL, consts::option::NAWS])
        .await
        .unwrap();
    harness
        .client
        .write_all(&[
            consts::IAC,
            consts::SB,
            consts::option::NAWS,
            0x00,
            0x50,
            0x00,
            0x18,
            consts::IAC,
            consts::SE,
        ])
        .await
        .unwrap();

    let caps = wait_for_caps(&harness.session, |caps| caps.width == 80).await;
    assert!(caps.naws);
    assert_eq!((caps.width, caps.height), (80, 24));
}

#[tokio::test(start_paused = true)]
async fn malformed_naws_report_is_ignored() {
    let mut harness = connect();
    read_exact(&mut harness.client, STARTUP_BURST.len()).await;

    harness
        .client
        .write_all(&[consts::IAC, consts::WILL, consts::option::NAWS])
        .await
        .unwrap();
    // Three-byte payload: wrong length, must not touch the record.
    harness
        .client
        .write_all(&[
            consts::IAC,
            consts::SB,
            consts::option::NAWS,
            0x00,
            0x50,
            0x00,
            consts::IAC,
            consts::SE,
        ])
        .await
        .unwrap();

    let caps = wait_for_caps(&harness.session, |caps| caps.naws).await;
    assert_eq!((caps.width, caps.height), (80, 24));
}

#[tokio::test(start_paused = true)]
async fn unknown_options_get_refused() {
    let mut harness = connect();
    read_exact(&mut harness.client, STARTUP_BURST.len()).await;

    harness
        .client
        .write_all(&[
            consts::IAC,
            consts::WILL,
            consts::option::MXP,
            consts::IAC,
            consts::DO,
            consts::option::MSDP,
        ])
        .await
        .unwrap();

    let replies = read_exact(&mut harness.client, 6).await;
    assert_eq!(
        replies,
        vec![
            consts::IAC,
            consts::DONT,
            consts::option::MXP,
            consts::IAC,
            consts::WONT,
            consts::option::MSDP,
        ]
    );
}

/// Client side of one MTTS `IS` reply.
fn mtts_reply(text: &str) -> Vec<u8> {
    let mut frame = vec![consts::IAC, consts::SB, consts::option::MTTS, 0x00];
    frame.extend_from_slice(text.as_bytes());
    frame.extend_from_slice(&[consts::IAC, consts::SE]);
    frame
}

const MTTS_REQUEST: &[u8] = &[
    consts::IAC,
    consts::SB,
    consts::option::MTTS,
    0x01,
    consts::IAC,
    consts::SE,
];

#[tokio::test(start_paused = true)]
async fn mtts_three_step_pull_builds_client_identity() {
    let mut harness = connect();
    read_exact(&mut harness.client, STARTUP_BURST.len()).await;

    // Confirm MTTS; the engine asks for the first report.
    harness
        .client
        .write_all(&[consts::IAC, consts::WILL, consts::option::MTTS])
        .await
        .unwrap();
    assert_eq!(read_exact(&mut harness.client, 6).await, MTTS_REQUEST);

    harness
        .client
        .write_all(&mtts_reply("Mudlet 1.1.0"))
        .await
        .unwrap();
    assert_eq!(read_exact(&mut harness.client, 6).await, MTTS_REQUEST);

    harness
        .client
        .write_all(&mtts_reply("XTERM-256COLOR"))
        .await
        .unwrap();
    assert_eq!(read_exact(&mut harness.client, 6).await, MTTS_REQUEST);

    // 137 = proxy (128) + xterm256 (8) + ansi (1).
    harness
        .client
        .write_all(&mtts_reply("MTTS 137"))
        .await
        .unwrap();

    let caps = wait_for_caps(&harness.session, |caps| caps.proxy).await;
    assert!(caps.mtts);
    assert_eq!(caps.client_name, "Mudlet");
    assert_eq!(caps.client_version, "1.1.0");
    assert_eq!(caps.color, ColorMode::EightBit);
    assert!(caps.proxy);
    assert_eq!(caps.encoding, "ascii");
}

#[tokio::test(start_paused = true)]
async fn mtts_repeated_report_settles_the_exchange() {
    let mut harness = connect();
    read_exact(&mut harness.client, STARTUP_BURST.len()).await;

    harness
        .client
        .write_all(&[consts::IAC, consts::WILL, consts::option::MTTS])
        .await
        .unwrap();
    assert_eq!(read_exact(&mut harness.client, 6).await, MTTS_REQUEST);

    harness
        .client
        .write_all(&mtts_reply("TinyClient"))
        .await
        .unwrap();
    assert_eq!(read_exact(&mut harness.client, 6).await, MTTS_REQUEST);

    // The client has only one report and repeats it; no further request.
    harness
        .client
        .write_all(&mtts_reply("TinyClient"))
        .await
        .unwrap();

    let caps = wait_for_caps(&harness.session, |caps| !caps.client_name.is_empty()).await;
    assert_eq!(caps.client_name, "TinyClient");

    let ready = tokio::time::timeout(TIMEOUT, harness.ready.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ready.capabilities().client_name, "TinyClient");
}

#[tokio::test(start_paused = true)]
async fn mccp2_activation_frame_is_the_last_plain_output() {
    let mut harness = connect();
    read_exact(&mut harness.client, STARTUP_BURST.len()).await;

    harness
        .client
        .write_all(&[consts::IAC, consts::DO, consts::option::MCCP2])
        .await
        .unwrap();

    // The empty activation subnegotiation arrives uncompressed.
    assert_eq!(
        read_exact(&mut harness.client, 5).await,
        vec![
            consts::IAC,
            consts::SB,
            consts::option::MCCP2,
            consts::IAC,
            consts::SE,
        ]
    );
    let caps = wait_for_caps(&harness.session, |caps| caps.mccp2_enabled).await;
    assert!(caps.mccp2);

    // Everything after the activation frame inflates from a fresh stream.
    harness.session.send_text("compressed now\n");
    let mut inflater = mudgate_compress::Inflater::new();
    let mut recovered = Vec::new();
    let mut chunk = [0u8; 1024];
    while recovered != b"compressed now\r\n" {
        let n = tokio::time::timeout(TIMEOUT, harness.client.read(&mut chunk))
            .await
            .expect("read timed out")
            .expect("read failed");
        assert!(n > 0, "stream closed before payload arrived");
        let inflated = inflater.inflate(&chunk[..n]).expect("valid zlib stream");
        recovered.extend_from_slice(&inflated.data);
    }
}

/// Compress `payload` as one sync-flushed zlib chunk, the way an MCCP3
/// client would.
fn client_deflate(raw: &mut flate2::Compress, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 256);
    raw.compress_vec(payload, &mut out, flate2::FlushCompress::Sync)
        .expect("compress");
    out
}

#[tokio::test(start_paused = true)]
async fn mccp3_activation_retroactively_inflates_buffered_bytes() {
    let mut harness = connect();
    read_exact(&mut harness.client, STARTUP_BURST.len()).await;

    // Confirm MCCP3.
    harness
        .client
        .write_all(&[consts::IAC, consts::DO, consts::option::MCCP3])
        .await
        .unwrap();
    let caps = wait_for_caps(&harness.session, |caps| caps.mccp3).await;
    assert!(!caps.mccp3_enabled);

    // Activation frame and compressed tail in the same segment.
    let mut deflate = flate2::Compress::new(flate2::Compression::new(9), true);
    let mut segment = vec![
        consts::IAC,
        consts::SB,
        consts::option::MCCP3,
        consts::IAC,
        consts::SE,
    ];
    segment.extend_from_slice(&client_deflate(&mut deflate, b"north\r\nlook\r\n"));
    harness.client.write_all(&segment).await.unwrap();

    let first = tokio::time::timeout(TIMEOUT, harness.session.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.text, "north");
    let second = tokio::time::timeout(TIMEOUT, harness.session.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.text, "look");
    assert!(harness.session.capabilities().mccp3_enabled);

    // The same deflate stream keeps feeding later reads.
    let more = client_deflate(&mut deflate, b"east\r\n");
    harness.client.write_all(&more).await.unwrap();
    let third = tokio::time::timeout(TIMEOUT, harness.session.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(third.text, "east");
}

#[tokio::test(start_paused = true)]
async fn corrupt_mccp3_stream_falls_back_to_plaintext_with_wont() {
    let mut harness = connect();
    read_exact(&mut harness.client, STARTUP_BURST.len()).await;

    harness
        .client
        .write_all(&[consts::IAC, consts::DO, consts::option::MCCP3])
        .await
        .unwrap();
    wait_for_caps(&harness.session, |caps| caps.mccp3).await;

    // Activation, then garbage instead of a zlib stream.
    let mut segment = vec![
        consts::IAC,
        consts::SB,
        consts::option::MCCP3,
        consts::IAC,
        consts::SE,
    ];
    segment.extend_from_slice(&[0x99; 16]);
    harness.client.write_all(&segment).await.unwrap();

    let replies = read_exact(&mut harness.client, 3).await;
    assert_eq!(
        replies,
        vec![consts::IAC, consts::WONT, consts::option::MCCP3]
    );
    assert!(!harness.session.capabilities().mccp3_enabled);

    // Plain traffic flows again.
    harness.client.write_all(b"still here\r\n").await.unwrap();
    let command = tokio::time::timeout(TIMEOUT, harness.session.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(command.text, "still here");
}

#[tokio::test(start_paused = true)]
async fn gmcp_send_is_gated_on_negotiation() {
    let mut harness = connect();
    read_exact(&mut harness.client, STARTUP_BURST.len()).await;

    // Not negotiated yet: nothing leaves.
    harness
        .session
        .send_gmcp("Core.Ping", None);

    harness
        .client
        .write_all(&[consts::IAC, consts::DO, consts::option::GMCP])
        .await
        .unwrap();
    wait_for_caps(&harness.session, |caps| caps.gmcp).await;

    harness
        .session
        .send_gmcp("Char.Vitals", Some(serde_json::json!({"hp": 10})));

    let mut expected = vec![consts::IAC, consts::SB, consts::option::GMCP];
    expected.extend_from_slice(br#"Char.Vitals {"hp":10}"#);
    expected.extend_from_slice(&[consts::IAC, consts::SE]);
    assert_eq!(read_exact(&mut harness.client, expected.len()).await, expected);
}

#[tokio::test(start_paused = true)]
async fn escaped_iac_survives_into_line_data() {
    let mut harness = connect();
    // 0xFF doubled on the wire decodes to a single data byte, which the
    // lossy UTF-8 pass replaces.
    harness
        .client
        .write_all(&[b'a', consts::IAC, consts::IAC, b'b', consts::CR, consts::LF])
        .await
        .unwrap();
    let command = tokio::time::timeout(TIMEOUT, harness.session.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(command.text, "a\u{FFFD}b");
}

#[tokio::test(start_paused = true)]
async fn peer_eof_shuts_down_with_reader_eof() {
    let harness = connect();
    drop(harness.client);

    tokio::time::timeout(TIMEOUT, harness.session.closed())
        .await
        .expect("shutdown timed out");
    assert_eq!(
        harness.session.shutdown_cause(),
        Some(ShutdownCause::ReaderEof)
    );

    let mut closed = harness.closed;
    let cause = tokio::time::timeout(TIMEOUT, closed.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cause, ShutdownCause::ReaderEof);
}

#[tokio::test(start_paused = true)]
async fn application_shutdown_closes_the_stream() {
    let mut harness = connect();
    read_exact(&mut harness.client, STARTUP_BURST.len()).await;

    harness.shutdown.trigger(ShutdownCause::ApplicationRequest);

    // Writer closes its side; the client sees EOF.
    let mut buf = [0u8; 64];
    let n = tokio::time::timeout(TIMEOUT, harness.client.read(&mut buf))
        .await
        .expect("read timed out")
        .expect("read failed");
    assert_eq!(n, 0);
    assert_eq!(
        harness.session.shutdown_cause(),
        Some(ShutdownCause::ApplicationRequest)
    );
}

use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::runtime::Handle;
use tokio::time::timeout;

use vnc_tablet_input::input::{Button, CanvasGeometry, OutputSink, PointerCoords, PointerEvent};
use vnc_tablet_input::net::codec::{MOTION_LEN, NO_BUTTON};
use vnc_tablet_input::net::{NetEvent, NetEventType, NetworkClient, NetworkSink};
use vnc_tablet_input::TransportError;

const WAIT: Duration = Duration::from_secs(2);

async fn receiver() -> (UdpSocket, u16) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = socket.local_addr().unwrap().port();
    (socket, port)
}

async fn recv_event(socket: &UdpSocket) -> (usize, NetEvent) {
    let mut buf = [0u8; 64];
    let (len, _) = timeout(WAIT, socket.recv_from(&mut buf))
        .await
        .expect("datagram within timeout")
        .unwrap();
    (len, NetEvent::decode(&buf[..len]).unwrap())
}

#[tokio::test]
async fn events_reach_configured_endpoint() {
    let (socket, port) = receiver().await;
    let (client, _reports) = NetworkClient::spawn(&Handle::current());

    let addr = client.reconfigure("127.0.0.1", port).await.unwrap().unwrap();
    assert_eq!(addr.port(), port);
    assert_eq!(client.endpoint(), Some(addr));

    client.enqueue(NetEvent::motion(100, 200, 300)).unwrap();
    let (len, event) = recv_event(&socket).await;
    assert_eq!(len, MOTION_LEN);
    assert_eq!(event.event_type, NetEventType::Motion);
    assert_eq!((event.x, event.y, event.pressure), (100, 200, 300));
    assert_eq!(event.button, NO_BUTTON);
}

#[tokio::test]
async fn sink_preserves_batch_order() {
    let (socket, port) = receiver().await;
    let (client, _reports) = NetworkClient::spawn(&Handle::current());
    client.reconfigure("127.0.0.1", port).await.unwrap().unwrap();

    let geometry = CanvasGeometry::new(100, 100).unwrap();
    let coords = PointerCoords::new(50.0, 25.0, 1.0);
    let batch = vec![
        PointerEvent::proximity(true, &coords, &geometry),
        PointerEvent::button(Button::Draw, true, &coords, &geometry),
        PointerEvent::motion(&coords, &geometry),
    ];
    let mut sink = NetworkSink::new(client);
    sink.deliver(&batch);

    let mut received = Vec::new();
    for _ in 0..batch.len() {
        received.push(recv_event(&socket).await.1);
    }
    let expected: Vec<NetEvent> = batch.iter().map(NetEvent::from).collect();
    assert_eq!(received, expected);
    assert_eq!(received[0].button, Button::Range.wire_id());
    assert_eq!(received[0].pressure, 0);
}

#[tokio::test]
async fn unconfigured_drop_is_reported_once() {
    let (client, mut reports) = NetworkClient::spawn(&Handle::current());

    client.enqueue(NetEvent::motion(1, 1, 1)).unwrap();
    client.enqueue(NetEvent::motion(2, 2, 2)).unwrap();

    let first = timeout(WAIT, reports.recv()).await.unwrap();
    assert!(matches!(first, Some(TransportError::NotConfigured)));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(reports.try_recv().is_err());
}

#[tokio::test]
async fn unresolvable_host_reports_error() {
    let (client, _reports) = NetworkClient::spawn(&Handle::current());
    let result = client
        .reconfigure("host.invalid", 40118)
        .await
        .unwrap();
    assert!(matches!(
        result,
        Err(TransportError::Resolve { .. }) | Err(TransportError::NoAddress(_))
    ));
    assert_eq!(client.endpoint(), None);
}

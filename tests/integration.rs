//! Integration tests for alex-link.
//!
//! These drive the public API against a simulated device that answers
//! each frame the host writes.

use std::thread;
use std::time::Duration;

use alex_link::command::{CommandRegistry, CommandRequest, Parsed};
use alex_link::control::HandshakeState;
use alex_link::handler::{classify, describe_rejection, Category, DetectedColor, Report};
use alex_link::protocol::{
    deserialize, serialize, CommandKind, Frame, FrameAccumulator, Inbound, Packet, PacketType,
    ResponseKind, COMMS_PACKET_SIZE,
};
use alex_link::transport::MemoryTransport;
use alex_link::{CancelToken, FramingError, Link, LinkError};

const STATS: [u32; 10] = [11, 12, 13, 14, 15, 16, 17, 18, 250, 40];

/// Reply a well-behaved device would send for one frame.
fn device_reply(frame: &[u8]) -> Packet {
    let Ok(frame) = Frame::try_from(frame) else {
        return Packet::new(PacketType::Error, ResponseKind::BadPacket.as_u8(), &[]).unwrap();
    };
    let packet = match deserialize(&frame) {
        Ok(packet) => packet,
        Err(FramingError::BadPacket) => {
            return Packet::new(PacketType::Error, ResponseKind::BadPacket.as_u8(), &[]).unwrap()
        }
        Err(FramingError::BadChecksum) => {
            return Packet::new(PacketType::Error, ResponseKind::BadChecksum.as_u8(), &[])
                .unwrap()
        }
    };

    match (packet.packet_type, packet.command_kind()) {
        (PacketType::Hello, _) => Packet::response(ResponseKind::Ok, &[]).unwrap(),
        (PacketType::Command, Some(CommandKind::GetStats)) => {
            Packet::response(ResponseKind::Status, &STATS).unwrap()
        }
        (PacketType::Command, Some(CommandKind::Scan)) => {
            Packet::response(ResponseKind::Color, &[72, 230, 175]).unwrap()
        }
        (PacketType::Command, Some(CommandKind::Drop)) => Packet::message("payload released"),
        (PacketType::Command, Some(_)) => Packet::response(ResponseKind::Ok, &[]).unwrap(),
        _ => Packet::new(PacketType::Error, ResponseKind::BadCommand.as_u8(), &[]).unwrap(),
    }
}

/// Device that answers every frame the host writes.
fn simulated_device() -> MemoryTransport {
    MemoryTransport::with_responder(|written| Some(serialize(&device_reply(written)).to_vec()))
}

fn send_line(link: &mut Link<MemoryTransport>, registry: &CommandRegistry, line: &str) -> Report {
    let Parsed::Command(request) = registry.parse(line).unwrap() else {
        panic!("'{}' did not parse to a command", line);
    };
    link.send(&request).unwrap();
    let packet = link.receive().unwrap().packet().unwrap();
    Report::from_packet(&packet)
}

/// Full session: handshake, then a command of each reply kind.
#[test]
fn test_session_against_simulated_device() {
    let mut link = Link::new(simulated_device());
    assert_eq!(link.state(), HandshakeState::Idle);
    link.handshake().unwrap();
    assert_eq!(link.state(), HandshakeState::Established);

    let registry = CommandRegistry::new();

    assert_eq!(send_line(&mut link, &registry, "f 30 70"), Report::Ack);
    assert_eq!(send_line(&mut link, &registry, "R 90 50"), Report::Ack);

    let status = send_line(&mut link, &registry, "g");
    let Report::Status { counters } = &status else {
        panic!("expected status, got {:?}", status);
    };
    assert_eq!(counters.left_forward_ticks, 11);
    assert_eq!(counters.forward_distance, 250);
    assert!(status.to_string().contains("Forward Distance:\t\t250"));

    let color = send_line(&mut link, &registry, "k");
    let Report::Color { reading } = &color else {
        panic!("expected colour, got {:?}", color);
    };
    assert_eq!(reading.detected, DetectedColor::Red);

    let message = send_line(&mut link, &registry, "d");
    assert_eq!(message.to_string(), "Message from Alex: payload released");
}

/// Every frame the host wrote is a valid, padded command frame.
#[test]
fn test_written_frames_are_well_formed() {
    let mut link = Link::new(simulated_device());
    link.handshake().unwrap();
    link.send(&CommandRequest::new(CommandKind::Forward, vec![10, 50]))
        .unwrap();

    let written = link.transport().written().to_vec();
    assert_eq!(written.len(), 2 * COMMS_PACKET_SIZE);

    let hello = deserialize(&Frame::try_from(&written[..COMMS_PACKET_SIZE]).unwrap()).unwrap();
    assert_eq!(hello.packet_type, PacketType::Hello);
    assert_eq!(hello.command_kind(), None);
    assert_eq!(hello.command, CommandKind::Stop.as_u8());

    let forward = deserialize(&Frame::try_from(&written[COMMS_PACKET_SIZE..]).unwrap()).unwrap();
    assert_eq!(forward.command_kind(), Some(CommandKind::Forward));
    assert_eq!(forward.params, [10, 50, 0, 0, 0, 0, 0, 0, 0, 0]);
}

/// A device that answers HELLO with a status report fails the handshake.
#[test]
fn test_handshake_mismatch_reports_observed_type() {
    let transport = MemoryTransport::with_responder(|_| {
        Some(serialize(&Packet::response(ResponseKind::Status, &STATS).unwrap()).to_vec())
    });
    let mut link = Link::new(transport);

    let err = link.handshake().unwrap_err();
    assert!(matches!(
        err,
        LinkError::HandshakeMismatch {
            observed: Some(PacketType::Response)
        }
    ));
    assert!(err.to_string().contains("observed packet type RESPONSE"));
    assert!(!link.is_established());
}

/// A line-noise byte in the reply is reported and the next frame still decodes.
#[test]
fn test_corrupted_reply_is_reported_then_recovered() {
    let mut link = Link::new(simulated_device());
    link.handshake().unwrap();

    let mut corrupted = serialize(&Packet::response(ResponseKind::Ok, &[]).unwrap()).to_vec();
    corrupted[10] ^= 0x01;
    link.transport_mut().push_chunked(&corrupted, 3);
    link.transport_mut()
        .push_chunk(&serialize(&Packet::message("still here")));

    let rejected = link.receive().unwrap();
    assert_eq!(rejected, Inbound::Rejected(FramingError::BadChecksum));
    assert_eq!(describe_rejection(&FramingError::BadChecksum), "ERROR: Bad checksum");

    let packet = link.receive().unwrap().packet().unwrap();
    assert_eq!(classify(&packet), Category::TextMessage);
}

/// The device reports a frame it could not check.
#[test]
fn test_device_error_reply() {
    let mut link = Link::new(simulated_device());
    link.handshake().unwrap();

    let request = CommandRequest {
        packet_type: PacketType::Message,
        command: 0,
        params: vec![],
    };
    link.send(&request).unwrap();
    let packet = link.receive().unwrap().packet().unwrap();
    let report = Report::from_packet(&packet);
    assert_eq!(report.category(), Category::ErrorBadCommand);
    assert_eq!(report.to_string(), "Arduino received bad command");
}

/// Cancelling from another thread unblocks a receive on a silent link.
#[test]
fn test_cancel_from_another_thread() {
    let cancel = CancelToken::new();
    let mut transport = MemoryTransport::new();
    transport.push_chunk(&serialize(&Packet::response(ResponseKind::Ok, &[]).unwrap()));
    let mut link = Link::with_cancel_token(transport, cancel.clone());
    link.handshake().unwrap();

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        cancel.cancel();
    });

    let err = link.receive().unwrap_err();
    assert!(err.is_cancelled());
    canceller.join().unwrap();
}

/// Chunk boundaries never change the assembled frames.
#[test]
fn test_chunking_does_not_change_frames() {
    let packets = [
        Packet::response(ResponseKind::Status, &STATS).unwrap(),
        Packet::message("hello host"),
        Packet::command(CommandKind::TurnLeft, &[45, 80]).unwrap(),
    ];
    let stream: Vec<u8> = packets.iter().flat_map(|p| serialize(p).to_vec()).collect();

    for chunk in [1, 2, 7, 33, COMMS_PACKET_SIZE, stream.len()] {
        let mut transport = MemoryTransport::new();
        transport.push_chunked(&stream, chunk);
        let mut accumulator = FrameAccumulator::new();
        let cancel = CancelToken::new();

        for expected in &packets {
            let inbound = accumulator.receive_packet(&mut transport, &cancel).unwrap();
            assert_eq!(inbound.packet().as_ref(), Some(expected), "chunk size {}", chunk);
        }
        assert_eq!(accumulator.buffered(), 0);
    }
}

/// Reports serialize to JSON lines.
#[test]
fn test_json_reports() {
    let mut link = Link::new(simulated_device());
    link.handshake().unwrap();
    let registry = CommandRegistry::new();

    let report = send_line(&mut link, &registry, "g");
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["kind"], "status");
    assert_eq!(json["counters"]["reverse_distance"], 40);

    let report = send_line(&mut link, &registry, "s");
    assert_eq!(serde_json::to_value(&report).unwrap()["kind"], "ack");
}

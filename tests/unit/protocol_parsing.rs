#[cfg(test)]
mod protocol_parsing_tests {
    use common::protocol::{
        decode_frame, encode_advertisement, encode_route_request, AdvertisedRoute, Advertisement,
        DecodeError, Frame, NodeId, PacketType, FRAME_MAGIC, HEADER_LEN, MAX_PACKET_SIZE,
        PROTOCOL_VERSION,
    };
    use common::utils::calculate_checksum;
    use forward::routing::advertisement::{advertisements, receive_advertisement};
    use forward::routing::{ForwardingTable, RoutingTable};

    const NEIGHBOR: NodeId = NodeId::new([0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
    const LOCAL: NodeId = NodeId::new([0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6]);
    const FAR: NodeId = NodeId::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);

    #[test]
    fn test_advertisement_wire_layout() {
        let mut advertisement = Advertisement::new(NEIGHBOR);
        advertisement.push(AdvertisedRoute::new(FAR, 0x0102_0304)).unwrap();
        let mut buffer = [0u8; MAX_PACKET_SIZE];

        let len = encode_advertisement(&advertisement, &mut buffer).unwrap();

        assert_eq!(len, HEADER_LEN + 10);
        assert_eq!(&buffer[..2], &FRAME_MAGIC.to_be_bytes());
        assert_eq!(buffer[2], PROTOCOL_VERSION);
        assert_eq!(buffer[3], PacketType::Advertisement as u8);
        assert_eq!(&buffer[4..10], &NEIGHBOR.0);
        assert_eq!(buffer[10], 1);
        assert_eq!(&buffer[HEADER_LEN..HEADER_LEN + 6], &FAR.0);
        assert_eq!(&buffer[HEADER_LEN + 6..len], &[0x01, 0x02, 0x03, 0x04]);

        // 校验和覆盖校验和字段置 0 的整帧
        let stored = u16::from_be_bytes([buffer[12], buffer[13]]);
        buffer[12] = 0;
        buffer[13] = 0;
        assert_eq!(stored, calculate_checksum(&buffer[..len]));
    }

    #[test]
    fn test_route_request_round_trip() {
        let mut buffer = [0u8; MAX_PACKET_SIZE];
        let len = encode_route_request(LOCAL, &mut buffer).unwrap();

        assert_eq!(len, HEADER_LEN);
        let frame = decode_frame(&buffer[..len]).unwrap();
        assert_eq!(frame.packet_type(), PacketType::RouteRequest);
        assert_eq!(frame.source(), LOCAL);
    }

    #[test]
    fn test_corrupted_cost_is_rejected() {
        let mut advertisement = Advertisement::new(NEIGHBOR);
        advertisement.push(AdvertisedRoute::new(FAR, 2)).unwrap();
        let mut buffer = [0u8; MAX_PACKET_SIZE];
        let len = encode_advertisement(&advertisement, &mut buffer).unwrap();

        buffer[len - 1] ^= 0x01;

        assert!(matches!(
            decode_frame(&buffer[..len]),
            Err(DecodeError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_packet_type_is_rejected() {
        let mut buffer = [0u8; MAX_PACKET_SIZE];
        let len = encode_route_request(LOCAL, &mut buffer).unwrap();
        buffer[3] = 0x7F;

        assert_eq!(
            decode_frame(&buffer[..len]),
            Err(DecodeError::UnknownPacketType(0x7F))
        );
    }

    #[test]
    fn test_decoded_advertisement_feeds_routing_table() {
        // 邻居的路由表：FAR 代价 1
        let mut neighbor_table: RoutingTable = RoutingTable::new();
        neighbor_table.merge_route(forward::Route::candidate(FAR, FAR, 0));

        let mut local_table: RoutingTable = RoutingTable::new();
        let mut buffer = [0u8; MAX_PACKET_SIZE];
        for advertisement in advertisements(&neighbor_table, NEIGHBOR) {
            let len = encode_advertisement(&advertisement, &mut buffer).unwrap();
            match decode_frame(&buffer[..len]).unwrap() {
                Frame::Advertisement(decoded) => {
                    receive_advertisement(&mut local_table, LOCAL, &decoded);
                }
                other => panic!("unexpected frame {other:?}"),
            }
        }

        assert_eq!(local_table.get_next_hop(&NEIGHBOR), Some(NEIGHBOR));
        assert_eq!(local_table.get_next_hop(&FAR), Some(NEIGHBOR));
        assert_eq!(local_table.get(&FAR).unwrap().cost, 2);
    }
}

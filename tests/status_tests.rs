use rpcseam::{Code, Protocol, RpcError};

#[test]
fn code_round_trips_through_u8_and_name() {
    for raw in 1u8..=16 {
        let code = Code::try_from(raw).unwrap();
        assert_eq!(u8::from(code), raw);
        assert_eq!(Code::from_name(code.as_str()), Some(code));
    }
    assert!(Code::try_from(0u8).is_err());
    assert!(Code::try_from(17u8).is_err());
    assert_eq!(Code::from_name("not_a_code"), None);
}

#[test]
fn rpc_error_display_and_metadata() {
    let err = RpcError::invalid_argument("id must be positive").with_metadata("x-field", "id");

    assert_eq!(err.to_string(), "[invalid_argument] id must be positive");
    assert_eq!(err.metadata.get("X-Field"), Some("id"));

    let bare: RpcError = Code::NotFound.into();
    assert_eq!(bare.to_string(), "[not_found]");
}

#[test]
fn invalid_error_metadata_is_dropped() {
    let err = RpcError::internal("boom").with_metadata("bad name", "v");
    assert!(err.metadata.is_empty());
}

#[test]
fn protocol_names() {
    assert_eq!(Protocol::Connect.as_str(), "connect");
    assert_eq!(Protocol::Grpc.as_str(), "grpc");
    assert_eq!(Protocol::GrpcWeb.as_str(), "grpc-web");
    assert_eq!(Protocol::from_name("grpc-web"), Some(Protocol::GrpcWeb));
    assert_eq!(Protocol::from_name("http"), None);
}

use super::envelope::*;
use crate::MergeError;

#[test]
fn test_encode_uses_base64_text_plain() {
    assert_eq!(encode(b"hi"), "data:text/plain;charset=utf-8;base64,aGk=");
    assert_eq!(decode(&encode(b"[crio]\n")).unwrap(), b"[crio]\n");
}

#[test]
fn test_decode_percent_encoded_payload() {
    let decoded = decode("data:,%5Bstorage%5D%0Adriver%20%3D%20%22overlay%22").unwrap();
    assert_eq!(decoded, b"[storage]\ndriver = \"overlay\"");
}

#[test]
fn test_decode_without_media_type() {
    assert_eq!(decode("data:;base64,aGk=").unwrap(), b"hi");
}

#[test]
fn test_decode_rejects_malformed_sources() {
    assert!(matches!(decode("aGk="), Err(MergeError::Envelope(_))));
    assert!(matches!(decode("data:text/plain;base64"), Err(MergeError::Envelope(_))));
    assert!(matches!(decode("data:;base64,***"), Err(MergeError::Envelope(_))));
    assert!(matches!(decode("data:,%zz"), Err(MergeError::Envelope(_))));
    assert!(matches!(decode("data:,%4"), Err(MergeError::Envelope(_))));
}

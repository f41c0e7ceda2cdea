//! Tests for message normalization

use ai_lib_calls::normalize::{normalize, MessageNormalizer, NativeImage, SequencePart};
use ai_lib_calls::{ContentPart, Error, Message, MessageContent, MessageRole};
use serde_json::json;

struct PngImage;

impl NativeImage for PngImage {
    fn to_bytes(&self) -> Vec<u8> {
        vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0]
    }
}

struct OpaqueImage;

impl NativeImage for OpaqueImage {
    fn to_bytes(&self) -> Vec<u8> {
        b"not an image".to_vec()
    }
}

#[test]
fn test_canonical_messages_pass_through_unchanged() {
    let messages = vec![
        Message::system("You are a librarian."),
        Message::user("Recommend a book."),
        Message::new(MessageRole::custom("critic").unwrap(), "Make it short."),
    ];
    let normalized = normalize(messages.clone(), "assistant").unwrap();
    assert_eq!(normalized, messages);
}

#[test]
fn test_single_message_is_wrapped() {
    let message = Message::assistant("Dune, by Frank Herbert.");
    assert_eq!(normalize(message.clone(), "user").unwrap(), vec![message]);
}

#[test]
fn test_string_becomes_message_for_every_role() {
    for role in ["user", "system", "assistant", "tool", "developer"] {
        let messages = normalize("X", role).unwrap();
        assert_eq!(
            messages,
            vec![Message::new(role.parse().unwrap(), "X")],
            "role {}",
            role
        );
    }
}

#[test]
fn test_mixed_sequence_aggregates_into_one_message() {
    let image = ContentPart::image("image/jpeg", b"image_bytes".to_vec());
    let audio = ContentPart::audio("audio/wav", b"audio_bytes".to_vec());
    let messages = normalize(
        vec![
            SequencePart::from("Hello"),
            ContentPart::text("World").into(),
            image.clone().into(),
            audio.clone().into(),
        ],
        "user",
    )
    .unwrap();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(
        messages[0].content,
        MessageContent::Parts(vec![
            ContentPart::text("Hello"),
            ContentPart::text("World"),
            image,
            audio,
        ])
    );
}

#[test]
fn test_native_image_is_detected() {
    let messages = normalize(
        vec![SequencePart::from("What is this?"), SequencePart::image(PngImage)],
        "user",
    )
    .unwrap();
    let parts = messages[0].content.parts();
    assert!(matches!(&parts[1], ContentPart::Image { media_type, .. } if media_type == "image/png"));
    assert!(messages[0].contains_image());
}

#[test]
fn test_undetectable_image_rejected() {
    let err = normalize(vec![SequencePart::image(OpaqueImage)], "user").unwrap_err();
    match err {
        Error::InvalidInput { message, .. } => assert_eq!(message, "Invalid message sequence type"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_integer_rejected() {
    let err = normalize(json!(42), "user").unwrap_err();
    match &err {
        Error::InvalidInput {
            message,
            value,
            type_name,
        } => {
            assert_eq!(message, "Invalid messages type");
            assert_eq!(value, "42");
            assert_eq!(type_name, "integer");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("42"));
}

#[test]
fn test_invalid_json_element_named() {
    let err = normalize(json!(["Hello", true]), "user").unwrap_err();
    assert!(err.to_string().contains("Invalid message sequence type: true"));
}

#[test]
fn test_provider_native_json() {
    let normalizer = MessageNormalizer::default();

    let messages = normalizer
        .normalize(json!([
            {"role": "system", "content": "Be brief."},
            {"role": "user", "content": "Hi"}
        ]))
        .unwrap();
    assert_eq!(messages, vec![Message::system("Be brief."), Message::user("Hi")]);

    let messages = normalizer
        .normalize(json!(["Hello", {"type": "text", "text": "World"}]))
        .unwrap();
    assert_eq!(
        messages,
        vec![Message::with_parts(
            MessageRole::User,
            vec![ContentPart::text("Hello"), ContentPart::text("World")]
        )]
    );
}

#[test]
fn test_empty_role_rejected() {
    assert!(MessageNormalizer::new("").is_err());
}

#[test]
fn test_normalization_is_deterministic() {
    let input = || vec![SequencePart::from("a"), SequencePart::image(PngImage)];
    assert_eq!(
        normalize(input(), "user").unwrap(),
        normalize(input(), "user").unwrap()
    );
}

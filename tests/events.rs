use serde_json::json;
use studio_api::{StudioStreamEvent, TokenUsage};

#[test]
fn done_frame_decodes_object_and_usage() {
    let event: StudioStreamEvent = serde_json::from_value(json!({
        "type": "done",
        "object": {"message": "Hello", "conversationTitle": "Greeting"},
        "usage": {"model": "studio-1", "inputTokens": 12, "outputTokens": 34}
    }))
    .expect("done frame should decode");

    let StudioStreamEvent::Done { object, usage } = event else {
        panic!("expected done variant");
    };
    let object = object.expect("object present");
    assert_eq!(object.message, "Hello");
    assert_eq!(object.conversation_title.as_deref(), Some("Greeting"));
    assert_eq!(
        usage,
        Some(TokenUsage {
            model: Some("studio-1".to_string()),
            input_tokens: Some(12),
            output_tokens: Some(34),
            total_tokens: None,
        })
    );
}

#[test]
fn error_frame_decodes_with_attached_partial() {
    let event: StudioStreamEvent = serde_json::from_value(json!({
        "type": "error",
        "message": "model overloaded",
        "object": {"message": "partial text", "phaseComplete": true}
    }))
    .expect("error frame should decode");

    let StudioStreamEvent::Error { message, object } = event else {
        panic!("expected error variant");
    };
    assert_eq!(message.as_deref(), Some("model overloaded"));
    assert_eq!(object.expect("object").phase_complete, Some(true));
}

#[test]
fn file_operation_frame_decodes_camel_case_fields() {
    let event: StudioStreamEvent = serde_json::from_value(json!({
        "type": "file_operation",
        "op": "create",
        "path": "src/App.tsx",
        "content": "export default function App() {}",
        "reason": "scaffold"
    }))
    .expect("file operation frame should decode");

    let StudioStreamEvent::FileOperation(op) = event else {
        panic!("expected file operation variant");
    };
    assert_eq!(op.op, "create");
    assert_eq!(op.path, "src/App.tsx");
    assert_eq!(op.reason.as_deref(), Some("scaffold"));
}

#[test]
fn build_status_frame_decodes_progress_counters() {
    let event: StudioStreamEvent = serde_json::from_value(json!({
        "type": "build_status",
        "step": "compiling",
        "filesCompleted": 3,
        "filesTotal": 9
    }))
    .expect("build status frame should decode");

    let StudioStreamEvent::BuildStatus(status) = event else {
        panic!("expected build status variant");
    };
    assert_eq!(status.step, "compiling");
    assert_eq!(status.files_completed, Some(3));
    assert_eq!(status.files_total, Some(9));
}

#[test]
fn unknown_type_fails_decode_so_the_parser_drops_it() {
    let result: Result<StudioStreamEvent, _> =
        serde_json::from_value(json!({"type": "telemetry", "value": 1}));
    assert!(result.is_err());
}

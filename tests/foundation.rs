use studio_api::{normalize_chat_url, ChatRequest, StudioApiClient, StudioApiConfig};

#[test]
fn smoke_client_constructs_from_config() {
    let config = StudioApiConfig::new("token")
        .with_base_url("https://proj.functions.studio.app")
        .insert_header("X-Project", "proj-1");

    let client = StudioApiClient::new(config.clone()).expect("client creation should succeed");
    assert_eq!(
        normalize_chat_url("https://proj.functions.studio.app"),
        client.normalized_endpoint()
    );
    assert_eq!("token", client.config().access_token);
    assert_eq!(
        Some(&"proj-1".to_string()),
        client.config().extra_headers.get("X-Project")
    );
}

#[test]
fn default_request_has_wire_defaults() {
    let request = ChatRequest::new("conv-1", "hello")
        .with_agent_type("builder")
        .with_project_id("proj-1");

    assert_eq!(request.action, "continue");
    assert_eq!(request.conversation_id, "conv-1");
    assert_eq!(request.agent_type.as_deref(), Some("builder"));
    assert!(request.context.is_none());
    assert!(request.design_phase.is_none());
    assert!(request.section_id.is_none());
}

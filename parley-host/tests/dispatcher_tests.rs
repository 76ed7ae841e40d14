use anyhow::anyhow;
use async_trait::async_trait;
use parley_host::{
    Completion, Component, ComponentMetadata, ComponentRegistry, CustomComponent, Dispatcher,
    EntityResolver, EventHandler, EventHandlerComponent, ExecutionContext, InvocationError,
    MetadataListing, RegistryError, ResolutionEvent, RuntimeConfig,
};
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

struct Greet;

#[async_trait]
impl CustomComponent for Greet {
    fn metadata(&self) -> ComponentMetadata {
        ComponentMetadata::new("greet")
            .with_property("name", json!({"type": "string", "required": false}))
            .with_actions(["done"])
    }

    async fn invoke(&self, ctx: &mut ExecutionContext) -> Completion {
        let name = ctx
            .property("name")
            .and_then(Value::as_str)
            .unwrap_or("there")
            .to_string();
        ctx.reply(json!({"text": format!("Hello {name}")}));
        ctx.transition(Some("done"));
        Completion::Done
    }
}

/// Completes the old way, by echoing the context as the error argument.
struct Legacy;

#[async_trait]
impl CustomComponent for Legacy {
    fn metadata(&self) -> ComponentMetadata {
        ComponentMetadata::new("legacy")
    }

    async fn invoke(&self, ctx: &mut ExecutionContext) -> Completion {
        ctx.set_variable("touched", json!(true));
        Completion::EchoedContext
    }
}

struct Failing;

#[async_trait]
impl CustomComponent for Failing {
    fn metadata(&self) -> ComponentMetadata {
        ComponentMetadata::new("failing")
    }

    async fn invoke(&self, _ctx: &mut ExecutionContext) -> Completion {
        let result: anyhow::Result<()> = Err(anyhow!("backend unavailable"));
        result.into()
    }
}

struct Panicking;

#[async_trait]
impl CustomComponent for Panicking {
    fn metadata(&self) -> ComponentMetadata {
        ComponentMetadata::new("panicking")
    }

    async fn invoke(&self, _ctx: &mut ExecutionContext) -> Completion {
        panic!("kaboom");
    }
}

/// Declares itself an event handler but is registered as a regular component.
struct Confused;

#[async_trait]
impl CustomComponent for Confused {
    fn metadata(&self) -> ComponentMetadata {
        ComponentMetadata::event_handler("confused")
    }

    async fn invoke(&self, _ctx: &mut ExecutionContext) -> Completion {
        Completion::Done
    }
}

struct Noop;

#[async_trait]
impl EventHandler for Noop {
    async fn handle(
        &self,
        _event: &ResolutionEvent,
        _resolver: &mut EntityResolver<'_>,
    ) -> anyhow::Result<Option<bool>> {
        Ok(None)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn dispatcher() -> Dispatcher {
    init_tracing();
    let mut registry = ComponentRegistry::new();
    registry.register_component(Greet).unwrap();
    registry.register_component(Legacy).unwrap();
    registry.register_component(Failing).unwrap();
    registry.register_component(Panicking).unwrap();
    registry
        .register_event_handler(
            EventHandlerComponent::builder(ComponentMetadata::event_handler("pizza.resolve"))
                .on("validateSize", Noop)
                .on("shouldPromptForColor", Noop)
                .on("publishMessage", Noop)
                .build()
                .unwrap(),
        )
        .unwrap();
    Dispatcher::new(registry).unwrap()
}

async fn invoke(d: &Dispatcher, name: &str, body: Value) -> Result<parley_host::ResponseSnapshot, InvocationError> {
    d.invoke(name, body, None).await
}

// ── Scenarios ────────────────────────────────────────────────────

#[tokio::test]
async fn invokes_regular_component() {
    let mut registry = ComponentRegistry::new();
    registry.register_component(Greet).unwrap();
    let d = Dispatcher::new(registry).unwrap();

    let mut result = None;
    d.invoke_with_callback("greet", json!({}), None, |r| result = Some(r))
        .await;

    let snapshot = result.unwrap().unwrap();
    assert_eq!(snapshot.messages.len(), 1);
    assert_eq!(snapshot.messages[0].message_payload, json!({"text": "Hello there"}));
    assert!(snapshot.keep_turn);
    assert!(snapshot.transition);
    assert_eq!(snapshot.action.as_deref(), Some("done"));
}

#[tokio::test]
async fn empty_registry_reports_unknown_component() {
    let d = Dispatcher::new(ComponentRegistry::new()).unwrap();

    let mut result = None;
    d.invoke_with_callback("x", json!({}), None, |r| result = Some(r))
        .await;

    let err = result.unwrap().unwrap_err();
    assert_eq!(err.name(), "unknownComponent");
    assert!(matches!(err, InvocationError::UnknownComponent(ref n) if n == "x"));
}

#[tokio::test]
async fn callback_fires_exactly_once() {
    let d = dispatcher();
    for name in ["greet", "legacy", "failing", "panicking", "missing", "pizza.resolve"] {
        let mut calls = 0;
        d.invoke_with_callback(name, json!({}), None, |_| calls += 1)
            .await;
        assert_eq!(calls, 1, "component {name}");
    }
}

// ── Extensions ───────────────────────────────────────────────────

#[tokio::test]
async fn extensions_override_request_properties() {
    let d = dispatcher();
    let mut ext = Map::new();
    ext.insert("name".into(), json!("Ada"));

    let snapshot = d
        .invoke("greet", json!({"properties": {"name": "Bob"}}), Some(ext))
        .await
        .unwrap();
    assert_eq!(snapshot.messages[0].message_payload, json!({"text": "Hello Ada"}));
}

// ── Completion conventions ───────────────────────────────────────

#[tokio::test]
async fn echoed_context_counts_as_success() {
    let snapshot = invoke(&dispatcher(), "legacy", json!({})).await.unwrap();
    assert_eq!(snapshot.context.variables["touched"].value, json!(true));
}

#[tokio::test]
async fn component_error_is_forwarded() {
    let err = invoke(&dispatcher(), "failing", json!({})).await.unwrap_err();
    assert_eq!(err.name(), "componentError");
    match err {
        InvocationError::ComponentFailed { component, source } => {
            assert_eq!(component, "failing");
            assert_eq!(source.to_string(), "backend unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn panic_becomes_internal_error() {
    let err = invoke(&dispatcher(), "panicking", json!({})).await.unwrap_err();
    assert_eq!(err.name(), "internalError");
    assert!(matches!(
        err,
        InvocationError::Panicked { ref message, .. } if message == "kaboom"
    ));
}

#[tokio::test]
async fn dispatcher_survives_a_panicking_component() {
    let d = dispatcher();
    assert!(invoke(&d, "panicking", json!({})).await.is_err());
    assert!(invoke(&d, "greet", json!({})).await.is_ok());
}

// ── Bad requests ─────────────────────────────────────────────────

#[tokio::test]
async fn non_object_body_is_bad_request() {
    let err = invoke(&dispatcher(), "greet", json!([1, 2, 3])).await.unwrap_err();
    assert_eq!(err.name(), "badRequest");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let err = invoke(&dispatcher(), "greet", json!({"state": 42})).await.unwrap_err();
    assert_eq!(err.name(), "badRequest");
}

#[tokio::test]
async fn unknown_component_checked_before_request_shape() {
    let err = invoke(&dispatcher(), "missing", json!("not an object")).await.unwrap_err();
    assert_eq!(err.name(), "unknownComponent");
}

#[test]
fn wire_error_shape() {
    let err = InvocationError::UnknownComponent("x".into());
    assert_eq!(
        err.to_wire(),
        json!({"name": "unknownComponent", "message": "unknown component: x"})
    );
}

// ── Metadata ─────────────────────────────────────────────────────

#[test]
fn lists_metadata_in_registration_order() {
    let listing = dispatcher().list_metadata();
    assert_eq!(listing.version, "1.1");
    let names: Vec<&str> = listing.components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["greet", "legacy", "failing", "panicking", "pizza.resolve"]);
}

#[test]
fn event_handler_metadata_lists_events() {
    let listing = dispatcher().list_metadata();
    let handler = listing
        .components
        .iter()
        .find(|c| c.name == "pizza.resolve")
        .unwrap();
    assert!(handler.event_handler);
    assert_eq!(
        handler.events.as_deref(),
        Some(&["validateSize".to_string(), "shouldPromptForColor".to_string(), "publishMessage".to_string()][..])
    );

    let greet = &listing.components[0];
    assert!(!greet.event_handler);
    assert_eq!(greet.events, None);
    assert_eq!(greet.supported_actions, vec!["done"]);
}

#[test]
fn event_handler_component_knows_its_events() {
    let component = EventHandlerComponent::builder(ComponentMetadata::event_handler("pizza.resolve"))
        .on("validateSize", Noop)
        .on("shouldPromptForColor", Noop)
        .build()
        .unwrap();
    assert!(component.handles("validateSize"));
    assert!(component.handles("shouldPromptForColor"));
    assert!(!component.handles("publishMessage"));
    assert!(!component.handles("metadata"));
    assert_eq!(
        component.events().collect::<Vec<_>>(),
        vec!["validateSize", "shouldPromptForColor"]
    );
}

#[test]
fn metadata_wire_format() {
    let listing = dispatcher().list_metadata();
    let wire = serde_json::to_value(&listing).unwrap();
    assert_eq!(
        wire["components"][0],
        json!({
            "name": "greet",
            "properties": {"name": {"type": "string", "required": false}},
            "supportedActions": ["done"],
            "eventHandler": false
        })
    );
    assert_eq!(wire["components"][4]["events"][1], json!("shouldPromptForColor"));

    let back: MetadataListing = serde_json::from_value(wire).unwrap();
    assert_eq!(back, listing);
}

#[test]
fn metadata_version_comes_from_config() {
    let config = RuntimeConfig::from_toml_str("[runtime]\nversion = \"2.0\"\n").unwrap();
    let d = Dispatcher::with_config(ComponentRegistry::new(), config).unwrap();
    let listing = d.list_metadata();
    assert_eq!(listing.version, "2.0");
    assert!(listing.components.is_empty());
}

// ── Registry validation ──────────────────────────────────────────

#[test]
fn duplicate_component_rejected() {
    let mut registry = ComponentRegistry::new();
    registry.register_component(Greet).unwrap();
    let err = registry.register_component(Greet).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateComponent(ref n) if n == "greet"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn empty_name_rejected() {
    let mut registry = ComponentRegistry::new();
    let err = registry.register("", Component::regular(Greet)).unwrap_err();
    assert!(matches!(err, RegistryError::EmptyName));
    assert!(registry.is_empty());
}

#[test]
fn registry_can_use_explicit_names() {
    let registry = {
        let mut r = ComponentRegistry::new();
        r.register("hello", Component::regular(Greet)).unwrap();
        r
    };
    assert!(registry.contains("hello"));
    assert!(!registry.contains("greet"));
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["hello"]);
}

#[test]
fn declared_variant_must_match() {
    let registry = ComponentRegistry::new().with_component(Confused).unwrap();
    let err = Dispatcher::new(registry).err().unwrap();
    assert!(matches!(
        err,
        RegistryError::VariantMismatch { ref component, declared: true, .. } if component == "confused"
    ));
}

#[test]
fn event_handler_without_flag_is_rejected() {
    let component = EventHandlerComponent::builder(ComponentMetadata::new("plain"))
        .on("validateSize", Noop)
        .build()
        .unwrap();
    let registry = ComponentRegistry::new().with_event_handler(component).unwrap();
    let err = Dispatcher::new(registry).err().unwrap();
    assert!(matches!(err, RegistryError::VariantMismatch { declared: false, .. }));
}

#[test]
fn duplicate_event_rejected() {
    let err = EventHandlerComponent::builder(ComponentMetadata::event_handler("dup"))
        .on("validateSize", Noop)
        .on("validateSize", Noop)
        .build()
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateEvent { ref event, .. } if event == "validateSize"));
}

#[test]
fn metadata_event_name_is_reserved() {
    let err = EventHandlerComponent::builder(ComponentMetadata::event_handler("meta"))
        .on("metadata", Noop)
        .build()
        .unwrap_err();
    assert!(matches!(err, RegistryError::ReservedEvent(_)));
}

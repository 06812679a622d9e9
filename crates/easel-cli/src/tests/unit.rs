//! Unit coverage for the connection manager, the typed tools and argument
//! parsing.

use easel_config::Config;
use easel_proto::{CallParams, FrameError, HandleDescriptor, WireValue};
use rstest::rstest;
use serde_json::{Value, json};

use super::support::{
    FakeHost, Reply, closed_port, config_for, manager_for, operation_paths,
};
use crate::connection::{CallError, ConnectionManager};
use crate::tools::{ToolError, Tools};
use crate::{AppError, parse_kwargs, parse_value};

fn width_call() -> CallParams {
    CallParams::new("Studio.Image.get_width").with_kwarg("image_id", 1)
}

#[rstest]
fn call_returns_the_success_result_and_closes() {
    let mut host = FakeHost::spawn(vec![Reply::success(json!(640))]).expect("spawn host");
    let mut manager = manager_for(host.port());

    let result = manager.call(width_call()).expect("call succeeds");

    assert_eq!(result, WireValue::Int(640));
    assert!(!manager.is_connected());
    let requests = host.take_requests().expect("requests");
    assert_eq!(operation_paths(&requests), ["Studio.Image.get_width"]);
    let context = requests
        .first()
        .and_then(|request| request.params.kwargs.get("image_id"));
    assert_eq!(context, Some(&json!(1)));
}

#[rstest]
fn error_responses_carry_message_and_traceback() {
    let host = FakeHost::spawn(vec![Reply::error(
        "procedure 'plug-in-nope' not found",
        Some("  in run_procedure"),
    )])
    .expect("spawn host");
    let mut manager = manager_for(host.port());

    let error = manager
        .call(CallParams::new("Studio.Pdb.run_procedure").with_arg("plug-in-nope"))
        .expect_err("remote failure");

    assert_eq!(error.to_string(), "procedure 'plug-in-nope' not found");
    assert_eq!(error.traceback(), Some("  in run_procedure"));
    assert!(!manager.is_connected());
}

#[rstest]
fn timeout_is_distinct_and_the_next_call_reconnects() {
    let mut host = FakeHost::spawn(vec![Reply::Silent, Reply::success(json!(480))])
        .expect("spawn host");
    let mut manager = manager_for(host.port());

    let error = manager.call(width_call()).expect_err("first call times out");
    assert!(error.is_timeout(), "expected timeout, got {error:?}");
    assert!(matches!(error, CallError::Timeout { received: 0, .. }));
    assert!(!manager.is_connected());

    let result = manager
        .call(CallParams::new("Studio.Image.get_height").with_kwarg("image_id", 1))
        .expect("fresh connection succeeds");
    assert_eq!(result, WireValue::Int(480));

    let requests = host.take_requests().expect("requests");
    assert_eq!(
        operation_paths(&requests),
        ["Studio.Image.get_width", "Studio.Image.get_height"]
    );
}

#[rstest]
fn closed_without_bytes_is_reported() {
    let host = FakeHost::spawn(vec![Reply::Close]).expect("spawn host");
    let mut manager = manager_for(host.port());

    let error = manager.call(width_call()).expect_err("no response");

    assert!(matches!(error, CallError::ConnectionClosed), "got {error:?}");
}

#[rstest]
fn undecodable_responses_are_reported() {
    let host =
        FakeHost::spawn(vec![Reply::Line(String::from("not json"))]).expect("spawn host");
    let mut manager = manager_for(host.port());

    let error = manager.call(width_call()).expect_err("garbage response");

    assert!(matches!(error, CallError::Decode { .. }), "got {error:?}");
}

#[rstest]
fn unreachable_bridge_fails_to_connect() {
    let mut manager = manager_for(closed_port().expect("closed port"));

    let error = manager.call(width_call()).expect_err("nothing listening");

    assert!(matches!(error, CallError::Connect { .. }), "got {error:?}");
    assert!(!manager.is_connected());
}

#[rstest]
fn responses_are_bounded_by_the_response_limit_not_the_request_limit() {
    let listing = "layer ".repeat(2_048);
    let host = FakeHost::spawn(vec![Reply::success(json!(listing))]).expect("spawn host");
    let config = Config {
        max_request_bytes: 1_024,
        max_response_bytes: 64 * 1_024,
        ..config_for(host.port())
    };
    let mut manager = ConnectionManager::from_config(&config).expect("manager");

    let result = manager.call(width_call()).expect("large reply fits");

    assert_eq!(result, WireValue::Str(listing));
}

#[rstest]
fn responses_over_the_response_limit_are_rejected() {
    let host = FakeHost::spawn(vec![Reply::success(json!("x".repeat(4_096)))])
        .expect("spawn host");
    let config = Config {
        max_response_bytes: 1_024,
        ..config_for(host.port())
    };
    let mut manager = ConnectionManager::from_config(&config).expect("manager");

    let error = manager.call(width_call()).expect_err("reply too large");

    assert!(
        matches!(
            error,
            CallError::Decode {
                source: FrameError::TooLarge { max: 1_024, .. }
            }
        ),
        "got {error:?}"
    );
    assert!(!manager.is_connected());
}

#[rstest]
fn malformed_bridge_urls_fail_before_connecting() {
    let config = Config {
        bridge_url: Some(String::from("tcp://127.0.0.1")),
        ..Config::default()
    };

    let error = ConnectionManager::from_config(&config).expect_err("port missing");

    assert!(matches!(error, CallError::Endpoint { .. }), "got {error:?}");
}

#[rstest]
fn image_info_gathers_every_attribute() {
    let mut host = FakeHost::spawn(vec![
        Reply::success(json!({"id": 1, "type": "Image"})),
        Reply::success(json!("Untitled")),
        Reply::success(json!(640)),
        Reply::success(json!(480)),
        Reply::success(json!([{"id": 2, "type": "Layer"}])),
    ])
    .expect("spawn host");
    let mut manager = manager_for(host.port());

    let info = Tools::new(&mut manager, "Studio")
        .get_image_info(1)
        .expect("info");

    assert_eq!(
        info,
        json!({
            "id": 1,
            "name": "Untitled",
            "width": 640,
            "height": 480,
            "layers": [{"id": 2, "type": "Layer"}],
        })
    );
    let requests = host.take_requests().expect("requests");
    assert_eq!(
        operation_paths(&requests),
        [
            "Studio.Image.get_by_id",
            "Studio.Image.get_name",
            "Studio.Image.get_width",
            "Studio.Image.get_height",
            "Studio.Image.get_layers",
        ]
    );
    assert!(
        requests
            .iter()
            .skip(1)
            .all(|request| request.params.kwargs.get("image_id") == Some(&json!(1)))
    );
}

#[rstest]
fn failing_step_ends_the_sequence() {
    let mut host = FakeHost::spawn(vec![Reply::error("no image with id 9", None)])
        .expect("spawn host");
    let mut manager = manager_for(host.port());

    let error = Tools::new(&mut manager, "Studio")
        .get_image_info(9)
        .expect_err("unknown image");

    assert_eq!(error.to_string(), "no image with id 9");
    assert_eq!(host.take_requests().expect("requests").len(), 1);
}

#[rstest]
fn blur_targets_the_active_layer_and_flushes() {
    let mut host = FakeHost::spawn(vec![
        Reply::success(json!({"id": 2, "type": "Layer"})),
        Reply::success(json!(["success"])),
        Reply::success(Value::Null),
    ])
    .expect("spawn host");
    let mut manager = manager_for(host.port());

    let outcome = Tools::new(&mut manager, "Studio")
        .apply_gaussian_blur(1, 4.5)
        .expect("blur");

    assert_eq!(
        outcome,
        json!({"image_id": 1, "layer_id": 2, "radius": 4.5, "result": ["success"]})
    );
    let requests = host.take_requests().expect("requests");
    assert_eq!(
        operation_paths(&requests),
        [
            "Studio.Image.get_active_layer",
            "Studio.Pdb.run_procedure",
            "Studio.displays_flush",
        ]
    );
    assert_eq!(
        requests.get(1).map(|request| request.params.args.clone()),
        Some(vec![
            json!("plug-in-gauss"),
            json!(1),
            json!(2),
            json!(4.5),
            json!(4.5),
            json!(0),
        ])
    );
}

#[rstest]
fn blur_without_an_active_layer_stops_early() {
    let mut host = FakeHost::spawn(vec![Reply::success(Value::Null)]).expect("spawn host");
    let mut manager = manager_for(host.port());

    let error = Tools::new(&mut manager, "Studio")
        .apply_gaussian_blur(1, 5.0)
        .expect_err("no active layer");

    assert!(matches!(error, ToolError::NoActiveLayer { image_id: 1 }));
    assert_eq!(host.take_requests().expect("requests").len(), 1);
}

#[rstest]
fn get_images_passes_handles_through() {
    let host = FakeHost::spawn(vec![Reply::success(json!([{"id": 1, "type": "Image"}]))])
        .expect("spawn host");
    let mut manager = manager_for(host.port());

    let images = Tools::new(&mut manager, "Studio")
        .get_images()
        .expect("images");

    let expected = WireValue::List(vec![WireValue::Handle(HandleDescriptor::typed(1, "Image"))]);
    assert_eq!(images, expected.to_json());
}

#[rstest]
#[case("42", json!(42))]
#[case("2.5", json!(2.5))]
#[case("\"quoted\"", json!("quoted"))]
#[case("[1,2]", json!([1, 2]))]
#[case("plain words", json!("plain words"))]
fn arguments_parse_as_json_or_text(#[case] raw: &str, #[case] expected: Value) {
    assert_eq!(parse_value(raw), expected);
}

#[rstest]
fn keyword_arguments_split_on_the_first_equals() {
    let kwargs = parse_kwargs(&[String::from("name=a=b"), String::from("image_id=3")])
        .expect("valid kwargs");
    assert_eq!(kwargs.get("name"), Some(&json!("a=b")));
    assert_eq!(kwargs.get("image_id"), Some(&json!(3)));
}

#[rstest]
#[case("novalue")]
#[case("=1")]
fn malformed_keyword_arguments_are_rejected(#[case] raw: &str) {
    let error = parse_kwargs(&[raw.to_owned()]).expect_err("invalid kwarg");
    assert!(matches!(error, AppError::InvalidKeywordArgument { .. }));
}

//! Exposure: the layer's gate and external injection.

use floe_cluster::Cluster;
use floe_component::testing::{self, BANANA_INT};
use floe_component::{ConfigError, Facade, InvokeError};
use serde_json::json;
use std::rc::Rc;

#[test]
fn layer_gates_unexposed_services() {
    let cluster = Cluster::new();
    let (banana, _) = testing::banana();
    cluster.connect("banana", &banana).unwrap();
    let layer = cluster.layer();

    let err = layer.proxy("banana", &"Banana".into()).unwrap_err();
    assert!(matches!(err, ConfigError::NotExposed { .. }));

    cluster.expose("banana", &["Banana".into()]).unwrap();
    let proxy = layer.proxy("banana", &"Banana".into()).unwrap();
    assert_eq!(proxy.call("return_an_int", &[]).unwrap(), json!(BANANA_INT));

    // Snack is declared but not exposed.
    let err = layer.proxy("banana", &"Snack".into()).unwrap_err();
    assert!(matches!(err, ConfigError::InterfaceNotExposed { .. }));
}

#[test]
fn external_receives_exposed_services_on_connect() {
    let cluster = Cluster::new();
    let (banana, _) = testing::banana();
    cluster
        .connect_exposed("banana", &banana, &["Banana".into()])
        .unwrap();

    let (apple, apple_cell) = testing::apple("hi");
    cluster.layer().connect(&apple).unwrap();

    assert_eq!(apple_cell.borrow().int_from_banana(), Some(BANANA_INT));
    // Snack was not exposed, so the Snack-accepting setter never fired.
    assert!(!apple_cell.borrow().snack_seen);
}

#[test]
fn exposure_after_connect_reaches_existing_externals() {
    let cluster = Cluster::new();
    let (banana, _) = testing::banana();
    cluster.connect("banana", &banana).unwrap();

    let (apple, apple_cell) = testing::apple("hi");
    cluster.connect_external(&apple).unwrap();
    assert!(apple_cell.borrow().banana.is_none());

    cluster.expose("banana", &["Banana".into()]).unwrap();
    assert_eq!(apple_cell.borrow().int_from_banana(), Some(BANANA_INT));
}

#[test]
fn withdrawing_an_exposure_injects_none() {
    let cluster = Cluster::new();
    let (banana, _) = testing::banana();
    cluster
        .connect_exposed("banana", &banana, &["Banana".into()])
        .unwrap();
    let (apple, apple_cell) = testing::apple("hi");
    cluster.connect_external(&apple).unwrap();
    assert!(apple_cell.borrow().banana.is_some());

    cluster.expose("banana", &[]).unwrap();
    assert!(apple_cell.borrow().banana.is_none());
    assert!(apple.injected_interfaces("banana").is_empty());
}

#[test]
fn narrowing_an_exposure_only_retracts_the_withdrawn_interface() {
    let cluster = Cluster::new();
    let (banana, _) = testing::banana();
    cluster
        .connect_exposed("banana", &banana, &["Banana".into(), "Snack".into()])
        .unwrap();
    let (apple, apple_cell) = testing::apple("hi");
    cluster.connect_external(&apple).unwrap();
    assert!(apple_cell.borrow().snack_seen);

    cluster.expose("banana", &["Banana".into()]).unwrap();
    assert!(!apple_cell.borrow().snack_seen);
    assert!(apple_cell.borrow().banana.is_some());
}

#[test]
fn exposing_an_undeclared_interface_is_rejected() {
    let cluster = Cluster::new();
    let (banana, _) = testing::banana();
    cluster.connect("banana", &banana).unwrap();

    let err = cluster.expose("banana", &["Apple".into()]).unwrap_err();
    assert!(matches!(err, ConfigError::UndeclaredInterface { .. }));
}

#[test]
fn exposing_an_unknown_id_is_rejected() {
    let cluster = Cluster::new();
    let err = cluster.expose("nobody", &["Banana".into()]).unwrap_err();
    assert!(matches!(err, ConfigError::NotConnected { .. }));
}

#[test]
fn overloads_resolve_through_the_layer() {
    let cluster = Cluster::new();
    let (peach, peach_cell) = testing::peach();
    cluster
        .connect_exposed("peach", &peach, &["Peach".into()])
        .unwrap();
    let proxy = cluster.layer().proxy("peach", &"Peach".into()).unwrap();

    // A float argument truncates into the int overload.
    proxy.call("set_taste", &[json!(27.0)]).unwrap();
    assert_eq!(peach_cell.borrow().taste, json!({"int": 27}));

    proxy.call("set_taste", &[json!("sour"), json!("2")]).unwrap();
    assert_eq!(peach_cell.borrow().taste, json!({"text_int": ["sour", 2]}));
}

#[test]
fn external_can_disconnect_through_the_facade() {
    let cluster = Cluster::new();
    let (banana, _) = testing::banana();
    cluster
        .connect_exposed("banana", &banana, &["Banana".into()])
        .unwrap();
    let (apple, apple_cell) = testing::apple("hi");
    let layer = cluster.layer();
    layer.connect(&apple).unwrap();
    assert!(apple_cell.borrow().banana.is_some());

    layer.disconnect(&apple).unwrap();
    assert!(apple_cell.borrow().banana.is_none());
    assert!(!cluster.is_connected(&apple));
}

#[test]
fn interceptors_apply_to_layer_proxies() {
    let cluster = Cluster::new();
    let (apple, _apple_cell) = testing::apple("hi");
    apple
        .set_invocation_interceptor(
            &"Apple".into(),
            Rc::new(testing::AppendSuffix(" there".to_string())),
        )
        .unwrap();
    cluster
        .connect_exposed("apple", &apple, &["Apple".into()])
        .unwrap();

    let proxy = cluster.layer().proxy("apple", &"Apple".into()).unwrap();
    assert_eq!(proxy.call("get_message", &[]).unwrap(), json!("hi there"));
}

#[test]
fn layer_lists_only_exposed_ids() {
    let cluster = Cluster::new();
    let (banana, _) = testing::banana();
    let (peach, _) = testing::peach();
    cluster.connect("banana", &banana).unwrap();
    cluster
        .connect_exposed("peach", &peach, &["Peach".into()])
        .unwrap();

    let layer = cluster.layer();
    assert_eq!(layer.exposed_component_ids(), vec!["peach".to_string()]);
    assert_eq!(
        layer.exposed_interfaces("peach").unwrap(),
        vec!["Peach".into()]
    );
    assert!(layer.exposed_interfaces("banana").is_err());
}

#[test]
fn connect_expose_disconnect_round_trip() {
    let cluster = Cluster::new();
    let (banana, _) = testing::banana();
    assert!(!cluster.is_exposed("banana"));

    cluster.connect("banana", &banana).unwrap();
    assert!(!cluster.is_exposed("banana"));
    cluster.expose("banana", &["Banana".into()]).unwrap();
    assert!(cluster.is_exposed("banana"));

    // Withdrawing the exposure removes it entirely rather than leaving an
    // empty entry behind.
    cluster.expose("banana", &[]).unwrap();
    assert!(!cluster.is_exposed("banana"));

    cluster.expose("banana", &["Banana".into()]).unwrap();
    cluster.disconnect(&banana).unwrap();
    assert!(!cluster.is_exposed("banana"));
    assert!(!cluster.is_connected(&banana));
    assert!(cluster.internal_components().is_empty());

    // The component is reusable after a full round trip.
    cluster.connect("banana", &banana).unwrap();
    assert!(cluster.is_connected_internally(&banana));
}

#[test]
fn roles_are_listed_disjointly() {
    let cluster = Cluster::new();
    let (banana, _) = testing::banana();
    let (apple, _) = testing::apple("hi");
    cluster.connect("banana", &banana).unwrap();
    cluster.connect("spare", &banana).unwrap();
    cluster.connect_external(&apple).unwrap();

    // Multi-bound components are listed once.
    assert_eq!(cluster.internal_components(), vec![banana.clone()]);
    assert_eq!(cluster.external_components(), vec![apple.clone()]);
}

#[test]
fn proxies_detach_when_the_topology_is_dropped() {
    let proxy = {
        let cluster = Cluster::new();
        let (banana, _cell) = testing::banana();
        cluster
            .connect_exposed("banana", &banana, &["Banana".into()])
            .unwrap();
        cluster.layer().proxy("banana", &"Banana".into()).unwrap()
    };

    assert!(!proxy.is_attached());
    let err = proxy.call("return_an_int", &[]).unwrap_err();
    assert!(matches!(err, InvokeError::Detached { .. }));
}

//! Capability discovery and endpoint registration.

use std::collections::BTreeSet;

use microplum::{BindError, BindState, Operation, ServiceEntity};

use crate::support::{
    client, inventory_service, widget_service, CatalogFacade, WidgetFacade, WidgetStore,
};

fn decorated(keys: &[&str]) -> BTreeSet<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

// ============================================================================
// Every present capability gets exactly one endpoint, plus the catch-all
// ============================================================================

#[test]
fn endpoints_match_capabilities() {
    let (client, transport) = client();
    let entity = widget_service(&client, &WidgetStore::seeded());

    assert_eq!(
        entity.capabilities(),
        vec![
            Operation::Find,
            Operation::FindById,
            Operation::Count,
            Operation::Create,
            Operation::UpdateById,
            Operation::RemoveById,
            Operation::Seed,
            Operation::Reset,
        ]
    );

    let registered: BTreeSet<String> = transport.patterns().into_iter().collect();
    assert_eq!(
        registered,
        decorated(&[
            "cmd:find,conditions:*,environment:production,role:widget,version:v1",
            "cmd:find,environment:production,id:*,role:widget,version:v1",
            "cmd:count,conditions:*,environment:production,role:widget,version:v1",
            "cmd:create,environment:production,input:*,role:widget,version:v1",
            "cmd:update,environment:production,id:*,input:*,role:widget,version:v1",
            "cmd:remove,environment:production,id:*,role:widget,version:v1",
            "cmd:seed,environment:production,role:widget,version:v1",
            "cmd:reset,environment:production,role:widget,version:v1",
            "cmd:*,environment:production,role:widget,version:v1",
        ])
    );
    assert_eq!(entity.state(), BindState::Bound);
}

#[test]
fn partial_facade_registers_only_its_capabilities() {
    let (client, transport) = client();
    let store = WidgetStore::seeded();
    let catalog = ServiceEntity::new("catalog", move |_ctx| CatalogFacade { store: store.clone() })
        .with_act(client.act());

    let pins = client.use_service(&catalog).unwrap();
    let keys: Vec<String> = pins.iter().map(|p| p.to_pattern_key()).collect();
    assert_eq!(
        keys,
        vec![
            "cmd:find,conditions:*,environment:production,role:catalog,version:v1".to_string(),
            "cmd:*,environment:production,role:catalog,version:v1".to_string(),
        ]
    );
    assert_eq!(transport.len(), 2);
    assert_eq!(
        client.listen_pins(),
        vec!["cmd:*,environment:production,role:catalog,version:v1".to_string()]
    );
}

#[test]
fn bulk_and_single_match_operations_register_distinct_patterns() {
    let (client, transport) = client();
    let entity = inventory_service(&client, &WidgetStore::seeded());

    assert_eq!(
        entity.capabilities(),
        vec![
            Operation::FindOne,
            Operation::Update,
            Operation::UpdateOne,
            Operation::Remove,
            Operation::RemoveOne,
            Operation::Clean,
        ]
    );

    let registered: BTreeSet<String> = transport.patterns().into_iter().collect();
    assert_eq!(
        registered,
        decorated(&[
            "cmd:findOne,conditions:*,environment:production,role:stock,version:v1",
            "cmd:updateAll,conditions:*,environment:production,input:*,role:stock,version:v1",
            "cmd:update,conditions:*,environment:production,input:*,role:stock,version:v1",
            "cmd:removeAll,conditions:*,environment:production,role:stock,version:v1",
            "cmd:remove,conditions:*,environment:production,role:stock,version:v1",
            "cmd:clean,environment:production,role:stock,version:v1",
            "cmd:*,environment:production,role:stock,version:v1",
        ])
    );
}

// ============================================================================
// Binding fails closed
// ============================================================================

#[test]
fn bind_without_act_registers_nothing() {
    let (client, transport) = client();
    let store = WidgetStore::seeded();
    let entity = ServiceEntity::new("widget", move |ctx| WidgetFacade::new(ctx, store.clone()));

    let err = client.use_service(&entity).unwrap_err();
    assert!(matches!(err, BindError::ActNotSet { ref role } if role == "widget"));
    assert!(transport.is_empty());
    assert!(client.listen_pins().is_empty());
}

#[test]
fn second_role_with_same_name_conflicts() {
    let (client, _transport) = client();
    let store = WidgetStore::seeded();
    widget_service(&client, &store);

    let again = ServiceEntity::new("widget", move |ctx| WidgetFacade::new(ctx, store.clone()))
        .with_act(client.act());
    let err = client.use_service(&again).unwrap_err();
    assert!(matches!(err, BindError::Transport(_)));
    assert_eq!(again.state(), BindState::Unbound);
}

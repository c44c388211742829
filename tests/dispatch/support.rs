//! Test domain: widgets kept in a shared in-memory store.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use microplum::facade::{
    CallContext, Clean, Conditions, Count, Create, Facade, Find, FindById, FindOne, Patch, Remove,
    RemoveById, RemoveOne, Reset, Seed, Update, UpdateById, UpdateOne,
};
use microplum::{
    Config, FieldError, HandlerError, InMemoryTransport, Pin, PlumError, RpcClient, ServiceEntity,
    Transport,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl Widget {
    pub fn new(id: &str, name: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            owner: None,
        }
    }
}

/// Failure of the backing store; never classified.
#[derive(Debug, thiserror::Error)]
#[error("store offline: {0}")]
pub struct StoreError(pub String);

#[derive(Clone, Default)]
pub struct WidgetStore(Arc<Mutex<BTreeMap<String, Widget>>>);

impl WidgetStore {
    pub fn seeded() -> Self {
        let store = Self::default();
        store.seed();
        store
    }

    pub fn seed(&self) {
        let mut widgets = self.0.lock();
        for widget in [
            Widget::new("w1", "sprocket", "red"),
            Widget::new("w2", "gear", "blue"),
            Widget::new("w3", "cog", "red"),
        ] {
            widgets.insert(widget.id.clone(), widget);
        }
    }

    pub fn get(&self, id: &str) -> Option<Widget> {
        self.0.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    fn query(&self, conditions: Option<&Conditions>) -> Vec<Widget> {
        self.0
            .lock()
            .values()
            .filter(|w| conditions.map_or(true, |c| matches(w, c)))
            .cloned()
            .collect()
    }

    fn patch(&self, id: &str, patch: &Patch) -> Result<Option<Widget>, HandlerError> {
        let Some(current) = self.get(id) else {
            return Ok(None);
        };
        let mut value = json!(current);
        if let Value::Object(fields) = &mut value {
            fields.extend(patch.clone());
        }
        let updated: Widget = serde_json::from_value(value)?;
        self.0.lock().insert(id.to_string(), updated.clone());
        Ok(Some(updated))
    }

    fn remove_matching(&self, conditions: Option<&Conditions>, limit: usize) -> Vec<Widget> {
        let ids: Vec<String> = self
            .query(conditions)
            .into_iter()
            .take(limit)
            .map(|w| w.id)
            .collect();
        let mut widgets = self.0.lock();
        ids.iter().filter_map(|id| widgets.remove(id)).collect()
    }
}

fn matches(widget: &Widget, conditions: &Conditions) -> bool {
    let value = json!(widget);
    conditions.iter().all(|(k, v)| value.get(k) == Some(v))
}

/// Full-featured facade. `removeById` is withheld from the `guest` caller.
pub struct WidgetFacade {
    ctx: CallContext,
    store: WidgetStore,
}

impl WidgetFacade {
    pub fn new(ctx: CallContext, store: WidgetStore) -> Self {
        Self { ctx, store }
    }
}

impl Facade for WidgetFacade {
    type Entity = Widget;

    microplum::capabilities!(create, find, find_by_id, update_by_id, count, seed, reset);

    fn as_remove_by_id(&self) -> Option<&dyn RemoveById<Widget>> {
        match self.ctx.caller().and_then(|c| c.user_id()) {
            Some("guest") => None,
            _ => Some(self),
        }
    }
}

#[async_trait]
impl Create<Widget> for WidgetFacade {
    async fn create(&self, mut input: Widget) -> Result<Widget, HandlerError> {
        if input.name.is_empty() {
            return Err(PlumError::validation([(
                "name",
                FieldError::new("required", "Name is required"),
            )])
            .into());
        }
        if input.name == "explode" {
            return Err(HandlerError::other(StoreError("disk unplugged".into())));
        }
        input.owner = self.ctx.caller().and_then(|c| c.user_id()).map(str::to_string);
        self.store.0.lock().insert(input.id.clone(), input.clone());
        Ok(input)
    }
}

#[async_trait]
impl Find<Widget> for WidgetFacade {
    async fn find(&self, conditions: Option<Conditions>) -> Result<Vec<Widget>, HandlerError> {
        Ok(self.store.query(conditions.as_ref()))
    }
}

#[async_trait]
impl FindById<Widget> for WidgetFacade {
    async fn find_by_id(&self, id: &str) -> Result<Option<Widget>, HandlerError> {
        match self.store.get(id) {
            Some(widget) => Ok(Some(widget)),
            None => Err(PlumError::not_found().into()),
        }
    }
}

#[async_trait]
impl UpdateById<Widget> for WidgetFacade {
    async fn update_by_id(&self, id: &str, patch: Patch) -> Result<Option<Widget>, HandlerError> {
        self.store.patch(id, &patch)
    }
}

#[async_trait]
impl RemoveById<Widget> for WidgetFacade {
    async fn remove_by_id(&self, id: &str) -> Result<Option<Widget>, HandlerError> {
        Ok(self.store.0.lock().remove(id))
    }
}

#[async_trait]
impl Count for WidgetFacade {
    async fn count(&self, conditions: Option<Conditions>) -> Result<u64, HandlerError> {
        Ok(self.store.query(conditions.as_ref()).len() as u64)
    }
}

/// Takes long enough to trip short transport timeouts.
#[async_trait]
impl Seed for WidgetFacade {
    async fn seed(&self) -> Result<(), HandlerError> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        self.store.seed();
        Ok(())
    }
}

#[async_trait]
impl Reset for WidgetFacade {
    async fn reset(&self, seed: bool) -> Result<(), HandlerError> {
        self.store.0.lock().clear();
        if seed {
            self.store.seed();
        }
        Ok(())
    }
}

/// Read-only facade exposing `find` only.
pub struct CatalogFacade {
    pub store: WidgetStore,
}

impl Facade for CatalogFacade {
    type Entity = Widget;
    microplum::capabilities!(find);
}

#[async_trait]
impl Find<Widget> for CatalogFacade {
    async fn find(&self, conditions: Option<Conditions>) -> Result<Vec<Widget>, HandlerError> {
        Ok(self.store.query(conditions.as_ref()))
    }
}

/// Bulk and single-match facade: everything keyed by `conditions`.
pub struct InventoryFacade {
    pub store: WidgetStore,
}

impl Facade for InventoryFacade {
    type Entity = Widget;
    microplum::capabilities!(find_one, update, update_one, remove, remove_one, clean);
}

#[async_trait]
impl FindOne<Widget> for InventoryFacade {
    async fn find_one(&self, conditions: Option<Conditions>) -> Result<Option<Widget>, HandlerError> {
        Ok(self.store.query(conditions.as_ref()).into_iter().next())
    }
}

#[async_trait]
impl Update<Widget> for InventoryFacade {
    async fn update(&self, conditions: Option<Conditions>, patch: Patch) -> Result<Vec<Widget>, HandlerError> {
        let mut updated = Vec::new();
        for widget in self.store.query(conditions.as_ref()) {
            updated.extend(self.store.patch(&widget.id, &patch)?);
        }
        Ok(updated)
    }
}

#[async_trait]
impl UpdateOne<Widget> for InventoryFacade {
    async fn update_one(
        &self,
        conditions: Option<Conditions>,
        patch: Patch,
    ) -> Result<Option<Widget>, HandlerError> {
        match self.store.query(conditions.as_ref()).into_iter().next() {
            Some(widget) => self.store.patch(&widget.id, &patch),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Remove<Widget> for InventoryFacade {
    async fn remove(&self, conditions: Option<Conditions>) -> Result<Vec<Widget>, HandlerError> {
        Ok(self.store.remove_matching(conditions.as_ref(), usize::MAX))
    }
}

#[async_trait]
impl RemoveOne<Widget> for InventoryFacade {
    async fn remove_one(&self, conditions: Option<Conditions>) -> Result<Option<Widget>, HandlerError> {
        Ok(self.store.remove_matching(conditions.as_ref(), 1).pop())
    }
}

#[async_trait]
impl Clean<Widget> for InventoryFacade {
    async fn clean(&self, conditions: Option<Conditions>) -> Result<Vec<Widget>, HandlerError> {
        Ok(self.store.remove_matching(conditions.as_ref(), usize::MAX))
    }
}

/// Facade that reports who it is calling on behalf of, through another
/// service.
pub struct ReportFacade {
    pub ctx: CallContext,
}

impl Facade for ReportFacade {
    type Entity = Value;
    microplum::capabilities!(find);
}

#[async_trait]
impl Find<Value> for ReportFacade {
    async fn find(&self, _conditions: Option<Conditions>) -> Result<Vec<Value>, HandlerError> {
        let seen = self.ctx.act(Pin::new("audit", "whoami")).await?;
        Ok(vec![seen])
    }
}

/// A client over a fresh in-memory transport, plus the transport itself.
pub fn client_with(config: Config, transport: InMemoryTransport) -> (RpcClient, Arc<InMemoryTransport>) {
    let transport = Arc::new(transport);
    let client = RpcClient::with_transport(transport.clone() as Arc<dyn Transport>, config);
    (client, transport)
}

pub fn client() -> (RpcClient, Arc<InMemoryTransport>) {
    client_with(Config::default(), InMemoryTransport::new())
}

/// A bound `stock` service over `store`, exposing [`InventoryFacade`].
pub fn inventory_service(client: &RpcClient, store: &WidgetStore) -> ServiceEntity<InventoryFacade> {
    let store = store.clone();
    let entity = ServiceEntity::new("stock", move |_ctx| InventoryFacade { store: store.clone() })
        .with_act(client.act());
    client.use_service(&entity).unwrap();
    entity
}

/// A bound widget service over a seeded store.
pub fn widget_service(client: &RpcClient, store: &WidgetStore) -> ServiceEntity<WidgetFacade> {
    let store = store.clone();
    let entity = ServiceEntity::new("widget", move |ctx| WidgetFacade::new(ctx, store.clone()))
        .with_act(client.act());
    client.use_service(&entity).unwrap();
    entity
}

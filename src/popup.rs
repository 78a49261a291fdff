use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::alert::AlertSink;
use crate::dialog::{DialogServices, PersonDialog};
use crate::error::{ClientError, ServiceResult};
use crate::events::EventBus;
use crate::modal::ModalRef;
use crate::models::{Id, Person};

/// String-keyed route parameters, e.g. `{"id": "42"}`.
pub type RouteParams = HashMap<String, String>;

/// A dialog that has been opened and initialised, plus the handle its
/// result arrives on.
pub struct OpenedDialog {
    pub dialog: PersonDialog,
    pub modal: ModalRef<Person>,
}

/// Builds person dialogs, optionally pre-loaded from the server.
#[derive(Clone)]
pub struct PersonPopupService {
    services: DialogServices,
    alerts: Arc<dyn AlertSink>,
    events: EventBus,
}

impl PersonPopupService {
    pub fn new(services: DialogServices, alerts: Arc<dyn AlertSink>, events: EventBus) -> Self {
        Self { services, alerts, events }
    }

    pub fn alerts(&self) -> &dyn AlertSink { self.alerts.as_ref() }

    pub async fn open(&self, id: Option<&str>) -> ServiceResult<OpenedDialog> {
        let person = match id {
            Some(raw) => {
                let id: Id = raw
                    .trim()
                    .parse()
                    .map_err(|_| ClientError::InvalidRoute(raw.to_string()))?;
                self.services.people.find(id).await?
            }
            None => Person::default(),
        };
        info!(id = ?person.id, "opening person dialog");
        let (mut dialog, modal) = PersonDialog::new(
            person,
            self.services.clone(),
            self.alerts.clone(),
            self.events.clone(),
        );
        dialog.init().await;
        Ok(OpenedDialog { dialog, modal })
    }
}

struct RouteSubscription {
    task: JoinHandle<()>,
}

impl RouteSubscription {
    fn unsubscribe(self) {
        self.task.abort();
    }
}

/// Opens a person dialog for every route activation.
pub struct PersonPopup {
    route_sub: Option<RouteSubscription>,
}

impl PersonPopup {
    /// Subscribes to `route`. The current parameters count as the first
    /// activation. Opened dialogs are delivered on the returned channel.
    pub fn init(
        mut route: watch::Receiver<RouteParams>,
        service: Arc<PersonPopupService>,
    ) -> (Self, mpsc::UnboundedReceiver<OpenedDialog>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            loop {
                let params = route.borrow_and_update().clone();
                match service.open(params.get("id").map(String::as_str)).await {
                    Ok(opened) => {
                        if tx.send(opened).is_err() {
                            break;
                        }
                    }
                    Err(e) => service.alerts().error(&e.alert_message()),
                }
                if route.changed().await.is_err() {
                    break;
                }
            }
        });
        (Self { route_sub: Some(RouteSubscription { task }) }, rx)
    }

    pub fn is_subscribed(&self) -> bool { self.route_sub.is_some() }

    /// Releases the route subscription. Returns false if it was already released.
    pub fn destroy(&mut self) -> bool {
        match self.route_sub.take() {
            Some(sub) => {
                sub.unsubscribe();
                debug!("person popup route subscription released");
                true
            }
            None => false,
        }
    }
}

impl Drop for PersonPopup {
    fn drop(&mut self) {
        self.destroy();
    }
}

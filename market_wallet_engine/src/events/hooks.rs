use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{BalanceChangedEvent, EventHandler, EventProducer, Handler};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub balance_changed_producer: Vec<EventProducer<BalanceChangedEvent>>,
}

pub struct EventHandlers {
    pub on_balance_changed: Option<EventHandler<BalanceChangedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_balance_changed = hooks.on_balance_changed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_balance_changed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_balance_changed {
            result.balance_changed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_balance_changed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_balance_changed: Option<Handler<BalanceChangedEvent>>,
}

impl EventHooks {
    pub fn on_balance_changed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(BalanceChangedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_balance_changed = Some(Arc::new(f));
        self
    }
}

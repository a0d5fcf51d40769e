use crate::actions::{self, Action};
use crate::cache::Cache;
use crate::effects::{self, Effect};
use crate::store::Store;
use std::sync::mpsc::{self, Receiver, Sender};

pub struct State {
    pub store: Store,
    pub cache: Cache,
    action_queue: Vec<Action>,
    effect_queue: Vec<Effect>,
    inbox: Receiver<Action>,
    outbox: Sender<Action>,
}

impl State {
    pub fn new(store: Store) -> Self {
        let (outbox, inbox) = mpsc::channel();
        Self {
            store,
            cache: Cache::new(),
            action_queue: Vec::new(),
            effect_queue: Vec::new(),
            inbox,
            outbox,
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        self.action_queue.push(action);
    }

    /// Handle for tasks that finish outside the frame loop, such as the
    /// browser file picker. Their actions run at the next flush.
    pub fn sender(&self) -> Sender<Action> {
        self.outbox.clone()
    }

    pub fn flush_actions(&mut self) {
        let mut actions: Vec<Action> = self.inbox.try_iter().collect();
        actions.append(&mut self.action_queue);
        for action in actions {
            let mut effects = actions::update(&mut self.store, action);
            self.effect_queue.append(&mut effects);
        }
    }

    pub fn flush_effects(&mut self) {
        let effects = std::mem::take(&mut self.effect_queue);
        for effect in effects {
            effects::run(&mut self.store, effect);
        }
    }
}

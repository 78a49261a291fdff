use std::sync::Mutex;

use tokio::sync::oneshot;

/// How a modal was closed.
#[derive(Debug, Clone, PartialEq)]
pub enum Dismissal<T> {
    Cancel,
    Saved(T),
}

/// The side held by the dialog. First dismissal wins.
pub struct ModalHandle<T> {
    tx: Mutex<Option<oneshot::Sender<Dismissal<T>>>>,
}

/// The side held by whoever opened the modal.
pub struct ModalRef<T> {
    rx: oneshot::Receiver<Dismissal<T>>,
}

pub fn modal<T>() -> (ModalHandle<T>, ModalRef<T>) {
    let (tx, rx) = oneshot::channel();
    (ModalHandle { tx: Mutex::new(Some(tx)) }, ModalRef { rx })
}

impl<T> ModalHandle<T> {
    pub fn is_open(&self) -> bool {
        self.tx.lock().map(|tx| tx.is_some()).unwrap_or(false)
    }

    /// Returns false when the modal was already closed.
    pub fn dismiss(&self, outcome: Dismissal<T>) -> bool {
        let sender = match self.tx.lock() {
            Ok(mut tx) => tx.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match sender {
            // opener may have stopped listening; the modal is closed either way
            Some(tx) => {
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }
}

impl<T> ModalRef<T> {
    /// Waits for the dismissal. `None` if the dialog went away without one.
    pub async fn result(self) -> Option<Dismissal<T>> {
        self.rx.await.ok()
    }

    pub fn try_result(&mut self) -> Option<Dismissal<T>> {
        self.rx.try_recv().ok()
    }
}

use std::cell::Cell;
use std::rc::Rc;

// Clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct SubmitGuard {
    busy: Rc<Cell<bool>>,
}

#[derive(Debug)]
pub struct SubmitTicket {
    busy: Rc<Cell<bool>>,
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub fn try_acquire(&self) -> Option<SubmitTicket> {
        if self.busy.replace(true) {
            return None;
        }
        Some(SubmitTicket {
            busy: self.busy.clone(),
        })
    }
}

impl Drop for SubmitTicket {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}

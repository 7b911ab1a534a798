use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::debounce::DebounceTimer;
use crate::error::Result;
use crate::session::Session;
use crate::surface::RenderSurface;

struct Shared<S> {
    session: Session,
    surface: S,
}

fn lock<S>(shared: &Mutex<Shared<S>>) -> MutexGuard<'_, Shared<S>> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns a session and its surface for hosts without a frame loop.
///
/// Each [`update`](Self::update) pushes view state straight away and arms the
/// debounce timer when slice inputs changed; the timer thread runs the
/// recompute once the burst goes quiet.
pub struct SessionDriver<S: RenderSurface + Send + 'static> {
    shared: Arc<Mutex<Shared<S>>>,
    timer: DebounceTimer,
}

impl<S: RenderSurface + Send + 'static> SessionDriver<S> {
    pub fn spawn(session: Session, surface: S) -> Result<Self> {
        let shared = Arc::new(Mutex::new(Shared { session, surface }));
        let timer = {
            let shared = Arc::clone(&shared);
            DebounceTimer::spawn(move |generation| {
                let mut guard = lock(&shared);
                let Shared { session, surface } = &mut *guard;
                if !session.fire_if_current(generation, surface) {
                    log::trace!("Recompute {generation} superseded or unchanged");
                }
            })?
        };
        Ok(Self { shared, timer })
    }

    /// Mutate the session, then push view state and schedule a recompute.
    pub fn update<R>(&self, f: impl FnOnce(&mut Session, &mut S) -> R) -> R {
        let mut guard = lock(&self.shared);
        let Shared { session, surface } = &mut *guard;
        let out = f(session, surface);
        session.apply_view(surface);
        if let Some(pending) = session.request_recompute(Instant::now()) {
            self.timer.arm(pending);
        }
        out
    }

    pub fn inspect<R>(&self, f: impl FnOnce(&Session, &S) -> R) -> R {
        let guard = lock(&self.shared);
        f(&guard.session, &guard.surface)
    }
}

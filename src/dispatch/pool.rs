//! Reuse pool for request contexts.
//!
//! # Responsibilities
//! - Hand out reset contexts to concurrent requests
//! - Take contexts back on every exit path, panics included
//!
//! # Design Decisions
//! - A mutex-guarded free list; the lock is held only to push or pop
//! - Release happens in `Drop` of the lease guard, so it cannot be skipped
//!   and cannot happen twice
//! - Idle contexts beyond `max_idle` are dropped instead of retained

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

use crate::dispatch::context::Ctx;

/// Pool of reusable [`Ctx`] values.
#[derive(Debug)]
pub struct CtxPool {
    free: Mutex<Vec<Box<Ctx>>>,
    max_idle: usize,
}

impl CtxPool {
    pub fn new(max_idle: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(max_idle.min(1024))),
            max_idle,
        }
    }

    /// Lease a context. It returns to the pool when the guard drops.
    pub fn acquire(&self) -> PooledCtx<'_> {
        let reused = self
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        let mut ctx = reused.unwrap_or_else(|| Box::new(Ctx::new()));
        assert!(!ctx.leased, "context handed out while still leased");
        ctx.leased = true;
        PooledCtx {
            pool: self,
            ctx: Some(ctx),
        }
    }

    /// Number of idle contexts waiting for reuse.
    pub fn idle(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn release(&self, mut ctx: Box<Ctx>) {
        assert!(ctx.leased, "context released twice");
        ctx.reset();
        ctx.leased = false;

        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < self.max_idle {
            free.push(ctx);
        }
    }
}

/// A leased context; derefs to [`Ctx`].
pub struct PooledCtx<'a> {
    pool: &'a CtxPool,
    ctx: Option<Box<Ctx>>,
}

impl Deref for PooledCtx<'_> {
    type Target = Ctx;

    fn deref(&self) -> &Ctx {
        self.ctx.as_deref().expect("context used after release")
    }
}

impl DerefMut for PooledCtx<'_> {
    fn deref_mut(&mut self) -> &mut Ctx {
        self.ctx.as_deref_mut().expect("context used after release")
    }
}

impl Drop for PooledCtx<'_> {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            self.pool.release(ctx);
        }
    }
}

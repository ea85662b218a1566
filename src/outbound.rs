//! Outbound queue and its writer task.
//!
//! Handlers never touch the socket. Replies are split into lines and queued
//! per target (channel or nick); a single [`OutboundWriter`] takes them in
//! round-robin order across targets and FIFO order within one, spaces them
//! with a `governor` limiter and hands them to whichever session is
//! currently attached. A line stays outstanding until the session has
//! written it to the socket; lines a dying session never wrote are put back
//! in their original order. The queue outlives reconnects; entries older
//! than the TTL are dropped instead of sent.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use parking_lot::Mutex;
use tokio::sync::{Notify, mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::irc::{Command, Message};

/// Sender half of the current session's write channel.
pub type WireSender = mpsc::Sender<Outgoing>;

/// One queued line.
#[derive(Debug, Clone)]
pub struct Outgoing {
    pub target: String,
    pub text: String,
    /// Enqueue order, used to put returned lines back in place.
    seq: u64,
    enqueued_at: Instant,
}

impl Outgoing {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.enqueued_at.elapsed() > ttl
    }

    /// The PRIVMSG that carries this line.
    pub fn to_message(&self) -> Message {
        Command::PRIVMSG(self.target.clone(), self.text.clone()).into()
    }
}

#[derive(Debug, Default)]
struct QueueState {
    per_target: HashMap<String, VecDeque<Outgoing>>,
    /// Targets with queued lines, in service order.
    order: VecDeque<String>,
    /// Queued lines plus lines taken by the writer and not yet acknowledged.
    outstanding: usize,
    next_seq: u64,
}

impl QueueState {
    fn drop_expired(&mut self, ttl: Duration) -> usize {
        let mut dropped = 0;
        for queue in self.per_target.values_mut() {
            let before = queue.len();
            queue.retain(|item| !item.is_expired(ttl));
            dropped += before - queue.len();
        }
        self.per_target.retain(|_, queue| !queue.is_empty());
        let per_target = &self.per_target;
        self.order.retain(|target| per_target.contains_key(target));
        self.outstanding -= dropped;
        dropped
    }
}

pub struct OutboundQueue {
    ttl: Duration,
    state: Mutex<QueueState>,
    ready: Notify,
    idle: Notify,
    link: watch::Sender<Option<WireSender>>,
}

impl OutboundQueue {
    pub fn new(ttl: Duration) -> Self {
        let (link, _) = watch::channel(None);
        Self {
            ttl,
            state: Mutex::new(QueueState::default()),
            ready: Notify::new(),
            idle: Notify::new(),
            link,
        }
    }

    /// Queue `text` for `target`, one entry per non-empty line. Returns the
    /// number of lines queued.
    pub fn enqueue(&self, target: &str, text: &str) -> usize {
        let now = Instant::now();
        let lines: Vec<_> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return 0;
        }

        {
            let mut state = self.state.lock();
            let QueueState {
                per_target,
                order,
                outstanding,
                next_seq,
            } = &mut *state;
            let queue = per_target.entry(target.to_string()).or_insert_with(|| {
                order.push_back(target.to_string());
                VecDeque::new()
            });
            for line in &lines {
                queue.push_back(Outgoing {
                    target: target.to_string(),
                    text: (*line).to_string(),
                    seq: *next_seq,
                    enqueued_at: now,
                });
                *next_seq += 1;
            }
            *outstanding += lines.len();
        }

        debug!(target = %target, lines = lines.len(), "Queued outbound message");
        self.ready.notify_one();
        lines.len()
    }

    /// Take the next live entry, dropping expired ones on the way.
    pub fn pop(&self) -> Option<Outgoing> {
        let mut state = self.state.lock();
        let mut dropped = 0;
        let mut found = None;

        while let Some(target) = state.order.pop_front() {
            let Some(queue) = state.per_target.get_mut(&target) else {
                continue;
            };
            while let Some(item) = queue.pop_front() {
                if item.is_expired(self.ttl) {
                    dropped += 1;
                    continue;
                }
                found = Some(item);
                break;
            }
            if queue.is_empty() {
                state.per_target.remove(&target);
            } else {
                state.order.push_back(target);
            }
            if found.is_some() {
                break;
            }
        }

        state.outstanding -= dropped;
        let now_idle = state.outstanding == 0;
        drop(state);

        if dropped > 0 {
            debug!(dropped, "Dropped expired outbound messages");
        }
        if now_idle && dropped > 0 {
            self.idle.notify_waiters();
        }
        found
    }

    /// Wait until an entry is available.
    pub async fn next(&self) -> Outgoing {
        loop {
            if let Some(item) = self.pop() {
                return item;
            }
            self.ready.notified().await;
        }
    }

    /// Put back an entry that was taken but never written. It lands ahead
    /// of every later line for its target, whatever order entries return in.
    pub fn requeue(&self, item: Outgoing) {
        {
            let mut state = self.state.lock();
            let QueueState {
                per_target, order, ..
            } = &mut *state;
            let target = item.target.clone();
            let queue = per_target.entry(target.clone()).or_insert_with(|| {
                order.push_front(target);
                VecDeque::new()
            });
            let pos = queue.partition_point(|queued| queued.seq < item.seq);
            queue.insert(pos, item);
        }
        self.ready.notify_one();
    }

    /// Acknowledge an entry taken with [`pop`](Self::pop) or [`next`](Self::next)
    /// once it has been written or dropped.
    pub fn mark_done(&self) {
        let now_idle = {
            let mut state = self.state.lock();
            state.outstanding = state.outstanding.saturating_sub(1);
            state.outstanding == 0
        };
        if now_idle {
            self.idle.notify_waiters();
        }
    }

    /// Take back every line a finished session received but never wrote.
    /// Closes the channel so the writer cannot push more into it.
    pub fn reclaim(&self, wire: &mut mpsc::Receiver<Outgoing>) -> usize {
        wire.close();
        let mut reclaimed = 0;
        while let Ok(item) = wire.try_recv() {
            self.requeue(item);
            reclaimed += 1;
        }
        if reclaimed > 0 {
            info!(reclaimed, "Requeued unsent outbound messages");
        }
        reclaimed
    }

    /// Drop every entry older than the TTL. Called when a new session attaches.
    pub fn prune_expired(&self) -> usize {
        let (dropped, now_idle) = {
            let mut state = self.state.lock();
            let dropped = state.drop_expired(self.ttl);
            (dropped, state.outstanding == 0)
        };
        if dropped > 0 {
            info!(dropped, "Dropped stale outbound messages");
            if now_idle {
                self.idle.notify_waiters();
            }
        }
        dropped
    }

    /// Resolve once nothing is queued or in flight.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.state.lock().outstanding == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Number of queued entries, excluding the one the writer holds.
    pub fn len(&self) -> usize {
        self.state.lock().per_target.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Route writes to a freshly registered session.
    pub fn attach(&self, sender: WireSender) {
        self.prune_expired();
        self.link.send_replace(Some(sender));
    }

    /// Stop routing writes; entries stay queued until the next attach.
    pub fn detach(&self) {
        self.link.send_replace(None);
    }

    fn subscribe(&self) -> watch::Receiver<Option<WireSender>> {
        self.link.subscribe()
    }
}

/// The single task that drains the [`OutboundQueue`].
pub struct OutboundWriter {
    queue: Arc<OutboundQueue>,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl OutboundWriter {
    /// `spacing` is the minimum delay between two writes; zero disables it.
    pub fn new(queue: Arc<OutboundQueue>, spacing: Duration) -> Self {
        Self {
            queue,
            limiter: Quota::with_period(spacing).map(RateLimiter::direct),
        }
    }

    pub async fn run(self, stop: CancellationToken) {
        let mut link = self.queue.subscribe();

        loop {
            let sender = tokio::select! {
                _ = stop.cancelled() => break,
                changed = link.wait_for(Option::is_some) => match changed {
                    Ok(current) => current.clone(),
                    Err(_) => break,
                },
            };
            let Some(sender) = sender else { continue };

            let item = tokio::select! {
                _ = stop.cancelled() => break,
                item = self.queue.next() => item,
            };

            if let Some(limiter) = &self.limiter {
                tokio::select! {
                    _ = stop.cancelled() => {
                        self.queue.requeue(item);
                        break;
                    }
                    _ = limiter.until_ready() => {}
                }
            }

            if item.is_expired(self.queue.ttl) {
                debug!(target = %item.target, "Dropped expired outbound message");
                self.queue.mark_done();
                continue;
            }

            // The session acknowledges the line once it is on the socket.
            if let Err(mpsc::error::SendError(item)) = sender.send(item).await {
                debug!(target = %item.target, "Session gone, requeueing");
                self.queue.requeue(item);
                // Hold off until the supervisor swaps the link.
                tokio::select! {
                    _ = stop.cancelled() => break,
                    changed = link.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }

        debug!("Outbound writer stopped");
    }
}

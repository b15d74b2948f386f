//! Two-copy settings state machine.
//!
//! `authoritative` is the last record confirmed by the store, `working` is the
//! record presented for editing. Every request is tagged with a monotonic
//! sequence number. Per flag, the state remembers the newest local write and
//! the request whose response produced the confirmed value, so a late response
//! can never overwrite a newer edit or a newer confirmation of the same flag.
//!
//! Nothing here awaits; the service drives transitions around store calls.

use std::time::Duration;

use site_settings_sdk::flags::SettingsFlag;
use site_settings_sdk::models::{
    FlagControl, SaveNoticeKind, SettingsSnapshot, SiteSettings, SiteSettingsUpdate,
};
use tokio::time::Instant;
use tracing::debug;

use super::error::DomainError;

/// Kind of store request a ticket was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Load,
    Toggle(SettingsFlag),
    SaveAll,
}

impl RequestKind {
    /// Whether a response to this request carries a value for `flag`.
    const fn covers(self, flag: SettingsFlag) -> bool {
        match self {
            Self::Toggle(target) => target.index() == flag.index(),
            Self::Load | Self::SaveAll => true,
        }
    }

    const fn is_write(self) -> bool {
        !matches!(self, Self::Load)
    }
}

const fn flag_bit(flag: SettingsFlag) -> u8 {
    1 << flag.index()
}

/// Handle of an in-flight store request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Ticket {
    seq: u64,
    kind: RequestKind,
    /// Loads only: flags with a write in flight when the load was issued.
    contended: u8,
}

impl Ticket {
    #[must_use]
    pub const fn seq(self) -> u64 {
        self.seq
    }

    #[must_use]
    pub const fn kind(self) -> RequestKind {
        self.kind
    }
}

/// Whether a response changed the state or was superseded by newer work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Stale,
}

#[derive(Debug, Clone, Copy)]
struct SaveNotice {
    kind: SaveNoticeKind,
    until: Instant,
}

#[derive(Debug)]
pub struct SettingsState {
    authoritative: Option<SiteSettings>,
    working: Option<SiteSettings>,
    in_flight: usize,
    last_error: Option<DomainError>,
    next_seq: u64,
    /// Newest sequence number that wrote each flag, indexed by `SettingsFlag::index`.
    latest_write: [u64; SettingsFlag::COUNT],
    /// Sequence number of the response each authoritative flag came from.
    confirmed_seq: [u64; SettingsFlag::COUNT],
    /// Write requests in flight per flag.
    writes_in_flight: [usize; SettingsFlag::COUNT],
    notice: Option<SaveNotice>,
    toggle_notice: Duration,
    save_notice: Duration,
}

impl SettingsState {
    #[must_use]
    pub fn new(toggle_notice: Duration, save_notice: Duration) -> Self {
        Self {
            authoritative: None,
            working: None,
            in_flight: 0,
            last_error: None,
            next_seq: 0,
            latest_write: [0; SettingsFlag::COUNT],
            confirmed_seq: [0; SettingsFlag::COUNT],
            writes_in_flight: [0; SettingsFlag::COUNT],
            notice: None,
            toggle_notice,
            save_notice,
        }
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.authoritative.is_some()
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.in_flight > 0
    }

    #[must_use]
    pub const fn authoritative(&self) -> Option<&SiteSettings> {
        self.authoritative.as_ref()
    }

    /// # Errors
    /// [`DomainError::NotReady`] before the first successful load.
    pub fn working(&self) -> Result<&SiteSettings, DomainError> {
        self.working.as_ref().ok_or(DomainError::NotReady)
    }

    #[must_use]
    pub const fn last_error(&self) -> Option<&DomainError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    #[must_use]
    pub fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            authoritative: self.authoritative.clone(),
            working: self.working.clone(),
            pending: self.is_pending(),
            last_error: self.last_error.clone().map(Into::into),
        }
    }

    /// # Errors
    /// [`DomainError::NotReady`] before the first successful load.
    pub fn effective(&self, flag: SettingsFlag) -> Result<bool, DomainError> {
        self.working().map(|w| w.effective(flag))
    }

    /// Panel rows. Gated flags are locked in portfolio mode and everything is
    /// locked while a request is in flight.
    ///
    /// # Errors
    /// [`DomainError::NotReady`] before the first successful load.
    pub fn controls(&self) -> Result<Vec<FlagControl>, DomainError> {
        let working = self.working()?;
        let busy = self.is_pending();

        Ok(SettingsFlag::ALL
            .into_iter()
            .map(|flag| {
                let descriptor = flag.descriptor();
                FlagControl {
                    flag,
                    title: descriptor.title,
                    description: descriptor.description,
                    stored: working.get(flag),
                    effective: working.effective(flag),
                    locked: busy || (descriptor.gated && working.is_portfolio_mode()),
                }
            })
            .collect())
    }

    #[must_use]
    pub fn active_notice(&self, now: Instant) -> Option<SaveNoticeKind> {
        self.notice
            .filter(|notice| now < notice.until)
            .map(|notice| notice.kind)
    }

    /// Local edit without persistence. Counts as the newest write of `flag`.
    ///
    /// # Errors
    /// [`DomainError::NotReady`] before the first successful load.
    pub fn stage(&mut self, flag: SettingsFlag, value: bool) -> Result<(), DomainError> {
        let working = self.working.as_mut().ok_or(DomainError::NotReady)?;
        working.set(flag, value);
        self.next_seq += 1;
        self.latest_write[flag.index()] = self.next_seq;
        Ok(())
    }

    pub fn begin_load(&mut self) -> Ticket {
        self.issue(RequestKind::Load)
    }

    /// Flips `flag` in the working record and returns the value to persist.
    ///
    /// # Errors
    /// [`DomainError::NotReady`] before the first successful load.
    pub fn begin_toggle(&mut self, flag: SettingsFlag) -> Result<(Ticket, bool), DomainError> {
        let working = self.working.as_mut().ok_or(DomainError::NotReady)?;
        let value = !working.get(flag);
        working.set(flag, value);
        Ok((self.issue(RequestKind::Toggle(flag)), value))
    }

    /// # Errors
    /// [`DomainError::NotReady`] before the first successful load.
    pub fn begin_save_all(&mut self) -> Result<(Ticket, SiteSettingsUpdate), DomainError> {
        let update = self.working()?.to_update();
        Ok((self.issue(RequestKind::SaveAll), update))
    }

    /// Applies a record the store confirmed for `ticket`.
    ///
    /// Each flag the request covers takes the confirmed value unless a newer
    /// response already confirmed that flag. A load skips flags that had a
    /// write in flight at any point while it ran.
    pub fn confirm(&mut self, ticket: Ticket, confirmed: SiteSettings, now: Instant) -> Outcome {
        self.settle(ticket);

        if self.authoritative.is_none() {
            self.confirmed_seq = [ticket.seq; SettingsFlag::COUNT];
            self.authoritative = Some(confirmed.clone());
            self.working = Some(confirmed);
            self.last_error = None;
            return Outcome::Applied;
        }

        let applied: Vec<SettingsFlag> = SettingsFlag::ALL
            .into_iter()
            .filter(|flag| self.accepts(ticket, *flag))
            .collect();
        if applied.is_empty() {
            debug!(
                seq = ticket.seq,
                kind = ?ticket.kind,
                "discarding confirmation superseded for every flag it covers"
            );
            return Outcome::Stale;
        }

        if let Some(authoritative) = self.authoritative.as_mut() {
            for flag in &applied {
                authoritative.set(*flag, confirmed.get(*flag));
                self.confirmed_seq[flag.index()] = ticket.seq;
            }
            authoritative.last_updated = authoritative.last_updated.max(confirmed.last_updated);

            if let Some(working) = self.working.as_mut() {
                for flag in &applied {
                    if self.latest_write[flag.index()] <= ticket.seq {
                        working.set(*flag, authoritative.get(*flag));
                    }
                }
                working.last_updated = authoritative.last_updated;
            }
        }
        self.last_error = None;

        let notice = match ticket.kind {
            RequestKind::Toggle(_) => Some((SaveNoticeKind::FlagToggled, self.toggle_notice)),
            RequestKind::SaveAll => Some((SaveNoticeKind::AllSaved, self.save_notice)),
            RequestKind::Load => None,
        };
        if let Some((kind, visible_for)) = notice {
            self.notice = Some(SaveNotice {
                kind,
                until: now + visible_for,
            });
        }

        Outcome::Applied
    }

    /// Applies a failed store request for `ticket`.
    ///
    /// A failed toggle restores the flag from the authoritative record unless
    /// a newer write of the same flag has been issued since. A failed save
    /// keeps the working record untouched.
    pub fn reject(&mut self, ticket: Ticket, error: DomainError) -> Outcome {
        self.settle(ticket);

        match ticket.kind {
            RequestKind::Toggle(flag) => {
                if self.latest_write[flag.index()] != ticket.seq {
                    debug!(%flag, seq = ticket.seq, "ignoring failure of superseded toggle");
                    return Outcome::Stale;
                }
                if let (Some(working), Some(confirmed)) =
                    (self.working.as_mut(), self.authoritative.as_ref())
                {
                    working.set(flag, confirmed.get(flag));
                }
            }
            RequestKind::Load => {
                if self.authoritative.is_some()
                    && self.confirmed_seq.iter().all(|seq| *seq > ticket.seq)
                {
                    return Outcome::Stale;
                }
            }
            RequestKind::SaveAll => {}
        }

        self.last_error = Some(error);
        Outcome::Applied
    }

    fn accepts(&self, ticket: Ticket, flag: SettingsFlag) -> bool {
        let i = flag.index();
        if !ticket.kind.covers(flag) || ticket.seq <= self.confirmed_seq[i] {
            return false;
        }
        ticket.kind.is_write()
            || ((ticket.contended & flag_bit(flag)) == 0 && self.writes_in_flight[i] == 0)
    }

    fn settle(&mut self, ticket: Ticket) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if ticket.kind.is_write() {
            for flag in SettingsFlag::ALL {
                if ticket.kind.covers(flag) {
                    let count = &mut self.writes_in_flight[flag.index()];
                    *count = count.saturating_sub(1);
                }
            }
        }
    }

    fn issue(&mut self, kind: RequestKind) -> Ticket {
        self.next_seq += 1;
        let seq = self.next_seq;
        let mut contended = 0;
        for flag in SettingsFlag::ALL {
            let i = flag.index();
            if kind.is_write() {
                if kind.covers(flag) {
                    self.latest_write[i] = seq;
                    self.writes_in_flight[i] += 1;
                }
            } else if self.writes_in_flight[i] > 0 {
                contended |= flag_bit(flag);
            }
        }
        self.in_flight += 1;
        Ticket {
            seq,
            kind,
            contended,
        }
    }
}

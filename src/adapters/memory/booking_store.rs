//! In-memory booking store.
//!
//! Serves development and tests. Each transaction works on a private
//! snapshot taken at `begin` and buffers its writes until `commit`.
//!
//! # Serializability
//!
//! Validation is optimistic and space-granular. Every committed write to a
//! space (a reservation on it, its status, a payment or invoice for one of
//! its reservations) bumps that space's version. On commit a transaction
//! fails with a serialization failure if any space it wrote, or at
//! `Serializable` any space it read, has a newer version than when it
//! began. First committer wins; transactions on unrelated spaces never
//! interfere.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::foundation::{InvoiceId, PaymentId, ReservationId, SpaceId, UserId};
use crate::domain::payment::{Invoice, Payment};
use crate::domain::reservation::{Reservation, TimeWindow};
use crate::domain::space::{Space, SpaceStatus};
use crate::domain::user::User;
use crate::ports::{BookingStore, BookingTransaction, IsolationLevel, StoreError};

#[derive(Debug, Clone, Default)]
struct Tables {
    spaces: HashMap<SpaceId, Space>,
    users: HashMap<UserId, User>,
    reservations: HashMap<ReservationId, Reservation>,
    payments: HashMap<PaymentId, Payment>,
    invoices: HashMap<InvoiceId, Invoice>,
}

impl Tables {
    fn space_of_reservation(&self, id: &ReservationId) -> Option<SpaceId> {
        self.reservations.get(id).map(|r| r.space_id)
    }

    fn space_of_payment(&self, id: &PaymentId) -> Option<SpaceId> {
        self.payments
            .get(id)
            .and_then(|p| self.space_of_reservation(&p.reservation_id))
    }
}

#[derive(Debug, Default)]
struct Shared {
    tables: Tables,
    space_versions: HashMap<SpaceId, u64>,
    commit_failures: VecDeque<StoreError>,
    committed: u64,
}

#[derive(Debug, Clone)]
enum Write {
    InsertReservation(Reservation),
    UpdateReservation(Reservation),
    SpaceStatus(SpaceId, SpaceStatus),
    InsertPayment(Payment),
    UpdatePayment(Payment),
    InsertInvoice(Invoice),
}

/// In-memory implementation of [`BookingStore`].
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(InMemoryBookingStore::new());
/// store.add_space(space.clone());
/// store.add_user(member.clone());
///
/// create.handle(cmd).await?;
/// assert_eq!(store.reservations().len(), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryBookingStore {
    shared: Arc<Mutex<Shared>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // === Seeding ===

    pub fn add_space(&self, space: Space) {
        self.shared().tables.spaces.insert(space.id, space);
    }

    pub fn add_user(&self, user: User) {
        self.shared().tables.users.insert(user.id, user);
    }

    /// Makes the next commit fail with `error` before validation runs.
    pub fn fail_next_commit(&self, error: StoreError) {
        self.shared().commit_failures.push_back(error);
    }

    // === Inspection ===

    pub fn space(&self, id: &SpaceId) -> Option<Space> {
        self.shared().tables.spaces.get(id).cloned()
    }

    pub fn reservation(&self, id: &ReservationId) -> Option<Reservation> {
        self.shared().tables.reservations.get(id).cloned()
    }

    pub fn reservations(&self) -> Vec<Reservation> {
        self.shared().tables.reservations.values().cloned().collect()
    }

    pub fn payments(&self) -> Vec<Payment> {
        self.shared().tables.payments.values().cloned().collect()
    }

    pub fn payment_for_reservation(&self, id: &ReservationId) -> Option<Payment> {
        self.shared()
            .tables
            .payments
            .values()
            .find(|p| &p.reservation_id == id)
            .cloned()
    }

    pub fn invoices(&self) -> Vec<Invoice> {
        self.shared().tables.invoices.values().cloned().collect()
    }

    /// Number of successful commits so far.
    pub fn committed(&self) -> u64 {
        self.shared().committed
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn begin(&self, isolation: IsolationLevel) -> Result<Box<dyn BookingTransaction>, StoreError> {
        let shared = self.shared();
        Ok(Box::new(InMemoryTransaction {
            shared: Arc::clone(&self.shared),
            isolation,
            working: shared.tables.clone(),
            versions_at_start: shared.space_versions.clone(),
            read_spaces: HashSet::new(),
            written_spaces: HashSet::new(),
            writes: Vec::new(),
        }))
    }
}

struct InMemoryTransaction {
    shared: Arc<Mutex<Shared>>,
    isolation: IsolationLevel,
    working: Tables,
    versions_at_start: HashMap<SpaceId, u64>,
    read_spaces: HashSet<SpaceId>,
    written_spaces: HashSet<SpaceId>,
    writes: Vec<Write>,
}

impl InMemoryTransaction {
    fn touch_read(&mut self, space_id: Option<SpaceId>) {
        if let Some(id) = space_id {
            self.read_spaces.insert(id);
        }
    }

    fn touch_write(&mut self, space_id: Option<SpaceId>) {
        if let Some(id) = space_id {
            self.written_spaces.insert(id);
        }
    }

    fn validate(&self, shared: &Shared) -> Result<(), StoreError> {
        let mut checked: HashSet<&SpaceId> = self.written_spaces.iter().collect();
        if self.isolation == IsolationLevel::Serializable {
            checked.extend(self.read_spaces.iter());
        }
        for space_id in checked {
            let started = self.versions_at_start.get(space_id).copied().unwrap_or(0);
            let current = shared.space_versions.get(space_id).copied().unwrap_or(0);
            if current != started {
                return Err(StoreError::serialization_failure(format!(
                    "could not serialize access due to concurrent update of space {}",
                    space_id
                )));
            }
        }
        Ok(())
    }
}

fn apply(tables: &mut Tables, write: Write) {
    match write {
        Write::InsertReservation(r) | Write::UpdateReservation(r) => {
            tables.reservations.insert(r.id, r);
        }
        Write::SpaceStatus(id, status) => {
            if let Some(space) = tables.spaces.get_mut(&id) {
                space.status = status;
            }
        }
        Write::InsertPayment(p) | Write::UpdatePayment(p) => {
            tables.payments.insert(p.id, p);
        }
        Write::InsertInvoice(i) => {
            tables.invoices.insert(i.id, i);
        }
    }
}

#[async_trait]
impl BookingTransaction for InMemoryTransaction {
    async fn find_space(&mut self, id: &SpaceId) -> Result<Option<Space>, StoreError> {
        self.touch_read(Some(*id));
        Ok(self.working.spaces.get(id).cloned())
    }

    async fn find_user(&mut self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.working.users.get(id).cloned())
    }

    async fn find_reservation(&mut self, id: &ReservationId) -> Result<Option<Reservation>, StoreError> {
        let space = self.working.space_of_reservation(id);
        self.touch_read(space);
        Ok(self.working.reservations.get(id).cloned())
    }

    async fn find_active_overlapping(
        &mut self,
        space_id: &SpaceId,
        window: &TimeWindow,
    ) -> Result<Vec<Reservation>, StoreError> {
        self.touch_read(Some(*space_id));
        // Let concurrent transactions interleave between check and insert.
        tokio::task::yield_now().await;
        Ok(self
            .working
            .reservations
            .values()
            .filter(|r| &r.space_id == space_id && r.status.blocks_space() && r.window.overlaps(window))
            .cloned()
            .collect())
    }

    async fn list_reservations_for_member(&mut self, member_id: &UserId) -> Result<Vec<Reservation>, StoreError> {
        Ok(self
            .working
            .reservations
            .values()
            .filter(|r| &r.member_id == member_id)
            .cloned()
            .collect())
    }

    async fn insert_reservation(&mut self, reservation: &Reservation) -> Result<(), StoreError> {
        if self.working.reservations.contains_key(&reservation.id) {
            return Err(StoreError::constraint_violation(format!(
                "reservation {} already exists",
                reservation.id
            )));
        }
        self.touch_write(Some(reservation.space_id));
        self.working.reservations.insert(reservation.id, reservation.clone());
        self.writes.push(Write::InsertReservation(reservation.clone()));
        Ok(())
    }

    async fn update_reservation(&mut self, reservation: &Reservation) -> Result<(), StoreError> {
        if !self.working.reservations.contains_key(&reservation.id) {
            return Err(StoreError::missing_row("Reservation", reservation.id));
        }
        self.touch_write(Some(reservation.space_id));
        self.working.reservations.insert(reservation.id, reservation.clone());
        self.writes.push(Write::UpdateReservation(reservation.clone()));
        Ok(())
    }

    async fn update_space_status(&mut self, id: &SpaceId, status: SpaceStatus) -> Result<(), StoreError> {
        let space = self
            .working
            .spaces
            .get_mut(id)
            .ok_or_else(|| StoreError::missing_row("Space", id))?;
        space.status = status;
        self.touch_write(Some(*id));
        self.writes.push(Write::SpaceStatus(*id, status));
        Ok(())
    }

    async fn find_payment(&mut self, id: &PaymentId) -> Result<Option<Payment>, StoreError> {
        Ok(self.working.payments.get(id).cloned())
    }

    async fn find_payment_for_reservation(
        &mut self,
        reservation_id: &ReservationId,
    ) -> Result<Option<Payment>, StoreError> {
        Ok(self
            .working
            .payments
            .values()
            .find(|p| &p.reservation_id == reservation_id)
            .cloned())
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), StoreError> {
        if self
            .working
            .payments
            .values()
            .any(|p| p.id == payment.id || p.reservation_id == payment.reservation_id)
        {
            return Err(StoreError::constraint_violation(format!(
                "reservation {} already has a payment",
                payment.reservation_id
            )));
        }
        let space = self.working.space_of_reservation(&payment.reservation_id);
        self.touch_write(space);
        self.working.payments.insert(payment.id, payment.clone());
        self.writes.push(Write::InsertPayment(payment.clone()));
        Ok(())
    }

    async fn update_payment(&mut self, payment: &Payment) -> Result<(), StoreError> {
        if !self.working.payments.contains_key(&payment.id) {
            return Err(StoreError::missing_row("Payment", payment.id));
        }
        let space = self.working.space_of_reservation(&payment.reservation_id);
        self.touch_write(space);
        self.working.payments.insert(payment.id, payment.clone());
        self.writes.push(Write::UpdatePayment(payment.clone()));
        Ok(())
    }

    async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<(), StoreError> {
        if self
            .working
            .invoices
            .values()
            .any(|i| i.id == invoice.id || i.payment_id == invoice.payment_id)
        {
            return Err(StoreError::constraint_violation(format!(
                "payment {} already has an invoice",
                invoice.payment_id
            )));
        }
        let space = self.working.space_of_payment(&invoice.payment_id);
        self.touch_write(space);
        self.working.invoices.insert(invoice.id, invoice.clone());
        self.writes.push(Write::InsertInvoice(invoice.clone()));
        Ok(())
    }

    async fn find_invoice_for_payment(&mut self, payment_id: &PaymentId) -> Result<Option<Invoice>, StoreError> {
        Ok(self
            .working
            .invoices
            .values()
            .find(|i| &i.payment_id == payment_id)
            .cloned())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        tokio::task::yield_now().await;

        let this = *self;
        let mut shared = this.shared.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(error) = shared.commit_failures.pop_front() {
            return Err(error);
        }
        this.validate(&shared)?;

        for write in this.writes {
            apply(&mut shared.tables, write);
        }
        for space_id in this.written_spaces {
            *shared.space_versions.entry(space_id).or_insert(0) += 1;
        }
        shared.committed += 1;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

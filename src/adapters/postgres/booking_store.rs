//! PostgreSQL implementation of BookingStore.
//!
//! Each [`BookingTransaction`] wraps one `sqlx` transaction. Serializable
//! transactions issue `SET TRANSACTION ISOLATION LEVEL SERIALIZABLE` as
//! their first statement. `find_space` and `find_reservation` take
//! `FOR UPDATE` on the row, which serializes competing conflict checks on
//! the same space and keeps read-committed lifecycle updates from losing
//! each other's writes. The `reservations_no_overlap` exclusion
//! constraint backs the conflict checker at the storage level.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::domain::foundation::{
    Currency, InvoiceId, InvoiceItemId, Money, PaymentId, ReservationId, SpaceId, Timestamp, UserId,
};
use crate::domain::payment::{Invoice, InvoiceItem, Payment, PaymentMethod, PaymentStatus};
use crate::domain::reservation::{Reservation, ReservationStatus, TimeWindow};
use crate::domain::space::{Space, SpaceStatus};
use crate::domain::user::{User, UserRole};
use crate::ports::{BookingStore, BookingTransaction, IsolationLevel, StoreError, StoreErrorKind};

/// PostgreSQL implementation of the BookingStore port.
pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool sized from `config` and optionally runs migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(config.idle_timeout())
            .max_lifetime(config.max_lifetime())
            .connect(&config.url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        if config.run_migrations {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| StoreError::unavailable(format!("migrations failed: {}", e)))?;
            tracing::info!("Database migrations applied");
        }

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BookingStore for PostgresBookingStore {
    async fn begin(&self, isolation: IsolationLevel) -> Result<Box<dyn BookingTransaction>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin", e))?;
        if isolation == IsolationLevel::Serializable {
            sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("set isolation", e))?;
        }
        Ok(Box::new(PostgresBookingTransaction { tx }))
    }
}

struct PostgresBookingTransaction {
    tx: Transaction<'static, Postgres>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Error mapping
// ════════════════════════════════════════════════════════════════════════════════

/// Maps a sqlx error onto the store taxonomy.
///
/// - `40001` serialization_failure, `40P01` deadlock_detected -> serialization failure
/// - `23P01` exclusion_violation, `23505` unique_violation -> constraint violation
/// - pool timeouts and I/O -> unavailable
fn map_sqlx_error(context: &str, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("40001") | Some("40P01") => {
                StoreError::serialization_failure(format!("{}: {}", context, db_err.message()))
            }
            Some("23P01") | Some("23505") => StoreError::constraint_violation(format!(
                "{}: {} ({})",
                context,
                db_err.message(),
                db_err.constraint().unwrap_or("unnamed constraint")
            )),
            _ => StoreError::new(
                StoreErrorKind::Other,
                format!("{}: {}", context, db_err.message()),
            ),
        },
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::unavailable(format!("{}: {}", context, err))
        }
        _ => StoreError::new(StoreErrorKind::Other, format!("{}: {}", context, err)),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Row mapping
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, sqlx::FromRow)]
struct SpaceRow {
    id: Uuid,
    name: String,
    hourly_rate_cents: i64,
    capacity: i32,
    status: String,
}

impl TryFrom<SpaceRow> for Space {
    type Error = StoreError;

    fn try_from(row: SpaceRow) -> Result<Self, Self::Error> {
        let status = SpaceStatus::parse(&row.status)
            .ok_or_else(|| StoreError::corrupt(format!("Invalid space status: {}", row.status)))?;
        let capacity = u32::try_from(row.capacity)
            .map_err(|_| StoreError::corrupt(format!("Invalid capacity: {}", row.capacity)))?;
        Ok(Space {
            id: SpaceId::from_uuid(row.id),
            name: row.name,
            hourly_rate: Money::from_cents(row.hourly_rate_cents),
            capacity,
            status,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    display_name: String,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = UserRole::parse(&row.role)
            .ok_or_else(|| StoreError::corrupt(format!("Invalid role: {}", row.role)))?;
        Ok(User {
            id: UserId::from_uuid(row.id),
            email: row.email,
            display_name: row.display_name,
            role,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    space_id: Uuid,
    member_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: String,
    total_price_cents: i64,
    payment_id: Option<Uuid>,
    checked_in_at: Option<DateTime<Utc>>,
    checked_out_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = StoreError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let status = ReservationStatus::parse(&row.status)
            .ok_or_else(|| StoreError::corrupt(format!("Invalid reservation status: {}", row.status)))?;
        let window = TimeWindow::new(
            Timestamp::from_datetime(row.start_time),
            Timestamp::from_datetime(row.end_time),
        )
        .map_err(|e| StoreError::corrupt(e.to_string()))?;
        Ok(Reservation {
            id: ReservationId::from_uuid(row.id),
            space_id: SpaceId::from_uuid(row.space_id),
            member_id: UserId::from_uuid(row.member_id),
            window,
            status,
            total_price: Money::from_cents(row.total_price_cents),
            payment_id: row.payment_id.map(PaymentId::from_uuid),
            checked_in_at: row.checked_in_at.map(Timestamp::from_datetime),
            checked_out_at: row.checked_out_at.map(Timestamp::from_datetime),
            cancelled_at: row.cancelled_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    reservation_id: Uuid,
    member_id: Uuid,
    amount_cents: i64,
    currency: String,
    method: String,
    status: String,
    transaction_id: Option<String>,
    settled_at: Option<DateTime<Utc>>,
    refunded_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = StoreError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let status = PaymentStatus::parse(&row.status)
            .ok_or_else(|| StoreError::corrupt(format!("Invalid payment status: {}", row.status)))?;
        let method = PaymentMethod::parse(&row.method)
            .ok_or_else(|| StoreError::corrupt(format!("Invalid payment method: {}", row.method)))?;
        let currency = Currency::new(row.currency.trim()).map_err(|e| StoreError::corrupt(e.to_string()))?;
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            reservation_id: ReservationId::from_uuid(row.reservation_id),
            member_id: UserId::from_uuid(row.member_id),
            amount: Money::from_cents(row.amount_cents),
            currency,
            method,
            status,
            transaction_id: row.transaction_id,
            settled_at: row.settled_at.map(Timestamp::from_datetime),
            refunded_at: row.refunded_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn invoice_from_rows(header: &PgRow, items: Vec<PgRow>) -> Result<Invoice, sqlx::Error> {
    let currency: String = header.try_get("currency")?;
    let currency = Currency::new(currency.trim()).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    let items = items
        .iter()
        .map(|row| -> Result<InvoiceItem, sqlx::Error> {
            let quantity: i32 = row.try_get("quantity")?;
            Ok(InvoiceItem {
                id: InvoiceItemId::from_uuid(row.try_get("id")?),
                description: row.try_get("description")?,
                quantity: u32::try_from(quantity).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
                unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
                amount: Money::from_cents(row.try_get("amount_cents")?),
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    Ok(Invoice {
        id: InvoiceId::from_uuid(header.try_get("id")?),
        payment_id: PaymentId::from_uuid(header.try_get("payment_id")?),
        invoice_number: header.try_get("invoice_number")?,
        subtotal: Money::from_cents(header.try_get("subtotal_cents")?),
        tax: Money::from_cents(header.try_get("tax_cents")?),
        total: Money::from_cents(header.try_get("total_cents")?),
        currency,
        issue_date: Timestamp::from_datetime(header.try_get("issue_date")?),
        due_date: Timestamp::from_datetime(header.try_get("due_date")?),
        items,
    })
}

const RESERVATION_COLUMNS: &str = "id, space_id, member_id, start_time, end_time, status, \
     total_price_cents, payment_id, checked_in_at, checked_out_at, cancelled_at, created_at, updated_at";

const PAYMENT_COLUMNS: &str = "id, reservation_id, member_id, amount_cents, currency, method, status, \
     transaction_id, settled_at, refunded_at, created_at";

#[async_trait]
impl BookingTransaction for PostgresBookingTransaction {
    async fn find_space(&mut self, id: &SpaceId) -> Result<Option<Space>, StoreError> {
        let row: Option<SpaceRow> = sqlx::query_as(
            r#"
            SELECT id, name, hourly_rate_cents, capacity, status
            FROM spaces
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find space", e))?;

        row.map(Space::try_from).transpose()
    }

    async fn find_user(&mut self, id: &UserId) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, email, display_name, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find user", e))?;

        row.map(User::try_from).transpose()
    }

    async fn find_reservation(&mut self, id: &ReservationId) -> Result<Option<Reservation>, StoreError> {
        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM reservations WHERE id = $1 FOR UPDATE",
            RESERVATION_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find reservation", e))?;

        row.map(Reservation::try_from).transpose()
    }

    async fn find_active_overlapping(
        &mut self,
        space_id: &SpaceId,
        window: &TimeWindow,
    ) -> Result<Vec<Reservation>, StoreError> {
        let rows: Vec<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM reservations \
             WHERE space_id = $1 AND status <> 'CANCELLED' \
               AND start_time < $3 AND end_time > $2 \
             ORDER BY start_time",
            RESERVATION_COLUMNS
        ))
        .bind(space_id.as_uuid())
        .bind(window.start().as_datetime())
        .bind(window.end().as_datetime())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find overlapping reservations", e))?;

        rows.into_iter().map(Reservation::try_from).collect()
    }

    async fn list_reservations_for_member(&mut self, member_id: &UserId) -> Result<Vec<Reservation>, StoreError> {
        let rows: Vec<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM reservations WHERE member_id = $1 ORDER BY start_time DESC",
            RESERVATION_COLUMNS
        ))
        .bind(member_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("list member reservations", e))?;

        rows.into_iter().map(Reservation::try_from).collect()
    }

    async fn insert_reservation(&mut self, reservation: &Reservation) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO reservations (
                id, space_id, member_id, start_time, end_time, status, total_price_cents,
                payment_id, checked_in_at, checked_out_at, cancelled_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(reservation.id.as_uuid())
        .bind(reservation.space_id.as_uuid())
        .bind(reservation.member_id.as_uuid())
        .bind(reservation.window.start().as_datetime())
        .bind(reservation.window.end().as_datetime())
        .bind(reservation.status.as_str())
        .bind(reservation.total_price.cents())
        .bind(reservation.payment_id.map(|p| *p.as_uuid()))
        .bind(reservation.checked_in_at.map(|t| *t.as_datetime()))
        .bind(reservation.checked_out_at.map(|t| *t.as_datetime()))
        .bind(reservation.cancelled_at.map(|t| *t.as_datetime()))
        .bind(reservation.created_at.as_datetime())
        .bind(reservation.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert reservation", e))?;

        Ok(())
    }

    async fn update_reservation(&mut self, reservation: &Reservation) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE reservations SET
                status = $2,
                payment_id = $3,
                checked_in_at = $4,
                checked_out_at = $5,
                cancelled_at = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(reservation.id.as_uuid())
        .bind(reservation.status.as_str())
        .bind(reservation.payment_id.map(|p| *p.as_uuid()))
        .bind(reservation.checked_in_at.map(|t| *t.as_datetime()))
        .bind(reservation.checked_out_at.map(|t| *t.as_datetime()))
        .bind(reservation.cancelled_at.map(|t| *t.as_datetime()))
        .bind(reservation.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("update reservation", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::missing_row("Reservation", reservation.id));
        }
        Ok(())
    }

    async fn update_space_status(&mut self, id: &SpaceId, status: SpaceStatus) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE spaces SET status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("update space status", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::missing_row("Space", id));
        }
        Ok(())
    }

    async fn find_payment(&mut self, id: &PaymentId) -> Result<Option<Payment>, StoreError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find payment", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn find_payment_for_reservation(
        &mut self,
        reservation_id: &ReservationId,
    ) -> Result<Option<Payment>, StoreError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE reservation_id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(reservation_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find payment for reservation", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, reservation_id, member_id, amount_cents, currency, method, status,
                transaction_id, settled_at, refunded_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.reservation_id.as_uuid())
        .bind(payment.member_id.as_uuid())
        .bind(payment.amount.cents())
        .bind(payment.currency.as_str())
        .bind(payment.method.as_str())
        .bind(payment.status.as_str())
        .bind(&payment.transaction_id)
        .bind(payment.settled_at.map(|t| *t.as_datetime()))
        .bind(payment.refunded_at.map(|t| *t.as_datetime()))
        .bind(payment.created_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert payment", e))?;

        Ok(())
    }

    async fn update_payment(&mut self, payment: &Payment) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE payments SET
                status = $2,
                transaction_id = $3,
                settled_at = $4,
                refunded_at = $5
            WHERE id = $1
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.status.as_str())
        .bind(&payment.transaction_id)
        .bind(payment.settled_at.map(|t| *t.as_datetime()))
        .bind(payment.refunded_at.map(|t| *t.as_datetime()))
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("update payment", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::missing_row("Payment", payment.id));
        }
        Ok(())
    }

    async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, payment_id, invoice_number, subtotal_cents, tax_cents, total_cents,
                currency, issue_date, due_date
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(invoice.id.as_uuid())
        .bind(invoice.payment_id.as_uuid())
        .bind(&invoice.invoice_number)
        .bind(invoice.subtotal.cents())
        .bind(invoice.tax.cents())
        .bind(invoice.total.cents())
        .bind(invoice.currency.as_str())
        .bind(invoice.issue_date.as_datetime())
        .bind(invoice.due_date.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert invoice", e))?;

        for (position, item) in invoice.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    id, invoice_id, position, description, quantity, unit_price_cents, amount_cents
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(invoice.id.as_uuid())
            .bind(position as i32)
            .bind(&item.description)
            .bind(item.quantity as i32)
            .bind(item.unit_price.cents())
            .bind(item.amount.cents())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("insert invoice item", e))?;
        }

        Ok(())
    }

    async fn find_invoice_for_payment(&mut self, payment_id: &PaymentId) -> Result<Option<Invoice>, StoreError> {
        let header = sqlx::query(
            r#"
            SELECT id, payment_id, invoice_number, subtotal_cents, tax_cents, total_cents,
                   currency, issue_date, due_date
            FROM invoices
            WHERE payment_id = $1
            "#,
        )
        .bind(payment_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find invoice", e))?;

        let Some(header) = header else {
            return Ok(None);
        };

        let invoice_id: Uuid = header
            .try_get("id")
            .map_err(|e| StoreError::corrupt(e.to_string()))?;
        let items = sqlx::query(
            r#"
            SELECT id, description, quantity, unit_price_cents, amount_cents
            FROM invoice_items
            WHERE invoice_id = $1
            ORDER BY position
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find invoice items", e))?;

        invoice_from_rows(&header, items)
            .map(Some)
            .map_err(|e| StoreError::corrupt(format!("invoice {}: {}", invoice_id, e)))
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))
    }
}

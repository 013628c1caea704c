//! Database service for dashboard-service.
//!
//! The single arbiter for persistence: every storage column is named
//! explicitly here and nowhere else, so the mapping between API shapes and
//! the schema stays total and bijective.

use std::collections::HashMap;
use std::time::Duration;

use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{
    Actor, ActorWithStats, CreateActor, CreateCustomer, CreateInvoice, Customer, Invoice,
    InvoiceStatus, InvoiceWithDetails, LineItem, NewLineItem, UpdateActor, UpdateCustomer,
};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::totals::Totals;

const USER_COLUMNS: &str =
    "user_id, email, display_name, role_code, is_active, password_hash, created_utc, updated_utc";

const CUSTOMER_COLUMNS: &str = "customer_id, name, email, phone, address, city, region, \
     preferred_payment_method, created_by, created_utc, updated_utc";

const INVOICE_COLUMNS: &str = "invoice_id, invoice_number, customer_id, created_by, status, \
     subtotal, tax_amount, total_amount, due_date, notes, \
     storekeeper_name, sales_officer_name, driver_name, vehicle_plate, created_utc, updated_utc";

const LINE_ITEM_COLUMNS: &str =
    "line_item_id, invoice_id, name, description, quantity, unit_price, total, sort_order, created_utc";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "dashboard-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Actor Operations
    // -------------------------------------------------------------------------

    /// Create a new actor. The identifier is assigned here, never by callers.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_user(&self, input: &CreateActor) -> Result<Actor, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_user"])
            .start_timer();

        let user_id = Uuid::new_v4();
        let user = sqlx::query_as::<_, Actor>(&format!(
            r#"
            INSERT INTO users (user_id, email, display_name, role_code, is_active, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(&input.email)
        .bind(&input.display_name)
        .bind(input.role.as_str())
        .bind(input.is_active)
        .bind(&input.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Email '{}' is already registered",
                    input.email
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create user: {}", e)),
        })?;

        timer.observe_duration();

        info!(user_id = %user.user_id, role = %user.role_code, "User created");

        Ok(user)
    }

    /// Get an actor by ID.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<Actor>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_user"])
            .start_timer();

        let user = sqlx::query_as::<_, Actor>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1",
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get user: {}", e)))?;

        timer.observe_duration();

        Ok(user)
    }

    /// Get an actor by email (login path).
    #[instrument(skip(self, email))]
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<Actor>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_user_by_email"])
            .start_timer();

        let user = sqlx::query_as::<_, Actor>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get user by email: {}", e))
        })?;

        timer.observe_duration();

        Ok(user)
    }

    /// List actors joined with their invoice statistics, newest first.
    #[instrument(skip(self))]
    pub async fn list_users_with_stats(&self) -> Result<Vec<ActorWithStats>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_users_with_stats"])
            .start_timer();

        let users = sqlx::query_as::<_, ActorWithStats>(
            r#"
            SELECT u.user_id, u.email, u.display_name, u.role_code, u.is_active,
                   u.created_utc, u.updated_utc,
                   COUNT(i.invoice_id) AS invoice_count,
                   COALESCE(SUM(i.total_amount), 0) AS total_revenue
            FROM users u
            LEFT JOIN invoices i ON i.created_by = u.user_id
            GROUP BY u.user_id
            ORDER BY u.created_utc DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list users: {}", e)))?;

        timer.observe_duration();

        Ok(users)
    }

    /// Update an actor.
    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn update_user(
        &self,
        user_id: Uuid,
        input: &UpdateActor,
    ) -> Result<Option<Actor>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_user"])
            .start_timer();

        let user = sqlx::query_as::<_, Actor>(&format!(
            r#"
            UPDATE users
            SET display_name = COALESCE($2, display_name),
                role_code = COALESCE($3, role_code),
                is_active = COALESCE($4, is_active),
                password_hash = COALESCE($5, password_hash),
                updated_utc = NOW()
            WHERE user_id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(&input.display_name)
        .bind(input.role.map(|r| r.as_str()))
        .bind(input.is_active)
        .bind(&input.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update user: {}", e)))?;

        timer.observe_duration();

        if let Some(ref u) = user {
            info!(user_id = %u.user_id, "User updated");
        }

        Ok(user)
    }

    /// Delete an actor.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn delete_user(&self, user_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_user"])
            .start_timer();

        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to delete user: {}", e)))?;

        timer.observe_duration();

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(user_id = %user_id, "User deleted");
        }

        Ok(deleted)
    }

    // -------------------------------------------------------------------------
    // Customer Operations
    // -------------------------------------------------------------------------

    /// Create a new customer.
    #[instrument(skip(self, input), fields(created_by = %input.created_by))]
    pub async fn create_customer(&self, input: &CreateCustomer) -> Result<Customer, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_customer"])
            .start_timer();

        let customer_id = Uuid::new_v4();
        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            INSERT INTO customers (
                customer_id, name, email, phone, address, city, region,
                preferred_payment_method, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {CUSTOMER_COLUMNS}
            "#,
        ))
        .bind(customer_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.region)
        .bind(&input.preferred_payment_method)
        .bind(input.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create customer: {}", e)))?;

        timer.observe_duration();

        info!(customer_id = %customer.customer_id, "Customer created");

        Ok(customer)
    }

    /// Get a customer by ID.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn get_customer(&self, customer_id: Uuid) -> Result<Option<Customer>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_customer"])
            .start_timer();

        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE customer_id = $1",
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get customer: {}", e)))?;

        timer.observe_duration();

        Ok(customer)
    }

    /// List all customers, ordered by name.
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_customers"])
            .start_timer();

        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name",
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list customers: {}", e)))?;

        timer.observe_duration();

        Ok(customers)
    }

    /// Update a customer.
    #[instrument(skip(self, input), fields(customer_id = %customer_id))]
    pub async fn update_customer(
        &self,
        customer_id: Uuid,
        input: &UpdateCustomer,
    ) -> Result<Option<Customer>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_customer"])
            .start_timer();

        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            UPDATE customers
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                address = COALESCE($5, address),
                city = COALESCE($6, city),
                region = COALESCE($7, region),
                preferred_payment_method = COALESCE($8, preferred_payment_method),
                updated_utc = NOW()
            WHERE customer_id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "#,
        ))
        .bind(customer_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.region)
        .bind(&input.preferred_payment_method)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update customer: {}", e)))?;

        timer.observe_duration();

        if let Some(ref c) = customer {
            info!(customer_id = %c.customer_id, "Customer updated");
        }

        Ok(customer)
    }

    // -------------------------------------------------------------------------
    // Invoice Operations
    // -------------------------------------------------------------------------

    /// Create an invoice with its line items in one transaction.
    #[instrument(skip(self, input, items), fields(customer_id = %input.customer_id, created_by = %input.created_by))]
    pub async fn create_invoice(
        &self,
        input: &CreateInvoice,
        items: &[NewLineItem],
    ) -> Result<(Invoice, Vec<LineItem>), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_invoice"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let invoice_id = Uuid::new_v4();
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            INSERT INTO invoices (
                invoice_id, invoice_number, customer_id, created_by, status,
                subtotal, tax_amount, total_amount, due_date, notes,
                storekeeper_name, sales_officer_name, driver_name, vehicle_plate
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {INVOICE_COLUMNS}
            "#,
        ))
        .bind(invoice_id)
        .bind(&input.invoice_number)
        .bind(input.customer_id)
        .bind(input.created_by)
        .bind(input.status.as_str())
        .bind(input.subtotal)
        .bind(input.tax_amount)
        .bind(input.total_amount)
        .bind(input.due_date)
        .bind(&input.notes)
        .bind(&input.storekeeper_name)
        .bind(&input.sales_officer_name)
        .bind(&input.driver_name)
        .bind(&input.vehicle_plate)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create invoice: {}", e)))?;

        let line_items = insert_line_items(&mut tx, invoice_id, items).await?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit invoice: {}", e))
        })?;

        timer.observe_duration();

        info!(
            invoice_id = %invoice.invoice_id,
            invoice_number = %invoice.invoice_number,
            items = line_items.len(),
            "Invoice created"
        );

        Ok((invoice, line_items))
    }

    /// Get an invoice with its customer and line items.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn get_invoice_with_details(
        &self,
        invoice_id: Uuid,
    ) -> Result<Option<InvoiceWithDetails>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice_with_details"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE invoice_id = $1",
        ))
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        let Some(invoice) = invoice else {
            timer.observe_duration();
            return Ok(None);
        };

        let customer = self.get_customer(invoice.customer_id).await?.ok_or_else(|| {
            AppError::DatabaseError(anyhow::anyhow!(
                "Invoice {} references missing customer {}",
                invoice.invoice_id,
                invoice.customer_id
            ))
        })?;

        let items = sqlx::query_as::<_, LineItem>(&format!(
            "SELECT {LINE_ITEM_COLUMNS} FROM invoice_line_items WHERE invoice_id = $1 ORDER BY sort_order",
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get line items: {}", e)))?;

        timer.observe_duration();

        Ok(Some(InvoiceWithDetails {
            invoice,
            customer,
            items,
        }))
    }

    /// List every invoice with customer and line items, newest first.
    ///
    /// Role visibility and listing filters are applied by the engine on the
    /// returned collection, not in SQL.
    #[instrument(skip(self))]
    pub async fn list_invoices_with_details(&self) -> Result<Vec<InvoiceWithDetails>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices_with_details"])
            .start_timer();

        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY created_utc DESC",
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list invoices: {}", e)))?;

        let customers = self.list_customers().await?;
        let customers_by_id: HashMap<Uuid, Customer> = customers
            .into_iter()
            .map(|c| (c.customer_id, c))
            .collect();

        let invoice_ids: Vec<Uuid> = invoices.iter().map(|i| i.invoice_id).collect();
        let all_items = sqlx::query_as::<_, LineItem>(&format!(
            "SELECT {LINE_ITEM_COLUMNS} FROM invoice_line_items \
             WHERE invoice_id = ANY($1) ORDER BY invoice_id, sort_order",
        ))
        .bind(&invoice_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list line items: {}", e)))?;

        let mut items_by_invoice: HashMap<Uuid, Vec<LineItem>> = HashMap::new();
        for item in all_items {
            items_by_invoice
                .entry(item.invoice_id)
                .or_default()
                .push(item);
        }

        let mut details = Vec::with_capacity(invoices.len());
        for invoice in invoices {
            let customer = customers_by_id
                .get(&invoice.customer_id)
                .cloned()
                .ok_or_else(|| {
                    AppError::DatabaseError(anyhow::anyhow!(
                        "Invoice {} references missing customer {}",
                        invoice.invoice_id,
                        invoice.customer_id
                    ))
                })?;
            let items = items_by_invoice
                .remove(&invoice.invoice_id)
                .unwrap_or_default();
            details.push(InvoiceWithDetails {
                invoice,
                customer,
                items,
            });
        }

        timer.observe_duration();

        Ok(details)
    }

    /// Update an invoice status. Last write wins; there is no
    /// optimistic-concurrency check.
    #[instrument(skip(self), fields(invoice_id = %invoice_id, status = status.as_str()))]
    pub async fn update_invoice_status(
        &self,
        invoice_id: Uuid,
        status: InvoiceStatus,
    ) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_invoice_status"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            UPDATE invoices
            SET status = $2, updated_utc = NOW()
            WHERE invoice_id = $1
            RETURNING {INVOICE_COLUMNS}
            "#,
        ))
        .bind(invoice_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update invoice status: {}", e))
        })?;

        timer.observe_duration();

        if let Some(ref inv) = invoice {
            info!(invoice_id = %inv.invoice_id, status = %inv.status, "Invoice status updated");
        }

        Ok(invoice)
    }

    /// Replace the line items of an invoice and store the recomputed totals,
    /// atomically.
    #[instrument(skip(self, items, totals), fields(invoice_id = %invoice_id))]
    pub async fn replace_line_items(
        &self,
        invoice_id: Uuid,
        items: &[NewLineItem],
        totals: &Totals,
    ) -> Result<Option<(Invoice, Vec<LineItem>)>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["replace_line_items"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            UPDATE invoices
            SET subtotal = $2, tax_amount = $3, total_amount = $4, updated_utc = NOW()
            WHERE invoice_id = $1
            RETURNING {INVOICE_COLUMNS}
            "#,
        ))
        .bind(invoice_id)
        .bind(totals.subtotal)
        .bind(totals.tax)
        .bind(totals.total)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update invoice totals: {}", e))
        })?;

        let Some(invoice) = invoice else {
            timer.observe_duration();
            return Ok(None);
        };

        sqlx::query("DELETE FROM invoice_line_items WHERE invoice_id = $1")
            .bind(invoice_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to clear line items: {}", e))
            })?;

        let line_items = insert_line_items(&mut tx, invoice_id, items).await?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit line items: {}", e))
        })?;

        timer.observe_duration();

        info!(invoice_id = %invoice_id, items = line_items.len(), "Line items replaced");

        Ok(Some((invoice, line_items)))
    }
}

/// Insert line items for an invoice inside an open transaction. Line totals
/// are recomputed here from quantity and unit price, never taken from the
/// caller.
async fn insert_line_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    invoice_id: Uuid,
    items: &[NewLineItem],
) -> Result<Vec<LineItem>, AppError> {
    let mut inserted = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let line_item = sqlx::query_as::<_, LineItem>(&format!(
            r#"
            INSERT INTO invoice_line_items (
                line_item_id, invoice_id, name, description, quantity, unit_price, total, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {LINE_ITEM_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(invoice_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(crate::services::totals::line_total(
            item.quantity,
            item.unit_price,
        ))
        .bind(index as i32)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to insert line item: {}", e)))?;

        inserted.push(line_item);
    }

    Ok(inserted)
}

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::models::{
    Client, Document, DocumentType, FloaterType, HealthInsurance, InsuranceCover, InsuranceType,
    LeadConversion, NewLeadConversion, Note, Quote, VehicleInsurance,
};
use crate::renewals::{HealthRenewalRow, VehicleRenewalRow};

type Result<T, E = sqlx::Error> = std::result::Result<T, E>;

/// Database connection pool
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new Database instance with a connection pool and bring
    /// the schema up to date.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<()> {
        tracing::info!("running database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                mobile TEXT NOT NULL,
                place TEXT NOT NULL DEFAULT '',
                insurance_type TEXT NOT NULL,
                created_at TEXT NOT NULL,
                is_converted INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS vehicle_insurance (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL UNIQUE REFERENCES clients(id),
                vehicle_type TEXT NOT NULL,
                insurance_cover TEXT NOT NULL,
                renewal_date TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS health_insurance (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL UNIQUE REFERENCES clients(id),
                floater_type TEXT NOT NULL,
                ages TEXT NOT NULL DEFAULT '',
                ped TEXT NOT NULL DEFAULT '',
                renewal_date TEXT,
                renewal_dismissed INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS quotes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL REFERENCES clients(id),
                company_name TEXT NOT NULL,
                premium_amount REAL NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL REFERENCES clients(id),
                text TEXT NOT NULL,
                follow_up_date TEXT NOT NULL,
                reminder INTEGER NOT NULL DEFAULT 1,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL REFERENCES clients(id),
                document_type TEXT NOT NULL,
                file_path TEXT NOT NULL,
                file_name TEXT NOT NULL,
                uploaded_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS lead_conversions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL REFERENCES clients(id),
                posp_code TEXT NOT NULL,
                customer_name TEXT NOT NULL,
                company_name TEXT NOT NULL,
                premium_amount REAL NOT NULL,
                policy_number TEXT NOT NULL,
                customer_mobile TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Renewal queries slice both tables by renewal_date.
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_vehicle_renewal ON vehicle_insurance(renewal_date)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_health_renewal ON health_insurance(renewal_date)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_notes_follow_up ON notes(follow_up_date)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // Client operations
    pub async fn get_clients(&self, insurance_type: Option<InsuranceType>) -> Result<Vec<Client>> {
        let clients = match insurance_type {
            Some(kind) => {
                sqlx::query_as::<_, Client>(
                    "SELECT * FROM clients WHERE insurance_type = ? ORDER BY created_at DESC",
                )
                .bind(kind)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(clients)
    }

    pub async fn get_client(&self, id: i64) -> Result<Option<Client>> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    pub async fn create_client(
        &self,
        name: &str,
        mobile: &str,
        place: &str,
        insurance_type: InsuranceType,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO clients (name, mobile, place, insurance_type, created_at, is_converted)
            VALUES (?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(name)
        .bind(mobile)
        .bind(place)
        .bind(insurance_type)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Update the client's own fields. `is_converted` is deliberately
    /// not updatable here; it only moves through `create_conversion`.
    pub async fn update_client(
        &self,
        id: i64,
        name: &str,
        mobile: &str,
        place: &str,
        insurance_type: InsuranceType,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET name = ?, mobile = ?, place = ?, insurance_type = ?
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(mobile)
        .bind(place)
        .bind(insurance_type)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete a client and everything it owns. Returns the relative
    /// file paths of its documents so the caller can clean up the media
    /// directory, or None if the client does not exist.
    pub async fn delete_client(&self, id: i64) -> Result<Option<Vec<String>>> {
        // Start a transaction
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM clients WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        // Collect document file paths before the rows go away
        let file_paths =
            sqlx::query_scalar::<_, String>("SELECT file_path FROM documents WHERE client_id = ?")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        for table in [
            "vehicle_insurance",
            "health_insurance",
            "quotes",
            "notes",
            "documents",
            "lead_conversions",
        ] {
            sqlx::query(&format!("DELETE FROM {table} WHERE client_id = ?"))
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        // Finally delete the client
        sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        // Commit the transaction
        tx.commit().await?;

        Ok(Some(file_paths))
    }

    // Vehicle insurance operations
    pub async fn get_vehicle_list(&self) -> Result<Vec<VehicleInsurance>> {
        let rows = sqlx::query_as::<_, VehicleInsurance>("SELECT * FROM vehicle_insurance")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn get_vehicle(&self, id: i64) -> Result<Option<VehicleInsurance>> {
        let row = sqlx::query_as::<_, VehicleInsurance>("SELECT * FROM vehicle_insurance WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn get_vehicle_by_client(&self, client_id: i64) -> Result<Option<VehicleInsurance>> {
        let row = sqlx::query_as::<_, VehicleInsurance>(
            "SELECT * FROM vehicle_insurance WHERE client_id = ?",
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn create_vehicle(
        &self,
        client_id: i64,
        vehicle_type: &str,
        insurance_cover: InsuranceCover,
        renewal_date: Option<NaiveDate>,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO vehicle_insurance (client_id, vehicle_type, insurance_cover, renewal_date)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(client_id)
        .bind(vehicle_type)
        .bind(insurance_cover)
        .bind(renewal_date)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update_vehicle(
        &self,
        id: i64,
        vehicle_type: &str,
        insurance_cover: InsuranceCover,
        renewal_date: Option<NaiveDate>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE vehicle_insurance
            SET vehicle_type = ?, insurance_cover = ?, renewal_date = ?
            WHERE id = ?
            "#,
        )
        .bind(vehicle_type)
        .bind(insurance_cover)
        .bind(renewal_date)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_vehicle(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM vehicle_insurance WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // Health insurance operations
    pub async fn get_health_list(&self) -> Result<Vec<HealthInsurance>> {
        let rows = sqlx::query_as::<_, HealthInsurance>("SELECT * FROM health_insurance")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn get_health(&self, id: i64) -> Result<Option<HealthInsurance>> {
        let row = sqlx::query_as::<_, HealthInsurance>("SELECT * FROM health_insurance WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn get_health_by_client(&self, client_id: i64) -> Result<Option<HealthInsurance>> {
        let row = sqlx::query_as::<_, HealthInsurance>(
            "SELECT * FROM health_insurance WHERE client_id = ?",
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn create_health(
        &self,
        client_id: i64,
        floater_type: FloaterType,
        ages: &str,
        ped: &str,
        renewal_date: Option<NaiveDate>,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO health_insurance (client_id, floater_type, ages, ped, renewal_date, renewal_dismissed)
            VALUES (?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(client_id)
        .bind(floater_type)
        .bind(ages)
        .bind(ped)
        .bind(renewal_date)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update_health(
        &self,
        id: i64,
        floater_type: FloaterType,
        ages: &str,
        ped: &str,
        renewal_date: Option<NaiveDate>,
        renewal_dismissed: bool,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE health_insurance
            SET floater_type = ?, ages = ?, ped = ?, renewal_date = ?, renewal_dismissed = ?
            WHERE id = ?
            "#,
        )
        .bind(floater_type)
        .bind(ages)
        .bind(ped)
        .bind(renewal_date)
        .bind(renewal_dismissed)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_health(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM health_insurance WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // Quote operations
    pub async fn get_quotes(&self, client_id: Option<i64>) -> Result<Vec<Quote>> {
        let quotes = match client_id {
            Some(client_id) => {
                sqlx::query_as::<_, Quote>(
                    "SELECT * FROM quotes WHERE client_id = ? ORDER BY created_at DESC",
                )
                .bind(client_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Quote>("SELECT * FROM quotes ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(quotes)
    }

    pub async fn get_quote(&self, id: i64) -> Result<Option<Quote>> {
        let quote = sqlx::query_as::<_, Quote>("SELECT * FROM quotes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(quote)
    }

    pub async fn create_quote(
        &self,
        client_id: i64,
        company_name: &str,
        premium_amount: f64,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO quotes (client_id, company_name, premium_amount, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(client_id)
        .bind(company_name)
        .bind(premium_amount)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update_quote(
        &self,
        id: i64,
        company_name: &str,
        premium_amount: f64,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE quotes SET company_name = ?, premium_amount = ? WHERE id = ?",
        )
        .bind(company_name)
        .bind(premium_amount)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_quote(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM quotes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // Note operations
    pub async fn get_notes(&self, client_id: Option<i64>) -> Result<Vec<Note>> {
        let notes = match client_id {
            Some(client_id) => {
                sqlx::query_as::<_, Note>(
                    "SELECT * FROM notes WHERE client_id = ? ORDER BY follow_up_date ASC",
                )
                .bind(client_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Note>("SELECT * FROM notes ORDER BY follow_up_date ASC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(notes)
    }

    pub async fn get_note(&self, id: i64) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(note)
    }

    /// Notes for a client, most recent follow-up first (the client
    /// history view).
    pub async fn get_client_history(&self, client_id: i64) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            "SELECT * FROM notes WHERE client_id = ? ORDER BY follow_up_date DESC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    pub async fn create_note(
        &self,
        client_id: i64,
        text: &str,
        follow_up_date: NaiveDate,
        reminder: bool,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO notes (client_id, text, follow_up_date, reminder, completed, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(client_id)
        .bind(text)
        .bind(follow_up_date)
        .bind(reminder)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update_note(
        &self,
        id: i64,
        text: &str,
        follow_up_date: NaiveDate,
        reminder: bool,
        completed: bool,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notes
            SET text = ?, follow_up_date = ?, reminder = ?, completed = ?
            WHERE id = ?
            "#,
        )
        .bind(text)
        .bind(follow_up_date)
        .bind(reminder)
        .bind(completed)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_note(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn notes_on(&self, day: NaiveDate) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT * FROM notes
            WHERE follow_up_date = ? AND reminder = 1 AND completed = 0
            ORDER BY follow_up_date ASC
            "#,
        )
        .bind(day)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    pub async fn notes_overdue(&self, today: NaiveDate) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT * FROM notes
            WHERE follow_up_date < ? AND reminder = 1 AND completed = 0
            ORDER BY follow_up_date ASC
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    pub async fn notes_upcoming(&self, after: NaiveDate, until: NaiveDate) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT * FROM notes
            WHERE follow_up_date > ? AND follow_up_date <= ?
              AND reminder = 1 AND completed = 0
            ORDER BY follow_up_date ASC
            "#,
        )
        .bind(after)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    /// Counts for the reminders dashboard. Completion is intentionally
    /// not filtered here, matching the listing views only loosely; the
    /// dashboard shows everything that has a reminder set.
    pub async fn note_summary_counts(
        &self,
        today: NaiveDate,
        upcoming_until: NaiveDate,
    ) -> Result<(i64, i64, i64)> {
        let today_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notes WHERE follow_up_date = ? AND reminder = 1",
        )
        .bind(today)
        .fetch_one(&self.pool)
        .await?;

        let overdue = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notes WHERE follow_up_date < ? AND reminder = 1",
        )
        .bind(today)
        .fetch_one(&self.pool)
        .await?;

        let upcoming = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM notes
            WHERE follow_up_date > ? AND follow_up_date <= ? AND reminder = 1
            "#,
        )
        .bind(today)
        .bind(upcoming_until)
        .fetch_one(&self.pool)
        .await?;

        Ok((today_count, overdue, upcoming))
    }

    pub async fn complete_note(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("UPDATE notes SET completed = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // Document operations
    pub async fn get_documents(&self, client_id: Option<i64>) -> Result<Vec<Document>> {
        let documents = match client_id {
            Some(client_id) => {
                sqlx::query_as::<_, Document>(
                    "SELECT * FROM documents WHERE client_id = ? ORDER BY uploaded_at DESC",
                )
                .bind(client_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Document>("SELECT * FROM documents ORDER BY uploaded_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(documents)
    }

    pub async fn get_document(&self, id: i64) -> Result<Option<Document>> {
        let document = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(document)
    }

    pub async fn create_document(
        &self,
        client_id: i64,
        document_type: DocumentType,
        file_path: &str,
        file_name: &str,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO documents (client_id, document_type, file_path, file_name, uploaded_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(client_id)
        .bind(document_type)
        .bind(file_path)
        .bind(file_name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Update a document's metadata. The stored file itself is
    /// immutable; replacing content means delete and re-upload.
    pub async fn update_document(
        &self,
        id: i64,
        document_type: DocumentType,
        file_name: &str,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET document_type = ?, file_name = ?
            WHERE id = ?
            "#,
        )
        .bind(document_type)
        .bind(file_name)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_document(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // Lead conversion operations
    pub async fn get_conversions(&self, client_id: i64) -> Result<Vec<LeadConversion>> {
        let conversions = sqlx::query_as::<_, LeadConversion>(
            "SELECT * FROM lead_conversions WHERE client_id = ? ORDER BY created_at DESC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(conversions)
    }

    pub async fn get_conversion(&self, id: i64) -> Result<Option<LeadConversion>> {
        let conversion =
            sqlx::query_as::<_, LeadConversion>("SELECT * FROM lead_conversions WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(conversion)
    }

    /// Record a conversion and flip the client's flag in one
    /// transaction. Repeat conversions add rows; the flag stays true.
    pub async fn create_conversion(
        &self,
        client_id: i64,
        conversion: &NewLeadConversion,
    ) -> Result<i64> {
        // Start a transaction
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO lead_conversions
                (client_id, posp_code, customer_name, company_name,
                 premium_amount, policy_number, customer_mobile, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(client_id)
        .bind(&conversion.posp_code)
        .bind(&conversion.customer_name)
        .bind(&conversion.company_name)
        .bind(conversion.premium_amount)
        .bind(&conversion.policy_number)
        .bind(&conversion.customer_mobile)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE clients SET is_converted = 1 WHERE id = ?")
            .bind(client_id)
            .execute(&mut *tx)
            .await?;

        // Commit the transaction
        tx.commit().await?;

        Ok(result.last_insert_rowid())
    }

    // Renewal queries. NULL renewal dates never enter the interval, so
    // unscheduled policies are invisible here.
    pub async fn health_renewals_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HealthRenewalRow>> {
        let rows = sqlx::query_as::<_, HealthRenewalRow>(
            r#"
            SELECT h.id, h.renewal_date, h.renewal_dismissed,
                   h.floater_type, h.ages, h.ped,
                   c.id AS client_id, c.name AS client_name, c.mobile AS client_mobile,
                   c.place AS client_place, c.insurance_type AS client_insurance_type
            FROM health_insurance h
            JOIN clients c ON c.id = h.client_id
            WHERE h.renewal_date IS NOT NULL
              AND h.renewal_date >= ? AND h.renewal_date < ?
            ORDER BY h.renewal_date ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn vehicle_renewals_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<VehicleRenewalRow>> {
        let rows = sqlx::query_as::<_, VehicleRenewalRow>(
            r#"
            SELECT v.id, v.renewal_date, v.vehicle_type, v.insurance_cover,
                   c.id AS client_id, c.name AS client_name, c.mobile AS client_mobile,
                   c.place AS client_place, c.insurance_type AS client_insurance_type
            FROM vehicle_insurance v
            JOIN clients c ON c.id = v.client_id
            WHERE v.renewal_date IS NOT NULL
              AND v.renewal_date >= ? AND v.renewal_date < ?
            ORDER BY v.renewal_date ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Set the next renewal date for a client's health policy and clear
    /// the dismissal flag no matter what it was.
    pub async fn renew_health(&self, client_id: i64, next_date: NaiveDate) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE health_insurance
            SET renewal_date = ?, renewal_dismissed = 0
            WHERE client_id = ?
            "#,
        )
        .bind(next_date)
        .bind(client_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn renew_vehicle(&self, client_id: i64, next_date: NaiveDate) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE vehicle_insurance SET renewal_date = ? WHERE client_id = ?",
        )
        .bind(next_date)
        .bind(client_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Initialize the database connection pool
pub async fn init(database_url: &str) -> Result<Database> {
    let db = Database::new(database_url).await?;

    Ok(db)
}

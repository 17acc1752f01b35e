use async_trait::async_trait;
use jiff::Timestamp;
use linkpulse_core::store::{AliasStore, ClickCount, EventLog, Result};
use linkpulse_core::{
    Alias, Browser, ClickEvent, DeviceType, EventId, LinkId, NewClickEvent, NewShortLink, OsType,
    OwnerId, ShortLink, StorageError, Topic,
};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, QueryBuilder, Row};
use tracing::{debug, trace};

const SHORT_LINKS_DDL: &str = include_str!("../ddl/mysql/short_links.sql");
const CLICK_EVENTS_DDL: &str = include_str!("../ddl/mysql/click_events.sql");

const LINK_COLUMNS: &str =
    "id, alias, owner, destination_url, topic, click_count, created_at";
const EVENT_COLUMNS: &str = "id, short_link_id, clicked_at, source_ip, user_agent, os_type, device_type, browser, country, city";

/// MySQL implementation of the store and event log contracts.
///
/// Alias uniqueness is the `uk_short_links_alias` unique key, so concurrent
/// inserts of one alias are arbitrated by the database. Click counters are
/// bumped with a single `UPDATE ... SET click_count = click_count + 1` and
/// read back inside the same transaction, so no read-modify-write happens on
/// this side. Timestamps are stored as unix milliseconds.
#[derive(Debug, Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Creates a store from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a store by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `short_links` and `click_events` tables if they are missing.
    pub async fn ensure_schema(&self) -> Result<()> {
        for ddl in [SHORT_LINKS_DDL, CLICK_EVENTS_DDL] {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        debug!("MySQL schema is in place");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Closes every pooled connection, waiting for in-flight queries.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn parse_timestamp(millis: i64, column: &str) -> Result<Timestamp> {
    Timestamp::from_millisecond(millis).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{millis}': {e}"))
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn link_from_row(row: &MySqlRow) -> Result<ShortLink> {
    let id: u64 = row.try_get("id").map_err(map_sqlx_error)?;
    let alias: String = row.try_get("alias").map_err(map_sqlx_error)?;
    let owner: String = row.try_get("owner").map_err(map_sqlx_error)?;
    let destination_url: String = row.try_get("destination_url").map_err(map_sqlx_error)?;
    let topic: String = row.try_get("topic").map_err(map_sqlx_error)?;
    let click_count: u64 = row.try_get("click_count").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;

    Ok(ShortLink {
        id: LinkId(id),
        owner: OwnerId::new(owner).map_err(|e| StorageError::InvalidData(e.to_string()))?,
        destination_url,
        alias: Alias::new_unchecked(alias),
        topic: topic
            .parse::<Topic>()
            .map_err(|e| StorageError::InvalidData(e.to_string()))?,
        click_count,
        created_at: parse_timestamp(created_at, "created_at")?,
    })
}

fn event_from_row(row: &MySqlRow) -> Result<ClickEvent> {
    let id: u64 = row.try_get("id").map_err(map_sqlx_error)?;
    let short_link_id: u64 = row.try_get("short_link_id").map_err(map_sqlx_error)?;
    let clicked_at: i64 = row.try_get("clicked_at").map_err(map_sqlx_error)?;
    let os_type: String = row.try_get("os_type").map_err(map_sqlx_error)?;
    let device_type: String = row.try_get("device_type").map_err(map_sqlx_error)?;
    let browser: String = row.try_get("browser").map_err(map_sqlx_error)?;

    Ok(ClickEvent {
        id: EventId(id),
        short_link_id: LinkId(short_link_id),
        timestamp: parse_timestamp(clicked_at, "clicked_at")?,
        source_ip: row.try_get("source_ip").map_err(map_sqlx_error)?,
        user_agent: row.try_get("user_agent").map_err(map_sqlx_error)?,
        os_type: OsType::from_label(&os_type),
        device_type: DeviceType::from_label(&device_type),
        browser: Browser::from_label(&browser),
        country: row.try_get("country").map_err(map_sqlx_error)?,
        city: row.try_get("city").map_err(map_sqlx_error)?,
    })
}

#[async_trait]
impl AliasStore for MySqlStore {
    async fn insert(&self, link: NewShortLink) -> Result<ShortLink> {
        let result = sqlx::query(
            r#"
            INSERT INTO short_links (alias, owner, destination_url, topic, click_count, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(link.alias.as_str())
        .bind(link.owner.as_str())
        .bind(link.destination_url.as_str())
        .bind(link.topic.as_str())
        .bind(link.created_at.as_millisecond())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                let id = LinkId(done.last_insert_id());
                trace!(alias = %link.alias, id = %id, "Inserted short link");
                Ok(link.into_link(id))
            }
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(link.alias.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn lookup(&self, alias: &Alias) -> Result<Option<ShortLink>> {
        let row = sqlx::query(&format!(
            "SELECT {LINK_COLUMNS} FROM short_links WHERE alias = ? LIMIT 1"
        ))
        .bind(alias.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(link_from_row).transpose()
    }

    async fn increment_click(&self, alias: &Alias) -> Result<Option<ClickCount>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r#"
            UPDATE short_links
            SET click_count = click_count + 1
            WHERE alias = ?
            "#,
        )
        .bind(alias.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        // The UPDATE holds the row lock until commit, so this reads exactly
        // the value this transaction wrote.
        let row = sqlx::query("SELECT id, click_count FROM short_links WHERE alias = ?")
            .bind(alias.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        tx.commit().await.map_err(map_sqlx_error)?;

        let link_id: u64 = row.try_get("id").map_err(map_sqlx_error)?;
        let clicks: u64 = row.try_get("click_count").map_err(map_sqlx_error)?;
        Ok(Some(ClickCount {
            link_id: LinkId(link_id),
            clicks,
        }))
    }

    async fn links_by_owner(
        &self,
        owner: &OwnerId,
        topic: Option<Topic>,
    ) -> Result<Vec<ShortLink>> {
        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(format!(
            "SELECT {LINK_COLUMNS} FROM short_links WHERE owner = "
        ));
        builder.push_bind(owner.as_str());
        if let Some(topic) = topic {
            builder.push(" AND topic = ").push_bind(topic.as_str());
        }
        builder.push(" ORDER BY id");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(link_from_row).collect()
    }
}

#[async_trait]
impl EventLog for MySqlStore {
    async fn append(&self, event: NewClickEvent) -> Result<ClickEvent> {
        let done = sqlx::query(
            r#"
            INSERT INTO click_events
                (short_link_id, clicked_at, source_ip, user_agent, os_type, device_type, browser, country, city)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.short_link_id.get())
        .bind(event.timestamp.as_millisecond())
        .bind(event.source_ip.as_str())
        .bind(event.user_agent.as_str())
        .bind(event.os_type.as_str())
        .bind(event.device_type.as_str())
        .bind(event.browser.as_str())
        .bind(event.country.as_deref())
        .bind(event.city.as_deref())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(event.into_event(EventId(done.last_insert_id())))
    }

    async fn events_for(&self, links: &[LinkId]) -> Result<Vec<ClickEvent>> {
        if links.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(format!(
            "SELECT {EVENT_COLUMNS} FROM click_events WHERE short_link_id IN ("
        ));
        let mut ids = builder.separated(", ");
        for id in links {
            ids.push_bind(id.get());
        }
        ids.push_unseparated(") ORDER BY clicked_at, id");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(event_from_row).collect()
    }
}

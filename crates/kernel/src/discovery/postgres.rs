//! PostgreSQL gateways.
//!
//! `VenueQueryBuilder` renders venue predicates to SQL with SeaQuery:
//! - status equality, and `is_blocked = false` outside moderation
//! - case-insensitive name-or-city substring match (LIKE wildcards escaped)
//! - haversine distance ordering for proximity predicates
//! - LIMIT/OFFSET pagination

use std::time::Duration;

use async_trait::async_trait;
use sea_query::{
    Alias, Asterisk, Cond, Expr, ExprTrait, Func, Order, PostgresQueryBuilder, Query,
    SelectStatement, SimpleExpr,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::error::GatewayError;
use super::filter::VenuePredicate;
use super::gateway::{ReviewStatsGateway, TurfGateway, VenueSlice};
use super::geo::EARTH_RADIUS_KM;
use super::pagination::PageWindow;
use super::types::{GeoPoint, ReviewStats, Venue, VenueLocation, VenueStatus};

const TURF_TABLE: &str = "turf";

const TURF_COLUMNS: [&str; 16] = [
    "id",
    "turf_id",
    "name",
    "description",
    "address",
    "city",
    "state",
    "lng",
    "lat",
    "price_per_hour",
    "court_size",
    "turf_photos",
    "amenities",
    "status",
    "is_blocked",
    "created",
];

/// SQL generation for venue listings.
pub struct VenueQueryBuilder<'a> {
    predicate: &'a VenuePredicate,
}

impl<'a> VenueQueryBuilder<'a> {
    pub fn new(predicate: &'a VenuePredicate) -> Self {
        Self { predicate }
    }

    /// Build the page SELECT.
    pub fn build(&self, window: PageWindow) -> String {
        let mut query = Query::select();

        for column in TURF_COLUMNS {
            query.column((Alias::new(TURF_TABLE), Alias::new(column)));
        }
        query.from(Alias::new(TURF_TABLE));

        self.add_filters(&mut query);
        self.add_order(&mut query);

        query.limit(window.limit());
        query.offset(window.skip());

        query.to_string(PostgresQueryBuilder)
    }

    /// Build the COUNT query for the same predicate.
    pub fn build_count(&self) -> String {
        let mut query = Query::select();
        query.expr(Expr::col(Asterisk).count());
        query.from(Alias::new(TURF_TABLE));
        self.add_filters(&mut query);
        query.to_string(PostgresQueryBuilder)
    }

    fn add_filters(&self, query: &mut SelectStatement) {
        let scope = self.predicate.scope();
        query.and_where(column("status").eq(scope.status.as_str()));
        if !scope.include_blocked {
            query.and_where(column("is_blocked").eq(false));
        }

        if let Some(term) = self.predicate.term() {
            let pattern = format!("%{}%", escape_like_wildcards(&term.as_str().to_lowercase()));
            query.and_where(
                Cond::any()
                    .add(lower(column("name")).like(pattern.clone()))
                    .add(lower(column("city")).like(pattern))
                    .into(),
            );
        }
    }

    fn add_order(&self, query: &mut SelectStatement) {
        match self.predicate.anchor() {
            Some(anchor) => {
                // NULL coordinates sort last under ASC.
                query.order_by_expr(distance_expr(anchor), Order::Asc);
            }
            None => {
                query.order_by((Alias::new(TURF_TABLE), Alias::new("created")), Order::Desc);
            }
        }
        query.order_by((Alias::new(TURF_TABLE), Alias::new("id")), Order::Asc);
    }
}

fn column(name: &str) -> SimpleExpr {
    Expr::col((Alias::new(TURF_TABLE), Alias::new(name))).into()
}

fn lower(expr: SimpleExpr) -> SimpleExpr {
    Func::lower(expr).into()
}

/// Haversine distance in kilometres from `anchor` to the row's coordinates.
///
/// Coordinates are validated finite by `GeoPoint::new`, so they can be
/// rendered inline.
fn distance_expr(anchor: GeoPoint) -> SimpleExpr {
    let (lat, lng) = (anchor.lat, anchor.lng);
    Expr::cust(format!(
        "{EARTH_RADIUS_KM:?} * 2 * asin(sqrt(\
         power(sin(radians(\"{TURF_TABLE}\".\"lat\" - ({lat:?})) / 2), 2) + \
         cos(radians({lat:?})) * cos(radians(\"{TURF_TABLE}\".\"lat\")) * \
         power(sin(radians(\"{TURF_TABLE}\".\"lng\" - ({lng:?})) / 2), 2)))"
    ))
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[derive(Debug, sqlx::FromRow)]
struct TurfRow {
    id: Uuid,
    turf_id: String,
    name: String,
    description: Option<String>,
    address: String,
    city: String,
    state: String,
    lng: Option<f64>,
    lat: Option<f64>,
    price_per_hour: i64,
    court_size: String,
    turf_photos: Vec<String>,
    amenities: Vec<String>,
    status: String,
    is_blocked: bool,
    created: i64,
}

impl TryFrom<TurfRow> for Venue {
    type Error = GatewayError;

    fn try_from(row: TurfRow) -> Result<Self, Self::Error> {
        let status: VenueStatus = row.status.parse().map_err(GatewayError::Backend)?;
        let coordinates = row.lng.zip(row.lat).and_then(|(lng, lat)| GeoPoint::new(lng, lat));

        Ok(Venue {
            id: row.id,
            turf_id: row.turf_id,
            name: row.name,
            description: row.description,
            location: VenueLocation {
                address: row.address,
                city: row.city,
                state: row.state,
                coordinates,
            },
            price_per_hour: row.price_per_hour,
            court_size: row.court_size,
            turf_photos: row.turf_photos,
            amenities: row.amenities,
            status,
            is_blocked: row.is_blocked,
            created: row.created,
        })
    }
}

/// Turf gateway over the `turf` table.
#[derive(Clone)]
pub struct PgTurfGateway {
    pool: PgPool,
    statement_timeout: Duration,
}

impl PgTurfGateway {
    pub fn new(pool: PgPool, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }
}

#[async_trait]
impl TurfGateway for PgTurfGateway {
    async fn find(
        &self,
        predicate: &VenuePredicate,
        window: PageWindow,
    ) -> Result<VenueSlice, GatewayError> {
        let builder = VenueQueryBuilder::new(predicate);

        // Count and page share one transaction so SET LOCAL applies to both.
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "SET LOCAL statement_timeout = '{}ms'",
            self.statement_timeout.as_millis()
        ))
        .execute(&mut *tx)
        .await?;

        let total: i64 = sqlx::query_scalar(&builder.build_count())
            .fetch_one(&mut *tx)
            .await?;

        let rows = sqlx::query_as::<_, TurfRow>(&builder.build(window))
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        let items = rows
            .into_iter()
            .map(Venue::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(VenueSlice {
            items,
            total: u64::try_from(total).unwrap_or(0),
        })
    }
}

/// Review aggregate gateway over the `review` table.
#[derive(Clone)]
pub struct PgReviewGateway {
    pool: PgPool,
}

impl PgReviewGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStatsGateway for PgReviewGateway {
    async fn stats_for(&self, turf_id: &str) -> Result<ReviewStats, GatewayError> {
        let (average_rating, total_reviews): (f64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(AVG(rating), 0)::float8, COUNT(*)
            FROM review
            WHERE turf_id = $1
            "#,
        )
        .bind(turf_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ReviewStats {
            average_rating,
            total_reviews: u64::try_from(total_reviews).unwrap_or(0),
        })
    }
}

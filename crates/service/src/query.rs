//! Search and ordering shared by every list endpoint.
//!
//! Each entity describes its listing with a [`QuerySpec`]: the sort keys a
//! caller may ask for, the default key, and the text fields searched by `q`.
//! Keys are column names, or `relation__column` for a column of a directly
//! related table, optionally prefixed with `-` for descending order.
//!
//! Resolution never fails: an unknown `sort_by` falls back to the default,
//! and an empty `q` means no filtering. A non-empty `q` keeps rows where any
//! search field contains it, ignoring case.

use common::pagination::Pagination;
use sea_orm::sea_query::{BinOper, Expr, Func, Order, SimpleExpr};
use sea_orm::{Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Select};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ServiceError;

/// Escape character used in generated `LIKE` patterns.
pub const LIKE_ESCAPE: char = '!';

/// Per-entity listing configuration.
#[derive(Clone, Copy, Debug)]
pub struct QuerySpec {
    pub sort_keys: &'static [&'static str],
    pub default_sort: &'static str,
    pub search_fields: &'static [&'static str],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub field: &'static str,
    pub descending: bool,
}

impl SortKey {
    pub fn parse(key: &'static str) -> Self {
        match key.strip_prefix('-') {
            Some(field) => Self { field, descending: true },
            None => Self { field: key, descending: false },
        }
    }

    pub fn order(&self) -> Order {
        if self.descending { Order::Desc } else { Order::Asc }
    }
}

/// Outcome of resolving request parameters against a [`QuerySpec`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedQuery {
    /// Effective sort key, echoed back to the caller.
    pub sort_by: &'static str,
    pub order: SortKey,
    /// Search term, `None` when no filtering applies.
    pub search: Option<String>,
}

impl ResolvedQuery {
    pub fn q(&self) -> &str { self.search.as_deref().unwrap_or("") }
}

impl QuerySpec {
    pub fn resolve(&self, sort_by: Option<&str>, q: Option<&str>) -> ResolvedQuery {
        let sort_by = sort_by
            .and_then(|wanted| self.sort_keys.iter().copied().find(|k| *k == wanted))
            .unwrap_or(self.default_sort);
        let search = q.filter(|s| !s.is_empty()).map(str::to_string);
        ResolvedQuery { sort_by, order: SortKey::parse(sort_by), search }
    }
}

/// An entity that can be listed through the shared query layer.
pub trait Queryable: EntityTrait {
    const SPEC: QuerySpec;

    /// Column expression for a field path. Must cover `id`, every search
    /// field, and every sort key without its `-` prefix.
    fn field(path: &str) -> Option<SimpleExpr>;

    /// Add the joins that related field paths rely on.
    fn with_joins(select: Select<Self>) -> Select<Self> { select }
}

/// Query-string parameters accepted by list endpoints.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListParams {
    pub fn search(q: &str) -> Self { Self { q: Some(q.to_string()), ..Default::default() } }

    pub fn sorted(sort_by: &str) -> Self { Self { sort_by: Some(sort_by.to_string()), ..Default::default() } }

    pub fn pagination(&self) -> Option<Pagination> { Pagination::from_query(self.page, self.per_page) }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

/// A list result together with the state the UI reflects back.
#[derive(Clone, Debug, Serialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub sort_by: String,
    pub q: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageInfo>,
}

impl<T> Listing<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        Listing { items: self.items.into_iter().map(f).collect(), sort_by: self.sort_by, q: self.q, page: self.page }
    }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }
}

/// Turn a search term into a `%term%` pattern with wildcards escaped.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if c == LIKE_ESCAPE || c == '%' || c == '_' {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// `LOWER(col) LIKE LOWER(pattern) ESCAPE '!'`.
///
/// Both operands go through the database's `LOWER`, so a term always folds
/// exactly like the stored text it is compared against.
fn contains_folded(col: SimpleExpr, pattern: &str) -> SimpleExpr {
    let escaped = SimpleExpr::Binary(
        Box::new(Func::lower(Expr::val(pattern)).into()),
        BinOper::Escape,
        Box::new(SimpleExpr::Constant(LIKE_ESCAPE.into())),
    );
    SimpleExpr::Binary(Box::new(Func::lower(col).into()), BinOper::Like, Box::new(escaped))
}

/// Build the select for a resolved query: joins, OR-ed substring filter, ordering.
pub fn build_select<E: Queryable>(resolved: &ResolvedQuery) -> Select<E> {
    let mut select = E::with_joins(E::find());

    if let Some(term) = &resolved.search {
        let pattern = like_pattern(term);
        let mut any = Condition::any();
        for field in E::SPEC.search_fields {
            if let Some(col) = E::field(field) {
                any = any.add(contains_folded(col, &pattern));
            }
        }
        select = select.filter(any);
    }

    if let Some(col) = E::field(resolved.order.field) {
        select = select.order_by(col, resolved.order.order());
    }
    // id follows the primary direction so equal keys still come back in a stable order
    if let Some(id) = E::field("id") {
        select = select.order_by(id, resolved.order.order());
    }
    select
}

/// Run a listing for `E`: resolve, filter, order and optionally paginate.
pub async fn fetch<E>(db: &DatabaseConnection, params: &ListParams) -> Result<Listing<E::Model>, ServiceError>
where
    E: Queryable,
    E::Model: Send + Sync,
{
    let resolved = E::SPEC.resolve(params.sort_by.as_deref(), params.q.as_deref());
    debug!(sort_by = resolved.sort_by, q = resolved.q(), "resolved list query");
    let select = build_select::<E>(&resolved);

    let (items, page) = match params.pagination() {
        None => (select.all(db).await?, None),
        Some(p) => {
            let (page_idx, per_page) = p.normalize();
            let paginator = select.paginate(db, per_page);
            let counts = paginator.num_items_and_pages().await?;
            let items = paginator.fetch_page(page_idx).await?;
            let info = PageInfo {
                page: (page_idx + 1) as u32,
                per_page: per_page as u32,
                total_items: counts.number_of_items,
                total_pages: counts.number_of_pages,
            };
            (items, Some(info))
        }
    };

    Ok(Listing { items, sort_by: resolved.sort_by.to_string(), q: resolved.q().to_string(), page })
}

//! Page requests parsed from `?page=&size=&sort=` and the response headers
//! describing the page that was served.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use gateway_kernel::settings::PaginationSettings;
use serde_json::json;

use crate::error::AppError;

pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

/// Sort direction of a single order clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("asc") {
            Some(Direction::Asc)
        } else if token.eq_ignore_ascii_case("desc") {
            Some(Direction::Desc)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub property: String,
    pub direction: Direction,
}

impl Order {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Desc,
        }
    }
}

/// Zero-based page request with optional ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pageable {
    pub page: u64,
    pub size: u64,
    pub sort: Vec<Order>,
}

impl Pageable {
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size: size.max(1),
            sort: Vec::new(),
        }
    }

    pub fn sorted_by(mut self, order: Order) -> Self {
        self.sort.push(order);
        self
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }

    /// Parse raw query pairs.
    ///
    /// `page` below zero becomes 0, `size` below one becomes the default and
    /// is capped at the configured maximum. Every `sort` value is
    /// `prop[,prop...][,asc|desc]`; repeated `sort` keys append orders.
    pub fn from_query(
        pairs: &[(String, String)],
        settings: &PaginationSettings,
    ) -> Result<Self, AppError> {
        let mut page = 0u64;
        let mut size = settings.default_page_size;
        let mut sort = Vec::new();

        for (key, value) in pairs {
            match key.as_str() {
                "page" => {
                    let parsed: i64 = value.trim().parse().map_err(|_| {
                        AppError::bad_request_with(
                            vec![json!({"field": "page", "value": value})],
                            format!("page must be an integer, got '{value}'"),
                        )
                    })?;
                    page = u64::try_from(parsed).unwrap_or(0);
                }
                "size" => {
                    let parsed: i64 = value.trim().parse().map_err(|_| {
                        AppError::bad_request_with(
                            vec![json!({"field": "size", "value": value})],
                            format!("size must be an integer, got '{value}'"),
                        )
                    })?;
                    size = match u64::try_from(parsed) {
                        Ok(0) | Err(_) => settings.default_page_size,
                        Ok(n) => n.min(settings.max_page_size),
                    };
                }
                "sort" => sort.extend(parse_sort(value)),
                _ => {}
            }
        }

        Ok(Self {
            page,
            size: size.max(1),
            sort,
        })
    }

    /// Reject orders on properties outside `allowed`.
    pub fn ensure_sortable(&self, allowed: &[&str]) -> Result<(), AppError> {
        match self
            .sort
            .iter()
            .find(|order| !allowed.contains(&order.property.as_str()))
        {
            Some(order) => Err(AppError::bad_request_with(
                vec![json!({"field": "sort", "value": order.property, "allowed": allowed})],
                format!("cannot sort by '{}'", order.property),
            )),
            None => Ok(()),
        }
    }
}

fn parse_sort(value: &str) -> Vec<Order> {
    let tokens: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect();

    let (direction, properties) = match tokens.split_last() {
        Some((last, rest)) => match Direction::parse(last) {
            Some(direction) => (direction, rest),
            None => (Direction::Asc, tokens.as_slice()),
        },
        None => return Vec::new(),
    };

    properties
        .iter()
        .map(|property| Order {
            property: (*property).to_string(),
            direction,
        })
        .collect()
}

/// `X-Total-Count` and RFC 5988 `Link` headers for a served page.
///
/// `path` and `query` describe the request; links keep every query parameter
/// except `page` and `size`, which are replaced per relation.
pub fn pagination_headers(
    path: &str,
    query: &[(String, String)],
    pageable: &Pageable,
    total: u64,
) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(total));

    let total_pages = total.div_ceil(pageable.size.max(1));
    let last_page = total_pages.saturating_sub(1);

    let mut links = Vec::with_capacity(4);
    if pageable.page + 1 < total_pages {
        links.push(page_link(path, query, pageable.page + 1, pageable.size, "next"));
    }
    if pageable.page > 0 {
        links.push(page_link(path, query, pageable.page - 1, pageable.size, "prev"));
    }
    links.push(page_link(path, query, last_page, pageable.size, "last"));
    links.push(page_link(path, query, 0, pageable.size, "first"));

    if let Ok(value) = HeaderValue::from_str(&links.join(",")) {
        headers.insert(axum::http::header::LINK, value);
    }

    headers
}

fn page_link(path: &str, query: &[(String, String)], page: u64, size: u64, rel: &str) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in query
        .iter()
        .filter(|(key, _)| key != "page" && key != "size")
    {
        serializer.append_pair(key, value);
    }
    serializer.append_pair("page", &page.to_string());
    serializer.append_pair("size", &size.to_string());

    format!("<{path}?{}>; rel=\"{rel}\"", serializer.finish())
}

//! Route handlers. Each one parses its input, calls [ExpenseService] and wraps
//! the result in a [DataResponse].

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::application::ExpenseService;
use crate::domain::{PageRequest, ValidationError, cents_from_f64};

use super::response::{ApiError, DataResponse};

/// The body of a request to record an expense.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub description: String,
    pub amount: f64,
    pub payer: String,
}

/// Query parameters naming a month and, for listings, a page.
///
/// Everything arrives as text so that missing and malformed values can be
/// reported with the same error envelope as other validation failures.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub year: Option<String>,
    pub month: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl PeriodQuery {
    /// The requested (year, month). Range checks happen when the window is built.
    pub fn period(&self) -> Result<(i64, i64), ValidationError> {
        let (Some(year), Some(month)) = (self.year.as_deref(), self.month.as_deref()) else {
            return Err(ValidationError::MissingPeriod);
        };
        if year.is_empty() || month.is_empty() {
            return Err(ValidationError::MissingPeriod);
        }

        Ok((parse_field("year", year)?, parse_field("month", month)?))
    }

    /// The requested page. Malformed values count as absent and fall back to
    /// the defaults.
    pub fn page_request(&self) -> PageRequest {
        let parse = |value: &Option<String>| {
            value
                .as_deref()
                .and_then(|v| v.trim().parse::<i64>().ok())
                .unwrap_or(0)
        };
        PageRequest::new(parse(&self.page), parse(&self.page_size))
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidPeriod {
            field,
            value: value.to_string(),
        })
}

/// `POST /expenses`
pub async fn create_expense(
    State(service): State<ExpenseService>,
    payload: Result<Json<CreateExpenseRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Rejected expense body: {rejection}");
        ApiError::bad_request("Invalid request data")
    })?;

    let amount_cents = cents_from_f64(request.amount).map_err(ValidationError::from)?;
    let expense = service
        .create_expense(request.description, amount_cents, &request.payer)
        .await?;

    Ok(DataResponse::new(StatusCode::CREATED, expense).into_response())
}

/// `GET /expenses-list?year&month&page&page_size`
pub async fn get_expenses_by_month_year(
    State(service): State<ExpenseService>,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, ApiError> {
    let (year, month) = query.period()?;
    let page = service
        .get_expense_page(year, month, query.page_request())
        .await?;

    Ok(DataResponse::paginated(StatusCode::OK, page.expenses, page.pagination).into_response())
}

/// `GET /expenses-total?year&month`
pub async fn get_total_by_payer(
    State(service): State<ExpenseService>,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, ApiError> {
    let (year, month) = query.period()?;
    let totals = service.get_total_by_payer(year, month).await?;

    Ok(DataResponse::new(StatusCode::OK, totals).into_response())
}

/// `GET /outstanding-balance?year&month`
pub async fn get_outstanding_balance(
    State(service): State<ExpenseService>,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, ApiError> {
    let (year, month) = query.period()?;
    let balances = service.get_outstanding_balance(year, month).await?;

    Ok(DataResponse::new(StatusCode::OK, balances).into_response())
}

/// `GET /balance-summary?year&month`
pub async fn get_balance_summary(
    State(service): State<ExpenseService>,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, ApiError> {
    let (year, month) = query.period()?;
    let report = service.get_balance_report(year, month).await?;

    Ok(DataResponse::new(StatusCode::OK, report).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(year: Option<&str>, month: Option<&str>) -> PeriodQuery {
        PeriodQuery {
            year: year.map(String::from),
            month: month.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_period_requires_year_and_month() {
        assert_eq!(query(None, Some("1")).period(), Err(ValidationError::MissingPeriod));
        assert_eq!(query(Some("2024"), None).period(), Err(ValidationError::MissingPeriod));
        assert_eq!(query(Some(""), Some("1")).period(), Err(ValidationError::MissingPeriod));
    }

    #[test]
    fn test_period_rejects_non_numeric_values() {
        assert_eq!(
            query(Some("twenty"), Some("1")).period(),
            Err(ValidationError::InvalidPeriod {
                field: "year",
                value: "twenty".to_string()
            })
        );
        assert!(query(Some("2024"), Some("May")).period().is_err());
    }

    #[test]
    fn test_period_parses_numbers() {
        assert_eq!(query(Some("2024"), Some("05")).period(), Ok((2024, 5)));
    }

    #[test]
    fn test_malformed_page_falls_back_to_defaults() {
        let query = PeriodQuery {
            page: Some("abc".to_string()),
            page_size: Some("".to_string()),
            ..Default::default()
        };

        assert_eq!(query.page_request(), PageRequest::default());
    }

    #[test]
    fn test_page_request_from_query() {
        let query = PeriodQuery {
            page: Some("3".to_string()),
            page_size: Some("5".to_string()),
            ..Default::default()
        };

        assert_eq!(query.page_request(), PageRequest::new(3, 5));
    }
}

mod common;

use anyhow::Result;
use chrono::Duration;
use common::{count_since, parse_datetime, record_at, test_repo_service, test_service};
use shared_fund::application::AppError;
use shared_fund::domain::{Expense, MAX_AMOUNT_CENTS, PageRequest, Payer, ValidationError};

#[tokio::test]
async fn test_create_and_list_expense() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let created = service.create_expense("Groceries", 12_550, "Trung").await?;
    assert_eq!(created.payer, Payer::Trung);
    assert_eq!(created.amount_cents, 12_550);

    let (year, month) = service.reference_zone().year_month_of(created.created_at);
    let listed = service
        .list_expenses_by_month_year(year as i64, month as i64, PageRequest::default())
        .await?;

    assert_eq!(listed, vec![created]);
    Ok(())
}

#[tokio::test]
async fn test_unknown_payer_is_rejected_and_nothing_is_stored() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let started_in = service.current_month();

    let result = service.create_expense("Dinner", 3000, "Alice").await;
    assert!(matches!(
        result,
        Err(AppError::Validation(ValidationError::UnknownPayer(ref name))) if name == "Alice"
    ));

    // Payer names are matched exactly
    assert!(service.create_expense("Dinner", 3000, "trung").await.is_err());

    assert_eq!(count_since(&service, started_in).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_invalid_expense_fields_are_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let started_in = service.current_month();

    assert!(matches!(
        service.create_expense("  ", 1000, "Thang").await,
        Err(AppError::Validation(ValidationError::EmptyDescription))
    ));
    assert!(matches!(
        service.create_expense("Taxi", 0, "Thang").await,
        Err(AppError::Validation(ValidationError::NonPositiveAmount))
    ));
    assert!(matches!(
        service.create_expense("Taxi", -500, "Thang").await,
        Err(AppError::Validation(ValidationError::NonPositiveAmount))
    ));
    assert!(matches!(
        service.create_expense("Yacht", MAX_AMOUNT_CENTS + 1, "Thang").await,
        Err(AppError::Validation(ValidationError::AmountTooLarge))
    ));
    assert!(service.create_expense("Yacht", MAX_AMOUNT_CENTS, "Thang").await.is_ok());

    assert_eq!(count_since(&service, started_in).await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_pagination_is_most_recent_first() -> Result<()> {
    let (repo, service, _temp) = test_repo_service().await?;

    let base = parse_datetime("2024-05-01T08:00:00Z");
    for i in 0..25 {
        let expense = Expense::recorded_at(
            format!("Expense {}", i),
            100 + i,
            if i % 2 == 0 { Payer::Trung } else { Payer::Thang },
            base + Duration::hours(i),
        )?;
        repo.save_expense(&expense).await?;
    }

    let page = service
        .get_expense_page(2024, 5, PageRequest::new(2, 10))
        .await?;

    // Newest is "Expense 24", so the second page holds ranks 11-20
    let descriptions: Vec<_> = page.expenses.iter().map(|e| e.description.as_str()).collect();
    let expected: Vec<_> = (5..=14).rev().map(|i| format!("Expense {}", i)).collect();
    assert_eq!(descriptions, expected);
    assert_eq!(page.pagination.page, 2);
    assert_eq!(page.pagination.page_size, 10);
    assert_eq!(page.pagination.total, 25);

    let last = service
        .list_expenses_by_month_year(2024, 5, PageRequest::new(3, 10))
        .await?;
    assert_eq!(last.len(), 5);

    let beyond = service
        .list_expenses_by_month_year(2024, 5, PageRequest::new(4, 10))
        .await?;
    assert!(beyond.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_out_of_range_page_values_are_coerced() -> Result<()> {
    let (repo, service, _temp) = test_repo_service().await?;

    let base = parse_datetime("2024-05-01T08:00:00Z");
    for i in 0..12 {
        let expense =
            Expense::recorded_at("Coffee", 350, Payer::Thang, base + Duration::minutes(i))?;
        repo.save_expense(&expense).await?;
    }

    let first = service
        .get_expense_page(2024, 5, PageRequest::new(1, 10))
        .await?;
    let coerced = service
        .get_expense_page(2024, 5, PageRequest::new(0, -1))
        .await?;

    assert_eq!(coerced.expenses, first.expenses);
    assert_eq!(coerced.pagination, first.pagination);
    assert_eq!(coerced.expenses.len(), 10);

    Ok(())
}

#[tokio::test]
async fn test_month_window_is_half_open() -> Result<()> {
    let (repo, service, _temp) = test_repo_service().await?;

    record_at(&repo, "Last of April", 1000, Payer::Trung, "2024-04-30T23:59:59.999999Z").await?;
    record_at(&repo, "First of May", 2000, Payer::Trung, "2024-05-01T00:00:00Z").await?;
    record_at(&repo, "Last of May", 3000, Payer::Thang, "2024-05-31T23:59:59.999999Z").await?;
    record_at(&repo, "First of June", 4000, Payer::Thang, "2024-06-01T00:00:00Z").await?;

    let may = service.list_all_expenses_by_month_year(2024, 5).await?;
    let descriptions: Vec<_> = may.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(descriptions, vec!["First of May", "Last of May"]);

    assert_eq!(service.count_expenses_by_month_year(2024, 4).await?, 1);
    assert_eq!(service.count_expenses_by_month_year(2024, 6).await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_december_window_ends_at_new_year() -> Result<()> {
    let (repo, service, _temp) = test_repo_service().await?;

    record_at(&repo, "New Year's Eve", 5000, Payer::Trung, "2024-12-31T23:00:00Z").await?;
    record_at(&repo, "New Year's Day", 5000, Payer::Thang, "2025-01-01T00:00:00Z").await?;

    assert_eq!(service.count_expenses_by_month_year(2024, 12).await?, 1);
    assert_eq!(service.count_expenses_by_month_year(2025, 1).await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_count_is_a_number_of_records_not_an_amount() -> Result<()> {
    let (repo, service, _temp) = test_repo_service().await?;

    record_at(&repo, "Rent", 150_000, Payer::Trung, "2024-03-01T09:00:00Z").await?;
    record_at(&repo, "Internet", 4_500, Payer::Thang, "2024-03-05T09:00:00Z").await?;
    record_at(&repo, "Groceries", 8_720, Payer::Thang, "2024-03-12T18:30:00Z").await?;

    assert_eq!(service.count_expenses_by_month_year(2024, 3).await?, 3);

    let totals = service.get_total_by_payer(2024, 3).await?;
    assert_eq!(totals.get(Payer::Trung), 150_000);
    assert_eq!(totals.get(Payer::Thang), 13_220);

    Ok(())
}

#[tokio::test]
async fn test_listing_preserves_stored_fields() -> Result<()> {
    let (repo, service, _temp) = test_repo_service().await?;

    let saved = record_at(
        &repo,
        "Phở for two",
        9_000,
        Payer::Thang,
        "2024-07-14T12:34:56.123456Z",
    )
    .await?;

    let listed = service
        .list_expenses_by_month_year(2024, 7, PageRequest::default())
        .await?;

    assert_eq!(listed, vec![saved]);
    Ok(())
}

#[tokio::test]
async fn test_invalid_month_is_a_validation_error() -> Result<()> {
    let (service, _temp) = test_service().await?;

    assert!(matches!(
        service.list_all_expenses_by_month_year(2024, 0).await,
        Err(AppError::Validation(ValidationError::MonthOutOfRange(0)))
    ));
    assert!(matches!(
        service.count_expenses_by_month_year(2024, 13).await,
        Err(AppError::Validation(ValidationError::MonthOutOfRange(13)))
    ));

    Ok(())
}

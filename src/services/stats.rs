//! Aggregation engine: per-run summaries, the global dashboard aggregate,
//! and the per-day trend series. Everything is recomputed on demand; there
//! is no caching layer.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{BranchStats, DashboardStats, TrendPoint};

/// Boundary for "vs. last week" comparisons, in days.
const TRAILING_PERIOD_DAYS: i64 = 7;
/// Trend series bounds and fallback.
const TREND_MIN_DAYS: i64 = 1;
const TREND_MAX_DAYS: i64 = 365;
const TREND_DEFAULT_DAYS: i64 = 7;

/// passed / total * 100, defined as 0 for an empty set.
pub fn pass_rate(passed: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64 * 100.0
    }
}

/// Resolve the requested trend window: missing or non-positive input falls
/// back to the default, oversized input is clamped to the maximum.
pub fn clamp_trend_days(days: Option<i64>) -> i64 {
    match days {
        Some(d) if d >= TREND_MIN_DAYS => d.min(TREND_MAX_DAYS),
        _ => TREND_DEFAULT_DAYS,
    }
}

/// Start of the given calendar day in the server's local timezone.
fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match naive.and_local_timezone(Local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // A DST gap swallowed midnight; fall back to the UTC reading.
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}

/// Latest-run summary for a branch: case counts, durations and pass rate
/// for the most recent terminal run, falling back to the most recent run
/// of any status. Public entry points only see public runs.
pub async fn branch_latest_stats(
    pool: &DbPool,
    branch: &str,
    public_only: bool,
) -> AppResult<BranchStats> {
    let run = pool
        .latest_run_on_branch(branch, public_only)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test run for branch '{}'", branch)))?;

    let tally = pool.case_tally(run.id).await?;

    Ok(BranchStats {
        test_run_id: run.id,
        branch_name: run.branch_name,
        commit_id: run.commit_id,
        commit_short_id: run.commit_short_id,
        test_type: run.test_type,
        status: run.status,
        created_at: run.created_at,
        total_cases: tally.total,
        passed_cases: tally.passed,
        failed_cases: tally.failed,
        skipped_cases: tally.skipped,
        pass_rate: pass_rate(tally.passed, tally.total),
        duration_ms: tally.duration_ms,
    })
}

/// Global dashboard aggregate. The previous-period figures re-run the same
/// queries with a `created_at < today - 7d` predicate; every call is a full
/// recomputation.
pub async fn dashboard_stats(pool: &DbPool) -> AppResult<DashboardStats> {
    let today = Local::now().date_naive();
    let today_start = local_midnight(today);
    let today_end = today_start + Duration::days(1);
    let yesterday_start = today_start - Duration::days(1);
    let week_ago = today_start - Duration::days(TRAILING_PERIOD_DAYS);

    let mut stats = DashboardStats {
        total_runs: pool.count_runs(None, None).await?,
        total_runs_prev: pool.count_runs(None, Some(week_ago)).await?,
        today_runs: pool.count_runs(Some(today_start), Some(today_end)).await?,
        today_runs_prev: pool
            .count_runs(Some(yesterday_start), Some(today_start))
            .await?,
        ..Default::default()
    };

    let (passed, failed, skipped) = case_status_counts(pool, None).await?;
    stats.success_count = passed;
    stats.failed_count = failed;
    stats.skipped_count = skipped;
    stats.success_rate = pass_rate(passed, passed + failed + skipped);

    let (passed_prev, failed_prev, skipped_prev) =
        case_status_counts(pool, Some(week_ago)).await?;
    stats.success_rate_prev = pass_rate(passed_prev, passed_prev + failed_prev + skipped_prev);

    let (duration_sum, case_count) = pool.case_duration_totals(None).await?;
    stats.avg_duration = average_seconds(duration_sum, case_count);

    let (duration_sum_prev, case_count_prev) =
        pool.case_duration_totals(Some(week_ago)).await?;
    stats.avg_duration_prev = average_seconds(duration_sum_prev, case_count_prev);

    Ok(stats)
}

/// Per-day run counts over the requested window. Days without runs are
/// omitted; callers needing a dense series fill the gaps themselves.
pub async fn dashboard_trend(pool: &DbPool, days: Option<i64>) -> AppResult<Vec<TrendPoint>> {
    let days = clamp_trend_days(days);
    let since = Utc::now() - Duration::days(days);
    pool.run_trend(since).await
}

async fn case_status_counts(
    pool: &DbPool,
    runs_created_before: Option<DateTime<Utc>>,
) -> AppResult<(u64, u64, u64)> {
    use crate::models::CaseStatus;

    let passed = pool
        .count_cases_with_status(CaseStatus::Passed, runs_created_before)
        .await?;
    let failed = pool
        .count_cases_with_status(CaseStatus::Failed, runs_created_before)
        .await?;
    let skipped = pool
        .count_cases_with_status(CaseStatus::Skipped, runs_created_before)
        .await?;

    Ok((passed, failed, skipped))
}

fn average_seconds(duration_sum_ms: i64, case_count: u64) -> f64 {
    if case_count == 0 {
        0.0
    } else {
        duration_sum_ms as f64 / case_count as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_rate_zero_cases() {
        assert_eq!(pass_rate(0, 0), 0.0);
    }

    #[test]
    fn test_pass_rate_bounds() {
        assert_eq!(pass_rate(5, 5), 100.0);
        assert_eq!(pass_rate(0, 5), 0.0);

        let rate = pass_rate(2, 3);
        assert!(rate > 0.0 && rate < 100.0);
        assert!((rate - 66.67).abs() < 0.01);
    }

    #[test]
    fn test_clamp_trend_days() {
        assert_eq!(clamp_trend_days(None), 7);
        assert_eq!(clamp_trend_days(Some(0)), 7);
        assert_eq!(clamp_trend_days(Some(-10)), 7);
        assert_eq!(clamp_trend_days(Some(1)), 1);
        assert_eq!(clamp_trend_days(Some(30)), 30);
        assert_eq!(clamp_trend_days(Some(365)), 365);
        assert_eq!(clamp_trend_days(Some(366)), 365);
    }

    #[test]
    fn test_average_seconds() {
        assert_eq!(average_seconds(0, 0), 0.0);
        assert_eq!(average_seconds(3000, 2), 1.5);
    }
}

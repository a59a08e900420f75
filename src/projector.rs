use crate::types::{DisplayRow, Employee, External, Person, SourceRecord, SummaryStats, WorkforceUtilisation};
use crate::util::{
    format_eur, format_eur_raw, format_percent, non_empty, parse_f64_safe, parse_or_zero, round_to_i64,
    MonthFrame,
};
use chrono::NaiveDate;
use tracing::{debug, info};

/// Billable hours assumed for an external in one month (40h x 4 weeks).
pub const HOURS_PER_MONTH: f64 = 160.0;

/// Placeholder for a May figure that has not been reported yet.
pub const NOT_REPORTED: &str = "...";

const ZERO_PERCENT: &str = "0%";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionStats {
    pub rows: usize,
    pub employees: usize,
    pub externals: usize,
    pub skipped_inactive: usize,
    pub skipped_unknown_variant: usize,
    pub total_net_earnings: f64,
}

impl ProjectionStats {
    pub fn summary(&self, reference_date: NaiveDate) -> SummaryStats {
        SummaryStats {
            reference_date: reference_date.format("%Y-%m-%d").to_string(),
            previous_month: MonthFrame::from_reference(reference_date).previous_month_key,
            total_rows: self.rows,
            employees: self.employees,
            externals: self.externals,
            skipped_inactive: self.skipped_inactive,
            skipped_unknown_variant: self.skipped_unknown_variant,
            total_net_earnings_prev_month: self.total_net_earnings,
        }
    }
}

/// Project source records into display rows for the month containing
/// `reference_date`. Inactive and variant-less records produce no row; the
/// remaining rows keep input order.
pub fn project(records: &[SourceRecord], reference_date: NaiveDate) -> Vec<DisplayRow> {
    project_with_stats(records, reference_date).0
}

pub fn project_with_stats(
    records: &[SourceRecord],
    reference_date: NaiveDate,
) -> (Vec<DisplayRow>, ProjectionStats) {
    let frame = MonthFrame::from_reference(reference_date);
    let mut stats = ProjectionStats::default();
    let mut rows = Vec::with_capacity(records.len());

    for record in records {
        let Some(person) = record.person() else {
            stats.skipped_unknown_variant += 1;
            continue;
        };
        if !person.is_active() {
            stats.skipped_inactive += 1;
            continue;
        }

        let (row, earnings) = project_person(person, &frame);
        match person {
            Person::Employee(_) => stats.employees += 1,
            Person::External(_) => stats.externals += 1,
        }
        stats.total_net_earnings += earnings;
        rows.push(row);
    }

    stats.rows = rows.len();
    info!(
        rows = stats.rows,
        skipped_inactive = stats.skipped_inactive,
        skipped_unknown_variant = stats.skipped_unknown_variant,
        previous_month = %frame.previous_month_key,
        "projected utilisation rows"
    );
    (rows, stats)
}

fn project_person(person: Person<'_>, frame: &MonthFrame) -> (DisplayRow, f64) {
    let utilisation = person.workforce_utilisation();

    let current_util = non_empty(month_rate(utilisation, frame.current_month_name)).unwrap_or("0");
    let previous_util = non_empty(month_rate(utilisation, frame.previous_month_name)).unwrap_or("0");
    debug!(
        person = person.name(),
        current_month = frame.current_month_name,
        current_util,
        previous_util,
        "resolved monthly utilisation"
    );

    let (net_earnings, amount) = match person {
        Person::Employee(employee) => employee_earnings(employee, &frame.previous_month_key),
        Person::External(external) => external_earnings(external, previous_util),
    };

    let may = match utilisation.and_then(|u| u.month("May")) {
        Some(entry) => format_percent(entry.utilisation_rate.as_deref().unwrap_or_default()),
        None => NOT_REPORTED.to_string(),
    };

    let row = DisplayRow {
        person: person.name().to_string(),
        past_12_months: percent_or_zero(
            utilisation.and_then(|u| u.utilisation_rate_last_twelve_months.as_deref()),
        ),
        y2d: percent_or_zero(utilisation.and_then(|u| u.utilisation_rate_year_to_date.as_deref())),
        may,
        june: percent_or_zero(month_rate(utilisation, "June")),
        july: percent_or_zero(month_rate(utilisation, "July")),
        net_earnings_prev_month: net_earnings,
    };
    (row, amount)
}

fn month_rate<'a>(utilisation: Option<&'a WorkforceUtilisation>, month: &str) -> Option<&'a str> {
    utilisation
        .and_then(|u| u.month(month))
        .and_then(|m| m.utilisation_rate.as_deref())
}

fn percent_or_zero(rate: Option<&str>) -> String {
    non_empty(rate)
        .map(format_percent)
        .unwrap_or_else(|| ZERO_PERCENT.to_string())
}

// Booked costs for the month win over the flat salary.
fn employee_earnings(employee: &Employee, previous_month_key: &str) -> (String, f64) {
    let costs = employee
        .costs_by_month
        .as_ref()
        .and_then(|c| non_empty(c.costs_for(previous_month_key)));
    if let Some(costs) = costs {
        let amount = parse_or_zero(Some(costs));
        return (format_eur(amount), round_to_i64(amount) as f64);
    }

    let salary = employee
        .status_aggregation
        .as_ref()
        .and_then(|s| parse_f64_safe(s.monthly_salary.as_deref()))
        .filter(|s| *s != 0.0);
    match salary {
        Some(salary) => (format_eur_raw(salary), salary),
        None => (format_eur(0.0), 0.0),
    }
}

fn external_earnings(external: &External, previous_util: &str) -> (String, f64) {
    let rate = non_empty(external.hourly_rate_for_projects.as_deref());
    match (rate, external.workforce_utilisation.as_ref()) {
        (Some(rate), Some(_)) => {
            let amount = HOURS_PER_MONTH * parse_or_zero(Some(previous_util)) * parse_or_zero(Some(rate));
            (format_eur(amount), round_to_i64(amount) as f64)
        }
        _ => (format_eur(0.0), 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CostsByMonth, MonthUtilisation, MonthlyCost, StatusAggregation};

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).expect("valid date")
    }

    fn months(entries: &[(&str, &str)]) -> WorkforceUtilisation {
        WorkforceUtilisation {
            utilisation_rate_last_twelve_months: None,
            utilisation_rate_year_to_date: None,
            last_three_months_individually: entries
                .iter()
                .map(|(month, rate)| MonthUtilisation {
                    month: month.to_string(),
                    utilisation_rate: Some(rate.to_string()),
                })
                .collect(),
        }
    }

    fn employee(name: &str, status: &str) -> Employee {
        Employee {
            name: name.into(),
            status: status.into(),
            ..Employee::default()
        }
    }

    #[test]
    fn employee_prefers_costs_over_salary() {
        let mut e = employee("Ana", "active");
        e.costs_by_month = Some(CostsByMonth {
            potential_earnings_by_month: vec![
                MonthlyCost { month: "2024-03".into(), costs: Some("1000".into()) },
                MonthlyCost { month: "2024-04".into(), costs: Some("4200.6".into()) },
            ],
        });
        e.status_aggregation = Some(StatusAggregation { monthly_salary: Some("3000".into()) });
        assert_eq!(employee_earnings(&e, "2024-04"), ("4201 EUR".to_string(), 4201.0));
    }

    #[test]
    fn employee_falls_back_to_salary_then_zero() {
        let mut e = employee("Ana", "active");
        e.status_aggregation = Some(StatusAggregation { monthly_salary: Some("3200.0".into()) });
        assert_eq!(employee_earnings(&e, "2024-04").0, "3200 EUR");

        e.costs_by_month = Some(CostsByMonth {
            potential_earnings_by_month: vec![MonthlyCost { month: "2024-04".into(), costs: Some(String::new()) }],
        });
        assert_eq!(employee_earnings(&e, "2024-04").0, "3200 EUR");

        e.status_aggregation = Some(StatusAggregation { monthly_salary: Some("n/a".into()) });
        assert_eq!(employee_earnings(&e, "2024-04").0, "0 EUR");

        e.status_aggregation = None;
        assert_eq!(employee_earnings(&e, "2024-04").0, "0 EUR");
    }

    #[test]
    fn external_earnings_use_monthly_hours() {
        let external = External {
            name: "Bo".into(),
            status: "active".into(),
            workforce_utilisation: Some(months(&[("April", "0.5")])),
            hourly_rate_for_projects: Some("50".into()),
        };
        assert_eq!(external_earnings(&external, "0.5").0, "4000 EUR");
    }

    #[test]
    fn external_without_utilisation_earns_nothing() {
        let external = External {
            name: "Bo".into(),
            status: "active".into(),
            workforce_utilisation: None,
            hourly_rate_for_projects: Some("50".into()),
        };
        assert_eq!(external_earnings(&external, "0.5").0, "0 EUR");
    }

    #[test]
    fn pinned_months_ignore_reference_date() {
        let mut e = employee("Ana", "active");
        e.workforce_utilisation = Some(months(&[("June", "0.4"), ("July", "0.55")]));
        let records = vec![SourceRecord { employees: Some(e), externals: None }];

        let november = NaiveDate::from_ymd_opt(2024, 11, 2).expect("valid date");
        let rows = project(&records, november);
        assert_eq!(rows[0].may, NOT_REPORTED);
        assert_eq!(rows[0].june, "40%");
        assert_eq!(rows[0].july, "55%");
    }

    #[test]
    fn may_entry_with_missing_rate_renders_zero() {
        let mut e = employee("Ana", "active");
        e.workforce_utilisation = Some(WorkforceUtilisation {
            last_three_months_individually: vec![MonthUtilisation { month: "May".into(), utilisation_rate: None }],
            ..WorkforceUtilisation::default()
        });
        let records = vec![SourceRecord { employees: Some(e), externals: None }];
        assert_eq!(project(&records, reference())[0].may, "0%");
    }

    #[test]
    fn stats_count_what_was_skipped() {
        let records = vec![
            SourceRecord { employees: Some(employee("Ana", "active")), externals: None },
            SourceRecord::default(),
            SourceRecord { employees: Some(employee("Cy", "inactive")), externals: None },
        ];
        let (rows, stats) = project_with_stats(&records, reference());
        assert_eq!(rows.len(), 1);
        assert_eq!(stats.employees, 1);
        assert_eq!(stats.skipped_unknown_variant, 1);
        assert_eq!(stats.skipped_inactive, 1);

        let summary = stats.summary(reference());
        assert_eq!(summary.previous_month, "2024-04");
        assert_eq!(summary.reference_date, "2024-05-20");
    }
}

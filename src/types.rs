use serde::{Deserialize, Deserializer, Serialize};
use tabled::Tabled;

/// One item of the source dataset. Exactly one of the two slots is expected
/// to be populated, but nothing in the data guarantees it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceRecord {
    #[serde(default)]
    pub employees: Option<Employee>,
    #[serde(default)]
    pub externals: Option<External>,
}

impl SourceRecord {
    /// Resolve the populated slot. The employee slot wins when both are set.
    pub fn person(&self) -> Option<Person<'_>> {
        match (&self.employees, &self.externals) {
            (Some(employee), _) => Some(Person::Employee(employee)),
            (None, Some(external)) => Some(Person::External(external)),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Person<'a> {
    Employee(&'a Employee),
    External(&'a External),
}

impl<'a> Person<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            Person::Employee(e) => &e.name,
            Person::External(e) => &e.name,
        }
    }

    pub fn status(&self) -> &'a str {
        match *self {
            Person::Employee(e) => &e.status,
            Person::External(e) => &e.status,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status() == ACTIVE_STATUS
    }

    pub fn workforce_utilisation(&self) -> Option<&'a WorkforceUtilisation> {
        match *self {
            Person::Employee(e) => e.workforce_utilisation.as_ref(),
            Person::External(e) => e.workforce_utilisation.as_ref(),
        }
    }
}

pub const ACTIVE_STATUS: &str = "active";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub status: String,
    #[serde(default)]
    pub workforce_utilisation: Option<WorkforceUtilisation>,
    #[serde(default)]
    pub costs_by_month: Option<CostsByMonth>,
    #[serde(default)]
    pub status_aggregation: Option<StatusAggregation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct External {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub status: String,
    #[serde(default)]
    pub workforce_utilisation: Option<WorkforceUtilisation>,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub hourly_rate_for_projects: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkforceUtilisation {
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub utilisation_rate_last_twelve_months: Option<String>,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub utilisation_rate_year_to_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub last_three_months_individually: Vec<MonthUtilisation>,
}

impl WorkforceUtilisation {
    /// First entry whose month name matches exactly. Later duplicates are
    /// ignored.
    pub fn month(&self, name: &str) -> Option<&MonthUtilisation> {
        self.last_three_months_individually
            .iter()
            .find(|m| m.month == name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthUtilisation {
    /// English month name, e.g. `May`.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub month: String,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub utilisation_rate: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostsByMonth {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub potential_earnings_by_month: Vec<MonthlyCost>,
}

impl CostsByMonth {
    pub fn costs_for(&self, key: &str) -> Option<&str> {
        self.potential_earnings_by_month
            .iter()
            .find(|c| c.month == key)
            .and_then(|c| c.costs.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthlyCost {
    /// `YYYY-MM`
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub month: String,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub costs: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusAggregation {
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub monthly_salary: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalRepr {
    Text(String),
    Number(serde_json::Number),
}

// `null` is treated like a missing key.
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Decimal fields are strings in the dataset; bare numbers are kept as their
// textual form.
fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<DecimalRepr>::deserialize(deserializer)?;
    Ok(repr.map(|r| match r {
        DecimalRepr::Text(s) => s,
        DecimalRepr::Number(n) => n.to_string(),
    }))
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    #[tabled(rename = "Person")]
    pub person: String,
    #[serde(rename = "past12Months")]
    #[tabled(rename = "Past 12 Months")]
    pub past_12_months: String,
    #[tabled(rename = "Y2D")]
    pub y2d: String,
    #[tabled(rename = "May")]
    pub may: String,
    #[tabled(rename = "June")]
    pub june: String,
    #[tabled(rename = "July")]
    pub july: String,
    #[tabled(rename = "Net Earnings Prev Month")]
    pub net_earnings_prev_month: String,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub accessor_key: &'static str,
    pub header: &'static str,
}

pub const COLUMNS: [ColumnDef; 7] = [
    ColumnDef { accessor_key: "person", header: "Person" },
    ColumnDef { accessor_key: "past12Months", header: "Past 12 Months" },
    ColumnDef { accessor_key: "y2d", header: "Y2D" },
    ColumnDef { accessor_key: "may", header: "May" },
    ColumnDef { accessor_key: "june", header: "June" },
    ColumnDef { accessor_key: "july", header: "July" },
    ColumnDef { accessor_key: "netEarningsPrevMonth", header: "Net Earnings Prev Month" },
];

/// Rows plus column schema, as handed to an external table renderer.
#[derive(Debug, Serialize)]
pub struct TablePayload<'a> {
    pub columns: &'a [ColumnDef],
    pub rows: &'a [DisplayRow],
}

impl<'a> TablePayload<'a> {
    pub fn new(rows: &'a [DisplayRow]) -> Self {
        Self { columns: &COLUMNS, rows }
    }
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct SummaryStats {
    pub reference_date: String,
    pub previous_month: String,
    pub total_rows: usize,
    pub employees: usize,
    pub externals: usize,
    pub skipped_inactive: usize,
    pub skipped_unknown_variant: usize,
    pub total_net_earnings_prev_month: f64,
}

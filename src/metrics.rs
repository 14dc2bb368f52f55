use serde::Serialize;

use crate::format;
use crate::services::Record;

#[derive(Clone, Debug, PartialEq)]
pub enum Aggregate {
    Count,
    /// Records whose `field` equals one of `values` (case-insensitive).
    CountWhere { field: String, values: Vec<String> },
    Sum { field: String },
    Average { field: String },
    Max { field: String },
    /// `sum(numerator) / sum(denominator) * 100`
    Rate { numerator: String, denominator: String },
    /// Share of records matching, in percent.
    Share { field: String, values: Vec<String> },
    /// `sum(field * weight)`, e.g. price times stock.
    Product { field: String, weight: String },
}

impl Aggregate {
    pub fn count_where(field: &str, values: &[&str]) -> Self {
        Aggregate::CountWhere {
            field: field.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn sum(field: &str) -> Self {
        Aggregate::Sum { field: field.into() }
    }

    pub fn average(field: &str) -> Self {
        Aggregate::Average { field: field.into() }
    }

    pub fn max(field: &str) -> Self {
        Aggregate::Max { field: field.into() }
    }

    pub fn rate(numerator: &str, denominator: &str) -> Self {
        Aggregate::Rate {
            numerator: numerator.into(),
            denominator: denominator.into(),
        }
    }

    pub fn share(field: &str, values: &[&str]) -> Self {
        Aggregate::Share {
            field: field.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn product(field: &str, weight: &str) -> Self {
        Aggregate::Product {
            field: field.into(),
            weight: weight.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFormat {
    Integer,
    Currency,
    Percent,
    Decimal,
    Compact,
}

impl MetricFormat {
    pub fn render(self, value: f64) -> String {
        match self {
            MetricFormat::Integer => format::integer(value),
            MetricFormat::Currency => format::currency(value),
            MetricFormat::Percent => format::percent(value),
            MetricFormat::Decimal => format::decimal(value, 1),
            MetricFormat::Compact => format::compact(value),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MetricSpec {
    pub key: String,
    pub label: String,
    pub aggregate: Aggregate,
    pub format: MetricFormat,
}

impl MetricSpec {
    pub fn new(key: &str, label: &str, aggregate: Aggregate, format: MetricFormat) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            aggregate,
            format,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricValue {
    pub key: String,
    pub label: String,
    pub value: f64,
    pub display: String,
}

fn matches_any(record: &Record, field: &str, values: &[String]) -> bool {
    record
        .text(field)
        .map(|actual| values.iter().any(|v| v.eq_ignore_ascii_case(&actual)))
        .unwrap_or(false)
}

fn sum_of(items: &[Record], field: &str) -> f64 {
    items.iter().filter_map(|r| r.number(field)).sum()
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Pure reduction over `items`. Empty inputs and zero denominators yield `0.0`.
pub fn evaluate(aggregate: &Aggregate, items: &[Record]) -> f64 {
    let value = match aggregate {
        Aggregate::Count => items.len() as f64,
        Aggregate::CountWhere { field, values } => {
            items.iter().filter(|r| matches_any(r, field, values)).count() as f64
        }
        Aggregate::Sum { field } => sum_of(items, field),
        Aggregate::Average { field } => {
            let numbers: Vec<f64> = items.iter().filter_map(|r| r.number(field)).collect();
            ratio(numbers.iter().sum(), numbers.len() as f64)
        }
        Aggregate::Max { field } => items
            .iter()
            .filter_map(|r| r.number(field))
            .fold(None, |best: Option<f64>, n| Some(best.map_or(n, |b| b.max(n))))
            .unwrap_or(0.0),
        Aggregate::Rate {
            numerator,
            denominator,
        } => ratio(sum_of(items, numerator), sum_of(items, denominator)) * 100.0,
        Aggregate::Share { field, values } => {
            let matching = items.iter().filter(|r| matches_any(r, field, values)).count();
            ratio(matching as f64, items.len() as f64) * 100.0
        }
        Aggregate::Product { field, weight } => items
            .iter()
            .map(|r| r.number(field).unwrap_or(0.0) * r.number(weight).unwrap_or(0.0))
            .sum(),
    };
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

pub fn compute(items: &[Record], specs: &[MetricSpec]) -> Vec<MetricValue> {
    specs
        .iter()
        .map(|spec| {
            let value = evaluate(&spec.aggregate, items);
            MetricValue {
                key: spec.key.clone(),
                label: spec.label.clone(),
                value,
                display: spec.format.render(value),
            }
        })
        .collect()
}

/// Remembers the last computation keyed by the items revision, so tab, filter
/// and modal changes reuse it.
#[derive(Clone, Debug, Default)]
pub struct MetricCache {
    revision: Option<u64>,
    values: Vec<MetricValue>,
    computations: u64,
}

impl MetricCache {
    pub fn get_or_compute(
        &mut self,
        revision: u64,
        items: &[Record],
        specs: &[MetricSpec],
    ) -> &[MetricValue] {
        if self.revision != Some(revision) {
            self.values = compute(items, specs);
            self.revision = Some(revision);
            self.computations += 1;
        }
        &self.values
    }

    pub fn computations(&self) -> u64 {
        self.computations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::rows;
    use serde_json::json;

    fn campaigns() -> Vec<Record> {
        rows(vec![
            json!({"status": "active", "clicks": 120, "reach": 4000, "revenue": 950.0}),
            json!({"status": "paused", "clicks": 30, "reach": 1000, "revenue": 120.5}),
            json!({"status": "Active", "clicks": 50, "reach": 0, "revenue": "80"}),
        ])
    }

    #[test]
    fn aggregates_reduce_over_items() {
        let items = campaigns();
        assert_eq!(evaluate(&Aggregate::Count, &items), 3.0);
        assert_eq!(evaluate(&Aggregate::count_where("status", &["active"]), &items), 2.0);
        assert_eq!(evaluate(&Aggregate::sum("revenue"), &items), 1150.5);
        assert_eq!(evaluate(&Aggregate::max("clicks"), &items), 120.0);
        assert_eq!(evaluate(&Aggregate::rate("clicks", "reach"), &items), 4.0);
        let share = evaluate(&Aggregate::share("status", &["paused"]), &items);
        assert!((share - 33.333).abs() < 0.01);
    }

    #[test]
    fn empty_inputs_yield_identity_values() {
        let specs = vec![
            MetricSpec::new("count", "Total", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new("avg", "Average", Aggregate::average("revenue"), MetricFormat::Currency),
            MetricSpec::new("ctr", "CTR", Aggregate::rate("clicks", "reach"), MetricFormat::Percent),
            MetricSpec::new("top", "Top", Aggregate::max("clicks"), MetricFormat::Integer),
        ];
        let values = compute(&[], &specs);
        assert!(values.iter().all(|m| m.value == 0.0));
        assert_eq!(values[1].display, "$0.00");
        assert_eq!(values[2].display, "0.0%");
    }

    #[test]
    fn cache_recomputes_only_on_new_revision() {
        let items = campaigns();
        let specs = vec![MetricSpec::new(
            "revenue",
            "Revenue",
            Aggregate::sum("revenue"),
            MetricFormat::Currency,
        )];
        let mut cache = MetricCache::default();
        cache.get_or_compute(1, &items, &specs);
        cache.get_or_compute(1, &items, &specs);
        assert_eq!(cache.computations(), 1);
        let values = cache.get_or_compute(2, &items[..1], &specs).to_vec();
        assert_eq!(values[0].display, "$950.00");
        assert_eq!(cache.computations(), 2);
    }
}

//! KPI engine: scalar aggregates over the filtered rows.
//!
//! All sums over an empty set are 0. The trust average of an empty set
//! is also 0, never NaN.

use crate::record::{Metric, Record};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_credit: f64,
    pub beneficiaries: i64,
    pub avg_trust: f64,
    pub local_commerce_spend: f64,
    pub currency_in_circulation: f64,
    pub withdrawals: f64,
    pub microcredit_usage: f64,
    pub active_merchants: f64,
}

/// Sum of one metric over `rows`.
pub fn sum(rows: &[&Record], metric: Metric) -> f64 {
    rows.iter().map(|r| r.metric(metric)).sum()
}

/// Arithmetic mean of one metric, None when `rows` is empty.
pub fn mean(rows: &[&Record], metric: Metric) -> Option<f64> {
    if rows.is_empty() {
        None
    } else {
        Some(sum(rows, metric) / rows.len() as f64)
    }
}

impl Kpis {
    pub fn compute(rows: &[&Record]) -> Self {
        Self {
            total_credit: sum(rows, Metric::TotalCredit),
            beneficiaries: sum(rows, Metric::PeopleBenefited) as i64,
            avg_trust: mean(rows, Metric::CurrencyTrust).unwrap_or(0.0),
            local_commerce_spend: sum(rows, Metric::LocalCommerceSpend),
            currency_in_circulation: sum(rows, Metric::CurrencyInCirculation),
            withdrawals: sum(rows, Metric::Withdrawals),
            microcredit_usage: sum(rows, Metric::MicrocreditUsage),
            active_merchants: sum(rows, Metric::ActiveMerchants),
        }
    }

    /// Display cards in layout order: left column first, then right.
    pub fn cards(&self) -> [KpiCard; 8] {
        [
            KpiCard::new(KpiColumn::Left, "Confiança na Moeda (Média)", format!("{:.2}", self.avg_trust)),
            KpiCard::new(KpiColumn::Left, "Uso em Microcrédito", brl_thousands(self.microcredit_usage)),
            KpiCard::new(KpiColumn::Left, "Total Investido (Crédito)", brl_millions(self.total_credit)),
            KpiCard::new(KpiColumn::Left, "Gasto no Comércio Local", brl_millions(self.local_commerce_spend)),
            KpiCard::new(KpiColumn::Right, "Comércios Credenciados Ativos", grouped(self.active_merchants)),
            KpiCard::new(KpiColumn::Right, "Beneficiados pelo Legado", self.beneficiaries.to_string()),
            KpiCard::new(KpiColumn::Right, "Moeda Social Circulação", brl_millions(self.currency_in_circulation)),
            KpiCard::new(KpiColumn::Right, "Saques", brl_millions(self.withdrawals)),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiColumn {
    Left,
    Right,
}

/// One labelled KPI, already formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub column: KpiColumn,
    pub label: &'static str,
    pub value: String,
}

impl KpiCard {
    fn new(column: KpiColumn, label: &'static str, value: String) -> Self {
        Self { column, label, value }
    }
}

/// "R$ 1.23 Mi"
pub fn brl_millions(value: f64) -> String {
    format!("R$ {:.2} Mi", value / 1_000_000.0)
}

/// "R$ 1.23 k"
pub fn brl_thousands(value: f64) -> String {
    format!("R$ {:.2} k", value / 1_000.0)
}

/// Thousands separators with ','. Whole numbers print without decimals,
/// anything else keeps its fractional part.
pub fn grouped(value: f64) -> String {
    let rendered = format!("{}", value.abs());
    let (digits, fraction) = match rendered.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (rendered.as_str(), None),
    };

    let mut out = String::with_capacity(rendered.len() + digits.len() / 3 + 1);
    if value < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = fraction {
        out.push('.');
        out.push_str(frac);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping() {
        assert_eq!(grouped(0.0), "0");
        assert_eq!(grouped(999.0), "999");
        assert_eq!(grouped(1000.0), "1,000");
        assert_eq!(grouped(1234567.0), "1,234,567");
        assert_eq!(grouped(1234.5), "1,234.5");
        assert_eq!(grouped(1234.1), "1,234.1");
        assert_eq!(grouped(1500.25), "1,500.25");
        assert_eq!(grouped(-2500.0), "-2,500");
    }

    #[test]
    fn currency_formats() {
        assert_eq!(brl_millions(2_500_000.0), "R$ 2.50 Mi");
        assert_eq!(brl_millions(0.0), "R$ 0.00 Mi");
        assert_eq!(brl_thousands(1234.0), "R$ 1.23 k");
    }

    #[test]
    fn cards_split_four_and_four() {
        let cards = Kpis::default().cards();
        let left = cards.iter().filter(|c| c.column == KpiColumn::Left).count();
        assert_eq!(left, 4);
        assert_eq!(cards[0].value, "0.00");
    }
}
